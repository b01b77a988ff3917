use attesta_core::{LedgerId, StoreError};

/// Ledger adapter errors.
///
/// `Timeout` is deliberately distinct from `Rpc`/`Unavailable`: a slow rail
/// and a down rail are different operational states and callers route on
/// the difference.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0} is disabled or not configured")]
    Disabled(LedgerId),

    #[error("{ledger} call exceeded its {budget_ms}ms budget")]
    Timeout { ledger: LedgerId, budget_ms: u64 },

    #[error("{ledger} rpc error: {message}")]
    Rpc { ledger: LedgerId, message: String },

    #[error("{ledger} returned an invalid response: {message}")]
    InvalidResponse { ledger: LedgerId, message: String },

    #[error("{what} not found on {ledger}")]
    NotFound { ledger: LedgerId, what: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn rpc(ledger: LedgerId, err: impl std::fmt::Display) -> Self {
        Self::Rpc {
            ledger,
            message: err.to_string(),
        }
    }

    pub fn invalid(ledger: LedgerId, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            ledger,
            message: message.into(),
        }
    }
}
