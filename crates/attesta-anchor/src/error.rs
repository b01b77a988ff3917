use attesta_core::StoreError;
use attesta_ledger::LedgerError;

/// Anchoring-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    #[error("credential {token_id}#{serial_number} is already revoked")]
    AlreadyRevoked {
        token_id: String,
        serial_number: String,
    },

    #[error("credential {token_id}#{serial_number} not found")]
    NotFound {
        token_id: String,
        serial_number: String,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
