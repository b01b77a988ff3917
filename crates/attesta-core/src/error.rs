use crate::status::CredentialStatus;

/// Core domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid certificate hash: {0}")]
    InvalidHash(String),

    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: CredentialStatus,
        to: CredentialStatus,
    },

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Persistent-store errors.
///
/// `Unavailable` is a first-class, recoverable kind: the verification path
/// degrades on it instead of failing closed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store internal error: {0}")]
    Internal(String),
}
