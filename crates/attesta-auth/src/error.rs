use crate::consumer::Permission;

/// Authentication and authorization errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("API key is missing")]
    MissingKey,

    /// Covers malformed, unknown, wrong-secret, and deactivated keys alike
    /// so responses leak nothing about which case occurred.
    #[error("invalid API key")]
    Unauthorized,

    #[error("missing required permission: {required}")]
    Forbidden { required: Permission },

    #[error("key hashing failed: {0}")]
    Hashing(String),
}
