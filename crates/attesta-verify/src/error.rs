use attesta_ledger::LedgerError;
use attesta_merkle::MerkleError;

/// Verification errors.
///
/// A proof that replays to the wrong root is NOT an error — that outcome is
/// reported as `verified = false`. These variants cover malformed input and
/// infrastructure failures only, so "tampered" and "temporarily unable to
/// corroborate" never collapse into one.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("merkleRoot or logId is required")]
    MissingRoot,

    #[error("no merkle root published on log {0}")]
    RootNotFound(String),

    #[error("credential {token_id}#{serial_number} not found")]
    NotFound {
        token_id: String,
        serial_number: String,
    },

    #[error("malformed verification link: {0}")]
    MalformedLink(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
