/// Merkle engine errors.
#[derive(Debug, thiserror::Error)]
pub enum MerkleError {
    #[error("empty batch: at least one leaf hash is required")]
    EmptyBatch,

    #[error("malformed hash: {0}")]
    MalformedHash(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("leaf index {index} out of range for {leaves} leaves")]
    IndexOutOfRange { index: usize, leaves: usize },
}
