//! Attesta Merkle engine — deterministic batching of credential hashes.
//!
//! Pure computation, no I/O: many credential hashes share a single on-chain
//! anchor by way of a binary SHA-256 Merkle tree. The tree itself is
//! transient; only the root and the per-leaf inclusion proofs outlive it.

pub mod error;
pub mod hashing;
pub mod proof;
pub mod transport;
pub mod tree;

pub use error::MerkleError;
pub use hashing::{normalize_hash, sha256_hex};
pub use proof::{verify_inclusion, Position, ProofStep};
pub use transport::{decode_proof, encode_proof};
pub use tree::MerkleTree;
