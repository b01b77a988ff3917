use serde::{Deserialize, Serialize};

use crate::error::MerkleError;
use crate::hashing::{combine, normalize_hash};

/// Which side the sibling sits on during replay.
///
/// `Left` means the sibling is the left operand (sibling ‖ current);
/// `Right` means the current accumulator stays on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

/// One step of an inclusion proof, leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub position: Position,
    pub hash: String,
}

/// Replay a proof against a leaf and compare the final accumulator to the
/// expected root, case-insensitively.
///
/// A non-matching replay is `Ok(false)` — a legitimate, expected outcome —
/// while malformed hex anywhere in the input is an error.
pub fn verify_inclusion(
    leaf: &str,
    proof: &[ProofStep],
    expected_root: &str,
) -> Result<bool, MerkleError> {
    let mut acc = normalize_hash(leaf);
    for step in proof {
        let sibling = normalize_hash(&step.hash);
        acc = match step.position {
            Position::Left => combine(&sibling, &acc)?,
            Position::Right => combine(&acc, &sibling)?,
        };
    }
    Ok(acc == normalize_hash(expected_root))
}
