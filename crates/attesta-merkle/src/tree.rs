use crate::error::MerkleError;
use crate::hashing::{combine, decode_hash, normalize_hash};
use crate::proof::{Position, ProofStep};

/// A binary SHA-256 Merkle tree over an ordered batch of leaf hashes.
///
/// Level 0 holds the normalized input leaves in insertion order; each
/// subsequent level pairs adjacent nodes left-to-right. When a level has an
/// odd count, the last node is paired with itself (duplicate-last rule),
/// never promoted unpaired. The root is a pure function of the ordered leaf
/// sequence, which is what makes independent re-verification possible.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build the full tree. The batch must be non-empty and every leaf must
    /// be valid hex; both are rejected before any work is done.
    pub fn build(leaves: &[String]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyBatch);
        }
        let mut current: Vec<String> = leaves.iter().map(|leaf| normalize_hash(leaf)).collect();
        for leaf in &current {
            decode_hash(leaf)?;
        }

        let mut levels = vec![current.clone()];
        while current.len() > 1 {
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            let mut i = 0;
            while i < current.len() {
                let left = &current[i];
                let right = if i + 1 < current.len() {
                    &current[i + 1]
                } else {
                    left
                };
                next.push(combine(left, right)?);
                i += 2;
            }
            levels.push(next.clone());
            current = next;
        }

        Ok(Self { levels })
    }

    /// The Merkle root, lowercase hex.
    pub fn root(&self) -> &str {
        &self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Leaves as normalized at level 0, in insertion order.
    pub fn leaves(&self) -> &[String] {
        &self.levels[0]
    }

    /// All levels, leaves first. Kept transient; callers persist only the
    /// root and per-leaf proofs.
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    /// Inclusion proof for the leaf at `index`.
    ///
    /// A right child records its sibling tagged `Left` (sibling ‖ current
    /// during replay) and vice versa. The unpaired last node of an odd level
    /// records itself as its own sibling, matching the duplicate-last
    /// combination rule exactly.
    pub fn proof_for(&self, index: usize) -> Result<Vec<ProofStep>, MerkleError> {
        if index >= self.leaf_count() {
            return Err(MerkleError::IndexOutOfRange {
                index,
                leaves: self.leaf_count(),
            });
        }

        let mut steps = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let is_right = idx % 2 == 1;
            let sibling_idx = if is_right {
                idx - 1
            } else if idx + 1 < level.len() {
                idx + 1
            } else {
                idx
            };
            steps.push(ProofStep {
                position: if is_right {
                    Position::Left
                } else {
                    Position::Right
                },
                hash: level[sibling_idx].clone(),
            });
            idx /= 2;
        }
        Ok(steps)
    }
}
