use std::sync::Arc;

use serde::{Deserialize, Serialize};

use attesta_ledger::ConsensusLedger;
use attesta_merkle::{normalize_hash, verify_inclusion, ProofStep};

use crate::error::VerifyError;

/// Input to offline verification: a leaf, its proof, and either the root
/// itself or the message log to fetch it from.
#[derive(Debug, Clone, Deserialize)]
pub struct TrustlessRequest {
    pub hash: String,
    pub proof: Vec<ProofStep>,
    pub merkle_root: Option<String>,
    pub log_id: Option<String>,
}

/// Outcome of a trustless verification.
///
/// `verified == false` is a legitimate result — the proof simply does not
/// match — and is never reported as an error.
#[derive(Debug, Clone, Serialize)]
pub struct TrustlessOutcome {
    pub verified: bool,
    pub merkle_root: String,
    /// Sequence number of the log message the root came from, when the
    /// root was fetched rather than supplied.
    pub log_sequence: Option<u64>,
    pub consensus_timestamp: Option<String>,
}

/// Replays Merkle proofs on this machine.
///
/// The only network call is fetching the publicly anchored root from the
/// consensus message log — and only when the caller did not supply one.
/// The cryptographic check itself never leaves the verifying party.
pub struct TrustlessVerifier {
    primary: Arc<dyn ConsensusLedger>,
}

impl TrustlessVerifier {
    pub fn new(primary: Arc<dyn ConsensusLedger>) -> Self {
        Self { primary }
    }

    pub async fn verify(&self, request: TrustlessRequest) -> Result<TrustlessOutcome, VerifyError> {
        if request.hash.trim().is_empty() {
            return Err(VerifyError::Validation("hash must not be empty".into()));
        }

        let supplied = request
            .merkle_root
            .as_deref()
            .map(str::trim)
            .filter(|root| !root.is_empty());

        let (root, log_sequence, consensus_timestamp) = match supplied {
            Some(root) => (normalize_hash(root), None, None),
            None => {
                let log_id = request
                    .log_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or(VerifyError::MissingRoot)?;
                let published = self
                    .primary
                    .latest_merkle_root(log_id)
                    .await?
                    .ok_or_else(|| VerifyError::RootNotFound(log_id.to_string()))?;
                (
                    normalize_hash(&published.merkle_root),
                    Some(published.sequence),
                    published.consensus_timestamp,
                )
            }
        };

        let verified = verify_inclusion(&request.hash, &request.proof, &root)?;
        Ok(TrustlessOutcome {
            verified,
            merkle_root: root,
            log_sequence,
            consensus_timestamp,
        })
    }
}
