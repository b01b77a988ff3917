//! Shared fixtures for Attesta integration tests.

use std::sync::Arc;

use attesta_anchor::AnchorOrchestrator;
use attesta_core::{CertificateHash, LedgerId};
use attesta_ledger::MockLedger;
use attesta_merkle::sha256_hex;

/// Mock rails for all three ledgers.
pub fn mock_rails() -> (Arc<MockLedger>, Arc<MockLedger>, Arc<MockLedger>) {
    (
        Arc::new(MockLedger::new(LedgerId::Hedera)),
        Arc::new(MockLedger::new(LedgerId::Algorand)),
        Arc::new(MockLedger::new(LedgerId::Xrpl)),
    )
}

/// Orchestrator over the given mock rails.
pub fn orchestrator(
    primary: &Arc<MockLedger>,
    algorand: &Arc<MockLedger>,
    xrpl: &Arc<MockLedger>,
) -> Arc<AnchorOrchestrator> {
    Arc::new(AnchorOrchestrator::new(
        Arc::clone(primary) as Arc<dyn attesta_ledger::ConsensusLedger>,
        Arc::clone(algorand) as Arc<dyn attesta_ledger::LedgerClient>,
        Arc::clone(xrpl) as Arc<dyn attesta_ledger::LedgerClient>,
    ))
}

/// Deterministic leaf hashes for a batch of the given size.
pub fn sample_leaves(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| sha256_hex(format!("credential-{i}").as_bytes()))
        .collect()
}

pub fn hash_of(byte: &str) -> CertificateHash {
    CertificateHash::parse(&byte.repeat(32)).expect("valid hex")
}
