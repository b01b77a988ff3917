//! Failure containment across the rails: one rail's trouble never becomes
//! anyone else's problem.

use std::sync::Arc;

use attesta_anchor::{AnchorOrchestrator, RoutingHint};
use attesta_core::{AnchorRequest, AnchorStatus, LedgerId};
use attesta_integration_tests::hash_of;
use attesta_ledger::{MockLedger, RootMeta};

fn meta() -> RootMeta {
    RootMeta {
        count: 1,
        issuer: "Attesta".into(),
    }
}

#[tokio::test]
async fn aux_a_fails_aux_b_succeeds() {
    let orchestrator = AnchorOrchestrator::new(
        Arc::new(MockLedger::new(LedgerId::Hedera)),
        Arc::new(MockLedger::new(LedgerId::Algorand).failing()),
        Arc::new(MockLedger::new(LedgerId::Xrpl)),
    );

    let outcome = orchestrator.anchor_everywhere(&hash_of("aa"), &meta()).await;
    assert!(outcome.primary.is_some());
    assert!(outcome.algorand.is_none());
    assert!(outcome.xrpl.is_some());
}

#[tokio::test]
async fn every_rail_down_still_returns_a_result() {
    let orchestrator = AnchorOrchestrator::new(
        Arc::new(MockLedger::new(LedgerId::Hedera).failing()),
        Arc::new(MockLedger::new(LedgerId::Algorand).failing()),
        Arc::new(MockLedger::new(LedgerId::Xrpl).failing()),
    );

    let outcome = orchestrator.anchor_everywhere(&hash_of("bb"), &meta()).await;
    assert!(outcome.primary.is_none());
    assert!(outcome.algorand.is_none());
    assert!(outcome.xrpl.is_none());
}

#[tokio::test]
async fn disabled_rails_answer_with_mock_receipts() {
    let orchestrator = AnchorOrchestrator::new(
        Arc::new(MockLedger::new(LedgerId::Hedera)),
        Arc::new(MockLedger::new(LedgerId::Algorand).disabled()),
        Arc::new(MockLedger::new(LedgerId::Xrpl).disabled()),
    );

    let outcome = orchestrator.anchor_everywhere(&hash_of("cc"), &meta()).await;
    let algorand = outcome.algorand.expect("mock receipt");
    let xrpl = outcome.xrpl.expect("mock receipt");
    assert_eq!(algorand.status, AnchorStatus::Mock);
    assert_eq!(xrpl.status, AnchorStatus::Mock);
    assert!(algorand.tx_id.unwrap().starts_with("mock-algorand-"));
    assert!(xrpl.tx_id.unwrap().starts_with("mock-xrpl-"));
}

#[tokio::test]
async fn rail_recovery_is_visible_on_the_next_attempt() {
    let algorand = Arc::new(MockLedger::new(LedgerId::Algorand).failing());
    let orchestrator = AnchorOrchestrator::new(
        Arc::new(MockLedger::new(LedgerId::Hedera)),
        Arc::clone(&algorand) as _,
        Arc::new(MockLedger::new(LedgerId::Xrpl)),
    );

    let first = orchestrator.anchor_everywhere(&hash_of("dd"), &meta()).await;
    assert!(first.algorand.is_none());

    algorand.set_failing(false);
    let second = orchestrator.anchor_everywhere(&hash_of("dd"), &meta()).await;
    assert!(second.algorand.is_some());
}

#[tokio::test]
async fn unified_routing_falls_back_across_rails() {
    let orchestrator = AnchorOrchestrator::new(
        Arc::new(MockLedger::new(LedgerId::Hedera)),
        Arc::new(MockLedger::new(LedgerId::Algorand)),
        Arc::new(MockLedger::new(LedgerId::Xrpl).failing()),
    );

    // Hint prefers XRPL, which is down; Algorand becomes the primary slot
    // and no secondary is reported.
    let hint = RoutingHint {
        preferred: Some(LedgerId::Xrpl),
        ..Default::default()
    };
    let outcome = orchestrator
        .anchor_unified(&AnchorRequest::for_hash(hash_of("ee")), &hint)
        .await;

    let (primary, _) = outcome.primary.expect("fallback primary");
    assert_eq!(primary, LedgerId::Algorand);
    assert!(outcome.secondary.is_none());
}
