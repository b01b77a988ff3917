//! End-to-end Merkle batching: build a tree, anchor the root on all three
//! rails, share a verification link, and replay the proof offline.

use attesta_core::CertificateHash;
use attesta_integration_tests::{mock_rails, orchestrator, sample_leaves};
use attesta_ledger::RootMeta;
use attesta_merkle::{verify_inclusion, MerkleTree};
use attesta_verify::{build_link, parse_link, LinkParams, TrustlessRequest, TrustlessVerifier};
use std::sync::Arc;

fn meta(count: usize) -> RootMeta {
    RootMeta {
        count,
        issuer: "Attesta".into(),
    }
}

#[tokio::test]
async fn batch_anchor_link_replay() {
    let (primary, algorand, xrpl) = mock_rails();
    let orchestrator = orchestrator(&primary, &algorand, &xrpl);

    let leaves = sample_leaves(5);
    let tree = MerkleTree::build(&leaves).unwrap();
    let root = CertificateHash::parse(tree.root()).unwrap();

    let outcome = orchestrator.anchor_everywhere(&root, &meta(5)).await;
    let log = outcome.primary.expect("consensus log anchor");
    let xrpl_receipt = outcome.xrpl.expect("xrpl anchor");

    // One shareable link per leaf.
    for (index, leaf) in leaves.iter().enumerate() {
        let proof = tree.proof_for(index).unwrap();
        let link = build_link(
            leaf,
            &proof,
            &LinkParams {
                base_url: Some("https://app.attesta.network"),
                log_id: Some(&log.log_id),
                xrpl_tx: xrpl_receipt.tx_id.as_deref(),
                algorand_tx: None,
            },
        );

        // The receiving side decodes the link and replays the proof with no
        // server involvement beyond the public log fetch.
        let parsed = parse_link(&link.url).unwrap();
        assert_eq!(parsed.log_id.as_deref(), Some(log.log_id.as_str()));

        let verifier = TrustlessVerifier::new(Arc::clone(&primary) as _);
        let result = verifier
            .verify(TrustlessRequest {
                hash: parsed.hash,
                proof: parsed.proof,
                merkle_root: None,
                log_id: parsed.log_id,
            })
            .await
            .unwrap();
        assert!(result.verified, "leaf {index}");
        assert_eq!(result.merkle_root, tree.root());
        assert_eq!(result.log_sequence, Some(log.sequence));
    }
}

#[tokio::test]
async fn republished_root_supersedes_older_batches() {
    let (primary, algorand, xrpl) = mock_rails();
    let orchestrator = orchestrator(&primary, &algorand, &xrpl);

    let first = MerkleTree::build(&sample_leaves(3)).unwrap();
    let second_leaves: Vec<String> = sample_leaves(8)
        .into_iter()
        .map(|leaf| leaf.to_ascii_uppercase())
        .collect();
    let second = MerkleTree::build(&second_leaves).unwrap();

    orchestrator
        .anchor_everywhere(&CertificateHash::parse(first.root()).unwrap(), &meta(3))
        .await;
    orchestrator
        .anchor_everywhere(&CertificateHash::parse(second.root()).unwrap(), &meta(8))
        .await;

    // The log now serves the newest root; proofs from the first batch must
    // fail against it while proofs from the second succeed.
    let verifier = TrustlessVerifier::new(Arc::clone(&primary) as _);

    let stale = verifier
        .verify(TrustlessRequest {
            hash: sample_leaves(3)[0].clone(),
            proof: first.proof_for(0).unwrap(),
            merkle_root: None,
            log_id: Some(primary.log_id().to_string()),
        })
        .await
        .unwrap();
    assert!(!stale.verified);

    let fresh = verifier
        .verify(TrustlessRequest {
            hash: second.leaves()[0].clone(),
            proof: second.proof_for(0).unwrap(),
            merkle_root: None,
            log_id: Some(primary.log_id().to_string()),
        })
        .await
        .unwrap();
    assert!(fresh.verified);
}

#[tokio::test]
async fn offline_replay_needs_no_rail_at_all() {
    // With the root in hand the replay is pure computation.
    let leaves = sample_leaves(17);
    let tree = MerkleTree::build(&leaves).unwrap();
    for (index, leaf) in leaves.iter().enumerate() {
        let proof = tree.proof_for(index).unwrap();
        assert!(verify_inclusion(leaf, &proof, tree.root()).unwrap());
    }
}
