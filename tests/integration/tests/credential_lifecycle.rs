//! Full credential lifecycle: issue with auxiliary pre-anchors, verify
//! online through every proof tier, revoke, and verify again.

use std::sync::Arc;

use async_trait::async_trait;
use attesta_anchor::{AnchorError, IssuanceRequest, IssuanceService, RevocationRegistry};
use attesta_core::{
    CertificateHash, CredentialRecord, CredentialStore, MemoryStore, RevocationEvidence,
    RevocationFilter, StoreError, TrustStatus,
};
use attesta_integration_tests::{hash_of, mock_rails, orchestrator};
use attesta_verify::{OnlineVerifier, ProofSource};

struct DownStore;

#[async_trait]
impl CredentialStore for DownStore {
    async fn put_credential(&self, _: &CredentialRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("maintenance window".into()))
    }
    async fn credential(&self, _: &str, _: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".into()))
    }
    async fn credential_by_hash(
        &self,
        _: &CertificateHash,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".into()))
    }
    async fn mark_revoked(
        &self,
        _: &str,
        _: &str,
        _: Option<&str>,
        _: &RevocationEvidence,
    ) -> Result<CredentialRecord, StoreError> {
        Err(StoreError::Unavailable("maintenance window".into()))
    }
    async fn revoked_credentials(
        &self,
        _: &RevocationFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".into()))
    }
}

fn request() -> IssuanceRequest {
    IssuanceRequest {
        token_id: "0.0.1234".into(),
        unique_hash: hash_of("ab"),
        content_uri: Some("ipfs://QmDiploma".into()),
        student_name: "Ada Lovelace".into(),
        degree: "MSc Mathematics".into(),
        university: Some("University of London".into()),
        university_id: Some("uol".into()),
        recipient_account: Some("0.0.5555".into()),
    }
}

#[tokio::test]
async fn issue_verify_revoke_verify() {
    let (primary, algorand, xrpl) = mock_rails();
    let orchestrator = orchestrator(&primary, &algorand, &xrpl);
    let store = Arc::new(MemoryStore::new());

    let issuance = IssuanceService::new(
        Arc::clone(&orchestrator),
        Arc::clone(&store) as _,
        "Attesta".into(),
    );
    let issued = issuance.issue(request()).await.unwrap();
    assert_eq!(issued.mint.serial_number, "1");
    assert!(issued.transfer.is_some());
    assert!(issued.record.external_proofs.xrpl_tx_hash.is_some());

    let verifier = OnlineVerifier::new(
        Arc::clone(&primary) as _,
        Arc::clone(&algorand) as _,
        Arc::clone(&xrpl) as _,
        Arc::clone(&store) as _,
    );
    let report = verifier.verify("0.0.1234", "1").await.unwrap();
    assert!(report.valid);
    assert_eq!(report.status, TrustStatus::Active);
    assert_eq!(report.credential.owner_account_id, "0.0.5555");
    // Direct record link is the first proof tier.
    assert_eq!(report.xrpl.unwrap().source, ProofSource::Record);

    let registry = RevocationRegistry::new(Arc::clone(&primary) as _, Arc::clone(&store) as _);
    let revoked = registry
        .revoke("0.0.1234", "1", Some("degree rescinded"))
        .await
        .unwrap();
    assert!(revoked.record_updated);
    assert!(revoked.log.is_some());

    // Second revoke is rejected, and verification reports REVOKED, never a
    // reversion to ACTIVE.
    assert!(matches!(
        registry.revoke("0.0.1234", "1", None).await,
        Err(AnchorError::AlreadyRevoked { .. })
    ));

    let after = verifier.verify("0.0.1234", "1").await.unwrap();
    assert!(!after.valid);
    assert_eq!(after.status, TrustStatus::Revoked);
    assert_eq!(after.revocation_reason.as_deref(), Some("degree rescinded"));
    assert!(!after.credential.valid);

    let listed = registry
        .revocations(&RevocationFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn verification_survives_store_outage() {
    let (primary, algorand, xrpl) = mock_rails();
    let orchestrator = orchestrator(&primary, &algorand, &xrpl);
    let store = Arc::new(MemoryStore::new());

    let issuance = IssuanceService::new(
        Arc::clone(&orchestrator),
        Arc::clone(&store) as _,
        "Attesta".into(),
    );
    issuance.issue(request()).await.unwrap();

    // Same rails, but the verifier's store is down: the answer degrades to
    // UNKNOWN instead of failing closed.
    let verifier = OnlineVerifier::new(
        Arc::clone(&primary) as _,
        Arc::clone(&algorand) as _,
        Arc::clone(&xrpl) as _,
        Arc::new(DownStore),
    );
    let report = verifier.verify("0.0.1234", "1").await.unwrap();
    assert!(report.valid);
    assert_eq!(report.status, TrustStatus::Unknown);
    // Auxiliary proofs still resolve: metadata attributes are the
    // last-resort tier and need no store.
    assert_eq!(report.xrpl.unwrap().source, ProofSource::Metadata);
}

#[tokio::test]
async fn burn_survives_store_outage_on_revoke() {
    let (primary, algorand, xrpl) = mock_rails();
    let orchestrator = orchestrator(&primary, &algorand, &xrpl);
    let store = Arc::new(MemoryStore::new());

    let issuance = IssuanceService::new(
        Arc::clone(&orchestrator),
        Arc::clone(&store) as _,
        "Attesta".into(),
    );
    issuance.issue(request()).await.unwrap();

    // Registry with a broken store: the burn lands, the record lags.
    let registry = RevocationRegistry::new(Arc::clone(&primary) as _, Arc::new(DownStore));
    let outcome = registry.revoke("0.0.1234", "1", None).await.unwrap();
    assert!(!outcome.record_updated);

    // Direct consensus query already shows the credential invalid.
    let verifier = OnlineVerifier::new(
        Arc::clone(&primary) as _,
        Arc::clone(&algorand) as _,
        Arc::clone(&xrpl) as _,
        Arc::clone(&store) as _,
    );
    let report = verifier.verify("0.0.1234", "1").await.unwrap();
    assert!(!report.valid);
    assert!(!report.credential.valid);
}
