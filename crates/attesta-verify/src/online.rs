use std::sync::Arc;

use serde::Serialize;

use attesta_core::{CredentialRecord, CredentialStore, LedgerId, TrustStatus};
use attesta_ledger::{ConsensusLedger, LedgerClient, LedgerError, OnLedgerCredential};

use crate::error::VerifyError;

/// Where an auxiliary proof reference was resolved from.
///
/// Three sources exist because anchors were written at different points in
/// the system's evolution: a direct record link, a live receipt lookup, or
/// an attribute embedded in the NFT metadata. All three are read for
/// backward compatibility; new issuances always populate the record link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofSource {
    Record,
    LiveLookup,
    Metadata,
}

/// A resolved auxiliary anchor reference.
#[derive(Debug, Clone, Serialize)]
pub struct AuxAnchorRef {
    pub tx_id: String,
    pub source: ProofSource,
}

/// Online verification result.
///
/// `valid` answers the cryptographic/ledger question; `status` answers the
/// administrative one and degrades to `Unknown` when the store cannot be
/// consulted — the two are never conflated.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub valid: bool,
    pub status: TrustStatus,
    pub credential: OnLedgerCredential,
    pub revocation_reason: Option<String>,
    pub xrpl: Option<AuxAnchorRef>,
    pub algorand: Option<AuxAnchorRef>,
}

/// Ownership check on top of online verification.
#[derive(Debug, Clone, Serialize)]
pub struct OwnershipReport {
    pub valid: bool,
    pub is_owner: bool,
    pub owner_account_id: String,
}

/// Verifies credentials by querying the consensus rail, consulting the
/// persistent store for revocation status, and resolving auxiliary anchors
/// through a three-tier fallback.
pub struct OnlineVerifier {
    primary: Arc<dyn ConsensusLedger>,
    algorand: Arc<dyn LedgerClient>,
    xrpl: Arc<dyn LedgerClient>,
    store: Arc<dyn CredentialStore>,
}

impl OnlineVerifier {
    pub fn new(
        primary: Arc<dyn ConsensusLedger>,
        algorand: Arc<dyn LedgerClient>,
        xrpl: Arc<dyn LedgerClient>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            primary,
            algorand,
            xrpl,
            store,
        }
    }

    pub async fn verify(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<VerificationReport, VerifyError> {
        let credential = match self.primary.verify_credential(token_id, serial_number).await {
            Ok(credential) => credential,
            Err(LedgerError::NotFound { .. }) => {
                return Err(VerifyError::NotFound {
                    token_id: token_id.to_string(),
                    serial_number: serial_number.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        // Store down means "cannot corroborate", never "fail closed":
        // public trust-checking stays available when the admin store is not.
        let (record, status, revocation_reason) =
            match self.store.credential(token_id, serial_number).await {
                Ok(Some(record)) => {
                    let status = TrustStatus::from(record.status);
                    let reason = record.revocation_reason.clone();
                    (Some(record), status, reason)
                }
                Ok(None) => (None, TrustStatus::Unknown, None),
                Err(e) => {
                    tracing::warn!(error = %e, "store unavailable, degrading to unknown status");
                    (None, TrustStatus::Unknown, None)
                }
            };

        let valid = credential.valid && status != TrustStatus::Revoked;

        let xrpl = self
            .resolve_aux(LedgerId::Xrpl, &self.xrpl, record.as_ref(), &credential)
            .await;
        let algorand = self
            .resolve_aux(
                LedgerId::Algorand,
                &self.algorand,
                record.as_ref(),
                &credential,
            )
            .await;

        Ok(VerificationReport {
            valid,
            status,
            credential,
            revocation_reason,
            xrpl,
            algorand,
        })
    }

    pub async fn verify_ownership(
        &self,
        token_id: &str,
        serial_number: &str,
        account_id: &str,
    ) -> Result<OwnershipReport, VerifyError> {
        let report = self.verify(token_id, serial_number).await?;
        Ok(OwnershipReport {
            valid: report.valid,
            is_owner: report.valid && report.credential.owner_account_id == account_id,
            owner_account_id: report.credential.owner_account_id,
        })
    }

    /// Three-tier auxiliary proof resolution: direct record link, then live
    /// receipt lookup, then metadata-embedded attribute.
    async fn resolve_aux(
        &self,
        ledger: LedgerId,
        rail: &Arc<dyn LedgerClient>,
        record: Option<&CredentialRecord>,
        credential: &OnLedgerCredential,
    ) -> Option<AuxAnchorRef> {
        if let Some(record) = record {
            let direct = match ledger {
                LedgerId::Xrpl => record.external_proofs.xrpl_tx_hash.clone(),
                LedgerId::Algorand => record.external_proofs.algorand_tx_id.clone(),
                LedgerId::Hedera => None,
            };
            if let Some(tx_id) = direct {
                return Some(AuxAnchorRef {
                    tx_id,
                    source: ProofSource::Record,
                });
            }
        }

        let live = match record {
            Some(record) => rail.read_by_hash(&record.unique_hash).await,
            None => {
                rail.read_by_token_serial(&credential.token_id, &credential.serial_number)
                    .await
            }
        };
        match live {
            Ok(Some(receipt)) => {
                if let Some(tx_id) = receipt.tx_id {
                    return Some(AuxAnchorRef {
                        tx_id,
                        source: ProofSource::LiveLookup,
                    });
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(ledger = %ledger, error = %e, "auxiliary receipt lookup failed");
            }
        }

        metadata_anchor(&credential.metadata, ledger).map(|tx_id| AuxAnchorRef {
            tx_id,
            source: ProofSource::Metadata,
        })
    }
}

/// Last-resort source: proof attributes embedded in the NFT metadata.
fn metadata_anchor(metadata: &serde_json::Value, ledger: LedgerId) -> Option<String> {
    let wanted = match ledger {
        LedgerId::Xrpl => "XrplAnchor",
        LedgerId::Algorand => "AlgorandAnchor",
        LedgerId::Hedera => return None,
    };
    metadata
        .get("attributes")?
        .as_array()?
        .iter()
        .find(|attribute| attribute.get("trait_type").and_then(|t| t.as_str()) == Some(wanted))
        .and_then(|attribute| attribute.get("value")?.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attesta_core::{
        AnchorRequest, CertificateHash, MemoryStore, MintMetadata, RevocationEvidence,
        StoreError,
    };
    use attesta_ledger::MockLedger;

    struct FailingStore;

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn put_credential(&self, _: &CredentialRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("store offline".into()))
        }
        async fn credential(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<CredentialRecord>, StoreError> {
            Err(StoreError::Unavailable("store offline".into()))
        }
        async fn credential_by_hash(
            &self,
            _: &CertificateHash,
        ) -> Result<Option<CredentialRecord>, StoreError> {
            Err(StoreError::Unavailable("store offline".into()))
        }
        async fn mark_revoked(
            &self,
            _: &str,
            _: &str,
            _: Option<&str>,
            _: &RevocationEvidence,
        ) -> Result<CredentialRecord, StoreError> {
            Err(StoreError::Unavailable("store offline".into()))
        }
        async fn revoked_credentials(
            &self,
            _: &attesta_core::RevocationFilter,
        ) -> Result<Vec<CredentialRecord>, StoreError> {
            Err(StoreError::Unavailable("store offline".into()))
        }
    }

    fn hash() -> CertificateHash {
        CertificateHash::parse(&"ab".repeat(32)).unwrap()
    }

    fn metadata(proofs: attesta_core::ExternalProofs) -> MintMetadata {
        MintMetadata {
            unique_hash: hash(),
            student_name: "Ada".into(),
            degree: "MSc".into(),
            university: "UCL".into(),
            content_uri: None,
            graduation_date: None,
            external_proofs: proofs,
        }
    }

    async fn minted(
        primary: &MockLedger,
        proofs: attesta_core::ExternalProofs,
    ) -> CredentialRecord {
        let mint = primary
            .mint_credential("0.0.1234", &metadata(proofs.clone()))
            .await
            .unwrap();
        let mut record = CredentialRecord::new("0.0.1234".into(), mint.serial_number, hash());
        record.external_proofs = proofs;
        record
    }

    fn verifier(
        primary: Arc<MockLedger>,
        algorand: Arc<MockLedger>,
        xrpl: Arc<MockLedger>,
        store: Arc<dyn CredentialStore>,
    ) -> OnlineVerifier {
        OnlineVerifier::new(primary, algorand, xrpl, store)
    }

    #[tokio::test]
    async fn active_credential_verifies_with_record_proofs() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        let store = Arc::new(MemoryStore::new());
        let proofs = attesta_core::ExternalProofs {
            xrpl_tx_hash: Some("XRPL-TX".into()),
            algorand_tx_id: Some("ALGO-TX".into()),
        };
        let record = minted(&primary, proofs).await;
        store.put_credential(&record).await.unwrap();

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            store,
        );
        let report = verifier.verify("0.0.1234", "1").await.unwrap();

        assert!(report.valid);
        assert_eq!(report.status, TrustStatus::Active);
        let xrpl = report.xrpl.unwrap();
        assert_eq!(xrpl.tx_id, "XRPL-TX");
        assert_eq!(xrpl.source, ProofSource::Record);
    }

    #[tokio::test]
    async fn store_down_degrades_to_unknown_not_error() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        minted(&primary, Default::default()).await;

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            Arc::new(FailingStore),
        );
        let report = verifier.verify("0.0.1234", "1").await.unwrap();

        assert!(report.valid);
        assert_eq!(report.status, TrustStatus::Unknown);
    }

    #[tokio::test]
    async fn revoked_record_reports_revoked_and_invalid() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        let store = Arc::new(MemoryStore::new());
        let record = minted(&primary, Default::default()).await;
        store.put_credential(&record).await.unwrap();
        store
            .mark_revoked(
                "0.0.1234",
                "1",
                Some("rescinded"),
                &RevocationEvidence::default(),
            )
            .await
            .unwrap();

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            store,
        );
        let report = verifier.verify("0.0.1234", "1").await.unwrap();

        assert!(!report.valid);
        assert_eq!(report.status, TrustStatus::Revoked);
        assert_eq!(report.revocation_reason.as_deref(), Some("rescinded"));
    }

    #[tokio::test]
    async fn live_lookup_is_second_tier() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        let xrpl = Arc::new(MockLedger::new(LedgerId::Xrpl));
        let store = Arc::new(MemoryStore::new());

        // Record exists but carries no direct link; the rail has a receipt.
        let record = minted(&primary, Default::default()).await;
        store.put_credential(&record).await.unwrap();
        xrpl.anchor(AnchorRequest::for_hash(hash())).await.unwrap();

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::clone(&xrpl),
            store,
        );
        let report = verifier.verify("0.0.1234", "1").await.unwrap();

        let anchor = report.xrpl.unwrap();
        assert_eq!(anchor.source, ProofSource::LiveLookup);
    }

    #[tokio::test]
    async fn metadata_attribute_is_last_resort() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        // Proofs embedded at mint time, no record, no live receipts.
        minted(
            &primary,
            attesta_core::ExternalProofs {
                xrpl_tx_hash: Some("EMBEDDED-TX".into()),
                algorand_tx_id: None,
            },
        )
        .await;

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            Arc::new(MemoryStore::new()),
        );
        let report = verifier.verify("0.0.1234", "1").await.unwrap();

        let anchor = report.xrpl.unwrap();
        assert_eq!(anchor.tx_id, "EMBEDDED-TX");
        assert_eq!(anchor.source, ProofSource::Metadata);
    }

    #[tokio::test]
    async fn unknown_credential_is_not_found() {
        let verifier = verifier(
            Arc::new(MockLedger::new(LedgerId::Hedera)),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            Arc::new(MemoryStore::new()),
        );
        let result = verifier.verify("0.0.9999", "1").await;
        assert!(matches!(result, Err(VerifyError::NotFound { .. })));
    }

    #[tokio::test]
    async fn ownership_check() {
        let primary = Arc::new(MockLedger::new(LedgerId::Hedera));
        let store = Arc::new(MemoryStore::new());
        let record = minted(&primary, Default::default()).await;
        store.put_credential(&record).await.unwrap();
        primary
            .transfer_credential("0.0.1234", "1", "0.0.5555")
            .await
            .unwrap();

        let verifier = verifier(
            Arc::clone(&primary),
            Arc::new(MockLedger::new(LedgerId::Algorand)),
            Arc::new(MockLedger::new(LedgerId::Xrpl)),
            store,
        );
        let owned = verifier
            .verify_ownership("0.0.1234", "1", "0.0.5555")
            .await
            .unwrap();
        assert!(owned.is_owner);

        let not_owned = verifier
            .verify_ownership("0.0.1234", "1", "0.0.6666")
            .await
            .unwrap();
        assert!(!not_owned.is_owner);
    }
}
