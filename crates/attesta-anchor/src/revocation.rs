use std::sync::Arc;

use serde::Serialize;

use attesta_core::{
    CredentialStatus, CredentialStore, RevocationEvidence, RevocationFilter, StoreError,
};
use attesta_ledger::{BurnOutcome, ConsensusLedger, LedgerError, LogReceipt};

use crate::error::AnchorError;

/// Result of a revocation: burn evidence plus whatever bookkeeping
/// succeeded after it.
#[derive(Debug, Clone, Serialize)]
pub struct RevocationOutcome {
    pub token_id: String,
    pub serial_number: String,
    pub status: CredentialStatus,
    pub burn: BurnOutcome,
    /// Revocation event on the consensus message log, when it landed.
    pub log: Option<LogReceipt>,
    /// Whether the persistent record was updated. A burn with a lagging
    /// record is inconsistent-but-safe: direct consensus queries already
    /// show the credential invalid.
    pub record_updated: bool,
}

/// One row of the revocation listing.
#[derive(Debug, Clone, Serialize)]
pub struct RevocationEntry {
    pub token_id: String,
    pub serial_number: String,
    pub status: CredentialStatus,
    pub revocation_reason: Option<String>,
    pub revoked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub revocation_tx_id: Option<String>,
}

/// Marks credentials inactive: burn on the consensus rail first, then the
/// persistent record. The burn is irreversible and is never rolled back on
/// a later bookkeeping failure.
pub struct RevocationRegistry {
    primary: Arc<dyn ConsensusLedger>,
    store: Arc<dyn CredentialStore>,
}

impl RevocationRegistry {
    pub fn new(primary: Arc<dyn ConsensusLedger>, store: Arc<dyn CredentialStore>) -> Self {
        Self { primary, store }
    }

    /// Revoke a credential. Idempotent at the API boundary: a second revoke
    /// of the same credential is `AlreadyRevoked`, not success.
    pub async fn revoke(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
    ) -> Result<RevocationOutcome, AnchorError> {
        match self.store.credential(token_id, serial_number).await {
            Ok(Some(record)) if record.is_revoked() => {
                return Err(AnchorError::AlreadyRevoked {
                    token_id: token_id.to_string(),
                    serial_number: serial_number.to_string(),
                });
            }
            Ok(_) => {}
            // With the store down the idempotency guard cannot run; the
            // burn itself still rejects an already-burned credential.
            Err(e) => {
                tracing::warn!(error = %e, "store unavailable for revocation guard");
            }
        }

        let burn = match self.primary.burn_credential(token_id, serial_number).await {
            Ok(burn) => burn,
            Err(LedgerError::NotFound { .. }) => {
                return Err(AnchorError::NotFound {
                    token_id: token_id.to_string(),
                    serial_number: serial_number.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let log = match self
            .primary
            .publish_revocation(token_id, serial_number, reason)
            .await
        {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                tracing::warn!(error = %e, "revocation event not published to message log");
                None
            }
        };

        let evidence = RevocationEvidence {
            tx_id: Some(burn.tx_id.clone()),
            log_id: log.as_ref().map(|l| l.log_id.clone()),
            log_sequence: log.as_ref().map(|l| l.sequence),
        };
        let record_updated = match self
            .store
            .mark_revoked(token_id, serial_number, reason, &evidence)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                // Ledger truth already changed; the record catches up later.
                tracing::warn!(
                    token_id,
                    serial_number,
                    error = %e,
                    "credential burned but record not updated"
                );
                false
            }
        };

        tracing::info!(token_id, serial_number, reason, "credential revoked");

        Ok(RevocationOutcome {
            token_id: token_id.to_string(),
            serial_number: serial_number.to_string(),
            status: CredentialStatus::Revoked,
            burn,
            log,
            record_updated,
        })
    }

    /// List revoked credentials, newest first.
    pub async fn revocations(
        &self,
        filter: &RevocationFilter,
    ) -> Result<Vec<RevocationEntry>, StoreError> {
        let records = self.store.revoked_credentials(filter).await?;
        Ok(records
            .into_iter()
            .map(|record| RevocationEntry {
                token_id: record.token_id,
                serial_number: record.serial_number,
                status: record.status,
                revocation_reason: record.revocation_reason,
                revoked_at: record.revoked_at,
                revocation_tx_id: record.revocation_tx_id,
            })
            .collect())
    }
}
