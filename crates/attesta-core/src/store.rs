use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::StoreError;
use crate::status::CredentialStatus;
use crate::types::{AnchorReceipt, CertificateHash, CredentialRecord, LedgerId};

/// Ledger evidence attached to a revocation when the record is marked.
#[derive(Debug, Clone, Default)]
pub struct RevocationEvidence {
    pub tx_id: Option<String>,
    pub log_id: Option<String>,
    pub log_sequence: Option<u64>,
}

/// Filter for listing revoked credentials.
#[derive(Debug, Clone)]
pub struct RevocationFilter {
    pub token_id: Option<String>,
    pub reason_contains: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for RevocationFilter {
    fn default() -> Self {
        Self {
            token_id: None,
            reason_contains: None,
            from: None,
            to: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Persistent store for credential records.
///
/// Implementations must tolerate being unreachable: callers on the
/// verification path treat `StoreError::Unavailable` as a degrade signal,
/// never as a hard failure.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<(), StoreError>;

    async fn credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<CredentialRecord>, StoreError>;

    async fn credential_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<CredentialRecord>, StoreError>;

    /// Mark a credential revoked, upserting a stub record when the
    /// credential was issued before this store existed. Returns the record
    /// as stored.
    async fn mark_revoked(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
        evidence: &RevocationEvidence,
    ) -> Result<CredentialRecord, StoreError>;

    async fn revoked_credentials(
        &self,
        filter: &RevocationFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError>;
}

/// Append-only store for anchor receipts, newest-first on lookup.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn put_receipt(&self, receipt: &AnchorReceipt) -> Result<(), StoreError>;

    async fn receipt_by_hash(
        &self,
        ledger: LedgerId,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, StoreError>;

    async fn receipt_by_token_serial(
        &self,
        ledger: LedgerId,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, StoreError>;
}

fn credential_key(token_id: &str, serial_number: &str) -> String {
    format!("{token_id}#{serial_number}")
}

/// In-memory store for tests and store-less deployments.
#[derive(Default)]
pub struct MemoryStore {
    credentials: DashMap<String, CredentialRecord>,
    receipts: DashMap<String, Vec<AnchorReceipt>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        self.credentials.insert(
            credential_key(&record.token_id, &record.serial_number),
            record.clone(),
        );
        Ok(())
    }

    async fn credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .credentials
            .get(&credential_key(token_id, serial_number))
            .map(|entry| entry.clone()))
    }

    async fn credential_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .credentials
            .iter()
            .find(|entry| &entry.unique_hash == hash)
            .map(|entry| entry.clone()))
    }

    async fn mark_revoked(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
        evidence: &RevocationEvidence,
    ) -> Result<CredentialRecord, StoreError> {
        let key = credential_key(token_id, serial_number);
        let mut record = self
            .credentials
            .get(&key)
            .map(|entry| entry.clone())
            .unwrap_or_else(|| {
                // Stub for credentials issued before this store existed.
                CredentialRecord::new(
                    token_id.to_string(),
                    serial_number.to_string(),
                    CertificateHash::zero(),
                )
            });
        record.status = CredentialStatus::Revoked;
        record.revocation_reason = reason.map(str::to_string);
        record.revoked_at = Some(Utc::now());
        record.revocation_tx_id = evidence.tx_id.clone();
        record.revocation_log_sequence = evidence.log_sequence;
        self.credentials.insert(key, record.clone());
        Ok(record)
    }

    async fn revoked_credentials(
        &self,
        filter: &RevocationFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        let mut revoked: Vec<CredentialRecord> = self
            .credentials
            .iter()
            .filter(|entry| entry.is_revoked())
            .filter(|entry| {
                filter
                    .token_id
                    .as_deref()
                    .map_or(true, |token| entry.token_id == token)
            })
            .filter(|entry| {
                filter.reason_contains.as_deref().map_or(true, |needle| {
                    entry
                        .revocation_reason
                        .as_deref()
                        .unwrap_or_default()
                        .to_ascii_lowercase()
                        .contains(&needle.to_ascii_lowercase())
                })
            })
            .filter(|entry| match entry.revoked_at {
                Some(at) => {
                    filter.from.map_or(true, |from| at >= from)
                        && filter.to.map_or(true, |to| at <= to)
                }
                None => filter.from.is_none() && filter.to.is_none(),
            })
            .map(|entry| entry.clone())
            .collect();
        revoked.sort_by(|a, b| b.revoked_at.cmp(&a.revoked_at));
        Ok(revoked
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn put_receipt(&self, receipt: &AnchorReceipt) -> Result<(), StoreError> {
        self.receipts
            .entry(receipt.certificate_hash.as_str().to_string())
            .or_default()
            .push(receipt.clone());
        Ok(())
    }

    async fn receipt_by_hash(
        &self,
        ledger: LedgerId,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, StoreError> {
        Ok(self.receipts.get(hash.as_str()).and_then(|receipts| {
            receipts
                .iter()
                .rev()
                .find(|receipt| receipt.ledger == ledger)
                .cloned()
        }))
    }

    async fn receipt_by_token_serial(
        &self,
        ledger: LedgerId,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, StoreError> {
        for entry in self.receipts.iter() {
            if let Some(receipt) = entry.iter().rev().find(|receipt| {
                receipt.ledger == ledger
                    && receipt.token_id.as_deref() == Some(token_id)
                    && receipt.serial_number.as_deref() == Some(serial_number)
            }) {
                return Ok(Some(receipt.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnchorStatus;
    use uuid::Uuid;

    fn sample_hash(byte: &str) -> CertificateHash {
        CertificateHash::parse(&byte.repeat(32)).unwrap()
    }

    fn sample_receipt(ledger: LedgerId, hash: &CertificateHash, tx: &str) -> AnchorReceipt {
        AnchorReceipt {
            id: Uuid::now_v7(),
            ledger,
            certificate_hash: hash.clone(),
            token_id: Some("0.0.1234".into()),
            serial_number: Some("1".into()),
            log_id: None,
            log_sequence: None,
            tx_id: Some(tx.into()),
            network: "testnet".into(),
            status: AnchorStatus::Submitted,
            anchored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_and_get_credential() {
        let store = MemoryStore::new();
        let record = CredentialRecord::new("0.0.1234".into(), "1".into(), sample_hash("ab"));
        store.put_credential(&record).await.unwrap();

        let found = store.credential("0.0.1234", "1").await.unwrap().unwrap();
        assert_eq!(found.unique_hash, record.unique_hash);
        assert!(store.credential("0.0.1234", "2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn credential_by_hash() {
        let store = MemoryStore::new();
        let hash = sample_hash("cd");
        let record = CredentialRecord::new("0.0.1234".into(), "7".into(), hash.clone());
        store.put_credential(&record).await.unwrap();

        let found = store.credential_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(found.serial_number, "7");
    }

    #[tokio::test]
    async fn mark_revoked_updates_existing() {
        let store = MemoryStore::new();
        let record = CredentialRecord::new("0.0.1234".into(), "1".into(), sample_hash("ab"));
        store.put_credential(&record).await.unwrap();

        let revoked = store
            .mark_revoked(
                "0.0.1234",
                "1",
                Some("degree rescinded"),
                &RevocationEvidence {
                    tx_id: Some("0.0.9@1700000000.0".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(revoked.is_revoked());
        assert_eq!(revoked.revocation_reason.as_deref(), Some("degree rescinded"));
        assert!(revoked.revoked_at.is_some());
    }

    #[tokio::test]
    async fn mark_revoked_upserts_stub() {
        let store = MemoryStore::new();
        let revoked = store
            .mark_revoked("0.0.9999", "3", None, &RevocationEvidence::default())
            .await
            .unwrap();
        assert!(revoked.is_revoked());
        assert_eq!(revoked.token_id, "0.0.9999");
    }

    #[tokio::test]
    async fn revoked_listing_filters_and_pages() {
        let store = MemoryStore::new();
        for serial in ["1", "2", "3"] {
            let record =
                CredentialRecord::new("0.0.1234".into(), serial.into(), sample_hash("ab"));
            store.put_credential(&record).await.unwrap();
            store
                .mark_revoked(
                    "0.0.1234",
                    serial,
                    Some("fraud investigation"),
                    &RevocationEvidence::default(),
                )
                .await
                .unwrap();
        }

        let all = store
            .revoked_credentials(&RevocationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let filtered = store
            .revoked_credentials(&RevocationFilter {
                reason_contains: Some("FRAUD".into()),
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);

        let none = store
            .revoked_credentials(&RevocationFilter {
                token_id: Some("0.0.5555".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn receipt_lookup_is_newest_first_per_ledger() {
        let store = MemoryStore::new();
        let hash = sample_hash("ef");
        store
            .put_receipt(&sample_receipt(LedgerId::Xrpl, &hash, "tx-old"))
            .await
            .unwrap();
        store
            .put_receipt(&sample_receipt(LedgerId::Xrpl, &hash, "tx-new"))
            .await
            .unwrap();
        store
            .put_receipt(&sample_receipt(LedgerId::Algorand, &hash, "algo-1"))
            .await
            .unwrap();

        let latest = store
            .receipt_by_hash(LedgerId::Xrpl, &hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.tx_id.as_deref(), Some("tx-new"));

        let by_serial = store
            .receipt_by_token_serial(LedgerId::Algorand, "0.0.1234", "1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_serial.tx_id.as_deref(), Some("algo-1"));
    }
}
