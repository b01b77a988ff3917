//! RocksDB storage backend for the Attesta node.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};

use attesta_auth::ApiConsumer;
use attesta_core::{
    AnchorReceipt, CertificateHash, CredentialRecord, CredentialStatus, CredentialStore,
    LedgerId, ReceiptStore, RevocationEvidence, RevocationFilter, StoreError,
};

/// Column family names for different data types.
const CF_CREDENTIALS: &str = "credentials";
const CF_RECEIPTS: &str = "receipts";
const CF_CONSUMERS: &str = "consumers";

fn internal(e: impl std::fmt::Display) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn serialization(e: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(e.to_string())
}

/// RocksDB-backed store for credential records, anchor receipts, and API
/// consumers.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path with column
    /// families.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CREDENTIALS, Options::default()),
            ColumnFamilyDescriptor::new(CF_RECEIPTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_CONSUMERS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Internal(format!("column family '{name}' not found")))
    }

    fn credential_key(token_id: &str, serial_number: &str) -> Vec<u8> {
        format!("{token_id}#{serial_number}").into_bytes()
    }

    /// Receipt keys sort newest-last per (hash, ledger) thanks to the
    /// time-ordered UUID suffix.
    fn receipt_key(receipt: &AnchorReceipt) -> Vec<u8> {
        format!(
            "{}#{}#{}",
            receipt.certificate_hash, receipt.ledger, receipt.id
        )
        .into_bytes()
    }

    fn get_credential_raw(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        let bytes = self
            .db
            .get_cf(cf, Self::credential_key(token_id, serial_number))
            .map_err(internal)?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(serialization)?)),
            None => Ok(None),
        }
    }

    fn put_credential_raw(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        let bytes = serde_json::to_vec(record).map_err(serialization)?;
        self.db
            .put_cf(
                cf,
                Self::credential_key(&record.token_id, &record.serial_number),
                bytes,
            )
            .map_err(internal)
    }

    fn scan_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        let cf = self.cf(CF_CREDENTIALS)?;
        let mut records = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(internal)?;
            records.push(serde_json::from_slice(&value).map_err(serialization)?);
        }
        Ok(records)
    }

    /// Store an API consumer row, keyed by its public prefix.
    pub fn put_consumer(&self, consumer: &ApiConsumer) -> Result<(), StoreError> {
        let cf = self.cf(CF_CONSUMERS)?;
        let bytes = serde_json::to_vec(consumer).map_err(serialization)?;
        self.db
            .put_cf(cf, consumer.key_prefix.as_bytes(), bytes)
            .map_err(internal)
    }

    /// Load every stored API consumer, for gateway registration at startup.
    pub fn load_consumers(&self) -> Result<Vec<ApiConsumer>, StoreError> {
        let cf = self.cf(CF_CONSUMERS)?;
        let mut consumers = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(internal)?;
            consumers.push(serde_json::from_slice(&value).map_err(serialization)?);
        }
        Ok(consumers)
    }
}

#[async_trait]
impl CredentialStore for RocksStore {
    async fn put_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        self.put_credential_raw(record)
    }

    async fn credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        self.get_credential_raw(token_id, serial_number)
    }

    async fn credential_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .scan_credentials()?
            .into_iter()
            .find(|record| &record.unique_hash == hash))
    }

    async fn mark_revoked(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
        evidence: &RevocationEvidence,
    ) -> Result<CredentialRecord, StoreError> {
        let mut record = self
            .get_credential_raw(token_id, serial_number)?
            .unwrap_or_else(|| {
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
        self.put_credential_raw(&record)?;
        Ok(record)
    }

    async fn revoked_credentials(
        &self,
        filter: &RevocationFilter,
    ) -> Result<Vec<CredentialRecord>, StoreError> {
        let mut revoked: Vec<CredentialRecord> = self
            .scan_credentials()?
            .into_iter()
            .filter(|record| record.is_revoked())
            .filter(|record| {
                filter
                    .token_id
                    .as_deref()
                    .map_or(true, |token| record.token_id == token)
            })
            .filter(|record| {
                filter.reason_contains.as_deref().map_or(true, |needle| {
                    record
                        .revocation_reason
                        .as_deref()
                        .unwrap_or_default()
                        .to_ascii_lowercase()
                        .contains(&needle.to_ascii_lowercase())
                })
            })
            .filter(|record| match record.revoked_at {
                Some(at) => {
                    filter.from.map_or(true, |from| at >= from)
                        && filter.to.map_or(true, |to| at <= to)
                }
                None => filter.from.is_none() && filter.to.is_none(),
            })
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
impl ReceiptStore for RocksStore {
    async fn put_receipt(&self, receipt: &AnchorReceipt) -> Result<(), StoreError> {
        let cf = self.cf(CF_RECEIPTS)?;
        let bytes = serde_json::to_vec(receipt).map_err(serialization)?;
        self.db
            .put_cf(cf, Self::receipt_key(receipt), bytes)
            .map_err(internal)
    }

    async fn receipt_by_hash(
        &self,
        ledger: LedgerId,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, StoreError> {
        let cf = self.cf(CF_RECEIPTS)?;
        let prefix = format!("{hash}#{ledger}#");
        let mode = IteratorMode::From(prefix.as_bytes(), Direction::Forward);
        let mut newest = None;
        for entry in self.db.iterator_cf(cf, mode) {
            let (key, value) = entry.map_err(internal)?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            newest = Some(serde_json::from_slice(&value).map_err(serialization)?);
        }
        Ok(newest)
    }

    async fn receipt_by_token_serial(
        &self,
        ledger: LedgerId,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, StoreError> {
        let cf = self.cf(CF_RECEIPTS)?;
        let mut newest: Option<AnchorReceipt> = None;
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(internal)?;
            let receipt: AnchorReceipt = serde_json::from_slice(&value).map_err(serialization)?;
            if receipt.ledger == ledger
                && receipt.token_id.as_deref() == Some(token_id)
                && receipt.serial_number.as_deref() == Some(serial_number)
                && newest
                    .as_ref()
                    .map_or(true, |best| receipt.anchored_at > best.anchored_at)
            {
                newest = Some(receipt);
            }
        }
        Ok(newest)
    }
}
