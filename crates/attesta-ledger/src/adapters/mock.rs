//! In-memory adapter for substitution.
//!
//! Plays any of the three rails, including the consensus role, without
//! touching a network. Failure and disable knobs make the orchestrator's
//! containment behavior and the mock-receipt fallback directly testable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::RwLock;

use attesta_core::{
    AnchorReceipt, AnchorRequest, CertificateHash, LedgerId, MemoryStore, MintMetadata,
    ReceiptStore,
};

use crate::error::LedgerError;
use crate::traits::{
    BurnOutcome, ConsensusLedger, LedgerClient, LogReceipt, MintOutcome, OnLedgerCredential,
    PublishedRoot, RootMeta, TransferOutcome,
};

struct LogEntry {
    log_id: String,
    sequence: u64,
    message: serde_json::Value,
}

pub struct MockLedger {
    ledger: LedgerId,
    network: String,
    log_id: String,
    enabled: AtomicBool,
    fail_submissions: AtomicBool,
    receipts: Arc<MemoryStore>,
    log: RwLock<Vec<LogEntry>>,
    credentials: DashMap<String, OnLedgerCredential>,
    next_serial: AtomicU64,
    next_sequence: AtomicU64,
    next_tx: AtomicU64,
}

impl MockLedger {
    pub fn new(ledger: LedgerId) -> Self {
        Self {
            ledger,
            network: "mocknet".into(),
            log_id: "0.0.7777".into(),
            enabled: AtomicBool::new(true),
            fail_submissions: AtomicBool::new(false),
            receipts: Arc::new(MemoryStore::new()),
            log: RwLock::new(Vec::new()),
            credentials: DashMap::new(),
            next_serial: AtomicU64::new(1),
            next_sequence: AtomicU64::new(1),
            next_tx: AtomicU64::new(1),
        }
    }

    /// Behave like a rail with no credentials configured.
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::Relaxed);
        self
    }

    /// Every submission errors, as if the rail were unreachable mid-call.
    pub fn failing(self) -> Self {
        self.fail_submissions.store(true, Ordering::Relaxed);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_submissions.store(failing, Ordering::Relaxed);
    }

    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// Seed an on-ledger credential directly, for read-path tests.
    pub fn insert_credential(&self, credential: OnLedgerCredential) {
        let key = format!("{}#{}", credential.token_id, credential.serial_number);
        self.credentials.insert(key, credential);
    }

    fn check_submittable(&self) -> Result<(), LedgerError> {
        if self.fail_submissions.load(Ordering::Relaxed) {
            return Err(LedgerError::rpc(self.ledger, "simulated rail failure"));
        }
        Ok(())
    }

    fn next_tx_id(&self) -> String {
        format!(
            "{}-tx-{}",
            self.ledger,
            self.next_tx.fetch_add(1, Ordering::Relaxed)
        )
    }

    fn append_log(&self, message: serde_json::Value) -> LogReceipt {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let tx_id = self.next_tx_id();
        self.log
            .write()
            .expect("mock log lock")
            .push(LogEntry {
                log_id: self.log_id.clone(),
                sequence,
                message,
            });
        LogReceipt {
            log_id: self.log_id.clone(),
            sequence,
            tx_id,
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn ledger_id(&self) -> LedgerId {
        self.ledger
    }

    async fn connect(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    async fn anchor(&self, request: AnchorRequest) -> Result<AnchorReceipt, LedgerError> {
        if !self.is_enabled() {
            let receipt = AnchorReceipt::mock(self.ledger, &self.network, &request);
            self.receipts.put_receipt(&receipt).await?;
            return Ok(receipt);
        }
        self.check_submittable()?;
        let receipt =
            AnchorReceipt::submitted(self.ledger, &self.network, &request, self.next_tx_id());
        self.receipts.put_receipt(&receipt).await?;
        Ok(receipt)
    }

    async fn read_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, LedgerError> {
        Ok(self.receipts.receipt_by_hash(self.ledger, hash).await?)
    }

    async fn read_by_token_serial(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, LedgerError> {
        Ok(self
            .receipts
            .receipt_by_token_serial(self.ledger, token_id, serial_number)
            .await?)
    }
}

#[async_trait]
impl ConsensusLedger for MockLedger {
    async fn mint_credential(
        &self,
        token_id: &str,
        metadata: &MintMetadata,
    ) -> Result<MintOutcome, LedgerError> {
        self.check_submittable()?;
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let mut attributes = vec![
            serde_json::json!({"trait_type": "University", "value": metadata.university}),
            serde_json::json!({"trait_type": "Degree", "value": metadata.degree}),
        ];
        if let Some(tx) = &metadata.external_proofs.xrpl_tx_hash {
            attributes.push(serde_json::json!({"trait_type": "XrplAnchor", "value": tx}));
        }
        if let Some(tx) = &metadata.external_proofs.algorand_tx_id {
            attributes.push(serde_json::json!({"trait_type": "AlgorandAnchor", "value": tx}));
        }
        let credential = OnLedgerCredential {
            token_id: token_id.to_string(),
            serial_number: serial.to_string(),
            owner_account_id: "0.0.2".into(),
            metadata: serde_json::json!({
                "name": format!("{} - {}", metadata.degree, metadata.university),
                "uniqueHash": metadata.unique_hash.as_str(),
                "attributes": attributes,
            }),
            valid: true,
        };
        self.insert_credential(credential);
        Ok(MintOutcome {
            serial_number: serial.to_string(),
            tx_id: self.next_tx_id(),
            metadata_uri: None,
        })
    }

    async fn transfer_credential(
        &self,
        token_id: &str,
        serial_number: &str,
        recipient_account: &str,
    ) -> Result<TransferOutcome, LedgerError> {
        self.check_submittable()?;
        let key = format!("{token_id}#{serial_number}");
        match self.credentials.get_mut(&key) {
            Some(mut credential) => {
                credential.owner_account_id = recipient_account.to_string();
                Ok(TransferOutcome {
                    tx_id: self.next_tx_id(),
                })
            }
            None => Err(LedgerError::NotFound {
                ledger: self.ledger,
                what: format!("credential {key}"),
            }),
        }
    }

    async fn burn_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<BurnOutcome, LedgerError> {
        self.check_submittable()?;
        let key = format!("{token_id}#{serial_number}");
        match self.credentials.get_mut(&key) {
            Some(mut credential) => {
                credential.valid = false;
                Ok(BurnOutcome {
                    tx_id: self.next_tx_id(),
                    new_total_supply: None,
                })
            }
            None => Err(LedgerError::NotFound {
                ledger: self.ledger,
                what: format!("credential {key}"),
            }),
        }
    }

    async fn verify_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<OnLedgerCredential, LedgerError> {
        let key = format!("{token_id}#{serial_number}");
        self.credentials
            .get(&key)
            .map(|credential| credential.clone())
            .ok_or(LedgerError::NotFound {
                ledger: self.ledger,
                what: format!("credential {key}"),
            })
    }

    async fn submit_to_message_log(
        &self,
        root: &CertificateHash,
        meta: &RootMeta,
    ) -> Result<LogReceipt, LedgerError> {
        self.check_submittable()?;
        Ok(self.append_log(serde_json::json!({
            "type": "MERKLE_ROOT",
            "merkleRoot": root.as_str(),
            "count": meta.count,
            "issuer": meta.issuer,
            "timestamp": Utc::now().to_rfc3339(),
        })))
    }

    async fn publish_revocation(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
    ) -> Result<LogReceipt, LedgerError> {
        self.check_submittable()?;
        Ok(self.append_log(serde_json::json!({
            "type": "REVOCATION",
            "tokenId": token_id,
            "serialNumber": serial_number,
            "reason": reason,
            "timestamp": Utc::now().to_rfc3339(),
        })))
    }

    async fn latest_merkle_root(
        &self,
        log_id: &str,
    ) -> Result<Option<PublishedRoot>, LedgerError> {
        let log = self.log.read().expect("mock log lock");
        Ok(log
            .iter()
            .rev()
            .filter(|entry| entry.log_id == log_id)
            .find_map(|entry| {
                let root = entry.message.get("merkleRoot")?.as_str()?;
                (entry.message.get("type")?.as_str()? == "MERKLE_ROOT").then(|| PublishedRoot {
                    merkle_root: root.to_string(),
                    sequence: entry.sequence,
                    consensus_timestamp: None,
                })
            }))
    }
}
