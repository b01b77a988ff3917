//! Consensus rail adapter.
//!
//! Reads go to the public mirror-node REST API; writes (mint, burn,
//! transfer, message-log submissions) go through the operator's signing
//! gateway, which holds the operator key and forwards signed transactions.
//! Without a gateway and operator account the rail reports disabled and
//! anchors degrade to mock receipts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use attesta_core::{
    AnchorReceipt, AnchorRequest, CertificateHash, HederaSettings, LedgerId, MintMetadata,
    ReceiptStore, TimeoutConfig,
};

use crate::error::LedgerError;
use crate::timeout::with_budget;
use crate::traits::{
    BurnOutcome, ConsensusLedger, LedgerClient, LogReceipt, MintOutcome, OnLedgerCredential,
    PublishedRoot, RootMeta, TransferOutcome,
};

const LEDGER: LedgerId = LedgerId::Hedera;

/// Response from the signing gateway for any submitted transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    transaction_id: String,
    #[serde(default)]
    serial_numbers: Vec<u64>,
    topic_sequence_number: Option<u64>,
    total_supply: Option<u64>,
    metadata_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MirrorNft {
    account_id: String,
    #[serde(default)]
    deleted: bool,
    /// Base64 of the on-ledger metadata bytes.
    metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MirrorTopicMessages {
    #[serde(default)]
    messages: Vec<MirrorTopicMessage>,
}

#[derive(Debug, Deserialize)]
struct MirrorTopicMessage {
    message: Option<String>,
    sequence_number: u64,
    consensus_timestamp: Option<String>,
}

pub struct HederaLedger {
    settings: HederaSettings,
    timeouts: TimeoutConfig,
    http: reqwest::Client,
    store: Arc<dyn ReceiptStore>,
    enabled: AtomicBool,
}

impl HederaLedger {
    pub fn new(
        settings: HederaSettings,
        timeouts: TimeoutConfig,
        store: Arc<dyn ReceiptStore>,
    ) -> Self {
        Self {
            settings,
            timeouts,
            http: reqwest::Client::new(),
            store,
            enabled: AtomicBool::new(false),
        }
    }

    fn can_submit(&self) -> bool {
        self.settings.enabled
            && self.settings.gateway_url.is_some()
            && self.settings.operator_account.is_some()
    }

    async fn gateway_submit(
        &self,
        body: serde_json::Value,
    ) -> Result<GatewayResponse, LedgerError> {
        let gateway = self
            .settings
            .gateway_url
            .as_deref()
            .ok_or(LedgerError::Disabled(LEDGER))?;
        let url = format!("{}/transactions", gateway.trim_end_matches('/'));
        let budget = self.timeouts.ledger_budget(LEDGER);
        with_budget(LEDGER, budget, async {
            let response = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| LedgerError::rpc(LEDGER, e))?;
            if !response.status().is_success() {
                return Err(LedgerError::invalid(
                    LEDGER,
                    format!("gateway status {}", response.status()),
                ));
            }
            response
                .json::<GatewayResponse>()
                .await
                .map_err(|e| LedgerError::invalid(LEDGER, e.to_string()))
        })
        .await
    }

    async fn mirror_get(&self, path: &str) -> Result<reqwest::Response, LedgerError> {
        let url = format!("{}{}", self.settings.mirror_url.trim_end_matches('/'), path);
        let budget = self.timeouts.ledger_budget(LEDGER);
        with_budget(LEDGER, budget, async {
            self.http
                .get(&url)
                .send()
                .await
                .map_err(|e| LedgerError::rpc(LEDGER, e))
        })
        .await
    }

    async fn submit_log_message(
        &self,
        message: &serde_json::Value,
    ) -> Result<LogReceipt, LedgerError> {
        let log_id = self
            .settings
            .message_log_id
            .clone()
            .ok_or(LedgerError::Disabled(LEDGER))?;
        let encoded = BASE64.encode(message.to_string().as_bytes());
        let response = self
            .gateway_submit(serde_json::json!({
                "type": "TOPIC_MESSAGE_SUBMIT",
                "topicId": log_id,
                "message": encoded,
            }))
            .await?;
        let sequence = response.topic_sequence_number.ok_or_else(|| {
            LedgerError::invalid(LEDGER, "missing topicSequenceNumber in gateway response")
        })?;
        Ok(LogReceipt {
            log_id,
            sequence,
            tx_id: response.transaction_id,
        })
    }

    fn persist_receipt(&self, receipt: &AnchorReceipt) {
        // Receipt persistence is bookkeeping; anchoring already happened.
        let store = Arc::clone(&self.store);
        let receipt = receipt.clone();
        tokio::spawn(async move {
            if let Err(e) = store.put_receipt(&receipt).await {
                tracing::warn!(ledger = %LEDGER, error = %e, "failed to persist anchor receipt");
            }
        });
    }
}

/// Stable digest identifying the credential subject without exposing it.
fn subject_ref(metadata: &MintMetadata) -> String {
    let graduation = metadata
        .graduation_date
        .map(|d| d.to_rfc3339())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{}|{}|{}|{}",
            metadata.student_name, metadata.degree, metadata.university, graduation
        )
        .as_bytes(),
    );
    hex::encode(hasher.finalize())
}

/// HIP-412-style metadata document minted into the NFT when no content
/// address was supplied by the caller.
fn standardized_metadata(metadata: &MintMetadata) -> serde_json::Value {
    let mut attributes = vec![
        serde_json::json!({"trait_type": "University", "value": metadata.university}),
        serde_json::json!({"trait_type": "Degree", "value": metadata.degree}),
        serde_json::json!({"trait_type": "SubjectRef", "value": subject_ref(metadata)}),
    ];
    if let Some(graduation) = metadata.graduation_date {
        attributes.push(serde_json::json!({
            "trait_type": "Graduation Date",
            "display_type": "date",
            "value": graduation.to_rfc3339(),
        }));
    }
    if let Some(tx) = &metadata.external_proofs.xrpl_tx_hash {
        attributes.push(serde_json::json!({"trait_type": "XrplAnchor", "value": tx}));
    }
    if let Some(tx) = &metadata.external_proofs.algorand_tx_id {
        attributes.push(serde_json::json!({"trait_type": "AlgorandAnchor", "value": tx}));
    }
    serde_json::json!({
        "name": format!("{} - {}", metadata.degree, metadata.university),
        "description": format!("Verifiable academic credential issued by {}.", metadata.university),
        "type": "application/json",
        "format": "HIP412@2.0.0",
        "uniqueHash": metadata.unique_hash.as_str(),
        "attributes": attributes,
        "properties": {
            "issuedDate": Utc::now().to_rfc3339(),
            "schemaVersion": "1.0",
        },
    })
}

fn decode_nft_metadata(raw: Option<&str>) -> Result<serde_json::Value, LedgerError> {
    let Some(encoded) = raw else {
        return Ok(serde_json::Value::Null);
    };
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| LedgerError::invalid(LEDGER, format!("metadata base64: {e}")))?;
    let text = String::from_utf8_lossy(&bytes).to_string();
    if text.starts_with("ipfs://") {
        return Ok(serde_json::json!({ "uri": text }));
    }
    serde_json::from_str(&text)
        .map_err(|e| LedgerError::invalid(LEDGER, format!("metadata json: {e}")))
}

#[async_trait]
impl LedgerClient for HederaLedger {
    fn ledger_id(&self) -> LedgerId {
        LEDGER
    }

    async fn connect(&self) -> bool {
        let enabled = self.can_submit();
        if !enabled {
            tracing::warn!(
                "hedera credentials or gateway missing; submissions disabled, reads remain available"
            );
        } else {
            tracing::info!(network = %self.settings.network, "hedera client initialized");
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        enabled
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    async fn anchor(&self, request: AnchorRequest) -> Result<AnchorReceipt, LedgerError> {
        if !self.is_enabled() {
            let receipt = AnchorReceipt::mock(LEDGER, &self.settings.network, &request);
            self.persist_receipt(&receipt);
            return Ok(receipt);
        }

        let message = serde_json::json!({
            "type": request.title.clone().unwrap_or_else(|| "HASH_ANCHOR".into()),
            "certificateHash": request.certificate_hash.as_str(),
            "tokenId": request.token_id,
            "serialNumber": request.serial_number,
            "issuer": request.issuer,
            "cid": request.content_cid,
            "timestamp": Utc::now().to_rfc3339(),
            "format": "ACAD@1.0",
        });
        let log = self.submit_log_message(&message).await?;

        let mut receipt = AnchorReceipt::submitted(
            LEDGER,
            &self.settings.network,
            &request,
            log.tx_id.clone(),
        );
        receipt.log_id = Some(log.log_id);
        receipt.log_sequence = Some(log.sequence);
        self.persist_receipt(&receipt);
        Ok(receipt)
    }

    async fn read_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, LedgerError> {
        Ok(self.store.receipt_by_hash(LEDGER, hash).await?)
    }

    async fn read_by_token_serial(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, LedgerError> {
        Ok(self
            .store
            .receipt_by_token_serial(LEDGER, token_id, serial_number)
            .await?)
    }
}

#[async_trait]
impl ConsensusLedger for HederaLedger {
    async fn mint_credential(
        &self,
        token_id: &str,
        metadata: &MintMetadata,
    ) -> Result<MintOutcome, LedgerError> {
        if !self.is_enabled() {
            return Err(LedgerError::Disabled(LEDGER));
        }
        let on_chain = match &metadata.content_uri {
            Some(uri) => serde_json::json!({ "uri": uri }),
            None => standardized_metadata(metadata),
        };
        let response = self
            .gateway_submit(serde_json::json!({
                "type": "TOKEN_MINT",
                "tokenId": token_id,
                "metadata": BASE64.encode(on_chain.to_string().as_bytes()),
            }))
            .await?;
        let serial = response
            .serial_numbers
            .first()
            .copied()
            .ok_or_else(|| LedgerError::invalid(LEDGER, "mint returned no serials"))?;
        tracing::info!(token_id, serial, "credential minted");
        Ok(MintOutcome {
            serial_number: serial.to_string(),
            tx_id: response.transaction_id,
            metadata_uri: response.metadata_uri,
        })
    }

    async fn transfer_credential(
        &self,
        token_id: &str,
        serial_number: &str,
        recipient_account: &str,
    ) -> Result<TransferOutcome, LedgerError> {
        if !self.is_enabled() {
            return Err(LedgerError::Disabled(LEDGER));
        }
        let response = self
            .gateway_submit(serde_json::json!({
                "type": "NFT_TRANSFER",
                "tokenId": token_id,
                "serialNumber": serial_number,
                "recipientAccountId": recipient_account,
            }))
            .await?;
        tracing::info!(token_id, serial_number, recipient_account, "credential transferred");
        Ok(TransferOutcome {
            tx_id: response.transaction_id,
        })
    }

    async fn burn_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<BurnOutcome, LedgerError> {
        if !self.is_enabled() {
            return Err(LedgerError::Disabled(LEDGER));
        }
        let response = self
            .gateway_submit(serde_json::json!({
                "type": "TOKEN_BURN",
                "tokenId": token_id,
                "serials": [serial_number],
            }))
            .await?;
        tracing::info!(token_id, serial_number, "credential burned");
        Ok(BurnOutcome {
            tx_id: response.transaction_id,
            new_total_supply: response.total_supply,
        })
    }

    async fn verify_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<OnLedgerCredential, LedgerError> {
        let response = self
            .mirror_get(&format!("/api/v1/tokens/{token_id}/nfts/{serial_number}"))
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound {
                ledger: LEDGER,
                what: format!("credential {token_id}#{serial_number}"),
            });
        }
        if !response.status().is_success() {
            return Err(LedgerError::invalid(
                LEDGER,
                format!("mirror status {}", response.status()),
            ));
        }
        let nft: MirrorNft = response
            .json()
            .await
            .map_err(|e| LedgerError::invalid(LEDGER, e.to_string()))?;
        let metadata = decode_nft_metadata(nft.metadata.as_deref())?;
        Ok(OnLedgerCredential {
            token_id: token_id.to_string(),
            serial_number: serial_number.to_string(),
            owner_account_id: nft.account_id,
            metadata,
            valid: !nft.deleted,
        })
    }

    async fn submit_to_message_log(
        &self,
        root: &CertificateHash,
        meta: &RootMeta,
    ) -> Result<LogReceipt, LedgerError> {
        let message = serde_json::json!({
            "type": "MERKLE_ROOT",
            "merkleRoot": root.as_str(),
            "count": meta.count,
            "issuer": meta.issuer,
            "timestamp": Utc::now().to_rfc3339(),
        });
        let receipt = self.submit_log_message(&message).await?;
        tracing::info!(root = %root, sequence = receipt.sequence, "merkle root published");
        Ok(receipt)
    }

    async fn publish_revocation(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
    ) -> Result<LogReceipt, LedgerError> {
        let message = serde_json::json!({
            "type": "REVOCATION",
            "tokenId": token_id,
            "serialNumber": serial_number,
            "reason": reason,
            "timestamp": Utc::now().to_rfc3339(),
        });
        self.submit_log_message(&message).await
    }

    async fn latest_merkle_root(
        &self,
        log_id: &str,
    ) -> Result<Option<PublishedRoot>, LedgerError> {
        let response = self
            .mirror_get(&format!(
                "/api/v1/topics/{log_id}/messages?limit=50&order=desc"
            ))
            .await?;
        if !response.status().is_success() {
            return Err(LedgerError::invalid(
                LEDGER,
                format!("mirror status {}", response.status()),
            ));
        }
        let page: MirrorTopicMessages = response
            .json()
            .await
            .map_err(|e| LedgerError::invalid(LEDGER, e.to_string()))?;

        for entry in page.messages {
            let Some(encoded) = entry.message else { continue };
            let Ok(bytes) = BASE64.decode(encoded.as_bytes()) else {
                continue;
            };
            let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
                continue;
            };
            if value.get("type").and_then(|t| t.as_str()) == Some("MERKLE_ROOT") {
                if let Some(root) = value.get("merkleRoot").and_then(|r| r.as_str()) {
                    return Ok(Some(PublishedRoot {
                        merkle_root: root.to_string(),
                        sequence: entry.sequence_number,
                        consensus_timestamp: entry.consensus_timestamp,
                    }));
                }
            }
        }
        Ok(None)
    }
}
