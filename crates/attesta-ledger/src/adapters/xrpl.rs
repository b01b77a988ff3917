//! Auxiliary rail B adapter.
//!
//! Anchors are minimal-drops payments carrying the certificate hash in a
//! hex-encoded `ACAD` memo. Same signing-gateway discipline as the other
//! rails; reads resolve from the receipt store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use attesta_core::{
    AnchorReceipt, AnchorRequest, CertificateHash, LedgerId, ReceiptStore, TimeoutConfig,
    XrplSettings,
};

use crate::error::LedgerError;
use crate::timeout::with_budget;
use crate::traits::LedgerClient;

const LEDGER: LedgerId = LedgerId::Xrpl;
const MEMO_TYPE: &str = "ACAD";
const MEMO_FORMAT: &str = "application/json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    hash: String,
}

pub struct XrplLedger {
    settings: XrplSettings,
    timeouts: TimeoutConfig,
    http: reqwest::Client,
    store: Arc<dyn ReceiptStore>,
    enabled: AtomicBool,
}

impl XrplLedger {
    pub fn new(
        settings: XrplSettings,
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

    /// XRPL memos travel as uppercase hex of their UTF-8 bytes.
    fn memo(&self, request: &AnchorRequest) -> serde_json::Value {
        let payload = serde_json::json!({
            "certificateHash": request.certificate_hash.as_str(),
            "tokenId": request.token_id,
            "serialNumber": request.serial_number,
            "logId": request.log_id,
            "logSequence": request.log_sequence,
            "title": request.title,
            "issuer": request.issuer,
            "timestamp": Utc::now().to_rfc3339(),
            "format": "ACAD@1.0",
        });
        serde_json::json!({
            "memoType": hex::encode_upper(MEMO_TYPE.as_bytes()),
            "memoFormat": hex::encode_upper(MEMO_FORMAT.as_bytes()),
            "memoData": hex::encode_upper(payload.to_string().as_bytes()),
        })
    }

    fn persist_receipt(&self, receipt: &AnchorReceipt) {
        let store = Arc::clone(&self.store);
        let receipt = receipt.clone();
        tokio::spawn(async move {
            if let Err(e) = store.put_receipt(&receipt).await {
                tracing::warn!(ledger = %LEDGER, error = %e, "failed to persist anchor receipt");
            }
        });
    }
}

#[async_trait]
impl LedgerClient for XrplLedger {
    fn ledger_id(&self) -> LedgerId {
        LEDGER
    }

    async fn connect(&self) -> bool {
        let enabled = self.settings.enabled
            && self.settings.gateway_url.is_some()
            && self.settings.anchor_address.is_some();
        if enabled {
            tracing::info!(network = %self.settings.network, "xrpl client initialized");
        } else {
            tracing::warn!("xrpl anchoring disabled");
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

        let gateway = self
            .settings
            .gateway_url
            .as_deref()
            .ok_or(LedgerError::Disabled(LEDGER))?;
        let destination = self
            .settings
            .backup_address
            .as_deref()
            .or(self.settings.anchor_address.as_deref())
            .ok_or(LedgerError::Disabled(LEDGER))?;
        let url = format!("{}/transactions", gateway.trim_end_matches('/'));
        let body = serde_json::json!({
            "type": "PAYMENT",
            "destination": destination,
            "amountDrops": 1,
            "memo": self.memo(&request),
        });

        let budget = self.timeouts.ledger_budget(LEDGER);
        let response = with_budget(LEDGER, budget, async {
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
        .await?;

        let receipt =
            AnchorReceipt::submitted(LEDGER, &self.settings.network, &request, response.hash);
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
