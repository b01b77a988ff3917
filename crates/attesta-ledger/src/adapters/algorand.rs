//! Auxiliary rail A adapter.
//!
//! Anchors are 0-value self-payments carrying the certificate hash in the
//! transaction note (`ACAD@1.0` JSON layout). The signing gateway holds the
//! anchor account's key; without it the rail reports disabled and anchors
//! degrade to mock receipts. Reads resolve from the receipt store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use attesta_core::{
    AlgorandSettings, AnchorReceipt, AnchorRequest, CertificateHash, LedgerId, ReceiptStore,
    TimeoutConfig,
};

use crate::error::LedgerError;
use crate::timeout::with_budget;
use crate::traits::LedgerClient;

const LEDGER: LedgerId = LedgerId::Algorand;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    tx_id: String,
}

pub struct AlgorandLedger {
    settings: AlgorandSettings,
    timeouts: TimeoutConfig,
    http: reqwest::Client,
    store: Arc<dyn ReceiptStore>,
    enabled: AtomicBool,
}

impl AlgorandLedger {
    pub fn new(
        settings: AlgorandSettings,
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

    fn note_payload(&self, request: &AnchorRequest) -> serde_json::Value {
        serde_json::json!({
            "certificateHash": request.certificate_hash.as_str(),
            "tokenId": request.token_id,
            "serialNumber": request.serial_number,
            "title": request.title,
            "issuer": request.issuer,
            "cid": request.content_cid,
            "timestamp": Utc::now().to_rfc3339(),
            "format": "ACAD@1.0",
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
impl LedgerClient for AlgorandLedger {
    fn ledger_id(&self) -> LedgerId {
        LEDGER
    }

    async fn connect(&self) -> bool {
        let enabled = self.settings.enabled
            && self.settings.gateway_url.is_some()
            && self.settings.anchor_address.is_some();
        if enabled {
            tracing::info!(network = %self.settings.network, "algorand client initialized");
        } else {
            tracing::warn!("algorand anchoring disabled");
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
            "to": destination,
            "amountMicroAlgos": 0,
            "note": self.note_payload(&request),
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
            AnchorReceipt::submitted(LEDGER, &self.settings.network, &request, response.tx_id);
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
