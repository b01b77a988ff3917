use std::sync::Arc;

use serde::{Deserialize, Serialize};

use attesta_core::{
    AnchorRequest, CertificateHash, CredentialRecord, CredentialStore, ExternalProofs,
    MintMetadata,
};
use attesta_ledger::{MintOutcome, TransferOutcome};

use crate::error::AnchorError;
use crate::orchestrator::{AnchorOrchestrator, AuxOutcome};

/// Inbound issuance request, validated before any I/O.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuanceRequest {
    pub token_id: String,
    pub unique_hash: CertificateHash,
    pub content_uri: Option<String>,
    pub student_name: String,
    pub degree: String,
    pub university: Option<String>,
    pub university_id: Option<String>,
    pub recipient_account: Option<String>,
}

impl IssuanceRequest {
    fn validate(&self) -> Result<(), AnchorError> {
        for (field, value) in [
            ("tokenId", &self.token_id),
            ("studentName", &self.student_name),
            ("degree", &self.degree),
        ] {
            if value.trim().is_empty() {
                return Err(AnchorError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Everything the caller gets back from an issuance.
#[derive(Debug, Clone, Serialize)]
pub struct IssuanceOutcome {
    pub mint: MintOutcome,
    pub transfer: Option<TransferOutcome>,
    pub anchors: AuxOutcome,
    pub record: CredentialRecord,
}

/// Issues a credential: pre-anchors on the auxiliary rails, mints the NFT
/// on the consensus rail, optionally transfers it to the holder, and
/// persists the record.
///
/// Only the consensus mint gates success. Auxiliary anchors that fail leave
/// their slot empty and issuance proceeds.
pub struct IssuanceService {
    orchestrator: Arc<AnchorOrchestrator>,
    store: Arc<dyn CredentialStore>,
    issuer_label: String,
}

impl IssuanceService {
    pub fn new(
        orchestrator: Arc<AnchorOrchestrator>,
        store: Arc<dyn CredentialStore>,
        issuer_label: String,
    ) -> Self {
        Self {
            orchestrator,
            store,
            issuer_label,
        }
    }

    pub async fn issue(&self, request: IssuanceRequest) -> Result<IssuanceOutcome, AnchorError> {
        request.validate()?;

        // Pre-mint anchors: the serial is not known yet.
        let mut anchor_request = AnchorRequest::for_hash(request.unique_hash.clone());
        anchor_request.token_id = Some(request.token_id.clone());
        anchor_request.serial_number = Some("pending".into());
        anchor_request.issuer = Some(self.issuer_label.clone());
        anchor_request.content_cid = request.content_uri.clone();
        let pre_anchors = self.orchestrator.anchor_auxiliaries(&anchor_request).await;

        let external_proofs = ExternalProofs {
            xrpl_tx_hash: pre_anchors
                .xrpl
                .as_ref()
                .and_then(|receipt| receipt.tx_id.clone()),
            algorand_tx_id: pre_anchors
                .algorand
                .as_ref()
                .and_then(|receipt| receipt.tx_id.clone()),
        };

        let university = request
            .university
            .clone()
            .unwrap_or_else(|| self.issuer_label.clone());
        let metadata = MintMetadata {
            unique_hash: request.unique_hash.clone(),
            student_name: request.student_name.clone(),
            degree: request.degree.clone(),
            university,
            content_uri: request.content_uri.clone(),
            graduation_date: None,
            external_proofs: external_proofs.clone(),
        };

        // Consensus mint is the one step that gates issuance.
        let mint = self
            .orchestrator
            .primary()
            .mint_credential(&request.token_id, &metadata)
            .await?;

        let transfer = match &request.recipient_account {
            Some(recipient) => Some(
                self.orchestrator
                    .primary()
                    .transfer_credential(&request.token_id, &mint.serial_number, recipient)
                    .await?,
            ),
            None => None,
        };

        let mut record = CredentialRecord::new(
            request.token_id.clone(),
            mint.serial_number.clone(),
            request.unique_hash.clone(),
        );
        record.university_id = request.university_id.clone();
        record.student_account_id = request.recipient_account.clone();
        record.content_uri = mint.metadata_uri.clone().or(request.content_uri.clone());
        record.external_proofs = external_proofs;
        self.store.put_credential(&record).await?;

        tracing::info!(
            token_id = %request.token_id,
            serial = %mint.serial_number,
            "credential issued"
        );

        Ok(IssuanceOutcome {
            mint,
            transfer,
            anchors: pre_anchors,
            record,
        })
    }
}
