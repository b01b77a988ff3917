//! HTTP API for the Attesta node.
//!
//! REST endpoints for Merkle batching, trustless proof verification,
//! credential issuance, revocation, and public credential verification.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use attesta_anchor::{AnchorError, RoutingHint};
use attesta_auth::{AuthContext, AuthError, Permission};
use attesta_core::{
    AnchorReceipt, AnchorRequest, AnchorStatus, CertificateHash, LedgerId, RevocationFilter,
    StoreError, TrustStatus,
};
use attesta_ledger::{LedgerError, LogReceipt, RootMeta};
use attesta_merkle::{sha256_hex, MerkleError, MerkleTree, ProofStep};
use attesta_verify::{
    build_link, AuxAnchorRef, LinkParams, OwnershipReport, TrustlessRequest, VerificationLink,
    VerifyError,
};

use crate::state::AppState;

// --- Errors ---

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Everything a handler can fail with, mapped onto HTTP statuses.
///
/// Cryptographic mismatches never appear here: a failed proof replay or an
/// invalid credential is a successful response with `verified`/`valid`
/// false. These are the malformed-input and infrastructure cases.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Anchor(#[from] AnchorError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
}

fn ledger_status(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::MissingKey) | Self::Auth(AuthError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::Hashing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Anchor(AnchorError::AlreadyRevoked { .. }) => StatusCode::CONFLICT,
            Self::Anchor(AnchorError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Anchor(AnchorError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Anchor(AnchorError::Ledger(e)) => ledger_status(e),
            Self::Anchor(AnchorError::Store(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Verify(VerifyError::NotFound { .. })
            | Self::Verify(VerifyError::RootNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Verify(VerifyError::Ledger(e)) => ledger_status(e),
            Self::Verify(_) => StatusCode::BAD_REQUEST,
            Self::Merkle(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// --- Authentication ---

fn extract_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Extractor gating write endpoints on a valid API key.
pub struct RequireApiKey(pub AuthContext);

impl FromRequestParts<Arc<AppState>> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_key(&parts.headers).ok_or(AuthError::MissingKey)?;
        let context = state.gateway.validate(&key)?;
        Ok(Self(context))
    }
}

/// Public verification routes optionally require a key, per deployment
/// config.
fn maybe_require_key(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if !state.config.public_verify_requires_key {
        return Ok(());
    }
    let key = extract_key(headers).ok_or(AuthError::MissingKey)?;
    state.gateway.validate(&key)?;
    Ok(())
}

fn require_any(context: &AuthContext, allowed: &[Permission]) -> Result<(), ApiError> {
    if allowed.iter().any(|p| context.has_permission(*p)) {
        return Ok(());
    }
    Err(AuthError::Forbidden {
        required: allowed[0],
    }
    .into())
}

// --- Explorer links ---

fn explorer_url(state: &AppState, ledger: LedgerId, tx_id: &str) -> String {
    let anchors = &state.config.anchors;
    match ledger {
        LedgerId::Hedera => format!(
            "https://hashscan.io/{}/transaction/{tx_id}",
            anchors.hedera.network
        ),
        LedgerId::Xrpl => {
            let subdomain = if anchors.xrpl.network.contains("main") {
                "livenet"
            } else {
                "testnet"
            };
            format!("https://{subdomain}.xrpl.org/transactions/{tx_id}")
        }
        LedgerId::Algorand => format!(
            "https://{}.explorer.perawallet.app/tx/{tx_id}/",
            anchors.algorand.network
        ),
    }
}

// --- Request / response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub hash: Option<String>,
    pub cid: Option<String>,
    pub content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleBatchRequest {
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogAnchorOut {
    pub log_id: String,
    pub sequence: u64,
    pub tx_id: String,
    pub explorer_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxAnchorOut {
    pub tx_id: Option<String>,
    pub status: AnchorStatus,
    pub explorer_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleBatchResponse {
    pub merkle_root: String,
    pub count: usize,
    pub primary: Option<LogAnchorOut>,
    pub xrpl: Option<AuxAnchorOut>,
    pub algorand: Option<AuxAnchorOut>,
    pub proofs: Vec<Vec<ProofStep>>,
    pub verification_links: Vec<VerificationLink>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleVerifyRequest {
    pub hash: String,
    pub proof: Vec<ProofStep>,
    pub merkle_root: Option<String>,
    pub log_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleVerifyResponse {
    pub verified: bool,
    pub merkle_root: String,
    pub log_sequence: Option<u64>,
    pub xrpl: Option<String>,
    pub algorand: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub token_id: String,
    pub unique_hash: CertificateHash,
    pub content_uri: Option<String>,
    pub student_name: String,
    pub degree: String,
    pub university: Option<String>,
    pub university_id: Option<String>,
    pub recipient_account_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub token_id: String,
    pub serial_number: String,
    pub tx_id: String,
    pub transfer_status: String,
    pub content_uri: Option<String>,
    pub xrpl: Option<AuxAnchorOut>,
    pub algorand: Option<AuxAnchorOut>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUnifiedRequest {
    #[serde(flatten)]
    pub issue: IssueRequest,
    /// Preferred auxiliary rail: "xrpl" or "algorand".
    pub chain: Option<String>,
    pub region: Option<String>,
    pub institution: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedAnchorOut {
    pub chain: LedgerId,
    pub tx_id: Option<String>,
    pub status: AnchorStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUnifiedResponse {
    #[serde(flatten)]
    pub issue: IssueResponse,
    pub primary_anchor: Option<UnifiedAnchorOut>,
    pub secondary_anchor: Option<UnifiedAnchorOut>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    pub token_id: String,
    pub serial_number: String,
    pub reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub token_id: String,
    pub serial_number: String,
    pub status: attesta_core::CredentialStatus,
    pub tx_id: String,
    pub log: Option<LogReceipt>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationsQuery {
    pub token_id: Option<String>,
    pub reason: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationsResponse {
    pub items: Vec<attesta_anchor::RevocationEntry>,
    pub limit: usize,
    pub offset: usize,
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: attesta_core::CredentialStatus,
    pub revocation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialRequest {
    pub token_id: String,
    pub serial_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOwnershipRequest {
    pub token_id: String,
    pub serial_number: String,
    pub account_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialResponse {
    pub valid: bool,
    pub status: TrustStatus,
    pub credential: attesta_ledger::OnLedgerCredential,
    pub revocation_reason: Option<String>,
    pub xrpl: Option<AuxAnchorRef>,
    pub algorand: Option<AuxAnchorRef>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn aux_out(state: &AppState, ledger: LedgerId, receipt: &AnchorReceipt) -> AuxAnchorOut {
    AuxAnchorOut {
        tx_id: receipt.tx_id.clone(),
        status: receipt.status,
        explorer_url: match (&receipt.tx_id, receipt.status) {
            (Some(tx), AnchorStatus::Submitted) => Some(explorer_url(state, ledger, tx)),
            _ => None,
        },
    }
}

async fn handle_merkle_batch(
    State(state): State<Arc<AppState>>,
    RequireApiKey(context): RequireApiKey,
    Json(request): Json<MerkleBatchRequest>,
) -> Result<(StatusCode, Json<MerkleBatchResponse>), ApiError> {
    require_any(&context, &[Permission::MintCredential])?;

    let leaves: Vec<String> = if !request.hashes.is_empty() {
        request.hashes
    } else {
        request
            .documents
            .iter()
            .map(|document| match &document.hash {
                Some(hash) => hash.clone(),
                None => {
                    let content = document
                        .cid
                        .clone()
                        .or_else(|| document.content.clone())
                        .unwrap_or_default();
                    sha256_hex(content.as_bytes())
                }
            })
            .collect()
    };
    if leaves.is_empty() {
        return Err(ApiError::Validation("no hashes provided".into()));
    }

    let tree = MerkleTree::build(&leaves)?;
    let root = CertificateHash::parse(tree.root())
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let meta = RootMeta {
        count: tree.leaf_count(),
        issuer: state.config.issuer_label.clone(),
    };
    let outcome = state.orchestrator.anchor_everywhere(&root, &meta).await;

    let mut proofs = Vec::with_capacity(tree.leaf_count());
    for index in 0..tree.leaf_count() {
        proofs.push(tree.proof_for(index)?);
    }

    let params = LinkParams {
        base_url: state.config.client_base_url.as_deref(),
        log_id: outcome.primary.as_ref().map(|log| log.log_id.as_str()),
        xrpl_tx: outcome
            .xrpl
            .as_ref()
            .and_then(|receipt| receipt.tx_id.as_deref()),
        algorand_tx: outcome
            .algorand
            .as_ref()
            .and_then(|receipt| receipt.tx_id.as_deref()),
    };
    let verification_links = tree
        .leaves()
        .iter()
        .zip(&proofs)
        .map(|(leaf, proof)| build_link(leaf, proof, &params))
        .collect();

    let response = MerkleBatchResponse {
        merkle_root: tree.root().to_string(),
        count: tree.leaf_count(),
        primary: outcome.primary.map(|log| LogAnchorOut {
            explorer_url: explorer_url(&state, LedgerId::Hedera, &log.tx_id),
            log_id: log.log_id,
            sequence: log.sequence,
            tx_id: log.tx_id,
        }),
        xrpl: outcome
            .xrpl
            .map(|receipt| aux_out(&state, LedgerId::Xrpl, &receipt)),
        algorand: outcome
            .algorand
            .map(|receipt| aux_out(&state, LedgerId::Algorand, &receipt)),
        proofs,
        verification_links,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_merkle_verify(
    State(state): State<Arc<AppState>>,
    RequireApiKey(_context): RequireApiKey,
    Json(request): Json<MerkleVerifyRequest>,
) -> Result<Json<MerkleVerifyResponse>, ApiError> {
    let outcome = state
        .trustless
        .verify(TrustlessRequest {
            hash: request.hash,
            proof: request.proof,
            merkle_root: request.merkle_root,
            log_id: request.log_id,
        })
        .await?;

    // Best-effort corroboration: auxiliary receipts for the resolved root.
    let mut xrpl = None;
    let mut algorand = None;
    if let Ok(root) = CertificateHash::parse(&outcome.merkle_root) {
        for (slot, ledger) in [
            (&mut xrpl, LedgerId::Xrpl),
            (&mut algorand, LedgerId::Algorand),
        ] {
            match state.orchestrator.auxiliary(ledger).read_by_hash(&root).await {
                Ok(receipt) => *slot = receipt.and_then(|r| r.tx_id),
                Err(e) => {
                    tracing::warn!(ledger = %ledger, error = %e, "aux receipt lookup failed")
                }
            }
        }
    }

    Ok(Json(MerkleVerifyResponse {
        verified: outcome.verified,
        merkle_root: outcome.merkle_root,
        log_sequence: outcome.log_sequence,
        xrpl,
        algorand,
    }))
}

fn issue_response(state: &AppState, outcome: attesta_anchor::IssuanceOutcome) -> IssueResponse {
    IssueResponse {
        token_id: outcome.record.token_id.clone(),
        serial_number: outcome.mint.serial_number.clone(),
        tx_id: outcome.mint.tx_id.clone(),
        transfer_status: if outcome.transfer.is_some() {
            "TRANSFERRED".into()
        } else {
            "MINTED_TO_TREASURY".into()
        },
        content_uri: outcome.record.content_uri.clone(),
        xrpl: outcome
            .anchors
            .xrpl
            .as_ref()
            .map(|receipt| aux_out(state, LedgerId::Xrpl, receipt)),
        algorand: outcome
            .anchors
            .algorand
            .as_ref()
            .map(|receipt| aux_out(state, LedgerId::Algorand, receipt)),
    }
}

fn to_issuance_request(request: IssueRequest) -> attesta_anchor::IssuanceRequest {
    attesta_anchor::IssuanceRequest {
        token_id: request.token_id,
        unique_hash: request.unique_hash,
        content_uri: request.content_uri,
        student_name: request.student_name,
        degree: request.degree,
        university: request.university,
        university_id: request.university_id,
        recipient_account: request.recipient_account_id,
    }
}

async fn handle_issue(
    State(state): State<Arc<AppState>>,
    RequireApiKey(context): RequireApiKey,
    Json(request): Json<IssueRequest>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    require_any(&context, &[Permission::MintCredential])?;
    let outcome = state.issuance.issue(to_issuance_request(request)).await?;
    Ok((StatusCode::CREATED, Json(issue_response(&state, outcome))))
}

fn parse_chain(value: Option<&str>) -> Option<LedgerId> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("xrpl") => Some(LedgerId::Xrpl),
        Some("algorand") => Some(LedgerId::Algorand),
        _ => None,
    }
}

async fn handle_issue_unified(
    State(state): State<Arc<AppState>>,
    RequireApiKey(context): RequireApiKey,
    Json(request): Json<IssueUnifiedRequest>,
) -> Result<(StatusCode, Json<IssueUnifiedResponse>), ApiError> {
    require_any(&context, &[Permission::MintCredential])?;

    let hint = RoutingHint {
        preferred: parse_chain(request.chain.as_deref()),
        region: request.region.clone(),
        institution: request.institution.clone(),
    };
    let outcome = state
        .issuance
        .issue(to_issuance_request(request.issue))
        .await?;

    // Post-mint anchors carry the real serial, routed by the hint.
    let mut anchor_request = AnchorRequest::for_hash(outcome.record.unique_hash.clone());
    anchor_request.token_id = Some(outcome.record.token_id.clone());
    anchor_request.serial_number = Some(outcome.mint.serial_number.clone());
    anchor_request.issuer = Some(state.config.issuer_label.clone());
    let unified = state
        .orchestrator
        .anchor_unified(&anchor_request, &hint)
        .await;

    let to_out = |pair: Option<(LedgerId, AnchorReceipt)>| {
        pair.map(|(chain, receipt)| UnifiedAnchorOut {
            chain,
            tx_id: receipt.tx_id,
            status: receipt.status,
        })
    };
    Ok((
        StatusCode::CREATED,
        Json(IssueUnifiedResponse {
            issue: issue_response(&state, outcome),
            primary_anchor: to_out(unified.primary),
            secondary_anchor: to_out(unified.secondary),
        }),
    ))
}

async fn handle_revoke(
    State(state): State<Arc<AppState>>,
    RequireApiKey(context): RequireApiKey,
    Json(request): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>, ApiError> {
    require_any(
        &context,
        &[Permission::RevokeCredential, Permission::MintCredential],
    )?;
    let outcome = state
        .registry
        .revoke(
            &request.token_id,
            &request.serial_number,
            request.reason.as_deref(),
        )
        .await?;
    Ok(Json(RevokeResponse {
        token_id: outcome.token_id,
        serial_number: outcome.serial_number,
        status: outcome.status,
        tx_id: outcome.burn.tx_id,
        log: outcome.log,
    }))
}

fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

async fn handle_revocations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RevocationsQuery>,
) -> Result<Json<RevocationsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0);
    let filter = RevocationFilter {
        token_id: query.token_id,
        reason_contains: query.reason,
        from: parse_date(query.start_date.as_deref()),
        to: parse_date(query.end_date.as_deref()),
        limit,
        offset,
    };
    let items = state.registry.revocations(&filter).await?;
    Ok(Json(RevocationsResponse {
        count: items.len(),
        items,
        limit,
        offset,
    }))
}

async fn handle_status(
    State(state): State<Arc<AppState>>,
    Path((token_id, serial_number)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, ApiError> {
    let record = state
        .store
        .credential(&token_id, &serial_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("credential {token_id}#{serial_number}")))?;
    Ok(Json(StatusResponse {
        status: record.status,
        revocation_reason: record.revocation_reason,
    }))
}

async fn verify_to_response(
    state: &AppState,
    token_id: &str,
    serial_number: &str,
) -> Result<Json<VerifyCredentialResponse>, ApiError> {
    let report = state.online.verify(token_id, serial_number).await?;
    Ok(Json(VerifyCredentialResponse {
        valid: report.valid,
        status: report.status,
        credential: report.credential,
        revocation_reason: report.revocation_reason,
        xrpl: report.xrpl,
        algorand: report.algorand,
    }))
}

async fn handle_verify_credential(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<VerifyCredentialRequest>,
) -> Result<Json<VerifyCredentialResponse>, ApiError> {
    maybe_require_key(&state, &headers)?;
    verify_to_response(&state, &request.token_id, &request.serial_number).await
}

async fn handle_verify_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((token_id, serial_number)): Path<(String, String)>,
) -> Result<Json<VerifyCredentialResponse>, ApiError> {
    maybe_require_key(&state, &headers)?;
    verify_to_response(&state, &token_id, &serial_number).await
}

async fn handle_verify_ownership(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<VerifyOwnershipRequest>,
) -> Result<Json<OwnershipReport>, ApiError> {
    maybe_require_key(&state, &headers)?;
    let report = state
        .online
        .verify_ownership(
            &request.token_id,
            &request.serial_number,
            &request.account_id,
        )
        .await?;
    Ok(Json(report))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/credentials/merkle/batch", post(handle_merkle_batch))
        .route(
            "/api/v1/credentials/merkle/verify",
            post(handle_merkle_verify),
        )
        .route("/api/v1/credentials/issue", post(handle_issue))
        .route(
            "/api/v1/credentials/issue-unified",
            post(handle_issue_unified),
        )
        .route("/api/v1/credentials/revoke", post(handle_revoke))
        .route("/api/v1/credentials/revocations", get(handle_revocations))
        .route(
            "/api/v1/credentials/status/{token_id}/{serial_number}",
            get(handle_status),
        )
        .route(
            "/api/v1/verification/verify-credential",
            post(handle_verify_credential),
        )
        .route(
            "/api/v1/verification/verify/{token_id}/{serial_number}",
            get(handle_verify_get),
        )
        .route(
            "/api/v1/verification/verify-ownership",
            post(handle_verify_ownership),
        )
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
