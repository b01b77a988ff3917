use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;
use crate::status::CredentialStatus;

/// Lowercase hex-encoded SHA-256 digest of a credential's canonical content.
///
/// Immutable once computed. Merkle roots share this type: a root is itself a
/// 32-byte digest and flows through the same anchoring contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateHash(String);

impl CertificateHash {
    /// Parse and normalize a hex digest. Input is trimmed and lowercased;
    /// anything that is not exactly 64 hex characters is rejected.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.len() != 64 || !normalized.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidHash(value.to_string()));
        }
        Ok(Self(normalized))
    }

    /// The all-zero digest, used for stub records whose original hash is
    /// unknown.
    pub fn zero() -> Self {
        Self("0".repeat(64))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw digest bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // Length and charset were validated at construction.
        let decoded = hex::decode(&self.0).unwrap_or_default();
        out.copy_from_slice(&decoded);
        out
    }
}

impl fmt::Display for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CertificateHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CertificateHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CertificateHash> for String {
    fn from(hash: CertificateHash) -> Self {
        hash.0
    }
}

/// Identity of a ledger rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerId {
    /// Consensus rail: mints the credential NFT and hosts the append-only
    /// message log used for publishing Merkle roots.
    Hedera,
    /// Auxiliary timestamping rail A.
    Algorand,
    /// Auxiliary timestamping rail B.
    Xrpl,
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hedera => write!(f, "hedera"),
            Self::Algorand => write!(f, "algorand"),
            Self::Xrpl => write!(f, "xrpl"),
        }
    }
}

/// Submission status of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStatus {
    /// The rail was disabled or unreachable; the receipt carries a locally
    /// generated placeholder transaction id.
    Mock,
    /// The transaction was accepted by the rail.
    Submitted,
    /// Submission was attempted and rejected.
    Failed,
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Submitted => write!(f, "submitted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What a caller asks a rail to anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorRequest {
    pub certificate_hash: CertificateHash,
    /// Token the hash belongs to, when anchoring a single credential.
    pub token_id: Option<String>,
    /// NFT serial, or "pending" for pre-mint anchors.
    pub serial_number: Option<String>,
    /// Consensus message-log cross-reference, when already published.
    pub log_id: Option<String>,
    pub log_sequence: Option<u64>,
    /// Free-form label carried in the rail's note/memo (e.g. "MERKLE_ROOT").
    pub title: Option<String>,
    pub issuer: Option<String>,
    /// Content address of the stored document, if any.
    pub content_cid: Option<String>,
}

impl AnchorRequest {
    pub fn for_hash(hash: CertificateHash) -> Self {
        Self {
            certificate_hash: hash,
            token_id: None,
            serial_number: None,
            log_id: None,
            log_sequence: None,
            title: None,
            issuer: None,
            content_cid: None,
        }
    }
}

/// One anchor on one rail. Append-only audit row: created by the
/// orchestrator, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub id: Uuid,
    pub ledger: LedgerId,
    pub certificate_hash: CertificateHash,
    pub token_id: Option<String>,
    pub serial_number: Option<String>,
    /// Consensus log the anchor cross-references, if any.
    pub log_id: Option<String>,
    pub log_sequence: Option<u64>,
    /// Transaction id on the rail. Placeholder `mock-…` ids for mock anchors.
    pub tx_id: Option<String>,
    pub network: String,
    pub status: AnchorStatus,
    pub anchored_at: DateTime<Utc>,
}

impl AnchorReceipt {
    /// Receipt for a rail that was disabled or unreachable. Carries a
    /// locally generated placeholder transaction id so callers never have
    /// to branch on availability.
    pub fn mock(ledger: LedgerId, network: &str, request: &AnchorRequest) -> Self {
        Self::with_status(
            ledger,
            network,
            request,
            AnchorStatus::Mock,
            Some(format!("mock-{ledger}-{}", Uuid::now_v7())),
        )
    }

    /// Receipt for a transaction accepted by the rail.
    pub fn submitted(
        ledger: LedgerId,
        network: &str,
        request: &AnchorRequest,
        tx_id: String,
    ) -> Self {
        Self::with_status(ledger, network, request, AnchorStatus::Submitted, Some(tx_id))
    }

    fn with_status(
        ledger: LedgerId,
        network: &str,
        request: &AnchorRequest,
        status: AnchorStatus,
        tx_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            ledger,
            certificate_hash: request.certificate_hash.clone(),
            token_id: request.token_id.clone(),
            serial_number: request.serial_number.clone(),
            log_id: request.log_id.clone(),
            log_sequence: request.log_sequence,
            tx_id,
            network: network.to_string(),
            status,
            anchored_at: Utc::now(),
        }
    }
}

/// Transaction references on the auxiliary rails, stored alongside the
/// credential record for direct proof resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProofs {
    pub xrpl_tx_hash: Option<String>,
    pub algorand_tx_id: Option<String>,
}

impl ExternalProofs {
    pub fn is_empty(&self) -> bool {
        self.xrpl_tx_hash.is_none() && self.algorand_tx_id.is_none()
    }
}

/// Metadata minted into the credential NFT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintMetadata {
    pub unique_hash: CertificateHash,
    pub student_name: String,
    pub degree: String,
    pub university: String,
    /// Content address of the credential document, if already stored.
    pub content_uri: Option<String>,
    pub graduation_date: Option<DateTime<Utc>>,
    /// Auxiliary anchor references embedded as metadata attributes.
    pub external_proofs: ExternalProofs,
}

/// Persistent record of an issued credential.
///
/// `status`, `revocation_reason`, and `revoked_at` are the only fields ever
/// mutated after creation, exclusively by the revocation registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub token_id: String,
    pub serial_number: String,
    pub university_id: Option<String>,
    pub student_account_id: Option<String>,
    pub unique_hash: CertificateHash,
    pub content_uri: Option<String>,
    #[serde(default)]
    pub external_proofs: ExternalProofs,
    pub status: CredentialStatus,
    pub revocation_reason: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_tx_id: Option<String>,
    pub revocation_log_sequence: Option<u64>,
    pub issued_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn new(token_id: String, serial_number: String, unique_hash: CertificateHash) -> Self {
        Self {
            token_id,
            serial_number,
            university_id: None,
            student_account_id: None,
            unique_hash,
            content_uri: None,
            external_proofs: ExternalProofs::default(),
            status: CredentialStatus::Active,
            revocation_reason: None,
            revoked_at: None,
            revocation_tx_id: None,
            revocation_log_sequence: None,
            issued_at: Utc::now(),
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.status == CredentialStatus::Revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let h = CertificateHash::parse(&format!("  {}  ", "AB".repeat(32))).unwrap();
        assert_eq!(h.as_str(), "ab".repeat(32));
    }

    #[test]
    fn parse_rejects_short_input() {
        assert!(CertificateHash::parse("abcd").is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(CertificateHash::parse(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn to_bytes_round_trips() {
        let h = CertificateHash::parse(&"0f".repeat(32)).unwrap();
        assert_eq!(h.to_bytes(), [0x0f; 32]);
    }

    #[test]
    fn serde_rejects_invalid_hash() {
        let result: Result<CertificateHash, _> = serde_json::from_str("\"not-a-hash\"");
        assert!(result.is_err());
    }

    #[test]
    fn ledger_id_display() {
        assert_eq!(format!("{}", LedgerId::Hedera), "hedera");
        assert_eq!(format!("{}", LedgerId::Algorand), "algorand");
        assert_eq!(format!("{}", LedgerId::Xrpl), "xrpl");
    }

    #[test]
    fn anchor_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&AnchorStatus::Mock).unwrap(), "\"mock\"");
        assert_eq!(
            serde_json::to_string(&AnchorStatus::Submitted).unwrap(),
            "\"submitted\""
        );
    }

    #[test]
    fn new_record_is_active() {
        let hash = CertificateHash::parse(&"aa".repeat(32)).unwrap();
        let record = CredentialRecord::new("0.0.1234".into(), "1".into(), hash);
        assert_eq!(record.status, CredentialStatus::Active);
        assert!(!record.is_revoked());
        assert!(record.external_proofs.is_empty());
    }
}
