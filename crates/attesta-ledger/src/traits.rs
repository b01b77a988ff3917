use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use attesta_core::{AnchorReceipt, AnchorRequest, CertificateHash, LedgerId, MintMetadata};

use crate::error::LedgerError;

/// Outcome of minting a credential NFT on the consensus rail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintOutcome {
    pub serial_number: String,
    pub tx_id: String,
    /// Content address of the minted metadata, when pinned by the rail.
    pub metadata_uri: Option<String>,
}

/// Outcome of transferring a credential NFT to its holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub tx_id: String,
}

/// Outcome of burning a credential NFT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnOutcome {
    pub tx_id: String,
    pub new_total_supply: Option<u64>,
}

/// Receipt for a message accepted by the append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogReceipt {
    pub log_id: String,
    pub sequence: u64,
    pub tx_id: String,
}

/// Metadata published alongside a Merkle root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootMeta {
    pub count: usize,
    pub issuer: String,
}

/// A Merkle root recovered from the message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedRoot {
    pub merkle_root: String,
    pub sequence: u64,
    pub consensus_timestamp: Option<String>,
}

/// Credential state as the consensus rail sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnLedgerCredential {
    pub token_id: String,
    pub serial_number: String,
    pub owner_account_id: String,
    /// Decoded NFT metadata: either the pinned JSON document or
    /// `{"uri": "..."}` when the rail stores only a content address.
    pub metadata: serde_json::Value,
    /// False once the NFT has been burned or deleted.
    pub valid: bool,
}

/// Uniform contract every rail adapter implements.
///
/// `connect` is non-fatal: absence of credentials or disabled-by-config
/// simply yields `false`. A disabled rail still answers `anchor` with a
/// well-formed mock receipt, so callers never branch on availability.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    fn ledger_id(&self) -> LedgerId;

    async fn connect(&self) -> bool;

    fn is_enabled(&self) -> bool;

    async fn anchor(&self, request: AnchorRequest) -> Result<AnchorReceipt, LedgerError>;

    async fn read_by_hash(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<AnchorReceipt>, LedgerError>;

    async fn read_by_token_serial(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<Option<AnchorReceipt>, LedgerError>;
}

/// Extra capabilities of the consensus rail: NFT lifecycle and the
/// append-only message log used to publish Merkle roots independently of
/// any specific credential.
#[async_trait]
pub trait ConsensusLedger: LedgerClient {
    async fn mint_credential(
        &self,
        token_id: &str,
        metadata: &MintMetadata,
    ) -> Result<MintOutcome, LedgerError>;

    async fn transfer_credential(
        &self,
        token_id: &str,
        serial_number: &str,
        recipient_account: &str,
    ) -> Result<TransferOutcome, LedgerError>;

    async fn burn_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<BurnOutcome, LedgerError>;

    async fn verify_credential(
        &self,
        token_id: &str,
        serial_number: &str,
    ) -> Result<OnLedgerCredential, LedgerError>;

    async fn submit_to_message_log(
        &self,
        root: &CertificateHash,
        meta: &RootMeta,
    ) -> Result<LogReceipt, LedgerError>;

    /// Publish a revocation event to the message log.
    async fn publish_revocation(
        &self,
        token_id: &str,
        serial_number: &str,
        reason: Option<&str>,
    ) -> Result<LogReceipt, LedgerError>;

    /// Newest-first scan of the log for the most recent structurally valid
    /// `MERKLE_ROOT` message.
    async fn latest_merkle_root(
        &self,
        log_id: &str,
    ) -> Result<Option<PublishedRoot>, LedgerError>;
}
