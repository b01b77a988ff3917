//! Attesta core — shared domain model for the anchoring and verification engine.
//!
//! Everything that flows between the merkle engine, the ledger adapters, the
//! orchestrator, and the verifiers lives here: hashes, receipts, credential
//! records, the status transition guard, configuration, and the persistent
//! store contracts.

pub mod config;
pub mod error;
pub mod status;
pub mod store;
pub mod types;

pub use config::{AnchorConfig, AlgorandSettings, HederaSettings, TimeoutConfig, XrplSettings};
pub use error::{CoreError, StoreError};
pub use status::{CredentialStatus, TrustStatus};
pub use store::{CredentialStore, MemoryStore, ReceiptStore, RevocationEvidence, RevocationFilter};
pub use types::{
    AnchorReceipt, AnchorRequest, AnchorStatus, CertificateHash, CredentialRecord,
    ExternalProofs, LedgerId, MintMetadata,
};
