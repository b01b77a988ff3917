//! Attesta anchoring layer.
//!
//! The orchestrator sequences one anchoring operation across three rails
//! with independent failure boundaries; the issuance pipeline mints the
//! credential NFT and persists its record; the revocation registry burns
//! and marks. Credential correctness depends only on the consensus rail —
//! auxiliary anchors are best-effort corroboration, never an availability
//! dependency.

pub mod error;
pub mod issuance;
pub mod orchestrator;
pub mod revocation;
pub mod routing;

pub use error::AnchorError;
pub use issuance::{IssuanceOutcome, IssuanceRequest, IssuanceService};
pub use orchestrator::{AnchorOrchestrator, AnchorOutcome, AuxOutcome, UnifiedOutcome};
pub use revocation::{RevocationEntry, RevocationOutcome, RevocationRegistry};
pub use routing::{decide_chain, RoutingHint};
