//! Attesta verification service.
//!
//! Two independent protocols reconstruct trust in a credential: the online
//! path queries the consensus rail and cross-references auxiliary receipts;
//! the trustless path replays a Merkle proof locally against a root fetched
//! from the public message log — no trust in this server required for the
//! cryptographic check itself.

pub mod error;
pub mod links;
pub mod online;
pub mod trustless;

pub use error::VerifyError;
pub use links::{build_link, parse_link, LinkParams, ParsedLink, VerificationLink};
pub use online::{
    AuxAnchorRef, OnlineVerifier, OwnershipReport, ProofSource, VerificationReport,
};
pub use trustless::{TrustlessOutcome, TrustlessRequest, TrustlessVerifier};
