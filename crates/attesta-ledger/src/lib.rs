//! Attesta ledger adapters.
//!
//! Three heterogeneous rails hide behind one contract: the consensus rail
//! (Hedera) mints credential NFTs and hosts the append-only message log,
//! while the two auxiliary rails (Algorand, XRPL) only timestamp hashes.
//! Adapters are explicitly constructed, injectable objects — the
//! orchestrator owns them and depends on the traits, never on a concrete
//! rail.

pub mod adapters;
pub mod error;
pub mod timeout;
pub mod traits;

pub use adapters::algorand::AlgorandLedger;
pub use adapters::hedera::HederaLedger;
pub use adapters::mock::MockLedger;
pub use adapters::xrpl::XrplLedger;
pub use error::LedgerError;
pub use traits::{
    BurnOutcome, ConsensusLedger, LedgerClient, LogReceipt, MintOutcome, OnLedgerCredential,
    PublishedRoot, RootMeta, TransferOutcome,
};
