use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::LedgerId;

/// Per-service I/O budgets, in milliseconds.
///
/// Each ledger call and each store call races against its own budget; a
/// timeout is reported as a distinct error kind so callers can tell "slow"
/// from "down".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub hedera_ms: u64,
    pub algorand_ms: u64,
    pub xrpl_ms: u64,
    pub store_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            hedera_ms: 15_000,
            algorand_ms: 10_000,
            xrpl_ms: 10_000,
            store_ms: 10_000,
        }
    }
}

impl TimeoutConfig {
    pub fn ledger_budget(&self, ledger: LedgerId) -> Duration {
        let ms = match ledger {
            LedgerId::Hedera => self.hedera_ms,
            LedgerId::Algorand => self.algorand_ms,
            LedgerId::Xrpl => self.xrpl_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn store_budget(&self) -> Duration {
        Duration::from_millis(self.store_ms)
    }
}

/// Consensus rail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HederaSettings {
    pub enabled: bool,
    /// "testnet" or "mainnet".
    pub network: String,
    /// Public mirror-node REST API used for reads (NFT info, topic messages).
    pub mirror_url: String,
    /// Operator signing-gateway endpoint for writes (mint, burn, transfer,
    /// topic submit). Absent means the rail cannot submit transactions.
    pub gateway_url: Option<String>,
    pub operator_account: Option<String>,
    /// Default append-only message log (topic) for publishing Merkle roots.
    pub message_log_id: Option<String>,
}

impl Default for HederaSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            network: "testnet".into(),
            mirror_url: "https://testnet.mirrornode.hedera.com".into(),
            gateway_url: None,
            operator_account: None,
            message_log_id: None,
        }
    }
}

/// Auxiliary rail A settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorandSettings {
    pub enabled: bool,
    pub network: String,
    pub algod_url: String,
    pub gateway_url: Option<String>,
    pub anchor_address: Option<String>,
    /// Destination of the 0-value anchor payment; defaults to the anchor
    /// address itself.
    pub backup_address: Option<String>,
}

impl Default for AlgorandSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            network: "testnet".into(),
            algod_url: "https://testnet-api.algonode.cloud".into(),
            gateway_url: None,
            anchor_address: None,
            backup_address: None,
        }
    }
}

/// Auxiliary rail B settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XrplSettings {
    pub enabled: bool,
    pub network: String,
    pub rpc_url: String,
    pub gateway_url: Option<String>,
    pub anchor_address: Option<String>,
    pub backup_address: Option<String>,
}

impl Default for XrplSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            network: "testnet".into(),
            rpc_url: "https://s.altnet.rippletest.net:51234".into(),
            gateway_url: None,
            anchor_address: None,
            backup_address: None,
        }
    }
}

/// Everything the anchoring stack needs to talk to its three rails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub hedera: HederaSettings,
    pub algorand: AlgorandSettings,
    pub xrpl: XrplSettings,
    pub timeouts: TimeoutConfig,
}
