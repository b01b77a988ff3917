use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use attesta_core::AnchorConfig;

/// Configuration for an Attesta node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node display name.
    pub name: String,
    /// Listen address for the HTTP API.
    pub listen_address: String,
    /// Port for the HTTP API.
    pub api_port: u16,
    /// Path to the data directory.
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the verification web client; verification links are
    /// root-relative when unset.
    pub client_base_url: Option<String>,
    /// Issuer label written into anchors and minted metadata.
    pub issuer_label: String,
    /// Whether public verification routes also require an API key.
    pub public_verify_requires_key: bool,
    /// Ledger rail settings and per-service timeouts.
    pub anchors: AnchorConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "attesta-node".into(),
            listen_address: "0.0.0.0".into(),
            api_port: 9100,
            data_dir: "./data".into(),
            log_level: "info".into(),
            client_base_url: None,
            issuer_label: "Attesta".into(),
            public_verify_requires_key: false,
            anchors: AnchorConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: NodeConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
