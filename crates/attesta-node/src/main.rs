//! Attesta node — entry point.
//!
//! Starts the anchoring and verification HTTP service with configuration
//! from a TOML file or defaults.

mod api;
mod config;
mod state;
mod storage;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use attesta_auth::{ApiKeyGateway, ConsumerType, Permission};
use attesta_core::{CredentialStore, ReceiptStore};
use attesta_ledger::{AlgorandLedger, ConsensusLedger, HederaLedger, LedgerClient, XrplLedger};

use config::NodeConfig;
use state::AppState;
use storage::RocksStore;

/// Attesta Node
#[derive(Parser, Debug)]
#[command(name = "attesta-node", version, about = "Attesta anchoring and verification node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "attesta.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init {
        let config = NodeConfig::default();
        config.save(&args.config)?;
        println!("wrote default config to {}", args.config.display());
        return Ok(());
    }

    let mut config = NodeConfig::load(&args.config)?;
    if let Some(api_port) = args.api_port {
        config.api_port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.log_level = log_level.clone();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!("Attesta node v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    // API consumers live in storage; the gateway indexes them by prefix.
    let gateway = ApiKeyGateway::new();
    let consumers = store.load_consumers()?;
    let had_consumers = !consumers.is_empty();
    for consumer in consumers {
        gateway.register(consumer);
    }
    if !had_consumers {
        // First boot: issue the bootstrap admin key. The plaintext is shown
        // exactly once.
        let permissions: HashSet<Permission> = [Permission::All].into_iter().collect();
        let (issued, consumer) =
            gateway.create_key("bootstrap-admin", ConsumerType::Admin, permissions, None)?;
        store.put_consumer(&consumer)?;
        tracing::info!(api_key = %issued.api_key, "bootstrap admin API key issued");
    }

    let receipt_store: Arc<dyn ReceiptStore> = Arc::clone(&store) as Arc<dyn ReceiptStore>;
    let timeouts = config.anchors.timeouts.clone();
    let primary: Arc<dyn ConsensusLedger> = Arc::new(HederaLedger::new(
        config.anchors.hedera.clone(),
        timeouts.clone(),
        Arc::clone(&receipt_store),
    ));
    let algorand: Arc<dyn LedgerClient> = Arc::new(AlgorandLedger::new(
        config.anchors.algorand.clone(),
        timeouts.clone(),
        Arc::clone(&receipt_store),
    ));
    let xrpl: Arc<dyn LedgerClient> = Arc::new(XrplLedger::new(
        config.anchors.xrpl.clone(),
        timeouts,
        Arc::clone(&receipt_store),
    ));

    let listen_addr: SocketAddr = format!("{}:{}", config.listen_address, config.api_port)
        .parse()?;
    let state = Arc::new(AppState::new(
        config,
        gateway,
        primary,
        algorand,
        xrpl,
        Arc::clone(&store) as Arc<dyn CredentialStore>,
    ));

    state.orchestrator.connect_all().await;

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = api::start_api_server(listen_addr, state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "api server error");
            }
        }
        _ = shutdown => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
