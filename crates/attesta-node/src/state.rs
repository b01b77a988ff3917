use std::sync::Arc;

use attesta_anchor::{AnchorOrchestrator, IssuanceService, RevocationRegistry};
use attesta_auth::ApiKeyGateway;
use attesta_core::CredentialStore;
use attesta_ledger::{ConsensusLedger, LedgerClient};
use attesta_verify::{OnlineVerifier, TrustlessVerifier};

use crate::config::NodeConfig;

/// Shared state behind the HTTP API: the composition root owns every
/// adapter and service explicitly — nothing is ambient module state.
pub struct AppState {
    pub config: NodeConfig,
    pub gateway: ApiKeyGateway,
    pub orchestrator: Arc<AnchorOrchestrator>,
    pub issuance: IssuanceService,
    pub registry: RevocationRegistry,
    pub online: OnlineVerifier,
    pub trustless: TrustlessVerifier,
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(
        config: NodeConfig,
        gateway: ApiKeyGateway,
        primary: Arc<dyn ConsensusLedger>,
        algorand: Arc<dyn LedgerClient>,
        xrpl: Arc<dyn LedgerClient>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let orchestrator = Arc::new(AnchorOrchestrator::new(
            Arc::clone(&primary),
            Arc::clone(&algorand),
            Arc::clone(&xrpl),
        ));
        let issuance = IssuanceService::new(
            Arc::clone(&orchestrator),
            Arc::clone(&store),
            config.issuer_label.clone(),
        );
        let registry = RevocationRegistry::new(Arc::clone(&primary), Arc::clone(&store));
        let online = OnlineVerifier::new(
            Arc::clone(&primary),
            Arc::clone(&algorand),
            Arc::clone(&xrpl),
            Arc::clone(&store),
        );
        let trustless = TrustlessVerifier::new(Arc::clone(&primary));

        Self {
            config,
            gateway,
            orchestrator,
            issuance,
            registry,
            online,
            trustless,
            store,
        }
    }
}
