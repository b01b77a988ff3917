use std::sync::Arc;

use serde::Serialize;

use attesta_core::{AnchorReceipt, AnchorRequest, CertificateHash, LedgerId};
use attesta_ledger::{ConsensusLedger, LedgerClient, LogReceipt, RootMeta};

use crate::routing::{aux_order, decide_chain, RoutingHint};

/// Result of anchoring one hash everywhere: a record of optional per-rail
/// outcomes, keyed by ledger identity, never positionally.
#[derive(Debug, Clone, Serialize)]
pub struct AnchorOutcome {
    pub primary: Option<LogReceipt>,
    pub algorand: Option<AnchorReceipt>,
    pub xrpl: Option<AnchorReceipt>,
}

/// Auxiliary-only anchoring result.
#[derive(Debug, Clone, Serialize)]
pub struct AuxOutcome {
    pub algorand: Option<AnchorReceipt>,
    pub xrpl: Option<AnchorReceipt>,
}

/// Unified-mode result: a routing hint picks a primary-among-auxiliaries;
/// whichever rail succeeds first is `primary`, a subsequent attempt at the
/// other is `secondary`. Both independently optional.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedOutcome {
    pub primary: Option<(LedgerId, AnchorReceipt)>,
    pub secondary: Option<(LedgerId, AnchorReceipt)>,
}

/// Sequences a single anchoring operation across the three rails.
///
/// Every rail attempt runs inside its own failure boundary: an error is
/// logged and yields `None` for that slot, and never aborts the sibling
/// attempts or the overall operation.
pub struct AnchorOrchestrator {
    primary: Arc<dyn ConsensusLedger>,
    algorand: Arc<dyn LedgerClient>,
    xrpl: Arc<dyn LedgerClient>,
}

impl AnchorOrchestrator {
    pub fn new(
        primary: Arc<dyn ConsensusLedger>,
        algorand: Arc<dyn LedgerClient>,
        xrpl: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            primary,
            algorand,
            xrpl,
        }
    }

    /// Connect all rails. Non-fatal by contract; the returned flags are
    /// informational.
    pub async fn connect_all(&self) -> (bool, bool, bool) {
        let primary = self.primary.connect().await;
        let algorand = self.algorand.connect().await;
        let xrpl = self.xrpl.connect().await;
        tracing::info!(primary, algorand, xrpl, "ledger rails connected");
        (primary, algorand, xrpl)
    }

    fn aux_rail(&self, ledger: LedgerId) -> &Arc<dyn LedgerClient> {
        match ledger {
            LedgerId::Algorand => &self.algorand,
            _ => &self.xrpl,
        }
    }

    async fn try_aux(
        &self,
        ledger: LedgerId,
        request: &AnchorRequest,
    ) -> Option<AnchorReceipt> {
        match self.aux_rail(ledger).anchor(request.clone()).await {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                tracing::warn!(ledger = %ledger, error = %e, "auxiliary anchor failed");
                None
            }
        }
    }

    /// Anchor a hash (typically a Merkle root) on all three rails.
    ///
    /// The consensus log is attempted first so the auxiliary anchors can
    /// cross-reference its sequence number; each rail is still independent
    /// and a failed slot stays `None` without affecting the others.
    pub async fn anchor_everywhere(
        &self,
        hash: &CertificateHash,
        meta: &RootMeta,
    ) -> AnchorOutcome {
        let primary = match self.primary.submit_to_message_log(hash, meta).await {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                tracing::warn!(error = %e, "consensus log submission failed");
                None
            }
        };

        let mut request = AnchorRequest::for_hash(hash.clone());
        request.title = Some("MERKLE_ROOT".into());
        request.issuer = Some(meta.issuer.clone());
        if let Some(log) = &primary {
            request.log_id = Some(log.log_id.clone());
            request.log_sequence = Some(log.sequence);
        }

        let xrpl = self.try_aux(LedgerId::Xrpl, &request).await;
        let algorand = self.try_aux(LedgerId::Algorand, &request).await;

        AnchorOutcome {
            primary,
            algorand,
            xrpl,
        }
    }

    /// Anchor on the auxiliary rails only, e.g. the pre-mint anchors of the
    /// issuance pipeline.
    pub async fn anchor_auxiliaries(&self, request: &AnchorRequest) -> AuxOutcome {
        let xrpl = self.try_aux(LedgerId::Xrpl, request).await;
        let algorand = self.try_aux(LedgerId::Algorand, request).await;
        AuxOutcome { algorand, xrpl }
    }

    /// Unified mode: the routing hint decides which auxiliary rail to try
    /// first; the first success is reported as `primary` and the other rail
    /// is then attempted as `secondary`.
    pub async fn anchor_unified(
        &self,
        request: &AnchorRequest,
        hint: &RoutingHint,
    ) -> UnifiedOutcome {
        let order = aux_order(decide_chain(hint));

        let mut primary = None;
        for ledger in order {
            if let Some(receipt) = self.try_aux(ledger, request).await {
                primary = Some((ledger, receipt));
                break;
            }
        }

        let mut secondary = None;
        if let Some((primary_ledger, _)) = &primary {
            for ledger in order {
                if ledger != *primary_ledger {
                    secondary = self
                        .try_aux(ledger, request)
                        .await
                        .map(|receipt| (ledger, receipt));
                }
            }
        }

        UnifiedOutcome { primary, secondary }
    }

    pub fn primary(&self) -> &Arc<dyn ConsensusLedger> {
        &self.primary
    }

    pub fn auxiliary(&self, ledger: LedgerId) -> &Arc<dyn LedgerClient> {
        self.aux_rail(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attesta_core::AnchorStatus;
    use attesta_ledger::MockLedger;

    fn hash(byte: &str) -> CertificateHash {
        CertificateHash::parse(&byte.repeat(32)).unwrap()
    }

    fn meta() -> RootMeta {
        RootMeta {
            count: 2,
            issuer: "Attesta".into(),
        }
    }

    fn orchestrator(
        primary: MockLedger,
        algorand: MockLedger,
        xrpl: MockLedger,
    ) -> AnchorOrchestrator {
        AnchorOrchestrator::new(Arc::new(primary), Arc::new(algorand), Arc::new(xrpl))
    }

    #[tokio::test]
    async fn all_rails_succeed() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera),
            MockLedger::new(LedgerId::Algorand),
            MockLedger::new(LedgerId::Xrpl),
        );
        let outcome = orchestrator.anchor_everywhere(&hash("aa"), &meta()).await;

        assert!(outcome.primary.is_some());
        assert!(outcome.algorand.is_some());
        assert!(outcome.xrpl.is_some());

        // Aux receipts cross-reference the consensus log sequence.
        let log = outcome.primary.unwrap();
        assert_eq!(
            outcome.xrpl.unwrap().log_sequence,
            Some(log.sequence)
        );
    }

    #[tokio::test]
    async fn one_failing_aux_never_aborts_the_others() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera),
            MockLedger::new(LedgerId::Algorand).failing(),
            MockLedger::new(LedgerId::Xrpl),
        );
        let outcome = orchestrator.anchor_everywhere(&hash("bb"), &meta()).await;

        assert!(outcome.primary.is_some());
        assert!(outcome.algorand.is_none());
        assert!(outcome.xrpl.is_some());
    }

    #[tokio::test]
    async fn failed_primary_leaves_aux_attempts_intact() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera).failing(),
            MockLedger::new(LedgerId::Algorand),
            MockLedger::new(LedgerId::Xrpl),
        );
        let outcome = orchestrator.anchor_everywhere(&hash("cc"), &meta()).await;

        assert!(outcome.primary.is_none());
        assert!(outcome.algorand.is_some());
        assert!(outcome.xrpl.is_some());
        assert!(outcome.xrpl.unwrap().log_sequence.is_none());
    }

    #[tokio::test]
    async fn disabled_aux_still_yields_mock_receipt() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera),
            MockLedger::new(LedgerId::Algorand).disabled(),
            MockLedger::new(LedgerId::Xrpl),
        );
        let outcome = orchestrator.anchor_everywhere(&hash("dd"), &meta()).await;

        let algorand = outcome.algorand.unwrap();
        assert_eq!(algorand.status, AnchorStatus::Mock);
    }

    #[tokio::test]
    async fn unified_mode_reports_primary_and_secondary() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera),
            MockLedger::new(LedgerId::Algorand),
            MockLedger::new(LedgerId::Xrpl),
        );
        let request = AnchorRequest::for_hash(hash("ee"));
        let outcome = orchestrator
            .anchor_unified(&request, &RoutingHint::default())
            .await;

        let (primary_ledger, _) = outcome.primary.unwrap();
        let (secondary_ledger, _) = outcome.secondary.unwrap();
        assert_eq!(primary_ledger, LedgerId::Xrpl);
        assert_eq!(secondary_ledger, LedgerId::Algorand);
    }

    #[tokio::test]
    async fn unified_mode_falls_back_when_first_rail_fails() {
        let orchestrator = orchestrator(
            MockLedger::new(LedgerId::Hedera),
            MockLedger::new(LedgerId::Algorand),
            MockLedger::new(LedgerId::Xrpl).failing(),
        );
        let request = AnchorRequest::for_hash(hash("ff"));
        let outcome = orchestrator
            .anchor_unified(&request, &RoutingHint::default())
            .await;

        let (primary_ledger, _) = outcome.primary.unwrap();
        assert_eq!(primary_ledger, LedgerId::Algorand);
        assert!(outcome.secondary.is_none());
    }
}
