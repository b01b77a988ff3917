use attesta_core::LedgerId;

/// Request-supplied hints for picking the primary auxiliary rail in
/// unified anchoring mode.
#[derive(Debug, Clone, Default)]
pub struct RoutingHint {
    /// Explicit rail preference from the request body.
    pub preferred: Option<LedgerId>,
    /// Caller region (ISO country code), when known.
    pub region: Option<String>,
    /// Institution label, used by institution-sharded deployments.
    pub institution: Option<String>,
}

/// Pick the auxiliary rail to try first.
///
/// Explicit preference wins; otherwise US-region callers route to XRPL and
/// everyone else to Algorand. The consensus rail is never a candidate —
/// it is always anchored regardless of the hint.
pub fn decide_chain(hint: &RoutingHint) -> LedgerId {
    match hint.preferred {
        Some(LedgerId::Algorand) => return LedgerId::Algorand,
        Some(LedgerId::Xrpl) => return LedgerId::Xrpl,
        _ => {}
    }
    if let Some(institution) = hint.institution.as_deref() {
        if institution.to_ascii_lowercase().contains("ripple") {
            return LedgerId::Xrpl;
        }
    }
    match hint.region.as_deref() {
        Some(region) if region.to_ascii_lowercase().starts_with("us") => LedgerId::Xrpl,
        Some(_) => LedgerId::Algorand,
        None => LedgerId::Xrpl,
    }
}

/// Attempt order for the two auxiliary rails given the decided primary.
pub fn aux_order(primary: LedgerId) -> [LedgerId; 2] {
    match primary {
        LedgerId::Algorand => [LedgerId::Algorand, LedgerId::Xrpl],
        _ => [LedgerId::Xrpl, LedgerId::Algorand],
    }
}
