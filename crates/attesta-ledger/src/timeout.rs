use std::future::Future;
use std::time::Duration;

use attesta_core::LedgerId;

use crate::error::LedgerError;

/// Race an adapter call against its per-service budget.
///
/// Elapsing the budget yields `LedgerError::Timeout`, never a generic rpc
/// failure. The underlying operation is abandoned; a late-landing
/// transaction is reconciled on demand by a later `read_by_hash`.
pub async fn with_budget<T, F>(
    ledger: LedgerId,
    budget: Duration,
    operation: F,
) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    match tokio::time::timeout(budget, operation).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout {
            ledger,
            budget_ms: budget.as_millis() as u64,
        }),
    }
}
