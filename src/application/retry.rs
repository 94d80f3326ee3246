//! Idempotency guard and retry policy for side-effecting operations

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::ledger::{SwapRecord, SwapStore};
use crate::shared::errors::SwapError;

/// Retry policy for transient failures: linear-growth backoff of
/// `base_delay * attempt_number`, capped at `max_attempts` attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// What happened when an operation was submitted through the guard.
#[derive(Debug)]
pub enum ExecutionOutcome<T> {
    /// The operation ran (possibly after retries) and produced a value.
    Executed(T),
    /// A ledger record with the same txhash already existed; the operation
    /// was not re-executed.
    AlreadyRecorded(SwapRecord),
}

/// Wraps irreversible operations (broadcast + record) with a duplicate
/// check against the ledger and a retry loop for transient failures.
///
/// Validation and not-found failures surface immediately: re-running a
/// deterministic failure only repeats it.
pub struct IdempotentExecutor {
    store: Arc<dyn SwapStore>,
    policy: RetryPolicy,
}

impl IdempotentExecutor {
    pub fn new(store: Arc<dyn SwapStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn execute<T, F, Fut>(
        &self,
        txhash: Option<&str>,
        mut operation: F,
    ) -> Result<ExecutionOutcome<T>, SwapError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, SwapError>>,
    {
        if let Some(hash) = txhash {
            if let Some(existing) = self.store.find_by_txhash(hash).await? {
                return Ok(ExecutionOutcome::AlreadyRecorded(existing));
            }
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(ExecutionOutcome::Executed(value)),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.base_delay * attempt;
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "transient failure, retrying");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
