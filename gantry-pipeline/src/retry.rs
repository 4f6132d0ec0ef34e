//! Bounded retry with exponential backoff
//!
//! Only transient failures (`StageError::is_retryable`) consume retry
//! attempts; authentication and manifest errors surface immediately.

use gantry_core::domain::StageResult;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry bounds for a stage's transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means fail on the first error
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_backoff: Duration,
    /// Cap on the backoff delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff before the given retry (1-based), doubling up to the cap.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay_ms = (self.initial_backoff.as_millis() as u64).saturating_mul(1u64 << shift);
        Duration::from_millis(delay_ms.min(self.max_backoff.as_millis() as u64))
    }
}

/// Runs `op` until it succeeds, fails fatally, or exhausts the retry budget.
///
/// `what` names the operation in retry logs. The total number of attempts
/// is `max_retries + 1`.
pub async fn run_with_retry<F, Fut>(what: &str, policy: RetryPolicy, mut op: F) -> StageResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StageResult>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = op().await;

        match &result.error {
            Some(error) if error.is_retryable() && attempt <= policy.max_retries => {
                let delay = policy.backoff(attempt);
                warn!(
                    "{} stage failed (attempt {}/{}): {}",
                    what,
                    attempt,
                    policy.max_retries + 1,
                    error
                );
                warn!("Retrying in {:?}...", delay);

                tokio::time::sleep(delay).await;
            }
            _ => return result,
        }
    }
}
