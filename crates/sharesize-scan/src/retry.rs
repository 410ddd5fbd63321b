//! Exponential backoff with jitter for remote calls.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use sharesize_core::{FetchError, RemoteUnavailable, TraversalConfig};
use tracing::warn;

/// Retry policy applied to every page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure; doubled on each further failure.
    pub base_delay: Duration,
    /// Upper bound on a single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Build the policy described by a traversal config.
    pub fn from_config(config: &TraversalConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.max_delay())
    }

    /// Backoff before the attempt following failed attempt `attempt` (1-based),
    /// without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        self.base_delay.saturating_mul(1u32 << exp).min(self.max_delay)
    }

    /// Delay to sleep after `error` ended attempt `attempt`.
    ///
    /// A server-provided retry-after wins over the computed backoff. Otherwise
    /// up to half of the backoff is added as random jitter.
    pub fn delay_for(&self, attempt: u32, error: &FetchError) -> Duration {
        if let Some(after) = error.retry_after() {
            return after.min(self.max_delay);
        }

        let backoff = self.backoff(attempt);
        let jitter_ms = (backoff.as_millis() / 2) as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        } else {
            Duration::ZERO
        };
        backoff + jitter
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, RemoteUnavailable>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(source) if !source.is_retryable() || attempt >= self.max_attempts => {
                    return Err(RemoteUnavailable {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    let delay = self.delay_for(attempt, &err);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Remote call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(500), Duration::from_secs(30))
    }
}

/// Run `operation` under `policy`.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, RemoteUnavailable>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    policy.run(operation).await
}
