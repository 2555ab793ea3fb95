//! Bounded exponential backoff around ISC API calls.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::{IscError, IscResult};

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default backoff unit.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// Retry policy for transient API failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    /// Backoff unit; retry `n` waits `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Whether a failure of attempt `retries_done + 1` should be retried.
    #[must_use]
    pub fn should_retry(&self, retries_done: u32, error: &IscError) -> bool {
        retries_done < self.max_retries && error.is_transient()
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry.min(31)))
    }

    /// Runs `f` until it succeeds, fails with a non-transient error, or the
    /// retry budget is spent. The last error is returned unchanged.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> IscResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = IscResult<T>>,
    {
        let mut retries: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(
                            operation,
                            attempts = retries + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if !self.should_retry(retries, &err) {
                        if retries > 0 && err.is_transient() {
                            warn!(
                                operation,
                                attempts = retries + 1,
                                error = %err,
                                "Retries exhausted"
                            );
                        }
                        return Err(err);
                    }

                    retries += 1;
                    let delay = self.delay_for(retries);
                    debug!(
                        operation,
                        retry = retries,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying API call after request error"
                    );
                    error!(operation, error = %err, "API request failed");

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
