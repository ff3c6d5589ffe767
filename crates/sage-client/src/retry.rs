//! Exponential backoff for rate-limited backend calls.
//!
//! Only the rate-limit class of errors (429, 503, or a message mentioning a
//! rate limit) is retried. Everything else surfaces after one attempt so a
//! malformed request is never repeated.

use std::future::Future;
use std::time::Duration;

use sage_config::RetrySettings;
use sage_core::ids;

use crate::error::Retryable;

/// Backoff parameters applied by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: settings.base_delay(),
            max_jitter: settings.max_jitter(),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay before retrying after failed attempt `attempt` (0-based),
    /// without jitter: `base * 2^attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    fn jitter(&self) -> Duration {
        let bound = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(ids::random_below(bound))
    }

    fn delay_for<E: Retryable>(&self, attempt: u32, err: &E) -> Duration {
        let computed = self.backoff(attempt) + self.jitter();
        err.retry_after_secs()
            .map_or(computed, |secs| computed.max(Duration::from_secs(secs)))
    }
}

/// Run `op` until it succeeds, fails with a non-rate-limit error, or the
/// policy's retries are exhausted.
///
/// # Errors
///
/// Returns the last error produced by `op`.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt, &err);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    %err,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
