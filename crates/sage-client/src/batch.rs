//! Fixed-size concurrent batches with per-operation retry.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use sage_config::ThrottleSettings;

use crate::error::Retryable;
use crate::retry::{RetryPolicy, with_retry};

/// Delay between consecutive starts inside one batch.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Pause after each batch except the last.
    pub pause: Duration,
    pub stagger: Duration,
}

impl From<&ThrottleSettings> for BatchOptions {
    fn from(settings: &ThrottleSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            pause: settings.batch_pause(),
            stagger: DEFAULT_STAGGER,
        }
    }
}

/// Run `ops` in groups of `batch_size`, each wrapped in [`with_retry`].
///
/// The result vector is indexed like `ops`. An operation that still fails
/// after its retries yields `None` and does not abort the rest.
pub async fn batch_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    ops: Vec<F>,
    options: BatchOptions,
) -> Vec<Option<T>>
where
    E: Retryable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total = ops.len();
    let batch_size = options.batch_size.max(1);
    let mut results = Vec::with_capacity(total);
    let mut ops = ops.into_iter().enumerate().peekable();

    while ops.peek().is_some() {
        let group: Vec<(usize, F)> = ops.by_ref().take(batch_size).collect();
        let futures = group.into_iter().enumerate().map(|(slot, (index, op))| {
            let start_after = options
                .stagger
                .saturating_mul(u32::try_from(slot).unwrap_or(u32::MAX));
            run_one(policy, index, op, start_after)
        });
        results.extend(join_all(futures).await);

        if ops.peek().is_some() && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }
    }

    tracing::debug!(
        total,
        failed = results.iter().filter(|r| r.is_none()).count(),
        "batch finished"
    );
    results
}

async fn run_one<T, E, F, Fut>(
    policy: &RetryPolicy,
    index: usize,
    op: F,
    start_after: Duration,
) -> Option<T>
where
    E: Retryable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if !start_after.is_zero() {
        tokio::time::sleep(start_after).await;
    }
    match with_retry(policy, op).await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(index, %err, "batch operation failed");
            None
        }
    }
}
