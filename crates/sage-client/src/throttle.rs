//! Request pacing for sequential generation loops.
//!
//! A [`Throttle`] bounds the number of requests in flight and enforces a
//! minimum gap between consecutive request starts.

use std::sync::Arc;
use std::time::Duration;

use sage_config::ThrottleSettings;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct Throttle {
    permits: Arc<Semaphore>,
    min_spacing: Duration,
    last_start: Arc<Mutex<Option<Instant>>>,
}

/// Held for the duration of one request; dropping it frees the slot.
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

impl Throttle {
    #[must_use]
    pub fn new(max_in_flight: usize, min_spacing: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            min_spacing,
            last_start: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub const fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// Wait for a free slot and for `min_spacing` to elapse since the
    /// previous start.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Throttle`] if the semaphore has been closed.
    pub async fn acquire(&self) -> Result<ThrottlePermit, ClientError> {
        let permit = Arc::clone(&self.permits).acquire_owned().await?;
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_spacing).await;
        }
        *last = Some(Instant::now());
        Ok(ThrottlePermit { _permit: permit })
    }

    /// Number of requests that could start right now without waiting on a slot.
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl From<&ThrottleSettings> for Throttle {
    fn from(settings: &ThrottleSettings) -> Self {
        Self::new(settings.max_in_flight, settings.min_spacing())
    }
}
