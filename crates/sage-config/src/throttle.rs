//! Request pacing for sequential and batched generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_max_in_flight() -> usize {
    1
}

const fn default_min_spacing_ms() -> u64 {
    1000
}

const fn default_batch_size() -> usize {
    3
}

const fn default_batch_pause_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleSettings {
    /// Maximum concurrent requests issued by generation loops.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Minimum gap between consecutive request starts, in milliseconds.
    #[serde(default = "default_min_spacing_ms")]
    pub min_spacing_ms: u64,

    /// Group size for batched generation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batch groups, in milliseconds.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            min_spacing_ms: default_min_spacing_ms(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

impl ThrottleSettings {
    #[must_use]
    pub const fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }

    #[must_use]
    pub const fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}
