//! Autosave settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_debounce_ms() -> u64 {
    2000
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutosaveSettings {
    /// Whether state changes are persisted automatically.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Quiet window for debounced saves, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AutosaveSettings {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
