//! # sage-config
//!
//! Layered configuration loading for Sage using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SAGE_*` prefix, `__` as separator)
//! 2. Project-level `.sage/config.toml`
//! 3. User-level `~/.config/sage/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SAGE_BACKEND__BASE_URL` -> `backend.base_url`,
//! `SAGE_RETRY__MAX_RETRIES` -> `retry.max_retries`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sage_config::SageConfig;
//!
//! let config = SageConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.base_url);
//! ```

mod autosave;
mod backend;
mod error;
mod retry;
mod storage;
mod throttle;

pub use autosave::AutosaveSettings;
pub use backend::BackendConfig;
pub use error::ConfigError;
pub use retry::RetrySettings;
pub use storage::StorageConfig;
pub use throttle::ThrottleSettings;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SageConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub throttle: ThrottleSettings,
    #[serde(default)]
    pub autosave: AutosaveSettings,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl SageConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".sage/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SAGE_").split("__"))
    }

    /// Reject values that would make the client or the generation loops
    /// misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "backend.base_url",
                format!("expected an http(s) URL, got '{url}'"),
            ));
        }
        if self.throttle.batch_size == 0 {
            return Err(ConfigError::invalid("throttle.batch_size", "must be > 0"));
        }
        if self.throttle.max_in_flight == 0 {
            return Err(ConfigError::invalid("throttle.max_in_flight", "must be > 0"));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sage").join("config.toml"))
    }

    /// Load `.env` from the workspace root, walking up from
    /// `CARGO_MANIFEST_DIR` when set, else from the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.throttle.batch_size, 3);
        assert_eq!(config.autosave.debounce_ms, 2000);
        assert!(config.autosave.enabled);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = SageConfig::default();
        config.backend.base_url = "localhost:8000".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "backend.base_url"
        ));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = SageConfig::default();
        config.throttle.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
