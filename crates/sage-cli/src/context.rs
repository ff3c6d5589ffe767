use anyhow::Context;
use sage_client::{BackendClient, RetryPolicy};
use sage_config::SageConfig;
use sage_store::{FileStore, ProjectStore};
use sage_wizard::{SessionOptions, WizardSession};

use crate::cli::GlobalFlags;

pub type Session = WizardSession<BackendClient, FileStore>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: SageConfig,
    pub store: ProjectStore<FileStore>,
    pub backend: BackendClient,
}

impl AppContext {
    pub fn init(config: SageConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let data_dir = flags
            .data_dir
            .clone()
            .unwrap_or_else(|| config.storage.resolved_data_dir());
        let kv = FileStore::open(&data_dir)
            .with_context(|| format!("failed to open project store at {}", data_dir.display()))?;
        let backend = BackendClient::new(&config.backend, RetryPolicy::from(&config.retry))
            .context("failed to configure backend client")?;
        tracing::debug!(data_dir = %data_dir.display(), backend = backend.base_url(), "context ready");
        Ok(Self {
            config,
            store: ProjectStore::new(kv),
            backend,
        })
    }

    /// Open a session on the active project.
    pub fn session(&self) -> anyhow::Result<Session> {
        let options = SessionOptions::from(&self.config);
        Ok(WizardSession::open_active(
            self.backend.clone(),
            self.store.clone(),
            &options,
        )?)
    }
}
