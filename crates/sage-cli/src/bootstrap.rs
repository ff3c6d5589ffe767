use std::path::Path;

use anyhow::Context;
use sage_config::SageConfig;

/// Load `.env` (project-local `.sage/.env` first) and then the layered
/// configuration.
pub fn load_config() -> anyhow::Result<SageConfig> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    load_dotenv(&cwd)?;
    SageConfig::load().context("failed to load sage configuration")
}

fn load_dotenv(dir: &Path) -> anyhow::Result<()> {
    for candidate in [dir.join(".sage").join(".env"), dir.join(".env")] {
        if candidate.exists() {
            dotenvy::from_path(&candidate).with_context(|| {
                format!("failed to load dotenv file at {}", candidate.display())
            })?;
            return Ok(());
        }
    }
    Ok(())
}
