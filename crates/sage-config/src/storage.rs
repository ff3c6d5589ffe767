//! Local project storage location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the project store. Empty means the platform data
    /// directory (`~/.local/share/sage` on Linux).
    #[serde(default)]
    pub data_dir: String,
}

impl StorageConfig {
    /// Resolve the data directory, falling back to `.sage/data` when the
    /// platform has no data directory.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        if !self.data_dir.is_empty() {
            return PathBuf::from(&self.data_dir);
        }
        dirs::data_dir().map_or_else(|| PathBuf::from(".sage/data"), |p| p.join("sage"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = StorageConfig {
            data_dir: "/tmp/sage-test".into(),
        };
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/sage-test"));
    }

    #[test]
    fn default_dir_ends_with_sage_or_fallback() {
        let dir = StorageConfig::default().resolved_data_dir();
        assert!(dir.ends_with("sage") || dir.ends_with(".sage/data"));
    }
}
