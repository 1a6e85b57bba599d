//! Configuration management

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings, layered from `settings.toml` and `DASHBOARD_*` variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Upper bound for a single remote call, in seconds
    pub remote_timeout_secs: u64,
    /// Sort key used by `list` when none is given
    pub default_sort: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            remote_timeout_secs: 10,
            default_sort: "created".to_string(),
        }
    }
}

impl AppSettings {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }
}

pub struct SettingsManager;

impl SettingsManager {
    /// Get the dashboard home directory (~/.domain-dashboard)
    pub fn dashboard_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("DASHBOARD_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".domain-dashboard"))
    }

    /// Directory holding the key-value files
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::dashboard_home()?.join("store"))
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::dashboard_home()?.join("settings.toml"))
    }

    pub fn load() -> Result<AppSettings> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from `path` (optional) overlaid with the environment
    pub fn load_from(path: &Path) -> Result<AppSettings> {
        let defaults = AppSettings::default();
        let settings = config::Config::builder()
            .set_default("remote_timeout_secs", defaults.remote_timeout_secs)?
            .set_default("default_sort", defaults.default_sort)?
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix("DASHBOARD"))
            .build()
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid settings in {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = SettingsManager::load_from(&dir.path().join("settings.toml"))?;
        assert_eq!(settings.default_sort, "created");
        assert_eq!(settings.remote_timeout(), Duration::from_secs(10));
        Ok(())
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "remote_timeout_secs = 3\ndefault_sort = \"progress\"\n")?;

        let settings = SettingsManager::load_from(&path)?;
        assert_eq!(settings.remote_timeout_secs, 3);
        assert_eq!(settings.default_sort, "progress");
        Ok(())
    }
}
