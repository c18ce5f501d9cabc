// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::application::AutosaveSettings;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_DEBOUNCE_MS, STORE_DIR_NAME};

/// TOML configuration for notedit
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AutosaveConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_flush_on_close")]
    pub flush_on_close: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct StoreConfig {
    /// Notes directory; empty means the platform data directory.
    #[serde(default)]
    pub path: String,
    /// Base URL of a notes API; non-empty selects the HTTP store.
    #[serde(default)]
    pub remote_url: String,
}

// Default value functions
fn default_debounce_ms() -> u64 { DEFAULT_DEBOUNCE_MS }
fn default_flush_on_close() -> bool { true }

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            flush_on_close: default_flush_on_close(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load from `path`, or from the platform config file when none is given.
    /// A missing file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            debug!(?path, "No config file, using defaults");
            return Ok(Self::default());
        }
        debug!(?path, "Loading config");
        Self::load(&path).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn autosave_settings(&self) -> AutosaveSettings {
        AutosaveSettings {
            debounce: Duration::from_millis(self.autosave.debounce_ms),
            flush_on_close: self.autosave.flush_on_close,
        }
    }

    pub fn store_dir(&self) -> Result<PathBuf> {
        if !self.store.path.is_empty() {
            return Ok(PathBuf::from(&self.store.path));
        }
        let data_dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(data_dir.join(STORE_DIR_NAME))
    }

    pub fn remote_url(&self) -> Option<&str> {
        Some(self.store.remote_url.as_str()).filter(|url| !url.is_empty())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_config_when_saving_then_writes_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let config = Config::default();
        config.save(&config_path).unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[autosave]"));
        assert!(content.contains("[store]"));
    }

    #[test]
    fn given_toml_file_when_loading_then_reads_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("load_test.toml");

        let toml_content = r#"
[autosave]
debounce_ms = 250
flush_on_close = false

[store]
path = "/tmp/notes"
remote_url = "http://localhost:3000"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.autosave.debounce_ms, 250);
        assert!(!config.autosave.flush_on_close);
        assert_eq!(config.store_dir().unwrap(), PathBuf::from("/tmp/notes"));
        assert_eq!(config.remote_url(), Some("http://localhost:3000"));
    }

    #[test]
    fn given_partial_toml_when_loading_then_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[store]\npath = \"/notes\"\n").unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.autosave.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert!(config.autosave.flush_on_close);
        assert_eq!(config.remote_url(), None);
    }

    #[test]
    fn given_missing_file_when_loading_or_default_then_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("absent.toml");

        let config = Config::load_or_default(Some(&config_path)).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.autosave_settings().debounce,
            Duration::from_millis(DEFAULT_DEBOUNCE_MS)
        );
    }

    #[test]
    fn given_invalid_toml_when_loading_then_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[autosave\ndebounce_ms = ").unwrap();

        assert!(Config::load(&config_path).is_err());
    }
}
