//! Configuration management
//!
//! Settings live in `settings.json` inside the state directory:
//! ```json
//! {
//!   "storage": { "backend": "file", "keyPrefix": "app_" },
//!   "logging": { "enabled": true }
//! }
//! ```
//! Fields this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::services::DEFAULT_KEY_PREFIX;

/// Environment variable overriding the configured storage backend
pub const BACKEND_ENV: &str = "WALLET_STATE_BACKEND";

/// Environment variable overriding the state directory
pub const STATE_DIR_ENV: &str = "WALLET_STATE_DIR";

/// Where persisted state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map; gone when the process exits
    Memory,
    /// `state.json` in the state directory
    #[default]
    File,
    /// `state.duckdb` in the state directory
    DuckDb,
    /// No durable storage: the store starts from defaults and saves nothing
    #[serde(rename = "none")]
    Disabled,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::DuckDb => "duckdb",
            StorageBackend::Disabled => "none",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "duckdb" => Ok(StorageBackend::DuckDb),
            "none" | "off" | "disabled" => Ok(StorageBackend::Disabled),
            other => Err(Error::Config(format!("unknown storage backend '{}'", other))),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    storage: StorageSettings,
    #[serde(default)]
    logging: LoggingSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default)]
    backend: StorageBackend,
    #[serde(default = "default_key_prefix")]
    key_prefix: String,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            key_prefix: default_key_prefix(),
            other: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoggingSettings {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

/// Store configuration (simplified view of settings)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: StorageBackend,
    pub key_prefix: String,
    pub logging_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            key_prefix: default_key_prefix(),
            logging_enabled: true,
        }
    }
}

impl Config {
    /// Load config from the state directory
    ///
    /// A missing or malformed settings file yields the defaults. The backend
    /// can be overridden with WALLET_STATE_BACKEND.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let settings_path = state_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let backend = std::env::var(BACKEND_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(raw.storage.backend);

        Ok(Self {
            backend,
            key_prefix: raw.storage.key_prefix,
            logging_enabled: raw.logging.enabled,
        })
    }

    /// Save config to the state directory
    ///
    /// The file is re-read first so settings this crate doesn't manage, or
    /// that changed since `load`, are preserved.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        let settings_path = state_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.storage.backend = self.backend;
        settings.storage.key_prefix = self.key_prefix.clone();
        settings.logging.enabled = self.logging_enabled;

        std::fs::create_dir_all(state_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

/// State directory from WALLET_STATE_DIR, else `wallet-state` under the
/// platform data directory, else `.wallet-state` in the working directory
pub fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join("wallet-state"))
        .unwrap_or_else(|| PathBuf::from(".wallet-state"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_settings_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.key_prefix, "app_");
        assert!(config.logging_enabled);
    }

    #[test]
    fn test_malformed_settings_gives_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.key_prefix, "app_");
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(
            &settings_path,
            r#"{"storage":{"backend":"duckdb","keyPrefix":"x_","compress":true},"ui":{"scale":2}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.key_prefix, "x_");
        config.key_prefix = "wallet_".to_string();
        config.logging_enabled = false;
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(saved["storage"]["keyPrefix"], "wallet_");
        assert_eq!(saved["storage"]["compress"], true);
        assert_eq!(saved["ui"]["scale"], 2);
        assert_eq!(saved["logging"]["enabled"], false);

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.key_prefix, "wallet_");
        assert!(!reloaded.logging_enabled);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("duckdb".parse::<StorageBackend>().unwrap(), StorageBackend::DuckDb);
        assert_eq!("FILE".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!("none".parse::<StorageBackend>().unwrap(), StorageBackend::Disabled);
        assert!("s3".parse::<StorageBackend>().is_err());
        assert_eq!(
            serde_json::to_value(StorageBackend::Disabled).unwrap(),
            serde_json::json!("none")
        );
    }
}
