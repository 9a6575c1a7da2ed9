//! Configuration management for the skill-graph engine.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `skillgraph.toml` file
//! 3. User config `~/.config/skillgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::rules::Severity;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,

    /// Rule validation policy.
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./skillgraph.toml` (project local)
    /// 2. `~/.config/skillgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Path of the per-user config file, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_USER_CONFIG_DIR).join("config.toml"))
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(ns) = std::env::var("SKILLGRAPH_NAMESPACE") {
            self.store.namespace = ns;
        }
        if let Ok(dir) = std::env::var("SKILLGRAPH_DATA_DIR") {
            self.store.data_dir = dir;
        }
        if let Ok(mode) = std::env::var("SKILLGRAPH_PUBLISH_MODE") {
            self.store.publish_mode = mode.parse()?;
        }
        self.validate()
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("store.namespace must not be empty".to_string()));
        }
        if self.store.namespace.contains(':') {
            return Err(ConfigError::Invalid("store.namespace must not contain ':'".to_string()));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// How publishing retains snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Keep every snapshot per graph id; readers follow the active graph id.
    #[default]
    History,
    /// Overwrite one well-known slot with the newest snapshot.
    Latest,
}

impl FromStr for PublishMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "history" => Ok(PublishMode::History),
            "latest" => Ok(PublishMode::Latest),
            other => Err(ConfigError::Invalid(format!(
                "unknown publish mode '{}', expected 'history' or 'latest'",
                other
            ))),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefix for every storage key (default: "skillgraph").
    pub namespace: String,

    /// Directory used by the file-backed store (default: ".skillgraph").
    pub data_dir: String,

    /// Snapshot retention mode.
    pub publish_mode: PublishMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            publish_mode: PublishMode::default(),
        }
    }
}

impl StoreConfig {
    /// Get the full path to the data directory.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Rule validation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Severity of a start node with incoming `requires` edges.
    ///
    /// The schema validator always treats this as an error; rule validation
    /// defaults to a warning so drafts stay editable.
    pub start_incoming_requires: Severity,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            start_incoming_requires: Severity::Warning,
        }
    }
}

impl ValidationConfig {
    /// Policy matching the schema validator's strict behavior.
    pub fn strict() -> Self {
        Self {
            start_incoming_requires: Severity::Error,
        }
    }
}
