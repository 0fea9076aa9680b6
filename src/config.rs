use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rewrite::paths::{
    default_lexicon_path, default_ontology_path, default_telemetry_path, resolve_data_path,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rewrite: RewriteConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Lexicon, catalog and rewrite defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub lexicon_path: PathBuf,
    /// Entity catalog used for disambiguation.
    pub ontology_path: PathBuf,
    pub use_disambiguation: bool,
    /// Cache the lexicon between calls, reloading when the file changes.
    pub cache_lexicon: bool,
    pub default_user_id: String,
}

/// Telemetry store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub storage_path: PathBuf,
    /// Log every rewrite without the caller asking for it.
    pub enabled: bool,
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for JSON log files; stderr only when unset.
    pub log_dir: Option<PathBuf>,
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            lexicon_path: default_lexicon_path(),
            ontology_path: default_ontology_path(),
            use_disambiguation: true,
            cache_lexicon: false,
            default_user_id: "anonymous".to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            storage_path: default_telemetry_path(),
            enabled: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/ontology-rewrite/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match Self::from_toml_file(&config_path) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                log::debug!("No config file at {}, using defaults", config_path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse config at {}: {e}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Lexicon path, falling back to the crate's `data/` directory in development.
    pub fn lexicon_path(&self) -> PathBuf {
        resolve_data_path(&self.rewrite.lexicon_path)
    }

    /// Entity catalog path, falling back to the crate's `data/` directory in development.
    pub fn ontology_path(&self) -> PathBuf {
        resolve_data_path(&self.rewrite.ontology_path)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("ontology-rewrite").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
