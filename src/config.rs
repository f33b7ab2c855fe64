//! CLI configuration loaded from ~/.bmson-timing/config.yaml.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialization format for the emitted timing structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub format: OutputFormat,
    /// Reject non-finite or non-positive tempos instead of passing them through.
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "Config::default_pretty")]
    pub pretty: bool,
    /// One of off, error, warn, info, debug, trace.
    #[serde(default = "Config::default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Standard config path, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bmson-timing").join("config.yaml"))
    }

    /// Load from `path`, falling back to defaults when the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load from the standard path, or defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parsed `log_level`; unknown names fall back to `Warn`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }

    fn default_pretty() -> bool {
        true
    }

    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            strict: false,
            pretty: Self::default_pretty(),
            log_level: Self::default_log_level(),
        }
    }
}
