#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for sealpatch
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/sealpatch/config.toml)

pub mod constants;

use serde::{Deserialize, Serialize};
use sealpatch_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub presets: PresetConfig,
}

/// Operation log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Maximum retained log entries; oldest are evicted first.
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
}

/// Heartbeat progress configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Milliseconds between simulated ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Percent added per tick.
    #[serde(default = "default_tick_increment")]
    pub tick_increment: u8,
    /// Ceiling while the operation is still in flight.
    #[serde(default = "default_tick_ceiling")]
    pub tick_ceiling: u8,
    /// Milliseconds the 100% display is held before resetting to 0.
    #[serde(default = "default_reset_grace_ms")]
    pub reset_grace_ms: u64,
}

/// Preset source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetConfig {
    /// Directory of declarative preset definitions.
    #[serde(default = "default_preset_definitions_dir")]
    pub definitions_dir: PathBuf,
    /// Parallel tree of versioned payload files.
    #[serde(default = "default_preset_files_dir")]
    pub files_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            tick_increment: default_tick_increment(),
            tick_ceiling: default_tick_ceiling(),
            reset_grace_ms: default_reset_grace_ms(),
        }
    }
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            definitions_dir: default_preset_definitions_dir(),
            files_dir: default_preset_files_dir(),
        }
    }
}

fn default_log_capacity() -> usize {
    100
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_tick_increment() -> u8 {
    5
}

fn default_tick_ceiling() -> u8 {
    95
}

fn default_reset_grace_ms() -> u64 {
    3000
}

fn default_preset_definitions_dir() -> PathBuf {
    PathBuf::from("/Library/Application Support/sealpatch/Presets")
}

fn default_preset_files_dir() -> PathBuf {
    PathBuf::from("/Library/Application Support/sealpatch/PresetFiles")
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or
    /// parsed.
    pub async fn load() -> Result<Self, Error> {
        let path = Self::default_path();
        match path {
            Some(path) if path.exists() => Self::load_from(&path).await,
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Default configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sealpatch").join("config.toml"))
    }

    /// Validate ranges the rest of the system relies on.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.log.capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "log.capacity must be at least 1".to_string(),
            }
            .into());
        }
        if self.progress.tick_ceiling >= 100 {
            return Err(ConfigError::Invalid {
                message: "progress.tick_ceiling must stay below 100".to_string(),
            }
            .into());
        }
        if self.progress.tick_increment == 0 {
            return Err(ConfigError::Invalid {
                message: "progress.tick_increment must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
