//! `od_config` - Configuration parsing and validation for Opsdeck
//!
//! This crate provides:
//! - TOML configuration parsing
//! - Default value handling
//! - Environment variable overrides
//! - Path expansion (`~/` to home directory)
//! - Auto-discovery from standard config paths

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OdConfig {
    /// Global settings
    pub global: GlobalConfig,

    /// Record store settings
    pub store: StoreConfig,

    /// Forecast settings
    pub forecast: ForecastConfig,

    /// Barcode label settings
    pub barcode: BarcodeConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Directory holding the table CSV files
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Enable JSON logging
    pub json_logs: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Default data directory using XDG directories
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opsdeck")
        .join("data")
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Take an exclusive file lock around each append's read-modify-write
    /// cycle. Off by default; the unlocked behavior matches the original
    /// file format's accepted lost-update limitation.
    pub locking: bool,
}

/// Forecast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Default horizon for sales forecasts, in days
    pub horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { horizon_days: 7 }
    }
}

/// Barcode label configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeConfig {
    /// Prefix for generated inventory labels
    pub label_prefix: String,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            label_prefix: "CBW".to_string(),
        }
    }
}

/// Expand tilde in path to home directory
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

impl GlobalConfig {
    pub fn expand_paths(&mut self) {
        self.data_dir = expand_path(&self.data_dir);
    }
}

impl OdConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading config");
        let contents = std::fs::read_to_string(path)?;
        let mut config: OdConfig = toml::from_str(&contents)?;
        config.expand_all_paths();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load the first config found on the standard search paths, or defaults
    /// (plus env overrides) when none exists.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a discovered file fails to load.
    pub fn discover_with_env() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_with_env(&path);
            }
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.expand_all_paths();
        config.validate()?;
        Ok(config)
    }

    /// Config file locations, in search order.
    #[must_use]
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("opsdeck.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("opsdeck").join("config.toml"));
        }
        paths
    }

    /// Expand all paths in configuration (resolve `~/` to home directory)
    pub fn expand_all_paths(&mut self) {
        self.global.expand_paths();
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OD_DATA_DIR") {
            self.global.data_dir = expand_path(&PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("OD_LOG_LEVEL") {
            self.global.log_level = val;
        }
        if let Ok(val) = std::env::var("OD_LOCKING") {
            self.store.locking = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("OD_FORECAST_DAYS") {
            match val.parse() {
                Ok(days) => self.forecast.horizon_days = days,
                Err(e) => {
                    warn!(value = %val, error = %e, "Ignoring unparseable OD_FORECAST_DAYS");
                }
            }
        }
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when validation rules are violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.global.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.global.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.forecast.horizon_days == 0 || self.forecast.horizon_days > 365 {
            return Err(ConfigError::ValidationError(
                "forecast.horizon_days must be between 1 and 365".to_string(),
            ));
        }

        if self.barcode.label_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "barcode.label_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
