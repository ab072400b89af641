//! # Counter Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_STORE_NAME="Corner Store"                                    │
//! │     TALLY_DB_PATH=/tmp/tally.db                                        │
//! │     TALLY_BARCODE_SCALE=3                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/tally.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.tally.counter/tally.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tally.toml
//! store_name = "Corner Store"
//! database_path = "/var/lib/tally/tally.db"
//!
//! [barcode]
//! scale = 2
//! height = 60
//! ```

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use tally_core::DEFAULT_STORE_NAME;

/// Largest accepted module width in pixels.
pub const MAX_BARCODE_SCALE: u32 = 8;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Could not determine the platform config directory")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Barcode image settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeSettings {
    /// Pixels per bar module.
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Bar height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_scale() -> u32 {
    2
}

fn default_height() -> u32 {
    60
}

impl Default for BarcodeSettings {
    fn default() -> Self {
        BarcodeSettings {
            scale: default_scale(),
            height: default_height(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shown in the report header.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// SQLite file. `None` means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub barcode: BarcodeSettings,
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_name: default_store_name(),
            database_path: None,
            barcode: BarcodeSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tally.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, creating the directory if needed.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store_name",
                reason: "must not be empty".into(),
            });
        }

        if !(1..=MAX_BARCODE_SCALE).contains(&self.barcode.scale) {
            return Err(ConfigError::InvalidValue {
                field: "barcode.scale",
                reason: format!("must be between 1 and {MAX_BARCODE_SCALE}"),
            });
        }

        if self.barcode.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "barcode.height",
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }

    /// Where the SQLite file lives: the configured path, or `tally.db` in
    /// the platform data directory (created if missing).
    pub fn resolve_database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoConfigDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("tally.db"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("TALLY_STORE_NAME") {
            debug!(store_name = %name, "Overriding store name from environment");
            self.store_name = name;
        }

        if let Some(path) = lookup("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(scale) = lookup("TALLY_BARCODE_SCALE") {
            match scale.parse::<u32>() {
                Ok(s) => self.barcode.scale = s,
                Err(_) => warn!(value = %scale, "Ignoring non-numeric TALLY_BARCODE_SCALE"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("tally.toml"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tally", "counter")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.store_name, DEFAULT_STORE_NAME);
        assert_eq!(config.barcode.scale, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            store_name = "Corner Store"

            [barcode]
            scale = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.store_name, "Corner Store");
        assert_eq!(config.barcode.scale, 3);
        assert_eq!(config.barcode.height, 60);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let env: HashMap<&str, &str> = [
            ("TALLY_STORE_NAME", "Night Shift"),
            ("TALLY_DB_PATH", "/tmp/override.db"),
            ("TALLY_BARCODE_SCALE", "4"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.store_name, "Night Shift");
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.barcode.scale, 4);
        assert_eq!(
            config.resolve_database_path().unwrap(),
            PathBuf::from("/tmp/override.db")
        );
    }

    #[test]
    fn test_bad_scale_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| (k == "TALLY_BARCODE_SCALE").then(|| "huge".to_string()));
        assert_eq!(config.barcode.scale, 2);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = AppConfig::default();
        config.barcode.scale = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "barcode.scale", .. })
        ));

        let mut config = AppConfig::default();
        config.store_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("tally-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("tally.toml");

        let mut config = AppConfig::default();
        config.store_name = "Station Kiosk".into();
        config.barcode.height = 80;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
