//! Configuration persistence utilities
//!
//! Loads and saves per-view settings as TOML under the platform config
//! directory.

use directories::ProjectDirs;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to determine config directory
    NoConfigDir,
    /// IO error while reading/writing config
    Io(io::Error),
    /// Failed to parse config file
    Parse(toml::de::Error),
    /// Failed to serialize config
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NoConfigDir => None,
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Get the base configuration directory for all views
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("me", "sunrise-sunset", "sunrise-sunset")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the configuration file path for a specific view
pub fn config_path(view_name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", view_name)))
}

/// Load configuration for a specific view
///
/// Returns `None` if the config file doesn't exist yet.
/// Returns an error if the file exists but can't be parsed.
pub fn load_config<T: DeserializeOwned>(view_name: &str) -> Result<Option<T>, ConfigError> {
    let path = config_path(view_name).ok_or(ConfigError::NoConfigDir)?;
    load_config_from(&path)
}

/// Save configuration for a specific view
pub fn save_config<T: Serialize>(view_name: &str, config: &T) -> Result<(), ConfigError> {
    let path = config_path(view_name).ok_or(ConfigError::NoConfigDir)?;
    save_config_to(&path, config)
}

/// Load configuration from an explicit path
pub fn load_config_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let config: T = toml::from_str(&contents)?;
    debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

/// Save configuration to an explicit path, creating parent directories
pub fn save_config_to<T: Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    debug!("Saved config to {}", path.display());
    Ok(())
}
