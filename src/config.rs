//! Configuration management for the virtual keyboard
//!
//! Configuration is read from a platform-specific config file when present
//! and falls back to defaults otherwise.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/virtual-keyboard/config.toml` |
//! | macOS | `~/Library/Application Support/virtual-keyboard/config.toml` |
//! | Windows | `%APPDATA%\virtual-keyboard\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use virtual_keyboard::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.telemetry.results_dir = "results/run-1".into();
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("virtual-keyboard");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Matrix scanning settings
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// LED settings
    #[serde(default)]
    pub leds: LedConfig,
    /// Telemetry log settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Session output settings
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Read operator lines at all; when false every cycle is skipped
    pub read_enabled: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { read_enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedConfig {
    /// Number of LEDs on the strip
    pub count: usize,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            count: crate::leds::LED_COUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Write telemetry files at all
    pub enabled: bool,
    /// Directory receiving `usb_events.log` and `led_states.log`
    pub results_dir: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            results_dir: PathBuf::from("results"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Print each sent report to stdout
    pub echo_reports: bool,
    /// Write a JSON session report here when the session ends
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            echo_reports: true,
            report_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
