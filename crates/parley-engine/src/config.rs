//! Configuration types for parley.
//!
//! The config is a small JSON document; every field has a default so a
//! missing or partial file still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".parley/config.json";

/// Smallest accepted `ui.tick_rate_ms`.
pub const MIN_TICK_RATE_MS: u64 = 10;

/// Main configuration for parley.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Responder timing and delivery mode.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// What to do when a prompt is submitted while a response is in flight.
    #[serde(default)]
    pub busy_policy: BusyPolicy,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,

    /// Directory for log files written while the TUI owns the terminal.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".parley")
}

/// How the conversation asks the responder for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Incremental fragments via `Responder::stream`.
    #[default]
    Stream,
    /// A single resolved value via `Responder::complete`.
    Complete,
}

/// Behavior of `submit` while a response is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Refuse the new prompt.
    #[default]
    Reject,
    /// Cancel the in-flight response, then start the new one.
    CancelPrevious,
}

/// Responder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Delivery mode.
    #[serde(default)]
    pub mode: ResponseMode,

    /// Delay after each streamed fragment.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Delay before a completed response resolves.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,
}

fn default_chunk_delay_ms() -> u64 {
    100
}

fn default_completion_delay_ms() -> u64 {
    1000
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            mode: ResponseMode::default(),
            chunk_delay_ms: default_chunk_delay_ms(),
            completion_delay_ms: default_completion_delay_ms(),
        }
    }
}

impl ResponderConfig {
    /// Inter-fragment delay as a `Duration`.
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Completion delay as a `Duration`.
    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }
}

/// Color scheme for the terminal UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

/// Terminal UI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event loop tick rate.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Color scheme.
    #[serde(default)]
    pub theme: ThemeName,
}

fn default_tick_rate_ms() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            theme: ThemeName::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            responder: ResponderConfig::default(),
            busy_policy: BusyPolicy::default(),
            ui: UiConfig::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui.tick_rate_ms < MIN_TICK_RATE_MS {
            return Err(ConfigError::Invalid(format!(
                "ui.tick_rate_ms must be at least {MIN_TICK_RATE_MS}, got {}",
                self.ui.tick_rate_ms
            )));
        }
        Ok(())
    }

    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}
