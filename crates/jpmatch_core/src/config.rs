//! Configuration types for matchers and polling.

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest rendered value in a failure message before truncation.
pub const DEFAULT_MAX_DIAGNOSTIC_LEN: usize = 4000;

/// Top-level configuration.
///
/// ```
/// use jpmatch_core::{AbsencePolicy, Config};
///
/// let config = Config::from_toml_str(r#"
///     [matcher]
///     absence = "empty_sequence"
///
///     [eventually]
///     timeout_ms = 5000
/// "#).unwrap();
/// assert_eq!(config.matcher.absence, AbsencePolicy::EmptySequence);
/// assert_eq!(config.eventually.polling_interval_ms, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Path matcher configuration.
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Polling configuration.
    #[serde(default)]
    pub eventually: EventuallyConfig,
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| MatchError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Render configuration as TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MatchError::ConfigError(format!("failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.eventually.polling_interval_ms == 0 {
            return Err(MatchError::ConfigError(
                "eventually.polling_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a path matcher does when the path resolves to nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AbsencePolicy {
    /// Report `MatchError::NotFound`, unless the inner matcher tolerates absence.
    #[default]
    Error,
    /// Hand the inner matcher `[]` (multi-valued path) or `null` (single-valued path).
    EmptySequence,
}

/// Path matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Behaviour for paths that select nothing (default: error).
    #[serde(default)]
    pub absence: AbsencePolicy,

    /// Maximum bytes of a rendered value in failure messages (default: 4000).
    /// Zero disables truncation.
    #[serde(default = "default_max_diagnostic_len")]
    pub max_diagnostic_len: usize,
}

fn default_max_diagnostic_len() -> usize {
    DEFAULT_MAX_DIAGNOSTIC_LEN
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            absence: AbsencePolicy::Error,
            max_diagnostic_len: DEFAULT_MAX_DIAGNOSTIC_LEN,
        }
    }
}

/// Polling configuration for [`Eventually`](crate::Eventually).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventuallyConfig {
    /// Give up after this many milliseconds (default: 60000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Wait this many milliseconds between attempts (default: 10).
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_polling_interval_ms() -> u64 {
    10
}

impl Default for EventuallyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            polling_interval_ms: default_polling_interval_ms(),
        }
    }
}

impl EventuallyConfig {
    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the polling interval as a Duration.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}
