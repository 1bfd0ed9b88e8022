//! Environment-driven application settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DATA_DIR: &str = ".unidash";
const DEFAULT_RUNTIME_CONFIG: &str = "/etc/unidash/runtime.toml";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Where the console keeps its files and how it reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Directory holding `settings.json` and `override.json`.
    pub data_dir: PathBuf,
    /// Runtime-injected gateway configuration document.
    pub runtime_config_path: PathBuf,
    /// Per-request gateway timeout.
    pub http_timeout: Duration,
    /// Directory for rotated JSON log files; stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            runtime_config_path: PathBuf::from(DEFAULT_RUNTIME_CONFIG),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_dir: None,
        }
    }
}

impl ConsoleConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// See [`ConsoleConfig::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when `UNIDASH_HTTP_TIMEOUT_SECS` is not a
    /// positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let defaults = Self::default();

        let http_timeout = match value("UNIDASH_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(AppError::Config(format!(
                        "UNIDASH_HTTP_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => defaults.http_timeout,
        };

        Ok(Self {
            data_dir: value("UNIDASH_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            runtime_config_path: value("UNIDASH_RUNTIME_CONFIG")
                .map_or(defaults.runtime_config_path, PathBuf::from),
            http_timeout,
            log_dir: value("UNIDASH_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Settings store file.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Local override file.
    pub fn override_path(&self) -> PathBuf {
        self.data_dir.join("override.json")
    }

    /// Log directory, if file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}
