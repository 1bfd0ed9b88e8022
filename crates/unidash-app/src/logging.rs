//! Tracing subscriber setup for the binary.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Prefix of the daily-rotated log files.
pub const LOG_FILE_PREFIX: &str = "unidash.log";

/// Installs the global subscriber.
///
/// Human-readable output goes to stderr. When `log_dir` is set, JSON lines
/// are also written to a daily-rotated file there. `RUST_LOG` overrides the
/// default `info` filter.
///
/// # Errors
/// Returns [`AppError::Logging`] when a subscriber is already installed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<(), AppError> {
    let file_layer = log_dir.map(|dir| {
        fmt::layer()
            .with_writer(rolling::daily(dir, LOG_FILE_PREFIX))
            .with_ansi(false)
            .json()
    });
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}
