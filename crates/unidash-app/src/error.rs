use thiserror::Error;
use unidash_core::ConsoleError;
use unidash_gateway::GatewayError;

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resolver, settings or lifecycle failure.
    #[error(transparent)]
    Console(#[from] ConsoleError),
    /// HTTP transport could not be built.
    #[error("gateway setup error: {0}")]
    Gateway(#[from] GatewayError),
    /// Environment settings are malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A global subscriber was already installed.
    #[error("logging setup error: {0}")]
    Logging(String),
    /// No instance matches the given id or name.
    #[error("instance not found: {0}")]
    InstanceNotFound(String),
    /// Output could not be encoded.
    #[error("output encoding error: {0}")]
    Output(#[from] serde_json::Error),
}
