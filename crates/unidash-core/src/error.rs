//! Error taxonomy surfaced by the resolver and the lifecycle.

use thiserror::Error;

/// Errors returned to callers of the console core.
///
/// None of these are retried automatically; retry is a caller policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Caller-supplied input is malformed. No remote call was made.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A required secret is absent. No remote call was made.
    #[error("missing credential: {0}")]
    MissingCredential(String),
    /// The gateway failed or answered with a non-success status.
    #[error("gateway error: {message}")]
    Gateway {
        /// HTTP status when the gateway answered at all.
        status: Option<u16>,
        /// Remote-provided message, or a generic fallback.
        message: String,
    },
    /// No usable endpoint or credential, or the settings store failed.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Another state-changing call is already in flight for this instance.
    #[error("operation already in progress for instance {instance_id}")]
    Conflict {
        /// Instance the concurrent call targeted.
        instance_id: String,
    },
}

impl ConsoleError {
    /// Short category name used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::MissingCredential(_) => "missing_credential",
            Self::Gateway { .. } => "gateway",
            Self::Configuration(_) => "configuration",
            Self::Conflict { .. } => "conflict",
        }
    }
}
