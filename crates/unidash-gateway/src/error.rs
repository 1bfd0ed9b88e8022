//! Transport errors and their translation into the console taxonomy.

use serde_json::Value;
use thiserror::Error;
use unidash_core::ConsoleError;

use crate::operation::GatewayOperation;

/// Errors raised by a [`crate::GatewayTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("gateway transport failure: {0}")]
    Transport(String),
    /// The gateway answered with a non-success status.
    #[error("gateway returned http {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message found in the response body, if any.
        message: Option<String>,
    },
    /// A success response body was not valid JSON.
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Converts into `ConsoleError::Gateway` for `operation`.
    ///
    /// The remote-provided message is kept when present; otherwise the
    /// operation's generic fallback is used.
    pub fn into_console_error(self, operation: GatewayOperation) -> ConsoleError {
        let (status, message) = match self {
            Self::Status { status, message } => (Some(status), message),
            Self::Transport(_) | Self::Decode(_) => (None, None),
        };
        ConsoleError::Gateway {
            status,
            message: message.unwrap_or_else(|| operation.fallback_message().to_string()),
        }
    }
}

/// Extracts a human-readable message from an error response body.
///
/// Looks at the `error` and `message` string fields of a JSON object, in
/// that order. Non-JSON or field-less bodies yield `None`.
pub fn extract_remote_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["error", "message"].into_iter().find_map(|field| {
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    })
}
