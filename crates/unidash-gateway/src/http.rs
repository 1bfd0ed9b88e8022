//! `reqwest` implementation of [`GatewayTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, warn};
use unidash_core::redact_sensitive;

use crate::GatewayTransport;
use crate::error::{GatewayError, extract_remote_message};
use crate::operation::{Credential, GatewayOperation, HttpMethod};

/// Request timeout used when none is configured.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

const LOGGED_BODY_LIMIT: usize = 512;

/// HTTP transport speaking JSON to the gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
}

impl HttpGateway {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Transport`] when the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl GatewayTransport for HttpGateway {
    async fn invoke(
        &self,
        base_url: &str,
        operation: GatewayOperation,
        credential: &Credential,
        payload: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        let url = operation_url(base_url, operation);
        let mut request = match operation.method() {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        }
        .header(ACCEPT, "application/json")
        .header(credential.header_name(), credential.secret());
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        debug!(operation = %operation, url = %url, "gateway request");
        let response = request
            .send()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;

        if !status.is_success() {
            warn!(
                operation = %operation,
                status = status.as_u16(),
                body = %loggable_body(&bytes),
                "gateway returned an error status"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: extract_remote_message(&bytes),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|error| GatewayError::Decode(error.to_string()))
    }
}

fn operation_url(base_url: &str, operation: GatewayOperation) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), operation.path())
}

fn loggable_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let truncated: String = text.chars().take(LOGGED_BODY_LIMIT).collect();
    redact_sensitive(&truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_operation_path() {
        assert_eq!(
            operation_url("https://gw.example.test/", GatewayOperation::Status),
            "https://gw.example.test/instance/status"
        );
        assert_eq!(
            operation_url("http://10.0.0.5:8080/api", GatewayOperation::CreateInstance),
            "http://10.0.0.5:8080/api/instance/init"
        );
    }

    #[test]
    fn logged_bodies_are_redacted() {
        let body = br#"{"error":"bad","token":"abc123secret"}"#;
        let logged = loggable_body(body);
        assert!(!logged.contains("abc123secret"));
        assert!(logged.contains("bad"));
    }
}
