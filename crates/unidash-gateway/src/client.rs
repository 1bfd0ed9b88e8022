//! Credential-aware dispatch on top of a transport.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use unidash_config::ConfigResolver;
use unidash_core::ConsoleError;

use crate::GatewayTransport;
use crate::operation::{Credential, CredentialKind, GatewayOperation};

/// Gateway client bound to the active configuration.
#[derive(Clone)]
pub struct GatewayClient {
    resolver: Arc<ConfigResolver>,
    transport: Arc<dyn GatewayTransport>,
}

impl GatewayClient {
    /// Creates a client over a resolver and a transport.
    pub fn new(resolver: Arc<ConfigResolver>, transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    /// Resolver consulted before every call.
    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        &self.resolver
    }

    /// Invokes `operation`.
    ///
    /// Instance-scoped operations use `instance_token`; account-wide ones use
    /// the admin token from the active configuration.
    ///
    /// # Errors
    /// - [`ConsoleError::MissingCredential`] when an instance-scoped call has
    ///   no token. Nothing is resolved or sent.
    /// - [`ConsoleError::Configuration`] when an account-wide call has no
    ///   admin token configured. Nothing is sent.
    /// - [`ConsoleError::Gateway`] when the transport fails.
    pub async fn invoke(
        &self,
        operation: GatewayOperation,
        instance_token: Option<&str>,
        payload: Option<&Value>,
    ) -> Result<Value, ConsoleError> {
        let instance_token = match operation.credential_kind() {
            CredentialKind::Instance => Some(
                instance_token
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| {
                        ConsoleError::MissingCredential(format!(
                            "instance token required for {operation}"
                        ))
                    })?,
            ),
            CredentialKind::Admin => None,
        };

        let config = self.resolver.resolve().await;
        let credential = match instance_token {
            Some(token) => Credential::Instance(token.to_string()),
            None if config.has_admin_token() => Credential::Admin(config.admin_token.clone()),
            None => {
                return Err(ConsoleError::Configuration(format!(
                    "admin token is not configured; {operation} needs it"
                )));
            }
        };

        debug!(operation = %operation, source = %config.source, "dispatching gateway call");
        self.transport
            .invoke(&config.endpoint_url, operation, &credential, payload)
            .await
            .map_err(|error| {
                warn!(operation = %operation, error = %error, "gateway call failed");
                error.into_console_error(operation)
            })
    }
}
