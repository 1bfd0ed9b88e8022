#![warn(missing_docs)]
//! # unidash-gateway
//!
//! ## Purpose
//! Talks to the remote WhatsApp connection-management gateway.
//!
//! ## Responsibilities
//! - Catalogue the gateway operations with their paths, verbs and the
//!   credential each one requires.
//! - Execute calls through an injectable [`GatewayTransport`], with
//!   [`HttpGateway`] as the `reqwest` implementation.
//! - Resolve the active endpoint and admin credential before dispatch and
//!   refuse calls whose credential is missing.
//! - Translate transport failures into [`unidash_core::ConsoleError`].
//!
//! ## Data flow
//! Lifecycle code calls [`GatewayClient::invoke`] -> the client asks the
//! [`unidash_config::ConfigResolver`] for the endpoint -> picks the admin or
//! instance [`Credential`] -> [`GatewayTransport::invoke`] returns JSON.
//!
//! ## Ownership and lifetimes
//! The client holds shared `Arc` handles to the resolver and transport and is
//! cheap to clone. Responses are returned as owned `serde_json::Value`s.
//!
//! ## Error model
//! Transports raise [`GatewayError`]. [`GatewayClient`] converts it into
//! `ConsoleError::Gateway`, using the remote message when the body carries
//! one and a per-operation fallback otherwise. Missing credentials never
//! reach the transport.
//!
//! ## Security and privacy notes
//! Credentials travel only in request headers. `Debug` output of
//! [`Credential`] is masked and logged response bodies are redacted.
//!
//! ## Example
//! ```rust
//! use unidash_gateway::{CredentialKind, GatewayOperation};
//!
//! assert_eq!(GatewayOperation::ListInstances.path(), "/instance/all");
//! assert_eq!(GatewayOperation::Connect.credential_kind(), CredentialKind::Instance);
//! ```

mod client;
mod error;
mod http;
mod operation;

use async_trait::async_trait;
use serde_json::Value;

pub use client::GatewayClient;
pub use error::{GatewayError, extract_remote_message};
pub use http::{DEFAULT_HTTP_TIMEOUT, HttpGateway};
pub use operation::{Credential, CredentialKind, GatewayOperation, HttpMethod};

/// Abstract transport used by [`GatewayClient`].
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Sends `operation` to the gateway at `base_url`.
    ///
    /// `payload` is sent as the JSON body when present. A success response
    /// with an empty body is returned as `Value::Null`.
    async fn invoke(
        &self,
        base_url: &str,
        operation: GatewayOperation,
        credential: &Credential,
        payload: Option<&Value>,
    ) -> Result<Value, GatewayError>;
}
