//! Shared fixtures for lifecycle integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;
use unidash_config::{BuildTimeProvider, ConfigProvider, ConfigResolver, ManualClock};
use unidash_gateway::{Credential, GatewayClient, GatewayError, GatewayOperation, GatewayTransport};
use unidash_lifecycle::InstanceLifecycle;

/// One call observed by [`ScriptedTransport`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: GatewayOperation,
    pub credential: Credential,
    pub payload: Option<Value>,
}

/// Transport replaying queued responses, optionally held behind a gate.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<Value, GatewayError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every call waits for `gate` to be notified before answering.
    pub fn gated(responses: impl IntoIterator<Item = Result<Value, GatewayError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(responses)
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl GatewayTransport for ScriptedTransport {
    async fn invoke(
        &self,
        _base_url: &str,
        operation: GatewayOperation,
        credential: &Credential,
        payload: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            operation,
            credential: credential.clone(),
            payload: payload.cloned(),
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted response".to_string())))
    }
}

/// Lifecycle wired to `transport`, a manual clock and a fixed endpoint.
#[allow(dead_code)]
pub fn lifecycle(
    transport: Arc<ScriptedTransport>,
    admin_token: Option<&str>,
) -> (InstanceLifecycle, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    let provider: Arc<dyn ConfigProvider> = Arc::new(BuildTimeProvider::new(
        Some("https://gw.example.test".to_string()),
        admin_token.map(str::to_string),
    ));
    let resolver = Arc::new(ConfigResolver::new(vec![provider], clock.clone()));
    let gateway = GatewayClient::new(resolver, transport);
    (InstanceLifecycle::new(gateway, clock.clone()), clock)
}

/// Parses a contract fixture shared with the schema tests.
#[allow(dead_code)]
pub fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture should be valid json")
}
