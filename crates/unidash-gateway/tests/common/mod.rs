//! Shared fixtures for gateway integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use unidash_config::{BuildTimeProvider, ConfigProvider, ConfigResolver, ManualClock};
use unidash_gateway::{Credential, GatewayError, GatewayOperation, GatewayTransport};

/// One call observed by [`ScriptedTransport`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub base_url: String,
    pub operation: GatewayOperation,
    pub credential: Credential,
    pub payload: Option<Value>,
}

/// Transport replaying queued responses and recording every call.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<Value, GatewayError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
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
        base_url: &str,
        operation: GatewayOperation,
        credential: &Credential,
        payload: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            base_url: base_url.to_string(),
            operation,
            credential: credential.clone(),
            payload: payload.cloned(),
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted response".to_string())))
    }
}

/// Resolver answering with fixed build-time values.
pub fn resolver(endpoint: &str, admin_token: Option<&str>) -> Arc<ConfigResolver> {
    let provider: Arc<dyn ConfigProvider> = Arc::new(BuildTimeProvider::new(
        Some(endpoint.to_string()),
        admin_token.map(str::to_string),
    ));
    Arc::new(ConfigResolver::new(vec![provider], Arc::new(ManualClock::new(0))))
}
