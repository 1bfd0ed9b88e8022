//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use unidash_app::Console;
use unidash_config::{
    BuildTimeProvider, InMemoryLocalOverride, InMemorySettingsStore, ManualClock,
    RuntimeInjectedProvider,
};
use unidash_core::{ConnectionState, Instance, PhoneNumber, Profile};
use unidash_gateway::{Credential, GatewayError, GatewayOperation, GatewayTransport};

/// Transport replaying queued JSON bodies in order.
#[derive(Default)]
pub struct QueueTransport {
    responses: Mutex<VecDeque<Value>>,
    operations: Mutex<Vec<GatewayOperation>>,
}

#[allow(dead_code)]
impl QueueTransport {
    pub fn new(responses: impl IntoIterator<Item = Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            operations: Mutex::new(Vec::new()),
        }
    }

    pub fn operations(&self) -> Vec<GatewayOperation> {
        self.operations.lock().expect("operations lock").clone()
    }
}

#[async_trait]
impl GatewayTransport for QueueTransport {
    async fn invoke(
        &self,
        _base_url: &str,
        operation: GatewayOperation,
        _credential: &Credential,
        _payload: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        self.operations.lock().expect("operations lock").push(operation);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| GatewayError::Transport("no scripted response".to_string()))
    }
}

/// Console over in-memory stores with no runtime file and no build values.
#[allow(dead_code)]
pub fn console(transport: Arc<QueueTransport>) -> Console {
    Console::assemble(
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(InMemoryLocalOverride::new()),
        RuntimeInjectedProvider::new("/nonexistent/unidash/runtime.toml"),
        BuildTimeProvider::default(),
        transport,
        Arc::new(ManualClock::new(1_000)),
    )
}

/// Instance in the given connection state.
#[allow(dead_code)]
pub fn instance(id: &str, state: ConnectionState) -> Instance {
    let mut instance = Instance::new(id, format!("bot-{id}")).with_token(format!("tok-{id}"));
    instance.state = state;
    instance
}

/// Connected state for `phone`.
#[allow(dead_code)]
pub fn connected(phone: &str) -> ConnectionState {
    ConnectionState::Connected {
        phone: PhoneNumber::parse(phone).expect("phone should parse"),
        profile: Profile {
            name: Some("Bot".to_string()),
            picture_url: None,
        },
    }
}
