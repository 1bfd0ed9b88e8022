//! Instance operations mediated through the gateway.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, warn};
use unidash_config::Clock;
use unidash_core::{ConnectionState, ConsoleError, Instance, PhoneNumber};
use unidash_gateway::{GatewayClient, GatewayError, GatewayOperation};

use crate::locks::InstanceLocks;
use crate::machine::InstanceStateMachine;
use crate::remote::{RemoteInstance, RemoteReport};

/// Lifetime of a pairing artifact when the gateway gives none.
pub const DEFAULT_PAIRING_TTL_MS: u64 = 120_000;

/// Outcome of a connect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectResult {
    /// Instance snapshot after the call.
    pub instance: Instance,
}

impl ConnectResult {
    /// QR payload to display, if one was issued.
    pub fn qr_code(&self) -> Option<&str> {
        self.instance.pairing_artifact().and_then(|artifact| artifact.qr_code())
    }

    /// Pairing code to type on the phone, if one was issued.
    pub fn pairing_code(&self) -> Option<&str> {
        self.instance
            .pairing_artifact()
            .and_then(|artifact| artifact.pairing_code())
    }
}

/// Creates, pairs, polls and tears down gateway instances.
///
/// Every operation returns a fresh snapshot; the caller's copy is never
/// mutated, so a result discarded by the caller leaves no trace.
pub struct InstanceLifecycle {
    gateway: GatewayClient,
    locks: InstanceLocks,
    clock: Arc<dyn Clock>,
    pairing_ttl_ms: u64,
}

impl InstanceLifecycle {
    /// Creates a lifecycle with the default pairing TTL.
    pub fn new(gateway: GatewayClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            locks: InstanceLocks::new(),
            clock,
            pairing_ttl_ms: DEFAULT_PAIRING_TTL_MS,
        }
    }

    /// Overrides the pairing artifact lifetime.
    pub fn with_pairing_ttl_ms(mut self, pairing_ttl_ms: u64) -> Self {
        self.pairing_ttl_ms = pairing_ttl_ms;
        self
    }

    /// Allocates a new instance on the gateway.
    ///
    /// # Errors
    /// - [`ConsoleError::Validation`] for a blank name.
    /// - [`ConsoleError::Configuration`] when no admin token is configured.
    /// - [`ConsoleError::Gateway`] when the call fails or the response has no
    ///   instance id.
    pub async fn create(&self, name: &str, system_name: Option<&str>) -> Result<Instance, ConsoleError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::Validation("instance name must not be empty".to_string()));
        }

        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::from(name));
        if let Some(system_name) = system_name.map(str::trim).filter(|value| !value.is_empty()) {
            payload.insert("systemName".to_string(), Value::from(system_name));
        }

        let body = self
            .gateway
            .invoke(GatewayOperation::CreateInstance, None, Some(&Value::Object(payload)))
            .await?;
        let created = RemoteInstance::from_create_response(&body).ok_or_else(|| {
            GatewayError::Decode("create response has no instance id".to_string())
                .into_console_error(GatewayOperation::CreateInstance)
        })?;

        let mut instance = created.into_instance(self.clock.now_ms(), self.pairing_ttl_ms);
        if instance.name.is_empty() {
            instance.name = name.to_string();
        }
        if instance.system_name.is_none() {
            instance.system_name = system_name.map(str::to_string);
        }
        // A new instance is always unpaired regardless of what the body says.
        instance.state = ConnectionState::Disconnected;

        info!(instance_id = %instance.id, has_token = instance.token.is_some(), "instance created");
        Ok(instance)
    }

    /// Requests a QR payload to pair a device.
    ///
    /// # Errors
    /// - [`ConsoleError::MissingCredential`] without a token; nothing is sent.
    /// - [`ConsoleError::Validation`] when the instance is already connected.
    /// - [`ConsoleError::Conflict`] when another connect or disconnect for
    ///   the same instance is in flight.
    /// - [`ConsoleError::Gateway`] when the call fails.
    pub async fn connect(&self, instance: &Instance) -> Result<ConnectResult, ConsoleError> {
        self.connect_inner(instance, None).await
    }

    /// Requests a numeric pairing code for `phone` instead of a QR payload.
    ///
    /// # Errors
    /// As [`InstanceLifecycle::connect`], plus [`ConsoleError::Validation`]
    /// for a malformed phone number.
    pub async fn connect_with_phone(&self, instance: &Instance, phone: &str) -> Result<ConnectResult, ConsoleError> {
        let phone = PhoneNumber::parse(phone)
            .ok_or_else(|| ConsoleError::Validation(format!("invalid phone number: {phone:?}")))?;
        self.connect_inner(instance, Some(phone)).await
    }

    async fn connect_inner(&self, instance: &Instance, phone: Option<PhoneNumber>) -> Result<ConnectResult, ConsoleError> {
        let token = instance.require_token()?;
        let mut machine = InstanceStateMachine::from_state(instance.state.clone());
        machine.begin_connect()?;
        let _guard = self.locks.try_acquire(&instance.id)?;

        let payload = match &phone {
            Some(phone) => json!({ "phone": phone.as_str() }),
            None => json!({}),
        };
        let body = self
            .gateway
            .invoke(GatewayOperation::Connect, Some(token), Some(&payload))
            .await?;

        let report = RemoteReport::from_response(&body);
        machine.on_connect_response(&report, self.clock.now_ms(), self.pairing_ttl_ms);

        let mut updated = instance.clone();
        updated.state = machine.into_state();
        info!(
            instance_id = %updated.id,
            status = %updated.status(),
            with_phone = phone.is_some(),
            "connect requested"
        );
        Ok(ConnectResult { instance: updated })
    }

    /// Tears down the device session.
    ///
    /// An instance already `Disconnected` is returned unchanged without a
    /// gateway call.
    ///
    /// # Errors
    /// - [`ConsoleError::MissingCredential`] without a token.
    /// - [`ConsoleError::Conflict`] when another state-changing call for the
    ///   same instance is in flight.
    /// - [`ConsoleError::Gateway`] when the call fails.
    pub async fn disconnect(&self, instance: &Instance) -> Result<Instance, ConsoleError> {
        let token = instance.require_token()?;
        if instance.state == ConnectionState::Disconnected {
            return Ok(instance.clone());
        }
        let _guard = self.locks.try_acquire(&instance.id)?;

        self.gateway
            .invoke(GatewayOperation::Disconnect, Some(token), None)
            .await?;

        let mut machine = InstanceStateMachine::from_state(instance.state.clone());
        machine.on_disconnected();
        let mut updated = instance.clone();
        updated.state = machine.into_state();
        info!(instance_id = %updated.id, "instance disconnected");
        Ok(updated)
    }

    /// Reconciles the instance with the gateway's view. Read-only remotely.
    ///
    /// Also expires a stale pairing artifact.
    ///
    /// # Errors
    /// - [`ConsoleError::MissingCredential`] without a token.
    /// - [`ConsoleError::Gateway`] when the call fails.
    pub async fn fetch_status(&self, instance: &Instance) -> Result<Instance, ConsoleError> {
        let token = instance.require_token()?;
        let body = self
            .gateway
            .invoke(GatewayOperation::Status, Some(token), None)
            .await?;

        let now_ms = self.clock.now_ms();
        let report = RemoteReport::from_response(&body);
        let mut machine = InstanceStateMachine::from_state(instance.state.clone());
        machine.reconcile(&report, now_ms, self.pairing_ttl_ms);
        machine.on_tick(now_ms);

        let mut updated = instance.clone();
        let previous = updated.status();
        updated.state = machine.into_state();
        if updated.status() != previous {
            info!(
                instance_id = %updated.id,
                from = %previous,
                to = %updated.status(),
                "instance status changed"
            );
        }
        Ok(updated)
    }

    /// Lists every instance of the account.
    ///
    /// Remote failures and non-list bodies yield an empty list.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Configuration`] when no admin token is
    /// configured; nothing is sent in that case.
    pub async fn list_all(&self) -> Result<Vec<Instance>, ConsoleError> {
        let body = match self
            .gateway
            .invoke(GatewayOperation::ListInstances, None, None)
            .await
        {
            Ok(body) => body,
            Err(error @ ConsoleError::Configuration(_)) => return Err(error),
            Err(error) => {
                warn!(error = %error, "instance listing failed; showing none");
                return Ok(Vec::new());
            }
        };

        let Value::Array(items) = body else {
            warn!("instance listing was not a list; showing none");
            return Ok(Vec::new());
        };

        let now_ms = self.clock.now_ms();
        Ok(items
            .iter()
            .filter_map(RemoteInstance::from_value)
            .map(|remote| remote.into_instance(now_ms, self.pairing_ttl_ms))
            .collect())
    }
}
