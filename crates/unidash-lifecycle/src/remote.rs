//! Lenient readers for gateway response bodies.
//!
//! The gateway nests instance fields under `instance` in some responses and
//! returns them at the top level in others; both shapes are accepted.

use chrono::{DateTime, Utc};
use serde_json::Value;
use unidash_core::{Instance, InstanceStatus, PairingArtifact, PhoneNumber, Profile};

use crate::machine::InstanceStateMachine;

/// What one gateway response says about an instance's connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteReport {
    /// Status label reported for the instance.
    pub status: Option<InstanceStatus>,
    /// Explicit `connected` flag, when present.
    pub connected: Option<bool>,
    /// Paired phone, normalised from `phone`, `owner` or `jid`.
    pub phone: Option<PhoneNumber>,
    /// Profile fields reported alongside the phone.
    pub profile: Profile,
    /// QR payload, if one was returned.
    pub qr_code: Option<String>,
    /// Numeric pairing code, if one was returned.
    pub pairing_code: Option<String>,
}

impl RemoteReport {
    /// Reads a connect or status response, or a bare instance object.
    pub fn from_response(body: &Value) -> Self {
        let instance = nested_instance(body);
        let status_object = body.get("status").filter(|value| value.is_object());

        let status = text(instance, "status")
            .or_else(|| text(body, "status"))
            .and_then(InstanceStatus::parse);
        let connected = status_object
            .and_then(|status| status.get("connected"))
            .or_else(|| body.get("connected"))
            .and_then(Value::as_bool);

        let phone = ["phone", "owner", "jid"]
            .into_iter()
            .find_map(|field| text(instance, field).and_then(PhoneNumber::parse))
            .or_else(|| {
                status_object
                    .and_then(|status| text(status, "jid"))
                    .and_then(PhoneNumber::parse)
            })
            .or_else(|| text(body, "jid").and_then(PhoneNumber::parse));

        Self {
            status,
            connected,
            phone,
            profile: Profile {
                name: text(instance, "profileName").map(str::to_string),
                picture_url: text(instance, "profilePicUrl").map(str::to_string),
            },
            qr_code: text(instance, "qrcode")
                .or_else(|| text(body, "qrcode"))
                .map(str::to_string),
            pairing_code: text(instance, "paircode")
                .or_else(|| text(body, "paircode"))
                .map(str::to_string),
        }
    }

    /// Returns `true` when the gateway reports a live device session.
    pub fn is_connected(&self) -> bool {
        self.connected == Some(true) || self.status == Some(InstanceStatus::Connected)
    }

    /// Builds the pairing artifact carried by this report.
    ///
    /// A QR payload takes precedence over a pairing code.
    pub fn artifact(&self, now_ms: u64, ttl_ms: u64) -> Option<PairingArtifact> {
        let expires_at_ms = now_ms.saturating_add(ttl_ms);
        if let Some(payload) = &self.qr_code {
            return Some(PairingArtifact::QrCode {
                payload: payload.clone(),
                expires_at_ms,
            });
        }
        self.pairing_code.as_ref().map(|code| PairingArtifact::PairingCode {
            code: code.clone(),
            expires_at_ms,
        })
    }
}

/// Instance record as listed or created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInstance {
    /// Gateway identifier.
    pub id: String,
    /// Per-instance token.
    pub token: Option<String>,
    /// Instance name.
    pub name: Option<String>,
    /// Owning system label.
    pub system_name: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Connection fields.
    pub report: RemoteReport,
}

impl RemoteInstance {
    /// Reads one instance object. Returns `None` when it has no id.
    pub fn from_value(item: &Value) -> Option<Self> {
        let id = match item.get("id")? {
            Value::String(id) if !id.trim().is_empty() => id.trim().to_string(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };

        Some(Self {
            id,
            token: text(item, "token").map(str::to_string),
            name: text(item, "name").map(str::to_string),
            system_name: text(item, "systemName")
                .or_else(|| text(item, "system_name"))
                .map(str::to_string),
            created_at: timestamp(item, &["created", "createdAt", "created_at"]),
            updated_at: timestamp(item, &["updated", "updatedAt", "updated_at"]),
            report: RemoteReport::from_response(item),
        })
    }

    /// Reads a create response, nested or flat.
    ///
    /// The token may sit beside the instance object instead of inside it.
    pub fn from_create_response(body: &Value) -> Option<Self> {
        let mut created = Self::from_value(nested_instance(body))?;
        if created.token.is_none() {
            created.token = text(body, "token").map(str::to_string);
        }
        Some(created)
    }

    /// Converts into a local snapshot, deriving state from the report.
    pub fn into_instance(self, now_ms: u64, pairing_ttl_ms: u64) -> Instance {
        let mut machine = InstanceStateMachine::new();
        machine.reconcile(&self.report, now_ms, pairing_ttl_ms);

        let mut instance = Instance::new(self.id, self.name.unwrap_or_default());
        instance.token = self.token;
        instance.system_name = self.system_name;
        instance.created_at = self.created_at;
        instance.updated_at = self.updated_at;
        instance.state = machine.into_state();
        instance
    }
}

fn nested_instance(body: &Value) -> &Value {
    body.get("instance")
        .filter(|value| value.is_object())
        .unwrap_or(body)
}

fn text<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn timestamp(value: &Value, fields: &[&str]) -> Option<DateTime<Utc>> {
    fields.iter().find_map(|field| {
        text(value, field)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    })
}
