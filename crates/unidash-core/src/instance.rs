//! Gateway instance model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::secret::{DEFAULT_VISIBLE_SUFFIX, mask};

/// Flat status label, as exchanged with the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// No session with a device.
    Disconnected,
    /// Connect issued, waiting for the gateway.
    Connecting,
    /// A pairing artifact is waiting to be used.
    QrCode,
    /// Paired with a device.
    Connected,
}

impl InstanceStatus {
    /// Wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::QrCode => "qr_code",
            Self::Connected => "connected",
        }
    }

    /// Parses a remote status label, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "disconnected" | "close" | "closed" => Some(Self::Disconnected),
            "connecting" => Some(Self::Connecting),
            "qr_code" | "qrcode" | "qr" => Some(Self::QrCode),
            "connected" | "open" => Some(Self::Connected),
            _ => None,
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digits-only phone number of a paired device.
///
/// Can only be built through [`PhoneNumber::parse`], which guarantees a
/// non-empty value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalises a raw phone or WhatsApp JID.
    ///
    /// `5511999999999@s.whatsapp.net`, `5511999999999:12@s.whatsapp.net` and
    /// `+55 11 99999-9999` all yield digits only. Returns `None` when no
    /// digits remain or unexpected characters are present.
    pub fn parse(raw: &str) -> Option<Self> {
        let user = raw.split('@').next().unwrap_or_default();
        let user = user.split(':').next().unwrap_or_default().trim();
        let user = user.strip_prefix('+').unwrap_or(user);

        let mut digits = String::with_capacity(user.len());
        for c in user.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                _ => return None,
            }
        }

        if digits.is_empty() {
            None
        } else {
            Some(Self(digits))
        }
    }

    /// Digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid phone number: {value:?}"))
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile data populated after pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// WhatsApp display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub picture_url: Option<String>,
}

/// One-time artifact used to pair a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairingArtifact {
    /// Scannable QR payload (usually a base64 data URL).
    QrCode {
        /// Image payload as returned by the gateway.
        payload: String,
        /// Epoch milliseconds after which the payload is stale.
        expires_at_ms: u64,
    },
    /// Numeric code typed on the phone.
    PairingCode {
        /// Code as returned by the gateway.
        code: String,
        /// Epoch milliseconds after which the code is stale.
        expires_at_ms: u64,
    },
}

impl PairingArtifact {
    /// Expiry timestamp in epoch milliseconds.
    pub fn expires_at_ms(&self) -> u64 {
        match self {
            Self::QrCode { expires_at_ms, .. } | Self::PairingCode { expires_at_ms, .. } => {
                *expires_at_ms
            }
        }
    }

    /// Returns `true` when the artifact is stale at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms()
    }

    /// QR payload, if this is a QR artifact.
    pub fn qr_code(&self) -> Option<&str> {
        match self {
            Self::QrCode { payload, .. } => Some(payload),
            Self::PairingCode { .. } => None,
        }
    }

    /// Pairing code, if this is a code artifact.
    pub fn pairing_code(&self) -> Option<&str> {
        match self {
            Self::PairingCode { code, .. } => Some(code),
            Self::QrCode { .. } => None,
        }
    }

    /// Returns `true` when both artifacts carry the same kind and value.
    pub fn same_payload(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::QrCode { payload: a, .. }, Self::QrCode { payload: b, .. }) => a == b,
            (Self::PairingCode { code: a, .. }, Self::PairingCode { code: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Connection state of an instance.
///
/// Invalid combinations (connected without a phone, pairing without an
/// artifact) cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Initial state; no device session.
    #[default]
    Disconnected,
    /// Connect issued; no artifact or confirmation yet.
    Connecting,
    /// Waiting for the operator to use the pairing artifact.
    #[serde(rename = "qr_code")]
    AwaitingPairing {
        /// Outstanding artifact; at most one per instance.
        artifact: PairingArtifact,
    },
    /// Paired with a device.
    Connected {
        /// Phone number of the paired device.
        phone: PhoneNumber,
        /// Profile data reported by the gateway.
        #[serde(default)]
        profile: Profile,
    },
}

impl ConnectionState {
    /// Flat status label for this state.
    pub fn status(&self) -> InstanceStatus {
        match self {
            Self::Disconnected => InstanceStatus::Disconnected,
            Self::Connecting => InstanceStatus::Connecting,
            Self::AwaitingPairing { .. } => InstanceStatus::QrCode,
            Self::Connected { .. } => InstanceStatus::Connected,
        }
    }
}

/// Remote messaging instance snapshot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Stable gateway identifier.
    pub id: String,
    /// Per-instance secret for instance-scoped calls.
    pub token: Option<String>,
    /// Operator-chosen name.
    pub name: String,
    /// Optional label of the owning system.
    pub system_name: Option<String>,
    /// Connection state.
    #[serde(flatten)]
    pub state: ConnectionState,
    /// Creation time reported by the gateway.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time reported by the gateway.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Creates a disconnected instance without a token.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: None,
            name: name.into(),
            system_name: None,
            state: ConnectionState::Disconnected,
            created_at: None,
            updated_at: None,
        }
    }

    /// Builder-style token setter.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Flat status label.
    pub fn status(&self) -> InstanceStatus {
        self.state.status()
    }

    /// Paired phone, present only when connected.
    pub fn phone(&self) -> Option<&PhoneNumber> {
        match &self.state {
            ConnectionState::Connected { phone, .. } => Some(phone),
            _ => None,
        }
    }

    /// Profile, present only when connected.
    pub fn profile(&self) -> Option<&Profile> {
        match &self.state {
            ConnectionState::Connected { profile, .. } => Some(profile),
            _ => None,
        }
    }

    /// Outstanding pairing artifact, if any.
    pub fn pairing_artifact(&self) -> Option<&PairingArtifact> {
        match &self.state {
            ConnectionState::AwaitingPairing { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// Returns the instance token or fails fast.
    ///
    /// # Errors
    /// Returns [`ConsoleError::MissingCredential`] when the token is absent
    /// or blank.
    pub fn require_token(&self) -> Result<&str, ConsoleError> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConsoleError::MissingCredential(format!(
                "instance {} has no token",
                self.id
            ))),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field(
                "token",
                &self
                    .token
                    .as_deref()
                    .map(|token| mask(token, DEFAULT_VISIBLE_SUFFIX)),
            )
            .field("name", &self.name)
            .field("system_name", &self.system_name)
            .field("state", &self.state)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_are_normalised_from_jids() {
        let phone = PhoneNumber::parse("5511999999999:12@s.whatsapp.net").expect("jid parses");
        assert_eq!(phone.as_str(), "5511999999999");
        let phone = PhoneNumber::parse("+55 11 99999-9999").expect("formatted number parses");
        assert_eq!(phone.as_str(), "5511999999999");
    }

    #[test]
    fn empty_or_garbage_phones_are_rejected() {
        assert!(PhoneNumber::parse("").is_none());
        assert!(PhoneNumber::parse("@s.whatsapp.net").is_none());
        assert!(PhoneNumber::parse("not-a-phone").is_none());
    }

    #[test]
    fn missing_or_blank_token_fails_fast() {
        let instance = Instance::new("inst-1", "sales-bot");
        assert!(matches!(
            instance.require_token(),
            Err(ConsoleError::MissingCredential(_))
        ));
        let blank = Instance::new("inst-1", "sales-bot").with_token("  ");
        assert!(blank.require_token().is_err());
    }

    #[test]
    fn debug_output_masks_the_instance_token() {
        let instance = Instance::new("inst-1", "sales-bot").with_token("tok-abcdef-1234");
        let rendered = format!("{instance:?}");
        assert!(!rendered.contains("tok-abcdef"));
        assert!(rendered.contains("1234"));
    }

    #[test]
    fn artifact_expiry_is_inclusive() {
        let artifact = PairingArtifact::QrCode {
            payload: "data:image/png;base64,AAAA".to_string(),
            expires_at_ms: 1_000,
        };
        assert!(!artifact.is_expired(999));
        assert!(artifact.is_expired(1_000));
    }
}
