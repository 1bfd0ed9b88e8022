//! Gateway operation catalogue.

use std::fmt;

use unidash_core::{DEFAULT_VISIBLE_SUFFIX, mask};

/// HTTP verb used by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// Which secret authorizes an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Account-wide admin token.
    Admin,
    /// Token scoped to one instance.
    Instance,
}

/// Operations exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    /// Enumerate every instance of the account.
    ListInstances,
    /// Allocate a new instance and its token.
    CreateInstance,
    /// Start pairing a device.
    Connect,
    /// Tear down the device session.
    Disconnect,
    /// Read the current connection state.
    Status,
}

impl GatewayOperation {
    /// Path relative to the gateway base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::ListInstances => "/instance/all",
            Self::CreateInstance => "/instance/init",
            Self::Connect => "/instance/connect",
            Self::Disconnect => "/instance/disconnect",
            Self::Status => "/instance/status",
        }
    }

    /// HTTP verb.
    pub fn method(self) -> HttpMethod {
        match self {
            Self::ListInstances | Self::Status => HttpMethod::Get,
            Self::CreateInstance | Self::Connect | Self::Disconnect => HttpMethod::Post,
        }
    }

    /// Credential the gateway expects for this operation.
    pub fn credential_kind(self) -> CredentialKind {
        match self {
            Self::ListInstances | Self::CreateInstance => CredentialKind::Admin,
            Self::Connect | Self::Disconnect | Self::Status => CredentialKind::Instance,
        }
    }

    /// Message used when a failed response carries none.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::ListInstances => "failed to list instances",
            Self::CreateInstance => "failed to create instance",
            Self::Connect => "failed to connect instance",
            Self::Disconnect => "failed to disconnect instance",
            Self::Status => "failed to check instance status",
        }
    }

    /// Stable name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListInstances => "list_instances",
            Self::CreateInstance => "create_instance",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret attached to one request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Admin token, sent in the `admintoken` header.
    Admin(String),
    /// Instance token, sent in the `token` header.
    Instance(String),
}

impl Credential {
    /// Kind of this credential.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Admin(_) => CredentialKind::Admin,
            Self::Instance(_) => CredentialKind::Instance,
        }
    }

    /// Request header carrying the secret.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Admin(_) => "admintoken",
            Self::Instance(_) => "token",
        }
    }

    /// Secret value.
    pub fn secret(&self) -> &str {
        match self {
            Self::Admin(secret) | Self::Instance(secret) => secret,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = mask(self.secret(), DEFAULT_VISIBLE_SUFFIX);
        match self {
            Self::Admin(_) => f.debug_tuple("Admin").field(&masked).finish(),
            Self::Instance(_) => f.debug_tuple("Instance").field(&masked).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_operations_use_the_admin_credential() {
        for operation in [GatewayOperation::ListInstances, GatewayOperation::CreateInstance] {
            assert_eq!(operation.credential_kind(), CredentialKind::Admin);
        }
        for operation in [
            GatewayOperation::Connect,
            GatewayOperation::Disconnect,
            GatewayOperation::Status,
        ] {
            assert_eq!(operation.credential_kind(), CredentialKind::Instance);
        }
    }

    #[test]
    fn credential_debug_does_not_leak_the_secret() {
        let rendered = format!("{:?}", Credential::Instance("inst-token-abcd".to_string()));
        assert!(!rendered.contains("inst-token"));
        assert!(rendered.ends_with("abcd\")"));
    }
}
