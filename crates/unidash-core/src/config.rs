//! Active gateway configuration and its provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::secret::{DEFAULT_VISIBLE_SUFFIX, mask};

/// Public demo endpoint used when no other source is configured.
pub const DEFAULT_ENDPOINT_URL: &str = "https://free.uazapi.com";

/// Provenance tag of a resolved configuration, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Entered by the operator and persisted locally.
    UserStored,
    /// Injected by the deployment entrypoint before start-up.
    RuntimeInjected,
    /// Baked into the artifact at build time.
    BuildTime,
    /// Built-in demo default.
    Default,
}

impl ConfigSource {
    /// Stable lowercase label for logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserStored => "user_stored",
            Self::RuntimeInjected => "runtime_injected",
            Self::BuildTime => "build_time",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint and admin credential selected by the resolver.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Gateway base URL (HTTP or HTTPS).
    pub endpoint_url: String,
    /// Admin token; empty when no credential is configured.
    pub admin_token: String,
    /// Source tier this configuration came from.
    pub source: ConfigSource,
}

impl Configuration {
    /// Built-in fallback configuration. Always valid.
    pub fn builtin_default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            admin_token: String::new(),
            source: ConfigSource::Default,
        }
    }

    /// Returns `true` when an admin credential is present.
    pub fn has_admin_token(&self) -> bool {
        !self.admin_token.trim().is_empty()
    }

    /// Copy of this configuration with the admin token masked for display.
    pub fn masked(&self) -> Self {
        Self {
            endpoint_url: self.endpoint_url.clone(),
            admin_token: masked_or_empty(&self.admin_token),
            source: self.source,
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("endpoint_url", &self.endpoint_url)
            .field("admin_token", &masked_or_empty(&self.admin_token))
            .field("source", &self.source)
            .finish()
    }
}

fn masked_or_empty(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        mask(value, DEFAULT_VISIBLE_SUFFIX)
    }
}
