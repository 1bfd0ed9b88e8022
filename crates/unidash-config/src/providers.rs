//! Configuration sources, tried in precedence order by the resolver.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use unidash_core::{ConfigSource, Configuration, SettingKey};
use url::Url;

use crate::store::{LocalOverride, SettingsStore};

/// Sentinel left in configuration slots that were never substituted.
pub const PLACEHOLDER_MARKER: &str = "PLACEHOLDER";

/// Raw, unvalidated values offered by one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Offered gateway base URL.
    pub endpoint_url: Option<String>,
    /// Offered admin token.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("endpoint_url", &self.endpoint_url)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Reason a candidate was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The provider offered nothing, or no endpoint.
    Absent,
    /// A field still carries an unresolved placeholder.
    Placeholder {
        /// Offending field name.
        field: &'static str,
    },
    /// The endpoint is not an HTTP(S) URL.
    InvalidEndpoint(String),
}

/// One tier of the precedence list.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provenance tag attached to configurations from this provider.
    fn source(&self) -> ConfigSource;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Offers a candidate, or `None` when the provider has nothing.
    ///
    /// Providers never fail: backend errors are logged and reported as
    /// absence.
    async fn candidate(&self) -> Option<Candidate>;
}

/// Returns `true` when `value` was never substituted.
///
/// Matches the `PLACEHOLDER` marker and bare `${VAR}` templates.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.contains(PLACEHOLDER_MARKER) || (trimmed.starts_with("${") && trimmed.ends_with('}'))
}

/// Checks that `raw` resembles an HTTP(S) URL with a host.
///
/// # Errors
/// Returns a human-readable reason when the URL is rejected.
pub fn validate_endpoint_url(raw: &str) -> Result<(), String> {
    let parsed = Url::parse(raw.trim()).map_err(|error| format!("invalid url: {error}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", parsed.scheme()));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("url has no host".to_string());
    }

    Ok(())
}

/// Validates a candidate and turns it into a configuration for `source`.
///
/// # Errors
/// Returns the [`Rejection`] that caused the candidate to be skipped.
pub fn evaluate_candidate(
    candidate: Option<Candidate>,
    source: ConfigSource,
) -> Result<Configuration, Rejection> {
    let candidate = candidate.ok_or(Rejection::Absent)?;
    let endpoint = candidate
        .endpoint_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(Rejection::Absent)?;

    if is_placeholder(endpoint) {
        return Err(Rejection::Placeholder {
            field: "endpoint_url",
        });
    }

    let admin_token = candidate
        .admin_token
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if is_placeholder(admin_token) {
        return Err(Rejection::Placeholder {
            field: "admin_token",
        });
    }

    validate_endpoint_url(endpoint).map_err(Rejection::InvalidEndpoint)?;

    Ok(Configuration {
        endpoint_url: endpoint.trim_end_matches('/').to_string(),
        admin_token: admin_token.to_string(),
        source,
    })
}

/// Reads the operator's manual override slot.
pub struct LocalOverrideProvider {
    slot: Arc<dyn LocalOverride>,
}

impl LocalOverrideProvider {
    /// Wraps an override slot.
    pub fn new(slot: Arc<dyn LocalOverride>) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl ConfigProvider for LocalOverrideProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::UserStored
    }

    fn name(&self) -> &'static str {
        "local_override"
    }

    async fn candidate(&self) -> Option<Candidate> {
        match self.slot.load().await {
            Ok(loaded) => loaded.map(|config| Candidate {
                endpoint_url: Some(config.endpoint_url),
                admin_token: Some(config.admin_token),
            }),
            Err(error) => {
                warn!(provider = self.name(), error = %error, "local override unreadable");
                None
            }
        }
    }
}

/// Reads `api_base_url` / `api_admin_token` from the settings store.
pub struct SettingsStoreProvider {
    store: Arc<dyn SettingsStore>,
}

impl SettingsStoreProvider {
    /// Wraps a settings store.
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigProvider for SettingsStoreProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::UserStored
    }

    fn name(&self) -> &'static str {
        "settings_store"
    }

    async fn candidate(&self) -> Option<Candidate> {
        let records = match self.store.get_all().await {
            Ok(records) => records,
            Err(error) => {
                warn!(provider = self.name(), error = %error, "settings store unreadable");
                return None;
            }
        };

        let mut candidate = Candidate::default();
        for record in records {
            match SettingKey::parse(&record.key) {
                Some(SettingKey::ApiBaseUrl) => candidate.endpoint_url = Some(record.value),
                Some(SettingKey::ApiAdminToken) => candidate.admin_token = Some(record.value),
                _ => {}
            }
        }

        candidate.endpoint_url.is_some().then_some(candidate)
    }
}

/// Document written by a deployment entrypoint before start-up.
///
/// ```toml
/// api_base_url = "https://gateway.example.com"
/// api_admin_token = "API_ADMIN_TOKEN_PLACEHOLDER"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfigFile {
    /// Gateway base URL.
    pub api_base_url: Option<String>,
    /// Admin token.
    pub api_admin_token: Option<String>,
}

/// Reads the runtime-injected TOML document.
pub struct RuntimeInjectedProvider {
    path: PathBuf,
}

impl RuntimeInjectedProvider {
    /// Reads from `path` on every resolution.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigProvider for RuntimeInjectedProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::RuntimeInjected
    }

    fn name(&self) -> &'static str {
        "runtime_file"
    }

    async fn candidate(&self) -> Option<Candidate> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(provider = self.name(), path = %self.path.display(), "no runtime config");
                return None;
            }
            Err(error) => {
                warn!(provider = self.name(), path = %self.path.display(), error = %error, "runtime config unreadable");
                return None;
            }
        };

        match toml::from_str::<RuntimeConfigFile>(&raw) {
            Ok(file) => Some(Candidate {
                endpoint_url: file.api_base_url,
                admin_token: file.api_admin_token,
            }),
            Err(error) => {
                warn!(provider = self.name(), path = %self.path.display(), error = %error, "runtime config malformed");
                None
            }
        }
    }
}

/// Values baked in when the binary was compiled.
#[derive(Clone, Default)]
pub struct BuildTimeProvider {
    endpoint_url: Option<String>,
    admin_token: Option<String>,
}

impl BuildTimeProvider {
    /// Provider with explicit values.
    pub fn new(endpoint_url: Option<String>, admin_token: Option<String>) -> Self {
        Self {
            endpoint_url,
            admin_token,
        }
    }

    /// Provider reading `UNIDASH_API_BASE_URL` / `UNIDASH_API_ADMIN_TOKEN`
    /// as they were set during compilation.
    pub fn from_build_env() -> Self {
        Self::new(
            option_env!("UNIDASH_API_BASE_URL").map(str::to_string),
            option_env!("UNIDASH_API_ADMIN_TOKEN").map(str::to_string),
        )
    }
}

#[async_trait]
impl ConfigProvider for BuildTimeProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::BuildTime
    }

    fn name(&self) -> &'static str {
        "build_env"
    }

    async fn candidate(&self) -> Option<Candidate> {
        self.endpoint_url.as_ref().map(|endpoint_url| Candidate {
            endpoint_url: Some(endpoint_url.clone()),
            admin_token: self.admin_token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(endpoint: &str, token: &str) -> Option<Candidate> {
        Some(Candidate {
            endpoint_url: Some(endpoint.to_string()),
            admin_token: Some(token.to_string()),
        })
    }

    #[test]
    fn accepts_http_and_https_endpoints() {
        validate_endpoint_url("https://gw.example.test").expect("https should pass");
        validate_endpoint_url("http://10.0.0.5:8080/api").expect("http should pass");
        assert!(validate_endpoint_url("ftp://gw.example.test").is_err());
        assert!(validate_endpoint_url("gw.example.test").is_err());
    }

    #[test]
    fn placeholders_in_either_field_reject_the_candidate() {
        assert_eq!(
            evaluate_candidate(candidate("API_URL_PLACEHOLDER", "t"), ConfigSource::RuntimeInjected),
            Err(Rejection::Placeholder {
                field: "endpoint_url"
            })
        );
        assert_eq!(
            evaluate_candidate(
                candidate("https://gw.example.test", "${ADMIN_TOKEN}"),
                ConfigSource::RuntimeInjected
            ),
            Err(Rejection::Placeholder {
                field: "admin_token"
            })
        );
    }

    #[test]
    fn blank_endpoint_counts_as_absent() {
        assert_eq!(
            evaluate_candidate(candidate("   ", "t"), ConfigSource::BuildTime),
            Err(Rejection::Absent)
        );
        assert_eq!(evaluate_candidate(None, ConfigSource::BuildTime), Err(Rejection::Absent));
    }

    #[test]
    fn accepted_endpoint_is_trimmed_of_trailing_slash() {
        let config = evaluate_candidate(candidate(" https://gw.example.test/ ", ""), ConfigSource::UserStored)
            .expect("candidate should be accepted");
        assert_eq!(config.endpoint_url, "https://gw.example.test");
        assert_eq!(config.admin_token, "");
    }
}
