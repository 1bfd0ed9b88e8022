//! Settings reads and writes, with masking and cache invalidation.

use std::sync::Arc;

use tracing::{debug, info, warn};
use unidash_core::{
    AppSettings, ConsoleError, DEFAULT_VISIBLE_SUFFIX, SettingKey, SettingRecord, is_masked, mask,
};

use crate::providers::validate_endpoint_url;
use crate::resolver::ConfigResolver;
use crate::store::{LocalOverride, OverrideConfig, SettingsStore};

/// Settings facade used by the settings screen and the CLI.
///
/// Every successful write invalidates the resolver cache.
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    local_override: Arc<dyn LocalOverride>,
    resolver: Arc<ConfigResolver>,
}

impl SettingsService {
    /// Creates a service over shared collaborators.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        local_override: Arc<dyn LocalOverride>,
        resolver: Arc<ConfigResolver>,
    ) -> Self {
        Self {
            store,
            local_override,
            resolver,
        }
    }

    /// Returns settings with sensitive values masked.
    ///
    /// A store failure degrades to defaults.
    pub async fn get_settings(&self) -> AppSettings {
        self.project(true).await
    }

    /// Returns settings in clear form. For internal use only.
    pub async fn get_raw_settings(&self) -> AppSettings {
        self.project(false).await
    }

    /// Persists one setting.
    ///
    /// Returns `Ok(false)` without writing when `value` is a masked
    /// projection, so a re-submitted form never overwrites the real secret.
    /// Surrounding whitespace is ignored for that check.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Validation`] for malformed values and
    /// [`ConsoleError::Configuration`] when the store fails.
    pub async fn save_setting(&self, key: SettingKey, value: &str) -> Result<bool, ConsoleError> {
        let written = self.persist(key, value).await?;
        if written {
            self.resolver.invalidate();
        }
        Ok(written)
    }

    /// Persists several settings in order, stopping at the first failure.
    ///
    /// # Errors
    /// See [`SettingsService::save_setting`].
    pub async fn save_settings(&self, updates: &[(SettingKey, String)]) -> Result<(), ConsoleError> {
        for (key, value) in updates {
            self.save_setting(*key, value).await?;
        }
        Ok(())
    }

    /// Persists the gateway URL and admin token.
    ///
    /// The URL is validated before anything is written. A masked token is
    /// skipped. The two writes are not atomic: when the token write fails the
    /// URL stays saved, and the cache is invalidated in both cases.
    ///
    /// # Errors
    /// See [`SettingsService::save_setting`].
    pub async fn save_api_config(&self, base_url: &str, admin_token: &str) -> Result<(), ConsoleError> {
        validate_setting(SettingKey::ApiBaseUrl, base_url.trim())?;
        self.persist(SettingKey::ApiBaseUrl, base_url).await?;
        let token_saved = self.persist(SettingKey::ApiAdminToken, admin_token).await;
        self.resolver.invalidate();
        token_saved.map(|_| ())
    }

    /// Persists branding. `logo_url = Some("")` clears the logo; `None`
    /// leaves it untouched.
    ///
    /// # Errors
    /// See [`SettingsService::save_setting`].
    pub async fn save_branding(
        &self,
        app_name: &str,
        company_name: &str,
        logo_url: Option<&str>,
    ) -> Result<(), ConsoleError> {
        self.save_setting(SettingKey::AppName, app_name).await?;
        self.save_setting(SettingKey::CompanyName, company_name).await?;
        if let Some(logo_url) = logo_url {
            self.save_setting(SettingKey::LogoUrl, logo_url).await?;
        }
        Ok(())
    }

    /// Returns the manual override with its token masked.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Configuration`] when the slot is unreadable.
    pub async fn local_override(&self) -> Result<Option<OverrideConfig>, ConsoleError> {
        Ok(self.local_override.load().await?.map(|config| OverrideConfig {
            admin_token: if config.admin_token.is_empty() {
                String::new()
            } else {
                mask(&config.admin_token, DEFAULT_VISIBLE_SUFFIX)
            },
            endpoint_url: config.endpoint_url,
        }))
    }

    /// Replaces the manual override.
    ///
    /// A masked token keeps the previously stored token.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Validation`] for a malformed URL or a masked
    /// token with nothing to keep, and [`ConsoleError::Configuration`] when
    /// the slot fails.
    pub async fn save_local_override(&self, config: OverrideConfig) -> Result<(), ConsoleError> {
        let endpoint_url = config.endpoint_url.trim().to_string();
        validate_endpoint_url(&endpoint_url).map_err(ConsoleError::Validation)?;

        let submitted_token = config.admin_token.trim();
        let admin_token = if is_masked(submitted_token) {
            self.local_override
                .load()
                .await?
                .map(|existing| existing.admin_token)
                .ok_or_else(|| {
                    ConsoleError::Validation("masked token submitted without a stored token".to_string())
                })?
        } else {
            submitted_token.to_string()
        };

        self.local_override
            .save(&OverrideConfig {
                endpoint_url,
                admin_token,
            })
            .await?;
        self.resolver.invalidate();
        info!("local override saved");
        Ok(())
    }

    /// Removes the manual override.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Configuration`] when the slot fails.
    pub async fn clear_local_override(&self) -> Result<(), ConsoleError> {
        self.local_override.clear().await?;
        self.resolver.invalidate();
        info!("local override cleared");
        Ok(())
    }

    async fn persist(&self, key: SettingKey, value: &str) -> Result<bool, ConsoleError> {
        let value = value.trim();
        if is_masked(value) {
            debug!(key = %key, "masked value submitted; keeping stored secret");
            return Ok(false);
        }
        validate_setting(key, value)?;

        self.store.upsert(key.as_str(), value, key.is_sensitive()).await?;
        info!(key = %key, "setting saved");
        Ok(true)
    }

    async fn project(&self, masked: bool) -> AppSettings {
        let records = match self.store.get_all().await {
            Ok(records) => records,
            Err(error) => {
                warn!(error = %error, "settings unreadable; using defaults");
                return AppSettings::default();
            }
        };

        let mut settings = AppSettings::default();
        for SettingRecord {
            key,
            value,
            sensitive,
            ..
        } in records
        {
            let Some(key) = SettingKey::parse(&key) else {
                continue;
            };
            let value = if masked && sensitive && !value.is_empty() {
                mask(&value, DEFAULT_VISIBLE_SUFFIX)
            } else {
                value
            };
            settings.apply(key, value);
        }
        settings
    }
}

fn validate_setting(key: SettingKey, value: &str) -> Result<(), ConsoleError> {
    match key {
        SettingKey::ApiBaseUrl => validate_endpoint_url(value)
            .map_err(|reason| ConsoleError::Validation(format!("{key}: {reason}"))),
        SettingKey::AppName | SettingKey::CompanyName if value.is_empty() => Err(
            ConsoleError::Validation(format!("{key} must not be empty")),
        ),
        _ => Ok(()),
    }
}
