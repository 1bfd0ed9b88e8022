//! Persisted settings catalogue.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_ENDPOINT_URL;

/// Known setting keys. Sensitivity and optionality are fixed per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    /// Gateway base URL.
    ApiBaseUrl,
    /// Gateway admin token.
    ApiAdminToken,
    /// Display name of the console.
    AppName,
    /// Company shown next to the app name.
    CompanyName,
    /// Optional logo image reference.
    LogoUrl,
}

impl SettingKey {
    /// Every key in catalogue order.
    pub const ALL: [SettingKey; 5] = [
        SettingKey::ApiBaseUrl,
        SettingKey::ApiAdminToken,
        SettingKey::AppName,
        SettingKey::CompanyName,
        SettingKey::LogoUrl,
    ];

    /// Storage key string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiBaseUrl => "api_base_url",
            Self::ApiAdminToken => "api_admin_token",
            Self::AppName => "app_name",
            Self::CompanyName => "company_name",
            Self::LogoUrl => "logo_url",
        }
    }

    /// Parses a storage key string. Unknown keys yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }

    /// Whether values under this key are masked on read.
    pub fn is_sensitive(self) -> bool {
        matches!(self, Self::ApiAdminToken)
    }

    /// Whether the key may be cleared to an empty value.
    pub fn is_clearable(self) -> bool {
        matches!(self, Self::LogoUrl)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted key/value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRecord {
    /// Unique storage key.
    pub key: String,
    /// Stored value in clear form.
    pub value: String,
    /// Sensitivity flag written with the value.
    pub sensitive: bool,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

/// Typed projection of the settings catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Gateway base URL.
    pub api_base_url: String,
    /// Gateway admin token (masked unless read raw).
    pub api_admin_token: String,
    /// Console display name.
    pub app_name: String,
    /// Company display name.
    pub company_name: String,
    /// Logo reference; `None` when unset or cleared.
    pub logo_url: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_ENDPOINT_URL.to_string(),
            api_admin_token: String::new(),
            app_name: "Unidash".to_string(),
            company_name: "Unicapital".to_string(),
            logo_url: None,
        }
    }
}

impl AppSettings {
    /// Applies one stored value onto the projection.
    pub fn apply(&mut self, key: SettingKey, value: String) {
        match key {
            SettingKey::ApiBaseUrl => self.api_base_url = value,
            SettingKey::ApiAdminToken => self.api_admin_token = value,
            SettingKey::AppName => self.app_name = value,
            SettingKey::CompanyName => self.company_name = value,
            SettingKey::LogoUrl => {
                self.logo_url = if value.is_empty() { None } else { Some(value) }
            }
        }
    }
}
