//! Settings store and local override collaborators.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use unidash_core::{ConsoleError, DEFAULT_VISIBLE_SUFFIX, SettingRecord, mask};

/// Errors raised by settings persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("settings store i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// Stored document could not be encoded or decoded.
    #[error("settings store codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Remote or backend-specific failure.
    #[error("settings store backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for ConsoleError {
    fn from(error: StoreError) -> Self {
        ConsoleError::Configuration(error.to_string())
    }
}

/// Key/value settings persistence, upserted by key.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns every stored record.
    async fn get_all(&self) -> Result<Vec<SettingRecord>, StoreError>;

    /// Inserts or replaces the record stored under `key`.
    async fn upsert(&self, key: &str, value: &str, sensitive: bool) -> Result<(), StoreError>;
}

/// Volatile store, mostly useful for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    records: RwLock<BTreeMap<String, SettingRecord>>,
}

impl InMemorySettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `(key, value, sensitive)` rows.
    pub fn with_values<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str, bool)>) -> Self {
        let now = Utc::now();
        let records = rows
            .into_iter()
            .map(|(key, value, sensitive)| {
                (
                    key.to_string(),
                    SettingRecord {
                        key: key.to_string(),
                        value: value.to_string(),
                        sensitive,
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_all(&self) -> Result<Vec<SettingRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn upsert(&self, key: &str, value: &str, sensitive: bool) -> Result<(), StoreError> {
        self.records.write().await.insert(
            key.to_string(),
            SettingRecord {
                key: key.to_string(),
                value: value.to_string(),
                sensitive,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}

/// Settings persisted as a JSON array on disk.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<SettingRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) if raw.is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_all(&self) -> Result<Vec<SettingRecord>, StoreError> {
        self.read_records().await
    }

    async fn upsert(&self, key: &str, value: &str, sensitive: bool) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records().await?;
        let record = SettingRecord {
            key: key.to_string(),
            value: value.to_string(),
            sensitive,
            updated_at: Utc::now(),
        };

        match records.iter_mut().find(|existing| existing.key == key) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }

        write_json_atomically(&self.path, &serde_json::to_vec_pretty(&records)?).await
    }
}

/// Manual endpoint/credential override chosen by the operator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideConfig {
    /// Gateway base URL.
    pub endpoint_url: String,
    /// Admin token; may be empty.
    #[serde(default)]
    pub admin_token: String,
}

impl fmt::Debug for OverrideConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("admin_token", &mask(&self.admin_token, DEFAULT_VISIBLE_SUFFIX))
            .finish()
    }
}

/// Local slot holding the manual override read first by the resolver.
#[async_trait]
pub trait LocalOverride: Send + Sync {
    /// Loads the override, if one was saved.
    async fn load(&self) -> Result<Option<OverrideConfig>, StoreError>;

    /// Replaces the override.
    async fn save(&self, config: &OverrideConfig) -> Result<(), StoreError>;

    /// Removes the override.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Volatile override slot.
#[derive(Debug, Default)]
pub struct InMemoryLocalOverride {
    slot: RwLock<Option<OverrideConfig>>,
}

impl InMemoryLocalOverride {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot holding `config`.
    pub fn with(config: OverrideConfig) -> Self {
        Self {
            slot: RwLock::new(Some(config)),
        }
    }
}

#[async_trait]
impl LocalOverride for InMemoryLocalOverride {
    async fn load(&self) -> Result<Option<OverrideConfig>, StoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, config: &OverrideConfig) -> Result<(), StoreError> {
        *self.slot.write().await = Some(config.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Override slot persisted as a small JSON document.
#[derive(Debug, Clone)]
pub struct FileLocalOverride {
    path: PathBuf,
}

impl FileLocalOverride {
    /// Creates a slot backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LocalOverride for FileLocalOverride {
    async fn load(&self) -> Result<Option<OverrideConfig>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, config: &OverrideConfig) -> Result<(), StoreError> {
        write_json_atomically(&self.path, &serde_json::to_vec_pretty(config)?).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

async fn write_json_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);

    tokio::fs::write(&temporary, bytes).await?;
    tokio::fs::rename(&temporary, path).await?;
    Ok(())
}
