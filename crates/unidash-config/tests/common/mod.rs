//! Shared fixtures for config integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use unidash_config::{
    BuildTimeProvider, ConfigProvider, ConfigResolver, InMemoryLocalOverride,
    InMemorySettingsStore, LocalOverride, LocalOverrideProvider, ManualClock, OverrideConfig,
    RuntimeInjectedProvider, SettingsService, SettingsStore, SettingsStoreProvider, StoreError,
};
use unidash_core::SettingRecord;

/// Store whose every call fails, counting attempts.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SettingsStore for FailingStore {
    async fn get_all(&self) -> Result<Vec<SettingRecord>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn upsert(&self, _key: &str, _value: &str, _sensitive: bool) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

/// Wires the standard provider chain over in-memory collaborators.
#[allow(dead_code)]
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<dyn SettingsStore>,
    pub local_override: Arc<dyn LocalOverride>,
    pub resolver: Arc<ConfigResolver>,
    pub settings: SettingsService,
}

#[allow(dead_code)]
pub fn harness(
    store: Arc<dyn SettingsStore>,
    local_override: Option<OverrideConfig>,
    runtime_path: &std::path::Path,
    build_time: BuildTimeProvider,
) -> Harness {
    let clock = Arc::new(ManualClock::new(1_000));
    let local_override: Arc<dyn LocalOverride> = Arc::new(match local_override {
        Some(config) => InMemoryLocalOverride::with(config),
        None => InMemoryLocalOverride::new(),
    });
    let providers: Vec<Arc<dyn ConfigProvider>> = vec![
        Arc::new(LocalOverrideProvider::new(local_override.clone())),
        Arc::new(SettingsStoreProvider::new(store.clone())),
        Arc::new(RuntimeInjectedProvider::new(runtime_path)),
        Arc::new(build_time),
    ];
    let resolver = Arc::new(ConfigResolver::new(providers, clock.clone()));
    let settings = SettingsService::new(store.clone(), local_override.clone(), resolver.clone());

    Harness {
        clock,
        store,
        local_override,
        resolver,
        settings,
    }
}

/// Empty in-memory store.
#[allow(dead_code)]
pub fn empty_store() -> Arc<dyn SettingsStore> {
    Arc::new(InMemorySettingsStore::new())
}

/// In-memory store that rejects writes to one key.
#[allow(dead_code)]
pub struct KeyRejectingStore {
    pub inner: InMemorySettingsStore,
    pub rejected_key: &'static str,
}

#[async_trait]
impl SettingsStore for KeyRejectingStore {
    async fn get_all(&self) -> Result<Vec<SettingRecord>, StoreError> {
        self.inner.get_all().await
    }

    async fn upsert(&self, key: &str, value: &str, sensitive: bool) -> Result<(), StoreError> {
        if key == self.rejected_key {
            return Err(StoreError::Backend(format!("write to {key} refused")));
        }
        self.inner.upsert(key, value, sensitive).await
    }
}
