//! Tests TTL reuse and invalidation of the resolved configuration.

mod common;

use std::sync::Arc;

use unidash_config::{BuildTimeProvider, CONFIG_CACHE_TTL_MS, InMemorySettingsStore, SettingsStore};
use unidash_core::ConfigSource;

#[tokio::test]
async fn resolver_cache_tests_serves_cached_value_within_ttl() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = Arc::new(InMemorySettingsStore::new());
    let harness = common::harness(
        store.clone(),
        None,
        &dir.path().join("runtime.toml"),
        BuildTimeProvider::default(),
    );

    assert_eq!(harness.resolver.resolve().await.source, ConfigSource::Default);

    // Written behind the service's back: no invalidation happens.
    store
        .upsert("api_base_url", "https://direct.example.test", false)
        .await
        .expect("store write should succeed");
    harness.clock.advance(CONFIG_CACHE_TTL_MS - 1);
    assert_eq!(harness.resolver.resolve().await.source, ConfigSource::Default);

    harness.clock.advance(1);
    let refreshed = harness.resolver.resolve().await;
    assert_eq!(refreshed.source, ConfigSource::UserStored);
    assert_eq!(refreshed.endpoint_url, "https://direct.example.test");
}

#[tokio::test]
async fn resolver_cache_tests_saving_a_setting_invalidates_immediately() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let harness = common::harness(
        common::empty_store(),
        None,
        &dir.path().join("runtime.toml"),
        BuildTimeProvider::default(),
    );

    assert!(!harness.resolver.is_configured().await);
    harness
        .settings
        .save_api_config("https://saved.example.test", "admin-secret-1234")
        .await
        .expect("api config should save");

    let config = harness.resolver.resolve().await;
    assert_eq!(config.endpoint_url, "https://saved.example.test");
    assert_eq!(config.admin_token, "admin-secret-1234");
}

#[tokio::test]
async fn resolver_cache_tests_clearing_the_override_falls_back() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let harness = common::harness(
        common::empty_store(),
        Some(unidash_config::OverrideConfig {
            endpoint_url: "https://override.example.test".to_string(),
            admin_token: String::new(),
        }),
        &dir.path().join("runtime.toml"),
        BuildTimeProvider::new(Some("https://build.example.test".to_string()), None),
    );

    assert_eq!(harness.resolver.resolve().await.source, ConfigSource::UserStored);
    harness
        .settings
        .clear_local_override()
        .await
        .expect("override should clear");
    assert_eq!(harness.resolver.resolve().await.source, ConfigSource::BuildTime);
}
