//! Precedence-ordered configuration resolution with a TTL cache.

use std::sync::Arc;

use tracing::{debug, info};
use unidash_core::{ConfigSource, Configuration};

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::providers::{ConfigProvider, evaluate_candidate};

/// How long a resolved configuration is reused.
pub const CONFIG_CACHE_TTL_MS: u64 = 30_000;

/// Resolves the active gateway configuration.
///
/// Providers are tried in the order given; the first valid candidate wins.
/// The built-in default is used when every provider is absent or invalid.
pub struct ConfigResolver {
    providers: Vec<Arc<dyn ConfigProvider>>,
    cache: TtlCache<Configuration>,
    clock: Arc<dyn Clock>,
}

impl ConfigResolver {
    /// Creates a resolver with the default TTL.
    pub fn new(providers: Vec<Arc<dyn ConfigProvider>>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(providers, clock, CONFIG_CACHE_TTL_MS)
    }

    /// Creates a resolver with a custom TTL.
    pub fn with_ttl(
        providers: Vec<Arc<dyn ConfigProvider>>,
        clock: Arc<dyn Clock>,
        ttl_ms: u64,
    ) -> Self {
        Self {
            providers,
            cache: TtlCache::new(ttl_ms),
            clock,
        }
    }

    /// Returns the active configuration. Never fails.
    ///
    /// Reuses the cached value within the TTL unless invalidated. The TTL
    /// runs from the start of the resolution that produced the value.
    pub async fn resolve(&self) -> Configuration {
        let now_ms = self.clock.now_ms();
        if let Some(cached) = self.cache.get(now_ms) {
            return cached;
        }

        let generation = self.cache.generation();
        let resolved = self.resolve_uncached().await;
        if !self
            .cache
            .store_if_current(resolved.clone(), now_ms, generation)
        {
            debug!("configuration invalidated during resolution; result not cached");
        }
        resolved
    }

    /// Returns `true` unless the system is running on the built-in default.
    pub async fn is_configured(&self) -> bool {
        self.resolve().await.source != ConfigSource::Default
    }

    /// Drops the cached configuration; the next resolve recomputes it.
    pub fn invalidate(&self) {
        self.cache.invalidate();
        debug!("configuration cache invalidated");
    }

    async fn resolve_uncached(&self) -> Configuration {
        for provider in &self.providers {
            let candidate = provider.candidate().await;
            match evaluate_candidate(candidate, provider.source()) {
                Ok(config) => {
                    info!(
                        provider = provider.name(),
                        source = %config.source,
                        endpoint = %config.endpoint_url,
                        "configuration resolved"
                    );
                    return config;
                }
                Err(rejection) => {
                    debug!(provider = provider.name(), ?rejection, "configuration source skipped");
                }
            }
        }

        info!(source = %ConfigSource::Default, "no configuration source usable; using built-in default");
        Configuration::builtin_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::clock::ManualClock;
    use crate::providers::Candidate;

    struct CountingProvider {
        endpoint: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConfigProvider for CountingProvider {
        fn source(&self) -> ConfigSource {
            ConfigSource::BuildTime
        }

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn candidate(&self) -> Option<Candidate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(Candidate {
                endpoint_url: Some(self.endpoint.clone()),
                admin_token: None,
            })
        }
    }

    #[tokio::test]
    async fn caches_within_ttl_and_refreshes_after() {
        let provider = Arc::new(CountingProvider {
            endpoint: "https://gw.example.test".to_string(),
            calls: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock::new(0));
        let resolver = ConfigResolver::new(vec![provider.clone() as Arc<dyn ConfigProvider>], clock.clone());

        resolver.resolve().await;
        clock.advance(CONFIG_CACHE_TTL_MS - 1);
        resolver.resolve().await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        clock.advance(1);
        resolver.resolve().await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    struct SlowProvider {
        clock: Arc<ManualClock>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConfigProvider for SlowProvider {
        fn source(&self) -> ConfigSource {
            ConfigSource::UserStored
        }

        fn name(&self) -> &'static str {
            "slow"
        }

        async fn candidate(&self) -> Option<Candidate> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let endpoint = format!("https://gw{call}.example.test");
            self.clock.advance(10_000);
            Some(Candidate {
                endpoint_url: Some(endpoint),
                admin_token: None,
            })
        }
    }

    #[tokio::test]
    async fn ttl_counts_from_the_start_of_a_slow_resolution() {
        let clock = Arc::new(ManualClock::new(0));
        let provider = Arc::new(SlowProvider {
            clock: clock.clone(),
            calls: AtomicUsize::new(0),
        });
        let resolver = ConfigResolver::new(vec![provider.clone() as Arc<dyn ConfigProvider>], clock.clone());

        assert_eq!(resolver.resolve().await.endpoint_url, "https://gw0.example.test");
        assert_eq!(clock.now_ms(), 10_000);

        clock.set(CONFIG_CACHE_TTL_MS - 1);
        assert_eq!(resolver.resolve().await.endpoint_url, "https://gw0.example.test");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        clock.set(35_000);
        assert_eq!(resolver.resolve().await.endpoint_url, "https://gw1.example.test");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_provider_list_yields_default() {
        let resolver = ConfigResolver::new(Vec::new(), Arc::new(ManualClock::new(0)));
        assert_eq!(resolver.resolve().await, Configuration::builtin_default());
        assert!(!resolver.is_configured().await);
    }
}
