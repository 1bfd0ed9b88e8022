#![warn(missing_docs)]
//! # unidash-config
//!
//! ## Purpose
//! Decides which gateway endpoint and admin credential are active, and owns
//! the persisted settings that feed that decision.
//!
//! ## Responsibilities
//! - Walk an ordered list of [`ConfigProvider`]s and pick the first valid
//!   candidate, falling back to the built-in default.
//! - Cache the resolved [`unidash_core::Configuration`] for a bounded time
//!   and expose explicit invalidation.
//! - Read and write the settings catalogue through a [`SettingsStore`],
//!   masking sensitive values and refusing to persist masked projections.
//!
//! ## Data flow
//! Local override / settings store / runtime file / build-time values ->
//! [`ConfigResolver::resolve`] -> cached configuration -> gateway client.
//! [`SettingsService`] writes -> store upsert -> [`ConfigResolver::invalidate`].
//!
//! ## Ownership and lifetimes
//! Providers and stores are shared behind `Arc<dyn ...>` so the resolver and
//! the settings service can hold the same collaborators.
//!
//! ## Error model
//! Resolution never fails outward. Store failures during resolution are
//! logged and the tier is skipped; store failures during writes surface as
//! [`unidash_core::ConsoleError::Configuration`].
//!
//! ## Security and privacy notes
//! Logs name the source tier and the rejection reason, never the token.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use unidash_config::{ConfigResolver, ManualClock};
//! use unidash_core::ConfigSource;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let resolver = ConfigResolver::new(Vec::new(), Arc::new(ManualClock::new(0)));
//! let config = runtime.block_on(resolver.resolve());
//! assert_eq!(config.source, ConfigSource::Default);
//! ```

mod cache;
mod clock;
mod providers;
mod resolver;
mod settings;
mod store;

pub use cache::{CachedValue, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use providers::{
    BuildTimeProvider, Candidate, ConfigProvider, LocalOverrideProvider, PLACEHOLDER_MARKER,
    Rejection, RuntimeConfigFile, RuntimeInjectedProvider, SettingsStoreProvider,
    evaluate_candidate, is_placeholder, validate_endpoint_url,
};
pub use resolver::{CONFIG_CACHE_TTL_MS, ConfigResolver};
pub use settings::SettingsService;
pub use store::{
    FileLocalOverride, FileSettingsStore, InMemoryLocalOverride, InMemorySettingsStore,
    LocalOverride, OverrideConfig, SettingsStore, StoreError,
};
