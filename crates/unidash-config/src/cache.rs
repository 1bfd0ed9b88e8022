//! Time-bounded single-value cache.

use std::sync::{PoisonError, RwLock};

/// Cached value with the time it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue<T> {
    /// Cached payload.
    pub value: T,
    /// Epoch milliseconds when the payload was resolved.
    pub fetched_at_ms: u64,
}

#[derive(Debug)]
struct Slot<T> {
    entry: Option<CachedValue<T>>,
    generation: u64,
}

/// Single-slot cache with a time-to-live and an invalidation generation.
///
/// Readers see either the previous entry or a complete new one. Every
/// [`TtlCache::invalidate`] bumps the generation, and a fill started under an
/// older generation is discarded, so a value resolved before an invalidation
/// is never published after it.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl_ms: u64,
    slot: RwLock<Slot<T>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            slot: RwLock::new(Slot {
                entry: None,
                generation: 0,
            }),
        }
    }

    /// Configured time-to-live in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Returns the cached value when it is younger than the TTL at `now_ms`.
    pub fn get(&self, now_ms: u64) -> Option<T> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.entry
            .as_ref()
            .filter(|entry| now_ms.saturating_sub(entry.fetched_at_ms) < self.ttl_ms)
            .map(|entry| entry.value.clone())
    }

    /// Current invalidation generation. Capture it before starting a fill.
    pub fn generation(&self) -> u64 {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Publishes `value` if no invalidation happened since `generation`.
    ///
    /// Returns `true` when the value was stored.
    pub fn store_if_current(&self, value: T, fetched_at_ms: u64, generation: u64) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(CachedValue {
            value,
            fetched_at_ms,
        });
        true
    }

    /// Drops the cached value immediately.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }
}
