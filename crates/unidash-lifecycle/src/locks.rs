//! Per-instance mutual exclusion for state-changing calls.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use unidash_core::ConsoleError;

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// Guard held while a state-changing call runs for one instance.
///
/// Dropping it releases the lock and removes the table entry when no other
/// caller still references it.
#[derive(Debug)]
pub struct InstanceGuard {
    instance_id: String,
    held: Option<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl InstanceGuard {
    /// Instance this guard serializes.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        drop(self.held.take());
        // Clones are taken under the shard lock, so a count of one means no
        // caller is between lookup and acquisition.
        self.table
            .remove_if(&self.instance_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Keyed locks, one per instance id.
///
/// Acquisition never waits: a second caller for the same id is rejected with
/// [`ConsoleError::Conflict`]. Entries live only while a guard or a pending
/// acquisition refers to them.
#[derive(Debug, Default)]
pub struct InstanceLocks {
    table: Arc<LockTable>,
}

impl InstanceLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `instance_id`.
    ///
    /// # Errors
    /// Returns [`ConsoleError::Conflict`] when the lock is already held.
    pub fn try_acquire(&self, instance_id: &str) -> Result<InstanceGuard, ConsoleError> {
        let lock = self
            .table
            .entry(instance_id.to_string())
            .or_default()
            .clone();
        let held = lock.try_lock_owned().map_err(|_| ConsoleError::Conflict {
            instance_id: instance_id.to_string(),
        })?;

        Ok(InstanceGuard {
            instance_id: instance_id.to_string(),
            held: Some(held),
            table: self.table.clone(),
        })
    }

    /// Number of ids with a live entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no lock is held.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
