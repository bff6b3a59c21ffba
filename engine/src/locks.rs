//! Per-owner locks for mutating operations.
//!
//! Operations on different owners run concurrently; operations on the same
//! owner are serialized. Acquisition is bounded: a caller that cannot get
//! the lock within its wait window receives `None` and surfaces a distinct,
//! retryable timeout instead of blocking indefinitely.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moor_types::OwnerAddress;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Owner-keyed lock map.
pub struct OwnerLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the lock for a specific owner.
    async fn lock_for(&self, owner: &OwnerAddress) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(owner.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the owner's lock, waiting at most `wait`.
    /// Returns `None` on timeout; the guard releases the lock on drop.
    pub async fn acquire(
        &self,
        owner: &OwnerAddress,
        wait: Duration,
    ) -> Option<OwnedMutexGuard<()>> {
        let lock = self.lock_for(owner).await;
        tokio::time::timeout(wait, lock.lock_owned()).await.ok()
    }

    /// Number of owners with a tracked lock entry.
    pub async fn tracked_owners(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Drop lock entries no longer held by anyone.
    pub async fn cleanup(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

impl Default for OwnerLocks {
    fn default() -> Self {
        Self::new()
    }
}
