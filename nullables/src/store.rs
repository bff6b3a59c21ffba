//! Nullable stake store — thread-safe in-memory storage for testing.

use moor_store::{StakeRecord, StakeStore, StoreError};
use moor_types::{AssetId, OwnerAddress, StakeId, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory stake store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStakeStore {
    stakes: Mutex<HashMap<String, StakeRecord>>,
    /// When set, every operation fails with a backend error, simulating an
    /// unavailable database.
    unavailable: AtomicBool,
}

impl NullStakeStore {
    pub fn new() -> Self {
        Self {
            stakes: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Toggle simulated backend failure.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Backend("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullStakeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StakeStore for NullStakeStore {
    fn get_stake(&self, id: &StakeId) -> Result<StakeRecord, StoreError> {
        self.check_available()?;
        self.stakes
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn insert_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut stakes = self.stakes.lock().unwrap();
        if stakes.contains_key(record.id.as_str()) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        let asset_taken = stakes
            .values()
            .any(|r| r.asset == record.asset && !r.status.is_terminal());
        if asset_taken {
            return Err(StoreError::Duplicate(record.asset.to_string()));
        }
        stakes.insert(record.id.to_string(), record.clone());
        Ok(())
    }

    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut stakes = self.stakes.lock().unwrap();
        if !stakes.contains_key(record.id.as_str()) {
            return Err(StoreError::NotFound(record.id.to_string()));
        }
        stakes.insert(record.id.to_string(), record.clone());
        Ok(())
    }

    fn put_stakes(&self, records: &[StakeRecord]) -> Result<(), StoreError> {
        self.check_available()?;
        // Single map lock held across the whole batch, so the update is
        // atomic with respect to every other accessor.
        let mut stakes = self.stakes.lock().unwrap();
        for record in records {
            if !stakes.contains_key(record.id.as_str()) {
                return Err(StoreError::NotFound(record.id.to_string()));
            }
        }
        for record in records {
            stakes.insert(record.id.to_string(), record.clone());
        }
        Ok(())
    }

    fn stakes_for_owner(&self, owner: &OwnerAddress) -> Result<Vec<StakeRecord>, StoreError> {
        self.check_available()?;
        let mut records: Vec<StakeRecord> = self
            .stakes
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner == *owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn active_stake_for_asset(&self, asset: &AssetId) -> Result<Option<StakeId>, StoreError> {
        self.check_available()?;
        Ok(self
            .stakes
            .lock()
            .unwrap()
            .values()
            .find(|r| r.asset == *asset && !r.status.is_terminal())
            .map(|r| r.id.clone()))
    }

    fn cooldowns_ending_before(&self, cutoff: Timestamp) -> Result<Vec<StakeId>, StoreError> {
        self.check_available()?;
        let mut ids: Vec<StakeId> = self
            .stakes
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.cooldown_ends_at
                    .map_or(false, |deadline| deadline.has_passed(cutoff))
            })
            .map(|r| r.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &StakeId) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.stakes.lock().unwrap().contains_key(id.as_str()))
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.stakes.lock().unwrap().len() as u64)
    }
}
