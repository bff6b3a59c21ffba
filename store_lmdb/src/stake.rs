//! LMDB implementation of `StakeStore`.
//!
//! Four databases:
//! - `stakes_db`: stake id → bincode-encoded record.
//! - `owner_db`: composite key `owner ++ 0x00 ++ stake_id` → stake id.
//!   The 0x00 separator keeps variable-length owner prefixes unambiguous.
//! - `asset_db`: asset id → stake id, present only while the stake is
//!   non-terminal. Enforces the one-active-stake-per-asset invariant.
//! - `cooldown_db`: binary key `deadline_be_millis(8) ++ stake_id` → empty.
//!   Big-endian millis sort lexicographically by time, so the sweep is a
//!   single range scan.
//!
//! Secondary indexes are maintained inside the same write transaction as
//! the record write; a batch commits all-or-nothing.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use moor_store::{StakeRecord, StakeStore, StoreError};
use moor_types::{AssetId, OwnerAddress, StakeId, Timestamp};

use crate::LmdbError;

pub struct LmdbStakeStore {
    env: Arc<Env>,
    stakes_db: Database<Bytes, Bytes>,
    owner_db: Database<Bytes, Bytes>,
    asset_db: Database<Bytes, Bytes>,
    cooldown_db: Database<Bytes, Bytes>,
}

/// Build the composite key `owner ++ 0x00 ++ stake_id` for `owner_db`.
fn owner_composite_key(owner: &OwnerAddress, id: &StakeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.as_str().len() + 1 + id.as_str().len());
    key.extend_from_slice(owner.as_str().as_bytes());
    key.push(0);
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

/// Build the binary key `deadline_be_millis ++ stake_id` for `cooldown_db`.
fn cooldown_binary_key(deadline: Timestamp, id: &StakeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + id.as_str().len());
    key.extend_from_slice(&deadline.as_millis().to_be_bytes());
    key.extend_from_slice(id.as_str().as_bytes());
    key
}

/// Advance a byte prefix to the smallest value sorting strictly after every
/// key that starts with it. Used as an exclusive upper bound in prefix scans.
fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return;
        }
        prefix.pop();
    }
}

fn encode(record: &StakeRecord) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<StakeRecord, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}

impl LmdbStakeStore {
    pub fn new(
        env: Arc<Env>,
        stakes_db: Database<Bytes, Bytes>,
        owner_db: Database<Bytes, Bytes>,
        asset_db: Database<Bytes, Bytes>,
        cooldown_db: Database<Bytes, Bytes>,
    ) -> Self {
        Self {
            env,
            stakes_db,
            owner_db,
            asset_db,
            cooldown_db,
        }
    }

    /// Overwrite an existing record and reconcile its secondary indexes,
    /// inside the caller's transaction.
    fn put_in_txn(&self, wtxn: &mut RwTxn<'_>, record: &StakeRecord) -> Result<(), StoreError> {
        let id_key = record.id.as_str().as_bytes();
        let previous = match self.stakes_db.get(wtxn, id_key).map_err(LmdbError::from)? {
            Some(bytes) => decode(bytes)?,
            None => return Err(StoreError::NotFound(record.id.to_string())),
        };

        self.stakes_db
            .put(wtxn, id_key, &encode(record)?)
            .map_err(LmdbError::from)?;

        if previous.cooldown_ends_at != record.cooldown_ends_at {
            if let Some(deadline) = previous.cooldown_ends_at {
                self.cooldown_db
                    .delete(wtxn, &cooldown_binary_key(deadline, &record.id))
                    .map_err(LmdbError::from)?;
            }
            if let Some(deadline) = record.cooldown_ends_at {
                self.cooldown_db
                    .put(wtxn, &cooldown_binary_key(deadline, &record.id), &[])
                    .map_err(LmdbError::from)?;
            }
        }

        // Release the asset once the stake reaches a terminal state.
        if record.status.is_terminal() && !previous.status.is_terminal() {
            self.asset_db
                .delete(wtxn, record.asset.as_str().as_bytes())
                .map_err(LmdbError::from)?;
        }

        Ok(())
    }
}

impl StakeStore for LmdbStakeStore {
    fn get_stake(&self, id: &StakeId) -> Result<StakeRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .stakes_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        decode(bytes)
    }

    fn insert_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id_key = record.id.as_str().as_bytes();

        if self
            .stakes_db
            .get(&wtxn, id_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        if self
            .asset_db
            .get(&wtxn, record.asset.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(record.asset.to_string()));
        }

        self.stakes_db
            .put(&mut wtxn, id_key, &encode(record)?)
            .map_err(LmdbError::from)?;
        self.owner_db
            .put(
                &mut wtxn,
                &owner_composite_key(&record.owner, &record.id),
                id_key,
            )
            .map_err(LmdbError::from)?;
        if !record.status.is_terminal() {
            self.asset_db
                .put(&mut wtxn, record.asset.as_str().as_bytes(), id_key)
                .map_err(LmdbError::from)?;
        }
        if let Some(deadline) = record.cooldown_ends_at {
            self.cooldown_db
                .put(&mut wtxn, &cooldown_binary_key(deadline, &record.id), &[])
                .map_err(LmdbError::from)?;
        }

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.put_in_txn(&mut wtxn, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_stakes(&self, records: &[StakeRecord]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for record in records {
            self.put_in_txn(&mut wtxn, record)?;
        }
        // One commit for the whole batch; dropping the transaction on an
        // earlier error aborts every write in it.
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn stakes_for_owner(&self, owner: &OwnerAddress) -> Result<Vec<StakeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;

        let mut prefix = owner.as_str().as_bytes().to_vec();
        prefix.push(0);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );

        let mut records = Vec::new();
        let iter = self
            .owner_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        for result in iter {
            let (_, id_bytes) = result.map_err(LmdbError::from)?;
            let bytes = self
                .stakes_db
                .get(&rtxn, id_bytes)
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!(
                        "owner index references missing stake {}",
                        String::from_utf8_lossy(id_bytes)
                    ))
                })?;
            records.push(decode(bytes)?);
        }
        Ok(records)
    }

    fn active_stake_for_asset(&self, asset: &AssetId) -> Result<Option<StakeId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = self
            .asset_db
            .get(&rtxn, asset.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .map(|bytes| StakeId::new(String::from_utf8_lossy(bytes).into_owned()));
        Ok(id)
    }

    fn cooldowns_ending_before(&self, cutoff: Timestamp) -> Result<Vec<StakeId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        // Inclusive cutoff: every key whose 8-byte deadline prefix is
        // ≤ cutoff sorts strictly below the (cutoff + 1) prefix.
        let upper = cutoff.as_millis().saturating_add(1).to_be_bytes();
        let bounds = (Bound::<&[u8]>::Unbounded, Bound::Excluded(&upper[..]));

        let mut ids = Vec::new();
        let iter = self
            .cooldown_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        for result in iter {
            let (key, _) = result.map_err(LmdbError::from)?;
            if key.len() > 8 {
                ids.push(StakeId::new(String::from_utf8_lossy(&key[8..]).into_owned()));
            }
        }
        Ok(ids)
    }

    fn exists(&self, id: &StakeId) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .stakes_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some())
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.stakes_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
