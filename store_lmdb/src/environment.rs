//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::migration::Migrator;
use crate::stake::LmdbStakeStore;
use crate::LmdbError;

/// Number of named databases in the environment.
const MAX_DBS: u32 = 5;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// stake id → bincode-encoded `StakeRecord`.
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    /// `owner ++ 0x00 ++ stake_id` → stake id. Prefix scans list an owner.
    pub(crate) owner_db: Database<Bytes, Bytes>,
    /// asset id → stake id, maintained for non-terminal stakes only.
    pub(crate) asset_db: Database<Bytes, Bytes>,
    /// `cooldown_be_millis(8) ++ stake_id` → empty. Big-endian u64 sorts
    /// lexicographically by time, enabling sweep range scans.
    pub(crate) cooldown_db: Database<Bytes, Bytes>,
    /// Environment metadata (schema version).
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Heed(e.to_string()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let stakes_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("stakes"))?;
        let owner_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("owner_index"))?;
        let asset_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("asset_index"))?;
        let cooldown_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("cooldown_index"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            stakes_db,
            owner_db,
            asset_db,
            cooldown_db,
            meta_db,
        };
        Migrator::run(&environment)?;
        Ok(environment)
    }

    pub(crate) fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// A stake store backed by this environment.
    pub fn stake_store(&self) -> LmdbStakeStore {
        LmdbStakeStore::new(
            Arc::clone(&self.env),
            self.stakes_db,
            self.owner_db,
            self.asset_db,
            self.cooldown_db,
        )
    }
}
