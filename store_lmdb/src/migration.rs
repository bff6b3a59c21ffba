//! Database schema versioning.
//!
//! Tracks a monotonically increasing schema version in the meta database.
//! A fresh environment is stamped with the current version; a database
//! written by a newer build is refused rather than silently misread.

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Checks the stored schema version and stamps fresh environments.
pub struct Migrator;

impl Migrator {
    /// - Absent version means a fresh database: stamp it.
    /// - A matching version is a no-op.
    /// - A *higher* version means the database was written by a newer build
    ///   and we refuse to open it.
    pub fn run(environment: &LmdbEnvironment) -> Result<(), LmdbError> {
        let mut wtxn = environment.env().write_txn()?;
        let stored = environment
            .meta_db
            .get(&wtxn, SCHEMA_VERSION_KEY)?
            .and_then(|bytes| bytes.try_into().ok().map(u32::from_be_bytes));

        match stored {
            Some(version) if version == CURRENT_SCHEMA_VERSION => {
                tracing::debug!(version, "database schema is up to date");
                Ok(())
            }
            Some(version) if version > CURRENT_SCHEMA_VERSION => {
                Err(LmdbError::SchemaTooNew {
                    found: version,
                    supported: CURRENT_SCHEMA_VERSION,
                })
            }
            Some(version) => {
                // No older on-disk formats exist yet; bump the stamp.
                tracing::info!(from = version, to = CURRENT_SCHEMA_VERSION, "migrating schema");
                environment.meta_db.put(
                    &mut wtxn,
                    SCHEMA_VERSION_KEY,
                    &CURRENT_SCHEMA_VERSION.to_be_bytes(),
                )?;
                wtxn.commit()?;
                Ok(())
            }
            None => {
                tracing::info!(version = CURRENT_SCHEMA_VERSION, "stamping fresh database");
                environment.meta_db.put(
                    &mut wtxn,
                    SCHEMA_VERSION_KEY,
                    &CURRENT_SCHEMA_VERSION.to_be_bytes(),
                )?;
                wtxn.commit()?;
                Ok(())
            }
        }
    }
}
