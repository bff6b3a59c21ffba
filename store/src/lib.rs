//! Abstract storage traits for the MOOR staking engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.

pub mod error;
pub mod stake;

pub use error::StoreError;
pub use stake::{StakeRecord, StakeStore};
