//! Stake lifecycle engine.
//!
//! Governs the full life of a stake record: registration, verification
//! events, unstake initiation, cooldown expiry, cancellation, and the
//! concurrency-critical "claim all pending rewards" operation.
//!
//! Mutating operations serialize per owner through an owner-keyed lock map;
//! unrelated owners proceed in parallel. Reads go through the lock-free
//! [`query::QueryService`] and tolerate snapshot staleness.

pub mod error;
pub mod lifecycle;
pub mod locks;
pub mod query;

pub use error::EngineError;
pub use lifecycle::{LifecycleEngine, VerificationEvent};
pub use locks::OwnerLocks;
pub use query::{OwnerStakes, OwnerStats, QueryService, StakeView};
