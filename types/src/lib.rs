//! Fundamental types for the MOOR staking engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: owner addresses, stake/asset identifiers, fixed-point reward
//! amounts, millisecond timestamps, tiers, status enums, and engine parameters.

pub mod address;
pub mod amount;
pub mod id;
pub mod params;
pub mod state;
pub mod tier;
pub mod time;

pub use address::OwnerAddress;
pub use amount::RewardAmount;
pub use id::{AssetId, StakeId};
pub use params::{EngineParams, TierRate, TierSchedule};
pub use state::StakeStatus;
pub use tier::Tier;
pub use time::Timestamp;
