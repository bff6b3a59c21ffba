//! Engine-level errors.

use moor_rewards::RewardError;
use moor_store::StoreError;
use moor_types::{StakeStatus, Tier};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("stake {0} not found")]
    NotFound(String),

    #[error("stake {stake} is not owned by {owner}")]
    Forbidden { stake: String, owner: String },

    #[error("stake {stake} is in state {status}")]
    InvalidState { stake: String, status: StakeStatus },

    #[error("tier {tier} is not in the configured schedule (stake {stake})")]
    UnknownTier { stake: String, tier: Tier },

    #[error("asset {asset} is already locked by stake {holder}")]
    AssetAlreadyStaked { asset: String, holder: String },

    #[error("owner {0} has no pending rewards")]
    NoPendingRewards(String),

    #[error("timed out waiting for the write lock of owner {0}")]
    LockTimeout(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("arithmetic overflow in reward computation")]
    Overflow,
}

impl EngineError {
    /// A business no-op rather than a fault; callers should not retry.
    pub fn is_business_noop(&self) -> bool {
        matches!(self, Self::NoPendingRewards(_))
    }

    /// A transient condition; callers may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }
}

impl From<RewardError> for EngineError {
    fn from(e: RewardError) -> Self {
        match e {
            RewardError::Overflow => Self::Overflow,
        }
    }
}
