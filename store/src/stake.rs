//! Stake record and storage trait.

use crate::StoreError;
use moor_types::{AssetId, OwnerAddress, RewardAmount, StakeId, StakeStatus, Tier, Timestamp};
use serde::{Deserialize, Serialize};

/// One staked asset, owned by exactly one address for its whole lifetime.
///
/// Records are never physically deleted; terminal records (`unstaked`,
/// `cancelled`) are retained for history. Pending rewards are *not* a field
/// here — they are always recomputed from `(tier, last_verified_at,
/// consecutive_days, now)` so list views and claims can never drift apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Immutable primary key.
    pub id: StakeId,

    /// The locked asset. At most one non-terminal stake per asset.
    pub asset: AssetId,

    /// Immutable after creation.
    pub owner: OwnerAddress,

    /// Reward bracket; must be a key of the injected tier schedule.
    pub tier: Tier,

    /// When the asset was locked.
    pub staked_at: Timestamp,

    /// Accrual anchor. Non-decreasing; advanced to "now" each time pending
    /// rewards are realized by a claim.
    pub last_verified_at: Timestamp,

    /// Unbroken verification streak in days, supplied by the external
    /// verifier.
    pub consecutive_days: u32,

    /// Count of failed verification events.
    pub verification_failures: u32,

    /// Lifecycle state.
    pub status: StakeStatus,

    /// `Some` exactly while `status == PendingUnstake`.
    pub cooldown_ends_at: Option<Timestamp>,

    /// Lifetime rewards realized. Non-decreasing, incremented only at claim.
    pub total_rewards_earned: RewardAmount,

    /// Lifetime rewards paid out. Non-decreasing, always ≤ earned.
    pub total_rewards_claimed: RewardAmount,
}

impl StakeRecord {
    /// A fresh `Active` record with zeroed counters, accruing from `now`.
    pub fn new(
        id: StakeId,
        asset: AssetId,
        owner: OwnerAddress,
        tier: Tier,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            asset,
            owner,
            tier,
            staked_at: now,
            last_verified_at: now,
            consecutive_days: 0,
            verification_failures: 0,
            status: StakeStatus::Active,
            cooldown_ends_at: None,
            total_rewards_earned: RewardAmount::ZERO,
            total_rewards_claimed: RewardAmount::ZERO,
        }
    }

    /// Whether this record still accrues (and can claim) rewards.
    pub fn accrues_rewards(&self) -> bool {
        self.status.accrues_rewards()
    }
}

/// Trait for stake storage operations.
///
/// Implementations must be safe to share across threads; the engine wraps
/// the store in an `Arc` and serializes same-owner writes itself.
pub trait StakeStore: Send + Sync {
    /// Retrieve a record by id.
    fn get_stake(&self, id: &StakeId) -> Result<StakeRecord, StoreError>;

    /// Insert a new record. Fails with `Duplicate` if the id already exists
    /// or the asset already backs a non-terminal stake.
    fn insert_stake(&self, record: &StakeRecord) -> Result<(), StoreError>;

    /// Overwrite an existing record. Fails with `NotFound` if absent.
    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError>;

    /// Overwrite several existing records atomically — either every record
    /// is applied or none is. The claim path depends on this.
    fn put_stakes(&self, records: &[StakeRecord]) -> Result<(), StoreError>;

    /// All records (any status) owned by `owner`.
    fn stakes_for_owner(&self, owner: &OwnerAddress) -> Result<Vec<StakeRecord>, StoreError>;

    /// The non-terminal stake currently locking `asset`, if any.
    fn active_stake_for_asset(&self, asset: &AssetId) -> Result<Option<StakeId>, StoreError>;

    /// Ids of `PendingUnstake` records whose cooldown deadline is ≤ `cutoff`.
    fn cooldowns_ending_before(&self, cutoff: Timestamp) -> Result<Vec<StakeId>, StoreError>;

    /// Whether a record with this id exists.
    fn exists(&self, id: &StakeId) -> Result<bool, StoreError>;

    /// Total number of records across all owners and states.
    fn stake_count(&self) -> Result<u64, StoreError>;
}
