//! Read-only aggregation over the stake store.
//!
//! Pending amounts are always freshly computed with the same calculator the
//! claim path uses, never read from a persisted field. Queries take no
//! owner lock; snapshot consistency from the store is enough, and transient
//! staleness against an in-flight claim is acceptable.

use std::collections::BTreeMap;
use std::sync::Arc;

use moor_rewards::pending_reward;
use moor_store::{StakeRecord, StakeStore};
use moor_types::{EngineParams, OwnerAddress, RewardAmount, StakeStatus, Tier, Timestamp};
use serde::Serialize;

use crate::error::EngineError;

/// One stake plus its freshly computed pending reward.
#[derive(Clone, Debug, Serialize)]
pub struct StakeView {
    pub record: StakeRecord,
    pub pending_rewards: RewardAmount,
}

/// Everything an owner sees when listing their stakes.
#[derive(Clone, Debug, Serialize)]
pub struct OwnerStakes {
    pub stakes: Vec<StakeView>,
    /// Count of records currently `Active`.
    pub total_active: u64,
    /// Sum of pending over accruing records (`Active` + `PendingUnstake`).
    pub total_pending_rewards: RewardAmount,
}

/// Aggregate statistics for one owner.
#[derive(Clone, Debug, Serialize)]
pub struct OwnerStats {
    /// Currently staked (non-terminal) records per tier.
    pub staked_by_tier: BTreeMap<Tier, u64>,
    /// Count of records currently `Active`.
    pub total_active: u64,
    /// Lifetime rewards realized, over every record ever owned.
    pub total_earned: RewardAmount,
    /// Lifetime rewards paid out, over every record ever owned.
    pub total_claimed: RewardAmount,
    /// Current pending total over accruing records.
    pub total_pending: RewardAmount,
}

/// Lock-free read side of the engine.
pub struct QueryService {
    store: Arc<dyn StakeStore>,
    params: EngineParams,
}

impl QueryService {
    pub fn new(store: Arc<dyn StakeStore>, params: EngineParams) -> Self {
        Self { store, params }
    }

    fn pending_for(&self, record: &StakeRecord, now: Timestamp) -> RewardAmount {
        if !record.accrues_rewards() {
            return RewardAmount::ZERO;
        }
        pending_reward(
            &self.params,
            record.tier,
            record.last_verified_at,
            record.consecutive_days,
            now,
        )
    }

    /// All of an owner's stakes with fresh pending amounts and totals.
    pub fn list_stakes(
        &self,
        owner: &OwnerAddress,
        now: Timestamp,
    ) -> Result<OwnerStakes, EngineError> {
        let records = self.store.stakes_for_owner(owner)?;

        let mut total_active = 0u64;
        let mut total_pending = RewardAmount::ZERO;
        let mut stakes = Vec::with_capacity(records.len());
        for record in records {
            if record.status == StakeStatus::Active {
                total_active += 1;
            }
            let pending = self.pending_for(&record, now);
            total_pending = total_pending.saturating_add(pending);
            stakes.push(StakeView {
                record,
                pending_rewards: pending,
            });
        }

        Ok(OwnerStakes {
            stakes,
            total_active,
            total_pending_rewards: total_pending,
        })
    }

    /// Aggregate view of an owner: counts by tier, lifetime sums, pending.
    pub fn stats_for_owner(
        &self,
        owner: &OwnerAddress,
        now: Timestamp,
    ) -> Result<OwnerStats, EngineError> {
        let records = self.store.stakes_for_owner(owner)?;

        let mut staked_by_tier: BTreeMap<Tier, u64> = BTreeMap::new();
        let mut total_active = 0u64;
        let mut total_earned = RewardAmount::ZERO;
        let mut total_claimed = RewardAmount::ZERO;
        let mut total_pending = RewardAmount::ZERO;

        for record in &records {
            if !record.status.is_terminal() {
                *staked_by_tier.entry(record.tier).or_insert(0) += 1;
            }
            if record.status == StakeStatus::Active {
                total_active += 1;
            }
            total_earned = total_earned.saturating_add(record.total_rewards_earned);
            total_claimed = total_claimed.saturating_add(record.total_rewards_claimed);
            total_pending = total_pending.saturating_add(self.pending_for(record, now));
        }

        Ok(OwnerStats {
            staked_by_tier,
            total_active,
            total_earned,
            total_claimed,
            total_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moor_nullables::NullStakeStore;
    use moor_types::time::MILLIS_PER_DAY;
    use moor_types::{AssetId, StakeId};

    fn base_time() -> Timestamp {
        Timestamp::new(1_700_000_000_000)
    }

    fn seeded_service() -> (Arc<NullStakeStore>, QueryService) {
        let store = Arc::new(NullStakeStore::new());
        let service = QueryService::new(store.clone(), EngineParams::standard());
        (store, service)
    }

    fn record(id: &str, asset: &str, owner: &str, tier: Tier, now: Timestamp) -> StakeRecord {
        StakeRecord::new(
            StakeId::new(id),
            AssetId::new(asset),
            OwnerAddress::new(owner),
            tier,
            now,
        )
    }

    #[test]
    fn list_recomputes_pending_and_counts_active() {
        let (store, service) = seeded_service();
        let owner = OwnerAddress::new("alice");
        let t0 = base_time();

        let active = record("stake-1", "asset-1", "alice", Tier::Gold, t0);
        store.insert_stake(&active).unwrap();

        let mut pending_unstake = record("stake-2", "asset-2", "alice", Tier::Bronze, t0);
        pending_unstake.status = StakeStatus::PendingUnstake;
        pending_unstake.cooldown_ends_at = Some(t0.plus_millis(7 * MILLIS_PER_DAY));
        store.insert_stake(&pending_unstake).unwrap();

        let mut released = record("stake-3", "asset-3", "alice", Tier::Platinum, t0);
        released.status = StakeStatus::Unstaked;
        store.insert_stake(&released).unwrap();

        // Two days later: gold 25×2×1.5 = 75, bronze 10×2 = 20, released 0.
        let now = t0.plus_millis(2 * MILLIS_PER_DAY);
        let listing = service.list_stakes(&owner, now).unwrap();

        assert_eq!(listing.stakes.len(), 3);
        assert_eq!(listing.total_active, 1);
        assert_eq!(
            listing.total_pending_rewards,
            RewardAmount::from_units(95)
        );

        let by_id = |id: &str| {
            listing
                .stakes
                .iter()
                .find(|view| view.record.id.as_str() == id)
                .unwrap()
        };
        assert_eq!(by_id("stake-1").pending_rewards, RewardAmount::from_units(75));
        assert_eq!(by_id("stake-2").pending_rewards, RewardAmount::from_units(20));
        assert_eq!(by_id("stake-3").pending_rewards, RewardAmount::ZERO);
    }

    #[test]
    fn stats_aggregate_tiers_and_lifetime_sums() {
        let (store, service) = seeded_service();
        let owner = OwnerAddress::new("alice");
        let t0 = base_time();

        store
            .insert_stake(&record("stake-1", "asset-1", "alice", Tier::Gold, t0))
            .unwrap();
        store
            .insert_stake(&record("stake-2", "asset-2", "alice", Tier::Gold, t0))
            .unwrap();

        // A released stake no longer counts as staked, but its lifetime
        // totals stay in the aggregate.
        let mut released = record("stake-3", "asset-3", "alice", Tier::Silver, t0);
        released.status = StakeStatus::Unstaked;
        released.total_rewards_earned = RewardAmount::from_units(120);
        released.total_rewards_claimed = RewardAmount::from_units(120);
        store.insert_stake(&released).unwrap();

        // Another owner's stake stays out of alice's aggregate entirely.
        store
            .insert_stake(&record("stake-4", "asset-4", "bob", Tier::Platinum, t0))
            .unwrap();

        let now = t0.plus_millis(MILLIS_PER_DAY);
        let stats = service.stats_for_owner(&owner, now).unwrap();

        assert_eq!(stats.staked_by_tier.get(&Tier::Gold), Some(&2));
        assert_eq!(stats.staked_by_tier.get(&Tier::Silver), None);
        assert_eq!(stats.total_active, 2);
        assert_eq!(stats.total_earned, RewardAmount::from_units(120));
        assert_eq!(stats.total_claimed, RewardAmount::from_units(120));
        // One day on two gold stakes: 2 × 25 × 1.5 = 75.
        assert_eq!(stats.total_pending, RewardAmount::from_units(75));
    }

    #[test]
    fn unknown_owner_yields_empty_aggregates() {
        let (_store, service) = seeded_service();
        let listing = service
            .list_stakes(&OwnerAddress::new("nobody"), base_time())
            .unwrap();
        assert!(listing.stakes.is_empty());
        assert_eq!(listing.total_active, 0);
        assert_eq!(listing.total_pending_rewards, RewardAmount::ZERO);

        let stats = service
            .stats_for_owner(&OwnerAddress::new("nobody"), base_time())
            .unwrap();
        assert!(stats.staked_by_tier.is_empty());
        assert_eq!(stats.total_pending, RewardAmount::ZERO);
    }
}
