//! The lifecycle state machine.
//!
//! `Active → PendingUnstake → Unstaked`, with the side exit
//! `PendingUnstake → Cancelled` driven by the cancel-and-refund path.
//! Terminal records are kept for history.
//!
//! Every mutating operation serializes on the owner's lock before touching
//! the store, so a read-compute-write sequence (most importantly the claim)
//! can never interleave with another writer on the same owner's records.

use std::sync::Arc;
use std::time::Duration;

use moor_rewards::pending_reward_checked;
use moor_store::{StakeRecord, StakeStore, StoreError};
use moor_types::{EngineParams, OwnerAddress, RewardAmount, StakeId, StakeStatus, Timestamp};
use tokio::sync::OwnedMutexGuard;

use crate::error::EngineError;
use crate::locks::OwnerLocks;

/// A verification outcome produced by the external verifier.
///
/// The engine consumes streak values as input; it does not compute or decay
/// them. `last_verified_at` is deliberately untouched by verification —
/// it anchors reward accrual and is advanced only when a claim realizes
/// the pending amount.
#[derive(Clone, Copy, Debug)]
pub enum VerificationEvent {
    /// Verification passed; carries the verifier's updated streak length.
    Passed { consecutive_days: u32 },
    /// Verification failed. The verifier decides whether the streak breaks.
    Failed { reset_streak: bool },
}

/// The lifecycle engine — all writes to the stake store go through here.
pub struct LifecycleEngine {
    store: Arc<dyn StakeStore>,
    params: EngineParams,
    locks: OwnerLocks,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn StakeStore>, params: EngineParams) -> Self {
        Self {
            store,
            params,
            locks: OwnerLocks::new(),
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Load a record, mapping a missing key to `NotFound` with the stake id.
    fn fetch(&self, id: &StakeId) -> Result<StakeRecord, EngineError> {
        self.store.get_stake(id).map_err(|e| match e {
            StoreError::NotFound(_) => EngineError::NotFound(id.to_string()),
            other => EngineError::Store(other),
        })
    }

    async fn lock_owner(&self, owner: &OwnerAddress) -> Result<OwnedMutexGuard<()>, EngineError> {
        self.locks
            .acquire(owner, Duration::from_millis(self.params.lock_wait_ms))
            .await
            .ok_or_else(|| EngineError::LockTimeout(owner.to_string()))
    }

    /// Persist an already-validated stake record.
    ///
    /// The staking transaction itself (asset custody, payment) happens
    /// outside this core; by the time a record arrives here it must be
    /// `Active`, carry a tier present in the schedule, and reference an
    /// asset with no other live stake.
    pub async fn register_stake(&self, record: StakeRecord) -> Result<(), EngineError> {
        if !self.params.schedule.contains(record.tier) {
            return Err(EngineError::UnknownTier {
                stake: record.id.to_string(),
                tier: record.tier,
            });
        }
        if record.status != StakeStatus::Active || record.cooldown_ends_at.is_some() {
            return Err(EngineError::InvalidState {
                stake: record.id.to_string(),
                status: record.status,
            });
        }

        let _guard = self.lock_owner(&record.owner).await?;
        if let Some(holder) = self.store.active_stake_for_asset(&record.asset)? {
            return Err(EngineError::AssetAlreadyStaked {
                asset: record.asset.to_string(),
                holder: holder.to_string(),
            });
        }
        self.store.insert_stake(&record)?;
        tracing::info!(
            stake = %record.id,
            owner = %record.owner,
            tier = %record.tier,
            "stake registered"
        );
        Ok(())
    }

    /// Apply a verification outcome to a stake.
    pub async fn apply_verification(
        &self,
        id: &StakeId,
        event: VerificationEvent,
    ) -> Result<(), EngineError> {
        let owner = self.fetch(id)?.owner;
        let _guard = self.lock_owner(&owner).await?;

        let mut record = self.fetch(id)?;
        if record.status.is_terminal() {
            return Err(EngineError::InvalidState {
                stake: id.to_string(),
                status: record.status,
            });
        }
        match event {
            VerificationEvent::Passed { consecutive_days } => {
                record.consecutive_days = consecutive_days;
            }
            VerificationEvent::Failed { reset_streak } => {
                record.verification_failures += 1;
                if reset_streak {
                    record.consecutive_days = 0;
                }
            }
        }
        self.store.put_stake(&record)?;
        tracing::debug!(stake = %id, ?event, "verification applied");
        Ok(())
    }

    /// Begin unstaking. Starts the cooldown and returns its deadline.
    ///
    /// Rewards keep accruing until the stake is claimed or finalized;
    /// initiation settles nothing.
    pub async fn initiate_unstake(
        &self,
        id: &StakeId,
        owner: &OwnerAddress,
        now: Timestamp,
    ) -> Result<Timestamp, EngineError> {
        let _guard = self.lock_owner(owner).await?;

        let mut record = self.fetch(id)?;
        if record.owner != *owner {
            return Err(EngineError::Forbidden {
                stake: id.to_string(),
                owner: owner.to_string(),
            });
        }
        if record.status != StakeStatus::Active {
            return Err(EngineError::InvalidState {
                stake: id.to_string(),
                status: record.status,
            });
        }

        let deadline = now.plus_secs(self.params.cooldown_secs);
        record.status = StakeStatus::PendingUnstake;
        record.cooldown_ends_at = Some(deadline);
        self.store.put_stake(&record)?;
        tracing::info!(stake = %id, owner = %owner, cooldown_ends_at = %deadline, "unstake initiated");
        Ok(deadline)
    }

    /// Cancel a pending unstake. Driven by the offer subsystem's
    /// cancel-and-refund path; the refund itself settles elsewhere.
    pub async fn cancel_unstake(&self, id: &StakeId) -> Result<(), EngineError> {
        let owner = self.fetch(id)?.owner;
        let _guard = self.lock_owner(&owner).await?;

        let mut record = self.fetch(id)?;
        if record.status != StakeStatus::PendingUnstake {
            return Err(EngineError::InvalidState {
                stake: id.to_string(),
                status: record.status,
            });
        }
        record.status = StakeStatus::Cancelled;
        record.cooldown_ends_at = None;
        self.store.put_stake(&record)?;
        tracing::info!(stake = %id, owner = %owner, "unstake cancelled");
        Ok(())
    }

    /// Release a stake whose cooldown has elapsed.
    ///
    /// Returns `true` if the record transitioned to `Unstaked` now,
    /// `false` for the idempotent no-ops: already terminal, or cooldown
    /// still running. Calling it on an `Active` record is a caller bug and
    /// fails with `InvalidState`.
    pub async fn finalize_unstake(
        &self,
        id: &StakeId,
        now: Timestamp,
    ) -> Result<bool, EngineError> {
        let owner = self.fetch(id)?.owner;
        let _guard = self.lock_owner(&owner).await?;

        let mut record = self.fetch(id)?;
        match record.status {
            StakeStatus::Unstaked | StakeStatus::Cancelled => Ok(false),
            StakeStatus::Active => Err(EngineError::InvalidState {
                stake: id.to_string(),
                status: record.status,
            }),
            StakeStatus::PendingUnstake => {
                let deadline = record.cooldown_ends_at.ok_or_else(|| {
                    EngineError::Store(StoreError::Corruption(format!(
                        "pending stake {id} has no cooldown deadline"
                    )))
                })?;
                if !deadline.has_passed(now) {
                    return Ok(false);
                }
                record.status = StakeStatus::Unstaked;
                record.cooldown_ends_at = None;
                self.store.put_stake(&record)?;
                tracing::info!(stake = %id, owner = %owner, "stake released");
                Ok(true)
            }
        }
    }

    /// Periodic sweep: finalize every stake whose cooldown deadline has
    /// passed. Safe to run concurrently — finalization is idempotent per
    /// stake. Returns the stakes released by this sweep.
    pub async fn sweep_cooldowns(&self, now: Timestamp) -> Result<Vec<StakeId>, EngineError> {
        let due = self.store.cooldowns_ending_before(now)?;
        let mut released = Vec::new();
        for id in due {
            if self.finalize_unstake(&id, now).await? {
                released.push(id);
            }
        }
        tracing::debug!(released = released.len(), "cooldown sweep complete");
        Ok(released)
    }

    /// Claim every pending reward the owner has, across all accruing stakes.
    ///
    /// Runs entirely under the owner's lock: load, compute with the shared
    /// calculator, sum, then commit one atomic batch that bumps the lifetime
    /// counters and advances every accrual anchor to `now`. The anchor reset
    /// is what makes the claim idempotent — an immediate second call sees
    /// zero elapsed time on every record and fails with `NoPendingRewards`
    /// before any write.
    pub async fn claim_all_rewards(
        &self,
        owner: &OwnerAddress,
        now: Timestamp,
    ) -> Result<RewardAmount, EngineError> {
        let _guard = self.lock_owner(owner).await?;

        let records = self.store.stakes_for_owner(owner)?;
        let mut total = RewardAmount::ZERO;
        let mut updated = Vec::new();

        for mut record in records {
            if !record.accrues_rewards() {
                continue;
            }
            let pending = pending_reward_checked(
                &self.params,
                record.tier,
                record.last_verified_at,
                record.consecutive_days,
                now,
            )?;
            total = total.checked_add(pending).ok_or(EngineError::Overflow)?;

            record.total_rewards_earned = record
                .total_rewards_earned
                .checked_add(pending)
                .ok_or(EngineError::Overflow)?;
            record.total_rewards_claimed = record
                .total_rewards_claimed
                .checked_add(pending)
                .ok_or(EngineError::Overflow)?;
            // max() keeps the anchor monotone even if the caller's clock
            // runs behind a previous claim.
            record.last_verified_at = record.last_verified_at.max(now);
            updated.push(record);
        }

        if total.is_zero() {
            return Err(EngineError::NoPendingRewards(owner.to_string()));
        }

        self.store.put_stakes(&updated)?;
        tracing::info!(owner = %owner, amount = %total, stakes = updated.len(), "rewards claimed");
        Ok(total)
    }
}
