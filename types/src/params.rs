//! Engine parameters — the tier schedule plus all host-tunable values.
//!
//! The schedule is an immutable configuration value injected at engine
//! construction, never a hard-coded global, so a host can re-rate tiers
//! without touching call sites.

use crate::amount::RewardAmount;
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accrual parameters for one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRate {
    /// Base reward accrued per full day of elapsed time.
    pub daily_rate: RewardAmount,
    /// Reward multiplier in hundredths (100 = ×1.00, 150 = ×1.50).
    pub multiplier_centi: u32,
}

/// The tier table: maps each tier to its daily base rate and multiplier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSchedule {
    pub rates: BTreeMap<Tier, TierRate>,
}

impl TierSchedule {
    /// Fallback rate applied when a tier is missing from the schedule:
    /// bronze's base rate with multiplier ×1.00. A read-path defense for
    /// already-persisted records; registration rejects unknown tiers.
    pub const FALLBACK_RATE: TierRate = TierRate {
        daily_rate: RewardAmount::from_micros(10_000_000),
        multiplier_centi: 100,
    };

    /// The standard schedule: bronze 10/×1.0, silver 15/×1.2, gold 25/×1.5,
    /// platinum 50/×2.0.
    pub fn standard() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(
            Tier::Bronze,
            TierRate { daily_rate: RewardAmount::from_units(10), multiplier_centi: 100 },
        );
        rates.insert(
            Tier::Silver,
            TierRate { daily_rate: RewardAmount::from_units(15), multiplier_centi: 120 },
        );
        rates.insert(
            Tier::Gold,
            TierRate { daily_rate: RewardAmount::from_units(25), multiplier_centi: 150 },
        );
        rates.insert(
            Tier::Platinum,
            TierRate { daily_rate: RewardAmount::from_units(50), multiplier_centi: 200 },
        );
        Self { rates }
    }

    /// Whether the schedule defines a rate for `tier`.
    pub fn contains(&self, tier: Tier) -> bool {
        self.rates.contains_key(&tier)
    }

    /// Rate for `tier`, falling back to [`Self::FALLBACK_RATE`] if absent.
    pub fn rate_for(&self, tier: Tier) -> TierRate {
        self.rates.get(&tier).copied().unwrap_or(Self::FALLBACK_RATE)
    }
}

impl Default for TierSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// All parameters the engine is constructed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Tier table used by every accrual computation.
    pub schedule: TierSchedule,

    /// Unstake cooldown in seconds. Default: 7 days = 604800.
    pub cooldown_secs: u64,

    /// Loyalty bonus per consecutive verified day, in basis points.
    /// Default: 100 (1% per day).
    pub streak_bonus_bps_per_day: u32,

    /// Cap on the loyalty bonus, in basis points. Default: 5000 (+50%).
    pub streak_bonus_cap_bps: u32,

    /// Bounded wait for the per-owner write lock, in milliseconds.
    /// Exceeding it surfaces a transient, retryable timeout error.
    pub lock_wait_ms: u64,
}

impl EngineParams {
    /// The standard configuration.
    pub fn standard() -> Self {
        Self {
            schedule: TierSchedule::standard(),
            cooldown_secs: 7 * 24 * 3600,
            streak_bonus_bps_per_day: 100,
            streak_bonus_cap_bps: 5_000,
            lock_wait_ms: 5_000,
        }
    }

    /// The cooldown duration in milliseconds.
    pub fn cooldown_millis(&self) -> u64 {
        self.cooldown_secs.saturating_mul(1000)
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_schedule_matches_tier_table() {
        let schedule = TierSchedule::standard();
        let gold = schedule.rate_for(Tier::Gold);
        assert_eq!(gold.daily_rate, RewardAmount::from_units(25));
        assert_eq!(gold.multiplier_centi, 150);
        assert!(schedule.contains(Tier::Platinum));
    }

    #[test]
    fn missing_tier_falls_back_to_bronze_base() {
        let mut schedule = TierSchedule::standard();
        schedule.rates.remove(&Tier::Platinum);
        let rate = schedule.rate_for(Tier::Platinum);
        assert_eq!(rate.daily_rate, RewardAmount::from_units(10));
        assert_eq!(rate.multiplier_centi, 100);
    }

    #[test]
    fn standard_cooldown_is_seven_days() {
        assert_eq!(EngineParams::standard().cooldown_millis(), 604_800_000);
    }
}
