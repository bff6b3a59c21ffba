//! The accrual calculator.

use crate::error::RewardError;
use moor_types::time::MILLIS_PER_DAY;
use moor_types::{EngineParams, RewardAmount, Tier, Timestamp};

/// Denominator folding together the per-day divisor, the centi multiplier
/// scale, and the basis-point bonus scale.
const SCALE: u128 = MILLIS_PER_DAY as u128 * 100 * 10_000;

/// Loyalty bonus in basis points for an unbroken verification streak,
/// capped at `streak_bonus_cap_bps`.
pub fn streak_bonus_bps(params: &EngineParams, consecutive_days: u32) -> u32 {
    (consecutive_days as u64)
        .saturating_mul(params.streak_bonus_bps_per_day as u64)
        .min(params.streak_bonus_cap_bps as u64) as u32
}

/// Compute the pending reward for one stake snapshot as of `now`.
///
/// Total over its whole domain: elapsed time is clamped to zero under clock
/// skew, a tier missing from the schedule falls back to the bronze base
/// rate, and overflow saturates. The claim path uses
/// [`pending_reward_checked`] instead, which surfaces overflow as an error
/// rather than paying a saturated amount.
pub fn pending_reward(
    params: &EngineParams,
    tier: Tier,
    last_verified_at: Timestamp,
    consecutive_days: u32,
    now: Timestamp,
) -> RewardAmount {
    pending_reward_checked(params, tier, last_verified_at, consecutive_days, now)
        .unwrap_or(RewardAmount::from_micros(u128::MAX))
}

/// Compute the pending reward with checked arithmetic.
pub fn pending_reward_checked(
    params: &EngineParams,
    tier: Tier,
    last_verified_at: Timestamp,
    consecutive_days: u32,
    now: Timestamp,
) -> Result<RewardAmount, RewardError> {
    let elapsed_ms = last_verified_at.elapsed_since(now) as u128;
    if elapsed_ms == 0 {
        return Ok(RewardAmount::ZERO);
    }

    let rate = params.schedule.rate_for(tier);
    let bonus_bps = streak_bonus_bps(params, consecutive_days) as u128;

    // daily_rate × elapsed_days × multiplier × (1 + bonus), kept as one
    // integer product over SCALE so rounding happens exactly once.
    let numerator = rate
        .daily_rate
        .micros()
        .checked_mul(elapsed_ms)
        .and_then(|n| n.checked_mul(rate.multiplier_centi as u128))
        .and_then(|n| n.checked_mul(10_000 + bonus_bps))
        .ok_or(RewardError::Overflow)?;

    Ok(RewardAmount::from_micros(div_round_half_away(
        numerator, SCALE,
    )))
}

/// Integer division rounding half away from zero (operands are
/// non-negative, so this is round-half-up).
fn div_round_half_away(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder * 2 >= denominator {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> EngineParams {
        EngineParams::standard()
    }

    #[test]
    fn gold_two_days_ten_day_streak_is_82_5() {
        // 25 × 2 × 1.5 × 1.10 = 82.5
        let p = params();
        let start = Timestamp::new(1_000_000);
        let now = start.plus_millis(2 * MILLIS_PER_DAY);
        let reward = pending_reward(&p, Tier::Gold, start, 10, now);
        assert_eq!(reward, RewardAmount::from_micros(82_500_000));
        assert_eq!(reward.to_string(), "82.500000");
    }

    #[test]
    fn streak_bonus_caps_at_fifty_percent() {
        let p = params();
        assert_eq!(streak_bonus_bps(&p, 0), 0);
        assert_eq!(streak_bonus_bps(&p, 10), 1_000);
        assert_eq!(streak_bonus_bps(&p, 50), 5_000);
        assert_eq!(streak_bonus_bps(&p, 100), 5_000);

        let start = Timestamp::new(0);
        let now = start.plus_millis(3 * MILLIS_PER_DAY);
        let at_cap = pending_reward(&p, Tier::Platinum, start, 50, now);
        let past_cap = pending_reward(&p, Tier::Platinum, start, 100, now);
        assert_eq!(at_cap, past_cap);
    }

    #[test]
    fn backwards_clock_yields_zero() {
        let p = params();
        let later = Timestamp::new(10 * MILLIS_PER_DAY);
        let earlier = Timestamp::new(3 * MILLIS_PER_DAY);
        assert_eq!(
            pending_reward(&p, Tier::Silver, later, 5, earlier),
            RewardAmount::ZERO
        );
    }

    #[test]
    fn zero_elapsed_yields_zero() {
        let p = params();
        let t = Timestamp::new(42);
        assert_eq!(pending_reward(&p, Tier::Gold, t, 10, t), RewardAmount::ZERO);
    }

    #[test]
    fn missing_tier_uses_bronze_base_rate() {
        let mut p = params();
        p.schedule.rates.remove(&Tier::Platinum);
        let start = Timestamp::new(0);
        let now = start.plus_millis(MILLIS_PER_DAY);
        // One day at the fallback: 10 × 1 × 1.0 = 10
        assert_eq!(
            pending_reward(&p, Tier::Platinum, start, 0, now),
            RewardAmount::from_units(10)
        );
    }

    #[test]
    fn sub_second_elapsed_accrues() {
        // 500 ms on platinum: 50 × (0.5/86400) × 2.0 ≈ 0.000579
        let p = params();
        let start = Timestamp::new(0);
        let reward = pending_reward(&p, Tier::Platinum, start, 0, Timestamp::new(500));
        assert_eq!(reward, RewardAmount::from_micros(579));
    }

    #[test]
    fn exact_half_micro_rounds_away_from_zero() {
        // bronze, 3 ms elapsed, 44-day streak:
        // 10 × (3/86400000) × 1.0 × 1.44 = 0.0000005 exactly → 1 micro
        let p = params();
        let start = Timestamp::new(0);
        let reward = pending_reward(&p, Tier::Bronze, start, 44, Timestamp::new(3));
        assert_eq!(reward, RewardAmount::from_micros(1));
    }

    #[test]
    fn overflow_is_an_error_on_the_checked_path() {
        let mut p = params();
        p.schedule.rates.insert(
            Tier::Gold,
            moor_types::TierRate {
                daily_rate: RewardAmount::from_micros(u128::MAX / 2),
                multiplier_centi: u32::MAX,
            },
        );
        let start = Timestamp::new(0);
        let now = start.plus_millis(1000 * MILLIS_PER_DAY);
        assert!(matches!(
            pending_reward_checked(&p, Tier::Gold, start, 0, now),
            Err(RewardError::Overflow)
        ));
    }

    proptest! {
        #[test]
        fn pending_is_monotone_in_elapsed_time(
            elapsed_a in 0u64..=365 * MILLIS_PER_DAY,
            elapsed_b in 0u64..=365 * MILLIS_PER_DAY,
            days in 0u32..=400,
        ) {
            let p = params();
            let start = Timestamp::new(0);
            let (lo, hi) = if elapsed_a <= elapsed_b {
                (elapsed_a, elapsed_b)
            } else {
                (elapsed_b, elapsed_a)
            };
            let r_lo = pending_reward(&p, Tier::Gold, start, days, Timestamp::new(lo));
            let r_hi = pending_reward(&p, Tier::Gold, start, days, Timestamp::new(hi));
            prop_assert!(r_lo <= r_hi);
        }

        #[test]
        fn streaks_past_the_cap_are_equivalent(
            elapsed in 0u64..=365 * MILLIS_PER_DAY,
            days in 50u32..=10_000,
        ) {
            let p = params();
            let start = Timestamp::new(0);
            let now = Timestamp::new(elapsed);
            let capped = pending_reward(&p, Tier::Silver, start, 50, now);
            let past = pending_reward(&p, Tier::Silver, start, days, now);
            prop_assert_eq!(capped, past);
        }
    }
}
