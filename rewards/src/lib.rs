//! Reward accrual — a deterministic function of time, tier, and streak.
//!
//! `pending(s) = daily_rate(tier) × elapsed_days × multiplier(tier) × (1 + streak_bonus)`
//!
//! Pending rewards are never persisted; they are always recomputed from the
//! stored fields plus a caller-supplied "now". Every read path and the
//! transactional claim path share this single implementation so they agree
//! bit-for-bit on the amount owed.
//!
//! All arithmetic is integer multiply/divide on u128 micro-units; the final
//! division rounds half away from zero, so results carry exactly six
//! decimal places with no binary floating point involved.

pub mod calc;
pub mod error;

pub use calc::{pending_reward, pending_reward_checked, streak_bonus_bps};
pub use error::RewardError;
