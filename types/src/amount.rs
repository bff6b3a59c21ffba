//! Reward amount type.
//!
//! Amounts are fixed-point integers (u128) in micro-units — one unit is
//! 1_000_000 micros, so every quantity carries exactly six decimal places.
//! No binary floating point is used anywhere in reward arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of micro-units in one whole reward unit (six decimal places).
pub const MICROS_PER_UNIT: u128 = 1_000_000;

/// A reward amount in micro-units (u128).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RewardAmount(u128);

impl RewardAmount {
    pub const ZERO: Self = Self(0);

    /// Create an amount from raw micro-units.
    pub const fn from_micros(micros: u128) -> Self {
        Self(micros)
    }

    /// Create an amount from whole reward units.
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * MICROS_PER_UNIT)
    }

    /// Raw micro-units.
    pub fn micros(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for RewardAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for RewardAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

/// Displays with exactly six fractional digits, e.g. `82.500000`.
impl fmt::Display for RewardAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0 / MICROS_PER_UNIT,
            self.0 % MICROS_PER_UNIT
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_six_decimals() {
        assert_eq!(RewardAmount::from_units(10).to_string(), "10.000000");
        assert_eq!(RewardAmount::from_micros(82_500_000).to_string(), "82.500000");
        assert_eq!(RewardAmount::from_micros(1).to_string(), "0.000001");
        assert_eq!(RewardAmount::ZERO.to_string(), "0.000000");
    }

    #[test]
    fn checked_arithmetic() {
        let a = RewardAmount::from_units(3);
        let b = RewardAmount::from_units(2);
        assert_eq!(a.checked_add(b), Some(RewardAmount::from_units(5)));
        assert_eq!(a.checked_sub(b), Some(RewardAmount::from_units(1)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(
            RewardAmount::from_micros(u128::MAX).checked_add(RewardAmount::from_micros(1)),
            None
        );
    }
}
