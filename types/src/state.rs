//! Stake status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a stake record.
///
/// Transitions are linear: `Active → PendingUnstake → Unstaked`, with one
/// side exit `PendingUnstake → Cancelled` driven by the cancel-and-refund
/// path. `Unstaked` and `Cancelled` are terminal; records in a terminal
/// state are retained for history, never deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeStatus {
    /// Staked and accruing rewards.
    Active,
    /// Unstake initiated; cooldown running. Still accruing rewards.
    PendingUnstake,
    /// Cooldown elapsed and the stake was released. Terminal.
    Unstaked,
    /// Unstake cancelled and refunded by the offer subsystem. Terminal.
    Cancelled,
}

impl StakeStatus {
    /// Whether this stake still accrues (and can claim) rewards.
    pub fn accrues_rewards(&self) -> bool {
        matches!(self, Self::Active | Self::PendingUnstake)
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unstaked | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingUnstake => "pending_unstake",
            Self::Unstaked => "unstaked",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
