//! Accrual-specific errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("arithmetic overflow in reward computation")]
    Overflow,
}
