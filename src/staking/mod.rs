//! Staking module - stake positions, unbonding and reward accrual

mod position;
mod rewards;

pub use position::*;
pub use rewards::*;
