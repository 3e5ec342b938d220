//! ROHO (RH) Reward Ledger Library
//!
//! Vesting and staking accounting for RH work rewards: the immediate/locked
//! reward split, linear unlock of locked tokens, claims against the unlock
//! curve, and stake deposits with unbonding and role-based reward accrual.
//!
//! Networking, consensus, signing and transport live outside this crate.

pub mod account;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod staking;
pub mod storage;
pub mod vesting;

pub use account::{Account, Address};
pub use clock::{Clock, SystemClock, Timestamp};
pub use config::LedgerConfig;
pub use ledger::{ClaimRequest, Ledger, LedgerError};
pub use staking::Role;

/// Protocol constants - defaults for `LedgerConfig`
pub mod constants {
    /// Seconds in one accounting day
    pub const SECONDS_PER_DAY: u64 = 86_400;

    /// Days per year used to turn an APY into a daily rate
    pub const DAYS_PER_YEAR: u64 = 365;

    /// Basis points denominator (100% = 10_000 bps)
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Share of every reward credited immediately (percent)
    pub const IMMEDIATE_PERCENT: u64 = 40;

    /// Length of the linear unlock window for the locked share (days)
    pub const VESTING_DAYS: u64 = 20;

    /// Waiting period between an unstake request and withdrawal (days)
    pub const UNBONDING_DAYS: u64 = 7;

    /// Minimum stake to open a validator position (base units)
    pub const VALIDATOR_MIN_STAKE: u64 = 1_000;

    /// Minimum stake to open a delegator position (base units)
    pub const DELEGATOR_MIN_STAKE: u64 = 100;

    /// Validator reward rate, ~10% APY
    pub const VALIDATOR_APY_BPS: u64 = 1_000;

    /// Delegator reward rate, ~8% APY
    pub const DELEGATOR_APY_BPS: u64 = 800;
}
