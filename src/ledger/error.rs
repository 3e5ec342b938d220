//! Ledger errors

use crate::account::Address;
use crate::clock::Timestamp;
use crate::staking::Role;
use crate::storage::StorageError;
use thiserror::Error;

/// Every way a ledger operation can fail
///
/// Validation failures are deterministic for a given state and time and
/// leave all state untouched.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("Insufficient claimable: requested {requested}, available {available}")]
    InsufficientClaimable { requested: u64, available: u64 },
    #[error("No active stake")]
    NoActiveStake,
    #[error("Role conflict: existing stake is {existing}, requested {requested}")]
    RoleConflict { existing: Role, requested: Role },
    #[error("Unbonding not complete until {withdrawable_at}")]
    UnbondingNotComplete { withdrawable_at: Timestamp },
    #[error("Reward accrual not due until {next_accrual_at}")]
    AccrualNotDue { next_accrual_at: Timestamp },
    #[error("No withdrawable stake")]
    NoWithdrawableStake,
    #[error("Unknown account: {0}")]
    UnknownAccount(Address),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
