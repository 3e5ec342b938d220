//! Results returned by successful ledger operations

use crate::clock::Timestamp;
use crate::staking::{Role, StakeStatus, StakeView};
use crate::vesting::{GrantDraw, GrantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReceipt {
    pub grant_id: GrantId,
    pub immediate_credited: u64,
    pub vesting_amount: u64,
    pub daily_unlock: u64,
    pub new_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub claimed: u64,
    /// Amount taken from each grant, oldest first
    pub draws: Vec<GrantDraw>,
    pub new_balance: u64,
    /// Claimable total left right after the claim
    pub remaining_claimable: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeReceipt {
    pub total_staked: u64,
    pub role: Role,
    pub status: StakeStatus,
    pub new_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakeReceipt {
    pub amount: u64,
    pub unbonding_started: Timestamp,
    pub withdrawable_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub principal: u64,
    pub reward: u64,
    /// Principal plus reward credited to the balance
    pub returned: u64,
    pub new_balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualReceipt {
    pub reward: u64,
    pub accrued_total: u64,
}

/// Outcome of one pass over all active stakes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccrualReport {
    /// Positions that accrued
    pub positions: usize,
    pub total_reward: u64,
    /// Accounts whose accrual failed to commit
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub amount: u64,
    pub from_balance: u64,
    pub to_balance: u64,
}

/// Balance-query view of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub balance: u64,
    pub nonce: u64,
    pub claimable: u64,
    /// Vesting not yet unlocked
    pub locked: u64,
    pub stake: Option<StakeView>,
}

/// Totals over committed state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accounts: usize,
    pub total_balance: u64,
    pub total_unclaimed_vesting: u64,
    pub total_staked: u64,
    pub total_accrued_reward: u64,
}
