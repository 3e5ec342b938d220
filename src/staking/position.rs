//! Stake positions and their lifecycle
//!
//! An account holds at most one position, which moves through
//! `Active -> Unbonding -> Withdrawable` and is removed on withdrawal.
//! A stake can only be withdrawn after it has gone through unbonding.

use super::accrue_daily;
use crate::account::Address;
use crate::clock::Timestamp;
use crate::config::LedgerConfig;
use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Staking role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Validator,
    Delegator,
}

impl Role {
    /// Smallest amount that opens a position
    pub fn minimum_stake(&self, config: &LedgerConfig) -> u64 {
        match self {
            Role::Validator => config.validator_min_stake,
            Role::Delegator => config.delegator_min_stake,
        }
    }

    /// Annual reward rate in basis points
    pub fn apy_bps(&self, config: &LedgerConfig) -> u64 {
        match self {
            Role::Validator => config.validator_apy_bps,
            Role::Delegator => config.delegator_apy_bps,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Validator => f.write_str("validator"),
            Role::Delegator => f.write_str("delegator"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "validator" => Ok(Role::Validator),
            "delegator" => Ok(Role::Delegator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Lifecycle state of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeStatus {
    Active,
    Unbonding,
    Withdrawable,
}

/// A staked deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub owner: Address,
    pub role: Role,
    /// Staked principal
    pub amount: u64,
    pub status: StakeStatus,
    pub staked_at: Timestamp,
    pub unbond_requested_at: Option<Timestamp>,
    /// Set together with `unbond_requested_at`
    pub withdrawable_at: Option<Timestamp>,
    pub accrued_unclaimed_reward: u64,
    /// Fractional reward numerator carried between accruals
    pub reward_dust: u64,
    pub last_accrued_at: Option<Timestamp>,
}

impl StakePosition {
    pub fn open(owner: Address, role: Role, amount: u64, now: Timestamp) -> Self {
        Self {
            owner,
            role,
            amount,
            status: StakeStatus::Active,
            staked_at: now,
            unbond_requested_at: None,
            withdrawable_at: None,
            accrued_unclaimed_reward: 0,
            reward_dust: 0,
            last_accrued_at: None,
        }
    }

    /// Status as of `now`; unbonding becomes withdrawable once the period ends
    pub fn status_at(&self, now: Timestamp) -> StakeStatus {
        match (self.status, self.withdrawable_at) {
            (StakeStatus::Unbonding, Some(ready)) if now >= ready => StakeStatus::Withdrawable,
            (status, _) => status,
        }
    }

    /// Principal plus accrued reward
    pub fn payout(&self) -> Option<u64> {
        self.amount.checked_add(self.accrued_unclaimed_reward)
    }
}

/// Read-only view of a position at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeView {
    pub role: Role,
    pub amount: u64,
    pub status: StakeStatus,
    pub accrued_reward: u64,
    pub unbond_requested_at: Option<Timestamp>,
    pub withdrawable_at: Option<Timestamp>,
}

/// Per-account staking state: at most one position
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakingRegistry {
    position: Option<StakePosition>,
}

impl StakingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<&StakePosition> {
        self.position.as_ref()
    }

    pub fn view(&self, now: Timestamp) -> Option<StakeView> {
        self.position.as_ref().map(|p| StakeView {
            role: p.role,
            amount: p.amount,
            status: p.status_at(now),
            accrued_reward: p.accrued_unclaimed_reward,
            unbond_requested_at: p.unbond_requested_at,
            withdrawable_at: p.withdrawable_at,
        })
    }

    /// True if the position is active and earning rewards
    pub fn is_active(&self) -> bool {
        matches!(&self.position, Some(p) if p.status == StakeStatus::Active)
    }

    /// Open a position or add to the active one
    ///
    /// `available` is the owner's spendable balance; the caller debits it
    /// after this succeeds. Returns the new staked total.
    pub fn stake(
        &mut self,
        owner: &Address,
        amount: u64,
        role: Role,
        available: u64,
        now: Timestamp,
        config: &LedgerConfig,
    ) -> Result<u64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        if let Some(existing) = &self.position {
            if existing.status != StakeStatus::Active {
                return Err(LedgerError::NoActiveStake);
            }
            if existing.role != role {
                return Err(LedgerError::RoleConflict {
                    existing: existing.role,
                    requested: role,
                });
            }
        }

        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                have: available,
                need: amount,
            });
        }

        match self.position.as_mut() {
            Some(existing) => {
                existing.amount = existing
                    .amount
                    .checked_add(amount)
                    .ok_or(LedgerError::InvalidAmount)?;
                Ok(existing.amount)
            }
            None => {
                if amount < role.minimum_stake(config) {
                    return Err(LedgerError::InvalidAmount);
                }
                self.position = Some(StakePosition::open(owner.clone(), role, amount, now));
                Ok(amount)
            }
        }
    }

    /// Move the active position into unbonding; returns it
    pub fn request_unstake(&mut self, now: Timestamp, config: &LedgerConfig) -> Result<&StakePosition, LedgerError> {
        match self.position.as_mut() {
            Some(position) if position.status == StakeStatus::Active => {
                position.status = StakeStatus::Unbonding;
                position.unbond_requested_at = Some(now);
                position.withdrawable_at = Some(now.saturating_add(config.unbonding_secs()));
                Ok(&*position)
            }
            _ => Err(LedgerError::NoActiveStake),
        }
    }

    /// Remove a matured position and return it for payout
    pub fn withdraw(&mut self, now: Timestamp) -> Result<StakePosition, LedgerError> {
        let position = self.position.as_ref().ok_or(LedgerError::NoWithdrawableStake)?;

        match position.status_at(now) {
            StakeStatus::Active => Err(LedgerError::NoWithdrawableStake),
            StakeStatus::Unbonding => Err(LedgerError::UnbondingNotComplete {
                withdrawable_at: position.withdrawable_at.unwrap_or(now),
            }),
            StakeStatus::Withdrawable => {
                let mut position = self.position.take().ok_or(LedgerError::NoWithdrawableStake)?;
                position.status = StakeStatus::Withdrawable;
                Ok(position)
            }
        }
    }

    /// Add one accounting period of reward to the active position
    ///
    /// A period is due one accounting day after the previous period boundary
    /// (or the stake time). Each call books at most one period and advances
    /// the boundary by exactly one day. Returns (reward added, accrued total).
    pub fn accrue(&mut self, now: Timestamp, config: &LedgerConfig) -> Result<(u64, u64), LedgerError> {
        match self.position.as_mut() {
            Some(position) if position.status == StakeStatus::Active => {
                let due = position
                    .last_accrued_at
                    .unwrap_or(position.staked_at)
                    .saturating_add(config.seconds_per_day);
                if now < due {
                    return Err(LedgerError::AccrualNotDue { next_accrual_at: due });
                }

                let step = accrue_daily(position.amount, position.role.apy_bps(config), position.reward_dust);
                position.accrued_unclaimed_reward = position
                    .accrued_unclaimed_reward
                    .checked_add(step.reward)
                    .ok_or(LedgerError::InvalidAmount)?;
                position.reward_dust = step.dust;
                position.last_accrued_at = Some(due);
                Ok((step.reward, position.accrued_unclaimed_reward))
            }
            _ => Err(LedgerError::NoActiveStake),
        }
    }
}
