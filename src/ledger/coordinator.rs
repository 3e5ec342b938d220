//! Ledger coordinator
//!
//! Single entry point for every balance-affecting operation. Each account
//! has its own lock; an operation takes the lock, works on a copy of the
//! account state, commits the copy to the store and only then publishes it.
//! A failed validation or a failed commit leaves nothing behind.
//!
//! Transfers are the only operation touching two accounts. They take both
//! account locks in ascending address order, so lock acquisition cannot
//! deadlock.

use super::*;
use crate::account::Address;
use crate::clock::Timestamp;
use crate::config::LedgerConfig;
use crate::staking::{Role, StakeStatus, StakeView};
use crate::storage::{LedgerDB, LedgerStore};
use crate::vesting::{ClaimRequest, ClaimableSummary};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Cached state of one account, loaded lazily from the store
#[derive(Debug, Default)]
struct AccountSlot {
    loaded: bool,
    /// `None` while the account has never been committed
    state: Option<AccountState>,
}

type SlotHandle = Arc<Mutex<AccountSlot>>;

/// Vesting and staking ledger over a `LedgerStore`
pub struct Ledger<S: LedgerStore> {
    store: S,
    config: LedgerConfig,
    /// Per-account locks; the map lock is only held to look up a handle
    slots: Mutex<HashMap<Address, SlotHandle>>,
}

impl Ledger<LedgerDB> {
    /// Open a sled-backed ledger at `path`
    pub fn open<P: AsRef<Path>>(path: P, config: LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(LedgerDB::open(path)?, config))
    }
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // VESTING
    // ========================================================================

    /// Create a vesting grant for a reward and pay out its immediate share
    pub fn issue_reward(&self, owner: &Address, total_amount: u64, now: Timestamp) -> Result<IssueReceipt, LedgerError> {
        let receipt = self.with_account(owner, false, |state| {
            if total_amount == 0 {
                return Err(LedgerError::InvalidAmount);
            }

            let grant = state.vesting.issue(owner.clone(), total_amount, now, &self.config).clone();
            let new_balance = state
                .account
                .credit(grant.immediate_amount)
                .ok_or(LedgerError::InvalidAmount)?;

            Ok(IssueReceipt {
                grant_id: grant.id,
                immediate_credited: grant.immediate_amount,
                vesting_amount: grant.vesting_amount,
                daily_unlock: grant.daily_unlock,
                new_balance,
            })
        })?;

        info!(
            owner = %owner,
            grant_id = receipt.grant_id,
            total = total_amount,
            immediate = receipt.immediate_credited,
            "reward issued"
        );
        Ok(receipt)
    }

    /// Claimable amounts as of `now`; never mutates state
    pub fn check_claimable(&self, owner: &Address, now: Timestamp) -> Result<ClaimableSummary, LedgerError> {
        self.read_account(owner, |state| {
            state.map(|s| s.vesting.summary(now)).unwrap_or_default()
        })
    }

    /// Claim unlocked vesting into the spendable balance, oldest grant first
    pub fn claim(&self, owner: &Address, request: ClaimRequest, now: Timestamp) -> Result<ClaimReceipt, LedgerError> {
        let receipt = self.with_account(owner, false, |state| {
            let plan = state.vesting.plan_claim(request, now)?;
            state.vesting.apply_claim(&plan);
            let new_balance = state
                .account
                .credit(plan.total)
                .ok_or(LedgerError::InvalidAmount)?;

            Ok(ClaimReceipt {
                claimed: plan.total,
                draws: plan.draws,
                new_balance,
                remaining_claimable: state.vesting.total_claimable(now),
            })
        })?;

        if receipt.claimed > 0 {
            info!(owner = %owner, claimed = receipt.claimed, grants = receipt.draws.len(), "rewards claimed");
        }
        Ok(receipt)
    }

    // ========================================================================
    // STAKING
    // ========================================================================

    /// Open a stake position or add to the active one
    pub fn stake(&self, owner: &Address, amount: u64, role: Role, now: Timestamp) -> Result<StakeReceipt, LedgerError> {
        let receipt = self.with_account(owner, false, |state| {
            let available = state.balance();
            let total_staked = state
                .staking
                .stake(owner, amount, role, available, now, &self.config)?;
            let new_balance = state.account.debit(amount).ok_or(LedgerError::InsufficientBalance {
                have: available,
                need: amount,
            })?;

            Ok(StakeReceipt {
                total_staked,
                role,
                status: StakeStatus::Active,
                new_balance,
            })
        })?;

        info!(owner = %owner, role = %role, amount, total = receipt.total_staked, "stake deposited");
        Ok(receipt)
    }

    /// Start unbonding the active position
    pub fn request_unstake(&self, owner: &Address, now: Timestamp) -> Result<UnstakeReceipt, LedgerError> {
        let receipt = self.with_account(owner, false, |state| {
            let position = state.staking.request_unstake(now, &self.config)?;
            Ok(UnstakeReceipt {
                amount: position.amount,
                unbonding_started: now,
                withdrawable_at: position.withdrawable_at.unwrap_or(now),
            })
        })?;

        info!(
            owner = %owner,
            amount = receipt.amount,
            withdrawable_at = receipt.withdrawable_at,
            "unbonding started"
        );
        Ok(receipt)
    }

    /// Return principal and accrued reward of a matured position
    pub fn withdraw(&self, owner: &Address, now: Timestamp) -> Result<WithdrawReceipt, LedgerError> {
        let receipt = self.with_account(owner, true, |state| {
            let position = state.staking.withdraw(now)?;
            let returned = position.payout().ok_or(LedgerError::InvalidAmount)?;
            let new_balance = state.account.credit(returned).ok_or(LedgerError::InvalidAmount)?;

            Ok(WithdrawReceipt {
                principal: position.amount,
                reward: position.accrued_unclaimed_reward,
                returned,
                new_balance,
            })
        })?;

        info!(owner = %owner, returned = receipt.returned, reward = receipt.reward, "stake withdrawn");
        Ok(receipt)
    }

    /// Add one accounting period of reward to an active position
    ///
    /// Called by an external scheduler. A position that already received
    /// its reward for the current period fails with `AccrualNotDue`.
    pub fn accrue_reward(&self, owner: &Address, now: Timestamp) -> Result<AccrualReceipt, LedgerError> {
        let receipt = self.with_account(owner, true, |state| {
            let (reward, accrued_total) = state.staking.accrue(now, &self.config)?;
            Ok(AccrualReceipt { reward, accrued_total })
        })?;

        debug!(owner = %owner, reward = receipt.reward, accrued = receipt.accrued_total, "reward accrued");
        Ok(receipt)
    }

    /// Accrue one period for every active position in the store
    pub fn accrue_all(&self, now: Timestamp) -> Result<AccrualReport, LedgerError> {
        let mut report = AccrualReport::default();

        for address in self.store.addresses()? {
            match self.accrue_reward(&address, now) {
                Ok(receipt) => {
                    report.positions += 1;
                    report.total_reward = report.total_reward.saturating_add(receipt.reward);
                }
                Err(LedgerError::NoActiveStake)
                | Err(LedgerError::UnknownAccount(_))
                | Err(LedgerError::AccrualNotDue { .. }) => {}
                Err(e) => {
                    warn!(owner = %address, error = %e, "accrual failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            positions = report.positions,
            total_reward = report.total_reward,
            failed = report.failed,
            "accrual pass complete"
        );
        Ok(report)
    }

    /// Current stake position, if any
    pub fn stake_info(&self, owner: &Address, now: Timestamp) -> Result<Option<StakeView>, LedgerError> {
        self.read_account(owner, |state| state.and_then(|s| s.staking.view(now)))
    }

    // ========================================================================
    // ACCOUNTS
    // ========================================================================

    /// Move spendable balance between accounts
    pub fn transfer(&self, from: &Address, to: &Address, amount: u64, now: Timestamp) -> Result<TransferReceipt, LedgerError> {
        if amount == 0 {
            debug!(from = %from, "transfer rejected: zero amount");
            return Err(LedgerError::InvalidAmount);
        }

        if from == to {
            // Validated, but moves and commits nothing
            let balance = self.balance(from)?;
            if balance < amount {
                return Err(LedgerError::InsufficientBalance { have: balance, need: amount });
            }
            return Ok(TransferReceipt {
                amount,
                from_balance: balance,
                to_balance: balance,
            });
        }

        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let first_slot = self.slot(first);
        let second_slot = self.slot(second);

        let (result, vacant) = {
            let mut first_guard = first_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let mut second_guard = second_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let (from_guard, to_guard) = if from < to {
                (&mut *first_guard, &mut *second_guard)
            } else {
                (&mut *second_guard, &mut *first_guard)
            };
            let result = self.move_balance(from_guard, to_guard, from, to, amount);
            (result, [first_guard.state.is_none(), second_guard.state.is_none()])
        };
        if vacant[0] {
            self.release_slot(first, &first_slot);
        }
        if vacant[1] {
            self.release_slot(second, &second_slot);
        }

        let receipt = result?;
        info!(from = %from, to = %to, amount, at = now, "transfer applied");
        Ok(receipt)
    }

    /// Debit `from` and credit `to`, both slots already locked
    fn move_balance(
        &self,
        from_slot: &mut AccountSlot,
        to_slot: &mut AccountSlot,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<TransferReceipt, LedgerError> {
        self.ensure_loaded(from_slot, from)?;
        self.ensure_loaded(to_slot, to)?;

        let mut from_state = from_slot.state.clone().unwrap_or_else(|| AccountState::new(from.clone()));
        let mut to_state = to_slot.state.clone().unwrap_or_else(|| AccountState::new(to.clone()));

        let have = from_state.balance();
        let from_balance = match from_state.account.debit(amount) {
            Some(balance) => balance,
            None => {
                debug!(from = %from, have, need = amount, "transfer rejected: insufficient balance");
                return Err(LedgerError::InsufficientBalance { have, need: amount });
            }
        };
        let to_balance = to_state.account.credit(amount).ok_or(LedgerError::InvalidAmount)?;
        from_state.bump_nonce();
        to_state.bump_nonce();

        if let Err(e) = self.store.commit(&[&from_state, &to_state]) {
            warn!(from = %from, to = %to, error = %e, "transfer commit failed");
            return Err(e.into());
        }
        from_slot.state = Some(from_state);
        to_slot.state = Some(to_state);

        Ok(TransferReceipt {
            amount,
            from_balance,
            to_balance,
        })
    }

    /// Spendable balance; unknown accounts have zero
    pub fn balance(&self, owner: &Address) -> Result<u64, LedgerError> {
        self.read_account(owner, |state| state.map(|s| s.balance()).unwrap_or(0))
    }

    /// Balance, vesting and stake of one account
    pub fn account_summary(&self, owner: &Address, now: Timestamp) -> Result<AccountSummary, LedgerError> {
        self.read_account(owner, |state| match state {
            Some(s) => AccountSummary {
                balance: s.balance(),
                nonce: s.account.nonce,
                claimable: s.vesting.total_claimable(now),
                locked: s.vesting.locked_amount(now),
                stake: s.staking.view(now),
            },
            None => AccountSummary {
                balance: 0,
                nonce: 0,
                claimable: 0,
                locked: 0,
                stake: None,
            },
        })
    }

    /// Totals over committed state
    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        let mut stats = LedgerStats::default();

        for address in self.store.addresses()? {
            let Some(state) = self.store.load(&address)? else {
                continue;
            };
            stats.accounts += 1;
            stats.total_balance = stats.total_balance.saturating_add(state.balance());
            stats.total_unclaimed_vesting = stats
                .total_unclaimed_vesting
                .saturating_add(state.vesting.unclaimed_amount());
            if let Some(position) = state.staking.position() {
                stats.total_staked = stats.total_staked.saturating_add(position.amount);
                stats.total_accrued_reward = stats
                    .total_accrued_reward
                    .saturating_add(position.accrued_unclaimed_reward);
            }
        }

        Ok(stats)
    }

    // ========================================================================
    // LOCKING AND COMMIT
    // ========================================================================

    fn slot(&self, address: &Address) -> SlotHandle {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(address.clone()).or_default().clone()
    }

    fn existing_slot(&self, address: &Address) -> Option<SlotHandle> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(address).cloned()
    }

    /// Drop the slot of an account that was never committed, unless another
    /// operation still holds it
    fn release_slot(&self, address: &Address, slot: &SlotHandle) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = matches!(slots.get(address), Some(cached) if Arc::ptr_eq(cached, slot))
            && Arc::strong_count(slot) == 2;
        if !unused {
            return;
        }

        let vacant = match slot.try_lock() {
            Ok(guard) => guard.state.is_none(),
            Err(_) => false,
        };
        if vacant {
            slots.remove(address);
        }
    }

    #[cfg(test)]
    fn cached_accounts(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn ensure_loaded(&self, slot: &mut AccountSlot, address: &Address) -> Result<(), LedgerError> {
        if !slot.loaded {
            slot.state = self.store.load(address)?;
            slot.loaded = true;
        }
        Ok(())
    }

    /// Read one account under its lock
    ///
    /// Accounts without a cached slot are read straight from the store and
    /// are not cached.
    fn read_account<T>(&self, address: &Address, read: impl FnOnce(Option<&AccountState>) -> T) -> Result<T, LedgerError> {
        let Some(slot) = self.existing_slot(address) else {
            let state = self.store.load(address)?;
            return Ok(read(state.as_ref()));
        };
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_loaded(&mut guard, address)?;
        Ok(read(guard.state.as_ref()))
    }

    /// Apply `op` to one account under its lock and commit the result
    ///
    /// `op` works on a copy; the copy is committed and published only if `op`
    /// succeeds and actually changed something. With `require_existing`, an
    /// account that was never committed fails with `UnknownAccount`.
    fn with_account<T>(
        &self,
        address: &Address,
        require_existing: bool,
        op: impl FnOnce(&mut AccountState) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let slot = self.slot(address);
        let (result, vacant) = {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let result = self.apply(&mut guard, address, require_existing, op);
            (result, guard.state.is_none())
        };
        if vacant {
            self.release_slot(address, &slot);
        }
        result
    }

    fn apply<T>(
        &self,
        guard: &mut AccountSlot,
        address: &Address,
        require_existing: bool,
        op: impl FnOnce(&mut AccountState) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        self.ensure_loaded(guard, address)?;

        if require_existing && guard.state.is_none() {
            debug!(account = %address, "operation rejected: unknown account");
            return Err(LedgerError::UnknownAccount(address.clone()));
        }

        let baseline = guard
            .state
            .clone()
            .unwrap_or_else(|| AccountState::new(address.clone()));
        let mut working = baseline.clone();

        let value = match op(&mut working) {
            Ok(value) => value,
            Err(e) => {
                debug!(account = %address, error = %e, "operation rejected");
                return Err(e);
            }
        };

        if working == baseline {
            return Ok(value);
        }

        working.bump_nonce();
        if let Err(e) = self.store.commit(&[&working]) {
            warn!(account = %address, error = %e, "commit failed");
            return Err(e.into());
        }
        guard.state = Some(working);
        Ok(value)
    }
}
