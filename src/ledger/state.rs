//! Per-account ledger state
//!
//! Balance, grants and stake of one account travel together: they are loaded,
//! mutated and committed as one record, which is what makes each operation
//! atomic.

use crate::account::{Account, Address};
use crate::staking::StakingRegistry;
use crate::vesting::VestingRegistry;
use serde::{Deserialize, Serialize};

/// Everything the ledger knows about one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub account: Account,
    pub vesting: VestingRegistry,
    pub staking: StakingRegistry,
}

impl AccountState {
    /// State of an account that has never been referenced
    pub fn new(address: Address) -> Self {
        Self {
            account: Account::new(address),
            vesting: VestingRegistry::new(),
            staking: StakingRegistry::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.account.address
    }

    pub fn balance(&self) -> u64 {
        self.account.balance
    }

    /// Total ever issued to this account as rewards
    pub fn total_issued(&self) -> u64 {
        self.vesting
            .grants()
            .iter()
            .fold(0u64, |acc, g| acc.saturating_add(g.total_amount))
    }

    /// Immediate shares plus claimed vesting, i.e. reward paid out so far
    pub fn total_paid_out(&self) -> u64 {
        self.vesting
            .grants()
            .iter()
            .fold(0u64, |acc, g| {
                acc.saturating_add(g.immediate_amount).saturating_add(g.claimed_amount)
            })
    }

    /// Check the grant invariants of this account
    pub fn verify_invariants(&self) -> bool {
        let grants_ok = self.vesting.grants().iter().all(|g| {
            g.claimed_amount <= g.vesting_amount
                && g.immediate_amount + g.vesting_amount == g.total_amount
        });
        grants_ok && self.total_paid_out() <= self.total_issued()
    }

    /// Record one committed mutation
    pub(crate) fn bump_nonce(&mut self) {
        self.account.nonce = self.account.nonce.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    #[test]
    fn test_paid_out_tracks_immediate_and_claims() {
        let alice = Address::from("alice");
        let mut state = AccountState::new(alice.clone());
        state.vesting.issue(alice.clone(), 1000, 0, &LedgerConfig::default());
        state.vesting.issue(alice, 500, 0, &LedgerConfig::default());

        assert_eq!(state.total_issued(), 1500);
        assert_eq!(state.total_paid_out(), 600);
        assert!(state.verify_invariants());
    }
}
