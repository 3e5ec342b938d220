//! Property-based tests for the RH reward ledger
//!
//! These tests verify the vesting and accrual invariants hold under random
//! amounts, start times and claim sequences.

use proptest::prelude::*;
use rh_ledger::constants::{SECONDS_PER_DAY, VALIDATOR_APY_BPS, VESTING_DAYS};
use rh_ledger::staking::{accrue_daily, projected_reward};
use rh_ledger::storage::{LedgerStore, MemoryStore};
use rh_ledger::vesting::VestingGrant;
use rh_ledger::{Address, ClaimRequest, Ledger, LedgerConfig, LedgerError};

const MAX_REWARD: u64 = 1_000_000_000_000;

fn grant(total: u64, start: u64) -> VestingGrant {
    VestingGrant::new(0, Address::from("alice"), total, start, &LedgerConfig::default())
}

// ============================================================================
// UNLOCK CURVE
// ============================================================================

proptest! {
    /// Unlocked amount never decreases as time moves forward
    #[test]
    fn prop_unlock_monotonic(
        total in 1u64..MAX_REWARD,
        start in 0u64..1_000_000_000u64,
        t1 in 0u64..40 * SECONDS_PER_DAY,
        dt in 0u64..40 * SECONDS_PER_DAY,
    ) {
        let g = grant(total, start);
        let now1 = start + t1;
        let now2 = now1 + dt;
        prop_assert!(g.unlocked_amount(now1) <= g.unlocked_amount(now2));
    }

    /// Nothing at the start, everything at the end of the window
    #[test]
    fn prop_unlock_boundaries(
        total in 1u64..MAX_REWARD,
        start in 0u64..1_000_000_000u64,
    ) {
        let g = grant(total, start);
        prop_assert_eq!(g.unlocked_amount(start), 0);
        prop_assert_eq!(g.unlocked_amount(start + VESTING_DAYS * SECONDS_PER_DAY), g.vesting_amount);
        prop_assert_eq!(g.immediate_amount + g.vesting_amount, total);
    }

    /// Unlocked never exceeds the vesting share
    #[test]
    fn prop_unlock_bounded(
        total in 1u64..MAX_REWARD,
        elapsed in 0u64..u32::MAX as u64,
    ) {
        let g = grant(total, 0);
        prop_assert!(g.unlocked_amount(elapsed) <= g.vesting_amount);
    }

    /// Stepwise accrual with carried dust equals the closed-form total
    #[test]
    fn prop_accrual_dust_exact(
        amount in 100u64..1_000_000_000u64,
        days in 1u64..400u64,
    ) {
        let mut dust = 0;
        let mut total = 0u64;
        for _ in 0..days {
            let step = accrue_daily(amount, VALIDATOR_APY_BPS, dust);
            total += step.reward;
            dust = step.dust;
        }
        prop_assert_eq!(total, projected_reward(amount, VALIDATOR_APY_BPS, days));
    }
}

// ============================================================================
// CLAIM CONSERVATION
// ============================================================================

proptest! {
    /// Any claim sequence keeps every grant within bounds and moves exactly
    /// the claimed amount into the balance
    #[test]
    fn prop_claims_conserve_value(
        rewards in prop::collection::vec((1u64..100_000u64, 0u64..10u64), 1..5),
        claims in prop::collection::vec((0u64..30u64, 0u64..50_000u64), 1..20),
    ) {
        let ledger = Ledger::new(MemoryStore::new(), LedgerConfig::default());
        let alice = Address::from("alice");

        let mut immediate_total = 0;
        for (total, start_day) in &rewards {
            let receipt = ledger.issue_reward(&alice, *total, start_day * SECONDS_PER_DAY).unwrap();
            immediate_total += receipt.immediate_credited;
        }

        let mut day = 0;
        let mut claimed_total = 0;
        for (advance, amount) in &claims {
            day += advance;
            let now = day * SECONDS_PER_DAY;
            let before = ledger.balance(&alice).unwrap();
            let request = if *amount == 0 { ClaimRequest::All } else { ClaimRequest::Amount(*amount) };

            match ledger.claim(&alice, request, now) {
                Ok(receipt) => {
                    prop_assert_eq!(ledger.balance(&alice).unwrap(), before + receipt.claimed);
                    claimed_total += receipt.claimed;
                }
                Err(LedgerError::InsufficientClaimable { requested, available }) => {
                    prop_assert!(requested > available);
                    prop_assert_eq!(ledger.balance(&alice).unwrap(), before);
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }

        let state = ledger.store().load(&alice).unwrap().unwrap();
        prop_assert!(state.verify_invariants());
        let claimed_in_grants: u64 = state.vesting.grants().iter().map(|g| g.claimed_amount).sum();
        prop_assert_eq!(claimed_in_grants, claimed_total);
        prop_assert_eq!(ledger.balance(&alice).unwrap(), immediate_total + claimed_total);
    }
}
