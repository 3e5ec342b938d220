//! Vesting grant and unlock math
//!
//! A grant is created by one reward issuance. Its immediate share is paid out
//! at creation; the locked share unlocks in equal whole-day steps over the
//! vesting window, with the last day absorbing the division remainder.
//! All functions here are pure.

use crate::account::Address;
use crate::clock::{elapsed_days, Timestamp};
use crate::config::LedgerConfig;
use serde::{Deserialize, Serialize};

/// Per-account grant identifier, assigned in issuance order
pub type GrantId = u64;

/// One reward issuance's vesting record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingGrant {
    pub id: GrantId,
    pub owner: Address,
    /// Full reward amount
    pub total_amount: u64,
    /// Share credited to the balance at creation
    pub immediate_amount: u64,
    /// Share released by the unlock curve
    pub vesting_amount: u64,
    pub duration_days: u64,
    /// Amount unlocked per whole day (floor)
    pub daily_unlock: u64,
    /// Length of a day when the grant was created
    pub seconds_per_day: u64,
    pub start_time: Timestamp,
    /// Running total claimed, never above `vesting_amount`
    pub claimed_amount: u64,
}

/// Split a reward into (immediate, vesting) with the immediate share floored
pub fn split_reward(total_amount: u64, immediate_percent: u64) -> (u64, u64) {
    let immediate = (total_amount as u128 * immediate_percent.min(100) as u128 / 100) as u64;
    (immediate, total_amount - immediate)
}

impl VestingGrant {
    /// Create a grant; duration and day length are frozen from `config`
    pub fn new(
        id: GrantId,
        owner: Address,
        total_amount: u64,
        start_time: Timestamp,
        config: &LedgerConfig,
    ) -> Self {
        let (immediate_amount, vesting_amount) = split_reward(total_amount, config.immediate_percent);
        let duration_days = config.vesting_days.max(1);

        Self {
            id,
            owner,
            total_amount,
            immediate_amount,
            vesting_amount,
            duration_days,
            daily_unlock: vesting_amount / duration_days,
            seconds_per_day: config.seconds_per_day.max(1),
            start_time,
            claimed_amount: 0,
        }
    }

    /// Amount of the locked share unlocked as of `now`, claimed or not
    pub fn unlocked_amount(&self, now: Timestamp) -> u64 {
        let days = elapsed_days(self.start_time, now, self.seconds_per_day).min(self.duration_days);

        if days >= self.duration_days {
            return self.vesting_amount;
        }

        days.saturating_mul(self.daily_unlock).min(self.vesting_amount)
    }

    /// Unlocked minus already claimed
    pub fn claimable_amount(&self, now: Timestamp) -> u64 {
        self.unlocked_amount(now).saturating_sub(self.claimed_amount)
    }

    /// Vesting share not yet claimed (locked or unlocked)
    pub fn unclaimed_amount(&self) -> u64 {
        self.vesting_amount - self.claimed_amount
    }

    /// Time at which the whole vesting share is unlocked
    pub fn fully_vested_at(&self) -> Timestamp {
        self.start_time
            .saturating_add(self.duration_days.saturating_mul(self.seconds_per_day))
    }

    /// Fully claimed grants take no further part in claims
    pub fn is_inert(&self) -> bool {
        self.claimed_amount == self.vesting_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;

    const DAY: u64 = SECONDS_PER_DAY;

    fn grant(total: u64) -> VestingGrant {
        VestingGrant::new(0, Address::from("alice"), total, 0, &LedgerConfig::default())
    }

    #[test]
    fn test_reward_split() {
        let g = grant(1000);
        assert_eq!(g.immediate_amount, 400);
        assert_eq!(g.vesting_amount, 600);
        assert_eq!(g.daily_unlock, 30);
    }

    #[test]
    fn test_immediate_share_is_floored() {
        assert_eq!(split_reward(7, 40), (2, 5));
        assert_eq!(split_reward(1, 40), (0, 1));
    }

    #[test]
    fn test_nothing_unlocked_at_start() {
        let g = grant(1000);
        assert_eq!(g.unlocked_amount(0), 0);
        assert_eq!(g.unlocked_amount(DAY - 1), 0);
    }

    #[test]
    fn test_linear_unlock() {
        let g = grant(1000);
        assert_eq!(g.unlocked_amount(DAY), 30);
        assert_eq!(g.unlocked_amount(5 * DAY), 150);
        assert_eq!(g.unlocked_amount(19 * DAY + DAY / 2), 570);
    }

    #[test]
    fn test_last_day_absorbs_remainder() {
        // 62 vesting units / 20 days = 3 per day, 2 left over
        let g = grant(102);
        assert_eq!(g.vesting_amount, 62);
        assert_eq!(g.daily_unlock, 3);
        assert_eq!(g.unlocked_amount(19 * DAY), 57);
        assert_eq!(g.unlocked_amount(20 * DAY), 62);
        assert_eq!(g.unlocked_amount(400 * DAY), 62);
    }

    #[test]
    fn test_small_grant_unlocks_only_at_end() {
        let g = grant(10);
        assert_eq!(g.vesting_amount, 6);
        assert_eq!(g.daily_unlock, 0);
        assert_eq!(g.unlocked_amount(19 * DAY), 0);
        assert_eq!(g.unlocked_amount(20 * DAY), 6);
    }

    #[test]
    fn test_claimable_subtracts_claimed() {
        let mut g = grant(1000);
        g.claimed_amount = 100;
        assert_eq!(g.claimable_amount(5 * DAY), 50);
        assert_eq!(g.claimable_amount(DAY), 0);
        assert!(!g.is_inert());

        g.claimed_amount = 600;
        assert!(g.is_inert());
        assert_eq!(g.claimable_amount(30 * DAY), 0);
    }

    #[test]
    fn test_time_before_start_unlocks_nothing() {
        let g = VestingGrant::new(0, Address::from("a"), 1000, 10 * DAY, &LedgerConfig::default());
        assert_eq!(g.unlocked_amount(0), 0);
        assert_eq!(g.fully_vested_at(), 30 * DAY);
    }
}
