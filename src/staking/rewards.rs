//! Staking reward accrual
//!
//! Deterministic integer accrual. The exact daily reward is
//! `amount * apy_bps / (10_000 * 365)`; the integer part is paid into the
//! position and the fractional numerator is carried forward as dust, so the
//! cumulative reward is always `floor(sum of exact daily rewards)`.

use crate::constants::{BPS_DENOMINATOR, DAYS_PER_YEAR};

/// Denominator of one day's reward: bps scale times days per year
pub const DAILY_REWARD_DENOMINATOR: u128 = (BPS_DENOMINATOR * DAYS_PER_YEAR) as u128;

/// Result of one accrual step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualStep {
    /// Whole base units earned this period
    pub reward: u64,
    /// Fractional remainder to carry into the next period
    pub dust: u64,
}

/// Compute one period's reward for `amount` at `apy_bps`
///
/// `dust` is the remainder carried from the previous period and is always
/// below `DAILY_REWARD_DENOMINATOR`.
pub fn accrue_daily(amount: u64, apy_bps: u64, dust: u64) -> AccrualStep {
    let numerator = amount as u128 * apy_bps as u128 + dust as u128;
    let reward = numerator / DAILY_REWARD_DENOMINATOR;

    AccrualStep {
        // amount * apy_bps / 3_650_000 fits in u64 for any apy below 365_000%
        reward: reward.min(u64::MAX as u128) as u64,
        dust: (numerator % DAILY_REWARD_DENOMINATOR) as u64,
    }
}

/// Reward for `days` consecutive periods starting from zero dust
///
/// Used for projections and verification only.
pub fn projected_reward(amount: u64, apy_bps: u64, days: u64) -> u64 {
    let total = amount as u128 * apy_bps as u128 * days as u128 / DAILY_REWARD_DENOMINATOR;
    total.min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DELEGATOR_APY_BPS, VALIDATOR_APY_BPS};

    #[test]
    fn test_small_stake_carries_dust() {
        // 1000 * 10% / 365 = 0.27 per day
        let step = accrue_daily(1000, VALIDATOR_APY_BPS, 0);
        assert_eq!(step.reward, 0);
        assert_eq!(step.dust, 1_000_000);

        let mut dust = 0;
        let mut total = 0;
        for _ in 0..4 {
            let step = accrue_daily(1000, VALIDATOR_APY_BPS, dust);
            total += step.reward;
            dust = step.dust;
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn test_full_year_matches_apy() {
        let mut dust = 0;
        let mut total = 0;
        for _ in 0..365 {
            let step = accrue_daily(36_500, DELEGATOR_APY_BPS, dust);
            total += step.reward;
            dust = step.dust;
        }
        assert_eq!(total, 2_920); // 8% of 36_500
        assert_eq!(dust, 0);
    }

    #[test]
    fn test_stepwise_equals_projection() {
        let mut dust = 0;
        let mut total = 0;
        for _ in 0..100 {
            let step = accrue_daily(12_345, VALIDATOR_APY_BPS, dust);
            total += step.reward;
            dust = step.dust;
        }
        assert_eq!(total, projected_reward(12_345, VALIDATOR_APY_BPS, 100));
    }

    #[test]
    fn test_zero_stake_earns_nothing() {
        assert_eq!(accrue_daily(0, VALIDATOR_APY_BPS, 0), AccrualStep { reward: 0, dust: 0 });
    }
}
