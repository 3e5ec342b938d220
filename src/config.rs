//! Ledger configuration
//!
//! Defaults come from `crate::constants`. A JSON file may override them for
//! test networks; mainnet runs on the defaults.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Policy numbers used by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Percent of a reward credited at issuance
    pub immediate_percent: u64,
    /// Unlock window for the locked share, in days
    pub vesting_days: u64,
    /// Unbonding period, in days
    pub unbonding_days: u64,
    pub validator_min_stake: u64,
    pub delegator_min_stake: u64,
    pub validator_apy_bps: u64,
    pub delegator_apy_bps: u64,
    /// Length of one accounting day in seconds
    pub seconds_per_day: u64,
    /// How often the node binary runs the accrual pass; at most one
    /// accounting day, since each pass books at most one period
    pub accrual_interval_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            immediate_percent: IMMEDIATE_PERCENT,
            vesting_days: VESTING_DAYS,
            unbonding_days: UNBONDING_DAYS,
            validator_min_stake: VALIDATOR_MIN_STAKE,
            delegator_min_stake: DELEGATOR_MIN_STAKE,
            validator_apy_bps: VALIDATOR_APY_BPS,
            delegator_apy_bps: DELEGATOR_APY_BPS,
            seconds_per_day: SECONDS_PER_DAY,
            accrual_interval_secs: SECONDS_PER_DAY,
        }
    }
}

impl LedgerConfig {
    /// Load and validate a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.immediate_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "immediate_percent {} exceeds 100",
                self.immediate_percent
            )));
        }
        if self.vesting_days == 0 {
            return Err(ConfigError::Invalid("vesting_days must be positive".into()));
        }
        if self.seconds_per_day == 0 {
            return Err(ConfigError::Invalid("seconds_per_day must be positive".into()));
        }
        if self.accrual_interval_secs == 0 {
            return Err(ConfigError::Invalid("accrual_interval_secs must be positive".into()));
        }
        if self.accrual_interval_secs > self.seconds_per_day {
            return Err(ConfigError::Invalid(format!(
                "accrual_interval_secs {} exceeds seconds_per_day {}",
                self.accrual_interval_secs, self.seconds_per_day
            )));
        }
        if self.validator_min_stake == 0 || self.delegator_min_stake == 0 {
            return Err(ConfigError::Invalid("minimum stakes must be positive".into()));
        }
        Ok(())
    }

    /// Unbonding period in seconds
    pub fn unbonding_secs(&self) -> u64 {
        self.unbonding_days.saturating_mul(self.seconds_per_day)
    }
}
