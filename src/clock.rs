//! Chain time source
//!
//! All unlock and unbonding math runs on whole seconds since the Unix epoch.
//! The ledger never reads the clock itself; callers pass `now` explicitly and
//! a `Clock` is only needed by whatever drives the ledger.

use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// A source of monotonically non-decreasing chain time
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch system time is a misconfigured host; treat it as genesis.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Whole days elapsed from `start` to `now`, zero if `now` precedes `start`
pub fn elapsed_days(start: Timestamp, now: Timestamp, seconds_per_day: u64) -> u64 {
    now.saturating_sub(start) / seconds_per_day
}
