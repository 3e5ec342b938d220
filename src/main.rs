//! ROHO (RH) Reward Ledger Node
//!
//! Opens the ledger database and drives the periodic staking reward accrual.
//! Wallet commands and the RPC layer talk to the same `Ledger` API.

use rh_ledger::{Clock, Ledger, LedgerConfig, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DATA_DIR_VAR: &str = "RH_LEDGER_DATA";
const CONFIG_VAR: &str = "RH_LEDGER_CONFIG";
const DEFAULT_DATA_DIR: &str = "rh-ledger-data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::var(CONFIG_VAR) {
        Ok(path) => LedgerConfig::load(&path)?,
        Err(_) => LedgerConfig::default(),
    };
    let data_dir = std::env::var(DATA_DIR_VAR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

    let ledger = Arc::new(Ledger::open(&data_dir, config.clone())?);
    let stats = ledger.stats()?;
    info!(
        data_dir = %data_dir,
        accounts = stats.accounts,
        total_balance = stats.total_balance,
        unclaimed_vesting = stats.total_unclaimed_vesting,
        total_staked = stats.total_staked,
        "ledger opened"
    );

    let accrual_ledger = ledger.clone();
    let interval_secs = config.accrual_interval_secs;
    let accrual_task = tokio::spawn(async move {
        let clock = SystemClock;
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; accrual starts one period after boot
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let ledger = accrual_ledger.clone();
            let now = clock.now();
            match tokio::task::spawn_blocking(move || ledger.accrue_all(now)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!(error = %e, "accrual pass failed"),
                Err(e) => error!(error = %e, "accrual task panicked"),
            }
        }
    });

    info!(interval_secs, "reward accrual scheduled; press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping ledger node");
    accrual_task.abort();

    let stats = ledger.stats()?;
    info!(accounts = stats.accounts, total_balance = stats.total_balance, "ledger closed");
    Ok(())
}
