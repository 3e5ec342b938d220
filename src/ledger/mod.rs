//! Ledger module - the coordinator that applies every balance-affecting
//! operation atomically, one at a time per account

mod coordinator;
mod error;
mod receipts;
mod state;

pub use coordinator::*;
pub use error::*;
pub use receipts::*;
pub use state::*;

pub use crate::vesting::ClaimRequest;
