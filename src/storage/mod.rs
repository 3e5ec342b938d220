//! Storage module - durable account state
//!
//! The ledger commits whole `AccountState` records. A commit covering several
//! accounts must land atomically and be durable before it returns.

mod memory;
pub mod db;

pub use db::LedgerDB;
pub use memory::*;

use crate::account::Address;
use crate::ledger::AccountState;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Encoding error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported schema version {0}")]
    SchemaVersion(u32),
}

/// Persistence backend used by the ledger
pub trait LedgerStore: Send + Sync {
    /// Load an account's state, `None` if it was never committed
    fn load(&self, address: &Address) -> Result<Option<AccountState>, StorageError>;

    /// Atomically and durably write every given state
    fn commit(&self, states: &[&AccountState]) -> Result<(), StorageError>;

    /// Every address with committed state
    fn addresses(&self) -> Result<Vec<Address>, StorageError>;
}
