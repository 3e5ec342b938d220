//! In-memory store for tests and embedding

use super::{LedgerStore, StorageError};
use crate::account::Address;
use crate::ledger::AccountState;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Non-durable `LedgerStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<BTreeMap<Address, AccountState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, address: &Address) -> Result<Option<AccountState>, StorageError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(accounts.get(address).cloned())
    }

    fn commit(&self, states: &[&AccountState]) -> Result<(), StorageError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        for state in states {
            accounts.insert(state.address().clone(), (*state).clone());
        }
        Ok(())
    }

    fn addresses(&self) -> Result<Vec<Address>, StorageError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(accounts.keys().cloned().collect())
    }
}
