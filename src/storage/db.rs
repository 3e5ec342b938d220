//! Database persistence layer using Sled
//!
//! One `accounts` tree holds a bincode-encoded `AccountState` per address.
//! Each commit is a single batch followed by a flush.

use super::{LedgerStore, StorageError};
use crate::account::Address;
use crate::ledger::AccountState;
use sled::{Batch, Db, Tree};
use std::path::Path;

/// Database wrapper
#[derive(Debug, Clone)]
pub struct LedgerDB {
    db: Db,
    accounts_tree: Tree,
    metadata_tree: Tree,
}

const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u32 = 1;

impl LedgerDB {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::from_db(sled::open(path)?)
    }

    /// Throwaway database that is deleted on drop
    pub fn temporary() -> Result<Self, StorageError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StorageError> {
        let accounts_tree = db.open_tree("accounts")?;
        let metadata_tree = db.open_tree("metadata")?;

        match metadata_tree.get(SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let mut v_bytes = [0u8; 4];
                if bytes.len() == 4 {
                    v_bytes.copy_from_slice(&bytes);
                }
                let version = u32::from_le_bytes(v_bytes);
                if version != SCHEMA_VERSION {
                    return Err(StorageError::SchemaVersion(version));
                }
            }
            None => {
                metadata_tree.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_le_bytes().as_ref())?;
                db.flush()?;
            }
        }

        Ok(Self {
            db,
            accounts_tree,
            metadata_tree,
        })
    }

    /// Stored schema version
    pub fn schema_version(&self) -> Result<Option<u32>, StorageError> {
        Ok(self.metadata_tree.get(SCHEMA_VERSION_KEY)?.and_then(|bytes| {
            let arr: [u8; 4] = bytes.as_ref().try_into().ok()?;
            Some(u32::from_le_bytes(arr))
        }))
    }
}

impl LedgerStore for LedgerDB {
    fn load(&self, address: &Address) -> Result<Option<AccountState>, StorageError> {
        match self.accounts_tree.get(address.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn commit(&self, states: &[&AccountState]) -> Result<(), StorageError> {
        let mut batch = Batch::default();
        for state in states {
            let value = bincode::serialize(*state)?;
            batch.insert(state.address().as_bytes(), value);
        }

        self.accounts_tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }

    fn addresses(&self) -> Result<Vec<Address>, StorageError> {
        let mut addresses = Vec::new();
        for key in self.accounts_tree.iter().keys() {
            let key = key?;
            addresses.push(Address::new(String::from_utf8_lossy(&key).into_owned()));
        }
        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    #[test]
    fn test_round_trip_account_state() {
        let db = LedgerDB::temporary().unwrap();
        let alice = Address::from("alice");

        let mut state = AccountState::new(alice.clone());
        state.account.balance = 400;
        state.vesting.issue(alice.clone(), 1000, 0, &LedgerConfig::default());
        db.commit(&[&state]).unwrap();

        assert_eq!(db.load(&alice).unwrap(), Some(state));
        assert!(db.load(&Address::from("bob")).unwrap().is_none());
    }

    #[test]
    fn test_batch_commit_writes_all() {
        let db = LedgerDB::temporary().unwrap();
        let a = AccountState::new(Address::from("a"));
        let b = AccountState::new(Address::from("b"));
        db.commit(&[&a, &b]).unwrap();

        let mut addresses = db.addresses().unwrap();
        addresses.sort();
        assert_eq!(addresses, vec![Address::from("a"), Address::from("b")]);
    }

    #[test]
    fn test_schema_version_recorded() {
        let db = LedgerDB::temporary().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }
}
