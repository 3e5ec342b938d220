//! Accounts and addresses
//!
//! Addresses are opaque to the ledger; derivation and signature checks happen
//! before a request reaches it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Spendable balance of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Owner address
    pub address: Address,
    /// Spendable balance in base units
    pub balance: u64,
    /// Count of committed mutations touching this account
    pub nonce: u64,
}

impl Account {
    /// Fresh zero-balance account
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            nonce: 0,
        }
    }

    /// Add to the balance, `None` on overflow
    pub fn credit(&mut self, amount: u64) -> Option<u64> {
        self.balance = self.balance.checked_add(amount)?;
        Some(self.balance)
    }

    /// Remove from the balance, `None` if it would go negative
    pub fn debit(&mut self, amount: u64) -> Option<u64> {
        self.balance = self.balance.checked_sub(amount)?;
        Some(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_empty() {
        let account = Account::new(Address::from("alice"));
        assert_eq!(account.balance, 0);
        assert_eq!(account.nonce, 0);
        assert_eq!(account.address.to_string(), "alice");
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let mut account = Account::new(Address::from("alice"));
        account.credit(10).unwrap();
        assert_eq!(account.debit(11), None);
        assert_eq!(account.balance, 10);
        assert_eq!(account.debit(10), Some(0));
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut account = Account::new(Address::from("alice"));
        account.credit(u64::MAX).unwrap();
        assert_eq!(account.credit(1), None);
        assert_eq!(account.balance, u64::MAX);
    }
}
