use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{BenchError, Result};
use crate::types::{Account, AccountId};

/// Shared keyed records with no native concurrency guarantees.
///
/// Individual reads and writes are internally consistent, but nothing ties a
/// multi-record sequence together: there is no compare-and-swap, no
/// transaction, no version check. Each coordination discipline supplies its
/// own correctness layer on top, or in the baseline case, doesn't.
pub struct AccountStore {
    records: RwLock<HashMap<AccountId, Account>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Recreate all records with a fresh balance and version 0.
    pub fn reset(&self, count: u32, initial_balance: i64) {
        let mut records = self.records.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        records.clear();
        for id in 0..count {
            records.insert(id, Account::new(id, initial_balance));
        }
    }

    /// Read a record. Returns an independent copy: mutating it does not
    /// touch the store until it is written back.
    pub fn read(&self, id: AccountId) -> Result<Account> {
        let records = self.records.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        records
            .get(&id)
            .cloned()
            .ok_or(BenchError::AccountMissing(id))
    }

    /// Unconditional overwrite. Stale copies clobber newer ones silently;
    /// detecting that is the caller's problem.
    pub fn write(&self, account: Account) {
        let mut records = self.records.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        records.insert(account.id, account);
    }

    /// Sum of all balances, for invariant validation after a run.
    pub fn total_balance(&self) -> i64 {
        let records = self.records.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        records.values().map(|a| a.balance).sum()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
