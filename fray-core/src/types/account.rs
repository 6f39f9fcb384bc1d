use serde::{Deserialize, Serialize};

/// Accounts are addressed by dense indices starting at 0.
pub type AccountId = u32;

/// A keyed balance record as the persistence layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Current balance in whole units. May go negative; overdraft rules are
    /// not part of the workload.
    pub balance: i64,
    /// Incremented on every successful committed mutation. Only the
    /// optimistic discipline reads it.
    pub version: u64,
}

impl Account {
    pub fn new(id: AccountId, balance: i64) -> Self {
        Self {
            id,
            balance,
            version: 0,
        }
    }
}
