use serde::{Deserialize, Serialize};

use super::AccountId;

/// The four coordination disciplines under comparison.
///
/// A closed set: every discipline is a variant of the same capability
/// ("attempt one protected transfer") and is selected at orchestration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// No coordination. Lost updates are the expected outcome.
    Chaos,
    /// Per-account exclusive locks with bounded-wait acquisition.
    Pessimistic,
    /// Optimistic concurrency control with commit-time version validation.
    Optimistic,
    /// Priority-based Wait-Die leases issued by the external authority.
    WaitDie,
}

impl StrategyKind {
    /// All disciplines, in benchmark order.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Chaos,
        StrategyKind::Pessimistic,
        StrategyKind::Optimistic,
        StrategyKind::WaitDie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Chaos => "chaos",
            StrategyKind::Pessimistic => "pessimistic",
            StrategyKind::Optimistic => "optimistic",
            StrategyKind::WaitDie => "wait-die",
        }
    }
}

/// An agent participating in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    /// Lower value = senior. Fixed for the duration of the run.
    pub priority: u64,
}

impl AgentProfile {
    pub fn new(id: impl Into<String>, priority: u64) -> Self {
        Self {
            id: id.into(),
            priority,
        }
    }
}

/// One agent's transfer assignment: debit `source`, credit `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPair {
    pub source: AccountId,
    pub destination: AccountId,
}

impl TransferPair {
    pub fn new(source: AccountId, destination: AccountId) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Terminal result of one agent's protected-transfer loop.
///
/// Everything except `Committed` guarantees zero net effect on the store
/// (both legs commit, or neither does). Chaos only ever reports `Committed`;
/// its partial effects are the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Both legs of the transfer were written.
    Committed,
    /// Pessimistic lock acquisition hit its timeout.
    TimedOut,
    /// The retry budget ran out without a commit.
    RetriesExhausted,
}
