//! Strategy selection and the coordination state shared by a run's tasks.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::authority::LeaseAuthority;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::store::AccountStore;
use crate::types::{AccountId, AgentProfile, AttemptOutcome, StrategyKind, TransferPair};
use crate::{chaos, optimistic, pessimistic, wait_die};

/// One exclusive lock per account, used by the pessimistic discipline.
pub struct LockTable {
    locks: Vec<Mutex<()>>,
}

impl LockTable {
    fn new(accounts: u32) -> Self {
        Self {
            locks: (0..accounts).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn lock_for(&self, id: AccountId) -> &Mutex<()> {
        &self.locks[id as usize]
    }
}

/// Coordination state injected into every agent task.
///
/// Constructed fresh per run and owned explicitly, so independent runs and
/// tests never share lock or gate state through ambient globals.
pub struct Coordination {
    /// Lock table for the pessimistic discipline.
    pub locks: LockTable,
    /// The single global serializing section for OCC commit validation.
    pub occ_gate: Mutex<()>,
    /// Adapter to the external lease authority, used by wait-die.
    pub authority: Arc<dyn LeaseAuthority>,
}

impl Coordination {
    pub fn new(accounts: u32, authority: Arc<dyn LeaseAuthority>) -> Self {
        Self {
            locks: LockTable::new(accounts),
            occ_gate: Mutex::new(()),
            authority,
        }
    }
}

/// Run one protected-transfer attempt under the selected discipline.
pub async fn run_attempt(
    kind: StrategyKind,
    agent: &AgentProfile,
    pair: TransferPair,
    store: &AccountStore,
    coordination: &Coordination,
    metrics: &MetricsCollector,
    config: &BenchConfig,
) -> Result<AttemptOutcome> {
    match kind {
        StrategyKind::Chaos => chaos::run_transfer(pair, store, config).await,
        StrategyKind::Pessimistic => {
            pessimistic::run_transfer(pair, store, coordination, metrics, config).await
        }
        StrategyKind::Optimistic => {
            optimistic::run_transfer(pair, store, coordination, metrics, config).await
        }
        StrategyKind::WaitDie => {
            wait_die::run_transfer(agent, pair, store, coordination, metrics, config).await
        }
    }
}
