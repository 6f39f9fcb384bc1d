//! Runs each discipline against a fresh store and validates the outcome.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::authority::LeaseAuthority;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::store::AccountStore;
use crate::strategy::{self, Coordination};
use crate::topology::WorkloadTopology;
use crate::types::{AttemptOutcome, StrategyKind};

/// Summary emitted after one strategy run.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub name: String,
    pub elapsed_ms: u64,
    /// Committed transfers across all agents.
    pub success: u64,
    /// True when the recomputed total diverged from the expected total,
    /// i.e. at least one update was lost.
    pub data_loss: bool,
    pub total_balance: i64,
    pub metrics: MetricsSnapshot,
}

pub struct BenchmarkOrchestrator {
    config: BenchConfig,
    store: Arc<AccountStore>,
    authority: Arc<dyn LeaseAuthority>,
}

impl BenchmarkOrchestrator {
    pub fn new(config: BenchConfig, authority: Arc<dyn LeaseAuthority>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: Arc::new(AccountStore::new()),
            authority,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Run one discipline: reset the store, spawn one task per agent, await
    /// them all, then recompute the balance invariant.
    pub async fn run(&self, kind: StrategyKind) -> Result<StrategySummary> {
        self.store
            .reset(self.config.accounts, self.config.initial_balance);

        let topology = WorkloadTopology::circular(self.config.agents, self.config.accounts);
        let coordination = Arc::new(Coordination::new(
            self.config.accounts,
            Arc::clone(&self.authority),
        ));
        let metrics = Arc::new(MetricsCollector::new());

        tracing::info!(
            strategy = kind.label(),
            agents = self.config.agents,
            accounts = self.config.accounts,
            "benchmark run starting"
        );

        let started = Instant::now();

        let mut handles = Vec::with_capacity(topology.agent_count() as usize);
        for assignment in topology.assignments() {
            let store = Arc::clone(&self.store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                for _ in 0..config.attempts_per_agent {
                    let attempt = strategy::run_attempt(
                        kind,
                        &assignment.agent,
                        assignment.pair,
                        &store,
                        &coordination,
                        &metrics,
                        &config,
                    )
                    .await;

                    match attempt {
                        Ok(AttemptOutcome::Committed) => metrics.record_success(),
                        // Terminal aborts were already counted where they
                        // were decided.
                        Ok(_) => {}
                        Err(error) => {
                            metrics.record_error();
                            tracing::warn!(
                                agent = %assignment.agent.id,
                                error = %error,
                                "agent attempt failed"
                            );
                        }
                    }
                }
            }));
        }

        // Every task is awaited before the invariant is checked, whatever
        // happened inside it.
        for handle in handles {
            if handle.await.is_err() {
                metrics.record_error();
            }
        }

        let elapsed = started.elapsed();
        let total_balance = self.store.total_balance();
        let data_loss = total_balance != self.config.expected_total();
        let snapshot = metrics.snapshot();

        tracing::info!(
            strategy = kind.label(),
            elapsed_ms = elapsed.as_millis() as u64,
            success = snapshot.success,
            total_balance,
            data_loss,
            "benchmark run finished"
        );

        Ok(StrategySummary {
            name: kind.label().to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
            success: snapshot.success,
            data_loss,
            total_balance,
            metrics: snapshot,
        })
    }

    /// Run all four disciplines in benchmark order.
    pub async fn run_all(&self) -> Result<Vec<StrategySummary>> {
        let mut summaries = Vec::with_capacity(StrategyKind::ALL.len());
        for kind in StrategyKind::ALL {
            summaries.push(self.run(kind).await?);
        }
        Ok(summaries)
    }
}
