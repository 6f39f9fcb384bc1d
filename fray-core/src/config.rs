use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BenchError, Result};

/// Tunable parameters for a benchmark run. All durations are milliseconds.
///
/// The defaults are the canonical adversarial scenario: 5 agents making
/// circular transfers across 5 accounts, with latencies long enough to force
/// interleaving on any scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of accounts in the store.
    pub accounts: u32,
    /// Number of concurrent agents. One task is spawned per agent.
    pub agents: u32,
    /// Balance every account starts each run with.
    pub initial_balance: i64,
    /// Amount moved per committed transfer.
    pub transfer_amount: i64,
    /// Protected-transfer attempts each agent performs per run.
    pub attempts_per_agent: u32,
    /// Simulated think/network latency inside each attempt.
    pub think_time_ms: u64,
    /// Yield between the first and second acquisition, to encourage
    /// interleaving and genuine cyclic waits.
    pub interleave_delay_ms: u64,
    /// Bounded wait for each pessimistic lock acquisition.
    pub lock_timeout_ms: u64,
    /// Retry budget for the optimistic and wait-die disciplines.
    pub max_retries: u32,
    /// TTL requested on every lease acquisition.
    pub lease_ttl_ms: u64,
    /// Backoff used when the authority suggests no wait interval.
    pub fallback_backoff_ms: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            accounts: 5,
            agents: 5,
            initial_balance: 100,
            transfer_amount: 10,
            attempts_per_agent: 1,
            think_time_ms: 100,
            interleave_delay_ms: 50,
            lock_timeout_ms: 2000,
            max_retries: 10,
            lease_ttl_ms: 10_000,
            fallback_backoff_ms: 100,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.accounts < 2 {
            return Err(BenchError::Config(
                "accounts must be at least 2".to_string(),
            ));
        }
        if self.agents == 0 {
            return Err(BenchError::Config("agents must be at least 1".to_string()));
        }
        if self.transfer_amount <= 0 {
            return Err(BenchError::Config(
                "transfer_amount must be positive".to_string(),
            ));
        }
        if self.attempts_per_agent == 0 {
            return Err(BenchError::Config(
                "attempts_per_agent must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(BenchError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(BenchError::Config(
                "lock_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.lease_ttl_ms == 0 {
            return Err(BenchError::Config(
                "lease_ttl_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Expected total balance when no updates have been lost.
    pub fn expected_total(&self) -> i64 {
        self.accounts as i64 * self.initial_balance
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    pub fn interleave_delay(&self) -> Duration {
        Duration::from_millis(self.interleave_delay_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
