//! In-process reference authority for tests and offline runs.
//!
//! Implements the same wire semantics the coordination server publishes:
//! exclusive, non-reentrant, TTL-bounded leases with Wait-Die arbitration.
//! The real server stays external; this double exists so the benchmark and
//! its property tests do not need a deployed instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use nanoid::nanoid;

use crate::authority::{AcquireOutcome, LeaseAuthority, LeaseRequest};
use crate::error::Result;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// An active exclusive claim on one resource path.
#[derive(Debug, Clone)]
struct LocalLease {
    agent_id: String,
    resource_path: String,
    expires_at: u64,
}

#[derive(Debug, Default)]
struct AuthorityState {
    /// Lease id -> active lease. Expired entries are evicted on acquire.
    leases: HashMap<String, LocalLease>,
    /// Agent id -> priority. Lower value = senior.
    priorities: HashMap<String, u64>,
    grants: u64,
    releases: u64,
}

pub struct InMemoryLeaseAuthority {
    state: Mutex<AuthorityState>,
    wait_hint_ms: u64,
    die_hint_ms: u64,
}

impl InMemoryLeaseAuthority {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AuthorityState::default()),
            // A died requester backs off much longer than a waiting one, so
            // the senior it lost to can finish instead of colliding again.
            wait_hint_ms: 50,
            die_hint_ms: 200,
        }
    }

    /// Override the backoff intervals suggested with WAIT and DIE verdicts.
    pub fn with_backoff_hints(mut self, wait_hint_ms: u64, die_hint_ms: u64) -> Self {
        self.wait_hint_ms = wait_hint_ms;
        self.die_hint_ms = die_hint_ms;
        self
    }

    pub fn register_priority(&self, agent_id: &str, priority: u64) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.priorities.insert(agent_id.to_string(), priority);
    }

    /// Acquisition against an explicit clock. The trait impl feeds in wall
    /// time; tests feed in whatever makes TTLs interesting.
    pub fn acquire_at(&self, request: &LeaseRequest, now: u64) -> AcquireOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        state.leases.retain(|_, lease| lease.expires_at > now);

        // Exclusive and non-reentrant: any live lease on the path conflicts,
        // including the requester's own.
        let holder = state
            .leases
            .values()
            .find(|lease| lease.resource_path == request.resource_path)
            .map(|lease| lease.agent_id.clone());

        if let Some(holder_id) = holder {
            let requester_priority = match state.priorities.get(&request.agent_id) {
                Some(priority) => *priority,
                // Unregistered requester: no deadlock-safety guarantee, so
                // never let it wait.
                None => return AcquireOutcome::Die { wait_ms: self.die_hint_ms },
            };
            let holder_priority = state
                .priorities
                .get(&holder_id)
                .copied()
                .unwrap_or(u64::MAX);

            // Wait-Die: only a strictly senior requester may wait. Juniors
            // and ties die, so no wait cycle can close.
            return if requester_priority < holder_priority {
                AcquireOutcome::Wait { wait_ms: self.wait_hint_ms }
            } else {
                AcquireOutcome::Die { wait_ms: self.die_hint_ms }
            };
        }

        let lease_id = format!("lease_{}", nanoid!(10));
        state.leases.insert(
            lease_id.clone(),
            LocalLease {
                agent_id: request.agent_id.clone(),
                resource_path: request.resource_path.clone(),
                expires_at: now + request.ttl,
            },
        );
        state.grants += 1;

        AcquireOutcome::Granted { lease_id }
    }

    pub fn release_lease(&self, lease_id: &str) -> bool {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.leases.remove(lease_id).is_some() {
            state.releases += 1;
            true
        } else {
            false
        }
    }

    pub fn active_lease_count(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.leases.len()
    }

    pub fn granted_total(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.grants
    }

    pub fn released_total(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.releases
    }
}

impl Default for InMemoryLeaseAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaseAuthority for InMemoryLeaseAuthority {
    async fn register(&self, agent_id: &str, priority: u64) -> Result<()> {
        self.register_priority(agent_id, priority);
        Ok(())
    }

    async fn acquire(&self, request: &LeaseRequest) -> Result<AcquireOutcome> {
        Ok(self.acquire_at(request, now_ms()))
    }

    async fn release(&self, lease_id: &str) -> Result<()> {
        self.release_lease(lease_id);
        Ok(())
    }
}
