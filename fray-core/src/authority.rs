//! Client-side contract for the external lease authority.
//!
//! The authority itself runs elsewhere; this module owns only the wire
//! vocabulary and the trait the wait-die discipline drives. Lease state is
//! visible to the core exclusively through acquisition responses.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::types::AccountId;

/// Predicate string sent on every acquisition. Transfers mutate both
/// records, so nothing weaker is ever requested.
pub const PREDICATE_MUTATES: &str = "MUTATES";

/// Account records are file-backed resources on the authority's side.
pub const RESOURCE_TYPE_FILE: &str = "FILE";

/// Wait hint applied when the authority suggests no interval of its own.
pub const DEFAULT_WAIT_HINT_MS: u64 = 100;

/// Canonical resource path for an account record.
pub fn account_resource_path(id: AccountId) -> String {
    format!("account_{}", id)
}

/// Parameters for a single lease acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct LeaseRequest {
    pub agent_id: String,
    pub session_id: String,
    pub resource_type: String,
    pub resource_path: String,
    pub predicate: String,
    /// Time-to-live in milliseconds.
    pub ttl: u64,
}

impl LeaseRequest {
    /// An exclusive MUTATES lease on one account record.
    pub fn mutates(agent_id: &str, session_id: &str, account: AccountId, ttl: u64) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            session_id: session_id.to_string(),
            resource_type: RESOURCE_TYPE_FILE.to_string(),
            resource_path: account_resource_path(account),
            predicate: PREDICATE_MUTATES.to_string(),
            ttl,
        }
    }
}

/// The authority's answer to an acquisition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Exclusive lease granted; hold the id for release.
    Granted { lease_id: String },
    /// The conflicting holder is senior. Back off cooperatively for the
    /// suggested interval and try again.
    Wait { wait_ms: u64 },
    /// The conflicting holder is junior. Abort this attempt immediately;
    /// waiting here is what would let a cycle form.
    Die { wait_ms: u64 },
}

/// What the wait-die discipline needs from a lease authority.
///
/// Implementations: [`HttpLeaseClient`](crate::authority_http::HttpLeaseClient)
/// for a deployed coordination server, and
/// [`InMemoryLeaseAuthority`](crate::authority_in_memory::InMemoryLeaseAuthority)
/// for tests and offline runs.
#[async_trait]
pub trait LeaseAuthority: Send + Sync {
    /// Register an agent with a fixed priority (lower = senior). Idempotent.
    async fn register(&self, agent_id: &str, priority: u64) -> Result<()>;

    /// Request an exclusive lease on a resource.
    async fn acquire(&self, request: &LeaseRequest) -> Result<AcquireOutcome>;

    /// Release a held lease. Idempotent; unknown or expired ids are a no-op.
    async fn release(&self, lease_id: &str) -> Result<()>;
}

/// Scoped acquisition tracker: collects granted lease ids so that every exit
/// path (commit, verdict-driven abort, or error) releases them all, newest
/// first.
#[derive(Debug, Default)]
pub struct HeldLeases {
    ids: Vec<String>,
}

impl HeldLeases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, lease_id: String) {
        self.ids.push(lease_id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Release everything in reverse acquisition order. Release failures are
    /// logged and swallowed: release is idempotent on the authority side and
    /// the TTL reclaims anything a lost response leaves behind.
    pub async fn release_all(&mut self, authority: &dyn LeaseAuthority) {
        while let Some(lease_id) = self.ids.pop() {
            if let Err(error) = authority.release(&lease_id).await {
                tracing::warn!(lease_id = %lease_id, error = %error, "lease release failed");
            }
        }
    }
}
