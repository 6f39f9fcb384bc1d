//! Wait-Die discipline: priority-arbitrated leases from the external
//! authority.
//!
//! Per attempt: lease the source resource, then the destination resource,
//! each with a finite TTL. A WAIT verdict means the conflicting holder is
//! senior: back off for the suggested interval and start over. A DIE
//! verdict means the holder is junior: abort the attempt on the spot,
//! because a senior waiting on a junior is exactly the edge that would let
//! a wait cycle close. Either way, anything already held is released before
//! backing off, and the critical section runs only with both leases in hand.

use crate::authority::{AcquireOutcome, HeldLeases, LeaseRequest};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::store::AccountStore;
use crate::strategy::Coordination;
use crate::types::{AgentProfile, AttemptOutcome, TransferPair};

pub async fn run_transfer(
    agent: &AgentProfile,
    pair: TransferPair,
    store: &AccountStore,
    coordination: &Coordination,
    metrics: &MetricsCollector,
    config: &BenchConfig,
) -> Result<AttemptOutcome> {
    let authority = coordination.authority.as_ref();

    // Registration is idempotent; doing it here keeps an agent usable even
    // if the authority restarted since the run began.
    authority.register(&agent.id, agent.priority).await?;

    let session_id = format!("sess_{}", agent.id);

    for _ in 0..config.max_retries {
        let mut held = HeldLeases::new();

        let source_request =
            LeaseRequest::mutates(&agent.id, &session_id, pair.source, config.lease_ttl_ms);
        match authority.acquire(&source_request).await? {
            AcquireOutcome::Granted { lease_id } => held.push(lease_id),
            AcquireOutcome::Wait { wait_ms } => {
                metrics.record_wait();
                backoff(wait_ms, config).await;
                continue;
            }
            AcquireOutcome::Die { wait_ms } => {
                metrics.record_die();
                backoff(wait_ms, config).await;
                continue;
            }
        }

        tokio::time::sleep(config.interleave_delay()).await;

        let destination_request =
            LeaseRequest::mutates(&agent.id, &session_id, pair.destination, config.lease_ttl_ms);
        match authority.acquire(&destination_request).await {
            Ok(AcquireOutcome::Granted { lease_id }) => held.push(lease_id),
            Ok(AcquireOutcome::Wait { wait_ms }) => {
                metrics.record_wait();
                held.release_all(authority).await;
                backoff(wait_ms, config).await;
                continue;
            }
            Ok(AcquireOutcome::Die { wait_ms }) => {
                metrics.record_die();
                tracing::debug!(
                    agent = %agent.id,
                    resource = pair.destination,
                    "died holding the source lease, attempt aborted"
                );
                held.release_all(authority).await;
                backoff(wait_ms, config).await;
                continue;
            }
            Err(error) => {
                held.release_all(authority).await;
                return Err(error);
            }
        }

        // Critical section under both leases. Release runs before the error
        // check so every exit path gives the leases back.
        let section = transfer_under_leases(pair, store, config).await;
        held.release_all(authority).await;
        section?;

        return Ok(AttemptOutcome::Committed);
    }

    metrics.record_failed_retry();
    Ok(AttemptOutcome::RetriesExhausted)
}

async fn transfer_under_leases(
    pair: TransferPair,
    store: &AccountStore,
    config: &BenchConfig,
) -> Result<()> {
    let mut source = store.read(pair.source)?;
    let mut destination = store.read(pair.destination)?;

    tokio::time::sleep(config.think_time()).await;

    source.balance -= config.transfer_amount;
    source.version += 1;
    store.write(source);

    destination.balance += config.transfer_amount;
    destination.version += 1;
    store.write(destination);

    Ok(())
}

async fn backoff(suggested_ms: u64, config: &BenchConfig) {
    let wait_ms = if suggested_ms == 0 {
        config.fallback_backoff_ms
    } else {
        suggested_ms
    };
    tokio::time::sleep(std::time::Duration::from_millis(wait_ms)).await;
}
