//! Optimistic discipline: snapshot, think, validate at commit time.
//!
//! The think-time suspension happens entirely outside the critical section,
//! which maximizes the window in which a concurrent commit can invalidate
//! the snapshot; high abort rates under contention are the expected
//! measurement. Every retry re-reads and re-sleeps the full latency, so the
//! cost of aborting shows up in elapsed time rather than being hidden.

use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::store::AccountStore;
use crate::strategy::Coordination;
use crate::types::{Account, AttemptOutcome, TransferPair};

pub async fn run_transfer(
    pair: TransferPair,
    store: &AccountStore,
    coordination: &Coordination,
    metrics: &MetricsCollector,
    config: &BenchConfig,
) -> Result<AttemptOutcome> {
    for _ in 0..config.max_retries {
        let source_snapshot = store.read(pair.source)?;
        let destination_snapshot = store.read(pair.destination)?;

        tokio::time::sleep(config.think_time()).await;

        let committed = {
            let _gate = coordination.occ_gate.lock().await;
            try_commit(
                store,
                &source_snapshot,
                &destination_snapshot,
                config.transfer_amount,
            )?
        };

        if committed {
            return Ok(AttemptOutcome::Committed);
        }

        metrics.record_abort();
    }

    metrics.record_failed_retry();
    tracing::debug!(
        source = pair.source,
        destination = pair.destination,
        retries = config.max_retries,
        "optimistic retry budget exhausted"
    );
    Ok(AttemptOutcome::RetriesExhausted)
}

/// Commit-time validation. Must be called inside the global serializing
/// section: re-reads both records and, only if neither version moved since
/// the snapshot, applies the debit/credit. A `false` return means the
/// store was left untouched.
pub fn try_commit(
    store: &AccountStore,
    source_snapshot: &Account,
    destination_snapshot: &Account,
    amount: i64,
) -> Result<bool> {
    let mut source = store.read(source_snapshot.id)?;
    let mut destination = store.read(destination_snapshot.id)?;

    if source.version != source_snapshot.version
        || destination.version != destination_snapshot.version
    {
        return Ok(false);
    }

    source.balance -= amount;
    source.version += 1;
    store.write(source);

    destination.balance += amount;
    destination.version += 1;
    store.write(destination);

    Ok(true)
}
