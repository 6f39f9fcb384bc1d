//! Pessimistic discipline: per-account exclusive locks with bounded wait.
//!
//! Locks are taken in workload order (source first, destination second),
//! never sorted by account id. Combined with the circular topology this
//! keeps genuine cyclic waits on the table, which is the behavior under
//! measurement: fixed-order two-phase locking without a globally consistent
//! acquisition order does not prevent deadlock. The timeout converts a
//! deadlock into a recorded abort instead of a frozen run.

use tokio::time::timeout;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::store::AccountStore;
use crate::strategy::Coordination;
use crate::types::{AttemptOutcome, TransferPair};

pub async fn run_transfer(
    pair: TransferPair,
    store: &AccountStore,
    coordination: &Coordination,
    metrics: &MetricsCollector,
    config: &BenchConfig,
) -> Result<AttemptOutcome> {
    let source_guard = match timeout(
        config.lock_timeout(),
        coordination.locks.lock_for(pair.source).lock(),
    )
    .await
    {
        Ok(guard) => guard,
        Err(_) => {
            metrics.record_deadlock();
            return Ok(AttemptOutcome::TimedOut);
        }
    };

    // Yield while holding the first lock so neighbors reach their own first
    // acquisition and the cycle can actually form.
    tokio::time::sleep(config.interleave_delay()).await;

    let destination_guard = match timeout(
        config.lock_timeout(),
        coordination.locks.lock_for(pair.destination).lock(),
    )
    .await
    {
        Ok(guard) => guard,
        Err(_) => {
            // Back off: unwind the held lock before reporting the abort, so
            // a timed-out agent never strands its neighbors.
            drop(source_guard);
            metrics.record_deadlock();
            tracing::debug!(
                source = pair.source,
                destination = pair.destination,
                "second lock timed out, attempt abandoned"
            );
            return Ok(AttemptOutcome::TimedOut);
        }
    };

    // Critical section: both locks held.
    let mut source = store.read(pair.source)?;
    let mut destination = store.read(pair.destination)?;

    tokio::time::sleep(config.think_time()).await;

    source.balance -= config.transfer_amount;
    source.version += 1;
    store.write(source);

    destination.balance += config.transfer_amount;
    destination.version += 1;
    store.write(destination);

    drop(destination_guard);
    drop(source_guard);

    Ok(AttemptOutcome::Committed)
}
