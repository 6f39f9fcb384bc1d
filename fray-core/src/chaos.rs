//! Baseline discipline: no coordination at all.
//!
//! Reads both records, suspends for the full think time, then writes the
//! stale copies back with no re-validation. Under contention some of these
//! writes clobber each other; the lost updates this produces are the
//! benchmark's baseline, not a bug to fix.

use crate::config::BenchConfig;
use crate::error::Result;
use crate::store::AccountStore;
use crate::types::{AttemptOutcome, TransferPair};

pub async fn run_transfer(
    pair: TransferPair,
    store: &AccountStore,
    config: &BenchConfig,
) -> Result<AttemptOutcome> {
    let mut source = store.read(pair.source)?;
    let mut destination = store.read(pair.destination)?;

    tokio::time::sleep(config.think_time()).await;

    source.balance -= config.transfer_amount;
    source.version += 1;
    store.write(source);

    destination.balance += config.transfer_amount;
    destination.version += 1;
    store.write(destination);

    Ok(AttemptOutcome::Committed)
}
