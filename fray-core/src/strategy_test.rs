#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::authority::LeaseAuthority;
    use crate::authority_in_memory::InMemoryLeaseAuthority;
    use crate::config::BenchConfig;
    use crate::error::BenchError;
    use crate::metrics::MetricsCollector;
    use crate::store::AccountStore;
    use crate::strategy::Coordination;
    use crate::types::{AgentProfile, AttemptOutcome, TransferPair};
    use crate::{chaos, optimistic, pessimistic, wait_die};

    fn fast_config() -> BenchConfig {
        BenchConfig {
            accounts: 2,
            agents: 2,
            think_time_ms: 20,
            interleave_delay_ms: 30,
            lock_timeout_ms: 120,
            fallback_backoff_ms: 10,
            ..Default::default()
        }
    }

    fn two_account_store() -> Arc<AccountStore> {
        let store = Arc::new(AccountStore::new());
        store.reset(2, 100);
        store
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_chaos_loses_concurrent_updates() {
        let store = two_account_store();
        let config = BenchConfig {
            think_time_ms: 50,
            ..fast_config()
        };

        // Two agents debit the same source concurrently. Both snapshot the
        // same balance before either writes, so one debit vanishes.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = Arc::clone(&store);
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                chaos::run_transfer(TransferPair::new(0, 1), &store, &config).await
            }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome, AttemptOutcome::Committed);
        }

        // Serial execution would leave 80/120; the lost update leaves 90/110.
        assert_eq!(store.read(0).unwrap().balance, 90);
        assert_eq!(store.read(1).unwrap().balance, 110);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pessimistic_timeout_releases_every_held_lock() {
        let store = two_account_store();
        let config = BenchConfig {
            think_time_ms: 10,
            interleave_delay_ms: 40,
            lock_timeout_ms: 100,
            ..fast_config()
        };
        let authority = Arc::new(InMemoryLeaseAuthority::new());
        let coordination = Arc::new(Coordination::new(2, authority));
        let metrics = Arc::new(MetricsCollector::new());

        // Opposite acquisition order on the same two accounts: each agent
        // takes its first lock, then blocks on the other's: a genuine cycle.
        let mut handles = Vec::new();
        for pair in [TransferPair::new(0, 1), TransferPair::new(1, 0)] {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                pessimistic::run_transfer(pair, &store, &coordination, &metrics, &config).await
            }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome, AttemptOutcome::TimedOut);
        }

        assert_eq!(metrics.snapshot().deadlocks_detected, 2);

        // No partial effects, and both locks came back before returning.
        assert_eq!(store.read(0).unwrap().balance, 100);
        assert_eq!(store.read(1).unwrap().balance, 100);
        assert!(coordination.locks.lock_for(0).try_lock().is_ok());
        assert!(coordination.locks.lock_for(1).try_lock().is_ok());
    }

    #[test]
    fn test_optimistic_failed_validation_leaves_store_untouched() {
        let store = AccountStore::new();
        store.reset(2, 100);

        let source_snapshot = store.read(0).unwrap();
        let destination_snapshot = store.read(1).unwrap();

        // A concurrent commit moves the source version under our feet.
        let mut concurrent = store.read(0).unwrap();
        concurrent.balance = 95;
        concurrent.version += 1;
        store.write(concurrent);

        let committed =
            optimistic::try_commit(&store, &source_snapshot, &destination_snapshot, 10).unwrap();
        assert!(!committed);

        // The failed validation wrote nothing.
        assert_eq!(store.read(0).unwrap().balance, 95);
        assert_eq!(store.read(0).unwrap().version, 1);
        assert_eq!(store.read(1).unwrap().balance, 100);
        assert_eq!(store.read(1).unwrap().version, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_optimistic_conflict_aborts_then_commits() {
        let store = two_account_store();
        let config = BenchConfig {
            think_time_ms: 30,
            ..fast_config()
        };
        let authority = Arc::new(InMemoryLeaseAuthority::new());
        let coordination = Arc::new(Coordination::new(2, authority));
        let metrics = Arc::new(MetricsCollector::new());

        // Both agents snapshot before either commits; the loser of the
        // serializing section must abort and retry with fresh state.
        let mut handles = Vec::new();
        for pair in [TransferPair::new(0, 1), TransferPair::new(1, 0)] {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            let config = config.clone();
            handles.push(tokio::spawn(async move {
                optimistic::run_transfer(pair, &store, &coordination, &metrics, &config).await
            }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome, AttemptOutcome::Committed);
        }

        assert!(metrics.snapshot().aborts >= 1);

        // Opposite transfers cancel out, and every commit bumped versions.
        assert_eq!(store.total_balance(), 200);
        assert_eq!(store.read(0).unwrap().balance, 100);
        assert_eq!(store.read(0).unwrap().version, 2);
        assert_eq!(store.read(1).unwrap().version, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_die_junior_dies_while_senior_holds() {
        let store = two_account_store();
        let authority = Arc::new(InMemoryLeaseAuthority::new().with_backoff_hints(10, 40));
        let coordination = Arc::new(Coordination::new(2, { let a: Arc<dyn LeaseAuthority> = authority.clone(); a }));
        let metrics = Arc::new(MetricsCollector::new());

        // The senior grabs both leases back-to-back and sits in a long
        // critical section; the junior arrives mid-hold from the opposite
        // direction and must die rather than wait.
        let senior_config = BenchConfig {
            think_time_ms: 150,
            interleave_delay_ms: 0,
            ..fast_config()
        };
        let junior_config = BenchConfig {
            think_time_ms: 10,
            interleave_delay_ms: 10,
            ..fast_config()
        };

        let senior = {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                let agent = AgentProfile::new("senior", 100);
                wait_die::run_transfer(
                    &agent,
                    TransferPair::new(0, 1),
                    &store,
                    &coordination,
                    &metrics,
                    &senior_config,
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;

        let junior = {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                let agent = AgentProfile::new("junior", 200);
                wait_die::run_transfer(
                    &agent,
                    TransferPair::new(1, 0),
                    &store,
                    &coordination,
                    &metrics,
                    &junior_config,
                )
                .await
            })
        };

        assert_eq!(senior.await.unwrap().unwrap(), AttemptOutcome::Committed);
        assert_eq!(junior.await.unwrap().unwrap(), AttemptOutcome::Committed);

        let snapshot = metrics.snapshot();
        assert!(snapshot.dies >= 1);

        // Opposite transfers cancel; every grant was released.
        assert_eq!(store.total_balance(), 200);
        assert_eq!(authority.active_lease_count(), 0);
        assert_eq!(authority.granted_total(), authority.released_total());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_die_senior_waits_behind_junior() {
        let store = two_account_store();
        let authority = Arc::new(InMemoryLeaseAuthority::new().with_backoff_hints(20, 40));
        let coordination = Arc::new(Coordination::new(2, { let a: Arc<dyn LeaseAuthority> = authority.clone(); a }));
        let metrics = Arc::new(MetricsCollector::new());

        let junior_config = BenchConfig {
            think_time_ms: 100,
            interleave_delay_ms: 0,
            ..fast_config()
        };
        let senior_config = BenchConfig {
            think_time_ms: 10,
            interleave_delay_ms: 10,
            ..fast_config()
        };

        // The junior holds first; the senior arriving later is allowed to
        // wait its turn, and is never told to die.
        let junior = {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                let agent = AgentProfile::new("junior", 200);
                wait_die::run_transfer(
                    &agent,
                    TransferPair::new(0, 1),
                    &store,
                    &coordination,
                    &metrics,
                    &junior_config,
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;

        let senior = {
            let store = Arc::clone(&store);
            let coordination = Arc::clone(&coordination);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                let agent = AgentProfile::new("senior", 100);
                wait_die::run_transfer(
                    &agent,
                    TransferPair::new(0, 1),
                    &store,
                    &coordination,
                    &metrics,
                    &senior_config,
                )
                .await
            })
        };

        assert_eq!(junior.await.unwrap().unwrap(), AttemptOutcome::Committed);
        assert_eq!(senior.await.unwrap().unwrap(), AttemptOutcome::Committed);

        let snapshot = metrics.snapshot();
        assert!(snapshot.waits >= 1);
        assert_eq!(snapshot.dies, 0);
        assert_eq!(authority.active_lease_count(), 0);
        assert_eq!(authority.granted_total(), authority.released_total());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_die_releases_leases_when_critical_section_fails() {
        // Only account 0 exists; the critical section trips over the missing
        // destination after both leases were granted.
        let store = Arc::new(AccountStore::new());
        store.reset(1, 100);

        let authority = Arc::new(InMemoryLeaseAuthority::new());
        let coordination = Arc::new(Coordination::new(2, { let a: Arc<dyn LeaseAuthority> = authority.clone(); a }));
        let metrics = Arc::new(MetricsCollector::new());
        let config = BenchConfig {
            think_time_ms: 5,
            interleave_delay_ms: 5,
            ..fast_config()
        };

        let agent = AgentProfile::new("senior", 100);
        let result = wait_die::run_transfer(
            &agent,
            TransferPair::new(0, 1),
            &store,
            &coordination,
            &metrics,
            &config,
        )
        .await;

        assert!(matches!(result, Err(BenchError::AccountMissing(1))));

        // Both grants were returned despite the error.
        assert_eq!(authority.granted_total(), 2);
        assert_eq!(authority.released_total(), 2);
        assert_eq!(authority.active_lease_count(), 0);
    }
}
