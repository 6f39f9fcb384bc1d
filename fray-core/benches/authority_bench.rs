use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fray_core::authority::{AcquireOutcome, LeaseRequest};
use fray_core::authority_in_memory::InMemoryLeaseAuthority;
use fray_core::store::AccountStore;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn make_request(agent_id: &str, account: u32) -> LeaseRequest {
    LeaseRequest::mutates(agent_id, &format!("sess_{}", agent_id), account, 5000)
}

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_acquire_release_cycle(c: &mut Criterion) {
    let authority = InMemoryLeaseAuthority::new();
    authority.register_priority("older", 100);
    let request = make_request("older", 0);

    c.bench_function("authority_acquire_release", |b| {
        b.iter(|| match authority.acquire_at(black_box(&request), 1000) {
            AcquireOutcome::Granted { lease_id } => {
                authority.release_lease(&lease_id);
            }
            other => panic!("expected grant, got {:?}", other),
        })
    });
}

fn bench_wait_die_verdict(c: &mut Criterion) {
    let authority = InMemoryLeaseAuthority::new();
    authority.register_priority("older", 100);
    authority.register_priority("younger", 200);

    match authority.acquire_at(&make_request("older", 0), 1000) {
        AcquireOutcome::Granted { .. } => {}
        other => panic!("expected grant, got {:?}", other),
    }

    // The contended path: conflict detection plus the seniority decision.
    let request = make_request("younger", 0);
    c.bench_function("authority_wait_die_verdict", |b| {
        b.iter(|| authority.acquire_at(black_box(&request), 1001))
    });
}

fn bench_store_roundtrip(c: &mut Criterion) {
    let store = AccountStore::new();
    store.reset(5, 100);

    c.bench_function("store_read_write", |b| {
        b.iter(|| {
            let mut account = store.read(black_box(0)).unwrap();
            account.balance += 1;
            account.version += 1;
            store.write(account);
        })
    });
}

criterion_group!(
    benches,
    bench_acquire_release_cycle,
    bench_wait_die_verdict,
    bench_store_roundtrip,
);
criterion_main!(benches);
