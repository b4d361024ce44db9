use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use quickfuzz::{Coordinator, CoordinatorConfig, Djb2, ProbeTable, WaitBudget};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

const CAP: usize = 1000;

fn bench_insert(c: &mut Criterion) {
    c.bench_function("probe_table_insert_750", |b| {
        let keys: Vec<u64> = lcg(1).take(750).collect();
        b.iter_batched(
            || ProbeTable::<u64, u64>::new(CAP),
            |mut t| {
                for (i, &k) in keys.iter().enumerate() {
                    let _ = t.insert(k, i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find(c: &mut Criterion) {
    let keys: Vec<u64> = lcg(7).take(750).collect();
    let mut t = ProbeTable::<u64, u64>::new(CAP);
    for (i, &k) in keys.iter().enumerate() {
        let _ = t.insert(k, i as u64);
    }

    c.bench_function("probe_table_find_hit", |b| {
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });

    c.bench_function("probe_table_find_miss", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(t.get(&k));
        })
    });
}

fn bench_churn_with_tombstones(c: &mut Criterion) {
    c.bench_function("probe_table_insert_remove_churn", |b| {
        let names: Vec<String> = (0..500).map(|i| format!("thread-{i}")).collect();
        b.iter_batched(
            || ProbeTable::<&str, u32, Djb2>::with_strategy(CAP, Djb2),
            |mut t| {
                for round in 0..4u32 {
                    for n in &names {
                        let _ = t.insert(n.as_str(), round);
                    }
                    for n in names.iter().step_by(2) {
                        t.remove(&n.as_str());
                    }
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_signal_wait(c: &mut Criterion) {
    let coord: Coordinator<'static> =
        Coordinator::new(CoordinatorConfig::default().with_wait_budget(WaitBudget::Micros(0)));
    coord.signal("ready");
    c.bench_function("coordinator_wait_already_signalled", |b| {
        b.iter(|| black_box(coord.wait("ready")))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(3));
    targets = bench_insert, bench_find, bench_churn_with_tombstones, bench_signal_wait
}
criterion_main!(benches);
