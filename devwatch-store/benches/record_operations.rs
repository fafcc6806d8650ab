use chrono::{TimeDelta, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use devwatch_store::{derive, AggregateRecord, DeviceStore};

fn roster(size: usize) -> DeviceStore {
    DeviceStore::from_roster((0..size).map(|i| format!("device-{}", i)))
}

/// Benchmark record_heartbeat latency (hot path)
fn bench_record_heartbeat(c: &mut Criterion) {
    let store = roster(1);
    let now = Utc::now();

    c.bench_function("record_heartbeat", |b| {
        b.iter(|| {
            store.record_heartbeat(black_box("device-0"), black_box(now));
        });
    });
}

/// Benchmark record_upload latency (hot path)
fn bench_record_upload(c: &mut Criterion) {
    let store = roster(1);

    c.bench_function("record_upload", |b| {
        b.iter(|| {
            store.record_upload(black_box("device-0"), black_box(TimeDelta::seconds(5)));
        });
    });
}

/// Benchmark lookups of ids that are not on the roster
fn bench_unknown_device(c: &mut Criterion) {
    let store = roster(1);
    let now = Utc::now();

    c.bench_function("record_heartbeat_unknown", |b| {
        b.iter(|| {
            store.record_heartbeat(black_box("ghost"), black_box(now));
        });
    });
}

/// Benchmark stats queries against rosters of varying size
fn bench_stats_varying_roster(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats_varying_roster");
    let now = Utc::now();

    for size in [10usize, 1_000, 100_000].iter() {
        let store = roster(*size);
        let target = format!("device-{}", size / 2);
        store.record_heartbeat(&target, now);
        store.record_heartbeat(&target, now + TimeDelta::minutes(3));
        store.record_upload(&target, TimeDelta::seconds(5));

        group.bench_with_input(BenchmarkId::from_parameter(size), &target, |b, target| {
            b.iter(|| black_box(store.stats(black_box(target))));
        });
    }
    group.finish();
}

/// Benchmark the pure derivation step
fn bench_derive(c: &mut Criterion) {
    let now = Utc::now();
    let record = AggregateRecord {
        heartbeat_count: 1_440,
        first_heartbeat_at: Some(now),
        last_heartbeat_at: Some(now + TimeDelta::days(1)),
        upload_count: 96,
        upload_time_sum: TimeDelta::minutes(42),
        ..AggregateRecord::new("device-0")
    };

    c.bench_function("derive", |b| {
        b.iter(|| black_box(derive(black_box(&record))));
    });
}

criterion_group!(
    benches,
    bench_record_heartbeat,
    bench_record_upload,
    bench_unknown_device,
    bench_stats_varying_roster,
    bench_derive
);
criterion_main!(benches);
