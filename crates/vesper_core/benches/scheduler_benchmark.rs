//! # Scheduler Benchmark
//!
//! Measures queue throughput and the cost of one fan-out/barrier round.
//!
//! Run with: `cargo bench --package vesper_core --bench scheduler_benchmark`

#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vesper_core::{bucket_ranges, TaskScheduler};

/// Benchmark: submit N trivial tasks and wait for the barrier.
fn bench_submit_and_wait(c: &mut Criterion) {
    let scheduler = TaskScheduler::with_workers(4).expect("scheduler");
    let mut group = c.benchmark_group("submit_and_wait");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let counter = Arc::new(AtomicUsize::new(0));
            b.iter(|| {
                for _ in 0..count {
                    let counter = Arc::clone(&counter);
                    scheduler.submit_task(move || {
                        counter.fetch_add(1, Ordering::Relaxed);
                    });
                }
                scheduler.wait_while_busy();
            });
            black_box(counter.load(Ordering::Relaxed));
        });
    }

    group.finish();
}

/// Benchmark: one bucketed scope over a borrowed slice, the shape every system uses.
fn bench_scoped_buckets(c: &mut Criterion) {
    let scheduler = TaskScheduler::with_workers(4).expect("scheduler");
    let mut values: Vec<f32> = (0..100_000u32).map(|i| i as f32).collect();

    c.bench_function("scoped_buckets_100k", |b| {
        b.iter(|| {
            let ranges = bucket_ranges(values.len(), 6);
            let mut rest = values.as_mut_slice();
            scheduler.scope(|s| {
                for range in &ranges {
                    let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                    rest = tail;
                    s.spawn(move || chunk.iter_mut().for_each(|v| *v *= 1.0001));
                }
            });
        });
    });
    black_box(values.len());
}

criterion_group!(benches, bench_submit_and_wait, bench_scoped_buckets);
criterion_main!(benches);
