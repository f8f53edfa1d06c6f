//! # Instance Churn Benchmark
//!
//! The pool's contract is O(1) spawn and despawn under heavy churn while
//! the live range stays dense. These benchmarks watch that contract at
//! increasing populations.
//!
//! Run with: `cargo bench --package stampede_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stampede_core::{
    ColorRgba, GroupConfig, GroupId, InstanceAttributes, InstanceHandle, InstancePool, Vec2,
};

/// Attribute payload used by every benchmark iteration.
fn attrs(i: usize) -> InstanceAttributes {
    InstanceAttributes::new(
        Vec2::new(i as f32, -(i as f32)),
        0.0,
        Vec2::ONE,
        (i % 16) as u32,
        ColorRgba::WHITE,
    )
}

fn handle(serial: u64) -> InstanceHandle {
    InstanceHandle::new(GroupId::new(0), serial)
}

/// Benchmark: spawn N instances into an empty pool.
fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");
    for count in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut pool = InstancePool::new(
                    GroupId::new(0),
                    GroupConfig {
                        initial_capacity: count,
                        lifetime: None,
                    },
                );
                for i in 0..count {
                    let _ = black_box(pool.spawn(handle(i as u64), &attrs(i), None));
                }
                pool.active()
            });
        });
    }
    group.finish();
}

/// Benchmark: spawn N instances through repeated capacity doubling.
fn bench_spawn_with_growth(c: &mut Criterion) {
    c.bench_function("spawn_100k_from_capacity_1", |b| {
        b.iter(|| {
            let mut pool = InstancePool::new(
                GroupId::new(0),
                GroupConfig {
                    initial_capacity: 1,
                    lifetime: None,
                },
            );
            for i in 0..100_000usize {
                let _ = black_box(pool.spawn(handle(i as u64), &attrs(i), None));
            }
            pool.capacity()
        });
    });
}

/// THE CRITICAL BENCHMARK: interleaved spawn/despawn churn.
///
/// Every despawn hits the middle of the live range, forcing the
/// swap-remove path and a forward-map re-point.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    for count in [10_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut pool = InstancePool::new(
                        GroupId::new(0),
                        GroupConfig {
                            initial_capacity: count,
                            lifetime: None,
                        },
                    );
                    for i in 0..count {
                        pool.spawn(handle(i as u64), &attrs(i), None).unwrap();
                    }
                    pool
                },
                |mut pool| {
                    // Remove every other seeded handle, then refill.
                    for i in (0..count).step_by(2) {
                        let _ = black_box(pool.despawn(handle(i as u64)));
                    }
                    for i in 0..count / 2 {
                        let serial = (count + i) as u64;
                        let _ = black_box(pool.spawn(handle(serial), &attrs(i), None));
                    }
                    pool.active()
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

/// Benchmark: lifetime tick over a full pool.
fn bench_tick(c: &mut Criterion) {
    use stampede_core::LifetimeRange;

    let mut pool = InstancePool::new(
        GroupId::new(0),
        GroupConfig {
            initial_capacity: 100_000,
            lifetime: Some(LifetimeRange::new(1.0, 15.0)),
        },
    );
    for i in 0..100_000usize {
        pool.spawn(handle(i as u64), &attrs(i), Some(1.0e9)).unwrap();
    }

    c.bench_function("tick_100k", |b| {
        let mut expired = Vec::new();
        b.iter(|| {
            expired.clear();
            pool.tick(black_box(0.016), &mut expired);
            expired.len()
        });
    });
}

criterion_group!(benches, bench_spawn, bench_spawn_with_growth, bench_churn, bench_tick);
criterion_main!(benches);
