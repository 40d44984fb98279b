//! # Slot Pool Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - O(1) allocate and free
//! - 0 allocations after construction
//! - Handle validation must stay in the noise
//!
//! Run with: `cargo bench --package oroboros_pool`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oroboros_pool::{Handle, SlotPool};

/// Matches the default emitter budget.
const POOL_CAPACITY: usize = 256;

/// Benchmark: fill a pool, then empty it.
fn bench_fill_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_and_drain");

    for capacity in [POOL_CAPACITY, 4096, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool: SlotPool<[f32; 4]> = SlotPool::new(capacity);
                let mut handles: Vec<Handle<[f32; 4]>> = Vec::with_capacity(capacity);
                b.iter(|| {
                    for _ in 0..capacity {
                        if let Ok(handle) = pool.allocate_with([1.0; 4]) {
                            handles.push(handle);
                        }
                    }
                    for handle in handles.drain(..) {
                        black_box(pool.free(handle));
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: steady-state churn on a half-full pool.
fn bench_churn(c: &mut Criterion) {
    let mut pool: SlotPool<u64> = SlotPool::new(POOL_CAPACITY);
    for i in 0..POOL_CAPACITY / 2 {
        let _ = pool.allocate_with(i as u64);
    }

    c.bench_function("churn_free_then_allocate", |b| {
        b.iter(|| {
            if let Ok(handle) = pool.allocate_with(7) {
                black_box(pool.free(handle));
            }
        });
    });
}

/// Benchmark: lookups through live and stale handles.
fn bench_lookup(c: &mut Criterion) {
    let mut pool: SlotPool<u64> = SlotPool::new(POOL_CAPACITY);
    let live: Vec<_> = (0..POOL_CAPACITY as u64)
        .filter_map(|i| pool.allocate_with(i).ok())
        .collect();
    let stale: Vec<_> = live.iter().map(|h| Handle::from_raw_parts(h.index(), h.generation() + 1)).collect();

    c.bench_function("get_live", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for handle in &live {
                if let Ok(value) = pool.get(*handle) {
                    sum += *value;
                }
            }
            black_box(sum)
        });
    });

    c.bench_function("get_stale", |b| {
        b.iter(|| {
            let misses = stale.iter().filter(|h| pool.get(**h).is_err()).count();
            black_box(misses)
        });
    });
}

criterion_group!(benches, bench_fill_and_drain, bench_churn, bench_lookup);
criterion_main!(benches);
