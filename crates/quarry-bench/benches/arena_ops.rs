//! Criterion micro-benchmarks for arena allocation, reallocation, and scopes.

use std::alloc::Layout;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use quarry_arena::Arena;
use quarry_core::Allocator;

/// Benchmark: 1000 handle allocations of 16 bytes, then reset.
fn bench_arena_alloc_reset(c: &mut Criterion) {
    let mut arena = Arena::new(64 * 1024).unwrap();
    c.bench_function("arena_alloc_1k_reset", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(arena.alloc(16, 8).unwrap());
            }
            arena.reset();
        });
    });
}

/// Benchmark: grow the tail block in place 256 times.
fn bench_arena_tail_realloc(c: &mut Criterion) {
    let mut arena = Arena::new(64 * 1024).unwrap();
    c.bench_function("arena_tail_realloc_256", |b| {
        b.iter(|| {
            let mut block = arena.alloc(8, 8).unwrap();
            for size in (16..).step_by(8).take(256) {
                block = arena.realloc(Some(block), size, 8).unwrap();
            }
            black_box(block);
            arena.reset();
        });
    });
}

/// Benchmark: open a scope, allocate 100 i32-sized blocks, end the scope.
fn bench_scope_cycle(c: &mut Criterion) {
    let arena = Arena::new(4096).unwrap();
    let layout = Layout::from_size_align(4, 16).unwrap();
    c.bench_function("scope_100_allocs", |b| {
        b.iter(|| {
            let scope = arena.scope();
            for _ in 0..100 {
                black_box(scope.allocate(layout).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_arena_alloc_reset,
    bench_arena_tail_realloc,
    bench_scope_cycle
);
criterion_main!(benches);
