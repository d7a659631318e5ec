//! Criterion micro-benchmarks for mask and index conversion.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gribjump_bench::{field_mask, striped_mask};
use gribjump_core::range;

const FIELD_LEN: usize = 6_599_680;

fn bench_from_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_mask");
    for run in [1usize, 64, 4096] {
        let mask = striped_mask(FIELD_LEN, run);
        group.bench_with_input(BenchmarkId::new("striped", run), &mask, |b, mask| {
            b.iter(|| range::from_mask(black_box(mask)).unwrap())
        });
    }
    let mask = field_mask(42, FIELD_LEN, 0.3);
    group.bench_function("random_field", |b| {
        b.iter(|| range::from_mask(black_box(&mask)).unwrap())
    });
    group.finish();
}

fn bench_indices(c: &mut Criterion) {
    let points: Vec<usize> = (0..100_000).map(|i| (i * 37) % FIELD_LEN).collect();
    c.bench_function("from_indices_100k", |b| {
        b.iter(|| range::from_indices(black_box(&points)).unwrap())
    });

    let ranges = range::from_mask(&striped_mask(FIELD_LEN, 64)).unwrap();
    c.bench_function("to_indices_striped_64", |b| {
        b.iter(|| range::to_indices(black_box(&ranges)))
    });
    c.bench_function("to_mask_striped_64", |b| {
        b.iter(|| range::to_mask(black_box(&ranges), FIELD_LEN))
    });
}

criterion_group!(benches, bench_from_mask, bench_indices);
criterion_main!(benches);
