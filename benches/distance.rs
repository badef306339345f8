//! Benchmarks for distance computations.
//!
//! These measure the kernel functions that dominate query cost across all
//! index strategies.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use eikon::distance::{cosine_distance, euclidean_distance, manhattan_distance};
use eikon::vector::normalized_copy;

fn random_vectors(n: usize, dim: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect())
        .collect()
}

fn normalized_vectors(n: usize, dim: usize) -> Vec<Vec<f64>> {
    random_vectors(n, dim)
        .into_iter()
        .map(|v| normalized_copy(&v).unwrap())
        .collect()
}

fn bench_euclidean_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("euclidean");

    for dim in [64, 128, 256, 512, 1024].iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        let vectors = random_vectors(2, *dim);
        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |b, _| {
            b.iter(|| {
                euclidean_distance(black_box(&vectors[0]), black_box(&vectors[1])).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_cosine_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine");

    for dim in [64, 128, 256, 512, 1024].iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        let vectors = normalized_vectors(2, *dim);
        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |b, _| {
            b.iter(|| cosine_distance(black_box(&vectors[0]), black_box(&vectors[1])).unwrap())
        });
    }
    group.finish();
}

fn bench_manhattan_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("manhattan");

    for dim in [64, 128, 256, 512, 1024].iter() {
        group.throughput(Throughput::Elements(*dim as u64));
        let vectors = random_vectors(2, *dim);
        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |b, _| {
            b.iter(|| {
                manhattan_distance(black_box(&vectors[0]), black_box(&vectors[1])).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_euclidean_dimensions,
    bench_cosine_dimensions,
    bench_manhattan_dimensions
);
criterion_main!(benches);
