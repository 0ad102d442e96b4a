//! Benchmarks for the core locator operations: building the search
//! structure, nearest-point queries, batch merging, and incremental
//! insertion, across a range of cloud sizes.

#![allow(missing_docs)] // Criterion macros generate undocumented functions

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use pointbins::prelude::*;

const SEED: u64 = 0xB1A5;

fn cloud_of(n: usize) -> PointCloud<f64, 3> {
    generate_random_points_seeded(n, (0.0, 1.0), SEED)
        .into_iter()
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000usize, 10_000, 100_000] {
        let cloud = cloud_of(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &cloud, |b, cloud| {
            b.iter_batched(
                || BucketLocator::<f64, 3>::default(),
                |mut locator| {
                    locator.build(cloud).unwrap();
                    black_box(locator)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_find_closest_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_closest_point");
    for &n in &[1_000usize, 10_000, 100_000] {
        let cloud = cloud_of(n);
        let queries = generate_random_points_seeded::<f64, 3>(256, (0.0, 1.0), SEED ^ 1);
        let mut locator = BucketLocator::<f64, 3>::default();
        locator.build(&cloud).unwrap();

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &cloud, |b, cloud| {
            b.iter(|| {
                for query in &queries {
                    black_box(locator.find_closest_point(cloud, query).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_merge_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_points");
    for &n in &[1_000usize, 10_000] {
        // Half the cloud duplicates the other half within tolerance, so the
        // merge does real work.
        let mut points = generate_random_points_seeded::<f64, 3>(n / 2, (0.0, 1.0), SEED ^ 2);
        let near: Vec<Point<f64, 3>> = points
            .iter()
            .map(|p| {
                let c = p.coords();
                Point::new([c[0] + 1e-4, c[1], c[2]])
            })
            .collect();
        points.extend(near);
        let cloud: PointCloud<f64, 3> = points.into_iter().collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &cloud, |b, cloud| {
            b.iter_batched(
                || BucketLocator::new(LocatorConfig::default().with_tolerance(1e-3)),
                |mut locator| black_box(locator.merge_points(cloud).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_incremental_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_insertion");
    for &n in &[1_000usize, 10_000] {
        let points = generate_random_points_seeded::<f64, 3>(n, (0.0, 1.0), SEED ^ 3);
        let bounds = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let config: LocatorConfig<f64, 3> = LocatorConfig::default().with_tolerance(1e-6);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, points| {
            b.iter_batched(
                || {
                    PointInserter::with_estimated_points(
                        PointCloud::<f64, 3>::new(),
                        &bounds,
                        &config,
                        points.len(),
                    )
                    .unwrap()
                },
                |mut inserter| {
                    for point in points {
                        black_box(inserter.insert(point));
                    }
                    black_box(inserter.points().len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_find_closest_point,
    bench_merge_points,
    bench_incremental_insertion
);
criterion_main!(benches);
