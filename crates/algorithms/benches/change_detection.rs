//! Benchmarks for the change detection pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use canopy_algorithms::change::{detect_changes, ChangeDetectorParams};
use canopy_algorithms::indices::vegetation_index;
use canopy_algorithms::preprocess::{preprocess_scene, PreprocessParams};
use canopy_core::raster::{Raster, Scene};
use ndarray::Array3;

fn create_scene(size: usize) -> Scene {
    let mut stack = Array3::zeros((size, size, 4));
    for row in 0..size {
        for col in 0..size {
            let v = ((row * 7 + col * 13) % 200) as f64;
            stack[(row, col, 0)] = 300.0 + v;
            stack[(row, col, 1)] = 3500.0 + v * 3.0;
            stack[(row, col, 2)] = 250.0 + v;
            stack[(row, col, 3)] = 600.0 + v;
        }
    }
    Scene::from_stack(stack).unwrap()
}

fn create_index_pair(size: usize) -> (Raster<f64>, Raster<f64>) {
    let t0 = Raster::filled(size, size, 0.7);
    let mut t1 = Raster::filled(size, size, 0.7);
    // Scatter a few loss patches
    for block in 0..4 {
        let origin = block * size / 4;
        for row in origin..(origin + size / 8) {
            for col in origin..(origin + size / 8) {
                t1.set(row, col, 0.1).unwrap();
            }
        }
    }
    (t0, t1)
}

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/preprocess");
    for size in [256, 512, 1024] {
        let scene = create_scene(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| preprocess_scene(black_box(&scene), PreprocessParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_vegetation_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/vegetation_index");
    for size in [256, 512, 1024, 2048] {
        let scene = create_scene(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| vegetation_index(black_box(&scene)).unwrap())
        });
    }
    group.finish();
}

fn bench_detect_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/detect_changes");
    for size in [256, 512, 1024] {
        let (t0, t1) = create_index_pair(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                detect_changes(
                    black_box(&t0),
                    black_box(&t1),
                    ChangeDetectorParams::default(),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_preprocess,
    bench_vegetation_index,
    bench_detect_changes
);
criterion_main!(benches);
