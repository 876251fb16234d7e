//! Benchmark for sphere mesh generation.
//!
//! TARGET: reference sphere (r = 6, d = 0.1) well under one second
//!
//! Run with: cargo bench --package voxsphere_mesh --bench sphere_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voxsphere_mesh::{merge, ExecutionMode, GeometryBuffer, SphereConfig, SphereMeshGenerator};

fn benchmark_reference_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_sphere");
    group.sample_size(10);
    group.throughput(Throughput::Elements(SphereConfig::default().lattice_points()));

    for (name, execution) in [("sequential", ExecutionMode::Sequential), ("parallel", ExecutionMode::Parallel)] {
        let generator = SphereMeshGenerator::new(SphereConfig::default().with_execution(execution))
            .expect("reference config is valid");
        group.bench_function(name, |b| {
            b.iter(|| black_box(generator.generate().expect("generation succeeds")));
        });
    }

    group.finish();
}

fn benchmark_reference_path(c: &mut Criterion) {
    let generator = SphereMeshGenerator::new(SphereConfig::new(2.0, 0.1)).expect("valid config");

    let mut group = c.benchmark_group("neighbour_lookup");
    group.bench_function("occupancy_grid", |b| {
        b.iter(|| black_box(generator.generate().expect("generation succeeds")));
    });
    group.bench_function("direct_probe", |b| {
        b.iter(|| black_box(generator.generate_reference().expect("generation succeeds")));
    });
    group.finish();
}

fn benchmark_merge(c: &mut Criterion) {
    let mesh = SphereMeshGenerator::new(SphereConfig::new(3.0, 0.1))
        .and_then(|g| g.generate())
        .expect("generation succeeds");

    // Split back into single-face parts to measure the merger alone
    let buffer = mesh.buffer();
    let parts: Vec<GeometryBuffer> = (0..buffer.vertex_count() / 4)
        .map(|face| GeometryBuffer {
            vertices: buffer.vertices[face * 4..face * 4 + 4].to_vec(),
            colors: buffer.colors[face * 4..face * 4 + 4].to_vec(),
            indices: vec![0, 1, 2, 2, 3, 0],
        })
        .collect();

    let mut group = c.benchmark_group("merge");
    group.throughput(Throughput::Elements(parts.len() as u64));
    group.bench_function("single_face_parts", |b| {
        b.iter(|| black_box(merge(&parts).expect("fits u32 indices")));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_reference_sphere,
    benchmark_reference_path,
    benchmark_merge
);
criterion_main!(benches);
