//! Benchmarks for PlanarDecimator on flat and curved grids

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use decimesh_core::{Point3d, TriangleMesh};
use decimesh_simplification::{DecimationConfig, DecimationEngine, MeshSimplifier, PlanarDecimator};

fn generate_grid_mesh(size: usize, amplitude: f64) -> TriangleMesh {
    let mut vertices = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f64 / (size - 1) as f64 * std::f64::consts::PI;
            let fy = y as f64 / (size - 1) as f64 * std::f64::consts::PI;
            vertices.push(Point3d::new(x as f64, y as f64, fx.sin() * fy.sin() * amplitude));
        }
    }
    let mut faces = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = y * size + x;
            let tr = tl + 1;
            let bl = (y + 1) * size + x;
            let br = bl + 1;
            faces.push([tl, tr, bl]);
            faces.push([tr, br, bl]);
        }
    }
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

fn bench_decimation(c: &mut Criterion) {
    let sizes = [20, 40, 80];
    let surfaces = [("flat", 0.0), ("curved", 2.0)];

    let mut group = c.benchmark_group("decimation");

    for &size in &sizes {
        for &(name, amplitude) in &surfaces {
            let mesh = generate_grid_mesh(size, amplitude);
            group.bench_with_input(
                BenchmarkId::new(name, format!("{}f", mesh.face_count())),
                &mesh,
                |b, mesh| {
                    let decimator = PlanarDecimator::new();
                    b.iter(|| {
                        let result = decimator.simplify(black_box(mesh)).unwrap();
                        black_box(result);
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");

    for &size in &[40, 80, 160] {
        let mesh = generate_grid_mesh(size, 2.0);
        group.bench_with_input(
            BenchmarkId::new("from_mesh", format!("{}v", mesh.vertex_count())),
            &mesh,
            |b, mesh| {
                b.iter(|| {
                    let engine = DecimationEngine::from_mesh(black_box(mesh), DecimationConfig::default()).unwrap();
                    black_box(engine);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decimation, bench_indexing);
criterion_main!(benches);
