//! Benchmarks for outline decimation and the GPU mesh optimizer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pixmesh_core::{Mesh, Point2d, Point3f, TriangleCorner, Vector2f, Vector3f};
use pixmesh_simplification::{
    optimize_mesh, optimize_overdraw, optimize_vertex_cache, ramer_douglas_peucker, smooth_points,
    DEFAULT_OVERDRAW_THRESHOLD,
};

fn generate_soup_grid(size: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity((size - 1) * (size - 1) * 2);
    let at = |x: usize, y: usize| {
        let fx = x as f32 / (size - 1) as f32 * std::f32::consts::PI;
        let fy = y as f32 / (size - 1) as f32 * std::f32::consts::PI;
        Point3f::new(x as f32, y as f32, fx.sin() * fy.sin() * 2.0)
    };
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            for corners in [[(x, y), (x, y + 1), (x + 1, y)], [(x + 1, y), (x, y + 1), (x + 1, y + 1)]] {
                for (corner, (cx, cy)) in TriangleCorner::ALL.into_iter().zip(corners) {
                    mesh.add(at(cx, cy), Vector3f::z(), Vector2f::new(cx as f32, cy as f32), corner);
                }
            }
        }
    }
    mesh
}

fn generate_noisy_circle(points: usize) -> Vec<Point2d> {
    (0..points)
        .map(|i| {
            let t = i as f64 / points as f64 * std::f64::consts::TAU;
            let r = 200.0 + (i % 3) as f64;
            Point2d::new(r * t.cos(), r * t.sin())
        })
        .collect()
}

fn bench_optimizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimizer");

    for &size in &[16, 32, 64] {
        let mesh = generate_soup_grid(size);
        let triangles = mesh.triangle_count();

        group.bench_with_input(BenchmarkId::new("optimize_mesh", format!("{}t", triangles)), &mesh, |b, mesh| {
            b.iter(|| {
                let result = optimize_mesh(black_box(mesh)).unwrap();
                black_box(result);
            });
        });

        let shared = optimize_mesh(&mesh).unwrap();
        group.bench_with_input(BenchmarkId::new("vertex_cache", format!("{}t", triangles)), &shared, |b, mesh| {
            b.iter(|| black_box(optimize_vertex_cache(black_box(&mesh.indices), mesh.vertex_count())));
        });

        group.bench_with_input(BenchmarkId::new("overdraw", format!("{}t", triangles)), &shared, |b, mesh| {
            b.iter(|| {
                black_box(optimize_overdraw(
                    black_box(&mesh.indices),
                    &mesh.vertices,
                    DEFAULT_OVERDRAW_THRESHOLD,
                ))
            });
        });
    }

    group.finish();
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");

    for &points in &[100, 1000, 5000] {
        let outline = generate_noisy_circle(points);

        group.bench_with_input(BenchmarkId::new("smooth_points", points), &outline, |b, outline| {
            b.iter(|| black_box(smooth_points(black_box(outline), 5, 20.0, 1.0)));
        });

        group.bench_with_input(BenchmarkId::new("rdp", points), &outline, |b, outline| {
            b.iter(|| black_box(ramer_douglas_peucker(black_box(outline), 0.6).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_optimizer, bench_outline);
criterion_main!(benches);
