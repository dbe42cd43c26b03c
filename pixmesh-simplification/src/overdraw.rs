//! Triangle reordering for reduced overdraw
//!
//! The cache optimized sequence is cut into clusters: hard cuts wherever a
//! triangle misses the cache on all three corners, soft cuts wherever the
//! running cache efficiency is already within `threshold` of the cluster's.
//! Clusters facing away from the mesh center are drawn first so they occlude
//! the rest.

use crate::optimizer::FifoCache;
use pixmesh_core::{Point3f, Vector3f, Vertex};

/// Cache size the cluster boundaries are measured against
pub const OVERDRAW_CACHE_SIZE: u32 = 16;

/// Default tradeoff: clusters may be cut while their ACMR stays within 5% of the
/// cluster's whole-run ACMR
pub const DEFAULT_OVERDRAW_THRESHOLD: f32 = 1.05;

fn hard_boundaries(indices: &[u32], vertex_count: usize) -> Vec<usize> {
    let mut cache = FifoCache::new(vertex_count, OVERDRAW_CACHE_SIZE);
    let mut boundaries = Vec::new();
    for (i, triangle) in indices.chunks_exact(3).enumerate() {
        let misses = cache.access_triangle(triangle);
        if i == 0 || misses == 3 {
            boundaries.push(i);
        }
    }
    boundaries
}

fn soft_boundaries(indices: &[u32], vertex_count: usize, hard: &[usize], threshold: f32) -> Vec<usize> {
    let triangle_count = indices.len() / 3;
    let mut cache = FifoCache::new(vertex_count, OVERDRAW_CACHE_SIZE);
    let mut boundaries = Vec::with_capacity(hard.len());

    for (k, &start) in hard.iter().enumerate() {
        let end = hard.get(k + 1).copied().unwrap_or(triangle_count);
        let cluster = &indices[start * 3..end * 3];

        cache.flush();
        let cluster_misses: u32 = cluster.chunks_exact(3).map(|t| cache.access_triangle(t)).sum();
        let cluster_threshold = threshold * cluster_misses as f32 / (end - start) as f32;

        boundaries.push(start);
        cache.flush();
        let mut running_misses = 0u32;
        let mut running_triangles = 0u32;
        for (offset, triangle) in cluster.chunks_exact(3).enumerate() {
            running_misses += cache.access_triangle(triangle);
            running_triangles += 1;
            if running_misses as f32 / running_triangles as f32 <= cluster_threshold {
                boundaries.push(start + offset + 1);
                cache.flush();
                running_misses = 0;
                running_triangles = 0;
            }
        }

        // the trailing piece rarely reaches the target, fold it into the previous one
        if boundaries.len() > 1 && boundaries.last().is_some_and(|&last| last > start) {
            boundaries.pop();
        }
    }
    boundaries
}

fn cluster_sort_keys(indices: &[u32], positions: &[Point3f], clusters: &[usize]) -> Vec<f32> {
    let mesh_centroid = indices.iter().fold(Vector3f::zeros(), |acc, &i| acc + positions[i as usize].coords)
        / indices.len() as f32;

    clusters
        .iter()
        .enumerate()
        .map(|(k, &start)| {
            let end = clusters.get(k + 1).map_or(indices.len(), |&next| next * 3);
            let mut area = 0.0f32;
            let mut centroid = Vector3f::zeros();
            let mut normal = Vector3f::zeros();

            for triangle in indices[start * 3..end].chunks_exact(3) {
                let [p0, p1, p2] = [0, 1, 2].map(|c| positions[triangle[c] as usize]);
                let n = (p1 - p0).cross(&(p2 - p0));
                let a = n.norm();
                centroid += (p0.coords + p1.coords + p2.coords) * (a / 3.0);
                normal += n;
                area += a;
            }

            if area > 0.0 {
                centroid /= area;
            }
            let normal = normal.try_normalize(0.0).unwrap_or_else(Vector3f::zeros);
            (centroid - mesh_centroid).dot(&normal)
        })
        .collect()
}

/// Reorders triangles to reduce overdraw while keeping most of the vertex
/// cache efficiency of the input order.
///
/// Run after [`crate::optimize_vertex_cache`]. `threshold` of 1.0 keeps
/// clusters at the input's cache efficiency; larger values allow smaller
/// clusters and better sorting at some cache cost.
pub fn optimize_overdraw(indices: &[u32], vertices: &[Vertex], threshold: f32) -> Vec<u32> {
    if indices.len() < 3 {
        return indices.to_vec();
    }

    let positions: Vec<Point3f> = vertices.iter().map(|v| v.position).collect();
    let hard = hard_boundaries(indices, vertices.len());
    let clusters = soft_boundaries(indices, vertices.len(), &hard, threshold);
    let keys = cluster_sort_keys(indices, &positions, &clusters);

    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| keys[b].total_cmp(&keys[a]));

    let mut output = Vec::with_capacity(indices.len());
    for k in order {
        let start = clusters[k] * 3;
        let end = clusters.get(k + 1).map_or(indices.len(), |&next| next * 3);
        output.extend_from_slice(&indices[start..end]);
    }
    output
}
