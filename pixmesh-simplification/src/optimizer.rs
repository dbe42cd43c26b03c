//! Full GPU buffer optimization pass and cache statistics

use crate::overdraw::{optimize_overdraw, DEFAULT_OVERDRAW_THRESHOLD};
use crate::remap::{generate_vertex_remap, remap_index_buffer, remap_vertex_buffer};
use crate::vertex_cache::optimize_vertex_cache;
use crate::vertex_fetch::optimize_vertex_fetch;
use crate::MeshOptimizer;
use pixmesh_core::{Mesh, Result};
use serde::{Deserialize, Serialize};

/// FIFO cache size assumed by [`MeshStatistics::analyze`]
pub const STATISTICS_CACHE_SIZE: u32 = 16;

/// Timestamp based FIFO vertex cache simulation
pub(crate) struct FifoCache {
    timestamps: Vec<u32>,
    timestamp: u32,
    size: u32,
}

impl FifoCache {
    pub fn new(vertex_count: usize, size: u32) -> Self {
        Self { timestamps: vec![0; vertex_count], timestamp: size + 1, size }
    }

    /// Evicts everything
    pub fn flush(&mut self) {
        self.timestamp += self.size + 1;
    }

    /// Returns true on a miss
    pub fn access(&mut self, vertex: u32) -> bool {
        let stamp = &mut self.timestamps[vertex as usize];
        if self.timestamp - *stamp > self.size {
            *stamp = self.timestamp;
            self.timestamp += 1;
            true
        } else {
            false
        }
    }

    /// Number of misses for one triangle
    pub fn access_triangle(&mut self, corners: &[u32]) -> u32 {
        corners.iter().map(|&v| self.access(v) as u32).sum()
    }
}

/// Average cache miss ratio (misses per triangle) of an index buffer
pub fn analyze_vertex_cache(indices: &[u32], vertex_count: usize, cache_size: u32) -> f32 {
    let triangle_count = indices.len() / 3;
    if triangle_count == 0 {
        return 0.0;
    }
    let mut cache = FifoCache::new(vertex_count, cache_size);
    let misses: u32 = indices.chunks_exact(3).map(|t| cache.access_triangle(t)).sum();
    misses as f32 / triangle_count as f32
}

/// Vertex cache efficiency of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshStatistics {
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Average cache miss ratio: transformed vertices per triangle, 0.5 at best, 3.0 at worst
    pub acmr: f32,
    /// Average transform to vertex ratio: 1.0 means every vertex is transformed once
    pub atvr: f32,
}

impl MeshStatistics {
    pub fn analyze(mesh: &Mesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let triangle_count = mesh.triangle_count();
        let acmr = analyze_vertex_cache(&mesh.indices, vertex_count, STATISTICS_CACHE_SIZE);
        let atvr = if vertex_count == 0 {
            0.0
        } else {
            acmr * triangle_count as f32 / vertex_count as f32
        };
        Self { vertex_count, triangle_count, acmr, atvr }
    }
}

/// Remap, vertex cache, overdraw and vertex fetch optimization in one pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpuMeshOptimizer {
    /// How much cache efficiency overdraw sorting may give up, see [`optimize_overdraw`]
    pub overdraw_threshold: f32,
}

impl Default for GpuMeshOptimizer {
    fn default() -> Self {
        Self { overdraw_threshold: DEFAULT_OVERDRAW_THRESHOLD }
    }
}

impl GpuMeshOptimizer {
    pub fn new(overdraw_threshold: f32) -> Self {
        Self { overdraw_threshold }
    }
}

impl MeshOptimizer for GpuMeshOptimizer {
    fn optimize(&self, mesh: &Mesh) -> Result<Mesh> {
        mesh.validate()?;
        if mesh.indices.is_empty() {
            return Ok(Mesh::new());
        }

        let (remap, unique) = generate_vertex_remap(&mesh.vertices, &mesh.indices);
        let indices = remap_index_buffer(&mesh.indices, &remap);
        let vertices = remap_vertex_buffer(&mesh.vertices, unique, &remap);

        let indices = optimize_vertex_cache(&indices, vertices.len());
        let indices = optimize_overdraw(&indices, &vertices, self.overdraw_threshold);
        let (vertices, indices) = optimize_vertex_fetch(&vertices, &indices);

        log::debug!(
            "optimized mesh: {} -> {} vertices, {} triangles",
            mesh.vertex_count(),
            vertices.len(),
            indices.len() / 3
        );
        Ok(Mesh { vertices, indices })
    }
}

/// Optimizes a mesh with the default overdraw threshold.
///
/// A mesh without indices comes back empty.
///
/// # Errors
/// * `Error::InvalidData` - The index buffer breaks the triangle list invariants
pub fn optimize_mesh(mesh: &Mesh) -> Result<Mesh> {
    GpuMeshOptimizer::default().optimize(mesh)
}
