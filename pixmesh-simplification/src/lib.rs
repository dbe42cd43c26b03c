//! Outline simplification and mesh optimization for pixmesh
//!
//! This crate provides the two "make it smaller" stages of the pipeline:
//! - Corner preserving outline smoothing, Douglas-Peucker decimation and
//!   midpoint insertion on traced outlines
//! - GPU buffer optimization: vertex deduplication, vertex cache ordering,
//!   overdraw ordering and vertex fetch ordering

pub mod optimizer;
pub mod overdraw;
pub mod polyline;
pub mod remap;
pub mod vertex_cache;
pub mod vertex_fetch;

pub use optimizer::*;
pub use overdraw::*;
pub use polyline::*;
pub use remap::*;
pub use vertex_cache::*;
pub use vertex_fetch::*;

use pixmesh_core::{Mesh, Result};

/// Rewrite a mesh's buffers for faster rendering without changing what is drawn
pub trait MeshOptimizer {
    /// Returns a mesh with the same triangles (positions, attributes and winding)
    fn optimize(&self, mesh: &Mesh) -> Result<Mesh>;
}
