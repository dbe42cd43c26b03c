//! Vertex buffer reordering for sequential fetch

use crate::remap::{remap_index_buffer, remap_vertex_buffer, UNUSED};
use pixmesh_core::Vertex;

/// Renumbers vertices in order of first use by the index buffer.
///
/// Vertices no index refers to are dropped.
///
/// # Returns
/// * `(Vec<Vertex>, Vec<u32>)` - Reordered vertices and the matching indices
pub fn optimize_vertex_fetch(vertices: &[Vertex], indices: &[u32]) -> (Vec<Vertex>, Vec<u32>) {
    let mut remap = vec![UNUSED; vertices.len()];
    let mut next = 0u32;
    for &index in indices {
        let slot = &mut remap[index as usize];
        if *slot == UNUSED {
            *slot = next;
            next += 1;
        }
    }

    (
        remap_vertex_buffer(vertices, next as usize, &remap),
        remap_index_buffer(indices, &remap),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixmesh_core::{Point3f, TriangleCorner, Vector2f, Vector3f};

    #[test]
    fn test_first_use_order() {
        let vertices: Vec<Vertex> = (0..5)
            .map(|i| Vertex::new(Point3f::new(i as f32, 0.0, 0.0), Vector3f::z(), Vector2f::zeros(), TriangleCorner::Point1))
            .collect();
        let (fetched, indices) = optimize_vertex_fetch(&vertices, &[4, 2, 3, 3, 2, 0]);
        assert_eq!(indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(fetched.len(), 4);
        assert_eq!(fetched[0], vertices[4]);
        assert_eq!(fetched[3], vertices[0]);
    }
}
