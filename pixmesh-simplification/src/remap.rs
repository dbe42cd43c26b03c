//! Vertex deduplication
//!
//! Vertices are compared by the raw bits of every attribute, so only exact
//! duplicates merge. Two vertices that differ only in their barycentric corner
//! stay apart.

use pixmesh_core::Vertex;
use std::collections::HashMap;

/// Marks a vertex no index refers to
pub const UNUSED: u32 = u32::MAX;

/// Builds a table mapping every vertex to its deduplicated slot.
///
/// Slots are handed out in order of first reference in `indices`. Vertices
/// nothing refers to map to [`UNUSED`].
///
/// # Returns
/// * `(Vec<u32>, usize)` - Remap table with one entry per input vertex, and
///   the number of unique vertices
pub fn generate_vertex_remap(vertices: &[Vertex], indices: &[u32]) -> (Vec<u32>, usize) {
    let mut remap = vec![UNUSED; vertices.len()];
    let mut seen: HashMap<[u32; 11], u32> = HashMap::with_capacity(vertices.len());
    let mut unique = 0u32;

    for &index in indices {
        let slot = &mut remap[index as usize];
        if *slot != UNUSED {
            continue;
        }
        *slot = *seen.entry(vertices[index as usize].to_bits()).or_insert_with(|| {
            unique += 1;
            unique - 1
        });
    }

    (remap, unique as usize)
}

/// Rewrites an index buffer through a remap table
pub fn remap_index_buffer(indices: &[u32], remap: &[u32]) -> Vec<u32> {
    indices.iter().map(|&i| remap[i as usize]).collect()
}

/// Gathers vertices into their remapped slots, dropping unused ones
pub fn remap_vertex_buffer(vertices: &[Vertex], unique_count: usize, remap: &[u32]) -> Vec<Vertex> {
    let mut remapped = vec![Vertex::default(); unique_count];
    for (vertex, &slot) in vertices.iter().zip(remap) {
        if slot != UNUSED {
            remapped[slot as usize] = *vertex;
        }
    }
    remapped
}
