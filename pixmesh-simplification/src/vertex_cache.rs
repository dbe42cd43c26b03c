//! Triangle reordering for post-transform vertex cache locality
//!
//! Greedy triangle ordering after Tom Forsyth's "Linear-Speed Vertex Cache
//! Optimisation". Each vertex is scored by its position in a simulated LRU
//! cache and by how many unemitted triangles still use it; the next triangle
//! emitted is the best scoring one touching the cache.

/// Simulated LRU cache size used for scoring
pub const CACHE_SIZE: usize = 32;

const CACHE_DECAY_POWER: f32 = 1.5;
const LAST_TRIANGLE_SCORE: f32 = 0.75;
const VALENCE_BOOST_SCALE: f32 = 2.0;
const VALENCE_BOOST_POWER: f32 = 0.5;

fn vertex_score(cache_position: Option<usize>, live_triangles: u32) -> f32 {
    if live_triangles == 0 {
        return -1.0;
    }

    let cache_score = match cache_position {
        None => 0.0,
        Some(position) if position < 3 => LAST_TRIANGLE_SCORE,
        Some(position) => {
            let scaler = 1.0 / (CACHE_SIZE - 3) as f32;
            (1.0 - (position - 3) as f32 * scaler).powf(CACHE_DECAY_POWER)
        }
    };
    cache_score + VALENCE_BOOST_SCALE * (live_triangles as f32).powf(-VALENCE_BOOST_POWER)
}

/// Triangles incident to each vertex, as a compressed adjacency list
pub(crate) struct TriangleAdjacency {
    pub counts: Vec<u32>,
    offsets: Vec<usize>,
    data: Vec<u32>,
}

impl TriangleAdjacency {
    pub fn build(indices: &[u32], vertex_count: usize) -> Self {
        let mut counts = vec![0u32; vertex_count];
        for &index in indices {
            counts[index as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut running = 0usize;
        for &count in &counts {
            offsets.push(running);
            running += count as usize;
        }
        offsets.push(running);

        let mut fill = offsets.clone();
        let mut data = vec![0u32; indices.len()];
        for (triangle, corners) in indices.chunks_exact(3).enumerate() {
            for &vertex in corners {
                data[fill[vertex as usize]] = triangle as u32;
                fill[vertex as usize] += 1;
            }
        }

        Self { counts, offsets, data }
    }

    pub fn triangles(&self, vertex: u32) -> &[u32] {
        let v = vertex as usize;
        &self.data[self.offsets[v]..self.offsets[v + 1]]
    }
}

/// Reorders triangles so consecutive triangles share vertices.
///
/// Only the triangle order changes; every triangle keeps its own corner order,
/// so winding is untouched.
///
/// # Arguments
/// * `indices` - Triangle list
/// * `vertex_count` - Number of vertices the indices refer to
///
/// # Returns
/// * `Vec<u32>` - The same triangles in cache friendly order
pub fn optimize_vertex_cache(indices: &[u32], vertex_count: usize) -> Vec<u32> {
    let triangle_count = indices.len() / 3;
    if triangle_count == 0 {
        return Vec::new();
    }

    let adjacency = TriangleAdjacency::build(indices, vertex_count);
    let mut live = adjacency.counts.clone();
    let mut cache_position: Vec<Option<usize>> = vec![None; vertex_count];
    let mut vertex_scores: Vec<f32> = live.iter().map(|&count| vertex_score(None, count)).collect();
    let mut triangle_scores: Vec<f32> = indices
        .chunks_exact(3)
        .map(|t| t.iter().map(|&v| vertex_scores[v as usize]).sum())
        .collect();
    let mut emitted = vec![false; triangle_count];

    let mut cache: Vec<u32> = Vec::with_capacity(CACHE_SIZE + 3);
    let mut next_cache: Vec<u32> = Vec::with_capacity(CACHE_SIZE + 3);
    let mut output = Vec::with_capacity(indices.len());
    let mut input_cursor = 0usize;

    let mut current = triangle_scores
        .iter()
        .enumerate()
        .fold((0usize, f32::MIN), |best, (t, &score)| if score > best.1 { (t, score) } else { best })
        .0;

    loop {
        let corners = &indices[current * 3..current * 3 + 3];
        output.extend_from_slice(corners);
        emitted[current] = true;
        for &v in corners {
            live[v as usize] -= 1;
        }

        next_cache.clear();
        for &v in corners.iter().chain(cache.iter()) {
            if !next_cache.contains(&v) {
                next_cache.push(v);
            }
        }

        for (position, &v) in next_cache.iter().enumerate() {
            cache_position[v as usize] = (position < CACHE_SIZE).then_some(position);

            let score = vertex_score(cache_position[v as usize], live[v as usize]);
            let delta = score - vertex_scores[v as usize];
            vertex_scores[v as usize] = score;
            for &t in adjacency.triangles(v) {
                if !emitted[t as usize] {
                    triangle_scores[t as usize] += delta;
                }
            }
        }
        next_cache.truncate(CACHE_SIZE);
        std::mem::swap(&mut cache, &mut next_cache);

        let mut best: Option<(usize, f32)> = None;
        for &v in &cache {
            for &t in adjacency.triangles(v) {
                let t = t as usize;
                if !emitted[t] && best.map_or(true, |(_, score)| triangle_scores[t] > score) {
                    best = Some((t, triangle_scores[t]));
                }
            }
        }

        current = match best {
            Some((t, _)) => t,
            None => {
                while input_cursor < triangle_count && emitted[input_cursor] {
                    input_cursor += 1;
                }
                if input_cursor == triangle_count {
                    break;
                }
                input_cursor
            }
        };
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::analyze_vertex_cache;

    /// Grid of quads with triangles emitted column by column, a poor order
    fn scrambled_grid(size: u32) -> Vec<u32> {
        let mut upper = Vec::new();
        let mut lower = Vec::new();
        for x in 0..size - 1 {
            for y in 0..size - 1 {
                let tl = y * size + x;
                let tr = tl + 1;
                let bl = tl + size;
                let br = bl + 1;
                upper.extend_from_slice(&[tl, bl, tr]);
                lower.extend_from_slice(&[tr, bl, br]);
            }
        }
        upper.extend(lower);
        upper
    }

    fn sorted_triangles(indices: &[u32]) -> Vec<[u32; 3]> {
        let mut triangles: Vec<[u32; 3]> = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
        triangles.sort();
        triangles
    }

    #[test]
    fn test_preserves_triangles_and_winding() {
        let indices = scrambled_grid(12);
        let optimized = optimize_vertex_cache(&indices, 144);
        assert_eq!(optimized.len(), indices.len());
        assert_eq!(sorted_triangles(&optimized), sorted_triangles(&indices));
    }

    #[test]
    fn test_improves_cache_misses() {
        let indices = scrambled_grid(24);
        let optimized = optimize_vertex_cache(&indices, 576);
        let before = analyze_vertex_cache(&indices, 576, 16);
        let after = analyze_vertex_cache(&optimized, 576, 16);
        assert!(after < before, "acmr {} -> {}", before, after);
    }

    #[test]
    fn test_disconnected_and_degenerate() {
        let indices = vec![0, 1, 2, 3, 4, 5, 6, 6, 7];
        let optimized = optimize_vertex_cache(&indices, 8);
        assert_eq!(sorted_triangles(&optimized), sorted_triangles(&indices));
        assert!(optimize_vertex_cache(&[], 0).is_empty());
    }
}
