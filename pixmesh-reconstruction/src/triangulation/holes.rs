//! Hole bridging
//!
//! Turns a polygon with holes into one weakly simple polygon by cutting a
//! zero width channel from each hole to the outer boundary. The channel
//! endpoints appear twice in the result.

use super::{in_cone, segments_touch};
use pixmesh_core::{normalize_winding, Error, Point2d, Result, Vector2d, Winding};

/// Merges `holes` into `outer`.
///
/// Holes are processed rightmost first. Each hole's rightmost vertex is
/// connected to a visible outer vertex further right, preferring the most
/// horizontal connection.
///
/// # Arguments
/// * `outer` - Outer boundary, either winding
/// * `holes` - Hole boundaries, either winding; holes with fewer than 3 points are ignored
///
/// # Returns
/// * `Vec<Point2d>` - Counter-clockwise polygon with `outer.len() + sum(hole.len() + 2)` points
///
/// # Errors
/// * `Error::Triangulation` - A hole has no visible outer vertex to its right
pub fn remove_holes(outer: &[Point2d], holes: &[&[Point2d]]) -> Result<Vec<Point2d>> {
    let mut polygon = normalize_winding(outer.to_vec(), Winding::CounterClockwise);
    let mut remaining: Vec<Vec<Point2d>> = holes
        .iter()
        .filter(|hole| hole.len() >= 3)
        .map(|hole| normalize_winding(hole.to_vec(), Winding::Clockwise))
        .collect();

    while !remaining.is_empty() {
        let (hole_index, hole_vertex) = rightmost_hole_vertex(&remaining);
        let hole = remaining.swap_remove(hole_index);
        let hole_point = hole[hole_vertex];

        let bridge = find_bridge(&polygon, &remaining, &hole_point).ok_or_else(|| {
            Error::Triangulation(format!(
                "no visible boundary vertex for hole point ({:.2}, {:.2})",
                hole_point.x, hole_point.y
            ))
        })?;

        let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
        merged.extend_from_slice(&polygon[..=bridge]);
        merged.extend_from_slice(&hole[hole_vertex..]);
        merged.extend_from_slice(&hole[..=hole_vertex]);
        merged.extend_from_slice(&polygon[bridge..]);
        polygon = merged;
    }

    Ok(polygon)
}

fn rightmost_hole_vertex(holes: &[Vec<Point2d>]) -> (usize, usize) {
    let mut best = (0, 0);
    for (h, hole) in holes.iter().enumerate() {
        for (k, point) in hole.iter().enumerate() {
            if point.x > holes[best.0][best.1].x {
                best = (h, k);
            }
        }
    }
    best
}

fn find_bridge(polygon: &[Point2d], holes: &[Vec<Point2d>], hole_point: &Point2d) -> Option<usize> {
    let n = polygon.len();
    let mut best: Option<(usize, Vector2d)> = None;

    for i in 0..n {
        let candidate = &polygon[i];
        if candidate.x <= hole_point.x {
            continue;
        }
        if !in_cone(&polygon[(i + n - 1) % n], candidate, &polygon[(i + 1) % n], hole_point) {
            continue;
        }

        let direction = (candidate - hole_point).normalize();
        if let Some((_, best_direction)) = best {
            if best_direction.x > direction.x {
                continue;
            }
        }

        let blocked = rings(polygon, holes).any(|ring| {
            (0..ring.len()).any(|k| segments_touch(hole_point, candidate, &ring[k], &ring[(k + 1) % ring.len()]))
        });
        if !blocked {
            best = Some((i, direction));
        }
    }

    best.map(|(i, _)| i)
}

fn rings<'a>(polygon: &'a [Point2d], holes: &'a [Vec<Point2d>]) -> impl Iterator<Item = &'a [Point2d]> {
    std::iter::once(polygon).chain(holes.iter().map(Vec::as_slice))
}
