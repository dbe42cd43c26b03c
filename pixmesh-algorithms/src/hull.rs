//! Convex and concave hulls of 2D point sets
//!
//! A standalone geometry tool for hand supplied point clouds. Traced image
//! outlines do not go through here.

use itertools::Itertools;
use pixmesh_core::{FuzzyEq, Point2d};
use std::cmp::Ordering;

/// Cross product of `p1 - p0` and `p2 - p0`.
///
/// Positive when `p2` lies left of the directed line `p0 -> p1`, negative when
/// right, zero when collinear.
#[inline]
pub fn is_left(p0: &Point2d, p1: &Point2d, p2: &Point2d) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// True if the open segments `p1 p2` and `p3 p4` cross at an interior point of both
pub fn segments_intersect(p1: &Point2d, p2: &Point2d, p3: &Point2d, p4: &Point2d) -> bool {
    let d1 = p2 - p1;
    let d2 = p4 - p3;
    let denominator = d1.x * d2.y - d1.y * d2.x;
    if denominator == 0.0 {
        return false;
    }
    let offset = p3 - p1;
    let s = (offset.x * d2.y - offset.y * d2.x) / denominator;
    let t = (offset.x * d1.y - offset.y * d1.x) / denominator;
    s > 0.0 && s < 1.0 && t > 0.0 && t < 1.0
}

/// Shortest distance from `point` to the closed segment `start end`
pub fn point_segment_distance(point: &Point2d, start: &Point2d, end: &Point2d) -> f64 {
    let segment = end - start;
    let length_squared = segment.norm_squared();
    if length_squared == 0.0 {
        return (point - start).norm();
    }
    let t = ((point - start).dot(&segment) / length_squared).clamp(0.0, 1.0);
    (point - (start + segment * t)).norm()
}

/// Even-odd ray casting containment test
pub fn is_point_inside_polygon(point: &Point2d, polygon: &[Point2d]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (&polygon[i], &polygon[j]);
        if (a.y > point.y) != (b.y > point.y) && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Lexicographic x then y, a total order even for NaN
fn compare_points(a: &Point2d, b: &Point2d) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Sorts exactly, then merges runs of near-duplicates
fn sorted_distinct(points: impl Iterator<Item = Point2d>) -> Vec<Point2d> {
    let mut sorted: Vec<Point2d> = points.sorted_by(compare_points).collect();
    sorted.dedup_by(|a, b| a.fuzzy_eq(b));
    sorted
}

/// Convex hull by Andrew's monotone chain.
///
/// Points are sorted by x then y, and lower and upper chains are built with a
/// left turn test. Collinear points are dropped.
///
/// # Returns
/// * `Vec<Point2d>` - Hull vertices, counter-clockwise, not closed. Inputs with
///   fewer than 3 distinct points are returned deduplicated.
pub fn convex_hull(points: &[Point2d]) -> Vec<Point2d> {
    let sorted = sorted_distinct(points.iter().copied());
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2d> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && is_left(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2d> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && is_left(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn crosses_hull(hull: &[Point2d], skip_edge: usize, a: &Point2d, b: &Point2d) -> bool {
    let n = hull.len();
    (0..n)
        .filter(|&j| j != skip_edge)
        .any(|j| segments_intersect(a, b, &hull[j], &hull[(j + 1) % n]))
}

/// Concave hull by digging into a convex hull.
///
/// For every hull edge the nearest inner point is found, skipping points that
/// lie closer to some other edge. It is inserted between the edge's endpoints
/// when `edge length / distance to the nearer endpoint > threshold` and neither
/// new edge crosses the hull. Larger thresholds give smoother, more convex hulls.
pub fn concave_hull(points: &[Point2d], threshold: f64) -> Vec<Point2d> {
    let mut hull = convex_hull(points);
    if hull.len() < 3 {
        return hull;
    }

    let mut inner = sorted_distinct(points.iter().filter(|p| !hull.iter().any(|h| h.fuzzy_eq(p))).copied());

    let mut i = 0;
    while i < hull.len() {
        let n = hull.len();
        let a = hull[i];
        let b = hull[(i + 1) % n];

        let mut nearest: Option<(usize, f64)> = None;
        for (k, p) in inner.iter().enumerate() {
            let d = point_segment_distance(p, &a, &b);
            if nearest.is_some_and(|(_, best)| d >= best) {
                continue;
            }
            let closer_elsewhere = (0..n)
                .filter(|&j| j != i)
                .any(|j| point_segment_distance(p, &hull[j], &hull[(j + 1) % n]) < d);
            if !closer_elsewhere {
                nearest = Some((k, d));
            }
        }

        if let Some((k, _)) = nearest {
            let p = inner[k];
            let edge_length = (b - a).norm();
            let decision = (p - a).norm().min((p - b).norm());
            if decision > 0.0
                && edge_length / decision > threshold
                && !crosses_hull(&hull, i, &a, &p)
                && !crosses_hull(&hull, i, &p, &b)
            {
                hull.insert(i + 1, p);
                inner.remove(k);
                continue;
            }
        }
        i += 1;
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixmesh_core::{find_winding_orientation, signed_area, Winding};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn test_is_left_sign() {
        assert!(is_left(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0)) > 0.0);
        assert!(is_left(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, -1.0)) < 0.0);
        assert_eq!(is_left(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(1.0, 1.0), &p(1.0, 1.0), &p(2.0, 0.0)));
        assert!(!segments_intersect(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0), &p(1.0, 1.0)));
    }

    #[test]
    fn test_point_segment_distance() {
        assert_relative_eq!(point_segment_distance(&p(1.0, 1.0), &p(0.0, 0.0), &p(2.0, 0.0)), 1.0);
        assert_relative_eq!(point_segment_distance(&p(4.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0)), 2.0);
        assert_relative_eq!(point_segment_distance(&p(3.0, 4.0), &p(0.0, 0.0), &p(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_point_inside_polygon() {
        let square = vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)];
        assert!(is_point_inside_polygon(&p(2.0, 2.0), &square));
        assert!(!is_point_inside_polygon(&p(5.0, 2.0), &square));
    }

    #[test]
    fn test_convex_hull_square_with_interior() {
        let points = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(1.0, 0.0), p(0.5, 1.5)];
        let hull = convex_hull(&points);
        assert_eq!(hull, vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)]);
        assert_eq!(find_winding_orientation(&hull), Winding::CounterClockwise);
    }

    #[test]
    fn test_convex_hull_degenerate() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[p(1.0, 1.0), p(1.0, 1.0)]).len(), 1);
    }

    #[test]
    fn test_convex_hull_merges_near_duplicates() {
        let jitter = 1e-12;
        let mut points = vec![p(0.0, 0.0), p(jitter, 0.0), p(0.0, jitter), p(jitter, jitter)];
        points.extend([p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0), p(2.0, 2.0)]);
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert_eq!(hull[0], p(0.0, 0.0));
        assert_eq!(find_winding_orientation(&hull), Winding::CounterClockwise);
    }

    #[test]
    fn test_convex_hull_jittered_grid() {
        // many points within fuzzy distance of their neighbours in sort order
        let mut rng = StdRng::seed_from_u64(11);
        let points: Vec<Point2d> = (0..2000)
            .map(|i| {
                let (x, y) = ((i % 10) as f64, (i / 10 % 10) as f64);
                p(x + rng.gen_range(-1e-12..1e-12), y + rng.gen_range(-1e-12..1e-12))
            })
            .collect();
        let hull = convex_hull(&points);
        assert_eq!(find_winding_orientation(&hull), Winding::CounterClockwise);
        assert_relative_eq!(signed_area(&hull), 81.0, epsilon = 1e-6);
    }

    #[test]
    fn test_concave_hull_digs_into_notch() {
        let points = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(5.0, 9.0), p(0.0, 10.0), p(5.0, 5.0)];
        let convex = convex_hull(&points);
        let concave = concave_hull(&points, 1.5);
        assert_eq!(convex.len(), 4);
        assert!(concave.contains(&p(5.0, 9.0)));
        assert!(signed_area(&concave) < signed_area(&convex));
    }

    #[test]
    fn test_concave_hull_contains_random_points() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point2d> = (0..200).map(|_| p(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))).collect();
        let hull = concave_hull(&points, 2.0);
        assert!(hull.len() >= convex_hull(&points).len());
        assert_eq!(find_winding_orientation(&hull), Winding::CounterClockwise);
        for (i, a) in hull.iter().enumerate() {
            let b = hull[(i + 1) % hull.len()];
            for j in 0..hull.len() {
                if j != i {
                    assert!(!segments_intersect(a, &b, &hull[j], &hull[(j + 1) % hull.len()]));
                }
            }
        }
    }
}
