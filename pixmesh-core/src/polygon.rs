//! Outline polygons and winding orientation
//!
//! Polygons are implicitly closed point lists. Orientation follows the sign of
//! the shoelace sum computed on the raw coordinates: positive is counter-clockwise.

use crate::point::{FuzzyEq, Point2d};
use serde::{Deserialize, Serialize};

/// An implicitly closed outline
pub type Polygon = Vec<Point2d>;

/// Winding orientation of a point list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    /// Zero signed area: collinear or degenerate input
    LineSegment,
}

/// Signed area by the shoelace formula, positive for counter-clockwise
pub fn signed_area(points: &[Point2d]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Absolute enclosed area
pub fn area(points: &[Point2d]) -> f64 {
    signed_area(points).abs()
}

pub fn find_winding_orientation(points: &[Point2d]) -> Winding {
    let s = signed_area(points);
    if s > 0.0 {
        Winding::CounterClockwise
    } else if s < 0.0 {
        Winding::Clockwise
    } else {
        Winding::LineSegment
    }
}

/// Reverses `points` in place when it does not already wind as `desired`.
///
/// Degenerate lists with zero area are left untouched.
pub fn ensure_winding_orientation(points: &mut [Point2d], desired: Winding) {
    let current = find_winding_orientation(points);
    if current != Winding::LineSegment && desired != Winding::LineSegment && current != desired {
        points.reverse();
    }
}

/// Owned variant of [`ensure_winding_orientation`]
pub fn normalize_winding(mut points: Polygon, desired: Winding) -> Polygon {
    ensure_winding_orientation(&mut points, desired);
    points
}

/// Drops consecutive duplicates, including a closing point equal to the first
pub fn dedup_points(points: &mut Polygon) {
    points.dedup_by(|b, a| a.fuzzy_eq(b));
    while points.len() > 1 && points[0].fuzzy_eq(&points[points.len() - 1]) {
        points.pop();
    }
}

/// Axis aligned bounds as (min, max)
pub fn bounds(points: &[Point2d]) -> Option<(Point2d, Point2d)> {
    let first = points.first()?;
    Some(points.iter().fold((*first, *first), |(lo, hi), p| {
        (
            Point2d::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point2d::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}
