//! Polygon triangulation
//!
//! Three interchangeable strategies behind the [`Triangulator`] trait, plus hole
//! bridging. Every strategy accepts simple polygons of either winding and
//! returns counter-clockwise triangles (positive signed area).

pub mod ear_clipping;
pub mod holes;
pub mod monotone;
pub mod optimal;

pub use ear_clipping::EarClipping;
pub use holes::remove_holes;
pub use monotone::Monotone;
pub use optimal::Optimal;

use pixmesh_algorithms::is_left;
use pixmesh_core::{signed_area, Point2d, Result, TriangulationMethod};

/// A triangle list over its own point buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub points: Vec<Point2d>,
    /// Counter-clockwise index triples into `points`
    pub triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn new(points: Vec<Point2d>, triangles: Vec<[usize; 3]>) -> Self {
        Self { points, triangles }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle_points(&self, triangle: [usize; 3]) -> [Point2d; 3] {
        triangle.map(|i| self.points[i])
    }

    /// Sum of all triangle areas
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|&t| {
                let [a, b, c] = self.triangle_points(t);
                is_left(&a, &b, &c).abs() * 0.5
            })
            .sum()
    }
}

/// Splits a simple polygon into triangles
pub trait Triangulator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Triangulates a simple polygon without holes.
    ///
    /// Fewer than 3 points give an empty list. Indices refer to `polygon`.
    fn triangulate(&self, polygon: &[Point2d]) -> Result<Vec<[usize; 3]>>;

    /// Triangulates a polygon with holes.
    ///
    /// Holes are bridged into the outer boundary with [`remove_holes`] first,
    /// so the returned points are the bridged polygon.
    fn triangulate_with_holes(&self, outer: &[Point2d], holes: &[Vec<Point2d>]) -> Result<Triangulation> {
        let holes: Vec<&[Point2d]> = holes.iter().filter(|h| h.len() >= 3).map(Vec::as_slice).collect();
        if outer.len() < 3 {
            return Ok(Triangulation::default());
        }
        if holes.is_empty() {
            return Ok(Triangulation::new(outer.to_vec(), self.triangulate(outer)?));
        }

        let merged = remove_holes(outer, &holes)?;
        let triangles = self.triangulate(&merged)?;
        Ok(Triangulation::new(merged, triangles))
    }
}

/// The triangulator implementing `method`
pub fn triangulator_for(method: TriangulationMethod) -> Box<dyn Triangulator> {
    match method {
        TriangulationMethod::EarClipping => Box::new(EarClipping),
        TriangulationMethod::Optimal => Box::new(Optimal::default()),
        TriangulationMethod::Monotone => Box::new(Monotone),
    }
}

// ============================================================
// Shared predicates
// ============================================================

/// Positions of `polygon` in counter-clockwise order
pub(crate) fn ccw_order(polygon: &[Point2d]) -> Vec<usize> {
    if signed_area(polygon) < 0.0 {
        (0..polygon.len()).rev().collect()
    } else {
        (0..polygon.len()).collect()
    }
}

/// Strict left turn at `p2`
#[inline]
pub(crate) fn is_convex(p1: &Point2d, p2: &Point2d, p3: &Point2d) -> bool {
    is_left(p1, p2, p3) > 0.0
}

/// True if `p` lies inside the cone spanned at `p2` by the edges to `p1` and `p3`,
/// with the polygon interior on the left of `p1 -> p2 -> p3`
pub(crate) fn in_cone(p1: &Point2d, p2: &Point2d, p3: &Point2d, p: &Point2d) -> bool {
    if is_convex(p1, p2, p3) {
        is_convex(p1, p2, p) && is_convex(p2, p3, p)
    } else {
        is_convex(p1, p2, p) || is_convex(p2, p3, p)
    }
}

/// Closed segment intersection test that ignores segments sharing an endpoint.
///
/// Touching counts as intersecting.
pub(crate) fn segments_touch(p11: &Point2d, p12: &Point2d, p21: &Point2d, p22: &Point2d) -> bool {
    if p11 == p21 || p11 == p22 || p12 == p21 || p12 == p22 {
        return false;
    }

    let ortho1 = Point2d::new(p12.y - p11.y, p11.x - p12.x).coords;
    let ortho2 = Point2d::new(p22.y - p21.y, p21.x - p22.x).coords;

    let dot21 = (p21 - p11).dot(&ortho1);
    let dot22 = (p22 - p11).dot(&ortho1);
    let dot11 = (p11 - p21).dot(&ortho2);
    let dot12 = (p12 - p21).dot(&ortho2);

    !(dot11 * dot12 > 0.0 || dot21 * dot22 > 0.0)
}

/// Reorders a triangle to counter-clockwise if needed
pub(crate) fn ccw_triangle(points: &[Point2d], [a, b, c]: [usize; 3]) -> [usize; 3] {
    if is_left(&points[a], &points[b], &points[c]) < 0.0 {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixmesh_core::area;

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    /// Comb shaped polygon with four teeth, counter-clockwise
    pub(crate) fn comb() -> Vec<Point2d> {
        let mut outline = vec![p(0.0, 0.0), p(40.0, 0.0), p(40.0, 20.0)];
        for tooth in (0..4).rev() {
            let x = tooth as f64 * 10.0;
            outline.push(p(x + 8.0, 20.0));
            outline.push(p(x + 8.0, 8.0));
            outline.push(p(x + 2.0, 8.0));
            outline.push(p(x + 2.0, 20.0));
        }
        outline.push(p(0.0, 20.0));
        outline
    }

    fn all_methods() -> Vec<Box<dyn Triangulator>> {
        [TriangulationMethod::EarClipping, TriangulationMethod::Optimal, TriangulationMethod::Monotone]
            .into_iter()
            .map(triangulator_for)
            .collect()
    }

    #[test]
    fn test_predicates() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));
        assert!(is_convex(&a, &b, &c));
        assert!(!is_convex(&a, &c, &b));

        assert!(segments_touch(&a, &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0)));
        assert!(segments_touch(&a, &p(2.0, 0.0), &p(1.0, 0.0), &p(1.0, 5.0)));
        assert!(!segments_touch(&a, &b, &b, &c));
    }

    #[test]
    fn test_in_cone_reflex_vertex() {
        // reflex corner of an L shape at (1, 1)
        let (prev, corner, next) = (p(2.0, 1.0), p(1.0, 1.0), p(1.0, 2.0));
        assert!(in_cone(&prev, &corner, &next, &p(0.0, 0.0)));
        assert!(!in_cone(&prev, &corner, &next, &p(2.0, 2.0)));
    }

    #[test]
    fn test_every_method_conserves_area() {
        let square = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        let shapes = vec![square.clone(), square.iter().rev().copied().collect(), comb()];

        for method in all_methods() {
            for shape in &shapes {
                let triangles = method.triangulate(shape).unwrap();
                // zero area slivers may be dropped, never added
                assert!(triangles.len() <= shape.len() - 2, "{}", method.name());
                let triangulation = Triangulation::new(shape.clone(), triangles);
                assert_relative_eq!(triangulation.area(), area(shape), epsilon = 1e-9);
                for &t in &triangulation.triangles {
                    let [a, b, c] = triangulation.triangle_points(t);
                    assert!(is_left(&a, &b, &c) > 0.0, "{} produced a clockwise triangle", method.name());
                }
            }
        }
    }

    #[test]
    fn test_every_method_handles_rectangular_hole() {
        let outer = vec![p(0.0, 0.0), p(20.0, 0.0), p(20.0, 20.0), p(0.0, 20.0)];
        let hole = vec![p(5.0, 5.0), p(5.0, 12.0), p(14.0, 12.0), p(14.0, 5.0)];

        for method in all_methods() {
            let triangulation = method.triangulate_with_holes(&outer, &[hole.clone()]).unwrap();
            assert_relative_eq!(triangulation.area(), 400.0 - 63.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_input_is_empty() {
        for method in all_methods() {
            assert!(method.triangulate(&[p(0.0, 0.0), p(1.0, 1.0)]).unwrap().is_empty());
            assert!(method.triangulate_with_holes(&[], &[]).unwrap().is_empty());
        }
    }
}
