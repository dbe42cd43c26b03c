//! Ear clipping triangulation backed by earcutr

use super::{ccw_triangle, Triangulator};
use earcutr::earcut;
use pixmesh_algorithms::is_left;
use pixmesh_core::{area, Error, Point2d, Result, FUZZY_EPSILON};

/// Relative area mismatch above which an ear clipping result is rejected
const AREA_TOLERANCE: f64 = 1e-6;

/// Z-order ear clipping over the flattened outline.
///
/// Polygons bridged by [`super::remove_holes`] are accepted. Zero area
/// triangles are dropped, and a result that does not cover the polygon's area
/// is reported as a failure so callers can fall back.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarClipping;

impl Triangulator for EarClipping {
    fn name(&self) -> &'static str {
        "ear clipping"
    }

    fn triangulate(&self, polygon: &[Point2d]) -> Result<Vec<[usize; 3]>> {
        let n = polygon.len();
        if n < 3 {
            return Ok(Vec::new());
        }

        let coords: Vec<f64> = polygon.iter().flat_map(|p| [p.x, p.y]).collect();
        let indices = earcut(&coords, &[], 2)
            .map_err(|_| Error::Triangulation(format!("earcut rejected a {} point outline", n)))?;
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i >= n) {
            return Err(Error::Triangulation(format!(
                "earcut returned {} indices for a {} point outline",
                indices.len(),
                n
            )));
        }

        let triangles: Vec<[usize; 3]> = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .filter(|t| {
                let [a, b, c] = t.map(|i| polygon[i]);
                is_left(&a, &b, &c).abs() > FUZZY_EPSILON
            })
            .map(|t| ccw_triangle(polygon, t))
            .collect();

        let expected = area(polygon);
        let covered: f64 = triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| polygon[i]);
                is_left(&a, &b, &c) * 0.5
            })
            .sum();
        if (covered - expected).abs() > AREA_TOLERANCE * expected.max(1.0) {
            return Err(Error::Triangulation(format!(
                "ear clipping covered {:.3} of {:.3} square units",
                covered, expected
            )));
        }

        Ok(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::{remove_holes, Triangulation};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn test_square() {
        let square = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let triangles = EarClipping.triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        assert_relative_eq!(Triangulation::new(square, triangles).area(), 1.0);
    }

    #[test]
    fn test_clockwise_input_maps_back() {
        let square = vec![p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 0.0)];
        let triangles = EarClipping.triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        for t in &triangles {
            assert!(t.iter().all(|&i| i < 4));
            let [a, b, c] = t.map(|i| square[i]);
            assert!(is_left(&a, &b, &c) > 0.0);
        }
    }

    #[test]
    fn test_collinear_vertices_dropped() {
        // square with midpoints on every side
        let outline = vec![
            p(0.0, 0.0),
            p(5.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 5.0),
            p(10.0, 10.0),
            p(5.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 5.0),
        ];
        let triangles = EarClipping.triangulate(&outline).unwrap();
        let triangulation = Triangulation::new(outline.clone(), triangles);
        assert_relative_eq!(triangulation.area(), area(&outline), epsilon = 1e-9);
        for &t in &triangulation.triangles {
            let [a, b, c] = triangulation.triangle_points(t);
            assert!(is_left(&a, &b, &c) > 0.0);
        }
    }

    #[test]
    fn test_reflex_l_shape() {
        let outline = vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 1.0), p(1.0, 1.0), p(1.0, 2.0), p(0.0, 2.0)];
        let triangles = EarClipping.triangulate(&outline).unwrap();
        assert_eq!(triangles.len(), 4);
        assert_relative_eq!(Triangulation::new(outline, triangles).area(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bridged_polygon() {
        let outer = vec![p(0.0, 0.0), p(30.0, 0.0), p(30.0, 30.0), p(0.0, 30.0)];
        let left = vec![p(5.0, 5.0), p(5.0, 25.0), p(12.0, 25.0), p(12.0, 5.0)];
        let right = vec![p(18.0, 5.0), p(18.0, 25.0), p(25.0, 25.0), p(25.0, 5.0)];
        let merged = remove_holes(&outer, &[&left, &right]).unwrap();

        let triangles = EarClipping.triangulate(&merged).unwrap();
        assert_relative_eq!(Triangulation::new(merged, triangles).area(), 900.0 - 2.0 * 140.0, epsilon = 1e-9);
    }
}
