//! Point types and related functionality

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A 2D pixel coordinate
pub type Point2i = Point2<i32>;

/// A 2D point with double precision coordinates, used for outline geometry
pub type Point2d = Point2<f64>;

/// A 2D vector with double precision components
pub type Vector2d = Vector2<f64>;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 2D vector with floating point components
pub type Vector2f = Vector2<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Tolerance used when comparing floating point coordinates
pub const FUZZY_EPSILON: f64 = 0.00001;

/// Returns true if `a` is within [`FUZZY_EPSILON`] of `b`
#[inline]
pub fn fuzzy_compare(a: f64, b: f64) -> bool {
    (a - b).abs() <= FUZZY_EPSILON
}

/// Fuzzy equality for floating point outline coordinates
pub trait FuzzyEq {
    fn fuzzy_eq(&self, other: &Self) -> bool;
}

impl FuzzyEq for Point2d {
    fn fuzzy_eq(&self, other: &Self) -> bool {
        fuzzy_compare(self.x, other.x) && fuzzy_compare(self.y, other.y)
    }
}

/// Converts a pixel coordinate into a geometric point
#[inline]
pub fn to_point2d(p: Point2i) -> Point2d {
    Point2d::new(p.x as f64, p.y as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_equality() {
        let a = Point2d::new(1.0, 2.0);
        assert!(a.fuzzy_eq(&Point2d::new(1.000001, 1.999999)));
        assert!(!a.fuzzy_eq(&Point2d::new(1.001, 2.0)));
    }

    #[test]
    fn test_pixel_to_point() {
        let p = to_point2d(Point2i::new(-3, 7));
        assert_eq!(p, Point2d::new(-3.0, 7.0));
    }
}
