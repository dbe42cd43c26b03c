//! Integer pixel rectangles

use crate::point::{Point2d, Point2i};
use serde::{Deserialize, Serialize};

/// A pixel rectangle.
///
/// A negative `width` or `height` anchors the rectangle at its far edge, so
/// `left`/`right`/`top`/`bottom` are always derived rather than stored. In pixel
/// semantics `right == left + |width| - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two inclusive corner pixels
    pub fn from_corners(top_left: Point2i, bottom_right: Point2i) -> Self {
        Self {
            x: top_left.x,
            y: top_left.y,
            width: bottom_right.x - top_left.x + 1,
            height: bottom_right.y - top_left.y + 1,
        }
    }

    pub fn left(&self) -> i32 {
        if self.width > 0 { self.x } else { self.x + self.width + 1 }
    }

    pub fn right(&self) -> i32 {
        if self.width > 0 { self.x + self.width - 1 } else { self.x }
    }

    pub fn top(&self) -> i32 {
        if self.height > 0 { self.y } else { self.y + self.height + 1 }
    }

    pub fn bottom(&self) -> i32 {
        if self.height > 0 { self.y + self.height - 1 } else { self.y }
    }

    pub fn top_left(&self) -> Point2i {
        Point2i::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point2i {
        Point2i::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point2i {
        Point2i::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point2i {
        Point2i::new(self.right(), self.bottom())
    }

    /// True when the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Moves each edge outward (negative) or inward (positive) by the given amounts
    pub fn adjust(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.x += left;
        self.width -= left;
        self.y += top;
        self.height -= top;
        self.width += right;
        self.height += bottom;
    }

    /// Copy of this rectangle with [`Rect::adjust`] applied
    pub fn adjusted(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.adjust(left, top, right, bottom);
        self
    }

    /// Strict containment test, edges excluded
    pub fn contains_interior(&self, point: Point2i) -> bool {
        point.x > self.left() && point.x < self.right() && point.y > self.top() && point.y < self.bottom()
    }

    pub fn contains(&self, point: Point2i) -> bool {
        point.x >= self.left() && point.x <= self.right() && point.y >= self.top() && point.y <= self.bottom()
    }

    /// Intersection with another rectangle, `None` if they do not overlap
    pub fn intersected(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::from_corners(Point2i::new(left, top), Point2i::new(right, bottom)))
    }

    /// The four corner pixels as a polygon: top left, top right, bottom right, bottom left
    pub fn to_polygon(&self) -> Vec<Point2d> {
        [self.top_left(), self.top_right(), self.bottom_right(), self.bottom_left()]
            .iter()
            .map(|p| Point2d::new(p.x as f64, p.y as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_positive_size() {
        let r = Rect::new(10, 20, 5, 3);
        assert_eq!(r.left(), 10);
        assert_eq!(r.right(), 14);
        assert_eq!(r.top(), 20);
        assert_eq!(r.bottom(), 22);
    }

    #[test]
    fn test_edges_negative_size() {
        let r = Rect::new(14, 22, -5, -3);
        assert_eq!(r.left(), 10);
        assert_eq!(r.right(), 14);
        assert_eq!(r.top(), 20);
        assert_eq!(r.bottom(), 22);
    }

    #[test]
    fn test_adjust_grows_by_one_pixel() {
        let r = Rect::new(10, 10, 20, 20).adjusted(-1, -1, 1, 1);
        assert_eq!(r, Rect::new(9, 9, 22, 22));
    }

    #[test]
    fn test_intersected() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 10, 10);
        assert_eq!(a.intersected(&b), Some(Rect::new(5, 0, 5, 5)));
        assert_eq!(a.intersected(&Rect::new(20, 20, 2, 2)), None);
    }

    #[test]
    fn test_to_polygon_order() {
        let poly = Rect::new(0, 0, 4, 3).to_polygon();
        assert_eq!(poly[0], Point2d::new(0.0, 0.0));
        assert_eq!(poly[1], Point2d::new(3.0, 0.0));
        assert_eq!(poly[2], Point2d::new(3.0, 2.0));
        assert_eq!(poly[3], Point2d::new(0.0, 2.0));
    }
}
