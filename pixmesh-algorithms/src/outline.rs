//! Outline tracing
//!
//! Walks the border pixels of an object bitmap (transparent = background) and
//! emits them as an ordered polygon. The walk is greedy: from each pixel it
//! turns clockwise from the direction it came from and takes the first border
//! pixel it meets, so the same bitmap always yields the same outline.

use pixmesh_core::{Bitmap, Color, Point2d, Point2i};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BorderState {
    NotBorder,
    Start,
    NotProcessed,
    ProcessedOnce,
    ProcessedTwice,
}

/// Compass angle in degrees from `center` to `target`, 0 pointing to -y and
/// increasing clockwise on screen
pub fn rotation_angle_degrees(center: Point2i, target: Point2i) -> f64 {
    let dx = (target.x - center.x) as f64;
    let dy = (target.y - center.y) as f64;
    let mut angle = dy.atan2(dx).to_degrees() + 90.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Neighbor offsets in column-major scan order
const NEIGHBORS: [(i32, i32); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

struct BorderMap {
    width: usize,
    height: usize,
    states: Vec<BorderState>,
}

impl BorderMap {
    fn classify(bitmap: &Bitmap) -> (Self, usize) {
        let (width, height) = (bitmap.width, bitmap.height);
        let mut states = vec![BorderState::NotBorder; width * height];
        let mut border_count = 0;

        for y in 0..height {
            for x in 0..width {
                if bitmap.pixel(x, y) == Color::TRANSPARENT {
                    continue;
                }
                let on_edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let touches_background = on_edge
                    || NEIGHBORS.iter().any(|&(dx, dy)| {
                        bitmap.pixel((x as i32 + dx) as usize, (y as i32 + dy) as usize) == Color::TRANSPARENT
                    });
                if touches_background {
                    states[y * width + x] = BorderState::NotProcessed;
                    border_count += 1;
                }
            }
        }
        (Self { width, height, states }, border_count)
    }

    fn get(&self, p: Point2i) -> Option<BorderState> {
        if p.x < 0 || p.y < 0 || p.x as usize >= self.width || p.y as usize >= self.height {
            return None;
        }
        Some(self.states[p.y as usize * self.width + p.x as usize])
    }

    fn set(&mut self, p: Point2i, state: BorderState) {
        self.states[p.y as usize * self.width + p.x as usize] = state;
    }

    /// First border pixel in column-major order
    fn first_border(&self) -> Option<Point2i> {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| Point2i::new(x as i32, y as i32)))
            .find(|&p| self.get(p) == Some(BorderState::NotProcessed))
    }
}

/// Traces the outline of the non-transparent pixels in `bitmap`.
///
/// The start pixel is the first border pixel in a column-major scan; the pixel
/// to its left acts as the initial predecessor. Pixels may be visited twice at
/// most, and the walk ends on returning to the start or when no eligible
/// neighbor is left. The start pixel is repeated as the last point when the
/// walk closes.
///
/// # Returns
/// * `Vec<Point2d>` - Pixel coordinates in `bitmap`; empty if fewer than 3 border pixels exist
pub fn trace_outline(bitmap: &Bitmap) -> Vec<Point2d> {
    if bitmap.is_empty() {
        return Vec::new();
    }

    let (mut border, border_count) = BorderMap::classify(bitmap);
    if border_count < 3 {
        return Vec::new();
    }
    let Some(start) = border.first_border() else {
        return Vec::new();
    };
    border.set(start, BorderState::Start);

    let mut points = vec![start];
    let mut current = start;
    let mut last = Point2i::new(start.x - 1, start.y);
    let max_steps = border_count * 2 + 2;

    for _ in 0..max_steps {
        let last_angle = rotation_angle_degrees(current, last);

        let mut best: Option<(Point2i, f64)> = None;
        for &(dx, dy) in &NEIGHBORS {
            let candidate = Point2i::new(current.x + dx, current.y + dy);
            match border.get(candidate) {
                None | Some(BorderState::NotBorder) | Some(BorderState::ProcessedTwice) => continue,
                _ => {}
            }

            let mut check = rotation_angle_degrees(current, candidate);
            while check > 0.0 {
                check -= 360.0;
            }
            while check <= last_angle {
                check += 360.0;
            }
            let diff = check - last_angle;
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((candidate, diff));
            }
        }

        let Some((next, _)) = best else {
            break;
        };

        match border.get(current) {
            Some(BorderState::NotProcessed) => border.set(current, BorderState::ProcessedOnce),
            Some(BorderState::ProcessedOnce) => border.set(current, BorderState::ProcessedTwice),
            _ => {}
        }

        points.push(next);
        last = current;
        current = next;

        if border.get(next) == Some(BorderState::Start) {
            break;
        }
    }

    points.into_iter().map(|p| Point2d::new(p.x as f64, p.y as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixmesh_core::signed_area;

    fn square_bitmap(size: usize, margin: usize) -> Bitmap {
        let total = size + margin * 2;
        let mut bitmap = Bitmap::new(total, total);
        for y in margin..margin + size {
            for x in margin..margin + size {
                bitmap.set_pixel(x, y, Color::RED);
            }
        }
        bitmap
    }

    #[test]
    fn test_rotation_angle_compass() {
        let c = Point2i::new(5, 5);
        assert_relative_eq!(rotation_angle_degrees(c, Point2i::new(5, 4)), 0.0);
        assert_relative_eq!(rotation_angle_degrees(c, Point2i::new(6, 5)), 90.0);
        assert_relative_eq!(rotation_angle_degrees(c, Point2i::new(5, 6)), 180.0);
        assert_relative_eq!(rotation_angle_degrees(c, Point2i::new(4, 5)), 270.0);
    }

    #[test]
    fn test_trace_square_closes_on_start() {
        let outline = trace_outline(&square_bitmap(20, 1));
        assert_eq!(outline.first(), outline.last());
        assert_eq!(outline[0], Point2d::new(1.0, 1.0));
        assert_eq!(outline.len(), 4 * 19 + 1);
        assert_relative_eq!(signed_area(&outline[..outline.len() - 1]), 19.0 * 19.0);
    }

    #[test]
    fn test_trace_square_touching_edges() {
        let outline = trace_outline(&square_bitmap(6, 0));
        assert_eq!(outline.len(), 4 * 5 + 1);
        assert_eq!(outline[1], Point2d::new(1.0, 0.0));
    }

    #[test]
    fn test_trace_is_deterministic() {
        let mut bitmap = square_bitmap(12, 2);
        bitmap.set_pixel(8, 2, Color::TRANSPARENT);
        bitmap.set_pixel(2, 9, Color::TRANSPARENT);
        assert_eq!(trace_outline(&bitmap), trace_outline(&bitmap));
    }

    #[test]
    fn test_trace_tiny_inputs() {
        assert!(trace_outline(&Bitmap::new(0, 0)).is_empty());
        let mut two = Bitmap::new(4, 4);
        two.set_pixel(1, 1, Color::RED);
        two.set_pixel(2, 1, Color::RED);
        assert!(trace_outline(&two).is_empty());
    }
}
