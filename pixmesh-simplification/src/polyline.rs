//! Outline smoothing and decimation
//!
//! Three composable transforms over ordered point lists: corner preserving
//! neighbor averaging, Ramer-Douglas-Peucker decimation and midpoint insertion
//! on long runs.

use geo::{LineString, Simplify};
use pixmesh_core::{bounds, Error, Point2d, Result};

/// Corners whose two edges meet at or below this many degrees are never smoothed
pub const SHARP_ANGLE: f64 = 110.0;

/// Outlines smaller than this on a side get a proportionally shorter smoothing reach
pub const SMOOTH_MIN_SIZE: f64 = 50.0;

/// Segments longer than this receive a midpoint in [`insert_points`]
pub const INSERT_DISTANCE: f64 = 10.0;

/// [`insert_points`] leaves lists of this many points or fewer alone
pub const INSERT_MIN_POINTS: usize = 10;

/// Compass heading in degrees from `center` to `target`, 0 pointing to -y
fn heading_degrees(center: &Point2d, target: &Point2d) -> f64 {
    let mut angle = (target.y - center.y).atan2(target.x - center.x).to_degrees() + 90.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Smallest difference between two angles, in 0..=180 degrees
pub fn difference_between_angles(a: f64, b: f64) -> f64 {
    let a = a.rem_euclid(360.0);
    let b = b.rem_euclid(360.0);
    let diff = (a - b).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

#[inline]
fn wrap(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}

fn is_sharp(points: &[Point2d], i: isize) -> bool {
    let n = points.len();
    let p = &points[wrap(i, n)];
    let to_prev = heading_degrees(p, &points[wrap(i - 1, n)]);
    let to_next = heading_degrees(p, &points[wrap(i + 1, n)]);
    difference_between_angles(to_prev, to_next) <= SHARP_ANGLE
}

/// Smooths a closed outline by weighted neighbor averaging.
///
/// Sharp corners are kept as is. Every other point is averaged with up to
/// `neighbors` points on each side that lie closer than `neighbor_distance`,
/// each weighted by `weight / index distance`. The neighbor search stops at the
/// first sharp corner in each direction so corners are not rounded off.
/// Outlines under 50 units across get `neighbor_distance` scaled down in
/// proportion. Lists of `2 * neighbors` points or fewer are returned unchanged.
pub fn smooth_points(points: &[Point2d], neighbors: usize, neighbor_distance: f64, weight: f64) -> Vec<Point2d> {
    let Some((lo, hi)) = bounds(points) else {
        return Vec::new();
    };
    let mut neighbor_distance = neighbor_distance;
    let x_size = hi.x - lo.x;
    let y_size = hi.y - lo.y;
    if x_size < SMOOTH_MIN_SIZE {
        neighbor_distance /= SMOOTH_MIN_SIZE / x_size;
    } else if y_size < SMOOTH_MIN_SIZE {
        neighbor_distance /= SMOOTH_MIN_SIZE / y_size;
    }

    let n = points.len();
    if n <= neighbors * 2 {
        return points.to_vec();
    }

    let sharp: Vec<bool> = (0..n as isize).map(|i| is_sharp(points, i)).collect();
    let reach = neighbors as isize;

    (0..n as isize)
        .map(|i| {
            let this = points[i as usize];
            if sharp[i as usize] {
                return this;
            }

            let from = (1..=reach).map(|k| i - k).find(|&j| sharp[wrap(j, n)]).unwrap_or(i - reach);
            let to = (1..=reach).map(|k| i + k).find(|&j| sharp[wrap(j, n)]).unwrap_or(i + reach);

            let mut sum = this.coords;
            let mut total = 1.0;
            for j in (from..=to).filter(|&j| j != i) {
                let other = points[wrap(j, n)];
                if (other - this).norm() < neighbor_distance {
                    let w = weight / (j - i).unsigned_abs() as f64;
                    sum += other.coords * w;
                    total += w;
                }
            }
            Point2d::from(sum / total)
        })
        .collect()
}

/// Distance from `point` to the infinite line through `start` and `end`
pub fn perpendicular_distance(point: &Point2d, start: &Point2d, end: &Point2d) -> f64 {
    let mut direction = end - start;
    let magnitude = direction.norm();
    if magnitude > 0.0 {
        direction /= magnitude;
    }
    let offset = point - start;
    let projected = direction * offset.dot(&direction);
    (offset - projected).norm()
}

/// Ramer-Douglas-Peucker polyline decimation.
///
/// The endpoints are always kept. A point survives when it lies more than
/// `epsilon` from the chord of the span it splits, so a zero `epsilon` keeps
/// everything. Never returns more points than it was given.
///
/// # Errors
/// * `Error::Decimation` - Fewer than 2 input points, or a result with fewer
///   than 2 points
pub fn ramer_douglas_peucker(points: &[Point2d], epsilon: f64) -> Result<Vec<Point2d>> {
    if points.len() < 2 {
        return Err(Error::Decimation(format!(
            "need at least 2 points to simplify, got {}",
            points.len()
        )));
    }

    let line: LineString<f64> = points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>().into();
    let simplified: Vec<Point2d> = line
        .simplify(&epsilon)
        .into_inner()
        .into_iter()
        .map(|c| Point2d::new(c.x, c.y))
        .collect();

    if simplified.len() < 2 {
        return Err(Error::Decimation(format!(
            "{} points simplified down to {}",
            points.len(),
            simplified.len()
        )));
    }
    Ok(simplified)
}

/// Drops vertices at the wrap point of a closed outline that lie within
/// `epsilon` of the line joining their neighbors.
///
/// Decimating a closed outline as an open polyline keeps both endpoints even
/// when they sit in the middle of a straight run.
pub fn remove_seam_points(points: &mut Vec<Point2d>, epsilon: f64) {
    while points.len() > 3 {
        let n = points.len();
        if perpendicular_distance(&points[n - 1], &points[n - 2], &points[0]) <= epsilon {
            points.pop();
        } else if perpendicular_distance(&points[0], &points[n - 1], &points[1]) <= epsilon {
            points.remove(0);
        } else {
            break;
        }
    }
}

/// Inserts a midpoint between consecutive points more than 10 units apart.
///
/// Lists of 10 points or fewer are returned unchanged. The closing segment from
/// the last point back to the first is left alone.
pub fn insert_points(points: &[Point2d]) -> Vec<Point2d> {
    if points.len() <= INSERT_MIN_POINTS {
        return points.to_vec();
    }

    let mut inserted = Vec::with_capacity(points.len() * 2);
    inserted.push(points[0]);
    for pair in points.windows(2) {
        if (pair[1] - pair[0]).norm() > INSERT_DISTANCE {
            inserted.push(nalgebra::center(&pair[0], &pair[1]));
        }
        inserted.push(pair[1]);
    }
    inserted
}
