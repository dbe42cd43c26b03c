//! Minimum weight triangulation by dynamic programming
//!
//! Chooses, among all triangulations using only polygon diagonals, the one with
//! the smallest total diagonal length. Runs in O(n^3) time and O(n^2) memory.

use super::{ccw_order, ccw_triangle, in_cone, segments_touch, EarClipping, Triangulator};
use pixmesh_core::{Error, Point2d, Result};
use std::collections::VecDeque;

/// Polygons larger than this are handed to ear clipping
pub const DEFAULT_MAX_OPTIMAL_VERTICES: usize = 500;

#[derive(Debug, Clone, Copy)]
struct DpState {
    visible: bool,
    weight: f64,
    best: Option<usize>,
}

impl Default for DpState {
    fn default() -> Self {
        Self { visible: true, weight: 0.0, best: None }
    }
}

/// Dense upper triangle of DP states, indexed by `(i, j)` with `i < j`
struct DpTable {
    n: usize,
    states: Vec<DpState>,
}

impl DpTable {
    fn new(n: usize) -> Self {
        Self { n, states: vec![DpState::default(); n * n] }
    }

    fn get(&self, i: usize, j: usize) -> &DpState {
        &self.states[i * self.n + j]
    }

    fn get_mut(&mut self, i: usize, j: usize) -> &mut DpState {
        &mut self.states[i * self.n + j]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Optimal {
    pub max_vertices: usize,
}

impl Default for Optimal {
    fn default() -> Self {
        Self { max_vertices: DEFAULT_MAX_OPTIMAL_VERTICES }
    }
}

impl Optimal {
    pub fn new(max_vertices: usize) -> Self {
        Self { max_vertices }
    }

    fn is_diagonal(points: &[Point2d], i: usize, j: usize) -> bool {
        let n = points.len();
        let (pi, pj) = (&points[i], &points[j]);
        if !in_cone(&points[(i + n - 1) % n], pi, &points[(i + 1) % n], pj) {
            return false;
        }
        if !in_cone(&points[(j + n - 1) % n], pj, &points[(j + 1) % n], pi) {
            return false;
        }
        !(0..n).any(|k| segments_touch(pi, pj, &points[k], &points[(k + 1) % n]))
    }

    /// Triangles as positions into `points`, which must be counter-clockwise
    fn solve(points: &[Point2d]) -> Result<Vec<[usize; 3]>> {
        let n = points.len();
        let mut table = DpTable::new(n);

        for i in 0..n - 1 {
            for j in i + 2..n {
                table.get_mut(i, j).visible = Self::is_diagonal(points, i, j);
            }
        }
        table.get_mut(0, n - 1).visible = true;

        for gap in 2..n {
            for i in 0..n - gap {
                let j = i + gap;
                if !table.get(i, j).visible {
                    continue;
                }

                let mut best: Option<(usize, f64)> = None;
                for k in i + 1..j {
                    if !table.get(i, k).visible || !table.get(k, j).visible {
                        continue;
                    }
                    let d1 = if k <= i + 1 { 0.0 } else { (points[k] - points[i]).norm() };
                    let d2 = if j <= k + 1 { 0.0 } else { (points[j] - points[k]).norm() };
                    let weight = table.get(i, k).weight + table.get(k, j).weight + d1 + d2;
                    if best.map_or(true, |(_, min)| weight < min) {
                        best = Some((k, weight));
                    }
                }

                let Some((k, weight)) = best else {
                    return Err(Error::Triangulation(format!("no triangle closes diagonal ({}, {})", i, j)));
                };
                let state = table.get_mut(i, j);
                state.best = Some(k);
                state.weight = weight;
            }
        }

        let mut triangles = Vec::with_capacity(n - 2);
        let mut diagonals = VecDeque::from([(0, n - 1)]);
        while let Some((i, j)) = diagonals.pop_front() {
            let Some(k) = table.get(i, j).best else {
                continue;
            };
            triangles.push(ccw_triangle(points, [i, k, j]));
            if k > i + 1 {
                diagonals.push_back((i, k));
            }
            if j > k + 1 {
                diagonals.push_back((k, j));
            }
        }
        Ok(triangles)
    }
}

impl Triangulator for Optimal {
    fn name(&self) -> &'static str {
        "optimal"
    }

    fn triangulate(&self, polygon: &[Point2d]) -> Result<Vec<[usize; 3]>> {
        if polygon.len() < 3 {
            return Ok(Vec::new());
        }
        if polygon.len() > self.max_vertices {
            log::warn!(
                "optimal triangulation: {} vertices exceed the limit of {}, using ear clipping",
                polygon.len(),
                self.max_vertices
            );
            return EarClipping.triangulate(polygon);
        }

        let order = ccw_order(polygon);
        let points: Vec<Point2d> = order.iter().map(|&i| polygon[i]).collect();
        match Self::solve(&points) {
            Ok(triangles) => Ok(triangles.into_iter().map(|t| t.map(|k| order[k])).collect()),
            Err(e) => {
                log::warn!("optimal triangulation failed ({}), using ear clipping", e);
                EarClipping.triangulate(polygon)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::Triangulation;
    use approx::assert_relative_eq;
    use pixmesh_algorithms::is_left;

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    fn diagonal_length(points: &[Point2d], triangles: &[[usize; 3]]) -> f64 {
        let n = points.len();
        let mut total = 0.0;
        for t in triangles {
            for e in 0..3 {
                let (a, b) = (t[e], t[(e + 1) % 3]);
                let adjacent = (a + 1) % n == b || (b + 1) % n == a;
                if !adjacent {
                    total += (points[a] - points[b]).norm();
                }
            }
        }
        // every diagonal is shared by two triangles
        total / 2.0
    }

    #[test]
    fn test_square() {
        let square = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let triangles = Optimal::default().triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        assert_relative_eq!(Triangulation::new(square, triangles).area(), 1.0);
    }

    #[test]
    fn test_picks_shorter_diagonal() {
        // a flat rhombus: the horizontal diagonal is 8 long, the vertical one 2
        let rhombus = vec![p(-4.0, 0.0), p(0.0, -1.0), p(4.0, 0.0), p(0.0, 1.0)];
        let triangles = Optimal::default().triangulate(&rhombus).unwrap();
        assert_relative_eq!(diagonal_length(&rhombus, &triangles), 2.0);
    }

    #[test]
    fn test_beats_or_matches_ear_clipping() {
        let polygon: Vec<Point2d> = (0..12)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 12.0;
                let radius = if i % 2 == 0 { 10.0 } else { 6.0 };
                p(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        let optimal = Optimal::default().triangulate(&polygon).unwrap();
        let ears = EarClipping.triangulate(&polygon).unwrap();
        assert_eq!(optimal.len(), 10);
        assert!(diagonal_length(&polygon, &optimal) <= diagonal_length(&polygon, &ears) + 1e-9);
        for t in &optimal {
            let [a, b, c] = t.map(|i| polygon[i]);
            assert!(is_left(&a, &b, &c) > 0.0);
        }
    }

    #[test]
    fn test_large_polygon_falls_back() {
        let polygon: Vec<Point2d> = (0..40)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 40.0;
                p(angle.cos(), angle.sin())
            })
            .collect();
        let triangles = Optimal::new(8).triangulate(&polygon).unwrap();
        assert_eq!(triangles.len(), 38);
    }
}
