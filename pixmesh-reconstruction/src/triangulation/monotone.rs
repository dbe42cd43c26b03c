//! Monotone partition triangulation
//!
//! A sweep line from top to bottom inserts diagonals at split and merge
//! vertices, cutting the polygon into y-monotone pieces. Each piece is then
//! triangulated in linear time with a stack. Holes take part in the sweep
//! directly, no bridging needed. O(n log n) for the sort plus O(n k) for the
//! status scans, where k is the sweep width.

use super::{ccw_order, ccw_triangle, Triangulation, Triangulator};
use pixmesh_algorithms::is_left;
use pixmesh_core::{normalize_winding, Error, Point2d, Result, Winding, FUZZY_EPSILON};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexType {
    Start,
    End,
    Split,
    Merge,
    Regular,
}

/// Sweep order: higher y first, lower x first on equal y
fn compare_above(a: &Point2d, b: &Point2d) -> Ordering {
    b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x))
}

fn is_above(a: &Point2d, b: &Point2d) -> bool {
    compare_above(a, b) == Ordering::Less
}

/// X coordinate of segment `a b` at height `y`
fn x_at(a: &Point2d, b: &Point2d, y: f64) -> f64 {
    if a.y == b.y {
        a.x.min(b.x)
    } else {
        a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y)
    }
}

/// Closed rings flattened into one vertex list
struct Rings {
    points: Vec<Point2d>,
    prev: Vec<usize>,
    next: Vec<usize>,
}

impl Rings {
    fn new(rings: &[Vec<Point2d>]) -> Self {
        let total = rings.iter().map(Vec::len).sum();
        let mut points = Vec::with_capacity(total);
        let mut prev = Vec::with_capacity(total);
        let mut next = Vec::with_capacity(total);

        for ring in rings {
            let base = points.len();
            let n = ring.len();
            for i in 0..n {
                points.push(ring[i]);
                prev.push(base + (i + n - 1) % n);
                next.push(base + (i + 1) % n);
            }
        }
        Self { points, prev, next }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn classify(&self, v: usize) -> VertexType {
        let (p, c, n) = (&self.points[self.prev[v]], &self.points[v], &self.points[self.next[v]]);
        let convex = is_left(p, c, n) > 0.0;
        match (is_above(c, p), is_above(c, n)) {
            (true, true) if convex => VertexType::Start,
            (true, true) => VertexType::Split,
            (false, false) if convex => VertexType::End,
            (false, false) => VertexType::Merge,
            _ => VertexType::Regular,
        }
    }
}

/// Edge `upper -> next[upper]` crossing the sweep line, interior to its east
#[derive(Debug, Clone, Copy)]
struct StatusEdge {
    upper: usize,
    lower: usize,
    helper: usize,
}

struct Sweep<'a> {
    rings: &'a Rings,
    types: Vec<VertexType>,
    status: Vec<StatusEdge>,
    diagonals: Vec<(usize, usize)>,
}

impl<'a> Sweep<'a> {
    fn new(rings: &'a Rings) -> Self {
        let types = (0..rings.len()).map(|v| rings.classify(v)).collect();
        Self { rings, types, status: Vec::new(), diagonals: Vec::new() }
    }

    fn run(mut self) -> Result<Vec<(usize, usize)>> {
        let mut order: Vec<usize> = (0..self.rings.len()).collect();
        order.sort_by(|&a, &b| compare_above(&self.rings.points[a], &self.rings.points[b]));

        for v in order {
            match self.types[v] {
                VertexType::Start => self.insert_edge(v),
                VertexType::End => self.finish_edge(v)?,
                VertexType::Split => {
                    let j = self.edge_left_of(v)?;
                    self.add_diagonal(v, self.status[j].helper);
                    self.status[j].helper = v;
                    self.insert_edge(v);
                }
                VertexType::Merge => {
                    self.finish_edge(v)?;
                    self.update_left_helper(v)?;
                }
                VertexType::Regular => {
                    let prev = self.rings.prev[v];
                    if is_above(&self.rings.points[prev], &self.rings.points[v]) {
                        self.finish_edge(v)?;
                        self.insert_edge(v);
                    } else {
                        self.update_left_helper(v)?;
                    }
                }
            }
        }

        self.diagonals.sort_unstable();
        self.diagonals.dedup();
        Ok(self.diagonals)
    }

    fn insert_edge(&mut self, v: usize) {
        self.status.push(StatusEdge { upper: v, lower: self.rings.next[v], helper: v });
    }

    /// Removes the edge ending at `v`, connecting `v` to a merge vertex helper
    fn finish_edge(&mut self, v: usize) -> Result<()> {
        let prev = self.rings.prev[v];
        let position = self
            .status
            .iter()
            .position(|e| e.upper == prev)
            .ok_or_else(|| Error::Triangulation(format!("sweep lost the edge ending at vertex {}", v)))?;
        let edge = self.status.swap_remove(position);
        if self.types[edge.helper] == VertexType::Merge {
            self.add_diagonal(v, edge.helper);
        }
        Ok(())
    }

    fn update_left_helper(&mut self, v: usize) -> Result<()> {
        let j = self.edge_left_of(v)?;
        let helper = self.status[j].helper;
        if self.types[helper] == VertexType::Merge {
            self.add_diagonal(v, helper);
        }
        self.status[j].helper = v;
        Ok(())
    }

    /// The status edge nearest to the west of `v`
    fn edge_left_of(&self, v: usize) -> Result<usize> {
        let p = &self.rings.points[v];
        self.status
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let (a, b) = (&self.rings.points[e.upper], &self.rings.points[e.lower]);
                (is_left(a, b, p) >= 0.0).then(|| (i, x_at(a, b, p.y)))
            })
            .max_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(i, _)| i)
            .ok_or_else(|| Error::Triangulation(format!("no edge left of vertex {}", v)))
    }

    fn add_diagonal(&mut self, a: usize, b: usize) {
        let adjacent = self.rings.next[a] == b || self.rings.next[b] == a;
        if a != b && !adjacent {
            self.diagonals.push((a.min(b), a.max(b)));
        }
    }
}

/// Splits the rings along `diagonals` into faces, each counter-clockwise
fn monotone_faces(rings: &Rings, diagonals: &[(usize, usize)]) -> Result<Vec<Vec<usize>>> {
    let n = rings.len();
    let mut outgoing: Vec<Vec<usize>> = (0..n).map(|v| vec![rings.next[v]]).collect();
    for &(a, b) in diagonals {
        outgoing[a].push(b);
        outgoing[b].push(a);
    }
    let half_edges = n + diagonals.len() * 2;

    let next_half_edge = |u: usize, w: usize| -> usize {
        let back = rings.points[u] - rings.points[w];
        let back_angle = back.y.atan2(back.x);
        let clockwise_turn = |x: usize| {
            let out = rings.points[x] - rings.points[w];
            let turn = (back_angle - out.y.atan2(out.x)).rem_euclid(TAU);
            if turn == 0.0 {
                TAU
            } else {
                turn
            }
        };
        outgoing[w]
            .iter()
            .copied()
            .filter(|&x| x != u)
            .min_by(|&a, &b| clockwise_turn(a).total_cmp(&clockwise_turn(b)))
            .unwrap_or(u)
    };

    let mut used: HashSet<(usize, usize)> = HashSet::with_capacity(half_edges);
    let mut faces = Vec::new();
    for start in 0..n {
        for &first in &outgoing[start] {
            if used.contains(&(start, first)) {
                continue;
            }

            let mut face = Vec::new();
            let (mut u, mut w) = (start, first);
            loop {
                used.insert((u, w));
                face.push(u);
                let x = next_half_edge(u, w);
                (u, w) = (w, x);
                if (u, w) == (start, first) {
                    break;
                }
                if face.len() > half_edges {
                    return Err(Error::Triangulation("monotone face walk did not close".to_string()));
                }
            }
            faces.push(face);
        }
    }
    Ok(faces)
}

/// Stack triangulation of one y-monotone counter-clockwise face
fn triangulate_monotone_face(points: &[Point2d], face: &[usize], triangles: &mut Vec<[usize; 3]>) -> Result<()> {
    let m = face.len();
    if m < 3 {
        return Err(Error::Triangulation(format!("degenerate monotone face with {} vertices", m)));
    }

    let point = |k: usize| &points[face[k]];
    let mut emit = |a: usize, b: usize, c: usize| {
        let [pa, pb, pc] = [a, b, c].map(|k| points[face[k]]);
        if is_left(&pa, &pb, &pc).abs() > FUZZY_EPSILON {
            triangles.push(ccw_triangle(points, [face[a], face[b], face[c]]));
        }
    };

    let mut sorted: Vec<usize> = (0..m).collect();
    sorted.sort_by(|&a, &b| compare_above(point(a), point(b)));
    let (top, bottom) = (sorted[0], sorted[m - 1]);

    // walking forward from the top of a counter-clockwise face follows the west chain
    let mut on_left_chain = vec![false; m];
    let mut k = (top + 1) % m;
    while k != bottom {
        on_left_chain[k] = true;
        k = (k + 1) % m;
    }

    let mut stack = vec![sorted[0], sorted[1]];
    for i in 2..m - 1 {
        let v = sorted[i];
        let Some(&stack_top) = stack.last() else {
            break;
        };

        if on_left_chain[v] != on_left_chain[stack_top] {
            for pair in stack.windows(2) {
                emit(pair[0], pair[1], v);
            }
            stack = vec![sorted[i - 1], v];
        } else {
            let mut last = stack_top;
            stack.pop();
            while let Some(&t) = stack.last() {
                let turn = is_left(point(t), point(last), point(v));
                let inside = if on_left_chain[v] { turn > 0.0 } else { turn < 0.0 };
                if !inside {
                    break;
                }
                emit(t, last, v);
                last = t;
                stack.pop();
            }
            stack.push(last);
            stack.push(v);
        }
    }

    let v = sorted[m - 1];
    for pair in stack.windows(2) {
        emit(pair[0], pair[1], v);
    }
    Ok(())
}

fn triangulate_rings(rings: &[Vec<Point2d>]) -> Result<(Vec<Point2d>, Vec<[usize; 3]>)> {
    let rings = Rings::new(rings);
    let diagonals = Sweep::new(&rings).run()?;
    let faces = monotone_faces(&rings, &diagonals)?;

    let mut triangles = Vec::with_capacity(rings.len());
    for face in &faces {
        triangulate_monotone_face(&rings.points, face, &mut triangles)?;
    }
    log::trace!(
        "monotone: {} vertices, {} diagonals, {} pieces, {} triangles",
        rings.len(),
        diagonals.len(),
        faces.len(),
        triangles.len()
    );
    Ok((rings.points, triangles))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Monotone;

impl Triangulator for Monotone {
    fn name(&self) -> &'static str {
        "monotone"
    }

    fn triangulate(&self, polygon: &[Point2d]) -> Result<Vec<[usize; 3]>> {
        if polygon.len() < 3 {
            return Ok(Vec::new());
        }
        let order = ccw_order(polygon);
        let ring: Vec<Point2d> = order.iter().map(|&i| polygon[i]).collect();
        let (_, triangles) = triangulate_rings(&[ring])?;
        Ok(triangles.into_iter().map(|t| t.map(|k| order[k])).collect())
    }

    fn triangulate_with_holes(&self, outer: &[Point2d], holes: &[Vec<Point2d>]) -> Result<Triangulation> {
        if outer.len() < 3 {
            return Ok(Triangulation::default());
        }

        let mut rings = vec![normalize_winding(outer.to_vec(), Winding::CounterClockwise)];
        rings.extend(
            holes
                .iter()
                .filter(|hole| hole.len() >= 3)
                .map(|hole| normalize_winding(hole.clone(), Winding::Clockwise)),
        );
        let (points, triangles) = triangulate_rings(&rings)?;
        Ok(Triangulation::new(points, triangles))
    }
}
