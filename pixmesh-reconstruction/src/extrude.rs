//! Extrusion of 2D outlines into closed triangle meshes
//!
//! Image outlines live in pixel space: origin top left, y down. The builder maps
//! them into a centered, y-up mesh space where the image spans
//! `[-w/2, w/2] x [-h/2, h/2]`, front caps sit at `z = +depth` and back caps
//! at `z = -depth`. Every emitted triangle owns its three vertices, so flat
//! normals and barycentric corners stay per face; the optimizer welds them later.

use crate::triangulation::Triangulation;
use pixmesh_core::{
    FuzzyEq, Mesh, Point2, Point2d, Point3f, Rotation3, TriangleCorner, Vector2f, Vector3f, EXTRUDE_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// A point in centered mesh space
pub type Point2f = Point2<f32>;

/// Half depth of [`Primitive::Cube`] relative to its size
pub const CUBE_DEPTH: f32 = 0.5;

/// Maps pixel coordinates of one image into mesh space and UV space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSpace {
    pub width: f64,
    pub height: f64,
}

impl ImageSpace {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width: width as f64, height: height as f64 }
    }

    /// Centered, y-up position
    pub fn to_mesh(&self, p: &Point2d) -> Point2f {
        Point2f::new((p.x - self.width / 2.0) as f32, (self.height / 2.0 - p.y) as f32)
    }

    /// Texture coordinate, `u = x / w`, `v = y / h`
    pub fn to_uv(&self, p: &Point2d) -> Vector2f {
        Vector2f::new((p.x / self.width) as f32, (p.y / self.height) as f32)
    }

    /// Wall position: [`ImageSpace::to_mesh`] moved by `1 / w` along x and
    /// `1 / h` along y, subtracted on the far half of UV space and added on the
    /// near half. Walls then sit just off the texture seam while their UVs keep
    /// the exact pixel mapping of the caps.
    pub fn to_wall(&self, p: &Point2d) -> Point2f {
        let mesh = self.to_mesh(p);
        let uv = self.to_uv(p);
        let (pixel_w, pixel_h) = ((1.0 / self.width) as f32, (1.0 / self.height) as f32);
        Point2f::new(
            if uv.x > 0.5 { mesh.x - pixel_w } else { mesh.x + pixel_w },
            if uv.y > 0.5 { mesh.y - pixel_h } else { mesh.y + pixel_h },
        )
    }
}

/// Fixed topology meshes, centered at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// Two sided square in the XY plane
    Quad,
    Cube,
    /// Square based pyramid pointing up +Y
    Cone,
}

impl Primitive {
    pub fn build(self, size: f32) -> Mesh {
        let mut builder = MeshBuilder::new();
        match self {
            Primitive::Quad => builder.add_quad(size),
            Primitive::Cube => builder.add_cube(size),
            Primitive::Cone => builder.add_cone(size),
        }
        builder.into_mesh()
    }
}

/// Accumulates unshared triangles into a [`Mesh`]
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self { mesh: Mesh::new() }
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self { mesh: Mesh::with_capacity(triangles) }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Emits one triangle; corners get `Point1..Point3` in the order given
    pub fn triangle(&mut self, positions: [Point3f; 3], normal: Vector3f, uvs: [Vector2f; 3]) {
        for ((position, uv), corner) in positions.into_iter().zip(uvs).zip(TriangleCorner::ALL) {
            self.mesh.add(position, normal, uv, corner);
        }
    }

    /// Emits one triangle with the normal of its own counter-clockwise face
    pub fn faceted_triangle(&mut self, positions: [Point3f; 3], uvs: [Vector2f; 3]) {
        let [a, b, c] = positions;
        let normal = (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3f::zeros);
        self.triangle(positions, normal, uvs);
    }

    /// Front and back caps of a triangulated outline.
    ///
    /// Triangles must be counter-clockwise in pixel space; the y flip into mesh
    /// space turns them, so the front cap swaps two corners to face +Z.
    pub fn add_caps(&mut self, triangulation: &Triangulation, space: &ImageSpace, depth: f32) {
        for &triangle in &triangulation.triangles {
            let points = triangulation.triangle_points(triangle);
            let [a, b, c] = points.map(|p| space.to_mesh(&p));
            let [ua, ub, uc] = points.map(|p| space.to_uv(&p));

            self.triangle(
                [at_depth(&a, depth), at_depth(&c, depth), at_depth(&b, depth)],
                Vector3f::z(),
                [ua, uc, ub],
            );
            self.triangle(
                [at_depth(&a, -depth), at_depth(&b, -depth), at_depth(&c, -depth)],
                -Vector3f::z(),
                [ua, ub, uc],
            );
        }
    }

    /// Side wall ribbon for the edge `p1 -> p2`.
    ///
    /// Emits `2 * steps` triangles stepping from `z = +depth` down to
    /// `z = -depth`. Each quad is faceted, its normal taken from its own
    /// geometry. For outlines clockwise in mesh space the normals point outward.
    ///
    /// # Arguments
    /// * `p1`, `p2` - Edge endpoints in mesh space
    /// * `uv1`, `uv2` - Texture coordinates shared by every step
    /// * `steps` - Number of depth slices, at least 1
    /// * `depth` - Cap offset along Z
    pub fn extrude_edge(&mut self, p1: Point2f, p2: Point2f, uv1: Vector2f, uv2: Vector2f, steps: usize, depth: f32) {
        let steps = steps.max(1);
        let z_at = |i: usize| {
            if i == steps {
                -depth
            } else {
                depth - 2.0 * depth * i as f32 / steps as f32
            }
        };

        for i in 0..steps {
            let (front, back) = (z_at(i), z_at(i + 1));
            let p1f = Point3f::new(p1.x, p1.y, front);
            let p1b = Point3f::new(p1.x, p1.y, back);
            let p2f = Point3f::new(p2.x, p2.y, front);
            let p2b = Point3f::new(p2.x, p2.y, back);

            self.faceted_triangle([p1f, p1b, p2f], [uv1, uv1, uv2]);
            self.faceted_triangle([p2f, p1b, p2b], [uv2, uv1, uv2]);
        }
    }

    /// Side walls for every edge of a closed pixel space outline.
    ///
    /// Outer outlines (counter-clockwise in pixel space) and holes (clockwise)
    /// both get walls facing away from the solid with `reverse == false`.
    /// Zero length edges are skipped; fewer than 3 points emit nothing.
    pub fn extrude_closed_polygon(
        &mut self,
        points: &[Point2d],
        space: &ImageSpace,
        steps: usize,
        depth: f32,
        reverse: bool,
    ) {
        let n = points.len();
        if n < 3 {
            return;
        }

        for i in 0..n {
            let (mut from, mut to) = (points[(i + 1) % n], points[i]);
            if reverse {
                std::mem::swap(&mut from, &mut to);
            }
            if from.fuzzy_eq(&to) {
                continue;
            }
            self.extrude_edge(
                space.to_wall(&from),
                space.to_wall(&to),
                space.to_uv(&from),
                space.to_uv(&to),
                steps,
                depth,
            );
        }
    }

    /// Two sided square of side `size` in the XY plane
    pub fn add_quad(&mut self, size: f32) {
        self.add_quad_pair(size, 0.0, &Rotation3::identity());
    }

    /// Cube of side `size`, built from three rotated front/back quad pairs
    pub fn add_cube(&mut self, size: f32) {
        let half_depth = size * CUBE_DEPTH;
        let quarter_y = Rotation3::from_axis_angle(&Vector3f::y_axis(), FRAC_PI_2);
        let quarter_x = Rotation3::from_axis_angle(&Vector3f::x_axis(), FRAC_PI_2);

        for rotation in [Rotation3::identity(), quarter_y, quarter_y * quarter_x] {
            self.add_quad_pair(size, half_depth, &rotation);
        }
    }

    /// Square based pyramid: four faceted sides around +Y and a base facing -Y
    pub fn add_cone(&mut self, size: f32) {
        let half = size / 2.0;
        let depth = size * EXTRUDE_DEPTH;
        let quarter_y = Rotation3::from_axis_angle(&Vector3f::y_axis(), FRAC_PI_2);

        let mut apex = Point3f::new(0.0, half, 0.0);
        let mut left = Point3f::new(-half, -half, depth);
        let mut right = Point3f::new(half, -half, depth);
        let uvs = [Vector2f::new(0.5, 1.0), Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 0.0)];
        for _ in 0..4 {
            self.faceted_triangle([apex, left, right], uvs);
            apex = quarter_y * apex;
            left = quarter_y * left;
            right = quarter_y * right;
        }

        let a = Point3f::new(-half, -half, -depth);
        let b = Point3f::new(half, -half, -depth);
        let c = Point3f::new(half, -half, depth);
        let d = Point3f::new(-half, -half, depth);
        let down = -Vector3f::y();
        let (ua, ub, uc, ud) = (
            Vector2f::new(0.0, 0.0),
            Vector2f::new(1.0, 0.0),
            Vector2f::new(1.0, 1.0),
            Vector2f::new(0.0, 1.0),
        );
        self.triangle([a, b, c], down, [ua, ub, uc]);
        self.triangle([a, c, d], down, [ua, uc, ud]);
    }

    /// Front quad at `+z` facing +Z and back quad at `-z` facing -Z, rotated
    fn add_quad_pair(&mut self, size: f32, z: f32, rotation: &Rotation3<f32>) {
        let half = size / 2.0;
        let corners = [(half, half), (-half, half), (half, -half), (-half, -half)];
        let uv = [
            Vector2f::new(1.0, 1.0),
            Vector2f::new(0.0, 1.0),
            Vector2f::new(1.0, 0.0),
            Vector2f::new(0.0, 0.0),
        ];
        let front = corners.map(|(x, y)| rotation * Point3f::new(x, y, z));
        let back = corners.map(|(x, y)| rotation * Point3f::new(x, y, -z));
        let (front_normal, back_normal) = (rotation * Vector3f::z(), rotation * -Vector3f::z());

        const TOP_RIGHT: usize = 0;
        const TOP_LEFT: usize = 1;
        const BOTTOM_RIGHT: usize = 2;
        const BOTTOM_LEFT: usize = 3;
        for [i, j, k] in [[TOP_RIGHT, TOP_LEFT, BOTTOM_RIGHT], [TOP_LEFT, BOTTOM_LEFT, BOTTOM_RIGHT]] {
            self.triangle([front[i], front[j], front[k]], front_normal, [uv[i], uv[j], uv[k]]);
        }
        for [i, j, k] in [[TOP_RIGHT, BOTTOM_RIGHT, TOP_LEFT], [TOP_LEFT, BOTTOM_RIGHT, BOTTOM_LEFT]] {
            self.triangle([back[i], back[j], back[k]], back_normal, [uv[i], uv[j], uv[k]]);
        }
    }
}

fn at_depth(p: &Point2f, z: f32) -> Point3f {
    Point3f::new(p.x, p.y, z)
}
