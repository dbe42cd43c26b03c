//! Vertex and triangle-list mesh types

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// Corner of a triangle, used to assign barycentric coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangleCorner {
    Point1,
    Point2,
    Point3,
}

impl TriangleCorner {
    pub const ALL: [TriangleCorner; 3] = [TriangleCorner::Point1, TriangleCorner::Point2, TriangleCorner::Point3];

    /// The one-hot barycentric coordinate for this corner
    pub fn barycentric(self) -> Vector3f {
        match self {
            TriangleCorner::Point1 => Vector3f::new(1.0, 0.0, 0.0),
            TriangleCorner::Point2 => Vector3f::new(0.0, 1.0, 0.0),
            TriangleCorner::Point3 => Vector3f::new(0.0, 0.0, 1.0),
        }
    }
}

/// A renderable vertex.
///
/// The barycentric coordinate lets a fragment stage draw wireframe edges
/// without a separate line list. See [`crate::buffer`] for the packed GPU layouts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3f,
    pub normal: Vector3f,
    pub uv: Vector2f,
    pub barycentric: Vector3f,
}

impl Vertex {
    pub fn new(position: Point3f, normal: Vector3f, uv: Vector2f, corner: TriangleCorner) -> Self {
        Self { position, normal, uv, barycentric: corner.barycentric() }
    }

    /// All attributes as raw float bits, in position, normal, uv, barycentric order
    pub fn to_bits(&self) -> [u32; 11] {
        [
            self.position.x.to_bits(),
            self.position.y.to_bits(),
            self.position.z.to_bits(),
            self.normal.x.to_bits(),
            self.normal.y.to_bits(),
            self.normal.z.to_bits(),
            self.uv.x.to_bits(),
            self.uv.y.to_bits(),
            self.barycentric.x.to_bits(),
            self.barycentric.y.to_bits(),
            self.barycentric.z.to_bits(),
        ]
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            normal: Vector3f::new(0.0, 0.0, 1.0),
            uv: Vector2f::zeros(),
            barycentric: TriangleCorner::Point1.barycentric(),
        }
    }
}

/// A triangle list mesh.
///
/// Every index is `< vertices.len()` and `indices.len() % 3 == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self { vertices: Vec::new(), indices: Vec::new() }
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Build a mesh from existing buffers, checking the index invariants
    pub fn from_buffers(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Appends an unshared vertex and its index
    pub fn add(&mut self, position: Point3f, normal: Vector3f, uv: Vector2f, corner: TriangleCorner) {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(position, normal, uv, corner));
        self.indices.push(index);
    }

    /// Add a vertex to the mesh without referencing it
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: [u32; 3]) {
        self.indices.extend_from_slice(&triangle);
    }

    /// Index triples in buffer order
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn triangle_positions(&self, triangle: [u32; 3]) -> [Point3f; 3] {
        triangle.map(|i| self.vertices[i as usize].position)
    }

    pub fn triangle_area(&self, triangle: [u32; 3]) -> f32 {
        let [a, b, c] = self.triangle_positions(triangle);
        (b - a).cross(&(c - a)).norm() * 0.5
    }

    /// Areas of all triangles, in buffer order
    pub fn triangle_areas(&self) -> Vec<f32> {
        self.triangles().map(|t| self.triangle_area(t)).collect()
    }

    pub fn surface_area(&self) -> f32 {
        self.triangles().map(|t| self.triangle_area(t)).sum()
    }

    /// Calculate face normals from triangle winding
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.triangles()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                (b - a).cross(&(c - a)).try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Appends another mesh, offsetting its indices
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(Error::InvalidData(format!(
                "index {} out of range for {} vertices",
                bad,
                self.vertices.len()
            )));
        }
        Ok(())
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        let n = Vector3f::z();
        mesh.add(Point3f::new(0.0, 0.0, 0.0), n, Vector2f::zeros(), TriangleCorner::Point1);
        mesh.add(Point3f::new(1.0, 0.0, 0.0), n, Vector2f::zeros(), TriangleCorner::Point2);
        mesh.add(Point3f::new(0.0, 1.0, 0.0), n, Vector2f::zeros(), TriangleCorner::Point3);
        mesh
    }

    #[test]
    fn test_add_assigns_sequential_indices() {
        let mesh = unit_triangle();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_barycentric_one_hot() {
        let mesh = unit_triangle();
        assert_eq!(mesh.vertices[0].barycentric, Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertices[1].barycentric, Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertices[2].barycentric, Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_area_and_normals() {
        let mesh = unit_triangle();
        assert_relative_eq!(mesh.surface_area(), 0.5);
        let normals = mesh.calculate_face_normals();
        assert_relative_eq!(normals[0], Vector3f::z());
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        assert!(Mesh::from_buffers(vec![Vertex::default()], vec![0, 0, 1]).is_err());
        assert!(Mesh::from_buffers(vec![Vertex::default()], vec![0, 0]).is_err());
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = unit_triangle();
        mesh.append(&unit_triangle());
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_relative_eq!(mesh.surface_area(), 1.0);
    }
}
