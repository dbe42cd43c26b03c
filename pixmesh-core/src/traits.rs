//! Core traits for pixmesh

use crate::{mesh::*, point::*};
use nalgebra::Isometry3;

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

/// Trait for objects that can be rigidly moved
pub trait Transformable {
    /// Apply a rigid transformation to the object
    fn transform(&mut self, isometry: &Isometry3<f32>);
}

impl Drawable for Mesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let Some(first) = self.vertices.first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        let mut min = first.position;
        let mut max = first.position;
        for vertex in &self.vertices {
            let p = vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        (min, max)
    }
}

impl Transformable for Mesh {
    fn transform(&mut self, isometry: &Isometry3<f32>) {
        for vertex in &mut self.vertices {
            vertex.position = isometry * vertex.position;
            vertex.normal = isometry.rotation * vertex.normal;
        }
    }
}
