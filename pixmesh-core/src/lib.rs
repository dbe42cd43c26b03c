//! Core data structures for pixmesh
//!
//! This crate provides the fundamental types shared by every stage of the
//! image to mesh pipeline: RGBA bitmaps, pixel rectangles, outline polygons,
//! vertices, triangle-list meshes and the pipeline configuration.

pub mod bitmap;
pub mod buffer;
pub mod config;
pub mod error;
pub mod mesh;
pub mod point;
pub mod polygon;
pub mod rect;
pub mod traits;

pub use bitmap::*;
pub use buffer::*;
pub use config::*;
pub use error::*;
pub use mesh::*;
pub use point::*;
pub use polygon::*;
pub use rect::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Isometry3, Point2, Point3, Rotation3, Vector2, Vector3};
