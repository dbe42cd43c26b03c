//! # Pixmesh Reconstruction
//!
//! Turns image outlines into closed 3D meshes.
//!
//! This crate provides polygon triangulation (ear clipping, minimum weight and
//! monotone sweep, each with hole support), extrusion of outlines into capped
//! and walled meshes, simple primitives, and [`ExtrusionPipeline`], which runs
//! the whole image to mesh flow.

pub mod extrude;
pub mod image;
pub mod parallel;
pub mod pipeline;
pub mod triangulation;

// Re-export commonly used items
pub use extrude::*;
pub use image::*;
pub use pipeline::*;
pub use triangulation::*;

pub use pixmesh_core::{Error, Result};
