//! Image analysis algorithms for pixmesh
//!
//! This crate provides the raster side of the pipeline:
//! - Object segmentation by alpha threshold and flood fill
//! - Hole finding inside segmented objects
//! - Border outline tracing
//! - Convex and concave hulls for free point sets

pub mod hull;
pub mod outline;
pub mod segmentation;

pub use hull::*;
pub use outline::*;
pub use segmentation::*;

pub use pixmesh_core::{Error, Result};
