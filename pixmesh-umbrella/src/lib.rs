//! # Pixmesh
//!
//! Turns transparent raster images into extruded 3D triangle meshes.
//!
//! This is the umbrella crate that provides convenient access to all pixmesh
//! functionality. Use it to get everything in one place, or depend on the
//! individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Bitmaps, rectangles, outline polygons, meshes and configuration
//! - **Algorithms**: Object segmentation, hole finding, outline tracing and hulls
//! - **Simplification**: Outline decimation and GPU mesh optimization
//! - **Reconstruction**: Triangulation, extrusion and the image to mesh pipeline
//!
//! ## Quick Start
//!
//! ```rust
//! use pixmesh::prelude::*;
//!
//! let mut bitmap = Bitmap::new(32, 32);
//! for y in 8..24 {
//!     for x in 8..24 {
//!         bitmap.set_pixel(x, y, Color::WHITE);
//!     }
//! }
//!
//! let result = ExtrusionPipeline::new(ExtrusionConfig::default()).extrude(&bitmap).unwrap();
//! assert_eq!(result.object_count, 1);
//! assert!(result.mesh.triangle_count() > 0);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms, simplification and reconstruction
//! - `algorithms`: Segmentation, tracing and hulls
//! - `simplification`: Outline decimation and mesh optimization
//! - `reconstruction`: Triangulation, extrusion and the pipeline (implies the other two)
//! - `all`: Enables all features

// Re-export core functionality
pub use pixmesh_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use pixmesh_algorithms as algorithms;

#[cfg(feature = "simplification")]
pub use pixmesh_simplification as simplification;

#[cfg(feature = "reconstruction")]
pub use pixmesh_reconstruction as reconstruction;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pixmesh_core::*;

    #[cfg(feature = "algorithms")]
    pub use pixmesh_algorithms::*;

    #[cfg(feature = "simplification")]
    pub use pixmesh_simplification::*;

    #[cfg(feature = "reconstruction")]
    pub use pixmesh_reconstruction::*;
}
