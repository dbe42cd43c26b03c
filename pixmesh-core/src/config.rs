//! Runtime parameters for the image to mesh pipeline

use serde::{Deserialize, Serialize};

/// Default opacity threshold separating object pixels from background
pub const DEFAULT_ALPHA_TOLERANCE: f64 = 0.875;

/// Extrusion half depth as a fraction of the larger image dimension
pub const EXTRUDE_DEPTH: f32 = 0.5;

/// Largest accepted image width or height
pub const MAX_IMAGE_DIMENSION: usize = 2048;

/// Douglas-Peucker epsilon for each level of detail, coarse to fine
const LEVEL_OF_DETAIL: [f64; 9] = [19.2, 9.6, 4.8, 2.4, 1.2, 0.6, 0.3, 0.15, 0.075];

/// Outline level of detail, 0 (coarsest) through 8 (finest).
///
/// Serialized as the bare level; deserialized levels past 8 clamp to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct MeshQuality(u8);

impl MeshQuality {
    pub const COARSEST: MeshQuality = MeshQuality(0);
    pub const FINEST: MeshQuality = MeshQuality(8);

    /// Clamps `level` into the supported range
    pub fn new(level: u8) -> Self {
        Self(level.min(Self::FINEST.0))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Douglas-Peucker epsilon for this level
    pub fn epsilon(self) -> f64 {
        let last = LEVEL_OF_DETAIL.len() - 1;
        LEVEL_OF_DETAIL[(self.0 as usize).min(last)]
    }

    /// Number of depth slices for side walls
    pub fn extrusion_steps(self) -> usize {
        self.0 as usize / 3 + 1
    }

    pub fn finer(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn coarser(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl From<u8> for MeshQuality {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<MeshQuality> for u8 {
    fn from(quality: MeshQuality) -> Self {
        quality.0
    }
}

impl Default for MeshQuality {
    fn default() -> Self {
        Self(5)
    }
}

/// Polygon triangulation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriangulationMethod {
    /// Ear clipping, O(n^2)
    EarClipping,
    /// Minimum total diagonal length by dynamic programming, O(n^3)
    #[default]
    Optimal,
    /// Sweep line split into y-monotone pieces, then linear triangulation
    Monotone,
}

/// Tunables for turning one image into one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionConfig {
    /// Opacity threshold in 0..=1
    pub alpha_tolerance: f64,
    pub quality: MeshQuality,
    /// Scales extrusion depth relative to image size
    pub depth_multiplier: f32,
    /// Wireframe look: side walls are sliced by the quality's step count
    pub wireframe: bool,
    pub triangulation: TriangulationMethod,
    pub max_image_dimension: usize,
    /// Segmentation gives up and falls back to a box outline past this many objects
    pub max_objects: usize,
    /// Run the mesh optimizer on the output
    pub optimize: bool,
    /// Process objects on the rayon thread pool
    pub parallel: bool,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            alpha_tolerance: DEFAULT_ALPHA_TOLERANCE,
            quality: MeshQuality::default(),
            depth_multiplier: 1.0,
            wireframe: true,
            triangulation: TriangulationMethod::default(),
            max_image_dimension: MAX_IMAGE_DIMENSION,
            max_objects: 4096,
            optimize: true,
            parallel: true,
        }
    }
}

impl ExtrusionConfig {
    /// Defaults with a specific level of detail
    pub fn for_quality(level: u8) -> Self {
        Self { quality: MeshQuality::new(level), ..Self::default() }
    }

    pub fn with_alpha_tolerance(mut self, alpha_tolerance: f64) -> Self {
        self.alpha_tolerance = alpha_tolerance.clamp(0.0, 1.0);
        self
    }

    pub fn with_quality(mut self, quality: MeshQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_depth_multiplier(mut self, depth_multiplier: f32) -> Self {
        self.depth_multiplier = depth_multiplier;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_triangulation(mut self, method: TriangulationMethod) -> Self {
        self.triangulation = method;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    /// Side wall slices actually emitted
    pub fn extrusion_steps(&self) -> usize {
        if self.wireframe {
            self.quality.extrusion_steps()
        } else {
            1
        }
    }

    /// Cap offset along Z for an image of the given size
    pub fn extrusion_depth(&self, width: usize, height: usize) -> f32 {
        EXTRUDE_DEPTH * width.max(height) as f32 * self.depth_multiplier
    }
}
