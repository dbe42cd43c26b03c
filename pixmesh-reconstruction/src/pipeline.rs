//! Image to mesh pipeline
//!
//! [`ExtrusionPipeline`] runs every stage for one bitmap: segmentation,
//! outline tracing and simplification, face triangulation, extrusion and
//! the optional GPU buffer optimization.

use crate::extrude::{ImageSpace, MeshBuilder};
use crate::image::ImageOutline;
use crate::parallel;
use crate::triangulation::{triangulator_for, EarClipping, Triangulation, Triangulator};
use pixmesh_core::{dedup_points, Bitmap, Error, ExtrusionConfig, Mesh, Point2d, Polygon, Result};
use pixmesh_simplification::{GpuMeshOptimizer, MeshOptimizer};

/// Result of one extrusion with metadata
#[derive(Debug, Clone)]
pub struct ExtrusionResult {
    pub mesh: Mesh,
    /// Objects that contributed geometry, 1 for a canceled segmentation
    pub object_count: usize,
    /// Segmentation gave up and the whole image box was extruded
    pub outline_canceled: bool,
    /// Triangles emitted before optimization
    pub triangle_count_before_optimization: usize,
    /// Processing time in seconds
    pub processing_time: f32,
}

/// A face triangulation and whether its holes made it in
#[derive(Debug, Clone, Default)]
pub struct Face {
    pub triangulation: Triangulation,
    pub holes_kept: bool,
}

/// The image extrusion pipeline
pub struct ExtrusionPipeline {
    config: ExtrusionConfig,
    triangulator: Box<dyn Triangulator>,
    optimizer: GpuMeshOptimizer,
}

impl Default for ExtrusionPipeline {
    fn default() -> Self {
        Self::new(ExtrusionConfig::default())
    }
}

impl ExtrusionPipeline {
    pub fn new(config: ExtrusionConfig) -> Self {
        let triangulator = triangulator_for(config.triangulation);
        Self { config, triangulator, optimizer: GpuMeshOptimizer::default() }
    }

    pub fn with_optimizer(mut self, optimizer: GpuMeshOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn config(&self) -> &ExtrusionConfig {
        &self.config
    }

    /// Rejects bitmaps larger than `max_image_dimension` on either side
    pub fn validate(&self, bitmap: &Bitmap) -> Result<()> {
        let limit = self.config.max_image_dimension;
        if bitmap.width > limit || bitmap.height > limit {
            return Err(Error::InvalidData(format!(
                "image is {}x{}, the limit is {} pixels per side",
                bitmap.width, bitmap.height, limit
            )));
        }
        Ok(())
    }

    /// Builds the extruded mesh for `bitmap`.
    ///
    /// An empty bitmap or one without opaque pixels yields an empty mesh.
    ///
    /// # Errors
    /// * `Error::InvalidData` - The bitmap exceeds the configured size limit
    /// * `Error::Decimation` - Outline simplification failed
    /// * `Error::IndexOverflow` - The mesh outgrew 32 bit indices during optimization
    pub fn extrude(&self, bitmap: &Bitmap) -> Result<ExtrusionResult> {
        self.validate(bitmap)?;
        let mut image = ImageOutline::new(bitmap.clone());
        self.extrude_image(&mut image)
    }

    /// Like [`ExtrusionPipeline::extrude`], reusing outlines already stored in `image`
    pub fn extrude_image(&self, image: &mut ImageOutline) -> Result<ExtrusionResult> {
        let start_time = std::time::Instant::now();
        self.validate(image.bitmap())?;

        if image.bitmap().is_empty() {
            log::debug!("empty bitmap, nothing to extrude");
            return Ok(ExtrusionResult {
                mesh: Mesh::new(),
                object_count: 0,
                outline_canceled: false,
                triangle_count_before_optimization: 0,
                processing_time: start_time.elapsed().as_secs_f32(),
            });
        }

        image.auto_outline_points(&self.config)?;
        let mesh = self.build_mesh(image);
        let triangle_count_before_optimization = mesh.triangle_count();

        let mesh = if self.config.optimize && !mesh.is_empty() {
            self.optimizer.optimize(&mesh)?
        } else {
            mesh
        };

        let processing_time = start_time.elapsed().as_secs_f32();
        log::debug!(
            "extruded {} objects into {} triangles ({} vertices) in {:.3}s",
            image.object_count(),
            mesh.triangle_count(),
            mesh.vertex_count(),
            processing_time
        );

        Ok(ExtrusionResult {
            mesh,
            object_count: image.object_count(),
            outline_canceled: image.is_canceled(),
            triangle_count_before_optimization,
            processing_time,
        })
    }

    /// Caps and walls for every outline stored in `image`, without optimization
    pub fn build_mesh(&self, image: &ImageOutline) -> Mesh {
        let bitmap = image.bitmap();
        let space = ImageSpace::new(bitmap.width, bitmap.height);
        let depth = self.config.extrusion_depth(bitmap.width, bitmap.height);
        let steps = self.config.extrusion_steps();

        let objects: Vec<(&Polygon, &[Polygon])> = image.objects().collect();
        let meshes = parallel::parallel_map(&objects, self.config.parallel, |(outline, holes)| {
            self.build_object(outline, holes, &space, depth, steps)
        });

        let mut mesh = Mesh::with_capacity(meshes.iter().map(Mesh::triangle_count).sum());
        for part in &meshes {
            mesh.append(part);
        }
        mesh
    }

    fn build_object(&self, outline: &[Point2d], holes: &[Polygon], space: &ImageSpace, depth: f32, steps: usize) -> Mesh {
        let mut outline = outline.to_vec();
        dedup_points(&mut outline);
        let holes: Vec<Polygon> = holes
            .iter()
            .map(|hole| {
                let mut hole = hole.clone();
                dedup_points(&mut hole);
                hole
            })
            .filter(|hole| hole.len() >= 3)
            .collect();

        let mut builder = MeshBuilder::new();
        let face = self.triangulate_face(&outline, &holes);
        if let Some(face) = &face {
            builder.add_caps(&face.triangulation, space, depth);
        }

        builder.extrude_closed_polygon(&outline, space, steps, depth, false);
        if face.as_ref().map_or(false, |f| f.holes_kept) {
            for hole in &holes {
                builder.extrude_closed_polygon(hole, space, steps, depth, false);
            }
        }
        builder.into_mesh()
    }

    /// Triangulates one face with the configured method.
    ///
    /// Failures retry with ear clipping, then with ear clipping and no holes.
    /// Returns `None` when even the bare outline cannot be triangulated.
    pub fn triangulate_face(&self, outline: &[Point2d], holes: &[Polygon]) -> Option<Face> {
        match self.triangulator.triangulate_with_holes(outline, holes) {
            Ok(triangulation) => return Some(Face { triangulation, holes_kept: true }),
            Err(e) => log::warn!("{} triangulation failed: {}", self.triangulator.name(), e),
        }

        if self.triangulator.name() != EarClipping.name() {
            match EarClipping.triangulate_with_holes(outline, holes) {
                Ok(triangulation) => return Some(Face { triangulation, holes_kept: true }),
                Err(e) => log::warn!("ear clipping fallback failed: {}", e),
            }
        }

        if !holes.is_empty() {
            log::warn!("dropping {} holes from a {} point outline", holes.len(), outline.len());
            match EarClipping.triangulate_with_holes(outline, &[]) {
                Ok(triangulation) => return Some(Face { triangulation, holes_kept: false }),
                Err(e) => log::warn!("outline without holes failed too: {}", e),
            }
        }

        log::warn!("skipping caps of a {} point outline", outline.len());
        None
    }
}

/// Extrudes `bitmap` with `config` and returns just the mesh
pub fn extrude_bitmap(bitmap: &Bitmap, config: &ExtrusionConfig) -> Result<Mesh> {
    ExtrusionPipeline::new(config.clone()).extrude(bitmap).map(|result| result.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixmesh_core::{Color, TriangulationMethod};

    fn square_bitmap() -> Bitmap {
        let mut bitmap = Bitmap::new(64, 64);
        for y in 10..30 {
            for x in 10..30 {
                bitmap.set_pixel(x, y, Color::WHITE);
            }
        }
        bitmap
    }

    fn flat_config() -> ExtrusionConfig {
        ExtrusionConfig::default().with_wireframe(false).with_optimize(false)
    }

    #[test]
    fn test_pipeline_config_default() {
        let pipeline = ExtrusionPipeline::default();
        assert_eq!(pipeline.config().triangulation, TriangulationMethod::Optimal);
        assert!(pipeline.config().optimize);
    }

    #[test]
    fn test_rejects_oversized_image() {
        let pipeline = ExtrusionPipeline::new(ExtrusionConfig::default());
        let bitmap = Bitmap::new(4096, 8);
        assert!(matches!(pipeline.extrude(&bitmap), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_empty_inputs() {
        let pipeline = ExtrusionPipeline::new(flat_config());
        let result = pipeline.extrude(&Bitmap::new(0, 0)).unwrap();
        assert!(result.mesh.is_empty());

        let result = pipeline.extrude(&Bitmap::new(10, 10)).unwrap();
        assert!(result.mesh.is_empty());
        assert_eq!(result.object_count, 0);
    }

    #[test]
    fn test_square_mesh() {
        let result = ExtrusionPipeline::new(flat_config()).extrude(&square_bitmap()).unwrap();

        assert_eq!(result.object_count, 1);
        assert!(!result.outline_canceled);
        // 2 triangles per cap, 2 per wall
        assert_eq!(result.mesh.triangle_count(), 2 + 2 + 4 * 2);
        assert_eq!(result.triangle_count_before_optimization, 12);
        result.mesh.validate().unwrap();

        let depth = flat_config().extrusion_depth(64, 64);
        for v in &result.mesh.vertices {
            assert!(v.position.z.abs() <= depth + 1e-4);
            assert!(v.position.x.abs() <= 32.0 && v.position.y.abs() <= 32.0);
        }
    }

    #[test]
    fn test_optimizer_keeps_surface() {
        let bitmap = square_bitmap();
        let raw = ExtrusionPipeline::new(flat_config()).extrude(&bitmap).unwrap();
        let optimized = ExtrusionPipeline::new(flat_config().with_optimize(true)).extrude(&bitmap).unwrap();

        assert_eq!(raw.mesh.triangle_count(), optimized.mesh.triangle_count());
        assert!(optimized.mesh.vertex_count() <= raw.mesh.vertex_count());
        assert_relative_eq!(raw.mesh.surface_area(), optimized.mesh.surface_area(), max_relative = 1e-4);
    }

    #[test]
    fn test_wireframe_slices_walls() {
        let bitmap = square_bitmap();
        let config = flat_config().with_wireframe(true);
        let steps = config.extrusion_steps();
        let result = ExtrusionPipeline::new(config).extrude(&bitmap).unwrap();
        assert_eq!(result.mesh.triangle_count(), 4 + 4 * 2 * steps);
    }

    #[test]
    fn test_face_falls_back_without_holes() {
        let pipeline = ExtrusionPipeline::new(flat_config().with_triangulation(TriangulationMethod::EarClipping));
        let outline = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(0.0, 10.0),
        ];
        let outside = vec![Point2d::new(20.0, 0.0), Point2d::new(20.0, 2.0), Point2d::new(22.0, 2.0)];

        let face = pipeline.triangulate_face(&outline, &[outside]).unwrap();
        assert!(!face.holes_kept);
        assert_relative_eq!(face.triangulation.area(), 100.0);
    }
}
