//! Outline extraction for one image
//!
//! [`ImageOutline`] owns a bitmap and lazily computes one outer outline plus
//! its holes for every opaque object in it. Once computed the outlines stay
//! fixed until [`ImageOutline::reset`].

use crate::parallel::try_parallel_map;
use pixmesh_algorithms::{find_holes, find_objects, trace_outline, ImageObject, SegmentationConfig};
use pixmesh_core::{
    dedup_points, ensure_winding_orientation, Bitmap, ExtrusionConfig, Point2d, Polygon, Rect, Result, Winding,
};
use pixmesh_simplification::{insert_points, ramer_douglas_peucker, remove_seam_points, smooth_points};

/// Neighbors on each side considered by outline smoothing
pub const SMOOTH_NEIGHBORS: usize = 5;

/// Smoothing reach for outer outlines
pub const OUTER_SMOOTH_DISTANCE: f64 = 20.0;

/// Smoothing reach for hole outlines
pub const HOLE_SMOOTH_DISTANCE: f64 = 50.0;

const SMOOTH_WEIGHT: f64 = 1.0;

/// Outlines shorter than this fall back to their bounding box
pub const MIN_OUTLINE_POINTS: usize = 4;

/// One object's outer outline, counter-clockwise, and its holes, clockwise
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectOutline {
    pub outline: Polygon,
    pub holes: Vec<Polygon>,
}

#[derive(Debug, Clone)]
pub struct ImageOutline {
    bitmap: Bitmap,
    /// Outer outline of each object, in source pixel coordinates
    pub poly_list: Vec<Polygon>,
    /// Holes of each object, parallel to `poly_list`
    pub hole_list: Vec<Vec<Polygon>>,
    outline_processed: bool,
    outline_canceled: bool,
}

impl ImageOutline {
    pub fn new(bitmap: Bitmap) -> Self {
        Self {
            bitmap,
            poly_list: Vec::new(),
            hole_list: Vec::new(),
            outline_processed: false,
            outline_canceled: false,
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// True once outlines were traced, false after a fallback or reset
    pub fn is_processed(&self) -> bool {
        self.outline_processed
    }

    /// True when segmentation gave up and the outline is the whole image box
    pub fn is_canceled(&self) -> bool {
        self.outline_canceled
    }

    pub fn object_count(&self) -> usize {
        self.poly_list.len()
    }

    /// Outer outline and holes of each object
    pub fn objects(&self) -> impl Iterator<Item = (&Polygon, &[Polygon])> + '_ {
        self.poly_list.iter().zip(self.hole_list.iter().map(Vec::as_slice))
    }

    /// Segments the bitmap and computes the outline of every object.
    ///
    /// Does nothing once outlines are available. When segmentation exceeds
    /// `config.max_objects` the image falls back to [`ImageOutline::set_simple_box`].
    ///
    /// # Errors
    /// * `Error::Decimation` - Outline simplification broke its invariants
    pub fn auto_outline_points(&mut self, config: &ExtrusionConfig) -> Result<()> {
        if self.outline_processed || self.outline_canceled {
            return Ok(());
        }

        let segmentation = find_objects(
            &self.bitmap,
            &SegmentationConfig {
                alpha_tolerance: config.alpha_tolerance,
                convert_to_black_white: true,
                max_objects: config.max_objects,
            },
        );
        if segmentation.canceled {
            log::warn!(
                "segmentation of {}x{} image canceled, using a box outline",
                self.bitmap.width,
                self.bitmap.height
            );
            self.set_simple_box();
            return Ok(());
        }

        let objects = try_parallel_map(&segmentation.objects, config.parallel, |object| {
            outline_object(object, config)
        })?;

        self.poly_list.clear();
        self.hole_list.clear();
        for object in objects {
            self.poly_list.push(object.outline);
            self.hole_list.push(object.holes);
        }
        self.outline_processed = true;

        log::debug!(
            "outlined {} objects with {} holes",
            self.poly_list.len(),
            self.hole_list.iter().map(Vec::len).sum::<usize>()
        );
        Ok(())
    }

    /// Replaces all outlines with the bitmap's own bounds, without holes
    pub fn set_simple_box(&mut self) {
        let mut outline = self.bitmap.polygon();
        ensure_winding_orientation(&mut outline, Winding::CounterClockwise);
        self.poly_list = vec![outline];
        self.hole_list = vec![Vec::new()];
        self.outline_processed = false;
        self.outline_canceled = true;
    }

    /// Forgets all outlines
    pub fn reset(&mut self) {
        self.poly_list.clear();
        self.hole_list.clear();
        self.outline_processed = false;
        self.outline_canceled = false;
    }
}

/// Traces, simplifies and orients one object's outline and holes
pub fn outline_object(object: &ImageObject, config: &ExtrusionConfig) -> Result<ObjectOutline> {
    let epsilon = config.quality.epsilon();
    let origin = (object.rect.left() as f64, object.rect.top() as f64);

    let traced = offset(trace_outline(&object.bitmap), origin);
    let mut outline = simplify_outline(traced, OUTER_SMOOTH_DISTANCE, epsilon)?;
    if outline.len() < MIN_OUTLINE_POINTS {
        log::debug!("outline of {:?} collapsed to {} points, using its box", object.rect, outline.len());
        outline = rect_box(&object.rect);
    }
    ensure_winding_orientation(&mut outline, Winding::CounterClockwise);

    let found = find_holes(&object.bitmap, config.max_objects);
    if found.canceled {
        log::warn!("hole search in {:?} canceled, keeping the object solid", object.rect);
    }

    let mut holes = Vec::with_capacity(found.objects.len());
    for hole in &found.objects {
        let hole_origin = (origin.0 + hole.rect.left() as f64, origin.1 + hole.rect.top() as f64);
        let traced = offset(trace_outline(&hole.bitmap), hole_origin);
        let mut points = simplify_outline(traced, HOLE_SMOOTH_DISTANCE, epsilon)?;
        if points.len() >= MIN_OUTLINE_POINTS {
            ensure_winding_orientation(&mut points, Winding::Clockwise);
            holes.push(points);
        }
    }

    Ok(ObjectOutline { outline, holes })
}

/// Drops the closing point, then smooths, decimates and resamples outlines
/// long enough to benefit
///
/// # Errors
/// * `Error::Decimation` - Propagated from [`ramer_douglas_peucker`]
pub fn simplify_outline(mut points: Vec<Point2d>, smooth_distance: f64, epsilon: f64) -> Result<Vec<Point2d>> {
    if points.len() > 3 && points.first() == points.last() {
        points.pop();
    }

    if points.len() > SMOOTH_NEIGHBORS * 2 {
        let smoothed = smooth_points(&points, SMOOTH_NEIGHBORS, smooth_distance, SMOOTH_WEIGHT);
        let mut simplified = ramer_douglas_peucker(&smoothed, epsilon)?;
        remove_seam_points(&mut simplified, epsilon);
        points = insert_points(&simplified);
    }

    dedup_points(&mut points);
    Ok(points)
}

fn offset(mut points: Vec<Point2d>, (dx, dy): (f64, f64)) -> Vec<Point2d> {
    for p in &mut points {
        p.x += dx;
        p.y += dy;
    }
    points
}

fn rect_box(rect: &Rect) -> Polygon {
    rect.to_polygon()
}
