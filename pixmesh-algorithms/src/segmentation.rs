//! Segmentation algorithms
//!
//! Splits a bitmap into connected opaque objects by alpha thresholding and
//! queue based flood fill, and finds the interior holes of one object.

use pixmesh_core::{Bitmap, Color, Point2i, Rect};
use std::collections::VecDeque;

/// Color similarity tolerance used when flooding binary masks
pub const MASK_TOLERANCE: f64 = 0.001;

/// Objects must cover more pixels than this to be reported
const MIN_OBJECT_PIXELS: usize = 1;

/// Neighborhood used when growing a flood region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloodConnectivity {
    /// Left, right, up and down only
    #[default]
    Four,
    /// Includes diagonals
    Eight,
}

impl FloodConnectivity {
    fn offsets(self) -> &'static [(i32, i32)] {
        const FOUR: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
        match self {
            FloodConnectivity::Four => &FOUR,
            FloodConnectivity::Eight => &EIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelState {
    NotProcessed,
    Processed,
    Marked,
}

/// Result of a single flood fill
#[derive(Debug, Clone)]
pub struct FloodFill {
    /// Same size as the source, transparent except for filled pixels
    pub flood: Bitmap,
    pub pixel_count: usize,
    /// Exact bounds of the filled pixels
    pub rect: Rect,
}

/// Pixels reached by one fill, as buffer offsets
struct FloodRegion {
    pixels: Vec<usize>,
    rect: Rect,
}

/// Per-pixel visit state reused between fills of the same bitmap
struct FloodScratch {
    states: Vec<PixelState>,
}

impl FloodScratch {
    fn new(bitmap: &Bitmap) -> Self {
        Self { states: vec![PixelState::NotProcessed; bitmap.width * bitmap.height] }
    }
}

/// A connected opaque region cropped out of the source image
#[derive(Debug, Clone)]
pub struct ImageObject {
    /// Region pixels in [`Color::RED`], everything else transparent
    pub bitmap: Bitmap,
    /// Where `bitmap` sits in the source image, including the 1 pixel buffer
    pub rect: Rect,
    pub pixel_count: usize,
}

/// Segmentation options
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    pub alpha_tolerance: f64,
    /// Threshold the alpha channel into a mask first
    pub convert_to_black_white: bool,
    /// Give up once more than this many objects are found
    pub max_objects: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            alpha_tolerance: pixmesh_core::DEFAULT_ALPHA_TOLERANCE,
            convert_to_black_white: true,
            max_objects: 4096,
        }
    }
}

/// Objects found in one bitmap
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub objects: Vec<ImageObject>,
    /// The object budget ran out; `objects` is empty and callers should fall back to a box
    pub canceled: bool,
}

/// Thresholds the alpha channel into a two color mask.
///
/// Pixels with `alpha < alpha_tolerance * 255` become transparent, the rest white.
/// With `inverse` the two colors swap, making opaque pixels the transparent flood target.
pub fn black_and_white_from_alpha(bitmap: &Bitmap, alpha_tolerance: f64, inverse: bool) -> Bitmap {
    let threshold = (alpha_tolerance * 255.0) as i32;
    let (below, above) = if inverse {
        (Color::WHITE, Color::TRANSPARENT)
    } else {
        (Color::TRANSPARENT, Color::WHITE)
    };

    let mut mask = Bitmap::new(bitmap.width, bitmap.height);
    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            let color = if (bitmap.pixel(x, y).a as i32) < threshold { below } else { above };
            mask.set_pixel(x, y, color);
        }
    }
    mask
}

fn flood_region(
    bitmap: &mut Bitmap,
    seed: Point2i,
    fill_color: Color,
    tolerance: f64,
    connectivity: FloodConnectivity,
    scratch: &mut FloodScratch,
) -> FloodRegion {
    let width = bitmap.width;
    let (sx, sy) = (seed.x as usize, seed.y as usize);

    if bitmap.width == 1 && bitmap.height == 1 {
        bitmap.set_pixel(0, 0, fill_color);
        return FloodRegion { pixels: vec![0], rect: Rect::new(0, 0, 1, 1) };
    }

    let start_color = bitmap.pixel(sx, sy);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);
    let mut pixels = Vec::new();
    let mut queue = VecDeque::new();

    scratch.states[sy * width + sx] = PixelState::Marked;
    queue.push_back((sx, sy));

    while let Some((x, y)) = queue.pop_front() {
        let offset = y * width + x;
        scratch.states[offset] = PixelState::Processed;
        bitmap.set_pixel(x, y, fill_color);
        pixels.push(offset);

        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for &(dx, dy) in connectivity.offsets() {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if !bitmap.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let n_offset = ny * width + nx;
            if scratch.states[n_offset] != PixelState::NotProcessed {
                continue;
            }
            if bitmap.pixel(nx, ny).is_similar(&start_color, tolerance) {
                scratch.states[n_offset] = PixelState::Marked;
                queue.push_back((nx, ny));
            }
        }
    }

    for &offset in &pixels {
        scratch.states[offset] = PixelState::NotProcessed;
    }

    let rect = Rect::from_corners(
        Point2i::new(min_x as i32, min_y as i32),
        Point2i::new(max_x as i32, max_y as i32),
    );
    FloodRegion { pixels, rect }
}

/// Fills the region connected to `seed` whose colors match the seed color.
///
/// The source bitmap is painted with `fill_color` in place. A seed outside the
/// bitmap fills nothing.
///
/// # Arguments
/// * `bitmap` - Bitmap to flood, modified in place
/// * `seed` - Starting pixel
/// * `fill_color` - Color written to every filled pixel
/// * `tolerance` - Per channel similarity tolerance in 0..1
/// * `connectivity` - 4 or 8 connected growth
///
/// # Returns
/// * `FloodFill` - A same sized bitmap holding only the filled pixels, their count and bounds
pub fn flood_fill(
    bitmap: &mut Bitmap,
    seed: Point2i,
    fill_color: Color,
    tolerance: f64,
    connectivity: FloodConnectivity,
) -> FloodFill {
    let mut flood = Bitmap::new(bitmap.width, bitmap.height);
    if !bitmap.in_bounds(seed.x, seed.y) {
        return FloodFill { flood, pixel_count: 0, rect: Rect::default() };
    }

    let mut scratch = FloodScratch::new(bitmap);
    let region = flood_region(bitmap, seed, fill_color, tolerance, connectivity, &mut scratch);
    for &offset in &region.pixels {
        flood.set_pixel(offset % bitmap.width, offset / bitmap.width, fill_color);
    }
    FloodFill { flood, pixel_count: region.pixels.len(), rect: region.rect }
}

/// Floods every transparent pixel on the edges of `rect` with `fill_color`
pub fn fill_border(bitmap: &mut Bitmap, fill_color: Color, rect: Rect) {
    let Some(rect) = rect.intersected(&bitmap.rect()) else {
        return;
    };
    let mut scratch = FloodScratch::new(bitmap);

    let mut edge = Vec::new();
    for x in rect.left()..=rect.right() {
        edge.push(Point2i::new(x, rect.top()));
        edge.push(Point2i::new(x, rect.bottom()));
    }
    for y in rect.top()..=rect.bottom() {
        edge.push(Point2i::new(rect.left(), y));
        edge.push(Point2i::new(rect.right(), y));
    }

    for p in edge {
        if bitmap.pixel(p.x as usize, p.y as usize) == Color::TRANSPARENT {
            flood_region(bitmap, p, fill_color, MASK_TOLERANCE, FloodConnectivity::Four, &mut scratch);
        }
    }
}

/// Crops a filled region into its own bitmap with a 1 pixel transparent buffer
fn crop_region(source: &Bitmap, region: &FloodRegion) -> ImageObject {
    let rect = region
        .rect
        .adjusted(-1, -1, 1, 1)
        .intersected(&source.rect())
        .unwrap_or(region.rect);
    let mut bitmap = Bitmap::new(rect.width as usize, rect.height as usize);

    for &offset in &region.pixels {
        let x = (offset % source.width) as i32 - rect.x;
        let y = (offset / source.width) as i32 - rect.y;
        bitmap.set_pixel(x as usize, y as usize, Color::RED);
    }
    ImageObject { bitmap, rect, pixel_count: region.pixels.len() }
}

/// Finds the connected opaque objects of an image.
///
/// Scans in row-major order. Each unvisited object pixel seeds a 4 connected
/// flood fill; the filled region is cropped with a 1 pixel buffer into its own
/// bitmap. Regions of a single pixel are skipped. If the mask has no background
/// at all the whole image is returned as one object without flooding.
///
/// # Arguments
/// * `bitmap` - Source image, or a prepared mask when `convert_to_black_white` is off
/// * `config` - Alpha threshold, conversion and object budget
///
/// # Returns
/// * `Segmentation` - The objects, or `canceled` when the budget was exceeded
pub fn find_objects(bitmap: &Bitmap, config: &SegmentationConfig) -> Segmentation {
    if bitmap.is_empty() {
        return Segmentation::default();
    }

    let mut mask = if config.convert_to_black_white {
        black_and_white_from_alpha(bitmap, config.alpha_tolerance, true)
    } else {
        bitmap.clone()
    };

    if config.convert_to_black_white && mask.as_bytes().iter().all(|&b| b == 0) {
        log::debug!("find_objects: solid {}x{} image, single object", bitmap.width, bitmap.height);
        mask.fill(Color::RED);
        let pixel_count = mask.width * mask.height;
        return Segmentation {
            objects: vec![ImageObject { rect: mask.rect(), bitmap: mask, pixel_count }],
            canceled: false,
        };
    }

    let mut scratch = FloodScratch::new(&mask);
    let mut objects = Vec::new();
    for y in 0..mask.height {
        for x in 0..mask.width {
            if mask.pixel(x, y) != Color::TRANSPARENT {
                continue;
            }
            let seed = Point2i::new(x as i32, y as i32);
            let region = flood_region(&mut mask, seed, Color::RED, MASK_TOLERANCE, FloodConnectivity::Four, &mut scratch);
            let object = crop_region(&mask, &region);
            if object.rect.width < 1 || object.rect.height < 1 || object.pixel_count <= MIN_OBJECT_PIXELS {
                continue;
            }
            objects.push(object);

            if objects.len() > config.max_objects {
                log::warn!(
                    "find_objects: more than {} objects in {}x{} image, giving up",
                    config.max_objects,
                    bitmap.width,
                    bitmap.height
                );
                return Segmentation { objects: Vec::new(), canceled: true };
            }
        }
    }

    log::debug!("find_objects: {} objects", objects.len());
    Segmentation { objects, canceled: false }
}

/// Finds the interior holes of one object bitmap.
///
/// The bitmap's outer transparent area is flooded white from its edges so only
/// enclosed transparent regions remain to be segmented. Returned rects are
/// relative to `object`.
pub fn find_holes(object: &Bitmap, max_objects: usize) -> Segmentation {
    let mut copy = object.clone();
    let rect = copy.rect();
    fill_border(&mut copy, Color::WHITE, rect);
    let config = SegmentationConfig {
        convert_to_black_white: false,
        max_objects,
        ..SegmentationConfig::default()
    };
    find_objects(&copy, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(bitmap: &mut Bitmap, x0: usize, y0: usize, w: usize, h: usize, color: Color) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                bitmap.set_pixel(x, y, color);
            }
        }
    }

    fn count_color(bitmap: &Bitmap, color: Color) -> usize {
        let mut n = 0;
        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                if bitmap.pixel(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_black_and_white_threshold() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap.set_pixel(0, 0, Color::rgba(10, 20, 30, 200));
        bitmap.set_pixel(1, 0, Color::rgba(10, 20, 30, 250));

        let mask = black_and_white_from_alpha(&bitmap, 0.875, false);
        assert_eq!(mask.pixel(0, 0), Color::TRANSPARENT);
        assert_eq!(mask.pixel(1, 0), Color::WHITE);

        let inverse = black_and_white_from_alpha(&bitmap, 0.875, true);
        assert_eq!(inverse.pixel(0, 0), Color::WHITE);
        assert_eq!(inverse.pixel(1, 0), Color::TRANSPARENT);
    }

    #[test]
    fn test_flood_fill_four_connected() {
        let mut bitmap = Bitmap::filled(5, 5, Color::WHITE);
        paint(&mut bitmap, 0, 0, 2, 2, Color::TRANSPARENT);
        bitmap.set_pixel(2, 2, Color::TRANSPARENT);

        let result = flood_fill(&mut bitmap, Point2i::new(0, 0), Color::RED, MASK_TOLERANCE, FloodConnectivity::Four);
        assert_eq!(result.pixel_count, 4);
        assert_eq!(result.rect, Rect::new(0, 0, 2, 2));
        assert_eq!(result.flood.pixel(1, 1), Color::RED);
        assert_eq!(result.flood.pixel(2, 2), Color::TRANSPARENT);
        assert_eq!(bitmap.pixel(0, 1), Color::RED);
    }

    #[test]
    fn test_flood_fill_eight_connected_reaches_diagonal() {
        let mut bitmap = Bitmap::filled(5, 5, Color::WHITE);
        paint(&mut bitmap, 0, 0, 2, 2, Color::TRANSPARENT);
        bitmap.set_pixel(2, 2, Color::TRANSPARENT);

        let result = flood_fill(&mut bitmap, Point2i::new(0, 0), Color::RED, MASK_TOLERANCE, FloodConnectivity::Eight);
        assert_eq!(result.pixel_count, 5);
        assert_eq!(result.rect, Rect::new(0, 0, 3, 3));
    }

    #[test]
    fn test_flood_fill_single_pixel_and_out_of_range() {
        let mut tiny = Bitmap::new(1, 1);
        let result = flood_fill(&mut tiny, Point2i::new(0, 0), Color::RED, MASK_TOLERANCE, FloodConnectivity::Four);
        assert_eq!(result.pixel_count, 1);
        assert_eq!(tiny.pixel(0, 0), Color::RED);

        let mut bitmap = Bitmap::new(3, 3);
        let result = flood_fill(&mut bitmap, Point2i::new(5, 0), Color::RED, MASK_TOLERANCE, FloodConnectivity::Four);
        assert_eq!(result.pixel_count, 0);
    }

    #[test]
    fn test_fill_border_leaves_enclosed_area() {
        let mut bitmap = Bitmap::new(7, 7);
        paint(&mut bitmap, 1, 1, 5, 5, Color::RED);
        bitmap.set_pixel(3, 3, Color::TRANSPARENT);
        let rect = bitmap.rect();
        fill_border(&mut bitmap, Color::WHITE, rect);
        assert_eq!(count_color(&bitmap, Color::TRANSPARENT), 1);
        assert_eq!(count_color(&bitmap, Color::WHITE), 49 - 25);
    }

    #[test]
    fn test_find_objects_single_square() {
        let mut bitmap = Bitmap::new(64, 64);
        paint(&mut bitmap, 10, 10, 20, 20, Color::rgba(0, 128, 255, 255));

        let result = find_objects(&bitmap, &SegmentationConfig::default());
        assert!(!result.canceled);
        assert_eq!(result.objects.len(), 1);
        let object = &result.objects[0];
        assert_eq!(object.rect, Rect::new(9, 9, 22, 22));
        assert_eq!(object.pixel_count, 400);
        assert_eq!(object.bitmap.pixel(0, 0), Color::TRANSPARENT);
        assert_eq!(object.bitmap.pixel(1, 1), Color::RED);
    }

    #[test]
    fn test_find_objects_counts_regions() {
        let mut bitmap = Bitmap::new(40, 20);
        paint(&mut bitmap, 1, 1, 5, 5, Color::WHITE);
        paint(&mut bitmap, 10, 2, 8, 3, Color::WHITE);
        paint(&mut bitmap, 25, 5, 10, 10, Color::WHITE);
        bitmap.set_pixel(38, 18, Color::WHITE);

        let result = find_objects(&bitmap, &SegmentationConfig::default());
        assert_eq!(result.objects.len(), 3);
        let total: usize = result.objects.iter().map(|o| o.pixel_count).sum();
        assert_eq!(total, 25 + 24 + 100);
    }

    #[test]
    fn test_find_objects_transparent_and_empty() {
        let bitmap = Bitmap::new(10, 10);
        assert!(find_objects(&bitmap, &SegmentationConfig::default()).objects.is_empty());
        assert!(find_objects(&Bitmap::new(0, 0), &SegmentationConfig::default()).objects.is_empty());
    }

    #[test]
    fn test_find_objects_solid_image_short_circuit() {
        let bitmap = Bitmap::filled(8, 6, Color::BLACK);
        let result = find_objects(&bitmap, &SegmentationConfig::default());
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].rect, Rect::new(0, 0, 8, 6));
        assert_eq!(result.objects[0].pixel_count, 48);
    }

    #[test]
    fn test_find_objects_budget_cancels() {
        let mut bitmap = Bitmap::new(20, 20);
        for i in 0..5 {
            paint(&mut bitmap, i * 4, 0, 2, 2, Color::WHITE);
        }
        let config = SegmentationConfig { max_objects: 3, ..SegmentationConfig::default() };
        let result = find_objects(&bitmap, &config);
        assert!(result.canceled);
        assert!(result.objects.is_empty());
    }

    #[test]
    fn test_find_holes() {
        let mut bitmap = Bitmap::new(30, 30);
        paint(&mut bitmap, 2, 2, 26, 26, Color::WHITE);
        paint(&mut bitmap, 8, 8, 4, 4, Color::TRANSPARENT);
        paint(&mut bitmap, 16, 16, 6, 5, Color::TRANSPARENT);

        let objects = find_objects(&bitmap, &SegmentationConfig::default()).objects;
        assert_eq!(objects.len(), 1);
        let holes = find_holes(&objects[0].bitmap, 4096).objects;
        assert_eq!(holes.len(), 2);
        let areas: Vec<usize> = holes.iter().map(|h| h.pixel_count).collect();
        assert!(areas.contains(&16));
        assert!(areas.contains(&30));
    }
}
