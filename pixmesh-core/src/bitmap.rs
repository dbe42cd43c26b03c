//! RGBA bitmaps with point-sampled pixel access

use crate::error::{Error, Result};
use crate::point::Point2d;
use crate::rect::Rect;
use serde::{Deserialize, Serialize};

/// Number of interleaved channels stored per pixel
pub const RGBA_CHANNELS: usize = 4;

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Per-channel similarity test, each channel normalized to 0..1.
    ///
    /// Every one of the four channels must differ by no more than `tolerance`.
    pub fn is_similar(&self, other: &Color, tolerance: f64) -> bool {
        let close = |a: u8, b: u8| ((a as f64 - b as f64) / 255.0).abs() <= tolerance;
        close(self.r, other.r) && close(self.g, other.g) && close(self.b, other.b) && close(self.a, other.a)
    }
}

/// A raw RGBA pixel buffer, row-major with interleaved channels.
///
/// `data.len() == width * height * channels` always holds. Two access paths are
/// provided: [`Bitmap::get_pixel`]/[`Bitmap::try_set_pixel`] are bounds checked and
/// return `Option`/`Result`, while [`Bitmap::pixel`]/[`Bitmap::set_pixel`] are the
/// fast path where the caller guarantees the coordinate is in range (checked by
/// `debug_assert!` only).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a fully transparent bitmap
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            channels: RGBA_CHANNELS,
            data: vec![0; width * height * RGBA_CHANNELS],
        }
    }

    /// Create a bitmap filled with one color
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        let mut bitmap = Self::new(width, height);
        bitmap.fill(color);
        bitmap
    }

    /// Wrap decoded RGBA8 bytes
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * RGBA_CHANNELS;
        if data.len() != expected {
            return Err(Error::InvalidData(format!(
                "RGBA buffer for {}x{} bitmap must hold {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, channels: RGBA_CHANNELS, data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// True for a zero-sized bitmap
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels
    }

    /// Fast pixel read, the caller must bounds check
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        debug_assert!(x < self.width && y < self.height, "pixel ({}, {}) out of range", x, y);
        let i = self.offset(x, y);
        Color::rgba(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Fast pixel write, the caller must bounds check
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        debug_assert!(x < self.width && y < self.height, "pixel ({}, {}) out of range", x, y);
        let i = self.offset(x, y);
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = color.a;
    }

    /// Checked pixel read
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.in_bounds(x, y).then(|| self.pixel(x as usize, y as usize))
    }

    /// Checked pixel write
    pub fn try_set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(Error::InvalidData(format!(
                "pixel ({}, {}) outside {}x{} bitmap",
                x, y, self.width, self.height
            )));
        }
        self.set_pixel(x as usize, y as usize, color);
        Ok(())
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(RGBA_CHANNELS) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Full bitmap rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Bitmap bounds as a 4 point polygon: (0,0), (w-1,0), (w-1,h-1), (0,h-1)
    pub fn polygon(&self) -> Vec<Point2d> {
        let w = self.width as f64;
        let h = self.height as f64;
        vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(w - 1.0, 0.0),
            Point2d::new(w - 1.0, h - 1.0),
            Point2d::new(0.0, h - 1.0),
        ]
    }

    /// Copies a sub rectangle.
    ///
    /// `rect` is clipped to the bitmap first and updated in place so the caller
    /// knows which region was actually copied. A rect fully outside the bitmap
    /// yields an empty bitmap.
    pub fn copy_rect(&self, rect: &mut Rect) -> Bitmap {
        let left = rect.left();
        let top = rect.top();
        *rect = Rect::new(left, top, rect.width.abs(), rect.height.abs());
        if left < 0 {
            rect.width += left;
            rect.x = 0;
        }
        if top < 0 {
            rect.height += top;
            rect.y = 0;
        }
        if rect.width <= 0 || rect.height <= 0 {
            return Bitmap::new(0, 0);
        }
        let w = self.width as i32;
        let h = self.height as i32;
        if rect.right() > w - 1 {
            rect.width = w - rect.left();
        }
        if rect.bottom() > h - 1 {
            rect.height = h - rect.top();
        }
        if rect.width <= 0 || rect.height <= 0 {
            return Bitmap::new(0, 0);
        }

        let mut copy = Bitmap::new(rect.width as usize, rect.height as usize);
        let row_bytes = copy.width * RGBA_CHANNELS;
        for row in 0..copy.height {
            let src = self.offset(rect.x as usize, rect.y as usize + row);
            let dst = row * row_bytes;
            copy.data[dst..dst + row_bytes].copy_from_slice(&self.data[src..src + row_bytes]);
        }
        copy
    }

    /// Number of pixels whose alpha is at or above `alpha_tolerance * 255`
    pub fn opaque_pixel_count(&self, alpha_tolerance: f64) -> usize {
        let threshold = (alpha_tolerance * 255.0) as i32;
        self.data
            .chunks_exact(RGBA_CHANNELS)
            .filter(|px| px[3] as i32 >= threshold)
            .count()
    }
}
