#![forbid(unsafe_code)]

//! Pixel targets.
//!
//! The rasterizer writes through the [`Surface`] trait. Two implementations
//! are provided: [`Framebuffer`], an owned RGBA buffer, and [`PixelSlice`],
//! a borrowed view over a host-owned `u32` buffer (for example the canvas
//! memory of the UI toolkit).

use crate::color::PackedRgba;
use crate::error::{BedMeshError, Result};

/// A rectangular pixel target.
///
/// Span methods take a half-open column range `[x0, x1)`. Implementations
/// clip to their own bounds, so out-of-range spans are harmless.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Pixel at `(x, y)`, or [`PackedRgba::BLACK`] out of bounds.
    fn get_pixel(&self, x: u32, y: u32) -> PackedRgba;

    /// Overwrite `[x0, x1)` on row `y` with `color`.
    fn fill_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba);

    /// Composite `color` over `[x0, x1)` on row `y` using its alpha.
    fn blend_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba) {
        if color.is_opaque() {
            self.fill_span(y, x0, x1, color);
            return;
        }
        let x1 = x1.min(self.width());
        for x in x0..x1 {
            let dst = self.get_pixel(x, y);
            self.fill_span(y, x, x + 1, color.over(dst));
        }
    }

    /// Write one pixel, blending if `color` is translucent.
    #[inline]
    fn put_pixel(&mut self, x: u32, y: u32, color: PackedRgba) {
        self.blend_span(y, x, x.saturating_add(1), color);
    }

    /// Fill the whole surface.
    fn clear(&mut self, color: PackedRgba) {
        let (w, h) = (self.width(), self.height());
        for y in 0..h {
            self.fill_span(y, 0, w, color);
        }
    }

    /// True when the surface has no pixels to draw into.
    #[inline]
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Owned row-major RGBA framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<PackedRgba>,
}

impl Framebuffer {
    /// Create a black framebuffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PackedRgba::BLACK; width as usize * height as usize],
        }
    }

    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[PackedRgba] {
        &self.pixels
    }

    /// Resize, clearing contents to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, PackedRgba::BLACK);
    }

    /// Packed `RGB8` bytes, row-major, for image encoders.
    #[must_use]
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgb_bytes()).collect()
    }

    /// Count pixels that differ from `color`.
    #[must_use]
    pub fn count_not(&self, color: PackedRgba) -> usize {
        self.pixels.iter().filter(|&&p| p != color).count()
    }

    #[inline]
    fn row_range(&self, y: u32, x0: u32, x1: u32) -> Option<std::ops::Range<usize>> {
        if y >= self.height {
            return None;
        }
        let x1 = x1.min(self.width);
        if x0 >= x1 {
            return None;
        }
        let base = y as usize * self.width as usize;
        Some(base + x0 as usize..base + x1 as usize)
    }
}

impl Surface for Framebuffer {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: u32, y: u32) -> PackedRgba {
        if x < self.width && y < self.height {
            self.pixels[(y as usize) * self.width as usize + x as usize]
        } else {
            PackedRgba::BLACK
        }
    }

    #[inline]
    fn fill_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba) {
        if let Some(range) = self.row_range(y, x0, x1) {
            self.pixels[range].fill(color);
        }
    }

    fn blend_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba) {
        if let Some(range) = self.row_range(y, x0, x1) {
            if color.is_opaque() {
                self.pixels[range].fill(color);
            } else {
                for p in &mut self.pixels[range] {
                    *p = color.over(*p);
                }
            }
        }
    }

    fn clear(&mut self, color: PackedRgba) {
        self.pixels.fill(color);
    }
}

/// Borrowed view over a host buffer of `0xRRGGBBAA` words.
///
/// `stride` is the distance between rows in pixels and may exceed `width`.
#[derive(Debug)]
pub struct PixelSlice<'a> {
    buf: &'a mut [u32],
    width: u32,
    height: u32,
    stride: u32,
}

impl<'a> PixelSlice<'a> {
    /// Wrap `buf`, which must hold at least `stride * (height - 1) + width`
    /// pixels.
    pub fn new(buf: &'a mut [u32], width: u32, height: u32, stride: u32) -> Result<Self> {
        let required = if width == 0 || height == 0 {
            0
        } else {
            stride as usize * (height as usize - 1) + width as usize
        };
        if stride < width || buf.len() < required {
            return Err(BedMeshError::SurfaceBuffer {
                width,
                height,
                stride,
                len: buf.len(),
                required,
            });
        }
        Ok(Self {
            buf,
            width,
            height,
            stride,
        })
    }

    #[inline]
    fn row_range(&self, y: u32, x0: u32, x1: u32) -> Option<std::ops::Range<usize>> {
        if y >= self.height {
            return None;
        }
        let x1 = x1.min(self.width);
        if x0 >= x1 {
            return None;
        }
        let base = y as usize * self.stride as usize;
        Some(base + x0 as usize..base + x1 as usize)
    }
}

impl Surface for PixelSlice<'_> {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: u32, y: u32) -> PackedRgba {
        if x < self.width && y < self.height {
            PackedRgba(self.buf[y as usize * self.stride as usize + x as usize])
        } else {
            PackedRgba::BLACK
        }
    }

    #[inline]
    fn fill_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba) {
        if let Some(range) = self.row_range(y, x0, x1) {
            self.buf[range].fill(color.0);
        }
    }

    fn blend_span(&mut self, y: u32, x0: u32, x1: u32, color: PackedRgba) {
        if let Some(range) = self.row_range(y, x0, x1) {
            if color.is_opaque() {
                self.buf[range].fill(color.0);
            } else {
                for p in &mut self.buf[range] {
                    *p = color.over(PackedRgba(*p)).0;
                }
            }
        }
    }
}
