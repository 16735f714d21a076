#![forbid(unsafe_code)]

//! Scanline triangle rasterizer and line drawing.
//!
//! Triangles are sorted by Y and walked one scanline at a time. Each row
//! samples the long edge (top to bottom vertex) and whichever short edge
//! spans that row, at the pixel centre `y + 0.5`. Columns are covered when
//! their centre lies in `[left, right)`, so two triangles sharing an edge
//! neither overlap nor leave a gap.
//!
//! Two fill modes exist:
//!
//! - **Solid**: one color per triangle.
//! - **Gradient**: vertex colors are interpolated down both edges; each span
//!   is then split into a fixed number of flat color segments. Spans narrower
//!   than `min_gradient_span` get one averaged color.
//!
//! Every entry point returns the number of pixels written, and never writes
//! outside the surface.

use crate::color::PackedRgba;
use crate::config::RasterConfig;
use crate::framebuffer::Surface;

/// Span ends are clamped to this many columns outside the surface.
const SPAN_LIMIT: i64 = 1 << 24;

/// Triangle corner in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub color: PackedRgba,
}

impl ScreenVertex {
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, color: PackedRgba) -> Self {
        Self { x, y, color }
    }
}

/// Triangle fill with the configured gradient quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rasterizer {
    segments: u32,
    min_gradient_span: u32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(&RasterConfig::default())
    }
}

impl Rasterizer {
    #[must_use]
    pub fn new(config: &RasterConfig) -> Self {
        Self {
            segments: config.gradient_segments.max(1),
            min_gradient_span: config.min_gradient_span,
        }
    }

    /// Fill a triangle with one color. Translucent colors are blended.
    pub fn fill_solid<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        tri: [ScreenVertex; 3],
        color: PackedRgba,
    ) -> u32 {
        let width = surface.width();
        let mut written = 0;
        for_each_scanline(tri, width, surface.height(), false, |y, xl, xr, _, _| {
            let (start, end) = span_columns(xl, xr, width);
            if let Some((x0, x1)) = clip_columns(start, end, width) {
                surface.blend_span(y, x0, x1, color);
                written += x1 - x0;
            }
        });
        written
    }

    /// Fill a triangle interpolating its vertex colors.
    pub fn fill_gradient<S: Surface + ?Sized>(&self, surface: &mut S, tri: [ScreenVertex; 3]) -> u32 {
        let width = surface.width();
        let mut written = 0;
        for_each_scanline(tri, width, surface.height(), true, |y, xl, xr, cl, cr| {
            let (start, end) = span_columns(xl, xr, width);
            let full = end - start;
            if full <= 0 {
                return;
            }
            if full < i64::from(self.min_gradient_span) {
                if let Some((x0, x1)) = clip_columns(start, end, width) {
                    surface.blend_span(y, x0, x1, cl.average(cr));
                    written += x1 - x0;
                }
                return;
            }
            let n = i64::from(self.segments).min(full);
            for i in 0..n {
                let s0 = start + full * i / n;
                let s1 = start + full * (i + 1) / n;
                if let Some((x0, x1)) = clip_columns(s0, s1, width) {
                    let t = (i as f32 + 0.5) / n as f32;
                    surface.blend_span(y, x0, x1, cl.lerp(cr, t));
                    written += x1 - x0;
                }
            }
        });
        written
    }
}

/// Walk the scanlines of a triangle, calling `emit(y, x_left, x_right,
/// color_left, color_right)` for each row inside the surface.
///
/// Degenerate (zero-height or non-finite) triangles and triangles entirely
/// outside `width x height` produce no calls.
fn for_each_scanline<F>(tri: [ScreenVertex; 3], width: u32, height: u32, interpolate: bool, mut emit: F)
where
    F: FnMut(u32, f32, f32, PackedRgba, PackedRgba),
{
    if tri.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
        return;
    }
    let mut v = tri;
    v.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [v0, v1, v2] = v;
    if !(v2.y > v0.y) {
        return;
    }

    let (w, h) = (width as f32, height as f32);
    let min_x = v0.x.min(v1.x).min(v2.x);
    let max_x = v0.x.max(v1.x).max(v2.x);
    if max_x < 0.0 || min_x >= w || v2.y < 0.0 || v0.y >= h {
        return;
    }

    let y_start = (v0.y - 0.5).ceil().max(0.0) as u32;
    let y_end = (v2.y - 0.5).ceil().min(h).max(0.0) as u32;
    for y in y_start..y_end {
        let yc = y as f32 + 0.5;
        let (xa, ca) = edge_at(v0, v2, yc, interpolate);
        let (xb, cb) = if yc < v1.y {
            edge_at(v0, v1, yc, interpolate)
        } else {
            edge_at(v1, v2, yc, interpolate)
        };
        if xa <= xb {
            emit(y, xa, xb, ca, cb);
        } else {
            emit(y, xb, xa, cb, ca);
        }
    }
}

#[inline]
fn edge_at(a: ScreenVertex, b: ScreenVertex, y: f32, interpolate: bool) -> (f32, PackedRgba) {
    let dy = b.y - a.y;
    let t = if dy.abs() > f32::EPSILON {
        ((y - a.y) / dy).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let x = a.x + (b.x - a.x) * t;
    let c = if interpolate {
        a.color.lerp(b.color, t)
    } else {
        a.color
    };
    (x, c)
}

/// First and one-past-last covered column of a span, clamped to
/// `SPAN_LIMIT` around the surface but not clipped to it.
#[inline]
fn span_columns(xl: f32, xr: f32, width: u32) -> (i64, i64) {
    let (lo, hi) = (-SPAN_LIMIT, i64::from(width) + SPAN_LIMIT);
    let column = |x: f32| ((x - 0.5).ceil() as i64).clamp(lo, hi);
    (column(xl), column(xr))
}

#[inline]
fn clip_columns(start: i64, end: i64, width: u32) -> Option<(u32, u32)> {
    let x0 = start.max(0);
    let x1 = end.min(i64::from(width));
    (x1 > x0).then(|| (x0 as u32, x1 as u32))
}

// =========================================================================
// Lines and rectangles
// =========================================================================

/// Draw a 1-pixel line. The segment is clipped to the surface first, so far
/// off-screen endpoints cost nothing extra.
pub fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    from: (f32, f32),
    to: (f32, f32),
    color: PackedRgba,
) -> u32 {
    let (w, h) = (surface.width(), surface.height());
    if w == 0 || h == 0 {
        return 0;
    }
    let bounds = (0.0, 0.0, (w - 1) as f32, (h - 1) as f32);
    let Some(((x0, y0), (x1, y1))) = clip_line(from, to, bounds) else {
        return 0;
    };

    // Bresenham between the rounded clipped endpoints.
    let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
    let (xe, ye) = (x1.round() as i32, y1.round() as i32);
    let dx = (xe - x).abs();
    let dy = -(ye - y).abs();
    let sx = if x < xe { 1 } else { -1 };
    let sy = if y < ye { 1 } else { -1 };
    let mut err = dx + dy;
    let mut written = 0;
    loop {
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            surface.put_pixel(x as u32, y as u32, color);
            written += 1;
        }
        if x == xe && y == ye {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    written
}

/// Liang-Barsky clip of a segment to `(x_min, y_min, x_max, y_max)`.
fn clip_line(
    from: (f32, f32),
    to: (f32, f32),
    (x_min, y_min, x_max, y_max): (f32, f32, f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (x0, y0) = from;
    let (x1, y1) = to;
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [(-dx, x0 - x_min), (dx, x_max - x0), (-dy, y0 - y_min), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some(((x0 + t0 * dx, y0 + t0 * dy), (x0 + t1 * dx, y0 + t1 * dy)))
}

/// Fill an axis-aligned rectangle, clipped. Translucent colors are blended.
pub fn fill_rect<S: Surface + ?Sized>(
    surface: &mut S,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: PackedRgba,
) -> u32 {
    let x0 = i64::from(x).max(0);
    let x1 = (i64::from(x) + i64::from(width)).min(i64::from(surface.width()));
    let y0 = i64::from(y).max(0);
    let y1 = (i64::from(y) + i64::from(height)).min(i64::from(surface.height()));
    if x1 <= x0 || y1 <= y0 {
        return 0;
    }
    for row in y0..y1 {
        surface.blend_span(row as u32, x0 as u32, x1 as u32, color);
    }
    ((x1 - x0) * (y1 - y0)) as u32
}

/// 1-pixel rectangle outline.
pub fn stroke_rect<S: Surface + ?Sized>(
    surface: &mut S,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: PackedRgba,
) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }
    let right = x.saturating_add(width as i32 - 1);
    let bottom = y.saturating_add(height as i32 - 1);
    let mut n = fill_rect(surface, x, y, width, 1, color);
    if height > 1 {
        n += fill_rect(surface, x, bottom, width, 1, color);
    }
    if height > 2 {
        n += fill_rect(surface, x, y + 1, 1, height - 2, color);
        if width > 1 {
            n += fill_rect(surface, right, y + 1, 1, height - 2, color);
        }
    }
    n
}
