#![forbid(unsafe_code)]

//! Vector decoration around the 3D surface.
//!
//! Two passes bracket the surface fill:
//!
//! 1. [`OverlayRenderer::draw_backdrop`]: reference grids on the floor and on
//!    the back and left walls. The surface paints over them.
//! 2. [`OverlayRenderer::draw_foreground`]: zero plane, wireframe, axis lines
//!    and labels. Drawn after the fill so the surface never hides them.
//!
//! The wireframe reuses the projected lattice computed for depth sorting.

use crate::color::PackedRgba;
use crate::config::OverlayConfig;
use crate::font::{GLYPH_HEIGHT, draw_text, text_width};
use crate::framebuffer::Surface;
use crate::geometry::ZParams;
use crate::mesh::HeightBounds;
use crate::projection::{ProjectedPoint, Projector};
use crate::raster::{Rasterizer, ScreenVertex, draw_line};
use crate::transform::{GridMapping, WorldRect, z_to_world};

/// World units between the mesh and the floor/ceiling of the wall box.
pub const WALL_GAP: f64 = 10.0;

type Point3 = (f64, f64, f64);

/// Pixels between a projected anchor and its label.
const LABEL_OFFSET: i32 = 4;

/// Everything the overlay passes need for one frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayFrame<'a> {
    pub mapping: &'a GridMapping,
    pub heights: HeightBounds,
    pub z: ZParams,
    pub projector: &'a Projector,
    /// Row-major projected mesh lattice.
    pub lattice: &'a [ProjectedPoint],
    pub rows: usize,
    pub cols: usize,
    /// Added to displayed height values only.
    pub z_display_offset: f64,
}

/// Box the reference grids and axes are drawn on, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    pub footprint: WorldRect,
    pub z_floor: f64,
    pub z_top: f64,
}

impl WallBox {
    #[must_use]
    pub fn for_frame(frame: &OverlayFrame<'_>) -> Self {
        let lo = z_to_world(frame.heights.min, frame.z.center, frame.z.scale);
        let hi = z_to_world(frame.heights.max, frame.z.center, frame.z.scale);
        Self {
            footprint: frame.mapping.bed_extent(),
            z_floor: lo - WALL_GAP,
            z_top: hi + WALL_GAP,
        }
    }
}

/// Format a height label: two decimals, with values within half a
/// hundredth of zero printed as `0.00` rather than `-0.00`.
#[must_use]
pub fn format_height(value: f64) -> String {
    if value.abs() < 0.005 {
        "0.00".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Stateless overlay drawing bound to a configuration.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer<'c> {
    config: &'c OverlayConfig,
    rasterizer: &'c Rasterizer,
}

impl<'c> OverlayRenderer<'c> {
    #[must_use]
    pub fn new(config: &'c OverlayConfig, rasterizer: &'c Rasterizer) -> Self {
        Self { config, rasterizer }
    }

    /// Reference grids behind the surface. Returns pixels written.
    pub fn draw_backdrop<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        if !self.config.show_reference_grids {
            return 0;
        }
        let walls = WallBox::for_frame(frame);
        let fp = walls.footprint;
        let (floor, top) = (walls.z_floor, walls.z_top);
        let color = self.config.palette.reference_grid;
        let (xs, ys) = self.reference_lines(frame);

        let mut n = 0;
        let mut line = |surface: &mut S, a: Point3, b: Point3| {
            n += self.segment(surface, frame.projector, a, b, color);
        };
        for &x in &xs {
            // Floor front to back, then up the back wall.
            line(surface, (x, fp.y_max, floor), (x, fp.y_min, floor));
            line(surface, (x, fp.y_min, floor), (x, fp.y_min, top));
        }
        for &y in &ys {
            // Floor left to right, then up the left wall.
            line(surface, (fp.x_min, y, floor), (fp.x_max, y, floor));
            line(surface, (fp.x_min, y, floor), (fp.x_min, y, top));
        }
        for z in [floor, (floor + top) * 0.5, top] {
            line(surface, (fp.x_min, fp.y_min, z), (fp.x_max, fp.y_min, z));
            line(surface, (fp.x_min, fp.y_min, z), (fp.x_min, fp.y_max, z));
        }
        n
    }

    /// Zero plane, wireframe, axes and labels. Returns pixels written.
    pub fn draw_foreground<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        let mut n = 0;
        if self.config.show_zero_plane {
            n += self.draw_zero_plane(surface, frame);
        }
        if self.config.show_grid {
            n += self.draw_wireframe(surface, frame);
        }
        if self.config.show_axes {
            n += self.draw_axes(surface, frame);
        }
        if self.config.show_tick_labels {
            n += self.draw_ticks(surface, frame);
        }
        n
    }

    /// Translucent plane at the configured offset from true Z=0, spanning
    /// the probed area.
    pub fn draw_zero_plane<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        let ext = frame.mapping.mesh_extent();
        let z = z_to_world(self.config.zero_plane_offset, frame.z.center, frame.z.scale);
        let color = self.config.palette.zero_plane;
        let corner = |x: f64, y: f64| {
            let p = frame.projector.project(x, y, z);
            ScreenVertex::new(p.x as f32, p.y as f32, color)
        };
        let bl = corner(ext.x_min, ext.y_max);
        let br = corner(ext.x_max, ext.y_max);
        let tl = corner(ext.x_min, ext.y_min);
        let tr = corner(ext.x_max, ext.y_min);
        self.rasterizer.fill_solid(surface, [bl, br, tl], color)
            + self.rasterizer.fill_solid(surface, [br, tr, tl], color)
    }

    /// Lines between horizontally and vertically adjacent lattice points.
    pub fn draw_wireframe<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        let (rows, cols) = (frame.rows, frame.cols);
        if frame.lattice.len() < rows * cols {
            return 0;
        }
        let color = self.config.palette.grid_line;
        let mut n = 0;
        for row in 0..rows {
            for col in 0..cols {
                let a = frame.lattice[row * cols + col];
                if col + 1 < cols {
                    n += self.screen_line(surface, a, frame.lattice[row * cols + col + 1], color);
                }
                if row + 1 < rows {
                    n += self.screen_line(surface, a, frame.lattice[(row + 1) * cols + col], color);
                }
            }
        }
        n
    }

    /// X, Y and Z axis lines from the front-left floor corner (the printer
    /// origin), extended past the bed, with letter labels at their ends.
    pub fn draw_axes<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        let walls = WallBox::for_frame(frame);
        let fp = walls.footprint;
        let ext = self.config.axis_extension;
        let color = self.config.palette.axis;
        let label = self.config.palette.label;
        let origin = (fp.x_min, fp.y_max, walls.z_floor);
        let ends = [
            ("X", (fp.x_max + ext, fp.y_max, walls.z_floor)),
            ("Y", (fp.x_min, fp.y_min - ext, walls.z_floor)),
            ("Z", (fp.x_min, fp.y_max, walls.z_top + ext)),
        ];
        let mut n = 0;
        for (name, end) in ends {
            n += self.segment(surface, frame.projector, origin, end, color);
            let p = frame.projector.project(end.0, end.1, end.2);
            n += self.label(surface, p, name, label);
        }
        n
    }

    /// Numeric tick labels: printer millimetres on every other X/Y reference
    /// line (only with bed bounds), and min/mid/max heights on the Z axis.
    pub fn draw_ticks<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &OverlayFrame<'_>,
    ) -> u32 {
        let walls = WallBox::for_frame(frame);
        let fp = walls.footprint;
        let color = self.config.palette.label;
        let mut n = 0;

        if let Some(bed) = frame.mapping.bed_bounds() {
            let spacing = self.config.reference_spacing_mm;
            for mm in tick_values(bed.bed_min_x, bed.bed_max_x, spacing).step_by(2) {
                if let Some(x) = frame.mapping.printer_x(mm) {
                    let p = frame.projector.project(x, fp.y_max, walls.z_floor);
                    n += self.label(surface, p, &format!("{mm:.0}"), color);
                }
            }
            for mm in tick_values(bed.bed_min_y, bed.bed_max_y, spacing).step_by(2) {
                if let Some(y) = frame.mapping.printer_y(mm) {
                    let p = frame.projector.project(fp.x_min, y, walls.z_floor);
                    n += self.label(surface, p, &format!("{mm:.0}"), color);
                }
            }
        }

        let h = frame.heights;
        for value in [h.min, h.center(), h.max] {
            let z = z_to_world(value, frame.z.center, frame.z.scale);
            // Along the Z axis.
            let p = frame.projector.project(fp.x_min, fp.y_max, z);
            n += self.label(surface, p, &format_height(value + frame.z_display_offset), color);
        }
        n
    }

    /// Reference grid positions in world units: bed-aligned millimetre
    /// multiples with bounds, the probe lattice without.
    fn reference_lines(&self, frame: &OverlayFrame<'_>) -> (Vec<f64>, Vec<f64>) {
        let m = frame.mapping;
        match m.bed_bounds() {
            Some(bed) => {
                let spacing = self.config.reference_spacing_mm;
                let xs = tick_values(bed.bed_min_x, bed.bed_max_x, spacing)
                    .filter_map(|mm| m.printer_x(mm))
                    .collect();
                let ys = tick_values(bed.bed_min_y, bed.bed_max_y, spacing)
                    .filter_map(|mm| m.printer_y(mm))
                    .collect();
                (xs, ys)
            }
            None => (
                (0..frame.cols).map(|c| m.x(c)).collect(),
                (0..frame.rows).map(|r| m.y(r)).collect(),
            ),
        }
    }

    fn segment<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        projector: &Projector,
        a: Point3,
        b: Point3,
        color: PackedRgba,
    ) -> u32 {
        let pa = projector.project(a.0, a.1, a.2);
        let pb = projector.project(b.0, b.1, b.2);
        self.screen_line(surface, pa, pb, color)
    }

    /// Draw a projected line if either end is near the canvas.
    fn screen_line<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        a: ProjectedPoint,
        b: ProjectedPoint,
        color: PackedRgba,
    ) -> u32 {
        let (w, h) = (surface.width() as f64, surface.height() as f64);
        let m = self.config.visibility_margin;
        let near = |p: ProjectedPoint| p.x >= -m && p.x <= w + m && p.y >= -m && p.y <= h + m;
        if !near(a) && !near(b) {
            return 0;
        }
        draw_line(surface, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), color)
    }

    /// Text centred horizontally above the anchor point.
    fn label<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        anchor: ProjectedPoint,
        text: &str,
        color: PackedRgba,
    ) -> u32 {
        let width = text_width(text, 1);
        let reach = f64::from(width) + f64::from(GLYPH_HEIGHT) + f64::from(LABEL_OFFSET);
        let (w, h) = (f64::from(surface.width()), f64::from(surface.height()));
        let inside = (-reach..=w + reach).contains(&anchor.x) && (-reach..=h + reach).contains(&anchor.y);
        if !inside {
            return 0;
        }
        let x = anchor.x as i32 - (width / 2) as i32;
        let y = anchor.y as i32 - GLYPH_HEIGHT as i32 - LABEL_OFFSET;
        draw_text(surface, x, y, text, color, 1)
    }
}

/// Upper bound on reference lines per axis.
const MAX_TICKS: i64 = 1024;

/// Multiples of `spacing` within `[min, max]`. Empty when there would be
/// more than `MAX_TICKS` of them.
fn tick_values(min: f64, max: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let valid = spacing > 0.0 && min.is_finite() && max.is_finite() && max >= min;
    let (mut first, mut last) = if valid {
        ((min / spacing).ceil() as i64, (max / spacing).floor() as i64)
    } else {
        (1, 0)
    };
    if last.saturating_sub(first) >= MAX_TICKS {
        (first, last) = (1, 0);
    }
    (first..=last).map(move |k| k as f64 * spacing)
}
