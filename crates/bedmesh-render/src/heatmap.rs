#![forbid(unsafe_code)]

//! Flat 2D heat-map fallback.
//!
//! The grid is laid out top-down inside the canvas padding, with row 0 (the
//! front of the bed) at the bottom so it matches the default 3D view. Each
//! cell between four probe points is drawn as four triangles meeting at the
//! cell centre, so colors blend smoothly across the cell without a per-pixel
//! interpolation pass.
//!
//! Touch input selects the nearest probe point and shows its height in a
//! tooltip.

use crate::color::PackedRgba;
use crate::config::{HeatmapConfig, OverlayPalette};
use crate::font::{GLYPH_HEIGHT, draw_text, text_width};
use crate::framebuffer::Surface;
use crate::geometry::ColorBounds;
use crate::gradient::HeatGradient;
use crate::mesh::MeshGrid;
use crate::raster::{Rasterizer, ScreenVertex, fill_rect, stroke_rect};

/// Half-size of the square marker drawn around a touched probe point.
const MARKER_RADIUS: i32 = 3;
/// Padding inside the tooltip box.
const TOOLTIP_PAD: u32 = 3;

/// A probe point selected by touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchedCell {
    pub row: usize,
    pub col: usize,
    /// Raw probed height in mm (before any display offset).
    pub value: f64,
}

/// Pixel placement of the grid on a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapLayout {
    origin_x: f64,
    origin_y: f64,
    cell_w: f64,
    cell_h: f64,
    rows: usize,
    cols: usize,
}

impl HeatmapLayout {
    /// Layout for a `rows x cols` grid, or `None` if the padded canvas has
    /// no room left.
    #[must_use]
    pub fn new(width: u32, height: u32, rows: usize, cols: usize, padding: u32) -> Option<Self> {
        if rows < 2 || cols < 2 {
            return None;
        }
        let margin = padding.checked_mul(2)?;
        let inner_w = width.checked_sub(margin).filter(|&w| w > 0)? as f64;
        let inner_h = height.checked_sub(margin).filter(|&h| h > 0)? as f64;
        Some(Self {
            origin_x: padding as f64,
            origin_y: padding as f64,
            cell_w: inner_w / (cols - 1) as f64,
            cell_h: inner_h / (rows - 1) as f64,
            rows,
            cols,
        })
    }

    /// Screen position of probe point `(row, col)`.
    #[inline]
    #[must_use]
    pub fn point(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.cell_w,
            self.origin_y + (self.rows - 1 - row) as f64 * self.cell_h,
        )
    }

    /// Nearest probe point to a screen position inside the grid area.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let gx = (x - self.origin_x) / self.cell_w;
        let gy = (y - self.origin_y) / self.cell_h;
        let max_col = (self.cols - 1) as f64;
        let max_row = (self.rows - 1) as f64;
        if !(0.0..=max_col).contains(&gx) || !(0.0..=max_row).contains(&gy) {
            return None;
        }
        let col = gx.round() as usize;
        let row = self.rows - 1 - gy.round() as usize;
        Some((row, col))
    }

    /// Pixel rectangle `(x, y, w, h)` of the whole grid.
    #[must_use]
    pub fn bounds(&self) -> (i32, i32, u32, u32) {
        let w = self.cell_w * (self.cols - 1) as f64;
        let h = self.cell_h * (self.rows - 1) as f64;
        (
            self.origin_x.round() as i32,
            self.origin_y.round() as i32,
            w.round() as u32,
            h.round() as u32,
        )
    }
}

/// 2D heat-map drawing bound to configuration.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapRenderer<'c> {
    config: &'c HeatmapConfig,
    palette: &'c OverlayPalette,
    rasterizer: &'c Rasterizer,
}

impl<'c> HeatmapRenderer<'c> {
    #[must_use]
    pub fn new(config: &'c HeatmapConfig, palette: &'c OverlayPalette, rasterizer: &'c Rasterizer) -> Self {
        Self {
            config,
            palette,
            rasterizer,
        }
    }

    /// Layout for `mesh` on `surface`.
    #[must_use]
    pub fn layout<S: Surface + ?Sized>(&self, surface: &S, mesh: &MeshGrid) -> Option<HeatmapLayout> {
        HeatmapLayout::new(
            surface.width(),
            surface.height(),
            mesh.rows(),
            mesh.cols(),
            self.config.padding,
        )
    }

    /// Draw the grid, border and tooltip. Returns pixels written.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        mesh: &MeshGrid,
        gradient: &HeatGradient,
        colors: ColorBounds,
        touched: Option<TouchedCell>,
        z_display_offset: f64,
    ) -> u32 {
        let Some(layout) = self.layout(surface, mesh) else {
            return 0;
        };

        let corner = |row: usize, col: usize| {
            let (x, y) = layout.point(row, col);
            let color = gradient.color(mesh.get(row, col), colors.min, colors.max);
            ScreenVertex::new(x as f32, y as f32, color)
        };

        let mut n = 0;
        for row in 0..mesh.rows() - 1 {
            for col in 0..mesh.cols() - 1 {
                let bl = corner(row, col);
                let br = corner(row, col + 1);
                let tl = corner(row + 1, col);
                let tr = corner(row + 1, col + 1);
                let center = ScreenVertex::new(
                    (bl.x + tr.x) * 0.5,
                    (bl.y + tr.y) * 0.5,
                    PackedRgba::average4([bl.color, br.color, tl.color, tr.color]),
                );
                for tri in [[tl, tr, center], [tr, br, center], [br, bl, center], [bl, tl, center]] {
                    n += self.rasterizer.fill_gradient(surface, tri);
                }
            }
        }

        if self.config.show_border {
            let (x, y, w, h) = layout.bounds();
            n += stroke_rect(surface, x, y, w, h, self.palette.axis);
        }

        if let Some(t) = touched.filter(|t| t.row < mesh.rows() && t.col < mesh.cols()) {
            n += self.draw_marker(surface, &layout, t);
            if self.config.show_tooltip {
                n += self.draw_tooltip(surface, &layout, t, z_display_offset);
            }
        }
        n
    }

    fn draw_marker<S: Surface + ?Sized>(&self, surface: &mut S, layout: &HeatmapLayout, t: TouchedCell) -> u32 {
        let (x, y) = layout.point(t.row, t.col);
        let side = (2 * MARKER_RADIUS + 1) as u32;
        stroke_rect(
            surface,
            x.round() as i32 - MARKER_RADIUS,
            y.round() as i32 - MARKER_RADIUS,
            side,
            side,
            self.palette.highlight,
        )
    }

    fn draw_tooltip<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        layout: &HeatmapLayout,
        t: TouchedCell,
        z_display_offset: f64,
    ) -> u32 {
        let text = format!("{:.3} mm", t.value + z_display_offset);
        let box_w = text_width(&text, 1) + 2 * TOOLTIP_PAD;
        let box_h = GLYPH_HEIGHT + 2 * TOOLTIP_PAD;
        let (px, py) = layout.point(t.row, t.col);

        // Prefer above the marker; flip below near the top edge; keep inside.
        let max_x = surface.width().saturating_sub(box_w) as i32;
        let max_y = surface.height().saturating_sub(box_h) as i32;
        let x = (px.round() as i32 - box_w as i32 / 2).clamp(0, max_x);
        let above = py.round() as i32 - MARKER_RADIUS - 2 - box_h as i32;
        let y = if above >= 0 {
            above
        } else {
            py.round() as i32 + MARKER_RADIUS + 2
        }
        .clamp(0, max_y);

        fill_rect(surface, x, y, box_w, box_h, self.palette.tooltip_background)
            + draw_text(
                surface,
                x + TOOLTIP_PAD as i32,
                y + TOOLTIP_PAD as i32,
                &text,
                self.palette.tooltip_text,
                1,
            )
    }
}
