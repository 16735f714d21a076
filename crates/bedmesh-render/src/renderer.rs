#![forbid(unsafe_code)]

//! The bed-mesh renderer facade.
//!
//! [`BedMeshRenderer`] owns the mesh, the camera, the color range and the
//! render-mode controller, and drives one frame per [`BedMeshRenderer::render`]
//! call:
//!
//! ```text
//! mode controller ─┬─ 3D: geometry → lattice projection → depth sort
//!                  │      → backdrop → triangle fill → foreground overlay
//!                  └─ 2D: heat-map grid (+ touch tooltip)
//! ```
//!
//! Everything runs synchronously on the caller's thread. Scratch buffers
//! (quads, projected lattice) are kept between frames, so steady-state
//! rendering does not allocate for geometry.
//!
//! # Example
//!
//! ```
//! use bedmesh_render::{BedMeshRenderer, Framebuffer, RenderPath};
//!
//! let mut renderer = BedMeshRenderer::default();
//! let mesh = vec![
//!     vec![0.00, 0.02, 0.01],
//!     vec![-0.01, 0.00, 0.03],
//!     vec![0.02, 0.01, -0.02],
//! ];
//! renderer.set_mesh_data(&mesh, 3, 3).unwrap();
//!
//! let mut fb = Framebuffer::new(320, 240);
//! let report = renderer.render(&mut fb).unwrap();
//! assert_eq!(report.path, RenderPath::Gradient3D);
//! assert_eq!(report.quads_drawn, 4);
//! ```

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace, warn};

use web_time::{Duration, Instant};

use crate::config::RendererConfig;
use crate::depth_sort::{assign_depths, sort_back_to_front};
use crate::error::{BedMeshError, Result};
use crate::framebuffer::Surface;
use crate::geometry::{ColorBounds, QUAD_TRIANGLES, Quad, ZParams, generate_quads, project_lattice};
use crate::gradient::HeatGradient;
use crate::heatmap::{HeatmapLayout, HeatmapRenderer, TouchedCell};
use crate::mesh::MeshGrid;
use crate::mode::{ModeController, ModeDecision, RenderMode, RenderPath};
use crate::overlay::{OverlayFrame, OverlayRenderer, WALL_GAP};
use crate::projection::{
    ProjectedPoint, Projector, ScaleMode, ViewState, camera_distance, fit_fov_scale,
};
use crate::raster::{Rasterizer, ScreenVertex};
use crate::transform::{BedBounds, GridMapping};

/// Where the color range comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorRange {
    /// Track the mesh min/max.
    #[default]
    Auto,
    /// Fixed bounds set by the caller.
    Manual { min: f64, max: f64 },
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub path: RenderPath,
    /// Quads (3D) or cells (2D) filled.
    pub quads_drawn: usize,
    /// Pixels written by surface fill.
    pub pixels_written: u64,
    /// Pixels written by overlays, grids and labels.
    pub overlay_pixels: u64,
    pub elapsed: Duration,
}

impl FrameReport {
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"bedmesh-frame-v1","path":"{}","quads":{},"pixels":{},"overlay_pixels":{},"elapsed_us":{}}}"#,
            self.path.as_str(),
            self.quads_drawn,
            self.pixels_written,
            self.overlay_pixels,
            self.elapsed.as_micros(),
        )
    }
}

/// Canvas fit computed once per mesh, bounds, scale and canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewFit {
    width: u32,
    height: u32,
    offset: (f64, f64),
}

/// Software renderer for a probed bed mesh.
#[derive(Debug)]
pub struct BedMeshRenderer {
    config: RendererConfig,
    gradient: HeatGradient,
    rasterizer: Rasterizer,
    mesh: Option<MeshGrid>,
    bed: Option<BedBounds>,
    view: ViewState,
    color_range: ColorRange,
    controller: ModeController,
    touch: Option<TouchedCell>,
    z_display_offset: f64,
    fit: Option<ViewFit>,
    quads: Vec<Quad>,
    lattice: Vec<ProjectedPoint>,
}

impl Default for BedMeshRenderer {
    fn default() -> Self {
        Self::from_valid_config(RendererConfig::default())
    }
}

impl BedMeshRenderer {
    /// Create a renderer, rejecting configs with degenerate ranges.
    pub fn new(config: RendererConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RendererConfig) -> Self {
        Self {
            gradient: HeatGradient::new(&config.gradient),
            rasterizer: Rasterizer::new(&config.raster),
            view: ViewState::new(&config.camera, &config.z_scale),
            controller: ModeController::new(&config.adaptive),
            config,
            mesh: None,
            bed: None,
            color_range: ColorRange::Auto,
            touch: None,
            z_display_offset: 0.0,
            fit: None,
            quads: Vec::new(),
            lattice: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    // =====================================================================
    // Mesh data
    // =====================================================================

    /// Replace the mesh with `rows x cols` samples, row 0 at the front.
    ///
    /// On error the previous mesh (if any) stays in place.
    pub fn set_mesh_data<R: AsRef<[f64]>>(
        &mut self,
        grid: &[R],
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        match Self::validate_mesh(grid, rows, cols) {
            Ok(mesh) => {
                self.set_mesh(mesh);
                Ok(())
            }
            Err(err) => {
                warn!(rows, cols, error = %err, "rejected mesh data");
                Err(err)
            }
        }
    }

    fn validate_mesh<R: AsRef<[f64]>>(grid: &[R], rows: usize, cols: usize) -> Result<MeshGrid> {
        if rows < 2 || cols < 2 {
            return Err(BedMeshError::InvalidDimensions { rows, cols });
        }
        if grid.len() != rows {
            return Err(BedMeshError::RowCountMismatch {
                expected: rows,
                found: grid.len(),
            });
        }
        for (row, values) in grid.iter().enumerate() {
            let found = values.as_ref().len();
            if found != cols {
                return Err(BedMeshError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
        }
        MeshGrid::from_rows(grid)
    }

    /// Replace the mesh with an already validated grid.
    pub fn set_mesh(&mut self, mesh: MeshGrid) {
        debug!(
            rows = mesh.rows(),
            cols = mesh.cols(),
            min = mesh.bounds().min,
            max = mesh.bounds().max,
            "mesh data loaded"
        );
        self.mesh = Some(mesh);
        self.touch = None;
        self.fit = None;
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<&MeshGrid> {
        self.mesh.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Map probe points through printer coordinates on a bed of known size.
    pub fn set_bounds(&mut self, bounds: BedBounds) -> Result<()> {
        if let Err(err) = bounds.validate() {
            warn!(error = %err, "rejected bed bounds");
            return Err(err);
        }
        self.bed = Some(bounds);
        self.fit = None;
        Ok(())
    }

    /// Return to index-spaced coordinates.
    pub fn clear_bounds(&mut self) {
        self.bed = None;
        self.fit = None;
    }

    // =====================================================================
    // View
    // =====================================================================

    #[inline]
    #[must_use]
    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Restore a saved camera. Angles and Z scale are re-clamped to this
    /// renderer's configuration.
    pub fn set_view_state(&mut self, mut view: ViewState) {
        view.set_rotation(view.tilt(), view.spin(), &self.config.camera);
        if view.z_scale_mode() == ScaleMode::Manual {
            view.set_z_scale(view.z_scale(), &self.config.z_scale);
        }
        self.view = view;
        self.fit = None;
    }

    /// Set tilt and spin in degrees. Tilt is clamped, spin wrapped.
    pub fn set_rotation(&mut self, tilt: f64, spin: f64) {
        self.view.set_rotation(tilt, spin, &self.config.camera);
    }

    /// `(tilt, spin)` in degrees.
    #[must_use]
    pub fn rotation(&self) -> (f64, f64) {
        (self.view.tilt(), self.view.spin())
    }

    /// Rotate by a drag of `(dx, dy)` pixels.
    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        self.view.drag_by(dx, dy, &self.config.camera);
    }

    /// Pin the Z exaggeration, clamped to the configured range.
    pub fn set_z_scale(&mut self, scale: f64) {
        self.view.set_z_scale(scale, &self.config.z_scale);
        self.fit = None;
    }

    /// Derive the Z exaggeration from the mesh range again.
    pub fn auto_z_scale(&mut self) {
        self.view.auto_z_scale();
        self.fit = None;
    }

    /// Pin the perspective scale.
    pub fn set_fov_scale(&mut self, scale: f64) {
        self.view.set_fov_scale(scale);
        self.fit = None;
    }

    /// Fit the perspective scale to the canvas again.
    pub fn auto_fov_scale(&mut self) {
        self.view.auto_fov_scale();
        self.fit = None;
    }

    /// While dragging, 3D frames use solid fill.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.view.set_dragging(dragging);
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.view.is_dragging()
    }

    // =====================================================================
    // Color and overlays
    // =====================================================================

    /// Fix the color range. `max` may equal `min`.
    pub fn set_color_range(&mut self, min: f64, max: f64) -> Result<()> {
        if !min.is_finite() || !max.is_finite() || max < min {
            warn!(min, max, "rejected color range");
            return Err(BedMeshError::InvalidColorRange { min, max });
        }
        self.color_range = ColorRange::Manual { min, max };
        Ok(())
    }

    /// Track the mesh min/max again.
    pub fn auto_color_range(&mut self) {
        self.color_range = ColorRange::Auto;
    }

    #[inline]
    #[must_use]
    pub fn color_range(&self) -> ColorRange {
        self.color_range
    }

    /// Resolved color bounds: manual, or the mesh range in auto mode.
    #[must_use]
    pub fn color_bounds(&self) -> Option<ColorBounds> {
        match self.color_range {
            ColorRange::Manual { min, max } => Some(ColorBounds { min, max }),
            ColorRange::Auto => self.mesh.as_ref().map(|m| {
                let b = m.bounds();
                ColorBounds {
                    min: b.min,
                    max: b.max,
                }
            }),
        }
    }

    pub fn set_zero_plane_visible(&mut self, visible: bool) {
        self.config.overlay.show_zero_plane = visible;
    }

    /// Height (mm) of the zero plane. Non-finite values are ignored.
    pub fn set_zero_plane_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.config.overlay.zero_plane_offset = offset;
        }
    }

    /// Shift added to displayed height values (tooltip, Z labels).
    pub fn set_z_display_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.z_display_offset = offset;
        }
    }

    #[inline]
    #[must_use]
    pub fn z_display_offset(&self) -> f64 {
        self.z_display_offset
    }

    // =====================================================================
    // Mode control
    // =====================================================================

    /// Re-evaluate the render tier. Call when the panel becomes visible,
    /// never mid-interaction.
    pub fn evaluate_render_mode(&mut self) -> ModeDecision {
        self.controller.evaluate()
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.controller.set_mode(mode);
    }

    #[inline]
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.controller.mode()
    }

    #[inline]
    #[must_use]
    pub fn is_using_2d(&self) -> bool {
        self.controller.is_using_2d()
    }

    /// Path the next frame will take.
    #[must_use]
    pub fn active_path(&self) -> RenderPath {
        self.controller.select_path(self.view.is_dragging())
    }

    /// Average FPS over recent 3D frames, 60 before any were measured.
    #[must_use]
    pub fn average_fps(&self) -> f64 {
        self.controller.average_fps()
    }

    /// Feed a frame time measured by the host (for example including the
    /// display flush) into the FPS window.
    pub fn record_frame_time(&mut self, frame: Duration) {
        self.controller.record_frame(frame);
    }

    // =====================================================================
    // Touch (2D only)
    // =====================================================================

    /// Select the probe point nearest to `(x, y)` on a `width x height`
    /// canvas. Returns whether the selection changed. Ignored outside 2D
    /// mode and outside the grid area.
    pub fn handle_touch(&mut self, x: f64, y: f64, width: u32, height: u32) -> bool {
        if !self.is_using_2d() {
            return false;
        }
        let Some(mesh) = self.mesh.as_ref() else {
            return false;
        };
        let Some(layout) = HeatmapLayout::new(
            width,
            height,
            mesh.rows(),
            mesh.cols(),
            self.config.heatmap.padding,
        ) else {
            return false;
        };
        let Some((row, col)) = layout.hit_test(x, y) else {
            return false;
        };
        let changed = self.touch.is_none_or(|t| (t.row, t.col) != (row, col));
        if changed {
            let value = mesh.get(row, col);
            trace!(row, col, value, "touched probe point");
            self.touch = Some(TouchedCell { row, col, value });
        }
        changed
    }

    /// Drop the touch selection (finger released).
    pub fn clear_touch(&mut self) {
        self.touch = None;
    }

    #[inline]
    #[must_use]
    pub fn touched_cell(&self) -> Option<TouchedCell> {
        self.touch
    }

    // =====================================================================
    // Rendering
    // =====================================================================

    /// Quads of the last 3D frame in draw order (furthest first). Empty
    /// before the first 3D frame and after a 2D frame.
    #[inline]
    #[must_use]
    pub fn draw_order(&self) -> &[Quad] {
        &self.quads
    }

    /// Render one frame into `surface`.
    ///
    /// Fails with a not-ready error (see [`BedMeshError::is_not_ready`]) when
    /// no mesh is loaded or the surface has no area; nothing is drawn then.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<FrameReport> {
        let start = Instant::now();
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            debug!(width, height, "render skipped: surface not laid out");
            return Err(BedMeshError::EmptySurface { width, height });
        }
        if self.mesh.is_none() {
            debug!("render skipped: no mesh data");
            return Err(BedMeshError::NoMeshData);
        }

        let path = self.active_path();
        surface.clear(self.config.overlay.palette.background);
        let (quads_drawn, pixels_written, overlay_pixels) = match path {
            RenderPath::Heatmap2D => self.render_heatmap(surface),
            RenderPath::Gradient3D | RenderPath::Solid3D => self.render_3d(surface, path),
        };

        let elapsed = start.elapsed();
        if path.is_3d() {
            self.controller.record_frame(elapsed);
        }
        let report = FrameReport {
            path,
            quads_drawn,
            pixels_written,
            overlay_pixels,
            elapsed,
        };
        trace!(frame = %report.to_jsonl(), "frame rendered");
        Ok(report)
    }

    fn render_heatmap<S: Surface + ?Sized>(&mut self, surface: &mut S) -> (usize, u64, u64) {
        self.quads.clear();
        let (Some(mesh), Some(colors)) = (self.mesh.as_ref(), self.color_bounds()) else {
            return (0, 0, 0);
        };
        let heatmap = HeatmapRenderer::new(
            &self.config.heatmap,
            &self.config.overlay.palette,
            &self.rasterizer,
        );
        let pixels = heatmap.draw(
            surface,
            mesh,
            &self.gradient,
            colors,
            self.touch,
            self.z_display_offset,
        );
        (mesh.cell_count(), u64::from(pixels), 0)
    }

    fn render_3d<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        path: RenderPath,
    ) -> (usize, u64, u64) {
        let Some(colors) = self.color_bounds() else {
            return (0, 0, 0);
        };
        let Self {
            config,
            gradient,
            rasterizer,
            mesh,
            bed,
            view,
            fit,
            quads,
            lattice,
            z_display_offset,
            ..
        } = self;
        let Some(mesh) = mesh.as_ref() else {
            return (0, 0, 0);
        };
        let rasterizer = &*rasterizer;
        let (width, height) = (surface.width(), surface.height());
        let heights = mesh.bounds();

        // Z exaggeration follows the mesh range; a flat mesh has no range to
        // normalize, so it gets the default.
        let auto_z = if heights.is_flat() {
            config.z_scale.default_scale
        } else {
            config.z_scale.clamp(config.z_scale.target_height / heights.range())
        };
        let before = view.z_scale();
        view.apply_auto_z_scale(auto_z);
        if view.z_scale() != before {
            *fit = None;
        }

        let mut mapping = GridMapping::new(mesh.rows(), mesh.cols());
        if let Some(b) = bed {
            mapping = mapping.with_bed(*b);
        }
        let z = ZParams {
            center: heights.center(),
            scale: view.z_scale(),
        };
        let footprint = mapping.bed_extent();
        let distance = camera_distance(&footprint, config.camera.perspective_strength);
        let trig = view.trig();
        let center = (width as f64 * 0.5, height as f64 * 0.5);

        let stale = fit.is_none_or(|f| f.width != width || f.height != height);
        if stale {
            let z_extent = heights.range() * z.scale + 2.0 * WALL_GAP;
            view.apply_auto_fov_scale(fit_fov_scale(
                &footprint,
                z_extent,
                distance,
                width,
                height,
                config.camera.fill_fraction,
            ));
            // Centre the projected lattice on the canvas at the current angles.
            let probe = Projector::new(trig, distance, view.fov_scale(), center);
            project_lattice(mesh, &mapping, z, &probe, lattice);
            let offset = lattice_center(lattice)
                .map_or((0.0, 0.0), |(cx, cy)| (center.0 - cx, center.1 - cy));
            debug!(
                width,
                height,
                fov_scale = view.fov_scale(),
                offset_x = offset.0,
                offset_y = offset.1,
                "view fitted to canvas"
            );
            *fit = Some(ViewFit {
                width,
                height,
                offset,
            });
        }
        let offset = fit.map_or((0.0, 0.0), |f| f.offset);
        let projector = Projector::new(
            trig,
            distance,
            view.fov_scale(),
            (center.0 + offset.0, center.1 + offset.1),
        );

        generate_quads(mesh, &mapping, z, gradient, colors, quads);
        project_lattice(mesh, &mapping, z, &projector, lattice);
        assign_depths(quads, lattice, mesh.cols());
        sort_back_to_front(quads);

        let overlay = OverlayRenderer::new(&config.overlay, rasterizer);
        let frame = OverlayFrame {
            mapping: &mapping,
            heights,
            z,
            projector: &projector,
            lattice: lattice.as_slice(),
            rows: mesh.rows(),
            cols: mesh.cols(),
            z_display_offset: *z_display_offset,
        };
        let mut overlay_pixels = u64::from(overlay.draw_backdrop(surface, &frame));

        let mut pixels = 0u64;
        for quad in quads.iter() {
            for tri in QUAD_TRIANGLES {
                let verts = tri.map(|i| {
                    let p = quad.projected[i];
                    ScreenVertex::new(p.x as f32, p.y as f32, quad.vertices[i].color)
                });
                let written = match path {
                    RenderPath::Solid3D => rasterizer.fill_solid(surface, verts, quad.center_color),
                    _ => rasterizer.fill_gradient(surface, verts),
                };
                pixels += u64::from(written);
            }
        }

        overlay_pixels += u64::from(overlay.draw_foreground(surface, &frame));
        (quads.len(), pixels, overlay_pixels)
    }
}

/// Centre of the bounding box of finite projected points.
fn lattice_center(points: &[ProjectedPoint]) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
        bounds = Some(match bounds {
            None => (p.x, p.x, p.y, p.y),
            Some((x0, x1, y0, y1)) => (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
        });
    }
    bounds.map(|(x0, x1, y0, y1)| ((x0 + x1) * 0.5, (y0 + y1) * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PackedRgba;
    use crate::framebuffer::Framebuffer;

    fn flat(rows: usize, cols: usize, z: f64) -> Vec<Vec<f64>> {
        vec![vec![z; cols]; rows]
    }

    fn tilted(rows: usize, cols: usize) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|r| (0..cols).map(|c| (r + c) as f64 * 0.01).collect())
            .collect()
    }

    fn loaded(grid: &[Vec<f64>]) -> BedMeshRenderer {
        let mut r = BedMeshRenderer::default();
        r.set_mesh_data(grid, grid.len(), grid[0].len()).unwrap();
        r
    }

    #[test]
    fn rejects_invalid_mesh_without_mutation() {
        let mut r = loaded(&tilted(3, 3));
        let before = r.mesh().cloned();
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            r.set_mesh_data(&empty, 0, 0),
            Err(BedMeshError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            r.set_mesh_data(&tilted(3, 3), 4, 3),
            Err(BedMeshError::RowCountMismatch { .. })
        ));
        assert!(matches!(
            r.set_mesh_data(&tilted(3, 3), 3, 4),
            Err(BedMeshError::RaggedRow { .. })
        ));
        let mut nan = tilted(3, 3);
        nan[2][1] = f64::NAN;
        assert!(r.set_mesh_data(&nan, 3, 3).is_err());
        assert_eq!(r.mesh().cloned(), before);
    }

    #[test]
    fn render_without_mesh_is_not_ready() {
        let mut r = BedMeshRenderer::default();
        let mut fb = Framebuffer::new(10, 10);
        let err = r.render(&mut fb).unwrap_err();
        assert_eq!(err, BedMeshError::NoMeshData);
        assert!(err.is_not_ready());
        assert_eq!(fb.count_not(PackedRgba::BLACK), 0, "skipped frames draw nothing");
    }

    #[test]
    fn render_into_empty_surface_is_not_ready() {
        let mut r = loaded(&tilted(3, 3));
        let mut fb = Framebuffer::new(0, 40);
        assert_eq!(
            r.render(&mut fb),
            Err(BedMeshError::EmptySurface {
                width: 0,
                height: 40
            })
        );
    }

    #[test]
    fn flat_mesh_uses_default_z_scale() {
        let mut r = loaded(&flat(3, 3, 0.0));
        let mut fb = Framebuffer::new(120, 90);
        let report = r.render(&mut fb).unwrap();
        assert_eq!(report.quads_drawn, 4);
        assert_eq!(r.view_state().z_scale(), r.config().z_scale.default_scale);
        assert!(report.pixels_written > 0);
    }

    #[test]
    fn auto_z_scale_tracks_range_and_clamps() {
        let mut r = loaded(&vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let mut fb = Framebuffer::new(60, 60);
        r.render(&mut fb).unwrap();
        // 80 / 1.0 clamps to the 35..120 range.
        assert_eq!(r.view_state().z_scale(), 80.0);
        r.set_mesh_data(&vec![vec![0.0, 0.1], vec![0.1, 0.0]], 2, 2).unwrap();
        r.render(&mut fb).unwrap();
        assert_eq!(r.view_state().z_scale(), 120.0);
        r.set_z_scale(50.0);
        r.render(&mut fb).unwrap();
        assert_eq!(r.view_state().z_scale(), 50.0);
    }

    #[test]
    fn color_range_round_trip() {
        let mut r = loaded(&tilted(4, 4));
        r.set_color_range(-1.0, 1.0).unwrap();
        assert_eq!(r.color_bounds(), Some(ColorBounds { min: -1.0, max: 1.0 }));
        r.auto_color_range();
        let b = r.mesh().unwrap().bounds();
        assert_eq!(
            r.color_bounds(),
            Some(ColorBounds {
                min: b.min,
                max: b.max
            })
        );
        assert!(r.set_color_range(1.0, 0.0).is_err());
        assert_eq!(r.color_range(), ColorRange::Auto);
    }

    #[test]
    fn drag_switches_fill_mode_only() {
        let mut r = loaded(&tilted(5, 5));
        let mut fb = Framebuffer::new(160, 120);
        let rotation = r.rotation();
        r.set_dragging(true);
        assert_eq!(r.render(&mut fb).unwrap().path, RenderPath::Solid3D);
        r.set_dragging(false);
        assert_eq!(r.render(&mut fb).unwrap().path, RenderPath::Gradient3D);
        assert_eq!(r.rotation(), rotation);
    }

    #[test]
    fn fit_is_stable_across_rotation() {
        let mut r = loaded(&tilted(5, 5));
        let mut fb = Framebuffer::new(160, 120);
        r.render(&mut fb).unwrap();
        let fov = r.view_state().fov_scale();
        r.set_rotation(-60.0, 10.0);
        r.render(&mut fb).unwrap();
        assert_eq!(r.view_state().fov_scale(), fov);
        let mut bigger = Framebuffer::new(320, 240);
        r.render(&mut bigger).unwrap();
        assert!(r.view_state().fov_scale() > fov);
    }

    #[test]
    fn manual_fov_is_kept() {
        let mut r = loaded(&tilted(5, 5));
        r.set_fov_scale(42.0);
        let mut fb = Framebuffer::new(160, 120);
        r.render(&mut fb).unwrap();
        assert_eq!(r.view_state().fov_scale(), 42.0);
        r.auto_fov_scale();
        r.render(&mut fb).unwrap();
        assert_ne!(r.view_state().fov_scale(), 42.0);
    }

    #[test]
    fn touch_only_in_2d() {
        let mut r = loaded(&tilted(3, 3));
        assert!(!r.handle_touch(60.0, 60.0, 116, 116));
        r.set_render_mode(RenderMode::Force2D);
        assert!(r.handle_touch(60.0, 60.0, 116, 116));
        let t = r.touched_cell().unwrap();
        assert_eq!((t.row, t.col), (1, 1));
        assert_eq!(t.value, 0.02);
        // Same point again: unchanged.
        assert!(!r.handle_touch(61.0, 59.0, 116, 116));
        // Different point.
        assert!(r.handle_touch(10.0, 105.0, 116, 116));
        assert_eq!(r.touched_cell().map(|t| (t.row, t.col)), Some((0, 0)));
        // Outside the grid keeps the selection.
        assert!(!r.handle_touch(1.0, 1.0, 116, 116));
        assert!(r.touched_cell().is_some());
        r.clear_touch();
        assert_eq!(r.touched_cell(), None);
    }

    #[test]
    fn new_mesh_clears_touch() {
        let mut r = loaded(&tilted(3, 3));
        r.set_render_mode(RenderMode::Force2D);
        r.handle_touch(60.0, 60.0, 116, 116);
        r.set_mesh_data(&tilted(4, 4), 4, 4).unwrap();
        assert_eq!(r.touched_cell(), None);
    }

    #[test]
    fn view_state_restore_reclamps() {
        let mut r = BedMeshRenderer::default();
        r.set_rotation(-45.0, 90.0);
        let saved = r.view_state().clone();
        let mut other = BedMeshRenderer::default();
        other.set_view_state(saved);
        assert_eq!(other.rotation(), (-45.0, 90.0));
    }

    #[test]
    fn config_validation_on_construction() {
        let mut config = RendererConfig::default();
        config.camera.fill_fraction = 0.0;
        assert!(BedMeshRenderer::new(config).is_err());
        assert!(BedMeshRenderer::new(RendererConfig::high_quality()).is_ok());

        let mut config = RendererConfig::default();
        config.heatmap.padding = u32::MAX / 2 + 1;
        assert!(matches!(
            BedMeshRenderer::new(config),
            Err(BedMeshError::InvalidConfig(_))
        ));
    }

    #[test]
    fn extreme_fov_scale_renders_without_overflow() {
        let mut r = loaded(&tilted(5, 5));
        r.set_fov_scale(1e19);
        let mut fb = Framebuffer::new(120, 90);
        let report = r.render(&mut fb).unwrap();
        assert_eq!(report.path, RenderPath::Gradient3D);
        assert_eq!(report.quads_drawn, 16);

        r.set_dragging(true);
        assert_eq!(r.render(&mut fb).unwrap().path, RenderPath::Solid3D);
    }

    #[test]
    fn frame_report_jsonl() {
        let mut r = loaded(&tilted(3, 3));
        let mut fb = Framebuffer::new(80, 60);
        let line = r.render(&mut fb).unwrap().to_jsonl();
        assert!(line.contains(r#""path":"gradient_3d""#));
        assert!(line.contains(r#""quads":4"#));
    }

    #[test]
    fn lattice_center_ignores_non_finite() {
        let pts = [
            ProjectedPoint {
                x: 0.0,
                y: 0.0,
                depth: 1.0,
            },
            ProjectedPoint {
                x: 10.0,
                y: 4.0,
                depth: 1.0,
            },
            ProjectedPoint {
                x: f64::NAN,
                y: 1e9,
                depth: 1.0,
            },
        ];
        assert_eq!(lattice_center(&pts), Some((5.0, 2.0)));
        assert_eq!(lattice_center(&[]), None);
    }
}
