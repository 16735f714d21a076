#![forbid(unsafe_code)]

//! Renderer configuration.
//!
//! Every tunable constant of the pipeline lives here as plain data with a
//! [`Default`] matching the embedded panel. Hosts adjust individual fields
//! or start from a preset:
//!
//! ```
//! use bedmesh_render::config::RendererConfig;
//!
//! let mut config = RendererConfig::embedded();
//! config.overlay.show_zero_plane = true;
//! assert!(config.validate().is_ok());
//! ```
//!
//! With the `serde` feature all types derive `Serialize`/`Deserialize`, so a
//! host can persist them alongside its own settings.

use crate::color::PackedRgba;
use crate::error::{BedMeshError, Result};
use crate::mode::RenderMode;

// =========================================================================
// Camera
// =========================================================================

/// Camera defaults and interaction limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Initial tilt in degrees. Negative values look down onto the bed.
    pub default_tilt: f64,
    /// Initial spin about the vertical axis, in degrees.
    pub default_spin: f64,
    /// Lowest tilt (closest to top-down).
    pub min_tilt: f64,
    /// Highest tilt (closest to edge-on).
    pub max_tilt: f64,
    /// Mesh diagonal divided by this gives the camera distance.
    /// Larger values exaggerate perspective.
    pub perspective_strength: f64,
    /// Fraction of the shorter canvas side the mesh should fill.
    pub fill_fraction: f64,
    /// Degrees of rotation per pixel of drag.
    pub drag_sensitivity: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_tilt: -25.0,
            default_spin: -45.0,
            min_tilt: -89.0,
            max_tilt: -10.0,
            perspective_strength: 0.13,
            fill_fraction: 0.9,
            drag_sensitivity: 0.5,
        }
    }
}

// =========================================================================
// Z scale
// =========================================================================

/// Height exaggeration limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZScaleConfig {
    /// Used for flat meshes and as the starting manual value.
    pub default_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// World-space height the full mesh Z range is stretched to in auto mode.
    pub target_height: f64,
}

impl Default for ZScaleConfig {
    fn default() -> Self {
        Self {
            default_scale: 60.0,
            min_scale: 35.0,
            max_scale: 120.0,
            target_height: 80.0,
        }
    }
}

impl ZScaleConfig {
    /// Clamp a requested scale into the configured range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, scale: f64) -> f64 {
        if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.default_scale
        }
    }
}

// =========================================================================
// Gradient
// =========================================================================

/// Heat-map color curve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GradientConfig {
    /// Portion of the data range (around its midpoint) spread over the full
    /// palette. Values outside saturate at the end colors.
    pub compression: f64,
    /// Normalized positions of the four interior color stops.
    pub breakpoints: [f64; 4],
    /// Colors at 0, the four breakpoints, and 1.
    pub stops: [PackedRgba; 6],
    /// Blend toward luminance-matched gray, 0 = none, 1 = grayscale.
    pub desaturation: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            compression: 0.8,
            breakpoints: [0.125, 0.375, 0.625, 0.875],
            stops: [
                PackedRgba::rgb(128, 0, 255),
                PackedRgba::rgb(0, 64, 255),
                PackedRgba::rgb(0, 220, 255),
                PackedRgba::rgb(255, 230, 0),
                PackedRgba::rgb(255, 32, 0),
                PackedRgba::rgb(160, 0, 0),
            ],
            desaturation: 0.35,
        }
    }
}

// =========================================================================
// Raster
// =========================================================================

/// Gradient fill quality.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RasterConfig {
    /// Color segments per scanline span in gradient mode.
    pub gradient_segments: u32,
    /// Spans narrower than this are filled with one averaged color.
    pub min_gradient_span: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            gradient_segments: 6,
            min_gradient_span: 3,
        }
    }
}

// =========================================================================
// Adaptive mode
// =========================================================================

/// Render mode selection and FPS fallback threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdaptiveConfig {
    pub initial_mode: RenderMode,
    /// Auto mode falls back to the 2D heat map below this average FPS.
    pub fps_threshold: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            initial_mode: RenderMode::Auto,
            fps_threshold: 15.0,
        }
    }
}

// =========================================================================
// Overlay
// =========================================================================

/// Colors for decoration, resolved by the host from its theme.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayPalette {
    pub background: PackedRgba,
    pub grid_line: PackedRgba,
    pub reference_grid: PackedRgba,
    pub axis: PackedRgba,
    pub label: PackedRgba,
    pub zero_plane: PackedRgba,
    pub tooltip_background: PackedRgba,
    pub tooltip_text: PackedRgba,
    pub highlight: PackedRgba,
}

impl Default for OverlayPalette {
    fn default() -> Self {
        Self {
            background: PackedRgba::rgb(24, 24, 28),
            grid_line: PackedRgba::rgba(40, 40, 40, 180),
            reference_grid: PackedRgba::rgba(110, 110, 120, 90),
            axis: PackedRgba::rgb(200, 200, 200),
            label: PackedRgba::rgb(230, 230, 230),
            zero_plane: PackedRgba::rgba(220, 220, 230, 64),
            tooltip_background: PackedRgba::rgba(0, 0, 0, 200),
            tooltip_text: PackedRgba::WHITE,
            highlight: PackedRgba::WHITE,
        }
    }
}

/// Which decorations are drawn around the 3D surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    pub show_grid: bool,
    pub show_axes: bool,
    pub show_tick_labels: bool,
    pub show_reference_grids: bool,
    pub show_zero_plane: bool,
    /// Height (mm) the zero plane is drawn at, relative to true Z=0.
    pub zero_plane_offset: f64,
    /// Lines are drawn if an endpoint is within this many pixels of the canvas.
    pub visibility_margin: f64,
    /// World units the axis lines extend past the mesh.
    pub axis_extension: f64,
    /// Reference grid spacing, in mm with bed bounds, in lattice steps without.
    pub reference_spacing_mm: f64,
    pub palette: OverlayPalette,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            show_tick_labels: true,
            show_reference_grids: true,
            show_zero_plane: false,
            zero_plane_offset: 0.0,
            visibility_margin: 10.0,
            axis_extension: 20.0,
            reference_spacing_mm: 50.0,
            palette: OverlayPalette::default(),
        }
    }
}

// =========================================================================
// Heat map
// =========================================================================

/// 2D fallback layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeatmapConfig {
    /// Pixels between the canvas edge and the grid.
    pub padding: u32,
    pub show_border: bool,
    pub show_tooltip: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            padding: 8,
            show_border: true,
            show_tooltip: true,
        }
    }
}

// =========================================================================
// Aggregate
// =========================================================================

/// Smallest reference grid spacing, in mm or lattice steps.
pub const MIN_REFERENCE_SPACING: f64 = 1.0;
/// Largest heat-map padding in pixels.
pub const MAX_HEATMAP_PADDING: u32 = 4096;

/// Complete renderer configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RendererConfig {
    pub camera: CameraConfig,
    pub z_scale: ZScaleConfig,
    pub gradient: GradientConfig,
    pub raster: RasterConfig,
    pub adaptive: AdaptiveConfig,
    pub overlay: OverlayConfig,
    pub heatmap: HeatmapConfig,
}

impl RendererConfig {
    /// Defaults tuned for a GPU-less panel. Identical to [`Default`].
    #[must_use]
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Finer gradients for host-side snapshots where frame time does not
    /// matter.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            raster: RasterConfig {
                gradient_segments: 16,
                min_gradient_span: 2,
            },
            ..Self::default()
        }
    }

    /// Check ranges that would otherwise produce degenerate output.
    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if !(cam.min_tilt.is_finite() && cam.max_tilt.is_finite() && cam.min_tilt <= cam.max_tilt)
        {
            return Err(BedMeshError::InvalidConfig("tilt range"));
        }
        if cam.min_tilt <= -90.0 || cam.max_tilt >= 0.0 {
            return Err(BedMeshError::InvalidConfig("tilt range must lie inside (-90, 0)"));
        }
        if !(cam.perspective_strength > 0.0 && cam.perspective_strength < 1.0) {
            return Err(BedMeshError::InvalidConfig("perspective strength"));
        }
        if !(cam.fill_fraction > 0.0 && cam.fill_fraction <= 1.0) {
            return Err(BedMeshError::InvalidConfig("fill fraction"));
        }
        let z = &self.z_scale;
        if !(z.min_scale > 0.0 && z.min_scale <= z.max_scale && z.target_height > 0.0) {
            return Err(BedMeshError::InvalidConfig("z scale range"));
        }
        let g = &self.gradient;
        if !(g.compression > 0.0 && g.compression <= 1.0) {
            return Err(BedMeshError::InvalidConfig("gradient compression"));
        }
        if !g.breakpoints.windows(2).all(|w| w[0] < w[1])
            || g.breakpoints[0] <= 0.0
            || g.breakpoints[3] >= 1.0
        {
            return Err(BedMeshError::InvalidConfig("gradient breakpoints"));
        }
        if !(0.0..=1.0).contains(&g.desaturation) {
            return Err(BedMeshError::InvalidConfig("desaturation"));
        }
        if self.raster.gradient_segments == 0 {
            return Err(BedMeshError::InvalidConfig("gradient segments"));
        }
        let o = &self.overlay;
        if !(o.visibility_margin.is_finite() && o.visibility_margin >= 0.0) {
            return Err(BedMeshError::InvalidConfig("visibility margin"));
        }
        if !(o.axis_extension.is_finite() && o.zero_plane_offset.is_finite()) {
            return Err(BedMeshError::InvalidConfig("overlay offsets must be finite"));
        }
        if !(o.reference_spacing_mm.is_finite() && o.reference_spacing_mm >= MIN_REFERENCE_SPACING) {
            return Err(BedMeshError::InvalidConfig("reference grid spacing"));
        }
        if self.heatmap.padding > MAX_HEATMAP_PADDING {
            return Err(BedMeshError::InvalidConfig("heat map padding"));
        }
        Ok(())
    }
}
