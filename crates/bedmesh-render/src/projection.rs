#![forbid(unsafe_code)]

//! Camera state and perspective projection.
//!
//! # Camera model
//!
//! Points are first spun about the world Z axis, then tilted about the
//! screen's horizontal axis. Tilt is exposed in degrees where `-90` would be
//! top-down and `0` edge-on; internally the rotation angle is `tilt + 90`, so
//! `0` rad looks straight down and `pi/2` looks level at the front edge.
//!
//! After rotation the camera sits `camera_distance` away along the view
//! axis and a perspective divide maps to pixels:
//!
//! ```text
//! screen_x = origin_x + x_cam * fov_scale / depth
//! screen_y = origin_y + y_cam * fov_scale / depth
//! ```
//!
//! `depth` is clamped to [`NEAR_PLANE`] so the divisor never approaches zero,
//! even for a manual Z scale that lifts geometry toward the camera.

use crate::config::{CameraConfig, ZScaleConfig};
use crate::transform::WorldRect;

/// Smallest depth a point may have after the camera transform.
pub const NEAR_PLANE: f64 = 1.0;

/// Lower bound for the camera distance, for tiny meshes.
pub const MIN_CAMERA_DISTANCE: f64 = 100.0;

/// Whether a scale factor is derived from the mesh or pinned by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleMode {
    #[default]
    Auto,
    Manual,
}

/// Point after projection. `depth` grows away from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Sines and cosines of the current view angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTrig {
    pub cos_tilt: f64,
    pub sin_tilt: f64,
    pub cos_spin: f64,
    pub sin_spin: f64,
}

impl ViewTrig {
    #[must_use]
    pub fn from_angles(tilt_deg: f64, spin_deg: f64) -> Self {
        let (sin_tilt, cos_tilt) = (tilt_deg + 90.0).to_radians().sin_cos();
        let (sin_spin, cos_spin) = spin_deg.to_radians().sin_cos();
        Self {
            cos_tilt,
            sin_tilt,
            cos_spin,
            sin_spin,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TrigCache {
    tilt: f64,
    spin: f64,
    trig: ViewTrig,
}

impl Default for TrigCache {
    fn default() -> Self {
        // NaN keys never compare equal, so the first lookup always computes.
        Self {
            tilt: f64::NAN,
            spin: f64::NAN,
            trig: ViewTrig::from_angles(0.0, 0.0),
        }
    }
}

/// Interactive camera state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState {
    tilt: f64,
    spin: f64,
    z_scale: f64,
    z_scale_mode: ScaleMode,
    fov_scale: f64,
    fov_mode: ScaleMode,
    dragging: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    trig: TrigCache,
}

impl PartialEq for ViewState {
    fn eq(&self, other: &Self) -> bool {
        self.tilt == other.tilt
            && self.spin == other.spin
            && self.z_scale == other.z_scale
            && self.z_scale_mode == other.z_scale_mode
            && self.fov_scale == other.fov_scale
            && self.fov_mode == other.fov_mode
            && self.dragging == other.dragging
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), &ZScaleConfig::default())
    }
}

impl ViewState {
    /// Initial FOV scale before the first fit to a canvas.
    pub const INITIAL_FOV_SCALE: f64 = 150.0;

    #[must_use]
    pub fn new(camera: &CameraConfig, z: &ZScaleConfig) -> Self {
        let mut state = Self {
            tilt: 0.0,
            spin: 0.0,
            z_scale: z.default_scale,
            z_scale_mode: ScaleMode::Auto,
            fov_scale: Self::INITIAL_FOV_SCALE,
            fov_mode: ScaleMode::Auto,
            dragging: false,
            trig: TrigCache::default(),
        };
        state.set_rotation(camera.default_tilt, camera.default_spin, camera);
        state
    }

    #[inline]
    #[must_use]
    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    #[inline]
    #[must_use]
    pub fn spin(&self) -> f64 {
        self.spin
    }

    #[inline]
    #[must_use]
    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    #[inline]
    #[must_use]
    pub fn z_scale_mode(&self) -> ScaleMode {
        self.z_scale_mode
    }

    #[inline]
    #[must_use]
    pub fn fov_scale(&self) -> f64 {
        self.fov_scale
    }

    #[inline]
    #[must_use]
    pub fn fov_mode(&self) -> ScaleMode {
        self.fov_mode
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Set both angles. Tilt is clamped to the configured range and spin
    /// wrapped into `[0, 360)`. Non-finite input leaves the angle unchanged.
    pub fn set_rotation(&mut self, tilt: f64, spin: f64, camera: &CameraConfig) {
        if tilt.is_finite() {
            self.tilt = tilt.clamp(camera.min_tilt, camera.max_tilt);
        }
        if spin.is_finite() {
            self.spin = spin.rem_euclid(360.0);
        }
    }

    /// Apply a drag of `(dx, dy)` pixels. Horizontal drags spin, vertical
    /// drags tilt (dragging up tilts toward top-down).
    pub fn drag_by(&mut self, dx: f64, dy: f64, camera: &CameraConfig) {
        let k = camera.drag_sensitivity;
        self.set_rotation(self.tilt - dy * k, self.spin + dx * k, camera);
    }

    /// Pin the Z scale. Clamped to the configured range.
    pub fn set_z_scale(&mut self, scale: f64, z: &ZScaleConfig) {
        self.z_scale = z.clamp(scale);
        self.z_scale_mode = ScaleMode::Manual;
    }

    /// Return the Z scale to mesh-derived mode.
    pub fn auto_z_scale(&mut self) {
        self.z_scale_mode = ScaleMode::Auto;
    }

    /// Store a mesh-derived Z scale. Ignored while the scale is pinned.
    pub(crate) fn apply_auto_z_scale(&mut self, scale: f64) {
        if self.z_scale_mode == ScaleMode::Auto {
            self.z_scale = scale;
        }
    }

    /// Pin the FOV scale. Non-positive or non-finite values are ignored.
    pub fn set_fov_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.fov_scale = scale;
            self.fov_mode = ScaleMode::Manual;
        }
    }

    /// Return the FOV scale to canvas-fitted mode.
    pub fn auto_fov_scale(&mut self) {
        self.fov_mode = ScaleMode::Auto;
    }

    pub(crate) fn apply_auto_fov_scale(&mut self, scale: f64) {
        if self.fov_mode == ScaleMode::Auto && scale.is_finite() && scale > 0.0 {
            self.fov_scale = scale;
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Trig values for the current angles, recomputed only when they changed.
    pub fn trig(&mut self) -> ViewTrig {
        if self.trig.tilt != self.tilt || self.trig.spin != self.spin {
            self.trig = TrigCache {
                tilt: self.tilt,
                spin: self.spin,
                trig: ViewTrig::from_angles(self.tilt, self.spin),
            };
        }
        self.trig.trig
    }
}

/// Camera distance for a mesh footprint.
#[must_use]
pub fn camera_distance(extent: &WorldRect, perspective_strength: f64) -> f64 {
    (extent.diagonal() / perspective_strength).max(MIN_CAMERA_DISTANCE)
}

/// FOV scale that makes a mesh of the given world size span `fill_fraction`
/// of the shorter canvas side, independent of rotation.
///
/// `z_extent` is the world height of the mesh after Z scaling.
#[must_use]
pub fn fit_fov_scale(
    extent: &WorldRect,
    z_extent: f64,
    camera_distance: f64,
    width: u32,
    height: u32,
    fill_fraction: f64,
) -> f64 {
    let world = (extent.width().powi(2) + extent.depth().powi(2) + z_extent.powi(2)).sqrt();
    if !(world > f64::EPSILON) {
        return ViewState::INITIAL_FOV_SCALE;
    }
    let target = fill_fraction * width.min(height) as f64;
    target * camera_distance / world
}

/// A frozen camera: trig, distance, scale, and screen origin for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    trig: ViewTrig,
    camera_distance: f64,
    fov_scale: f64,
    origin_x: f64,
    origin_y: f64,
}

impl Projector {
    #[must_use]
    pub fn new(trig: ViewTrig, camera_distance: f64, fov_scale: f64, origin: (f64, f64)) -> Self {
        Self {
            trig,
            camera_distance,
            fov_scale,
            origin_x: origin.0,
            origin_y: origin.1,
        }
    }

    #[inline]
    #[must_use]
    pub fn camera_distance(&self) -> f64 {
        self.camera_distance
    }

    #[inline]
    #[must_use]
    pub fn fov_scale(&self) -> f64 {
        self.fov_scale
    }

    /// Project a world point.
    #[inline]
    #[must_use]
    pub fn project(&self, x: f64, y: f64, z: f64) -> ProjectedPoint {
        let t = &self.trig;
        // Spin about world Z.
        let x1 = x * t.cos_spin - y * t.sin_spin;
        let y1 = x * t.sin_spin + y * t.cos_spin;
        // Tilt: at 0 rad screen-down is +y and the camera looks down -z;
        // at pi/2 screen-down is -z and the camera looks along -y.
        let y_cam = y1 * t.cos_tilt - z * t.sin_tilt;
        let toward_camera = y1 * t.sin_tilt + z * t.cos_tilt;
        let depth = (self.camera_distance - toward_camera).max(NEAR_PLANE);
        let k = self.fov_scale / depth;
        ProjectedPoint {
            x: self.origin_x + x1 * k,
            y: self.origin_y + y_cam * k,
            depth,
        }
    }
}
