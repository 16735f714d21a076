#![forbid(unsafe_code)]

//! Render path selection.
//!
//! Three paths exist, from most to least expensive:
//!
//! | Path        | When                                               |
//! |-------------|----------------------------------------------------|
//! | `Gradient3D`| static 3D view                                     |
//! | `Solid3D`   | 3D view while the user is dragging                 |
//! | `Heatmap2D` | forced, or auto mode measured too low an FPS      |
//!
//! The drag toggle switches between the two 3D paths on every frame. The
//! switch to 2D only happens in [`ModeController::evaluate`], which the host
//! calls when the panel becomes visible; the view never changes tier while
//! the user is looking at it. Auto mode does not upgrade back to 3D on its
//! own; forcing a mode or re-selecting auto clears the fallback.

#[cfg(feature = "tracing")]
use crate::logging::{debug, info};
#[cfg(not(feature = "tracing"))]
use crate::{debug, info};

use web_time::Duration;

use crate::config::AdaptiveConfig;
use crate::frame_stats::{FPS_WINDOW, FrameTimeWindow};

/// User or developer preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RenderMode {
    /// 3D unless measured performance is too low.
    #[default]
    Auto,
    /// Always the 2D heat map.
    Force2D,
    /// Always 3D, regardless of FPS.
    Force3D,
}

impl RenderMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Force2D => "force_2d",
            Self::Force3D => "force_3d",
        }
    }
}

/// Pipeline actually used for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RenderPath {
    Gradient3D,
    Solid3D,
    Heatmap2D,
}

impl RenderPath {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gradient3D => "gradient_3d",
            Self::Solid3D => "solid_3d",
            Self::Heatmap2D => "heatmap_2d",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_3d(self) -> bool {
        !matches!(self, Self::Heatmap2D)
    }
}

/// Outcome of a panel-entry evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeDecision {
    pub mode: RenderMode,
    pub average_fps: f64,
    pub samples: usize,
    pub threshold: f64,
    /// Whether 2D is in use after the evaluation.
    pub using_2d: bool,
    /// Whether this evaluation switched from 3D to 2D.
    pub switched: bool,
}

impl ModeDecision {
    /// One JSON line for logs and snapshot tooling.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"bedmesh-mode-v1","mode":"{}","average_fps":{:.2},"samples":{},"threshold":{:.2},"using_2d":{},"switched":{}}}"#,
            self.mode.as_str(),
            self.average_fps,
            self.samples,
            self.threshold,
            self.using_2d,
            self.switched,
        )
    }
}

/// Tracks frame times and picks the render path.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: RenderMode,
    fallback_2d: bool,
    fps_threshold: f64,
    frames: FrameTimeWindow<FPS_WINDOW>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(&AdaptiveConfig::default())
    }
}

impl ModeController {
    #[must_use]
    pub fn new(config: &AdaptiveConfig) -> Self {
        Self {
            mode: config.initial_mode,
            fallback_2d: false,
            fps_threshold: config.fps_threshold,
            frames: FrameTimeWindow::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Change the preference. Clears any automatic 2D fallback.
    pub fn set_mode(&mut self, mode: RenderMode) {
        if mode != self.mode || self.fallback_2d {
            info!(from = self.mode.as_str(), to = mode.as_str(), "render mode set");
        }
        self.mode = mode;
        self.fallback_2d = false;
    }

    /// Whether frames currently go down the 2D path.
    #[inline]
    #[must_use]
    pub fn is_using_2d(&self) -> bool {
        match self.mode {
            RenderMode::Force2D => true,
            RenderMode::Force3D => false,
            RenderMode::Auto => self.fallback_2d,
        }
    }

    /// Path for the next frame.
    #[must_use]
    pub fn select_path(&self, dragging: bool) -> RenderPath {
        if self.is_using_2d() {
            RenderPath::Heatmap2D
        } else if dragging {
            RenderPath::Solid3D
        } else {
            RenderPath::Gradient3D
        }
    }

    pub fn record_frame(&mut self, frame: Duration) {
        self.frames.record(frame);
    }

    #[must_use]
    pub fn average_fps(&self) -> f64 {
        self.frames.average_fps()
    }

    /// Panel-entry check. In auto mode, a full window averaging below the
    /// threshold moves rendering to 2D.
    pub fn evaluate(&mut self) -> ModeDecision {
        let average_fps = self.frames.average_fps();
        let too_slow = self.frames.is_full() && average_fps < self.fps_threshold;
        let switched = self.mode == RenderMode::Auto && !self.fallback_2d && too_slow;
        if switched {
            self.fallback_2d = true;
            info!(
                average_fps,
                threshold = self.fps_threshold,
                "falling back to 2D heat map"
            );
        }
        let decision = ModeDecision {
            mode: self.mode,
            average_fps,
            samples: self.frames.len(),
            threshold: self.fps_threshold,
            using_2d: self.is_using_2d(),
            switched,
        };
        debug!(evidence = %decision.to_jsonl(), "render mode evaluated");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slow(ctrl: &mut ModeController, frames: usize) {
        for _ in 0..frames {
            ctrl.record_frame(Duration::from_millis(100));
        }
    }

    #[test]
    fn drag_selects_solid() {
        let c = ModeController::default();
        assert_eq!(c.select_path(false), RenderPath::Gradient3D);
        assert_eq!(c.select_path(true), RenderPath::Solid3D);
    }

    #[test]
    fn low_fps_falls_back_on_evaluation_only() {
        let mut c = ModeController::default();
        slow(&mut c, FPS_WINDOW);
        // Recording alone never changes the path.
        assert_eq!(c.select_path(false), RenderPath::Gradient3D);
        let d = c.evaluate();
        assert!(d.switched && d.using_2d);
        assert_eq!(c.select_path(true), RenderPath::Heatmap2D);
    }

    #[test]
    fn partial_window_does_not_fall_back() {
        let mut c = ModeController::default();
        slow(&mut c, FPS_WINDOW - 1);
        assert!(!c.evaluate().using_2d);
    }

    #[test]
    fn no_automatic_upgrade() {
        let mut c = ModeController::default();
        slow(&mut c, FPS_WINDOW);
        c.evaluate();
        for _ in 0..FPS_WINDOW {
            c.record_frame(Duration::from_millis(1));
        }
        let d = c.evaluate();
        assert!(d.using_2d && !d.switched);
    }

    #[test]
    fn forced_modes_ignore_fps() {
        let mut c = ModeController::default();
        c.set_mode(RenderMode::Force3D);
        slow(&mut c, FPS_WINDOW);
        assert!(!c.evaluate().using_2d);
        c.set_mode(RenderMode::Force2D);
        assert!(c.is_using_2d());
        assert_eq!(c.select_path(false), RenderPath::Heatmap2D);
    }

    #[test]
    fn reselecting_auto_clears_fallback() {
        let mut c = ModeController::default();
        slow(&mut c, FPS_WINDOW);
        c.evaluate();
        assert!(c.is_using_2d());
        c.set_mode(RenderMode::Auto);
        assert!(!c.is_using_2d());
    }

    #[test]
    fn decision_jsonl_shape() {
        let mut c = ModeController::default();
        let line = c.evaluate().to_jsonl();
        assert!(line.starts_with(r#"{"schema":"bedmesh-mode-v1""#));
        assert!(line.contains(r#""mode":"auto""#));
        assert!(line.contains(r#""average_fps":60.00"#));
        assert!(line.ends_with('}'));
    }
}
