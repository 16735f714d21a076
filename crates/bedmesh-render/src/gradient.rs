#![forbid(unsafe_code)]

//! Height-to-color mapping.
//!
//! The curve runs purple, blue, cyan, yellow, red, deep red over five linear
//! segments. Before lookup the data range is compressed around its midpoint
//! so small deviations get more of the palette; afterwards each color is
//! pulled toward its own luma gray for a muted look.

use crate::color::PackedRgba;
use crate::config::GradientConfig;

/// Below this a color range is treated as a single value.
const RANGE_EPSILON: f64 = 1e-9;

/// Heat-map color curve built from a [`GradientConfig`].
#[derive(Debug, Clone)]
pub struct HeatGradient {
    compression: f64,
    /// Segment start positions: 0 followed by the four breakpoints.
    starts: [f64; 5],
    /// Reciprocal segment widths.
    inv_widths: [f64; 5],
    breakpoints: [f64; 4],
    stops: [PackedRgba; 6],
    desaturation: f32,
}

impl HeatGradient {
    #[must_use]
    pub fn new(config: &GradientConfig) -> Self {
        let b = config.breakpoints;
        let starts = [0.0, b[0], b[1], b[2], b[3]];
        let ends = [b[0], b[1], b[2], b[3], 1.0];
        let mut inv_widths = [0.0; 5];
        for i in 0..5 {
            let w = ends[i] - starts[i];
            inv_widths[i] = if w > 0.0 { 1.0 / w } else { 0.0 };
        }
        Self {
            compression: config.compression,
            starts,
            inv_widths,
            breakpoints: b,
            stops: config.stops,
            desaturation: config.desaturation as f32,
        }
    }

    /// Position of `value` on the palette, in `[0, 1]`.
    ///
    /// A degenerate range maps everything to the midpoint.
    #[must_use]
    pub fn normalize(&self, value: f64, min: f64, max: f64) -> f64 {
        let range = max - min;
        if !(range > RANGE_EPSILON) || !value.is_finite() {
            return 0.5;
        }
        let mid = (min + max) * 0.5;
        let half = range * 0.5 * self.compression;
        ((value - (mid - half)) / (2.0 * half)).clamp(0.0, 1.0)
    }

    /// Color for `value` within `[min, max]`.
    #[must_use]
    pub fn color(&self, value: f64, min: f64, max: f64) -> PackedRgba {
        self.color_at(self.normalize(value, min, max))
    }

    /// Color at a normalized palette position.
    #[must_use]
    pub fn color_at(&self, t: f64) -> PackedRgba {
        let t = t.clamp(0.0, 1.0);
        // Segment index is the number of breakpoints at or below t.
        let seg = self.breakpoints.iter().map(|&b| (t >= b) as usize).sum::<usize>();
        let local = ((t - self.starts[seg]) * self.inv_widths[seg]).clamp(0.0, 1.0);
        let base = self.stops[seg].lerp(self.stops[seg + 1], local as f32);
        self.desaturate(base)
    }

    #[inline]
    fn desaturate(&self, c: PackedRgba) -> PackedRgba {
        if self.desaturation <= 0.0 {
            return c;
        }
        let gray = c.luma();
        let k = self.desaturation;
        let pull = |v: u8| (v as f32 + (gray - v as f32) * k + 0.5).clamp(0.0, 255.0) as u8;
        PackedRgba::rgb(pull(c.r()), pull(c.g()), pull(c.b()))
    }
}

impl Default for HeatGradient {
    fn default() -> Self {
        Self::new(&GradientConfig::default())
    }
}
