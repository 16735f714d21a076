#![forbid(unsafe_code)]

//! Packed RGBA color used by every stage of the pipeline.
//!
//! Layout is `0xRRGGBBAA`. Surface colors are always opaque; overlay colors
//! may carry alpha, which the rasterizer blends over the existing pixel.

/// A 32-bit RGBA color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Opaque color from components.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[inline]
    #[must_use]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    #[must_use]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    #[must_use]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a() == 255
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t + 0.5) as u8;
        Self::rgba(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
            mix(self.a(), other.a()),
        )
    }

    /// Integer average of two colors.
    #[inline]
    #[must_use]
    pub const fn average(self, other: Self) -> Self {
        Self::rgba(
            ((self.r() as u16 + other.r() as u16) / 2) as u8,
            ((self.g() as u16 + other.g() as u16) / 2) as u8,
            ((self.b() as u16 + other.b() as u16) / 2) as u8,
            ((self.a() as u16 + other.a() as u16) / 2) as u8,
        )
    }

    /// Integer average of four colors.
    #[must_use]
    pub const fn average4(colors: [Self; 4]) -> Self {
        let mut sum = [0u16; 4];
        let mut i = 0;
        while i < 4 {
            sum[0] += colors[i].r() as u16;
            sum[1] += colors[i].g() as u16;
            sum[2] += colors[i].b() as u16;
            sum[3] += colors[i].a() as u16;
            i += 1;
        }
        Self::rgba(
            (sum[0] / 4) as u8,
            (sum[1] / 4) as u8,
            (sum[2] / 4) as u8,
            (sum[3] / 4) as u8,
        )
    }

    /// Composite `self` over an opaque destination pixel.
    #[inline]
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        match self.a() {
            255 => self,
            0 => dst,
            a => {
                let a = a as u32;
                let inv = 255 - a;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
                Self::rgb(
                    mix(self.r(), dst.r()),
                    mix(self.g(), dst.g()),
                    mix(self.b(), dst.b()),
                )
            }
        }
    }

    /// Rec.601 luma in `[0, 255]`.
    #[inline]
    #[must_use]
    pub fn luma(self) -> f32 {
        0.299 * self.r() as f32 + 0.587 * self.g() as f32 + 0.114 * self.b() as f32
    }

    /// `[r, g, b]` bytes, alpha dropped.
    #[inline]
    #[must_use]
    pub const fn to_rgb_bytes(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }
}
