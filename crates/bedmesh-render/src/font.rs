#![forbid(unsafe_code)]

//! Tiny 5x7 bitmap font for axis and tooltip labels.
//!
//! Only the characters labels need are present: digits, sign and decimal
//! point, the axis letters and `m` for millimetres. Unknown characters
//! advance the pen without drawing.

use crate::color::PackedRgba;
use crate::framebuffer::Surface;
use crate::raster::fill_rect;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal pen advance per character, including one column of spacing.
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

type Glyph = [u8; 7];

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

#[rustfmt::skip]
const MINUS: Glyph = [0, 0, 0, 0b11111, 0, 0, 0];
#[rustfmt::skip]
const PLUS: Glyph = [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0];
#[rustfmt::skip]
const DOT: Glyph = [0, 0, 0, 0, 0, 0b01100, 0b01100];
#[rustfmt::skip]
const X: Glyph = [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001];
#[rustfmt::skip]
const Y: Glyph = [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100];
#[rustfmt::skip]
const Z: Glyph = [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111];
#[rustfmt::skip]
const M: Glyph = [0, 0, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001];

/// Bitmap rows for `c`, top row first, bit 4 = leftmost column.
#[must_use]
pub fn glyph(c: char) -> Option<&'static Glyph> {
    match c {
        '0'..='9' => Some(&DIGITS[c as usize - '0' as usize]),
        '-' => Some(&MINUS),
        '+' => Some(&PLUS),
        '.' => Some(&DOT),
        'X' | 'x' => Some(&X),
        'Y' | 'y' => Some(&Y),
        'Z' | 'z' => Some(&Z),
        'm' => Some(&M),
        _ => None,
    }
}

/// Width in pixels of `text` at `scale`, without trailing spacing.
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n.saturating_mul(GLYPH_ADVANCE)
        .saturating_sub(1)
        .saturating_mul(scale.max(1))
}

#[inline]
fn offset(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Draw `text` with its top-left corner at `(x, y)`. Returns pixels written.
pub fn draw_text<S: Surface + ?Sized>(
    surface: &mut S,
    x: i32,
    y: i32,
    text: &str,
    color: PackedRgba,
    scale: u32,
) -> u32 {
    let scale = scale.max(1);
    let mut written = 0;
    let mut pen = x;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (dy, bits) in rows.iter().enumerate() {
                for dx in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - dx)) != 0 {
                        written += fill_rect(
                            surface,
                            pen.saturating_add(offset(dx.saturating_mul(scale))),
                            y.saturating_add(offset((dy as u32).saturating_mul(scale))),
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
        pen = pen.saturating_add(offset(GLYPH_ADVANCE.saturating_mul(scale)));
    }
    written
}
