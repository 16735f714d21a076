#![forbid(unsafe_code)]

//! Error types for the bed-mesh renderer.

use thiserror::Error;

/// Result type for renderer operations.
pub type Result<T> = std::result::Result<T, BedMeshError>;

/// Errors reported at the renderer API boundary.
///
/// Two categories exist. Invalid input (bad dimensions, ragged rows,
/// non-finite samples, bad ranges) is rejected without touching renderer
/// state. Not-ready conditions ([`BedMeshError::NoMeshData`],
/// [`BedMeshError::EmptySurface`]) are expected while the host is still
/// laying out or waiting for probe data; the frame is skipped and the host
/// simply retries on the next draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BedMeshError {
    #[error("mesh must have at least 2 rows and 2 columns, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("mesh row {row} has {found} samples, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("mesh has {found} rows, expected {expected}")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("mesh sample at row {row}, col {col} is not finite")]
    NonFiniteSample { row: usize, col: usize },

    #[error("invalid color range: min={min}, max={max}")]
    InvalidColorRange { min: f64, max: f64 },

    #[error("invalid renderer config: {0}")]
    InvalidConfig(&'static str),

    #[error("invalid bed bounds: {0}")]
    InvalidBounds(&'static str),

    #[error("pixel buffer holds {len} pixels, {required} required for {width}x{height} (stride {stride})")]
    SurfaceBuffer {
        width: u32,
        height: u32,
        stride: u32,
        len: usize,
        required: usize,
    },

    #[error("no mesh data loaded")]
    NoMeshData,

    #[error("render surface has no area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
}

impl BedMeshError {
    /// True for conditions that resolve themselves once the host supplies
    /// mesh data or lays out the canvas.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::NoMeshData | Self::EmptySurface { .. })
    }
}
