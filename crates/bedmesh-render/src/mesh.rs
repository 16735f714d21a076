#![forbid(unsafe_code)]

//! Probed height grid.

use crate::error::{BedMeshError, Result};

/// Min/max over a mesh, recomputed whenever the mesh is replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightBounds {
    pub min: f64,
    pub max: f64,
}

impl HeightBounds {
    /// Ranges below this are treated as a flat mesh.
    pub const FLAT_EPSILON: f64 = 1e-6;

    #[inline]
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.range() < Self::FLAT_EPSILON
    }
}

/// A rectangular `rows x cols` grid of heights in millimetres, row-major.
///
/// Row 0 is the front edge of the bed, column 0 the left edge. Construction
/// validates that there are at least 2 rows and columns, that every row has
/// the same length, and that every sample is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGrid {
    rows: usize,
    cols: usize,
    samples: Vec<f64>,
    bounds: HeightBounds,
}

impl MeshGrid {
    /// Build from a slice of rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        check_dimensions(row_count, cols)?;

        let mut samples = Vec::with_capacity(row_count * cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                return Err(BedMeshError::RaggedRow {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            samples.extend_from_slice(values);
        }
        Self::from_flat(row_count, cols, samples)
    }

    /// Build from row-major samples.
    pub fn from_flat(rows: usize, cols: usize, samples: Vec<f64>) -> Result<Self> {
        check_dimensions(rows, cols)?;
        if samples.len() != rows * cols {
            return Err(BedMeshError::RaggedRow {
                row: samples.len() / cols,
                expected: cols,
                found: samples.len() % cols,
            });
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (i, &z) in samples.iter().enumerate() {
            if !z.is_finite() {
                return Err(BedMeshError::NonFiniteSample {
                    row: i / cols,
                    col: i % cols,
                });
            }
            min = min.min(z);
            max = max.max(z);
        }

        Ok(Self {
            rows,
            cols,
            samples,
            bounds: HeightBounds { min, max },
        })
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    /// Height at `(row, col)`. Panics on out-of-range indices, like slice indexing.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.samples[row * self.cols + col]
    }

    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of quads (cells) the grid forms.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        (self.rows - 1) * (self.cols - 1)
    }
}

fn check_dimensions(rows: usize, cols: usize) -> Result<()> {
    if rows < 2 || cols < 2 {
        return Err(BedMeshError::InvalidDimensions { rows, cols });
    }
    Ok(())
}
