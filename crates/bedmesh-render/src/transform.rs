#![forbid(unsafe_code)]

//! Grid-to-world coordinate transform.
//!
//! World space is centred on the mesh (or on the bed when printer bounds are
//! known). `+x` points right, `+y` points toward the front of the bed, `+z`
//! up. Row 0 of a mesh is its front edge and therefore maps to `+y`.

use crate::error::{BedMeshError, Result};

/// World units between adjacent grid points when no bed bounds are set.
pub const SCALE: f64 = 50.0;

/// World size the larger bed axis is fitted to when bed bounds are set.
pub const TARGET_WORLD_SIZE: f64 = 200.0;

/// X coordinate of grid column `col`, centred so the mesh is symmetric.
#[inline]
#[must_use]
pub fn col_to_x(col: usize, cols: usize) -> f64 {
    (col as f64 - (cols as f64 - 1.0) * 0.5) * SCALE
}

/// Y coordinate of grid row `row`. Row 0 is the front edge, mapped to `+y`.
#[inline]
#[must_use]
pub fn row_to_y(row: usize, rows: usize) -> f64 {
    ((rows as f64 - 1.0 - row as f64) - (rows as f64 - 1.0) * 0.5) * SCALE
}

/// World height of a sample relative to the mesh centre height.
#[inline]
#[must_use]
pub fn z_to_world(height: f64, center_z: f64, z_scale: f64) -> f64 {
    (height - center_z) * z_scale
}

/// Axis-aligned rectangle in world XY.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl WorldRect {
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[inline]
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.depth())
    }
}

/// Physical bed and probe-area rectangles, in printer millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BedBounds {
    pub bed_min_x: f64,
    pub bed_max_x: f64,
    pub bed_min_y: f64,
    pub bed_max_y: f64,
    pub mesh_min_x: f64,
    pub mesh_max_x: f64,
    pub mesh_min_y: f64,
    pub mesh_max_y: f64,
}

impl BedBounds {
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.bed_min_x,
            self.bed_max_x,
            self.bed_min_y,
            self.bed_max_y,
            self.mesh_min_x,
            self.mesh_max_x,
            self.mesh_min_y,
            self.mesh_max_y,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(BedMeshError::InvalidBounds("non-finite coordinate"));
        }
        if self.bed_max_x <= self.bed_min_x || self.bed_max_y <= self.bed_min_y {
            return Err(BedMeshError::InvalidBounds("empty bed rectangle"));
        }
        if self.mesh_max_x <= self.mesh_min_x || self.mesh_max_y <= self.mesh_min_y {
            return Err(BedMeshError::InvalidBounds("empty probe rectangle"));
        }
        Ok(())
    }
}

/// Maps grid indices to world XY, either by index spacing ([`SCALE`]) or
/// through printer coordinates when [`BedBounds`] are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    rows: usize,
    cols: usize,
    bed: Option<BedMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BedMapping {
    bounds: BedBounds,
    center_x: f64,
    center_y: f64,
    scale: f64,
}

impl GridMapping {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bed: None,
        }
    }

    /// Map through printer coordinates. `bounds` must already be validated.
    #[must_use]
    pub fn with_bed(mut self, bounds: BedBounds) -> Self {
        let bed_w = bounds.bed_max_x - bounds.bed_min_x;
        let bed_h = bounds.bed_max_y - bounds.bed_min_y;
        self.bed = Some(BedMapping {
            bounds,
            center_x: (bounds.bed_min_x + bounds.bed_max_x) * 0.5,
            center_y: (bounds.bed_min_y + bounds.bed_max_y) * 0.5,
            scale: TARGET_WORLD_SIZE / bed_w.max(bed_h),
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn has_bed(&self) -> bool {
        self.bed.is_some()
    }

    /// World units per printer millimetre, if bed bounds are set.
    #[inline]
    #[must_use]
    pub fn world_per_mm(&self) -> Option<f64> {
        self.bed.map(|b| b.scale)
    }

    #[inline]
    #[must_use]
    pub fn x(&self, col: usize) -> f64 {
        match &self.bed {
            None => col_to_x(col, self.cols),
            Some(bed) => {
                let b = &bed.bounds;
                let t = col as f64 / (self.cols - 1).max(1) as f64;
                let mm = b.mesh_min_x + t * (b.mesh_max_x - b.mesh_min_x);
                bed.printer_x(mm)
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn y(&self, row: usize) -> f64 {
        match &self.bed {
            None => row_to_y(row, self.rows),
            Some(bed) => {
                let b = &bed.bounds;
                let t = row as f64 / (self.rows - 1).max(1) as f64;
                let mm = b.mesh_min_y + t * (b.mesh_max_y - b.mesh_min_y);
                bed.printer_y(mm)
            }
        }
    }

    /// Printer X (mm) to world X; `None` without bed bounds.
    #[must_use]
    pub fn printer_x(&self, mm: f64) -> Option<f64> {
        self.bed.map(|b| b.printer_x(mm))
    }

    #[must_use]
    pub fn printer_y(&self, mm: f64) -> Option<f64> {
        self.bed.map(|b| b.printer_y(mm))
    }

    /// World rectangle covered by the probe points.
    #[must_use]
    pub fn mesh_extent(&self) -> WorldRect {
        let (xa, xb) = (self.x(0), self.x(self.cols.saturating_sub(1)));
        let (ya, yb) = (self.y(0), self.y(self.rows.saturating_sub(1)));
        WorldRect {
            x_min: xa.min(xb),
            x_max: xa.max(xb),
            y_min: ya.min(yb),
            y_max: ya.max(yb),
        }
    }

    /// World rectangle of the whole bed, or the mesh extent without bounds.
    #[must_use]
    pub fn bed_extent(&self) -> WorldRect {
        match &self.bed {
            None => self.mesh_extent(),
            Some(bed) => {
                let b = &bed.bounds;
                let (ya, yb) = (bed.printer_y(b.bed_min_y), bed.printer_y(b.bed_max_y));
                WorldRect {
                    x_min: bed.printer_x(b.bed_min_x),
                    x_max: bed.printer_x(b.bed_max_x),
                    y_min: ya.min(yb),
                    y_max: ya.max(yb),
                }
            }
        }
    }

    /// Printer-mm rectangle of the bed, if bounds are set.
    #[must_use]
    pub fn bed_bounds(&self) -> Option<BedBounds> {
        self.bed.map(|b| b.bounds)
    }
}

impl BedMapping {
    #[inline]
    fn printer_x(&self, mm: f64) -> f64 {
        (mm - self.center_x) * self.scale
    }

    /// Printer Y grows toward the back; world Y grows toward the front.
    #[inline]
    fn printer_y(&self, mm: f64) -> f64 {
        (self.center_y - mm) * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_to_x_is_symmetric_for_odd_and_even() {
        for cols in 2..12 {
            assert_eq!(col_to_x(0, cols), -col_to_x(cols - 1, cols), "cols={cols}");
        }
    }

    #[test]
    fn odd_grid_has_centre_at_origin() {
        assert_eq!(col_to_x(2, 5), 0.0);
        assert_eq!(row_to_y(2, 5), 0.0);
        assert_eq!(col_to_x(0, 5), -2.0 * SCALE);
    }

    #[test]
    fn row_zero_is_front() {
        assert!(row_to_y(0, 4) > 0.0);
        assert!(row_to_y(3, 4) < 0.0);
        assert_eq!(row_to_y(0, 4), -row_to_y(3, 4));
    }

    #[test]
    fn z_to_world_centres_and_scales() {
        assert_eq!(z_to_world(0.5, 0.25, 100.0), 25.0);
        assert_eq!(z_to_world(0.25, 0.25, 100.0), 0.0);
    }

    fn bed() -> BedBounds {
        BedBounds {
            bed_min_x: 0.0,
            bed_max_x: 400.0,
            bed_min_y: 0.0,
            bed_max_y: 200.0,
            mesh_min_x: 50.0,
            mesh_max_x: 350.0,
            mesh_min_y: 20.0,
            mesh_max_y: 180.0,
        }
    }

    #[test]
    fn bed_mapping_fits_larger_axis() {
        let m = GridMapping::new(3, 3).with_bed(bed());
        assert_eq!(m.world_per_mm(), Some(0.5));
        let ext = m.bed_extent();
        assert_eq!(ext.width(), TARGET_WORLD_SIZE);
        assert_eq!(ext.depth(), 100.0);
        assert_eq!(ext.x_min, -100.0);
    }

    #[test]
    fn bed_mapping_places_probes_inside_bed() {
        let m = GridMapping::new(3, 3).with_bed(bed());
        assert_eq!(m.x(0), -75.0);
        assert_eq!(m.x(2), 75.0);
        // Row 0 is at printer y=20, front of the bed.
        assert_eq!(m.y(0), 40.0);
        assert_eq!(m.y(2), -40.0);
        let mesh = m.mesh_extent();
        let bed = m.bed_extent();
        assert!(mesh.x_min >= bed.x_min && mesh.x_max <= bed.x_max);
        assert!(mesh.y_min >= bed.y_min && mesh.y_max <= bed.y_max);
    }

    #[test]
    fn bounds_validation() {
        assert!(bed().validate().is_ok());
        let mut b = bed();
        b.bed_max_x = b.bed_min_x;
        assert!(b.validate().is_err());
        let mut b = bed();
        b.mesh_min_y = f64::NAN;
        assert!(b.validate().is_err());
    }

    #[test]
    fn grid_mapping_without_bed_matches_free_functions() {
        let m = GridMapping::new(4, 5);
        assert_eq!(m.x(1), col_to_x(1, 5));
        assert_eq!(m.y(3), row_to_y(3, 4));
        assert_eq!(m.bed_extent(), m.mesh_extent());
        assert_eq!(m.printer_x(10.0), None);
    }
}
