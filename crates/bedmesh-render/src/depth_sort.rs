#![forbid(unsafe_code)]

//! Painter's-algorithm ordering.
//!
//! Quads are drawn back to front by the mean depth of their four projected
//! corners. There is no depth buffer. The ordering is only correct because
//! the surface is a height field: cells never interpenetrate and each cell
//! is small relative to the camera distance. Arbitrary geometry (overlapping
//! or self-intersecting surfaces) would show ordering artifacts.

use crate::geometry::{BL, BR, Quad, TL, TR};
use crate::projection::ProjectedPoint;

/// Copy each quad's corners out of a row-major projected lattice with `cols`
/// columns and store their mean depth.
pub fn assign_depths(quads: &mut [Quad], lattice: &[ProjectedPoint], cols: usize) {
    for quad in quads.iter_mut() {
        let (row, col) = quad.cell;
        let base = row * cols + col;
        let mut corners = [0usize; 4];
        corners[BL] = base;
        corners[BR] = base + 1;
        corners[TL] = base + cols;
        corners[TR] = base + cols + 1;

        let mut sum = 0.0;
        for (slot, &i) in quad.projected.iter_mut().zip(corners.iter()) {
            *slot = lattice[i];
            sum += slot.depth;
        }
        quad.avg_depth = sum * 0.25;
    }
}

/// Stable sort by descending `avg_depth`: furthest first, nearest last.
/// Quads with equal depth keep their relative order.
pub fn sort_back_to_front(quads: &mut [Quad]) {
    quads.sort_by(|a, b| b.avg_depth.total_cmp(&a.avg_depth));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PackedRgba;
    use crate::geometry::Vertex;

    fn quad(id: usize, depth: f64) -> Quad {
        let v = Vertex {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            color: PackedRgba::BLACK,
        };
        Quad {
            vertices: [v; 4],
            center_color: PackedRgba::BLACK,
            projected: [ProjectedPoint::default(); 4],
            avg_depth: depth,
            cell: (0, id),
        }
    }

    #[test]
    fn furthest_first() {
        let mut qs = vec![quad(0, 1.0), quad(1, 3.0), quad(2, 2.0)];
        sort_back_to_front(&mut qs);
        let ids: Vec<_> = qs.iter().map(|q| q.cell.1).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn equal_depths_keep_input_order() {
        let mut qs = vec![quad(0, 5.0), quad(1, 2.0), quad(2, 5.0), quad(3, 2.0), quad(4, 5.0)];
        sort_back_to_front(&mut qs);
        let ids: Vec<_> = qs.iter().map(|q| q.cell.1).collect();
        assert_eq!(ids, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn nan_depth_does_not_panic() {
        let mut qs = vec![quad(0, f64::NAN), quad(1, 1.0)];
        sort_back_to_front(&mut qs);
        assert_eq!(qs.len(), 2);
    }

    #[test]
    fn depths_come_from_the_lattice() {
        // 2x3 lattice, depth = index.
        let lattice: Vec<_> = (0..6)
            .map(|i| ProjectedPoint {
                x: i as f64,
                y: 0.0,
                depth: i as f64,
            })
            .collect();
        let mut qs = [quad(0, 0.0), quad(1, 0.0)];
        assign_depths(&mut qs, &lattice, 3);
        // Cell (0,0): corners 0, 1, 3, 4.
        assert_eq!(qs[0].avg_depth, 2.0);
        assert_eq!(qs[0].projected[TL].x, 3.0);
        // Cell (0,1): corners 1, 2, 4, 5.
        assert_eq!(qs[1].avg_depth, 3.0);
        assert_eq!(qs[1].projected[TR].x, 5.0);
    }
}
