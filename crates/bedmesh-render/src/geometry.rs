#![forbid(unsafe_code)]

//! Quad generation from a height grid.
//!
//! Every cell between four neighbouring probe points becomes one [`Quad`].
//! Vertex order is fixed across the whole mesh:
//!
//! ```text
//!   [2] TL ---- [3] TR        back  (row + 1)
//!    |        /  |
//!    |      /    |
//!   [0] BL ---- [1] BR        front (row)
//! ```
//!
//! The shared diagonal always runs BR to TL, which gives the triangle split
//! [`QUAD_TRIANGLES`].

use crate::color::PackedRgba;
use crate::gradient::HeatGradient;
use crate::mesh::MeshGrid;
use crate::projection::{ProjectedPoint, Projector};
use crate::transform::{GridMapping, z_to_world};

pub const BL: usize = 0;
pub const BR: usize = 1;
pub const TL: usize = 2;
pub const TR: usize = 3;

/// Vertex indices of the two triangles each quad is rasterized as.
pub const QUAD_TRIANGLES: [[usize; 3]; 2] = [[BL, BR, TL], [BR, TR, TL]];

/// A world-space vertex with its heat-map color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: PackedRgba,
}

/// One mesh cell.
///
/// `projected` and `avg_depth` are filled in by the projection pass and are
/// only meaningful for the frame that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub vertices: [Vertex; 4],
    pub center_color: PackedRgba,
    pub projected: [ProjectedPoint; 4],
    pub avg_depth: f64,
    /// Grid cell `(row, col)` of the BL corner.
    pub cell: (usize, usize),
}

/// Height normalization applied while generating geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZParams {
    pub center: f64,
    pub scale: f64,
}

/// Color range the heat map is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBounds {
    pub min: f64,
    pub max: f64,
}

/// Rebuild `out` with one quad per mesh cell, front row first.
///
/// `out` is cleared first; its allocation is reused across frames.
pub fn generate_quads(
    mesh: &MeshGrid,
    mapping: &GridMapping,
    z: ZParams,
    gradient: &HeatGradient,
    colors: ColorBounds,
    out: &mut Vec<Quad>,
) {
    out.clear();
    out.reserve(mesh.cell_count());

    let vertex = |row: usize, col: usize| {
        let h = mesh.get(row, col);
        Vertex {
            x: mapping.x(col),
            y: mapping.y(row),
            z: z_to_world(h, z.center, z.scale),
            color: gradient.color(h, colors.min, colors.max),
        }
    };

    for row in 0..mesh.rows() - 1 {
        for col in 0..mesh.cols() - 1 {
            let vertices = [
                vertex(row, col),
                vertex(row, col + 1),
                vertex(row + 1, col),
                vertex(row + 1, col + 1),
            ];
            let center_color = PackedRgba::average4([
                vertices[BL].color,
                vertices[BR].color,
                vertices[TL].color,
                vertices[TR].color,
            ]);
            out.push(Quad {
                vertices,
                center_color,
                projected: [ProjectedPoint::default(); 4],
                avg_depth: 0.0,
                cell: (row, col),
            });
        }
    }
}

/// Project every grid point once, row-major into `out`.
///
/// The lattice is shared by quad depth assignment and wireframe drawing.
pub fn project_lattice(
    mesh: &MeshGrid,
    mapping: &GridMapping,
    z: ZParams,
    projector: &Projector,
    out: &mut Vec<ProjectedPoint>,
) {
    out.clear();
    out.reserve(mesh.rows() * mesh.cols());
    for row in 0..mesh.rows() {
        let y = mapping.y(row);
        for col in 0..mesh.cols() {
            let h = z_to_world(mesh.get(row, col), z.center, z.scale);
            out.push(projector.project(mapping.x(col), y, h));
        }
    }
}
