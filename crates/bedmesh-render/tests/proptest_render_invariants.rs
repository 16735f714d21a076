//! Property-based invariant tests for the render pipeline.
//!
//! 1. Grid placement is centred and row 0 is the front edge.
//! 2. Two triangles sharing an edge cover a rectangle exactly once.
//! 3. Fill counts match the pixels touched, track the analytic area, and
//!    are zero off-canvas.
//! 4. Heat-map normalization is bounded and monotonic.
//! 5. Painter's sort is descending and stable.
//! 6. Projection stays finite for every camera the config allows.
//! 7. Heat-map hit testing picks the nearest probe point.
//! 8. Any valid mesh renders with a fully ordered draw list.

use bedmesh_render::color::PackedRgba;
use bedmesh_render::depth_sort::sort_back_to_front;
use bedmesh_render::framebuffer::{Framebuffer, Surface};
use bedmesh_render::geometry::{Quad, Vertex};
use bedmesh_render::gradient::HeatGradient;
use bedmesh_render::heatmap::HeatmapLayout;
use bedmesh_render::projection::{ProjectedPoint, Projector, ViewTrig};
use bedmesh_render::raster::{Rasterizer, ScreenVertex};
use bedmesh_render::transform::{col_to_x, row_to_y};
use bedmesh_render::{BedMeshRenderer, RenderMode};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Screen coordinate on a quarter-pixel lattice, partly off-canvas.
fn coord() -> impl Strategy<Value = f32> {
    (-80i32..400).prop_map(|q| q as f32 * 0.25)
}

fn extent() -> impl Strategy<Value = f32> {
    (1i32..200).prop_map(|q| q as f32 * 0.25)
}

fn opaque() -> impl Strategy<Value = PackedRgba> {
    (1u8..=255, 1u8..=255, 1u8..=255).prop_map(|(r, g, b)| PackedRgba::rgb(r, g, b))
}

fn covered(lo: f32, hi: f32, limit: u32) -> i64 {
    let a = ((lo - 0.5).ceil() as i64).clamp(0, i64::from(limit));
    let b = ((hi - 0.5).ceil() as i64).clamp(0, i64::from(limit));
    (b - a).max(0)
}

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

fn mesh(rows: usize, cols: usize, seed: &[i16]) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| f64::from(seed[(r * cols + c) % seed.len()]) / 1000.0)
                .collect()
        })
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Grid placement
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn columns_are_centred(cols in 2usize..40, c in 0usize..40) {
        let c = c % cols;
        let mirrored = col_to_x(cols - 1 - c, cols);
        prop_assert!((col_to_x(c, cols) + mirrored).abs() < 1e-9);
    }

    #[test]
    fn front_row_is_positive_y(rows in 2usize..40) {
        prop_assert!(row_to_y(0, rows) > 0.0);
        prop_assert!((row_to_y(0, rows) + row_to_y(rows - 1, rows)).abs() < 1e-9);
        for r in 1..rows {
            prop_assert!(row_to_y(r, rows) < row_to_y(r - 1, rows));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Rasterization coverage
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_rectangle_covers_each_pixel_once(
        x0 in coord(),
        y0 in coord(),
        w in extent(),
        h in extent(),
    ) {
        let (x1, y1) = (x0 + w, y0 + h);
        let mut fb = Framebuffer::new(64, 48);
        let r = Rasterizer::default();
        let c = PackedRgba::WHITE;
        let v = |x, y| ScreenVertex::new(x, y, c);
        let a = r.fill_solid(&mut fb, [v(x0, y0), v(x1, y0), v(x0, y1)], c);
        let b = r.fill_solid(&mut fb, [v(x1, y0), v(x1, y1), v(x0, y1)], c);

        let expected = covered(x0, x1, 64) * covered(y0, y1, 48);
        prop_assert_eq!(i64::from(a + b), expected);
        prop_assert_eq!(fb.count_not(PackedRgba::BLACK) as i64, expected);
    }

    #[test]
    fn gradient_fill_count_matches_touched_pixels(
        pts in prop::array::uniform3((coord(), coord())),
        colors in prop::array::uniform3(opaque()),
    ) {
        let mut fb = Framebuffer::new(64, 48);
        let tri = [0, 1, 2].map(|i| ScreenVertex::new(pts[i].0, pts[i].1, colors[i]));
        let n = Rasterizer::default().fill_gradient(&mut fb, tri);
        prop_assert_eq!(n as usize, fb.count_not(PackedRgba::BLACK));
        prop_assert!(n <= fb.width() * fb.height());
    }
}

proptest! {
    #[test]
    fn triangle_outside_writes_nothing(
        pts in prop::array::uniform3((coord(), coord())),
        shift in prop::sample::select(vec![(-200.0f32, 0.0f32), (200.0, 0.0), (0.0, -200.0), (0.0, 200.0)]),
    ) {
        let mut fb = Framebuffer::new(64, 48);
        let tri = [0, 1, 2].map(|i| {
            // Push every vertex past one side of the canvas.
            let (x, y) = pts[i];
            let x = if shift.0 < 0.0 { x.min(0.0) - 100.0 } else if shift.0 > 0.0 { x.max(64.0) + 100.0 } else { x };
            let y = if shift.1 < 0.0 { y.min(0.0) - 100.0 } else if shift.1 > 0.0 { y.max(48.0) + 100.0 } else { y };
            ScreenVertex::new(x, y, PackedRgba::WHITE)
        });
        let r = Rasterizer::default();
        prop_assert_eq!(r.fill_solid(&mut fb, tri, PackedRgba::WHITE), 0);
        prop_assert_eq!(r.fill_gradient(&mut fb, tri), 0);
        prop_assert_eq!(fb.count_not(PackedRgba::BLACK), 0);
    }

    #[test]
    fn inside_triangle_count_approximates_area(
        pts in prop::array::uniform3((4.0f32..60.0, 4.0f32..44.0)),
    ) {
        let mut fb = Framebuffer::new(64, 48);
        let tri = pts.map(|(x, y)| ScreenVertex::new(x, y, PackedRgba::WHITE));
        let n = Rasterizer::default().fill_solid(&mut fb, tri, PackedRgba::WHITE);

        let [(ax, ay), (bx, by), (cx, cy)] = pts;
        let area = ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs() as f64 * 0.5;
        let perimeter = [(ax, ay, bx, by), (bx, by, cx, cy), (cx, cy, ax, ay)]
            .iter()
            .map(|&(x0, y0, x1, y1)| f64::from((x1 - x0).hypot(y1 - y0)))
            .sum::<f64>();
        // Each scanline can gain or lose at most one pixel per edge.
        prop_assert!((f64::from(n) - area).abs() <= perimeter + 2.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Color mapping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn normalize_is_bounded_and_monotonic(
        min in -2.0f64..2.0,
        span in 0.001f64..3.0,
        a in -6.0f64..6.0,
        b in -6.0f64..6.0,
    ) {
        let g = HeatGradient::default();
        let max = min + span;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (tl, th) = (g.normalize(lo, min, max), g.normalize(hi, min, max));
        prop_assert!((0.0..=1.0).contains(&tl));
        prop_assert!((0.0..=1.0).contains(&th));
        prop_assert!(tl <= th);
    }

    #[test]
    fn degenerate_range_maps_to_midpoint(v in -5.0f64..5.0, m in -5.0f64..5.0) {
        prop_assert_eq!(HeatGradient::default().normalize(v, m, m), 0.5);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Painter's sort
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sort_is_descending_and_stable(depths in prop::collection::vec(0u8..8, 0..64)) {
        let mut quads: Vec<Quad> = depths
            .iter()
            .enumerate()
            .map(|(i, &d)| quad(i, f64::from(d)))
            .collect();
        sort_back_to_front(&mut quads);
        for pair in quads.windows(2) {
            prop_assert!(pair[0].avg_depth >= pair[1].avg_depth);
            if pair[0].avg_depth == pair[1].avg_depth {
                prop_assert!(pair[0].cell.1 < pair[1].cell.1);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Projection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn projection_is_finite(
        tilt in -89.0f64..=-10.0,
        spin in 0.0f64..360.0,
        x in -1000.0f64..1000.0,
        y in -1000.0f64..1000.0,
        z in -1000.0f64..1000.0,
        fov in 1.0f64..2000.0,
    ) {
        let p = Projector::new(ViewTrig::from_angles(tilt, spin), 300.0, fov, (160.0, 120.0));
        let q = p.project(x, y, z);
        prop_assert!(q.x.is_finite() && q.y.is_finite() && q.depth.is_finite());
        prop_assert!(q.depth >= 1.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Heat-map hit testing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hit_test_picks_nearest_point(
        rows in 2usize..12,
        cols in 2usize..12,
        fx in 0.0f64..0.999,
        fy in 0.0f64..0.999,
    ) {
        let layout = HeatmapLayout::new(240, 180, rows, cols, 8).unwrap();
        let (x0, y0) = layout.point(rows - 1, 0);
        let (x1, y1) = layout.point(0, cols - 1);
        let (x, y) = (x0 + fx * (x1 - x0), y0 + fy * (y1 - y0));
        let (row, col) = layout.hit_test(x, y).unwrap();
        let (px, py) = layout.point(row, col);
        let best = (px - x).hypot(py - y);
        for r in 0..rows {
            for c in 0..cols {
                let (qx, qy) = layout.point(r, c);
                prop_assert!(best <= (qx - x).hypot(qy - y) + 1e-9);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. End to end
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_mesh_renders_in_depth_order(
        rows in 2usize..8,
        cols in 2usize..8,
        seed in prop::collection::vec(-500i16..500, 1..64),
        tilt in -89.0f64..=-10.0,
        spin in 0.0f64..360.0,
    ) {
        let grid = mesh(rows, cols, &seed);
        let mut r = BedMeshRenderer::default();
        r.set_render_mode(RenderMode::Force3D);
        r.set_mesh_data(&grid, rows, cols).unwrap();
        r.set_rotation(tilt, spin);
        let mut fb = Framebuffer::new(96, 72);
        let report = r.render(&mut fb).unwrap();
        prop_assert_eq!(report.quads_drawn, (rows - 1) * (cols - 1));
        prop_assert_eq!(r.draw_order().len(), report.quads_drawn);
        for pair in r.draw_order().windows(2) {
            prop_assert!(pair[0].avg_depth >= pair[1].avg_depth);
        }
    }
}
