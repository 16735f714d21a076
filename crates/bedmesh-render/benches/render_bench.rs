//! Benchmarks for the bed-mesh render paths.
//!
//! Run with: cargo bench -p bedmesh-render --bench render_bench

use bedmesh_render::depth_sort::sort_back_to_front;
use bedmesh_render::raster::{Rasterizer, ScreenVertex};
use bedmesh_render::{BedMeshRenderer, Framebuffer, PackedRgba, RenderMode};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Wavy 20x20 mesh in the +-0.2 mm range typical of a trammed bed.
fn wavy_mesh(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|r| {
            (0..n)
                .map(|c| 0.2 * ((r as f64 * 0.7).sin() * (c as f64 * 0.4).cos()))
                .collect()
        })
        .collect()
}

fn renderer(mode: RenderMode, dragging: bool) -> BedMeshRenderer {
    let mesh = wavy_mesh(20);
    let mut r = BedMeshRenderer::default();
    r.set_mesh_data(&mesh, 20, 20).expect("valid mesh");
    r.set_render_mode(mode);
    r.set_dragging(dragging);
    r
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/path");
    for &(w, h) in &[(480u32, 272u32), (800, 480)] {
        group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));
        for (name, mode, dragging) in [
            ("gradient_3d", RenderMode::Force3D, false),
            ("solid_3d", RenderMode::Force3D, true),
            ("heatmap_2d", RenderMode::Force2D, false),
        ] {
            let mut r = renderer(mode, dragging);
            let mut fb = Framebuffer::new(w, h);
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &(), |b, _| {
                b.iter(|| black_box(r.render(&mut fb).expect("render")))
            });
        }
    }
    group.finish();
}

fn bench_orbit(c: &mut Criterion) {
    // Rotation between frames exercises the trig cache and re-sorting.
    let mut r = renderer(RenderMode::Force3D, true);
    let mut fb = Framebuffer::new(480, 272);
    let mut spin = 0.0;
    c.bench_function("render/orbit_solid_480x272", |b| {
        b.iter(|| {
            spin = (spin + 3.0) % 360.0;
            r.set_rotation(-30.0, spin);
            black_box(r.render(&mut fb).expect("render"))
        })
    });
}

fn bench_raster(c: &mut Criterion) {
    let raster = Rasterizer::default();
    let mut fb = Framebuffer::new(480, 272);
    let tri = [
        ScreenVertex::new(20.5, 10.0, PackedRgba::RED),
        ScreenVertex::new(460.0, 60.25, PackedRgba::GREEN),
        ScreenVertex::new(200.0, 260.0, PackedRgba::BLUE),
    ];
    let mut group = c.benchmark_group("raster/triangle");
    group.bench_function("solid", |b| {
        b.iter(|| black_box(raster.fill_solid(&mut fb, black_box(tri), PackedRgba::WHITE)))
    });
    group.bench_function("gradient", |b| {
        b.iter(|| black_box(raster.fill_gradient(&mut fb, black_box(tri))))
    });
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut r = renderer(RenderMode::Force3D, false);
    let mut fb = Framebuffer::new(480, 272);
    r.render(&mut fb).expect("render");
    let quads = r.draw_order().to_vec();
    c.bench_function("depth_sort/361_quads", |b| {
        b.iter_batched(
            || {
                let mut q = quads.clone();
                q.reverse();
                q
            },
            |mut q| {
                sort_back_to_front(&mut q);
                black_box(q)
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_paths, bench_orbit, bench_raster, bench_sort);
criterion_main!(benches);
