//! Drives the engine the way the embedded panel does: load, configure,
//! render, and hand the framebuffer to an encoder.

use std::fs;
use std::path::Path;

use bedmesh_render::{BedMeshRenderer, FrameReport, Framebuffer, ModeDecision, RendererConfig};
use image::{ImageFormat, RgbImage};
use tracing::{debug, info};

use crate::cli::{BenchArgs, RenderArgs, SceneArgs};
use crate::error::{Result, SnapshotError};
use crate::mesh_file::MeshFile;

/// Renderer plus canvas built from the shared scene options.
#[derive(Debug)]
pub struct Scene {
    pub renderer: BedMeshRenderer,
    pub framebuffer: Framebuffer,
}

impl Scene {
    pub fn load(args: &SceneArgs) -> Result<Self> {
        let mesh = MeshFile::load(&args.mesh)?;
        let config = match (&args.config, args.high_quality) {
            (Some(path), _) => serde_json::from_str(&fs::read_to_string(path)?)?,
            (None, true) => RendererConfig::high_quality(),
            (None, false) => mesh.config.clone().unwrap_or_default(),
        };

        let mut renderer = BedMeshRenderer::new(config)?;
        renderer.set_mesh_data(&mesh.probed_matrix, mesh.rows(), mesh.cols())?;
        if !args.no_bounds {
            if let Some(bounds) = mesh.bed_bounds() {
                renderer.set_bounds(bounds)?;
            }
        }
        renderer.set_render_mode(args.mode.into());

        let (tilt, spin) = renderer.rotation();
        renderer.set_rotation(args.tilt.unwrap_or(tilt), args.spin.unwrap_or(spin));
        if let Some(scale) = args.z_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(SnapshotError::invalid("z scale must be positive"));
            }
            renderer.set_z_scale(scale);
        }
        if let Some((min, max)) = args.color_range {
            renderer.set_color_range(min, max)?;
        }
        if let Some(offset) = args.zero_plane {
            renderer.set_zero_plane_visible(true);
            renderer.set_zero_plane_offset(offset);
        }
        if let Some(offset) = args.z_offset {
            renderer.set_z_display_offset(offset);
        }

        info!(
            mesh = %args.mesh.display(),
            profile = mesh.profile_name.as_deref().unwrap_or("-"),
            rows = mesh.rows(),
            cols = mesh.cols(),
            width = args.width,
            height = args.height,
            "scene loaded"
        );
        Ok(Self {
            renderer,
            framebuffer: Framebuffer::new(args.width, args.height),
        })
    }

    pub fn render(&mut self) -> Result<FrameReport> {
        Ok(self.renderer.render(&mut self.framebuffer)?)
    }
}

/// Encode a framebuffer as PNG.
pub fn write_png(framebuffer: &Framebuffer, path: &Path) -> Result<()> {
    use bedmesh_render::Surface;

    let (width, height) = (framebuffer.width(), framebuffer.height());
    let image = RgbImage::from_raw(width, height, framebuffer.to_rgb8())
        .ok_or_else(|| SnapshotError::invalid("framebuffer size does not match its pixels"))?;
    image.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), width, height, "png written");
    Ok(())
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    let mut scene = Scene::load(&args.scene)?;
    scene.renderer.set_dragging(args.dragging);
    if let Some((x, y)) = args.touch {
        let (w, h) = (args.scene.width, args.scene.height);
        if !scene.renderer.handle_touch(x, y, w, h) {
            info!(x, y, "touch ignored (3D mode or outside the grid)");
        }
    }

    let report = scene.render()?;
    write_png(&scene.framebuffer, &args.output)?;
    info!(
        output = %args.output.display(),
        path = report.path.as_str(),
        quads = report.quads_drawn,
        "snapshot written"
    );
    if args.report {
        println!("{}", report.to_jsonl());
    }
    Ok(())
}

/// Outcome of a bench run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchSummary {
    pub frames: u32,
    pub decision: ModeDecision,
}

pub fn bench(args: &BenchArgs) -> Result<BenchSummary> {
    let mut scene = Scene::load(&args.scene)?;
    for _ in 0..args.frames {
        let (tilt, spin) = scene.renderer.rotation();
        scene.renderer.set_rotation(tilt, spin + args.spin_step);
        let report = scene.render()?;
        debug!(frame = %report.to_jsonl(), "bench frame");
    }
    let decision = scene.renderer.evaluate_render_mode();
    info!(
        average_fps = decision.average_fps,
        using_2d = decision.using_2d,
        "bench finished"
    );
    Ok(BenchSummary {
        frames: args.frames,
        decision,
    })
}

pub fn run_bench(args: BenchArgs) -> Result<()> {
    let summary = bench(&args)?;
    println!("{}", summary.decision.to_jsonl());
    Ok(())
}
