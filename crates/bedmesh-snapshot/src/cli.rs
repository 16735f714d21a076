use std::path::PathBuf;

use bedmesh_render::RenderMode;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::Result;
use crate::snapshot::{run_bench, run_render};

#[derive(Debug, Parser)]
#[command(
    name = "bedmesh-snapshot",
    about = "Render printer bed-mesh JSON to PNG with the software bed-mesh renderer",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render one frame to a PNG file.
    Render(RenderArgs),

    /// Render repeatedly, then report the adaptive mode decision.
    Bench(BenchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => Self::Auto,
            ModeArg::TwoD => Self::Force2D,
            ModeArg::ThreeD => Self::Force3D,
        }
    }
}

/// Options shared by every command that builds a renderer.
#[derive(Debug, Clone, Args)]
pub struct SceneArgs {
    /// Mesh JSON (a `bed_mesh` status object).
    pub mesh: PathBuf,

    #[arg(long, default_value_t = 480, value_parser = clap::value_parser!(u32).range(1..=8192))]
    pub width: u32,

    #[arg(long, default_value_t = 272, value_parser = clap::value_parser!(u32).range(1..=8192))]
    pub height: u32,

    /// Renderer config JSON; overrides a config embedded in the mesh file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start from the high-quality preset instead of the defaults.
    #[arg(long, conflicts_with = "config")]
    pub high_quality: bool,

    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    /// Camera tilt in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub tilt: Option<f64>,

    /// Camera spin in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub spin: Option<f64>,

    /// Fixed Z exaggeration instead of the mesh-derived one.
    #[arg(long)]
    pub z_scale: Option<f64>,

    /// Fixed color range `MIN,MAX` in mm.
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    pub color_range: Option<(f64, f64)>,

    /// Draw the zero plane at this height (mm).
    #[arg(long, allow_hyphen_values = true)]
    pub zero_plane: Option<f64>,

    /// Shift added to displayed heights (mm).
    #[arg(long, allow_hyphen_values = true)]
    pub z_offset: Option<f64>,

    /// Ignore `mesh_min`/`mesh_max` and place probe points by index.
    #[arg(long)]
    pub no_bounds: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    #[arg(long, short)]
    pub output: PathBuf,

    /// Render as if dragging (solid fill).
    #[arg(long)]
    pub dragging: bool,

    /// Touch point `X,Y` in pixels; selects a probe point in 2D mode.
    #[arg(long, value_parser = parse_pair)]
    pub touch: Option<(f64, f64)>,

    /// Print the frame report as JSON on stdout.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    /// Spin added per frame, in degrees.
    #[arg(long, default_value_t = 6.0)]
    pub spin_step: f64,
}

fn parse_pair(text: &str) -> std::result::Result<(f64, f64), String> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated numbers, got {text:?}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|err| format!("{s:?}: {err}"))
    };
    Ok((parse(a)?, parse(b)?))
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Bench(args) => run_bench(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_command() {
        let cli = Cli::try_parse_from([
            "bedmesh-snapshot",
            "render",
            "mesh.json",
            "-o",
            "out.png",
            "--tilt",
            "-40",
            "--mode",
            "2d",
            "--color-range",
            "-0.1,0.2",
            "--touch",
            "10,20",
        ])
        .unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.scene.tilt, Some(-40.0));
        assert_eq!(args.scene.mode, ModeArg::TwoD);
        assert_eq!(args.scene.color_range, Some((-0.1, 0.2)));
        assert_eq!(args.touch, Some((10.0, 20.0)));
        assert_eq!((args.scene.width, args.scene.height), (480, 272));
    }

    #[test]
    fn rejects_zero_width() {
        assert!(
            Cli::try_parse_from(["bedmesh-snapshot", "bench", "m.json", "--width", "0"]).is_err()
        );
    }

    #[test]
    fn pair_parser_reports_bad_input() {
        assert!(parse_pair("1.5").is_err());
        assert!(parse_pair("a,2").is_err());
        assert_eq!(parse_pair(" 1 , -2 "), Ok((1.0, -2.0)));
    }

    #[test]
    fn mode_arg_maps_to_render_mode() {
        assert_eq!(RenderMode::from(ModeArg::ThreeD), RenderMode::Force3D);
        assert_eq!(RenderMode::from(ModeArg::Auto), RenderMode::Auto);
    }
}
