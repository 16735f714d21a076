#![forbid(unsafe_code)]

//! Software renderer for 3D printer bed-mesh height maps.
//!
//! Turns a grid of probed bed heights into pixels on a plain RGBA surface:
//! a perspective-projected, heat-colored surface with reference grids, axes
//! and labels, or a flat 2D heat map when the device is too slow for 3D.
//! There is no GPU and no depth buffer; quads are painter-sorted and filled
//! with integer scanline rasterization.
//!
//! # Role in the workspace
//! `bedmesh-render` is the engine. The `bedmesh-snapshot` binary wraps it to
//! render mesh files to PNG from the command line.
//!
//! # Quick start
//!
//! ```
//! use bedmesh_render::{BedMeshRenderer, Framebuffer, RenderMode, RenderPath};
//!
//! let mut renderer = BedMeshRenderer::default();
//! renderer
//!     .set_mesh_data(&[[0.0, 0.1], [0.05, -0.02]], 2, 2)
//!     .unwrap();
//!
//! let mut fb = Framebuffer::new(200, 150);
//! assert_eq!(renderer.render(&mut fb).unwrap().path, RenderPath::Gradient3D);
//!
//! renderer.set_render_mode(RenderMode::Force2D);
//! assert_eq!(renderer.render(&mut fb).unwrap().path, RenderPath::Heatmap2D);
//! ```
//!
//! # Features
//! - `tracing`: structured logs through the `tracing` crate.
//! - `serde`: `Serialize`/`Deserialize` for configuration, bed bounds and
//!   view state.

pub mod logging;

pub mod color;
pub mod config;
pub mod depth_sort;
pub mod error;
pub mod font;
pub mod frame_stats;
pub mod framebuffer;
pub mod geometry;
pub mod gradient;
pub mod heatmap;
pub mod mesh;
pub mod mode;
pub mod overlay;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod transform;

pub use color::PackedRgba;
pub use config::RendererConfig;
pub use error::{BedMeshError, Result};
pub use framebuffer::{Framebuffer, PixelSlice, Surface};
pub use heatmap::TouchedCell;
pub use mesh::{HeightBounds, MeshGrid};
pub use mode::{ModeDecision, RenderMode, RenderPath};
pub use projection::{ScaleMode, ViewState};
pub use renderer::{BedMeshRenderer, ColorRange, FrameReport};
pub use transform::BedBounds;
