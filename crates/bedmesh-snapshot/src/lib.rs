#![forbid(unsafe_code)]

//! Off-device driver for `bedmesh-render`: loads printer bed-mesh JSON,
//! renders it with the same pipeline as the embedded panel, and writes PNGs.

pub mod cli;
pub mod error;
pub mod mesh_file;
pub mod snapshot;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{Result, SnapshotError};

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be set (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
