use std::path::PathBuf;

use bedmesh_render::BedMeshError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("render error: {0}")]
    Render(#[from] BedMeshError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("mesh file has no probed_matrix: {path}")]
    MissingMatrix { path: PathBuf },
}

impl SnapshotError {
    /// Process exit code: 2 for bad input, 3 when the engine was not ready,
    /// 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::MissingMatrix { .. } | Self::Json(_) => 2,
            Self::Render(err) if err.is_not_ready() => 3,
            Self::Render(_) => 2,
            Self::Io(_) | Self::Image(_) => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
