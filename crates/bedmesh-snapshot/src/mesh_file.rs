//! Mesh JSON input.
//!
//! Accepts the printer's `bed_mesh` status object as-is, either bare or
//! wrapped in a status query result:
//!
//! ```json
//! { "bed_mesh": {
//!     "profile_name": "default",
//!     "mesh_min": [20.0, 20.0],
//!     "mesh_max": [215.0, 215.0],
//!     "probed_matrix": [[0.01, -0.02], [0.03, 0.00]]
//! } }
//! ```
//!
//! A `bed` rectangle (`{"min": [x, y], "max": [x, y]}`) and an inline
//! renderer `config` may be added alongside.

use std::fs;
use std::path::Path;

use bedmesh_render::{BedBounds, RendererConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SnapshotError};

/// A rectangle in printer millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshFile {
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub probed_matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub mesh_min: Option<[f64; 2]>,
    #[serde(default)]
    pub mesh_max: Option<[f64; 2]>,
    /// Full bed travel. Defaults to the probed area.
    #[serde(default)]
    pub bed: Option<Rect2>,
    #[serde(default)]
    pub config: Option<RendererConfig>,
}

impl MeshFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let file = Self::parse(&text)?;
        if file.probed_matrix.is_empty() {
            return Err(SnapshotError::MissingMatrix {
                path: path.to_path_buf(),
            });
        }
        Ok(file)
    }

    /// Parse a bare or wrapped `bed_mesh` object.
    pub fn parse(text: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(text)?;
        if let Some(inner) = value.get_mut("bed_mesh").map(Value::take) {
            value = inner;
        }
        Ok(serde_json::from_value(value)?)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.probed_matrix.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.probed_matrix.first().map_or(0, Vec::len)
    }

    /// Printer-coordinate bounds, when the file carries the probed area.
    #[must_use]
    pub fn bed_bounds(&self) -> Option<BedBounds> {
        let (min, max) = (self.mesh_min?, self.mesh_max?);
        let bed = self.bed.unwrap_or(Rect2 { min, max });
        Some(BedBounds {
            bed_min_x: bed.min[0],
            bed_max_x: bed.max[0],
            bed_min_y: bed.min[1],
            bed_max_y: bed.max[1],
            mesh_min_x: min[0],
            mesh_max_x: max[0],
            mesh_min_y: min[1],
            mesh_max_y: max[1],
        })
    }
}
