//! Volumes on disk: a small TOML descriptor next to a raw voxel buffer.
//!
//! ```toml
//! data      = "ct.raw"                         # relative to the descriptor
//! dims      = [256, 256, 180]
//! size      = ["256 mm", "256 mm", "180 mm"]
//! channels  = 1                                # optional
//! transform = [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1]  # optional, row-major
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use geometry::{Transform, Vector};
use units::{mm_, Length};
use crate::config::deserialize_uom_3d;
use crate::error::{LocalizeError, Result};
use crate::grid::VolumeGrid;

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VolumeDescriptor {
    pub data: PathBuf,
    pub dims: (usize, usize, usize),
    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub size: (Length, Length, Length),
    #[serde(default = "one")]
    pub channels: usize,
    #[serde(default)]
    pub transform: Option<Vec<f32>>,
}

fn one() -> usize { 1 }

impl VolumeDescriptor {
    pub fn world(&self) -> Result<Transform> {
        let Some(elements) = &self.transform else { return Ok(Transform::identity()) };
        let elements: &[f32; 16] = elements.as_slice().try_into()
            .map_err(|_| LocalizeError::Descriptor(format!("transform needs 16 numbers, got {}", elements.len())))?;
        Transform::from_row_major(elements).ok_or(LocalizeError::SingularTransform)
    }

    /// Read the voxel buffer, resolving `data` relative to `base`
    pub fn load(&self, base: &Path) -> Result<VolumeGrid> {
        let path = base.join(&self.data);
        let data = super::raw::read_all(&path)?;
        let (nx, ny, nz) = self.dims;
        let (sx, sy, sz) = self.size;
        let size = Vector::new(mm_(sx), mm_(sy), mm_(sz));
        debug!(path = %path.display(), dims = ?self.dims, "loading volume");
        VolumeGrid::new([nx, ny, nz], size, self.channels, data, self.world()?)
    }
}

pub fn read_descriptor(path: &Path) -> Result<VolumeDescriptor> {
    Ok(toml::from_str(&fs::read_to_string(path)?)?)
}

/// Load the volume described by the TOML file at `path`
pub fn load_volume(path: &Path) -> Result<VolumeGrid> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    read_descriptor(path)?.load(base)
}
