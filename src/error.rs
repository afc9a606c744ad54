use thiserror::Error;
use crate::index::BoxDim_u;

/// Everything that can go wrong while loading volumes, tables and
/// configuration. The geometric queries themselves never fail: they report
/// misses with `Option`.
#[derive(Error, Debug)]
pub enum LocalizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("voxel buffer holds {actual} values, but {dims:?} voxels with {channels} channel(s) need {expected}")]
    GridShape { dims: BoxDim_u, channels: usize, expected: usize, actual: usize },

    #[error("unsupported channel count {0} (expected 1 or 4)")]
    Channels(usize),

    #[error("invalid grid extent: {0}")]
    Extent(String),

    #[error("volume descriptor: {0}")]
    Descriptor(String),

    #[error("world transform is singular or not finite")]
    SingularTransform,

    #[error("lookup table line {line}: {reason}")]
    LookupTable { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, LocalizeError>;
