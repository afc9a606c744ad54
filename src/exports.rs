pub use crate::raycast::{intersect, intersect_world, intersect_world as localize_from_ray, Hit};
pub use crate::refine::{refine, refine_position, RefineParams};
pub use crate::atlas::{label_position, AtlasEntry, AtlasLabel, AtlasTable, Labeler};
pub use crate::chain::{extend_chain, interpolate_chain, ChainEstimate, Escalation, RaySource, VolumeSource};
pub use crate::slice::SlicePlanes;
pub use crate::grid::VolumeGrid;
pub use crate::electrode::{Electrode, ElectrodeChain, Hemisphere, Mode};
pub use crate::export::{ExportRow, SubjectTransforms};
pub use crate::error::{LocalizeError, Result};

pub use units::todo::{Lengthf32, Intensityf32, Ratiof32, Weightf32};

pub use geometry::{Point, Vector, Transform};

pub use crate::index::{BoxDim_u, Index1_u, Index3_u};
