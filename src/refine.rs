//! Nudge an approximate position onto the intensity centroid of its
//! neighbourhood.
//!
//! Electrode contacts show up in CT as small bright blobs, whose centre is
//! better estimated by the intensity-weighted centroid of a small window than
//! by its brightest voxel. Only voxels at least as bright as the one under the
//! starting point take part, so a point sitting on a local maximum stays put.

use itertools::iproduct;
use tracing::{debug, trace};

use geometry::{unit_or_none, Point, Vector};
use units::todo::{Intensityf32, Lengthf32, Ratiof32, Weightf32};
use crate::grid::VolumeGrid;
use crate::index::window;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefineParams {
    /// Half-width of the search window, in world units
    pub max_step: Lengthf32,
    /// Gaussian decay applied to the distance, normalized by `max_step`
    pub decay: f32,
    /// Voxels brighter than this count double
    pub high_confidence: Option<Intensityf32>,
    /// Fraction of the move along a constraint axis which is discarded
    pub constrain_fraction: Ratiof32,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self { max_step: 2.0, decay: 8.0, high_confidence: None, constrain_fraction: 0.9 }
    }
}

/// Intensity-weighted centroid of the window around `point`, with the default
/// parameters. See [`refine`].
pub fn refine_position(point: Point, grid: &VolumeGrid, constrain_axis: Option<Vector>) -> Point {
    refine(point, grid, constrain_axis, &RefineParams::default())
}

/// Return the refined position of `point`; the input is returned unchanged
/// when no voxel in the window carries positive weight.
///
/// When `constrain_axis` is given, `params.constrain_fraction` of the
/// component of the move along it is discarded, so that repeated refinement
/// does not slide a contact along its lead.
pub fn refine(point: Point, grid: &VolumeGrid, constrain_axis: Option<Vector>, params: &RefineParams) -> Point {
    let Some(target) = weighted_centroid(point, grid, params) else {
        debug!(?point, "refine: no confident neighbour, not moving");
        return point
    };
    let mut step = target - point;
    if let Some(axis) = constrain_axis.and_then(unit_or_none) {
        step -= axis * (step.dot(&axis) * params.constrain_fraction);
    }
    debug!(?point, moved_by = step.norm(), "refine");
    point + step
}

fn weighted_centroid(point: Point, grid: &VolumeGrid, params: &RefineParams) -> Option<Point> {
    if !point.iter().all(|x| x.is_finite()) { return None }
    let n = grid.dims();
    // Points outside the volume have no voxel of their own
    let index = grid.world_to_index(&point);
    let inside = (0..3).all(|d| index[d] >= -0.5 && index[d] <= n[d] as f32 - 0.5);
    if !inside { return None }
    let ijk0 = grid.nearest_voxel(&point);
    let value0 = grid.value(ijk0);

    // Window half-width in voxels, per axis
    let pitch = grid.world_pitch();
    let half = pitch.map(|p| {
        let h = (params.max_step / p).round();
        if h.is_finite() && h > 0.0 { h as usize } else { 0 }
    });

    let mut total: Weightf32 = 0.0;
    let mut offset_sum = Vector::zeros();
    for (k, j, i) in iproduct!(window(ijk0[2], half.z, n[2]),
                               window(ijk0[1], half.y, n[1]),
                               window(ijk0[0], half.x, n[0])) {
        let v = grid.value([i, j, k]);
        if !(v >= value0) { continue }
        let offset = Vector::new(i as f32 - ijk0[0] as f32,
                                 j as f32 - ijk0[1] as f32,
                                 k as f32 - ijk0[2] as f32);
        let dist = offset.norm() / params.max_step;
        let mut weight = v * (-dist * dist / params.decay).exp();
        if params.high_confidence.map_or(false, |t| v > t) { weight *= 2.0; }
        // Negative intensities would pull the centroid out of the window
        if !(weight > 0.0) { continue }
        total += weight;
        offset_sum += offset * weight;
    }
    if !(total > 0.0) { return None }

    let centre = Vector::new(ijk0[0] as f32, ijk0[1] as f32, ijk0[2] as f32);
    let target = centre + offset_sum / total;
    trace!(?ijk0, value0, total, "refine: centroid at {:?}", target.as_slice());
    Some(grid.index_to_world(&target))
}
