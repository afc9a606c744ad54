//! Find the nearest occupied voxel lying within a tolerance of a ray.
//!
//! Rather than marching along the ray, which can step over thin structures,
//! every `(i,j)` column of the grid is tested analytically against the
//! cylinder of radius `tolerance` around the ray:
//!
//! 1. Project onto the plane orthogonal to the ray with `P = I - d dᵗ`. The
//!    squared perpendicular distance of a column point is quadratic in its
//!    `z`; solving it yields the z-interval (if any) of the column lying inside
//!    the cylinder.
//!
//! 2. Only the voxels of the column whose centres fall in that interval are
//!    read. The occupied one with the smallest distance along the ray wins.
//!
//! The cost is `O(nx * ny)` plus a short scan per admitted column, whatever
//! the length of the ray.

use tracing::trace;

use geometry::{column_cylinder_span, ColumnSpan, Point, Ray, Vector};
use units::todo::Lengthf32;
use crate::grid::VolumeGrid;
use crate::index::Index3_u;

/// The nearest occupied voxel found along a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub index: Index3_u,
    /// In the frame of the ray: the voxel centre, or its projection onto the
    /// ray when snapping.
    pub point: Point,
    /// Distance along the ray from its origin to the projection of the voxel
    /// centre
    pub distance: Lengthf32,
}

/// Intersect a ray given in the grid's *local* frame (grid corner at the
/// origin, voxel centres at `(i + 1/2) * pitch`). `None` when no occupied
/// voxel lies within `tolerance` of the ray in front of its origin, or when
/// `direction` cannot be normalized.
pub fn intersect(
    origin: Point,
    direction: Vector,
    grid: &VolumeGrid,
    tolerance: Lengthf32,
    snap: bool,
) -> Option<Hit> {
    intersect_ray(&Ray::new(origin, direction)?, grid, tolerance, snap)
}

pub fn intersect_ray(ray: &Ray, grid: &VolumeGrid, tolerance: Lengthf32, snap: bool) -> Option<Hit> {
    let [nx, ny, nz] = grid.dims();
    let f = grid.voxel_size();
    let projector = ray.projector();

    let mut best: Option<Hit> = None;
    for j in 0..ny {
        let y = (j as Lengthf32 + 0.5) * f.y;
        for i in 0..nx {
            let x = (i as Lengthf32 + 0.5) * f.x;
            let Some(span) = column_cylinder_span(ray, &projector, x, y, tolerance) else { continue };
            let Some(ks) = admitted_layers(&span, f.z, nz) else { continue };
            for k in ks {
                if !(grid.value([i, j, k]) > 0.0) { continue }
                let centre = Point::new(x, y, (k as Lengthf32 + 0.5) * f.z);
                let distance = ray.parameter_of(&centre);
                // Behind the viewer
                if distance < 0.0 { continue }
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(Hit { index: [i, j, k], point: centre, distance });
                }
            }
        }
    }

    match best {
        None => { trace!(origin = ?ray.origin, direction = ?ray.direction, tolerance, "raycast: no hit"); None }
        Some(hit) => {
            trace!(index = ?hit.index, distance = hit.distance, "raycast: hit");
            Some(if snap { Hit { point: ray.at(hit.distance), ..hit } } else { hit })
        }
    }
}

/// The layers `k` whose voxel centres `(k + 1/2) * pitch` lie within the
/// span, clamped to `[0, n-1]`.
fn admitted_layers(span: &ColumnSpan, pitch: Lengthf32, n: usize) -> Option<std::ops::RangeInclusive<usize>> {
    let first = (span.lo / pitch - 0.5).ceil ().max(0.0);
    let last  = (span.hi / pitch - 0.5).floor().min((n - 1) as Lengthf32);
    // Also false for NaN
    if !(first <= last) { return None }
    Some(first as usize ..= last as usize)
}

/// Intersect a ray given in world space with the grid: the ray is mapped into
/// the grid's local frame, intersected there, and the hit mapped back.
pub fn intersect_world(
    origin: Point,
    direction: Vector,
    grid: &VolumeGrid,
    tolerance: Lengthf32,
    snap: bool,
) -> Option<Point> {
    let world = grid.world();
    let local_origin = grid.model_to_local(&world.point_to_model(&origin));
    let local_direction = world.vector_to_model(&direction);
    let hit = intersect(local_origin, local_direction, grid, tolerance, snap)?;
    Some(world.point_to_world(&grid.local_to_model(&hit.point)))
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use float_eq::assert_float_eq;
    use geometry::{point_to_array, Transform};
    use crate::index::{index3_to_1, BoxDim_u};

    fn grid_with(n: BoxDim_u, occupied: &[(Index3_u, f32)]) -> VolumeGrid {
        let mut data = vec![0.0; n[0] * n[1] * n[2]];
        for &(i, v) in occupied { data[index3_to_1(i, n)] = v; }
        VolumeGrid::unit_voxels(n, data).unwrap()
    }

    #[test]
    fn end_to_end_single_voxel() {
        let grid = grid_with([8,8,8], &[([4,4,4], 200.0)]);
        let origin = Point::new(4.5, 4.5, -10.0);
        let direction = Vector::new(0.0, 0.0, 1.0);

        let hit = intersect(origin, direction, &grid, 1.0, true).unwrap();
        assert_eq!(hit.index, [4,4,4]);
        assert_float_eq!(hit.distance, 14.5, ulps <= 2);
        assert_float_eq!(point_to_array(hit.point), [4.5, 4.5, 4.5], abs <= [1e-5; 3]);

        let unsnapped = intersect(origin, direction, &grid, 1.0, false).unwrap();
        assert_eq!(unsnapped.point, Point::new(4.5, 4.5, 4.5));
    }

    #[rstest(/**/   origin        ,  direction       ,
             case([ 4.5, 4.5, -10.0], [0.0, 0.0, 1.0]),
             case([-3.0, 1.0,   2.0], [1.0, 0.3, 0.2]),
             case([ 9.0, 9.0,   9.0], [-1.0, -1.0, -1.0]),
             case([ 0.1, 7.9,   4.0], [1.0, -1.0, 0.0]),
    )]
    fn empty_grid_never_hits(origin: [f32; 3], direction: [f32; 3]) {
        let grid = grid_with([8,8,8], &[]);
        let o = Point::from(origin);
        let d = Vector::from(direction);
        assert_eq!(intersect(o, d, &grid, 2.0, true), None);
        assert_eq!(intersect_world(o, d, &grid, 2.0, true), None);
    }

    #[test]
    fn nearest_of_two_hits_wins() {
        let grid = grid_with([8,8,8], &[([2,3,6], 1.0), ([2,3,1], 1.0)]);
        let hit = intersect(Point::new(2.5, 3.5, -5.0), Vector::z(), &grid, 0.5, false).unwrap();
        assert_eq!(hit.index, [2,3,1]);
        // Reversed ray sees the other one first
        let hit = intersect(Point::new(2.5, 3.5, 20.0), -Vector::z(), &grid, 0.5, false).unwrap();
        assert_eq!(hit.index, [2,3,6]);
    }

    #[test]
    fn rgba_grids_are_occupied_by_alpha() {
        // Voxel (2,3,1) is coloured but transparent; (2,3,6) is opaque
        let n = [8, 8, 8];
        let mut data = vec![0.0; 8 * 8 * 8 * 4];
        let at = |i| index3_to_1(i, n) * 4;
        data[at([2,3,1])..at([2,3,1]) + 4].copy_from_slice(&[255.0, 128.0, 64.0, 0.0]);
        data[at([2,3,6])..at([2,3,6]) + 4].copy_from_slice(&[  0.0,   0.0,  0.0, 0.5]);
        let grid = VolumeGrid::new(n, Vector::new(8.0, 8.0, 8.0), 4, data, Transform::identity()).unwrap();
        let hit = intersect(Point::new(2.5, 3.5, -5.0), Vector::z(), &grid, 0.5, false).unwrap();
        assert_eq!(hit.index, [2,3,6]);
        // With nothing opaque left, nothing is hit
        let mut data = grid.data().to_vec();
        data[at([2,3,6]) + 3] = 0.0;
        let grid = VolumeGrid::new(n, Vector::new(8.0, 8.0, 8.0), 4, data, Transform::identity()).unwrap();
        assert_eq!(intersect(Point::new(2.5, 3.5, -5.0), Vector::z(), &grid, 0.5, false), None);
    }

    #[test]
    fn voxels_behind_origin_are_ignored() {
        let grid = grid_with([8,8,8], &[([2,3,1], 1.0)]);
        assert_eq!(intersect(Point::new(2.5, 3.5, 4.0), Vector::z(), &grid, 0.5, false), None);
    }

    #[test]
    fn tolerance_admits_nearby_columns() {
        // Oblique ray passing 0.6 from the centre of the only occupied voxel
        let grid = grid_with([8,8,8], &[([5,2,3], 1.0)]);
        let origin = Point::new(0.0, 3.1, 3.5);
        let direction = Vector::x();
        assert_eq!(intersect(origin, direction, &grid, 0.5, false), None);
        let hit = intersect(origin, direction, &grid, 0.7, false).unwrap();
        assert_eq!(hit.index, [5,2,3]);
        assert_float_eq!(hit.distance, 5.5, ulps <= 2);
    }

    #[rstest(/**/ tolerance, case(0.0), case(-1.0), case(f32::NAN))]
    fn degenerate_tolerance_never_hits(tolerance: f32) {
        let grid = grid_with([4,4,4], &[([1,1,1], 1.0)]);
        assert_eq!(intersect(Point::new(1.5, 1.5, -1.0), Vector::z(), &grid, tolerance, false), None);
    }

    #[test]
    fn zero_direction_is_no_hit() {
        let grid = grid_with([4,4,4], &[([1,1,1], 1.0)]);
        assert_eq!(intersect(Point::new(1.5, 1.5, -1.0), Vector::zeros(), &grid, 1.0, false), None);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn snapped_hit_lies_on_ray(
            ox in -5.0..13.0_f32, oy in -5.0..13.0_f32,
            tx in 0.0..8.0_f32,   ty in 0.0..8.0_f32, tz in 0.0..8.0_f32,
        ) {
            let grid = grid_with([8,8,8], &[([1,6,2], 1.0), ([4,4,4], 1.0), ([6,1,5], 1.0), ([3,5,7], 1.0)]);
            let origin = Point::new(ox, oy, -20.0);
            let direction = Point::new(tx, ty, tz) - origin;
            if let Some(hit) = intersect(origin, direction, &grid, 3.0, true) {
                let cross = (hit.point - origin).cross(&direction.normalize());
                prop_assert!(cross.norm() < 1e-3, "off ray by {}", cross.norm());
                prop_assert!(hit.distance >= 0.0);
            }
            if let Some(hit) = intersect(origin, direction, &grid, 3.0, false) {
                let [i, j, k] = hit.index;
                let centre = Point::new(i as f32 + 0.5, j as f32 + 0.5, k as f32 + 0.5);
                prop_assert_eq!(hit.point, centre);
            }
        }
    }

    #[test]
    fn world_ray_round_trip() {
        // Grid shifted and rotated a quarter turn about z
        let mut m = nalgebra::Matrix4::identity();
        m[(0,0)] = 0.0; m[(0,1)] = -1.0;
        m[(1,0)] = 1.0; m[(1,1)] =  0.0;
        m[(0,3)] = 10.0; m[(1,3)] = -20.0; m[(2,3)] = 5.0;
        let world = Transform::new(m).unwrap();
        let n = [8,8,8];
        let mut data = vec![0.0; 512];
        data[index3_to_1([6,1,4], n)] = 50.0;
        let grid = VolumeGrid::new(n, Vector::new(8.0, 8.0, 8.0), 1, data, world).unwrap();

        let target = world.point_to_world(&grid.voxel_centre([6,1,4]));
        let origin = target + Vector::new(0.0, 0.0, -30.0);
        let hit = intersect_world(origin, Vector::z(), &grid, 1.0, false).unwrap();
        assert_float_eq!(point_to_array(hit), point_to_array(target), abs <= [1e-4; 3]);

        // A ray offset sideways by 0.3 still finds it, and snapping keeps the offset
        let offset = Vector::new(0.3, 0.0, 0.0);
        let snapped = intersect_world(origin + offset, Vector::z(), &grid, 1.0, true).unwrap();
        assert_float_eq!(point_to_array(snapped), point_to_array(target + offset), abs <= [1e-4; 3]);
    }
}
