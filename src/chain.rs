//! Estimate further contacts along an electrode lead from the last two
//! localized ones.
//!
//! Each linear estimate is refined by casting a ray from the camera through it,
//! with a tolerance which grows until the ray finds something close enough to
//! the estimate. Estimates for which nothing is found are kept as they are.

use tracing::{debug, trace};

use geometry::{unit_or_none, Point, Vector};
use units::todo::{Lengthf32, Ratiof32};
use crate::grid::VolumeGrid;
use crate::raycast::intersect_world;
use crate::slice::SlicePlanes;

/// Something a view ray can be cast against, in world space
pub trait RaySource {
    fn cast(&self, origin: Point, direction: Vector, tolerance: Lengthf32) -> Option<Point>;

    /// Whether widening the tolerance can change the outcome of [`cast`]
    ///
    /// [`cast`]: RaySource::cast
    fn tolerance_sensitive(&self) -> bool { true }
}

/// Volumetric raycasting through a CT grid
#[derive(Clone, Copy, Debug)]
pub struct VolumeSource<'g> {
    pub grid: &'g VolumeGrid,
    pub snap: bool,
}

impl<'g> VolumeSource<'g> {
    pub fn new(grid: &'g VolumeGrid, snap: bool) -> Self { Self { grid, snap } }
}

impl RaySource for VolumeSource<'_> {
    fn cast(&self, origin: Point, direction: Vector, tolerance: Lengthf32) -> Option<Point> {
        intersect_world(origin, direction, self.grid, tolerance, self.snap)
    }
}

impl RaySource for SlicePlanes {
    fn cast(&self, origin: Point, direction: Vector, _: Lengthf32) -> Option<Point> {
        self.intersect(origin, direction)
    }

    fn tolerance_sensitive(&self) -> bool { false }
}

/// How the raycast tolerance is widened while refining a single estimate,
/// and how far from the estimate a hit may be accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Escalation {
    pub start: Lengthf32,
    pub step: Lengthf32,
    /// Exclusive
    pub max: Lengthf32,
    /// A hit is accepted if closer to the estimate than
    /// `accept_radius + accept_growth * tolerance`
    pub accept_radius: Lengthf32,
    pub accept_growth: Ratiof32,
}

impl Default for Escalation {
    fn default() -> Self {
        Self { start: 0.5, step: 0.5, max: 100.0, accept_radius: 10.0, accept_growth: 0.1 }
    }
}

impl Escalation {
    fn tolerances(self) -> impl Iterator<Item = Lengthf32> {
        let Self { start, step, max, .. } = self;
        // Computed up front, so that a bad step cannot loop forever
        let count = if step > 0.0 { ((max - start) / step).ceil().max(1.0) as usize } else { 1 };
        (0..count).map(move |i| start + step * i as Lengthf32)
    }

    fn accepts(&self, miss: Lengthf32, tolerance: Lengthf32) -> bool {
        miss < self.accept_radius + self.accept_growth * tolerance
    }
}

/// New contact positions, and the lead direction they were estimated along
#[derive(Clone, Debug, PartialEq)]
pub struct ChainEstimate {
    pub positions: Vec<Point>,
    /// Unit vector; `None` if the last two contacts coincide
    pub direction: Option<Vector>,
}

/// Refine `estimate` by casting from `camera` through it. `None` if no
/// acceptable hit turns up at any tolerance.
pub fn locate(estimate: Point, camera: Point, source: &impl RaySource, escalation: &Escalation) -> Option<Point> {
    let direction = unit_or_none(estimate - camera)?;
    let attempts = if source.tolerance_sensitive() { usize::MAX } else { 1 };
    for tolerance in escalation.tolerances().take(attempts) {
        let Some(hit) = source.cast(camera, direction, tolerance) else { continue };
        let miss = (hit - estimate).norm();
        if escalation.accepts(miss, tolerance) {
            trace!(tolerance, miss, "chain: estimate refined");
            return Some(hit)
        }
    }
    trace!(?estimate, "chain: keeping linear estimate");
    None
}

fn last_two(points: &[Point]) -> Option<(Point, Point)> {
    match points {
        [.., a, b] => Some((*a, *b)),
        _ => None,
    }
}

/// Fill in the contacts between the last two points, so that `count` contacts
/// span them, both ends included.
///
/// Returns the `count - 2` interior positions in order, followed by the last
/// point re-derived by the same raycast refinement. `None` when there are fewer
/// than two points or `count <= 2`.
pub fn interpolate_chain(
    points: &[Point],
    camera: Point,
    source: &impl RaySource,
    count: usize,
    escalation: &Escalation,
) -> Option<ChainEstimate> {
    let (from, to) = last_two(points)?;
    if count <= 2 { return None }
    let n = count - 1;
    let step = (to - from) / n as Lengthf32;

    let mut positions: Vec<Point> = (1..n)
        .map(|ii| from + step * ii as Lengthf32)
        .map(|estimate| locate(estimate, camera, source, escalation).unwrap_or(estimate))
        .collect();
    positions.push(locate(to, camera, source, escalation).unwrap_or(to));
    debug!(interior = n - 1, "chain: interpolated");
    Some(ChainEstimate { positions, direction: unit_or_none(step) })
}

/// Continue the chain beyond its last point with `count - 2` further contacts,
/// spaced like the last two. The step is re-aimed at every refined hit, so
/// curved leads are followed.
///
/// `None` when there are fewer than two points or `count <= 2`.
pub fn extend_chain(
    points: &[Point],
    camera: Point,
    source: &impl RaySource,
    count: usize,
    escalation: &Escalation,
) -> Option<ChainEstimate> {
    let (from, to) = last_two(points)?;
    if count <= 2 { return None }
    let mut step = to - from;
    let spacing = step.norm();

    let mut estimate = to;
    let mut positions = Vec::with_capacity(count - 2);
    for _ in 2..count {
        estimate += step;
        if let Some(hit) = locate(estimate, camera, source, escalation) {
            if let Some(bent) = unit_or_none(step + (hit - estimate)) {
                step = bent * spacing;
            }
            estimate = hit;
        }
        positions.push(estimate);
    }
    debug!(added = positions.len(), "chain: extended");
    Some(ChainEstimate { positions, direction: unit_or_none(step) })
}


#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use float_eq::assert_float_eq;
    use geometry::point_to_array;
    use crate::index::index3_to_1;

    /// Never hits anything
    struct Nothing;
    impl RaySource for Nothing {
        fn cast(&self, _: Point, _: Vector, _: Lengthf32) -> Option<Point> { None }
    }

    /// Hits a fixed point once the tolerance is large enough
    struct FixedAt { point: Point, needs: Lengthf32 }
    impl RaySource for FixedAt {
        fn cast(&self, _: Point, _: Vector, tolerance: Lengthf32) -> Option<Point> {
            (tolerance >= self.needs).then_some(self.point)
        }
    }

    fn line() -> Vec<Point> { vec![Point::new(0.0, 0.0, 0.0), Point::new(9.0, 0.0, 0.0)] }
    fn camera() -> Point { Point::new(4.0, 0.0, 500.0) }

    #[test]
    fn degenerate_requests_are_noops() {
        let esc = Escalation::default();
        assert_eq!(interpolate_chain(&line()[..1], camera(), &Nothing, 5, &esc), None);
        assert_eq!(interpolate_chain(&line(), camera(), &Nothing, 2, &esc), None);
        assert_eq!(extend_chain(&[], camera(), &Nothing, 5, &esc), None);
        assert_eq!(extend_chain(&line(), camera(), &Nothing, 1, &esc), None);
    }

    #[test]
    fn linear_interpolation_without_hits() {
        let got = interpolate_chain(&line(), camera(), &Nothing, 4, &Escalation::default()).unwrap();
        let xs: Vec<f32> = got.positions.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 6.0, 9.0]);
        assert_eq!(got.direction, Some(Vector::x()));
    }

    #[test]
    fn linear_extension_without_hits() {
        let got = extend_chain(&line(), camera(), &Nothing, 4, &Escalation::default()).unwrap();
        let xs: Vec<f32> = got.positions.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![18.0, 27.0]);
    }

    #[test]
    fn hit_is_accepted_only_near_estimate() {
        let esc = Escalation::default();
        let near = FixedAt { point: Point::new(5.0, 1.0, 0.0), needs: 3.0 };
        assert_eq!(locate(Point::new(5.0, 0.0, 0.0), camera(), &near, &esc), Some(near.point));
        // 12 away: acceptable only once tolerance reaches 20
        let far = FixedAt { point: Point::new(5.0, 12.0, 0.0), needs: 0.5 };
        assert_eq!(locate(Point::new(5.0, 0.0, 0.0), camera(), &far, &esc), Some(far.point));
        let too_far = FixedAt { point: Point::new(5.0, 25.0, 0.0), needs: 0.5 };
        assert_eq!(locate(Point::new(5.0, 0.0, 0.0), camera(), &too_far, &esc), None);
    }

    #[test]
    fn tolerance_schedule() {
        let t: Vec<f32> = Escalation::default().tolerances().collect();
        assert_eq!(t.len(), 199);
        assert_eq!(t[0], 0.5);
        assert_eq!(t[198], 99.5);
        let stuck = Escalation { step: 0.0, ..Escalation::default() };
        assert_eq!(stuck.tolerances().count(), 1);
    }

    #[test]
    fn extension_follows_curve() {
        // Every hit is displaced sideways by one unit: the step turns towards it
        struct Sideways;
        impl RaySource for Sideways {
            fn cast(&self, origin: Point, direction: Vector, _: Lengthf32) -> Option<Point> {
                // Where the ray crosses z = 0, nudged in +y
                let t = -origin.z / direction.z;
                Some(origin + direction * t + Vector::y())
            }
        }
        let got = extend_chain(&line(), camera(), &Sideways, 4, &Escalation::default()).unwrap();
        assert_float_eq!(point_to_array(got.positions[0]), [18.0, 1.0, 0.0], abs <= [1e-3; 3]);
        let direction = got.direction.unwrap();
        assert!(direction.y > 0.0);
        assert_float_eq!(direction.norm(), 1.0, abs <= 1e-6);
        // Spacing preserved
        let spacing = (got.positions[1] - got.positions[0]).norm();
        assert!((spacing - 9.0).abs() < 1.5, "spacing {spacing}");
    }

    #[test]
    fn interpolation_through_volume_is_ordered() {
        // A straight lead of bright contacts along x, in a 32 mm cube
        let n = [32, 32, 32];
        let mut data = vec![0.0; 32 * 32 * 32];
        for i in (4..=28).step_by(4) { data[index3_to_1([i, 16, 16], n)] = 1000.0; }
        let grid = VolumeGrid::unit_voxels(n, data).unwrap();
        let contact = |i: usize| grid.voxel_centre([i, 16, 16]);
        let points = vec![contact(4), contact(28)];
        let source = VolumeSource::new(&grid, false);
        let camera = Point::new(0.0, 0.5, 300.0);

        let got = interpolate_chain(&points, camera, &source, 7, &Escalation::default()).unwrap();
        assert_eq!(got.positions.len(), 6);
        let step = points[1] - points[0];
        let along: Vec<f32> = got.positions.iter().map(|p| (p - points[0]).dot(&step)).collect();
        assert!(along.windows(2).all(|w| w[0] < w[1]), "not monotonic: {along:?}");
        for (got, i) in got.positions.iter().zip([8, 12, 16, 20, 24, 28]) {
            assert_float_eq!(point_to_array(*got), point_to_array(contact(i)), abs <= [1e-3; 3]);
        }
    }

    #[test]
    fn unsnapped_hits_correct_lateral_error() {
        let n = [32, 32, 32];
        let mut data = vec![0.0; 32 * 32 * 32];
        for i in (4..=28).step_by(4) { data[index3_to_1([i, 16, 16], n)] = 1000.0; }
        let grid = VolumeGrid::unit_voxels(n, data).unwrap();
        let contact = |i: usize| grid.voxel_centre([i, 16, 16]);
        // Both ends clicked 1.5 mm off the lead
        let off = Vector::new(0.0, 1.5, 0.0);
        let points = vec![contact(4) + off, contact(28) + off];
        let camera = Point::new(0.0, 0.5, 300.0);
        let miss = |snap| {
            let got = interpolate_chain(&points, camera, &VolumeSource::new(&grid, snap), 7, &Escalation::default()).unwrap();
            got.positions.iter().zip([8, 12, 16, 20, 24, 28])
                .map(|(p, i)| (p - contact(i)).norm())
                .fold(0.0, f32::max)
        };
        assert!(miss(false) < 1e-3, "{}", miss(false));
        assert!(miss(true) > 1.0, "{}", miss(true));
    }

    #[test]
    fn slice_source_takes_single_attempt() {
        let slices = SlicePlanes::new(Point::new(-50.0, -50.0, -50.0), Point::new(50.0, 50.0, 50.0))
            .with_axial(0.0);
        let camera = Point::new(0.0, 0.0, 100.0);
        let got = interpolate_chain(&line(), camera, &slices, 4, &Escalation::default()).unwrap();
        let xs: Vec<f32> = got.positions.iter().map(|p| p.x).collect();
        assert_float_eq!(xs[0], 3.0, abs <= 1e-4);
        assert_float_eq!(xs[1], 6.0, abs <= 1e-4);
        assert_float_eq!(xs[2], 9.0, abs <= 1e-4);
    }
}
