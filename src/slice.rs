//! Ray source for localizing on displayed MRI slices rather than in a CT
//! volume: the view ray is intersected with the active orthogonal slice
//! planes.

use ncollide3d::query::RayCast;
use ncollide3d::shape::Plane;

use geometry::{unit_or_none, Point, Vector};
use units::todo::Lengthf32;

type NcRay      = ncollide3d::query::Ray     <Lengthf32>;
type NcPoint    = ncollide3d::math::Point    <Lengthf32>;
type NcVector   = ncollide3d::math::Vector   <Lengthf32>;
type NcIsometry = ncollide3d::math::Isometry <Lengthf32>;

/// Points within this distance outside the slice box still count as on a slice
const BOX_SLACK: Lengthf32 = 1e-3;

/// The three orthogonal slices currently on display, in world coordinates.
/// A slice set to `None` is hidden and never hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlicePlanes {
    /// Plane `x = sagittal`
    pub sagittal: Option<Lengthf32>,
    /// Plane `y = coronal`
    pub coronal: Option<Lengthf32>,
    /// Plane `z = axial`
    pub axial: Option<Lengthf32>,
    /// Opposite corners of the box to which the slices are drawn
    pub lower: Point,
    pub upper: Point,
}

impl SlicePlanes {

    /// No slice active; add them with the `with_*` methods
    pub fn new(lower: Point, upper: Point) -> Self {
        Self { sagittal: None, coronal: None, axial: None, lower, upper }
    }

    pub fn with_sagittal(self, x: Lengthf32) -> Self { Self { sagittal: Some(x), ..self } }
    pub fn with_coronal (self, y: Lengthf32) -> Self { Self { coronal:  Some(y), ..self } }
    pub fn with_axial   (self, z: Lengthf32) -> Self { Self { axial:    Some(z), ..self } }

    fn contains(&self, p: &Point) -> bool {
        (0..3).all(|d| p[d] >= self.lower[d] - BOX_SLACK && p[d] <= self.upper[d] + BOX_SLACK)
    }

    /// Nearest point in front of `origin` where the ray crosses an active
    /// slice inside the slice box.
    pub fn intersect(&self, origin: Point, direction: Vector) -> Option<Point> {
        let direction = unit_or_none(direction)?;
        let ray = NcRay::new(NcPoint::new(origin.x, origin.y, origin.z),
                             NcVector::new(direction.x, direction.y, direction.z));
        let active = [
            (self.sagittal, NcVector::x_axis(), 0),
            (self.coronal , NcVector::y_axis(), 1),
            (self.axial   , NcVector::z_axis(), 2),
        ];
        active.into_iter()
            .filter_map(|(depth, normal, axis)| {
                let depth = depth?;
                let mut shift = [0.0; 3];
                shift[axis] = depth;
                let placement = NcIsometry::translation(shift[0], shift[1], shift[2]);
                // Not solid: planes are crossed from either side
                Plane::new(normal).toi_with_ray(&placement, &ray, Lengthf32::MAX, false)
            })
            .map(|toi| origin + direction * toi)
            .filter(|p| self.contains(p))
            .min_by(|a, b| (a - origin).norm_squared().total_cmp(&(b - origin).norm_squared()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use geometry::point_to_array;

    fn planes() -> SlicePlanes {
        SlicePlanes::new(Point::new(-100.0, -100.0, -100.0), Point::new(100.0, 100.0, 100.0))
    }

    #[test]
    fn no_active_slice_no_hit() {
        assert_eq!(planes().intersect(Point::new(0.0, 0.0, 300.0), -Vector::z()), None);
    }

    #[test]
    fn axial_slice_from_above() {
        let slices = planes().with_axial(12.0);
        let hit = slices.intersect(Point::new(3.0, -4.0, 300.0), -Vector::z()).unwrap();
        assert_float_eq!(point_to_array(hit), [3.0, -4.0, 12.0], abs <= [1e-4; 3]);
    }

    #[test]
    fn nearest_of_several_slices() {
        let slices = planes().with_sagittal(10.0).with_coronal(-20.0).with_axial(5.0);
        let origin = Point::new(200.0, 0.0, 0.0);
        let hit = slices.intersect(origin, Vector::new(-1.0, 0.0, 0.0)).unwrap();
        assert_float_eq!(point_to_array(hit), [10.0, 0.0, 0.0], abs <= [1e-4; 3]);
    }

    #[test]
    fn slices_behind_the_viewer_are_ignored() {
        let slices = planes().with_sagittal(10.0);
        assert_eq!(slices.intersect(Point::new(50.0, 0.0, 0.0), Vector::x()), None);
    }

    #[test]
    fn hits_outside_box_are_discarded() {
        let slices = planes().with_axial(0.0);
        let origin = Point::new(150.0, 0.0, 10.0);
        assert_eq!(slices.intersect(origin, Vector::new(0.0, 0.0, -1.0)), None);
    }

    #[test]
    fn parallel_ray_misses() {
        let slices = planes().with_axial(0.0);
        assert_eq!(slices.intersect(Point::new(0.0, 0.0, 10.0), Vector::x()), None);
    }
}
