use nalgebra::Matrix3;
use units::todo::Lengthf32;
use crate::{Point, Vector, unit_or_none};

/// Symmetric projection onto the plane orthogonal to a ray's direction:
/// `P = I - d dᵗ`. `|P (p - origin)|` is the perpendicular distance from `p`
/// to the ray's supporting line.
pub type Projector = Matrix3<Lengthf32>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    /// Always of unit length
    pub direction: Vector,
}

impl Ray {

    /// `None` if `direction` has no usable direction (zero or not finite)
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        Some(Self { origin, direction: unit_or_none(direction)? })
    }

    /// Ray from `origin` passing through `target`
    pub fn through(origin: Point, target: Point) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    pub fn at(&self, t: Lengthf32) -> Point { self.origin + self.direction * t }

    pub fn projector(&self) -> Projector {
        let d = self.direction;
        Matrix3::identity() - d * d.transpose()
    }

    /// Signed distance along the ray to the foot of the perpendicular from `p`
    pub fn parameter_of(&self, p: &Point) -> Lengthf32 { (p - self.origin).dot(&self.direction) }

    /// The point on the ray closest to `p`
    pub fn snap(&self, p: &Point) -> Point { self.at(self.parameter_of(p)) }

    pub fn distance_to(&self, p: &Point) -> Lengthf32 { (self.projector() * (p - self.origin)).norm() }
}
