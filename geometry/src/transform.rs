//! Affine 4x4 transforms between a volume's model frame and world space.
//!
//! The inverse is computed once, at construction.

use nalgebra::Matrix4;
use units::todo::Lengthf32;
use crate::{Point, Vector};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4<Lengthf32>,
    inverse: Matrix4<Lengthf32>,
}

impl Default for Transform {
    fn default() -> Self { Self::identity() }
}

impl Transform {

    pub fn identity() -> Self {
        Self { matrix: Matrix4::identity(), inverse: Matrix4::identity() }
    }

    /// `None` if `matrix` is singular or contains non-finite elements
    pub fn new(matrix: Matrix4<Lengthf32>) -> Option<Self> {
        if !matrix.iter().all(|x| x.is_finite()) { return None }
        let inverse = matrix.try_inverse()?;
        inverse.iter().all(|x| x.is_finite()).then_some(Self { matrix, inverse })
    }

    /// Build from 16 numbers in row-major order, as written in volume headers
    pub fn from_row_major(elements: &[Lengthf32; 16]) -> Option<Self> {
        Self::new(Matrix4::from_row_slice(elements))
    }

    pub fn translation(x: Lengthf32, y: Lengthf32, z: Lengthf32) -> Self {
        Self {
            matrix : Matrix4::new_translation(&Vector::new( x,  y,  z)),
            inverse: Matrix4::new_translation(&Vector::new(-x, -y, -z)),
        }
    }

    pub fn matrix (&self) -> &Matrix4<Lengthf32> { &self.matrix  }
    pub fn inverse(&self) -> Self { Self { matrix: self.inverse, inverse: self.matrix } }

    /// Apply `self` after `first`
    pub fn after(&self, first: &Transform) -> Self {
        Self {
            matrix : self.matrix * first.matrix,
            inverse: first.inverse * self.inverse,
        }
    }

    pub fn point_to_world (&self, p: &Point) -> Point { self.matrix .transform_point(p) }
    pub fn point_to_model (&self, p: &Point) -> Point { self.inverse.transform_point(p) }

    /// Directions ignore the translation part
    pub fn vector_to_world(&self, v: &Vector) -> Vector { self.matrix .transform_vector(v) }
    pub fn vector_to_model(&self, v: &Vector) -> Vector { self.inverse.transform_vector(v) }

    /// World-space length of a step of `step[i]` model units along each model
    /// axis `i`.
    pub fn axis_pitch(&self, step: Vector) -> Vector {
        let origin = self.point_to_world(&Point::origin());
        Vector::from_fn(|i, _| {
            let mut p = Point::origin();
            p[i] = step[i];
            (self.point_to_world(&p) - origin).norm()
        })
    }
}
