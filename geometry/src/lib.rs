mod point;
mod vector;
mod transform;
mod ray;
mod cylinder;

pub use point::{Point, point_from, point_to_array};
pub use vector::{Vector, unit_or_none};
pub use transform::Transform;
pub use ray::{Ray, Projector};
pub use cylinder::{ColumnSpan, column_cylinder_span};

pub use nalgebra as na;
