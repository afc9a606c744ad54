use units::todo::Lengthf32;

/// A position in any of the frames we juggle: world (tkrRAS), grid model
/// space, or the corner-anchored local frame used by the intersector.
pub type Point = nalgebra::Point3<Lengthf32>;

pub fn point_from([x, y, z]: [Lengthf32; 3]) -> Point { Point::new(x, y, z) }

pub fn point_to_array(p: Point) -> [Lengthf32; 3] { [p.x, p.y, p.z] }
