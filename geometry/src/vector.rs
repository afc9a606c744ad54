use units::todo::Lengthf32;

pub type Vector = nalgebra::Vector3<Lengthf32>;

/// Normalize `v`, unless it is too short (or not finite) to have a direction
pub fn unit_or_none(v: Vector) -> Option<Vector> {
    v.try_normalize(f32::EPSILON).filter(|u| u.iter().all(|c| c.is_finite()))
}
