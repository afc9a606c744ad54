use units::todo::Lengthf32;
use crate::{Ray, Projector, Vector};

/// Below this, a ray is treated as parallel to the z-axis: the perpendicular
/// distance from the ray to a z-column is then constant along the column.
const PARALLEL_EPS: Lengthf32 = 1e-12;

/// The z-interval of a line parallel to the z-axis which lies within a
/// cylinder of given radius around a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSpan {
    pub lo: Lengthf32,
    pub hi: Lengthf32,
    /// z at which the column passes closest to the ray
    pub closest: Lengthf32,
}

impl ColumnSpan {
    fn unbounded(closest: Lengthf32) -> Self {
        Self { lo: Lengthf32::NEG_INFINITY, hi: Lengthf32::INFINITY, closest }
    }
}

/// Find where the z-column through `(x, y)` passes within `radius` of `ray`.
///
/// `projector` must be `ray.projector()`; it is passed in because the caller
/// sweeps many columns against the same ray.
///
/// Writing a point on the column as `w + u ẑ`, with `w` the offset from the
/// ray origin at `u = 0`, the squared perpendicular distance is the quadratic
/// `a u² + 2 b u + (|Pw|²)` where `a = |P ẑ|²` and `b = Pw · P ẑ`. The column
/// is admissible where this does not exceed `radius²`.
pub fn column_cylinder_span(
    ray: &Ray,
    projector: &Projector,
    x: Lengthf32,
    y: Lengthf32,
    radius: Lengthf32,
) -> Option<ColumnSpan> {
    if !(radius > 0.0) { return None }
    let w = Vector::new(x - ray.origin.x, y - ray.origin.y, 0.0);
    let pw = projector * w;
    let pz: Vector = projector.column(2).into_owned();
    // Viète coefficients
    let a = pz.norm_squared();
    let b = pw.dot(&pz);
    let c = pw.norm_squared() - radius * radius;

    if !(a > PARALLEL_EPS) {
        return (c <= 0.0).then(|| ColumnSpan::unbounded(ray.origin.z))
    }

    let u_closest = -b / a;
    // Check that the column truly comes close enough, by re-projecting its
    // closest point. Also rejects NaNs from degenerate input.
    let nearest = projector * (w + Vector::z() * u_closest);
    if !(nearest.norm() <= radius) { return None }

    let half = (b * b - a * c).max(0.0).sqrt() / a;
    if !half.is_finite() { return None }

    let closest = ray.origin.z + u_closest;
    Some(ColumnSpan { lo: closest - half, hi: closest + half, closest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use rstest::rstest;
    use proptest::prelude::*;
    use units::float_eq::assert_float_eq;

    fn span(origin: (f32, f32, f32), dir: (f32, f32, f32), x: f32, y: f32, r: f32) -> Option<ColumnSpan> {
        let ray = Ray::new(Point::new(origin.0, origin.1, origin.2), Vector::new(dir.0, dir.1, dir.2)).unwrap();
        column_cylinder_span(&ray, &ray.projector(), x, y, r)
    }

    #[rstest(/**/  origin        ,      dir       ,  x ,  y ,  r , expected,
             // ray along x at height 5: column at x=3 pierces the cylinder over [4, 6]
             case((0.0, 0.0, 5.0), (1.0, 0.0, 0.0), 3.0, 0.0, 1.0, Some((4.0, 6.0))),
             // same, with the column displaced sideways by half the radius
             case((0.0, 0.0, 5.0), (1.0, 0.0, 0.0), 3.0, 0.5, 1.0, Some((5.0 - 0.8660254, 5.0 + 0.8660254))),
             // column too far off to the side
             case((0.0, 0.0, 5.0), (1.0, 0.0, 0.0), 3.0, 1.5, 1.0, None),
             // at 45 degrees in the xz-plane
             case((0.0, 0.0, 0.0), (1.0, 0.0, 1.0), 2.0, 0.0, 1.0, Some((2.0 - 1.4142135, 2.0 + 1.4142135))),
    )]
    fn hand_picked(origin: (f32, f32, f32), dir: (f32, f32, f32),
                   x: f32, y: f32, r: f32, expected: Option<(f32, f32)>) {
        let got = span(origin, dir, x, y, r).map(|s| (s.lo, s.hi));
        match (got, expected) {
            (Some((lo, hi)), Some((elo, ehi))) => {
                assert_float_eq!(lo, elo, abs <= 1e-5);
                assert_float_eq!(hi, ehi, abs <= 1e-5);
            }
            (None, None) => {}
            _ => panic!("expected {expected:?}, got {got:?}"),
        }
    }

    #[test]
    fn parallel_ray_admits_whole_column_or_nothing() {
        let inside = span((4.5, 4.5, -10.0), (0.0, 0.0, 1.0), 4.5, 4.5, 1.0).unwrap();
        assert_eq!(inside.lo, f32::NEG_INFINITY);
        assert_eq!(inside.hi, f32::INFINITY);
        assert!(span((4.5, 4.5, -10.0), (0.0, 0.0, 1.0), 6.5, 4.5, 1.0).is_none());
    }

    #[test]
    fn non_positive_radius_admits_nothing() {
        assert!(span((0.0, 0.0, 5.0), (1.0, 0.0, 0.0), 3.0, 0.0,  0.0).is_none());
        assert!(span((0.0, 0.0, 5.0), (1.0, 0.0, 0.0), 3.0, 0.0, -1.0).is_none());
    }

    proptest! {
        // The ends of the span lie on the cylinder surface, its midpoint is
        // the closest approach, and that is within the radius. The ray is kept
        // well away from the z-axis, where f32 spans become enormous.
        #[test]
        fn span_ends_lie_on_cylinder(
            ox in -20.0..(20.0 as f32), oy in -20.0..(20.0 as f32), oz in -20.0..(20.0 as f32),
            dx in   0.2..( 1.0 as f32), dy in  -1.0..( 1.0 as f32), dz in  0.1..( 1.0 as f32),
            x  in -20.0..(20.0 as f32), y  in -20.0..(20.0 as f32),
            r  in   0.5..(10.0 as f32),
        ) {
            let ray = Ray::new(Point::new(ox, oy, oz), Vector::new(dx, dy, dz)).unwrap();
            if let Some(s) = column_cylinder_span(&ray, &ray.projector(), x, y, r) {
                let d_lo = ray.distance_to(&Point::new(x, y, s.lo));
                let d_hi = ray.distance_to(&Point::new(x, y, s.hi));
                let d_cl = ray.distance_to(&Point::new(x, y, s.closest));
                assert_float_eq!(d_lo, r, abs <= 1e-2 * r.max(1.0));
                assert_float_eq!(d_hi, r, abs <= 1e-2 * r.max(1.0));
                assert!(d_cl <= r + 1e-3);
                assert_float_eq!(s.closest, (s.lo + s.hi) / 2.0, abs <= 1e-3 * s.closest.abs().max(1.0));
            }
        }
    }
}
