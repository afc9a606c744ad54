//! Lengths and ratios carrying their units, plus pithy constructors.
//!
//! Configuration values such as tolerances and refinement windows are written
//! with explicit units (`"2 mm"`). The geometric core works on plain `f32`s
//! (see [`todo`]) expressed in millimetres, so most conversions happen at the
//! configuration boundary via [`mm_`].

pub mod todo;

pub use uom;
pub use float_eq;

pub use uom::si::f32::{Length, Ratio};
use uom::si::{length::{millimeter, centimeter, micrometer}, ratio::ratio as ratio_unit};

pub fn mm   (x: f32) -> Length { Length::new::<millimeter>(x) }
pub fn cm   (x: f32) -> Length { Length::new::<centimeter>(x) }
pub fn um   (x: f32) -> Length { Length::new::<micrometer>(x) }
pub fn ratio(x: f32) -> Ratio  {  Ratio::new::<ratio_unit>(x) }

pub fn mm_   (x: Length) -> f32 { x.get::<millimeter>() }
pub fn ratio_(x: Ratio ) -> f32 { x.get::<ratio_unit>() }

/// Compare two `uom` quantities in the given unit with `float_eq`
#[macro_export]
macro_rules! assert_uom_eq {
    ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
        $crate::float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::length::millimeter;

    #[test]
    fn constructors_agree() {
        assert_uom_eq!(millimeter, cm(1.0), mm(10.0), ulps <= 1);
        assert_uom_eq!(millimeter, um(500.0), mm(0.5), ulps <= 1);
        assert_eq!(mm_(cm(2.5)), 25.0);
        assert_eq!(ratio_(ratio(0.9)), 0.9);
    }

    #[test]
    fn parse_length_with_units() -> Result<(), Box<dyn std::error::Error>> {
        let l: Length = "2 mm".parse()?;
        assert_eq!(l, mm(2.0));
        let l: Length = "0.5 cm".parse()?;
        assert_uom_eq!(millimeter, l, mm(5.0), ulps <= 1);
        Ok(())
    }
}
