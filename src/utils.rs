use geometry::{Point, Vector};
use units::todo::Lengthf32;

#[allow(clippy::many_single_char_names)]
pub fn parse_triplet<T: std::str::FromStr>(s: &str) -> Result<(T,T,T), String>
where
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    let v = s.split(',').map(str::trim).collect::<Vec<_>>();
    if v.len() != 3 {
        return Err(format!("expected three comma-separated values, got '{s}'"));
    }
    let parse = |x: &str| x.parse::<T>().map_err(|e| format!("'{x}': {e}"));
    let x = parse(v[0])?;
    let y = parse(v[1])?;
    let z = parse(v[2])?;
    Ok((x, y, z))
}

/// `"x,y,z"`, in millimetres
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y, z) = parse_triplet::<Lengthf32>(s)?;
    Ok(Point::new(x, y, z))
}

pub fn parse_vector(s: &str) -> Result<Vector, String> {
    parse_point(s).map(|p| p.coords)
}
