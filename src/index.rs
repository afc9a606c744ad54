#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index3_u = [usize; 3];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 3];

// --------------------------------------------------------------------------------
//                  Conversion between 1d and 3d indices

use std::ops::{Add, Div, Mul, Rem};

pub fn index3_to_1<T>([ix, iy, iz]: [T; 3], [nx, ny, _nz]: [T; 3]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + (iy + iz * ny) * nx
}

#[allow(clippy::many_single_char_names)]
pub fn index1_to_3<T>(i: T, [nx, ny, _nz]: [T; 3]) -> [T; 3]
where
    T: Mul<Output = T> +
    Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    let z = i / (nx * ny);
    let r = i % (nx * ny);
    let y = r / nx;
    let x = r % nx;
    [x,y,z]
}

/// Round a continuous voxel index to the nearest voxel, clamping each axis
/// independently into the box. Non-finite components land on voxel 0.
pub fn nearest_voxel(continuous: [f32; 3], n: BoxDim_u) -> Index3_u {
    let mut i = [0; 3];
    for d in 0..3 {
        let top = n[d].saturating_sub(1) as f32;
        let r = continuous[d].round();
        // NaN fails both comparisons and stays at 0
        i[d] = if r >= top { top as usize } else if r > 0.0 { r as usize } else { 0 };
    }
    i
}

/// Inclusive range of indices within `half_width` of `centre`, cut off at the
/// edges of an axis with `n` voxels.
pub fn window(centre: usize, half_width: usize, n: usize) -> std::ops::RangeInclusive<usize> {
    centre.saturating_sub(half_width) ..= centre.saturating_add(half_width).min(n.saturating_sub(1))
}
