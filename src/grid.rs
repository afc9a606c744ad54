//! A discretized scalar volume placed in world space.
//!
//! Four frames are involved in every query against a grid:
//!
//! + *world*: the caller's frame (surface RAS millimetres, typically).
//!
//! + *model*: the grid centred on the origin, axes aligned with the voxel
//!   axes. The world transform maps model to world. The centre of voxel
//!   `(i,j,k)` lies at `(i + 1/2) * f - size/2` per axis, where `f` is the voxel
//!   pitch `size / dims`.
//!
//! + *local*: the model frame shifted by `size/2`, so that the grid occupies
//!   `[0, size]` on each axis and voxel centres lie at `(i + 1/2) * f`. The
//!   column sweep of the intersector works here.
//!
//! + *index*: continuous voxel indices, the centre of voxel `i` being at `i`.

use crate::error::{LocalizeError, Result};
use crate::index::{index3_to_1, nearest_voxel, BoxDim_u, Index1_u, Index3_u};
use geometry::{Point, Transform, Vector};
use units::todo::{Intensityf32, Lengthf32};

pub type VoxelData = Vec<Intensityf32>;

#[derive(Clone, Debug)]
pub struct VolumeGrid {
    n: BoxDim_u,
    size: Vector,
    voxel_size: Vector,
    channels: usize,
    data: VoxelData,
    world: Transform,
}

impl VolumeGrid {

    /// `data` holds `channels` interleaved values per voxel, voxels ordered
    /// with `x` varying fastest.
    pub fn new(
        n: BoxDim_u,
        size: Vector,
        channels: usize,
        data: VoxelData,
        world: Transform,
    ) -> Result<Self> {
        if !(channels == 1 || channels == 4) { return Err(LocalizeError::Channels(channels)) }
        if n.iter().any(|&d| d == 0) {
            return Err(LocalizeError::Extent(format!("zero voxel count in {n:?}")))
        }
        if !size.iter().all(|&s| s.is_finite() && s > 0.0) {
            return Err(LocalizeError::Extent(format!("physical size must be positive, got {:?}", size.as_slice())))
        }
        let expected = n[0] * n[1] * n[2] * channels;
        if data.len() != expected {
            return Err(LocalizeError::GridShape { dims: n, channels, expected, actual: data.len() })
        }
        let voxel_size = Vector::new(size.x / n[0] as Lengthf32,
                                     size.y / n[1] as Lengthf32,
                                     size.z / n[2] as Lengthf32);
        Ok(Self { n, size, voxel_size, channels, data, world })
    }

    /// Single-channel grid with unit voxels, centred on the world origin
    pub fn unit_voxels(n: BoxDim_u, data: VoxelData) -> Result<Self> {
        let size = Vector::new(n[0] as Lengthf32, n[1] as Lengthf32, n[2] as Lengthf32);
        Self::new(n, size, 1, data, Transform::identity())
    }

    pub fn dims      (&self) -> BoxDim_u   { self.n }
    pub fn size      (&self) -> Vector     { self.size }
    pub fn voxel_size(&self) -> Vector     { self.voxel_size }
    pub fn channels  (&self) -> usize      { self.channels }
    pub fn world     (&self) -> &Transform { &self.world }
    pub fn data      (&self) -> &[Intensityf32] { &self.data }
    pub fn n_voxels  (&self) -> usize      { self.n[0] * self.n[1] * self.n[2] }

    /// Occupancy of the voxel: the last channel
    #[inline]
    pub fn value(&self, i: Index3_u) -> Intensityf32 {
        self.value1(index3_to_1(i, self.n))
    }

    #[inline]
    pub fn value1(&self, i: Index1_u) -> Intensityf32 {
        self.data[i * self.channels + self.channels - 1]
    }

    pub fn channel(&self, i: Index3_u, c: usize) -> Intensityf32 {
        self.data[index3_to_1(i, self.n) * self.channels + c]
    }

    /// Find centre of voxel with given 3D index, in the model frame
    pub fn voxel_centre(&self, i: Index3_u) -> Point {
        let s = self.voxel_size;
        let h = self.size / 2.0;
        Point::new((i[0] as Lengthf32 + 0.5) * s.x - h.x,
                   (i[1] as Lengthf32 + 0.5) * s.y - h.y,
                   (i[2] as Lengthf32 + 0.5) * s.z - h.z,)
    }

    pub fn model_to_local(&self, p: &Point) -> Point { p + self.size / 2.0 }
    pub fn local_to_model(&self, p: &Point) -> Point { p - self.size / 2.0 }

    pub fn model_to_index(&self, p: &Point) -> Vector {
        (self.model_to_local(p).coords).component_div(&self.voxel_size).add_scalar(-0.5)
    }

    pub fn index_to_model(&self, c: &Vector) -> Point {
        self.local_to_model(&Point::from(c.add_scalar(0.5).component_mul(&self.voxel_size)))
    }

    pub fn world_to_index(&self, p: &Point) -> Vector {
        self.model_to_index(&self.world.point_to_model(p))
    }

    pub fn index_to_world(&self, c: &Vector) -> Point {
        self.world.point_to_world(&self.index_to_model(c))
    }

    /// Voxel containing the world point, clamped into the grid
    pub fn nearest_voxel(&self, p: &Point) -> Index3_u {
        let c = self.world_to_index(p);
        nearest_voxel([c.x, c.y, c.z], self.n)
    }

    /// World-space distance between neighbouring voxel centres, per voxel axis
    pub fn world_pitch(&self) -> Vector {
        self.world.axis_pitch(self.voxel_size)
    }
}

impl core::ops::Index<Index3_u> for VolumeGrid {
    type Output = Intensityf32;
    fn index(&self, i3: Index3_u) -> &Self::Output {
        let i1 = index3_to_1(i3, self.n);
        &self.data[i1 * self.channels + self.channels - 1]
    }
}
