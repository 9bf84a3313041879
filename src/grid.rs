//! The shapes of the two domains: the reconstruction grid in which images live,
//! and the sinogram in which projection data live.

use std::f32::consts::PI;

use crate::{
    Error, Result,
    types::Lengthf32,
    index::{BoxDim_u, Index1_u, Index3_u, index1_to_3},
};

/// The size and granularity of the volume in which images are reconstructed.
/// The volume is centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageGrid {
    pub n: BoxDim_u,
    pub half_width: [Lengthf32; 3],
    pub voxel_size: [Lengthf32; 3],
}

impl ImageGrid {

    pub fn new(
        (dx, dy, dz): (Lengthf32, Lengthf32, Lengthf32),
        (nx, ny, nz): (usize, usize, usize),
    ) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(Error::Geometry(format!("image grid needs at least one voxel per axis, got {:?}", (nx, ny, nz))));
        }
        if !(dx > 0.0 && dy > 0.0 && dz > 0.0) {
            return Err(Error::Geometry(format!("image grid size must be positive, got {:?}", (dx, dy, dz))));
        }
        let n = [nx, ny, nz];
        let half_width = [dx / 2.0, dy / 2.0, dz / 2.0];
        let voxel_size = [dx / nx as Lengthf32, dy / ny as Lengthf32, dz / nz as Lengthf32];
        Ok(Self { n, half_width, voxel_size })
    }

    /// Total number of voxels
    pub fn len(&self) -> usize { let [x, y, z] = self.n; x * y * z }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of voxels in one axial plane
    pub fn plane_len(&self) -> usize { self.n[0] * self.n[1] }

    pub fn full_size(&self) -> [Lengthf32; 3] { self.half_width.map(|h| 2.0 * h) }

    /// Find centre of voxel with given 3D index
    pub fn voxel_centre(&self, i: Index3_u) -> [Lengthf32; 3] {
        let (s, h) = (self.voxel_size, self.half_width);
        [(i[0] as Lengthf32 + 0.5) * s[0] - h[0],
         (i[1] as Lengthf32 + 0.5) * s[1] - h[1],
         (i[2] as Lengthf32 + 0.5) * s[2] - h[2]]
    }

    /// Find centre of voxel with given 1D index
    pub fn voxel_centre1(&self, i: Index1_u) -> [Lengthf32; 3] {
        self.voxel_centre(index1_to_3(i, self.n))
    }
}

/// Layout of a stack of 2-D parallel-beam sinograms: one per axial plane.
///
/// Bins are stored with the radial bin varying fastest, then the view, then
/// the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SinogramShape {
    pub views: usize,
    pub bins: usize,
    pub planes: usize,
    pub bin_width: Lengthf32,
}

impl SinogramShape {

    pub fn new(views: usize, bins: usize, planes: usize, bin_width: Lengthf32) -> Result<Self> {
        if views == 0 || bins == 0 || planes == 0 {
            return Err(Error::Geometry(format!("sinogram needs at least one view, bin and plane, got {:?}", (views, bins, planes))));
        }
        if !(bin_width > 0.0) {
            return Err(Error::Geometry(format!("sinogram bin width must be positive, got {bin_width}")));
        }
        Ok(Self { views, bins, planes, bin_width })
    }

    /// A single-plane, single-view shape with `n` bins: a plain vector of
    /// detector bins, as used by explicit system matrices.
    pub fn flat(n: usize) -> Result<Self> { Self::new(1, n, 1, 1.0) }

    pub fn len(&self) -> usize { self.views * self.bins * self.planes }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn bin_index(&self, plane: usize, view: usize, bin: usize) -> Index1_u {
        (plane * self.views + view) * self.bins + bin
    }

    /// Which view a flat bin index belongs to
    pub fn view_of(&self, i: Index1_u) -> usize { (i / self.bins) % self.views }

    /// Which axial plane a flat bin index belongs to
    pub fn plane_of(&self, i: Index1_u) -> usize { i / (self.bins * self.views) }

    /// Projection angle of `view`, in radians, covering `[0, pi)`
    pub fn angle(&self, view: usize) -> f32 { view as f32 * PI / self.views as f32 }

    /// Signed distance of the centre of radial `bin` from the rotation axis
    pub fn radial_offset(&self, bin: usize) -> Lengthf32 {
        (bin as Lengthf32 + 0.5 - self.bins as Lengthf32 / 2.0) * self.bin_width
    }
}
