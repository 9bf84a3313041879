//! Parallel-beam projection geometry: builds the sparse system matrix which
//! couples each sinogram bin to the voxels its ray crosses.
//!
//! The geometry is 2-D and is repeated, independently, for every axial plane
//! of the image: sinogram plane `k` sees only image plane `k`.

pub mod siddon;

use itertools::iproduct;
use log::info;
use rayon::prelude::*;

use crate::{
    Error, Result,
    grid::{ImageGrid, SinogramShape},
    system_matrix::{SparseSystemMatrix, SystemMatrixRow},
    utils::group_digits,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallelBeam {
    grid: ImageGrid,
    shape: SinogramShape,
}

impl ParallelBeam {

    pub fn new(grid: ImageGrid, shape: SinogramShape) -> Result<Self> {
        if shape.planes != grid.n[2] {
            return Err(Error::Geometry(format!(
                "sinogram has {} planes but image has {} axial voxels", shape.planes, grid.n[2]
            )));
        }
        Ok(Self { grid, shape })
    }

    /// Geometry with `views` views and radial bins as wide as a voxel, enough
    /// of them to cover the diagonal of the image.
    pub fn covering(grid: ImageGrid, views: usize) -> Result<Self> {
        let bin_width = grid.voxel_size[0];
        let [wx, wy, _] = grid.full_size();
        let mut bins = ((wx * wx + wy * wy).sqrt() / bin_width).ceil() as usize;
        // Same parity as the voxels, so that at 0 degrees rays pass through voxel centres
        if (bins + grid.n[0]) % 2 != 0 { bins += 1 }
        let shape = SinogramShape::new(views, bins, grid.n[2], bin_width)?;
        Self::new(grid, shape)
    }

    pub fn grid (&self) -> ImageGrid     { self.grid }
    pub fn shape(&self) -> SinogramShape { self.shape }

    /// The row of the system matrix belonging to one ray in plane 0
    pub fn plane_row(&self, view: usize, bin: usize) -> SystemMatrixRow {
        siddon::ray_through_plane(&self.grid, self.shape.angle(view), self.shape.radial_offset(bin))
    }

    pub fn system_matrix(&self) -> Result<SparseSystemMatrix> {
        let SinogramShape { views, bins, planes, .. } = self.shape;
        // The rays of a single plane: every other plane is a translated copy
        let plane_rows: Vec<SystemMatrixRow> = iproduct!(0..views, 0..bins)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(view, bin)| self.plane_row(view, bin))
            .collect();

        let plane_len = self.grid.plane_len();
        let rows = (0..planes)
            .flat_map(|plane| plane_rows.iter().map(move |row| {
                SystemMatrixRow(row.iter().map(|&(j, w)| (j + plane * plane_len, w)).collect())
            }))
            .collect();

        let matrix = SparseSystemMatrix::new(self.grid, self.shape, rows)?;
        info!("Built parallel-beam system matrix: {views} views x {bins} bins x {planes} planes, {} elements",
              group_digits(matrix.n_elements()));
        Ok(matrix)
    }
}

#[cfg(test)]
mod test_parallel_beam {
    use super::*;
    use crate::{AcquisitionModel, Image, ProjectionData, field::Field};
    use float_eq::assert_float_eq;

    fn grid(n: usize, planes: usize) -> ImageGrid {
        ImageGrid::new((n as f32, n as f32, planes as f32), (n, n, planes)).unwrap()
    }

    #[test]
    fn planes_must_match() {
        let shape = SinogramShape::new(4, 6, 2, 1.0).unwrap();
        assert!(ParallelBeam::new(grid(4, 1), shape).is_err());
        assert!(ParallelBeam::new(grid(4, 2), shape).is_ok());
    }

    #[test]
    fn covering_bins_span_the_diagonal_with_matching_parity() {
        let pb = ParallelBeam::covering(grid(4, 1), 8).unwrap();
        // diagonal = 5.66 voxels -> 6 bins, even like nx
        assert_eq!(pb.shape().bins, 6);
        let pb = ParallelBeam::covering(grid(5, 1), 8).unwrap();
        // diagonal = 7.07 voxels -> 8, bumped to 9 to be odd like nx
        assert_eq!(pb.shape().bins, 9);
    }

    #[test]
    fn every_voxel_is_seen() -> Result<()> {
        let pb = ParallelBeam::covering(grid(6, 2), 12)?;
        let matrix = pb.system_matrix()?;
        let sensitivity = matrix.backward(ProjectionData::uniform(pb.shape(), 1.0))?;
        assert!(sensitivity.data.iter().all(|&s| s > 0.0));
        Ok(())
    }

    #[test]
    fn planes_do_not_mix() -> Result<()> {
        let g = grid(4, 2);
        let pb = ParallelBeam::covering(g, 4)?;
        let matrix = pb.system_matrix()?;
        let mut image = Image::zeros(g);
        image[[1, 2, 1]] = 1.0;
        let projection = matrix.forward(image)?;
        let shape = pb.shape();
        for (i, &p) in projection.data.iter().enumerate() {
            if shape.plane_of(i) == 0 { assert_eq!(p, 0.0) }
        }
        // Each view of plane 1 sees the whole voxel, exactly once across its bins
        let per_view: Vec<f64> = (0..shape.views).map(|v| {
            (0..shape.bins).map(|b| projection[shape.bin_index(1, v, b)] as f64).sum()
        }).collect();
        assert!(per_view.iter().all(|&s| s > 0.0));
        Ok(())
    }

    #[test]
    fn uniform_image_projects_symmetrically() -> Result<()> {
        let g = grid(8, 1);
        let pb = ParallelBeam::covering(g, 4)?;
        let projection = pb.system_matrix()?.forward(Image::ones(g))?;
        let shape = pb.shape();
        let view = |v| (0..shape.bins).map(|b| projection[shape.bin_index(0, v, b)]).collect::<Vec<_>>();
        // 0 and 90 degrees see the same profile of a square
        assert_float_eq!(view(0), view(2), abs_all <= 1e-4);
        assert_float_eq!(projection.sum(), view(0).iter().map(|&x| x as f64).sum::<f64>() * 4.0, rmax <= 0.2);
        Ok(())
    }
}
