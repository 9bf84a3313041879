//! The acquisition model: the pair of operators which map activity images to
//! expected detector counts and back.

use ndarray::{Array2, ArrayView1};

use crate::{
    Error, Result,
    grid::{ImageGrid, SinogramShape},
    image::Image,
    projection::ProjectionData,
};

/// A linear (or affine) forward projection together with the adjoint of its
/// linear part.
///
/// Both operators take their argument by value: an implementation is free to
/// keep or modify what it is given, without affecting the caller.
pub trait AcquisitionModel {

    /// Expected measurement for `image`: `A x + b`
    fn forward(&self, image: Image) -> Result<ProjectionData>;

    /// Back-projection of `data` into image space: `Aᵗ y`
    fn backward(&self, data: ProjectionData) -> Result<Image>;
}

impl<M: AcquisitionModel + ?Sized> AcquisitionModel for &M {
    fn forward (&self, image: Image         ) -> Result<ProjectionData> { (**self).forward(image) }
    fn backward(&self, data : ProjectionData) -> Result<Image>          { (**self).backward(data) }
}

/// Acquisition model given by an explicit, dense system matrix with one row per
/// detector bin and one column per voxel, plus an optional additive
/// background.
#[derive(Clone, Debug)]
pub struct DenseModel {
    matrix: Array2<f32>,
    grid: ImageGrid,
    shape: SinogramShape,
    background: Option<ProjectionData>,
}

impl DenseModel {

    pub fn new(matrix: Array2<f32>, grid: ImageGrid, shape: SinogramShape) -> Result<Self> {
        let expected = (shape.len(), grid.len());
        if matrix.dim() != expected {
            return Err(Error::shape_mismatch("system matrix", expected, matrix.dim()));
        }
        Ok(Self { matrix, grid, shape, background: None })
    }

    /// System matrix given as rows of detector-bin sensitivities. The image is a
    /// 1-D row of unit voxels; the data a flat vector of bins.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let n_bins = rows.len();
        let n_voxels = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != n_voxels) {
            return Err(Error::shape_mismatch("system matrix row", n_voxels, bad.len()));
        }
        let grid = ImageGrid::new((n_voxels as f32, 1.0, 1.0), (n_voxels, 1, 1))?;
        let shape = SinogramShape::flat(n_bins)?;
        let elements = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((n_bins, n_voxels), elements)
            .map_err(|e| Error::Geometry(e.to_string()))?;
        Self::new(matrix, grid, shape)
    }

    /// Add `background` to every forward projection
    pub fn with_background(mut self, background: ProjectionData) -> Result<Self> {
        if background.shape != self.shape {
            return Err(Error::shape_mismatch("background", self.shape, background.shape));
        }
        self.background = Some(background);
        Ok(self)
    }

    pub fn matrix(&self) -> &Array2<f32> { &self.matrix }
    pub fn grid  (&self) -> ImageGrid     { self.grid }
    pub fn shape (&self) -> SinogramShape { self.shape }
}

impl AcquisitionModel for DenseModel {

    fn forward(&self, image: Image) -> Result<ProjectionData> {
        if image.grid != self.grid {
            return Err(Error::shape_mismatch("forward projection input", self.grid, image.grid));
        }
        let mut projection = self.matrix.dot(&ArrayView1::from(&image.data[..]));
        if let Some(background) = &self.background {
            projection += &ArrayView1::from(&background.data[..]);
        }
        ProjectionData::new(self.shape, projection.into_raw_vec())
    }

    fn backward(&self, data: ProjectionData) -> Result<Image> {
        if data.shape != self.shape {
            return Err(Error::shape_mismatch("back projection input", self.shape, data.shape));
        }
        let backprojection = self.matrix.t().dot(&ArrayView1::from(&data.data[..]));
        Image::new(self.grid, backprojection.into_raw_vec())
    }
}
