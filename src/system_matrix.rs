//! Sparse storage of system matrices, and the acquisition model they define.
//!
//! Each detector bin couples to only a handful of voxels (those its ray
//! crosses), so rows are stored as lists of `(voxel index, weight)` pairs. The
//! transpose is built once, up front, so that back-projection can be computed
//! one voxel at a time: this keeps the order of summation, and therefore the
//! result, independent of how `rayon` schedules the work.

use rayon::prelude::*;

use crate::{
    Error, Result,
    types::Weightf32,
    index::Index1_u,
    grid::{ImageGrid, SinogramShape},
    image::Image,
    projection::ProjectionData,
    acquisition::AcquisitionModel,
};

// ----- Storage of system matrix elements ------------------------------------------------
pub type SystemMatrixElement = (Index1_u, Weightf32);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemMatrixRow(pub Vec<SystemMatrixElement>);

impl SystemMatrixRow {
    pub fn iter(&self) -> std::slice::Iter<SystemMatrixElement> { self.0.iter() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl IntoIterator for SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'a, Self::Item>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().cloned()
    }
}

/// Sum product of the row's weights and the values they couple to
#[inline]
pub fn forward_project(system_matrix_row: &SystemMatrixRow, values: &[f32]) -> f32 {
    let mut projection = 0.0;
    for (j, w) in system_matrix_row {
        projection += w * values[j]
    }
    projection
}

// ----- The acquisition model -------------------------------------------------------------
#[derive(Clone, Debug)]
pub struct SparseSystemMatrix {
    grid: ImageGrid,
    shape: SinogramShape,
    rows: Vec<SystemMatrixRow>,
    columns: Vec<SystemMatrixRow>,
    background: Option<ProjectionData>,
}

impl SparseSystemMatrix {

    /// `rows[i]` holds the voxels coupled to detector bin `i`
    pub fn new(grid: ImageGrid, shape: SinogramShape, rows: Vec<SystemMatrixRow>) -> Result<Self> {
        if rows.len() != shape.len() {
            return Err(Error::shape_mismatch("system matrix rows", shape.len(), rows.len()));
        }
        let n_voxels = grid.len();
        let mut columns = vec![SystemMatrixRow::default(); n_voxels];
        for (i, row) in rows.iter().enumerate() {
            for (j, w) in row {
                if j >= n_voxels {
                    return Err(Error::shape_mismatch("system matrix voxel index", n_voxels, j));
                }
                columns[j].0.push((i, w));
            }
        }
        Ok(Self { grid, shape, rows, columns, background: None })
    }

    /// Add `background` to every forward projection
    pub fn with_background(mut self, background: ProjectionData) -> Result<Self> {
        if background.shape != self.shape {
            return Err(Error::shape_mismatch("background", self.shape, background.shape));
        }
        self.background = Some(background);
        Ok(self)
    }

    pub fn grid (&self) -> ImageGrid     { self.grid }
    pub fn shape(&self) -> SinogramShape { self.shape }
    pub fn rows (&self) -> &[SystemMatrixRow] { &self.rows }

    /// Number of stored (non-zero) elements
    pub fn n_elements(&self) -> usize { self.rows.iter().map(SystemMatrixRow::len).sum() }

    /// Split into `n` ordered subsets of views: subset `k` keeps the rows of
    /// views `k, k+n, k+2n, ...` and has empty rows everywhere else. The
    /// subsets' data domain is still the whole sinogram.
    pub fn subsets(&self, n: usize) -> Result<Vec<Self>> {
        if n == 0 || n > self.shape.views {
            return Err(Error::Geometry(format!(
                "number of subsets must lie in 1..={}, got {n}", self.shape.views
            )));
        }
        (0..n).map(|k| {
            let rows = self.rows.iter().enumerate()
                .map(|(i, row)| if self.shape.view_of(i) % n == k { row.clone() }
                                else                               { SystemMatrixRow::default() })
                .collect();
            let subset = Self::new(self.grid, self.shape, rows)?;
            Ok(match &self.background {
                Some(b) => subset.with_background(b.clone())?,
                None    => subset,
            })
        }).collect()
    }
}

impl AcquisitionModel for SparseSystemMatrix {

    fn forward(&self, image: Image) -> Result<ProjectionData> {
        if image.grid != self.grid {
            return Err(Error::shape_mismatch("forward projection input", self.grid, image.grid));
        }
        let mut projection: Vec<f32> = self.rows
            .par_iter()
            .map(|row| forward_project(row, &image.data))
            .collect();
        if let Some(background) = &self.background {
            for (p, b) in projection.iter_mut().zip(&background.data) { *p += b }
        }
        ProjectionData::new(self.shape, projection)
    }

    fn backward(&self, data: ProjectionData) -> Result<Image> {
        if data.shape != self.shape {
            return Err(Error::shape_mismatch("back projection input", self.shape, data.shape));
        }
        let backprojection = self.columns
            .par_iter()
            .map(|column| forward_project(column, &data.data))
            .collect();
        Image::new(self.grid, backprojection)
    }
}
