use std::path::Path;

use crate::{
    Error, Result,
    grid::SinogramShape,
    field::{Field, impl_elementwise_ops},
    io,
};

pub type SinogramData = Vec<f32>;

/// Counts (or expected counts) in the bins of a sinogram
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionData {
    pub shape: SinogramShape,
    pub data: SinogramData,
}

impl ProjectionData {

    pub fn new(shape: SinogramShape, data: SinogramData) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::shape_mismatch("projection data", shape.len(), data.len()));
        }
        Ok(Self { shape, data })
    }

    pub fn uniform(shape: SinogramShape, value: f32) -> Self {
        Self { shape, data: vec![value; shape.len()] }
    }

    pub fn zeros(shape: SinogramShape) -> Self { Self::uniform(shape, 0.0) }

    /// Wrap a plain vector of detector bins
    pub fn flat(data: SinogramData) -> Result<Self> {
        Self::new(SinogramShape::flat(data.len())?, data)
    }

    pub fn from_raw_file(path: &Path, shape: SinogramShape) -> Result<Self> {
        Self::new(shape, io::raw::read_all(path)?)
    }

    pub fn write_to_raw_file(&self, path: &Path) -> Result<()> {
        io::raw::write(self.data.iter().copied(), path)?;
        Ok(())
    }

    /// Total counts
    pub fn total(&self) -> f64 { self.sum() }
}

impl Field for ProjectionData {
    type Shape = SinogramShape;
    const NAME: &'static str = "projection data";
    fn shape(&self) -> SinogramShape { self.shape }
    fn values(&self) -> &[f32] { &self.data }
    fn values_mut(&mut self) -> &mut [f32] { &mut self.data }
}

impl_elementwise_ops!(ProjectionData);

impl core::ops::Index<usize> for ProjectionData {
    type Output = f32;
    #[inline]
    fn index(&self, i: usize) -> &f32 { &self.data[i] }
}

impl core::ops::IndexMut<usize> for ProjectionData {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f32 { &mut self.data[i] }
}
