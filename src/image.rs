use std::path::Path;

use crate::{
    Error, Result,
    types::Intensityf32,
    index::{Index1_u, Index3_u, index3_to_1},
    grid::ImageGrid,
    field::{Field, impl_elementwise_ops},
    io,
};

pub type ImageData = Vec<Intensityf32>;

/// Activity distribution over an `ImageGrid`
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub grid: ImageGrid,
    pub data: ImageData,
}

impl Image {

    pub fn new(grid: ImageGrid, data: ImageData) -> Result<Self> {
        if data.len() != grid.len() {
            return Err(Error::shape_mismatch("image data", grid.n, data.len()));
        }
        Ok(Image { grid, data })
    }

    pub fn uniform(grid: ImageGrid, value: Intensityf32) -> Self {
        Self { grid, data: vec![value; grid.len()] }
    }

    pub fn ones (grid: ImageGrid) -> Self { Self::uniform(grid, 1.0) }
    pub fn zeros(grid: ImageGrid) -> Self { Self::uniform(grid, 0.0) }

    pub fn from_raw_file(path: &Path, grid: ImageGrid) -> Result<Self> {
        Self::new(grid, io::raw::read_all(path)?)
    }

    pub fn write_to_raw_file(&self, path: &Path) -> Result<()> {
        io::raw::write(self.data.iter().copied(), path)?;
        Ok(())
    }
}

impl Field for Image {
    type Shape = ImageGrid;
    const NAME: &'static str = "image";
    fn shape(&self) -> ImageGrid { self.grid }
    fn values(&self) -> &[f32] { &self.data }
    fn values_mut(&mut self) -> &mut [f32] { &mut self.data }
}

impl_elementwise_ops!(Image);

impl core::ops::IndexMut<Index1_u> for Image {
    #[inline]
    fn index_mut(&mut self, i: Index1_u) -> &mut Self::Output { &mut self.data[i] }
}

impl core::ops::Index<Index1_u> for Image {
    type Output = Intensityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::IndexMut<Index3_u> for Image {
    fn index_mut(&mut self, i3: Index3_u) -> &mut Self::Output {
        let i1 = index3_to_1(i3, self.grid.n);
        &mut self.data[i1]
    }
}

impl core::ops::Index<Index3_u> for Image {
    type Output = Intensityf32;
    fn index(&self, i3: Index3_u) -> &Self::Output {
        let i1 = index3_to_1(i3, self.grid.n);
        &self.data[i1]
    }
}
