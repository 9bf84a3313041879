//! Ordered-Subsets Expectation-Maximization: each iteration applies one MLEM
//! update per subset of the data, each subset with its own sensitivity image.
//! With a single subset this is exactly MLEM.

use log::{debug, info};

use crate::{
    Error, Result,
    image::Image,
    projection::ProjectionData,
    acquisition::AcquisitionModel,
    mlem::{sensitivity_image, update},
};

pub struct Osem<'a, M> {
    acquired: &'a ProjectionData,
    subsets: &'a [M],
    sensitivities: Vec<Image>,
    estimate: Image,
    iterations_done: usize,
}

impl<'a, M: AcquisitionModel> Osem<'a, M> {

    pub fn new(acquired: &'a ProjectionData, subsets: &'a [M], initial: &Image) -> Result<Self> {
        if subsets.is_empty() {
            return Err(Error::Geometry("OSEM needs at least one subset".into()));
        }
        let sensitivities = subsets.iter()
            .map(|subset| sensitivity_image(acquired, subset))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { acquired, subsets, sensitivities, estimate: initial.clone(), iterations_done: 0 })
    }

    /// One pass over all subsets
    pub fn step(&mut self) -> Result<()> {
        for (subset, sensitivity) in self.subsets.iter().zip(&self.sensitivities) {
            update(&mut self.estimate, self.acquired, subset, sensitivity)?;
        }
        self.iterations_done += 1;
        debug!("OSEM iteration {} done ({} subsets)", self.iterations_done, self.subsets.len());
        Ok(())
    }

    pub fn estimate(&self) -> &Image { &self.estimate }
    pub fn iterations_done(&self) -> usize { self.iterations_done }
    pub fn into_estimate(self) -> Image { self.estimate }
}

pub fn reconstruct<M: AcquisitionModel>(
    acquired      : &ProjectionData,
    subsets       : &[M],
    initial       : &Image,
    num_iterations: usize,
) -> Result<Image> {
    info!("OSEM reconstruction: {num_iterations} iterations, {} subsets", subsets.len());
    let mut osem = Osem::new(acquired, subsets, initial)?;
    for _ in 0..num_iterations { osem.step()?; }
    Ok(osem.into_estimate())
}
