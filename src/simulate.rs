//! Generation of synthetic acquisitions from a known activity distribution.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::{
    Error, Result,
    image::Image,
    projection::ProjectionData,
    acquisition::AcquisitionModel,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Noise {
    /// Expected counts, exactly
    Off,
    /// Each bin an independent Poisson sample around its expected count
    Poisson,
}

/// Forward project `truth`, scaled by `scale`, optionally with Poisson noise
pub fn acquire<M, R>(
    model: &M,
    truth: &Image,
    scale: f32,
    noise: Noise,
    rng  : &mut R,
) -> Result<ProjectionData>
where
    M: AcquisitionModel + ?Sized,
    R: Rng + ?Sized,
{
    let mut data = model.forward(truth.clone())?;
    for expected in data.data.iter_mut() {
        *expected *= scale;
    }
    if noise == Noise::Poisson {
        for bin in data.data.iter_mut() {
            *bin = poisson_sample(*bin, rng)?;
        }
    }
    Ok(data)
}

fn poisson_sample<R: Rng + ?Sized>(lambda: f32, rng: &mut R) -> Result<f32> {
    if lambda == 0.0 { return Ok(0.0) }
    let poisson = Poisson::new(lambda as f64)
        .map_err(|e| Error::Simulation(format!("expected count {lambda}: {e}")))?;
    Ok(poisson.sample(rng) as f32)
}
