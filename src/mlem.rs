//! Maximum-Likelihood Expectation-Maximization.
//!
//! Starting from an initial estimate `x`, each iteration applies the
//! multiplicative update
//!
//! ```text
//! x <- x * Aᵗ(y / (A x + b)) / Aᵗ1
//! ```
//!
//! where `y` is the acquired data, `A x + b` the model's forward projection,
//! `Aᵗ` its back-projection and `Aᵗ1` the sensitivity image. Ratios which are
//! not finite (`0/0` in bins that neither measured nor expect anything, or
//! voxels which no bin can see) are replaced by the nearest finite value (see
//! [`nan_to_num`](crate::field::nan_to_num)), so that they carry no update
//! rather than poisoning the image.

use log::{debug, info, trace};

use crate::{
    Result,
    Error,
    image::Image,
    projection::ProjectionData,
    field::Field,
    acquisition::AcquisitionModel,
};

/// Run `num_iterations` MLEM iterations starting from `initial`, which is left
/// untouched.
///
/// The sensitivity image is computed even when `num_iterations` is zero.
pub fn reconstruct<M>(
    acquired      : &ProjectionData,
    model         : &M,
    initial       : &Image,
    num_iterations: usize,
) -> Result<Image>
where
    M: AcquisitionModel + ?Sized,
{
    info!("MLEM reconstruction: {num_iterations} iterations");
    let mut mlem = Mlem::new(acquired, model, initial)?;
    for _ in 0..num_iterations { mlem.step()?; }
    Ok(mlem.into_estimate())
}

/// Back-projection of uniform data: the total system response of each voxel
pub fn sensitivity_image<M>(acquired: &ProjectionData, model: &M) -> Result<Image>
where
    M: AcquisitionModel + ?Sized,
{
    model.backward(acquired.uniform_copy(1.0))
}

/// A reconstruction in progress, which can be advanced one iteration at a time.
pub struct Mlem<'a, M: ?Sized> {
    acquired: &'a ProjectionData,
    model: &'a M,
    sensitivity: Image,
    estimate: Image,
    iterations_done: usize,
}

impl<'a, M> Mlem<'a, M>
where
    M: AcquisitionModel + ?Sized,
{
    pub fn new(acquired: &'a ProjectionData, model: &'a M, initial: &Image) -> Result<Self> {
        let estimate = initial.clone();
        let sensitivity = sensitivity_image(acquired, model)?;
        Self::with_sensitivity(acquired, model, estimate, sensitivity)
    }

    /// Start from `estimate`, reusing a previously calculated `sensitivity`
    pub fn with_sensitivity(
        acquired   : &'a ProjectionData,
        model      : &'a M,
        estimate   : Image,
        sensitivity: Image,
    ) -> Result<Self> {
        estimate.check_same_shape(&sensitivity)?;
        Ok(Self { acquired, model, sensitivity, estimate, iterations_done: 0 })
    }

    /// Perform one iteration, updating the estimate in place
    pub fn step(&mut self) -> Result<()> {
        update(&mut self.estimate, self.acquired, self.model, &self.sensitivity)?;
        self.iterations_done += 1;
        debug!("MLEM iteration {} done", self.iterations_done);
        Ok(())
    }

    pub fn estimate   (&self) -> &Image { &self.estimate }
    pub fn sensitivity(&self) -> &Image { &self.sensitivity }
    pub fn iterations_done(&self) -> usize { self.iterations_done }
    pub fn into_estimate(self) -> Image { self.estimate }

    /// An infinite sequence of images, each one made by performing one more
    /// iteration on the previous one. The sequence ends after the first error.
    pub fn iterations(mut self) -> impl Iterator<Item = Result<Image>> + 'a
    where
        M: 'a,
    {
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed { return None }
            match self.step() {
                Ok(()) => Some(Ok(self.estimate.clone())),
                Err(e) => { failed = true; Some(Err(e)) }
            }
        })
    }
}

/// One MLEM update of `estimate`, in place.
pub fn update<M>(
    estimate   : &mut Image,
    acquired   : &ProjectionData,
    model      : &M,
    sensitivity: &Image,
) -> Result<()>
where
    M: AcquisitionModel + ?Sized,
{
    // The live estimate must survive the forward projection
    let projected = model.forward(estimate.clone())?;
    let quotient = ratio(acquired, &projected)?;
    let backprojected = model.backward(quotient)?;
    let mult_update = normalize(&backprojected, sensitivity)?;
    estimate.try_mul_assign(&mult_update)
}

/// Data term of the update: `acquired / projected`, with non-finite ratios
/// replaced by finite ones.
pub fn ratio(acquired: &ProjectionData, projected: &ProjectionData) -> Result<ProjectionData> {
    let mut quotient = acquired.try_div(projected)?;
    let replaced = quotient.sanitize();
    if replaced > 0 { trace!("{replaced} non-finite data ratios replaced") }
    Ok(quotient)
}

/// Multiplicative update: `backprojected / sensitivity`, with non-finite
/// ratios replaced by finite ones.
pub fn normalize(backprojected: &Image, sensitivity: &Image) -> Result<Image> {
    let mut mult_update = backprojected.try_div(sensitivity)
        .map_err(|e| match e {
            Error::ShapeMismatch { expected, found, .. } =>
                Error::ShapeMismatch { context: "sensitivity image", expected, found },
            other => other,
        })?;
    let replaced = mult_update.sanitize();
    if replaced > 0 { trace!("{replaced} non-finite update factors replaced") }
    Ok(mult_update)
}
