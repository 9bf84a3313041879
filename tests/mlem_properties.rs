use std::cell::Cell;

use float_eq::assert_float_eq;
#[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
use proptest::prelude::*;
use rstest::rstest;

use emrecon::{
    AcquisitionModel, DenseModel, Field, Image, ImageGrid, ParallelBeam, ProjectionData, Result,
    fom::poisson_log_likelihood,
    mlem::{self, reconstruct, Mlem},
};

/// Wraps a model, counting how often each operator is used
struct Counting<M> {
    inner: M,
    forward: Cell<usize>,
    backward: Cell<usize>,
}

impl<M> Counting<M> {
    fn new(inner: M) -> Self { Self { inner, forward: Cell::new(0), backward: Cell::new(0) } }
}

impl<M: AcquisitionModel> AcquisitionModel for Counting<M> {
    fn forward(&self, image: Image) -> Result<ProjectionData> {
        self.forward.set(self.forward.get() + 1);
        self.inner.forward(image)
    }
    fn backward(&self, data: ProjectionData) -> Result<Image> {
        self.backward.set(self.backward.get() + 1);
        self.inner.backward(data)
    }
}

/// Four bins looking at a 2x2 image: one bin per row and one per column, all
/// with strictly positive weights.
fn dense_2x2() -> DenseModel {
    DenseModel::from_rows(&[
        vec![1.0, 1.0, 0.1, 0.1],
        vec![0.1, 0.1, 1.0, 1.0],
        vec![1.0, 0.1, 1.0, 0.1],
        vec![0.1, 1.0, 0.1, 1.0],
    ]).unwrap()
}

fn data(values: &[f32]) -> ProjectionData { ProjectionData::flat(values.to_vec()).unwrap() }

#[rstest(n, case(0), case(1), case(4))]
fn operator_calls_per_iteration(n: usize) {
    let model = Counting::new(dense_2x2());
    let acquired = data(&[3.0, 5.0, 2.0, 7.0]);
    let initial = Image::ones(model.inner.grid());
    reconstruct(&acquired, &model, &initial, n).unwrap();
    // The sensitivity image costs one back-projection, even without iterating
    assert_eq!(model.forward .get(), n);
    assert_eq!(model.backward.get(), n + 1);
}

#[test]
fn zero_iterations_returns_copy_of_initial() {
    let model = dense_2x2();
    let acquired = data(&[3.0, 5.0, 2.0, 7.0]);
    let initial = Image::new(model.grid(), vec![0.5, 1.5, 2.5, 3.5]).unwrap();
    let result = reconstruct(&acquired, &model, &initial, 0).unwrap();
    assert_eq!(result, initial);
}

#[test]
fn initial_image_is_not_modified() {
    let model = dense_2x2();
    let acquired = data(&[3.0, 5.0, 2.0, 7.0]);
    let initial = Image::ones(model.grid());
    let before = initial.clone();
    let result = reconstruct(&acquired, &model, &initial, 5).unwrap();
    assert_eq!(initial, before);
    assert_ne!(result, initial);
}

#[test]
fn likelihood_does_not_decrease() {
    let model = dense_2x2();
    let acquired = data(&[9.0, 1.0, 4.0, 6.0]);
    let initial = Image::ones(model.grid());
    let mut previous = f64::NEG_INFINITY;
    for image in Mlem::new(&acquired, &model, &initial).unwrap().iterations().take(20) {
        let image = image.unwrap();
        let projected = model.forward(image).unwrap();
        let llh = poisson_log_likelihood(&acquired, &projected).unwrap();
        assert!(llh >= previous - 1e-4, "log-likelihood fell from {previous} to {llh}");
        previous = llh;
    }
}

#[test]
fn zero_over_zero_bin_contributes_nothing() {
    // Bin 2 neither sees the image nor measured anything
    let model = DenseModel::from_rows(&[
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ]).unwrap();
    let acquired = data(&[2.0, 4.0, 0.0]);
    let projected = model.forward(Image::ones(model.grid())).unwrap();
    let quotient = mlem::ratio(&acquired, &projected).unwrap();
    assert_eq!(quotient.data, vec![2.0, 4.0, 0.0]);

    let result = reconstruct(&acquired, &model, &Image::ones(model.grid()), 1).unwrap();
    assert!(result.all_finite());
    assert_float_eq!(result.data, vec![2.0, 4.0], ulps_all <= 1);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let grid = ImageGrid::new((8.0, 8.0, 2.0), (8, 8, 2)).unwrap();
    let model = ParallelBeam::covering(grid, 12).unwrap().system_matrix().unwrap();
    let truth = {
        let mut truth = Image::ones(grid);
        for i in [9_usize, 18, 27, 100] { truth[i] = 10.0; }
        truth
    };
    let acquired = model.forward(truth).unwrap();
    let initial = Image::ones(grid);
    let a = reconstruct(&acquired, &model, &initial, 6).unwrap();
    let b = reconstruct(&acquired, &model, &initial, 6).unwrap();
    let bits = |image: &Image| image.data.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
}

proptest! {
    #[test]
    fn estimate_stays_non_negative(
        counts  in prop::collection::vec(0u32..50, 4),
        initial in prop::collection::vec(prop_oneof![Just(0.0f32), 0.01f32..10.0], 4),
        n in 0usize..8,
    ) {
        let model = dense_2x2();
        let acquired = data(&counts.iter().map(|&c| c as f32).collect::<Vec<_>>());
        let initial = Image::new(model.grid(), initial).unwrap();
        let result = reconstruct(&acquired, &model, &initial, n).unwrap();
        prop_assert!(result.data.iter().all(|&x| x >= 0.0 && x.is_finite()),
                     "{:?}", result.data);
    }

    #[test]
    fn zero_voxel_stays_zero(
        counts in prop::collection::vec(1u32..50, 4),
        which in 0usize..4,
    ) {
        let model = dense_2x2();
        let acquired = data(&counts.iter().map(|&c| c as f32).collect::<Vec<_>>());
        let mut initial = Image::ones(model.grid());
        initial[which] = 0.0;
        let result = reconstruct(&acquired, &model, &initial, 3).unwrap();
        prop_assert_eq!(result[which], 0.0);
    }
}
