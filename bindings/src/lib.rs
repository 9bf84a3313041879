use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;
use pyo3::wrap_pyfunction;

use emrecon::{DenseModel, Image, ImageGrid, ProjectionData, phantom::Phantom};

fn value_error(e: emrecon::Error) -> PyErr { PyValueError::new_err(e.to_string()) }

#[pyfunction]
#[pyo3(signature = (acquired, system_matrix, initial, iterations, background = None))]
/// MLEM reconstruction with an explicit system matrix (one row per detector
/// bin, one column per voxel). Returns the estimate after `iterations` updates;
/// `initial` is not modified.
fn mlem(
    acquired     : Vec<f32>,
    system_matrix: Vec<Vec<f32>>,
    initial      : Vec<f32>,
    iterations   : usize,
    background   : Option<Vec<f32>>,
) -> PyResult<Vec<f32>> {
    let mut model = DenseModel::from_rows(&system_matrix).map_err(value_error)?;
    if let Some(background) = background {
        let background = ProjectionData::flat(background).map_err(value_error)?;
        model = model.with_background(background).map_err(value_error)?;
    }
    let acquired = ProjectionData::new(model.shape(), acquired).map_err(value_error)?;
    let initial  = Image::new(model.grid(), initial).map_err(value_error)?;
    let estimate = emrecon::reconstruct(&acquired, &model, &initial, iterations).map_err(value_error)?;
    Ok(estimate.data)
}

#[pyfunction]
#[pyo3(text_signature = "(values, /)")]
/// Replace NaN with 0 and infinities with the largest finite values
fn nan_to_num(values: Vec<f32>) -> Vec<f32> {
    values.into_iter().map(emrecon::nan_to_num).collect()
}

#[pyfunction]
#[pyo3(signature = (data, size, n))]
/// Contrast recovery coefficients of the hot/cold disc phantom features, in an
/// image of `n` voxels spanning `size` mm
fn crcs(
    data: Vec<f32>,
    size: (f32, f32, f32),
    n   : (usize, usize, usize),
) -> PyResult<Option<Vec<f32>>> {
    let grid = ImageGrid::new(size, n).map_err(value_error)?;
    let image = Image::new(grid, data).map_err(value_error)?;
    Ok(Phantom::hot_cold_discs(grid).crcs(&image))
}

#[pymodule]
/// Maximum-likelihood expectation-maximization for emission tomography
fn emrecon_py(_py_gil: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(mlem, m)?)?;
    m.add_function(wrap_pyfunction!(nan_to_num, m)?)?;
    m.add_function(wrap_pyfunction!(crcs, m)?)?;
    Ok(())
}
