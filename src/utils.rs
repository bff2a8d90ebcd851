//! Conversion helpers between Python objects and the geostatistics types.
//!
//! Everything here is FFI glue for the `python-bindings` feature: arrays are
//! accepted as NumPy arrays, pandas Series or plain float sequences, string
//! options are parsed with the same rules as the Rust `FromStr`
//! implementations, and every domain error is mapped to `ValueError`.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    geostat::{
        core::{
            locations::Locations,
            metric::{Dimension, DistanceMetric},
            options::GeoStatOptions,
        },
        errors::GeoStatError,
        tiles::StorageMode,
    },
    optimization::loglik_optimizer::{MLEOptions, ParamBounds, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a Python array-like into an owned `Array1<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_array1<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Build validated [`Locations`] from coordinate columns.
#[cfg(feature = "python-bindings")]
pub fn extract_locations<'py>(
    py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, z: Option<&Bound<'py, PyAny>>,
    t: Option<&Bound<'py, PyAny>>,
) -> PyResult<Locations> {
    let x = extract_array1(py, x, "x")?;
    let y = extract_array1(py, y, "y")?;
    let z = z.map(|v| extract_array1(py, v, "z")).transpose()?;
    let t = t.map(|v| extract_array1(py, v, "t")).transpose()?;
    Ok(Locations::new(x, y, z, t)?)
}

/// Build [`GeoStatOptions`] from Python keyword arguments.
///
/// `tol_exponent` follows the command-line convention `tol_f = 10^-k`;
/// `tol_f` wins when both are given.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_options(
    problem_size: usize, kernel: &str, tile_size: Option<usize>, metric: Option<&str>,
    dimension: Option<&str>, time_slots: Option<usize>, seed: Option<u64>, threads: Option<usize>,
    out_of_core_dir: Option<String>, tol_f: Option<f64>, tol_exponent: Option<u32>,
    max_evals: Option<usize>, initial_radius: Option<f64>, verbose: Option<bool>,
) -> PyResult<GeoStatOptions> {
    let metric: DistanceMetric = metric.unwrap_or("euclidean").parse()?;
    let dimension: Dimension = dimension.unwrap_or("2d").parse()?;
    let mut opts = GeoStatOptions::new(
        problem_size,
        tile_size.unwrap_or(64),
        kernel,
        metric,
        dimension,
        time_slots.unwrap_or(1),
    )?
    .with_seed(seed.unwrap_or(0))
    .with_threads(threads.unwrap_or(1))?;
    if let Some(dir) = out_of_core_dir {
        opts = opts.with_storage(StorageMode::OutOfCore { dir: dir.into() });
    }
    let tols = extract_tolerances(tol_f, tol_exponent, max_evals)?;
    let defaults = MLEOptions::default();
    let mle = MLEOptions::new(
        tols,
        initial_radius.unwrap_or(defaults.initial_radius),
        verbose.unwrap_or(false),
    )
    .map_err(GeoStatError::from)?;
    Ok(opts.with_mle(mle))
}

/// Stopping rules from Python arguments; defaults to `MLEOptions::default()`
/// when nothing is given.
#[cfg(feature = "python-bindings")]
pub fn extract_tolerances(
    tol_f: Option<f64>, tol_exponent: Option<u32>, max_evals: Option<usize>,
) -> PyResult<Tolerances> {
    let tols = match (tol_f, tol_exponent) {
        (Some(tol), _) => Tolerances::new(Some(tol), None, max_evals),
        (None, Some(k)) => Tolerances::from_exponent(k, max_evals),
        (None, None) if max_evals.is_some() => Tolerances::new(None, None, max_evals),
        (None, None) => Ok(MLEOptions::default().tols),
    };
    Ok(tols.map_err(GeoStatError::from)?)
}

/// Validated [`ParamBounds`] from two float sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_bounds(lower: Vec<f64>, upper: Vec<f64>) -> PyResult<ParamBounds> {
    Ok(ParamBounds::new(&lower, &upper).map_err(GeoStatError::from)?)
}
