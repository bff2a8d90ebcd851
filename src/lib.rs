//! rust_geostat — tile-based Gaussian random field estimation and kriging
//! with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the geostatistics pipeline to Python via the `_rust_geostat`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes used by the `rust_geostat`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`geostat` and `optimization`) as the
//!   public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_geostat` Python extension.
//! - Register the `gaussian_field` submodule under `rust_geostat` so that
//!   dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work is implemented in the inner Rust modules; this
//!   file performs only FFI glue, input validation, and error mapping.
//! - When `python-bindings` is enabled, the Python-visible types mirror the
//!   invariants and signatures of their Rust counterparts (`GeoStat`,
//!   `EstimationOutcome`, `PredictionOutcome`).
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_geostat.<submodule>` and are
//!   typically wrapped by thin pure-Python facades in the top-level
//!   `rust_geostat` package.
//! - Errors from core Rust code are propagated as rich error types internally
//!   and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on [`geostat`] (or its
//!   `prelude`) and can ignore the PyO3 items guarded by `python-bindings`.
//! - The Python packaging layer imports the `_rust_geostat` module defined
//!   here and wraps its classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by `tests/integration_geostat_pipeline.rs`.
//! - The PyO3 layer is exercised from Python against the built extension.

pub mod geostat;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    geostat::{
        api::{DataSource, GeoStat},
        core::data::GeoData,
        models::{EstimationOutcome, PredictionOutcome},
    },
    utils::{build_options, extract_array1, extract_bounds, extract_locations, extract_tolerances},
};

/// GaussianField — Python-facing wrapper around the [`GeoStat`] pipeline.
///
/// Purpose
/// -------
/// Let Python callers configure a Gaussian random field, load or simulate
/// data, estimate the kernel parameters and krig at new locations.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `GaussianField(problem_size, kernel, tile_size=64, metric="euclidean",
/// dimension="2d", time_slots=1, seed=0, threads=1, out_of_core_dir=None,
/// tol_f=None, tol_exponent=None, max_evals=None, initial_radius=None,
/// verbose=False)`.
///
/// Fields
/// ------
/// - `inner`: [`GeoStat`]
///   Configured pipeline owning the worker pool, data and last estimate.
///
/// Performance
/// -----------
/// - Heavy work runs on the Rust worker pool; inputs are copied once into
///   Rust buffers.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_geostat.gaussian_field", unsendable)]
pub struct GaussianField {
    inner: GeoStat,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GaussianField {
    #[new]
    #[pyo3(
        signature = (
            problem_size,
            kernel,
            tile_size = None,
            metric = None,
            dimension = None,
            time_slots = None,
            seed = None,
            threads = None,
            out_of_core_dir = None,
            tol_f = None,
            tol_exponent = None,
            max_evals = None,
            initial_radius = None,
            verbose = None,
        ),
        text_signature = "(problem_size, kernel, /, tile_size=None, metric=None, dimension=None, \
                          time_slots=None, seed=None, threads=None, out_of_core_dir=None, \
                          tol_f=None, tol_exponent=None, max_evals=None, initial_radius=None, \
                          verbose=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        problem_size: usize, kernel: &str, tile_size: Option<usize>, metric: Option<&str>,
        dimension: Option<&str>, time_slots: Option<usize>, seed: Option<u64>,
        threads: Option<usize>, out_of_core_dir: Option<String>, tol_f: Option<f64>,
        tol_exponent: Option<u32>, max_evals: Option<usize>, initial_radius: Option<f64>,
        verbose: Option<bool>,
    ) -> PyResult<Self> {
        let opts = build_options(
            problem_size,
            kernel,
            tile_size,
            metric,
            dimension,
            time_slots,
            seed,
            threads,
            out_of_core_dir,
            tol_f,
            tol_exponent,
            max_evals,
            initial_radius,
            verbose,
        )?;
        Ok(GaussianField { inner: GeoStat::new(opts)? })
    }

    /// Simulate `problem_size` sites and observations under `theta`.
    pub fn simulate(&mut self, theta: Vec<f64>) -> PyResult<Vec<f64>> {
        let data = self.inner.load_or_generate_data(DataSource::Synthetic { theta })?;
        Ok(data.observations().to_vec())
    }

    /// Load observed data at the given coordinates.
    #[pyo3(signature = (x, y, observations, z = None, t = None))]
    pub fn load<'py>(
        &mut self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        observations: &Bound<'py, PyAny>, z: Option<&Bound<'py, PyAny>>,
        t: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<()> {
        let locations = extract_locations(py, x, y, z, t)?;
        let obs = extract_array1(py, observations, "observations")?;
        let data = GeoData::new(locations, obs, self.inner.kernel().variates())?;
        self.inner.load_or_generate_data(DataSource::Provided(data))?;
        Ok(())
    }

    /// Log-likelihood of the loaded data at `theta`.
    pub fn log_likelihood(&self, theta: Vec<f64>) -> PyResult<f64> {
        Ok(self.inner.log_likelihood(&theta)?)
    }

    /// Maximum-likelihood fit inside `[lower, upper]` from `theta0`.
    #[pyo3(signature = (theta0, lower, upper, tol_f = None, tol_exponent = None, max_evals = None))]
    pub fn estimate(
        &mut self, theta0: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>, tol_f: Option<f64>,
        tol_exponent: Option<u32>, max_evals: Option<usize>,
    ) -> PyResult<FieldEstimate> {
        let bounds = extract_bounds(lower, upper)?;
        let tols = match (tol_f, tol_exponent, max_evals) {
            (None, None, None) => self.inner.options().mle.tols,
            _ => extract_tolerances(tol_f, tol_exponent, max_evals)?,
        };
        let outcome = self.inner.estimate_parameters(&theta0, &bounds, tols)?;
        Ok(FieldEstimate { inner: outcome.clone() })
    }

    /// Krig at new coordinates with `theta` or the last estimate.
    #[pyo3(signature = (x, y, z = None, t = None, theta = None, truth = None))]
    #[allow(clippy::too_many_arguments)]
    pub fn predict<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        z: Option<&Bound<'py, PyAny>>, t: Option<&Bound<'py, PyAny>>, theta: Option<Vec<f64>>,
        truth: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<FieldPrediction> {
        let missing = extract_locations(py, x, y, z, t)?;
        let truth = truth.map(|v| extract_array1(py, v, "truth")).transpose()?;
        let outcome = self.inner.predict_missing(theta.as_deref(), &missing, truth.as_ref())?;
        Ok(FieldPrediction { inner: outcome })
    }

    /// Fisher information matrix (row-major) and standard errors.
    #[pyo3(signature = (theta = None))]
    pub fn fisher_information(
        &self, theta: Option<Vec<f64>>,
    ) -> PyResult<(Vec<Vec<f64>>, Vec<f64>)> {
        let info = self.inner.fisher_information(theta.as_deref())?;
        let rows = info.matrix.outer_iter().map(|r| r.to_vec()).collect();
        Ok((rows, info.standard_errors.to_vec()))
    }
}

/// FieldEstimate — read-only view of an [`EstimationOutcome`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_geostat.gaussian_field")]
pub struct FieldEstimate {
    inner: EstimationOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FieldEstimate {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood
    }

    #[getter]
    pub fn initial_log_likelihood(&self) -> f64 {
        self.inner.initial_log_likelihood
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn evaluations(&self) -> u64 {
        self.inner.evaluations
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }
}

/// FieldPrediction — read-only view of a [`PredictionOutcome`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_geostat.gaussian_field")]
pub struct FieldPrediction {
    inner: PredictionOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FieldPrediction {
    #[getter]
    pub fn means(&self) -> Vec<f64> {
        self.inner.means.to_vec()
    }

    #[getter]
    pub fn variances(&self) -> Option<Vec<f64>> {
        self.inner.variances.as_ref().map(|v| v.to_vec())
    }

    #[getter]
    pub fn mspe(&self) -> Option<f64> {
        self.inner.mspe
    }
}

/// _rust_geostat — PyO3 module initializer for the Python extension.
///
/// Creates the `gaussian_field` submodule, attaches it to `_rust_geostat`
/// and registers it in `sys.modules` so it is importable via its dotted
/// path. Invoked by Python when importing the compiled extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_geostat<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let gaussian_field_mod = PyModule::new(_py, "gaussian_field")?;
    gaussian_field(_py, m, &gaussian_field_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_geostat.gaussian_field", gaussian_field_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn gaussian_field<'py>(
    _py: Python, rust_geostat: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<GaussianField>()?;
    m.add_class::<FieldEstimate>()?;
    m.add_class::<FieldPrediction>()?;
    rust_geostat.add_submodule(m)?;
    Ok(())
}
