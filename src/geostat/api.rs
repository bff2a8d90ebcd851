//! GeoStat — one-stop facade for generating or loading data, estimating
//! parameters and predicting at new locations.
//!
//! Purpose
//! -------
//! Bundle a validated [`GeoStatOptions`], a kernel registry, the resolved
//! kernel and the worker pool into one value so that callers can run the
//! whole pipeline without wiring the lower layers themselves.
//!
//! Key behaviors
//! -------------
//! - [`GeoStat::new`] resolves the kernel name against the built-in
//!   registry and starts a [`TaskRuntime`] with `options.threads` workers;
//!   [`GeoStat::with_registry`] accepts a custom registry.
//! - [`GeoStat::load_or_generate_data`] either validates caller data or
//!   draws synthetic locations and observations from the configured seed.
//! - [`GeoStat::estimate_parameters`] maximizes the log-likelihood and keeps
//!   the estimate for later prediction.
//! - [`GeoStat::predict_missing`] krigs at new locations with either a
//!   supplied `θ` or the stored estimate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernels that read time lags need `Dimension::SpaceTime`.
//! - The runtime lives as long as the facade; dropping the facade releases
//!   the workers.
//!
//! Downstream usage
//! ----------------
//! - The Python class `GaussianField` is a thin wrapper over this type.
use crate::{
    geostat::{
        core::{
            data::GeoData, generator::generate_locations, locations::Locations, metric::Dimension,
            options::GeoStatOptions,
        },
        covariance::observations::generate_observations,
        errors::{GeoStatError, GeoStatResult},
        kernels::{Kernel, KernelRegistry},
        models::{
            EstimationOutcome, FieldSpec, FisherInformation, PredictionOutcome, estimate,
            fisher_information, predict,
        },
        tiles::TaskRuntime,
    },
    optimization::loglik_optimizer::{MLEOptions, ParamBounds, Tolerances},
};
use ndarray::Array1;

/// Where the facade's data come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Generate `problem_size` sites and draw observations under `theta`.
    Synthetic { theta: Vec<f64> },
    /// Use caller-supplied data.
    Provided(GeoData),
}

/// Gaussian-field pipeline over one configuration.
#[derive(Debug)]
pub struct GeoStat {
    options: GeoStatOptions,
    registry: KernelRegistry,
    spec: FieldSpec,
    runtime: TaskRuntime,
    data: Option<GeoData>,
    estimate: Option<EstimationOutcome>,
}

impl GeoStat {
    /// Build with the built-in kernels.
    ///
    /// Errors
    /// ------
    /// See [`GeoStat::with_registry`].
    pub fn new(options: GeoStatOptions) -> GeoStatResult<Self> {
        Self::with_registry(options, KernelRegistry::with_builtin_kernels())
    }

    /// Build with a caller-provided registry.
    ///
    /// Errors
    /// ------
    /// - `UnknownKernel` when `options.kernel` is not registered.
    /// - `UnsupportedKernel` for a space-time kernel outside a space-time
    ///   layout.
    /// - `InvalidThreadCount` / `RuntimeInit` when the pool cannot start.
    pub fn with_registry(options: GeoStatOptions, registry: KernelRegistry) -> GeoStatResult<Self> {
        let kernel = registry.create(&options.kernel, options.time_slots)?;
        if kernel.requires_time() && options.dimension != Dimension::SpaceTime {
            return Err(GeoStatError::UnsupportedKernel {
                kernel: kernel.name().to_string(),
                reason: "space-time kernels require the space-time dimension",
            });
        }
        let runtime = TaskRuntime::new(options.threads)?;
        let spec =
            FieldSpec::new(kernel, options.metric, options.tile_size, options.storage.clone())?;
        Ok(GeoStat { options, registry, spec, runtime, data: None, estimate: None })
    }

    pub fn options(&self) -> &GeoStatOptions {
        &self.options
    }

    pub fn kernel(&self) -> &Kernel {
        &self.spec.kernel
    }

    pub fn runtime(&self) -> &TaskRuntime {
        &self.runtime
    }

    /// Loaded data, if any.
    pub fn data(&self) -> Option<&GeoData> {
        self.data.as_ref()
    }

    /// Last estimation outcome, if any.
    pub fn estimate(&self) -> Option<&EstimationOutcome> {
        self.estimate.as_ref()
    }

    /// Install data from `source`, replacing earlier data and estimates.
    ///
    /// Errors
    /// ------
    /// - Kernel and layout errors while generating.
    /// - `SingularMatrix` when the synthetic covariance cannot be factored.
    /// - `DimensionMismatch` / `MissingTimeCoordinate` for provided data that
    ///   do not fit the kernel.
    pub fn load_or_generate_data(&mut self, source: DataSource) -> GeoStatResult<&GeoData> {
        let data = match source {
            DataSource::Synthetic { theta } => {
                let o = &self.options;
                let locations =
                    generate_locations(o.problem_size, o.dimension, o.time_slots, o.seed)?;
                let observations = generate_observations(
                    &self.runtime,
                    &locations,
                    &theta,
                    &self.spec.kernel,
                    self.spec.metric,
                    o.seed,
                    self.spec.tile_size,
                    &self.spec.storage,
                )?;
                GeoData::new(locations, observations, self.spec.kernel.variates())?
            }
            DataSource::Provided(data) => {
                self.spec.check_data(&data)?;
                data
            }
        };
        self.estimate = None;
        Ok(self.data.insert(data))
    }

    /// `ℓ(θ)` of the loaded data (`−∞` when `Σ(θ)` is not positive definite).
    pub fn log_likelihood(&self, theta: &[f64]) -> GeoStatResult<f64> {
        let data = self.data.as_ref().ok_or(GeoStatError::NoData)?;
        self.spec.log_likelihood(&self.runtime, theta, data)
    }

    /// Maximize the log-likelihood of the loaded data over `bounds`.
    ///
    /// The trust radius and verbosity come from `options.mle`; `tols`
    /// replaces its stopping rules.
    ///
    /// Errors
    /// ------
    /// - `NoData` before [`GeoStat::load_or_generate_data`].
    /// - Start, bounds and optimizer errors from estimation.
    pub fn estimate_parameters(
        &mut self, theta0: &[f64], bounds: &ParamBounds, tols: Tolerances,
    ) -> GeoStatResult<&EstimationOutcome> {
        let data = self.data.as_ref().ok_or(GeoStatError::NoData)?;
        let mle = MLEOptions::new(tols, self.options.mle.initial_radius, self.options.mle.verbose)?;
        let outcome = estimate(&self.runtime, &self.spec, data, theta0, bounds, &mle)?;
        Ok(self.estimate.insert(outcome))
    }

    /// Krig at `missing` with `theta`, or with the stored estimate when
    /// `theta` is `None`. Variances are always computed; MSPE when `truth`
    /// is given.
    ///
    /// Errors
    /// ------
    /// - `NoData` / `NotEstimated` when inputs are missing.
    /// - `SingularMatrix` when the observed covariance cannot be factored.
    pub fn predict_missing(
        &self, theta: Option<&[f64]>, missing: &Locations, truth: Option<&Array1<f64>>,
    ) -> GeoStatResult<PredictionOutcome> {
        let data = self.data.as_ref().ok_or(GeoStatError::NoData)?;
        let theta = self.resolve_theta(theta)?;
        predict(&self.runtime, &self.spec, &theta, data, missing, truth, true)
    }

    /// Fisher information at `theta` (or the stored estimate) over the
    /// loaded locations.
    pub fn fisher_information(&self, theta: Option<&[f64]>) -> GeoStatResult<FisherInformation> {
        let data = self.data.as_ref().ok_or(GeoStatError::NoData)?;
        let theta = self.resolve_theta(theta)?;
        fisher_information(&self.runtime, &self.registry, &self.spec, data.locations(), &theta)
    }

    fn resolve_theta(&self, theta: Option<&[f64]>) -> GeoStatResult<Vec<f64>> {
        match (theta, &self.estimate) {
            (Some(t), _) => Ok(t.to_vec()),
            (None, Some(e)) => Ok(e.theta_hat.to_vec()),
            (None, None) => Err(GeoStatError::NotEstimated),
        }
    }
}
