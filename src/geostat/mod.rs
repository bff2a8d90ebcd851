//! geostat — tiled Gaussian random field estimation and kriging.
//!
//! Purpose
//! -------
//! Provide the full geostatistics stack under one namespace: locations and
//! distance metrics, the covariance kernel family and its registry, tiled
//! matrices with a task runtime, the covariance builder, the tiled
//! Cholesky/likelihood engine, and the estimation, prediction and Fisher
//! information models on top. [`GeoStat`] bundles everything into a single
//! pipeline.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds validated value types: [`Locations`], [`GeoData`],
//!   [`DistanceMetric`], [`Dimension`], [`GeoStatOptions`] and the seeded
//!   location generator.
//! - [`kernels`] maps names to covariance kernels ([`KernelRegistry`]) and
//!   wraps them in the validated [`Kernel`] handle.
//! - [`tiles`] cuts matrices into tiles kept in memory or one file per tile,
//!   and owns the rayon-backed [`TaskRuntime`].
//! - [`covariance`] fills tiled covariance matrices and draws synthetic
//!   observations; [`linalg`] factors them and evaluates `ℓ(θ)`.
//! - [`models`] estimates `θ` with the bounded trust-region optimizer,
//!   krigs at new locations and computes Fisher information.
//!
//! Invariants & assumptions
//! ------------------------
//! - Location sets, observations and parameter vectors are finite and
//!   immutable once validated; tile tasks share them by reference.
//! - A covariance that is not positive definite scores `ℓ = −∞` while
//!   estimating and is a hard `SingularMatrix` error everywhere else.
//! - Storage mode, tile size and worker count never change results beyond
//!   round-off; synthetic data are bit-reproducible for a fixed seed.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. Multivariate observations are interleaved per
//!   location; space-time sets repeat each site once per time slot.
//! - Kernel names are case-sensitive; metric and dimension names are parsed
//!   case-insensitively.
//! - The stack performs no logging; optimizer progress is available through
//!   the `obs_slog` observer when `verbose` is set.
//!
//! Downstream usage
//! ----------------
//! - Typical flow:
//!   1. Build [`GeoStatOptions`] and a [`GeoStat`].
//!   2. `load_or_generate_data` with [`DataSource::Provided`] or
//!      [`DataSource::Synthetic`].
//!   3. `estimate_parameters(theta0, &bounds, tols)`.
//!   4. `predict_missing(None, &missing, truth)` to krig with the estimate.
//! - Advanced callers use the layers directly (e.g. `covariance_matrix` +
//!   `cholesky` + `log_likelihood`) with their own [`TaskRuntime`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each layer: Bessel closed forms and derivative
//!   kernels vs. finite differences, tiled Cholesky reconstruction across
//!   tile sizes and storage modes, likelihood permutation invariance,
//!   kriging interpolation and estimation on synthetic data.
//! - `tests/integration_geostat_pipeline.rs` runs the facade end to end.

pub mod api;
pub mod core;
pub mod covariance;
pub mod errors;
pub mod kernels;
pub mod linalg;
pub mod models;
pub mod tiles;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{DataSource, GeoStat};
pub use self::core::{
    Dimension, DistanceMetric, GeoData, GeoStatOptions, Locations, generate_locations,
};
pub use self::errors::{GeoStatError, GeoStatResult};
pub use self::kernels::{CovarianceKernel, Kernel, KernelRegistry, Lag};
pub use self::models::{
    EstimationOutcome, FieldSpec, FisherInformation, GaussianFieldModel, PredictionOutcome,
};
pub use self::tiles::{MatrixPart, StorageMode, TaskRuntime, TileLayout, TiledMatrix};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_geostat::geostat::prelude::*;
//
// to import the everyday surface in a single line.

pub mod prelude {
    pub use super::{
        DataSource, Dimension, DistanceMetric, EstimationOutcome, FisherInformation, GeoData,
        GeoStat, GeoStatError, GeoStatOptions, GeoStatResult, Kernel, KernelRegistry, Locations,
        PredictionOutcome, StorageMode, TaskRuntime,
    };
    pub use crate::optimization::loglik_optimizer::{MLEOptions, ParamBounds, Tolerances};
}
