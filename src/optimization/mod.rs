//! optimization — bounded MLE stack and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for model fitting: an Argmin-backed,
//! derivative-free log-likelihood maximizer over a parameter box and a single
//! error/result surface. Callers implement a log-likelihood, choose bounds
//! and stopping rules, and obtain fitted parameters and diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`).
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`;
//!   user-facing APIs and outcomes are expressed in terms of `ℓ`.
//! - This module and its submodules avoid I/O; progress reporting is only
//!   available through the `obs_slog` observer when `verbose` is set.
//!
//! Downstream usage
//! ----------------
//! - `geostat::models` implements `LogLikelihood` for the Gaussian-field
//!   model and calls `maximize`.
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.

pub mod errors;
pub mod loglik_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_geostat::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
