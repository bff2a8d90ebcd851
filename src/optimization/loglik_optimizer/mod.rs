//! loglik_optimizer — bounded, derivative-free log-likelihood optimizer.
//!
//! Purpose
//! -------
//! Provide an Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)` inside a per-parameter box when every
//! evaluation is expensive and gradients are unavailable. Callers implement
//! a single trait, [`LogLikelihood`], and invoke [`maximize`].
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into Argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`]; `ℓ = -∞`
//!   is a legal "reject this point" value.
//! - Expose a single, user-facing entrypoint [`maximize`] that:
//!   - validates the initial guess with [`LogLikelihood::check`] and
//!     [`ParamBounds::check_contains`],
//!   - builds a [`trust_region::BoundedTrustRegion`] via [`builders`],
//!   - executes it via [`run::run_trust_region`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Centralize optimizer configuration ([`Tolerances`], [`MLEOptions`],
//!   [`ParamBounds`]) and validation logic ([`validation`]) so downstream
//!   code can assume sane, finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** `ℓ(θ)` by minimizing `-ℓ(θ)`; user
//!   code implements `ℓ(θ)`, **never** the cost directly.
//! - The reported estimate is the best point ever evaluated; it is never
//!   worse than the start.
//! - Configuration types are validated on construction and treated as
//!   internally consistent by the solver layer.
//!
//! Conventions
//! -----------
//! - Parameters live in model units as [`Theta`] (`Array1<f64>`); the solver
//!   rescales to the unit cube internally.
//! - Errors bubble up as `OptResult<T>` / `OptError`; this module and its
//!   children never intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - Model crates implement [`LogLikelihood`] for their types, then call
//!   [`maximize`] with a model, a start, [`ParamBounds`], a data payload and
//!   [`MLEOptions`].
//! - Front-ends interact only with the re-exported surface.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`], model
//!   fitting and the subproblem in [`trust_region`], budget validation in
//!   [`builders`], configuration invariants in [`traits`] and [`bounds`],
//!   and end-to-end toy problems in [`api`].

pub mod adapter;
pub mod api;
pub mod bounds;
pub mod builders;
pub mod run;
pub mod traits;
pub mod trust_region;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::bounds::ParamBounds;
pub use self::traits::{LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, FnEvalMap, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_geostat::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize;
    pub use super::bounds::ParamBounds;
    pub use super::traits::{LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Theta};
}
