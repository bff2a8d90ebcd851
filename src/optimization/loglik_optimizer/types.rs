//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the
//! log-likelihood optimizer so the rest of the optimization code stays
//! agnostic to `ndarray` and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors and scalar costs
//!   (`Theta`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Fix the Argmin state type used by the derivative-free solver
//!   (`TrustRegionState`): no gradient, Jacobian, Hessian or residuals.
//!
//! Conventions
//! -----------
//! - `Theta` is a column vector with one entry per kernel parameter, in
//!   the kernel's own (bounded, untransformed) units.
//! - `Cost` is the negated log-likelihood; higher layers flip the sign.
//! - The trust-radius constants are expressed in bound-normalized units,
//!   i.e. a radius of `0.1` is one tenth of every parameter's box width.
use argmin::core::IterState;
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ` for log-likelihood optimization.
pub type Theta = Array1<f64>;

/// Scalar objective value used by the optimizer.
///
/// In this crate, this is the cost `c(θ) = -ℓ(θ)` derived from a
/// log-likelihood `ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Argmin iteration state for derivative-free runs.
pub type TrustRegionState = IterState<Theta, (), (), (), (), Cost>;

/// Default initial trust radius (normalized units).
pub const DEFAULT_INITIAL_RADIUS: f64 = 0.1;

/// Largest trust radius the solver will grow to (normalized units).
pub const MAX_RADIUS: f64 = 0.25;

/// Final trust radius used when no explicit radius tolerance is given.
pub const DEFAULT_FINAL_RADIUS: f64 = 1e-8;
