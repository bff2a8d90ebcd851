//! High-level entry point for maximizing a user-provided `LogLikelihood`
//! inside a parameter box.
//!
//! This validates the start and the bounds, builds a [`BoundedTrustRegion`]
//! solver, wraps the model in an `ArgMinAdapter` (which *minimizes* `-ℓ(θ)`),
//! and delegates the run to `run_trust_region`.
//!
//! [`BoundedTrustRegion`]: crate::optimization::loglik_optimizer::trust_region::BoundedTrustRegion
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        bounds::ParamBounds,
        builders::build_trust_region,
        run::run_trust_region,
        traits::{LogLikelihood, MLEOptions},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` over `bounds` without derivatives.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)` and checks that
///   it lies inside `bounds`.
/// - Runs the bounded quadratic-model trust-region method; points with
///   `ℓ = -∞` are rejected, never selected.
/// - The reported `theta_hat`/`value` are the best point ever evaluated, so
///   `value >= initial_value`.
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - `OptError::StartOutsideBounds` / `OptError::BoundsLengthMismatch` for
///   an inconsistent start.
/// - `OptError::NoFeasiblePoint` if the start and its first trial points are all
///   rejected.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_geostat::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{LogLikelihood, MLEOptions, ParamBounds, Theta, maximize},
/// };
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-(theta[0] - 0.3).powi(2))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let bounds = ParamBounds::new(&[0.0], &[1.0])?;
/// let out = maximize(&Concave, array![0.9], &bounds, &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_geostat::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, bounds: &ParamBounds, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    bounds.check_contains(&theta0)?;
    let solver = build_trust_region(bounds, opts)?;
    let problem = ArgMinAdapter::new(f, data);
    run_trust_region(theta0, opts, problem, solver)
}
