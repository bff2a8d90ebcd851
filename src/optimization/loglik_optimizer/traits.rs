//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`OptimOutcome`]: normalized result returned by the high-level `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. A log-likelihood of `-∞` is a legal value and marks a
//! parameter point the optimizer must never select.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Theta,
        types::{DEFAULT_INITIAL_RADIUS, MAX_RADIUS},
        validation::{validate_theta_hat, validate_value, verify_tol_f, verify_tol_radius},
    },
};
use argmin::core::TerminationStatus;

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
///
/// - `type Data`: per-model data carried into `value`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`. Returning
///   `Ok(f64::NEG_INFINITY)` rejects the point without aborting the run;
///   `NaN` and `+∞` are errors.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — stopping rules.
/// - `initial_radius: f64` — starting trust radius as a fraction of every
///   parameter's box width, in `(0, 0.25]`.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `tol_f = 1e-6`, `tol_radius = 1e-6`, `max_evals = 500`
/// - `initial_radius`: `0.1`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub initial_radius: f64,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidInitialRadius`] unless `0 < initial_radius ≤ 0.25`.
    /// - [`OptError::InvalidTolRadius`] if `tols.tol_radius ≥ initial_radius`.
    pub fn new(tols: Tolerances, initial_radius: f64, verbose: bool) -> OptResult<Self> {
        if !(initial_radius > 0.0 && initial_radius <= MAX_RADIUS) {
            return Err(OptError::InvalidInitialRadius {
                radius: initial_radius,
                reason: "Initial radius must lie in (0, 0.25].",
            });
        }
        if let Some(tol) = tols.tol_radius {
            if tol >= initial_radius {
                return Err(OptError::InvalidTolRadius {
                    tol,
                    reason: "Final radius must be smaller than the initial radius.",
                });
            }
        }
        Ok(Self { tols, initial_radius, verbose })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_f: Some(1e-6), tol_radius: Some(1e-6), max_evals: Some(500) },
            initial_radius: DEFAULT_INITIAL_RADIUS,
            verbose: false,
        }
    }
}

/// Stopping rules used by the optimizer.
///
/// - `tol_f`: stop once an accepted step improves `ℓ` by less than this
///   absolute amount.
/// - `tol_radius`: stop once the trust radius (normalized units) falls
///   below this value.
/// - `max_evals`: hard cap on log-likelihood evaluations.
///
/// Any field can be `None` but **at least one** must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_f: Option<f64>,
    pub tol_radius: Option<f64>,
    pub max_evals: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolF`] / [`OptError::InvalidTolRadius`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxEvals`] if `max_evals == 0`.
    pub fn new(
        tol_f: Option<f64>, tol_radius: Option<f64>, max_evals: Option<usize>,
    ) -> OptResult<Self> {
        if tol_f.is_none() && tol_radius.is_none() && max_evals.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_f(tol_f)?;
        verify_tol_radius(tol_radius)?;
        if let Some(max_evals) = max_evals {
            if max_evals == 0 {
                return Err(OptError::InvalidMaxEvals {
                    max_evals,
                    reason: "Maximum evaluations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_f, tol_radius, max_evals })
    }

    /// Tolerances from the command-line convention `tol_f = 10^(-exponent)`.
    pub fn from_exponent(exponent: u32, max_evals: Option<usize>) -> OptResult<Self> {
        Self::new(Some(10f64.powi(-(exponent as i32))), None, max_evals)
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector evaluated.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `initial_value`: `ℓ(θ₀)`; `value >= initial_value` always holds.
/// - `converged`: `true` if a stopping rule fired (including the budget).
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub initial_value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, initial_value: f64,
        converged: TerminationStatus, iterations: u64, fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let status: String;
        let converged = match converged {
            TerminationStatus::NotTerminated => {
                status = "Not terminated".to_string();
                false
            }
            TerminationStatus::Terminated(reason) => {
                status = reason.text().to_string();
                true
            }
        };
        let iterations = iterations as usize;
        Ok(Self { theta_hat, value, initial_value, converged, status, iterations, fn_evals })
    }

    /// Number of log-likelihood evaluations spent.
    pub fn evaluations(&self) -> u64 {
        self.fn_evals.get("cost_count").copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // At least one stopping rule is mandatory.
    fn tolerances_require_one_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(Tolerances::new(None, None, Some(10)).is_ok());
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxEvals { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The exponent form mirrors `tol_f = 10^-k`.
    fn tolerances_from_exponent() {
        let tols = Tolerances::from_exponent(4, Some(100)).expect("valid tolerances");
        let tol_f = tols.tol_f.expect("tol_f is set");
        assert!((tol_f - 1e-4).abs() < 1e-18);
        assert_eq!(tols.max_evals, Some(100));
    }

    #[test]
    // Purpose
    // -------
    // The initial radius is bounded and must exceed the final radius.
    fn mle_options_validate_radii() {
        let tols = Tolerances::new(Some(1e-6), Some(1e-3), Some(50)).expect("valid tolerances");
        assert!(MLEOptions::new(tols, 0.1, false).is_ok());
        assert!(matches!(
            MLEOptions::new(tols, 0.5, false),
            Err(OptError::InvalidInitialRadius { .. })
        ));
        assert!(matches!(
            MLEOptions::new(tols, 1e-4, false),
            Err(OptError::InvalidTolRadius { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Terminated runs are reported as converged with the argmin reason text.
    fn outcome_maps_termination_status() {
        let out = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.0,
            -4.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            7,
            FnEvalMap::from([("cost_count".to_string(), 40)]),
        )
        .expect("valid outcome");
        assert!(out.converged);
        assert_eq!(out.iterations, 7);
        assert_eq!(out.evaluations(), 40);
        assert_eq!(out.status, TerminationReason::SolverConverged.text());
    }
}
