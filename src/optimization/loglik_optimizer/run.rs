//! Execution helper that runs the bounded solver on a log-likelihood problem
//! and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
        trust_region::BoundedTrustRegion,
    },
};
use argmin::core::{Executor, State};

/// Run the bounded trust-region solver for a log-likelihood problem.
///
/// Wires up the user model via [`ArgMinAdapter`], the prepared
/// [`BoundedTrustRegion`], the initial parameter `theta0`, and optional
/// observers (behind the `obs_slog` feature), then executes the solver and
/// converts the result into [`OptimOutcome`].
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `opts.verbose == true`, a terminal
/// slog observer is attached with `ObserverMode::Always`.
///
/// # Errors
/// - Propagates any `argmin` runtime error, including errors raised by the
///   user's `value` (they come back as their original [`OptError`] variant).
/// - Propagates validation errors raised while constructing [`OptimOutcome`].
///
/// [`OptError`]: crate::optimization::errors::OptError
pub fn run_trust_region<'a, F>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: BoundedTrustRegion,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    #[cfg(not(feature = "obs_slog"))]
    let _ = opts.verbose;

    let result = optimizer.run()?;
    let initial_value = -result.solver().initial_cost();
    let mut state = result.state().clone();
    let iterations = state.get_iter();
    let function_counts = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        initial_value,
        termination,
        iterations,
        function_counts,
    )
}
