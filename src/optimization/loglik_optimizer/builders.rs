//! loglik_optimizer::builders — bounded trust-region solver construction.
//!
//! Purpose
//! -------
//! Hide the solver's wiring behind a single builder that applies crate-level
//! options ([`MLEOptions`]) and validated [`ParamBounds`], so higher-level
//! code can request a configured solver without touching Argmin types.
//!
//! Conventions
//! -----------
//! - The builder does **not** set the initial parameter vector; that is a
//!   runtime concern applied by the runner (`run_trust_region`).
//! - Errors are always reported via [`OptResult`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{bounds::ParamBounds, traits::MLEOptions, trust_region::BoundedTrustRegion},
};

/// build_trust_region — construct a bounded trust-region solver.
///
/// Parameters
/// ----------
/// - `bounds`: validated per-parameter box; its length fixes the problem
///   dimension.
/// - `opts`: supplies the initial radius and the stopping rules.
///
/// Errors
/// ------
/// - [`OptError::InvalidMaxEvals`] if the budget cannot cover the start
///   evaluation plus one full sampling sweep (`2n + 1` evaluations).
pub fn build_trust_region(
    bounds: &ParamBounds, opts: &MLEOptions,
) -> OptResult<BoundedTrustRegion> {
    if let Some(max_evals) = opts.tols.max_evals {
        let free = (0..bounds.len()).filter(|&i| !bounds.is_fixed(i)).count();
        if max_evals < 2 * free + 1 {
            return Err(OptError::InvalidMaxEvals {
                max_evals,
                reason: "Budget must cover the start point and one sampling sweep (2n + 1).",
            });
        }
    }
    Ok(BoundedTrustRegion::new(bounds.clone(), opts.initial_radius, &opts.tols))
}
