//! The covariance-kernel seam.
//!
//! Every kernel is a pure function of a [`Lag`], a pair of variate indices
//! and a pre-validated parameter slice. Kernels hold no mutable state and
//! are shared across builder tasks behind an `Arc`.

/// Separation between two locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lag {
    /// Spatial distance under the configured metric.
    pub distance: f64,
    /// Absolute time lag; `0.0` for purely spatial sets.
    pub time: f64,
}

impl Lag {
    pub fn spatial(distance: f64) -> Self {
        Lag { distance, time: 0.0 }
    }
}

/// Parametric covariance function.
///
/// Implementors must
/// - return the exact limiting value at `lag.distance == 0.0` without
///   evaluating a formula that is singular there;
/// - be symmetric in the variate pair: `covariance(l, i, j) ==
///   covariance(l, j, i)`;
/// - assume `theta.len() == param_count()` and finite entries (checked by
///   [`Kernel`](super::registry::Kernel) before any evaluation).
pub trait CovarianceKernel: Send + Sync + std::fmt::Debug {
    /// Registry name, e.g. `"UnivariateMaternStationary"`.
    fn name(&self) -> &'static str;

    fn param_count(&self) -> usize;

    /// Number of variates observed per location.
    fn variates(&self) -> usize {
        1
    }

    /// Whether the kernel reads [`Lag::time`].
    fn requires_time(&self) -> bool {
        false
    }

    /// Covariance between variate `vi` at one location and variate `vj` at
    /// another, separated by `lag`.
    fn covariance(&self, lag: Lag, vi: usize, vj: usize, theta: &[f64]) -> f64;
}
