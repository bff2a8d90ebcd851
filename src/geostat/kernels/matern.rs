//! Stationary univariate Matérn kernels.
//!
//! With `x = d / β`:
//!
//! ```text
//! C(d) = σ² / (2^{ν-1} Γ(ν)) · x^ν · K_ν(x),    C(0) = σ²
//! ```
//!
//! The nugget variant adds `τ²` on the diagonal only (`d == 0`).
use crate::geostat::kernels::{
    special::bessel_k,
    traits::{CovarianceKernel, Lag},
};
use statrs::function::gamma::gamma;

/// `σ² / (2^{ν-1} Γ(ν))`.
pub(crate) fn matern_scale(sigma2: f64, nu: f64) -> f64 {
    sigma2 / (2f64.powf(nu - 1.0) * gamma(nu))
}

/// `x^p K_ν(x)` for `x > 0`.
pub(crate) fn x_pow_bessel(x: f64, p: f64, nu: f64) -> f64 {
    let k = bessel_k(nu, x);
    if k == 0.0 { 0.0 } else { x.powf(p) * k }
}

/// Matérn covariance at distance `d`.
pub fn matern(sigma2: f64, beta: f64, nu: f64, d: f64) -> f64 {
    if d == 0.0 {
        return sigma2;
    }
    let x = d / beta;
    matern_scale(sigma2, nu) * x_pow_bessel(x, nu, nu)
}

/// θ = (σ², β, ν).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnivariateMaternStationary;

impl CovarianceKernel for UnivariateMaternStationary {
    fn name(&self) -> &'static str {
        "UnivariateMaternStationary"
    }

    fn param_count(&self) -> usize {
        3
    }

    fn covariance(&self, lag: Lag, _vi: usize, _vj: usize, theta: &[f64]) -> f64 {
        matern(theta[0], theta[1], theta[2], lag.distance)
    }
}

/// θ = (σ², β, ν, τ²).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnivariateMaternNuggetsStationary;

impl CovarianceKernel for UnivariateMaternNuggetsStationary {
    fn name(&self) -> &'static str {
        "UnivariateMaternNuggetsStationary"
    }

    fn param_count(&self) -> usize {
        4
    }

    fn covariance(&self, lag: Lag, _vi: usize, _vj: usize, theta: &[f64]) -> f64 {
        let c = matern(theta[0], theta[1], theta[2], lag.distance);
        if lag.distance == 0.0 { c + theta[3] } else { c }
    }
}
