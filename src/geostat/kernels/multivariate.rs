//! Parsimonious multivariate Matérn kernels.
//!
//! All variates share the range `β`; variate `i` has sill `σ²_i` and
//! smoothness `ν_i`. The cross-covariance of variates `i ≠ j` is a Matérn
//! with smoothness `ν_ij = (ν_i + ν_j)/2` and sill
//!
//! ```text
//! ρ_ij √(σ²_i σ²_j) · √(Γ(ν_i+1)Γ(ν_j+1) / (Γ(ν_i)Γ(ν_j)))
//!     · Γ(ν_ij) / Γ(ν_ij+1)
//!   = ρ_ij √(σ²_i σ²_j) · √(ν_i ν_j) / ν_ij
//! ```
use crate::geostat::kernels::{
    matern::matern,
    traits::{CovarianceKernel, Lag},
};

/// `(sill, smoothness)` of the cross-covariance between two variates.
pub(crate) fn cross_sill(rho: f64, s_i: f64, s_j: f64, nu_i: f64, nu_j: f64) -> (f64, f64) {
    let nu_ij = 0.5 * (nu_i + nu_j);
    let sill = rho * (s_i * s_j).sqrt() * (nu_i * nu_j).sqrt() / nu_ij;
    (sill, nu_ij)
}

fn parsimonious(p: usize, lag: Lag, vi: usize, vj: usize, theta: &[f64]) -> f64 {
    let sigma2 = &theta[..p];
    let beta = theta[p];
    let nus = &theta[p + 1..2 * p + 1];
    let rhos = &theta[2 * p + 1..];
    if vi == vj {
        return matern(sigma2[vi], beta, nus[vi], lag.distance);
    }
    let (lo, hi) = if vi < vj { (vi, vj) } else { (vj, vi) };
    // Correlations are stored in (0,1), (0,2), (1,2) order.
    let pair = match (lo, hi) {
        (0, 1) => 0,
        (0, 2) => 1,
        _ => 2,
    };
    let (sill, nu) = cross_sill(rhos[pair], sigma2[lo], sigma2[hi], nus[lo], nus[hi]);
    matern(sill, beta, nu, lag.distance)
}

/// θ = (σ²₁, σ²₂, β, ν₁, ν₂, ρ₁₂).
#[derive(Debug, Clone, Copy, Default)]
pub struct BivariateMaternParsimonious;

impl CovarianceKernel for BivariateMaternParsimonious {
    fn name(&self) -> &'static str {
        "BivariateMaternParsimonious"
    }

    fn param_count(&self) -> usize {
        6
    }

    fn variates(&self) -> usize {
        2
    }

    fn covariance(&self, lag: Lag, vi: usize, vj: usize, theta: &[f64]) -> f64 {
        parsimonious(2, lag, vi, vj, theta)
    }
}

/// θ = (σ²₁, σ²₂, σ²₃, β, ν₁, ν₂, ν₃, ρ₁₂, ρ₁₃, ρ₂₃).
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivariateMaternParsimonious;

impl CovarianceKernel for TrivariateMaternParsimonious {
    fn name(&self) -> &'static str {
        "TrivariateMaternParsimonious"
    }

    fn param_count(&self) -> usize {
        10
    }

    fn variates(&self) -> usize {
        3
    }

    fn covariance(&self, lag: Lag, vi: usize, vj: usize, theta: &[f64]) -> f64 {
        parsimonious(3, lag, vi, vj, theta)
    }
}
