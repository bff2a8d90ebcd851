//! Non-separable space-time Matérn kernels (Gneiting class).
//!
//! With spatial distance `d` and time lag `u`:
//!
//! ```text
//! ψ(u) = u^{2α} / a + 1
//! x    = (d / β) / ψ(u)^{β_int / 2}
//! C    = σ² / (2^{ν-1} Γ(ν)) · x^ν K_ν(x) / ψ(u)^{β_int + δ}
//! C    = σ² / ψ(u)^{β_int + δ}                 when d == 0
//! ```
use crate::geostat::kernels::{
    matern::{matern_scale, x_pow_bessel},
    multivariate::cross_sill,
    traits::{CovarianceKernel, Lag},
};

#[derive(Debug, Clone, Copy)]
struct TemporalPart {
    a: f64,
    alpha: f64,
    beta_int: f64,
    delta: f64,
}

impl TemporalPart {
    fn psi(&self, u: f64) -> f64 {
        u.powf(2.0 * self.alpha) / self.a + 1.0
    }

    /// Space-time Matérn with sill `sill` and smoothness `nu`.
    fn covariance(&self, sill: f64, beta: f64, nu: f64, lag: Lag) -> f64 {
        let psi = self.psi(lag.time);
        let damp = psi.powf(self.beta_int + self.delta);
        if lag.distance == 0.0 {
            return sill / damp;
        }
        let x = (lag.distance / beta) / psi.powf(0.5 * self.beta_int);
        matern_scale(sill, nu) * x_pow_bessel(x, nu, nu) / damp
    }
}

/// θ = (σ², β, ν, a, α, β_int, δ).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnivariateSpacetimeMaternStationary;

impl CovarianceKernel for UnivariateSpacetimeMaternStationary {
    fn name(&self) -> &'static str {
        "UnivariateSpacetimeMaternStationary"
    }

    fn param_count(&self) -> usize {
        7
    }

    fn requires_time(&self) -> bool {
        true
    }

    fn covariance(&self, lag: Lag, _vi: usize, _vj: usize, theta: &[f64]) -> f64 {
        let temporal =
            TemporalPart { a: theta[3], alpha: theta[4], beta_int: theta[5], delta: theta[6] };
        temporal.covariance(theta[0], theta[1], theta[2], lag)
    }
}

/// θ = (σ²₁, σ²₂, β, ν₁, ν₂, ρ, δ, a, α, β_int).
///
/// Cross-covariances use the parsimonious sill and `ν₁₂ = (ν₁ + ν₂)/2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BivariateSpacetimeMaternStationary;

impl CovarianceKernel for BivariateSpacetimeMaternStationary {
    fn name(&self) -> &'static str {
        "BivariateSpacetimeMaternStationary"
    }

    fn param_count(&self) -> usize {
        10
    }

    fn variates(&self) -> usize {
        2
    }

    fn requires_time(&self) -> bool {
        true
    }

    fn covariance(&self, lag: Lag, vi: usize, vj: usize, theta: &[f64]) -> f64 {
        let sigma2 = [theta[0], theta[1]];
        let nus = [theta[3], theta[4]];
        let temporal =
            TemporalPart { delta: theta[6], a: theta[7], alpha: theta[8], beta_int: theta[9] };
        let (sill, nu) = if vi == vj {
            (sigma2[vi], nus[vi])
        } else {
            cross_sill(theta[5], sigma2[vi], sigma2[vj], nus[vi], nus[vj])
        };
        temporal.covariance(sill, theta[2], nu, lag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geostat::kernels::matern::matern;
    use approx::assert_relative_eq;

    const THETA: [f64; 7] = [1.0, 0.3, 0.8, 2.0, 0.7, 0.4, 0.1];

    #[test]
    // Purpose
    // -------
    // At zero time lag ψ = 1 and the kernel is the spatial Matérn.
    fn zero_time_lag_reduces_to_matern() {
        let k = UnivariateSpacetimeMaternStationary;
        for &d in &[0.0, 0.05, 0.4] {
            let lag = Lag { distance: d, time: 0.0 };
            let spatial = matern(1.0, 0.3, 0.8, d);
            assert_relative_eq!(k.covariance(lag, 0, 0, &THETA), spatial, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Zero distance at time lag u gives σ² / ψ(u)^{β_int+δ} and decays in u.
    fn zero_distance_follows_temporal_decay() {
        let k = UnivariateSpacetimeMaternStationary;
        let u: f64 = 2.0;
        let psi = u.powf(1.4) / 2.0 + 1.0;
        let expected = 1.0 / psi.powf(0.5);
        let got = k.covariance(Lag { distance: 0.0, time: u }, 0, 0, &THETA);
        assert_relative_eq!(got, expected, max_relative = 1e-12);
        let later = k.covariance(Lag { distance: 0.0, time: 4.0 }, 0, 0, &THETA);
        assert!(later < got);
    }

    #[test]
    fn bivariate_space_time_is_symmetric_in_variates() {
        let k = BivariateSpacetimeMaternStationary;
        let theta = [1.0, 2.0, 0.2, 0.5, 1.5, 0.4, 0.1, 1.0, 0.5, 0.3];
        let lag = Lag { distance: 0.1, time: 1.0 };
        assert_eq!(k.covariance(lag, 0, 1, &theta), k.covariance(lag, 1, 0, &theta));
        let at_origin = k.covariance(Lag { distance: 0.0, time: 0.0 }, 1, 1, &theta);
        assert_eq!(at_origin, 2.0);
    }
}
