//! First and second parameter derivatives of the univariate Matérn kernel.
//!
//! With `x = d/β`, `c = σ²/(2^{ν-1}Γ(ν))`, `L = ln(x/2) - ψ(ν)`:
//!
//! ```text
//! ∂C/∂σ²      = C/σ²
//! ∂C/∂β       = c x^{ν+1} K_{ν-1}(x) / β
//! ∂C/∂ν       = c x^ν (L K_ν + ∂_ν K_ν)
//! ∂²C/∂σ²²    = 0
//! ∂²C/∂σ²∂β   = (∂C/∂β)/σ²
//! ∂²C/∂σ²∂ν   = (∂C/∂ν)/σ²
//! ∂²C/∂β²     = c x^{ν+1} (x K_{ν-2} - 3 K_{ν-1}) / β²
//! ∂²C/∂β∂ν    = c x^{ν+1} (L K_{ν-1} + ∂_ν K_{ν-1}) / β
//! ∂²C/∂ν²     = c x^ν ((L² - ψ₁(ν)) K_ν + 2L ∂_ν K_ν + ∂²_ν K_ν)
//! ```
//!
//! Order derivatives of `K` use central differences in `ν`. At zero
//! distance `C(0) = σ²` does not depend on `β` or `ν`, so every derivative
//! is zero there except `∂C/∂σ² = 1`.
use crate::geostat::kernels::{
    matern::{matern_scale, x_pow_bessel},
    special::{bessel_k, bessel_k_dnu, bessel_k_dnu2, trigamma},
    traits::{CovarianceKernel, Lag},
};
use statrs::function::gamma::digamma;

/// Which derivative of the Matérn kernel to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaternDerivative {
    DsigmaSquare,
    Dbeta,
    Dnu,
    DdsigmaSquare,
    DdsigmaSquareBeta,
    DdsigmaSquareNu,
    DdbetaBeta,
    DdbetaNu,
    DdnuNu,
}

impl MaternDerivative {
    pub const ALL: [MaternDerivative; 9] = [
        MaternDerivative::DsigmaSquare,
        MaternDerivative::Dbeta,
        MaternDerivative::Dnu,
        MaternDerivative::DdsigmaSquare,
        MaternDerivative::DdsigmaSquareBeta,
        MaternDerivative::DdsigmaSquareNu,
        MaternDerivative::DdbetaBeta,
        MaternDerivative::DdbetaNu,
        MaternDerivative::DdnuNu,
    ];

    pub fn kernel_name(&self) -> &'static str {
        match self {
            MaternDerivative::DsigmaSquare => "UnivariateMaternDsigmaSquare",
            MaternDerivative::Dbeta => "UnivariateMaternDbeta",
            MaternDerivative::Dnu => "UnivariateMaternDnu",
            MaternDerivative::DdsigmaSquare => "UnivariateMaternDdsigmaSquare",
            MaternDerivative::DdsigmaSquareBeta => "UnivariateMaternDdsigmaSquareBeta",
            MaternDerivative::DdsigmaSquareNu => "UnivariateMaternDdsigmaSquareNu",
            MaternDerivative::DdbetaBeta => "UnivariateMaternDdbetaBeta",
            MaternDerivative::DdbetaNu => "UnivariateMaternDdbetaNu",
            MaternDerivative::DdnuNu => "UnivariateMaternDdnuNu",
        }
    }

    /// Derivative value at distance `d` for θ = (σ², β, ν).
    pub fn value(&self, sigma2: f64, beta: f64, nu: f64, d: f64) -> f64 {
        if d == 0.0 {
            return if *self == MaternDerivative::DsigmaSquare { 1.0 } else { 0.0 };
        }
        let x = d / beta;
        let c = matern_scale(sigma2, nu);
        match self {
            MaternDerivative::DsigmaSquare => matern_scale(1.0, nu) * x_pow_bessel(x, nu, nu),
            MaternDerivative::Dbeta => c * x_pow_bessel(x, nu + 1.0, nu - 1.0) / beta,
            MaternDerivative::Dnu => {
                let l = (0.5 * x).ln() - digamma(nu);
                c * x.powf(nu) * (l * bessel_k(nu, x) + bessel_k_dnu(nu, x))
            }
            MaternDerivative::DdsigmaSquare => 0.0,
            MaternDerivative::DdsigmaSquareBeta => {
                MaternDerivative::Dbeta.value(sigma2, beta, nu, d) / sigma2
            }
            MaternDerivative::DdsigmaSquareNu => {
                MaternDerivative::Dnu.value(sigma2, beta, nu, d) / sigma2
            }
            MaternDerivative::DdbetaBeta => {
                c * x.powf(nu + 1.0) * (x * bessel_k(nu - 2.0, x) - 3.0 * bessel_k(nu - 1.0, x))
                    / (beta * beta)
            }
            MaternDerivative::DdbetaNu => {
                let l = (0.5 * x).ln() - digamma(nu);
                let dk = l * bessel_k(nu - 1.0, x) + bessel_k_dnu(nu - 1.0, x);
                c * x.powf(nu + 1.0) * dk / beta
            }
            MaternDerivative::DdnuNu => {
                let l = (0.5 * x).ln() - digamma(nu);
                let k = bessel_k(nu, x);
                c * x.powf(nu)
                    * ((l * l - trigamma(nu)) * k
                        + 2.0 * l * bessel_k_dnu(nu, x)
                        + bessel_k_dnu2(nu, x))
            }
        }
    }
}

/// Kernel wrapper evaluating one [`MaternDerivative`]; θ = (σ², β, ν).
#[derive(Debug, Clone, Copy)]
pub struct UnivariateMaternDerivative {
    which: MaternDerivative,
}

impl UnivariateMaternDerivative {
    pub fn new(which: MaternDerivative) -> Self {
        UnivariateMaternDerivative { which }
    }

    pub fn which(&self) -> MaternDerivative {
        self.which
    }
}

impl CovarianceKernel for UnivariateMaternDerivative {
    fn name(&self) -> &'static str {
        self.which.kernel_name()
    }

    fn param_count(&self) -> usize {
        3
    }

    fn covariance(&self, lag: Lag, _vi: usize, _vj: usize, theta: &[f64]) -> f64 {
        self.which.value(theta[0], theta[1], theta[2], lag.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geostat::kernels::matern::matern;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Each analytic derivative is compared with a central finite difference
    // of the Matérn kernel (first derivatives) or of the first-derivative
    // kernels (second derivatives).
    // -------------------------------------------------------------------------

    const S: f64 = 1.3;
    const B: f64 = 0.2;
    const N: f64 = 1.4;
    const D: f64 = 0.17;

    fn fd(f: impl Fn(f64) -> f64, at: f64, h: f64) -> f64 {
        (f(at + h) - f(at - h)) / (2.0 * h)
    }

    #[test]
    fn first_derivatives_match_finite_differences() {
        let ds = MaternDerivative::DsigmaSquare.value(S, B, N, D);
        assert_relative_eq!(ds, fd(|s| matern(s, B, N, D), S, 1e-6), max_relative = 1e-7);

        let db = MaternDerivative::Dbeta.value(S, B, N, D);
        assert_relative_eq!(db, fd(|b| matern(S, b, N, D), B, 1e-6), max_relative = 1e-6);

        let dn = MaternDerivative::Dnu.value(S, B, N, D);
        assert_relative_eq!(dn, fd(|n| matern(S, B, n, D), N, 1e-4), max_relative = 1e-5);
    }

    #[test]
    fn second_derivatives_match_finite_differences() {
        let bb = MaternDerivative::DdbetaBeta.value(S, B, N, D);
        let fd_bb = fd(|b| MaternDerivative::Dbeta.value(S, b, N, D), B, 1e-6);
        assert_relative_eq!(bb, fd_bb, max_relative = 1e-5);

        let bn = MaternDerivative::DdbetaNu.value(S, B, N, D);
        let fd_bn = fd(|n| MaternDerivative::Dbeta.value(S, B, n, D), N, 1e-4);
        assert_relative_eq!(bn, fd_bn, max_relative = 1e-4);

        let nn = MaternDerivative::DdnuNu.value(S, B, N, D);
        let fd_nn = fd(|n| MaternDerivative::Dnu.value(S, B, n, D), N, 1e-3);
        assert_relative_eq!(nn, fd_nn, max_relative = 1e-3);

        let sb = MaternDerivative::DdsigmaSquareBeta.value(S, B, N, D);
        assert_relative_eq!(sb, MaternDerivative::Dbeta.value(1.0, B, N, D), max_relative = 1e-12);
        assert_eq!(MaternDerivative::DdsigmaSquare.value(S, B, N, D), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Zero-distance limits: only ∂C/∂σ² is non-zero.
    fn zero_distance_limits() {
        for which in MaternDerivative::ALL {
            let expected = if which == MaternDerivative::DsigmaSquare { 1.0 } else { 0.0 };
            assert_eq!(which.value(S, B, N, 0.0), expected, "{}", which.kernel_name());
        }
    }
}
