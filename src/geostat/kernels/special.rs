//! Special functions for the Matérn family.
//!
//! - [`bessel_k`]: modified Bessel function of the second kind `K_ν(x)` for
//!   real order, via Temme's series (`x < 2`) or Steed's continued fraction
//!   (`x ≥ 2`) at the reduced order `|μ| ≤ ½`, followed by upward recurrence.
//! - [`bessel_k_dnu`] / [`bessel_k_dnu2`]: first and second derivatives of
//!   `K_ν(x)` with respect to the order, by central differences in `ν`.
//! - [`trigamma`]: `ψ₁(x)` by recurrence plus asymptotic expansion.
//!
//! `K_ν` is even in `ν`, so negative orders are folded onto `|ν|`.
use statrs::function::gamma::gamma;
use std::f64::consts::PI;

const MAX_TERMS: usize = 10_000;
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
// Coefficient of z³ in the Taylor series of 1/Γ(1+z).
const RGAMMA_C3: f64 = -0.042_002_635_034_095_24;
const ORDER_STEP: f64 = 1e-5;
const ORDER_STEP2: f64 = 1e-4;

/// `K_ν(x)` for real `ν` and `x > 0`; `+∞` for `x ≤ 0`.
pub fn bessel_k(nu: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    let nu = nu.abs();
    let steps = (nu + 0.5).floor() as usize;
    let mu = nu - steps as f64;
    let (mut k_mu, mut k_mu1) = if x < 2.0 { temme_series(mu, x) } else { steed_fraction(mu, x) };
    for i in 1..=steps {
        let next = (mu + i as f64) * (2.0 / x) * k_mu1 + k_mu;
        k_mu = k_mu1;
        k_mu1 = next;
    }
    k_mu
}

/// `∂K_ν(x)/∂ν`.
pub fn bessel_k_dnu(nu: f64, x: f64) -> f64 {
    let h = ORDER_STEP;
    (bessel_k(nu + h, x) - bessel_k(nu - h, x)) / (2.0 * h)
}

/// `∂²K_ν(x)/∂ν²`.
pub fn bessel_k_dnu2(nu: f64, x: f64) -> f64 {
    let h = ORDER_STEP2;
    (bessel_k(nu + h, x) - 2.0 * bessel_k(nu, x) + bessel_k(nu - h, x)) / (h * h)
}

/// Trigamma `ψ₁(x) = d²/dx² ln Γ(x)` for `x > 0`.
pub fn trigamma(x: f64) -> f64 {
    let mut x = x;
    let mut acc = 0.0;
    while x < 10.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    // 1/x + 1/(2x²) + 1/(6x³) - 1/(30x⁵) + 1/(42x⁷) - 1/(30x⁹) + 5/(66x¹¹)
    let inner = 1.0 / 42.0 - inv2 * (1.0 / 30.0 - inv2 * 5.0 / 66.0);
    let series = 1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * inner);
    let tail = inv + 0.5 * inv2 + inv * inv2 * series;
    acc + tail
}

/// `(Γ₁, Γ₂, 1/Γ(1+μ), 1/Γ(1-μ))` as used by Temme's method.
fn temme_gammas(mu: f64) -> (f64, f64, f64, f64) {
    let gampl = 1.0 / gamma(1.0 + mu);
    let gammi = 1.0 / gamma(1.0 - mu);
    let gam1 = if mu.abs() < 1e-3 {
        -EULER_GAMMA - RGAMMA_C3 * mu * mu
    } else {
        (gammi - gampl) / (2.0 * mu)
    };
    let gam2 = 0.5 * (gammi + gampl);
    (gam1, gam2, gampl, gammi)
}

/// `(K_μ(x), K_{μ+1}(x))` for `|μ| ≤ ½`, `0 < x < 2`.
fn temme_series(mu: f64, x: f64) -> (f64, f64) {
    let x2 = 0.5 * x;
    let pimu = PI * mu;
    let fact = if pimu.abs() < f64::EPSILON { 1.0 } else { pimu / pimu.sin() };
    let d = -x2.ln();
    let e = mu * d;
    let fact2 = if e.abs() < f64::EPSILON { 1.0 } else { e.sinh() / e };
    let (gam1, gam2, gampl, gammi) = temme_gammas(mu);

    let mut ff = fact * (gam1 * e.cosh() + gam2 * fact2 * d);
    let mut sum = ff;
    let e = e.exp();
    let mut p = 0.5 * e / gampl;
    let mut q = 0.5 / (e * gammi);
    let mut c = 1.0;
    let d = x2 * x2;
    let mut sum1 = p;
    for i in 1..=MAX_TERMS {
        let fi = i as f64;
        ff = (fi * ff + p + q) / (fi * fi - mu * mu);
        c *= d / fi;
        p /= fi - mu;
        q /= fi + mu;
        let del = c * ff;
        sum += del;
        sum1 += c * (p - fi * ff);
        if del.abs() < sum.abs() * f64::EPSILON {
            break;
        }
    }
    (sum, sum1 * (2.0 / x))
}

/// `(K_μ(x), K_{μ+1}(x))` for `|μ| ≤ ½`, `x ≥ 2`.
fn steed_fraction(mu: f64, x: f64) -> (f64, f64) {
    let mut b = 2.0 * (1.0 + x);
    let mut d = 1.0 / b;
    let mut h = d;
    let mut delh = d;
    let mut q1 = 0.0;
    let mut q2 = 1.0;
    let a1 = 0.25 - mu * mu;
    let mut q = a1;
    let mut c = a1;
    let mut a = -a1;
    let mut s = 1.0 + q * delh;
    for i in 1..MAX_TERMS {
        let fi = i as f64;
        a -= 2.0 * fi;
        c = -a * c / (fi + 1.0);
        let qnew = (q1 - b * q2) / a;
        q1 = q2;
        q2 = qnew;
        q += c * qnew;
        b += 2.0;
        d = 1.0 / (b + a * d);
        delh = (b * d - 1.0) * delh;
        h += delh;
        let dels = q * delh;
        s += dels;
        if (dels / s).abs() < f64::EPSILON {
            break;
        }
    }
    let h = a1 * h;
    let k_mu = (PI / (2.0 * x)).sqrt() * (-x).exp() / s;
    let k_mu1 = k_mu * (mu + x + 0.5 - h) / x;
    (k_mu, k_mu1)
}
