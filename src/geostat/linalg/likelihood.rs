//! Gaussian log-likelihood on top of the tiled Cholesky factor.
//!
//! Purpose
//! -------
//! Evaluate `ℓ(θ) = −½ (N ln 2π + ln|Σ(θ)| + zᵀ Σ(θ)⁻¹ z)` for one parameter
//! vector: build `Σ(θ)` tile by tile, factor it, then read the
//! log-determinant off the diagonal of `L` and the quadratic form from one
//! forward solve.
//!
//! Key behaviors
//! -------------
//! - [`log_determinant`] and [`log_likelihood`] work on an already factored
//!   matrix.
//! - [`LikelihoodContext::evaluate`] runs build → factorize → likelihood and
//!   maps a non positive-definite covariance (`SingularMatrix`) to `−∞`, the
//!   value the optimizer treats as "reject this point".
//!
//! Invariants & assumptions
//! ------------------------
//! - Each evaluation allocates its own matrix and drops it before returning;
//!   only the observation vector outlives an evaluation.
//! - `ℓ` is invariant under a joint permutation of locations and
//!   observations (up to round-off).
use crate::geostat::{
    core::{locations::Locations, metric::DistanceMetric},
    covariance::builder::covariance_matrix,
    errors::{GeoStatError, GeoStatResult},
    kernels::Kernel,
    linalg::{cholesky::cholesky, solve::forward_substitution_vec},
    tiles::{MatrixPart, StorageMode, TaskRuntime, TiledMatrix},
};
use ndarray::Array1;
use std::f64::consts::PI;

/// `ln|A| = 2 Σ ln L_ii` for a factored matrix `A = L Lᵀ`.
pub fn log_determinant(l: &TiledMatrix) -> GeoStatResult<f64> {
    Ok(2.0 * l.diagonal()?.iter().map(|d| d.ln()).sum::<f64>())
}

/// `−½ (N ln 2π + ln|A| + ‖L⁻¹ z‖²)`.
///
/// Errors
/// ------
/// - `DimensionMismatch` when `z` does not match the factor.
pub fn log_likelihood(rt: &TaskRuntime, l: &TiledMatrix, z: &Array1<f64>) -> GeoStatResult<f64> {
    let n = z.len() as f64;
    let logdet = log_determinant(l)?;
    let w = forward_substitution_vec(rt, l, z)?;
    let quad = w.dot(&w);
    Ok(-0.5 * (n * (2.0 * PI).ln() + logdet + quad))
}

/// Everything one likelihood evaluation needs besides `θ`.
#[derive(Debug, Clone)]
pub struct LikelihoodContext<'a> {
    pub locations: &'a Locations,
    pub observations: &'a Array1<f64>,
    pub kernel: &'a Kernel,
    pub metric: DistanceMetric,
    pub tile_size: usize,
    pub storage: &'a StorageMode,
}

impl LikelihoodContext<'_> {
    /// `ℓ(θ)` for the context's data.
    ///
    /// Returns `Ok(f64::NEG_INFINITY)` when `Σ(θ)` is not numerically
    /// positive definite or the result is not a number; every other failure
    /// (bad `θ`, shape mismatch, storage) is an error.
    pub fn evaluate(&self, rt: &TaskRuntime, theta: &[f64]) -> GeoStatResult<f64> {
        let mut sigma = covariance_matrix(
            rt,
            self.locations,
            self.locations,
            theta,
            self.kernel,
            self.metric,
            self.tile_size,
            MatrixPart::Lower,
            self.storage,
        )?;
        match cholesky(rt, &mut sigma) {
            Ok(()) => {}
            Err(GeoStatError::SingularMatrix { .. }) => return Ok(f64::NEG_INFINITY),
            Err(e) => return Err(e),
        }
        let value = log_likelihood(rt, &sigma, self.observations)?;
        Ok(if value.is_nan() { f64::NEG_INFINITY } else { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geostat::kernels::KernelRegistry;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn matern() -> Kernel {
        KernelRegistry::with_builtin_kernels().create("UnivariateMaternStationary", 1).expect("k")
    }

    #[test]
    // Purpose
    // -------
    // The reference 2×2 matrix [[4,2],[2,3]] has log-determinant ln 8, and
    // the likelihood matches the dense closed form.
    fn two_by_two_reference_values() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let storage = StorageMode::InMemory;
        let mut l = TiledMatrix::from_dense(&a, 1, MatrixPart::Lower, &storage).expect("m");
        cholesky(&rt, &mut l).expect("factor");
        assert_relative_eq!(log_determinant(&l).expect("logdet"), 8f64.ln(), epsilon = 1e-14);

        let z = array![1.0, -1.0];
        // A⁻¹ = [[3,-2],[-2,4]] / 8, so zᵀA⁻¹z = (3 + 4 + 4) / 8.
        let expected = -0.5 * (2.0 * (2.0 * PI).ln() + 8f64.ln() + 11.0 / 8.0);
        assert_relative_eq!(log_likelihood(&rt, &l, &z).expect("ll"), expected, epsilon = 1e-12);
    }

    fn context_fixture() -> (Locations, Array1<f64>, Kernel) {
        let locs = Locations::planar(
            array![0.1, 0.9, 0.4, 0.7, 0.2, 0.5],
            array![0.2, 0.1, 0.6, 0.8, 0.9, 0.4],
        )
        .expect("locs");
        let z = array![0.3, -1.2, 0.8, 0.1, -0.4, 1.5];
        (locs, z, matern())
    }

    #[test]
    // Purpose
    // -------
    // Permuting locations and observations together leaves ℓ unchanged, and
    // neither tile size nor storage changes it beyond round-off.
    fn likelihood_is_permutation_and_tiling_invariant() {
        let rt = TaskRuntime::new(2).expect("runtime");
        let (locs, z, kernel) = context_fixture();
        let theta = [1.0, 0.2, 0.5];
        let base = LikelihoodContext {
            locations: &locs,
            observations: &z,
            kernel: &kernel,
            metric: DistanceMetric::Euclidean,
            tile_size: 6,
            storage: &StorageMode::InMemory,
        };
        let reference = base.evaluate(&rt, &theta).expect("ll");
        assert!(reference.is_finite());

        let perm = [3, 0, 5, 1, 4, 2];
        let p_locs = locs.select(&perm).expect("perm");
        let p_z: Array1<f64> = perm.iter().map(|&i| z[i]).collect();
        let out_of_core = StorageMode::OutOfCore { dir: std::env::temp_dir() };
        let permuted = LikelihoodContext {
            locations: &p_locs,
            observations: &p_z,
            tile_size: 4,
            storage: &out_of_core,
            ..base.clone()
        };
        let moved = permuted.evaluate(&rt, &theta).expect("ll");
        assert_relative_eq!(moved, reference, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // A covariance that is not positive definite yields −∞, not an error,
    // while a malformed theta is still an error.
    fn singular_covariance_maps_to_negative_infinity() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let locs = Locations::planar(array![0.0, 0.0], array![0.0, 0.0]).expect("locs");
        let z = array![1.0, 2.0];
        let kernel = matern();
        let ctx = LikelihoodContext {
            locations: &locs,
            observations: &z,
            kernel: &kernel,
            metric: DistanceMetric::Euclidean,
            tile_size: 2,
            storage: &StorageMode::InMemory,
        };
        assert_eq!(ctx.evaluate(&rt, &[1.0, 0.1, 0.5]).expect("ll"), f64::NEG_INFINITY);
        assert!(matches!(
            ctx.evaluate(&rt, &[1.0, 0.1]),
            Err(GeoStatError::InvalidParameterCount { expected: 3, actual: 2, .. })
        ));
    }
}
