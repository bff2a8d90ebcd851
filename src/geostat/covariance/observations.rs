//! Synthetic observations drawn from a Gaussian field with known parameters.
use crate::geostat::{
    core::{locations::Locations, metric::DistanceMetric},
    covariance::builder::covariance_matrix,
    errors::GeoStatResult,
    kernels::Kernel,
    linalg::{cholesky::cholesky, solve::lower_multiply},
    tiles::{MatrixPart, StorageMode, TaskRuntime},
};
use ndarray::{Array1, Array2, Axis};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardNormal};

/// Draw `z = L e` with `Σ(θ) = L Lᵀ` and `e ~ N(0, I)` seeded by `seed`.
///
/// The normals are drawn sequentially before any parallel work, so the
/// result is bit-identical for a fixed seed, location set, `θ` and kernel
/// whatever the worker count.
///
/// Errors
/// ------
/// - Kernel and shape errors from the covariance builder.
/// - `SingularMatrix` when `Σ(θ)` is not positive definite (fatal here).
#[allow(clippy::too_many_arguments)]
pub fn generate_observations(
    rt: &TaskRuntime, locations: &Locations, theta: &[f64], kernel: &Kernel, metric: DistanceMetric,
    seed: u64, tile_size: usize, storage: &StorageMode,
) -> GeoStatResult<Array1<f64>> {
    let mut sigma = covariance_matrix(
        rt,
        locations,
        locations,
        theta,
        kernel,
        metric,
        tile_size,
        MatrixPart::Lower,
        storage,
    )?;
    cholesky(rt, &mut sigma)?;

    let n = sigma.rows();
    let mut rng = StdRng::seed_from_u64(seed);
    let e: Array1<f64> = (0..n).map(|_| -> f64 { StandardNormal.sample(&mut rng) }).collect();
    let e: Array2<f64> = e.insert_axis(Axis(1));
    Ok(lower_multiply(rt, &sigma, &e)?.column(0).to_owned())
}
