//! Kriging prediction at unobserved locations.
//!
//! Purpose
//! -------
//! Given observations `z` at locations `o` and a parameter vector `θ`,
//! compute the simple-kriging mean at new locations `m`
//!
//! ```text
//! μ = Σ_mo Σ_oo⁻¹ z
//! ```
//!
//! and, on request, the prediction variances
//!
//! ```text
//! σ²_i = Σ_mm(i, i) − ‖L⁻¹ Σ_om[:, i]‖²,   Σ_oo = L Lᵀ.
//! ```
//!
//! Key behaviors
//! -------------
//! - `Σ_oo` is built lower-tiled and factored; a factorization failure is a
//!   hard `SingularMatrix` error (unlike estimation, there is no fallback).
//! - `Σ_om` is built fully tiled; the mean needs one forward solve, one
//!   backward solve and one transposed product.
//! - Variances are clamped at zero to absorb round-off at observed sites.
//! - With true values at `m`, the mean squared prediction error is reported.
//!
//! Conventions
//! -----------
//! - Multivariate outputs follow the interleaved layout of the inputs.
use crate::geostat::{
    core::{data::GeoData, locations::Locations},
    covariance::builder::{covariance_diagonal, covariance_matrix},
    errors::{GeoStatError, GeoStatResult},
    linalg::{
        cholesky::cholesky,
        solve::{
            backward_substitution_vec, forward_substitution, forward_substitution_vec,
            transpose_multiply,
        },
    },
    models::field::FieldSpec,
    tiles::{MatrixPart, TaskRuntime},
};
use ndarray::{Array1, Axis};

/// Kriging output at the missing locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub means: Array1<f64>,
    pub variances: Option<Array1<f64>>,
    pub mspe: Option<f64>,
}

/// Predict at `missing` from `observed` under `θ`.
///
/// Errors
/// ------
/// - Kernel, variate and shape errors from the field setup and the builder.
/// - `SingularMatrix` when `Σ_oo(θ)` is not positive definite.
/// - `DimensionMismatch` when `truth` does not match the prediction length.
pub fn predict(
    rt: &TaskRuntime, spec: &FieldSpec, theta: &[f64], observed: &GeoData, missing: &Locations,
    truth: Option<&Array1<f64>>, with_variances: bool,
) -> GeoStatResult<PredictionOutcome> {
    spec.check_data(observed)?;
    spec.kernel.check_locations(&[missing])?;
    let obs_locs = observed.locations();

    let mut sigma_oo = covariance_matrix(
        rt,
        obs_locs,
        obs_locs,
        theta,
        &spec.kernel,
        spec.metric,
        spec.tile_size,
        MatrixPart::Lower,
        &spec.storage,
    )?;
    cholesky(rt, &mut sigma_oo)?;
    let sigma_om = covariance_matrix(
        rt,
        obs_locs,
        missing,
        theta,
        &spec.kernel,
        spec.metric,
        spec.tile_size,
        MatrixPart::Full,
        &spec.storage,
    )?;

    let w = forward_substitution_vec(rt, &sigma_oo, observed.observations())?;
    let alpha = backward_substitution_vec(rt, &sigma_oo, &w)?;
    let means = transpose_multiply(rt, &sigma_om, &alpha)?;

    let variances = if with_variances {
        let prior = covariance_diagonal(missing, theta, &spec.kernel, spec.metric)?;
        let v = forward_substitution(rt, &sigma_oo, &sigma_om.to_dense()?)?;
        let explained = v.map(|x| x * x).sum_axis(Axis(0));
        Some(
            prior
                .iter()
                .zip(explained.iter())
                .map(|(p, e)| (p - e).max(0.0))
                .collect::<Array1<f64>>(),
        )
    } else {
        None
    };

    let mspe = match truth {
        Some(t) => Some(mean_squared_error(&means, t)?),
        None => None,
    };
    Ok(PredictionOutcome { means, variances, mspe })
}

/// Mean of `(predicted − truth)²`.
pub fn mean_squared_error(predicted: &Array1<f64>, truth: &Array1<f64>) -> GeoStatResult<f64> {
    if predicted.len() != truth.len() {
        return Err(GeoStatError::DimensionMismatch {
            what: "true values",
            expected: predicted.len(),
            actual: truth.len(),
        });
    }
    let diff = predicted - truth;
    Ok(diff.dot(&diff) / predicted.len() as f64)
}
