//! Expected Fisher information of the univariate Matérn parameters.
//!
//! For a zero-mean Gaussian field with covariance `Σ(θ)`,
//!
//! ```text
//! I_ij = ½ tr(Σ⁻¹ ∂_iΣ Σ⁻¹ ∂_jΣ),   θ = (σ², β, ν),
//! ```
//!
//! with `∂_iΣ` built tile by tile from the registry's first-order derivative
//! kernels. Asymptotic standard errors are `√diag(I⁻¹)`.
use crate::geostat::{
    core::locations::Locations,
    covariance::builder::covariance_matrix,
    errors::{GeoStatError, GeoStatResult},
    kernels::{KernelRegistry, MaternDerivative},
    linalg::{
        cholesky::cholesky,
        solve::{backward_substitution, forward_substitution},
        tile_kernels::{potrf, trsm_left_lower},
    },
    models::field::FieldSpec,
    tiles::{MatrixPart, TaskRuntime},
};
use ndarray::{Array1, Array2, Axis};

const FIRST_ORDER: [MaternDerivative; 3] =
    [MaternDerivative::DsigmaSquare, MaternDerivative::Dbeta, MaternDerivative::Dnu];

/// Fisher information matrix and the implied standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct FisherInformation {
    pub matrix: Array2<f64>,
    pub standard_errors: Array1<f64>,
}

/// Expected information at `θ` for the locations of a univariate Matérn
/// field.
///
/// Errors
/// ------
/// - `UnsupportedKernel` unless the field's kernel is
///   `UnivariateMaternStationary`.
/// - `UnknownKernel` when `registry` lacks a derivative kernel.
/// - `SingularMatrix` when `Σ(θ)` or the information matrix itself is not
///   positive definite.
pub fn fisher_information(
    rt: &TaskRuntime, registry: &KernelRegistry, spec: &FieldSpec, locations: &Locations,
    theta: &[f64],
) -> GeoStatResult<FisherInformation> {
    if spec.kernel.name() != "UnivariateMaternStationary" {
        return Err(GeoStatError::UnsupportedKernel {
            kernel: spec.kernel.name().to_string(),
            reason: "Fisher information is available for UnivariateMaternStationary only",
        });
    }
    spec.kernel.check_theta(theta)?;

    let mut sigma = covariance_matrix(
        rt,
        locations,
        locations,
        theta,
        &spec.kernel,
        spec.metric,
        spec.tile_size,
        MatrixPart::Lower,
        &spec.storage,
    )?;
    cholesky(rt, &mut sigma)?;

    // Σ⁻¹ ∂_iΣ for each parameter.
    let solved = FIRST_ORDER
        .iter()
        .map(|which| {
            let kernel = registry.create(which.kernel_name(), 1)?;
            let d = covariance_matrix(
                rt,
                locations,
                locations,
                theta,
                &kernel,
                spec.metric,
                spec.tile_size,
                MatrixPart::Lower,
                &spec.storage,
            )?
            .to_dense()?;
            let y = forward_substitution(rt, &sigma, &d)?;
            backward_substitution(rt, &sigma, &y)
        })
        .collect::<GeoStatResult<Vec<Array2<f64>>>>()?;

    let k = solved.len();
    let mut matrix = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in 0..=i {
            // tr(A B) = Σ A ∘ Bᵀ
            let value = 0.5 * (&solved[i] * &solved[j].t()).sum();
            matrix[[i, j]] = value;
            matrix[[j, i]] = value;
        }
    }
    let standard_errors = inverse_diagonal(&matrix)?.mapv(f64::sqrt);
    Ok(FisherInformation { matrix, standard_errors })
}

/// `diag(A⁻¹)` for a small symmetric positive-definite `A`.
fn inverse_diagonal(a: &Array2<f64>) -> GeoStatResult<Array1<f64>> {
    let mut l = a.clone();
    potrf(&mut l, 0)?;
    // X = L⁻¹, so A⁻¹ = Xᵀ X and diag(A⁻¹)_i = Σ_k X_ki².
    let mut x = Array2::<f64>::eye(a.nrows());
    trsm_left_lower(&l, &mut x);
    Ok(x.map_axis(Axis(0), |col| col.dot(&col)))
}
