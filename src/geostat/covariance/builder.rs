//! Covariance builder: fills a tiled matrix from a kernel, two location sets
//! and a parameter vector, one independent task per tile.
use crate::geostat::{
    core::{locations::Locations, metric::DistanceMetric},
    errors::{GeoStatError, GeoStatResult},
    kernels::Kernel,
    tiles::{MatrixPart, StorageMode, TaskRuntime, TileLayout, TiledMatrix},
};

/// Fill every stored tile of `matrix` with `C(rows[r], cols[c]; θ)`.
///
/// Checks run once up front; tile tasks then evaluate the kernel on the
/// unchecked path. Tasks share `rows`, `cols`, `theta` and `kernel` by
/// reference and each writes only its own tile.
///
/// Errors
/// ------
/// - `InvalidParameterCount` / `NonFiniteParameter` for a bad `theta`.
/// - `MissingTimeCoordinate` for a space-time kernel on planar sets.
/// - `DimensionMismatch` when `rows.len() × variates != matrix.rows()` (or
///   the column analogue).
pub fn build_covariance(
    rt: &TaskRuntime, matrix: &mut TiledMatrix, rows: &Locations, cols: &Locations, theta: &[f64],
    kernel: &Kernel, metric: DistanceMetric,
) -> GeoStatResult<()> {
    kernel.check_theta(theta)?;
    kernel.check_locations(&[rows, cols])?;
    let v = kernel.variates();
    if rows.len() * v != matrix.rows() {
        return Err(GeoStatError::DimensionMismatch {
            what: "covariance rows",
            expected: matrix.rows(),
            actual: rows.len() * v,
        });
    }
    if cols.len() * v != matrix.cols() {
        return Err(GeoStatError::DimensionMismatch {
            what: "covariance columns",
            expected: matrix.cols(),
            actual: cols.len() * v,
        });
    }
    let layout = *matrix.layout();
    matrix.par_update_tiles(rt, |_, _| true, |m, n, tile| {
        let (r0, c0) = (layout.row_offset(m), layout.col_offset(n));
        for ((a, b), entry) in tile.indexed_iter_mut() {
            *entry = kernel.element(rows, r0 + a, cols, c0 + b, theta, metric);
        }
        Ok(())
    })
}

/// Allocate a matrix for `rows × cols` and build it.
#[allow(clippy::too_many_arguments)]
pub fn covariance_matrix(
    rt: &TaskRuntime, rows: &Locations, cols: &Locations, theta: &[f64], kernel: &Kernel,
    metric: DistanceMetric, tile_size: usize, part: MatrixPart, storage: &StorageMode,
) -> GeoStatResult<TiledMatrix> {
    let v = kernel.variates();
    let layout = TileLayout::new(rows.len() * v, cols.len() * v, tile_size)?;
    let mut matrix = TiledMatrix::new(layout, part, storage)?;
    build_covariance(rt, &mut matrix, rows, cols, theta, kernel, metric)?;
    Ok(matrix)
}

/// Diagonal `C(s_i, s_i; θ)` of the covariance of a location set, one
/// entry per (location, variate).
pub fn covariance_diagonal(
    locations: &Locations, theta: &[f64], kernel: &Kernel, metric: DistanceMetric,
) -> GeoStatResult<Vec<f64>> {
    kernel.check_theta(theta)?;
    kernel.check_locations(&[locations])?;
    let n = locations.len() * kernel.variates();
    Ok((0..n).map(|r| kernel.element(locations, r, locations, r, theta, metric)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geostat::{kernels::KernelRegistry, linalg::cholesky::cholesky};

    fn kernel(name: &str) -> Kernel {
        KernelRegistry::with_builtin_kernels().create(name, 1).expect("kernel")
    }
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_square() -> Locations {
        Locations::planar(array![0.0, 1.0, 0.0, 1.0], array![0.0, 0.0, 1.0, 1.0]).expect("square")
    }

    #[test]
    // Purpose
    // -------
    // Four corners of the unit square, Matérn (1.0, 0.1, 0.5), Euclidean:
    // the built matrix is symmetric, positive definite, with diagonal
    // exactly 1.0 and off-diagonals e^{-d/0.1}.
    fn unit_square_matern_matrix() {
        let rt = TaskRuntime::new(2).expect("runtime");
        let kernel = kernel("UnivariateMaternStationary");
        let locs = unit_square();
        let theta = [1.0, 0.1, 0.5];
        let mut m = covariance_matrix(
            &rt, &locs, &locs, &theta, &kernel, DistanceMetric::Euclidean, 3, MatrixPart::Lower,
            &StorageMode::InMemory,
        )
        .expect("build");
        let dense = m.to_dense().expect("dense");
        for i in 0..4 {
            assert_eq!(dense[[i, i]], 1.0);
            for j in 0..4 {
                assert_eq!(dense[[i, j]], dense[[j, i]]);
            }
        }
        assert_relative_eq!(dense[[0, 1]], (-10.0f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(dense[[0, 3]], (-(2f64.sqrt()) / 0.1).exp(), max_relative = 1e-12);
        cholesky(&rt, &mut m).expect("positive definite");
    }

    #[test]
    // Purpose
    // -------
    // Storage mode and tile size never change built values.
    fn values_do_not_depend_on_tiling_or_storage() {
        let rt = TaskRuntime::new(3).expect("runtime");
        let kernel = kernel("BivariateMaternParsimonious");
        let x = array![0.0, 0.3, 0.7, 0.2, 0.9];
        let y = array![0.1, 0.5, 0.2, 0.8, 0.9];
        let locs = Locations::planar(x, y).expect("locs");
        let metric = DistanceMetric::Euclidean;
        let theta = [1.0, 2.0, 0.3, 0.5, 1.5, 0.4];
        let dense = |ts: usize, storage: StorageMode| {
            let part = MatrixPart::Lower;
            covariance_matrix(&rt, &locs, &locs, &theta, &kernel, metric, ts, part, &storage)
                .expect("build")
                .to_dense()
                .expect("dense")
        };
        let reference = dense(10, StorageMode::InMemory);
        assert_eq!(dense(3, StorageMode::InMemory), reference);
        assert_eq!(dense(4, StorageMode::OutOfCore { dir: std::env::temp_dir() }), reference);
        let diag = covariance_diagonal(&locs, &theta, &kernel, metric).expect("diag");
        assert_eq!(diag, (0..10).map(|i| reference[[i, i]]).collect::<Vec<_>>());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let kernel = kernel("UnivariateMaternStationary");
        let layout = TileLayout::new(5, 5, 2).expect("layout");
        let mut m = TiledMatrix::new(layout, MatrixPart::Lower, &StorageMode::InMemory).expect("m");
        let locs = unit_square();
        assert!(matches!(
            build_covariance(
                &rt,
                &mut m,
                &locs,
                &locs,
                &[1.0, 0.1, 0.5],
                &kernel,
                DistanceMetric::Euclidean,
            ),
            Err(GeoStatError::DimensionMismatch { what: "covariance rows", .. })
        ));
    }
}
