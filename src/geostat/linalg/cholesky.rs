//! Tiled lower Cholesky factorization.
//!
//! Right-looking algorithm over tile column `k = 0..mt`:
//!
//! 1. `potrf(k, k)` factors the diagonal tile;
//! 2. `trsm(m, k)` for every `m > k` scales the panel, in parallel;
//! 3. the factored panel is snapshot read-only, then every trailing tile
//!    `(m, n)` with `k < n ≤ m` is updated in parallel (`syrk` on the
//!    diagonal, `gemm` below it).
//!
//! Each step starts only after the previous one finished, which gives the
//! task ordering panel → trsm → update. A failing pivot aborts the
//! remaining steps.
use crate::geostat::{
    errors::{GeoStatError, GeoStatResult},
    linalg::tile_kernels::{gemm_sub_nt, potrf, syrk_sub, trsm_right_lower_t},
    tiles::{MatrixPart, TaskRuntime, TiledMatrix},
};
use ndarray::Array2;

/// Factor a symmetric positive-definite matrix in place: on success the
/// stored lower triangle holds `L` with `A = L Lᵀ`.
///
/// Errors
/// ------
/// - `InvalidLayout` unless the matrix is square with `MatrixPart::Lower`.
/// - `SingularMatrix { row, pivot }` for the first non-positive or
///   non-finite pivot (global row index).
pub fn cholesky(rt: &TaskRuntime, a: &mut TiledMatrix) -> GeoStatResult<()> {
    check_lower_square(a)?;
    let layout = *a.layout();
    let nt = layout.mt();
    for k in 0..nt {
        let offset = layout.row_offset(k);
        a.update_tile(k, k, |t| potrf(t, offset))?;
        let lkk = a.tile(k, k)?.into_owned();

        a.par_update_tiles(rt, |m, n| n == k && m > k, |_, _, t| {
            trsm_right_lower_t(&lkk, t);
            Ok(())
        })?;

        if k + 1 == nt {
            break;
        }
        let panel = (0..nt)
            .map(|m| if m > k { a.tile(m, k).map(|t| Some(t.into_owned())) } else { Ok(None) })
            .collect::<GeoStatResult<Vec<Option<Array2<f64>>>>>()?;

        a.par_update_tiles(rt, |m, n| n > k && m >= n, |m, n, t| {
            let (Some(am), Some(an)) = (&panel[m], &panel[n]) else {
                return Err(GeoStatError::UnknownError);
            };
            if m == n { syrk_sub(am, t) } else { gemm_sub_nt(am, an, t) }
            Ok(())
        })?;
    }
    Ok(())
}

pub(crate) fn check_lower_square(a: &TiledMatrix) -> GeoStatResult<()> {
    if a.part() != MatrixPart::Lower || !a.layout().is_square() {
        return Err(GeoStatError::InvalidLayout {
            rows: a.rows(),
            cols: a.cols(),
            reason: "expected a square matrix with lower-triangular tile storage",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geostat::tiles::StorageMode;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn spd(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(i, j)| {
            let d = (i as f64 - j as f64).abs();
            (-d / 3.0).exp() + if i == j { 0.1 } else { 0.0 }
        })
    }

    #[test]
    // Purpose
    // -------
    // L Lᵀ reconstructs the input for tile sizes that do and do not divide
    // the dimension, and the factor does not depend on tile size or storage.
    fn factor_reconstructs_input_across_tilings() {
        let rt = TaskRuntime::new(3).expect("runtime");
        let a = spd(11);
        let mut reference: Option<Array2<f64>> = None;
        for (ts, storage) in [
            (11, StorageMode::InMemory),
            (4, StorageMode::InMemory),
            (3, StorageMode::OutOfCore { dir: std::env::temp_dir() }),
            (1, StorageMode::InMemory),
        ] {
            let mut m =
                TiledMatrix::from_dense(&a, ts, MatrixPart::Lower, &storage).expect("tiled");
            cholesky(&rt, &mut m).expect("factor");
            let l = m.to_dense_lower().expect("dense");
            assert_relative_eq!(l.dot(&l.t()), a, epsilon = 1e-12);
            match &reference {
                None => reference = Some(l),
                Some(r) => assert_relative_eq!(&l, r, epsilon = 1e-12),
            }
        }
    }

    #[test]
    fn reference_two_by_two() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let storage = StorageMode::InMemory;
        let mut m = TiledMatrix::from_dense(&a, 1, MatrixPart::Lower, &storage).expect("m");
        cholesky(&rt, &mut m).expect("factor");
        let l = m.to_dense_lower().expect("dense");
        assert_relative_eq!(l, array![[2.0, 0.0], [1.0, 2f64.sqrt()]], epsilon = 1e-15);
    }

    #[test]
    fn indefinite_matrix_reports_row() {
        let rt = TaskRuntime::new(2).expect("runtime");
        let a = array![[1.0, 0.0, 0.0], [0.0, 1.0, 2.0], [0.0, 2.0, 1.0]];
        let storage = StorageMode::InMemory;
        let mut m = TiledMatrix::from_dense(&a, 2, MatrixPart::Lower, &storage).expect("m");
        assert!(matches!(cholesky(&rt, &mut m), Err(GeoStatError::SingularMatrix { row: 2, .. })));

        let full = TiledMatrix::from_dense(&a, 2, MatrixPart::Full, &StorageMode::InMemory);
        let mut full = full.expect("full");
        assert!(matches!(cholesky(&rt, &mut full), Err(GeoStatError::InvalidLayout { .. })));
    }
}
