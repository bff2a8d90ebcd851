//! Per-tile dense kernels used by the tiled factorization and solves.
//!
//! Every routine works on one or two tiles that the caller owns exclusively
//! (or reads immutably), so they carry no synchronization. Matrix-matrix
//! updates go through `ndarray::linalg::general_mat_mul`.
use crate::geostat::errors::{GeoStatError, GeoStatResult};
use ndarray::{Array2, linalg::general_mat_mul};

/// In-place lower Cholesky of a diagonal tile; the strict upper triangle is
/// zeroed. `offset` is the global index of the tile's first row and is only
/// used to report the failing row.
///
/// Errors
/// ------
/// - `SingularMatrix` for the first pivot that is `<= 0` or not finite.
pub fn potrf(a: &mut Array2<f64>, offset: usize) -> GeoStatResult<()> {
    let n = a.nrows();
    for j in 0..n {
        let mut d = a[[j, j]];
        for k in 0..j {
            d -= a[[j, k]] * a[[j, k]];
        }
        if !(d > 0.0 && d.is_finite()) {
            return Err(GeoStatError::SingularMatrix { row: offset + j, pivot: d });
        }
        let ljj = d.sqrt();
        a[[j, j]] = ljj;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= a[[i, k]] * a[[j, k]];
            }
            a[[i, j]] = s / ljj;
        }
    }
    for i in 0..n {
        for j in (i + 1)..a.ncols() {
            a[[i, j]] = 0.0;
        }
    }
    Ok(())
}

/// `B ← B L⁻ᵀ` for a lower-triangular `L` (panel update below a factored
/// diagonal tile).
pub fn trsm_right_lower_t(l: &Array2<f64>, b: &mut Array2<f64>) {
    let n = l.nrows();
    for r in 0..b.nrows() {
        for j in 0..n {
            let mut s = b[[r, j]];
            for k in 0..j {
                s -= b[[r, k]] * l[[j, k]];
            }
            b[[r, j]] = s / l[[j, j]];
        }
    }
}

/// `B ← L⁻¹ B` for a lower-triangular `L`.
pub fn trsm_left_lower(l: &Array2<f64>, b: &mut Array2<f64>) {
    let n = l.nrows();
    for c in 0..b.ncols() {
        for i in 0..n {
            let mut s = b[[i, c]];
            for k in 0..i {
                s -= l[[i, k]] * b[[k, c]];
            }
            b[[i, c]] = s / l[[i, i]];
        }
    }
}

/// `B ← L⁻ᵀ B` for a lower-triangular `L`.
pub fn trsm_left_lower_t(l: &Array2<f64>, b: &mut Array2<f64>) {
    let n = l.nrows();
    for c in 0..b.ncols() {
        for i in (0..n).rev() {
            let mut s = b[[i, c]];
            for k in (i + 1)..n {
                s -= l[[k, i]] * b[[k, c]];
            }
            b[[i, c]] = s / l[[i, i]];
        }
    }
}

/// `C ← C - A Aᵀ`.
pub fn syrk_sub(a: &Array2<f64>, c: &mut Array2<f64>) {
    general_mat_mul(-1.0, a, &a.t(), 1.0, c);
}

/// `C ← C - A Bᵀ`.
pub fn gemm_sub_nt(a: &Array2<f64>, b: &Array2<f64>, c: &mut Array2<f64>) {
    general_mat_mul(-1.0, a, &b.t(), 1.0, c);
}
