//! Tiled triangular solves and products with a Cholesky factor.
//!
//! Right-hand sides are dense `N × k` matrices (an `N`-vector is `N × 1`)
//! split into row blocks that follow the factor's tiling. Within a step
//! every row block is updated by its own task.
use crate::geostat::{
    errors::{GeoStatError, GeoStatResult},
    linalg::{
        cholesky::check_lower_square,
        tile_kernels::{trsm_left_lower, trsm_left_lower_t},
    },
    tiles::{TaskRuntime, TileLayout, TiledMatrix},
};
use ndarray::{Array1, Array2, ArrayView2, Axis, concatenate, linalg::general_mat_mul, s};
use rayon::prelude::*;

fn check_rhs(l: &TiledMatrix, rows: usize) -> GeoStatResult<()> {
    check_lower_square(l)?;
    if rows != l.rows() {
        return Err(GeoStatError::DimensionMismatch {
            what: "right-hand side",
            expected: l.rows(),
            actual: rows,
        });
    }
    Ok(())
}

fn split_rows(layout: &TileLayout, b: &Array2<f64>) -> Vec<Array2<f64>> {
    (0..layout.mt())
        .map(|m| {
            let r0 = layout.row_offset(m);
            let (h, _) = layout.tile_shape(m, m);
            b.slice(s![r0..r0 + h, ..]).to_owned()
        })
        .collect()
}

fn join_rows(blocks: &[Array2<f64>]) -> GeoStatResult<Array2<f64>> {
    let views: Vec<ArrayView2<'_, f64>> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(0), &views).map_err(|_| GeoStatError::UnknownError)
}

/// Solve `L X = B`.
///
/// Errors
/// ------
/// - `InvalidLayout` when `l` is not a lower-stored square factor.
/// - `DimensionMismatch` when `B` has the wrong number of rows.
pub fn forward_substitution(
    rt: &TaskRuntime, l: &TiledMatrix, b: &Array2<f64>,
) -> GeoStatResult<Array2<f64>> {
    check_rhs(l, b.nrows())?;
    let mt = l.layout().mt();
    let mut blocks = split_rows(l.layout(), b);
    for k in 0..mt {
        let lkk = l.tile(k, k)?;
        trsm_left_lower(&lkk, &mut blocks[k]);
        let (head, tail) = blocks.split_at_mut(k + 1);
        let xk = &head[k];
        rt.install(|| {
            tail.par_iter_mut().enumerate().try_for_each(|(offset, bm)| {
                let lmk = l.tile(k + 1 + offset, k)?;
                general_mat_mul(-1.0, &*lmk, xk, 1.0, bm);
                Ok::<(), GeoStatError>(())
            })
        })?;
    }
    join_rows(&blocks)
}

/// Solve `Lᵀ X = B`.
///
/// Errors
/// ------
/// Same as [`forward_substitution`].
pub fn backward_substitution(
    rt: &TaskRuntime, l: &TiledMatrix, b: &Array2<f64>,
) -> GeoStatResult<Array2<f64>> {
    check_rhs(l, b.nrows())?;
    let mt = l.layout().mt();
    let mut blocks = split_rows(l.layout(), b);
    for k in (0..mt).rev() {
        let lkk = l.tile(k, k)?;
        trsm_left_lower_t(&lkk, &mut blocks[k]);
        let (head, tail) = blocks.split_at_mut(k);
        let xk = &tail[0];
        rt.install(|| {
            head.par_iter_mut().enumerate().try_for_each(|(m, bm)| {
                let lkm = l.tile(k, m)?;
                general_mat_mul(-1.0, &lkm.t(), xk, 1.0, bm);
                Ok::<(), GeoStatError>(())
            })
        })?;
    }
    join_rows(&blocks)
}

/// `L X` for a lower factor `L`.
pub fn lower_multiply(
    rt: &TaskRuntime, l: &TiledMatrix, x: &Array2<f64>,
) -> GeoStatResult<Array2<f64>> {
    check_rhs(l, x.nrows())?;
    let mt = l.layout().mt();
    let xs = split_rows(l.layout(), x);
    let blocks = rt.install(|| {
        (0..mt)
            .into_par_iter()
            .map(|m| {
                let mut ym = Array2::zeros(xs[m].dim());
                for n in 0..=m {
                    general_mat_mul(1.0, &*l.tile(m, n)?, &xs[n], 1.0, &mut ym);
                }
                Ok(ym)
            })
            .collect::<GeoStatResult<Vec<Array2<f64>>>>()
    })?;
    join_rows(&blocks)
}

/// `Aᵀ x` for a fully stored tiled matrix `A`.
pub fn transpose_multiply(
    rt: &TaskRuntime, a: &TiledMatrix, x: &Array1<f64>,
) -> GeoStatResult<Array1<f64>> {
    if x.len() != a.rows() {
        return Err(GeoStatError::DimensionMismatch {
            what: "vector",
            expected: a.rows(),
            actual: x.len(),
        });
    }
    let layout = *a.layout();
    let parts = rt.install(|| {
        (0..layout.nt())
            .into_par_iter()
            .map(|n| {
                let (_, w) = layout.tile_shape(0, n);
                let mut acc = Array1::<f64>::zeros(w);
                for m in 0..layout.mt() {
                    let r0 = layout.row_offset(m);
                    let (h, _) = layout.tile_shape(m, n);
                    let tile = a.tile(m, n)?;
                    acc += &tile.t().dot(&x.slice(s![r0..r0 + h]));
                }
                Ok(acc)
            })
            .collect::<GeoStatResult<Vec<Array1<f64>>>>()
    })?;
    Ok(parts.iter().flat_map(|p| p.iter().copied()).collect())
}

/// `L⁻¹ z` for a vector `z`.
pub fn forward_substitution_vec(
    rt: &TaskRuntime, l: &TiledMatrix, z: &Array1<f64>,
) -> GeoStatResult<Array1<f64>> {
    let b = z.view().insert_axis(Axis(1)).to_owned();
    Ok(forward_substitution(rt, l, &b)?.column(0).to_owned())
}

/// `L⁻ᵀ z` for a vector `z`.
pub fn backward_substitution_vec(
    rt: &TaskRuntime, l: &TiledMatrix, z: &Array1<f64>,
) -> GeoStatResult<Array1<f64>> {
    let b = z.view().insert_axis(Axis(1)).to_owned();
    Ok(backward_substitution(rt, l, &b)?.column(0).to_owned())
}
