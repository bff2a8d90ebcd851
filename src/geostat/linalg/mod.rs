//! linalg — tiled Cholesky, triangular solves and the Gaussian likelihood.
//!
//! Purpose
//! -------
//! Factor covariance matrices stored as [`TiledMatrix`] values and evaluate
//! the quantities estimation and prediction need from the factor.
//!
//! Key behaviors
//! -------------
//! - [`tile_kernels`] holds the dense per-tile routines (`potrf`, `trsm`,
//!   `syrk`, `gemm`).
//! - [`cholesky`] schedules them as a right-looking task graph on the
//!   [`TaskRuntime`].
//! - [`solve`] provides forward/backward substitution and products with `L`.
//! - [`likelihood`] turns a factor and an observation vector into `ℓ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Factors are square with `MatrixPart::Lower` storage; anything else is
//!   rejected with `InvalidLayout`.
//! - A failed pivot reports `SingularMatrix` with the global row index.
//!
//! [`TiledMatrix`]: crate::geostat::tiles::TiledMatrix
//! [`TaskRuntime`]: crate::geostat::tiles::TaskRuntime

pub mod cholesky;
pub mod likelihood;
pub mod solve;
pub mod tile_kernels;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cholesky::cholesky;
pub use self::likelihood::{LikelihoodContext, log_determinant, log_likelihood};
pub use self::solve::{
    backward_substitution, backward_substitution_vec, forward_substitution,
    forward_substitution_vec, lower_multiply, transpose_multiply,
};
