//! kernels — the covariance-kernel family and its registry.
//!
//! Purpose
//! -------
//! Provide pure covariance functions `(lag, theta) → C` for stationary
//! Matérn fields, their parameter derivatives, space-time and multivariate
//! variants, plus the name-keyed registry that instantiates them.
//!
//! Key behaviors
//! -------------
//! - [`CovarianceKernel`] is the seam every kernel implements.
//! - [`KernelRegistry`] maps names to factories; [`Kernel`] wraps a created
//!   kernel with parameter validation and interleaved matrix addressing.
//! - [`special`] holds the real-order Bessel `K_ν` and related functions.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernels return their exact limiting value at zero distance.
//! - Kernels never see an unchecked `theta`: [`Kernel`] validates the length
//!   and finiteness first.

pub mod derivatives;
pub mod matern;
pub mod multivariate;
pub mod registry;
pub mod spacetime;
pub mod special;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::derivatives::{MaternDerivative, UnivariateMaternDerivative};
pub use self::registry::{Kernel, KernelFactory, KernelRegistry};
pub use self::traits::{CovarianceKernel, Lag};
