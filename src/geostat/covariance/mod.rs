//! covariance — tiled covariance construction and synthetic observations.
//!
//! Purpose
//! -------
//! Turn a kernel, one or two location sets and a parameter vector into a
//! [`TiledMatrix`], one independent task per tile, and draw seeded
//! observations from the resulting field.
//!
//! Conventions
//! -----------
//! - Rows and columns follow the interleaved multivariate layout: row `r`
//!   addresses location `r / variates`, variate `r % variates`.
//! - Symmetric covariances are built with `MatrixPart::Lower`; cross
//!   covariances between different sets with `MatrixPart::Full`.
//!
//! [`TiledMatrix`]: crate::geostat::tiles::TiledMatrix

pub mod builder;
pub mod observations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::builder::{build_covariance, covariance_diagonal, covariance_matrix};
pub use self::observations::generate_observations;
