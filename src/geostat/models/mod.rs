//! models — the Gaussian field model, its estimation and prediction.
//!
//! Purpose
//! -------
//! Tie kernels, the covariance builder and the likelihood engine into the
//! three statistical operations of the crate: maximum-likelihood
//! estimation, kriging prediction and Fisher information.
//!
//! Key behaviors
//! -------------
//! - [`FieldSpec`] fixes kernel, metric, tile size and storage;
//!   [`GaussianFieldModel`] binds it to a runtime and implements
//!   `LogLikelihood`.
//! - [`estimate`] runs the bounded optimizer and returns an
//!   [`EstimationOutcome`].
//! - [`predict`] returns kriging means, optional variances and MSPE as a
//!   [`PredictionOutcome`].
//! - [`fisher_information`] returns a [`FisherInformation`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `SingularMatrix` is absorbed as `ℓ = −∞` during estimation and is a
//!   hard error everywhere else.

pub mod estimation;
pub mod field;
pub mod fisher;
pub mod prediction;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::estimation::{EstimationOutcome, estimate};
pub use self::field::{FieldSpec, GaussianFieldModel};
pub use self::fisher::{FisherInformation, fisher_information};
pub use self::prediction::{PredictionOutcome, mean_squared_error, predict};
