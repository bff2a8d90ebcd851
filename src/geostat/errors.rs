//! Errors for Gaussian-field modeling (registry lookups, location and
//! observation validation, tiled-matrix layout, factorization, and optimizer
//! failures).
//!
//! This module defines the domain error type [`GeoStatError`] used across the
//! Rust core and the optional Python surface. It implements `Display`/`Error`
//! and converts to `PyErr` for PyO3 when `python-bindings` is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Kernel names are **case-sensitive** registry keys.
//! - `SingularMatrix` carries the global row of the first non-positive pivot.
//!   The likelihood layer turns it into `ℓ = -∞` while estimating; prediction
//!   and data generation propagate it as a hard failure.
//! - Optimizer/backend errors are normalized to
//!   [`GeoStatError::OptimizationFailed`] with a human-readable status.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Crate-wide result alias for geostatistics operations.
pub type GeoStatResult<T> = Result<T, GeoStatError>;

/// Unified error type for Gaussian-field estimation and prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoStatError {
    // ---- Kernel registry ----
    /// No factory registered under this name.
    UnknownKernel { name: String },

    /// A different kernel is already registered under this name.
    DuplicateKernel { name: String },

    /// Theta length does not match the kernel's declared parameter count.
    InvalidParameterCount { kernel: String, expected: usize, actual: usize },

    /// Theta entry is NaN/±inf.
    NonFiniteParameter { index: usize, value: f64 },

    /// The kernel cannot be used for the requested operation.
    UnsupportedKernel { kernel: String, reason: &'static str },

    /// Time-slot count must be at least one.
    InvalidTimeSlots { slots: usize },

    // ---- Locations / observations ----
    /// Location set is empty.
    EmptyLocations,

    /// A coordinate is NaN/±inf.
    NonFiniteCoordinate { axis: &'static str, index: usize, value: f64 },

    /// An observation is NaN/±inf.
    NonFiniteObservation { index: usize, value: f64 },

    /// Lengths that must agree do not.
    DimensionMismatch { what: &'static str, expected: usize, actual: usize },

    /// A space-time kernel was evaluated on locations without a time column.
    MissingTimeCoordinate,

    /// Unknown distance metric name.
    InvalidMetric { name: String },

    /// Unknown spatial dimension name.
    InvalidDimension { name: String },

    // ---- Tiled matrices ----
    /// Tile edge length must be positive.
    InvalidTileSize { tile_size: usize },

    /// Rows/columns must be positive; triangular storage needs a square layout.
    InvalidLayout { rows: usize, cols: usize, reason: &'static str },

    /// Problem size must be positive and match the requested layout.
    InvalidProblemSize { size: usize, reason: &'static str },

    /// Tile (or tile file) access failed in out-of-core storage.
    StorageIo { path: String, reason: String },

    // ---- Factorization ----
    /// Cholesky met a non-positive or non-finite pivot.
    SingularMatrix { row: usize, pivot: f64 },

    // ---- Runtime ----
    /// Worker count must be positive.
    InvalidThreadCount { threads: usize },

    /// The worker pool could not be created.
    RuntimeInit { reason: String },

    // ---- Estimation ----
    /// Lower bound exceeds upper bound (or a bound is NaN).
    InvalidBounds { index: usize, lower: f64, upper: f64 },

    /// Bounds length does not match theta length.
    BoundsLengthMismatch { expected: usize, actual: usize },

    /// Starting value lies outside its box.
    StartOutsideBounds { index: usize, value: f64, lower: f64, upper: f64 },

    /// Optimizer failed (message from backend).
    OptimizationFailed { status: String },

    /// Prediction requested before any parameters are available.
    NotEstimated,

    /// Estimation or prediction requested before any data were loaded.
    NoData,

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for GeoStatError {}

impl std::fmt::Display for GeoStatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Kernel registry ----
            GeoStatError::UnknownKernel { name } => {
                write!(f, "Unknown kernel '{name}'")
            }
            GeoStatError::DuplicateKernel { name } => {
                write!(f, "A different kernel is already registered as '{name}'")
            }
            GeoStatError::InvalidParameterCount { kernel, expected, actual } => {
                write!(
                    f,
                    "Invalid parameter count for kernel '{kernel}': expected {expected}, got {actual}"
                )
            }
            GeoStatError::NonFiniteParameter { index, value } => {
                write!(f, "Parameter at index {index} is not finite: {value}")
            }
            GeoStatError::UnsupportedKernel { kernel, reason } => {
                write!(f, "Kernel '{kernel}' is not supported here: {reason}")
            }
            GeoStatError::InvalidTimeSlots { slots } => {
                write!(f, "Invalid time-slot count {slots}: must be at least 1")
            }

            // ---- Locations / observations ----
            GeoStatError::EmptyLocations => {
                write!(f, "Location set must contain at least one point")
            }
            GeoStatError::NonFiniteCoordinate { axis, index, value } => {
                write!(f, "Coordinate {axis}[{index}] is not finite: {value}")
            }
            GeoStatError::NonFiniteObservation { index, value } => {
                write!(f, "Observation at index {index} is not finite: {value}")
            }
            GeoStatError::DimensionMismatch { what, expected, actual } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, got {actual}")
            }
            GeoStatError::MissingTimeCoordinate => {
                write!(f, "Space-time kernel requires a time coordinate for every location")
            }
            GeoStatError::InvalidMetric { name } => {
                write!(
                    f,
                    "Invalid distance metric '{name}': valid options are case insensitive \
                     'euclidean', 'manhattan' or 'great_circle'"
                )
            }
            GeoStatError::InvalidDimension { name } => {
                write!(
                    f,
                    "Invalid dimension '{name}': valid options are case insensitive '2d', '3d' or 'st'"
                )
            }

            // ---- Tiled matrices ----
            GeoStatError::InvalidTileSize { tile_size } => {
                write!(f, "Invalid tile size {tile_size}: must be greater than zero")
            }
            GeoStatError::InvalidLayout { rows, cols, reason } => {
                write!(f, "Invalid tile layout {rows}x{cols}: {reason}")
            }
            GeoStatError::InvalidProblemSize { size, reason } => {
                write!(f, "Invalid problem size {size}: {reason}")
            }
            GeoStatError::StorageIo { path, reason } => {
                write!(f, "Tile storage failure at '{path}': {reason}")
            }

            // ---- Factorization ----
            GeoStatError::SingularMatrix { row, pivot } => {
                write!(f, "Matrix is not positive definite: pivot {pivot} at row {row}")
            }

            // ---- Runtime ----
            GeoStatError::InvalidThreadCount { threads } => {
                write!(f, "Invalid worker count {threads}: must be greater than zero")
            }
            GeoStatError::RuntimeInit { reason } => {
                write!(f, "Failed to start task runtime: {reason}")
            }

            // ---- Estimation ----
            GeoStatError::InvalidBounds { index, lower, upper } => {
                write!(f, "Invalid bounds at index {index}: lower {lower} exceeds upper {upper}")
            }
            GeoStatError::BoundsLengthMismatch { expected, actual } => {
                write!(f, "Bounds length mismatch: expected {expected}, got {actual}")
            }
            GeoStatError::StartOutsideBounds { index, value, lower, upper } => {
                write!(
                    f,
                    "Starting value {value} at index {index} lies outside [{lower}, {upper}]"
                )
            }
            GeoStatError::OptimizationFailed { status } => {
                write!(f, "Optimization failed: {status}")
            }
            GeoStatError::NotEstimated => {
                write!(f, "No parameter vector available: estimate or supply theta first")
            }
            GeoStatError::NoData => {
                write!(f, "No data loaded: provide or generate observations first")
            }

            // ---- Fallback ----
            GeoStatError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<GeoStatError> for PyErr {
    fn from(err: GeoStatError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for GeoStatError {
    fn from(err: OptError) -> GeoStatError {
        match err {
            OptError::InvalidBounds { index, lower, upper } => {
                GeoStatError::InvalidBounds { index, lower, upper }
            }
            OptError::BoundsLengthMismatch { expected, actual } => {
                GeoStatError::BoundsLengthMismatch { expected, actual }
            }
            OptError::StartOutsideBounds { index, value, lower, upper } => {
                GeoStatError::StartOutsideBounds { index, value, lower, upper }
            }
            OptError::SingularMatrix { row, pivot } => GeoStatError::SingularMatrix { row, pivot },
            OptError::ThetaLengthMismatch { expected, actual } => GeoStatError::DimensionMismatch {
                what: "theta",
                expected,
                actual,
            },
            OptError::ModelFailure { source } => *source,
            other => GeoStatError::OptimizationFailed { status: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Bounds-related optimizer errors keep their payload when they cross
    // into the domain error type.
    //
    // Given
    // -----
    // - `OptError::InvalidBounds { index: 2, lower: 3.0, upper: 1.0 }`.
    //
    // Expect
    // ------
    // - The matching `GeoStatError::InvalidBounds` with the same fields.
    fn opt_bounds_error_maps_to_domain_bounds_error() {
        let err: GeoStatError = OptError::InvalidBounds { index: 2, lower: 3.0, upper: 1.0 }.into();
        assert_eq!(err, GeoStatError::InvalidBounds { index: 2, lower: 3.0, upper: 1.0 });
    }

    #[test]
    // Purpose
    // -------
    // Backend errors without a domain counterpart collapse into
    // `OptimizationFailed` and keep a readable status.
    fn other_opt_errors_become_optimization_failed() {
        let err: GeoStatError = OptError::MissingThetaHat.into();
        match err {
            GeoStatError::OptimizationFailed { status } => {
                assert!(status.contains("theta hat"), "status was {status}");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Domain errors raised inside the objective survive the trip into
    // optimizer space and back with their kind and payload.
    //
    // Given
    // -----
    // - A `StorageIo` error and a `MissingTimeCoordinate` error.
    //
    // Expect
    // ------
    // - `GeoStatError -> OptError -> GeoStatError` returns the original.
    fn model_errors_round_trip_through_optimizer_errors() {
        let cases = [
            GeoStatError::StorageIo { path: "/tmp/x".to_string(), reason: "disk full".to_string() },
            GeoStatError::MissingTimeCoordinate,
        ];
        for original in cases {
            let back = GeoStatError::from(OptError::from(original.clone()));
            assert_eq!(back, original);
        }
    }

    #[test]
    // Purpose
    // -------
    // Display strings name the offending kernel so CLI users can act.
    fn display_mentions_kernel_name() {
        let err = GeoStatError::InvalidParameterCount {
            kernel: "UnivariateMaternStationary".to_string(),
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("UnivariateMaternStationary"));
        assert!(msg.contains("expected 3"));
    }
}
