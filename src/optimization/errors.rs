use argmin::core::{ArgminError, Error};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::geostat::errors::GeoStatError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- MLEOptions ----
    /// Function tolerance needs to be positive and finite.
    InvalidTolF {
        tol: f64,
        reason: &'static str,
    },
    /// Final trust radius needs to be positive, finite and below the initial radius.
    InvalidTolRadius {
        tol: f64,
        reason: &'static str,
    },
    /// Initial trust radius needs to lie in (0, 0.5].
    InvalidInitialRadius {
        radius: f64,
        reason: &'static str,
    },
    /// Evaluation budget needs to cover the initial model fit.
    InvalidMaxEvals {
        max_evals: usize,
        reason: &'static str,
    },
    /// At least one stopping rule must be provided.
    NoTolerancesProvided,

    // ---- Bounds ----
    /// Lower bound above upper bound, or a bound is NaN.
    InvalidBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },
    /// Bounds and theta have different lengths.
    BoundsLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Starting point lies outside the box.
    StartOutsideBounds {
        index: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },

    // ---- Cost function ----
    /// Cost function returned NaN (or +inf log-likelihood).
    NonFiniteCost {
        value: f64,
    },
    /// Every trial point around the start evaluated to -inf.
    NoFeasiblePoint,

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Model errors ----
    /// Theta length does not match the model.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Covariance factorization failed.
    SingularMatrix {
        row: usize,
        pivot: f64,
    },
    /// Any other model-side failure; the domain error is kept intact so
    /// it can be recovered on the way out of the optimizer.
    ModelFailure {
        source: Box<GeoStatError>,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- MLEOptions ----
            OptError::InvalidTolF { tol, reason } => {
                write!(f, "Invalid function tolerance {tol}: {reason}")
            }
            OptError::InvalidTolRadius { tol, reason } => {
                write!(f, "Invalid final trust radius {tol}: {reason}")
            }
            OptError::InvalidInitialRadius { radius, reason } => {
                write!(f, "Invalid initial trust radius {radius}: {reason}")
            }
            OptError::InvalidMaxEvals { max_evals, reason } => {
                write!(f, "Invalid maximum evaluations {max_evals}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }

            // ---- Bounds ----
            OptError::InvalidBounds { index, lower, upper } => {
                write!(f, "Invalid bounds at index {index}: lower {lower} exceeds upper {upper}")
            }
            OptError::BoundsLengthMismatch { expected, actual } => {
                write!(f, "Bounds length mismatch: expected {expected}, found {actual}")
            }
            OptError::StartOutsideBounds { index, value, lower, upper } => {
                write!(f, "Start value {value} at index {index} outside [{lower}, {upper}]")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::NoFeasiblePoint => {
                write!(f, "Log-likelihood is -inf at the start and every trial point around it")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Model errors ----
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::SingularMatrix { row, pivot } => {
                write!(f, "Covariance matrix is not positive definite: pivot {pivot} at row {row}")
            }
            OptError::ModelFailure { source } => {
                write!(f, "Model evaluation failed: {source}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own cost function travel through argmin boxed;
        // recover them first so callers see the original variant.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<GeoStatError> for OptError {
    fn from(err: GeoStatError) -> Self {
        match err {
            GeoStatError::InvalidParameterCount { expected, actual, .. } => {
                OptError::ThetaLengthMismatch { expected, actual }
            }
            GeoStatError::SingularMatrix { row, pivot } => OptError::SingularMatrix { row, pivot },
            GeoStatError::InvalidBounds { index, lower, upper } => {
                OptError::InvalidBounds { index, lower, upper }
            }
            GeoStatError::BoundsLengthMismatch { expected, actual } => {
                OptError::BoundsLengthMismatch { expected, actual }
            }
            GeoStatError::StartOutsideBounds { index, value, lower, upper } => {
                OptError::StartOutsideBounds { index, value, lower, upper }
            }
            other => OptError::ModelFailure { source: Box::new(other) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An `OptError` boxed into an argmin `Error` (as happens when the cost
    // function fails) comes back out unchanged.
    fn boxed_opt_error_round_trips_through_argmin_error() {
        let boxed: Error = OptError::NonFiniteCost { value: f64::NAN }.into();
        let back = OptError::from(boxed);
        assert!(matches!(back, OptError::NonFiniteCost { value } if value.is_nan()));
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds map onto their wrapper variants.
    fn argmin_errors_map_to_wrappers() {
        let err: Error = ArgminError::NotInitialized { text: "state".to_string() }.into();
        assert_eq!(OptError::from(err), OptError::NotInitialized { text: "state".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // Parameter-count errors from the model layer become theta-length
    // mismatches in optimizer space.
    fn parameter_count_maps_to_theta_length_mismatch() {
        let err: OptError = GeoStatError::InvalidParameterCount {
            kernel: "k".to_string(),
            expected: 3,
            actual: 4,
        }
        .into();
        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 3, actual: 4 });
    }

    #[test]
    // Purpose
    // -------
    // A domain failure boxed into an argmin `Error` by the cost adapter is
    // recovered intact, not flattened to text.
    fn model_failure_keeps_domain_error_through_argmin() {
        let domain = GeoStatError::StorageIo {
            path: "/tmp/tile_0_0.bin".to_string(),
            reason: "disk full".to_string(),
        };
        let boxed: Error = OptError::from(domain.clone()).into();
        match OptError::from(boxed) {
            OptError::ModelFailure { source } => assert_eq!(*source, domain),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
