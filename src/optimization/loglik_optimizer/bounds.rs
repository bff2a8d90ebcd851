//! Per-parameter box constraints for the bounded optimizer.
//!
//! [`ParamBounds`] owns validated `lower`/`upper` vectors. A parameter with
//! `lower == upper` is held fixed during optimization; the solver never
//! samples it. All mapping between the box and the unit cube the solver works
//! in goes through [`ParamBounds::to_unit`] and [`ParamBounds::from_unit`].
use serde::{Deserialize, Serialize};

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::Theta,
};

/// Validated lower/upper bounds, one pair per parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ParamBounds {
    /// Build bounds from matching slices.
    ///
    /// # Errors
    /// - [`OptError::BoundsLengthMismatch`] if the slices differ in length.
    /// - [`OptError::InvalidBounds`] if a bound is non-finite or `lower > upper`.
    pub fn new(lower: &[f64], upper: &[f64]) -> OptResult<Self> {
        if lower.len() != upper.len() {
            return Err(OptError::BoundsLengthMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(OptError::InvalidBounds { index, lower: lo, upper: hi });
            }
        }
        Ok(Self { lower: lower.to_vec(), upper: upper.to_vec() })
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// `true` when the parameter at `index` has a degenerate box.
    pub fn is_fixed(&self, index: usize) -> bool {
        self.lower[index] == self.upper[index]
    }

    /// Check that `theta` has the right length and lies inside the box.
    pub fn check_contains(&self, theta: &Theta) -> OptResult<()> {
        if theta.len() != self.len() {
            return Err(OptError::BoundsLengthMismatch {
                expected: theta.len(),
                actual: self.len(),
            });
        }
        for (index, &value) in theta.iter().enumerate() {
            let (lower, upper) = (self.lower[index], self.upper[index]);
            if !(value >= lower && value <= upper) {
                return Err(OptError::StartOutsideBounds { index, value, lower, upper });
            }
        }
        Ok(())
    }

    /// Map a parameter vector into `[0, 1]^n`. Fixed entries map to `0`.
    pub fn to_unit(&self, theta: &Theta) -> Vec<f64> {
        theta
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let width = self.upper[i] - self.lower[i];
                if width > 0.0 { ((x - self.lower[i]) / width).clamp(0.0, 1.0) } else { 0.0 }
            })
            .collect()
    }

    /// Inverse of [`to_unit`](Self::to_unit); the result is clamped into the box.
    pub fn from_unit(&self, u: &[f64]) -> Theta {
        u.iter()
            .enumerate()
            .map(|(i, &ui)| {
                let width = self.upper[i] - self.lower[i];
                (self.lower[i] + ui * width).clamp(self.lower[i], self.upper[i])
            })
            .collect()
    }
}
