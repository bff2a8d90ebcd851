//! Observed data: a location set plus its interleaved observation vector.
use crate::geostat::{
    core::locations::Locations,
    errors::{GeoStatError, GeoStatResult},
};
use ndarray::Array1;

/// `GeoData` — locations and the observations made there.
///
/// Invariants
/// ----------
/// - `observations.len() == locations.len() × variates`, interleaved per
///   location: `[z₁(s₀), …, z_v(s₀), z₁(s₁), …]`.
/// - Every observation is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoData {
    locations: Locations,
    observations: Array1<f64>,
    variates: usize,
}

impl GeoData {
    /// Errors
    /// ------
    /// - `DimensionMismatch` when the observation count does not match
    ///   `locations.len() × variates` or `variates == 0`.
    /// - `NonFiniteObservation` for the first NaN/±∞ entry.
    pub fn new(
        locations: Locations, observations: Array1<f64>, variates: usize,
    ) -> GeoStatResult<Self> {
        if variates == 0 {
            return Err(GeoStatError::DimensionMismatch {
                what: "variates",
                expected: 1,
                actual: 0,
            });
        }
        let expected = locations.len() * variates;
        if observations.len() != expected {
            return Err(GeoStatError::DimensionMismatch {
                what: "observations",
                expected,
                actual: observations.len(),
            });
        }
        if let Some(index) = observations.iter().position(|v| !v.is_finite()) {
            return Err(GeoStatError::NonFiniteObservation { index, value: observations[index] });
        }
        Ok(GeoData { locations, observations, variates })
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    pub fn observations(&self) -> &Array1<f64> {
        &self.observations
    }

    pub fn variates(&self) -> usize {
        self.variates
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Subset of locations (with all their variates), in the given order.
    pub fn select(&self, indices: &[usize]) -> GeoStatResult<GeoData> {
        let locations = self.locations.select(indices)?;
        let v = self.variates;
        let observations = indices
            .iter()
            .flat_map(|&i| (0..v).map(move |k| i * v + k))
            .map(|r| self.observations[r])
            .collect::<Array1<f64>>();
        Ok(GeoData { locations, observations, variates: v })
    }

    /// Split into `(kept, held_out)` by location index; `held_out` keeps the
    /// given order.
    ///
    /// Errors
    /// ------
    /// - `EmptyLocations` when either side would be empty.
    pub fn split(&self, held_out: &[usize]) -> GeoStatResult<(GeoData, GeoData)> {
        let mut mask = vec![false; self.locations.len()];
        for &i in held_out {
            if i >= mask.len() {
                return Err(GeoStatError::DimensionMismatch {
                    what: "location index",
                    expected: mask.len(),
                    actual: i,
                });
            }
            mask[i] = true;
        }
        let kept: Vec<usize> = (0..mask.len()).filter(|&i| !mask[i]).collect();
        Ok((self.select(&kept)?, self.select(held_out)?))
    }
}
