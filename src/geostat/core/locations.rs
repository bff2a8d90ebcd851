//! Location sets for Gaussian-field models.
//!
//! Purpose
//! -------
//! Hold the coordinates at which a field is observed or predicted and answer
//! pairwise distance and time-lag queries for kernel evaluation.
//!
//! Key behaviors
//! -------------
//! - [`Locations::new`] validates equal column lengths, non-emptiness and
//!   finiteness once; afterwards the set is immutable.
//! - [`Locations::distance_between`] / [`Locations::distance_to`] delegate to
//!   a [`DistanceMetric`]; the same point on the same set is exactly `0.0`.
//! - [`Locations::time_lag`] returns `|t_i - t_j|`, or `0.0` when either set
//!   has no time column.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x`, `y` and any present `z`/`t` columns share one length `n > 0`.
//! - Every coordinate is finite.
//! - The type is `Sync`; builder tasks share it by reference.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based.
//! - Space-time sites observed at `T` slots appear as `T` entries with the
//!   same `(x, y)` and `t = 1..=T` (time-major order when generated).
use crate::geostat::{
    core::metric::{DistanceMetric, Point},
    errors::{GeoStatError, GeoStatResult},
};
use ndarray::Array1;

/// Validated, immutable set of locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Locations {
    x: Array1<f64>,
    y: Array1<f64>,
    z: Option<Array1<f64>>,
    t: Option<Array1<f64>>,
}

impl Locations {
    /// Construct a validated location set.
    ///
    /// Errors
    /// ------
    /// - `EmptyLocations` when `x` is empty.
    /// - `DimensionMismatch` when a column length differs from `x.len()`.
    /// - `NonFiniteCoordinate` naming the first offending column and index.
    pub fn new(
        x: Array1<f64>, y: Array1<f64>, z: Option<Array1<f64>>, t: Option<Array1<f64>>,
    ) -> GeoStatResult<Self> {
        let n = x.len();
        if n == 0 {
            return Err(GeoStatError::EmptyLocations);
        }
        check_column("y", &y, n)?;
        check_finite("x", &x)?;
        check_finite("y", &y)?;
        if let Some(z) = &z {
            check_column("z", z, n)?;
            check_finite("z", z)?;
        }
        if let Some(t) = &t {
            check_column("t", t, n)?;
            check_finite("t", t)?;
        }
        Ok(Locations { x, y, z, t })
    }

    /// Planar locations without elevation or time.
    pub fn planar(x: Array1<f64>, y: Array1<f64>) -> GeoStatResult<Self> {
        Locations::new(x, y, None, None)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn z(&self) -> Option<&Array1<f64>> {
        self.z.as_ref()
    }

    pub fn t(&self) -> Option<&Array1<f64>> {
        self.t.as_ref()
    }

    pub fn has_time(&self) -> bool {
        self.t.is_some()
    }

    /// Point `i` as seen by a metric. Panics if `i` is out of range.
    pub fn point(&self, i: usize) -> Point {
        Point { x: self.x[i], y: self.y[i], z: self.z.as_ref().map(|z| z[i]) }
    }

    /// Distance between two points of this set; exactly `0.0` when `i == j`.
    pub fn distance_between(&self, i: usize, j: usize, metric: DistanceMetric) -> f64 {
        if i == j {
            return 0.0;
        }
        metric.distance(self.point(i), self.point(j))
    }

    /// Distance from point `i` of this set to point `j` of `other`.
    pub fn distance_to(
        &self, i: usize, other: &Locations, j: usize, metric: DistanceMetric,
    ) -> f64 {
        if std::ptr::eq(self, other) {
            return self.distance_between(i, j, metric);
        }
        metric.distance(self.point(i), other.point(j))
    }

    /// `|t_i - t_j|`, or `0.0` when either set lacks a time column.
    pub fn time_lag(&self, i: usize, other: &Locations, j: usize) -> f64 {
        match (&self.t, &other.t) {
            (Some(a), Some(b)) => (a[i] - b[j]).abs(),
            _ => 0.0,
        }
    }

    /// New set made of the given entries, in the given order.
    ///
    /// Errors
    /// ------
    /// - `EmptyLocations` for an empty selection.
    /// - `DimensionMismatch` for an index `>= self.len()`.
    pub fn select(&self, indices: &[usize]) -> GeoStatResult<Locations> {
        if indices.is_empty() {
            return Err(GeoStatError::EmptyLocations);
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(GeoStatError::DimensionMismatch {
                what: "location index",
                expected: self.len(),
                actual: bad,
            });
        }
        let pick = |col: &Array1<f64>| indices.iter().map(|&i| col[i]).collect::<Array1<f64>>();
        Ok(Locations {
            x: pick(&self.x),
            y: pick(&self.y),
            z: self.z.as_ref().map(pick),
            t: self.t.as_ref().map(pick),
        })
    }
}

fn check_column(axis: &'static str, col: &Array1<f64>, n: usize) -> GeoStatResult<()> {
    if col.len() != n {
        return Err(GeoStatError::DimensionMismatch { what: axis, expected: n, actual: col.len() });
    }
    Ok(())
}

fn check_finite(axis: &'static str, col: &Array1<f64>) -> GeoStatResult<()> {
    match col.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(GeoStatError::NonFiniteCoordinate { axis, index, value: col[index] }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Construction rejects empty, ragged and non-finite inputs.
    fn construction_validates_columns() {
        assert_eq!(
            Locations::planar(Array1::zeros(0), Array1::zeros(0)).expect_err("empty"),
            GeoStatError::EmptyLocations
        );
        assert!(matches!(
            Locations::planar(array![0.0, 1.0], array![0.0]),
            Err(GeoStatError::DimensionMismatch { what: "y", expected: 2, actual: 1 })
        ));
        assert!(matches!(
            Locations::new(array![0.0, 1.0], array![0.0, 1.0], Some(array![0.0, f64::NAN]), None),
            Err(GeoStatError::NonFiniteCoordinate { axis: "z", index: 1, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Self-distance is exactly zero, cross-set distance and time lag agree
    // with hand-computed values.
    fn distances_and_time_lags() {
        let a = Locations::new(array![0.0, 3.0], array![0.0, 4.0], None, Some(array![1.0, 3.0]))
            .expect("a");
        let b = Locations::new(array![0.0], array![1.0], None, Some(array![2.5])).expect("b");

        assert_eq!(a.distance_between(1, 1, DistanceMetric::Euclidean), 0.0);
        assert_eq!(a.distance_between(0, 1, DistanceMetric::Euclidean), 5.0);
        assert_eq!(a.distance_to(1, &b, 0, DistanceMetric::Manhattan), 6.0);
        assert_eq!(a.time_lag(1, &b, 0), 0.5);

        let planar = Locations::planar(array![0.0], array![0.0]).expect("planar");
        assert_eq!(a.time_lag(0, &planar, 0), 0.0);
    }

    #[test]
    fn select_reorders_every_column() {
        let a = Locations::new(
            array![0.0, 1.0, 2.0],
            array![5.0, 6.0, 7.0],
            Some(array![9.0, 8.0, 7.0]),
            None,
        )
        .expect("a");
        let s = a.select(&[2, 0]).expect("select");
        assert_eq!(s.x(), &array![2.0, 0.0]);
        assert_eq!(s.y(), &array![7.0, 5.0]);
        assert_eq!(s.z(), Some(&array![7.0, 9.0]));
        assert!(a.select(&[3]).is_err());
    }
}
