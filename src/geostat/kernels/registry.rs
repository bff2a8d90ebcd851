//! Kernel registry and the validated [`Kernel`] handle.
//!
//! Purpose
//! -------
//! Map case-sensitive kernel names to zero-argument factories, and wrap the
//! created kernels in a handle that validates parameter vectors and
//! addresses interleaved multivariate matrices.
//!
//! Key behaviors
//! -------------
//! - [`KernelRegistry::register`] refuses to replace an existing entry with a
//!   different kernel (`DuplicateKernel`); re-registering an identical kernel
//!   (same name, parameter count and variates) is a no-op.
//! - [`KernelRegistry::create`] returns a fresh [`Kernel`] or
//!   `UnknownKernel`.
//! - [`Kernel::evaluate`] / [`Kernel::evaluate_block`] check `theta` and
//!   the time column before evaluating; [`Kernel::element`] is the
//!   unchecked path used by the covariance builder after one up-front check.
//!
//! Conventions
//! -----------
//! - Matrix row `r` addresses location `r / v` and variate `r % v`, where
//!   `v = variates()`.
//! - `p() = variates × time_slots` is the number of observations generated
//!   per site.
//! - Registries are explicit values; there is no global registry, and
//!   evaluation never depends on registration order.
use crate::geostat::{
    core::{locations::Locations, metric::DistanceMetric},
    errors::{GeoStatError, GeoStatResult},
    kernels::{
        derivatives::{MaternDerivative, UnivariateMaternDerivative},
        matern::{UnivariateMaternNuggetsStationary, UnivariateMaternStationary},
        multivariate::{BivariateMaternParsimonious, TrivariateMaternParsimonious},
        spacetime::{BivariateSpacetimeMaternStationary, UnivariateSpacetimeMaternStationary},
        traits::{CovarianceKernel, Lag},
    },
};
use ndarray::Array2;
use std::{collections::HashMap, sync::Arc};

/// Zero-argument kernel constructor.
pub type KernelFactory = fn() -> Box<dyn CovarianceKernel>;

/// Name → factory map.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    factories: HashMap<String, KernelFactory>,
}

impl KernelRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        KernelRegistry { factories: HashMap::new() }
    }

    /// Registry holding every built-in kernel.
    pub fn with_builtin_kernels() -> Self {
        let mut registry = KernelRegistry::new();
        let builtins: [(&str, KernelFactory); 15] = [
            ("UnivariateMaternStationary", || Box::new(UnivariateMaternStationary)),
            ("UnivariateMaternNuggetsStationary", || Box::new(UnivariateMaternNuggetsStationary)),
            ("UnivariateMaternDsigmaSquare", || derivative(MaternDerivative::DsigmaSquare)),
            ("UnivariateMaternDbeta", || derivative(MaternDerivative::Dbeta)),
            ("UnivariateMaternDnu", || derivative(MaternDerivative::Dnu)),
            ("UnivariateMaternDdsigmaSquare", || derivative(MaternDerivative::DdsigmaSquare)),
            (
                "UnivariateMaternDdsigmaSquareBeta",
                || derivative(MaternDerivative::DdsigmaSquareBeta),
            ),
            ("UnivariateMaternDdsigmaSquareNu", || derivative(MaternDerivative::DdsigmaSquareNu)),
            ("UnivariateMaternDdbetaBeta", || derivative(MaternDerivative::DdbetaBeta)),
            ("UnivariateMaternDdbetaNu", || derivative(MaternDerivative::DdbetaNu)),
            ("UnivariateMaternDdnuNu", || derivative(MaternDerivative::DdnuNu)),
            (
                "UnivariateSpacetimeMaternStationary",
                || Box::new(UnivariateSpacetimeMaternStationary),
            ),
            ("BivariateMaternParsimonious", || Box::new(BivariateMaternParsimonious)),
            ("TrivariateMaternParsimonious", || Box::new(TrivariateMaternParsimonious)),
            ("BivariateSpacetimeMaternStationary", || Box::new(BivariateSpacetimeMaternStationary)),
        ];
        for (name, factory) in builtins {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    /// Register `factory` under `name`.
    ///
    /// Errors
    /// ------
    /// - `DuplicateKernel` when `name` is taken by a kernel with a different
    ///   identity.
    pub fn register(&mut self, name: &str, factory: KernelFactory) -> GeoStatResult<()> {
        if let Some(existing) = self.factories.get(name) {
            let (old, new) = (existing(), factory());
            let same = old.name() == new.name()
                && old.param_count() == new.param_count()
                && old.variates() == new.variates();
            return if same {
                Ok(())
            } else {
                Err(GeoStatError::DuplicateKernel { name: name.to_string() })
            };
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    /// Instantiate kernel `name` for `time_slots` slots per site.
    ///
    /// Errors
    /// ------
    /// - `UnknownKernel` for an unregistered name.
    /// - `InvalidTimeSlots` when `time_slots == 0`.
    pub fn create(&self, name: &str, time_slots: usize) -> GeoStatResult<Kernel> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| GeoStatError::UnknownKernel { name: name.to_string() })?;
        if time_slots == 0 {
            return Err(GeoStatError::InvalidTimeSlots { slots: time_slots });
        }
        Ok(Kernel { inner: Arc::from(factory()), time_slots })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn derivative(which: MaternDerivative) -> Box<dyn CovarianceKernel> {
    Box::new(UnivariateMaternDerivative::new(which))
}

/// Shareable, validated handle to a created kernel.
#[derive(Debug, Clone)]
pub struct Kernel {
    inner: Arc<dyn CovarianceKernel>,
    time_slots: usize,
}

impl Kernel {
    /// Wrap a kernel directly, bypassing a registry.
    pub fn from_kernel(
        kernel: Arc<dyn CovarianceKernel>, time_slots: usize,
    ) -> GeoStatResult<Self> {
        if time_slots == 0 {
            return Err(GeoStatError::InvalidTimeSlots { slots: time_slots });
        }
        Ok(Kernel { inner: kernel, time_slots })
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn param_count(&self) -> usize {
        self.inner.param_count()
    }

    pub fn variates(&self) -> usize {
        self.inner.variates()
    }

    pub fn time_slots(&self) -> usize {
        self.time_slots
    }

    /// Observations generated per spatial site over all time slots.
    ///
    /// Each time slot is its own location entry, so a single entry (and a
    /// single block of the covariance) still carries `variates()` values.
    pub fn observations_per_site(&self) -> usize {
        self.variates() * self.time_slots
    }

    pub fn requires_time(&self) -> bool {
        self.inner.requires_time()
    }

    /// Validate `theta` length and finiteness.
    pub fn check_theta(&self, theta: &[f64]) -> GeoStatResult<()> {
        if theta.len() != self.param_count() {
            return Err(GeoStatError::InvalidParameterCount {
                kernel: self.name().to_string(),
                expected: self.param_count(),
                actual: theta.len(),
            });
        }
        if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
            return Err(GeoStatError::NonFiniteParameter { index, value: theta[index] });
        }
        Ok(())
    }

    /// Fail with `MissingTimeCoordinate` when the kernel reads time lags and
    /// a location set has no time column.
    pub fn check_locations(&self, sets: &[&Locations]) -> GeoStatResult<()> {
        if self.requires_time() && sets.iter().any(|l| !l.has_time()) {
            return Err(GeoStatError::MissingTimeCoordinate);
        }
        Ok(())
    }

    /// Univariate (variate 0, 0) covariance between `a[i]` and `b[j]`.
    pub fn evaluate(
        &self, a: &Locations, i: usize, b: &Locations, j: usize, theta: &[f64],
        metric: DistanceMetric,
    ) -> GeoStatResult<f64> {
        self.check_theta(theta)?;
        self.check_locations(&[a, b])?;
        check_index(a, i)?;
        check_index(b, j)?;
        Ok(self.inner.covariance(lag(a, i, b, j, metric), 0, 0, theta))
    }

    /// `v × v` covariance block between `a[i]` and `b[j]`.
    pub fn evaluate_block(
        &self, a: &Locations, i: usize, b: &Locations, j: usize, theta: &[f64],
        metric: DistanceMetric,
    ) -> GeoStatResult<Array2<f64>> {
        self.check_theta(theta)?;
        self.check_locations(&[a, b])?;
        check_index(a, i)?;
        check_index(b, j)?;
        let l = lag(a, i, b, j, metric);
        let v = self.variates();
        Ok(Array2::from_shape_fn((v, v), |(vi, vj)| self.inner.covariance(l, vi, vj, theta)))
    }

    /// Matrix element `(r, c)` of the covariance between `rows` and `cols`
    /// in interleaved layout. `theta` and indices must already be valid.
    pub(crate) fn element(
        &self, rows: &Locations, r: usize, cols: &Locations, c: usize, theta: &[f64],
        metric: DistanceMetric,
    ) -> f64 {
        let v = self.variates();
        let (i, vi) = (r / v, r % v);
        let (j, vj) = (c / v, c % v);
        self.inner.covariance(lag(rows, i, cols, j, metric), vi, vj, theta)
    }
}

fn lag(a: &Locations, i: usize, b: &Locations, j: usize, metric: DistanceMetric) -> Lag {
    Lag { distance: a.distance_to(i, b, j, metric), time: a.time_lag(i, b, j) }
}

fn check_index(set: &Locations, i: usize) -> GeoStatResult<()> {
    if i >= set.len() {
        return Err(GeoStatError::DimensionMismatch {
            what: "location index",
            expected: set.len(),
            actual: i,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[derive(Debug)]
    struct Constant;

    impl CovarianceKernel for Constant {
        fn name(&self) -> &'static str {
            "Constant"
        }
        fn param_count(&self) -> usize {
            1
        }
        fn covariance(&self, _: Lag, _: usize, _: usize, theta: &[f64]) -> f64 {
            theta[0]
        }
    }

    #[derive(Debug)]
    struct ConstantPair;

    impl CovarianceKernel for ConstantPair {
        fn name(&self) -> &'static str {
            "ConstantPair"
        }
        fn param_count(&self) -> usize {
            2
        }
        fn covariance(&self, _: Lag, _: usize, _: usize, theta: &[f64]) -> f64 {
            theta[0]
        }
    }

    #[test]
    // Purpose
    // -------
    // Every advertised built-in is present with its documented shape.
    fn builtins_have_documented_shapes() {
        let reg = KernelRegistry::with_builtin_kernels();
        assert_eq!(reg.list().len(), 15);
        let expect = [
            ("UnivariateMaternStationary", 3, 1),
            ("UnivariateMaternNuggetsStationary", 4, 1),
            ("UnivariateMaternDdnuNu", 3, 1),
            ("UnivariateSpacetimeMaternStationary", 7, 1),
            ("BivariateMaternParsimonious", 6, 2),
            ("TrivariateMaternParsimonious", 10, 3),
            ("BivariateSpacetimeMaternStationary", 10, 2),
        ];
        for (name, params, variates) in expect {
            let k = reg.create(name, 1).expect(name);
            assert_eq!(k.name(), name);
            assert_eq!((k.param_count(), k.variates()), (params, variates), "{name}");
        }
        let bv = reg.create("BivariateMaternParsimonious", 3).expect("bv");
        assert_eq!(bv.observations_per_site(), 6);
    }

    #[test]
    // Purpose
    // -------
    // Duplicate policy: identical re-registration is a no-op, a different
    // kernel under a taken name is rejected, unknown names fail.
    fn registration_policy() {
        let mut reg = KernelRegistry::new();
        reg.register("c", || Box::new(Constant)).expect("first");
        reg.register("c", || Box::new(Constant)).expect("identical");
        assert_eq!(
            reg.register("c", || Box::new(ConstantPair)),
            Err(GeoStatError::DuplicateKernel { name: "c".to_string() })
        );
        assert_eq!(reg.create("c", 1).expect("c").name(), "Constant");
        assert!(matches!(reg.create("C", 1), Err(GeoStatError::UnknownKernel { .. })));
        assert!(matches!(reg.create("c", 0), Err(GeoStatError::InvalidTimeSlots { slots: 0 })));
    }

    #[test]
    fn evaluate_validates_theta_and_time() {
        let reg = KernelRegistry::with_builtin_kernels();
        let locs = Locations::planar(array![0.0, 1.0], array![0.0, 0.0]).expect("locs");
        let m = reg.create("UnivariateMaternStationary", 1).expect("matern");
        let sill = m.evaluate(&locs, 0, &locs, 0, &[1.0, 0.1, 0.5], DistanceMetric::Euclidean);
        assert_eq!(sill, Ok(1.0));
        assert!(matches!(
            m.evaluate(&locs, 0, &locs, 1, &[1.0, 0.1], DistanceMetric::Euclidean),
            Err(GeoStatError::InvalidParameterCount { expected: 3, actual: 2, .. })
        ));
        assert!(matches!(
            m.evaluate(&locs, 0, &locs, 1, &[1.0, f64::NAN, 0.5], DistanceMetric::Euclidean),
            Err(GeoStatError::NonFiniteParameter { index: 1, .. })
        ));
        let st = reg.create("UnivariateSpacetimeMaternStationary", 1).expect("st");
        let theta = [1.0, 0.1, 0.5, 1.0, 0.5, 0.5, 0.0];
        assert_eq!(
            st.evaluate(&locs, 0, &locs, 1, &theta, DistanceMetric::Euclidean),
            Err(GeoStatError::MissingTimeCoordinate)
        );
    }

    #[test]
    fn interleaved_element_addresses_location_and_variate() {
        let reg = KernelRegistry::with_builtin_kernels();
        let k = reg.create("BivariateMaternParsimonious", 1).expect("bv");
        let locs = Locations::planar(array![0.0, 0.5], array![0.0, 0.0]).expect("locs");
        let theta = [1.0, 4.0, 0.1, 0.5, 0.5, 0.5];
        let block =
            k.evaluate_block(&locs, 0, &locs, 1, &theta, DistanceMetric::Euclidean).expect("block");
        // Row 1 = (location 0, variate 1); column 2 = (location 1, variate 0).
        assert_eq!(k.element(&locs, 1, &locs, 2, &theta, DistanceMetric::Euclidean), block[[1, 0]]);
        assert_eq!(k.element(&locs, 3, &locs, 3, &theta, DistanceMetric::Euclidean), 4.0);
    }
}
