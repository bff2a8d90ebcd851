//! Gaussian random field model wired to the `LogLikelihood` trait.
//!
//! [`GaussianFieldModel`] pairs a [`FieldSpec`] (kernel, metric, tiling and
//! storage) with the [`TaskRuntime`] its tile tasks run on. Each `value`
//! call evaluates `ℓ(θ)` from scratch: build `Σ(θ)`, factor it, read off the
//! log-determinant and the quadratic form. A covariance that is not
//! positive definite is reported as `ℓ = −∞`, which the optimizer treats as
//! a rejected point.
use crate::{
    geostat::{
        core::{data::GeoData, metric::DistanceMetric},
        errors::{GeoStatError, GeoStatResult},
        kernels::Kernel,
        linalg::likelihood::LikelihoodContext,
        tiles::{StorageMode, TaskRuntime},
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{LogLikelihood, Theta},
    },
};

/// Everything besides `θ` and the data that fixes a field model.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub kernel: Kernel,
    pub metric: DistanceMetric,
    pub tile_size: usize,
    pub storage: StorageMode,
}

impl FieldSpec {
    /// Errors
    /// ------
    /// - `InvalidTileSize` when `tile_size == 0`.
    pub fn new(
        kernel: Kernel, metric: DistanceMetric, tile_size: usize, storage: StorageMode,
    ) -> GeoStatResult<Self> {
        if tile_size == 0 {
            return Err(GeoStatError::InvalidTileSize { tile_size });
        }
        Ok(FieldSpec { kernel, metric, tile_size, storage })
    }

    /// Check that `data` fits the kernel: matching variate count and a time
    /// column when the kernel reads time lags.
    pub fn check_data(&self, data: &GeoData) -> GeoStatResult<()> {
        if data.variates() != self.kernel.variates() {
            return Err(GeoStatError::DimensionMismatch {
                what: "variates",
                expected: self.kernel.variates(),
                actual: data.variates(),
            });
        }
        self.kernel.check_locations(&[data.locations()])
    }

    /// `ℓ(θ)` for `data`; `−∞` when `Σ(θ)` is not positive definite.
    pub fn log_likelihood(
        &self, rt: &TaskRuntime, theta: &[f64], data: &GeoData,
    ) -> GeoStatResult<f64> {
        self.check_data(data)?;
        let ctx = LikelihoodContext {
            locations: data.locations(),
            observations: data.observations(),
            kernel: &self.kernel,
            metric: self.metric,
            tile_size: self.tile_size,
            storage: &self.storage,
        };
        ctx.evaluate(rt, theta)
    }
}

/// Field model bound to a runtime, ready for [`maximize`].
///
/// [`maximize`]: crate::optimization::loglik_optimizer::maximize
#[derive(Debug, Clone, Copy)]
pub struct GaussianFieldModel<'a> {
    pub runtime: &'a TaskRuntime,
    pub spec: &'a FieldSpec,
}

impl<'a> GaussianFieldModel<'a> {
    pub fn new(runtime: &'a TaskRuntime, spec: &'a FieldSpec) -> Self {
        GaussianFieldModel { runtime, spec }
    }
}

impl LogLikelihood for GaussianFieldModel<'_> {
    type Data = GeoData;

    /// Build → factorize → likelihood at `θ`; one fresh covariance per call.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        Ok(self.spec.log_likelihood(self.runtime, &theta.to_vec(), data)?)
    }

    /// Validate `θ` against the kernel and `data` against the spec.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        self.spec.kernel.check_theta(&theta.to_vec())?;
        self.spec.check_data(data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geostat::{core::locations::Locations, kernels::KernelRegistry},
        optimization::errors::OptError,
    };
    use ndarray::array;

    fn spec(name: &str) -> FieldSpec {
        let kernel = KernelRegistry::with_builtin_kernels().create(name, 1).expect("kernel");
        FieldSpec::new(kernel, DistanceMetric::Euclidean, 2, StorageMode::InMemory).expect("spec")
    }

    fn data() -> GeoData {
        let locs = Locations::planar(array![0.0, 0.5, 1.0], array![0.0, 0.5, 0.0]).expect("locs");
        GeoData::new(locs, array![0.2, -0.1, 0.4], 1).expect("data")
    }

    #[test]
    // Purpose
    // -------
    // The trait entry points agree with `FieldSpec::log_likelihood` and
    // reject malformed inputs through `check`.
    fn trait_value_matches_direct_evaluation() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let spec = spec("UnivariateMaternStationary");
        let model = GaussianFieldModel::new(&rt, &spec);
        let d = data();
        let theta = array![1.0, 0.3, 0.5];
        let direct = spec.log_likelihood(&rt, &theta.to_vec(), &d).expect("ll");
        assert_eq!(model.value(&theta, &d).expect("value"), direct);
        assert!(model.check(&theta, &d).is_ok());
        assert_eq!(
            model.check(&array![1.0, 0.3], &d),
            Err(OptError::ThetaLengthMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn variate_mismatch_is_rejected() {
        let rt = TaskRuntime::new(1).expect("runtime");
        let spec = spec("BivariateMaternParsimonious");
        let theta = [1.0, 1.0, 0.3, 0.5, 0.5, 0.2];
        assert!(matches!(
            spec.log_likelihood(&rt, &theta, &data()),
            Err(GeoStatError::DimensionMismatch { what: "variates", expected: 2, actual: 1 })
        ));
        let kernel = spec.kernel.clone();
        let zero_tiles =
            FieldSpec::new(kernel, DistanceMetric::Euclidean, 0, StorageMode::InMemory);
        assert!(zero_tiles.is_err());
    }
}
