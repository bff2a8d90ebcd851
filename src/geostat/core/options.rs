//! Run configuration for Gaussian-field estimation and prediction.
//!
//! Purpose
//! -------
//! Collect the knobs shared by data generation, estimation and prediction
//! in one validated value: problem size, tiling, kernel and metric choice,
//! layout, reproducibility seed, worker count, storage mode and optimizer
//! options.
//!
//! Invariants & assumptions
//! ------------------------
//! - `problem_size` counts **sites**. A generated set holds
//!   `problem_size × time_slots` location entries and
//!   `problem_size × p` observations, with `p = variates × time_slots`.
//! - `tile_size`, `threads` and both process-grid extents are positive.
//! - `time_slots == 1` unless `dimension == Dimension::SpaceTime`.
//! - The process grid is recorded layout metadata only; tiles are scheduled
//!   on the local [`TaskRuntime`](crate::geostat::tiles::TaskRuntime).
//!
//! Conventions
//! -----------
//! - The kernel name is resolved against a registry when a
//!   [`GeoStat`](crate::geostat::GeoStat) is built, not here.
use crate::{
    geostat::{
        core::metric::{Dimension, DistanceMetric},
        errors::{GeoStatError, GeoStatResult},
        tiles::StorageMode,
    },
    optimization::loglik_optimizer::MLEOptions,
};

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoStatOptions {
    pub problem_size: usize,
    pub tile_size: usize,
    pub process_grid: (usize, usize),
    pub kernel: String,
    pub metric: DistanceMetric,
    pub dimension: Dimension,
    pub time_slots: usize,
    pub seed: u64,
    pub threads: usize,
    pub storage: StorageMode,
    pub mle: MLEOptions,
}

impl GeoStatOptions {
    /// Errors
    /// ------
    /// - `InvalidProblemSize` when `problem_size == 0`.
    /// - `InvalidTileSize` when `tile_size == 0`.
    /// - `InvalidTimeSlots` for zero slots, or several slots outside a
    ///   space-time layout.
    pub fn new(
        problem_size: usize, tile_size: usize, kernel: &str, metric: DistanceMetric,
        dimension: Dimension, time_slots: usize,
    ) -> GeoStatResult<Self> {
        if problem_size == 0 {
            return Err(GeoStatError::InvalidProblemSize {
                size: problem_size,
                reason: "need at least one site",
            });
        }
        if tile_size == 0 {
            return Err(GeoStatError::InvalidTileSize { tile_size });
        }
        if time_slots == 0 || (dimension != Dimension::SpaceTime && time_slots != 1) {
            return Err(GeoStatError::InvalidTimeSlots { slots: time_slots });
        }
        Ok(GeoStatOptions {
            problem_size,
            tile_size,
            kernel: kernel.to_string(),
            metric,
            dimension,
            time_slots,
            ..GeoStatOptions::default()
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> GeoStatResult<Self> {
        if threads == 0 {
            return Err(GeoStatError::InvalidThreadCount { threads });
        }
        self.threads = threads;
        Ok(self)
    }

    pub fn with_storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_mle(mut self, mle: MLEOptions) -> Self {
        self.mle = mle;
        self
    }

    pub fn with_process_grid(mut self, p: usize, q: usize) -> GeoStatResult<Self> {
        if p == 0 || q == 0 {
            return Err(GeoStatError::InvalidLayout {
                rows: p,
                cols: q,
                reason: "empty process grid",
            });
        }
        self.process_grid = (p, q);
        Ok(self)
    }
}

impl Default for GeoStatOptions {
    /// 2D univariate Matérn on 400 sites, tile size 64, Euclidean distance,
    /// one worker, in-memory tiles and default optimizer options.
    fn default() -> Self {
        GeoStatOptions {
            problem_size: 400,
            tile_size: 64,
            process_grid: (1, 1),
            kernel: "UnivariateMaternStationary".to_string(),
            metric: DistanceMetric::Euclidean,
            dimension: Dimension::TwoD,
            time_slots: 1,
            seed: 0,
            threads: 1,
            storage: StorageMode::InMemory,
            mle: MLEOptions::default(),
        }
    }
}
