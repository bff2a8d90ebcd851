//! Task runtime: the worker pool every tile-parallel operation runs on.
//!
//! A [`TaskRuntime`] is created by the caller, passed by reference to the
//! builder, the factorization and the solves, and releases its workers when
//! dropped. No operation spawns threads on the global rayon pool.
use crate::geostat::errors::{GeoStatError, GeoStatResult};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Owned rayon thread pool with a fixed worker count.
#[derive(Debug)]
pub struct TaskRuntime {
    pool: ThreadPool,
    threads: usize,
}

impl TaskRuntime {
    /// Start a runtime with `threads` workers.
    ///
    /// Errors
    /// ------
    /// - `InvalidThreadCount` when `threads == 0`.
    /// - `RuntimeInit` when the pool cannot be built.
    pub fn new(threads: usize) -> GeoStatResult<Self> {
        if threads == 0 {
            return Err(GeoStatError::InvalidThreadCount { threads });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("geostat-worker-{i}"))
            .build()
            .map_err(|e| GeoStatError::RuntimeInit { reason: e.to_string() })?;
        Ok(TaskRuntime { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `op` inside the pool; rayon parallel iterators used by `op` are
    /// scheduled on this runtime's workers.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
