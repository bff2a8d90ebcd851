//! tiles — tile layout, storage, tiled matrices and the task runtime.
//!
//! Purpose
//! -------
//! Provide the data structures the covariance builder and the factorization
//! engine schedule their per-tile tasks on.
//!
//! Key behaviors
//! -------------
//! - [`TileLayout`] cuts a logical matrix into `tile_size` tiles and lists
//!   the visit set of a [`MatrixPart`].
//! - [`TiledMatrix`] stores each tile separately, in memory or one file per
//!   tile ([`StorageMode`]), and runs parallel per-tile updates.
//! - [`TaskRuntime`] owns the rayon worker pool every parallel operation is
//!   installed on.
//!
//! Invariants & assumptions
//! ------------------------
//! - Distinct tiles never alias; a task only ever holds `&mut` to its own
//!   tile, so no locks are needed.
//! - Storage mode never changes stored values.

pub mod layout;
pub mod matrix;
pub mod runtime;
pub mod storage;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::layout::{MatrixPart, TileLayout};
pub use self::matrix::TiledMatrix;
pub use self::runtime::TaskRuntime;
pub use self::storage::StorageMode;
