//! core — locations, metrics, data containers and run configuration.
//!
//! Purpose
//! -------
//! Collect the validated value types the rest of the geostatistics stack
//! builds on: location sets and distance metrics, the synthetic location
//! generator, observed data and [`GeoStatOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every container validates on construction and is immutable afterwards,
//!   so kernel evaluation and tile tasks can share it by reference.
//! - Coordinates and observations are finite.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; multivariate observations are interleaved per
//!   location.
//! - This module performs no I/O.

pub mod data;
pub mod generator;
pub mod locations;
pub mod metric;
pub mod options;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::GeoData;
pub use self::generator::generate_locations;
pub use self::locations::Locations;
pub use self::metric::{Dimension, DistanceMetric};
pub use self::options::GeoStatOptions;
