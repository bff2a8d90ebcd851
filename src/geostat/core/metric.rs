//! Distance metrics and spatial dimensions.
//!
//! Purpose
//! -------
//! Enumerate the distance metrics understood by kernel evaluation and the
//! spatial layouts understood by the location generator, with
//! case-insensitive parsing from the strings used by configuration files and
//! the Python surface.
//!
//! Conventions
//! -----------
//! - `GreatCircle` interprets `x` as longitude and `y` as latitude, both in
//!   degrees, and returns kilometres on a sphere of radius
//!   [`EARTH_RADIUS_KM`]. Elevation is ignored for this metric.
//! - `Euclidean` and `Manhattan` include the elevation difference when both
//!   points carry one.
use crate::geostat::errors::{GeoStatError, GeoStatResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point as seen by a metric: planar coordinates plus optional elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

/// Distance metric between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    GreatCircle,
}

impl DistanceMetric {
    /// Non-negative distance between `a` and `b`.
    pub fn distance(&self, a: Point, b: Point) -> f64 {
        let dz = match (a.z, b.z) {
            (Some(za), Some(zb)) => za - zb,
            _ => 0.0,
        };
        match self {
            DistanceMetric::Euclidean => {
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                (dx * dx + dy * dy + dz * dz).sqrt()
            }
            DistanceMetric::Manhattan => (a.x - b.x).abs() + (a.y - b.y).abs() + dz.abs(),
            DistanceMetric::GreatCircle => haversine_km(a.x, a.y, b.x, b.y),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = GeoStatError;

    fn from_str(s: &str) -> GeoStatResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "eu" => Ok(DistanceMetric::Euclidean),
            "manhattan" => Ok(DistanceMetric::Manhattan),
            "great_circle" | "greatcircle" | "earth" | "gc" => Ok(DistanceMetric::GreatCircle),
            _ => Err(GeoStatError::InvalidMetric { name: s.to_string() }),
        }
    }
}

/// Spatial layout of a location set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimension {
    #[default]
    TwoD,
    ThreeD,
    SpaceTime,
}

impl FromStr for Dimension {
    type Err = GeoStatError;

    fn from_str(s: &str) -> GeoStatResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2d" => Ok(Dimension::TwoD),
            "3d" => Ok(Dimension::ThreeD),
            "st" | "spacetime" | "space_time" => Ok(Dimension::SpaceTime),
            _ => Err(GeoStatError::InvalidDimension { name: s.to_string() }),
        }
    }
}

fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();
    let h = (0.5 * dphi).sin().powi(2) + phi1.cos() * phi2.cos() * (0.5 * dlambda).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
