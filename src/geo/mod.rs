//! Geographic primitives for route generation.
//!
//! This module provides the coordinate type used across the planner and the
//! spherical-Earth math the loop builder relies on:
//! - [`GeoPoint`] - validated latitude/longitude pair
//! - [`normalize_bearing`] - bearing reduction into `[0, 360)`
//! - [`project`] - forward geodesic (point + bearing + distance)
//! - [`distance_m`] - inverse great-circle distance
//!
//! # Example
//!
//! ```rust
//! use run_planner::geo::{project, distance_m, GeoPoint};
//!
//! let start = GeoPoint::new(52.52, 13.405).unwrap();
//! let north = project(start, 0.0, 1_000.0).unwrap();
//! assert!((distance_m(start, north) - 1_000.0).abs() < 1.0);
//! ```

pub mod point;
pub mod projection;

pub use point::GeoPoint;
pub use projection::{distance_m, normalize_bearing, project, EARTH_RADIUS_M};

/// Result type for geometry operations
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors raised when coordinates, bearings or distances are unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside `[-180, 180]` or not finite.
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Bearing is NaN or infinite.
    #[error("Invalid bearing: {0}")]
    InvalidBearing(f64),

    /// Distance is negative, NaN or infinite.
    #[error("Invalid distance: {0} m")]
    InvalidDistance(f64),
}
