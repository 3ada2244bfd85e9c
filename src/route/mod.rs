//! Route generation module for run-planner
//!
//! This module turns a start point and a target loop length into two
//! calibrated walking loops and one combined, shareable route.
//!
//! # Submodules
//!
//! - [`oracle`] - Distance oracle contract and a deterministic mock
//! - [`directions`] - Google Directions implementation of the oracle
//! - [`geocode`] - Address resolution contract and Google Geocoding client
//! - [`geometry`] - Triangular loop waypoint construction
//! - [`calibrator`] - Iterative hop-length calibration against the oracle
//! - [`composer`] - Two-loop composition and leg accounting
//!
//! # Example
//!
//! ```rust,no_run
//! use run_planner::geo::GeoPoint;
//! use run_planner::route::{compose_two_loops, CalibrationParams, MockDistanceOracle};
//!
//! async fn example() -> run_planner::route::RouteResult<()> {
//!     let oracle = MockDistanceOracle::new(1.2);
//!     let start = GeoPoint::new(52.52, 13.405)?;
//!
//!     let route = compose_two_loops(&oracle, start, 6.2, 90.0, &CalibrationParams::default()).await?;
//!     println!("A: {:.2} km, B: {:.2} km", route.combined.loop_a_km, route.combined.loop_b_km);
//!     println!("{}", route.combined.link);
//!     Ok(())
//! }
//! ```

pub mod calibrator;
pub mod composer;
pub mod directions;
pub mod geocode;
pub mod geometry;
pub mod oracle;

use crate::geo::GeoError;

// Re-export commonly used types for convenience
pub use calibrator::{calibrate, CalibrationParams, CalibrationResult, Loop};
pub use composer::{build_maps_link, compose_two_loops, CombinedRoute, TwoLoopRoute};
pub use directions::GoogleDirectionsClient;
pub use geocode::{Geocoder, GoogleGeocoder};
pub use geometry::{build_loop_waypoints, build_loop_waypoints_with_turn, DEFAULT_TURN_ANGLE_DEG};
pub use oracle::{measure_route_km, DistanceOracle, Leg, MockDistanceOracle, RouteRequest};

/// Travel mode sent to the routing service and encoded in route links
pub const TRAVEL_MODE: &str = "walking";

/// Result type for route operations
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors that can occur while resolving, measuring or composing routes
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The geocoder returned no result for the address.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// The routing or geocoding service answered with a non-success status.
    #[error("Routing service returned {status}: {message}")]
    OracleStatus { status: String, message: String },

    /// Connection failure, timeout or HTTP error status.
    #[error("Routing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered, but the payload is unusable.
    #[error("Malformed routing response: {0}")]
    MalformedResponse(String),

    /// Coordinates, bearings or distances failed validation.
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeoError),

    /// A caller supplied parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl RouteError {
    /// Returns true for failures that originate from the external service.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            RouteError::OracleStatus { .. }
                | RouteError::Transport(_)
                | RouteError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = RouteError::OracleStatus {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: "quota".to_string(),
        };
        assert!(err.is_oracle_failure());
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));

        assert!(RouteError::MalformedResponse("no legs".into()).is_oracle_failure());
        assert!(!RouteError::AddressNotFound("Nowhere 1".into()).is_oracle_failure());
        assert!(!RouteError::Geometry(GeoError::InvalidLatitude(99.0)).is_oracle_failure());
    }
}
