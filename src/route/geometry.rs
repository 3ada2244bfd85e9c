//! Triangular loop construction.
//!
//! A loop is start -> wp1 -> wp2 -> start. wp1 lies one hop away along the
//! bearing, wp2 one more hop away after turning by a fixed angle. The router
//! closes the triangle back to the start.

use super::{RouteError, RouteResult};
use crate::geo::{normalize_bearing, project, GeoPoint};

/// Default turn between the first and second hop in degrees
pub const DEFAULT_TURN_ANGLE_DEG: f64 = 60.0;

/// Builds the two intermediate waypoints of a loop with the default turn.
pub fn build_loop_waypoints(
    start: GeoPoint,
    hop_km: f64,
    bearing_deg: f64,
) -> RouteResult<(GeoPoint, GeoPoint)> {
    build_loop_waypoints_with_turn(start, hop_km, bearing_deg, DEFAULT_TURN_ANGLE_DEG)
}

/// Builds the two intermediate waypoints of a loop.
///
/// `hop_km` must be positive and finite.
pub fn build_loop_waypoints_with_turn(
    start: GeoPoint,
    hop_km: f64,
    bearing_deg: f64,
    turn_angle_deg: f64,
) -> RouteResult<(GeoPoint, GeoPoint)> {
    if !hop_km.is_finite() || hop_km <= 0.0 {
        return Err(RouteError::InvalidParameter(format!(
            "hop length must be positive, got {} km",
            hop_km
        )));
    }

    let hop_m = hop_km * 1000.0;
    let first = normalize_bearing(bearing_deg);
    let second = normalize_bearing(bearing_deg + turn_angle_deg);

    let wp1 = project(start, first, hop_m)?;
    let wp2 = project(wp1, second, hop_m)?;
    Ok((wp1, wp2))
}
