//! Two-loop composition.
//!
//! Loop A is calibrated along the requested bearing and loop B along the
//! opposite one. Both are then routed again in a single request
//! (A.wp1, A.wp2, start, B.wp1, B.wp2, start) so that the per-loop lengths
//! and the shareable link all come from the same routing answer.

use tracing::info;

use super::calibrator::{calibrate, CalibrationParams, CalibrationResult, Loop};
use super::oracle::{DistanceOracle, Leg, RouteRequest};
use super::{RouteError, RouteResult, TRAVEL_MODE};
use crate::geo::{normalize_bearing, GeoPoint};

/// Base URL of shareable direction links
pub const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";

/// Legs of the combined route belonging to loop A
const LOOP_A_LEGS: std::ops::Range<usize> = 0..3;

/// Legs of the combined route belonging to loop B
const LOOP_B_LEGS: std::ops::Range<usize> = 3..6;

/// Loops A and B walked back to back from a shared start.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRoute {
    /// Shared start and end point
    pub start: GeoPoint,
    /// Outbound loop
    pub loop_a: Loop,
    /// Return-side loop
    pub loop_b: Loop,
    /// Every leg the oracle reported for the combined request
    pub legs: Vec<Leg>,
    /// Length of legs 0-2 in km
    pub loop_a_km: f64,
    /// Length of legs 3-5 in km
    pub loop_b_km: f64,
    /// Deep link opening the route in a mapping application
    pub link: String,
}

impl CombinedRoute {
    /// The six points visited after leaving the start.
    pub fn waypoints(&self) -> Vec<GeoPoint> {
        self.loop_a
            .waypoints
            .iter()
            .chain(self.loop_b.waypoints.iter())
            .copied()
            .collect()
    }

    /// Length of one A then B cycle in km.
    pub fn cycle_km(&self) -> f64 {
        self.loop_a_km + self.loop_b_km
    }
}

/// Both calibration outcomes plus the combined route.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLoopRoute {
    /// Calibration of the loop along the initial bearing
    pub loop_a: CalibrationResult,
    /// Calibration of the loop along the opposite bearing
    pub loop_b: CalibrationResult,
    /// Single-request measurement of A followed by B
    pub combined: CombinedRoute,
}

/// Calibrates two opposing loops and measures them as one route.
///
/// The calibrations run one after another; the combined measurement is
/// exactly one oracle call. Any oracle failure aborts without a partial
/// result.
pub async fn compose_two_loops<O>(
    oracle: &O,
    start: GeoPoint,
    target_loop_km: f64,
    initial_bearing_deg: f64,
    params: &CalibrationParams,
) -> RouteResult<TwoLoopRoute>
where
    O: DistanceOracle + ?Sized,
{
    let bearing_a = normalize_bearing(initial_bearing_deg);
    let bearing_b = normalize_bearing(bearing_a + 180.0);

    let loop_a = calibrate(oracle, start, target_loop_km, bearing_a, params).await?;
    let loop_b = calibrate(oracle, start, target_loop_km, bearing_b, params).await?;

    let combined = measure_combined(oracle, start, loop_a.waypoints, loop_b.waypoints).await?;

    info!(
        "Composed loops: A {:.2} km, B {:.2} km, cycle {:.2} km",
        combined.loop_a_km,
        combined.loop_b_km,
        combined.cycle_km()
    );

    Ok(TwoLoopRoute {
        loop_a,
        loop_b,
        combined,
    })
}

async fn measure_combined<O>(
    oracle: &O,
    start: GeoPoint,
    loop_a: Loop,
    loop_b: Loop,
) -> RouteResult<CombinedRoute>
where
    O: DistanceOracle + ?Sized,
{
    let points: Vec<GeoPoint> = loop_a
        .waypoints
        .iter()
        .chain(loop_b.waypoints.iter())
        .copied()
        .collect();

    let request = RouteRequest::walking(start, &points, true)?;
    let legs = oracle.route_legs(&request).await?;

    // The trailing start -> start leg is zero length and belongs to neither loop
    if legs.len() != request.expected_legs() {
        return Err(RouteError::MalformedResponse(format!(
            "combined route expected {} legs, got {}",
            request.expected_legs(),
            legs.len()
        )));
    }

    let loop_a_km = sum_legs_km(&legs, LOOP_A_LEGS);
    let loop_b_km = sum_legs_km(&legs, LOOP_B_LEGS);
    let link = build_maps_link(start, &points);

    Ok(CombinedRoute {
        start,
        loop_a,
        loop_b,
        legs,
        loop_a_km,
        loop_b_km,
        link,
    })
}

fn sum_legs_km(legs: &[Leg], range: std::ops::Range<usize>) -> f64 {
    legs[range].iter().map(Leg::km).sum()
}

/// Builds a walking directions deep link from `start` back to `start`
/// through `waypoints`, listed as `lat,lng|lat,lng|...`.
///
/// # Example
///
/// ```rust
/// use run_planner::geo::GeoPoint;
/// use run_planner::route::build_maps_link;
///
/// let start = GeoPoint::new(1.0, 2.0).unwrap();
/// let wp = GeoPoint::new(1.5, 2.5).unwrap();
/// let link = build_maps_link(start, &[wp, start]);
/// assert!(link.ends_with("&waypoints=1.5,2.5|1,2"));
/// ```
pub fn build_maps_link(start: GeoPoint, waypoints: &[GeoPoint]) -> String {
    let origin = start.to_query_value();
    let waypoints = waypoints
        .iter()
        .map(GeoPoint::to_query_value)
        .collect::<Vec<_>>()
        .join("|");

    format!(
        "{}?api=1&origin={}&destination={}&travelmode={}&waypoints={}",
        MAPS_DIR_URL, origin, origin, TRAVEL_MODE, waypoints
    )
}
