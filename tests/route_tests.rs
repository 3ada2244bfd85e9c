//! Integration tests for the route module
//!
//! Tests for loop calibration and two-loop composition against the
//! in-memory distance oracle.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use run_planner::geo::{distance_m, GeoPoint};
use run_planner::route::{
    calibrate, compose_two_loops, CalibrationParams, DistanceOracle, Leg, MockDistanceOracle,
    RouteError, RouteRequest, RouteResult,
};

/// Oracle whose closed loop measures exactly `k` times the hop length.
struct HopScaledOracle {
    k: f64,
    calls: Mutex<usize>,
}

impl HopScaledOracle {
    fn new(k: f64) -> Self {
        Self {
            k,
            calls: Mutex::new(0),
        }
    }

    fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl DistanceOracle for HopScaledOracle {
    async fn route_legs(&self, request: &RouteRequest) -> RouteResult<Vec<Leg>> {
        *self.calls.lock() += 1;
        let hop_m = distance_m(request.origin, request.waypoints[0]);
        let third = Leg::new(self.k * hop_m / 3.0);
        Ok(vec![third; request.expected_legs()])
    }
}

fn berlin() -> GeoPoint {
    GeoPoint::new(52.5163, 13.3777).unwrap()
}

// ============================================================================
// Calibration Tests
// ============================================================================

#[tokio::test]
async fn test_calibration_converges_when_loop_scales_with_hop() {
    let mut rng = rand::thread_rng();
    let params = CalibrationParams::default();

    for _ in 0..20 {
        let k: f64 = rng.gen_range(2.5..=3.5);
        let target: f64 = rng.gen_range(3.0..15.0);
        let bearing: f64 = rng.gen_range(-360.0..720.0);
        let oracle = HopScaledOracle::new(k);

        let result = calibrate(&oracle, berlin(), target, bearing, &params)
            .await
            .unwrap();

        assert!(result.converged, "k={} target={}", k, target);
        assert!(result.error_km(target).abs() <= params.tol_km);
        assert!((result.measured_km - k * result.hop_km_used).abs() < 1e-3);
        assert!(oracle.call_count() <= params.max_iters as usize + 1);
    }
}

#[tokio::test]
async fn test_calibration_converges_for_street_detours() {
    let mut rng = rand::thread_rng();
    let params = CalibrationParams::default();
    // Straight-line closed loop: two hops plus a sqrt(3) hop closing side
    let straight_hops = 2.0 + 3.0_f64.sqrt();

    for _ in 0..20 {
        let k: f64 = rng.gen_range(2.5..=3.5);
        let target: f64 = rng.gen_range(3.0..15.0);
        let oracle = MockDistanceOracle::new(k / straight_hops);

        let result = calibrate(&oracle, berlin(), target, 0.0, &params)
            .await
            .unwrap();

        assert!(result.converged, "k={} target={}", k, target);
        assert!(result.error_km(target).abs() <= params.tol_km);
        assert_eq!(oracle.call_count(), result.iterations as usize + 1);
    }
}

#[tokio::test]
async fn test_calibration_loop_is_closed() {
    let oracle = MockDistanceOracle::new(1.0);
    let params = CalibrationParams::default();

    let result = calibrate(&oracle, berlin(), 6.0, 0.0, &params).await.unwrap();

    assert_eq!(result.waypoints.start(), berlin());
    for request in oracle.requests() {
        assert_eq!(request.origin, berlin());
        assert_eq!(request.destination, berlin());
        assert_eq!(request.waypoints.len(), 2);
    }

    // wp1 lies one hop due north of the start
    let hop_m = distance_m(berlin(), result.waypoints.wp1());
    assert!((hop_m / 1000.0 - result.hop_km_used).abs() < 1e-3);
    assert!(result.waypoints.wp1().lat > berlin().lat);
}

#[tokio::test]
async fn test_calibration_never_exceeds_budget() {
    // Far too long detours: the scale clamp keeps the search from converging
    let oracle = MockDistanceOracle::new(50.0);
    let params = CalibrationParams::default().with_max_iters(4);

    let result = calibrate(&oracle, berlin(), 6.0, 90.0, &params).await.unwrap();

    assert!(!result.converged);
    assert_eq!(result.iterations, 4);
    assert_eq!(oracle.call_count(), 5);
    assert!(result.measured_km > 6.0);
}

#[tokio::test]
async fn test_calibration_propagates_oracle_failure() {
    let oracle = MockDistanceOracle::new(1.0)
        .with_failure("OVER_QUERY_LIMIT", "quota exceeded")
        .failing_from_call(2);
    let params = CalibrationParams::default().with_tolerance(0.0001);

    let err = calibrate(&oracle, berlin(), 6.0, 45.0, &params)
        .await
        .unwrap_err();

    assert!(err.is_oracle_failure());
    assert_eq!(oracle.call_count(), 2);
}

// ============================================================================
// Composition Tests
// ============================================================================

#[tokio::test]
async fn test_composition_measures_both_loops_in_one_call() {
    let oracle = MockDistanceOracle::new(1.05);
    let params = CalibrationParams::default();

    let route = compose_two_loops(&oracle, berlin(), 6.2, 30.0, &params)
        .await
        .unwrap();

    let calibration_calls = route.loop_a.iterations as usize + route.loop_b.iterations as usize + 2;
    assert_eq!(oracle.call_count(), calibration_calls + 1);

    let requests = oracle.requests();
    let combined = requests.last().unwrap();
    assert_eq!(combined.origin, berlin());
    assert_eq!(combined.destination, berlin());
    assert_eq!(combined.waypoints, route.combined.waypoints());
    assert_eq!(combined.waypoints.len(), 6);

    assert!((route.combined.loop_a_km - 6.2).abs() <= 0.3);
    assert!((route.combined.loop_b_km - 6.2).abs() <= 0.3);
    assert!(route.combined.link.starts_with("https://www.google.com/maps/dir/?api=1"));
}

#[tokio::test]
async fn test_composition_loops_point_away_from_each_other() {
    let oracle = MockDistanceOracle::new(1.0);
    let params = CalibrationParams::default();

    let route = compose_two_loops(&oracle, berlin(), 6.0, 90.0, &params)
        .await
        .unwrap();

    // Loop A heads east, loop B heads west
    assert!(route.loop_a.waypoints.wp1().lng > berlin().lng);
    assert!(route.loop_b.waypoints.wp1().lng < berlin().lng);
}

#[tokio::test]
async fn test_composition_failure_leaves_no_partial_result() {
    let params = CalibrationParams::default();

    let healthy = MockDistanceOracle::new(1.0);
    compose_two_loops(&healthy, berlin(), 6.0, 0.0, &params)
        .await
        .unwrap();
    let combined_call = healthy.call_count();

    // Same inputs, but the combined measurement fails
    let oracle = MockDistanceOracle::new(1.0)
        .with_failure("UNKNOWN_ERROR", "backend unavailable")
        .failing_from_call(combined_call);

    let err = compose_two_loops(&oracle, berlin(), 6.0, 0.0, &params)
        .await
        .unwrap_err();

    assert!(matches!(err, RouteError::OracleStatus { ref status, .. } if status == "UNKNOWN_ERROR"));
    assert_eq!(oracle.call_count(), combined_call);
}

#[tokio::test]
async fn test_composition_rejects_short_leg_list() {
    let params = CalibrationParams::default();

    let healthy = MockDistanceOracle::new(1.0);
    compose_two_loops(&healthy, berlin(), 6.0, 0.0, &params)
        .await
        .unwrap();
    let combined_call = healthy.call_count();

    // Only the combined answer comes back one leg short
    let oracle = MockDistanceOracle::new(1.0)
        .with_dropped_legs(1)
        .failing_from_call(combined_call);

    let result = compose_two_loops(&oracle, berlin(), 6.0, 0.0, &params).await;

    assert!(matches!(result, Err(RouteError::MalformedResponse(_))));
    assert_eq!(oracle.call_count(), combined_call);
}
