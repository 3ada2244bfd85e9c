//! Loop length calibration.
//!
//! Straight-line geometry says little about how far a loop is on foot, so
//! the hop length is tuned against the distance oracle: build a loop,
//! measure it, scale the hop by `target / measured` (clamped to
//! `[0.6, 1.4]`), repeat. The search is bounded by `max_iters` and always
//! returns its last candidate, converged or not.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::geometry::{build_loop_waypoints_with_turn, DEFAULT_TURN_ANGLE_DEG};
use super::oracle::{measure_route_km, DistanceOracle};
use super::{RouteError, RouteResult};
use crate::geo::{normalize_bearing, GeoError, GeoPoint};

/// Lower bound of the per-iteration hop scale
pub const MIN_SCALE: f64 = 0.6;

/// Upper bound of the per-iteration hop scale
pub const MAX_SCALE: f64 = 1.4;

/// Measured lengths below this are treated as this when computing the scale
pub const MIN_MEASURED_KM: f64 = 0.3;

/// Tuning knobs of the calibration search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Maximum number of measure-and-adjust rounds.
    pub max_iters: u32,

    /// Accepted distance between measured and target loop length in km.
    pub tol_km: f64,

    /// Turn between the first and second hop in degrees.
    pub turn_angle_deg: f64,

    /// Initial hop is the target loop length divided by this.
    pub hop_divisor: f64,

    /// Initial hop never starts below this many km.
    pub min_hop_km: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            max_iters: 6,
            tol_km: 0.2,
            turn_angle_deg: DEFAULT_TURN_ANGLE_DEG,
            hop_divisor: 3.0,
            min_hop_km: 0.8,
        }
    }
}

impl CalibrationParams {
    /// Sets the iteration budget.
    pub fn with_max_iters(mut self, max_iters: u32) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the convergence tolerance in km.
    pub fn with_tolerance(mut self, tol_km: f64) -> Self {
        self.tol_km = tol_km;
        self
    }

    /// First hop length for a target loop.
    pub fn initial_hop_km(&self, target_loop_km: f64) -> f64 {
        self.min_hop_km.max(target_loop_km / self.hop_divisor)
    }
}

/// A closed loop: `[wp1, wp2, start]`, walked from and back to `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    /// The three points in travel order after the start
    pub waypoints: [GeoPoint; 3],
}

impl Loop {
    /// Creates a loop from its two waypoints and the shared start.
    pub fn new(wp1: GeoPoint, wp2: GeoPoint, start: GeoPoint) -> Self {
        Self {
            waypoints: [wp1, wp2, start],
        }
    }

    /// First waypoint.
    pub fn wp1(&self) -> GeoPoint {
        self.waypoints[0]
    }

    /// Second waypoint.
    pub fn wp2(&self) -> GeoPoint {
        self.waypoints[1]
    }

    /// Start and end of the loop.
    pub fn start(&self) -> GeoPoint {
        self.waypoints[2]
    }
}

/// Outcome of one calibration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    /// Final loop geometry
    pub waypoints: Loop,
    /// Loop length reported by the oracle for the final geometry
    pub measured_km: f64,
    /// Hop length the final geometry was built with
    pub hop_km_used: f64,
    /// Number of search rounds that queried the oracle
    pub iterations: u32,
    /// Whether a search round landed within tolerance
    pub converged: bool,
}

impl CalibrationResult {
    /// Absolute distance between the measured and the requested length.
    pub fn error_km(&self, target_loop_km: f64) -> f64 {
        (self.measured_km - target_loop_km).abs()
    }
}

/// Searches for a hop length whose loop measures `target_loop_km`.
///
/// Issues at most `params.max_iters` search queries plus one final
/// measurement of the chosen loop. Oracle failures abort immediately.
/// Running out of iterations is not an error: the last candidate is
/// returned and [`CalibrationResult::converged`] is false.
pub async fn calibrate<O>(
    oracle: &O,
    start: GeoPoint,
    target_loop_km: f64,
    bearing_deg: f64,
    params: &CalibrationParams,
) -> RouteResult<CalibrationResult>
where
    O: DistanceOracle + ?Sized,
{
    start.validate()?;
    if !target_loop_km.is_finite() || target_loop_km <= 0.0 {
        return Err(RouteError::InvalidParameter(format!(
            "target loop length must be positive, got {} km",
            target_loop_km
        )));
    }
    if !bearing_deg.is_finite() {
        return Err(GeoError::InvalidBearing(bearing_deg).into());
    }
    if !params.hop_divisor.is_finite() || params.hop_divisor <= 0.0 {
        return Err(RouteError::InvalidParameter(format!(
            "hop divisor must be positive, got {}",
            params.hop_divisor
        )));
    }

    let bearing = normalize_bearing(bearing_deg);
    let mut hop_km = params.initial_hop_km(target_loop_km);
    let mut last_hop_km = hop_km;
    let mut iterations = 0;
    let mut converged = false;

    for round in 1..=params.max_iters {
        let (wp1, wp2) =
            build_loop_waypoints_with_turn(start, hop_km, bearing, params.turn_angle_deg)?;
        let loop_km = measure_route_km(oracle, start, &[wp1, wp2], true).await?;
        iterations = round;
        last_hop_km = hop_km;

        let err = target_loop_km - loop_km;
        debug!(
            "Calibration round {} (bearing {:.0}°): hop {:.3} km -> loop {:.3} km (error {:+.3} km)",
            round, bearing, hop_km, loop_km, err
        );

        if err.abs() <= params.tol_km {
            converged = true;
            break;
        }

        let scale = (target_loop_km / loop_km.max(MIN_MEASURED_KM)).clamp(MIN_SCALE, MAX_SCALE);
        hop_km *= scale;
    }

    let (wp1, wp2) =
        build_loop_waypoints_with_turn(start, last_hop_km, bearing, params.turn_angle_deg)?;
    let measured_km = measure_route_km(oracle, start, &[wp1, wp2], true).await?;

    if converged {
        info!(
            "Loop at {:.0}° calibrated to {:.2} km in {} rounds",
            bearing, measured_km, iterations
        );
    } else {
        warn!(
            "Loop at {:.0}° did not converge after {} rounds: {:.2} km for a {:.2} km target",
            bearing, iterations, measured_km, target_loop_km
        );
    }

    Ok(CalibrationResult {
        waypoints: Loop::new(wp1, wp2, start),
        measured_km,
        hop_km_used: last_hop_km,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::MockDistanceOracle;

    fn start() -> GeoPoint {
        GeoPoint::new(51.5074, -0.1278).unwrap()
    }

    #[test]
    fn test_default_params() {
        let params = CalibrationParams::default();
        assert_eq!(params.max_iters, 6);
        assert_eq!(params.tol_km, 0.2);
        assert_eq!(params.turn_angle_deg, 60.0);
        assert_eq!(params.initial_hop_km(6.0), 2.0);
        assert_eq!(params.initial_hop_km(1.5), 0.8);
    }

    #[tokio::test]
    async fn test_converges_with_linear_oracle() {
        let oracle = MockDistanceOracle::new(1.1);
        let params = CalibrationParams::default();

        let result = calibrate(&oracle, start(), 6.2, 45.0, &params).await.unwrap();

        assert!(result.converged);
        assert!(result.error_km(6.2) <= params.tol_km);
        assert_eq!(result.waypoints.start(), start());
        assert_eq!(oracle.call_count(), result.iterations as usize + 1);
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_last_candidate() {
        // A huge detour needs several clamped steps; one round is not enough
        let oracle = MockDistanceOracle::new(4.0);
        let params = CalibrationParams::default().with_max_iters(1);

        let result = calibrate(&oracle, start(), 6.0, 0.0, &params).await.unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.hop_km_used, 2.0);
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_measures_initial_guess() {
        let oracle = MockDistanceOracle::new(1.0);
        let params = CalibrationParams::default().with_max_iters(0);

        let result = calibrate(&oracle, start(), 9.0, 0.0, &params).await.unwrap();

        assert_eq!(result.iterations, 0);
        assert_eq!(result.hop_km_used, 3.0);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let oracle = MockDistanceOracle::new(1.0);
        let params = CalibrationParams::default();

        assert!(matches!(
            calibrate(&oracle, start(), 0.0, 0.0, &params).await,
            Err(RouteError::InvalidParameter(_))
        ));
        assert!(matches!(
            calibrate(&oracle, start(), 5.0, f64::NAN, &params).await,
            Err(RouteError::Geometry(_))
        ));

        let broken = GeoPoint { lat: f64::NAN, lng: 0.0 };
        assert!(matches!(
            calibrate(&oracle, broken, 5.0, 0.0, &params).await,
            Err(RouteError::Geometry(_))
        ));
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_aborts() {
        let oracle = MockDistanceOracle::new(1.0).with_failure("UNKNOWN_ERROR", "server hiccup");
        let err = calibrate(&oracle, start(), 6.0, 0.0, &CalibrationParams::default())
            .await
            .unwrap_err();

        assert!(err.is_oracle_failure());
        assert_eq!(oracle.call_count(), 1);
    }
}
