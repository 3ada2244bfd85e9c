//! Distance oracle abstraction.
//!
//! The oracle is the external routing service that measures the real
//! travelled distance along an ordered list of points. It sits behind a
//! trait so the calibrator and composer can run against a deterministic
//! mock in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use run_planner::route::{measure_route_km, MockDistanceOracle};
//!
//! let oracle = MockDistanceOracle::new(1.0);
//! let km = measure_route_km(&oracle, start, &[wp1, wp2], true).await?;
//! assert_eq!(oracle.call_count(), 1);
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::{RouteError, RouteResult};
use crate::geo::{distance_m, GeoPoint};

/// One routed edge between two consecutive points of a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Travelled distance in meters
    pub distance_m: f64,
}

impl Leg {
    /// Creates a leg from a distance in meters.
    pub fn new(distance_m: f64) -> Self {
        Self { distance_m }
    }

    /// Leg distance in kilometers.
    pub fn km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

/// A pedestrian routing query: origin, ordered intermediate waypoints and
/// a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Where the route starts
    pub origin: GeoPoint,
    /// Intermediate points, visited in order
    pub waypoints: Vec<GeoPoint>,
    /// Where the route ends
    pub destination: GeoPoint,
}

impl RouteRequest {
    /// Builds a request visiting `points` in order after `origin`.
    ///
    /// With `close_loop` the route returns to `origin`; otherwise the last
    /// point becomes the destination.
    pub fn walking(origin: GeoPoint, points: &[GeoPoint], close_loop: bool) -> RouteResult<Self> {
        if close_loop {
            return Ok(Self {
                origin,
                waypoints: points.to_vec(),
                destination: origin,
            });
        }

        let (destination, waypoints) = points.split_last().ok_or_else(|| {
            RouteError::InvalidParameter("an open route needs at least one point".to_string())
        })?;

        Ok(Self {
            origin,
            waypoints: waypoints.to_vec(),
            destination: *destination,
        })
    }

    /// Number of legs a complete answer must contain.
    pub fn expected_legs(&self) -> usize {
        self.waypoints.len() + 1
    }

    /// All points in travel order, origin and destination included.
    pub fn points(&self) -> Vec<GeoPoint> {
        let mut points = Vec::with_capacity(self.waypoints.len() + 2);
        points.push(self.origin);
        points.extend_from_slice(&self.waypoints);
        points.push(self.destination);
        points
    }
}

/// Trait for services that measure real travel distance along a route.
///
/// Implementations issue a single bounded call per invocation and do not
/// retry. A non-success answer must be reported as an error rather than as
/// an empty or partial leg list.
#[async_trait]
pub trait DistanceOracle: Send + Sync {
    /// Routes the request and returns one leg per consecutive point pair.
    async fn route_legs(&self, request: &RouteRequest) -> RouteResult<Vec<Leg>>;
}

/// Measures the walking distance from `origin` through `points` in km.
///
/// Fails with [`RouteError::MalformedResponse`] when the oracle answers with
/// a different number of legs than the request implies.
pub async fn measure_route_km<O>(
    oracle: &O,
    origin: GeoPoint,
    points: &[GeoPoint],
    close_loop: bool,
) -> RouteResult<f64>
where
    O: DistanceOracle + ?Sized,
{
    let request = RouteRequest::walking(origin, points, close_loop)?;
    let legs = oracle.route_legs(&request).await?;

    if legs.len() != request.expected_legs() {
        return Err(RouteError::MalformedResponse(format!(
            "expected {} legs, got {}",
            request.expected_legs(),
            legs.len()
        )));
    }

    let km = legs.iter().map(Leg::km).sum();
    debug!("Measured {:.3} km over {} legs", km, legs.len());
    Ok(km)
}

/// Deterministic oracle for tests and offline runs.
///
/// Each leg is the great-circle distance between its endpoints multiplied by
/// a detour factor, which models a street network uniformly longer than the
/// straight line. Every request is recorded.
pub struct MockDistanceOracle {
    detour_factor: f64,
    requests: Mutex<Vec<RouteRequest>>,
    failure: Option<(String, String)>,
    fail_from_call: usize,
    dropped_legs: usize,
}

impl MockDistanceOracle {
    /// Creates a mock whose legs are `detour_factor` times the straight line.
    pub fn new(detour_factor: f64) -> Self {
        Self {
            detour_factor,
            requests: Mutex::new(Vec::new()),
            failure: None,
            fail_from_call: 1,
            dropped_legs: 0,
        }
    }

    /// Makes every call fail with the given service status.
    pub fn with_failure(mut self, status: impl Into<String>, message: impl Into<String>) -> Self {
        self.failure = Some((status.into(), message.into()));
        self
    }

    /// Restricts injected faults (failure and dropped legs) to call number
    /// `call` (1-based) and later.
    pub fn failing_from_call(mut self, call: usize) -> Self {
        self.fail_from_call = call.max(1);
        self
    }

    /// Drops the last `count` legs from each faulty answer.
    pub fn with_dropped_legs(mut self, count: usize) -> Self {
        self.dropped_legs = count;
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copy of every request received so far.
    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().clone()
    }
}

impl Default for MockDistanceOracle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[async_trait]
impl DistanceOracle for MockDistanceOracle {
    async fn route_legs(&self, request: &RouteRequest) -> RouteResult<Vec<Leg>> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };

        let faulty = call >= self.fail_from_call;

        if let (true, Some((status, message))) = (faulty, &self.failure) {
            return Err(RouteError::OracleStatus {
                status: status.clone(),
                message: message.clone(),
            });
        }

        let mut legs: Vec<Leg> = request
            .points()
            .windows(2)
            .map(|pair| Leg::new(distance_m(pair[0], pair[1]) * self.detour_factor))
            .collect();
        if faulty {
            legs.truncate(legs.len().saturating_sub(self.dropped_legs));
        }

        Ok(legs)
    }
}
