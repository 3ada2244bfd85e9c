//! Google Directions implementation of the distance oracle.
//!
//! Issues one walking-mode directions request per call with an explicit
//! timeout, and converts the per-leg distances of the first returned route
//! into [`Leg`]s. Anything other than status `OK` is a hard failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::oracle::{DistanceOracle, Leg, RouteRequest};
use super::{RouteError, RouteResult, TRAVEL_MODE};
use crate::geo::GeoPoint;

/// Default Directions API endpoint
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Directions API client configured with a key, endpoint and timeout.
#[derive(Debug, Clone)]
pub struct GoogleDirectionsClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleDirectionsClient {
    /// Creates a client. The timeout applies to every request.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> RouteResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Joins points into the `lat,lng|lat,lng` form used by the API.
pub fn join_points(points: &[GeoPoint]) -> String {
    points
        .iter()
        .map(GeoPoint::to_query_value)
        .collect::<Vec<_>>()
        .join("|")
}

#[async_trait]
impl DistanceOracle for GoogleDirectionsClient {
    async fn route_legs(&self, request: &RouteRequest) -> RouteResult<Vec<Leg>> {
        let mut params = vec![
            ("origin", request.origin.to_query_value()),
            ("destination", request.destination.to_query_value()),
            ("mode", TRAVEL_MODE.to_string()),
            ("key", self.api_key.clone()),
        ];
        if !request.waypoints.is_empty() {
            params.push(("waypoints", join_points(&request.waypoints)));
        }

        debug!(
            "Directions request: {} -> {} via {} waypoints",
            request.origin,
            request.destination,
            request.waypoints.len()
        );

        let body = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_directions_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: f64,
}

/// Parses a Directions API JSON body into the legs of its first route.
pub fn parse_directions_response(body: &str) -> RouteResult<Vec<Leg>> {
    let response: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| RouteError::MalformedResponse(format!("invalid directions JSON: {}", e)))?;

    if response.status != "OK" {
        return Err(RouteError::OracleStatus {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::MalformedResponse("response has no routes".to_string()))?;

    if route.legs.is_empty() {
        return Err(RouteError::MalformedResponse("route has no legs".to_string()));
    }

    route
        .legs
        .into_iter()
        .enumerate()
        .map(|(i, leg)| {
            leg.distance
                .map(|d| Leg::new(d.value))
                .ok_or_else(|| RouteError::MalformedResponse(format!("leg {} has no distance", i)))
        })
        .collect()
}
