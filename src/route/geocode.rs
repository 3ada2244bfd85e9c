//! Address to coordinate resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{RouteError, RouteResult};
use crate::geo::GeoPoint;

/// Default Geocoding API endpoint
pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Trait for services resolving a free-form address to a start point.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves `address`, failing with [`RouteError::AddressNotFound`] when
    /// the service has no match.
    async fn geocode(&self, address: &str) -> RouteResult<GeoPoint>;
}

/// Google Geocoding API client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Creates a geocoder. The timeout applies to every request.
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
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> RouteResult<GeoPoint> {
        let address = address.trim();
        if address.is_empty() {
            return Err(RouteError::AddressNotFound(String::new()));
        }

        debug!("Geocoding '{}'", address);

        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let point = parse_geocode_response(address, &body)?;
        info!("Resolved '{}' to {}", address, point);
        Ok(point)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

/// Parses a Geocoding API JSON body and returns the first match.
pub fn parse_geocode_response(address: &str, body: &str) -> RouteResult<GeoPoint> {
    let response: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| RouteError::MalformedResponse(format!("invalid geocoding JSON: {}", e)))?;

    if response.status == "ZERO_RESULTS" {
        return Err(RouteError::AddressNotFound(address.to_string()));
    }
    if response.status != "OK" {
        return Err(RouteError::OracleStatus {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::AddressNotFound(address.to_string()))?;

    Ok(GeoPoint::new(first.geometry.location.lat, first.geometry.location.lng)?)
}
