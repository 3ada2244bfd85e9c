//! Latitude/longitude value type.

use serde::{Deserialize, Serialize};

use super::{GeoError, GeoResult};

/// A latitude/longitude pair in decimal degrees.
///
/// Points built through [`GeoPoint::new`] are guaranteed to be finite and in
/// range. The fields stay public so that upstream data can be carried as-is;
/// [`GeoPoint::validate`] re-checks a point before it enters any math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Example
    ///
    /// ```rust
    /// use run_planner::geo::GeoPoint;
    ///
    /// assert!(GeoPoint::new(48.1, 11.6).is_ok());
    /// assert!(GeoPoint::new(95.0, 11.6).is_err());
    /// ```
    pub fn new(lat: f64, lng: f64) -> GeoResult<Self> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Checks the point is finite and within the coordinate ranges.
    pub fn validate(&self) -> GeoResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(GeoError::InvalidLatitude(self.lat));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(GeoError::InvalidLongitude(self.lng));
        }
        Ok(())
    }

    /// Formats the point the way routing services expect it: `lat,lng`.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
