//! Spherical-Earth projection helpers.
//!
//! All functions use a fixed mean Earth radius. That is accurate enough at
//! city/park scale, which is all the loop builder needs.

use super::{GeoError, GeoPoint, GeoResult};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Reduces any bearing into `[0, 360)`.
///
/// # Example
///
/// ```rust
/// use run_planner::geo::normalize_bearing;
///
/// assert_eq!(normalize_bearing(-10.0), 350.0);
/// assert_eq!(normalize_bearing(725.0), 5.0);
/// assert_eq!(normalize_bearing(360.0), 0.0);
/// ```
pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    let b = bearing_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Computes the point reached from `point` after travelling `distance_m`
/// meters along `bearing_deg` (0 = north, clockwise).
///
/// The bearing does not need to be normalized. Non-finite input and negative
/// distances are rejected instead of propagating NaN.
///
/// # Example
///
/// ```rust
/// use run_planner::geo::{project, GeoPoint};
///
/// let start = GeoPoint::new(0.0, 0.0).unwrap();
/// let east = project(start, 90.0, 111_195.0).unwrap();
/// assert!((east.lng - 1.0).abs() < 0.001);
/// assert!(east.lat.abs() < 1e-9);
/// ```
pub fn project(point: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoResult<GeoPoint> {
    point.validate()?;
    if !bearing_deg.is_finite() {
        return Err(GeoError::InvalidBearing(bearing_deg));
    }
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(GeoError::InvalidDistance(distance_m));
    }

    let bearing = bearing_deg.to_radians();
    let lat1 = point.lat.to_radians();
    let lng1 = point.lng.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_d, cos_d) = angular.sin_cos();

    let lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * bearing.cos()).asin();
    let lng2 = lng1 + (bearing.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * lat2.sin());

    // Keep longitude in [-180, 180] so the result passes validation again
    let mut lng_deg = lng2.to_degrees();
    if lng_deg > 180.0 {
        lng_deg -= 360.0;
    } else if lng_deg < -180.0 {
        lng_deg += 360.0;
    }

    Ok(GeoPoint {
        lat: lat2.to_degrees().clamp(-90.0, 90.0),
        lng: lng_deg,
    })
}

/// Great-circle distance between two points in meters (haversine).
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> GeoPoint {
        GeoPoint::new(52.520008, 13.404954).unwrap()
    }

    #[test]
    fn test_normalize_negative_and_multi_turn() {
        assert_eq!(normalize_bearing(-10.0), 350.0);
        assert_eq!(normalize_bearing(-370.0), 350.0);
        assert_eq!(normalize_bearing(1080.0), 0.0);
        assert!((normalize_bearing(540.5) - 180.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_tiny_negative_stays_in_range() {
        let b = normalize_bearing(-1e-18);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn test_project_north() {
        // One degree of latitude on the mean sphere
        let one_deg_m = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let p = project(GeoPoint::new(0.0, 0.0).unwrap(), 0.0, one_deg_m).unwrap();

        assert!((p.lat - 1.0).abs() < 1e-9, "Expected 1°N, got {}", p.lat);
        assert!(p.lng.abs() < 1e-9);
    }

    #[test]
    fn test_project_zero_distance_is_identity() {
        let start = berlin();
        let p = project(start, 123.0, 0.0).unwrap();

        assert!((p.lat - start.lat).abs() < 1e-9);
        assert!((p.lng - start.lng).abs() < 1e-9);
    }

    #[test]
    fn test_project_matches_inverse_distance() {
        let start = berlin();
        for bearing in [0.0, 45.0, 90.0, 200.0, 315.0, -60.0, 720.0] {
            let p = project(start, bearing, 2_500.0).unwrap();
            let back = distance_m(start, p);
            assert!((back - 2_500.0).abs() < 1.0, "bearing {}: {}", bearing, back);
        }
    }

    #[test]
    fn test_project_wraps_longitude() {
        let p = project(GeoPoint::new(0.0, 179.9).unwrap(), 90.0, 50_000.0).unwrap();
        assert!(p.lng < -179.0, "Expected wrap, got {}", p.lng);
    }

    #[test]
    fn test_project_rejects_invalid_input() {
        let start = berlin();
        assert_eq!(
            project(start, 0.0, -1.0),
            Err(GeoError::InvalidDistance(-1.0))
        );
        assert!(matches!(
            project(start, f64::NAN, 10.0),
            Err(GeoError::InvalidBearing(_))
        ));
        assert!(matches!(
            project(start, 0.0, f64::INFINITY),
            Err(GeoError::InvalidDistance(_))
        ));

        let broken = GeoPoint { lat: 100.0, lng: 0.0 };
        assert_eq!(
            project(broken, 0.0, 10.0),
            Err(GeoError::InvalidLatitude(100.0))
        );
    }

    #[test]
    fn test_distance_symmetry() {
        let a = berlin();
        let b = GeoPoint::new(48.137154, 11.576124).unwrap();
        assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-6);
        assert_eq!(distance_m(a, a), 0.0);
    }
}
