use crate::core::error::{DiscoveryError, Result};
use crate::models::GeoPoint;

/// Earth's mean radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// Inputs are not range-checked; use [`distance_km`] for untrusted points.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.min(1.0).sqrt().atan2((1.0 - a).max(0.0).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two validated points
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> Result<f64> {
    ensure_valid(a)?;
    ensure_valid(b)?;
    Ok(haversine_distance(a.lat, a.lng, b.lat, b.lng))
}

/// Reject non-finite or out-of-range coordinates
pub fn ensure_valid(point: GeoPoint) -> Result<()> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(DiscoveryError::validation(format!(
            "coordinates out of range: lat={}, lng={}",
            point.lat, point.lng
        )))
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Calculate a bounding box around a center point
///
/// Used as a cheap pre-check before the exact Haversine test, so it must
/// never reject a point within `radius_km`. The longitude span uses the
/// tangent-meridian bound; when the circle covers a pole or crosses the
/// antimeridian the box spans every longitude.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    // Angular radius, with a small margin so boundary points reach the exact test
    let angular = radius_km / EARTH_RADIUS_KM * 1.001;
    let lat_delta = angular.to_degrees();

    let min_lat = lat - lat_delta;
    let max_lat = lat + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let ratio = angular.sin() / lat.to_radians().cos();
    let (min_lon, max_lon) = if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
        (-180.0, 180.0)
    } else {
        let lon_delta = ratio.asin().to_degrees();
        if lon - lon_delta < -180.0 || lon + lon_delta > 180.0 {
            (-180.0, 180.0)
        } else {
            (lon - lon_delta, lon + lon_delta)
        }
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}
