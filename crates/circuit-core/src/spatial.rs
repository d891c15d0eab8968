//! Great-circle helpers on the sphere.
//!
//! These are approximations for summaries and synthetic paths. Baseline
//! measurements never go through here; they use the metric projection.

use crate::geo::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Sum of great-circle legs along a polyline.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng))
        .sum()
}

/// Initial bearing from `from` to `to` in radians (0 = north, π/2 = east).
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lng - from.lng).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(origin: GeoPoint, distance_m: f64, bearing_rad: f64) -> GeoPoint {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lng.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_ad, cos_ad) = angular_distance.sin_cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}
