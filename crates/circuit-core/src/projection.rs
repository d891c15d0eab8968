//! Projection adapters between geodetic coordinates and planar systems.
//!
//! Two projections are kept strictly apart:
//! - [`WebMercator`] is the rendering projection. Screen, viewport and grid math use it.
//! - [`Utm`] is the metric projection. Baseline distances are measured in it.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::geo::{GeoPoint, PlanarPoint};

/// Sphere radius of the Web projection (EPSG:3857).
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which the Web projection is clamped.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_8;

/// Pixel size of one tile at zoom 0.
pub const TILE_SIZE_PX: f64 = 256.0;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Forward/inverse conversion between geodetic and planar coordinates.
pub trait Projection {
    fn project(&self, point: GeoPoint) -> PlanarPoint;
    fn unproject(&self, point: PlanarPoint) -> GeoPoint;
}

/// Spherical Web projection, planar units in meters at the equator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebMercator;

impl WebMercator {
    /// Pixel coordinates of a point at the given zoom level (y grows southwards).
    pub fn to_pixel(&self, point: GeoPoint, zoom: f64) -> PlanarPoint {
        let projected = self.project(point);
        let scale = TILE_SIZE_PX * 2f64.powf(zoom);
        let k = 0.5 / (PI * WEB_MERCATOR_RADIUS_M);
        PlanarPoint::new(
            scale * (k * projected.x + 0.5),
            scale * (-k * projected.y + 0.5),
        )
    }
}

impl Projection for WebMercator {
    fn project(&self, point: GeoPoint) -> PlanarPoint {
        let lat = point
            .lat
            .clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT)
            .to_radians();
        let sin = lat.sin();
        PlanarPoint::new(
            WEB_MERCATOR_RADIUS_M * point.lng.to_radians(),
            WEB_MERCATOR_RADIUS_M * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    fn unproject(&self, point: PlanarPoint) -> GeoPoint {
        let lat = 2.0 * (point.y / WEB_MERCATOR_RADIUS_M).exp().atan() - PI / 2.0;
        GeoPoint::new(lat.to_degrees(), (point.x / WEB_MERCATOR_RADIUS_M).to_degrees())
    }
}

/// Universal Transverse Mercator on the WGS84 ellipsoid for a fixed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    pub zone: u8,
    pub north: bool,
}

impl Utm {
    pub fn new(zone: u8, north: bool) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(OverlayError::InvalidConfig(format!(
                "UTM zone {zone} outside 1..=60"
            )));
        }
        Ok(Self { zone, north })
    }

    /// Zone containing the given longitude.
    pub fn zone_for(lng: f64) -> u8 {
        (((lng + 180.0) / 6.0).floor() as i64).rem_euclid(60) as u8 + 1
    }

    fn central_meridian(&self) -> f64 {
        ((self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
    }

    fn false_northing(&self) -> f64 {
        if self.north {
            0.0
        } else {
            UTM_FALSE_NORTHING_SOUTH
        }
    }
}

fn eccentricity_squared() -> f64 {
    WGS84_F * (2.0 - WGS84_F)
}

/// Meridian arc length from the equator to `phi`.
fn meridian_arc(phi: f64) -> f64 {
    let e2 = eccentricity_squared();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

impl Projection for Utm {
    fn project(&self, point: GeoPoint) -> PlanarPoint {
        let e2 = eccentricity_squared();
        let ep2 = e2 / (1.0 - e2);
        let phi = point.lat.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * (point.lng.to_radians() - self.central_meridian());
        let m = meridian_arc(phi);

        let easting = UTM_FALSE_EASTING
            + UTM_K0
                * n
                * (a + (1.0 - t + c) * a.powi(3) / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let northing = self.false_northing()
            + UTM_K0
                * (m + n
                    * tan_phi
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));

        PlanarPoint::new(easting, northing)
    }

    fn unproject(&self, point: PlanarPoint) -> GeoPoint {
        let e2 = eccentricity_squared();
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let sqrt_one_minus = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_one_minus) / (1.0 + sqrt_one_minus);

        let m = (point.y - self.false_northing()) / UTM_K0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        // Footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
        let t1 = tan1 * tan1;
        let c1 = ep2 * cos1 * cos1;
        let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
        let d = (point.x - UTM_FALSE_EASTING) / (n1 * UTM_K0);

        let lat = phi1
            - (n1 * tan1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lng = self.central_meridian()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        GeoPoint::new(lat.to_degrees(), lng.to_degrees())
    }
}
