//! Geodetic and planar primitives used throughout the overlay engine.

use serde::{Deserialize, Serialize};

use crate::projection::WebMercator;

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Point in a projected plane. Units depend on the projection that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Geodetic rectangle, stored as its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    /// Build bounds from any two opposite corners.
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            south_west: GeoPoint::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: GeoPoint::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Smallest bounds enclosing every point, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for point in iter {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        let mut merged = *self;
        merged.extend(other.south_west);
        merged.extend(other.north_east);
        merged
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// True when the rectangle has no area (or carries non-finite corners).
    pub fn is_degenerate(&self) -> bool {
        let height = self.north_east.lat - self.south_west.lat;
        let width = self.north_east.lng - self.south_west.lng;
        !(height.is_finite() && width.is_finite()) || height <= 0.0 || width <= 0.0
    }

    /// Grow the bounds by a fraction of their size on every side.
    pub fn pad(&self, ratio: f64) -> GeoBounds {
        let dlat = (self.north_east.lat - self.south_west.lat) * ratio;
        let dlng = (self.north_east.lng - self.south_west.lng) * ratio;
        GeoBounds {
            south_west: GeoPoint::new(self.south_west.lat - dlat, self.south_west.lng - dlng),
            north_east: GeoPoint::new(self.north_east.lat + dlat, self.north_east.lng + dlng),
        }
    }
}

/// Axis-aligned rectangle in pixel space (y grows southwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub min: PlanarPoint,
    pub max: PlanarPoint,
}

impl PixelBounds {
    pub fn new(a: PlanarPoint, b: PlanarPoint) -> Self {
        Self {
            min: PlanarPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: PlanarPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min.scale(factor), self.max.scale(factor))
    }

    pub fn contains(&self, point: PlanarPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// What the renderer currently shows: a geodetic rectangle at a zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: GeoBounds,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(bounds: GeoBounds, zoom: f64) -> Self {
        Self { bounds, zoom }
    }

    /// Pixel rectangle of this viewport in the rendering projection.
    pub fn pixel_bounds(&self) -> PixelBounds {
        let mercator = WebMercator;
        PixelBounds::new(
            mercator.to_pixel(self.bounds.north_west(), self.zoom),
            mercator.to_pixel(self.bounds.south_east(), self.zoom),
        )
    }
}
