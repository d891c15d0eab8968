//! Baseline-relative metric frame.
//!
//! The frame is anchored at the baseline start, with `along` pointing to the
//! baseline end and `across` rotated +90° from it. All math happens in the
//! metric (UTM) projection, so local coordinates are meters.

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::geo::{GeoPoint, PlanarPoint};
use crate::projection::{Projection, Utm};

/// Position of a point relative to the baseline, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    /// Signed distance along the baseline from its start anchor.
    pub along: f64,
    /// Signed perpendicular distance from the baseline (positive to the left).
    pub across: f64,
}

/// Orthonormal frame built once from two fixed anchors.
#[derive(Debug, Clone)]
pub struct BaselineFrame {
    anchor_start: GeoPoint,
    anchor_end: GeoPoint,
    projection: Utm,
    origin: PlanarPoint,
    along_unit: PlanarPoint,
    across_unit: PlanarPoint,
    length_m: f64,
}

impl BaselineFrame {
    pub fn new(anchor_start: GeoPoint, anchor_end: GeoPoint, projection: Utm) -> Result<Self> {
        for anchor in [anchor_start, anchor_end] {
            if !anchor.is_finite() || anchor.lat.abs() >= 90.0 {
                return Err(OverlayError::InvalidAnchor {
                    lat: anchor.lat,
                    lng: anchor.lng,
                });
            }
        }

        let origin = projection.project(anchor_start);
        let delta = projection.project(anchor_end).sub(origin);
        let length_m = delta.length();
        if !length_m.is_finite() || length_m <= 0.0 {
            return Err(OverlayError::CoincidentAnchors {
                lat: anchor_start.lat,
                lng: anchor_start.lng,
            });
        }

        let along_unit = delta.scale(1.0 / length_m);
        let across_unit = PlanarPoint::new(-along_unit.y, along_unit.x);

        Ok(Self {
            anchor_start,
            anchor_end,
            projection,
            origin,
            along_unit,
            across_unit,
            length_m,
        })
    }

    /// Project a geodetic point into the baseline frame.
    pub fn to_local(&self, point: GeoPoint) -> LocalPoint {
        let rel = self.projection.project(point).sub(self.origin);
        LocalPoint {
            along: rel.dot(self.along_unit),
            across: rel.dot(self.across_unit),
        }
    }

    pub fn anchor_start(&self) -> GeoPoint {
        self.anchor_start
    }

    pub fn anchor_end(&self) -> GeoPoint {
        self.anchor_end
    }

    pub fn along_unit(&self) -> PlanarPoint {
        self.along_unit
    }

    pub fn across_unit(&self) -> PlanarPoint {
        self.across_unit
    }

    pub fn origin(&self) -> PlanarPoint {
        self.origin
    }

    /// Metric length of the baseline.
    pub fn length_m(&self) -> f64 {
        self.length_m
    }
}
