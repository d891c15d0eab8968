//! Synthetic flight path implementations.

use std::f64::consts::PI;

use circuit_core::spatial::{bearing, haversine_distance, offset_by_bearing};
use circuit_core::GeoPoint;

/// A path that can be sampled at any time since its start.
pub trait FlightPath: Send + Sync {
    /// Position at time t seconds from start.
    fn position(&self, t: f64) -> GeoPoint;

    /// Time needed to fly the path once, in seconds.
    fn duration_s(&self) -> f64;
}

/// Circling flight around a fixed center, as in a thermal.
pub struct CircularPath {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub start_angle: f64,
    pub clockwise: bool,
    period: f64,
}

impl CircularPath {
    pub fn new(
        center: GeoPoint,
        radius_m: f64,
        speed_mps: f64,
        start_angle: f64,
        clockwise: bool,
    ) -> Self {
        let period = 2.0 * PI * radius_m / speed_mps;
        Self {
            center,
            radius_m,
            start_angle,
            clockwise,
            period,
        }
    }
}

impl FlightPath for CircularPath {
    fn position(&self, t: f64) -> GeoPoint {
        let mut angle = self.start_angle + 2.0 * PI * t / self.period;
        if self.clockwise {
            angle = -angle;
        }
        offset_by_bearing(self.center, self.radius_m, angle)
    }

    fn duration_s(&self) -> f64 {
        self.period
    }
}

/// Straight leg between two points, held at the end once reached.
pub struct LinearPath {
    pub start: GeoPoint,
    pub end: GeoPoint,
    duration: f64,
}

impl LinearPath {
    pub fn new(start: GeoPoint, end: GeoPoint, speed_mps: f64) -> Self {
        let distance_m = haversine_distance(start.lat, start.lng, end.lat, end.lng);
        let duration = if speed_mps > 0.0 {
            distance_m / speed_mps
        } else {
            0.0
        };
        Self {
            start,
            end,
            duration,
        }
    }
}

impl FlightPath for LinearPath {
    fn position(&self, t: f64) -> GeoPoint {
        let progress = if self.duration > 0.0 {
            (t / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        lerp(self.start, self.end, progress)
    }

    fn duration_s(&self) -> f64 {
        self.duration
    }
}

/// Rectangular traffic circuit flown around the launch baseline: upwind
/// along the baseline, crosswind, downwind at `offset_m` abeam, then base
/// back to the start anchor.
pub struct CircuitPath {
    corners: [GeoPoint; 4],
    legs_m: [f64; 4],
    speed_mps: f64,
    perimeter_m: f64,
}

impl CircuitPath {
    /// `offset_m` is the downwind distance from the baseline; positive flies
    /// the circuit on the left of the launch direction.
    pub fn new(start: GeoPoint, end: GeoPoint, offset_m: f64, speed_mps: f64) -> Self {
        let heading = bearing(start, end);
        let side = if offset_m >= 0.0 {
            heading - PI / 2.0
        } else {
            heading + PI / 2.0
        };
        let distance = offset_m.abs();
        let corners = [
            start,
            end,
            offset_by_bearing(end, distance, side),
            offset_by_bearing(start, distance, side),
        ];
        let mut legs_m = [0.0; 4];
        for (i, leg) in legs_m.iter_mut().enumerate() {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            *leg = haversine_distance(a.lat, a.lng, b.lat, b.lng);
        }
        Self {
            corners,
            legs_m,
            speed_mps,
            perimeter_m: legs_m.iter().sum(),
        }
    }

    pub fn corners(&self) -> &[GeoPoint; 4] {
        &self.corners
    }
}

impl FlightPath for CircuitPath {
    fn position(&self, t: f64) -> GeoPoint {
        if self.perimeter_m <= 0.0 || self.speed_mps <= 0.0 {
            return self.corners[0];
        }
        let mut along = (t * self.speed_mps).rem_euclid(self.perimeter_m);
        for (i, leg) in self.legs_m.iter().enumerate() {
            if along <= *leg {
                let progress = if *leg > 0.0 { along / leg } else { 0.0 };
                return lerp(self.corners[i], self.corners[(i + 1) % 4], progress);
            }
            along -= leg;
        }
        self.corners[0]
    }

    fn duration_s(&self) -> f64 {
        if self.speed_mps > 0.0 {
            self.perimeter_m / self.speed_mps
        } else {
            0.0
        }
    }
}

fn lerp(a: GeoPoint, b: GeoPoint, progress: f64) -> GeoPoint {
    GeoPoint::new(
        a.lat + progress * (b.lat - a.lat),
        a.lng + progress * (b.lng - a.lng),
    )
}
