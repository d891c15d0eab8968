//! Synthetic flight track generation.

pub mod paths;
pub mod scenarios;

pub use paths::{CircuitPath, CircularPath, FlightPath, LinearPath};
pub use scenarios::{create_field_day_scenario, Scenario, ScenarioTrack};

use circuit_core::spatial::offset_by_bearing;
use circuit_core::GeoPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random GPS-style scatter applied to sampled positions.
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    pub max_m: f64,
    pub seed: u64,
}

/// Sample `path` every `interval_s` seconds over one full pass.
pub fn sample_path(path: &dyn FlightPath, interval_s: f64, jitter: Option<Jitter>) -> Vec<GeoPoint> {
    if interval_s <= 0.0 {
        return vec![path.position(0.0)];
    }
    let steps = (path.duration_s() / interval_s).ceil().max(0.0) as usize;
    let mut rng = jitter.map(|j| StdRng::seed_from_u64(j.seed));

    (0..=steps)
        .map(|i| {
            let point = path.position(i as f64 * interval_s);
            match (jitter, rng.as_mut()) {
                (Some(j), Some(rng)) if j.max_m > 0.0 => {
                    let distance = rng.random_range(0.0..j.max_m);
                    let heading = rng.random_range(0.0..std::f64::consts::TAU);
                    offset_by_bearing(point, distance, heading)
                }
                _ => point,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit_core::haversine_distance;

    const A: GeoPoint = GeoPoint::new(51.55166, 4.93284);
    const B: GeoPoint = GeoPoint::new(51.56619, 4.94022);

    #[test]
    fn samples_cover_whole_pass() {
        let path = LinearPath::new(A, B, 25.0);
        let points = sample_path(&path, 1.0, None);
        assert_eq!(points[0], A);
        let last = points[points.len() - 1];
        assert!(haversine_distance(last.lat, last.lng, B.lat, B.lng) < 1e-3);
    }

    #[test]
    fn jitter_is_bounded_and_reproducible() {
        let path = LinearPath::new(A, B, 25.0);
        let jitter = Some(Jitter { max_m: 15.0, seed: 7 });
        let clean = sample_path(&path, 2.0, None);
        let first = sample_path(&path, 2.0, jitter);
        let second = sample_path(&path, 2.0, jitter);
        assert_eq!(first, second);
        for (c, j) in clean.iter().zip(&first) {
            assert!(haversine_distance(c.lat, c.lng, j.lat, j.lng) <= 15.0 + 1e-6);
        }
    }
}
