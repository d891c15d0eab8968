//! Pre-defined field scenarios producing demo track sets.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use circuit_core::spatial::offset_by_bearing;
use circuit_core::{GeoPoint, TrackInput, TrackMetadata};

use super::{sample_path, CircuitPath, CircularPath, FlightPath, Jitter, LinearPath};

/// One synthetic flight: output filename, path and metadata.
pub struct ScenarioTrack {
    pub filename: String,
    pub path: Arc<dyn FlightPath>,
    pub metadata: TrackMetadata,
}

/// A named set of synthetic flights.
pub struct Scenario {
    pub name: String,
    pub tracks: Vec<ScenarioTrack>,
}

impl Scenario {
    /// Sample every flight into an ingestable track.
    pub fn to_inputs(&self, interval_s: f64, jitter: Option<Jitter>) -> Vec<TrackInput> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, track)| {
                // Each flight gets its own stream so adding one does not shift the others.
                let jitter = jitter.map(|j| Jitter {
                    seed: j.seed.wrapping_add(i as u64),
                    ..j
                });
                TrackInput::new(
                    track.filename.clone(),
                    sample_path(track.path.as_ref(), interval_s, jitter),
                )
                .with_metadata(track.metadata.clone())
            })
            .collect()
    }
}

fn metadata(callsign: &str, num_flight: u32, at: DateTime<Utc>) -> TrackMetadata {
    TrackMetadata {
        timestamp: Some(at),
        callsign: Some(callsign.to_string()),
        glider_type: Some("ASK 21".to_string()),
        num_flight: Some(num_flight.to_string()),
        ..TrackMetadata::default()
    }
}

/// A day at the field: normal circuits, one that strays past the circuit
/// limit, a thermal flight over the strip and a walk along the runway.
///
/// Flights are spaced `day_spacing` apart starting at `first_day` so date
/// filters have something to act on.
pub fn create_field_day_scenario(
    start: GeoPoint,
    end: GeoPoint,
    first_day: DateTime<Utc>,
    day_spacing: Duration,
) -> Scenario {
    let at = |i: i32| first_day + day_spacing * i;
    let mid = GeoPoint::new((start.lat + end.lat) / 2.0, (start.lng + end.lng) / 2.0);
    let thermal_center = offset_by_bearing(mid, 300.0, -std::f64::consts::FRAC_PI_2);

    let tracks = vec![
        ScenarioTrack {
            filename: "circuit-left.igc".to_string(),
            path: Arc::new(CircuitPath::new(start, end, 400.0, 30.0)),
            metadata: metadata("E1", 1, at(0)),
        },
        ScenarioTrack {
            filename: "circuit-right.igc".to_string(),
            path: Arc::new(CircuitPath::new(start, end, -350.0, 30.0)),
            metadata: metadata("E2", 2, at(1)),
        },
        ScenarioTrack {
            filename: "circuit-wide.igc".to_string(),
            path: Arc::new(CircuitPath::new(start, end, 950.0, 30.0)),
            metadata: metadata("E3", 3, at(2)),
        },
        ScenarioTrack {
            filename: "thermal.igc".to_string(),
            path: Arc::new(CircularPath::new(thermal_center, 150.0, 25.0, 0.0, true)),
            metadata: metadata("E1", 4, at(3)),
        },
        ScenarioTrack {
            filename: "strip-Walk.gpx".to_string(),
            path: Arc::new(LinearPath::new(start, end, 1.4)),
            metadata: TrackMetadata {
                timestamp: Some(at(4)),
                ..TrackMetadata::default()
            },
        },
    ];

    Scenario {
        name: "field-day".to_string(),
        tracks,
    }
}
