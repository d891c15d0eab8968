//! Track model: ingested input, frozen classification, and date filtering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::TrackClass;
use crate::error::{OverlayError, Result};
use crate::geo::{GeoBounds, GeoPoint};
use crate::style::LineStyle;

/// Optional flight metadata carried over from the decoded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMetadata {
    pub timestamp: Option<DateTime<Utc>>,
    pub pilot: Option<String>,
    pub callsign: Option<String>,
    pub glider_type: Option<String>,
    pub registration: Option<String>,
    pub num_flight: Option<String>,
}

/// A decoded track as handed over by upstream file decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInput {
    pub filename: String,
    pub points: Vec<GeoPoint>,
    #[serde(flatten)]
    pub metadata: TrackMetadata,
}

impl TrackInput {
    pub fn new(filename: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        Self {
            filename: filename.into(),
            points,
            metadata: TrackMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: TrackMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Reject coordinates no projection can handle. An empty point list is accepted.
    pub fn validate(&self) -> Result<()> {
        if let Some((idx, bad)) = self
            .points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || p.lat.abs() > 90.0 || p.lng.abs() > 180.0)
        {
            return Err(OverlayError::Ingest {
                filename: self.filename.clone(),
                reason: format!("point {idx} out of range ({}, {})", bad.lat, bad.lng),
            });
        }
        Ok(())
    }
}

/// An ingested track. Points, deviation and classified style never change
/// after ingestion; only `visible` is toggled by date filters.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub(crate) seq: u64,
    pub filename: String,
    pub points: Vec<GeoPoint>,
    pub metadata: TrackMetadata,
    pub max_offset_m: f64,
    pub class: TrackClass,
    pub style: LineStyle,
    pub visible: bool,
}

impl Track {
    /// Ingestion order within the owning engine.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.points.iter())
    }

    pub fn length_m(&self) -> f64 {
        crate::spatial::path_length_m(&self.points)
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            filename: self.filename.clone(),
            num_flight: self.metadata.num_flight.clone(),
            callsign: self.metadata.callsign.clone(),
            glider_type: self.metadata.glider_type.clone(),
            registration: self.metadata.registration.clone(),
            max_offset_m: self.max_offset_m.round() as i64,
            class: self.class,
        }
    }
}

/// Per-track information shown on selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub filename: String,
    pub num_flight: Option<String>,
    pub callsign: Option<String>,
    pub glider_type: Option<String>,
    pub registration: Option<String>,
    /// Distance to the field, rounded to whole meters
    pub max_offset_m: i64,
    pub class: TrackClass,
}

/// Inclusive date window. Tracks without a timestamp are never excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFilter {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl TrackFilter {
    pub fn hides(&self, metadata: &TrackMetadata) -> bool {
        let Some(timestamp) = metadata.timestamp else {
            return false;
        };
        let day = timestamp.date_naive();
        let too_early = self.min_date.is_some_and(|min| day < min);
        let too_late = self.max_date.is_some_and(|max| day > max);
        too_early || too_late
    }

    /// Parse `YYYY-MM-DD` bounds; empty strings mean unbounded.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let parse = |value: Option<&str>| -> Result<Option<NaiveDate>> {
            match value.map(str::trim).filter(|v| !v.is_empty()) {
                None => Ok(None),
                Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| OverlayError::InvalidConfig(format!("bad date {v:?}: {e}"))),
            }
        };
        Ok(Self {
            min_date: parse(min)?,
            max_date: parse(max)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta_at(y: i32, m: u32, d: u32, h: u32) -> TrackMetadata {
        TrackMetadata {
            timestamp: Some(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()),
            ..TrackMetadata::default()
        }
    }

    #[test]
    fn filter_window_is_inclusive() {
        let filter = TrackFilter::parse(Some("2024-05-01"), Some("2024-05-31")).unwrap();
        assert!(!filter.hides(&meta_at(2024, 5, 1, 0)));
        assert!(!filter.hides(&meta_at(2024, 5, 31, 23)));
        assert!(filter.hides(&meta_at(2024, 4, 30, 23)));
        assert!(filter.hides(&meta_at(2024, 6, 1, 0)));
    }

    #[test]
    fn untimed_tracks_are_never_hidden() {
        let filter = TrackFilter::parse(Some("2024-05-01"), Some("2024-05-02")).unwrap();
        assert!(!filter.hides(&TrackMetadata::default()));
    }

    #[test]
    fn empty_bounds_are_open() {
        let filter = TrackFilter::parse(Some(""), None).unwrap();
        assert_eq!(filter, TrackFilter::default());
        assert!(!filter.hides(&meta_at(1901, 1, 1, 0)));
        assert!(TrackFilter::parse(Some("01/05/2024"), None).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_points() {
        let ok = TrackInput::new("a.igc", vec![GeoPoint::new(51.5, 4.9)]);
        ok.validate().unwrap();
        TrackInput::new("empty.igc", Vec::new()).validate().unwrap();

        let bad = TrackInput::new("b.igc", vec![GeoPoint::new(51.5, 4.9), GeoPoint::new(95.0, 4.9)]);
        let err = bad.validate().unwrap_err();
        assert!(matches!(err, OverlayError::Ingest { ref filename, .. } if filename == "b.igc"));
    }

    #[test]
    fn input_json_uses_flat_metadata() {
        let json = r#"{
            "filename": "flight-1.igc",
            "points": [{"lat": 51.55, "lng": 4.93}],
            "callsign": "PH-1",
            "timestamp": "2024-05-01T10:00:00Z"
        }"#;
        let input: TrackInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.metadata.callsign.as_deref(), Some("PH-1"));
        assert!(input.metadata.timestamp.is_some());
        assert_eq!(input.points.len(), 1);
    }
}
