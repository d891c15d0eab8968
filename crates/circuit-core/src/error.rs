//! Error type shared by the overlay engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// Both baseline anchors project to the same metric point.
    #[error("baseline anchors coincide at ({lat}, {lng}); cannot build a frame")]
    CoincidentAnchors { lat: f64, lng: f64 },
    #[error("invalid anchor ({lat}, {lng})")]
    InvalidAnchor { lat: f64, lng: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A single track was rejected; sibling tracks are unaffected.
    #[error("track {filename} rejected: {reason}")]
    Ingest { filename: String, reason: String },
}

pub type Result<T> = std::result::Result<T, OverlayError>;
