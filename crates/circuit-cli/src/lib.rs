//! Circuit CLI - command line tools around the overlay engine.
//!
//! Binaries:
//! - render_grid: grid segments for a viewport as GeoJSON
//! - analyze_tracks: per-track deviation and classification report
//! - export_svg: static vector export of visible tracks
//! - simulate_tracks: synthetic track files for demos and tests

pub mod geojson;
pub mod ingest;
pub mod sim;

use std::path::Path;

use anyhow::Context;
use circuit_core::{GeoBounds, GeoPoint, OverlayConfig, Viewport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use ingest::{ingest_files, FileOutcome};

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG` with
/// crate-level defaults at info. `CIRCUIT_LOG_FORMAT=json` switches to
/// one JSON object per event.
pub fn init_tracing() -> anyhow::Result<()> {
    let json = std::env::var("CIRCUIT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let (plain, structured) = if json {
        (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("circuit_core=info".parse()?)
                .add_directive("circuit_cli=info".parse()?),
        )
        .with(plain)
        .with(structured)
        .try_init()?;
    Ok(())
}

/// Load the engine configuration: JSON file if given, otherwise defaults,
/// then `CIRCUIT_*` environment overrides on top.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<OverlayConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            OverlayConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => OverlayConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Viewport from explicit corners, or the baseline anchors padded by `pad`.
pub fn viewport_or_field(
    config: &OverlayConfig,
    corners: Option<(GeoPoint, GeoPoint)>,
    pad: f64,
    zoom: f64,
) -> Viewport {
    let bounds = match corners {
        Some((a, b)) => GeoBounds::new(a, b),
        None => GeoBounds::new(config.baseline.start, config.baseline.end).pad(pad),
    };
    Viewport::new(bounds, zoom)
}

/// Parse `lat,lng` as given on the command line.
pub fn parse_point(text: &str) -> anyhow::Result<GeoPoint> {
    let (lat, lng) = text
        .split_once(',')
        .with_context(|| format!("expected `lat,lng`, got {text:?}"))?;
    let point = GeoPoint::new(
        lat.trim().parse().with_context(|| format!("bad latitude {lat:?}"))?,
        lng.trim().parse().with_context(|| format!("bad longitude {lng:?}"))?,
    );
    anyhow::ensure!(point.is_finite(), "non-finite point {text:?}");
    Ok(point)
}
