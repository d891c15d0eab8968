//! Render the baseline-aligned grid for a viewport as GeoJSON.
//!
//! Usage:
//!   cargo run -p circuit-cli --bin render_grid -- --zoom 14
//!   cargo run -p circuit-cli --bin render_grid -- --sw 51.54,4.91 --ne 51.58,4.96

use std::path::PathBuf;

use anyhow::Context;
use circuit_cli::geojson::segments_to_feature_collection;
use circuit_cli::{init_tracing, load_config, parse_point, viewport_or_field};
use circuit_core::{GridAxis, OverlayEngine, SegmentRole};
use clap::Parser;

/// Grid overlay renderer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON engine configuration (defaults to the home field)
    #[arg(long)]
    config: Option<PathBuf>,

    /// South-west viewport corner as `lat,lng`
    #[arg(long, requires = "ne")]
    sw: Option<String>,

    /// North-east viewport corner as `lat,lng`
    #[arg(long, requires = "sw")]
    ne: Option<String>,

    /// Map zoom level
    #[arg(long, default_value_t = 14.0)]
    zoom: f64,

    /// Padding around the baseline when no corners are given (fraction of its extent)
    #[arg(long, default_value_t = 0.5)]
    pad: f64,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let corners = match (&args.sw, &args.ne) {
        (Some(sw), Some(ne)) => Some((parse_point(sw)?, parse_point(ne)?)),
        _ => None,
    };
    let viewport = viewport_or_field(&config, corners, args.pad, args.zoom);
    let engine = OverlayEngine::new(config)?;

    let segments = engine.regenerate_grid(&viewport);
    let count = |role: SegmentRole| segments.iter().filter(|s| s.role == role).count();
    tracing::info!(
        x_lines = count(SegmentRole::Grid(GridAxis::X)),
        y_lines = count(SegmentRole::Grid(GridAxis::Y)),
        "grid generated"
    );

    let collection = segments_to_feature_collection(&segments, |s| engine.grid_style(s));
    let text = serde_json::to_string_pretty(&collection)?;
    match args.output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}
