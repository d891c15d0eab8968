//! Export visible tracks as a standalone SVG.
//!
//! Usage:
//!   cargo run -p circuit-cli --bin export_svg -- -o tracks.svg tracks/*.json
//!   cargo run -p circuit-cli --bin export_svg -- --scale 4 --zoom 15 --sw 51.54,4.91 --ne 51.58,4.96 tracks/*.json

use std::path::PathBuf;

use anyhow::Context;
use circuit_cli::ingest::{feed_engine, ingest_files};
use circuit_cli::{init_tracing, load_config, parse_point, viewport_or_field};
use circuit_core::{OverlayEngine, TrackFilter, Viewport};
use clap::Parser;

/// SVG track exporter
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Track files (JSON)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON engine configuration (defaults to the home field)
    #[arg(long)]
    config: Option<PathBuf>,

    /// South-west viewport corner as `lat,lng` (fits all tracks when omitted)
    #[arg(long, requires = "ne")]
    sw: Option<String>,

    /// North-east viewport corner as `lat,lng`
    #[arg(long, requires = "sw")]
    ne: Option<String>,

    /// Map zoom level
    #[arg(long, default_value_t = 14.0)]
    zoom: f64,

    /// Upscale factor (configuration default when omitted)
    #[arg(long)]
    scale: Option<u32>,

    /// Earliest flight date to include (YYYY-MM-DD)
    #[arg(long)]
    min_date: Option<String>,

    /// Latest flight date to include (YYYY-MM-DD)
    #[arg(long)]
    max_date: Option<String>,

    /// Output file
    #[arg(long, short, default_value = "tracks.svg")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let scale = args.scale.unwrap_or(config.export.scale);
    anyhow::ensure!(scale > 0, "scale must be at least 1");

    let mut engine = OverlayEngine::new(config)?;
    let outcomes = ingest_files(args.files).await;
    let report = feed_engine(&mut engine, outcomes);
    for (source, reason) in &report.failures {
        eprintln!("skipped: {source}: {reason}");
    }

    let filter = TrackFilter::parse(args.min_date.as_deref(), args.max_date.as_deref())?;
    let visible = engine.apply_filters(filter);

    let viewport = match (&args.sw, &args.ne) {
        (Some(sw), Some(ne)) => viewport_or_field(
            engine.config(),
            Some((parse_point(sw)?, parse_point(ne)?)),
            0.0,
            args.zoom,
        ),
        _ => match engine.tracks_bounds() {
            Some(bounds) if !bounds.is_degenerate() => Viewport::new(bounds.pad(0.05), args.zoom),
            _ => viewport_or_field(engine.config(), None, 0.5, args.zoom),
        },
    };
    let center = viewport.bounds.center();
    tracing::info!(
        visible,
        center_lat = center.lat,
        center_lng = center.lng,
        zoom = viewport.zoom,
        "export viewport"
    );

    let svg = engine.export_svg(&viewport, scale);
    tokio::fs::write(&args.output, svg)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("wrote {}", args.output.display());
    Ok(())
}
