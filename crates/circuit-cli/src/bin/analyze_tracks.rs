//! Report how far each track strayed from the baseline.
//!
//! Usage:
//!   cargo run -p circuit-cli --bin analyze_tracks -- tracks/*.json
//!   cargo run -p circuit-cli --bin analyze_tracks -- --min-date 2024-05-01 --json tracks/*.json

use std::path::PathBuf;

use circuit_cli::ingest::{feed_engine, ingest_files};
use circuit_cli::{init_tracing, load_config};
use circuit_core::{OverlayEngine, TrackFilter};
use clap::Parser;
use serde_json::json;

/// Track deviation analyzer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Track files (JSON)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON engine configuration (defaults to the home field)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Earliest flight date to include (YYYY-MM-DD)
    #[arg(long)]
    min_date: Option<String>,

    /// Latest flight date to include (YYYY-MM-DD)
    #[arg(long)]
    max_date: Option<String>,

    /// Print a JSON report instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let mut engine = OverlayEngine::new(config)?;
    let filter = TrackFilter::parse(args.min_date.as_deref(), args.max_date.as_deref())?;
    engine.apply_filters(filter);

    let outcomes = ingest_files(args.files).await;
    let report = feed_engine(&mut engine, outcomes);
    tracing::info!(
        added = report.added,
        failed = report.failures.len(),
        "ingestion finished"
    );

    let threshold = engine.config().classifier.deviation_threshold_m;
    let mut tracks: Vec<_> = engine.visible_tracks().collect();
    tracks.sort_by(|a, b| a.filename.cmp(&b.filename));

    if args.json {
        let out = json!({
            "baseline_len_m": engine.frame().length_m(),
            "threshold_m": threshold,
            "tracks": tracks
                .iter()
                .map(|t| json!({
                    "summary": t.summary(),
                    "length_m": t.length_m(),
                    "style": engine.rendered_style(t),
                }))
                .collect::<Vec<_>>(),
            "failures": report
                .failures
                .iter()
                .map(|(source, reason)| json!({ "source": source, "reason": reason }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "baseline {:.0} m, circuit limit {:.0} m",
        engine.frame().length_m(),
        threshold
    );
    println!(
        "{:<32} {:>10} {:>10} {:<10} {:<10}",
        "file", "offset m", "length m", "class", "callsign"
    );
    for track in &tracks {
        let summary = track.summary();
        println!(
            "{:<32} {:>10} {:>10.0} {:<10} {:<10}",
            summary.filename,
            summary.max_offset_m,
            track.length_m(),
            summary.class.label(),
            summary.callsign.as_deref().unwrap_or("-"),
        );
    }
    let hidden = engine.tracks().len() - tracks.len();
    if hidden > 0 {
        println!("{hidden} track(s) outside the date window");
    }
    for (source, reason) in &report.failures {
        eprintln!("failed: {source}: {reason}");
    }
    Ok(())
}
