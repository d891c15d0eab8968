//! Write synthetic track files for a day at the field.
//!
//! Usage:
//!   cargo run -p circuit-cli --bin simulate_tracks -- --out-dir tracks
//!   cargo run -p circuit-cli --bin simulate_tracks -- --jitter-m 8 --seed 42 --bundle

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use circuit_cli::sim::{create_field_day_scenario, Jitter};
use circuit_cli::{init_tracing, load_config};
use clap::Parser;
use tokio::task::JoinSet;

/// Synthetic track generator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON engine configuration (anchors are taken from it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to write track files into
    #[arg(long, default_value = "tracks")]
    out_dir: PathBuf,

    /// Sampling interval in seconds
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Maximum random scatter per point in meters (0 disables)
    #[arg(long, default_value_t = 0.0)]
    jitter_m: f64,

    /// Seed for the scatter
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Date of the first flight (YYYY-MM-DD)
    #[arg(long, default_value = "2024-05-01")]
    start_date: String,

    /// Write one array file instead of one file per track
    #[arg(long)]
    bundle: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();
    anyhow::ensure!(args.interval > 0.0, "interval must be positive");

    let config = load_config(args.config.as_deref())?;
    let day = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d")
        .with_context(|| format!("bad start date {:?}", args.start_date))?;
    let first = Utc.from_utc_datetime(&day.and_hms_opt(10, 0, 0).context("invalid time")?);

    let scenario = create_field_day_scenario(
        config.baseline.start,
        config.baseline.end,
        first,
        Duration::days(1),
    );
    let jitter = (args.jitter_m > 0.0).then_some(Jitter {
        max_m: args.jitter_m,
        seed: args.seed,
    });
    let inputs = scenario.to_inputs(args.interval, jitter);

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    if args.bundle {
        let path = args.out_dir.join(format!("{}.json", scenario.name));
        tokio::fs::write(&path, serde_json::to_vec_pretty(&inputs)?).await?;
        println!("wrote {} tracks to {}", inputs.len(), path.display());
        return Ok(());
    }

    let mut set = JoinSet::new();
    for input in inputs {
        let stem = input
            .filename
            .rsplit_once('.')
            .map_or(input.filename.as_str(), |(stem, _)| stem)
            .to_string();
        let path = args.out_dir.join(format!("{stem}.json"));
        set.spawn(async move {
            let bytes = serde_json::to_vec_pretty(&input)?;
            tokio::fs::write(&path, bytes).await?;
            tracing::debug!(path = %path.display(), points = input.points.len(), "track written");
            anyhow::Ok(path)
        });
    }
    while let Some(joined) = set.join_next().await {
        let path = joined??;
        println!("wrote {}", path.display());
    }
    Ok(())
}
