//! Concurrent ingestion tests.
//!
//! Writes track files to a scratch directory, ingests them in parallel and
//! feeds the results to an engine.

use std::path::PathBuf;

use circuit_cli::ingest::{feed_engine, ingest_files, FileOutcome};
use circuit_core::{GeoPoint, OverlayConfig, OverlayEngine, TrackClass, TrackInput};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("circuit-ingest-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_failures_do_not_abort_siblings() {
    let dir = scratch_dir("siblings");
    let good = TrackInput::new(
        "good.igc",
        vec![GeoPoint::new(51.552, 4.933), GeoPoint::new(51.565, 4.940)],
    );
    let paths = vec![
        write(&dir, "good.json", &serde_json::to_string(&good).unwrap()),
        write(&dir, "broken.json", "{ not json"),
        write(&dir, "flight.igc", "AXXX"),
        write(&dir, "flight.igc.gz", "AXXX"),
        dir.join("missing.json"),
    ];

    let outcomes = ingest_files(paths).await;
    assert_eq!(outcomes.len(), 5);

    let loaded: Vec<_> = outcomes
        .iter()
        .filter(|o| matches!(o, FileOutcome::Loaded { .. }))
        .collect();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].path().ends_with("good.json"));

    let unsupported = outcomes
        .iter()
        .find(|o| o.path().ends_with("flight.igc"))
        .unwrap();
    match unsupported {
        FileOutcome::Failed { reason, .. } => assert_eq!(reason, "Unsupported file format: igc"),
        other => panic!("expected failure, got {other:?}"),
    }

    let compressed = outcomes
        .iter()
        .find(|o| o.path().ends_with("flight.igc.gz"))
        .unwrap();
    match compressed {
        FileOutcome::Failed { reason, .. } => assert_eq!(reason, "Unsupported file format: igc"),
        other => panic!("expected failure, got {other:?}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_bundles_feed_the_engine() {
    let dir = scratch_dir("bundle");
    let bundle = r#"[
        {"filename": "a-Run.gpx", "points": [{"lat": 51.552, "lng": 4.933}]},
        {"filename": "bad.igc", "points": [{"lat": 123.0, "lng": 4.933}]},
        {"filename": "c.igc", "points": []}
    ]"#;
    let paths = vec![write(&dir, "bundle.json", bundle)];

    let mut engine = OverlayEngine::new(OverlayConfig::default()).unwrap();
    let report = feed_engine(&mut engine, ingest_files(paths).await);

    assert_eq!(report.added, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "bad.igc");

    let classes: Vec<_> = engine.tracks().iter().map(|t| t.class).collect();
    assert_eq!(classes[0].label(), "run");
    assert_eq!(classes[1], TrackClass::Default);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_empty_input_list() {
    assert!(ingest_files(Vec::new()).await.is_empty());
}
