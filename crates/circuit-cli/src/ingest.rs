//! Concurrent track file ingestion.
//!
//! Every file is read and decoded on its own task. Outcomes arrive in
//! completion order; a failing file never affects its siblings.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use circuit_core::{OverlayEngine, TrackInput};
use serde::Deserialize;
use tokio::task::{self, JoinSet};

/// Result of reading one file.
#[derive(Debug)]
pub enum FileOutcome {
    Loaded { path: PathBuf, tracks: Vec<TrackInput> },
    Failed { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Loaded { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

/// Read and decode all `paths` concurrently.
pub async fn ingest_files(paths: Vec<PathBuf>) -> Vec<FileOutcome> {
    ingest_with(paths, load_file).await
}

/// Run `load` for every path on its own task. A task that dies without
/// answering is reported as a failure of the file it was given.
async fn ingest_with<F, Fut>(paths: Vec<PathBuf>, load: F) -> Vec<FileOutcome>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = Result<Vec<TrackInput>, String>> + Send + 'static,
{
    let mut set = JoinSet::new();
    let mut pending: HashMap<task::Id, PathBuf> = HashMap::new();
    for path in paths {
        let handle = set.spawn(load(path.clone()));
        pending.insert(handle.id(), path);
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    while let Some(joined) = set.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => {
                tracing::error!("ingest task failed: {}", e);
                (e.id(), Err(format!("decode task failed: {e}")))
            }
        };
        let Some(path) = pending.remove(&id) else {
            tracing::error!(%id, "ingest task finished with no known file");
            continue;
        };
        outcomes.push(match result {
            Ok(tracks) => FileOutcome::Loaded { path, tracks },
            Err(reason) => FileOutcome::Failed { path, reason },
        });
    }
    outcomes
}

/// Format of a track file from its name: the lowercased extension, and
/// whether a trailing `.gz` was stripped to find it.
fn file_format(path: &Path) -> (String, bool) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let (stem, gzipped) = match name.strip_suffix(".gz") {
        Some(stem) => (stem, true),
        None => (name.as_str(), false),
    };
    let ext = Path::new(stem)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    (ext, gzipped)
}

async fn load_file(path: PathBuf) -> Result<Vec<TrackInput>, String> {
    match file_format(&path) {
        (ext, false) if ext == "json" => {}
        (ext, true) if ext == "json" => {
            return Err("Unsupported file format: json (gzip)".to_string());
        }
        (ext, _) => return Err(format!("Unsupported file format: {ext}")),
    }

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("read failed: {e}"))?;
    let fallback_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("track")
        .to_string();
    decode_tracks(&text, &fallback_name)
}

/// Decode one JSON object or an array of them. Objects without a
/// `filename` take the name of the file they came from.
pub fn decode_tracks(text: &str, fallback_name: &str) -> Result<Vec<TrackInput>, String> {
    let values = match serde_json::from_str::<OneOrMany>(text).map_err(|e| e.to_string())? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    };

    values
        .into_iter()
        .map(|mut value| {
            if let Some(obj) = value.as_object_mut() {
                obj.entry("filename")
                    .or_insert_with(|| serde_json::Value::String(fallback_name.to_string()));
            }
            serde_json::from_value::<TrackInput>(value).map_err(|e| e.to_string())
        })
        .collect()
}

/// Tally of feeding ingestion outcomes into an engine.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub added: usize,
    /// (source, reason) for every file or track that was rejected.
    pub failures: Vec<(String, String)>,
}

/// Hand every decoded track to the engine. Rejections are collected, never fatal.
pub fn feed_engine(engine: &mut OverlayEngine, outcomes: Vec<FileOutcome>) -> IngestReport {
    let mut report = IngestReport::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Loaded { tracks, .. } => {
                for input in tracks {
                    let name = input.filename.clone();
                    match engine.add_track(input) {
                        Ok(_) => report.added += 1,
                        Err(e) => {
                            tracing::warn!(filename = %name, error = %e, "track rejected");
                            report.failures.push((name, e.to_string()));
                        }
                    }
                }
            }
            FileOutcome::Failed { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "file skipped");
                report.failures.push((path.display().to_string(), reason));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_object_with_fallback_name() {
        let tracks = decode_tracks(r#"{"points": [{"lat": 51.5, "lng": 4.9}]}"#, "a.json").unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].filename, "a.json");
    }

    #[test]
    fn decodes_array_keeping_explicit_names() {
        let text = r#"[
            {"filename": "one-Run.gpx", "points": []},
            {"filename": "two.igc", "points": [{"lat": 51.5, "lng": 4.9}]}
        ]"#;
        let tracks = decode_tracks(text, "bundle.json").unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].filename, "one-Run.gpx");
        assert!(tracks[0].points.is_empty());
    }

    #[test]
    fn compressed_names_report_the_inner_format() {
        assert_eq!(file_format(Path::new("flight.igc.gz")), ("igc".to_string(), true));
        assert_eq!(file_format(Path::new("Day.JSON")), ("json".to_string(), false));
        assert_eq!(file_format(Path::new("notes")), (String::new(), false));
    }

    #[tokio::test]
    async fn panicking_loader_fails_only_its_file() {
        let paths = vec![
            PathBuf::from("a.json"),
            PathBuf::from("boom.json"),
            PathBuf::from("c.json"),
        ];
        let outcomes = ingest_with(paths, |path: PathBuf| async move {
            if path.ends_with("boom.json") {
                panic!("decoder blew up");
            }
            Ok(Vec::new())
        })
        .await;

        assert_eq!(outcomes.len(), 3);
        let failed: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Failed { path, reason } => Some((path, reason)),
                FileOutcome::Loaded { .. } => None,
            })
            .collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].0.ends_with("boom.json"));
        assert!(failed[0].1.starts_with("decode task failed"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(decode_tracks("{", "x.json").is_err());
        assert!(decode_tracks(r#"{"points": "nope"}"#, "x.json").is_err());
    }
}
