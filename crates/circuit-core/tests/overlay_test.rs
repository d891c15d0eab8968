//! End-to-end overlay engine tests.
//!
//! Drives the engine the way the map front end does: build it once, feed it
//! decoded tracks, regenerate the grid on view changes and export.

use chrono::{TimeZone, Utc};
use circuit_core::{
    GeoBounds, GeoPoint, GridAxis, LineOptions, OverlayConfig, OverlayEngine, OverlayError,
    PlanarPoint, Projection, SegmentRole, TrackClass, TrackFilter, TrackInput, TrackMetadata,
    Utm, ViewObserver, Viewport, WebMercator,
};

const A: GeoPoint = GeoPoint::new(51.55166, 4.93284);
const B: GeoPoint = GeoPoint::new(51.56619, 4.94022);

fn engine() -> OverlayEngine {
    OverlayEngine::new(OverlayConfig::default()).expect("default config builds")
}

fn field_viewport() -> Viewport {
    let bounds = GeoBounds::new(A, B).pad(0.5);
    Viewport::new(bounds, 14.0)
}

/// Point at `across_m` meters perpendicular to the baseline, halfway along it.
fn abeam(engine: &OverlayEngine, across_m: f64) -> GeoPoint {
    let frame = engine.frame();
    let utm = Utm::new(31, true).unwrap();
    let mid = frame
        .origin()
        .add(frame.along_unit().scale(frame.length_m() / 2.0))
        .add(frame.across_unit().scale(across_m));
    utm.unproject(mid)
}

fn timed(day: u32) -> TrackMetadata {
    TrackMetadata {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
        ..TrackMetadata::default()
    }
}

#[test]
fn test_grid_line_counts_match_rotated_viewport() {
    let engine = engine();
    let viewport = field_viewport();
    let config = engine.config();

    let mid_lat = ((A.lat + B.lat) / 2.0).to_radians();
    let step = config.grid.spacing_m / mid_lat.cos();
    let padding = config.grid.padding_steps * step;

    let m = WebMercator;
    let nw = m.project(viewport.bounds.north_west());
    let se = m.project(viewport.bounds.south_east());
    let (x0, x1) = (nw.x.min(se.x) - padding, nw.x.max(se.x) + padding);
    let (y0, y1) = (nw.y.min(se.y) - padding, nw.y.max(se.y) + padding);

    let a = m.project(A);
    let dir = m.project(B).sub(a);
    let theta = dir.y.atan2(dir.x);
    let (sin_t, cos_t) = theta.sin_cos();

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for corner in [
        PlanarPoint::new(x0, y0),
        PlanarPoint::new(x1, y0),
        PlanarPoint::new(x1, y1),
        PlanarPoint::new(x0, y1),
    ] {
        let rel = corner.sub(a);
        xs.push(cos_t * rel.x + sin_t * rel.y);
        ys.push(-sin_t * rel.x + cos_t * rel.y);
    }
    let expected = |vals: &[f64]| {
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        ((max / step).ceil() - (min / step).floor()) as usize + 1
    };

    let segments = engine.regenerate_grid(&viewport);
    let count = |role: SegmentRole| segments.iter().filter(|s| s.role == role).count();
    assert_eq!(count(SegmentRole::Grid(GridAxis::X)), expected(&xs));
    assert_eq!(count(SegmentRole::Grid(GridAxis::Y)), expected(&ys));

    let baselines: Vec<_> = segments
        .iter()
        .filter(|s| s.role == SegmentRole::Baseline)
        .collect();
    assert_eq!(baselines.len(), 1);
    assert_eq!((baselines[0].start, baselines[0].end), (A, B));
    assert_eq!(engine.grid_style(baselines[0]).dash_array.as_deref(), Some("6 4"));
}

#[test]
fn test_grid_overlay_follows_view_changes() {
    let engine = engine();
    let mut overlay = engine.grid_overlay();
    overlay.on_view_changed(&field_viewport());
    assert_eq!(overlay.segments(), engine.regenerate_grid(&field_viewport()).as_slice());

    let nowhere = Viewport::new(GeoBounds::new(A, A), 14.0);
    overlay.on_view_changed(&nowhere);
    assert!(overlay.segments().is_empty());
}

#[test]
fn test_vanishing_spacing_draws_baseline_only() {
    let mut config = OverlayConfig::default();
    config.grid.spacing_m = 1e-16;
    let engine = OverlayEngine::new(config).expect("tiny spacing is still valid");

    let segments = engine.regenerate_grid(&field_viewport());
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].role, SegmentRole::Baseline);
    assert_eq!((segments[0].start, segments[0].end), (A, B));
}

#[test]
fn test_deviation_threshold_through_engine() {
    let mut engine = engine();
    let outside = abeam(&engine, 701.0);
    let inside = abeam(&engine, -699.0);

    let track = engine
        .add_track(TrackInput::new("wide.igc", vec![A, outside, B]))
        .unwrap();
    assert!((track.max_offset_m - 701.0).abs() < 0.05);
    assert_eq!(track.class, TrackClass::Deviation);
    assert_eq!(track.style.color, "#ff3b3b");

    let track = engine
        .add_track(TrackInput::new("tight.igc", vec![A, inside, B]))
        .unwrap();
    assert!((track.max_offset_m - 699.0).abs() < 0.05);
    assert_eq!(track.class, TrackClass::Default);
    assert_eq!(track.summary().max_offset_m, 699);
}

#[test]
fn test_points_on_baseline_have_no_offset() {
    let mut engine = engine();
    let mid = abeam(&engine, 0.0);
    let track = engine
        .add_track(TrackInput::new("strip.igc", vec![A, mid, B]))
        .unwrap();
    assert!(track.max_offset_m < 0.01);
}

#[test]
fn test_style_override_covers_only_existing_tracks() {
    let mut engine = engine();
    engine
        .add_track(TrackInput::new("2024-05-01-Run.gpx", vec![A, B]))
        .unwrap();

    engine.update_line_options(LineOptions {
        color: "#123456".into(),
        override_existing: true,
        ..LineOptions::default()
    });
    engine
        .add_track(TrackInput::new("2024-05-02-Ride.gpx", vec![A, B]))
        .unwrap();

    let tracks = engine.tracks();
    assert_eq!(engine.rendered_style(&tracks[0]).color, "#123456");
    assert_eq!(tracks[0].class, TrackClass::Activity(circuit_core::ActivityKind::Run));
    assert_eq!(engine.rendered_style(&tracks[1]).color, "#00ffff");

    engine.reclassify_all();
    let tracks = engine.tracks();
    assert_eq!(engine.rendered_style(&tracks[0]).color, "#ff0000");
    assert_eq!(engine.rendered_style(&tracks[1]).color, "#00ffff");
}

#[test]
fn test_options_without_override_leave_existing_tracks() {
    let mut engine = engine();
    engine.add_track(TrackInput::new("a.igc", vec![A, B])).unwrap();
    engine.update_line_options(LineOptions {
        color: "#abcdef".into(),
        override_existing: false,
        ..LineOptions::default()
    });
    engine.add_track(TrackInput::new("b.igc", vec![A, B])).unwrap();

    let tracks = engine.tracks();
    assert_eq!(engine.rendered_style(&tracks[0]).color, "#0CB1E8");
    assert_eq!(engine.rendered_style(&tracks[1]).color, "#abcdef");
}

#[test]
fn test_date_filter_controls_visibility_and_export() {
    let mut engine = engine();
    engine
        .add_track(TrackInput::new("may-01.igc", vec![A, B]).with_metadata(timed(1)))
        .unwrap();
    engine
        .add_track(TrackInput::new("may-20.igc", vec![A, B]).with_metadata(timed(20)))
        .unwrap();
    engine.add_track(TrackInput::new("untimed.igc", vec![A, B])).unwrap();

    let viewport = field_viewport();
    assert_eq!(engine.export_paths(&viewport, 2).len(), 3);

    let filter = TrackFilter::parse(Some("2024-05-10"), None).unwrap();
    assert_eq!(engine.apply_filters(filter), 2);
    assert_eq!(engine.export_paths(&viewport, 2).len(), 2);

    // Tracks ingested while a filter is active honour it.
    engine
        .add_track(TrackInput::new("may-02.igc", vec![A, B]).with_metadata(timed(2)))
        .unwrap();
    assert!(!engine.tracks()[3].visible);

    assert_eq!(engine.apply_filters(TrackFilter::default()), 4);
}

#[test]
fn test_export_culls_and_scales() {
    let mut engine = engine();
    engine.add_track(TrackInput::new("home.igc", vec![A, B])).unwrap();
    engine
        .add_track(TrackInput::new(
            "away.igc",
            vec![GeoPoint::new(48.85, 2.35), GeoPoint::new(48.86, 2.36)],
        ))
        .unwrap();

    let viewport = field_viewport();
    let paths = engine.export_paths(&viewport, 2);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].style.weight, 2.0);

    let svg = engine.export_svg(&viewport, 2);
    assert_eq!(svg.matches("<path ").count(), 1);
}

#[test]
fn test_tracks_bounds_cover_every_track() {
    let mut engine = engine();
    assert!(engine.tracks_bounds().is_none());
    engine.add_track(TrackInput::new("a.igc", vec![A])).unwrap();
    engine.add_track(TrackInput::new("b.igc", vec![B])).unwrap();
    let bounds = engine.tracks_bounds().unwrap();
    assert!(bounds.contains(A) && bounds.contains(B));
    assert_eq!(bounds, GeoBounds::new(A, B));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let mut config = OverlayConfig::default();
    config.baseline.end = A;
    assert!(matches!(
        OverlayEngine::new(config).err(),
        Some(OverlayError::CoincidentAnchors { .. })
    ));

    let mut config = OverlayConfig::default();
    config.grid.spacing_m = -1.0;
    assert!(matches!(
        OverlayEngine::new(config).err(),
        Some(OverlayError::InvalidConfig(_))
    ));
}
