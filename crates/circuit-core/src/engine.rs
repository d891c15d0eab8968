//! Overlay engine: owns the baseline frame and the track collection, and
//! answers the renderer's grid and export requests.
//!
//! The engine is single-threaded. Tracks are appended one at a time in
//! whatever order ingestion completes.

use crate::baseline::BaselineFrame;
use crate::classify::Classifier;
use crate::config::OverlayConfig;
use crate::error::Result;
use crate::export::{export_track, render_svg, ExportPath};
use crate::geo::{GeoBounds, Viewport};
use crate::grid::{GridGenerator, GridOverlay, GridSegment};
use crate::offset::max_lateral_offset;
use crate::projection::Utm;
use crate::style::{LineOptions, LineStyle};
use crate::track::{Track, TrackFilter, TrackInput};

/// Bulk style replacement for every track ingested before it was applied.
#[derive(Debug, Clone)]
struct StyleOverride {
    style: LineStyle,
    applies_before: u64,
}

pub struct OverlayEngine {
    config: OverlayConfig,
    frame: BaselineFrame,
    grid: GridGenerator,
    classifier: Classifier,
    line_options: LineOptions,
    style_override: Option<StyleOverride>,
    filter: TrackFilter,
    tracks: Vec<Track>,
    next_seq: u64,
}

impl OverlayEngine {
    /// Build the engine. Fails when the configuration is invalid or the
    /// baseline anchors coincide; nothing downstream can run without a frame.
    pub fn new(config: OverlayConfig) -> Result<Self> {
        config.validate()?;
        let utm = Utm::new(config.baseline.utm_zone, config.baseline.north)?;
        let natural_zone = Utm::zone_for(config.baseline.start.lng);
        if natural_zone != utm.zone {
            tracing::warn!(
                configured = utm.zone,
                natural_zone,
                "baseline start lies outside the configured UTM zone"
            );
        }
        let frame = BaselineFrame::new(config.baseline.start, config.baseline.end, utm)?;
        let grid = GridGenerator::new(
            config.baseline.start,
            config.baseline.end,
            config.grid.clone(),
        );
        let classifier = Classifier::new(config.classifier.clone());

        tracing::debug!(
            baseline_len_m = frame.length_m(),
            spacing_m = config.grid.spacing_m,
            threshold_m = classifier.threshold_m(),
            "overlay engine ready"
        );

        Ok(Self {
            line_options: config.line.clone(),
            config,
            frame,
            grid,
            classifier,
            style_override: None,
            filter: TrackFilter::default(),
            tracks: Vec::new(),
            next_seq: 0,
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn frame(&self) -> &BaselineFrame {
        &self.frame
    }

    pub fn line_options(&self) -> &LineOptions {
        &self.line_options
    }

    /// A fresh grid layer for a renderer to register as its view observer.
    pub fn grid_overlay(&self) -> GridOverlay {
        GridOverlay::new(self.grid.clone())
    }

    /// Ingest one decoded track: measure its deviation, classify it and
    /// freeze the result. A rejected track leaves the collection untouched.
    pub fn add_track(&mut self, input: TrackInput) -> Result<&Track> {
        input.validate()?;

        let max_offset_m = max_lateral_offset(&input.points, &self.frame);
        let (class, style) = self
            .classifier
            .classify(max_offset_m, &input.filename, &self.line_options);
        let visible = !self.filter.hides(&input.metadata);

        tracing::debug!(
            filename = %input.filename,
            max_offset_m,
            baseline_len_m = self.frame.length_m(),
            class = class.label(),
            "track added"
        );

        let seq = self.next_seq;
        self.next_seq += 1;
        self.tracks.push(Track {
            seq,
            filename: input.filename,
            points: input.points,
            metadata: input.metadata,
            max_offset_m,
            class,
            style,
            visible,
        });
        Ok(&self.tracks[self.tracks.len() - 1])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn visible_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.visible)
    }

    /// Style to draw `track` with: the bulk override if one covers it,
    /// otherwise its own classified style.
    pub fn rendered_style<'a>(&'a self, track: &'a Track) -> &'a LineStyle {
        match &self.style_override {
            Some(o) if track.seq < o.applies_before => &o.style,
            _ => &track.style,
        }
    }

    /// Replace the default line options. With `override_existing`, every
    /// track already ingested renders with the new default style; their
    /// classification is kept as is.
    pub fn update_line_options(&mut self, options: LineOptions) {
        if options.override_existing {
            self.style_override = Some(StyleOverride {
                style: options.style(),
                applies_before: self.next_seq,
            });
            tracing::info!(tracks = self.tracks.len(), "line style override applied");
        }
        self.line_options = options;
    }

    /// Re-derive every track's classification from scratch with the current
    /// options, dropping any bulk override.
    pub fn reclassify_all(&mut self) {
        for track in &mut self.tracks {
            let (class, style) =
                self.classifier
                    .classify(track.max_offset_m, &track.filename, &self.line_options);
            track.class = class;
            track.style = style;
        }
        self.style_override = None;
    }

    /// Apply a date window; returns the number of visible tracks.
    pub fn apply_filters(&mut self, filter: TrackFilter) -> usize {
        self.filter = filter;
        for track in &mut self.tracks {
            track.visible = !filter.hides(&track.metadata);
        }
        self.visible_tracks().count()
    }

    /// Bounds of every ingested track, for "zoom to all".
    pub fn tracks_bounds(&self) -> Option<GeoBounds> {
        self.tracks
            .iter()
            .filter_map(Track::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn regenerate_grid(&self, viewport: &Viewport) -> Vec<GridSegment> {
        self.grid.generate(viewport)
    }

    pub fn grid_style(&self, segment: &GridSegment) -> &LineStyle {
        self.grid.style_for(segment.role)
    }

    /// Export paths for the visible tracks that touch the scaled viewport.
    /// Empty for a zero scale.
    pub fn export_paths(&self, viewport: &Viewport, scale: u32) -> Vec<ExportPath> {
        if scale == 0 {
            tracing::warn!("export requested with zero scale");
            return Vec::new();
        }
        self.visible_tracks()
            .filter_map(|track| {
                export_track(&track.points, self.rendered_style(track), viewport, scale)
            })
            .collect()
    }

    pub fn export_svg(&self, viewport: &Viewport, scale: u32) -> String {
        let paths = self.export_paths(viewport, scale);
        tracing::info!(paths = paths.len(), scale, "rendering SVG export");
        render_svg(&paths, &viewport.pixel_bounds().scaled(scale as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TrackClass;
    use crate::error::OverlayError;
    use crate::geo::GeoPoint;

    #[test]
    fn coincident_anchors_abort_construction() {
        let mut config = OverlayConfig::default();
        config.baseline.end = config.baseline.start;
        let err = OverlayEngine::new(config).err().unwrap();
        assert!(matches!(err, OverlayError::CoincidentAnchors { .. }));
    }

    #[test]
    fn rejected_track_does_not_poison_collection() {
        let mut engine = OverlayEngine::new(OverlayConfig::default()).unwrap();
        let bad = TrackInput::new("bad.igc", vec![GeoPoint::new(f64::NAN, 0.0)]);
        assert!(engine.add_track(bad).is_err());

        let good = TrackInput::new("good.igc", vec![GeoPoint::new(51.556, 4.935)]);
        engine.add_track(good).unwrap();
        assert_eq!(engine.tracks().len(), 1);
        assert_eq!(engine.tracks()[0].seq(), 0);
    }

    #[test]
    fn zero_scale_export_is_empty() {
        let mut engine = OverlayEngine::new(OverlayConfig::default()).unwrap();
        let config = engine.config().clone();
        engine
            .add_track(TrackInput::new("home.igc", vec![config.baseline.start, config.baseline.end]))
            .unwrap();
        engine
            .add_track(TrackInput::new("away.igc", vec![GeoPoint::new(48.85, 2.35)]))
            .unwrap();

        let bounds = GeoBounds::new(config.baseline.start, config.baseline.end).pad(0.5);
        let viewport = Viewport::new(bounds, 14.0);
        assert!(engine.export_paths(&viewport, 0).is_empty());
        assert_eq!(engine.export_paths(&viewport, 1).len(), 1);
        assert!(!engine.export_svg(&viewport, 0).contains("<path"));
    }

    #[test]
    fn empty_track_is_accepted_with_zero_offset() {
        let mut engine = OverlayEngine::new(OverlayConfig::default()).unwrap();
        let track = engine.add_track(TrackInput::new("empty.igc", Vec::new())).unwrap();
        assert_eq!(track.max_offset_m, 0.0);
        assert_eq!(track.class, TrackClass::Default);
        assert!(engine.tracks_bounds().is_none());
    }
}
