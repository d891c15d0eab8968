//! Viewport-aware grid overlay rotated to the baseline.
//!
//! The grid lives in the rendering projection. Its local basis is built from
//! the same anchors as [`crate::baseline::BaselineFrame`], but independently:
//! the two frames are not assumed to coincide numerically.
//!
//! Spacing is corrected by a single `1 / cos(mid latitude)` factor. That
//! compensates the Web projection's stretch near the anchors only; far from
//! the anchor latitude the gridlines drift from their nominal metric spacing.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::geo::{GeoPoint, PlanarPoint, Viewport};
use crate::projection::{Projection, WebMercator};
use crate::style::LineStyle;

/// Which local axis a gridline is constant along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAxis {
    /// Constant local x, running across the baseline direction
    X,
    /// Constant local y, running parallel to the baseline
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "role", content = "axis")]
pub enum SegmentRole {
    Grid(GridAxis),
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSegment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub role: SegmentRole,
}

/// Snapped local-frame extent of one grid regeneration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    origin: PlanarPoint,
    cos_t: f64,
    sin_t: f64,
    pub step: f64,
    pub padding: f64,
    pub start_x: f64,
    pub end_x: f64,
    pub start_y: f64,
    pub end_y: f64,
    /// Gridlines per axis; both zero when the request exceeds the line bound.
    pub lines_x: usize,
    pub lines_y: usize,
}

impl GridLayout {
    /// Rotate a rendering-plane point into the grid's local frame.
    pub fn to_local(&self, world: PlanarPoint) -> PlanarPoint {
        let rel = world.sub(self.origin);
        PlanarPoint::new(
            self.cos_t * rel.x + self.sin_t * rel.y,
            -self.sin_t * rel.x + self.cos_t * rel.y,
        )
    }

    pub fn to_world(&self, local: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(
            self.origin.x + self.cos_t * local.x - self.sin_t * local.y,
            self.origin.y + self.sin_t * local.x + self.cos_t * local.y,
        )
    }
}

/// Pure generator of gridline segments for a viewport.
#[derive(Debug, Clone)]
pub struct GridGenerator {
    anchor_start: GeoPoint,
    anchor_end: GeoPoint,
    config: GridConfig,
    projection: WebMercator,
}

impl GridGenerator {
    pub fn new(anchor_start: GeoPoint, anchor_end: GeoPoint, config: GridConfig) -> Self {
        Self {
            anchor_start,
            anchor_end,
            config,
            projection: WebMercator,
        }
    }

    /// Grid step in rendering-projection units, after latitude correction.
    pub fn step(&self) -> f64 {
        let mid_lat = (self.anchor_start.lat + self.anchor_end.lat) / 2.0;
        self.config.spacing_m / mid_lat.to_radians().cos()
    }

    pub fn style_for(&self, role: SegmentRole) -> &LineStyle {
        match role {
            SegmentRole::Grid(_) => &self.config.line_style,
            SegmentRole::Baseline => &self.config.baseline_style,
        }
    }

    /// Compute the snapped local extent for a viewport, or `None` when the
    /// request is degenerate or would exceed the per-axis line bound.
    pub fn layout(&self, viewport: &Viewport) -> Option<GridLayout> {
        if viewport.bounds.is_degenerate() {
            return None;
        }

        let step = self.step();
        if !step.is_finite() || step <= 0.0 {
            return None;
        }
        let padding = self.config.padding_steps * step;

        let nw = self.projection.project(viewport.bounds.north_west());
        let se = self.projection.project(viewport.bounds.south_east());
        let world_min = PlanarPoint::new(nw.x.min(se.x) - padding, nw.y.min(se.y) - padding);
        let world_max = PlanarPoint::new(nw.x.max(se.x) + padding, nw.y.max(se.y) + padding);

        let a = self.projection.project(self.anchor_start);
        let b = self.projection.project(self.anchor_end);
        let dir = b.sub(a);
        if dir.length() <= 0.0 {
            return None;
        }
        let theta = dir.y.atan2(dir.x);

        let mut layout = GridLayout {
            origin: a,
            cos_t: theta.cos(),
            sin_t: theta.sin(),
            step,
            padding,
            start_x: 0.0,
            end_x: 0.0,
            start_y: 0.0,
            end_y: 0.0,
            lines_x: 0,
            lines_y: 0,
        };

        let corners = [
            world_min,
            PlanarPoint::new(world_max.x, world_min.y),
            world_max,
            PlanarPoint::new(world_min.x, world_max.y),
        ];
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for corner in corners {
            let local = layout.to_local(corner);
            min_x = min_x.min(local.x);
            max_x = max_x.max(local.x);
            min_y = min_y.min(local.y);
            max_y = max_y.max(local.y);
        }

        layout.start_x = (min_x / step).floor() * step;
        layout.end_x = (max_x / step).ceil() * step;
        layout.start_y = (min_y / step).floor() * step;
        layout.end_y = (max_y / step).ceil() * step;

        let lines_x = line_count(layout.start_x, layout.end_x, step);
        let lines_y = line_count(layout.start_y, layout.end_y, step);
        let max = self.config.max_lines_per_axis as f64;
        if lines_x.is_finite() && lines_y.is_finite() && lines_x <= max && lines_y <= max {
            layout.lines_x = lines_x as usize;
            layout.lines_y = lines_y as usize;
        } else {
            tracing::warn!(
                lines_x,
                lines_y,
                max = self.config.max_lines_per_axis,
                "grid request exceeds line bound, drawing baseline only"
            );
        }
        Some(layout)
    }

    /// Full segment set for the viewport: gridlines on both local axes plus
    /// the baseline itself. Empty when the request is degenerate; only the
    /// baseline when the gridlines would exceed the line bound.
    pub fn generate(&self, viewport: &Viewport) -> Vec<GridSegment> {
        let Some(layout) = self.layout(viewport) else {
            tracing::warn!(?viewport, "degenerate grid request, emitting no segments");
            return Vec::new();
        };

        let mut segments = Vec::with_capacity(layout.lines_x + layout.lines_y + 1);

        for i in 0..layout.lines_x {
            let x = layout.start_x + i as f64 * layout.step;
            segments.push(self.segment(
                &layout,
                PlanarPoint::new(x, layout.start_y),
                PlanarPoint::new(x, layout.end_y),
                SegmentRole::Grid(GridAxis::X),
            ));
        }
        for i in 0..layout.lines_y {
            let y = layout.start_y + i as f64 * layout.step;
            segments.push(self.segment(
                &layout,
                PlanarPoint::new(layout.start_x, y),
                PlanarPoint::new(layout.end_x, y),
                SegmentRole::Grid(GridAxis::Y),
            ));
        }

        segments.push(GridSegment {
            start: self.anchor_start,
            end: self.anchor_end,
            role: SegmentRole::Baseline,
        });

        tracing::debug!(
            segments = segments.len(),
            lines_x = layout.lines_x,
            lines_y = layout.lines_y,
            "grid regenerated"
        );
        segments
    }

    fn segment(
        &self,
        layout: &GridLayout,
        from: PlanarPoint,
        to: PlanarPoint,
        role: SegmentRole,
    ) -> GridSegment {
        GridSegment {
            start: self.projection.unproject(layout.to_world(from)),
            end: self.projection.unproject(layout.to_world(to)),
            role,
        }
    }
}

/// Number of gridlines between two snapped bounds, counted in floating point
/// so a huge request can be compared against the bound before any cast.
fn line_count(start: f64, end: f64, step: f64) -> f64 {
    let intervals = ((end - start) / step).round();
    if intervals.is_nan() {
        return f64::INFINITY;
    }
    intervals.max(0.0) + 1.0
}

/// Receives "view changed" notifications (pan end, zoom end) from the renderer.
pub trait ViewObserver {
    fn on_view_changed(&mut self, viewport: &Viewport);
}

/// Grid layer: holds the segment set of the latest view, replaced wholesale
/// on every notification.
#[derive(Debug, Clone)]
pub struct GridOverlay {
    generator: GridGenerator,
    segments: Vec<GridSegment>,
    visible: bool,
}

impl GridOverlay {
    pub fn new(generator: GridGenerator) -> Self {
        Self {
            generator,
            segments: Vec::new(),
            visible: true,
        }
    }

    pub fn generator(&self) -> &GridGenerator {
        &self.generator
    }

    /// Segments of the latest view, whether or not the layer is shown.
    pub fn segments(&self) -> &[GridSegment] {
        &self.segments
    }

    /// Segments to draw: nothing while the layer is hidden.
    pub fn rendered(&self) -> &[GridSegment] {
        if self.visible {
            &self.segments
        } else {
            &[]
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

impl ViewObserver for GridOverlay {
    fn on_view_changed(&mut self, viewport: &Viewport) {
        self.segments = self.generator.generate(viewport);
    }
}
