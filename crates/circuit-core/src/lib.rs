pub mod baseline;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod geo;
pub mod grid;
pub mod offset;
pub mod projection;
pub mod spatial;
pub mod style;
pub mod track;

pub use baseline::{BaselineFrame, LocalPoint};
pub use classify::{Classifier, TrackClass};
pub use config::{BaselineConfig, ClassifierConfig, ExportConfig, GridConfig, OverlayConfig};
pub use engine::OverlayEngine;
pub use error::{OverlayError, Result};
pub use export::{export_track, quantize_path, render_svg, ExportPath};
pub use geo::{GeoBounds, GeoPoint, PixelBounds, PlanarPoint, Viewport};
pub use grid::{
    GridAxis, GridGenerator, GridLayout, GridOverlay, GridSegment, SegmentRole, ViewObserver,
};
pub use offset::max_lateral_offset;
pub use projection::{Projection, Utm, WebMercator};
pub use spatial::{haversine_distance, offset_by_bearing};
pub use style::{ActivityKind, ActivityRule, LineOptions, LineStyle};
pub use track::{Track, TrackFilter, TrackInput, TrackMetadata, TrackSummary};
