//! GeoJSON rendering of overlay segments.

use circuit_core::{GridSegment, LineStyle, SegmentRole};
use serde_json::{json, Value};

/// One LineString feature per segment, styled by role. Coordinates are
/// `[lng, lat]` as GeoJSON requires.
pub fn segments_to_feature_collection<'a, F>(segments: &[GridSegment], style_for: F) -> Value
where
    F: Fn(&GridSegment) -> &'a LineStyle,
{
    let features: Vec<Value> = segments
        .iter()
        .map(|segment| {
            let style = style_for(segment);
            let (role, axis) = match segment.role {
                SegmentRole::Baseline => ("baseline", None),
                SegmentRole::Grid(axis) => ("grid", Some(axis)),
            };
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [
                        [segment.start.lng, segment.start.lat],
                        [segment.end.lng, segment.end.lat],
                    ],
                },
                "properties": {
                    "role": role,
                    "axis": axis,
                    "style": style,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
