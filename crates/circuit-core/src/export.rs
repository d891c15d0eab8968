//! Static vector export of tracks.
//!
//! Points are projected to pixel space, upscaled, quantized to 0.1 px and
//! reduced by dropping consecutive duplicates. Tracks with no quantized point
//! inside the (scaled) viewport are left out.

use std::fmt::Write;

use serde::Serialize;

use crate::geo::{GeoPoint, PixelBounds, PlanarPoint, Viewport};
use crate::projection::WebMercator;
use crate::style::LineStyle;

/// Sub-pixel resolution of exported coordinates (tenths of a pixel).
const QUANTUM: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPath {
    pub points: Vec<PlanarPoint>,
    /// Track style with the stroke width already multiplied by the scale.
    pub style: LineStyle,
}

fn quantize(pixel: PlanarPoint, scale: f64) -> PlanarPoint {
    PlanarPoint::new(
        (pixel.x * scale * QUANTUM).round() / QUANTUM,
        (pixel.y * scale * QUANTUM).round() / QUANTUM,
    )
}

/// Project, upscale and quantize `points`, keeping a point only when it
/// differs from the previously kept one. Later revisits are preserved.
pub fn quantize_path(points: &[GeoPoint], zoom: f64, scale: u32) -> Vec<PlanarPoint> {
    let projection = WebMercator;
    let scale = scale as f64;
    let mut kept: Vec<PlanarPoint> = Vec::with_capacity(points.len());
    for point in points {
        let q = quantize(projection.to_pixel(*point, zoom), scale);
        if kept.last() != Some(&q) {
            kept.push(q);
        }
    }
    kept
}

/// Build the export path for one track, or `None` when it lies entirely
/// outside the scaled viewport. A zero scale exports nothing.
pub fn export_track(
    points: &[GeoPoint],
    style: &LineStyle,
    viewport: &Viewport,
    scale: u32,
) -> Option<ExportPath> {
    if scale == 0 {
        return None;
    }
    let bounds = viewport.pixel_bounds().scaled(scale as f64);
    let quantized = quantize_path(points, viewport.zoom, scale);
    if !quantized.iter().any(|p| bounds.contains(*p)) {
        return None;
    }

    let mut style = style.clone();
    style.weight *= scale as f64;
    Some(ExportPath {
        points: quantized,
        style,
    })
}

/// Serialize paths into a standalone SVG document framed by `bounds`.
pub fn render_svg(paths: &[ExportPath], bounds: &PixelBounds) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        bounds.min.x,
        bounds.min.y,
        bounds.width(),
        bounds.height()
    );
    svg.push_str("<g>\n");
    for path in paths {
        let _ = writeln!(
            svg,
            r#"<path stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round" fill="none" d="{}"/>"#,
            xml_escape(&path.style.color),
            path.style.opacity,
            path.style.weight,
            path_data(&path.points)
        );
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

fn path_data(points: &[PlanarPoint]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        let _ = write!(d, "{cmd}{} {}", p.x, p.y);
    }
    d
}

fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
