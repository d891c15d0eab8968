//! Render styles for tracks and overlay lines.

use serde::{Deserialize, Serialize};

/// Stroke style handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

/// User-facing default line options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    /// When applied, replace the rendered style of every existing track.
    pub override_existing: bool,
    /// Color tracks by the activity marker in their filename.
    pub detect_colors: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            color: "#0CB1E8".to_string(),
            weight: 1.0,
            opacity: 0.5,
            override_existing: true,
            detect_colors: true,
        }
    }
}

impl LineOptions {
    pub fn style(&self) -> LineStyle {
        LineStyle {
            color: self.color.clone(),
            weight: self.weight,
            opacity: self.opacity,
            dash_array: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Walking or hiking
    Walk,
    Run,
    Ride,
}

/// Filename markers identifying one activity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRule {
    pub kind: ActivityKind,
    /// Substrings such as `-Run.gpx`; any match selects this rule.
    pub markers: Vec<String>,
    pub color: String,
}

impl ActivityRule {
    pub fn matches(&self, filename: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| filename.contains(marker.as_str()))
    }
}
