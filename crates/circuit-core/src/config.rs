//! Construction-time configuration of the overlay engine.
//!
//! Every value here is fixed once the engine is built. Defaults describe the
//! home field: winch-launch baseline, 250 m grid, 700 m circuit limit.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::geo::GeoPoint;
use crate::style::{ActivityKind, ActivityRule, LineOptions, LineStyle};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub baseline: BaselineConfig,
    pub grid: GridConfig,
    pub classifier: ClassifierConfig,
    /// Default line options for newly ingested tracks.
    pub line: LineOptions,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Start anchor (extended launch strip)
    pub start: GeoPoint,
    /// End anchor (winch)
    pub end: GeoPoint,
    pub utm_zone: u8,
    pub north: bool,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            start: GeoPoint::new(51.55166, 4.93284),
            end: GeoPoint::new(51.56619, 4.94022),
            utm_zone: 31,
            north: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing_m: f64,
    /// Padding around the viewport, in grid steps.
    pub padding_steps: f64,
    /// Upper bound on gridlines per local axis.
    pub max_lines_per_axis: usize,
    pub line_style: LineStyle,
    pub baseline_style: LineStyle,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing_m: 250.0,
            padding_steps: 1.5,
            max_lines_per_axis: 2_000,
            line_style: LineStyle {
                color: "#ffffff".to_string(),
                weight: 1.0,
                opacity: 0.25,
                dash_array: None,
            },
            baseline_style: LineStyle {
                color: "#ffcc00".to_string(),
                weight: 2.0,
                opacity: 0.9,
                dash_array: Some("6 4".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Tracks straying strictly further than this from the baseline are flagged.
    pub deviation_threshold_m: f64,
    pub deviation_color: String,
    pub min_deviation_weight: f64,
    pub activity_rules: Vec<ActivityRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            deviation_threshold_m: 700.0,
            deviation_color: "#ff3b3b".to_string(),
            min_deviation_weight: 2.0,
            activity_rules: vec![
                ActivityRule {
                    kind: ActivityKind::Walk,
                    markers: vec!["-Hike.gpx".into(), "-Walk.gpx".into()],
                    color: "#ffc0cb".into(),
                },
                ActivityRule {
                    kind: ActivityKind::Run,
                    markers: vec!["-Run.gpx".into()],
                    color: "#ff0000".into(),
                },
                ActivityRule {
                    kind: ActivityKind::Ride,
                    markers: vec!["-Ride.gpx".into()],
                    color: "#00ffff".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Upscale factor for high-resolution export.
    pub scale: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

impl OverlayConfig {
    /// Defaults with overrides from `CIRCUIT_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `CIRCUIT_*` overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Some(spacing) = env::var("CIRCUIT_GRID_SPACING_M")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.grid.spacing_m = spacing;
        }
        if let Some(threshold) = env::var("CIRCUIT_DEVIATION_THRESHOLD_M")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.classifier.deviation_threshold_m = threshold;
        }
        if let Some(zone) = env::var("CIRCUIT_UTM_ZONE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.baseline.utm_zone = zone;
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| OverlayError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.grid.spacing_m.is_finite() && self.grid.spacing_m > 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "grid spacing must be positive, got {}",
                self.grid.spacing_m
            )));
        }
        if !(self.grid.padding_steps.is_finite() && self.grid.padding_steps >= 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "grid padding must be non-negative, got {}",
                self.grid.padding_steps
            )));
        }
        if self.grid.max_lines_per_axis == 0 {
            return Err(OverlayError::InvalidConfig(
                "max_lines_per_axis must be at least 1".to_string(),
            ));
        }
        if !(self.classifier.deviation_threshold_m.is_finite()
            && self.classifier.deviation_threshold_m >= 0.0)
        {
            return Err(OverlayError::InvalidConfig(format!(
                "deviation threshold must be non-negative, got {}",
                self.classifier.deviation_threshold_m
            )));
        }
        if !(1..=60).contains(&self.baseline.utm_zone) {
            return Err(OverlayError::InvalidConfig(format!(
                "UTM zone {} outside 1..=60",
                self.baseline.utm_zone
            )));
        }
        if self.export.scale == 0 {
            return Err(OverlayError::InvalidConfig(
                "export scale must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
