//! Deviation-based track classification.

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::style::{ActivityKind, LineOptions, LineStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "class", content = "activity")]
pub enum TrackClass {
    /// Strayed further from the baseline than the configured limit
    Deviation,
    Activity(ActivityKind),
    Default,
}

impl TrackClass {
    pub fn label(&self) -> &'static str {
        match self {
            TrackClass::Deviation => "deviation",
            TrackClass::Activity(ActivityKind::Walk) => "walk",
            TrackClass::Activity(ActivityKind::Run) => "run",
            TrackClass::Activity(ActivityKind::Ride) => "ride",
            TrackClass::Default => "default",
        }
    }
}

/// Assigns a class and render style from a track's deviation and filename.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn threshold_m(&self) -> f64 {
        self.config.deviation_threshold_m
    }

    /// First match wins: deviation, then activity marker, then defaults.
    pub fn classify(
        &self,
        max_offset_m: f64,
        filename: &str,
        options: &LineOptions,
    ) -> (TrackClass, LineStyle) {
        let mut style = options.style();

        if max_offset_m > self.config.deviation_threshold_m {
            style.color = self.config.deviation_color.clone();
            style.weight = style.weight.max(self.config.min_deviation_weight);
            return (TrackClass::Deviation, style);
        }

        if options.detect_colors {
            if let Some(rule) = self
                .config
                .activity_rules
                .iter()
                .find(|rule| rule.matches(filename))
            {
                style.color = rule.color.clone();
                return (TrackClass::Activity(rule.kind), style);
            }
        }

        (TrackClass::Default, style)
    }
}
