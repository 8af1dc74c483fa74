//! Weighted-threshold risk scoring over extracted voice features.
//!
//! Each scored feature is mapped to a 0-1 "badness" by linear interpolation
//! between its healthy, warning and critical boundaries; the weighted mean of
//! those values is banded into a risk level. The levels are screening labels,
//! not a diagnosis.

use serde::{Deserialize, Serialize};

use crate::types::VoiceFeatures;

const WARNING_BADNESS: f64 = 0.5;
const LOW_RISK_CEILING: f64 = 0.40;
const MEDIUM_RISK_CEILING: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[serde(alias = "higherIsWorse", alias = "higher")]
    HigherIsWorse,
    #[serde(alias = "lowerIsWorse", alias = "lower")]
    LowerIsWorse,
}

/// Clinical boundaries for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub healthy: f64,
    pub warning: f64,
    pub critical: f64,
    pub direction: Direction,
}

impl Threshold {
    pub const fn higher_is_worse(healthy: f64, warning: f64, critical: f64) -> Self {
        Self {
            healthy,
            warning,
            critical,
            direction: Direction::HigherIsWorse,
        }
    }

    pub const fn lower_is_worse(healthy: f64, warning: f64, critical: f64) -> Self {
        Self {
            healthy,
            warning,
            critical,
            direction: Direction::LowerIsWorse,
        }
    }
}

/// Thresholds for the four scored features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalThresholds {
    pub jitter: Threshold,
    pub shimmer: Threshold,
    pub hnr: Threshold,
    #[serde(alias = "pitchVariation")]
    pub pitch_variation: Threshold,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            jitter: Threshold::higher_is_worse(1.04, 2.0, 3.5),
            shimmer: Threshold::higher_is_worse(3.81, 6.0, 10.0),
            hnr: Threshold::lower_is_worse(20.0, 12.0, 7.0),
            pitch_variation: Threshold::lower_is_worse(20.0, 12.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub jitter: f64,
    pub shimmer: f64,
    pub hnr: f64,
    #[serde(alias = "pitchVariation")]
    pub pitch_variation: f64,
}

impl FeatureWeights {
    pub fn total(&self) -> f64 {
        self.jitter + self.shimmer + self.hnr + self.pitch_variation
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            jitter: 0.30,
            shimmer: 0.28,
            hnr: 0.25,
            pitch_variation: 0.17,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= LOW_RISK_CEILING {
            RiskLevel::Low
        } else if score <= MEDIUM_RISK_CEILING {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Per-feature badness values in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub jitter: f64,
    pub shimmer: f64,
    pub hnr: f64,
    pub pitch_variation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub components: ComponentScores,
}

#[derive(Debug, Default, Clone)]
pub struct RiskScorer {
    thresholds: ClinicalThresholds,
    weights: FeatureWeights,
}

impl RiskScorer {
    pub fn new(thresholds: ClinicalThresholds, weights: FeatureWeights) -> Self {
        Self {
            thresholds,
            weights,
        }
    }

    pub fn score(&self, features: &VoiceFeatures) -> RiskAssessment {
        let components = ComponentScores {
            jitter: badness(features.jitter, &self.thresholds.jitter),
            shimmer: badness(features.shimmer, &self.thresholds.shimmer),
            hnr: badness(features.hnr, &self.thresholds.hnr),
            pitch_variation: badness(features.pitch_variation, &self.thresholds.pitch_variation),
        };
        let score = weighted_score(&components, &self.weights);
        RiskAssessment {
            score,
            level: RiskLevel::from_score(score),
            components,
        }
    }
}

/// Piecewise-linear badness: 0 at `healthy`, 0.5 at `warning`, 1 at `critical`.
pub fn badness(value: f64, threshold: &Threshold) -> f64 {
    if !value.is_finite() {
        return 1.0;
    }
    // Mirror lower-is-worse features so both directions rise with badness.
    let (value, healthy, warning, critical) = match threshold.direction {
        Direction::HigherIsWorse => (
            value,
            threshold.healthy,
            threshold.warning,
            threshold.critical,
        ),
        Direction::LowerIsWorse => (
            -value,
            -threshold.healthy,
            -threshold.warning,
            -threshold.critical,
        ),
    };
    let band = if value <= healthy {
        0.0
    } else if value <= warning {
        WARNING_BADNESS * ratio(value - healthy, warning - healthy)
    } else if value < critical {
        WARNING_BADNESS + (1.0 - WARNING_BADNESS) * ratio(value - warning, critical - warning)
    } else {
        1.0
    };
    band.clamp(0.0, 1.0)
}

fn ratio(offset: f64, span: f64) -> f64 {
    if span > 0.0 {
        offset / span
    } else {
        1.0
    }
}

fn weighted_score(components: &ComponentScores, weights: &FeatureWeights) -> f64 {
    let total = weights.total();
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    let sum = components.jitter * weights.jitter
        + components.shimmer * weights.shimmer
        + components.hnr * weights.hnr
        + components.pitch_variation * weights.pitch_variation;
    (sum / total).clamp(0.0, 1.0)
}
