use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::scoring::{ClinicalThresholds, Direction, FeatureWeights, RiskScorer, Threshold};

/// Scoring configuration, loaded from JSON or taken from the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub thresholds: ClinicalThresholds,
    pub weights: FeatureWeights,
}

impl ScreeningConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let data = fs::read_to_string(p)
                    .with_context(|| format!("failed to read screening config {:?}", p))?;
                Self::from_json(&data)
                    .with_context(|| format!("invalid screening config {:?}", p))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).context("failed to parse screening config JSON")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        validate_threshold("jitter", &t.jitter)?;
        validate_threshold("shimmer", &t.shimmer)?;
        validate_threshold("hnr", &t.hnr)?;
        validate_threshold("pitch_variation", &t.pitch_variation)?;

        let w = &self.weights;
        for (name, weight) in [
            ("jitter", w.jitter),
            ("shimmer", w.shimmer),
            ("hnr", w.hnr),
            ("pitch_variation", w.pitch_variation),
        ] {
            ensure!(
                weight.is_finite() && weight >= 0.0,
                "weight for {} must be a non-negative number (got {})",
                name,
                weight
            );
        }
        ensure!(
            w.total() > 0.0,
            "at least one feature weight must be positive"
        );
        Ok(())
    }

    pub fn scorer(&self) -> RiskScorer {
        RiskScorer::new(self.thresholds, self.weights)
    }
}

fn validate_threshold(name: &str, threshold: &Threshold) -> Result<()> {
    let Threshold {
        healthy,
        warning,
        critical,
        direction,
    } = *threshold;
    ensure!(
        healthy.is_finite() && warning.is_finite() && critical.is_finite(),
        "{} thresholds must be finite",
        name
    );
    match direction {
        Direction::HigherIsWorse => ensure!(
            healthy < warning && warning < critical,
            "{} thresholds must increase healthy < warning < critical (got {} / {} / {})",
            name,
            healthy,
            warning,
            critical
        ),
        Direction::LowerIsWorse => ensure!(
            healthy > warning && warning > critical,
            "{} thresholds must decrease healthy > warning > critical (got {} / {} / {})",
            name,
            healthy,
            warning,
            critical
        ),
    }
    Ok(())
}
