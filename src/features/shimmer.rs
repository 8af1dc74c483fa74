//! Frame-to-frame peak amplitude perturbation.

use tracing::debug;

use super::statistics::{mean, mean_abs_successive_difference};

pub const FRAME_SIZE: usize = 512;
pub const DEFAULT_SHIMMER_PERCENT: f64 = 3.0;

pub fn estimate_shimmer(samples: &[f32]) -> f64 {
    let peaks: Vec<f64> = samples
        .chunks_exact(FRAME_SIZE)
        .map(|frame| frame.iter().fold(0.0_f32, |peak, s| peak.max(s.abs())) as f64)
        .collect();

    let shimmer = mean_abs_successive_difference(&peaks)
        .zip(mean(&peaks))
        .filter(|(_, mean_peak)| *mean_peak > 0.0)
        .map(|(perturbation, mean_peak)| perturbation / mean_peak * 100.0);
    match shimmer {
        Some(value) if value.is_finite() => value,
        _ => {
            debug!(
                frames = peaks.len(),
                "no usable peaks; using default shimmer"
            );
            DEFAULT_SHIMMER_PERCENT
        }
    }
}
