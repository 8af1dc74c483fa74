//! Autocorrelation pitch tracker.
//!
//! The buffer is cut into overlapping frames; in each frame the lag that
//! maximizes the raw autocorrelation `sum(x[i] * x[i + lag])` is converted to a
//! frequency. Implausible estimates are dropped, and the survivors are
//! summarized by their median and population standard deviation.

use tracing::debug;

use super::statistics::{median, population_std_dev};

pub const FRAME_SIZE: usize = 2048;
pub const HOP_SIZE: usize = 512;
pub const MIN_PITCH_HZ: f64 = 50.0;
pub const MAX_PITCH_HZ: f64 = 500.0;
pub const DEFAULT_PITCH_HZ: f64 = 150.0;
pub const DEFAULT_PITCH_VARIATION_HZ: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Median of the per-frame estimates (Hz)
    pub pitch: f64,
    /// Population standard deviation of the per-frame estimates (Hz)
    pub variation: f64,
}

pub fn estimate_pitch(samples: &[f32], sample_rate: u32) -> PitchEstimate {
    let frames = frame_pitches(samples, sample_rate);
    let pitch = median(&frames).unwrap_or_else(|| {
        debug!(
            frames = frames.len(),
            "no voiced frames; using default pitch"
        );
        DEFAULT_PITCH_HZ
    });
    let variation = population_std_dev(&frames).unwrap_or_else(|| {
        debug!(
            frames = frames.len(),
            "too few voiced frames; using default pitch variation"
        );
        DEFAULT_PITCH_VARIATION_HZ
    });
    PitchEstimate { pitch, variation }
}

/// Per-frame pitch estimates that fall inside the plausible voice range.
pub(crate) fn frame_pitches(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    if sample_rate == 0 || samples.len() < FRAME_SIZE {
        return Vec::new();
    }
    let min_lag = ((sample_rate as f64 / MAX_PITCH_HZ).floor() as usize).max(1);
    let max_lag = ((sample_rate as f64 / MIN_PITCH_HZ).floor() as usize).min(FRAME_SIZE - 1);
    if min_lag > max_lag {
        return Vec::new();
    }

    let mut pitches = Vec::new();
    let mut start = 0;
    while start + FRAME_SIZE <= samples.len() {
        let frame = &samples[start..start + FRAME_SIZE];
        if let Some(lag) = best_lag(frame, min_lag, max_lag) {
            let pitch = sample_rate as f64 / lag as f64;
            if (MIN_PITCH_HZ..=MAX_PITCH_HZ).contains(&pitch) {
                pitches.push(pitch);
            }
        }
        start += HOP_SIZE;
    }
    pitches
}

/// First lag with the strictly largest positive autocorrelation, if any.
fn best_lag(frame: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_corr = 0.0_f64;
    for lag in min_lag..=max_lag {
        let corr = autocorrelation(frame, lag);
        if corr > best_corr {
            best_corr = corr;
            best = Some(lag);
        }
    }
    best
}

fn autocorrelation(frame: &[f32], lag: usize) -> f64 {
    frame
        .iter()
        .zip(&frame[lag..])
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum()
}
