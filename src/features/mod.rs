pub mod formants;
pub mod hnr;
pub mod jitter;
pub mod pitch;
pub mod shimmer;
mod statistics;

use tracing::debug;

use crate::parallel;
use crate::types::{AudioSampleBuffer, VoiceFeatures};

use formants::{default_formant, estimate_formants, MAX_FORMANTS};
use hnr::{estimate_hnr, DEFAULT_HNR_DB, MAX_HNR_DB, MIN_HNR_DB};
use jitter::{estimate_jitter, DEFAULT_JITTER_PERCENT};
use pitch::{estimate_pitch, DEFAULT_PITCH_HZ, DEFAULT_PITCH_VARIATION_HZ};
use shimmer::{estimate_shimmer, DEFAULT_SHIMMER_PERCENT};

/// Turns a decoded recording into its acoustic measurements.
///
/// Extraction is total: short, silent or otherwise degenerate buffers yield the
/// documented default for each measurement instead of an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureExtractor {}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, buffer: &AudioSampleBuffer) -> VoiceFeatures {
        let samples = buffer.samples();
        let sample_rate = buffer.sample_rate();

        let pitch = estimate_pitch(samples, sample_rate);
        let jitter = estimate_jitter(samples, sample_rate, pitch.pitch);
        let shimmer = estimate_shimmer(samples);
        let hnr = estimate_hnr(samples);
        let formants = complete_formants(estimate_formants(samples, sample_rate));

        let features = VoiceFeatures {
            pitch: finite_or(pitch.pitch, DEFAULT_PITCH_HZ),
            pitch_variation: finite_or(pitch.variation, DEFAULT_PITCH_VARIATION_HZ),
            jitter: finite_or(jitter, DEFAULT_JITTER_PERCENT),
            shimmer: finite_or(shimmer, DEFAULT_SHIMMER_PERCENT),
            hnr: finite_or(hnr, DEFAULT_HNR_DB).clamp(MIN_HNR_DB, MAX_HNR_DB),
            duration: finite_or(buffer.duration(), 0.0),
            amplitude: finite_or(statistics::rms(samples), 0.0),
            formants,
        };
        debug!(
            samples = samples.len(),
            sample_rate,
            pitch = features.pitch,
            jitter = features.jitter,
            shimmer = features.shimmer,
            hnr = features.hnr,
            "voice features extracted"
        );
        features
    }
}

/// Extract features from a single buffer with the default extractor.
pub fn extract_features(buffer: &AudioSampleBuffer) -> VoiceFeatures {
    FeatureExtractor::new().extract(buffer)
}

/// Extract several independent buffers on a bounded set of worker threads.
///
/// Results keep the order of `buffers`. Extraction never fails, so a worker
/// panic is a bug and is re-raised on the caller.
pub fn extract_batch(buffers: &[AudioSampleBuffer]) -> Vec<VoiceFeatures> {
    let extractor = FeatureExtractor::new();
    let workers = parallel::default_workers();
    parallel::map_bounded(buffers, workers, |buffer| extractor.extract(buffer))
}

/// Pad (with the synthetic `500 + 1000 * index` values) or cut to exactly four.
fn complete_formants(mut formants: Vec<f64>) -> Vec<f64> {
    for (index, value) in formants.iter_mut().enumerate() {
        if !value.is_finite() {
            *value = default_formant(index);
        }
    }
    while formants.len() < MAX_FORMANTS {
        formants.push(default_formant(formants.len()));
    }
    formants.truncate(MAX_FORMANTS);
    formants
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formants_are_completed_to_four() {
        assert_eq!(
            complete_formants(vec![700.0]),
            vec![700.0, 1500.0, 2500.0, 3500.0]
        );
        assert_eq!(
            complete_formants(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        assert_eq!(
            complete_formants(vec![f64::NAN, 900.0, 2100.0]),
            vec![500.0, 900.0, 2100.0, 3500.0]
        );
    }

    #[test]
    fn empty_buffer_resolves_to_defaults() {
        let features = extract_features(&AudioSampleBuffer::new(Vec::new(), 44_100));
        assert_eq!(features.pitch, DEFAULT_PITCH_HZ);
        assert_eq!(features.pitch_variation, DEFAULT_PITCH_VARIATION_HZ);
        assert_eq!(features.jitter, DEFAULT_JITTER_PERCENT);
        assert_eq!(features.shimmer, DEFAULT_SHIMMER_PERCENT);
        assert_eq!(features.hnr, DEFAULT_HNR_DB);
        assert_eq!(features.duration, 0.0);
        assert_eq!(features.amplitude, 0.0);
        assert_eq!(features.formants, vec![500.0, 1500.0, 2500.0, 3500.0]);
    }

    #[test]
    fn zero_sample_rate_does_not_panic() {
        let features = extract_features(&AudioSampleBuffer::new(vec![0.25; 5_000], 0));
        assert_eq!(features.duration, 0.0);
        assert!((features.amplitude - 0.25).abs() < 1e-9);
        assert_eq!(features.formants.len(), 4);
    }
}
