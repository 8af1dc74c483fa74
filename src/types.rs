//! Core types shared by the decoder, the extractor and the scorer

use serde::{Deserialize, Serialize};

/// Decoded mono audio (f32 samples) ready for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSampleBuffer {
    /// Audio samples, nominally in [-1.0, 1.0]
    samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 44100)
    sample_rate: u32,
}

impl AudioSampleBuffer {
    /// Wrap decoded samples. Non-finite samples are replaced with silence.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32) -> Self {
        samples.iter_mut().for_each(|s| {
            if !s.is_finite() {
                *s = 0.0;
            }
        });
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Acoustic measurements extracted from one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceFeatures {
    /// Median fundamental frequency (Hz)
    pub pitch: f64,
    /// Standard deviation of per-frame pitch (Hz)
    pub pitch_variation: f64,
    /// Relative cycle-length perturbation (%)
    pub jitter: f64,
    /// Relative cycle-amplitude perturbation (%)
    pub shimmer: f64,
    /// Harmonics-to-noise ratio (dB), always within [0, 40]
    pub hnr: f64,
    /// Recording length (s)
    pub duration: f64,
    /// RMS of the whole buffer
    pub amplitude: f64,
    /// Exactly four spectral peak frequencies (Hz)
    pub formants: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_non_finite_samples() {
        let buffer = AudioSampleBuffer::new(vec![0.5, f32::NAN, f32::INFINITY, -0.5], 8_000);
        assert_eq!(buffer.samples(), &[0.5, 0.0, 0.0, -0.5]);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buffer = AudioSampleBuffer::new(vec![0.0; 22_050], 44_100);
        assert!((buffer.duration() - 0.5).abs() < 1e-12);
        assert_eq!(AudioSampleBuffer::new(vec![0.0; 10], 0).duration(), 0.0);
    }

    #[test]
    fn features_serialize_with_camel_case_keys() {
        let features = VoiceFeatures {
            pitch: 150.0,
            pitch_variation: 10.0,
            jitter: 0.5,
            shimmer: 3.0,
            hnr: 25.0,
            duration: 1.0,
            amplitude: 0.0,
            formants: vec![500.0, 1500.0, 2500.0, 3500.0],
        };
        let json = serde_json::to_string(&features).unwrap();
        assert!(json.contains("\"pitchVariation\":10.0"));
        let parsed: VoiceFeatures = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, features);
    }
}
