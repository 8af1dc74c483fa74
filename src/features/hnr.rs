//! Harmonics-to-noise ratio approximated from frame energy against the
//! energy of the first difference ("roughness"), in decibels.

use tracing::debug;

pub const FRAME_SIZE: usize = 2048;
pub const NOISE_SCALE: f64 = 0.1;
pub const MIN_HNR_DB: f64 = 0.0;
pub const MAX_HNR_DB: f64 = 40.0;
pub const DEFAULT_HNR_DB: f64 = 25.0;

pub fn estimate_hnr(samples: &[f32]) -> f64 {
    let (signal, noise) = samples
        .chunks_exact(FRAME_SIZE)
        .map(frame_powers)
        .fold((0.0, 0.0), |(signal, noise), (s, n)| (signal + s, noise + n));

    if noise == 0.0 {
        debug!("no noise energy; using default hnr");
        return DEFAULT_HNR_DB;
    }
    let hnr = 10.0 * (signal / noise).log10();
    if hnr.is_finite() {
        hnr.clamp(MIN_HNR_DB, MAX_HNR_DB)
    } else {
        DEFAULT_HNR_DB
    }
}

/// (mean squared sample, scaled mean squared first difference)
fn frame_powers(frame: &[f32]) -> (f64, f64) {
    let signal = frame.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / frame.len() as f64;
    let diffs = frame.len() - 1;
    let roughness = frame
        .windows(2)
        .map(|pair| (pair[1] as f64 - pair[0] as f64).powi(2))
        .sum::<f64>()
        / diffs as f64;
    (signal, roughness * NOISE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_frames_have_no_noise() {
        assert_eq!(estimate_hnr(&vec![0.6; FRAME_SIZE * 2]), DEFAULT_HNR_DB);
        assert_eq!(estimate_hnr(&vec![0.0; FRAME_SIZE]), DEFAULT_HNR_DB);
    }

    #[test]
    fn short_buffer_falls_back() {
        assert_eq!(estimate_hnr(&[0.1, -0.4, 0.9]), DEFAULT_HNR_DB);
    }

    #[test]
    fn alternating_signal_is_mostly_roughness() {
        // signal power 1, roughness 4 * 0.1 -> 10*log10(2.5) ~ 3.98 dB
        let samples: Vec<f32> = (0..FRAME_SIZE)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let hnr = estimate_hnr(&samples);
        assert!((hnr - 10.0 * 2.5_f64.log10()).abs() < 1e-9, "{hnr}");
    }

    #[test]
    fn smooth_tone_hits_ceiling() {
        let samples: Vec<f32> = (0..FRAME_SIZE * 4)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / 44_100.0).sin())
            .collect();
        assert_eq!(estimate_hnr(&samples), MAX_HNR_DB);
    }
}
