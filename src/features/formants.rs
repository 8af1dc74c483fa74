//! Spectral peak picking on the first analysis frame.
//!
//! This is a coarse single-frame heuristic: the magnitude spectrum of the
//! opening frame is scanned upward through the speech band and every local
//! maximum that ends a rising run is reported.

use rustfft::{num_complex::Complex, FftPlanner};
use tracing::debug;

pub const FRAME_SIZE: usize = 2048;
pub const MIN_FORMANT_HZ: f64 = 200.0;
pub const MAX_FORMANT_HZ: f64 = 4000.0;
pub const MAX_FORMANTS: usize = 4;
pub const MIN_FORMANTS: usize = 3;

/// Synthetic formant used when a slot has no detected peak.
pub fn default_formant(index: usize) -> f64 {
    500.0 + 1000.0 * index as f64
}

/// Between three and four formant frequencies (Hz), padded to three.
pub fn estimate_formants(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    let frame = &samples[..samples.len().min(FRAME_SIZE)];
    let mut formants = spectral_peaks(frame, sample_rate);
    if formants.len() < MIN_FORMANTS {
        debug!(
            detected = formants.len(),
            "too few spectral peaks; padding formants"
        );
    }
    while formants.len() < MIN_FORMANTS {
        formants.push(default_formant(formants.len()));
    }
    formants.truncate(MAX_FORMANTS);
    formants
}

fn spectral_peaks(frame: &[f32], sample_rate: u32) -> Vec<f64> {
    let n = frame.len();
    if n < 2 || sample_rate == 0 {
        return Vec::new();
    }
    let magnitudes = magnitude_spectrum(frame);
    let bin_hz = sample_rate as f64 / n as f64;
    let band: Vec<usize> = (0..=n / 2)
        .filter(|&k| (MIN_FORMANT_HZ..=MAX_FORMANT_HZ).contains(&(k as f64 * bin_hz)))
        .collect();

    pick_peaks(&magnitudes, &band)
        .into_iter()
        .map(|k| k as f64 * bin_hz)
        .collect()
}

/// Bins that end a strictly rising run, scanning `band` upward.
fn pick_peaks(magnitudes: &[f64], band: &[usize]) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut rising = false;
    for pair in band.windows(2) {
        let (prev, current) = (magnitudes[pair[0]], magnitudes[pair[1]]);
        if current > prev {
            rising = true;
        } else if current < prev && rising {
            peaks.push(pair[0]);
            rising = false;
            if peaks.len() == MAX_FORMANTS {
                break;
            }
        }
    }
    peaks
}

fn magnitude_spectrum(frame: &[f32]) -> Vec<f64> {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(frame.len());
    let mut buffer: Vec<Complex<f64>> = frame
        .iter()
        .map(|&s| Complex::new(s as f64, 0.0))
        .collect();
    fft.process(&mut buffer);
    buffer.iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit impulses `spacing` samples apart: |X(k)| = 2|cos(pi k spacing / n)|.
    fn impulse_pair(spacing: usize, trailing: usize) -> Vec<f32> {
        let mut samples = vec![0.0; FRAME_SIZE + trailing];
        samples[0] = 1.0;
        samples[spacing] = 1.0;
        for (i, s) in samples.iter_mut().enumerate().skip(FRAME_SIZE) {
            *s = if i.is_multiple_of(3) { 0.8 } else { -0.3 };
        }
        samples
    }

    #[test]
    fn silence_is_padded_with_defaults() {
        assert_eq!(
            estimate_formants(&vec![0.0; FRAME_SIZE], 16_000),
            vec![500.0, 1500.0, 2500.0]
        );
        assert_eq!(estimate_formants(&[], 16_000), vec![500.0, 1500.0, 2500.0]);
        assert_eq!(
            estimate_formants(&[0.3; 64], 0),
            vec![500.0, 1500.0, 2500.0]
        );
    }

    #[test]
    fn caps_at_four_peaks_from_first_frame() {
        // 16 kHz / 2048 = 7.8125 Hz per bin; peaks every 64 bins
        let formants = estimate_formants(&impulse_pair(32, 4_096), 16_000);
        assert_eq!(formants, vec![500.0, 1000.0, 1500.0, 2000.0]);
    }

    #[test]
    fn three_peaks_need_no_padding() {
        // peaks every 128 bins; the one at 4000 Hz sits on the band edge
        let formants = estimate_formants(&impulse_pair(16, 0), 16_000);
        assert_eq!(formants, vec![1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn single_peak_is_padded_from_its_slot() {
        let formants = estimate_formants(&impulse_pair(6, 0), 16_000);
        assert_eq!(formants, vec![341.0 * 7.8125, 1500.0, 2500.0]);
    }

    #[test]
    fn plateau_does_not_end_a_rise() {
        let magnitudes = [1.0, 2.0, 2.0, 1.0, 1.0, 3.0, 0.5, 0.4, 0.9, 0.9];
        let band: Vec<usize> = (0..magnitudes.len()).collect();
        assert_eq!(pick_peaks(&magnitudes, &band), vec![2, 5]);
        assert_eq!(pick_peaks(&magnitudes, &band[3..]), vec![5]);
    }
}
