//! Cycle-to-cycle period perturbation from rising zero crossings.

use tracing::debug;

use super::statistics::{mean, mean_abs_successive_difference};

pub const DEFAULT_JITTER_PERCENT: f64 = 0.5;
const MIN_PERIOD_RATIO: f64 = 0.5;
const MAX_PERIOD_RATIO: f64 = 2.0;

/// Relative period jitter (%) given the recording's pitch estimate.
pub fn estimate_jitter(samples: &[f32], sample_rate: u32, pitch: f64) -> f64 {
    if sample_rate == 0 || !pitch.is_finite() || pitch <= 0.0 {
        return DEFAULT_JITTER_PERCENT;
    }
    let expected = sample_rate as f64 / pitch;
    let periods = accepted_periods(samples, expected);

    let jitter = mean_abs_successive_difference(&periods)
        .zip(mean(&periods))
        .filter(|(_, mean_period)| *mean_period > 0.0)
        .map(|(perturbation, mean_period)| perturbation / mean_period * 100.0);
    match jitter {
        Some(value) if value.is_finite() => value,
        _ => {
            debug!(
                periods = periods.len(),
                "too few usable periods; using default jitter"
            );
            DEFAULT_JITTER_PERCENT
        }
    }
}

/// Distances between rising crossings that lie within an octave of `expected`.
fn accepted_periods(samples: &[f32], expected: f64) -> Vec<f64> {
    let low = expected * MIN_PERIOD_RATIO;
    let high = expected * MAX_PERIOD_RATIO;
    rising_crossings(samples)
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .filter(|period| (low..=high).contains(period))
        .collect()
}

fn rising_crossings(samples: &[f32]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] <= 0.0 && pair[1] > 0.0)
        .map(|(idx, _)| idx + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_train(periods: &[usize]) -> Vec<f32> {
        let mut samples = vec![-1.0];
        for &period in periods {
            samples.push(1.0);
            samples.extend(std::iter::repeat_n(-1.0, period - 1));
        }
        samples
    }

    #[test]
    fn finds_rising_crossings_only() {
        let samples = [0.0, 1.0, 0.5, -0.5, 0.0, 0.2, -0.1];
        assert_eq!(rising_crossings(&samples), vec![1, 5]);
    }

    #[test]
    fn alternating_periods_give_known_jitter() {
        let samples = pulse_train(&[100, 110, 100, 110, 100, 110, 100]);
        // accepted periods: 100, 110, 100, 110, 100, 110 -> diff 10, mean 105
        let jitter = estimate_jitter(&samples, 10_000, 100.0);
        assert!((jitter - 10.0 / 105.0 * 100.0).abs() < 1e-9, "{jitter}");
    }

    #[test]
    fn octave_errors_are_rejected() {
        let samples = pulse_train(&[100, 100, 30, 100, 400, 100, 100]);
        // 30 and 400 fall outside [50, 200]
        let jitter = estimate_jitter(&samples, 10_000, 100.0);
        assert!(jitter.abs() < 1e-9, "{jitter}");
    }

    #[test]
    fn silence_and_bad_pitch_fall_back() {
        assert_eq!(
            estimate_jitter(&vec![0.0; 4_096], 44_100, 150.0),
            DEFAULT_JITTER_PERCENT
        );
        let samples = pulse_train(&[100, 100, 100]);
        assert_eq!(
            estimate_jitter(&samples, 10_000, 0.0),
            DEFAULT_JITTER_PERCENT
        );
        assert_eq!(
            estimate_jitter(&samples, 10_000, f64::NAN),
            DEFAULT_JITTER_PERCENT
        );
        assert_eq!(estimate_jitter(&samples, 0, 150.0), DEFAULT_JITTER_PERCENT);
    }
}
