//! Acoustic voice-marker extraction for speech screening.
//!
//! A recording is decoded into an [`AudioSampleBuffer`] by an injected
//! [`AudioDecoder`], reduced to a [`VoiceFeatures`] record (pitch, pitch
//! variation, jitter, shimmer, HNR, amplitude, formants, duration) and
//! optionally scored against clinical thresholds by a [`RiskScorer`].

pub mod audio;
pub mod cli;
pub mod config;
pub mod features;
pub mod parallel;
pub mod scoring;
pub mod types;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::info;

pub use audio::{AudioDecoder, SymphoniaDecoder};
pub use config::ScreeningConfig;
pub use features::{extract_batch, extract_features, FeatureExtractor};
pub use scoring::{RiskAssessment, RiskLevel, RiskScorer};
pub use types::{AudioSampleBuffer, VoiceFeatures};

/// Decode one recording and extract its features.
pub fn analyze_file<D: AudioDecoder + ?Sized>(decoder: &D, path: &Path) -> Result<VoiceFeatures> {
    let buffer = decoder.decode_file(path)?;
    info!(
        path = %path.display(),
        samples = buffer.len(),
        sample_rate = buffer.sample_rate(),
        "decoded recording"
    );
    Ok(extract_features(&buffer))
}

/// Decode and extract several recordings in parallel on the default number
/// of workers.
///
/// Results keep the order of `paths`; a failure for one file does not affect
/// the others.
pub fn analyze_files<D: AudioDecoder + ?Sized>(
    decoder: &D,
    paths: &[PathBuf],
) -> Vec<(PathBuf, Result<VoiceFeatures>)> {
    analyze_files_with_workers(decoder, paths, parallel::default_workers())
}

/// Like [`analyze_files`], but with at most `workers` recordings decoded at
/// once.
///
/// A decoder that panics on one file turns into an error for that file.
pub fn analyze_files_with_workers<D: AudioDecoder + ?Sized>(
    decoder: &D,
    paths: &[PathBuf],
    workers: usize,
) -> Vec<(PathBuf, Result<VoiceFeatures>)> {
    parallel::map_bounded(paths, workers, |path| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| analyze_file(decoder, path)))
            .unwrap_or_else(|_| Err(anyhow!("analysis of {:?} panicked", path)));
        (path.clone(), result)
    })
}
