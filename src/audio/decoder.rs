use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::types::AudioSampleBuffer;

/// Turns compressed or containerized audio into mono f32 samples.
///
/// Implementations are built once by the caller and shared by reference, so
/// they must be usable from several extraction threads at once.
pub trait AudioDecoder: Send + Sync {
    /// Decode an in-memory recording. `extension` (e.g. `"wav"`) is a format hint.
    fn decode_bytes(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioSampleBuffer>;

    fn decode_file(&self, path: &Path) -> Result<AudioSampleBuffer>;
}

/// [`AudioDecoder`] backed by symphonia's default codec and format registries.
///
/// Only the first channel of the first audio track is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder {
    format_options: FormatOptions,
    decoder_options: DecoderOptions,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(format_options: FormatOptions, decoder_options: DecoderOptions) -> Self {
        Self {
            format_options,
            decoder_options,
        }
    }

    fn decode_source(
        &self,
        source: Box<dyn MediaSource>,
        extension: Option<&str>,
    ) -> Result<AudioSampleBuffer> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }

        let probe_result = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &self.format_options,
                &MetadataOptions::default(),
            )
            .context("Failed to probe audio format")?;

        let mut format = probe_result.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio tracks found")?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .context("Sample rate not specified in audio stream")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &self.decoder_options)
            .context("Failed to create decoder")?;

        let mut samples = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!(
                        decoded = samples.len(),
                        "stream changed parameters; keeping audio decoded so far"
                    );
                    break;
                }
                Err(err) => return Err(err).context("Failed to read packet"),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    warn!(reason, "skipping corrupt audio packet");
                    skipped_packets += 1;
                    continue;
                }
                Err(err) => return Err(err).context("Failed to decode audio packet"),
            };

            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }
            // Planar layout puts the whole first channel at the front.
            let mut planar = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
            planar.copy_planar_ref(decoded);
            samples.extend_from_slice(&planar.samples()[..frames]);
        }

        finish_stream(samples, sample_rate, skipped_packets)
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode_bytes(&self, bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioSampleBuffer> {
        self.decode_source(Box::new(Cursor::new(bytes)), extension)
    }

    fn decode_file(&self, path: &Path) -> Result<AudioSampleBuffer> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let extension = path.extension().and_then(|e| e.to_str());
        self.decode_source(Box::new(file), extension)
            .with_context(|| format!("Failed to decode audio file: {}", path.display()))
    }
}

/// A stream whose every packet was corrupt is an error, not silence.
fn finish_stream(
    samples: Vec<f32>,
    sample_rate: u32,
    skipped_packets: usize,
) -> Result<AudioSampleBuffer> {
    if samples.is_empty() && skipped_packets > 0 {
        bail!(
            "No decodable audio: all {} packets were corrupt",
            skipped_packets
        );
    }
    debug!(
        samples = samples.len(),
        sample_rate, skipped_packets, "audio stream decoded"
    );
    Ok(AudioSampleBuffer::new(samples, sample_rate))
}
