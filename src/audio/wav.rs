//! WAV file decoding to the pipeline's native format (16 kHz mono i16).

use crate::audio::source::AudioSource;
use crate::defaults::{CHUNK_SAMPLES, SAMPLE_RATE};
use crate::error::{MeetscribeError, Result};
use std::io::Read;
use std::path::Path;

/// Audio source backed by decoded WAV data.
///
/// Accepts arbitrary sample rates and channel counts; everything is mixed
/// down to mono and resampled to 16 kHz before the first read.
pub struct WavAudioSource {
    samples: Vec<i16>,
    position: usize,
}

impl WavAudioSource {
    /// Create from a WAV file on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)))
    }

    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| MeetscribeError::AudioDecode {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let channels = spec.channels as usize;

        let raw_samples: Vec<i16> = match spec.sample_format {
            hound::SampleFormat::Int => wav_reader
                .samples::<i16>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MeetscribeError::AudioDecode {
                    message: format!("Failed to read WAV samples: {}", e),
                })?,
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MeetscribeError::AudioDecode {
                    message: format!("Failed to read WAV samples: {}", e),
                })?,
        };

        let mono = mixdown(&raw_samples, channels);
        let samples = if source_rate == SAMPLE_RATE {
            mono
        } else {
            resample(&mono, source_rate, SAMPLE_RATE)
        };

        Ok(Self {
            samples,
            position: 0,
        })
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Total duration of the decoded audio in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + CHUNK_SAMPLES, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(chunk)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Mix interleaved multi-channel audio down to mono by averaging channels.
pub fn mixdown(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

/// Convert 16-bit PCM to normalized f32 samples in [-1.0, 1.0].
pub fn pcm_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| s as f32 / i16::MAX as f32)
        .collect()
}
