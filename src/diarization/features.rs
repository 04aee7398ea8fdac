//! Spectral feature extraction: framing, Hann window, FFT power spectrum,
//! mel filterbank and cepstral transform.

use crate::defaults;
use ndarray::Array2;
use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;

/// Guard added before taking the log of mel energies.
const LOG_ZERO_GUARD: f32 = 1e-10;

/// Geometry and dimensionality of feature extraction.
#[derive(Debug, Clone, Copy)]
pub struct FeatureConfig {
    /// Sample rate of the input PCM.
    pub sample_rate: u32,
    /// Analysis window length in seconds.
    pub window_sec: f64,
    /// Hop between consecutive windows in seconds.
    pub hop_sec: f64,
    /// Cepstral coefficients kept per frame.
    pub num_cepstra: usize,
    /// Triangular mel filters applied before the cepstral transform.
    pub num_mel_filters: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_sec: defaults::WINDOW_SEC,
            hop_sec: defaults::HOP_SEC,
            num_cepstra: defaults::NUM_CEPSTRA,
            num_mel_filters: defaults::NUM_MEL_FILTERS,
        }
    }
}

impl FeatureConfig {
    /// Window length in samples.
    pub fn window_samples(&self) -> usize {
        (self.window_sec * self.sample_rate as f64) as usize
    }

    /// Hop length in samples.
    pub fn hop_samples(&self) -> usize {
        (self.hop_sec * self.sample_rate as f64) as usize
    }
}

/// Generate a Hann window of the given length.
pub fn hann_window(window_length: usize) -> Vec<f32> {
    (0..window_length)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / window_length as f32).cos())
        .collect()
}

/// Convert Hz to mel (Slaney formula).
fn hz_to_mel(hz: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f64).ln() / 27.0;

    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

/// Convert mel to Hz (Slaney formula).
fn mel_to_hz(mel: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = (6.4f64).ln() / 27.0;

    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        f_sp * mel
    }
}

/// Create a triangular mel filterbank matrix (`num_filters` x `freq_bins`).
fn create_mel_filterbank(config: &FeatureConfig, n_fft: usize) -> Array2<f32> {
    let num_filters = config.num_mel_filters;
    let freq_bins = n_fft / 2 + 1;
    let mut filterbank = Array2::<f32>::zeros((num_filters, freq_bins));

    let fftfreqs: Vec<f64> = (0..freq_bins)
        .map(|k| k as f64 * config.sample_rate as f64 / n_fft as f64)
        .collect();

    let fmax = config.sample_rate as f64 / 2.0;
    let fmin_mel = hz_to_mel(0.0);
    let fmax_mel = hz_to_mel(fmax);
    let mel_f: Vec<f64> = (0..=num_filters + 1)
        .map(|i| {
            let mel = fmin_mel + (fmax_mel - fmin_mel) * i as f64 / (num_filters + 1) as f64;
            mel_to_hz(mel)
        })
        .collect();

    let fdiff: Vec<f64> = mel_f.windows(2).map(|w| w[1] - w[0]).collect();

    for i in 0..num_filters {
        for k in 0..freq_bins {
            let lower = (fftfreqs[k] - mel_f[i]) / fdiff[i];
            let upper = (mel_f[i + 2] - fftfreqs[k]) / fdiff[i + 1];
            filterbank[[i, k]] = 0.0f64.max(lower.min(upper)) as f32;
        }
    }

    // Slaney-style area normalization
    for i in 0..num_filters {
        let enorm = 2.0 / (mel_f[i + 2] - mel_f[i]);
        for k in 0..freq_bins {
            filterbank[[i, k]] *= enorm as f32;
        }
    }

    filterbank
}

/// Type-II discrete cosine transform, keeping the first `num_cepstra` terms.
fn dct_ii(log_mel: &[f32], num_cepstra: usize) -> Vec<f32> {
    let m = log_mel.len();
    let scale = (2.0 / m as f32).sqrt();
    (0..num_cepstra)
        .map(|k| {
            let sum: f32 = log_mel
                .iter()
                .enumerate()
                .map(|(i, &v)| v * ((PI * k as f32 * (i as f32 + 0.5)) / m as f32).cos())
                .sum();
            sum * scale
        })
        .collect()
}

/// Extract cepstral feature vectors from mono PCM.
///
/// Returns one row per analysis frame; frame `i` covers
/// `[i*hop, i*hop + window)` in the input. Trailing samples that do not fill
/// a whole window are dropped, so audio shorter than one window yields an
/// empty (0 x num_cepstra) matrix. Pure and deterministic.
pub fn extract_features(samples: &[f32], config: &FeatureConfig) -> Array2<f32> {
    let window = config.window_samples();
    let hop = config.hop_samples();

    if window == 0 || hop == 0 || samples.len() < window {
        return Array2::zeros((0, config.num_cepstra));
    }

    let num_frames = (samples.len() - window) / hop + 1;
    let freq_bins = window / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(window);
    let hann = hann_window(window);
    let filterbank = create_mel_filterbank(config, window);

    let mut features = Array2::<f32>::zeros((num_frames, config.num_cepstra));
    let mut frame: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); window];
    let mut power = vec![0.0f32; freq_bins];

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop;
        for i in 0..window {
            frame[i] = Complex::new(samples[start + i] * hann[i], 0.0);
        }

        fft.process(&mut frame);
        for (k, p) in power.iter_mut().enumerate() {
            let magnitude = frame[k].norm();
            *p = magnitude * magnitude;
        }

        let log_mel: Vec<f32> = filterbank
            .rows()
            .into_iter()
            .map(|row| {
                let energy: f32 = row.iter().zip(power.iter()).map(|(&w, &p)| w * p).sum();
                (energy + LOG_ZERO_GUARD).ln()
            })
            .collect();
        let cepstra = dct_ii(&log_mel, config.num_cepstra);
        for (c, &value) in cepstra.iter().enumerate() {
            features[[frame_idx, c]] = value;
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, seconds: f64, rate: u32) -> Vec<f32> {
        let n = (seconds * rate as f64) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn hann_window_is_symmetric_and_bounded() {
        let w = hann_window(512);
        assert_eq!(w.len(), 512);
        assert!(w[0].abs() < 1e-6);
        for (i, &v) in w.iter().enumerate() {
            assert!((0.0..=1.0).contains(&v), "w[{}] = {}", i, v);
        }
        assert!((w[1] - w[511]).abs() < 1e-4);
    }

    #[test]
    fn mel_scale_round_trips() {
        for hz in [0.0, 250.0, 999.0, 1000.0, 4000.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() < 1e-6, "{} -> {}", hz, back);
        }
    }

    #[test]
    fn filterbank_rows_cover_spectrum() {
        let config = FeatureConfig::default();
        let filterbank = create_mel_filterbank(&config, 1024);
        assert_eq!(filterbank.nrows(), config.num_mel_filters);
        for (i, row) in filterbank.rows().into_iter().enumerate() {
            let sum: f32 = row.sum();
            assert!(sum > 0.0, "filter {} is empty", i);
        }
    }

    #[test]
    fn frame_count_follows_window_and_hop() {
        let config = FeatureConfig::default();
        // 3 seconds at 16kHz: frames at 0.0, 0.5, 1.0, 1.5, 2.0 (window 1.0s)
        let audio = tone(440.0, 3.0, config.sample_rate);
        let features = extract_features(&audio, &config);
        assert_eq!(features.nrows(), 5);
        assert_eq!(features.ncols(), 13);
    }

    #[test]
    fn short_audio_yields_no_frames() {
        let config = FeatureConfig::default();
        let audio = tone(440.0, 0.5, config.sample_rate); // shorter than one window
        let features = extract_features(&audio, &config);
        assert_eq!(features.nrows(), 0);
        assert_eq!(features.ncols(), 13);
    }

    #[test]
    fn extraction_is_deterministic() {
        let config = FeatureConfig::default();
        let audio = tone(200.0, 2.0, config.sample_rate);
        let a = extract_features(&audio, &config);
        let b = extract_features(&audio, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn different_tones_produce_different_features() {
        let config = FeatureConfig::default();
        let low = extract_features(&tone(150.0, 1.5, config.sample_rate), &config);
        let high = extract_features(&tone(3000.0, 1.5, config.sample_rate), &config);

        let row_l = low.row(0);
        let row_h = high.row(0);
        let distance: f32 = row_l
            .iter()
            .zip(row_h.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        assert!(distance > 1.0, "expected separation, got {}", distance);
    }
}
