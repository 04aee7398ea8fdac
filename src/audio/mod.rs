//! Audio sources and PCM utilities.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod source;
pub mod wav;

pub use source::{AudioSource, MockAudioSource};
pub use wav::WavAudioSource;

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// # Returns
/// Normalized RMS value (0.0 to 1.0), where:
/// - 0.0 represents silence
/// - ~0.707 represents a full-scale sine wave
/// - 1.0 represents maximum amplitude
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_silence_is_zero() {
        let silence = vec![0i16; 1000];
        assert_eq!(calculate_rms(&silence), 0.0);
    }

    #[test]
    fn test_rms_max_amplitude() {
        let max_signal = vec![i16::MAX; 1000];
        let rms = calculate_rms(&max_signal);
        assert!((rms - 1.0).abs() < 0.001, "RMS should be ~1.0, got {}", rms);
    }

    #[test]
    fn test_rms_negative_samples() {
        let negative_signal = vec![i16::MIN; 1000];
        let rms = calculate_rms(&negative_signal);
        assert!(rms > 0.99, "RMS should be ~1.0 for i16::MIN, got {}", rms);
    }

    #[test]
    fn test_rms_empty_samples() {
        let empty: Vec<i16> = vec![];
        assert_eq!(calculate_rms(&empty), 0.0);
    }

    #[test]
    fn test_rms_mixed_positive_negative() {
        let mut mixed = vec![1000i16; 500];
        mixed.extend(vec![-1000i16; 500]);
        let rms = calculate_rms(&mixed);
        // RMS of ±1000 should be around 1000/32767 ≈ 0.0305
        assert!(
            rms > 0.025 && rms < 0.035,
            "RMS should be ~0.0305, got {}",
            rms
        );
    }
}
