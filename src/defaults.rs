//! Default configuration constants for meetscribe.
//!
//! Shared across config types and pipeline components to keep the batch and
//! live paths in agreement about audio format and analysis geometry.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Analysis window length in seconds for feature extraction.
pub const WINDOW_SEC: f64 = 1.0;

/// Hop between consecutive analysis windows in seconds.
///
/// Also the granularity of diarization segments: each feature frame becomes
/// one `[i*hop, (i+1)*hop)` segment.
pub const HOP_SEC: f64 = 0.5;

/// Number of cepstral coefficients per feature frame.
pub const NUM_CEPSTRA: usize = 13;

/// Number of triangular mel filters applied before the cepstral transform.
pub const NUM_MEL_FILTERS: usize = 26;

/// Default number of speakers to cluster when none is configured.
pub const DEFAULT_SPEAKERS: usize = 2;

/// Maximum EM iterations when fitting the speaker mixture model.
pub const EM_MAX_ITERATIONS: usize = 100;

/// Relative log-likelihood change below which EM is considered converged.
pub const EM_TOLERANCE: f64 = 1e-4;

/// Diagonal term added to covariance matrices before factorization.
///
/// Prevents singular covariances for degenerate clusters. Matches the
/// regularization used for the BIC segment comparison.
pub const COVARIANCE_FLOOR: f64 = 1e-6;

/// Speaker label used for words that fall outside every diarization segment.
pub const UNKNOWN_SPEAKER: &str = "Speaker_Unknown";

/// Default RMS threshold separating sound from silence in the live pipeline.
///
/// Normalized to [0.0, 1.0]; 0.02 is tuned for typical microphone input
/// levels and filters out ambient room noise.
pub const SILENCE_THRESHOLD: f32 = 0.02;

/// Default silence duration in milliseconds before a pause is signaled.
///
/// 1500ms allows natural gaps between words without splitting a sentence
/// into separate turns.
pub const SILENCE_DURATION_MS: u32 = 1500;

/// Timeout for each consumer poll of the live capture queue, in milliseconds.
///
/// Short enough that the consumer notices the stop flag promptly.
pub const QUEUE_POLL_MS: u64 = 100;

/// Bounded capacity of the producer/consumer chunk queue.
pub const QUEUE_CAPACITY: usize = 256;

/// Samples per chunk pushed by the live capture producer.
pub const CHUNK_SAMPLES: usize = 1600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_two_hops() {
        // Segment granularity assumes hop divides the window evenly.
        assert!((WINDOW_SEC / HOP_SEC - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chunk_duration_is_shorter_than_silence_window() {
        let chunk_ms = CHUNK_SAMPLES as f64 / SAMPLE_RATE as f64 * 1000.0;
        assert!(chunk_ms < SILENCE_DURATION_MS as f64);
    }
}
