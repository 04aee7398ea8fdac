use crate::error::{MeetscribeError, Result};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// Must be safe to call more than once and after a failed `start`.
    fn stop(&mut self) -> Result<()>;

    /// Read audio samples captured since the previous read.
    ///
    /// # Returns
    /// Vector of 16-bit PCM audio samples, empty when nothing new arrived.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Returns true if this source is finite (a file) rather than a live device.
    fn is_finite(&self) -> bool {
        false
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    chunks: Vec<Vec<i16>>,
    position: usize,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            chunks: vec![vec![0i16; 160]],
            position: 0,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return the given chunks in order, then empty reads
    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(MeetscribeError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            self.position = 0;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(MeetscribeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }

        if self.position < self.chunks.len() {
            let chunk = self.chunks[self.position].clone();
            self.position += 1;
            Ok(chunk)
        } else {
            Ok(Vec::new())
        }
    }

    fn is_finite(&self) -> bool {
        true
    }
}
