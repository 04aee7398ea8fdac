//! Speech recognition traits.
//!
//! The recognizer is an external collaborator: the pipeline only needs the
//! contracts below plus mocks for testing. A real backend (Vosk) lives
//! behind the `vosk` feature.

use crate::error::{MeetscribeError, Result};
use serde::Serialize;
use std::sync::Arc;

/// A recognized word with its timing inside the source audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedWord {
    pub word: String,
    /// Start time in seconds from the beginning of the audio.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl RecognizedWord {
    pub fn new(word: &str, start: f64, end: f64) -> Self {
        Self {
            word: word.to_string(),
            start,
            end,
        }
    }
}

/// A streaming recognition hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub enum Hypothesis {
    /// Mutable partial text; may be revised by the next chunk.
    Partial(String),
    /// Committed text for a completed utterance.
    Final(String),
}

/// Trait for batch speech recognition.
///
/// This trait allows swapping implementations (real Vosk vs mock).
pub trait Recognizer: Send + Sync {
    /// Recognize audio samples into a time-ordered word list.
    ///
    /// # Arguments
    /// * `audio` - Audio samples as 16-bit PCM at 16kHz mono
    fn recognize(&self, audio: &[i16]) -> Result<Vec<RecognizedWord>>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the recognizer is ready
    fn is_ready(&self) -> bool;
}

/// Implement Recognizer for Arc<T> to allow sharing across sessions.
impl<T: Recognizer> Recognizer for Arc<T> {
    fn recognize(&self, audio: &[i16]) -> Result<Vec<RecognizedWord>> {
        (**self).recognize(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Trait for incremental recognition over a live audio stream.
pub trait StreamingRecognizer: Send {
    /// Feed a chunk of 16-bit PCM and get the current hypothesis.
    fn accept(&mut self, chunk: &[i16]) -> Result<Hypothesis>;

    /// Flush and return any remaining committed text.
    fn finalize(&mut self) -> Result<Option<String>>;

    /// Reset decoder state for a fresh utterance stream.
    fn reset(&mut self);
}

/// Mock batch recognizer for testing
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    model_name: String,
    words: Vec<RecognizedWord>,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a new mock recognizer with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            words: Vec::new(),
            should_fail: false,
        }
    }

    /// Configure the mock to return specific words
    pub fn with_words(mut self, words: Vec<RecognizedWord>) -> Self {
        self.words = words;
        self
    }

    /// Configure the mock to fail on recognize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(&self, _audio: &[i16]) -> Result<Vec<RecognizedWord>> {
        if self.should_fail {
            Err(MeetscribeError::Recognition {
                message: "mock recognition failure".to_string(),
            })
        } else {
            Ok(self.words.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

/// Mock streaming recognizer that replays a scripted hypothesis sequence.
#[derive(Debug, Clone)]
pub struct MockStreamingRecognizer {
    script: Vec<Hypothesis>,
    position: usize,
    remainder: Option<String>,
}

impl MockStreamingRecognizer {
    /// Replays `script` one entry per accepted chunk, then empty partials.
    pub fn new(script: Vec<Hypothesis>) -> Self {
        Self {
            script,
            position: 0,
            remainder: None,
        }
    }

    /// Text returned once from `finalize`.
    pub fn with_remainder(mut self, text: &str) -> Self {
        self.remainder = Some(text.to_string());
        self
    }
}

impl StreamingRecognizer for MockStreamingRecognizer {
    fn accept(&mut self, _chunk: &[i16]) -> Result<Hypothesis> {
        let hypothesis = self
            .script
            .get(self.position)
            .cloned()
            .unwrap_or(Hypothesis::Partial(String::new()));
        self.position += 1;
        Ok(hypothesis)
    }

    fn finalize(&mut self) -> Result<Option<String>> {
        Ok(self.remainder.take())
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}
