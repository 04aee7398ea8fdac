//! Vosk-backed recognition (feature `vosk`).
//!
//! The model handle is constructed explicitly at startup and shared by
//! reference; there is no global model state.

use crate::defaults::SAMPLE_RATE;
use crate::error::{MeetscribeError, Result};
use crate::stt::recognizer::{Hypothesis, RecognizedWord, Recognizer, StreamingRecognizer};
use std::path::Path;
use std::sync::Mutex;
use vosk::{DecodingState, Model};

/// Samples fed to the decoder per batch step.
const BATCH_CHUNK: usize = 4000;

/// Loaded Vosk model plus its source path for diagnostics.
pub struct VoskModel {
    model: Model,
    name: String,
}

impl VoskModel {
    /// Load a model directory, surfacing download guidance when missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(MeetscribeError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let name = path.display().to_string();
        let model = Model::new(&name).ok_or_else(|| MeetscribeError::ModelNotFound {
            path: name.clone(),
        })?;

        Ok(Self { model, name })
    }
}

/// Batch recognizer over a shared [`VoskModel`].
///
/// The underlying decoder is stateful, so it sits behind a mutex; each
/// `recognize` call resets it for a fresh pass over the audio.
pub struct VoskRecognizer<'m> {
    model: &'m VoskModel,
    decoder: Mutex<vosk::Recognizer>,
}

impl<'m> VoskRecognizer<'m> {
    pub fn new(model: &'m VoskModel) -> Result<Self> {
        let mut decoder = vosk::Recognizer::new(&model.model, SAMPLE_RATE as f32).ok_or_else(
            || MeetscribeError::Recognition {
                message: "failed to construct Vosk decoder".to_string(),
            },
        )?;
        decoder.set_words(true);

        Ok(Self {
            model,
            decoder: Mutex::new(decoder),
        })
    }
}

fn collect_words(result: vosk::CompleteResult<'_>, words: &mut Vec<RecognizedWord>) {
    if let Some(single) = result.single() {
        for word in &single.result {
            words.push(RecognizedWord {
                word: word.word.to_string(),
                start: word.start as f64,
                end: word.end as f64,
            });
        }
    }
}

impl Recognizer for VoskRecognizer<'_> {
    fn recognize(&self, audio: &[i16]) -> Result<Vec<RecognizedWord>> {
        let mut decoder = self.decoder.lock().map_err(|_| MeetscribeError::Recognition {
            message: "Vosk decoder mutex poisoned".to_string(),
        })?;
        decoder.reset();

        let mut words = Vec::new();
        for chunk in audio.chunks(BATCH_CHUNK) {
            if decoder.accept_waveform(chunk) == DecodingState::Finalized {
                collect_words(decoder.result(), &mut words);
            }
        }
        collect_words(decoder.final_result(), &mut words);

        Ok(words)
    }

    fn model_name(&self) -> &str {
        &self.model.name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Streaming recognizer owning its own decoder state.
pub struct VoskStreamingRecognizer {
    decoder: vosk::Recognizer,
}

impl VoskStreamingRecognizer {
    pub fn new(model: &VoskModel) -> Result<Self> {
        let mut decoder = vosk::Recognizer::new(&model.model, SAMPLE_RATE as f32).ok_or_else(
            || MeetscribeError::Recognition {
                message: "failed to construct Vosk decoder".to_string(),
            },
        )?;
        decoder.set_words(true);

        Ok(Self { decoder })
    }
}

impl StreamingRecognizer for VoskStreamingRecognizer {
    fn accept(&mut self, chunk: &[i16]) -> Result<Hypothesis> {
        match self.decoder.accept_waveform(chunk) {
            DecodingState::Finalized => {
                let text = self
                    .decoder
                    .result()
                    .single()
                    .map(|r| r.text.to_string())
                    .unwrap_or_default();
                Ok(Hypothesis::Final(text))
            }
            DecodingState::Running => {
                let partial = self.decoder.partial_result().partial.to_string();
                Ok(Hypothesis::Partial(partial))
            }
            DecodingState::Failed => Err(MeetscribeError::Recognition {
                message: "Vosk decoder rejected waveform".to_string(),
            }),
        }
    }

    fn finalize(&mut self) -> Result<Option<String>> {
        let text = self
            .decoder
            .final_result()
            .single()
            .map(|r| r.text.to_string())
            .filter(|t| !t.is_empty());
        Ok(text)
    }

    fn reset(&mut self) {
        self.decoder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_model_directory_reports_guidance() {
        let result = VoskModel::load(Path::new("/nonexistent/vosk-model"));
        match result {
            Err(MeetscribeError::ModelNotFound { path }) => {
                assert!(path.contains("/nonexistent/vosk-model"));
            }
            _ => panic!("Expected ModelNotFound error"),
        }
    }
}
