//! Speech-to-text interfaces and backends.

pub mod recognizer;
#[cfg(feature = "vosk")]
pub mod vosk;

pub use recognizer::{
    Hypothesis, MockRecognizer, MockStreamingRecognizer, RecognizedWord, Recognizer,
    StreamingRecognizer,
};
#[cfg(feature = "vosk")]
pub use vosk::{VoskModel, VoskRecognizer, VoskStreamingRecognizer};
