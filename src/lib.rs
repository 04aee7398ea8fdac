//! meetscribe - Offline meeting transcription with speaker diarization
//!
//! Batch analysis of recorded audio (who said what, plus conversation
//! metrics) and live microphone transcription with silence-based turns.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod align;
pub mod analysis;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diarization;
pub mod error;
pub mod live;
pub mod output;
pub mod stats;
pub mod stt;

// Core traits (source → recognize → attribute)
pub use audio::source::AudioSource;
pub use stt::recognizer::{Recognizer, StreamingRecognizer};

// Batch pipeline
pub use align::{DialogueTurn, align_turns};
pub use analysis::{AnalysisPipeline, AnalysisReport, ProgressEvent, ProgressStage};
pub use diarization::{DiarizationSegment, diarize};
pub use stats::ConversationStats;

// Live pipeline
pub use live::{LiveEvent, LiveSession, LiveSessionConfig, LiveSessionHandle};

// Error handling
pub use error::{MeetscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
