//! Live microphone capture and streaming transcription.

pub mod segmenter;
pub mod session;

pub use segmenter::{Clock, SegmenterConfig, SegmenterEvent, SilenceSegmenter, SystemClock};
pub use session::{LiveEvent, LiveSession, LiveSessionConfig, LiveSessionHandle, LiveTurn};
