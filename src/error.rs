//! Error types for meetscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetscribeError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Recognition model errors
    #[error(
        "Recognition model not found at {path}\n\
         Download a model from https://alphacephei.com/vosk/models and unpack it there."
    )]
    ModelNotFound { path: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Diarization errors
    #[error("Clustering failed: {message}")]
    Clustering { message: String },

    // Audio errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MeetscribeError>;
