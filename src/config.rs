use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub recognizer: RecognizerConfig,
    pub diarization: DiarizationConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub silence_threshold: f32,
    pub silence_duration_ms: u32,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerConfig {
    pub model_path: String,
}

/// Speaker diarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiarizationConfig {
    pub speakers: usize,
    pub window_sec: f64,
    pub hop_sec: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model_path: "vosk-model-small-en-us-0.15".to_string(),
        }
    }
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            speakers: defaults::DEFAULT_SPEAKERS,
            window_sec: defaults::WINDOW_SEC,
            hop_sec: defaults::HOP_SEC,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Errors on invalid TOML so typos don't silently fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEETSCRIBE_MODEL → recognizer.model_path
    /// - MEETSCRIBE_AUDIO_DEVICE → audio.device
    /// - MEETSCRIBE_SPEAKERS → diarization.speakers
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("MEETSCRIBE_MODEL") {
            if !model.is_empty() {
                self.recognizer.model_path = model;
            }
        }

        if let Ok(device) = std::env::var("MEETSCRIBE_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        if let Ok(speakers) = std::env::var("MEETSCRIBE_SPEAKERS") {
            if let Ok(n) = speakers.parse::<usize>() {
                if n >= 1 {
                    self.diarization.speakers = n;
                }
            }
        }

        self
    }

    /// Validate cross-field constraints that serde defaults can't express.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.diarization.speakers == 0 {
            return Err(crate::error::MeetscribeError::ConfigInvalidValue {
                key: "diarization.speakers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.diarization.hop_sec <= 0.0 || self.diarization.window_sec <= 0.0 {
            return Err(crate::error::MeetscribeError::ConfigInvalidValue {
                key: "diarization.window_sec/hop_sec".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.diarization.hop_sec > self.diarization.window_sec {
            return Err(crate::error::MeetscribeError::ConfigInvalidValue {
                key: "diarization.hop_sec".to_string(),
                message: "must not exceed window_sec".to_string(),
            });
        }
        Ok(())
    }
}
