//! Silence-based turn segmentation for live capture.
//!
//! Two-state machine over chunk amplitude: `Sounding` while RMS exceeds the
//! threshold, `Silent` otherwise. A pause event fires exactly once per
//! silent run, after the configured duration elapses, and re-arms only when
//! sound resumes.

use crate::audio::calculate_rms;
use crate::defaults;
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the silence segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// RMS threshold separating sound from silence (0.0 to 1.0).
    pub silence_threshold: f32,
    /// Silence duration that ends a turn (milliseconds).
    pub silence_duration_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            silence_threshold: defaults::SILENCE_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SilenceState {
    Sounding,
    Silent {
        since: Instant,
        /// A pause was already emitted for this silent run.
        signaled: bool,
    },
}

/// Event produced for each processed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterEvent {
    /// Amplitude above threshold.
    Sound,
    /// Below threshold, pause duration not yet reached (or already signaled).
    Silence,
    /// The silent run just crossed the configured duration.
    Pause,
}

/// Silence-run tracker; generic over the clock for deterministic tests.
pub struct SilenceSegmenter<C: Clock = SystemClock> {
    config: SegmenterConfig,
    state: SilenceState,
    clock: C,
}

impl<C: Clock> SilenceSegmenter<C> {
    pub fn with_clock(config: SegmenterConfig, clock: C) -> Self {
        Self {
            config,
            state: SilenceState::Sounding,
            clock,
        }
    }

    /// Classify one chunk of 16-bit PCM and advance the state machine.
    pub fn process(&mut self, chunk: &[i16]) -> SegmenterEvent {
        let rms = calculate_rms(chunk);
        let now = self.clock.now();

        if rms > self.config.silence_threshold {
            self.state = SilenceState::Sounding;
            return SegmenterEvent::Sound;
        }

        match self.state {
            SilenceState::Sounding => {
                self.state = SilenceState::Silent {
                    since: now,
                    signaled: false,
                };
                SegmenterEvent::Silence
            }
            SilenceState::Silent { signaled: true, .. } => SegmenterEvent::Silence,
            SilenceState::Silent {
                since,
                signaled: false,
            } => {
                let threshold = Duration::from_millis(u64::from(self.config.silence_duration_ms));
                if now.duration_since(since) >= threshold {
                    self.state = SilenceState::Silent {
                        since,
                        signaled: true,
                    };
                    SegmenterEvent::Pause
                } else {
                    SegmenterEvent::Silence
                }
            }
        }
    }

    /// Forget any in-progress silent run.
    pub fn reset(&mut self) {
        self.state = SilenceState::Sounding;
    }
}

impl SilenceSegmenter<SystemClock> {
    pub fn new(config: SegmenterConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}
