//! Batch analysis pipeline: one recorded file in, attributed dialogue and
//! conversation metrics out.
//!
//! The pipeline is synchronous and runs on the caller's thread. Progress is
//! advisory telemetry over an optional crossbeam channel; a missing or
//! disconnected receiver never affects the run.

use crate::align::{DialogueTurn, align_turns};
use crate::diarization::{DiarizationSegment, FeatureConfig, diarize};
use crate::error::Result;
use crate::stats::ConversationStats;
use crate::stt::recognizer::Recognizer;

/// Pipeline stage for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Loading,
    Transcription,
    Diarization,
    Merging,
}

/// Advisory progress notification. `progress` is in `[0, 1]` and
/// non-decreasing within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub progress: f32,
    pub message: String,
}

/// Everything one batch run produces.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisReport {
    pub turns: Vec<DialogueTurn>,
    pub segments: Vec<DiarizationSegment>,
    pub stats: ConversationStats,
}

/// Batch orchestrator over a recognizer backend.
///
/// Any failure aborts the whole run; no partial dialogue is returned.
pub struct AnalysisPipeline<R: Recognizer> {
    recognizer: R,
    speakers: usize,
    feature_config: FeatureConfig,
    progress_tx: Option<crossbeam_channel::Sender<ProgressEvent>>,
}

impl<R: Recognizer> AnalysisPipeline<R> {
    pub fn new(recognizer: R, speakers: usize) -> Self {
        Self {
            recognizer,
            speakers,
            feature_config: FeatureConfig::default(),
            progress_tx: None,
        }
    }

    pub fn with_feature_config(mut self, config: FeatureConfig) -> Self {
        self.feature_config = config;
        self
    }

    /// Attach a progress event channel (non-blocking sends).
    pub fn with_progress(
        mut self,
        tx: crossbeam_channel::Sender<ProgressEvent>,
    ) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    fn report(&self, stage: ProgressStage, progress: f32, message: &str) {
        if let Some(tx) = &self.progress_tx {
            // Disconnected receiver is not an error
            let _ = tx.try_send(ProgressEvent {
                stage,
                progress,
                message: message.to_string(),
            });
        }
    }

    /// Run recognition, diarization and alignment over mono 16 kHz PCM.
    pub fn analyze(&self, samples: &[i16]) -> Result<AnalysisReport> {
        self.report(ProgressStage::Loading, 0.0, "starting analysis");

        self.report(ProgressStage::Transcription, 0.1, "transcribing audio");
        let words = self.recognizer.recognize(samples)?;

        self.report(ProgressStage::Diarization, 0.5, "clustering speakers");
        let segments = diarize(samples, self.speakers, &self.feature_config)?;

        self.report(ProgressStage::Merging, 0.9, "merging transcript");
        let turns = align_turns(&words, &segments);
        let stats = ConversationStats::calculate(&turns, &segments);

        self.report(ProgressStage::Merging, 1.0, "analysis complete");
        Ok(AnalysisReport {
            turns,
            segments,
            stats,
        })
    }
}
