//! Merges the recognizer's word stream with diarization segments into
//! speaker-attributed dialogue turns.

use crate::diarization::segments::{DiarizationSegment, speaker_at};
use crate::stt::recognizer::RecognizedWord;
use serde::Serialize;

/// A maximal run of consecutive words attributed to one speaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueTurn {
    pub speaker: String,
    pub text: String,
}

impl DialogueTurn {
    /// Number of words in this turn.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Build ordered dialogue turns from a time-ordered word stream.
///
/// Each word resolves to the speaker of the segment containing its start
/// time (`Speaker_Unknown` when none does). A buffer accumulates words for
/// the current speaker and flushes as a turn whenever the speaker changes;
/// the remainder flushes at end of stream. Zero-word turns are never
/// emitted, so an empty word list yields an empty turn list.
pub fn align_turns(
    words: &[RecognizedWord],
    segments: &[DiarizationSegment],
) -> Vec<DialogueTurn> {
    let mut turns = Vec::new();
    let mut current_speaker: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for word in words {
        let speaker = speaker_at(segments, word.start);

        match current_speaker {
            Some(ref s) if s == speaker => buffer.push(&word.word),
            _ => {
                if let Some(speaker) = current_speaker.take() {
                    if !buffer.is_empty() {
                        turns.push(DialogueTurn {
                            speaker,
                            text: buffer.join(" "),
                        });
                    }
                }
                current_speaker = Some(speaker.to_string());
                buffer.clear();
                buffer.push(&word.word);
            }
        }
    }

    if let Some(speaker) = current_speaker {
        if !buffer.is_empty() {
            turns.push(DialogueTurn {
                speaker,
                text: buffer.join(" "),
            });
        }
    }

    turns
}
