//! Conversation metrics derived from dialogue turns and diarization segments.

use crate::align::DialogueTurn;
use crate::diarization::segments::DiarizationSegment;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate metrics for one analysis run.
///
/// Maps are keyed by speaker label and ordered for stable rendering and
/// serialization. All divisions are guarded: an empty dialogue yields empty
/// maps and zero scores rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationStats {
    /// Turns attributed to each speaker.
    pub speaker_turns: BTreeMap<String, usize>,
    /// Mean words per turn for each speaker.
    pub speaker_avg_length: BTreeMap<String, f64>,
    /// Gaps between consecutive diarization segments.
    pub total_pauses: usize,
    /// Mean pause duration in seconds, 0 when there are no pauses.
    pub avg_pause: f64,
    /// `100 / (1 + avg_pause)`; decreases with longer silences.
    pub activity_score: f64,
    /// 100 at perfectly even participation, lower as imbalance grows.
    pub uniformity_coefficient: f64,
}

impl ConversationStats {
    pub fn calculate(turns: &[DialogueTurn], segments: &[DiarizationSegment]) -> Self {
        let mut speaker_turns: BTreeMap<String, usize> = BTreeMap::new();
        let mut speaker_words: BTreeMap<String, usize> = BTreeMap::new();

        for turn in turns {
            *speaker_turns.entry(turn.speaker.clone()).or_insert(0) += 1;
            *speaker_words.entry(turn.speaker.clone()).or_insert(0) += turn.word_count();
        }

        let speaker_avg_length = speaker_turns
            .iter()
            .map(|(speaker, &count)| {
                let words = speaker_words.get(speaker).copied().unwrap_or(0);
                (speaker.clone(), words as f64 / count as f64)
            })
            .collect();

        let (total_pauses, total_pause_duration) = count_pauses(segments);
        let avg_pause = if total_pauses > 0 {
            total_pause_duration / total_pauses as f64
        } else {
            0.0
        };
        let activity_score = 100.0 / (1.0 + avg_pause);

        Self {
            uniformity_coefficient: uniformity(&speaker_turns),
            speaker_turns,
            speaker_avg_length,
            total_pauses,
            avg_pause,
            activity_score,
        }
    }
}

/// Count gaps between consecutive segments and sum their durations.
fn count_pauses(segments: &[DiarizationSegment]) -> (usize, f64) {
    let mut count = 0;
    let mut total = 0.0;

    for pair in segments.windows(2) {
        let gap = pair[1].start - pair[0].end;
        if gap > 0.0 {
            count += 1;
            total += gap;
        }
    }

    (count, total)
}

/// Participation balance: variance of per-speaker turn counts against an
/// even split, mapped to `(0, 100]`.
fn uniformity(speaker_turns: &BTreeMap<String, usize>) -> f64 {
    if speaker_turns.is_empty() {
        return 0.0;
    }

    let total: usize = speaker_turns.values().sum();
    let expected = total as f64 / speaker_turns.len() as f64;
    let variance = speaker_turns
        .values()
        .map(|&count| (count as f64 - expected).powi(2))
        .sum::<f64>()
        / speaker_turns.len() as f64;

    100.0 / (1.0 + variance / expected.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(speaker: &str, text: &str) -> DialogueTurn {
        DialogueTurn {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    fn segment(start: f64, end: f64) -> DiarizationSegment {
        DiarizationSegment {
            start,
            end,
            speaker: "Speaker_0".to_string(),
        }
    }

    #[test]
    fn turn_counts_and_average_lengths() {
        let turns = vec![turn("A", "a b"), turn("B", "c"), turn("A", "d e f")];
        let stats = ConversationStats::calculate(&turns, &[]);

        assert_eq!(stats.speaker_turns["A"], 2);
        assert_eq!(stats.speaker_turns["B"], 1);
        assert_eq!(stats.speaker_avg_length["A"], 2.5);
        assert_eq!(stats.speaker_avg_length["B"], 1.0);
    }

    #[test]
    fn pause_detection_over_segment_gaps() {
        let segments = vec![segment(0.0, 1.0), segment(2.0, 3.0), segment(3.0, 4.0)];
        let stats = ConversationStats::calculate(&[], &segments);

        assert_eq!(stats.total_pauses, 1);
        assert_eq!(stats.avg_pause, 1.0);
        assert_eq!(stats.activity_score, 50.0);
    }

    #[test]
    fn contiguous_segments_have_no_pauses() {
        let segments = vec![segment(0.0, 0.5), segment(0.5, 1.0), segment(1.0, 1.5)];
        let stats = ConversationStats::calculate(&[], &segments);

        assert_eq!(stats.total_pauses, 0);
        assert_eq!(stats.avg_pause, 0.0);
        assert_eq!(stats.activity_score, 100.0);
    }

    #[test]
    fn uniformity_is_100_for_even_participation() {
        let turns: Vec<DialogueTurn> = (0..5)
            .flat_map(|_| vec![turn("A", "x"), turn("B", "y")])
            .collect();
        let stats = ConversationStats::calculate(&turns, &[]);
        assert_eq!(stats.uniformity_coefficient, 100.0);
    }

    #[test]
    fn uniformity_drops_with_imbalance() {
        let mut turns: Vec<DialogueTurn> = (0..9).map(|_| turn("A", "x")).collect();
        turns.push(turn("B", "y"));
        let stats = ConversationStats::calculate(&turns, &[]);
        assert!(stats.uniformity_coefficient < 100.0);
    }

    #[test]
    fn empty_inputs_yield_zeroed_stats() {
        let stats = ConversationStats::calculate(&[], &[]);
        assert!(stats.speaker_turns.is_empty());
        assert!(stats.speaker_avg_length.is_empty());
        assert_eq!(stats.total_pauses, 0);
        assert_eq!(stats.avg_pause, 0.0);
        assert_eq!(stats.activity_score, 100.0);
        assert_eq!(stats.uniformity_coefficient, 0.0);
    }

    #[test]
    fn single_speaker_monologue_is_uniform() {
        let turns = vec![turn("A", "only me"), turn("A", "still me")];
        let stats = ConversationStats::calculate(&turns, &[]);
        assert_eq!(stats.uniformity_coefficient, 100.0);
    }
}
