//! Frame labels to time-stamped speaker segments, and point lookup.

use crate::defaults::UNKNOWN_SPEAKER;
use serde::Serialize;

/// A speaker-attributed span of audio.
///
/// Segments are kept at frame (hop) granularity: consecutive frames with the
/// same label stay as distinct intervals. Downstream statistics rely on
/// those exact boundaries, so same-speaker runs are deliberately not merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiarizationSegment {
    /// Start time in seconds, inclusive.
    pub start: f64,
    /// End time in seconds, exclusive.
    pub end: f64,
    /// Run-local speaker label, e.g. "Speaker_0".
    pub speaker: String,
}

/// Convert per-frame speaker labels into hop-granular segments.
///
/// Frame `i` becomes `[i*hop, (i+1)*hop)` attributed to `Speaker_{label}`.
pub fn build_segments(labels: &[usize], hop_sec: f64) -> Vec<DiarizationSegment> {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| DiarizationSegment {
            start: i as f64 * hop_sec,
            end: (i + 1) as f64 * hop_sec,
            speaker: format!("Speaker_{}", label),
        })
        .collect()
}

/// Resolve the speaker at `time` via first-match containment over `segments`.
///
/// Requires segments ordered ascending by start and non-overlapping (as
/// `build_segments` produces); a binary search then finds the only candidate
/// that can contain `time`. Times before the first segment, inside a gap, or
/// past the last segment resolve to `Speaker_Unknown`.
pub fn speaker_at(segments: &[DiarizationSegment], time: f64) -> &str {
    let idx = segments.partition_point(|s| s.start <= time);
    if idx == 0 {
        return UNKNOWN_SPEAKER;
    }

    let candidate = &segments[idx - 1];
    if time < candidate.end {
        &candidate.speaker
    } else {
        UNKNOWN_SPEAKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, speaker: &str) -> DiarizationSegment {
        DiarizationSegment {
            start,
            end,
            speaker: speaker.to_string(),
        }
    }

    #[test]
    fn build_segments_uses_hop_granularity() {
        let segments = build_segments(&[0, 0, 1], 0.5);
        assert_eq!(
            segments,
            vec![
                segment(0.0, 0.5, "Speaker_0"),
                segment(0.5, 1.0, "Speaker_0"),
                segment(1.0, 1.5, "Speaker_1"),
            ]
        );
    }

    #[test]
    fn build_segments_keeps_same_speaker_frames_distinct() {
        let segments = build_segments(&[1, 1, 1, 1], 0.5);
        assert_eq!(segments.len(), 4);
        for (i, s) in segments.iter().enumerate() {
            assert!((s.start - i as f64 * 0.5).abs() < 1e-12);
            assert!((s.end - s.start - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn build_segments_empty_labels() {
        assert!(build_segments(&[], 0.5).is_empty());
    }

    #[test]
    fn speaker_at_finds_containing_segment() {
        let segments = vec![
            segment(0.0, 1.0, "Speaker_0"),
            segment(1.0, 2.0, "Speaker_1"),
            segment(3.0, 4.0, "Speaker_0"),
        ];

        assert_eq!(speaker_at(&segments, 0.0), "Speaker_0");
        assert_eq!(speaker_at(&segments, 0.99), "Speaker_0");
        assert_eq!(speaker_at(&segments, 1.0), "Speaker_1");
        assert_eq!(speaker_at(&segments, 3.5), "Speaker_0");
    }

    #[test]
    fn speaker_at_start_is_inclusive_end_is_exclusive() {
        let segments = vec![segment(1.0, 2.0, "Speaker_0")];
        assert_eq!(speaker_at(&segments, 1.0), "Speaker_0");
        assert_eq!(speaker_at(&segments, 2.0), UNKNOWN_SPEAKER);
    }

    #[test]
    fn speaker_at_before_first_segment_is_unknown() {
        let segments = vec![segment(1.0, 2.0, "Speaker_0")];
        assert_eq!(speaker_at(&segments, 0.5), UNKNOWN_SPEAKER);
    }

    #[test]
    fn speaker_at_in_gap_is_unknown() {
        let segments = vec![
            segment(0.0, 1.0, "Speaker_0"),
            segment(2.0, 3.0, "Speaker_1"),
        ];
        assert_eq!(speaker_at(&segments, 1.5), UNKNOWN_SPEAKER);
    }

    #[test]
    fn speaker_at_after_last_segment_is_unknown() {
        let segments = vec![segment(0.0, 1.0, "Speaker_0")];
        assert_eq!(speaker_at(&segments, 10.0), UNKNOWN_SPEAKER);
    }

    #[test]
    fn speaker_at_empty_segments_is_unknown() {
        assert_eq!(speaker_at(&[], 0.0), UNKNOWN_SPEAKER);
    }
}
