//! Terminal rendering of analysis results and live session events.

use crate::analysis::AnalysisReport;
use crate::error::Result;
use crate::live::LiveEvent;
use crate::stats::ConversationStats;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Render attributed dialogue, one turn per line.
pub fn render_dialogue(w: &mut impl Write, report: &AnalysisReport, color: bool) -> Result<()> {
    for turn in &report.turns {
        if color {
            writeln!(w, "{CYAN}{}{RESET}: {}", turn.speaker, turn.text)?;
        } else {
            writeln!(w, "{}: {}", turn.speaker, turn.text)?;
        }
    }
    Ok(())
}

/// Render the statistics block below the dialogue.
pub fn render_stats(w: &mut impl Write, stats: &ConversationStats, color: bool) -> Result<()> {
    let (bold, dim, reset) = if color {
        (BOLD, DIM, RESET)
    } else {
        ("", "", "")
    };

    writeln!(w, "\n{bold}Conversation statistics{reset}")?;
    for (speaker, count) in &stats.speaker_turns {
        let avg = stats.speaker_avg_length.get(speaker).copied().unwrap_or(0.0);
        writeln!(
            w,
            "  {speaker}: {count} turns, {avg:.1} words/turn {dim}(avg){reset}"
        )?;
    }
    writeln!(
        w,
        "  Pauses: {} (avg {:.2}s)",
        stats.total_pauses, stats.avg_pause
    )?;
    writeln!(w, "  Activity score: {:.1}", stats.activity_score)?;
    writeln!(w, "  Uniformity: {:.1}", stats.uniformity_coefficient)?;
    Ok(())
}

/// Format a wall-clock timestamp as UTC `HH:MM:SS`.
fn clock_time(timestamp: SystemTime) -> String {
    let secs = timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

/// Render one live event. Partials redraw in place; turns get their own
/// timestamped line.
pub fn render_live_event(w: &mut impl Write, event: &LiveEvent) -> Result<()> {
    match event {
        LiveEvent::Partial(text) => write!(w, "\r\x1b[2K... {text}")?,
        LiveEvent::Turn(turn) => {
            writeln!(w, "\r\x1b[2K[{}] {}", clock_time(turn.timestamp), turn.text)?;
        }
        LiveEvent::Error(message) => writeln!(w, "\r\x1b[2KError: {message}")?,
    }
    w.flush()?;
    Ok(())
}

/// Render live events until `interrupted` is set, the channel closes, or an
/// error event arrives.
///
/// Polls with a short timeout so an interrupt (Ctrl-C) is noticed promptly
/// even when the device produces no events.
pub fn follow_live_events(
    w: &mut impl Write,
    events: &Receiver<LiveEvent>,
    interrupted: &AtomicBool,
) -> Result<()> {
    loop {
        if interrupted.load(Ordering::SeqCst) {
            return Ok(());
        }
        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let fatal = matches!(event, LiveEvent::Error(_));
                render_live_event(w, &event)?;
                if fatal {
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

/// Serialize the full report as pretty-printed JSON.
pub fn render_json(w: &mut impl Write, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, report).map_err(std::io::Error::from)?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::DialogueTurn;

    fn sample_report() -> AnalysisReport {
        let turns = vec![
            DialogueTurn {
                speaker: "Speaker_0".to_string(),
                text: "hello there".to_string(),
            },
            DialogueTurn {
                speaker: "Speaker_1".to_string(),
                text: "hi".to_string(),
            },
        ];
        let stats = ConversationStats::calculate(&turns, &[]);
        AnalysisReport {
            turns,
            segments: Vec::new(),
            stats,
        }
    }

    #[test]
    fn dialogue_renders_one_line_per_turn() {
        let mut out = Vec::new();
        render_dialogue(&mut out, &sample_report(), false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Speaker_0: hello there\nSpeaker_1: hi\n");
    }

    #[test]
    fn stats_block_names_each_speaker() {
        let report = sample_report();
        let mut out = Vec::new();
        render_stats(&mut out, &report.stats, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Speaker_0: 1 turns, 2.0 words/turn"));
        assert!(text.contains("Uniformity: 100.0"));
    }

    #[test]
    fn json_report_round_trips_through_serde() {
        let mut out = Vec::new();
        render_json(&mut out, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["turns"][0]["speaker"], "Speaker_0");
        assert!(value["stats"]["speaker_turns"].is_object());
    }

    #[test]
    fn live_turn_renders_with_utc_timestamp() {
        let turn = crate::live::LiveTurn {
            text: "hello".to_string(),
            timestamp: UNIX_EPOCH + Duration::from_secs(3661),
        };
        let mut out = Vec::new();
        render_live_event(&mut out, &LiveEvent::Turn(turn)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[01:01:01] hello"));
    }

    #[test]
    fn follow_returns_when_interrupt_flag_is_set() {
        // Sender stays alive: only the flag can end the loop here.
        let (tx, rx) = crossbeam_channel::unbounded::<LiveEvent>();
        let interrupted = AtomicBool::new(true);
        let mut out = Vec::new();
        follow_live_events(&mut out, &rx, &interrupted).unwrap();
        drop(tx);
    }

    #[test]
    fn follow_renders_events_until_channel_closes() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(LiveEvent::Partial("he".to_string())).unwrap();
        tx.send(LiveEvent::Turn(crate::live::LiveTurn {
            text: "hello there".to_string(),
            timestamp: UNIX_EPOCH + Duration::from_secs(45),
        }))
        .unwrap();
        drop(tx);

        let interrupted = AtomicBool::new(false);
        let mut out = Vec::new();
        follow_live_events(&mut out, &rx, &interrupted).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("... he"));
        assert!(text.contains("[00:00:45] hello there"));
    }

    #[test]
    fn follow_stops_after_an_error_event() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(LiveEvent::Error("device unplugged".to_string())).unwrap();

        let interrupted = AtomicBool::new(false);
        let mut out = Vec::new();
        // Sender still alive; the error event alone must end the loop.
        follow_live_events(&mut out, &rx, &interrupted).unwrap();
        drop(tx);
        assert!(String::from_utf8(out).unwrap().contains("device unplugged"));
    }

    #[test]
    fn color_output_carries_ansi_codes() {
        let mut out = Vec::new();
        render_dialogue(&mut out, &sample_report(), true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(CYAN));
    }
}
