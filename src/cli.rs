//! Command-line interface for meetscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Offline meeting transcription with speaker diarization
#[derive(Parser, Debug)]
#[command(
    name = "meetscribe",
    version = crate::version_string(),
    about = "Offline meeting transcription with speaker diarization"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a recorded WAV file
    Analyze {
        /// Path to the WAV file
        file: PathBuf,

        /// Expected number of speakers
        #[arg(short, long, value_name = "N")]
        speakers: Option<usize>,

        /// Path to the Vosk model directory
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,

        /// Emit the full report as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Transcribe live from a capture device
    Live {
        /// Audio input device name
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Path to the Vosk model directory
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
    },

    /// List available audio input devices
    Devices,
}
