use anyhow::Result;
use clap::Parser;
use meetscribe::cli::{Cli, Commands};
use meetscribe::config::Config;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let color = !cli.no_color;

    match cli.command {
        Commands::Analyze {
            file,
            speakers,
            model,
            json,
        } => {
            run_analyze(&config, &file, speakers, model.as_deref(), json, color)?;
        }
        Commands::Live { device, model } => {
            run_live(&config, device.as_deref(), model.as_deref())?;
        }
        Commands::Devices => {
            list_audio_devices()?;
        }
    }

    Ok(())
}

/// Load the user config, applying env overrides last.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&default_config_path())?,
    };
    Ok(config.with_env_overrides())
}

fn default_config_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("meetscribe").join("config.toml")
}

#[cfg(feature = "vosk")]
fn run_analyze(
    config: &Config,
    file: &Path,
    speakers: Option<usize>,
    model: Option<&Path>,
    json: bool,
    color: bool,
) -> Result<()> {
    use meetscribe::analysis::AnalysisPipeline;
    use meetscribe::audio::wav::WavAudioSource;
    use meetscribe::diarization::FeatureConfig;
    use meetscribe::output;
    use meetscribe::stt::vosk::{VoskModel, VoskRecognizer};

    let samples = WavAudioSource::open(file)?.into_samples();

    let model_path = model
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.recognizer.model_path));
    let vosk_model = VoskModel::load(&model_path)?;
    let recognizer = VoskRecognizer::new(&vosk_model)?;

    let speakers = speakers.unwrap_or(config.diarization.speakers);
    let feature_config = FeatureConfig {
        window_sec: config.diarization.window_sec,
        hop_sec: config.diarization.hop_sec,
        ..FeatureConfig::default()
    };

    let (progress_tx, progress_rx) = crossbeam_channel::unbounded();
    let reporter = std::thread::spawn(move || {
        for event in progress_rx {
            eprintln!("[{:>3.0}%] {}", event.progress * 100.0, event.message);
        }
    });

    let pipeline = AnalysisPipeline::new(recognizer, speakers)
        .with_feature_config(feature_config)
        .with_progress(progress_tx);
    let report = pipeline.analyze(&samples);
    drop(pipeline); // closes the progress channel so the reporter exits
    let _ = reporter.join();
    let report = report?;

    let mut stdout = std::io::stdout().lock();
    if json {
        output::render_json(&mut stdout, &report)?;
    } else {
        output::render_dialogue(&mut stdout, &report, color)?;
        output::render_stats(&mut stdout, &report.stats, color)?;
    }
    Ok(())
}

#[cfg(not(feature = "vosk"))]
fn run_analyze(
    _config: &Config,
    _file: &Path,
    _speakers: Option<usize>,
    _model: Option<&Path>,
    _json: bool,
    _color: bool,
) -> Result<()> {
    anyhow::bail!("Speech recognition backend not compiled in. Rebuild with --features vosk")
}

/// Set by the SIGINT handler; checked by the live event loop.
#[cfg(all(feature = "vosk", feature = "cpal-audio"))]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

#[cfg(all(feature = "vosk", feature = "cpal-audio"))]
extern "C" fn on_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, std::sync::atomic::Ordering::SeqCst);
}

#[cfg(all(feature = "vosk", feature = "cpal-audio"))]
fn run_live(config: &Config, device: Option<&str>, model: Option<&Path>) -> Result<()> {
    use meetscribe::audio::capture::CpalAudioSource;
    use meetscribe::live::{LiveSession, LiveSessionConfig, SegmenterConfig};
    use meetscribe::output;
    use meetscribe::stt::vosk::{VoskModel, VoskStreamingRecognizer};

    let model_path = model
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.recognizer.model_path));
    let vosk_model = VoskModel::load(&model_path)?;
    let recognizer = VoskStreamingRecognizer::new(&vosk_model)?;

    let device = device.or(config.audio.device.as_deref());
    let source = CpalAudioSource::new(device)?;

    let session_config = LiveSessionConfig {
        segmenter: SegmenterConfig {
            silence_threshold: config.audio.silence_threshold,
            silence_duration_ms: config.audio.silence_duration_ms,
        },
        ..LiveSessionConfig::default()
    };

    // The handler only touches an atomic, so it is async-signal-safe.
    let handler = on_sigint as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let mut handle = LiveSession::new(session_config).start(source, recognizer, event_tx)?;

    eprintln!("Listening... (Ctrl-C to stop)");
    let mut stdout = std::io::stdout().lock();
    output::follow_live_events(&mut stdout, &event_rx, &INTERRUPTED)?;

    // Joining the workers flushes the final hypothesis into the channel;
    // render whatever arrived after the loop ended.
    handle.stop();
    for event in event_rx.try_iter() {
        output::render_live_event(&mut stdout, &event)?;
    }
    Ok(())
}

#[cfg(not(all(feature = "vosk", feature = "cpal-audio")))]
fn run_live(_config: &Config, _device: Option<&str>, _model: Option<&Path>) -> Result<()> {
    anyhow::bail!("Live capture not compiled in. Rebuild with --features vosk,cpal-audio")
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = meetscribe::audio::capture::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        for device in devices {
            println!("{device}");
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("Audio capture not compiled in. Rebuild with --features cpal-audio")
}
