//! Live audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::AudioSource;
use crate::audio::wav;
use crate::defaults;
use crate::error::{MeetscribeError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers when
/// probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for desktop PipeWire/PulseAudio environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround", "front:", "rear:", "center:", "side:", "HDMI", "S/PDIF",
];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List available audio input device names, preferred devices marked
/// with "\[recommended\]" and unusable ones (HDMI, surround taps) dropped.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| MeetscribeError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                names.push(format!("{} [recommended]", name));
            } else {
                names.push(name);
            }
        }
    }

    Ok(names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio so the
/// desktop's device selection is respected.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if device.name().is_ok_and(|name| is_preferred_device(&name)) {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| MeetscribeError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched while holding the Mutex in
/// `CpalAudioSource`, so access never crosses threads concurrently.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture implementation producing 16-bit PCM at 16 kHz mono.
///
/// Tries the preferred format first (i16/16kHz/mono), then f32 with sample
/// conversion, then the device's native config with software channel mixing
/// and resampling.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    buffer: Arc<Mutex<Vec<i16>>>,
    failed: Arc<AtomicBool>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Create a capture source for the named device, or the best default
    /// input device when `device_name` is `None`.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| match device_name {
            Some(name) => {
                let host = cpal::default_host();
                let devices = host
                    .input_devices()
                    .map_err(|e| MeetscribeError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                for dev in devices {
                    if dev.name().is_ok_and(|n| n == name) {
                        return Ok(dev);
                    }
                }

                Err(MeetscribeError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            }
            None => get_best_default_device(),
        })?;

        Ok(Self {
            device,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            failed: Arc::new(AtomicBool::new(false)),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let failed = Arc::clone(&self.failed);
        let err_callback = move |err| {
            eprintln!("meetscribe: audio stream error: {}", err);
            failed.store(true, Ordering::SeqCst);
        };

        // i16/16kHz/mono works with PipeWire/PulseAudio which convert transparently
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        // f32/16kHz/mono for devices that only expose float formats
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                }
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native(err_callback)
    }

    /// Build a stream using the device's native config, mixing channels and
    /// resampling in software.
    fn build_stream_native(
        &self,
        err_callback: impl FnMut(cpal::StreamError) + Send + Clone + 'static,
    ) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| MeetscribeError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels() as usize;
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        let buffer = Arc::clone(&self.buffer);
        match default_config.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let mono = wav::mixdown(data, native_channels);
                        let converted = wav::resample(&mono, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| MeetscribeError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect();
                        let mono = wav::mixdown(&i16_data, native_channels);
                        let converted = wav::resample(&mono, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| MeetscribeError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            fmt => Err(MeetscribeError::AudioCapture {
                message: format!("Unsupported native sample format: {:?}", fmt),
            }),
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already started
        }

        self.failed.store(false, Ordering::SeqCst);
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| MeetscribeError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(sendable_stream) = self.stream.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| MeetscribeError::AudioCapture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.failed.load(Ordering::SeqCst) {
            return Err(MeetscribeError::AudioCapture {
                message: "capture device dropped mid-stream".to_string(),
            });
        }

        let mut buffer = self.buffer.lock().map_err(|e| MeetscribeError::AudioCapture {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;

        Ok(std::mem::take(&mut *buffer))
    }
}
