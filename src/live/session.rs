//! Live capture session: device producer, recognition consumer, and the
//! silence segmenter between them.
//!
//! The producer thread polls the audio source and pushes PCM chunks onto a
//! bounded channel without ever blocking; when the queue is full the chunk
//! is dropped. The consumer drains the channel with a short timeout so it
//! can notice the stop flag, feeds chunks to a streaming recognizer, and
//! commits a wall-clock-stamped turn whenever the segmenter signals a pause
//! or the recognizer finalizes an utterance.

use crate::audio::source::AudioSource;
use crate::defaults::{QUEUE_CAPACITY, QUEUE_POLL_MS};
use crate::error::Result;
use crate::live::segmenter::{Clock, SegmenterConfig, SegmenterEvent, SilenceSegmenter};
use crate::stt::recognizer::{Hypothesis, StreamingRecognizer};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime};

/// How long `stop` waits for each worker before detaching it.
const JOIN_DEADLINE: Duration = Duration::from_secs(2);

/// Producer sleep when the source has no samples ready.
const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// A committed utterance with the wall-clock time it was finished.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTurn {
    pub text: String,
    pub timestamp: SystemTime,
}

/// Events emitted by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// Revisable hypothesis for the current utterance.
    Partial(String),
    /// A finished turn, committed on pause or utterance end.
    Turn(LiveTurn),
    /// A worker hit an unrecoverable error; the session winds down.
    Error(String),
}

/// Session parameters; defaults mirror the batch pipeline's audio format.
#[derive(Debug, Clone, Copy)]
pub struct LiveSessionConfig {
    pub segmenter: SegmenterConfig,
    pub queue_capacity: usize,
    pub poll_timeout_ms: u64,
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            queue_capacity: QUEUE_CAPACITY,
            poll_timeout_ms: QUEUE_POLL_MS,
        }
    }
}

/// Handle to a running live session.
pub struct LiveSessionHandle {
    running: Arc<AtomicBool>,
    threads: Vec<(&'static str, JoinHandle<()>)>,
}

impl LiveSessionHandle {
    /// Signal both workers and wait for them, bounded per thread.
    ///
    /// Idempotent: a second call finds the flag already cleared and no
    /// threads left to join. A worker that misses the deadline is detached
    /// with a warning rather than blocking the caller forever.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        for (name, handle) in self.threads.drain(..) {
            let deadline = Instant::now() + JOIN_DEADLINE;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                eprintln!("Warning: {name} thread did not stop in time, detaching");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for LiveSessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Live capture pipeline builder.
pub struct LiveSession {
    config: LiveSessionConfig,
}

impl LiveSession {
    pub fn new(config: LiveSessionConfig) -> Self {
        Self { config }
    }

    /// Start the producer and consumer threads.
    ///
    /// The source is started before any thread spawns; a failed start
    /// returns the error with no resources held.
    pub fn start<S, R>(
        self,
        source: S,
        recognizer: R,
        event_tx: Sender<LiveEvent>,
    ) -> Result<LiveSessionHandle>
    where
        S: AudioSource + 'static,
        R: StreamingRecognizer + 'static,
    {
        let segmenter = SilenceSegmenter::new(self.config.segmenter);
        self.start_with_segmenter(source, recognizer, segmenter, event_tx)
    }

    /// [`Self::start`] with a caller-built segmenter, so a mock clock or a
    /// tightened silence threshold can drive the pause path in tests.
    pub fn start_with_segmenter<S, R, C>(
        self,
        mut source: S,
        recognizer: R,
        segmenter: SilenceSegmenter<C>,
        event_tx: Sender<LiveEvent>,
    ) -> Result<LiveSessionHandle>
    where
        S: AudioSource + 'static,
        R: StreamingRecognizer + 'static,
        C: Clock + 'static,
    {
        source.start()?;

        let running = Arc::new(AtomicBool::new(true));
        let (chunk_tx, chunk_rx) = bounded::<Vec<i16>>(self.config.queue_capacity);

        let producer = spawn_producer(
            source,
            chunk_tx,
            Arc::clone(&running),
            event_tx.clone(),
        );
        let consumer = spawn_consumer(
            recognizer,
            segmenter,
            chunk_rx,
            self.config,
            Arc::clone(&running),
            event_tx,
        );

        Ok(LiveSessionHandle {
            running,
            threads: vec![("producer", producer), ("consumer", consumer)],
        })
    }
}

fn spawn_producer<S: AudioSource + 'static>(
    mut source: S,
    chunk_tx: Sender<Vec<i16>>,
    running: Arc<AtomicBool>,
    event_tx: Sender<LiveEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            let chunk = match source.read_samples() {
                Ok(chunk) => chunk,
                Err(e) => {
                    let _ = event_tx.send(LiveEvent::Error(e.to_string()));
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            };

            if chunk.is_empty() {
                if source.is_finite() {
                    // Recorded source exhausted; let the consumer drain.
                    running.store(false, Ordering::SeqCst);
                    break;
                }
                std::thread::sleep(IDLE_SLEEP);
                continue;
            }

            // Never block at device cadence: drop the chunk when full.
            let _ = chunk_tx.try_send(chunk);
        }

        if let Err(e) = source.stop() {
            eprintln!("Warning: failed to stop audio source: {e}");
        }
    })
}

fn spawn_consumer<R, C>(
    mut recognizer: R,
    mut segmenter: SilenceSegmenter<C>,
    chunk_rx: Receiver<Vec<i16>>,
    config: LiveSessionConfig,
    running: Arc<AtomicBool>,
    event_tx: Sender<LiveEvent>,
) -> JoinHandle<()>
where
    R: StreamingRecognizer + 'static,
    C: Clock + 'static,
{
    std::thread::spawn(move || {
        let mut partial = String::new();
        let poll = Duration::from_millis(config.poll_timeout_ms);

        loop {
            let chunk = match chunk_rx.recv_timeout(poll) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => {
                    if running.load(Ordering::SeqCst) {
                        continue;
                    }
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            match recognizer.accept(&chunk) {
                Ok(Hypothesis::Partial(text)) => {
                    if !text.is_empty() && text != partial {
                        partial = text.clone();
                        let _ = event_tx.send(LiveEvent::Partial(text));
                    }
                }
                Ok(Hypothesis::Final(text)) => {
                    partial.clear();
                    commit_turn(&event_tx, text);
                }
                Err(e) => {
                    let _ = event_tx.send(LiveEvent::Error(e.to_string()));
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }

            if segmenter.process(&chunk) == SegmenterEvent::Pause {
                // Flush whatever the recognizer holds for this utterance.
                match recognizer.finalize() {
                    Ok(Some(text)) => {
                        partial.clear();
                        commit_turn(&event_tx, text);
                    }
                    Ok(None) => {
                        if !partial.is_empty() {
                            commit_turn(&event_tx, std::mem::take(&mut partial));
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(LiveEvent::Error(e.to_string()));
                    }
                }
                recognizer.reset();
            }
        }

        // Drain the final hypothesis on shutdown.
        match recognizer.finalize() {
            Ok(Some(text)) => commit_turn(&event_tx, text),
            Ok(None) => {
                if !partial.is_empty() {
                    commit_turn(&event_tx, partial);
                }
            }
            Err(e) => {
                let _ = event_tx.send(LiveEvent::Error(e.to_string()));
            }
        }
    })
}

fn commit_turn(event_tx: &Sender<LiveEvent>, text: String) {
    if text.is_empty() {
        return;
    }
    let _ = event_tx.send(LiveEvent::Turn(LiveTurn {
        text,
        timestamp: SystemTime::now(),
    }));
}
