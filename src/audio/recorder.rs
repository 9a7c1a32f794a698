//! Microphone recorder with a hard duration cap
//!
//! Captures the default input device into an in-memory buffer and finalizes
//! it as a single WAV clip when the user stops or the cap is hit

use crate::audio::clip::AudioClip;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Hard cap on clip length, in seconds
pub const MAX_CLIP_SECS: u32 = 60;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),
    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Shared state of one recording session
///
/// Written by the capture callback and the timer task, read by the shell.
struct SessionState {
    /// Seconds elapsed, never stored above MAX_CLIP_SECS
    elapsed: AtomicU32,
    /// Set exactly once, by the manual stop or the cap tick
    stopped: AtomicBool,
    /// Buffered mono PCM samples
    samples: Mutex<Vec<i16>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            elapsed: AtomicU32::new(0),
            stopped: AtomicBool::new(false),
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Advance the per-second timer; returns true once the cap is reached
    ///
    /// The stored value is clamped to the cap even if ticks overshoot.
    fn tick(&self) -> bool {
        if self.is_stopped() {
            return false;
        }
        let elapsed = self.elapsed.fetch_add(1, Ordering::SeqCst) + 1;
        if elapsed >= MAX_CLIP_SECS {
            self.elapsed.store(MAX_CLIP_SECS, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// Claim the stop transition; only one caller ever wins
    fn halt(&self) -> bool {
        self.stopped
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn elapsed_secs(&self) -> u32 {
        self.elapsed.load(Ordering::SeqCst).min(MAX_CLIP_SECS)
    }

    /// Drain the buffer into a finalized clip
    fn finalize(&self, sample_rate: u32) -> Option<AudioClip> {
        let samples = std::mem::take(&mut *self.samples.lock());
        match AudioClip::from_samples(&samples, sample_rate, self.elapsed_secs()) {
            Ok(clip) => Some(clip),
            Err(e) => {
                error!("Failed to finalize clip: {}", e);
                None
            }
        }
    }
}

/// Microphone recorder
///
/// At most one session is live at a time; starting a new one discards any
/// unposted clip from the previous session.
pub struct Recorder {
    sample_rate: u32,
    session: Option<Arc<SessionState>>,
    capture: Option<std::thread::JoinHandle<()>>,
    timer: Option<tokio::task::JoinHandle<()>>,
    finished: Arc<Mutex<Option<AudioClip>>>,
}

impl Recorder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            session: None,
            capture: None,
            timer: None,
            finished: Arc::new(Mutex::new(None)),
        }
    }

    /// Begin a capture session
    ///
    /// No-op if a session is already recording. Acquires the default input
    /// device and starts the one-tick-per-second timer.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.is_recording() {
            warn!("Recording already active");
            return Ok(());
        }

        self.reap();
        *self.finished.lock() = None;

        let state = Arc::new(SessionState::new());
        let capture = spawn_capture(state.clone(), self.sample_rate)?;

        // One tick per second; the tick that reaches the cap stops the
        // session through the same stop-once path as a manual stop
        let timer_state = state.clone();
        let finished = self.finished.clone();
        let sample_rate = self.sample_rate;
        let timer = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                if timer_state.is_stopped() {
                    break;
                }
                if timer_state.tick() {
                    if timer_state.halt() {
                        info!("Hit the {}s cap, stopping automatically", MAX_CLIP_SECS);
                        if let Some(clip) = timer_state.finalize(sample_rate) {
                            *finished.lock() = Some(clip);
                        }
                    }
                    break;
                }
            }
        });

        self.session = Some(state);
        self.capture = Some(capture);
        self.timer = Some(timer);
        info!("Recording started");
        Ok(())
    }

    /// Stop the active session and finalize the clip
    ///
    /// Safe to call when nothing is recording; the second of two stops is a
    /// no-op. The capture thread releases the input device once the session
    /// is marked stopped.
    pub fn stop(&mut self) {
        let Some(state) = self.session.clone() else {
            debug!("stop() with no active session");
            return;
        };
        if state.halt() {
            if let Some(clip) = state.finalize(self.sample_rate) {
                *self.finished.lock() = Some(clip);
            }
            info!("Recording stopped at {}s", state.elapsed_secs());
        } else {
            debug!("Session already stopped");
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_stopped())
    }

    /// Seconds elapsed in the current or just-stopped session
    pub fn elapsed_secs(&self) -> u32 {
        self.session.as_ref().map(|s| s.elapsed_secs()).unwrap_or(0)
    }

    pub fn has_clip(&self) -> bool {
        self.finished.lock().is_some()
    }

    /// Hand the finalized clip to the post pipeline, leaving none behind
    pub fn take_clip(&mut self) -> Option<AudioClip> {
        self.finished.lock().take()
    }

    /// Drop the previous session and join its finished background work
    fn reap(&mut self) {
        self.session = None;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if let Some(capture) = self.capture.take() {
            let _ = capture.join();
        }
    }
}

/// Run the cpal input stream on a dedicated thread (streams are not Send)
/// and append captured samples to the session buffer until the session stops
fn spawn_capture(
    state: Arc<SessionState>,
    sample_rate: u32,
) -> Result<std::thread::JoinHandle<()>, RecorderError> {
    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    let handle = std::thread::spawn(move || {
        let stream = match build_input_stream(state.clone(), sample_rate) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(RecorderError::DeviceUnavailable(e.to_string())));
            return;
        }
        let _ = ready_tx.send(Ok(()));

        // Hold the stream until the session stops, then drop it so the
        // input device is released
        while !state.is_stopped() {
            std::thread::sleep(Duration::from_millis(50));
        }
        drop(stream);
        debug!("Capture thread released the input device");
    });

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => Err(RecorderError::DeviceUnavailable(
            "capture thread exited during startup".to_string(),
        )),
    }
}

fn build_input_stream(
    state: Arc<SessionState>,
    sample_rate: u32,
) -> Result<cpal::Stream, RecorderError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or_else(|| {
        RecorderError::DeviceUnavailable("no default input device".to_string())
    })?;

    info!(
        "Using input device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if state.is_stopped() {
                    return;
                }
                let mut samples = state.samples.lock();
                for &sample in data {
                    samples.push((sample * i16::MAX as f32) as i16);
                }
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(map_build_error)?;

    Ok(stream)
}

/// cpal has no dedicated permission error; backend refusals to open the
/// device map to PermissionDenied, missing devices to DeviceUnavailable
fn map_build_error(err: cpal::BuildStreamError) -> RecorderError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => {
            RecorderError::DeviceUnavailable("input device disappeared".to_string())
        }
        cpal::BuildStreamError::BackendSpecific { err } => {
            RecorderError::PermissionDenied(err.to_string())
        }
        other => RecorderError::DeviceUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reaches_cap_exactly_at_limit() {
        let state = SessionState::new();
        for second in 1..MAX_CLIP_SECS {
            assert!(!state.tick(), "capped too early at {}s", second);
        }
        assert!(state.tick());
        assert_eq!(state.elapsed_secs(), MAX_CLIP_SECS);
    }

    #[test]
    fn test_overshooting_ticks_stay_clamped() {
        let state = SessionState::new();
        for _ in 0..70 {
            let _ = state.tick();
        }
        assert_eq!(state.elapsed_secs(), MAX_CLIP_SECS);
    }

    #[test]
    fn test_only_one_stop_wins() {
        let state = SessionState::new();
        assert!(state.halt());
        assert!(!state.halt());
        assert!(state.is_stopped());
    }

    #[test]
    fn test_ticks_after_stop_are_ignored() {
        let state = SessionState::new();
        for _ in 0..5 {
            let _ = state.tick();
        }
        assert!(state.halt());
        assert!(!state.tick());
        assert_eq!(state.elapsed_secs(), 5);
    }

    #[test]
    fn test_finalize_uses_elapsed_at_stop() {
        let state = SessionState::new();
        state.samples.lock().extend_from_slice(&[0i16; 1600]);
        for _ in 0..3 {
            let _ = state.tick();
        }
        assert!(state.halt());
        let clip = state.finalize(16000).unwrap();
        assert_eq!(clip.duration_secs, 3);
        assert!(!clip.is_empty());
    }

    #[test]
    fn test_finalize_drains_the_buffer() {
        let state = SessionState::new();
        state.samples.lock().push(1);
        let _ = state.finalize(16000);
        assert!(state.samples.lock().is_empty());
    }
}
