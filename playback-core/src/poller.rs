//! Periodic playback progress sampling.

use crate::progress::MediaProgress;
use crate::stopwatch::StopWatch;
use parking_lot::Mutex;
use playback_bridge::MediaPlayer;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Callback invoked with each progress sample.
///
/// The handler installs a closure that marshals the sample onto its own
/// serialized command stream; the poll task never touches playback state
/// directly.
pub type ProgressCallback = Arc<dyn Fn(MediaProgress) + Send + Sync>;

struct PollerInner {
    backend: Option<Arc<dyn MediaPlayer>>,
    listener: Option<ProgressCallback>,
    progress: MediaProgress,
    override_position: bool,
    override_duration: Option<u64>,
    position_offset: u64,
    cancel: Option<CancellationToken>,
}

struct PollerShared {
    inner: Mutex<PollerInner>,
    // Substitutes elapsed wall-clock time for the backend position while
    // override mode is active (live streams without native position
    // tracking).
    stopwatch: StopWatch,
}

impl PollerShared {
    fn poll_once(&self) {
        let (listener, sample) = {
            let mut inner = self.inner.lock();
            if inner.cancel.is_none() {
                // Stopped while this tick was in flight.
                return;
            }
            let Some(backend) = inner.backend.clone() else {
                return;
            };
            let Some(listener) = inner.listener.clone() else {
                return;
            };

            let position = if inner.override_position {
                inner.position_offset + self.stopwatch.time_ms()
            } else {
                backend.current_position()
            };
            let duration = match inner.override_duration {
                Some(duration) => duration,
                None => backend.duration(),
            };
            let buffer = backend.buffered_percent();

            inner
                .progress
                .update(position as i64, i32::from(buffer), duration as i64);
            (listener, inner.progress)
        };

        trace!(position_ms = sample.position(), "progress sample");
        listener(sample);
    }
}

/// Samples the attached backend's position/buffer/duration at a fixed cadence
/// and delivers each sample to a single registered listener.
///
/// Independent of playback state; the handler starts and stops it in lockstep
/// with play/pause. `start` declines to run without a listener so an
/// unobserved poller never schedules ticks.
pub struct ProgressPoller {
    shared: Arc<PollerShared>,
    poll_interval: Duration,
}

impl ProgressPoller {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            shared: Arc::new(PollerShared {
                inner: Mutex::new(PollerInner {
                    backend: None,
                    listener: None,
                    progress: MediaProgress::default(),
                    override_position: false,
                    override_duration: None,
                    position_offset: 0,
                    cancel: None,
                }),
                stopwatch: StopWatch::new(),
            }),
            poll_interval,
        }
    }

    /// Install (or clear) the progress listener.
    pub fn set_listener(&self, listener: Option<ProgressCallback>) {
        self.shared.inner.lock().listener = listener;
    }

    /// Attach a new backend to sample, clearing all accumulated override
    /// state from the previous one.
    pub fn update(&self, backend: Arc<dyn MediaPlayer>) {
        let mut inner = self.shared.inner.lock();
        inner.backend = Some(backend);
        inner.override_position = false;
        inner.override_duration = None;
        inner.position_offset = 0;
        self.shared.stopwatch.reset();
    }

    /// Begin polling. No-op when already running or when no listener is
    /// installed. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let token = {
            let mut inner = self.shared.inner.lock();
            if inner.listener.is_none() {
                debug!("poller start declined, no listener installed");
                return;
            }
            if inner.cancel.is_some() {
                return;
            }
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());
            if inner.override_position {
                self.shared.stopwatch.start();
            }
            token
        };

        let shared = Arc::clone(&self.shared);
        let poll_interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => shared.poll_once(),
                }
            }
        });
    }

    /// Stop polling. Idempotent. A tick that has not yet sampled observes the
    /// cleared token and bails; a tick already past that check may deliver
    /// one final sample after this returns. Listeners that marshal samples
    /// onto a queue (the engine does) are unaffected either way.
    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
        self.shared.stopwatch.stop();
    }

    /// Clear the accumulated position offset and the duration override
    /// without stopping the poll loop.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.position_offset = 0;
        inner.override_duration = None;
        self.shared.stopwatch.reset();
    }

    /// Permanently tear down: stop, detach the listener and backend, and
    /// clear all override state.
    pub fn release(&self) {
        self.stop();
        let mut inner = self.shared.inner.lock();
        inner.listener = None;
        inner.backend = None;
        inner.override_position = false;
        inner.override_duration = None;
        inner.position_offset = 0;
        self.shared.stopwatch.reset();
    }

    /// Substitute elapsed wall-clock time for the backend-reported position.
    pub fn set_override_position(&self, enabled: bool) {
        let mut inner = self.shared.inner.lock();
        inner.override_position = enabled;
        if enabled {
            if inner.cancel.is_some() {
                self.shared.stopwatch.start();
            }
        } else {
            self.shared.stopwatch.stop();
        }
    }

    /// Restart the overridden position clock from zero.
    pub fn restart_override_position(&self) {
        self.shared.stopwatch.reset();
    }

    /// Base offset added to the overridden position (set when playback
    /// resumes mid-stream).
    pub fn set_position_offset(&self, offset_ms: u64) {
        self.shared.inner.lock().position_offset = offset_ms;
    }

    /// Report a fixed duration instead of the backend's (live or
    /// indeterminate-length streams). `None` returns to backend-reported
    /// durations.
    pub fn set_override_duration(&self, duration_ms: Option<u64>) {
        self.shared.inner.lock().override_duration = duration_ms;
    }

    /// The most recent sample.
    pub fn progress(&self) -> MediaProgress {
        self.shared.inner.lock().progress
    }

    pub fn is_running(&self) -> bool {
        self.shared.inner.lock().cancel.is_some()
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
    }
}
