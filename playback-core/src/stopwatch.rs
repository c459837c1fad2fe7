//! Elapsed wall-clock accumulator.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct StopWatchState {
    started_at: Option<Instant>,
    accumulated: Duration,
}

/// A pausable stopwatch used when elapsed wall-clock time substitutes for a
/// backend-reported position (live streams without native position tracking).
///
/// Thread-safe; `start`/`stop` are idempotent.
#[derive(Debug, Default)]
pub struct StopWatch {
    state: Mutex<StopWatchState>,
}

impl StopWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or continue) accumulating time. No-op while already running.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if state.started_at.is_none() {
            state.started_at = Some(Instant::now());
        }
    }

    /// Pause accumulation, retaining the elapsed total. No-op while stopped.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if let Some(started_at) = state.started_at.take() {
            state.accumulated += started_at.elapsed();
        }
    }

    /// Clear the accumulated total. A running stopwatch keeps running from
    /// zero.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.accumulated = Duration::ZERO;
        if state.started_at.is_some() {
            state.started_at = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().started_at.is_some()
    }

    /// Total accumulated time in milliseconds.
    pub fn time_ms(&self) -> u64 {
        let state = self.state.lock();
        let running = state
            .started_at
            .map(|started_at| started_at.elapsed())
            .unwrap_or(Duration::ZERO);
        (state.accumulated + running).as_millis() as u64
    }
}
