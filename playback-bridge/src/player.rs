//! Player backend contract and status events.
//!
//! These abstractions let the core drive heterogeneous playback engines
//! (local decoders, remote cast receivers) through one async-first API
//! surface. Exactly zero or one backend is "current" at any time; the core
//! owns that selection while the host owns the set of registered backends.

use crate::item::PlaylistItem;
use std::fmt;
use std::sync::Arc;

/// Status events a backend reports to the core.
///
/// This closed variant type replaces per-event callback interfaces: a backend
/// emits events through the [`PlayerEventSink`] installed on it, and the core
/// serializes them onto its single control stream. These are the only
/// permitted entry points for backend-driven state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The backend finished preparing the current item and can begin playback.
    Prepared,
    /// The backend's buffered amount changed.
    BufferingUpdate {
        /// Percent buffered, `0..=100`.
        percent: u8,
    },
    /// A previously requested seek finished.
    SeekComplete,
    /// The current item played to its natural end.
    Completion,
    /// Playback failed. The failure is terminal for the current item; the
    /// backend must retry transport-level hiccups internally before
    /// reporting this.
    Error {
        /// Human-readable failure description for diagnostics.
        message: String,
    },
}

/// Destination for [`PlayerEvent`]s, installed on a backend while it is the
/// current one.
///
/// The sink is deliberately opaque: the core decides how delivery is
/// marshaled onto its control stream. Emitting is never an error, even after
/// the engine has shut down (late events from a torn-down backend are
/// dropped).
#[derive(Clone)]
pub struct PlayerEventSink {
    deliver: Arc<dyn Fn(PlayerEvent) + Send + Sync>,
}

impl PlayerEventSink {
    /// Create a sink that forwards events into the provided delivery closure.
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Report a status event to the core.
    pub fn emit(&self, event: PlayerEvent) {
        (self.deliver)(event);
    }
}

impl fmt::Debug for PlayerEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerEventSink").finish_non_exhaustive()
    }
}

/// Capability contract a playback backend must satisfy.
///
/// All control methods must be idempotent: `stop`/`reset` on an already
/// stopped backend is a no-op, not an error. Control methods do not return
/// errors; failures surface asynchronously as [`PlayerEvent::Error`].
///
/// Query methods are synchronous and cheap; they are sampled at the progress
/// poll cadence.
#[async_trait::async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Whether media is currently audible/advancing on this backend.
    fn is_playing(&self) -> bool;

    /// Whether this backend acquires the exclusive playback resource itself
    /// (e.g. remote playback where the resource lives on another device).
    /// When `true` the core skips all focus mediation for it.
    fn handles_own_focus(&self) -> bool;

    /// Current playback position in milliseconds, `0` when nothing is
    /// prepared.
    fn current_position(&self) -> u64;

    /// Duration of the prepared media in milliseconds, `0` when unknown.
    fn duration(&self) -> u64;

    /// Percent of the media currently buffered, `0..=100`.
    fn buffered_percent(&self) -> u8;

    /// Pure predicate: can this backend play `item`? Must not have side
    /// effects; it is consulted during list traversal for items that are
    /// never played.
    fn handles_item(&self, item: &dyn PlaylistItem) -> bool;

    /// Install (or clear) the destination for this backend's status events.
    fn set_event_sink(&self, sink: Option<PlayerEventSink>);

    /// Begin or resume playback of the prepared item.
    async fn play(&self);

    /// Pause playback, retaining the prepared item and position.
    async fn pause(&self);

    /// Stop playback. Safe to call when already stopped.
    async fn stop(&self);

    /// Return the backend to an unprepared state. Safe to call redundantly.
    async fn reset(&self);

    /// Release any native resources held by the backend.
    async fn release(&self);

    /// Seek to an absolute position in milliseconds. Completion is reported
    /// via [`PlayerEvent::SeekComplete`].
    async fn seek_to(&self, position_ms: u64);

    /// Set per-channel output volume, `0.0..=1.0`.
    async fn set_volume(&self, left: f32, right: f32);

    /// Prepare and start loading the given item. Readiness is reported via
    /// [`PlayerEvent::Prepared`].
    async fn play_item(&self, item: Arc<dyn PlaylistItem>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn sink_delivers_events() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let sink = PlayerEventSink::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sink.emit(PlayerEvent::Prepared);
        sink.emit(PlayerEvent::BufferingUpdate { percent: 50 });

        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sink_clones_share_destination() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let sink = PlayerEventSink::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let clone = sink.clone();
        sink.emit(PlayerEvent::Completion);
        clone.emit(PlayerEvent::SeekComplete);

        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }
}
