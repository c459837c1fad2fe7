//! Presentation and hosting-process contracts.
//!
//! The core produces [`MediaSnapshot`]s describing what is playing and pushes
//! them at the presentation layer; how a snapshot is rendered (notification,
//! media session, lock screen) is entirely a host concern.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Point-in-time description of the playback session for presentation.
///
/// Replaced wholesale on every update; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSnapshot {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub is_playing: bool,
    /// Whether the session is in a transitional (retrieving/preparing/
    /// seeking) state.
    pub is_loading: bool,
    pub has_next: bool,
    pub has_previous: bool,
    /// Locator for the current item's artwork, when one exists.
    pub artwork_url: Option<String>,
    /// Playback position in milliseconds, `None` when unknown.
    pub position_ms: Option<u64>,
    /// Media duration in milliseconds, `None` when unknown.
    pub duration_ms: Option<u64>,
}

/// Consumer of playback state snapshots (notification, media session,
/// artwork).
pub trait PresentationSink: Send + Sync {
    /// Render the given snapshot. Called on every observable change; the sink
    /// must tolerate redundant updates.
    fn update(&self, snapshot: &MediaSnapshot) -> Result<()>;

    /// Remove any rendered presentation (notification dismissed, session
    /// released).
    fn clear(&self) -> Result<()>;
}

/// Hosting process lifecycle callbacks.
///
/// The core calls these to keep the hosting service/process alive while
/// playback is audible, and to tear it down once the session ends.
pub trait ServiceCallbacks: Send + Sync {
    /// Request termination of the hosting process/service.
    fn stop(&self);

    /// Promote the hosting process to foreground priority, rendered through
    /// the given snapshot.
    fn run_in_foreground(&self, notification_id: u32, snapshot: &MediaSnapshot) -> Result<()>;

    /// Drop foreground priority. `dismiss` removes the rendered presentation
    /// as well.
    fn end_foreground(&self, dismiss: bool) -> Result<()>;
}

/// Keep-alive for resources needed while streaming non-local media
/// (radio/network locks on mobile platforms). Both methods must be
/// idempotent.
pub trait WakeLock: Send + Sync {
    /// Acquire when `enabled`, release otherwise.
    fn update(&self, enabled: bool);

    /// Unconditionally release.
    fn release(&self);
}
