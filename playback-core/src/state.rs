//! Playback session state and item-change snapshots.

use playback_bridge::PlaylistItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The single authoritative playback state, owned and written exclusively by
/// the handler.
///
/// `Stopped` and `Error` are terminal for the session: the handler has
/// released its resources and only a fresh start command leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Locating the item and resolving a backend for it.
    Retrieving,
    /// A backend accepted the item and is loading it.
    Preparing,
    Playing,
    Paused,
    /// A user-visible seek is in flight.
    Seeking,
    Stopped,
    /// Like `Stopped` for consumers, but distinguishable for diagnostics.
    Error,
}

impl PlaybackState {
    /// Whether the session is in a transitional state that presentation
    /// layers typically render as a loading indicator.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            PlaybackState::Retrieving | PlaybackState::Preparing | PlaybackState::Seeking
        )
    }

    /// Whether the session has been torn down.
    pub fn is_terminal(self) -> bool {
        matches!(self, PlaybackState::Stopped | PlaybackState::Error)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Retrieving => "retrieving",
            PlaybackState::Preparing => "preparing",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Seeking => "seeking",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot produced whenever the cursor's current item changes.
///
/// Immutable once produced; replaced wholesale on each change.
#[derive(Clone)]
pub struct PlaylistItemChange {
    pub current_item: Option<Arc<dyn PlaylistItem>>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl fmt::Debug for PlaylistItemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistItemChange")
            .field("current_item", &self.current_item.as_ref().map(|i| i.id()))
            .field("has_next", &self.has_next)
            .field("has_previous", &self.has_previous)
            .finish()
    }
}
