//! External-facing listener registries.

use crate::progress::MediaProgress;
use crate::state::{PlaybackState, PlaylistItemChange};
use parking_lot::Mutex;
use playback_bridge::PlaylistItem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Observes playlist item and playback state changes.
pub trait PlaylistListener: Send + Sync {
    fn on_playlist_item_changed(&self, change: &PlaylistItemChange) {
        let _ = change;
    }
    fn on_playback_state_changed(&self, state: PlaybackState) {
        let _ = state;
    }
}

/// Observes progress samples at the poll cadence.
pub trait ProgressListener: Send + Sync {
    fn on_progress_updated(&self, progress: &MediaProgress);
}

/// Coarse playback milestones, typically consumed by a single session-scoped
/// observer (analytics, scrobbling, resume-position persistence).
pub trait PlaybackStatusListener: Send + Sync {
    fn on_media_playback_started(&self, item: &dyn PlaylistItem, position_ms: u64, duration_ms: u64) {
        let _ = (item, position_ms, duration_ms);
    }
    fn on_item_playback_ended(&self, item: Option<&dyn PlaylistItem>) {
        let _ = item;
    }
    fn on_playlist_ended(&self) {}
    fn on_item_skipped(&self, item: &dyn PlaylistItem) {
        let _ = item;
    }
}

/// Handle returned by `register_*`; required to unregister.
///
/// Callers must unregister deterministically when their observation scope
/// ends; nothing is pruned automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

struct Registry<L: ?Sized> {
    entries: Mutex<Vec<(ListenerToken, Arc<L>)>>,
}

impl<L: ?Sized> Registry<L> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn register(&self, token: ListenerToken, listener: Arc<L>) {
        self.entries.lock().push((token, listener));
    }

    fn unregister(&self, token: ListenerToken) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(known, _)| *known != token);
        entries.len() != before
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Snapshot the listener set so notification runs without the lock held
    /// (a listener may re-enter register/unregister).
    fn snapshot(&self) -> Vec<Arc<L>> {
        self.entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Owns the listener registries the handler notifies through.
///
/// Register/unregister may be called from any thread; each registry has its
/// own lock and notification never holds one across a listener call.
pub struct PlaylistManager {
    next_token: AtomicU64,
    playlist_listeners: Registry<dyn PlaylistListener>,
    progress_listeners: Registry<dyn ProgressListener>,
    status_listener: Mutex<Option<Arc<dyn PlaybackStatusListener>>>,
}

impl Default for PlaylistManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistManager {
    pub fn new() -> Self {
        Self {
            next_token: AtomicU64::new(1),
            playlist_listeners: Registry::new(),
            progress_listeners: Registry::new(),
            status_listener: Mutex::new(None),
        }
    }

    fn issue_token(&self) -> ListenerToken {
        ListenerToken(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register_playlist_listener(&self, listener: Arc<dyn PlaylistListener>) -> ListenerToken {
        let token = self.issue_token();
        self.playlist_listeners.register(token, listener);
        token
    }

    /// Returns whether the token was registered.
    pub fn unregister_playlist_listener(&self, token: ListenerToken) -> bool {
        self.playlist_listeners.unregister(token)
    }

    pub fn register_progress_listener(&self, listener: Arc<dyn ProgressListener>) -> ListenerToken {
        let token = self.issue_token();
        self.progress_listeners.register(token, listener);
        token
    }

    pub fn unregister_progress_listener(&self, token: ListenerToken) -> bool {
        self.progress_listeners.unregister(token)
    }

    /// Install (or clear) the single playback status listener.
    pub fn set_status_listener(&self, listener: Option<Arc<dyn PlaybackStatusListener>>) {
        *self.status_listener.lock() = listener;
    }

    pub fn playlist_listener_count(&self) -> usize {
        self.playlist_listeners.len()
    }

    pub fn progress_listener_count(&self) -> usize {
        self.progress_listeners.len()
    }

    // === Notification (handler-side) ===

    pub(crate) fn notify_item_change(&self, change: &PlaylistItemChange) {
        trace!(?change, "playlist item changed");
        for listener in self.playlist_listeners.snapshot() {
            listener.on_playlist_item_changed(change);
        }
    }

    pub(crate) fn notify_state_change(&self, state: PlaybackState) {
        for listener in self.playlist_listeners.snapshot() {
            listener.on_playback_state_changed(state);
        }
    }

    pub(crate) fn notify_progress(&self, progress: &MediaProgress) {
        for listener in self.progress_listeners.snapshot() {
            listener.on_progress_updated(progress);
        }
    }

    fn status_listener(&self) -> Option<Arc<dyn PlaybackStatusListener>> {
        self.status_listener.lock().clone()
    }

    pub(crate) fn notify_playback_started(
        &self,
        item: &dyn PlaylistItem,
        position_ms: u64,
        duration_ms: u64,
    ) {
        if let Some(listener) = self.status_listener() {
            listener.on_media_playback_started(item, position_ms, duration_ms);
        }
    }

    pub(crate) fn notify_item_playback_ended(&self, item: Option<&dyn PlaylistItem>) {
        if let Some(listener) = self.status_listener() {
            listener.on_item_playback_ended(item);
        }
    }

    pub(crate) fn notify_playlist_ended(&self) {
        if let Some(listener) = self.status_listener() {
            listener.on_playlist_ended();
        }
    }

    pub(crate) fn notify_item_skipped(&self, item: &dyn PlaylistItem) {
        if let Some(listener) = self.status_listener() {
            listener.on_item_skipped(item);
        }
    }
}
