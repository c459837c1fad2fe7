//! Playlist navigation cursor.

use playback_bridge::{ItemSource, PlaylistItem};
use std::sync::Arc;

/// Current-position/navigation state over an externally supplied
/// [`ItemSource`].
///
/// `position` is `None` when nothing is selected (the external `-1`
/// sentinel). `next`/`previous` saturate at the list boundaries: no
/// wraparound, and `previous` at position 0 keeps the selection. `next` past
/// the tail returns `None` without moving, which is what lets the skip
/// traversal detect playlist exhaustion.
pub struct PlaylistCursor {
    source: Arc<dyn ItemSource>,
    position: Option<usize>,
    playlist_id: Option<u64>,
}

impl PlaylistCursor {
    pub fn new(source: Arc<dyn ItemSource>) -> Self {
        Self {
            source,
            position: None,
            playlist_id: None,
        }
    }

    /// Identity of the currently installed item set, when the host supplied
    /// one. Used to detect whether a newly supplied set is the "same"
    /// playlist and skip a redundant reset.
    pub fn playlist_id(&self) -> Option<u64> {
        self.playlist_id
    }

    /// Current position, `None` when nothing is selected.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn item_count(&self) -> usize {
        self.source.item_count()
    }

    pub fn current_item(&self) -> Option<Arc<dyn PlaylistItem>> {
        self.position.and_then(|pos| self.source.item_at(pos))
    }

    pub fn has_next(&self) -> bool {
        match self.position {
            Some(pos) => pos + 1 < self.source.item_count(),
            None => self.source.item_count() > 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.position, Some(pos) if pos > 0)
    }

    /// Advance by one. Returns the new current item, or `None` (without
    /// moving) when the cursor is already at the tail of an empty or
    /// exhausted list.
    pub fn next(&mut self) -> Option<Arc<dyn PlaylistItem>> {
        let count = self.source.item_count();
        let candidate = match self.position {
            Some(pos) => pos + 1,
            None => 0,
        };

        if candidate >= count {
            return None;
        }

        self.position = Some(candidate);
        self.current_item()
    }

    /// Retreat by one, saturating at position 0 (the selection at 0 is
    /// returned again rather than deselecting).
    pub fn previous(&mut self) -> Option<Arc<dyn PlaylistItem>> {
        match self.position {
            None => None,
            Some(0) => self.current_item(),
            Some(pos) => {
                self.position = Some(pos - 1);
                self.current_item()
            }
        }
    }

    /// Jump to an absolute position, clamped to the valid range. Positions at
    /// or past the tail select the last item; an empty list deselects.
    pub fn set_position(&mut self, position: usize) {
        let count = self.source.item_count();
        self.position = if count == 0 {
            None
        } else {
            Some(position.min(count - 1))
        };
    }

    /// Select the item with the given id, when present. The selection is left
    /// untouched when no such item exists.
    pub fn set_current_item(&mut self, item_id: u64) {
        if let Some(position) = self.source.position_for_item(item_id) {
            self.position = Some(position);
        }
    }

    /// Replace the item source wholesale and select `start_position`.
    pub fn set_parameters(
        &mut self,
        source: Arc<dyn ItemSource>,
        start_position: usize,
        playlist_id: u64,
    ) {
        self.source = source;
        self.playlist_id = Some(playlist_id);
        self.set_position(start_position);
    }

    /// Swap in a refreshed source for the same playlist, clamping the current
    /// selection rather than resetting it.
    pub fn replace_source(&mut self, source: Arc<dyn ItemSource>) {
        self.source = source;
        if let Some(pos) = self.position {
            self.set_position(pos);
        }
    }

    /// Drop the selection and playlist identity.
    pub fn reset(&mut self) {
        self.position = None;
        self.playlist_id = None;
    }
}
