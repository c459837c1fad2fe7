//! Ordered player backend registry.

use playback_bridge::{MediaPlayer, PlaylistItem};
use std::sync::Arc;

/// An ordered collection of player backend handles.
///
/// Registration order is priority order: selection returns the first backend
/// whose `handles_item` accepts the item. The registry holds references only;
/// stopping/resetting a backend at swap time is the handler's job.
#[derive(Default)]
pub struct PlayerRegistry {
    players: Vec<Arc<dyn MediaPlayer>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend at the lowest priority.
    pub fn add_player(&mut self, player: Arc<dyn MediaPlayer>) {
        self.players.push(player);
    }

    /// Insert a backend at the given priority index (0 = highest), clamped to
    /// the current length.
    pub fn insert_player(&mut self, index: usize, player: Arc<dyn MediaPlayer>) {
        let index = index.min(self.players.len());
        self.players.insert(index, player);
    }

    /// Remove a backend by handle identity. Returns whether it was present.
    pub fn remove_player(&mut self, player: &Arc<dyn MediaPlayer>) -> bool {
        let before = self.players.len();
        self.players.retain(|known| !Arc::ptr_eq(known, player));
        self.players.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// First backend (in registration order) that can play `item`.
    pub fn select_for(&self, item: &dyn PlaylistItem) -> Option<Arc<dyn MediaPlayer>> {
        self.players
            .iter()
            .find(|player| player.handles_item(item))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playback_bridge::{MediaKind, PlayerEventSink};

    struct Item(MediaKind);

    impl PlaylistItem for Item {
        fn id(&self) -> u64 {
            0
        }
        fn media_kind(&self) -> MediaKind {
            self.0.clone()
        }
        fn is_locally_available(&self) -> bool {
            true
        }
        fn media_url(&self) -> Option<String> {
            None
        }
        fn local_media_uri(&self) -> Option<String> {
            None
        }
        fn title(&self) -> Option<String> {
            None
        }
        fn album(&self) -> Option<String> {
            None
        }
        fn artist(&self) -> Option<String> {
            None
        }
        fn artwork_url(&self) -> Option<String> {
            None
        }
        fn thumbnail_url(&self) -> Option<String> {
            None
        }
    }

    struct KindPlayer(MediaKind);

    #[async_trait::async_trait]
    impl MediaPlayer for KindPlayer {
        fn is_playing(&self) -> bool {
            false
        }
        fn handles_own_focus(&self) -> bool {
            false
        }
        fn current_position(&self) -> u64 {
            0
        }
        fn duration(&self) -> u64 {
            0
        }
        fn buffered_percent(&self) -> u8 {
            0
        }
        fn handles_item(&self, item: &dyn PlaylistItem) -> bool {
            item.media_kind() == self.0
        }
        fn set_event_sink(&self, _sink: Option<PlayerEventSink>) {}
        async fn play(&self) {}
        async fn pause(&self) {}
        async fn stop(&self) {}
        async fn reset(&self) {}
        async fn release(&self) {}
        async fn seek_to(&self, _position_ms: u64) {}
        async fn set_volume(&self, _left: f32, _right: f32) {}
        async fn play_item(&self, _item: Arc<dyn PlaylistItem>) {}
    }

    #[test]
    fn first_match_wins() {
        let mut registry = PlayerRegistry::new();
        let audio_a: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        let audio_b: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        registry.add_player(Arc::clone(&audio_a));
        registry.add_player(Arc::clone(&audio_b));

        let selected = registry.select_for(&Item(MediaKind::Audio)).unwrap();
        assert!(Arc::ptr_eq(&selected, &audio_a));
    }

    #[test]
    fn no_match_returns_none() {
        let mut registry = PlayerRegistry::new();
        registry.add_player(Arc::new(KindPlayer(MediaKind::Audio)));

        assert!(registry.select_for(&Item(MediaKind::Video)).is_none());
    }

    #[test]
    fn insert_takes_priority() {
        let mut registry = PlayerRegistry::new();
        let low: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        let high: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        registry.add_player(Arc::clone(&low));
        registry.insert_player(0, Arc::clone(&high));

        let selected = registry.select_for(&Item(MediaKind::Audio)).unwrap();
        assert!(Arc::ptr_eq(&selected, &high));
    }

    #[test]
    fn remove_by_identity() {
        let mut registry = PlayerRegistry::new();
        let player: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        let other: Arc<dyn MediaPlayer> = Arc::new(KindPlayer(MediaKind::Audio));
        registry.add_player(Arc::clone(&player));

        assert!(!registry.remove_player(&other));
        assert!(registry.remove_player(&player));
        assert!(registry.is_empty());
    }
}
