//! # Playback State Machine
//!
//! Single authority for "what is playing, on which backend, in what state".
//! The handler is owned by the engine actor and every method runs on its
//! serialized command stream; nothing here needs internal locking.
//!
//! Backend failures never escape as `Result`s: a backend error transitions
//! the session to [`PlaybackState::Error`] and releases held resources, and
//! the only externally visible signals are the state change and the
//! playlist-ended notification.

use crate::cursor::PlaylistCursor;
use crate::engine::EngineEvent;
use crate::focus::{FocusArbiter, FocusDirective};
use crate::manager::PlaylistManager;
use crate::poller::ProgressPoller;
use crate::progress::MediaProgress;
use crate::registry::PlayerRegistry;
use crate::state::{PlaybackState, PlaylistItemChange};
use playback_bridge::{
    FocusChange, ItemSource, MediaPlayer, MediaSnapshot, PlayerEvent, PlayerEventSink,
    PlaylistItem, PresentationSink, ServiceCallbacks, WakeLock,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Collaborators and owned components the handler is assembled from.
///
/// Built by the engine; hosts never construct a handler directly.
pub struct HandlerComponents {
    pub manager: Arc<PlaylistManager>,
    pub cursor: PlaylistCursor,
    pub registry: PlayerRegistry,
    pub poller: ProgressPoller,
    pub focus: FocusArbiter,
    pub presentation: Arc<dyn PresentationSink>,
    pub service: Arc<dyn ServiceCallbacks>,
    pub wake_lock: Arc<dyn WakeLock>,
    pub player_sink: PlayerEventSink,
    pub events: broadcast::Sender<EngineEvent>,
    pub foreground_id: u32,
}

/// Orchestrates the backend registry, progress poller, and focus arbiter
/// against the playlist cursor.
///
/// Exactly one backend is current at a time; the handler exclusively owns the
/// selection and is the only writer of [`PlaybackState`].
pub struct PlaybackHandler {
    manager: Arc<PlaylistManager>,
    cursor: PlaylistCursor,
    registry: PlayerRegistry,
    poller: ProgressPoller,
    focus: FocusArbiter,
    presentation: Arc<dyn PresentationSink>,
    service: Arc<dyn ServiceCallbacks>,
    wake_lock: Arc<dyn WakeLock>,
    player_sink: PlayerEventSink,
    events: broadcast::Sender<EngineEvent>,
    foreground_id: u32,

    state: PlaybackState,
    current_backend: Option<Arc<dyn MediaPlayer>>,
    // Seek requested before the backend finished preparing.
    seek_to_position: Option<u64>,
    start_paused: bool,
    playing_before_seek: bool,
    paused_for_seek: bool,
    last_buffer_percent: u8,
}

impl PlaybackHandler {
    pub fn new(components: HandlerComponents) -> Self {
        Self {
            manager: components.manager,
            cursor: components.cursor,
            registry: components.registry,
            poller: components.poller,
            focus: components.focus,
            presentation: components.presentation,
            service: components.service,
            wake_lock: components.wake_lock,
            player_sink: components.player_sink,
            events: components.events,
            foreground_id: components.foreground_id,
            state: PlaybackState::Stopped,
            current_backend: None,
            seek_to_position: None,
            start_paused: false,
            playing_before_seek: false,
            paused_for_seek: false,
            last_buffer_percent: 0,
        }
    }

    // === State accessors ===

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.current_backend
            .as_ref()
            .map(|backend| backend.is_playing())
            .unwrap_or(false)
    }

    pub fn current_item(&self) -> Option<Arc<dyn PlaylistItem>> {
        self.cursor.current_item()
    }

    pub fn cursor(&self) -> &PlaylistCursor {
        &self.cursor
    }

    pub fn progress(&self) -> MediaProgress {
        self.poller.progress()
    }

    pub fn paused_for_focus_loss(&self) -> bool {
        self.focus.paused_for_focus_loss()
    }

    fn current_backend_self_managed(&self) -> bool {
        self.current_backend
            .as_ref()
            .map(|backend| backend.handles_own_focus())
            .unwrap_or(false)
    }

    // === Playlist installation ===

    /// Install a new item set. A set carrying the identity of the one already
    /// installed replaces the source in place (clamping the selection)
    /// instead of resetting the cursor.
    pub fn set_playlist(
        &mut self,
        source: Arc<dyn ItemSource>,
        start_position: usize,
        playlist_id: u64,
    ) {
        if self.cursor.playlist_id() == Some(playlist_id) {
            debug!(playlist_id, "refreshing source for installed playlist");
            self.cursor.replace_source(source);
        } else {
            self.cursor.set_parameters(source, start_position, playlist_id);
        }
        self.notify_item_change();
    }

    // === Backend registry management ===

    pub fn add_player(&mut self, player: Arc<dyn MediaPlayer>) {
        self.registry.add_player(player);
    }

    pub fn insert_player(&mut self, index: usize, player: Arc<dyn MediaPlayer>) {
        self.registry.insert_player(index, player);
    }

    /// Remove a backend from the registry. A removed backend that is current
    /// stays current until the next selection; callers typically follow with
    /// [`refresh_backend_selection`](Self::refresh_backend_selection).
    pub fn remove_player(&mut self, player: &Arc<dyn MediaPlayer>) -> bool {
        self.registry.remove_player(player)
    }

    // === User operations ===

    /// Resume (or confirm) playback on the current backend. Idempotent.
    pub async fn play(&mut self) {
        let Some(backend) = self.current_backend.clone() else {
            return;
        };

        // Advisory: a denied grant never blocks playback.
        self.focus.request(backend.handles_own_focus());

        if !backend.is_playing() {
            backend.play().await;
        }
        self.poller.start();
        self.set_playback_state(PlaybackState::Playing);
        self.raise_foreground();
    }

    /// Pause playback. A transient pause (seek in flight, focus duck)
    /// retains the focus grant; a user pause abandons it.
    pub async fn pause(&mut self, transient: bool) {
        let Some(backend) = self.current_backend.clone() else {
            return;
        };
        if !backend.is_playing() && self.state == PlaybackState::Paused {
            return;
        }

        if backend.is_playing() {
            backend.pause().await;
        }
        self.poller.stop();
        self.set_playback_state(PlaybackState::Paused);
        if let Err(err) = self.service.end_foreground(false) {
            warn!(%err, "failed to leave foreground");
        }

        if !transient {
            self.focus.abandon(backend.handles_own_focus());
        }
    }

    pub async fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.pause(false).await;
        } else {
            self.play().await;
        }
    }

    /// End the session: stop the backend, release every held resource, reset
    /// the cursor, and ask the hosting process to terminate.
    pub async fn stop(&mut self) {
        if let Some(backend) = self.current_backend.clone() {
            backend.stop().await;
        }
        self.set_playback_state(PlaybackState::Stopped);

        let current = self.cursor.current_item();
        self.manager.notify_item_playback_ended(current.as_deref());

        self.relax_resources(true).await;
        if let Err(err) = self.presentation.clear() {
            warn!(%err, "failed to clear presentation");
        }
        self.cursor.reset();
        self.service.stop();
    }

    /// Like [`stop`](Self::stop) but for handler destruction: additionally
    /// releases the poller and the current backend, and does not ask the
    /// hosting process to terminate (it is already going away).
    pub async fn tear_down(&mut self) {
        self.set_playback_state(PlaybackState::Stopped);
        self.relax_resources(true).await;
        if let Err(err) = self.presentation.clear() {
            warn!(%err, "failed to clear presentation");
        }
        self.poller.release();
        if let Some(backend) = self.current_backend.take() {
            backend.set_event_sink(None);
            backend.release().await;
        }
    }

    /// Advance one item and begin loading it, preserving whether audio was
    /// audible before the skip.
    pub async fn next(&mut self) {
        let start_paused = !self.is_playing();
        self.advance_and_play(start_paused).await;
    }

    /// Retreat one item and begin loading it, preserving audibility. At
    /// position 0 this restarts the first item.
    pub async fn previous(&mut self) {
        let start_paused = !self.is_playing();
        if self.cursor.previous().is_some() {
            self.start_item_playback(0, start_paused).await;
        }
    }

    /// A user-visible seek gesture began. Pauses transiently while the
    /// gesture is in progress so audio does not stutter under scrubbing.
    pub async fn start_seek(&mut self) {
        if self.is_playing() {
            self.paused_for_seek = true;
            self.pause(true).await;
        }
    }

    /// Seek the current backend, recording the pre-seek intent so completion
    /// can restore it.
    pub async fn seek(&mut self, position_ms: u64) {
        let Some(backend) = self.current_backend.clone() else {
            return;
        };
        self.playing_before_seek = self.is_playing();
        backend.seek_to(position_ms).await;
        self.set_playback_state(PlaybackState::Seeking);
    }

    /// Re-resolve which backend should handle the current item (e.g. a
    /// higher-priority remote backend just became available) and resume from
    /// the current position, preserving paused/playing intent.
    pub async fn refresh_backend_selection(&mut self) {
        if self.cursor.current_item().is_none() {
            return;
        }
        let position = self
            .current_backend
            .as_ref()
            .map(|backend| backend.current_position())
            .unwrap_or(0);
        let start_paused = !self.is_playing();
        self.start_item_playback(position, start_paused).await;
    }

    // === Backend selection ===

    /// Resolve a playable (item, backend) pair starting at the cursor's
    /// current item and begin loading it.
    ///
    /// Items nothing handles are skipped (with a per-item notification);
    /// exhausting the playlist ends the session.
    pub async fn start_item_playback(&mut self, seek_position_ms: u64, start_paused: bool) {
        let previous = self.cursor.current_item();
        self.manager.notify_item_playback_ended(previous.as_deref());

        self.set_playback_state(PlaybackState::Retrieving);

        // No selection yet: begin at the head of the list.
        if self.cursor.position().is_none() {
            self.cursor.next();
        }

        let resolved = loop {
            match self.cursor.current_item() {
                None => break None,
                Some(item) => {
                    if let Some(backend) = self.registry.select_for(item.as_ref()) {
                        break Some((item, backend));
                    }
                    info!(item_id = item.id(), "no backend handles item, skipping");
                    self.manager.notify_item_skipped(item.as_ref());
                    if self.cursor.next().is_none() {
                        break None;
                    }
                }
            }
        };

        let Some((item, backend)) = resolved else {
            info!("no playable item remains");
            self.manager.notify_playlist_ended();
            let _ = self.events.send(EngineEvent::PlaylistEnded);
            self.stop().await;
            return;
        };

        self.update_current_backend(backend.clone()).await;
        self.notify_item_change();

        // Idempotent re-initialization of the chosen backend.
        backend.stop().await;
        backend.reset().await;
        self.poller.update(backend.clone());
        self.poller.reset();
        self.last_buffer_percent = 0;

        self.seek_to_position = (seek_position_ms > 0).then_some(seek_position_ms);
        self.start_paused = start_paused;

        self.focus.request(backend.handles_own_focus());
        backend.play_item(Arc::clone(&item)).await;
        self.set_playback_state(PlaybackState::Preparing);
        self.wake_lock.update(!item.is_locally_available());
        self.raise_foreground();
    }

    async fn update_current_backend(&mut self, backend: Arc<dyn MediaPlayer>) {
        if let Some(current) = self.current_backend.clone() {
            if Arc::ptr_eq(&current, &backend) {
                return;
            }
            debug!("swapping playback backend");
            current.set_event_sink(None);
            current.stop().await;
            let _ = self.events.send(EngineEvent::BackendChanged);
        }

        backend.set_event_sink(Some(self.player_sink.clone()));
        self.current_backend = Some(backend);
    }

    async fn advance_and_play(&mut self, start_paused: bool) {
        if self.cursor.next().is_some() {
            self.start_item_playback(0, start_paused).await;
        } else {
            info!("playlist exhausted");
            self.manager.notify_playlist_ended();
            let _ = self.events.send(EngineEvent::PlaylistEnded);
            self.stop().await;
        }
    }

    // === Backend event entry points ===

    /// The only permitted entry point for backend-driven transitions. Events
    /// arrive here already marshaled onto the engine's command stream.
    pub async fn on_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Prepared => self.on_prepared().await,
            PlayerEvent::BufferingUpdate { percent } => self.on_buffering_update(percent),
            PlayerEvent::SeekComplete => self.on_seek_complete().await,
            PlayerEvent::Completion => self.on_completion().await,
            PlayerEvent::Error { message } => self.on_error(&message).await,
        }
    }

    async fn on_prepared(&mut self) {
        let Some(backend) = self.current_backend.clone() else {
            return;
        };

        // A pending setup seek is not user-visible seeking.
        let seek_requested = self.seek_to_position.is_some();
        if let Some(position) = self.seek_to_position.take() {
            backend.seek_to(position).await;
        }

        self.poller.start();

        if !backend.is_playing() && !self.start_paused {
            // The backend will still report the setup seek's completion;
            // record it as a seek pause so that report resumes rather than
            // pausing the playback just started.
            self.paused_for_seek = seek_requested;
            self.play().await;
            if let Some(item) = self.cursor.current_item() {
                self.manager.notify_playback_started(
                    item.as_ref(),
                    backend.current_position(),
                    backend.duration(),
                );
            }
        } else {
            self.set_playback_state(PlaybackState::Paused);
        }

        // A grant change during preparation takes effect now.
        let directive = self
            .focus
            .refresh(backend.handles_own_focus(), backend.is_playing());
        self.apply_focus_directive(directive).await;
    }

    fn on_buffering_update(&mut self, percent: u8) {
        // While playing the poller already carries buffer state; duplicate
        // and unchanged updates are dropped.
        if self.is_playing() || percent == self.last_buffer_percent {
            return;
        }
        self.last_buffer_percent = percent;

        let Some(backend) = self.current_backend.as_ref() else {
            return;
        };
        let progress = MediaProgress::new(
            backend.current_position() as i64,
            i32::from(percent),
            backend.duration() as i64,
        );
        self.manager.notify_progress(&progress);
        let _ = self.events.send(EngineEvent::ProgressUpdated { progress });
    }

    async fn on_seek_complete(&mut self) {
        if self.playing_before_seek || self.paused_for_seek {
            self.playing_before_seek = false;
            self.paused_for_seek = false;
            self.play().await;
        } else {
            self.pause(false).await;
        }
    }

    async fn on_completion(&mut self) {
        debug!("item playback completed");
        // Natural completion always resumes playback of the following item.
        self.advance_and_play(false).await;
    }

    async fn on_error(&mut self, message: &str) {
        error!(message, "backend playback error");
        self.set_playback_state(PlaybackState::Error);
        self.relax_resources(true).await;
    }

    // === Poller and focus entry points ===

    /// Progress sample marshaled from the poll task.
    pub fn on_progress(&mut self, progress: MediaProgress) {
        self.last_buffer_percent = progress.buffer_percent();
        self.manager.notify_progress(&progress);
        let _ = self.events.send(EngineEvent::ProgressUpdated { progress });
    }

    /// External grant/revocation notice for the exclusive playback resource.
    pub async fn on_focus_change(&mut self, change: FocusChange) {
        let self_managed = self.current_backend_self_managed();
        let playing = self.is_playing();
        let directive = self.focus.on_focus_change(change, self_managed, playing);
        self.apply_focus_directive(directive).await;
    }

    async fn apply_focus_directive(&mut self, directive: FocusDirective) {
        match directive {
            FocusDirective::None => {}
            FocusDirective::Pause => self.pause(true).await,
            FocusDirective::Resume => self.play().await,
            FocusDirective::SetVolume(volume) => {
                if let Some(backend) = self.current_backend.clone() {
                    backend.set_volume(volume, volume).await;
                }
            }
        }
    }

    // === Presentation ===

    /// Recompute the presentation snapshot and push it at the sink. No-op
    /// without a current item.
    pub fn update_media_controls(&self) {
        let Some(snapshot) = self.build_snapshot() else {
            return;
        };
        if let Err(err) = self.presentation.update(&snapshot) {
            warn!(%err, "presentation sink rejected snapshot");
        }
    }

    fn raise_foreground(&self) {
        let Some(snapshot) = self.build_snapshot() else {
            return;
        };
        if let Err(err) = self.service.run_in_foreground(self.foreground_id, &snapshot) {
            warn!(%err, "failed to enter foreground");
        }
    }

    fn build_snapshot(&self) -> Option<MediaSnapshot> {
        let item = self.cursor.current_item()?;
        let progress = self.poller.progress();
        Some(MediaSnapshot {
            title: item.title().unwrap_or_default(),
            album: item.album().unwrap_or_default(),
            artist: item.artist().unwrap_or_default(),
            is_playing: self.is_playing(),
            is_loading: self.state.is_loading(),
            has_next: self.cursor.has_next(),
            has_previous: self.cursor.has_previous(),
            artwork_url: item.artwork_url(),
            position_ms: Some(progress.position()),
            duration_ms: Some(progress.duration()),
        })
    }

    // === Internal transitions ===

    /// The single state setter. Skips unchanged states, notifies listeners,
    /// and refreshes presentation for non-terminal states.
    fn set_playback_state(&mut self, state: PlaybackState) {
        if state == self.state {
            return;
        }
        debug!(from = %self.state, to = %state, "playback state changed");
        self.state = state;
        self.manager.notify_state_change(state);
        let _ = self.events.send(EngineEvent::StateChanged { state });

        if !state.is_terminal() {
            self.update_media_controls();
        }
    }

    fn notify_item_change(&mut self) {
        let change = PlaylistItemChange {
            current_item: self.cursor.current_item(),
            has_next: self.cursor.has_next(),
            has_previous: self.cursor.has_previous(),
        };
        self.manager.notify_item_change(&change);
        let _ = self.events.send(EngineEvent::ItemChanged {
            item_id: change.current_item.as_ref().map(|item| item.id()),
            has_next: change.has_next,
            has_previous: change.has_previous,
        });
        self.update_media_controls();
    }

    /// Release playback-adjacent resources: poller, foreground status, wake
    /// lock, and (optionally) the focus grant.
    async fn relax_resources(&mut self, release_focus: bool) {
        self.poller.stop();
        if let Err(err) = self.service.end_foreground(true) {
            warn!(%err, "failed to end foreground");
        }
        self.wake_lock.release();
        if release_focus {
            let self_managed = self.current_backend_self_managed();
            self.focus.abandon(self_managed);
        }
    }
}
