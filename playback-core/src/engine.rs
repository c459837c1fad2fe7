//! # Playlist Engine Actor
//!
//! Owns the [`PlaybackHandler`] on a dedicated tokio task and is its only
//! caller. User commands, backend events, focus revocations, and poller
//! progress samples all arrive over the same mailbox, which gives the state
//! machine the single serialized execution stream it requires.
//!
//! ```text
//! ┌────────────┐  commands   ┌─────────────────────────┐
//! │ Controller ├────────────>│                         │
//! └────────────┘             │      Engine task        │
//! ┌────────────┐  PlayerEvent│  (mpsc mailbox, owns    │  broadcast   ┌────────────┐
//! │  Backends  ├────────────>│   PlaybackHandler)      ├─────────────>│ Subscriber │
//! └────────────┘             │                         │              └────────────┘
//! ┌────────────┐  progress   │                         │
//! │   Poller   ├────────────>│                         │
//! └────────────┘             └─────────────────────────┘
//! ```
//!
//! Subscribers that fall behind the broadcast buffer receive
//! `RecvError::Lagged` and can keep reading; treat `Closed` as engine
//! shutdown.

use crate::config::EngineConfig;
use crate::cursor::PlaylistCursor;
use crate::error::{EngineError, Result};
use crate::focus::FocusArbiter;
use crate::handler::{HandlerComponents, PlaybackHandler};
use crate::manager::PlaylistManager;
use crate::poller::ProgressPoller;
use crate::progress::MediaProgress;
use crate::registry::PlayerRegistry;
use crate::state::PlaybackState;
use playback_bridge::{
    FocusBridge, FocusChange, ItemSource, MediaPlayer, PlayerEvent, PlayerEventSink,
    PresentationSink, ServiceCallbacks, VecItemSource, WakeLock,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, trace, warn};

// ============================================================================
// Events
// ============================================================================

/// Events broadcast by the engine for loosely coupled observers.
///
/// Complements the registered-listener surface on [`PlaylistManager`]; use
/// whichever fits the consumer's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The authoritative playback state changed.
    StateChanged { state: PlaybackState },
    /// The cursor's current item changed.
    ItemChanged {
        item_id: Option<u64>,
        has_next: bool,
        has_previous: bool,
    },
    /// A progress sample or buffering update.
    ProgressUpdated { progress: MediaProgress },
    /// The current item was handed to a different backend.
    BackendChanged,
    /// Traversal exhausted the playlist without a playable item.
    PlaylistEnded,
}

// ============================================================================
// Remote command surface
// ============================================================================

/// Action name understood by [`RemoteAction::from_name`].
pub const ACTION_START: &str = "playback.action.start";
pub const ACTION_PLAY_PAUSE: &str = "playback.action.play_pause";
pub const ACTION_NEXT: &str = "playback.action.next";
pub const ACTION_PREVIOUS: &str = "playback.action.previous";
pub const ACTION_STOP: &str = "playback.action.stop";
pub const ACTION_SEEK_STARTED: &str = "playback.action.seek_started";
pub const ACTION_SEEK_ENDED: &str = "playback.action.seek_ended";

/// Extras carried alongside a named remote action.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteExtras {
    pub position_ms: u64,
    pub start_paused: bool,
}

/// The fixed external command vocabulary, each mapped 1:1 to a handler
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    Start {
        seek_position_ms: u64,
        start_paused: bool,
    },
    PlayPause,
    Next,
    Previous,
    Stop,
    SeekStarted,
    SeekEnded { position_ms: u64 },
}

impl RemoteAction {
    /// Resolve a named action. Unknown names yield `None`; callers ignore
    /// them without surfacing an error.
    pub fn from_name(name: &str, extras: RemoteExtras) -> Option<Self> {
        match name {
            ACTION_START => Some(Self::Start {
                seek_position_ms: extras.position_ms,
                start_paused: extras.start_paused,
            }),
            ACTION_PLAY_PAUSE => Some(Self::PlayPause),
            ACTION_NEXT => Some(Self::Next),
            ACTION_PREVIOUS => Some(Self::Previous),
            ACTION_STOP => Some(Self::Stop),
            ACTION_SEEK_STARTED => Some(Self::SeekStarted),
            ACTION_SEEK_ENDED => Some(Self::SeekEnded {
                position_ms: extras.position_ms,
            }),
            _ => None,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time view of the session, answered by the engine task so it is
/// always internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: PlaybackState,
    pub is_playing: bool,
    pub current_item_id: Option<u64>,
    pub playlist_position: Option<usize>,
    pub has_next: bool,
    pub has_previous: bool,
    pub progress: MediaProgress,
    pub paused_for_focus_loss: bool,
}

// ============================================================================
// Commands
// ============================================================================

enum EngineCommand {
    Play,
    Pause { transient: bool },
    TogglePlayPause,
    Stop,
    TearDown,
    Next,
    Previous,
    StartSeek,
    Seek { position_ms: u64 },
    StartPlayback { seek_position_ms: u64, start_paused: bool },
    SetPlaylist {
        source: Arc<dyn ItemSource>,
        start_position: usize,
        playlist_id: u64,
    },
    AddPlayer(Arc<dyn MediaPlayer>),
    InsertPlayer(usize, Arc<dyn MediaPlayer>),
    RemovePlayer(Arc<dyn MediaPlayer>),
    RefreshBackendSelection,
    UpdateMediaControls,
    PlayerEvent(PlayerEvent),
    Progress(MediaProgress),
    FocusChange(FocusChange),
    Snapshot(oneshot::Sender<EngineSnapshot>),
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles the engine's collaborators and spawns the actor task.
///
/// # Example
///
/// ```ignore
/// let controller = EngineBuilder::new(presentation, service, wake_lock, focus)
///     .with_config(EngineConfig::default())
///     .with_player(local_backend)
///     .spawn()?;
///
/// controller.set_playlist(source, 0, playlist_id).await?;
/// controller.start_playback(0, false).await?;
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    presentation: Arc<dyn PresentationSink>,
    service: Arc<dyn ServiceCallbacks>,
    wake_lock: Arc<dyn WakeLock>,
    focus_bridge: Arc<dyn FocusBridge>,
    players: Vec<Arc<dyn MediaPlayer>>,
    source: Arc<dyn ItemSource>,
}

impl EngineBuilder {
    pub fn new(
        presentation: Arc<dyn PresentationSink>,
        service: Arc<dyn ServiceCallbacks>,
        wake_lock: Arc<dyn WakeLock>,
        focus_bridge: Arc<dyn FocusBridge>,
    ) -> Self {
        Self {
            config: EngineConfig::default(),
            presentation,
            service,
            wake_lock,
            focus_bridge,
            players: Vec::new(),
            source: Arc::new(VecItemSource::empty()),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a backend. Registration order is priority order.
    pub fn with_player(mut self, player: Arc<dyn MediaPlayer>) -> Self {
        self.players.push(player);
        self
    }

    /// Install an initial item source (may also be supplied later via
    /// [`EngineController::set_playlist`]).
    pub fn with_source(mut self, source: Arc<dyn ItemSource>) -> Self {
        self.source = source;
        self
    }

    /// Validate the configuration and spawn the engine task. Must be called
    /// from within a tokio runtime.
    pub fn spawn(self) -> Result<EngineController> {
        self.config.validate().map_err(EngineError::Config)?;

        let (command_tx, mut command_rx) = mpsc::channel(self.config.command_capacity);
        let (event_tx, _) = broadcast::channel(self.config.event_capacity);
        let manager = Arc::new(PlaylistManager::new());

        // Backend callbacks and poll samples are marshaled onto the mailbox;
        // a full mailbox drops the sample rather than blocking a decoder
        // thread.
        let sink_tx = command_tx.clone();
        let player_sink = PlayerEventSink::new(move |event| {
            if let Err(err) = sink_tx.try_send(EngineCommand::PlayerEvent(event)) {
                warn!(%err, "dropping backend event, engine mailbox unavailable");
            }
        });

        let poller = ProgressPoller::new(self.config.poll_interval);
        let progress_tx = command_tx.clone();
        poller.set_listener(Some(Arc::new(move |progress| {
            if progress_tx
                .try_send(EngineCommand::Progress(progress))
                .is_err()
            {
                trace!("dropping progress sample, engine mailbox full");
            }
        })));

        let mut registry = PlayerRegistry::new();
        for player in self.players {
            registry.add_player(player);
        }

        let mut handler = PlaybackHandler::new(HandlerComponents {
            manager: Arc::clone(&manager),
            cursor: PlaylistCursor::new(self.source),
            registry,
            poller,
            focus: FocusArbiter::new(self.focus_bridge, self.config.duck_volume),
            presentation: self.presentation,
            service: self.service,
            wake_lock: self.wake_lock,
            player_sink,
            events: event_tx.clone(),
            foreground_id: self.config.foreground_id,
        });

        let events = event_tx.clone();
        tokio::spawn(async move {
            info!("playlist engine started");
            loop {
                match command_rx.recv().await {
                    Some(EngineCommand::TearDown) | None => {
                        handler.tear_down().await;
                        break;
                    }
                    Some(command) => dispatch(&mut handler, command).await,
                }
            }
            info!("playlist engine stopped");
        });

        Ok(EngineController {
            commands: command_tx,
            events,
            manager,
        })
    }
}

async fn dispatch(handler: &mut PlaybackHandler, command: EngineCommand) {
    match command {
        EngineCommand::Play => handler.play().await,
        EngineCommand::Pause { transient } => handler.pause(transient).await,
        EngineCommand::TogglePlayPause => handler.toggle_play_pause().await,
        EngineCommand::Stop => handler.stop().await,
        EngineCommand::TearDown => unreachable!("handled by the engine loop"),
        EngineCommand::Next => handler.next().await,
        EngineCommand::Previous => handler.previous().await,
        EngineCommand::StartSeek => handler.start_seek().await,
        EngineCommand::Seek { position_ms } => handler.seek(position_ms).await,
        EngineCommand::StartPlayback {
            seek_position_ms,
            start_paused,
        } => handler.start_item_playback(seek_position_ms, start_paused).await,
        EngineCommand::SetPlaylist {
            source,
            start_position,
            playlist_id,
        } => handler.set_playlist(source, start_position, playlist_id),
        EngineCommand::AddPlayer(player) => handler.add_player(player),
        EngineCommand::InsertPlayer(index, player) => handler.insert_player(index, player),
        EngineCommand::RemovePlayer(player) => {
            handler.remove_player(&player);
        }
        EngineCommand::RefreshBackendSelection => handler.refresh_backend_selection().await,
        EngineCommand::UpdateMediaControls => handler.update_media_controls(),
        EngineCommand::PlayerEvent(event) => handler.on_player_event(event).await,
        EngineCommand::Progress(progress) => handler.on_progress(progress),
        EngineCommand::FocusChange(change) => handler.on_focus_change(change).await,
        EngineCommand::Snapshot(reply) => {
            let snapshot = EngineSnapshot {
                state: handler.state(),
                is_playing: handler.is_playing(),
                current_item_id: handler.current_item().map(|item| item.id()),
                playlist_position: handler.cursor().position(),
                has_next: handler.cursor().has_next(),
                has_previous: handler.cursor().has_previous(),
                progress: handler.progress(),
                paused_for_focus_loss: handler.paused_for_focus_loss(),
            };
            let _ = reply.send(snapshot);
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Cloneable handle for driving the engine task.
///
/// Every method enqueues onto the engine mailbox; `Err(EngineStopped)` means
/// the task has shut down.
#[derive(Clone)]
pub struct EngineController {
    commands: mpsc::Sender<EngineCommand>,
    events: broadcast::Sender<EngineEvent>,
    manager: Arc<PlaylistManager>,
}

impl EngineController {
    async fn send(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EngineError::EngineStopped)
    }

    /// Subscribe to the engine's broadcast event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The listener registries backing this engine.
    pub fn manager(&self) -> &Arc<PlaylistManager> {
        &self.manager
    }

    pub async fn play(&self) -> Result<()> {
        self.send(EngineCommand::Play).await
    }

    pub async fn pause(&self, transient: bool) -> Result<()> {
        self.send(EngineCommand::Pause { transient }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(EngineCommand::TogglePlayPause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(EngineCommand::Stop).await
    }

    /// Shut the engine task down, releasing the poller and current backend.
    pub async fn tear_down(&self) -> Result<()> {
        self.send(EngineCommand::TearDown).await
    }

    pub async fn next(&self) -> Result<()> {
        self.send(EngineCommand::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.send(EngineCommand::Previous).await
    }

    pub async fn start_seek(&self) -> Result<()> {
        self.send(EngineCommand::StartSeek).await
    }

    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        self.send(EngineCommand::Seek { position_ms }).await
    }

    /// Begin loading the cursor's current item (resolving a backend for it),
    /// optionally seeked and/or prepared-but-paused.
    pub async fn start_playback(&self, seek_position_ms: u64, start_paused: bool) -> Result<()> {
        self.send(EngineCommand::StartPlayback {
            seek_position_ms,
            start_paused,
        })
        .await
    }

    pub async fn set_playlist(
        &self,
        source: Arc<dyn ItemSource>,
        start_position: usize,
        playlist_id: u64,
    ) -> Result<()> {
        self.send(EngineCommand::SetPlaylist {
            source,
            start_position,
            playlist_id,
        })
        .await
    }

    pub async fn add_player(&self, player: Arc<dyn MediaPlayer>) -> Result<()> {
        self.send(EngineCommand::AddPlayer(player)).await
    }

    pub async fn insert_player(&self, index: usize, player: Arc<dyn MediaPlayer>) -> Result<()> {
        self.send(EngineCommand::InsertPlayer(index, player)).await
    }

    pub async fn remove_player(&self, player: Arc<dyn MediaPlayer>) -> Result<()> {
        self.send(EngineCommand::RemovePlayer(player)).await
    }

    /// Re-resolve the backend for the current item (a backend was added or
    /// removed) and resume from the current position.
    pub async fn refresh_backend_selection(&self) -> Result<()> {
        self.send(EngineCommand::RefreshBackendSelection).await
    }

    /// Force a presentation snapshot refresh (e.g. artwork finished loading).
    pub async fn update_media_controls(&self) -> Result<()> {
        self.send(EngineCommand::UpdateMediaControls).await
    }

    /// Deliver an external focus grant/revocation notice.
    pub async fn notify_focus_change(&self, change: FocusChange) -> Result<()> {
        self.send(EngineCommand::FocusChange(change)).await
    }

    /// Dispatch a named remote action. Unknown names are ignored.
    pub async fn remote_action(&self, name: &str, extras: RemoteExtras) -> Result<()> {
        match RemoteAction::from_name(name, extras) {
            Some(action) => self.dispatch_remote(action).await,
            None => {
                debug!(name, "ignoring unknown remote action");
                Ok(())
            }
        }
    }

    /// Dispatch an already-resolved remote action.
    pub async fn dispatch_remote(&self, action: RemoteAction) -> Result<()> {
        match action {
            RemoteAction::Start {
                seek_position_ms,
                start_paused,
            } => self.start_playback(seek_position_ms, start_paused).await,
            RemoteAction::PlayPause => self.toggle_play_pause().await,
            RemoteAction::Next => self.next().await,
            RemoteAction::Previous => self.previous().await,
            RemoteAction::Stop => self.stop().await,
            RemoteAction::SeekStarted => self.start_seek().await,
            RemoteAction::SeekEnded { position_ms } => self.seek(position_ms).await,
        }
    }

    /// Query a consistent point-in-time view of the session.
    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| EngineError::EngineStopped)
    }
}
