//! Shared test doubles for the engine integration suites.

#![allow(dead_code)]

use parking_lot::Mutex;
use playback_bridge::{
    BridgeError, FocusBridge, ItemSource, MediaKind, MediaPlayer, MediaSnapshot, PlayerEvent,
    PlayerEventSink, PlaylistItem, PresentationSink, ServiceCallbacks, VecItemSource, WakeLock,
};
use playback_core::{EngineBuilder, EngineConfig, EngineController};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Playlist items
// ============================================================================

pub struct TestItem {
    pub id: u64,
    pub kind: MediaKind,
    pub local: bool,
}

impl TestItem {
    pub fn audio(id: u64) -> Self {
        Self {
            id,
            kind: MediaKind::Audio,
            local: true,
        }
    }

    pub fn video(id: u64) -> Self {
        Self {
            id,
            kind: MediaKind::Video,
            local: true,
        }
    }

    pub fn remote(mut self) -> Self {
        self.local = false;
        self
    }
}

impl PlaylistItem for TestItem {
    fn id(&self) -> u64 {
        self.id
    }
    fn media_kind(&self) -> MediaKind {
        self.kind.clone()
    }
    fn is_locally_available(&self) -> bool {
        self.local
    }
    fn media_url(&self) -> Option<String> {
        Some(format!("https://media.example/{}", self.id))
    }
    fn local_media_uri(&self) -> Option<String> {
        self.local.then(|| format!("/media/{}.ogg", self.id))
    }
    fn title(&self) -> Option<String> {
        Some(format!("Track {}", self.id))
    }
    fn album(&self) -> Option<String> {
        Some("Test Album".to_string())
    }
    fn artist(&self) -> Option<String> {
        Some("Test Artist".to_string())
    }
    fn artwork_url(&self) -> Option<String> {
        None
    }
    fn thumbnail_url(&self) -> Option<String> {
        None
    }
}

pub fn source_of(items: Vec<TestItem>) -> Arc<dyn ItemSource> {
    let items = items
        .into_iter()
        .map(|item| Arc::new(item) as Arc<dyn PlaylistItem>)
        .collect();
    Arc::new(VecItemSource::new(items))
}

// ============================================================================
// Scripted backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Play,
    Pause,
    Stop,
    Reset,
    Release,
    SeekTo(u64),
    SetVolume(f32, f32),
    PlayItem(u64),
}

/// Manual mock backend: records every command, tracks a playing flag, and
/// lets tests emit status events through the sink the engine installed.
pub struct ScriptedPlayer {
    handles: MediaKind,
    own_focus: bool,
    playing: AtomicBool,
    position: AtomicU64,
    duration: AtomicU64,
    buffered: AtomicU8,
    calls: Mutex<Vec<PlayerCall>>,
    sink: Mutex<Option<PlayerEventSink>>,
}

impl ScriptedPlayer {
    fn new(handles: MediaKind, own_focus: bool) -> Arc<Self> {
        Arc::new(Self {
            handles,
            own_focus,
            playing: AtomicBool::new(false),
            position: AtomicU64::new(0),
            duration: AtomicU64::new(180_000),
            buffered: AtomicU8::new(0),
            calls: Mutex::new(Vec::new()),
            sink: Mutex::new(None),
        })
    }

    pub fn audio() -> Arc<Self> {
        Self::new(MediaKind::Audio, false)
    }

    pub fn audio_with_own_focus() -> Arc<Self> {
        Self::new(MediaKind::Audio, true)
    }

    pub fn set_position(&self, position_ms: u64) {
        self.position.store(position_ms, Ordering::SeqCst);
    }

    pub fn set_buffered(&self, percent: u8) {
        self.buffered.store(percent, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, call: &PlayerCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Emit a status event through the sink the engine installed.
    pub fn emit(&self, event: PlayerEvent) {
        let sink = self.sink.lock().clone();
        sink.expect("no event sink installed on this backend")
            .emit(event);
    }

    fn record(&self, call: PlayerCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait::async_trait]
impl MediaPlayer for ScriptedPlayer {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
    fn handles_own_focus(&self) -> bool {
        self.own_focus
    }
    fn current_position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }
    fn duration(&self) -> u64 {
        self.duration.load(Ordering::SeqCst)
    }
    fn buffered_percent(&self) -> u8 {
        self.buffered.load(Ordering::SeqCst)
    }
    fn handles_item(&self, item: &dyn PlaylistItem) -> bool {
        item.media_kind() == self.handles
    }
    fn set_event_sink(&self, sink: Option<PlayerEventSink>) {
        *self.sink.lock() = sink;
    }

    async fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
        self.record(PlayerCall::Play);
    }
    async fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.record(PlayerCall::Pause);
    }
    async fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.record(PlayerCall::Stop);
    }
    async fn reset(&self) {
        self.record(PlayerCall::Reset);
    }
    async fn release(&self) {
        self.record(PlayerCall::Release);
    }
    async fn seek_to(&self, position_ms: u64) {
        self.position.store(position_ms, Ordering::SeqCst);
        self.record(PlayerCall::SeekTo(position_ms));
    }
    async fn set_volume(&self, left: f32, right: f32) {
        self.record(PlayerCall::SetVolume(left, right));
    }
    async fn play_item(&self, item: Arc<dyn PlaylistItem>) {
        self.record(PlayerCall::PlayItem(item.id()));
    }
}

// ============================================================================
// Host collaborator doubles
// ============================================================================

#[derive(Default)]
pub struct RecordingPresentation {
    pub snapshots: Mutex<Vec<MediaSnapshot>>,
    pub clears: AtomicUsize,
}

impl PresentationSink for RecordingPresentation {
    fn update(&self, snapshot: &MediaSnapshot) -> Result<(), BridgeError> {
        self.snapshots.lock().push(snapshot.clone());
        Ok(())
    }
    fn clear(&self) -> Result<(), BridgeError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingService {
    pub stops: AtomicUsize,
    pub foreground_starts: AtomicUsize,
    pub foreground_ends: AtomicUsize,
}

impl ServiceCallbacks for RecordingService {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
    fn run_in_foreground(&self, _id: u32, _snapshot: &MediaSnapshot) -> Result<(), BridgeError> {
        self.foreground_starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn end_foreground(&self, _dismiss: bool) -> Result<(), BridgeError> {
        self.foreground_ends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingWakeLock {
    pub held: AtomicBool,
    pub releases: AtomicUsize,
}

impl WakeLock for RecordingWakeLock {
    fn update(&self, enabled: bool) {
        self.held.store(enabled, Ordering::SeqCst);
    }
    fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingFocusBridge {
    pub requests: AtomicUsize,
    pub abandons: AtomicUsize,
}

impl FocusBridge for RecordingFocusBridge {
    fn request_focus(&self) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn abandon_focus(&self) -> bool {
        self.abandons.fetch_add(1, Ordering::SeqCst);
        true
    }
}

// ============================================================================
// Engine harness
// ============================================================================

pub struct TestHarness {
    pub controller: EngineController,
    pub presentation: Arc<RecordingPresentation>,
    pub service: Arc<RecordingService>,
    pub wake_lock: Arc<RecordingWakeLock>,
    pub focus: Arc<RecordingFocusBridge>,
}

impl TestHarness {
    /// Mailbox barrier: returns once every previously enqueued command has
    /// been processed. Required before the first `emit` on a backend, since
    /// enqueuing a command does not mean the engine task has run yet.
    pub async fn settle(&self) {
        self.controller.snapshot().await.expect("engine stopped");
    }
}

/// Spawn an engine with the given backends and item source. Uses a slow poll
/// interval so poller noise stays out of short-lived tests.
pub fn spawn_engine(players: Vec<Arc<ScriptedPlayer>>, source: Arc<dyn ItemSource>) -> TestHarness {
    let presentation = Arc::new(RecordingPresentation::default());
    let service = Arc::new(RecordingService::default());
    let wake_lock = Arc::new(RecordingWakeLock::default());
    let focus = Arc::new(RecordingFocusBridge::default());

    let mut builder = EngineBuilder::new(
        Arc::clone(&presentation) as _,
        Arc::clone(&service) as _,
        Arc::clone(&wake_lock) as _,
        Arc::clone(&focus) as _,
    )
    .with_config(EngineConfig::default().with_poll_interval(Duration::from_secs(60)))
    .with_source(source);

    for player in players {
        builder = builder.with_player(player as _);
    }

    let controller = builder.spawn().expect("engine failed to spawn");
    TestHarness {
        controller,
        presentation,
        service,
        wake_lock,
        focus,
    }
}
