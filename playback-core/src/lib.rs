//! # Playback Core
//!
//! Playback orchestration between an ordered playlist and pluggable player
//! backends: the state machine, backend selection and handoff, progress
//! polling, and exclusive-resource (focus) arbitration.
//!
//! ## Architecture
//!
//! The [`engine`] module hosts everything on a single actor task so that user
//! commands, backend callbacks, focus revocations, and progress samples are
//! serialized onto one execution stream:
//!
//! - [`handler::PlaybackHandler`] — the state machine, sole owner of
//!   [`state::PlaybackState`] and of the current-backend selection.
//! - [`registry::PlayerRegistry`] — ordered backends, first-match-wins
//!   selection per item.
//! - [`poller::ProgressPoller`] — cancellable periodic position/buffer
//!   sampling.
//! - [`focus::FocusArbiter`] — exclusive playback resource mediation with
//!   duck/pause/resume directives.
//! - [`cursor::PlaylistCursor`] — saturating navigation over the host's item
//!   source.
//! - [`manager::PlaylistManager`] — token-based listener registries for
//!   external observers.
//!
//! Host collaborators (backends, item sources, presentation sinks, process
//! lifecycle) are contracts from the `playback-bridge` crate.
//!
//! ## Usage
//!
//! ```ignore
//! use playback_core::{EngineBuilder, EngineConfig};
//!
//! let controller = EngineBuilder::new(presentation, service, wake_lock, focus)
//!     .with_config(EngineConfig::default())
//!     .with_player(local_backend)
//!     .spawn()?;
//!
//! controller.set_playlist(source, 0, playlist_id).await?;
//! controller.start_playback(0, false).await?;
//!
//! let mut events = controller.subscribe();
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod focus;
pub mod handler;
pub mod logging;
pub mod manager;
pub mod poller;
pub mod progress;
pub mod registry;
pub mod state;
pub mod stopwatch;

pub use config::EngineConfig;
pub use engine::{
    EngineBuilder, EngineController, EngineEvent, EngineSnapshot, RemoteAction, RemoteExtras,
};
pub use error::{EngineError, Result};
pub use focus::{FocusArbiter, FocusDirective, FocusState};
pub use handler::PlaybackHandler;
pub use manager::{
    ListenerToken, PlaybackStatusListener, PlaylistListener, PlaylistManager, ProgressListener,
};
pub use poller::ProgressPoller;
pub use progress::{MediaProgress, MAX_BUFFER_PERCENT};
pub use registry::PlayerRegistry;
pub use state::{PlaybackState, PlaylistItemChange};
pub use stopwatch::StopWatch;
