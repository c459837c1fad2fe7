//! # Host Bridge Traits
//!
//! Collaborator contracts consumed by the playback orchestration core.
//!
//! ## Overview
//!
//! This crate defines the boundary between the core engine and everything it
//! does not implement itself: playable items and the collection that holds
//! them, concrete player backends (local decoders, remote cast clients), the
//! presentation layer (notifications, media sessions), the hosting process
//! lifecycle, and the platform's exclusive playback-resource (focus) grant.
//! Host applications provide concrete implementations; the core only ever
//! talks to these traits.
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaPlayer`](player::MediaPlayer) - backend capability contract
//! - [`PlaylistItem`](item::PlaylistItem) - a playable item's identity and metadata
//! - [`ItemSource`](source::ItemSource) - randomly-indexable ordered item collection
//!
//! ### Host Integration
//! - [`PresentationSink`](service::PresentationSink) - notification/session/artwork consumer
//! - [`ServiceCallbacks`](service::ServiceCallbacks) - hosting process lifecycle
//! - [`WakeLock`](service::WakeLock) - network/CPU keep-alive during remote playback
//! - [`FocusBridge`](focus::FocusBridge) - exclusive playback resource request/abandon
//!
//! ## Error Handling
//!
//! Fallible host operations use the [`BridgeError`](error::BridgeError) type.
//! Player backends never return errors from their control methods: transport
//! and decode failures are reported asynchronously through
//! [`PlayerEvent::Error`](player::PlayerEvent), and the core absorbs them as a
//! state transition rather than a propagated failure.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across the engine's async tasks behind `Arc`.

pub mod error;
pub mod focus;
pub mod item;
pub mod player;
pub mod service;
pub mod source;

pub use error::BridgeError;

// Re-export commonly used types
pub use focus::{FocusBridge, FocusChange};
pub use item::{MediaKind, PlaylistItem};
pub use player::{MediaPlayer, PlayerEvent, PlayerEventSink};
pub use service::{MediaSnapshot, PresentationSink, ServiceCallbacks, WakeLock};
pub use source::{ItemSource, VecItemSource};
