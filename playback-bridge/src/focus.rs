//! Exclusive playback resource (focus) contract.
//!
//! "Focus" is a platform-level, revocable grant signalling that this process
//! is the active audio/video producer. The core requests and abandons it
//! through [`FocusBridge`]; revocations arrive asynchronously from the
//! platform and must be forwarded into the engine as [`FocusChange`] values.

use serde::{Deserialize, Serialize};

/// External change to the exclusive playback resource grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    /// The resource was (re)granted to this process.
    Gained,
    /// The resource was taken away indefinitely.
    Lost,
    /// The resource was taken away temporarily; playback must pause but may
    /// resume when the resource returns.
    LostTransient,
    /// The resource was taken away temporarily, but reduced-volume playback
    /// (ducking) is permitted.
    LostTransientCanDuck,
}

/// Platform operations for the exclusive playback resource.
///
/// Both operations return whether the request was granted. Grants are
/// advisory for the core: a denied request never blocks playback.
pub trait FocusBridge: Send + Sync {
    /// Ask the platform for the exclusive playback resource.
    fn request_focus(&self) -> bool;

    /// Tell the platform this process no longer needs the resource. Must be
    /// idempotent.
    fn abandon_focus(&self) -> bool;
}
