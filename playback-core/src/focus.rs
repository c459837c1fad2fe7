//! Exclusive playback resource arbitration.

use playback_bridge::{FocusBridge, FocusChange};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Tracked grant state for the exclusive playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusState {
    /// No grant held (initial, abandoned, or permanently lost).
    None,
    /// Temporarily lost; playback must stay silent.
    NoFocusNoDuck,
    /// Temporarily lost; reduced-volume playback is permitted.
    NoFocusCanDuck,
    Focused,
}

/// Action the handler must take in response to a focus change.
///
/// The arbiter never touches the backend itself; it owns the focus state and
/// the "paused because of focus loss" flag, and the handler executes the
/// returned directive on its own serialized stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusDirective {
    None,
    /// Pause playback, retaining focus intent so a later grant can resume it.
    Pause,
    Resume,
    SetVolume(f32),
}

/// Mediates the revocable exclusive playback resource against backend
/// capabilities.
///
/// All operations are skipped entirely when the current backend self-manages
/// the resource (`handles_own_focus`). Grants are advisory: a denied request
/// never blocks playback.
pub struct FocusArbiter {
    bridge: Arc<dyn FocusBridge>,
    state: FocusState,
    paused_for_focus_loss: bool,
    duck_volume: f32,
}

impl FocusArbiter {
    pub fn new(bridge: Arc<dyn FocusBridge>, duck_volume: f32) -> Self {
        Self {
            bridge,
            state: FocusState::None,
            paused_for_focus_loss: false,
            duck_volume,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Whether the last pause was caused by a focus revocation rather than
    /// the user. Regaining the resource only auto-resumes in that case.
    pub fn paused_for_focus_loss(&self) -> bool {
        self.paused_for_focus_loss
    }

    /// Request the resource on behalf of a backend. Returns whether a grant
    /// is held afterwards.
    pub fn request(&mut self, backend_self_managed: bool) -> bool {
        if backend_self_managed {
            return false;
        }

        if self.state == FocusState::Focused {
            return true;
        }

        let granted = self.bridge.request_focus();
        if granted {
            self.state = FocusState::Focused;
        }
        debug!(granted, "requested playback focus");
        granted
    }

    /// Release the resource. Idempotent; safe under teardown racing with an
    /// in-flight revocation.
    pub fn abandon(&mut self, backend_self_managed: bool) -> bool {
        if backend_self_managed {
            return false;
        }

        if self.state == FocusState::None {
            return true;
        }

        let released = self.bridge.abandon_focus();
        if released {
            self.state = FocusState::None;
        }
        self.paused_for_focus_loss = false;
        released
    }

    /// Translate an external revocation/grant notice into a directive for the
    /// handler. Duplicate notifications produce `None`.
    pub fn on_focus_change(
        &mut self,
        change: FocusChange,
        backend_self_managed: bool,
        backend_playing: bool,
    ) -> FocusDirective {
        let new_state = match change {
            FocusChange::Gained => FocusState::Focused,
            FocusChange::Lost => FocusState::None,
            FocusChange::LostTransient => FocusState::NoFocusNoDuck,
            FocusChange::LostTransientCanDuck => FocusState::NoFocusCanDuck,
        };

        if new_state == self.state {
            return FocusDirective::None;
        }
        self.state = new_state;

        if backend_self_managed {
            return FocusDirective::None;
        }

        self.directive_for_state(backend_playing)
    }

    /// Re-apply the current focus state (used right after a backend finishes
    /// preparing, so a grant lost during preparation takes effect).
    pub fn refresh(&mut self, backend_self_managed: bool, backend_playing: bool) -> FocusDirective {
        if backend_self_managed {
            return FocusDirective::None;
        }

        self.directive_for_state(backend_playing)
    }

    fn directive_for_state(&mut self, backend_playing: bool) -> FocusDirective {
        match self.state {
            FocusState::Focused => {
                if self.paused_for_focus_loss && !backend_playing {
                    self.paused_for_focus_loss = false;
                    FocusDirective::Resume
                } else {
                    FocusDirective::SetVolume(1.0)
                }
            }
            FocusState::None | FocusState::NoFocusNoDuck => {
                if backend_playing {
                    self.paused_for_focus_loss = true;
                    FocusDirective::Pause
                } else {
                    FocusDirective::None
                }
            }
            FocusState::NoFocusCanDuck => {
                if backend_playing {
                    FocusDirective::SetVolume(self.duck_volume)
                } else {
                    FocusDirective::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBridge {
        requests: AtomicUsize,
        abandons: AtomicUsize,
        deny: bool,
    }

    impl FocusBridge for CountingBridge {
        fn request_focus(&self) -> bool {
            self.requests.fetch_add(1, Ordering::SeqCst);
            !self.deny
        }
        fn abandon_focus(&self) -> bool {
            self.abandons.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn arbiter(bridge: Arc<CountingBridge>) -> FocusArbiter {
        FocusArbiter::new(bridge, 0.1)
    }

    #[test]
    fn request_is_cached_while_focused() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(Arc::clone(&bridge));

        assert!(arbiter.request(false));
        assert!(arbiter.request(false));
        assert_eq!(bridge.requests.load(Ordering::SeqCst), 1);
        assert_eq!(arbiter.state(), FocusState::Focused);
    }

    #[test]
    fn self_managed_backend_bypasses_everything() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(Arc::clone(&bridge));

        assert!(!arbiter.request(true));
        assert!(!arbiter.abandon(true));
        let directive = arbiter.on_focus_change(FocusChange::Lost, true, true);
        assert_eq!(directive, FocusDirective::None);
        assert_eq!(bridge.requests.load(Ordering::SeqCst), 0);
        assert_eq!(bridge.abandons.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn full_loss_pauses_and_gain_resumes() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(bridge);
        arbiter.request(false);

        let directive = arbiter.on_focus_change(FocusChange::Lost, false, true);
        assert_eq!(directive, FocusDirective::Pause);
        assert!(arbiter.paused_for_focus_loss());

        let directive = arbiter.on_focus_change(FocusChange::Gained, false, false);
        assert_eq!(directive, FocusDirective::Resume);
        assert!(!arbiter.paused_for_focus_loss());
    }

    #[test]
    fn transient_loss_pauses() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(bridge);
        arbiter.request(false);

        let directive = arbiter.on_focus_change(FocusChange::LostTransient, false, true);
        assert_eq!(directive, FocusDirective::Pause);
        assert!(arbiter.paused_for_focus_loss());
    }

    #[test]
    fn duckable_loss_reduces_volume() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(bridge);
        arbiter.request(false);

        let directive = arbiter.on_focus_change(FocusChange::LostTransientCanDuck, false, true);
        assert_eq!(directive, FocusDirective::SetVolume(0.1));

        // Gain without a focus-loss pause restores normal volume.
        let directive = arbiter.on_focus_change(FocusChange::Gained, false, true);
        assert_eq!(directive, FocusDirective::SetVolume(1.0));
    }

    #[test]
    fn duplicate_change_is_ignored() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(bridge);
        arbiter.request(false);

        assert_ne!(
            arbiter.on_focus_change(FocusChange::Lost, false, true),
            FocusDirective::None
        );
        assert_eq!(
            arbiter.on_focus_change(FocusChange::Lost, false, true),
            FocusDirective::None
        );
    }

    #[test]
    fn user_pause_does_not_auto_resume() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(bridge);
        arbiter.request(false);

        // Loss while not playing: nothing to pause, flag stays clear.
        let directive = arbiter.on_focus_change(FocusChange::Lost, false, false);
        assert_eq!(directive, FocusDirective::None);

        // Regained focus restores volume instead of resuming.
        let directive = arbiter.on_focus_change(FocusChange::Gained, false, false);
        assert_eq!(directive, FocusDirective::SetVolume(1.0));
    }

    #[test]
    fn abandon_is_idempotent() {
        let bridge = Arc::new(CountingBridge::default());
        let mut arbiter = arbiter(Arc::clone(&bridge));
        arbiter.request(false);

        assert!(arbiter.abandon(false));
        assert!(arbiter.abandon(false));
        assert_eq!(bridge.abandons.load(Ordering::SeqCst), 1);
        assert_eq!(arbiter.state(), FocusState::None);
    }
}
