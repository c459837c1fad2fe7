//! # Engine Configuration
//!
//! Configuration for the playlist engine: poll cadence, focus ducking level,
//! and channel capacities.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playlist engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between progress samples.
    ///
    /// Default: 33 ms (roughly one sample per frame at 30 fps UIs).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Output volume applied while the exclusive playback resource is lost
    /// but ducking is permitted. Must be in `[0.0, 1.0]`.
    ///
    /// Default: 0.1.
    #[serde(default = "default_duck_volume")]
    pub duck_volume: f32,

    /// Capacity of the broadcast channel carrying engine events.
    ///
    /// Default: 64.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Capacity of the engine's command mailbox.
    ///
    /// Default: 64.
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,

    /// Identifier passed to the host when raising the foreground
    /// notification.
    ///
    /// Default: 1.
    #[serde(default = "default_foreground_id")]
    pub foreground_id: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            duck_volume: default_duck_volume(),
            event_capacity: default_event_capacity(),
            command_capacity: default_command_capacity(),
            foreground_id: default_foreground_id(),
        }
    }
}

impl EngineConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_duck_volume(mut self, volume: f32) -> Self {
        self.duck_volume = volume;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    pub fn with_foreground_id(mut self, id: u32) -> Self {
        self.foreground_id = id;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("poll_interval must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.duck_volume) {
            return Err("duck_volume must be between 0.0 and 1.0".to_string());
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be > 0".to_string());
        }

        if self.command_capacity == 0 {
            return Err("command_capacity must be > 0".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_poll_interval() -> Duration {
    Duration::from_millis(33)
}

fn default_duck_volume() -> f32 {
    0.1
}

fn default_event_capacity() -> usize {
    64
}

fn default_command_capacity() -> usize {
    64
}

fn default_foreground_id() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_millis(33));
        assert_eq!(config.duck_volume, 0.1);
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::default()
            .with_poll_interval(Duration::from_millis(100))
            .with_duck_volume(0.5)
            .with_event_capacity(8)
            .with_command_capacity(16)
            .with_foreground_id(42);

        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.duck_volume, 0.5);
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.command_capacity, 16);
        assert_eq!(config.foreground_id, 42);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut config = EngineConfig::default();

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = default_poll_interval();

        config.duck_volume = 1.5;
        assert!(config.validate().is_err());
        config.duck_volume = -0.1;
        assert!(config.validate().is_err());
        config.duck_volume = default_duck_volume();

        config.event_capacity = 0;
        assert!(config.validate().is_err());
    }
}
