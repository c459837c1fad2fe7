//! Media progress sampling type.

use serde::{Deserialize, Serialize};

/// Maximum value for [`MediaProgress::buffer_percent`].
pub const MAX_BUFFER_PERCENT: u8 = 100;

/// Position, buffered amount, and duration of the media currently in
/// playback.
///
/// The poller mutates one instance in place at the poll cadence; observers
/// receive clones. All fields are independently clamped on write: negative
/// positions and durations become `0`, buffer percent is clamped to
/// `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProgress {
    position_ms: u64,
    duration_ms: u64,
    buffer_percent: u8,
}

impl MediaProgress {
    pub fn new(position_ms: i64, buffer_percent: i32, duration_ms: i64) -> Self {
        let mut progress = Self::default();
        progress.update(position_ms, buffer_percent, duration_ms);
        progress
    }

    /// Replace all three fields, clamping each independently.
    pub fn update(&mut self, position_ms: i64, buffer_percent: i32, duration_ms: i64) {
        self.position_ms = position_ms.max(0) as u64;
        self.duration_ms = duration_ms.max(0) as u64;
        self.buffer_percent = buffer_percent.clamp(0, MAX_BUFFER_PERCENT as i32) as u8;
    }

    /// Playback position in milliseconds.
    pub fn position(&self) -> u64 {
        self.position_ms
    }

    /// Media duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.duration_ms
    }

    /// Percent buffered, `0..=100`.
    pub fn buffer_percent(&self) -> u8 {
        self.buffer_percent
    }

    /// Buffered amount as a fraction in `[0.0, 1.0]`.
    pub fn buffer_fraction(&self) -> f32 {
        f32::from(self.buffer_percent) / f32::from(MAX_BUFFER_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_round_trips_clamped_values() {
        let mut progress = MediaProgress::default();

        progress.update(-50, 150, -1);
        assert_eq!(progress.position(), 0);
        assert_eq!(progress.buffer_percent(), 100);
        assert_eq!(progress.duration(), 0);

        progress.update(1_500, -5, 180_000);
        assert_eq!(progress.position(), 1_500);
        assert_eq!(progress.buffer_percent(), 0);
        assert_eq!(progress.duration(), 180_000);
    }

    #[test]
    fn buffer_fraction_derivation() {
        let progress = MediaProgress::new(0, 50, 0);
        assert!((progress.buffer_fraction() - 0.5).abs() < f32::EPSILON);

        let full = MediaProgress::new(0, 100, 0);
        assert!((full.buffer_fraction() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn serialization_round_trip() {
        let progress = MediaProgress::new(42_000, 80, 180_000);
        let json = serde_json::to_string(&progress).unwrap();
        let back: MediaProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
