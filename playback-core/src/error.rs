//! # Engine Error Types
//!
//! Error types for engine construction and control. Playback failures never
//! surface here: a backend error transitions the session to the error state
//! and is observed through state listeners, not through `Result`s.

use thiserror::Error;

/// Errors that can occur constructing or controlling the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Logging infrastructure could not be initialized (usually a second
    /// initialization attempt).
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    // ========================================================================
    // Control Errors
    // ========================================================================
    /// The engine task has shut down and no longer accepts commands.
    #[error("Engine stopped")]
    EngineStopped,
}

impl EngineError {
    /// Returns `true` for errors caused by an invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::LoggingInit(_))
    }

    /// Returns `true` when the engine is gone and retrying is pointless.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::EngineStopped)
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
