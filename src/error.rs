//! Error types
//!
//! Configuration problems fail fast at construction. Collaborator failures
//! are reported to the bridge, which logs and swallows them.

use thiserror::Error;

/// Invalid game configuration, detected before the loop starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown difficulty tier `{0}` (expected easy, medium or hard)")]
    UnknownTier(String),

    #[error("game dimensions must be positive and finite, got {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    #[error("pipe gap {gap} does not fit a field {height} units tall")]
    GapTooLarge { gap: f32, height: f32 },
}

/// Failure reported by an external collaborator (score service, storage)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("score service unavailable: {0}")]
    Unavailable(String),

    #[error("score service rejected the request (status {status})")]
    Rejected { status: u16 },

    #[error("storage error: {0}")]
    Storage(String),
}
