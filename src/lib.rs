//! Flappy Web - a side-scrolling reflex game for the browser
//!
//! Core modules:
//! - `sim`: Real-time simulation (physics, obstacles, collision, loop phases)
//! - `input`: Raw input events mapped to phase-gated commands
//! - `bridge`: Loop events forwarded to the score and sound collaborators
//! - `session`: One player's session tying the above together
//! - `highscores`: Per-difficulty best scores
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod bridge;
pub mod error;
pub mod highscores;
pub mod input;
pub mod session;
pub mod settings;
pub mod sim;

pub use bridge::{PlayerId, ScoreBridge, ScoreService, Sound, SoundPlayer};
pub use error::{ConfigError, ServiceError};
pub use highscores::{BestScores, LocalScoreStore};
pub use input::{Command, InputEvent, UiPhase};
pub use session::{Session, SessionConfig};
pub use settings::{CheckpointPolicy, Settings};

/// Game configuration constants
pub mod consts {
    /// Duration of one baseline update (60 updates per second), in ms
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest delta (in baseline frames) a single tick may integrate
    pub const MAX_DELTA: f32 = 3.0;

    /// Bird hitbox
    pub const BIRD_WIDTH: f32 = 38.0;
    pub const BIRD_HEIGHT: f32 = 28.0;
    /// Bird tilt range (degrees); tilt = velocity * TILT_PER_VELOCITY
    pub const TILT_MIN: f32 = -30.0;
    pub const TILT_MAX: f32 = 90.0;
    pub const TILT_PER_VELOCITY: f32 = 6.0;

    /// Viewports narrower than this use the compact layout and profile
    pub const COMPACT_BREAKPOINT: f32 = 768.0;
    /// Motion scale applied to gravity, jump and speed on compact devices
    pub const COMPACT_SCALE: f32 = 0.8;

    pub const BIRD_LEFT: f32 = 60.0;
    pub const BIRD_LEFT_COMPACT: f32 = 10.0;
    pub const PIPE_WIDTH: f32 = 52.0;
    pub const PIPE_WIDTH_COMPACT: f32 = 32.0;

    /// Smallest height either pipe segment may have
    pub const MIN_TOP_HEIGHT: f32 = 50.0;

    /// Seconds counted down after resuming from pause
    pub const RESUME_COUNTDOWN_SECS: u32 = 3;
}
