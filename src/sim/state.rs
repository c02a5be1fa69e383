//! Game state and core simulation types
//!
//! Everything the loop owns between frames lives here. The renderer reads
//! it; only the loop writes it.

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::*;
use crate::error::ConfigError;

/// Current phase of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    /// Waiting for the first flap
    #[default]
    Idle,
    /// Counting whole seconds down before play (re)starts
    CountingDown,
    /// Active gameplay
    Running,
    /// Suspended by the player
    Paused,
    /// Attempt ended
    GameOver,
}

impl LoopPhase {
    /// Whether the loop keeps requesting frames in this phase
    pub fn wants_frames(&self) -> bool {
        matches!(self, LoopPhase::CountingDown | LoopPhase::Running)
    }
}

/// Playfield dimensions and the layout derived from them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    /// Compact (narrow) viewport: smaller layout and slower motion
    pub compact: bool,
    /// Fixed horizontal position of the bird's left edge
    pub bird_left: f32,
    pub bird_size: Vec2,
    pub pipe_width: f32,
}

impl Field {
    /// Build the layout for a viewport, rejecting degenerate dimensions
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        let compact = width < COMPACT_BREAKPOINT;
        Ok(Self {
            width,
            height,
            compact,
            bird_left: if compact { BIRD_LEFT_COMPACT } else { BIRD_LEFT },
            bird_size: Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
            pipe_width: if compact { PIPE_WIDTH_COMPACT } else { PIPE_WIDTH },
        })
    }

    /// Reject a pipe gap that leaves no room for pipes at all
    pub fn check_gap(&self, gap: f32) -> Result<(), ConfigError> {
        if gap >= self.height {
            return Err(ConfigError::GapTooLarge {
                gap,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Lowest valid top edge for the bird
    pub fn bird_floor(&self) -> f32 {
        self.height - self.bird_size.y
    }

    /// Starting height: vertically centered
    pub fn bird_start(&self) -> f32 {
        self.height / 2.0
    }
}

/// The player's bird. Horizontal position is fixed by the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdState {
    /// Top edge, growing downward
    pub y: f32,
    /// Per-frame vertical velocity (negative is up)
    pub velocity: f32,
}

impl BirdState {
    pub fn new(field: &Field) -> Self {
        Self {
            y: field.bird_start(),
            velocity: 0.0,
        }
    }

    /// Integrate one step: velocity first, then position
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.velocity += gravity * dt;
        self.y += self.velocity * dt;
        debug_assert!(self.y.is_finite(), "bird position diverged");
    }

    /// Flap: velocity is replaced, not added to
    pub fn flap(&mut self, impulse: f32) {
        self.velocity = impulse;
    }

    /// Visual tilt in degrees for the renderer
    pub fn tilt_degrees(&self) -> f32 {
        (self.velocity * TILT_PER_VELOCITY).clamp(TILT_MIN, TILT_MAX)
    }
}

/// Unique obstacle token, increasing in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(pub u64);

/// One pipe pair
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// Left edge
    pub x: f32,
    /// Height of the top pipe
    pub top_height: f32,
    /// Opening between the pipes
    pub gap: f32,
    /// Score already credited for passing this obstacle
    pub scored: bool,
}

impl Obstacle {
    /// Top edge of the bottom pipe
    pub fn bottom_top(&self) -> f32 {
        self.top_height + self.gap
    }

    /// Height of the bottom pipe, derived from the field
    pub fn bottom_height(&self, field_height: f32) -> f32 {
        field_height - self.bottom_top()
    }

    /// Trailing (right) edge
    pub fn trailing_edge(&self, pipe_width: f32) -> f32 {
        self.x + pipe_width
    }
}

/// Score for the current attempt plus the obstacles already credited
#[derive(Debug, Clone, Default)]
pub struct ScoreCounter {
    value: u32,
    credited: HashSet<ObstacleId>,
}

impl ScoreCounter {
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Credit one point for an obstacle. Returns false if it already scored.
    pub fn credit(&mut self, id: ObstacleId) -> bool {
        if !self.credited.insert(id) {
            return false;
        }
        self.value += 1;
        true
    }

    pub fn is_credited(&self, id: ObstacleId) -> bool {
        self.credited.contains(&id)
    }

    /// Back to zero for a new attempt
    pub fn reset(&mut self) {
        self.value = 0;
        self.credited.clear();
    }
}

/// What ended an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Flew above the top edge
    Ceiling,
    /// Fell below the bottom edge
    Floor,
    /// Hit a pipe
    Pipe(ObstacleId),
}

/// Events raised by the loop, drained by the session each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// First flap of an attempt
    Started,
    /// Score went up this frame; `gained` obstacles were passed at once
    Scored { score: u32, gained: u32 },
    /// Obstacle set changed (spawn or removal)
    ObstaclesChanged,
    /// Loop paused mid-attempt
    Paused { score: u32 },
    /// Whole seconds left on the countdown (0 when it finishes)
    Countdown(u32),
    /// Countdown finished, play continues
    Resumed,
    /// Attempt ended
    GameOver { score: u32, cause: Collision },
    /// Attempt abandoned from the pause or game-over screen
    Exited { score: u32 },
    /// State reset for a new attempt
    Restarted,
}
