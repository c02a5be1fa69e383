//! Real-time simulation module
//!
//! All gameplay logic lives here. The loop is the only writer of bird,
//! obstacle and score state; everything else reads snapshots or issues
//! commands.
//! - Motion scaled by wall-clock delta against a 60 Hz baseline
//! - Spawn cadence and countdowns from timestamps, never frame counts
//! - Seeded RNG for obstacle placement
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Rect, bird_rect, check_bird, collides, out_of_bounds, pipe_rects};
pub use difficulty::{DifficultyProfile, Tier, resolve};
pub use spawner::{Spawner, advance, random_top_height};
pub use state::{
    BirdState, Collision, Field, GameEvent, LoopPhase, Obstacle, ObstacleId, ScoreCounter,
};
pub use tick::{FrameHandle, FrameScheduler, GameLoop, LoopConfig, ManualFrames, frame_delta};
