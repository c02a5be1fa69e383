//! Frame-driven simulation loop
//!
//! The host delivers animation frames with a millisecond timestamp. Each
//! frame in `Running` integrates the bird, scrolls and spawns obstacles,
//! credits passed obstacles and checks collisions, in that order. Motion is
//! scaled by the elapsed time relative to a 60 Hz baseline; spawn cadence and
//! countdowns are computed from timestamps directly.
//!
//! At most one frame is ever pending. Every path that stops the loop cancels
//! it, and a frame delivered while none is pending is dropped.

use super::collision::{bird_rect, first_hit, out_of_bounds};
use super::difficulty::DifficultyProfile;
use super::spawner::{Spawner, advance};
use super::state::{
    BirdState, Collision, Field, GameEvent, LoopPhase, Obstacle, ScoreCounter,
};
use crate::consts::*;

/// Token for a requested animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Host facility that calls back once per display frame
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler driven by hand: headless hosts and tests fire frames explicitly
#[derive(Debug, Default)]
pub struct ManualFrames {
    next: i32,
    live: Vec<FrameHandle>,
    pub requested: u32,
    pub cancelled: u32,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a requested frame is waiting to fire
    pub fn has_pending(&self) -> bool {
        !self.live.is_empty()
    }

    /// Pop the oldest requested frame, as if the display fired it
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        if self.live.is_empty() {
            None
        } else {
            Some(self.live.remove(0))
        }
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.live.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled += 1;
        self.live.retain(|h| *h != handle);
    }
}

/// Loop timing options
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Seed for obstacle placement
    pub seed: u64,
    /// Countdown before the first flap takes effect (0 = start at once)
    pub start_countdown_secs: u32,
    /// Countdown between resume and play
    pub resume_countdown_secs: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_countdown_secs: 0,
            resume_countdown_secs: RESUME_COUNTDOWN_SECS,
        }
    }
}

/// Elapsed time in baseline frames, clamped to `[0, MAX_DELTA]`
pub fn frame_delta(last_frame: f64, now: f64) -> f32 {
    ((now - last_frame) / FRAME_MS).clamp(0.0, f64::from(MAX_DELTA)) as f32
}

/// The simulation clock. Owns the bird, the obstacles and the score.
#[derive(Debug)]
pub struct GameLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
    config: LoopConfig,
    phase: LoopPhase,
    field: Field,
    profile: DifficultyProfile,
    bird: BirdState,
    obstacles: Vec<Obstacle>,
    score: ScoreCounter,
    spawner: Spawner,
    last_frame: f64,
    countdown_end: f64,
    countdown_shown: u32,
    /// Start of the current pause; None while counting down to the first flap
    suspended_at: Option<f64>,
    events: Vec<GameEvent>,
}

impl<S: FrameScheduler> GameLoop<S> {
    pub fn new(scheduler: S, field: Field, profile: DifficultyProfile, config: LoopConfig) -> Self {
        Self {
            scheduler,
            pending: None,
            config,
            phase: LoopPhase::Idle,
            field,
            profile,
            bird: BirdState::new(&field),
            obstacles: Vec::new(),
            score: ScoreCounter::default(),
            spawner: Spawner::new(config.seed),
            last_frame: 0.0,
            countdown_end: 0.0,
            countdown_shown: 0,
            suspended_at: None,
            events: Vec::new(),
        }
    }

    // === Render side-channel ===

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn bird(&self) -> &BirdState {
        &self.bird
    }

    /// Live obstacles, oldest first
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    /// Whole seconds left on the countdown (0 outside a countdown)
    pub fn countdown(&self) -> u32 {
        if self.phase == LoopPhase::CountingDown {
            self.countdown_shown
        } else {
            0
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Configuration ===

    /// Swap in a newly resolved profile (tier or device class changed)
    pub fn set_profile(&mut self, profile: DifficultyProfile) {
        self.profile = profile;
    }

    /// Swap in a new field after a viewport resize
    pub fn set_field(&mut self, field: Field) {
        self.field = field;
        if self.phase == LoopPhase::Idle {
            self.bird = BirdState::new(&field);
        }
    }

    // === Commands ===

    /// First flap of an attempt. Only valid while idle.
    pub fn start(&mut self, now: f64) -> bool {
        if self.phase != LoopPhase::Idle {
            return false;
        }
        self.events.push(GameEvent::Started);
        log::debug!("Attempt started");

        if self.config.start_countdown_secs > 0 {
            self.suspended_at = None;
            self.begin_countdown(now, self.config.start_countdown_secs);
        } else {
            self.bird.flap(self.profile.jump_impulse);
            self.spawner.start_clock(now);
            self.last_frame = now;
            self.phase = LoopPhase::Running;
        }
        self.schedule();
        true
    }

    /// Flap. Ignored outside `Running`.
    pub fn jump(&mut self) -> bool {
        if self.phase != LoopPhase::Running {
            return false;
        }
        self.bird.flap(self.profile.jump_impulse);
        true
    }

    /// Suspend play. Ignored outside `Running`, so pausing twice is harmless.
    pub fn pause(&mut self, now: f64) -> bool {
        if self.phase != LoopPhase::Running {
            return false;
        }
        self.stop();
        self.phase = LoopPhase::Paused;
        self.suspended_at = Some(now);
        self.events.push(GameEvent::Paused {
            score: self.score.value(),
        });
        log::info!("Paused at score {}", self.score.value());
        true
    }

    /// Leave the pause through a countdown
    pub fn resume(&mut self, now: f64) -> bool {
        if self.phase != LoopPhase::Paused {
            return false;
        }
        let secs = self.config.resume_countdown_secs;
        if secs == 0 {
            self.finish_countdown(now);
        } else {
            self.begin_countdown(now, secs);
        }
        self.schedule();
        true
    }

    /// Abandon the attempt from the pause or game-over screen
    pub fn exit(&mut self) -> bool {
        if !matches!(self.phase, LoopPhase::Paused | LoopPhase::GameOver) {
            return false;
        }
        self.events.push(GameEvent::Exited {
            score: self.score.value(),
        });
        self.restart();
        true
    }

    /// Reset everything for a new attempt and return to `Idle`
    pub fn restart(&mut self) {
        self.stop();
        self.phase = LoopPhase::Idle;
        self.bird = BirdState::new(&self.field);
        self.obstacles.clear();
        self.score.reset();
        self.spawner.start_clock(0.0);
        self.suspended_at = None;
        self.countdown_shown = 0;
        self.events.push(GameEvent::Restarted);
        log::debug!("Loop reset");
    }

    /// Cancel the pending frame, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Stop requesting frames without leaving a phase that expects them.
    /// Play is paused, a resume countdown falls back to the pause and a
    /// start countdown falls back to `Idle`.
    pub fn suspend(&mut self, now: f64) {
        match self.phase {
            LoopPhase::Running => {
                self.pause(now);
            }
            LoopPhase::CountingDown => {
                self.stop();
                self.countdown_shown = 0;
                if self.suspended_at.is_some() {
                    // Keep the original pause start for the spawn-clock rebase
                    self.phase = LoopPhase::Paused;
                    self.events.push(GameEvent::Paused {
                        score: self.score.value(),
                    });
                } else {
                    self.phase = LoopPhase::Idle;
                    self.bird = BirdState::new(&self.field);
                }
            }
            _ => self.stop(),
        }
        debug_assert!(!self.phase.wants_frames() || self.pending.is_some());
    }

    // === Frames ===

    /// Handle a frame delivered by the host at `now` (ms)
    pub fn on_frame(&mut self, now: f64) {
        if self.pending.take().is_none() {
            log::trace!("Dropping frame at {now:.1}: none pending");
            return;
        }

        match self.phase {
            LoopPhase::CountingDown => self.tick_countdown(now),
            LoopPhase::Running => self.tick_running(now),
            _ => {}
        }

        if self.phase.wants_frames() {
            self.schedule();
        }
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn begin_countdown(&mut self, now: f64, secs: u32) {
        self.phase = LoopPhase::CountingDown;
        self.countdown_end = now + f64::from(secs) * 1000.0;
        self.countdown_shown = secs;
        self.events.push(GameEvent::Countdown(secs));
    }

    fn tick_countdown(&mut self, now: f64) {
        self.last_frame = now;
        let remaining = (self.countdown_end - now).max(0.0);
        let secs = (remaining / 1000.0).ceil() as u32;
        if secs != self.countdown_shown {
            self.countdown_shown = secs;
            self.events.push(GameEvent::Countdown(secs));
        }
        if remaining <= 0.0 {
            self.finish_countdown(now);
        }
    }

    fn finish_countdown(&mut self, now: f64) {
        match self.suspended_at.take() {
            Some(paused_at) => {
                // Pause plus countdown do not count toward the spawn interval
                self.spawner.rebase(now - paused_at);
                self.events.push(GameEvent::Resumed);
                log::info!("Resumed after {:.0} ms", now - paused_at);
            }
            None => {
                self.spawner.start_clock(now);
                self.bird.flap(self.profile.jump_impulse);
            }
        }
        self.countdown_shown = 0;
        self.last_frame = now;
        self.phase = LoopPhase::Running;
    }

    fn tick_running(&mut self, now: f64) {
        let dt = frame_delta(self.last_frame, now);
        self.last_frame = now;

        self.bird.integrate(self.profile.gravity, dt);
        if let Some(cause) = out_of_bounds(self.bird.y, &self.field) {
            self.bird.y = self.bird.y.clamp(0.0, self.field.bird_floor());
            self.end(cause);
            return;
        }

        let mut changed = advance(
            &mut self.obstacles,
            &self.profile,
            self.field.pipe_width,
            dt,
        );
        if let Some(obstacle) = self.spawner.maybe_spawn(now, &self.profile, &self.field) {
            self.obstacles.push(obstacle);
            changed = true;
        }
        if changed {
            self.events.push(GameEvent::ObstaclesChanged);
        }

        let mut gained = 0;
        for obstacle in self.obstacles.iter_mut() {
            if obstacle.scored || obstacle.trailing_edge(self.field.pipe_width) >= self.field.bird_left
            {
                continue;
            }
            obstacle.scored = true;
            if self.score.credit(obstacle.id) {
                gained += 1;
            }
        }
        // One event (and one point cue) per frame
        if gained > 0 {
            self.events.push(GameEvent::Scored {
                score: self.score.value(),
                gained,
            });
        }

        let bird = bird_rect(&self.field, self.bird.y);
        if let Some(id) = first_hit(&bird, &self.obstacles, &self.field) {
            self.end(Collision::Pipe(id));
        }
    }

    fn end(&mut self, cause: Collision) {
        self.stop();
        self.phase = LoopPhase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.score.value(),
            cause,
        });
        log::info!("Game over ({cause:?}) with score {}", self.score.value());
    }
}

#[cfg(test)]
impl<S: FrameScheduler> GameLoop<S> {
    /// Credit a point directly, for tests of the layers above the loop
    pub(crate) fn credit(&mut self, id: super::state::ObstacleId) {
        self.score.credit(id);
    }
}
