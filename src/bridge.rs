//! Score and sound bridge
//!
//! Turns loop events into calls on the external collaborators: the score
//! service (submit, fetch personal bests) and the sound player. Collaborator
//! failures are logged and swallowed; they never reach the loop.

use crate::error::ServiceError;
use crate::highscores::BestScores;
use crate::settings::CheckpointPolicy;
use crate::sim::{GameEvent, Tier};

/// Opaque identifier of the signed-in player
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(pub String);

/// Sound cues raised by gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Passed an obstacle
    Point,
    /// Collided
    Hit,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Point => "point",
            Sound::Hit => "hit",
        }
    }
}

/// Leaderboard backend
pub trait ScoreService {
    /// Offer a score; the service keeps the maximum per tier
    fn submit_score(&mut self, player: &PlayerId, score: u32, tier: Tier)
    -> Result<(), ServiceError>;

    /// Personal bests for all three tiers
    fn fetch_best_scores(&mut self, player: &PlayerId) -> Result<BestScores, ServiceError>;
}

/// Fire-and-forget sound output
pub trait SoundPlayer {
    fn play(&mut self, sound: Sound);
}

/// Sound player that plays nothing (headless hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&mut self, _sound: Sound) {}
}

/// Forwards loop events to the collaborators, once per obstacle and attempt
#[derive(Debug)]
pub struct ScoreBridge<S: ScoreService, A: SoundPlayer> {
    scores: S,
    sound: A,
    /// Anonymous play submits nothing
    player: Option<PlayerId>,
    policy: CheckpointPolicy,
    best: BestScores,
    /// Highest score successfully submitted during this attempt
    last_submitted: Option<u32>,
    /// Attempt-ending submission already made
    attempt_closed: bool,
}

impl<S: ScoreService, A: SoundPlayer> ScoreBridge<S, A> {
    pub fn new(scores: S, sound: A, player: Option<PlayerId>, policy: CheckpointPolicy) -> Self {
        Self {
            scores,
            sound,
            player,
            policy,
            best: BestScores::default(),
            last_submitted: None,
            attempt_closed: false,
        }
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    pub fn sound(&self) -> &A {
        &self.sound
    }

    pub fn player(&self) -> Option<&PlayerId> {
        self.player.as_ref()
    }

    /// Personal bests as last fetched (plus local improvements)
    pub fn best(&self) -> &BestScores {
        &self.best
    }

    /// Best to display for a tier while `score` is on the board
    pub fn displayed_best(&self, tier: Tier, score: u32) -> u32 {
        self.best.get(tier).max(score)
    }

    /// Reload personal bests. On failure the previous values stay.
    pub fn refresh_best(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        match self.scores.fetch_best_scores(player) {
            Ok(best) => {
                log::debug!("Best scores: {best:?}");
                self.best = best;
            }
            Err(e) => log::warn!("Could not load best scores: {e}"),
        }
    }

    /// Route one loop event
    pub fn handle(&mut self, event: &GameEvent, tier: Tier) {
        match *event {
            GameEvent::Started | GameEvent::Restarted => self.begin_attempt(),
            GameEvent::Scored { .. } => self.sound.play(Sound::Point),
            GameEvent::Paused { score } => self.checkpoint(score, tier),
            GameEvent::GameOver { score, .. } => {
                self.sound.play(Sound::Hit);
                self.close_attempt(score, tier);
            }
            GameEvent::Exited { score } => self.close_attempt(score, tier),
            GameEvent::ObstaclesChanged | GameEvent::Countdown(_) | GameEvent::Resumed => {}
        }
    }

    fn begin_attempt(&mut self) {
        self.last_submitted = None;
        self.attempt_closed = false;
    }

    /// Save progress on pause, skipping scores already submitted
    fn checkpoint(&mut self, score: u32, tier: Tier) {
        if score == 0 || self.last_submitted.is_some_and(|s| s >= score) {
            return;
        }
        if self.submit(score, tier) && self.policy == CheckpointPolicy::UpdatesBest {
            self.best.record(tier, score);
        }
    }

    /// Final submission for the attempt; later calls are ignored
    fn close_attempt(&mut self, score: u32, tier: Tier) {
        if self.attempt_closed {
            return;
        }
        self.attempt_closed = true;
        if score == 0 {
            return;
        }
        if self.last_submitted == Some(score) || self.submit(score, tier) {
            self.best.record(tier, score);
        }
    }

    fn submit(&mut self, score: u32, tier: Tier) -> bool {
        let Some(player) = &self.player else {
            log::debug!("Anonymous play, not submitting {score}");
            return false;
        };
        match self.scores.submit_score(player, score, tier) {
            Ok(()) => {
                log::info!("Submitted {tier} score {score}");
                self.last_submitted = Some(score);
                true
            }
            Err(e) => {
                log::warn!("Score submission failed: {e}");
                false
            }
        }
    }
}
