//! One player's game session
//!
//! Glues the loop, the input dispatcher and the score bridge together and
//! tracks the menu state the loop does not know about (tier selection and
//! the "ready" screen). Hosts feed it input and frames and read snapshots.

use crate::bridge::{PlayerId, ScoreBridge, ScoreService, SoundPlayer};
use crate::error::ConfigError;
use crate::input::{Command, InputEvent, UiPhase, dispatch};
use crate::settings::Settings;
use crate::sim::{
    BirdState, Field, FrameScheduler, GameEvent, GameLoop, LoopPhase, ObstacleId, Tier, resolve,
};

/// One obstacle as the renderer needs it
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleView {
    pub id: ObstacleId,
    pub x: f32,
    pub top_height: f32,
    /// Top edge of the bottom pipe
    pub bottom_top: f32,
    pub bottom_height: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: UiPhase,
    pub tier: Tier,
    pub bird: BirdState,
    pub bird_left: f32,
    pub tilt: f32,
    pub pipe_width: f32,
    pub obstacles: Vec<ObstacleView>,
    pub score: u32,
    pub best: u32,
    pub countdown: u32,
}

/// Per-session inputs that do not come from `Settings`
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// None plays anonymously
    pub player: Option<PlayerId>,
    pub width: f32,
    pub height: f32,
    /// Seed for obstacle placement
    pub seed: u64,
}

/// Session state: loop, collaborators and menu selection
pub struct Session<F: FrameScheduler, S: ScoreService, A: SoundPlayer> {
    game: GameLoop<F>,
    bridge: ScoreBridge<S, A>,
    tier: Tier,
    /// Tier confirmed, waiting for the first flap
    ready: bool,
    /// Events for the host, drained with `take_events`
    events: Vec<GameEvent>,
}

/// Every tier's gap must fit, so changing tier later cannot fail
fn check_field(field: &Field) -> Result<(), ConfigError> {
    Tier::ALL
        .iter()
        .try_for_each(|t| field.check_gap(resolve(*t, field.compact).vertical_gap))
}

impl<F: FrameScheduler, S: ScoreService, A: SoundPlayer> Session<F, S, A> {
    pub fn new(
        frames: F,
        scores: S,
        sound: A,
        settings: &Settings,
        config: SessionConfig,
    ) -> Result<Self, ConfigError> {
        let SessionConfig {
            player,
            width,
            height,
            seed,
        } = config;
        let field = Field::new(width, height)?;
        check_field(&field)?;

        let tier = settings.default_tier;
        let profile = resolve(tier, field.compact);
        let game = GameLoop::new(frames, field, profile, settings.loop_config(seed));

        let mut bridge = ScoreBridge::new(scores, sound, player, settings.checkpoint);
        bridge.refresh_best();

        log::info!(
            "Session ready: {}x{} ({}), tier {tier}, checkpoint {}",
            width,
            height,
            if field.compact { "compact" } else { "desktop" },
            settings.checkpoint.as_str()
        );

        Ok(Self {
            game,
            bridge,
            tier,
            ready: false,
            events: Vec::new(),
        })
    }

    pub fn ui_phase(&self) -> UiPhase {
        match self.game.phase() {
            LoopPhase::Idle if self.ready => UiPhase::Ready,
            LoopPhase::Idle => UiPhase::DifficultySelect,
            LoopPhase::CountingDown => UiPhase::Countdown,
            LoopPhase::Running => UiPhase::Playing,
            LoopPhase::Paused => UiPhase::Paused,
            LoopPhase::GameOver => UiPhase::GameOver,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn game(&self) -> &GameLoop<F> {
        &self.game
    }

    pub fn frames_mut(&mut self) -> &mut F {
        self.game.scheduler_mut()
    }

    pub fn bridge(&self) -> &ScoreBridge<S, A> {
        &self.bridge
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    /// Personal best for the current tier, never below the live score
    pub fn displayed_best(&self) -> u32 {
        self.bridge.displayed_best(self.tier, self.game.score())
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispatch raw input. Returns true if it mapped to a command.
    pub fn handle_input(&mut self, event: &InputEvent, now: f64) -> bool {
        match dispatch(event, self.ui_phase()) {
            Some(command) => self.apply(command, now),
            None => {
                log::trace!("Ignoring {event:?} in {:?}", self.ui_phase());
                false
            }
        }
    }

    /// Run a command if it is enabled in the current phase
    pub fn apply(&mut self, command: Command, now: f64) -> bool {
        if !command.enabled_in(self.ui_phase()) {
            return false;
        }

        match command {
            Command::SelectNextDifficulty => self.set_tier(self.tier.next()),
            Command::SelectPrevDifficulty => self.set_tier(self.tier.prev()),
            Command::ConfirmStart => self.ready = true,
            Command::Jump => {
                if self.ready {
                    self.ready = false;
                    self.game.start(now);
                } else {
                    self.game.jump();
                }
            }
            Command::Pause => {
                self.game.pause(now);
            }
            Command::Resume => {
                self.game.resume(now);
            }
            Command::Restart => self.game.restart(),
            Command::ExitToMenu => {
                self.game.exit();
            }
        }
        self.pump();

        if matches!(command, Command::Restart | Command::ExitToMenu) {
            self.ready = false;
            self.bridge.refresh_best();
        }
        true
    }

    /// Deliver an animation frame
    pub fn on_frame(&mut self, now: f64) {
        self.game.on_frame(now);
        self.pump();
    }

    /// Recompute layout and profile for a new viewport
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        let field = Field::new(width, height)?;
        check_field(&field)?;
        if field.compact != self.game.field().compact {
            log::info!("Switching to {} layout", if field.compact { "compact" } else { "desktop" });
        }
        self.game.set_field(field);
        self.game.set_profile(resolve(self.tier, field.compact));
        Ok(())
    }

    /// Page is going away: suspend the attempt so a restored page shows
    /// the pause menu instead of a frozen game
    pub fn shutdown(&mut self, now: f64) {
        self.game.suspend(now);
        self.pump();
    }

    pub fn snapshot(&self) -> Snapshot {
        let field = self.game.field();
        Snapshot {
            phase: self.ui_phase(),
            tier: self.tier,
            bird: *self.game.bird(),
            bird_left: field.bird_left,
            tilt: self.game.bird().tilt_degrees(),
            pipe_width: field.pipe_width,
            obstacles: self
                .game
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    top_height: o.top_height,
                    bottom_top: o.bottom_top(),
                    bottom_height: o.bottom_height(field.height),
                })
                .collect(),
            score: self.game.score(),
            best: self.displayed_best(),
            countdown: self.game.countdown(),
        }
    }

    fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
        self.game
            .set_profile(resolve(tier, self.game.field().compact));
        log::debug!("Tier set to {tier}");
    }

    fn pump(&mut self) {
        for event in self.game.take_events() {
            self.bridge.handle(&event, self.tier);
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Sound;
    use crate::bridge::tests::{RecordingService, RecordingSound};
    use crate::consts::FRAME_MS;
    use crate::highscores::BestScores;
    use crate::settings::CheckpointPolicy;
    use crate::sim::ManualFrames;

    type TestSession = Session<ManualFrames, RecordingService, RecordingSound>;

    fn session_with(settings: Settings, best: BestScores) -> TestSession {
        let service = RecordingService {
            best,
            ..Default::default()
        };
        Session::new(
            ManualFrames::new(),
            service,
            RecordingSound::default(),
            &settings,
            SessionConfig {
                player: Some(PlayerId("p1".into())),
                width: 1024.0,
                height: 600.0,
                seed: 7,
            },
        )
        .unwrap()
    }

    fn session() -> TestSession {
        session_with(Settings::default(), BestScores::default())
    }

    fn key(s: &mut TestSession, k: &str, now: f64) -> bool {
        s.handle_input(&InputEvent::Key(k.to_string()), now)
    }

    fn fire(s: &mut TestSession, now: f64) -> bool {
        if s.frames_mut().take_due().is_some() {
            s.on_frame(now);
            true
        } else {
            false
        }
    }

    #[test]
    fn test_rejects_bad_config() {
        let settings = Settings::default();
        let err = Session::new(
            ManualFrames::new(),
            RecordingService::default(),
            RecordingSound::default(),
            &settings,
            SessionConfig {
                player: None,
                width: 0.0,
                height: 600.0,
                seed: 1,
            },
        )
        .err();
        assert!(matches!(err, Some(ConfigError::InvalidDimensions { .. })));

        let err = Session::new(
            ManualFrames::new(),
            RecordingService::default(),
            RecordingSound::default(),
            &settings,
            SessionConfig {
                player: None,
                width: 1024.0,
                height: 120.0,
                seed: 1,
            },
        )
        .err();
        assert!(matches!(err, Some(ConfigError::GapTooLarge { .. })));
    }

    #[test]
    fn test_menu_flow() {
        let mut s = session();
        assert_eq!(s.ui_phase(), UiPhase::DifficultySelect);
        assert_eq!(s.tier(), Tier::Medium);

        assert!(key(&mut s, "ArrowDown", 0.0));
        assert_eq!(s.tier(), Tier::Hard);
        assert_eq!(s.game().profile().vertical_gap, 120.0);
        assert!(key(&mut s, "ArrowDown", 0.0));
        assert_eq!(s.tier(), Tier::Easy);
        assert!(key(&mut s, "ArrowUp", 0.0));
        assert_eq!(s.tier(), Tier::Hard);

        // Jump is not enabled before confirming
        assert!(!s.handle_input(&InputEvent::PointerDown, 0.0));
        assert!(key(&mut s, "Enter", 0.0));
        assert_eq!(s.ui_phase(), UiPhase::Ready);
        // Tier is locked once confirmed
        assert!(!key(&mut s, "ArrowDown", 0.0));

        assert!(s.handle_input(&InputEvent::PointerDown, 100.0));
        assert_eq!(s.ui_phase(), UiPhase::Playing);
        assert_eq!(s.game().bird().velocity, -10.0);
        assert_eq!(s.take_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_pause_checkpoint_and_resume() {
        let mut s = session();
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        // Score two points without touching the loop's internals
        for id in 100..102 {
            s.game.credit(ObstacleId(id));
        }

        assert!(key(&mut s, "Escape", 200.0));
        assert_eq!(s.ui_phase(), UiPhase::Paused);
        assert!(!s.game().has_pending_frame());
        assert_eq!(s.bridge().scores().submitted, vec![(2, Tier::Medium)]);

        // Focus loss while paused does nothing
        assert!(!s.handle_input(&InputEvent::FocusLost, 300.0));

        assert!(key(&mut s, "Enter", 1000.0));
        assert_eq!(s.ui_phase(), UiPhase::Countdown);
        assert_eq!(s.snapshot().countdown, 3);
        assert!(!key(&mut s, " ", 1100.0));

        fire(&mut s, 4000.0);
        assert_eq!(s.ui_phase(), UiPhase::Playing);
        assert!(s.take_events().contains(&GameEvent::Resumed));

        // Pausing again at the same score is not resubmitted
        assert!(s.handle_input(&InputEvent::FocusLost, 4100.0));
        assert_eq!(s.bridge().scores().submitted.len(), 1);
    }

    #[test]
    fn test_game_over_and_restart() {
        let mut s = session_with(
            Settings::default(),
            BestScores {
                easy: 0,
                medium: 4,
                hard: 0,
            },
        );
        assert_eq!(s.displayed_best(), 4);
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        s.game.credit(ObstacleId(500));

        // Let the bird fall out of the field
        let mut now = 0.0;
        while s.ui_phase() == UiPhase::Playing {
            now += FRAME_MS;
            assert!(fire(&mut s, now));
        }
        assert_eq!(s.ui_phase(), UiPhase::GameOver);
        assert!(!s.frames_mut().has_pending());
        assert_eq!(s.bridge().sound().played.last(), Some(&Sound::Hit));
        assert_eq!(s.bridge().scores().submitted, vec![(1, Tier::Medium)]);
        assert_eq!(s.displayed_best(), 4);

        let fetches = s.bridge().scores().fetches;
        assert!(key(&mut s, "Enter", now));
        assert_eq!(s.ui_phase(), UiPhase::DifficultySelect);
        assert_eq!(s.score(), 0);
        assert!(s.game().obstacles().is_empty());
        assert_eq!(s.bridge().scores().fetches, fetches + 1);
        // Still exactly one submission for that attempt
        assert_eq!(s.bridge().scores().submitted.len(), 1);
    }

    #[test]
    fn test_exit_from_pause_submits_and_returns_to_menu() {
        let mut s = session();
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        s.game.credit(ObstacleId(1));
        key(&mut s, "Escape", 50.0);
        s.game.credit(ObstacleId(2));
        assert!(key(&mut s, "Escape", 60.0));

        assert_eq!(s.ui_phase(), UiPhase::DifficultySelect);
        assert_eq!(
            s.bridge().scores().submitted,
            vec![(1, Tier::Medium), (2, Tier::Medium)]
        );
        assert_eq!(s.bridge().best().medium, 2);
    }

    #[test]
    fn test_checkpoint_policy_flag() {
        let settings = Settings {
            checkpoint: CheckpointPolicy::UpdatesBest,
            ..Default::default()
        };
        let mut s = session_with(settings, BestScores::default());
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        for id in 0..3 {
            s.game.credit(ObstacleId(id));
        }
        key(&mut s, "Escape", 10.0);
        assert_eq!(s.bridge().best().medium, 3);
    }

    #[test]
    fn test_resize_switches_profile() {
        let mut s = session();
        assert!(!s.game().field().compact);
        s.resize(400.0, 700.0).unwrap();
        assert!(s.game().field().compact);
        assert!((s.game().profile().gravity - 0.56).abs() < 1e-6);
        assert_eq!(s.game().bird().y, 350.0);
        assert!(s.resize(-1.0, 700.0).is_err());
        // Failed resize leaves the field untouched
        assert_eq!(s.game().field().width, 400.0);
    }

    #[test]
    fn test_snapshot_derives_bottom_pipe() {
        let mut s = session();
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        let mut now = 0.0;
        while s.game().obstacles().is_empty() {
            now += FRAME_MS;
            if s.game().bird().y > 300.0 && s.game().bird().velocity > 0.0 {
                s.apply(Command::Jump, now);
            }
            fire(&mut s, now);
        }
        let snap = s.snapshot();
        let pipe = &snap.obstacles[0];
        assert_eq!(pipe.bottom_top, pipe.top_height + 130.0);
        assert_eq!(pipe.bottom_height, 600.0 - pipe.bottom_top);
        assert_eq!(snap.phase, UiPhase::Playing);
        assert_eq!(snap.pipe_width, 52.0);
    }

    #[test]
    fn test_shutdown_cancels_frame() {
        let mut s = session();
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        assert!(s.frames_mut().has_pending());
        s.shutdown(100.0);
        s.shutdown(200.0);
        assert!(!s.frames_mut().has_pending());
        assert_eq!(s.game().scheduler().cancelled, 1);
    }

    #[test]
    fn test_shutdown_leaves_pause_menu() {
        let mut s = session();
        key(&mut s, "Enter", 0.0);
        key(&mut s, " ", 0.0);
        s.game.credit(ObstacleId(1));
        s.shutdown(100.0);

        assert!(s.ui_phase() != UiPhase::Playing || s.game().has_pending_frame());
        assert_eq!(s.ui_phase(), UiPhase::Paused);
        // Pausing checkpoints the score like a normal pause
        assert_eq!(s.bridge().scores().submitted, vec![(1, Tier::Medium)]);
        // Restored page: a flap is no longer swallowed silently
        assert!(!s.handle_input(&InputEvent::PointerDown, 150.0));
        assert!(key(&mut s, "Enter", 200.0));
        assert_eq!(s.ui_phase(), UiPhase::Countdown);
        assert!(s.game().has_pending_frame());

        // Mid-countdown shutdown falls back to the pause again
        s.shutdown(300.0);
        assert_eq!(s.ui_phase(), UiPhase::Paused);
        assert!(!s.game().has_pending_frame());
    }
}
