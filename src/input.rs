//! Input dispatch
//!
//! Maps raw key/pointer/visibility events to commands. A command only maps
//! in the UI phases where it is enabled; everything else is ignored.

/// Screen the player is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiPhase {
    /// Choosing a tier
    DifficultySelect,
    /// Tier chosen, waiting for the first flap
    Ready,
    Playing,
    Paused,
    /// Counting down after resume
    Countdown,
    GameOver,
}

/// Raw input from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// `KeyboardEvent.key` value
    Key(String),
    /// Pointer/touch pressed on the playfield
    PointerDown,
    /// Page hidden or window lost focus
    FocusLost,
}

/// Player intent, executed by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Pause,
    Resume,
    Restart,
    ExitToMenu,
    SelectNextDifficulty,
    SelectPrevDifficulty,
    ConfirmStart,
}

impl Command {
    /// Whether the command may run in a phase
    pub fn enabled_in(&self, phase: UiPhase) -> bool {
        use UiPhase::*;
        match self {
            Command::Jump => matches!(phase, Ready | Playing),
            Command::Pause => phase == Playing,
            Command::Resume => phase == Paused,
            Command::Restart => phase == GameOver,
            Command::ExitToMenu => matches!(phase, Paused | GameOver),
            Command::SelectNextDifficulty
            | Command::SelectPrevDifficulty
            | Command::ConfirmStart => phase == DifficultySelect,
        }
    }
}

const NEXT_KEYS: &[&str] = &["ArrowDown", "s", "S", "і", "І"];
const PREV_KEYS: &[&str] = &["ArrowUp", "w", "W", "ц", "Ц"];
const CONFIRM_KEYS: &[&str] = &["Enter", " ", "E", "e", "У", "у"];
const JUMP_KEYS: &[&str] = &[" ", "w", "W", "ц", "Ц"];
const ESCAPE: &str = "Escape";

fn key_command(key: &str, phase: UiPhase) -> Option<Command> {
    match phase {
        UiPhase::DifficultySelect => {
            if NEXT_KEYS.contains(&key) {
                Some(Command::SelectNextDifficulty)
            } else if PREV_KEYS.contains(&key) {
                Some(Command::SelectPrevDifficulty)
            } else if CONFIRM_KEYS.contains(&key) {
                Some(Command::ConfirmStart)
            } else {
                None
            }
        }
        UiPhase::Ready => JUMP_KEYS.contains(&key).then_some(Command::Jump),
        UiPhase::Playing => {
            if JUMP_KEYS.contains(&key) {
                Some(Command::Jump)
            } else if key == ESCAPE {
                Some(Command::Pause)
            } else {
                None
            }
        }
        UiPhase::Paused => {
            if CONFIRM_KEYS.contains(&key) {
                Some(Command::Resume)
            } else if key == ESCAPE {
                Some(Command::ExitToMenu)
            } else {
                None
            }
        }
        UiPhase::GameOver => {
            if CONFIRM_KEYS.contains(&key) {
                Some(Command::Restart)
            } else if key == ESCAPE {
                Some(Command::ExitToMenu)
            } else {
                None
            }
        }
        UiPhase::Countdown => None,
    }
}

/// Map an input event to the command it triggers in `phase`, if any
pub fn dispatch(event: &InputEvent, phase: UiPhase) -> Option<Command> {
    let command = match event {
        InputEvent::Key(key) => key_command(key, phase),
        InputEvent::PointerDown => Some(Command::Jump),
        InputEvent::FocusLost => Some(Command::Pause),
    }?;
    command.enabled_in(phase).then_some(command)
}
