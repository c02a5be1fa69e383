//! Player settings and preferences
//!
//! Persisted as JSON in LocalStorage on the web, defaults elsewhere.

use serde::{Deserialize, Serialize};

use crate::consts::RESUME_COUNTDOWN_SECS;
use crate::sim::{LoopConfig, Tier};

/// How a score saved on pause affects the displayed personal best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// Saved remotely, but the best shown in game only moves at game over
    #[default]
    Advisory,
    /// A successful checkpoint raises the displayed best immediately
    UpdatesBest,
}

impl CheckpointPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointPolicy::Advisory => "Advisory",
            CheckpointPolicy::UpdatesBest => "Updates best",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Play point/hit sounds
    pub sounds_enabled: bool,
    /// Sound volume (0.0 - 1.0)
    pub volume: f32,

    // === Gameplay ===
    /// Tier preselected on the difficulty screen
    pub default_tier: Tier,
    /// Countdown before the first flap (0 = none)
    pub start_countdown_secs: u32,
    /// Countdown after resuming from pause
    pub resume_countdown_secs: u32,
    /// Checkpoint save behavior on pause
    pub checkpoint: CheckpointPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sounds_enabled: true,
            volume: 0.3,

            default_tier: Tier::Medium,
            start_countdown_secs: 0,
            resume_countdown_secs: RESUME_COUNTDOWN_SECS,
            checkpoint: CheckpointPolicy::Advisory,
        }
    }
}

impl Settings {
    /// Effective volume (0 when sounds are off)
    pub fn effective_volume(&self) -> f32 {
        if self.sounds_enabled {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Loop timing derived from these settings
    pub fn loop_config(&self, seed: u64) -> LoopConfig {
        LoopConfig {
            seed,
            start_countdown_secs: self.start_countdown_secs,
            resume_countdown_secs: self.resume_countdown_secs,
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
