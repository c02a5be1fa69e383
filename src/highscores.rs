//! Personal best scores per difficulty
//!
//! `LocalScoreStore` keeps them per player in LocalStorage, standing in for
//! the remote leaderboard when playing offline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bridge::{PlayerId, ScoreService};
use crate::error::ServiceError;
use crate::sim::Tier;

/// Best score for each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BestScores {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl BestScores {
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Easy => self.easy,
            Tier::Medium => self.medium,
            Tier::Hard => self.hard,
        }
    }

    fn slot(&mut self, tier: Tier) -> &mut u32 {
        match tier {
            Tier::Easy => &mut self.easy,
            Tier::Medium => &mut self.medium,
            Tier::Hard => &mut self.hard,
        }
    }

    /// Keep the higher of the stored and the new score.
    /// Returns true if the best improved.
    pub fn record(&mut self, tier: Tier, score: u32) -> bool {
        let slot = self.slot(tier);
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }
}

/// Best scores for every player who played on this device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalScoreStore {
    players: BTreeMap<String, BestScores>,
}

impl LocalScoreStore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_best_scores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Load best scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(store) = serde_json::from_str::<LocalScoreStore>(&json) {
                    log::info!("Loaded best scores for {} players", store.players.len());
                    return store;
                }
            }
        }

        log::info!("No best scores found, starting fresh");
        Self::new()
    }

    /// Save best scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    fn save(&self) -> Result<(), ServiceError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| ServiceError::Storage("LocalStorage unavailable".into()))?;
        let json =
            serde_json::to_string(self).map_err(|e| ServiceError::Storage(e.to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| ServiceError::Storage("LocalStorage write refused".into()))?;
        log::debug!("Best scores saved");
        Ok(())
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&self) -> Result<(), ServiceError> {
        // Memory only for native
        Ok(())
    }
}

impl ScoreService for LocalScoreStore {
    fn submit_score(
        &mut self,
        player: &PlayerId,
        score: u32,
        tier: Tier,
    ) -> Result<(), ServiceError> {
        let best = self.players.entry(player.0.clone()).or_default();
        if best.record(tier, score) {
            log::info!("New {tier} best for {}: {score}", player.0);
            self.save()?;
        }
        Ok(())
    }

    fn fetch_best_scores(&mut self, player: &PlayerId) -> Result<BestScores, ServiceError> {
        Ok(self.players.get(&player.0).copied().unwrap_or_default())
    }
}
