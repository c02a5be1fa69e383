//! Difficulty tiers and their physics profiles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::COMPACT_SCALE;
use crate::error::ConfigError;

/// Difficulty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Tier {
    /// All tiers in menu order
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }

    fn index(self) -> usize {
        match self {
            Tier::Easy => 0,
            Tier::Medium => 1,
            Tier::Hard => 2,
        }
    }

    /// Next tier in menu order, wrapping from hard back to easy
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous tier in menu order, wrapping from easy to hard
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Tier::Easy),
            "medium" => Ok(Tier::Medium),
            "hard" => Ok(Tier::Hard),
            _ => Err(ConfigError::UnknownTier(s.to_string())),
        }
    }
}

/// Physics parameters for one tier on one device class.
///
/// Velocities and gravity are per baseline frame (1/60 s). A profile is
/// never edited; changing tier or device class resolves a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Downward acceleration added to velocity each frame
    pub gravity: f32,
    /// Velocity set by a flap (negative is up)
    pub jump_impulse: f32,
    /// Leftward obstacle speed
    pub horizontal_speed: f32,
    /// Wall-clock time between obstacle spawns
    pub spawn_interval_ms: u32,
    /// Vertical opening between the two pipes of an obstacle
    pub vertical_gap: f32,
}

/// Resolve the profile for a tier, scaling motion down on compact devices.
///
/// Spawn interval and gap are left unscaled.
pub fn resolve(tier: Tier, compact: bool) -> DifficultyProfile {
    let base = match tier {
        Tier::Easy => DifficultyProfile {
            gravity: 0.6,
            jump_impulse: -8.0,
            horizontal_speed: 7.0,
            spawn_interval_ms: 1800,
            vertical_gap: 140.0,
        },
        Tier::Medium => DifficultyProfile {
            gravity: 0.7,
            jump_impulse: -9.0,
            horizontal_speed: 8.0,
            spawn_interval_ms: 1600,
            vertical_gap: 130.0,
        },
        Tier::Hard => DifficultyProfile {
            gravity: 0.8,
            jump_impulse: -10.0,
            horizontal_speed: 9.0,
            spawn_interval_ms: 1400,
            vertical_gap: 120.0,
        },
    };

    if !compact {
        return base;
    }

    DifficultyProfile {
        gravity: base.gravity * COMPACT_SCALE,
        jump_impulse: base.jump_impulse * COMPACT_SCALE,
        horizontal_speed: base.horizontal_speed * COMPACT_SCALE,
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_medium_desktop_constants() {
        let p = resolve(Tier::Medium, false);
        assert_eq!(p.gravity, 0.7);
        assert_eq!(p.jump_impulse, -9.0);
        assert_eq!(p.horizontal_speed, 8.0);
        assert_eq!(p.spawn_interval_ms, 1600);
        assert_eq!(p.vertical_gap, 130.0);
    }

    #[test]
    fn test_tiers_strictly_ordered() {
        for compact in [false, true] {
            let easy = resolve(Tier::Easy, compact);
            let medium = resolve(Tier::Medium, compact);
            let hard = resolve(Tier::Hard, compact);
            for (lo, hi) in [(easy, medium), (medium, hard)] {
                assert!(lo.gravity < hi.gravity);
                assert!(lo.jump_impulse.abs() < hi.jump_impulse.abs());
                assert!(lo.horizontal_speed < hi.horizontal_speed);
                assert!(lo.spawn_interval_ms > hi.spawn_interval_ms);
                assert!(lo.vertical_gap > hi.vertical_gap);
            }
        }
    }

    #[test]
    fn test_compact_scales_motion_only() {
        for tier in Tier::ALL {
            let full = resolve(tier, false);
            let compact = resolve(tier, true);
            assert!((compact.gravity - full.gravity * COMPACT_SCALE).abs() < 1e-6);
            assert!((compact.jump_impulse - full.jump_impulse * COMPACT_SCALE).abs() < 1e-6);
            assert!((compact.horizontal_speed - full.horizontal_speed * COMPACT_SCALE).abs() < 1e-6);
            assert_eq!(compact.spawn_interval_ms, full.spawn_interval_ms);
            assert_eq!(compact.vertical_gap, full.vertical_gap);
        }
    }

    #[test]
    fn test_tier_navigation_wraps() {
        assert_eq!(Tier::Easy.next(), Tier::Medium);
        assert_eq!(Tier::Hard.next(), Tier::Easy);
        assert_eq!(Tier::Easy.prev(), Tier::Hard);
        assert_eq!(Tier::Medium.prev(), Tier::Easy);
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("Hard".parse::<Tier>(), Ok(Tier::Hard));
        assert_eq!(" easy ".parse::<Tier>(), Ok(Tier::Easy));
        assert_eq!(
            "insane".parse::<Tier>(),
            Err(ConfigError::UnknownTier("insane".to_string()))
        );
        // Only the three tier labels are accepted
        assert!("med".parse::<Tier>().is_err());
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(idx in 0usize..3, compact in any::<bool>()) {
            let tier = Tier::ALL[idx];
            prop_assert_eq!(resolve(tier, compact), resolve(tier, compact));
            prop_assert!(resolve(tier, compact).jump_impulse < 0.0);
        }
    }
}
