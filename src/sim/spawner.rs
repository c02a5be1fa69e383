//! Obstacle spawning and scrolling
//!
//! Spawn cadence is driven by wall-clock timestamps (ms), never by frame
//! counts, so a slow or fast display does not change pacing.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::DifficultyProfile;
use super::state::{Field, Obstacle, ObstacleId};
use crate::consts::MIN_TOP_HEIGHT;

/// Time-gated obstacle factory
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Timestamp of the last spawn (or of the clock start)
    last_spawn: f64,
    next_id: u64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_spawn: 0.0,
            next_id: 1,
        }
    }

    pub fn last_spawn(&self) -> f64 {
        self.last_spawn
    }

    /// Start the spawn clock: the first obstacle is due one interval later
    pub fn start_clock(&mut self, now: f64) {
        self.last_spawn = now;
    }

    /// Shift the spawn clock forward by time spent outside play
    pub fn rebase(&mut self, suspended_ms: f64) {
        self.last_spawn += suspended_ms.max(0.0);
    }

    /// Spawn an obstacle at the right edge if the interval has elapsed
    pub fn maybe_spawn(
        &mut self,
        now: f64,
        profile: &DifficultyProfile,
        field: &Field,
    ) -> Option<Obstacle> {
        if now - self.last_spawn < f64::from(profile.spawn_interval_ms) {
            return None;
        }
        self.last_spawn = now;

        let id = ObstacleId(self.next_id);
        self.next_id += 1;

        let top_height = random_top_height(&mut self.rng, field.height, profile.vertical_gap);
        Some(Obstacle {
            id,
            x: field.width,
            top_height,
            gap: profile.vertical_gap,
            scored: false,
        })
    }
}

/// Pick a top pipe height in `[MIN_TOP_HEIGHT, height - gap - MIN_TOP_HEIGHT)`.
///
/// When the gap leaves no room for both margins the range collapses to the
/// single value that centers the gap.
pub fn random_top_height<R: Rng>(rng: &mut R, height: f32, gap: f32) -> f32 {
    let min = MIN_TOP_HEIGHT;
    let max = height - gap - MIN_TOP_HEIGHT;
    if max > min {
        rng.random_range(min..max)
    } else {
        ((height - gap) / 2.0).max(0.0)
    }
}

/// Scroll obstacles left and drop the ones fully past the left edge.
///
/// Returns true if any obstacle was removed.
pub fn advance(
    obstacles: &mut Vec<Obstacle>,
    profile: &DifficultyProfile,
    pipe_width: f32,
    dt: f32,
) -> bool {
    let before = obstacles.len();
    for obstacle in obstacles.iter_mut() {
        obstacle.x -= profile.horizontal_speed * dt;
    }
    obstacles.retain(|o| o.x >= -pipe_width);
    obstacles.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::{Tier, resolve};
    use proptest::prelude::*;

    fn field() -> Field {
        Field::new(1024.0, 600.0).unwrap()
    }

    #[test]
    fn test_spawn_waits_for_interval() {
        let profile = resolve(Tier::Medium, false);
        let field = field();
        let mut spawner = Spawner::new(7);
        spawner.start_clock(1000.0);

        assert!(spawner.maybe_spawn(2599.0, &profile, &field).is_none());
        let first = spawner.maybe_spawn(2600.0, &profile, &field).unwrap();
        assert_eq!(first.x, field.width);
        assert_eq!(first.gap, 130.0);
        assert!(!first.scored);
        assert_eq!(spawner.last_spawn(), 2600.0);

        // Cadence is independent of how many frames ran in between
        assert!(spawner.maybe_spawn(3000.0, &profile, &field).is_none());
        let second = spawner.maybe_spawn(4200.0, &profile, &field).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_rebase_delays_next_spawn() {
        let profile = resolve(Tier::Medium, false);
        let field = field();
        let mut spawner = Spawner::new(7);
        spawner.start_clock(0.0);
        spawner.rebase(8000.0);
        assert!(spawner.maybe_spawn(9599.0, &profile, &field).is_none());
        assert!(spawner.maybe_spawn(9600.0, &profile, &field).is_some());
    }

    #[test]
    fn test_same_seed_same_obstacles() {
        let profile = resolve(Tier::Hard, false);
        let field = field();
        let mut a = Spawner::new(42);
        let mut b = Spawner::new(42);
        for t in 1..5 {
            let now = f64::from(t * 1400);
            assert_eq!(
                a.maybe_spawn(now, &profile, &field),
                b.maybe_spawn(now, &profile, &field)
            );
        }
    }

    #[test]
    fn test_gap_too_large_collapses_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        // 200 - 120 - 100 < 0: single centered value
        assert_eq!(random_top_height(&mut rng, 200.0, 120.0), 40.0);
        // Gap equal to the field: clamp at zero instead of going negative
        assert_eq!(random_top_height(&mut rng, 100.0, 140.0), 0.0);
    }

    #[test]
    fn test_advance_moves_and_prunes() {
        let profile = resolve(Tier::Medium, false);
        let mut obstacles = vec![
            Obstacle {
                id: ObstacleId(1),
                x: -45.0,
                top_height: 100.0,
                gap: 130.0,
                scored: true,
            },
            Obstacle {
                id: ObstacleId(2),
                x: 500.0,
                top_height: 100.0,
                gap: 130.0,
                scored: false,
            },
        ];

        let removed = advance(&mut obstacles, &profile, 52.0, 1.0);
        assert!(removed);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].id, ObstacleId(2));
        assert_eq!(obstacles[0].x, 492.0);

        let removed = advance(&mut obstacles, &profile, 52.0, 0.5);
        assert!(!removed);
        assert_eq!(obstacles[0].x, 488.0);
    }

    proptest! {
        #[test]
        fn spawned_gap_stays_on_screen(
            seed in any::<u64>(),
            height in 300.0f32..1400.0,
            idx in 0usize..3,
        ) {
            let profile = resolve(Tier::ALL[idx], false);
            let field = Field::new(1024.0, height).unwrap();
            let mut spawner = Spawner::new(seed);
            let obstacle = spawner
                .maybe_spawn(f64::from(profile.spawn_interval_ms), &profile, &field)
                .unwrap();
            prop_assert!(obstacle.top_height > 0.0);
            prop_assert!(obstacle.top_height < height - obstacle.gap);
            prop_assert!(obstacle.top_height + obstacle.gap < height);
        }
    }
}
