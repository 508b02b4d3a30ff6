//! Difficulty ramp
//!
//! Difficulty is never accumulated: every frame recomputes it from the frame
//! counter so slow rendering cannot make it drift.

use serde::{Deserialize, Serialize};

use crate::lerp;

/// Speed and spawn-chance ramp over a window of frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Obstacle speed (px/frame) up to `ramp_start`
    pub start_speed: f32,
    /// Obstacle speed from `ramp_end` onward
    pub max_speed: f32,
    /// Frame at which the ramp begins
    pub ramp_start: u64,
    /// Frame at which the ramp reaches its maximum
    pub ramp_end: u64,
    /// Per-frame spawn probability at the start (chance spawning only)
    #[serde(default)]
    pub start_spawn_chance: f32,
    /// Per-frame spawn probability at the end of the ramp
    #[serde(default)]
    pub max_spawn_chance: f32,
}

impl Difficulty {
    /// A flat difficulty that never ramps
    pub fn constant(speed: f32) -> Self {
        Self {
            start_speed: speed,
            max_speed: speed,
            ramp_start: 0,
            ramp_end: 1,
            start_spawn_chance: 0.0,
            max_spawn_chance: 0.0,
        }
    }

    /// Position within the ramp window, 0.0 before it and 1.0 after it
    pub fn progress(&self, frame: u64) -> f32 {
        if frame <= self.ramp_start {
            0.0
        } else if frame >= self.ramp_end {
            1.0
        } else {
            (frame - self.ramp_start) as f32 / (self.ramp_end - self.ramp_start) as f32
        }
    }

    /// Obstacle speed at the given frame
    pub fn speed_at(&self, frame: u64) -> f32 {
        if frame >= self.ramp_end {
            return self.max_speed;
        }
        lerp(self.start_speed, self.max_speed, self.progress(frame))
    }

    /// Per-frame spawn probability at the given frame
    pub fn spawn_chance_at(&self, frame: u64) -> f32 {
        if frame >= self.ramp_end {
            return self.max_spawn_chance;
        }
        lerp(
            self.start_spawn_chance,
            self.max_spawn_chance,
            self.progress(frame),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp() -> Difficulty {
        Difficulty {
            start_speed: 3.0,
            max_speed: 9.0,
            ramp_start: 600,
            ramp_end: 3600,
            start_spawn_chance: 0.02,
            max_spawn_chance: 0.08,
        }
    }

    #[test]
    fn test_endpoints() {
        let d = ramp();
        assert_eq!(d.speed_at(0), 3.0);
        assert_eq!(d.speed_at(600), 3.0);
        assert_eq!(d.speed_at(3600), 9.0);
        assert_eq!(d.speed_at(1_000_000), 9.0);
        assert_eq!(d.spawn_chance_at(0), 0.02);
        assert_eq!(d.spawn_chance_at(3600), 0.08);
    }

    #[test]
    fn test_midpoint_is_linear() {
        let d = ramp();
        assert!((d.speed_at(2100) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_constant() {
        let d = Difficulty::constant(3.2);
        for frame in [0, 1, 100, 10_000] {
            assert_eq!(d.speed_at(frame), 3.2);
        }
    }

    proptest! {
        #[test]
        fn speed_never_decreases(a in 0u64..10_000, b in 0u64..10_000) {
            let d = ramp();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(d.speed_at(lo) <= d.speed_at(hi));
            prop_assert!(d.spawn_chance_at(lo) <= d.spawn_chance_at(hi));
        }

        #[test]
        fn speed_stays_in_range(frame in 0u64..100_000) {
            let d = ramp();
            let s = d.speed_at(frame);
            prop_assert!((d.start_speed..=d.max_speed).contains(&s));
        }
    }
}
