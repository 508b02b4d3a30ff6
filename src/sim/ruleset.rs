//! Game variants as data
//!
//! The pipe-flyer, the falling-obstacle runner and the floaty flyer share one
//! simulation; a `Ruleset` selects physics, spawning, collision and scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::difficulty::Difficulty;
use crate::consts::*;

/// Errors raised while building a ruleset
#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("unknown game variant: {0:?}")]
    UnknownVariant(String),
    #[error("malformed ruleset JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid ruleset: `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> RulesetError {
    RulesetError::Invalid { field, reason }
}

/// JSON numbers past `f32::MAX` deserialize to infinity
fn finite(field: &'static str, values: &[f32]) -> Result<(), RulesetError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(invalid(field, "must be finite"))
    }
}

/// Built-in game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    #[default]
    PipeFlyer,
    FallingRunner,
    Floaty,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::PipeFlyer, Variant::FallingRunner, Variant::Floaty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::PipeFlyer => "pipe-flyer",
            Variant::FallingRunner => "falling-runner",
            Variant::Floaty => "floaty",
        }
    }

    pub fn parse(s: &str) -> Result<Self, RulesetError> {
        match s.to_lowercase().as_str() {
            "pipe-flyer" | "pipes" | "flappy" => Ok(Variant::PipeFlyer),
            "falling-runner" | "runner" | "falling" => Ok(Variant::FallingRunner),
            "floaty" => Ok(Variant::Floaty),
            _ => Err(RulesetError::UnknownVariant(s.to_string())),
        }
    }

    /// The preset ruleset for this variant
    pub fn ruleset(&self) -> Ruleset {
        match self {
            Variant::PipeFlyer => Ruleset::pipe_flyer(),
            Variant::FallingRunner => Ruleset::falling_runner(),
            Variant::Floaty => Ruleset::floaty(),
        }
    }
}

/// How input moves the avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    /// Gravity pulls down, a jump kicks the velocity upward
    Flap,
    /// Avatar eases horizontally toward an input-driven target
    Steer {
        /// Fraction of the remaining distance covered per frame
        smoothing: f32,
        /// Target shift per move-left/move-right intent
        nudge_step: f32,
        /// Distance of the avatar centre above the bottom edge
        floor_offset: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarSpec {
    pub collision_radius: f32,
    pub visual_radius: f32,
    /// Horizontal anchor as a fraction of viewport width
    pub anchor_x: f32,
}

/// Obstacle family and its placement bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObstacleSpec {
    Pipes {
        width: f32,
        gap: f32,
        min_height: f32,
    },
    Falling {
        min_size: f32,
        max_size: f32,
        /// Largest rotation rate either way (radians/frame)
        max_spin: f32,
        /// Spawn speed varies by ± this fraction of the current speed
        speed_jitter: f32,
        /// Probability an obstacle is a text label instead of an icon
        label_chance: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// One obstacle every `every` frames
    FrameInterval { every: u64 },
    /// A new obstacle once the newest has travelled `spacing` from the spawn edge
    Distance { spacing: f32 },
    /// Each frame spawns with the difficulty's current spawn chance
    Chance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Exact circle vs axis-aligned rectangle (pipe segments)
    CircleRect,
    /// Centre distance against `r * avatar_factor + size * obstacle_factor`
    Proximity {
        avatar_factor: f32,
        obstacle_factor: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreMode {
    /// One point per obstacle passed
    PerObstacle,
    /// Points from survival time
    Survival { ms_per_point: f64 },
}

/// Complete configuration of a game variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub gravity: f32,
    pub jump_strength: f32,
    pub control: Control,
    /// Floor and ceiling are terminal
    pub bounded: bool,
    pub avatar: AvatarSpec,
    pub obstacle: ObstacleSpec,
    pub spawn: SpawnPolicy,
    pub collision: CollisionPolicy,
    pub score: ScoreMode,
    pub difficulty: Difficulty,
    /// Background scroll per unit of obstacle speed (0 disables)
    #[serde(default)]
    pub parallax_factor: f32,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::pipe_flyer()
    }
}

impl Ruleset {
    /// The classic flappy pipe game
    pub fn pipe_flyer() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            control: Control::Flap,
            bounded: true,
            avatar: AvatarSpec {
                collision_radius: AVATAR_RADIUS,
                visual_radius: AVATAR_RADIUS,
                anchor_x: AVATAR_ANCHOR_X,
            },
            obstacle: ObstacleSpec::Pipes {
                width: PIPE_WIDTH,
                gap: PIPE_GAP,
                min_height: PIPE_MIN_HEIGHT,
            },
            spawn: SpawnPolicy::FrameInterval {
                every: PIPE_SPAWN_RATE,
            },
            collision: CollisionPolicy::CircleRect,
            score: ScoreMode::PerObstacle,
            difficulty: Difficulty {
                start_speed: PIPE_SPEED,
                max_speed: 4.4,
                ramp_start: 1800,
                ramp_end: 5400,
                start_spawn_chance: 0.0,
                max_spawn_chance: 0.0,
            },
            parallax_factor: 0.25,
        }
    }

    /// Dodge falling icons and labels by steering along the bottom
    pub fn falling_runner() -> Self {
        Self {
            gravity: 0.0,
            jump_strength: 0.0,
            control: Control::Steer {
                smoothing: 0.15,
                nudge_step: 48.0,
                floor_offset: 110.0,
            },
            bounded: false,
            avatar: AvatarSpec {
                collision_radius: 28.0,
                visual_radius: 28.0,
                anchor_x: 0.5,
            },
            obstacle: ObstacleSpec::Falling {
                min_size: 36.0,
                max_size: 64.0,
                max_spin: 0.06,
                speed_jitter: 0.25,
                label_chance: 0.3,
            },
            spawn: SpawnPolicy::Chance,
            collision: CollisionPolicy::Proximity {
                avatar_factor: 0.5,
                obstacle_factor: 1.0 / 3.0,
            },
            score: ScoreMode::Survival { ms_per_point: 250.0 },
            difficulty: Difficulty {
                start_speed: 3.0,
                max_speed: 9.0,
                ramp_start: 0,
                ramp_end: 3600,
                start_spawn_chance: 0.02,
                max_spawn_chance: 0.07,
            },
            parallax_factor: 1.0,
        }
    }

    /// Low gravity, evenly spaced pipes, and a hitbox smaller than the picture
    pub fn floaty() -> Self {
        Self {
            gravity: 0.25,
            jump_strength: -5.5,
            control: Control::Flap,
            bounded: true,
            avatar: AvatarSpec {
                collision_radius: 17.0,
                visual_radius: AVATAR_RADIUS,
                anchor_x: AVATAR_ANCHOR_X,
            },
            obstacle: ObstacleSpec::Pipes {
                width: 64.0,
                gap: 210.0,
                min_height: PIPE_MIN_HEIGHT,
            },
            spawn: SpawnPolicy::Distance { spacing: 300.0 },
            collision: CollisionPolicy::CircleRect,
            score: ScoreMode::PerObstacle,
            difficulty: Difficulty {
                start_speed: 2.6,
                max_speed: 4.2,
                ramp_start: 600,
                ramp_end: 4200,
                start_spawn_chance: 0.0,
                max_spawn_chance: 0.0,
            },
            parallax_factor: 0.35,
        }
    }

    /// Parse and validate a custom ruleset
    pub fn from_json(json: &str) -> Result<Self, RulesetError> {
        let ruleset: Ruleset = serde_json::from_str(json)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Reject rulesets the simulation cannot run sensibly
    pub fn validate(&self) -> Result<(), RulesetError> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(invalid("gravity", "must be finite and non-negative"));
        }
        if !self.jump_strength.is_finite() {
            return Err(invalid("jump_strength", "must be finite"));
        }
        match &self.control {
            Control::Flap => {
                if self.jump_strength >= 0.0 {
                    return Err(invalid("jump_strength", "must be negative (upward) to flap"));
                }
            }
            Control::Steer {
                smoothing,
                nudge_step,
                floor_offset,
            } => {
                finite("control", &[*smoothing, *nudge_step, *floor_offset])?;
                if !(*smoothing > 0.0 && *smoothing <= 1.0) {
                    return Err(invalid("control.smoothing", "must be in (0, 1]"));
                }
                if *nudge_step < 0.0 || *floor_offset < 0.0 {
                    return Err(invalid("control", "offsets must be non-negative"));
                }
            }
        }

        let avatar = &self.avatar;
        finite(
            "avatar",
            &[avatar.collision_radius, avatar.visual_radius, avatar.anchor_x],
        )?;
        if avatar.collision_radius <= 0.0 || avatar.visual_radius <= 0.0 {
            return Err(invalid("avatar", "radii must be positive"));
        }
        if !(0.0..=1.0).contains(&avatar.anchor_x) {
            return Err(invalid("avatar.anchor_x", "must be a fraction of the width"));
        }

        match &self.obstacle {
            ObstacleSpec::Pipes {
                width,
                gap,
                min_height,
            } => {
                finite("obstacle", &[*width, *gap, *min_height])?;
                if *width <= 0.0 {
                    return Err(invalid("obstacle.width", "must be positive"));
                }
                if *gap <= 2.0 * avatar.collision_radius {
                    return Err(invalid("obstacle.gap", "must be wider than the avatar"));
                }
                if *min_height < 0.0 {
                    return Err(invalid("obstacle.min_height", "must be non-negative"));
                }
                if !matches!(self.collision, CollisionPolicy::CircleRect) {
                    return Err(invalid("collision", "pipes need circle_rect collision"));
                }
            }
            ObstacleSpec::Falling {
                min_size,
                max_size,
                max_spin,
                speed_jitter,
                label_chance,
            } => {
                finite(
                    "obstacle",
                    &[*min_size, *max_size, *max_spin, *speed_jitter, *label_chance],
                )?;
                if *min_size <= 0.0 || max_size < min_size {
                    return Err(invalid("obstacle.size", "needs 0 < min_size <= max_size"));
                }
                if *max_spin < 0.0 {
                    return Err(invalid("obstacle.max_spin", "must be non-negative"));
                }
                if !(0.0..1.0).contains(speed_jitter) {
                    return Err(invalid("obstacle.speed_jitter", "must be in [0, 1)"));
                }
                if !(0.0..=1.0).contains(label_chance) {
                    return Err(invalid("obstacle.label_chance", "must be a probability"));
                }
                if !matches!(self.collision, CollisionPolicy::Proximity { .. }) {
                    return Err(invalid("collision", "falling obstacles need proximity collision"));
                }
            }
        }

        match self.spawn {
            SpawnPolicy::FrameInterval { every } if every == 0 => {
                return Err(invalid("spawn.every", "must be at least one frame"));
            }
            SpawnPolicy::Distance { spacing } if !spacing.is_finite() || spacing <= 0.0 => {
                return Err(invalid("spawn.spacing", "must be finite and positive"));
            }
            _ => {}
        }

        if let ScoreMode::Survival { ms_per_point } = self.score {
            if !ms_per_point.is_finite() || ms_per_point <= 0.0 {
                return Err(invalid("score.ms_per_point", "must be finite and positive"));
            }
        }

        let d = &self.difficulty;
        finite(
            "difficulty",
            &[
                d.start_speed,
                d.max_speed,
                d.start_spawn_chance,
                d.max_spawn_chance,
            ],
        )?;
        if d.start_speed <= 0.0 || d.max_speed < d.start_speed {
            return Err(invalid("difficulty", "needs 0 < start_speed <= max_speed"));
        }
        if d.ramp_end <= d.ramp_start {
            return Err(invalid("difficulty", "ramp_end must come after ramp_start"));
        }
        let chances = 0.0..=1.0;
        if !chances.contains(&d.start_spawn_chance)
            || !chances.contains(&d.max_spawn_chance)
            || d.max_spawn_chance < d.start_spawn_chance
        {
            return Err(invalid("difficulty", "spawn chances must be ramping probabilities"));
        }

        if !self.parallax_factor.is_finite() || self.parallax_factor < 0.0 {
            return Err(invalid("parallax_factor", "must be finite and non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for variant in Variant::ALL {
            variant
                .ruleset()
                .validate()
                .unwrap_or_else(|e| panic!("{} preset invalid: {e}", variant.as_str()));
        }
    }

    #[test]
    fn test_variant_names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(Variant::parse(variant.as_str()).unwrap(), variant);
        }
        assert_eq!(Variant::parse("Flappy").unwrap(), Variant::PipeFlyer);
        assert!(matches!(
            Variant::parse("tetris"),
            Err(RulesetError::UnknownVariant(_))
        ));
    }

    #[test]
    fn test_from_json_accepts_preset() {
        let json = serde_json::to_string(&Ruleset::floaty()).unwrap();
        let parsed = Ruleset::from_json(&json).unwrap();
        assert_eq!(parsed, Ruleset::floaty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Ruleset::from_json("{\"gravity\": 1"),
            Err(RulesetError::Parse(_))
        ));
    }

    #[test]
    fn test_narrow_gap_rejected() {
        let mut ruleset = Ruleset::pipe_flyer();
        ruleset.obstacle = ObstacleSpec::Pipes {
            width: 70.0,
            gap: 40.0,
            min_height: 60.0,
        };
        let err = ruleset.validate().unwrap_err();
        assert!(matches!(
            err,
            RulesetError::Invalid {
                field: "obstacle.gap",
                ..
            }
        ));
    }

    #[test]
    fn test_mismatched_collision_rejected() {
        let mut ruleset = Ruleset::falling_runner();
        ruleset.collision = CollisionPolicy::CircleRect;
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_upward_flap_required() {
        let mut ruleset = Ruleset::pipe_flyer();
        ruleset.jump_strength = 3.0;
        assert!(ruleset.validate().is_err());
    }

    #[test]
    fn test_non_finite_fields_rejected() {
        let runner = serde_json::to_value(Ruleset::falling_runner()).unwrap();
        let floaty = serde_json::to_value(Ruleset::floaty()).unwrap();
        let cases = [
            (&runner, "/obstacle/max_spin"),
            (&runner, "/obstacle/min_size"),
            (&runner, "/obstacle/max_size"),
            (&runner, "/obstacle/speed_jitter"),
            (&runner, "/obstacle/label_chance"),
            (&runner, "/control/smoothing"),
            (&runner, "/control/nudge_step"),
            (&runner, "/control/floor_offset"),
            (&runner, "/difficulty/max_speed"),
            (&runner, "/difficulty/start_speed"),
            (&floaty, "/obstacle/width"),
            (&floaty, "/obstacle/gap"),
            (&floaty, "/obstacle/min_height"),
            (&floaty, "/spawn/spacing"),
            (&floaty, "/avatar/collision_radius"),
            (&floaty, "/avatar/visual_radius"),
            (&floaty, "/parallax_factor"),
            (&floaty, "/gravity"),
            (&floaty, "/jump_strength"),
        ];
        for (preset, pointer) in cases {
            let mut value = preset.clone();
            *value.pointer_mut(pointer).unwrap() = serde_json::json!(1e39);
            let json = value.to_string();
            assert!(
                matches!(Ruleset::from_json(&json), Err(RulesetError::Invalid { .. })),
                "{pointer} = 1e39 accepted"
            );
        }
    }

    #[test]
    fn test_equal_huge_sizes_rejected() {
        let mut ruleset = Ruleset::falling_runner();
        ruleset.obstacle = ObstacleSpec::Falling {
            min_size: f32::INFINITY,
            max_size: f32::INFINITY,
            max_spin: 0.06,
            speed_jitter: 0.25,
            label_chance: 0.3,
        };
        assert!(ruleset.validate().is_err());
    }
}
