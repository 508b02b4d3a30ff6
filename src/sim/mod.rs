//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per display frame
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod ruleset;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{avatar_hits, boundary_collision, circle_rect_overlap};
pub use difficulty::Difficulty;
pub use ruleset::{
    AvatarSpec, CollisionPolicy, Control, ObstacleSpec, Ruleset, RulesetError, ScoreMode,
    SpawnPolicy, Variant,
};
pub use state::{
    Avatar, CollisionCause, FallingDisplay, GameEvent, GameState, Obstacle, ObstacleShape, Phase,
};
pub use tick::{FrameResult, TickInput, autopilot, tick};
