//! Game state and core simulation types
//!
//! Everything a play session mutates lives in `GameState`; nothing here
//! outlives a single mount.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ruleset::{AvatarSpec, Control, Ruleset};
use crate::consts::*;

/// Number of decorative icons a falling obstacle can show
pub const SPRITE_KINDS: u8 = 5;
/// Number of text labels a falling obstacle can show
pub const LABEL_KINDS: u8 = 4;

/// Session phase. There is no pause; `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Terminated,
}

/// What ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionCause {
    Floor,
    Ceiling,
    Obstacle { id: u32 },
}

/// Things that happened during the last frame (for audio and effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Scored,
    Crashed,
}

/// The player-controlled avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    pub pos: Vec2,
    pub vel_y: f32,
    /// Horizontal position the avatar eases toward (steering control)
    pub target_x: f32,
    pub collision_radius: f32,
    pub visual_radius: f32,
    /// Visual tilt derived from vertical velocity
    pub rotation: f32,
}

impl Avatar {
    pub fn new(spec: &AvatarSpec, pos: Vec2) -> Self {
        Self {
            pos,
            vel_y: 0.0,
            target_x: pos.x,
            collision_radius: spec.collision_radius,
            visual_radius: spec.visual_radius,
            rotation: 0.0,
        }
    }

    /// One frame of flap physics: gravity, optional jump, then integration.
    /// A jump overrides the velocity outright.
    pub fn fall(&mut self, gravity: f32, jump: Option<f32>) {
        self.vel_y += gravity;
        if let Some(strength) = jump {
            self.vel_y = strength;
        }
        self.pos.y += self.vel_y;
        self.rotation = (self.vel_y * TILT_FACTOR).clamp(-MAX_TILT, MAX_TILT);
    }

    /// One frame of steering: ease toward `target_x`, kept inside `[min_x, max_x]`
    pub fn steer(&mut self, smoothing: f32, min_x: f32, max_x: f32) {
        self.target_x = self.target_x.clamp(min_x, max_x);
        self.pos.x += (self.target_x - self.pos.x) * smoothing;
        self.pos.x = self.pos.x.clamp(min_x, max_x);
    }

    /// Horizontal range the avatar centre may occupy on a surface of `width`
    pub fn playable_x(&self, width: f32) -> (f32, f32) {
        let r = self.visual_radius;
        if width <= 2.0 * r {
            (width / 2.0, width / 2.0)
        } else {
            (r, width - r)
        }
    }
}

/// How a falling obstacle is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallingDisplay {
    /// Decorative icon, index below `SPRITE_KINDS`
    Sprite(u8),
    /// Text label, index below `LABEL_KINDS`
    Label(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleShape {
    /// Top segment `[0, top)`, bottom segment from `top + gap` down.
    /// The obstacle position is the left edge.
    PipePair { top: f32, gap: f32, width: f32 },
    /// Rotating sprite; the obstacle position is its centre
    Falling {
        size: f32,
        rotation: f32,
        spin: f32,
        display: FallingDisplay,
    },
}

/// A moving hazard
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per frame along the obstacle's travel direction
    pub speed: f32,
    /// Set once the avatar has cleared this obstacle; never unset
    pub passed: bool,
    /// Distance travelled since spawning
    pub travelled: f32,
    pub shape: ObstacleShape,
}

impl Obstacle {
    pub fn pipe(id: u32, x: f32, top: f32, gap: f32, width: f32, speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, 0.0),
            speed,
            passed: false,
            travelled: 0.0,
            shape: ObstacleShape::PipePair { top, gap, width },
        }
    }

    pub fn falling(
        id: u32,
        pos: Vec2,
        size: f32,
        speed: f32,
        spin: f32,
        display: FallingDisplay,
    ) -> Self {
        Self {
            id,
            pos,
            speed,
            passed: false,
            travelled: 0.0,
            shape: ObstacleShape::Falling {
                size,
                rotation: 0.0,
                spin,
                display,
            },
        }
    }

    /// Move one frame. Pipes scroll left at the shared `scroll_speed` so their
    /// spacing holds; falling obstacles drop at their own speed and spin.
    pub fn advance(&mut self, scroll_speed: f32) {
        match &mut self.shape {
            ObstacleShape::PipePair { .. } => {
                self.speed = scroll_speed;
                self.pos.x -= scroll_speed;
            }
            ObstacleShape::Falling { rotation, spin, .. } => {
                self.pos.y += self.speed;
                *rotation += *spin;
            }
        }
        self.travelled += self.speed;
    }

    /// True once the trailing edge has crossed the avatar
    pub fn cleared_by(&self, avatar: &Avatar) -> bool {
        match self.shape {
            ObstacleShape::PipePair { width, .. } => self.pos.x + width < avatar.pos.x,
            ObstacleShape::Falling { size, .. } => self.pos.y - size / 2.0 > avatar.pos.y,
        }
    }

    /// Mark cleared. Returns true only on the false -> true transition.
    pub fn mark_passed(&mut self) -> bool {
        if self.passed {
            return false;
        }
        self.passed = true;
        true
    }

    /// Fully beyond the trailing edge of a `height`-tall play area, plus margin
    pub fn is_gone(&self, height: f32) -> bool {
        match self.shape {
            ObstacleShape::PipePair { width, .. } => self.pos.x + width < -CLEANUP_MARGIN,
            ObstacleShape::Falling { size, .. } => {
                self.pos.y - size / 2.0 > height + CLEANUP_MARGIN
            }
        }
    }
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the session RNG was created from
    pub seed: u64,
    pub ruleset: Ruleset,
    /// Surface width in pixels
    pub width: f32,
    /// Surface height in pixels
    pub height: f32,
    pub avatar: Avatar,
    /// Live obstacles in spawn order (also back-to-front draw order)
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    /// Frames simulated so far
    pub frame: u64,
    /// Wall-clock time simulated so far (ms)
    pub elapsed_ms: f64,
    pub phase: Phase,
    /// Background scroll offset, wrapped to the surface width
    pub scroll: f32,
    /// Events raised by the most recent frame
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a running session with the avatar at its home position
    pub fn new(ruleset: Ruleset, width: f32, height: f32, seed: u64) -> Self {
        let home = avatar_home(&ruleset, width, height);
        let avatar = Avatar::new(&ruleset.avatar, home);
        Self {
            seed,
            ruleset,
            width,
            height,
            avatar,
            obstacles: Vec::new(),
            score: 0,
            frame: 0,
            elapsed_ms: 0.0,
            phase: Phase::Running,
            scroll: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Adopt new surface dimensions without resetting the session.
    /// The avatar keeps its proportional placement.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.width <= 0.0 || self.height <= 0.0 {
            self.width = width;
            self.height = height;
            self.avatar.pos = avatar_home(&self.ruleset, width, height);
            self.avatar.target_x = self.avatar.pos.x;
            return;
        }

        let sx = width / self.width;
        let sy = height / self.height;
        match self.ruleset.control {
            Control::Flap => {
                self.avatar.pos.x = width * self.ruleset.avatar.anchor_x;
                self.avatar.pos.y *= sy;
                self.avatar.target_x = self.avatar.pos.x;
            }
            Control::Steer { floor_offset, .. } => {
                let (min_x, max_x) = self.avatar.playable_x(width);
                self.avatar.pos.x = (self.avatar.pos.x * sx).clamp(min_x, max_x);
                self.avatar.target_x = (self.avatar.target_x * sx).clamp(min_x, max_x);
                self.avatar.pos.y = height - floor_offset;
            }
        }
        self.width = width;
        self.height = height;
        if self.scroll >= width {
            self.scroll = 0.0;
        }
    }
}

/// Where the avatar starts for a ruleset on a `width` x `height` surface
pub fn avatar_home(ruleset: &Ruleset, width: f32, height: f32) -> Vec2 {
    let x = width * ruleset.avatar.anchor_x;
    match ruleset.control {
        Control::Flap => Vec2::new(x, height / 2.0),
        Control::Steer { floor_offset, .. } => Vec2::new(x, height - floor_offset),
    }
}
