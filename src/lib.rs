//! Chanda Arcade - a photo-avatar parody arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, scoring)
//! - `engine`: Mount/frame/unmount lifecycle around the simulation
//! - `renderer`: 2D immediate-mode drawing of a frame
//! - `platform`: Browser host glue and input capture
//! - `settings` / `profile`: LocalStorage-backed preferences and profile record

pub mod assets;
pub mod audio;
pub mod engine;
pub mod platform;
pub mod profile;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::Engine;
pub use profile::PlayerProfile;
pub use settings::Settings;
pub use sim::{FrameResult, Ruleset, TickInput, Variant};

/// Classic pipe-flyer constants (per frame, viewport pixels)
pub mod consts {
    /// Downward acceleration added to vertical velocity every frame
    pub const GRAVITY: f32 = 0.4;
    /// Vertical velocity set by a jump (negative is up)
    pub const JUMP_STRENGTH: f32 = -7.5;
    /// Maximum visual tilt of the avatar either way
    pub const MAX_TILT: f32 = std::f32::consts::FRAC_PI_4;
    /// Tilt per unit of vertical velocity
    pub const TILT_FACTOR: f32 = 0.1;

    /// Avatar radius (collision and visual for the classic variant)
    pub const AVATAR_RADIUS: f32 = 24.0;
    /// Avatar horizontal anchor as a fraction of viewport width
    pub const AVATAR_ANCHOR_X: f32 = 0.25;

    pub const PIPE_SPEED: f32 = 3.2;
    /// Frames between pipe spawns
    pub const PIPE_SPAWN_RATE: u64 = 110;
    pub const PIPE_WIDTH: f32 = 70.0;
    pub const PIPE_GAP: f32 = 190.0;
    /// Minimum height of either pipe segment
    pub const PIPE_MIN_HEIGHT: f32 = 60.0;

    /// Distance past the trailing edge before an obstacle is dropped
    pub const CLEANUP_MARGIN: f32 = 100.0;

    /// Longest frame delta accepted (ms); longer gaps are treated as this
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
