//! Obstacle spawning
//!
//! When to spawn is decided by the ruleset's `SpawnPolicy`; where is random
//! within bounds that always leave the obstacle passable.

use glam::Vec2;
use rand::Rng;

use super::ruleset::{ObstacleSpec, SpawnPolicy};
use super::state::{FallingDisplay, GameState, LABEL_KINDS, Obstacle, SPRITE_KINDS};

/// Run the spawn policy for the current frame
pub fn maybe_spawn(state: &mut GameState, speed: f32, spawn_chance: f32) {
    if should_spawn(state, spawn_chance) {
        spawn(state, speed);
    }
}

fn should_spawn(state: &mut GameState, spawn_chance: f32) -> bool {
    match state.ruleset.spawn {
        SpawnPolicy::FrameInterval { every } => state.frame % every == 0,
        SpawnPolicy::Distance { spacing } => state
            .obstacles
            .last()
            .is_none_or(|newest| newest.travelled >= spacing),
        SpawnPolicy::Chance => {
            let p = f64::from(spawn_chance.clamp(0.0, 1.0));
            state.rng.random_bool(p)
        }
    }
}

/// Spawn one obstacle of the ruleset's kind at the spawn edge
pub fn spawn(state: &mut GameState, speed: f32) {
    match state.ruleset.obstacle {
        ObstacleSpec::Pipes { .. } => spawn_pipe(state, speed),
        ObstacleSpec::Falling { .. } => spawn_falling(state, speed),
    }
}

/// Inclusive range for the top segment height of a pipe pair.
/// Collapses to `min_height` when the surface is too short for any range.
pub fn pipe_top_bounds(height: f32, gap: f32, min_height: f32) -> (f32, f32) {
    let lo = min_height.ceil();
    let hi = (height - gap - min_height).floor();
    if hi < lo { (lo, lo) } else { (lo, hi) }
}

/// Spawn a pipe pair at the right edge with a whole-pixel random gap position
pub fn spawn_pipe(state: &mut GameState, speed: f32) {
    let ObstacleSpec::Pipes {
        width,
        gap,
        min_height,
    } = state.ruleset.obstacle
    else {
        return;
    };

    let (lo, hi) = pipe_top_bounds(state.height, gap, min_height);
    let top = state.rng.random_range(lo as i64..=hi as i64) as f32;
    let id = state.next_entity_id();
    log::trace!("spawn pipe {id} top={top} at frame {}", state.frame);
    state
        .obstacles
        .push(Obstacle::pipe(id, state.width, top, gap, width, speed));
}

/// Spawn a falling obstacle just above the top edge
pub fn spawn_falling(state: &mut GameState, speed: f32) {
    let ObstacleSpec::Falling {
        min_size,
        max_size,
        max_spin,
        speed_jitter,
        label_chance,
    } = state.ruleset.obstacle
    else {
        return;
    };

    let rng = &mut state.rng;
    let size = rng.random_range(min_size..=max_size);
    let half = size / 2.0;
    let x = if state.width > size {
        rng.random_range(half..=state.width - half)
    } else {
        state.width / 2.0
    };
    let spin = if max_spin > 0.0 {
        rng.random_range(-max_spin..=max_spin)
    } else {
        0.0
    };
    let jitter = if speed_jitter > 0.0 {
        rng.random_range(-speed_jitter..=speed_jitter)
    } else {
        0.0
    };
    let display = if rng.random_bool(f64::from(label_chance)) {
        FallingDisplay::Label(rng.random_range(0..LABEL_KINDS))
    } else {
        FallingDisplay::Sprite(rng.random_range(0..SPRITE_KINDS))
    };

    let id = state.next_entity_id();
    let obstacle = Obstacle::falling(
        id,
        Vec2::new(x, -half),
        size,
        speed * (1.0 + jitter),
        spin,
        display,
    );
    state.obstacles.push(obstacle);
}
