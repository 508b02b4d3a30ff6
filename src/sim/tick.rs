//! Per-frame simulation step
//!
//! Core game loop that advances the simulation one display frame. The host
//! owns scheduling; `tick` is a function of (state, input, elapsed time).

use super::collision::{avatar_hits, boundary_collision};
use super::ruleset::{Control, ScoreMode};
use super::spawn;
use super::state::{CollisionCause, GameEvent, GameState, ObstacleShape, Phase};
use crate::consts::MAX_FRAME_MS;

/// Input intents gathered since the previous frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Jump requested (flap control)
    pub jump: bool,
    /// Net move-left (-) / move-right (+) steps (steer control)
    pub nudge: i32,
    /// Absolute horizontal target from a pointer (steer control)
    pub target_x: Option<f32>,
}

/// Outcome of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameResult {
    /// Keep scheduling frames
    Continue,
    /// Terminal collision on this frame
    GameOver { score: u64, cause: CollisionCause },
    /// The session had already ended; nothing changed
    Halted,
}

/// Advance the game state by one frame.
///
/// `delta_ms` is the wall-clock time since the previous frame; it drives
/// survival scoring only and is capped at `MAX_FRAME_MS`.
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f64) -> FrameResult {
    if state.phase == Phase::Terminated {
        return FrameResult::Halted;
    }

    state.events.clear();
    state.frame += 1;
    state.elapsed_ms += delta_ms.clamp(0.0, MAX_FRAME_MS);

    let frame = state.frame;
    let speed = state.ruleset.difficulty.speed_at(frame);
    let spawn_chance = state.ruleset.difficulty.spawn_chance_at(frame);

    // Avatar
    match state.ruleset.control {
        Control::Flap => {
            let jump = input.jump.then_some(state.ruleset.jump_strength);
            state.avatar.fall(state.ruleset.gravity, jump);
            if jump.is_some() {
                state.events.push(GameEvent::Jumped);
            }
        }
        Control::Steer {
            smoothing,
            nudge_step,
            ..
        } => {
            if let Some(x) = input.target_x {
                state.avatar.target_x = x;
            }
            state.avatar.target_x += input.nudge as f32 * nudge_step;
            let (min_x, max_x) = state.avatar.playable_x(state.width);
            state.avatar.steer(smoothing, min_x, max_x);
        }
    }

    if state.ruleset.bounded {
        if let Some(cause) = boundary_collision(&state.avatar, state.height) {
            return terminate(state, cause);
        }
    }

    spawn::maybe_spawn(state, speed, spawn_chance);

    for obstacle in &mut state.obstacles {
        obstacle.advance(speed);
    }
    if state.ruleset.parallax_factor > 0.0 && state.width > 0.0 {
        state.scroll = (state.scroll + speed * state.ruleset.parallax_factor) % state.width;
    }

    // Scoring
    let mut cleared = 0u64;
    for obstacle in &mut state.obstacles {
        if obstacle.cleared_by(&state.avatar) && obstacle.mark_passed() {
            cleared += 1;
        }
    }
    match state.ruleset.score {
        ScoreMode::PerObstacle => {
            state.score += cleared;
            for _ in 0..cleared {
                state.events.push(GameEvent::Scored);
            }
        }
        ScoreMode::Survival { ms_per_point } => {
            let earned = (state.elapsed_ms / ms_per_point).floor() as u64;
            if earned > state.score {
                state.score = earned;
                state.events.push(GameEvent::Scored);
            }
        }
    }

    let hit = state
        .obstacles
        .iter()
        .find(|o| avatar_hits(&state.avatar, o, &state.ruleset.collision, state.height))
        .map(|o| o.id);
    if let Some(id) = hit {
        return terminate(state, CollisionCause::Obstacle { id });
    }

    let height = state.height;
    state.obstacles.retain(|o| !o.is_gone(height));

    FrameResult::Continue
}

fn terminate(state: &mut GameState, cause: CollisionCause) -> FrameResult {
    state.phase = Phase::Terminated;
    state.events.push(GameEvent::Crashed);
    log::info!(
        "Game over at frame {} ({:?}), score {}",
        state.frame,
        cause,
        state.score
    );
    FrameResult::GameOver {
        score: state.score,
        cause,
    }
}

/// Demo autopilot: produces plausible input for headless runs and attract mode
pub fn autopilot(state: &GameState) -> TickInput {
    let avatar = &state.avatar;
    match state.ruleset.control {
        Control::Flap => {
            let next_gap = state.obstacles.iter().find_map(|o| match o.shape {
                ObstacleShape::PipePair { top, gap, width }
                    if o.pos.x + width >= avatar.pos.x - avatar.collision_radius =>
                {
                    Some(top + gap * 0.65)
                }
                _ => None,
            });
            let target_y = next_gap.unwrap_or(state.height / 2.0);
            TickInput {
                jump: avatar.pos.y > target_y && avatar.vel_y >= 0.0,
                ..Default::default()
            }
        }
        Control::Steer { .. } => {
            let threat = state
                .obstacles
                .iter()
                .filter_map(|o| match o.shape {
                    ObstacleShape::Falling { size, .. } if o.pos.y < avatar.pos.y => {
                        let reach = size + avatar.collision_radius * 2.0;
                        ((o.pos.x - avatar.pos.x).abs() < reach).then_some((o, reach))
                    }
                    _ => None,
                })
                .max_by(|(a, _), (b, _)| a.pos.y.total_cmp(&b.pos.y));
            let target_x = threat.map(|(o, reach)| {
                let left = o.pos.x - reach * 1.5;
                let right = o.pos.x + reach * 1.5;
                if left > avatar.visual_radius && (o.pos.x > avatar.pos.x || right > state.width) {
                    left
                } else {
                    right
                }
            });
            TickInput {
                target_x,
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::consts::*;
    use crate::sim::difficulty::Difficulty;
    use crate::sim::ruleset::{Ruleset, SpawnPolicy, Variant};
    use crate::sim::state::{FallingDisplay, Obstacle};
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn quiet_ruleset() -> Ruleset {
        let mut ruleset = Ruleset::pipe_flyer();
        ruleset.spawn = SpawnPolicy::FrameInterval { every: 1_000_000 };
        ruleset.difficulty = Difficulty::constant(PIPE_SPEED);
        ruleset
    }

    #[test]
    fn test_free_fall_integration() {
        let mut state = GameState::new(quiet_ruleset(), 480.0, 2000.0, 1);
        let y0 = state.avatar.pos.y;
        let input = TickInput::default();
        for n in 1..=60u32 {
            assert_eq!(tick(&mut state, &input, FRAME_MS), FrameResult::Continue);
            let n = n as f32;
            assert!((state.avatar.vel_y - n * GRAVITY).abs() < 1e-3);
            let expected_y = y0 + GRAVITY * n * (n + 1.0) / 2.0;
            assert!((state.avatar.pos.y - expected_y).abs() < 0.05);
        }
    }

    #[test]
    fn test_jump_sets_exact_velocity() {
        let mut state = GameState::new(quiet_ruleset(), 480.0, 100_000.0, 1);
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, FRAME_MS);
        assert_eq!(state.avatar.vel_y, JUMP_STRENGTH);
        assert_eq!(state.events, vec![GameEvent::Jumped]);

        // Again from an upward velocity
        tick(&mut state, &jump, FRAME_MS);
        assert_eq!(state.avatar.vel_y, JUMP_STRENGTH);
    }

    #[test]
    fn test_floor_collision_frame() {
        // y starts at 300; collision once 300 + 0.4 * n(n+1)/2 + 24 > 600, i.e. n = 37
        let mut state = GameState::new(Ruleset::pipe_flyer(), 480.0, 600.0, 1);
        let input = TickInput::default();
        for _ in 0..36 {
            assert_eq!(tick(&mut state, &input, FRAME_MS), FrameResult::Continue);
        }
        assert_eq!(
            tick(&mut state, &input, FRAME_MS),
            FrameResult::GameOver {
                score: 0,
                cause: CollisionCause::Floor
            }
        );
        assert_eq!(state.frame, 37);
        assert_eq!(state.events, vec![GameEvent::Crashed]);
    }

    #[test]
    fn test_ceiling_collision() {
        let mut state = GameState::new(quiet_ruleset(), 480.0, 600.0, 1);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let result = (0..100)
            .map(|_| tick(&mut state, &jump, FRAME_MS))
            .find(|r| *r != FrameResult::Continue);
        assert!(matches!(
            result,
            Some(FrameResult::GameOver {
                cause: CollisionCause::Ceiling,
                ..
            })
        ));
    }

    #[test]
    fn test_terminated_state_is_frozen() {
        let mut state = GameState::new(Ruleset::pipe_flyer(), 480.0, 600.0, 1);
        while tick(&mut state, &TickInput::default(), FRAME_MS) == FrameResult::Continue {}
        let frozen = (state.frame, state.avatar.clone(), state.score);
        for _ in 0..5 {
            assert_eq!(
                tick(&mut state, &TickInput::default(), FRAME_MS),
                FrameResult::Halted
            );
        }
        assert_eq!((state.frame, state.avatar.clone(), state.score), frozen);
    }

    #[test]
    fn test_single_pipe_scores_once() {
        let mut ruleset = quiet_ruleset();
        ruleset.gravity = 0.0;
        let mut state = GameState::new(ruleset, 480.0, 600.0, 1);
        let id = state.next_entity_id();
        // Gap 205..395 around the avatar at y = 300
        state
            .obstacles
            .push(Obstacle::pipe(id, 480.0, 205.0, PIPE_GAP, PIPE_WIDTH, PIPE_SPEED));

        let input = TickInput::default();
        for _ in 0..134 {
            assert_eq!(tick(&mut state, &input, FRAME_MS), FrameResult::Continue);
            assert_eq!(state.score, 0);
        }
        // x + width drops below avatar.x (120) on frame 135
        tick(&mut state, &input, FRAME_MS);
        assert_eq!(state.score, 1);
        assert_eq!(state.events, vec![GameEvent::Scored]);
        assert!(state.obstacles[0].passed);

        for _ in 0..30 {
            tick(&mut state, &input, FRAME_MS);
            assert_eq!(state.score, 1);
            assert!(!state.events.contains(&GameEvent::Scored));
        }
    }

    #[test]
    fn test_pipe_hit_ends_with_obstacle_cause() {
        let mut ruleset = quiet_ruleset();
        ruleset.gravity = 0.0;
        let mut state = GameState::new(ruleset, 480.0, 600.0, 1);
        let id = state.next_entity_id();
        // Gap well below the avatar
        state
            .obstacles
            .push(Obstacle::pipe(id, 200.0, 400.0, PIPE_GAP, PIPE_WIDTH, PIPE_SPEED));
        let result = (0..100)
            .map(|_| tick(&mut state, &TickInput::default(), FRAME_MS))
            .find(|r| *r != FrameResult::Continue);
        assert_eq!(
            result,
            Some(FrameResult::GameOver {
                score: 0,
                cause: CollisionCause::Obstacle { id }
            })
        );
    }

    #[test]
    fn test_passed_obstacles_are_cleaned_up() {
        let mut ruleset = quiet_ruleset();
        ruleset.gravity = 0.0;
        let mut state = GameState::new(ruleset, 480.0, 600.0, 1);
        let id = state.next_entity_id();
        state
            .obstacles
            .push(Obstacle::pipe(id, 0.0, 205.0, PIPE_GAP, PIPE_WIDTH, PIPE_SPEED));
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_survival_score_follows_wall_clock() {
        let mut state = GameState::new(Ruleset::falling_runner(), 480.0, 800.0, 3);
        state.ruleset.spawn = SpawnPolicy::FrameInterval { every: 1_000_000 };
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 100.0);
        }
        assert_eq!(state.score, 4);

        // A long stall counts as one capped frame
        tick(&mut state, &TickInput::default(), 60_000.0);
        assert_eq!(state.score, 4);
        assert!((state.elapsed_ms - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_steering_follows_target_and_nudges() {
        let mut state = GameState::new(Ruleset::falling_runner(), 400.0, 800.0, 3);
        state.ruleset.spawn = SpawnPolicy::FrameInterval { every: 1_000_000 };
        let input = TickInput {
            target_x: Some(300.0),
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_MS);
        assert!((state.avatar.pos.x - 215.0).abs() < 1e-3);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        assert!((state.avatar.pos.x - 300.0).abs() < 0.5);

        let left = TickInput {
            nudge: -2,
            ..Default::default()
        };
        tick(&mut state, &left, FRAME_MS);
        assert_eq!(state.avatar.target_x, 204.0);

        let far_right = TickInput {
            target_x: Some(5_000.0),
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut state, &far_right, FRAME_MS);
        }
        assert!(state.avatar.pos.x <= 400.0 - state.avatar.visual_radius);
    }

    #[test]
    fn test_falling_obstacle_hits_runner() {
        let mut state = GameState::new(Ruleset::falling_runner(), 400.0, 800.0, 3);
        state.ruleset.spawn = SpawnPolicy::FrameInterval { every: 1_000_000 };
        let id = state.next_entity_id();
        let above = state.avatar.pos - Vec2::new(0.0, 200.0);
        state
            .obstacles
            .push(Obstacle::falling(id, above, 48.0, 5.0, 0.05, FallingDisplay::Label(1)));
        let result = (0..100)
            .map(|_| tick(&mut state, &TickInput::default(), FRAME_MS))
            .find(|r| *r != FrameResult::Continue);
        assert!(matches!(
            result,
            Some(FrameResult::GameOver {
                cause: CollisionCause::Obstacle { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_parallax_wraps() {
        let mut ruleset = quiet_ruleset();
        ruleset.gravity = 0.0;
        let mut state = GameState::new(ruleset, 100.0, 600.0, 1);
        for _ in 0..500 {
            tick(&mut state, &TickInput::default(), FRAME_MS);
            assert!((0.0..100.0).contains(&state.scroll));
        }
    }

    #[test]
    fn test_determinism() {
        let run = |seed| {
            let mut state = GameState::new(Ruleset::floaty(), 480.0, 720.0, seed);
            let mut outcome = FrameResult::Continue;
            for _ in 0..5_000 {
                let input = autopilot(&state);
                outcome = tick(&mut state, &input, FRAME_MS);
                if outcome != FrameResult::Continue {
                    break;
                }
            }
            (outcome, state.frame, state.score, state.obstacles)
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_autopilot_survives_a_while() {
        for variant in [Variant::PipeFlyer, Variant::Floaty] {
            let mut state = GameState::new(variant.ruleset(), 480.0, 720.0, 5);
            for _ in 0..300 {
                let input = autopilot(&state);
                if tick(&mut state, &input, FRAME_MS) != FrameResult::Continue {
                    break;
                }
            }
            assert!(state.frame >= 300, "{} crashed early", variant.as_str());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn scoring_is_idempotent(seed in any::<u64>(), pick in 0usize..3) {
            let variant = Variant::ALL[pick];
            let mut state = GameState::new(variant.ruleset(), 480.0, 720.0, seed);
            let mut passed: HashSet<u32> = HashSet::new();
            for _ in 0..2_000 {
                let before = state.score;
                let input = autopilot(&state);
                let result = tick(&mut state, &input, FRAME_MS);

                for o in &state.obstacles {
                    if passed.contains(&o.id) {
                        prop_assert!(o.passed);
                    }
                }
                let newly: Vec<u32> = state
                    .obstacles
                    .iter()
                    .filter(|o| o.passed && !passed.contains(&o.id))
                    .map(|o| o.id)
                    .collect();
                prop_assert!(state.score >= before);
                if variant.ruleset().score == ScoreMode::PerObstacle {
                    prop_assert_eq!(state.score - before, newly.len() as u64);
                }
                passed.extend(newly);
                if result != FrameResult::Continue {
                    break;
                }
            }
        }
    }
}
