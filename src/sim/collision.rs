//! Collision detection between the avatar, the play-area bounds and obstacles
//!
//! All tests are strict: shapes that exactly touch do not collide.

use glam::Vec2;

use super::ruleset::CollisionPolicy;
use super::state::{Avatar, CollisionCause, Obstacle, ObstacleShape};

/// Circle vs axis-aligned rectangle, by closest point on the rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> bool {
    let closest = center.clamp(min, max);
    center.distance_squared(closest) < radius * radius
}

/// Centre distance below `threshold`
#[inline]
pub fn within(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) < threshold
}

/// Floor and ceiling check for bounded rulesets
pub fn boundary_collision(avatar: &Avatar, height: f32) -> Option<CollisionCause> {
    let r = avatar.collision_radius;
    if avatar.pos.y + r > height {
        Some(CollisionCause::Floor)
    } else if avatar.pos.y - r < 0.0 {
        Some(CollisionCause::Ceiling)
    } else {
        None
    }
}

/// The two rectangles of a pipe pair as (min, max) corners
pub fn pipe_segments(x: f32, top: f32, gap: f32, width: f32, height: f32) -> [(Vec2, Vec2); 2] {
    let bottom = top + gap;
    [
        (Vec2::new(x, 0.0_f32.min(top)), Vec2::new(x + width, top)),
        (Vec2::new(x, bottom), Vec2::new(x + width, height.max(bottom))),
    ]
}

/// Does the avatar overlap this obstacle under the given policy?
pub fn avatar_hits(
    avatar: &Avatar,
    obstacle: &Obstacle,
    policy: &CollisionPolicy,
    height: f32,
) -> bool {
    let r = avatar.collision_radius;
    match (&obstacle.shape, policy) {
        (ObstacleShape::PipePair { top, gap, width }, _) => {
            pipe_segments(obstacle.pos.x, *top, *gap, *width, height)
                .iter()
                .any(|(min, max)| circle_rect_overlap(avatar.pos, r, *min, *max))
        }
        (
            ObstacleShape::Falling { size, .. },
            CollisionPolicy::Proximity {
                avatar_factor,
                obstacle_factor,
            },
        ) => within(
            avatar.pos,
            obstacle.pos,
            r * avatar_factor + size * obstacle_factor,
        ),
        (ObstacleShape::Falling { size, .. }, CollisionPolicy::CircleRect) => {
            let half = Vec2::splat(size / 2.0);
            circle_rect_overlap(avatar.pos, r, obstacle.pos - half, obstacle.pos + half)
        }
    }
}
