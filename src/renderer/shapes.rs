//! Drawing of individual game elements

use glam::Vec2;

use super::{Color, Surface};
use crate::sim::{Avatar, FallingDisplay, Obstacle, ObstacleShape};

/// bKash pink
pub const PIPE_BODY: Color = [0.82, 0.125, 0.325, 1.0];
pub const PIPE_CAP: Color = [0.69, 0.106, 0.275, 1.0];
const PIPE_SHINE: Color = [0.89, 0.36, 0.51, 1.0];
const PIPE_CAP_HEIGHT: f32 = 26.0;
const PIPE_CAP_OVERHANG: f32 = 4.0;

const LABEL_BOX: Color = [0.82, 0.12, 0.15, 1.0];
const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
pub const CLOUD: Color = [1.0, 1.0, 1.0, 0.6];
const ROAD_EDGE: Color = [0.3, 0.3, 0.34, 1.0];
const LANE_MARK: Color = [0.95, 0.85, 0.3, 0.8];
const AVATAR_PLACEHOLDER: Color = PIPE_BODY;
const AVATAR_BORDER: Color = PIPE_BODY;

/// Painted on the top segment of a pipe pair
const PIPE_LABELS: [&str; 3] = ["চাঁদা", "টোল", "ফি"];
/// Icons for `FallingDisplay::Sprite`
pub const SPRITE_ICONS: [&str; 5] = ["💸", "🧾", "📢", "🚧", "💰"];
/// Text for `FallingDisplay::Label`
pub const LABEL_TEXTS: [&str; 4] = ["চাঁদা দে!", "রাস্তা বন্ধ", "ভ্যাট", "টোল"];

/// Clouds per background tile: (x fraction, y fraction, scale)
const CLOUDS: [(f32, f32, f32); 3] = [(0.12, 0.14, 1.0), (0.48, 0.3, 0.7), (0.8, 0.1, 1.2)];

pub fn obstacle<S: Surface>(surface: &mut S, obstacle: &Obstacle, height: f32) {
    match obstacle.shape {
        ObstacleShape::PipePair { top, gap, width } => {
            pipe_pair(surface, obstacle.id, obstacle.pos.x, top, gap, width, height)
        }
        ObstacleShape::Falling {
            size,
            rotation,
            display,
            ..
        } => falling(surface, obstacle.pos, size, rotation, display),
    }
}

/// Two pipe segments with caps facing the gap
pub fn pipe_pair<S: Surface>(
    surface: &mut S,
    id: u32,
    x: f32,
    top: f32,
    gap: f32,
    width: f32,
    height: f32,
) {
    let cap_x = x - PIPE_CAP_OVERHANG;
    let cap_size = Vec2::new(width + PIPE_CAP_OVERHANG * 2.0, PIPE_CAP_HEIGHT);
    let bottom = top + gap;

    // Top segment
    let top_body = (top - PIPE_CAP_HEIGHT).max(0.0);
    surface.fill_rect(Vec2::new(x, 0.0), Vec2::new(width, top_body), PIPE_BODY);
    surface.fill_rect(Vec2::new(x + 8.0, 0.0), Vec2::new(8.0, top_body), PIPE_SHINE);
    surface.fill_rect(Vec2::new(cap_x, top - PIPE_CAP_HEIGHT), cap_size, PIPE_CAP);

    // Bottom segment
    let bottom_body = (height - bottom - PIPE_CAP_HEIGHT).max(0.0);
    surface.fill_rect(Vec2::new(cap_x, bottom), cap_size, PIPE_CAP);
    surface.fill_rect(
        Vec2::new(x, bottom + PIPE_CAP_HEIGHT),
        Vec2::new(width, bottom_body),
        PIPE_BODY,
    );
    surface.fill_rect(
        Vec2::new(x + 8.0, bottom + PIPE_CAP_HEIGHT),
        Vec2::new(8.0, bottom_body),
        PIPE_SHINE,
    );

    if top_body > 48.0 {
        let label = PIPE_LABELS[id as usize % PIPE_LABELS.len()];
        let pos = Vec2::new(x + width / 2.0, top_body - 24.0);
        surface.fill_text(label, pos, 16.0, WHITE);
    }
}

/// Rotating icon or labelled sign, centred on `pos`
pub fn falling<S: Surface>(
    surface: &mut S,
    pos: Vec2,
    size: f32,
    rotation: f32,
    display: FallingDisplay,
) {
    surface.save();
    surface.translate(pos);
    surface.rotate(rotation);
    match display {
        FallingDisplay::Sprite(i) => {
            let icon = SPRITE_ICONS[i as usize % SPRITE_ICONS.len()];
            surface.fill_text(icon, Vec2::ZERO, size, WHITE);
        }
        FallingDisplay::Label(i) => {
            let text = LABEL_TEXTS[i as usize % LABEL_TEXTS.len()];
            let board = Vec2::new(size * 1.6, size * 0.7);
            surface.fill_rect(-board / 2.0, board, LABEL_BOX);
            surface.fill_text(text, Vec2::ZERO, size * 0.3, WHITE);
        }
    }
    surface.restore();
}

/// The avatar: photo (or placeholder) clipped to its visual circle, then a border
pub fn avatar<S: Surface>(surface: &mut S, avatar: &Avatar, image: Option<&S::Image>) {
    let r = avatar.visual_radius;
    let diameter = r * 2.0;

    surface.save();
    surface.translate(avatar.pos);
    surface.rotate(avatar.rotation);
    surface.clip_circle(Vec2::ZERO, r);
    match image {
        Some(image) => {
            let natural = surface.image_size(image);
            let size = if natural.x > 0.0 && natural.y > 0.0 {
                natural * (diameter / natural.x).max(diameter / natural.y)
            } else {
                Vec2::splat(diameter)
            };
            surface.draw_image(image, -size / 2.0, size);
        }
        None => {
            surface.fill_circle(Vec2::ZERO, r, AVATAR_PLACEHOLDER);
            surface.fill_text("🙂", Vec2::ZERO, r * 1.2, WHITE);
        }
    }
    surface.restore();

    surface.stroke_circle(avatar.pos, r, 3.0, AVATAR_BORDER);
}

/// Background image repeated horizontally, shifted left by `scroll`
pub fn tiled_background<S: Surface>(
    surface: &mut S,
    image: &S::Image,
    scroll: f32,
    width: f32,
    height: f32,
) {
    let size = Vec2::new(width, height);
    surface.draw_image(image, Vec2::new(-scroll, 0.0), size);
    surface.draw_image(image, Vec2::new(width - scroll, 0.0), size);
}

/// Puffy clouds, tiled twice so the wrap point is never visible
pub fn clouds<S: Surface>(surface: &mut S, scroll: f32, width: f32, height: f32) {
    for tile in 0..2 {
        let base = tile as f32 * width - scroll;
        for (fx, fy, scale) in CLOUDS {
            cloud(surface, Vec2::new(base + fx * width, fy * height), scale);
        }
    }
}

fn cloud<S: Surface>(surface: &mut S, center: Vec2, scale: f32) {
    surface.fill_circle(center + Vec2::new(-30.0, 0.0) * scale, 28.0 * scale, CLOUD);
    surface.fill_circle(center + Vec2::new(0.0, -12.0) * scale, 36.0 * scale, CLOUD);
    surface.fill_circle(center + Vec2::new(32.0, 2.0) * scale, 24.0 * scale, CLOUD);
}

/// Street with lane markings that stream toward the player, `scroll` px down
pub fn road<S: Surface>(surface: &mut S, scroll: f32, width: f32, height: f32) {
    const DASH: f32 = 40.0;

    surface.fill_rect(Vec2::ZERO, Vec2::new(12.0, height), ROAD_EDGE);
    surface.fill_rect(Vec2::new(width - 12.0, 0.0), Vec2::new(12.0, height), ROAD_EDGE);

    // `scroll` wraps at `width`, so the dash period must divide it
    let period = lane_period(width);
    let mut y = scroll.rem_euclid(period) - period;
    while y < height {
        surface.fill_rect(Vec2::new(width / 2.0 - 3.0, y), Vec2::new(6.0, DASH), LANE_MARK);
        y += period;
    }
}

/// Dash spacing closest to 80px that tiles `width` exactly
fn lane_period(width: f32) -> f32 {
    const PERIOD: f32 = 80.0;
    if width <= PERIOD {
        return PERIOD;
    }
    width / (width / PERIOD).round()
}

/// Decimal digits rendered in Bengali script
pub fn bengali_digits(n: u64) -> String {
    n.to_string()
        .chars()
        .map(|c| {
            c.to_digit(10)
                .and_then(|d| char::from_u32(0x09E6 + d))
                .unwrap_or(c)
        })
        .collect()
}
