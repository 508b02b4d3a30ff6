//! 2D immediate-mode rendering
//!
//! `draw_frame` paints one frame of a `GameState` onto anything that
//! implements `Surface`. In the browser that is a Canvas 2D context; tests and
//! headless runs use `RecordingSurface`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod shapes;

use glam::Vec2;

use crate::assets::AssetSlot;
use crate::sim::{GameState, ObstacleSpec};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface, StubImage};

/// Straight RGBA, each channel 0..1
pub type Color = [f32; 4];

/// Drawing primitives the game needs. Coordinates are logical viewport pixels.
pub trait Surface {
    type Image;

    /// Logical width and height
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color);
    /// Bold text centred on `pos`
    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, color: Color);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    /// Restrict later drawing to a circle, until the matching `restore`
    fn clip_circle(&mut self, center: Vec2, radius: f32);

    fn draw_image(&mut self, image: &Self::Image, min: Vec2, size: Vec2);
    /// Natural size of an image
    fn image_size(&self, image: &Self::Image) -> Vec2;

    fn clear(&mut self, color: Color) {
        let (w, h) = self.size();
        self.fill_rect(Vec2::ZERO, Vec2::new(w, h), color);
    }
}

/// Images a frame may use
pub struct Assets<I> {
    /// The player's photo
    pub avatar: AssetSlot<I>,
    /// Optional scrolling backdrop; clouds are drawn without it
    pub background: AssetSlot<I>,
}

impl<I> Default for Assets<I> {
    fn default() -> Self {
        Self {
            avatar: AssetSlot::empty(),
            background: AssetSlot::empty(),
        }
    }
}

/// Per-player presentation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_score: bool,
    /// Scroll the background layer
    pub parallax: bool,
    pub bengali_numerals: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_score: true,
            parallax: true,
            bengali_numerals: true,
        }
    }
}

const SKY: Color = [0.73, 0.9, 0.99, 1.0];
const STREET: Color = [0.16, 0.17, 0.22, 1.0];
const SCORE_TEXT: Color = [0.12, 0.16, 0.23, 1.0];
const SCORE_SHADOW: Color = [0.0, 0.0, 0.0, 0.1];

/// Paint one complete frame, back to front
pub fn draw_frame<S: Surface>(
    surface: &mut S,
    state: &GameState,
    assets: &Assets<S::Image>,
    options: &RenderOptions,
) {
    let (width, height) = surface.size();
    let falling = matches!(state.ruleset.obstacle, ObstacleSpec::Falling { .. });

    surface.clear(if falling { STREET } else { SKY });

    let scroll = if options.parallax { state.scroll } else { 0.0 };
    let tiled = assets
        .background
        .with(|image| shapes::tiled_background(surface, image, scroll, width, height));
    if tiled.is_none() {
        if falling {
            shapes::road(surface, scroll, width, height);
        } else {
            shapes::clouds(surface, scroll, width, height);
        }
    }

    for obstacle in &state.obstacles {
        shapes::obstacle(surface, obstacle, height);
    }

    let drawn = assets
        .avatar
        .with(|image| shapes::avatar(surface, &state.avatar, Some(image)));
    if drawn.is_none() {
        shapes::avatar(surface, &state.avatar, None);
    }

    if options.show_score {
        let text = if options.bengali_numerals {
            shapes::bengali_digits(state.score)
        } else {
            state.score.to_string()
        };
        let pos = Vec2::new(width / 2.0, 64.0);
        surface.fill_text(&text, pos + Vec2::splat(3.0), 52.0, SCORE_SHADOW);
        surface.fill_text(&text, pos, 52.0, SCORE_TEXT);
    }
}
