//! In-memory surface that records draw calls instead of painting

use glam::Vec2;

use super::{Color, Surface};

/// Stand-in for a decoded image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StubImage {
    pub id: u32,
    pub size: Vec2,
}

impl StubImage {
    pub fn new(id: u32, width: f32, height: f32) -> Self {
        Self {
            id,
            size: Vec2::new(width, height),
        }
    }
}

/// One recorded primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { min: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, line_width: f32, color: Color },
    Text { text: String, pos: Vec2, px: f32 },
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    ClipCircle { center: Vec2, radius: f32 },
    Image { id: u32, min: Vec2, size: Vec2 },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Drain everything recorded so far
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Every string drawn, in order
    pub fn texts(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every `save` has a matching `restore` and none comes first
    pub fn balanced(&self) -> bool {
        let mut depth = 0i32;
        for c in &self.commands {
            match c {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Surface for RecordingSurface {
    type Image = StubImage;

    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { min, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            line_width,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, _color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            px,
        });
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn clip_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::ClipCircle { center, radius });
    }

    fn draw_image(&mut self, image: &StubImage, min: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Image {
            id: image.id,
            min,
            size,
        });
    }

    fn image_size(&self, image: &StubImage) -> Vec2 {
        image.size
    }
}
