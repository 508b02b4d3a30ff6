//! Input capture
//!
//! Browser events become `Intent`s, which are folded into an `InputQueue`
//! between frames and drained once per frame into a `TickInput`.

use crate::sim::{Control, TickInput};

/// What the player asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Jump,
    MoveLeft,
    MoveRight,
    /// Steer toward this horizontal position (viewport pixels)
    SetTarget(f32),
}

/// Map a `KeyboardEvent.code` to an intent
pub fn intent_for_key(code: &str) -> Option<Intent> {
    match code {
        "Space" | "ArrowUp" | "KeyW" => Some(Intent::Jump),
        "ArrowLeft" | "KeyA" => Some(Intent::MoveLeft),
        "ArrowRight" | "KeyD" => Some(Intent::MoveRight),
        _ => None,
    }
}

/// A click or touch at horizontal position `x`
pub fn intent_for_press(control: &Control, x: f32) -> Intent {
    match control {
        Control::Flap => Intent::Jump,
        Control::Steer { .. } => Intent::SetTarget(x),
    }
}

/// Pointer or finger moved to `x`; only steering cares
pub fn intent_for_drag(control: &Control, x: f32) -> Option<Intent> {
    match control {
        Control::Flap => None,
        Control::Steer { .. } => Some(Intent::SetTarget(x)),
    }
}

/// Intents gathered since the last frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputQueue {
    jump: bool,
    nudge: i32,
    target_x: Option<f32>,
}

impl InputQueue {
    pub fn push(&mut self, intent: Intent) {
        match intent {
            // Several presses in one frame are one jump
            Intent::Jump => self.jump = true,
            Intent::MoveLeft => self.nudge -= 1,
            Intent::MoveRight => self.nudge += 1,
            Intent::SetTarget(x) => {
                self.target_x = Some(x);
                self.nudge = 0;
            }
        }
    }

    /// Hand over everything pending and start empty
    pub fn take(&mut self) -> TickInput {
        let queued = std::mem::take(self);
        TickInput {
            jump: queued.jump,
            nudge: queued.nudge,
            target_x: queued.target_x,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
