//! Mounted game session
//!
//! `Engine` owns one run of the simulation together with its sound sink and
//! the host's game-over callback. The host drives it one display frame at a
//! time and stops scheduling frames once `frame` returns anything other than
//! `FrameResult::Continue`.

use crate::audio::{Silent, SoundSink};
use crate::renderer::{Assets, RenderOptions, Surface, draw_frame};
use crate::sim::{FrameResult, GameState, Ruleset, TickInput, tick};

/// Called with the final score when the session ends in a collision
pub type GameOverCallback = Box<dyn FnOnce(u64)>;

pub struct Engine<A: SoundSink = Silent> {
    state: GameState,
    sound: A,
    options: RenderOptions,
    on_game_over: Option<GameOverCallback>,
}

impl<A: SoundSink> Engine<A> {
    /// Start a session on a `width` x `height` surface
    pub fn mount(
        ruleset: Ruleset,
        width: f32,
        height: f32,
        seed: u64,
        sound: A,
        on_game_over: impl FnOnce(u64) + 'static,
    ) -> Self {
        log::info!("Mounting {width}x{height} session with seed {seed}");
        Self {
            state: GameState::new(ruleset, width, height, seed),
            sound,
            options: RenderOptions::default(),
            on_game_over: Some(Box::new(on_game_over)),
        }
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one frame: simulate, play the frame's sounds, draw if still
    /// running. On the terminal frame the game-over callback fires.
    pub fn frame<S: Surface>(
        &mut self,
        input: &TickInput,
        delta_ms: f64,
        surface: &mut S,
        assets: &Assets<S::Image>,
    ) -> FrameResult {
        let result = tick(&mut self.state, input, delta_ms);
        if result == FrameResult::Halted {
            return result;
        }

        for &event in &self.state.events {
            self.sound.play(event.into());
        }

        match result {
            FrameResult::Continue => draw_frame(surface, &self.state, assets, &self.options),
            FrameResult::GameOver { score, .. } => {
                if let Some(callback) = self.on_game_over.take() {
                    callback(score);
                }
            }
            FrameResult::Halted => {}
        }
        result
    }

    /// Adopt a new surface size without restarting
    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("Resize to {width}x{height}");
        self.state.resize(width, height);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn sound(&self) -> &A {
        &self.sound
    }

    /// Tear the session down. The game-over callback is dropped unfired.
    pub fn unmount(mut self) {
        self.on_game_over = None;
        log::info!(
            "Unmounted at frame {} with score {}",
            self.state.frame,
            self.state.score
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::assets::AssetSlot;
    use crate::audio::SoundEffect;
    use crate::renderer::{DrawCommand, RecordingSurface, StubImage};
    use crate::sim::{CollisionCause, Variant};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn counting_engine(
        variant: Variant,
    ) -> (Engine<Vec<SoundEffect>>, Rc<Cell<u32>>, Rc<Cell<Option<u64>>>) {
        let calls = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(None));
        let (c, l) = (Rc::clone(&calls), Rc::clone(&last));
        let engine = Engine::mount(variant.ruleset(), 480.0, 600.0, 11, Vec::new(), move |score| {
            c.set(c.get() + 1);
            l.set(Some(score));
        });
        (engine, calls, last)
    }

    #[test]
    fn test_game_over_fires_exactly_once() {
        let (mut engine, calls, last) = counting_engine(Variant::PipeFlyer);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();

        let mut result = FrameResult::Continue;
        for _ in 0..200 {
            result = engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
            if result != FrameResult::Continue {
                break;
            }
        }
        assert_eq!(
            result,
            FrameResult::GameOver {
                score: 0,
                cause: CollisionCause::Floor
            }
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(last.get(), Some(0));

        // A host that keeps calling frame gets nothing more
        for _ in 0..10 {
            let r = engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
            assert_eq!(r, FrameResult::Halted);
        }
        assert_eq!(calls.get(), 1);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_unmount_never_fires() {
        let (mut engine, calls, _) = counting_engine(Variant::PipeFlyer);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();
        for _ in 0..10 {
            engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
        }
        assert!(engine.is_running());
        engine.unmount();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_sounds_follow_events() {
        let (mut engine, _, _) = counting_engine(Variant::PipeFlyer);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        engine.frame(&jump, FRAME_MS, &mut surface, &assets);
        assert_eq!(engine.sound(), &vec![SoundEffect::Jump]);

        while engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets)
            == FrameResult::Continue
        {}
        assert_eq!(engine.sound().last(), Some(&SoundEffect::Crash));
        let played = engine.sound().len();

        engine.frame(&jump, FRAME_MS, &mut surface, &assets);
        assert_eq!(engine.sound().len(), played);
    }

    #[test]
    fn test_terminal_frame_is_not_drawn() {
        let (mut engine, _, _) = counting_engine(Variant::PipeFlyer);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();

        engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
        assert!(!surface.take_commands().is_empty());

        while engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets)
            == FrameResult::Continue
        {
            surface.take_commands();
        }
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_photo_swap_shows_next_frame() {
        let (mut engine, _, _) = counting_engine(Variant::Floaty);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();

        engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
        let has_image =
            |cmds: &[DrawCommand]| cmds.iter().any(|c| matches!(c, DrawCommand::Image { .. }));
        assert!(!has_image(&surface.take_commands()));

        let slot: AssetSlot<StubImage> = assets.avatar.clone();
        slot.set(StubImage::new(1, 64.0, 64.0));
        engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
        assert!(has_image(&surface.take_commands()));
    }

    #[test]
    fn test_resize_keeps_progress() {
        let (mut engine, _, _) = counting_engine(Variant::FallingRunner);
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();
        for _ in 0..30 {
            engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets);
        }
        let frame = engine.state().frame;
        let score = engine.state().score;

        engine.resize(960.0, 1200.0);
        assert_eq!(engine.state().frame, frame);
        assert_eq!(engine.state().score, score);
        assert_eq!(engine.state().width, 960.0);
        assert_eq!(engine.state().avatar.pos.y, 1200.0 - 110.0);
    }

    #[test]
    fn test_callback_may_touch_shared_state() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut engine: Engine = Engine::mount(
            Ruleset::pipe_flyer(),
            480.0,
            600.0,
            3,
            Silent,
            move |score| sink.borrow_mut().push(score),
        );
        let mut surface = RecordingSurface::new(480.0, 600.0);
        let assets = Assets::default();
        while engine.frame(&TickInput::default(), FRAME_MS, &mut surface, &assets)
            == FrameResult::Continue
        {}
        assert_eq!(*log.borrow(), vec![0]);
    }
}
