//! Chanda Arcade entry point
//!
//! On the web: mounts the player's chosen game on `#game-canvas`.
//! Natively: plays every variant headless on autopilot and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use chanda_arcade::platform::web::{GameHandle, mount_with};
    use chanda_arcade::{PlayerProfile, Settings};

    const CANVAS_ID: &str = "game-canvas";

    thread_local! {
        static HANDLE: RefCell<Option<GameHandle>> = const { RefCell::new(None) };
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Chanda Arcade starting...");

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        if document.get_element_by_id(CANVAS_ID).is_none() {
            log::info!("No #{CANVAS_ID} on this page; waiting for mount_game");
            return Ok(());
        }

        let settings = Settings::load();
        let profile = Rc::new(RefCell::new(PlayerProfile::load()));
        let photo = profile.borrow().photo_url.clone();

        let record = Rc::clone(&profile);
        let handle = mount_with(
            CANVAS_ID,
            settings.variant.ruleset(),
            photo,
            None,
            &settings,
            Box::new(move |score| {
                let mut profile = record.borrow_mut();
                if profile.record_score(score) {
                    log::info!("New best score: {score}");
                }
                profile.save();
            }),
        )?;
        HANDLE.with(|h| *h.borrow_mut() = Some(handle));

        log::info!("Playing {}", settings.variant.as_str());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use chanda_arcade::Engine;
    use chanda_arcade::audio::Silent;
    use chanda_arcade::renderer::{Assets, RecordingSurface};
    use chanda_arcade::sim::{FrameResult, Variant, autopilot};

    const WIDTH: f32 = 480.0;
    const HEIGHT: f32 = 720.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Two minutes of play at 60 fps
    const MAX_FRAMES: u32 = 60 * 120;

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    log::info!("Chanda Arcade (native) headless run, seed {seed}");

    for variant in Variant::ALL {
        let name = variant.as_str();
        let mut engine = Engine::mount(
            variant.ruleset(),
            WIDTH,
            HEIGHT,
            seed,
            Silent,
            move |score| log::info!("{name}: game over, score {score}"),
        );
        let mut surface = RecordingSurface::new(WIDTH, HEIGHT);
        let assets = Assets::default();

        let mut drawn = 0usize;
        let mut result = FrameResult::Continue;
        for _ in 0..MAX_FRAMES {
            let input = autopilot(engine.state());
            result = engine.frame(&input, FRAME_MS, &mut surface, &assets);
            drawn += surface.take_commands().len();
            if result != FrameResult::Continue {
                break;
            }
        }

        let state = engine.state();
        match result {
            FrameResult::GameOver { cause, .. } => {
                log::info!("{name}: ended by {cause:?} after {} frames", state.frame)
            }
            _ => log::info!("{name}: survived {} frames", state.frame),
        }
        println!(
            "{name:<16} score {:>4}  frames {:>5}  draw calls {drawn}",
            state.score, state.frame
        );
        engine.unmount();
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is wasm_main
}
