//! Browser host
//!
//! Mounts an `Engine` on a canvas element, drives it from
//! `requestAnimationFrame`, feeds it keyboard/mouse/touch input and tears all
//! of that down again on unmount.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, EventTarget, HtmlCanvasElement, HtmlImageElement, KeyboardEvent,
    MouseEvent, TouchEvent,
};

use super::input::{InputQueue, Intent, intent_for_drag, intent_for_key, intent_for_press};
use crate::assets::{AssetSlot, load_image};
use crate::audio::AudioManager;
use crate::engine::Engine;
use crate::renderer::{Assets, CanvasSurface, Surface};
use crate::settings::Settings;
use crate::sim::{Control, FrameResult, Ruleset, RulesetError, Variant};

/// Delta assumed for the first frame, before there is a previous timestamp
const FIRST_FRAME_MS: f64 = 1000.0 / 60.0;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn to_js(err: RulesetError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Seed for a fresh session from browser entropy
fn session_seed() -> u64 {
    let random = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let now = js_sys::Date::now() as u64;
    (random << 32) ^ now
}

/// An attached event listener, detached on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        // Not passive: touch and key handlers call preventDefault
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Everything one mounted game owns
struct Session {
    engine: RefCell<Option<Engine<AudioManager>>>,
    surface: RefCell<CanvasSurface>,
    canvas: HtmlCanvasElement,
    assets: Assets<HtmlImageElement>,
    input: RefCell<InputQueue>,
    control: Control,
    listeners: RefCell<Vec<Listener>>,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    frame_id: Cell<Option<i32>>,
    last_time: Cell<Option<f64>>,
    audio_unlocked: Cell<bool>,
    /// Final score, set by the engine and delivered once borrows are released
    final_score: Rc<Cell<Option<u64>>>,
    on_game_over: RefCell<Option<Box<dyn FnOnce(u64)>>>,
}

impl Session {
    fn push(&self, intent: Intent) {
        self.input.borrow_mut().push(intent);
    }

    /// Browsers only start audio from inside a user gesture
    fn unlock_audio(&self) {
        if self.audio_unlocked.replace(true) {
            return;
        }
        if let Some(engine) = self.engine.borrow().as_ref() {
            engine.sound().resume();
        }
    }

    /// Pointer x in canvas-local CSS pixels
    fn local_x(&self, client_x: i32) -> f32 {
        let rect = self.canvas.get_bounding_client_rect();
        (client_x as f64 - rect.left()) as f32
    }

    fn schedule(&self) -> Result<(), JsValue> {
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = window()?.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.frame_id.set(Some(id));
        Ok(())
    }

    fn on_frame(&self, time: f64) {
        self.frame_id.set(None);
        let delta = self
            .last_time
            .replace(Some(time))
            .map_or(FIRST_FRAME_MS, |last| time - last);
        let input = self.input.borrow_mut().take();

        let result = {
            let mut engine = self.engine.borrow_mut();
            let Some(engine) = engine.as_mut() else {
                return;
            };
            let mut surface = self.surface.borrow_mut();
            engine.frame(&input, delta, &mut *surface, &self.assets)
        };

        match result {
            FrameResult::Continue => {
                if let Err(e) = self.schedule() {
                    log::error!("Cannot schedule next frame: {e:?}");
                }
            }
            FrameResult::GameOver { .. } | FrameResult::Halted => {
                self.listeners.borrow_mut().clear();
                // The host may unmount from inside its callback
                if let Some(score) = self.final_score.take() {
                    let callback = self.on_game_over.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback(score);
                    }
                }
            }
        }
    }

    fn on_resize(&self) {
        let size = self.surface.borrow_mut().fit_to_display();
        match size {
            Ok((w, h)) => {
                if let Some(engine) = self.engine.borrow_mut().as_mut() {
                    engine.resize(w, h);
                }
            }
            Err(e) => log::warn!("Resize failed: {e:?}"),
        }
    }

    /// Release the frame loop, listeners and engine without reporting a score
    fn shutdown(&self) {
        if let Some(id) = self.frame_id.take() {
            if let Ok(window) = window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        self.listeners.borrow_mut().clear();
        self.on_game_over.borrow_mut().take();
        self.frame_callback.borrow_mut().take();
        if let Some(engine) = self.engine.borrow_mut().take() {
            engine.unmount();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn attach_listeners(session: &Rc<Session>) -> Result<Vec<Listener>, JsValue> {
    let win: EventTarget = window()?.into();
    let canvas: EventTarget = session.canvas.clone().into();
    let control = session.control.clone();
    let mut listeners = Vec::new();

    let weak = Rc::downgrade(session);
    listeners.push(Listener::new(&win, "keydown", move |event| {
        let (Some(session), Some(event)) = (weak.upgrade(), event.dyn_ref::<KeyboardEvent>())
        else {
            return;
        };
        if let Some(intent) = intent_for_key(&event.code()) {
            event.prevent_default();
            session.unlock_audio();
            session.push(intent);
        }
    })?);

    let weak = Rc::downgrade(session);
    let press = control.clone();
    listeners.push(Listener::new(&canvas, "mousedown", move |event| {
        let (Some(session), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
            return;
        };
        session.unlock_audio();
        session.push(intent_for_press(&press, event.offset_x() as f32));
    })?);

    let weak = Rc::downgrade(session);
    let drag = control.clone();
    listeners.push(Listener::new(&canvas, "mousemove", move |event| {
        let (Some(session), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
            return;
        };
        if let Some(intent) = intent_for_drag(&drag, event.offset_x() as f32) {
            session.push(intent);
        }
    })?);

    let weak = Rc::downgrade(session);
    let press = control.clone();
    listeners.push(Listener::new(&canvas, "touchstart", move |event| {
        let (Some(session), Some(touch_event)) = (weak.upgrade(), event.dyn_ref::<TouchEvent>())
        else {
            return;
        };
        touch_event.prevent_default();
        session.unlock_audio();
        if let Some(touch) = touch_event.touches().get(0) {
            let x = session.local_x(touch.client_x());
            session.push(intent_for_press(&press, x));
        }
    })?);

    let weak = Rc::downgrade(session);
    let drag = control;
    listeners.push(Listener::new(&canvas, "touchmove", move |event| {
        let (Some(session), Some(touch_event)) = (weak.upgrade(), event.dyn_ref::<TouchEvent>())
        else {
            return;
        };
        touch_event.prevent_default();
        if let Some(touch) = touch_event.touches().get(0) {
            let x = session.local_x(touch.client_x());
            if let Some(intent) = intent_for_drag(&drag, x) {
                session.push(intent);
            }
        }
    })?);

    let weak = Rc::downgrade(session);
    listeners.push(Listener::new(&win, "resize", move |_| {
        if let Some(session) = weak.upgrade() {
            session.on_resize();
        }
    })?);

    Ok(listeners)
}

/// Mount `ruleset` on the canvas with id `canvas_id`.
///
/// `on_game_over` runs once with the final score if the session ends in a
/// collision, and never if it is unmounted first.
pub fn mount_with(
    canvas_id: &str,
    ruleset: Ruleset,
    player_photo: Option<String>,
    background: Option<String>,
    settings: &Settings,
    on_game_over: Box<dyn FnOnce(u64)>,
) -> Result<GameHandle, JsValue> {
    let canvas: HtmlCanvasElement = window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;

    let surface = CanvasSurface::new(canvas.clone())?;
    let (width, height) = surface.size();

    let final_score = Rc::new(Cell::new(None));
    let report = Rc::clone(&final_score);
    let control = ruleset.control.clone();
    let engine = Engine::mount(
        ruleset,
        width,
        height,
        session_seed(),
        AudioManager::with_settings(settings),
        move |score| report.set(Some(score)),
    )
    .with_render_options(settings.render_options());

    let assets = Assets::default();
    if let Some(photo) = player_photo.as_deref() {
        swap_image(&assets.avatar, photo);
    }
    if let Some(background) = background.as_deref() {
        swap_image(&assets.background, background);
    }

    let session = Rc::new(Session {
        engine: RefCell::new(Some(engine)),
        surface: RefCell::new(surface),
        canvas,
        assets,
        input: RefCell::new(InputQueue::default()),
        control,
        listeners: RefCell::new(Vec::new()),
        frame_callback: RefCell::new(None),
        frame_id: Cell::new(None),
        last_time: Cell::new(None),
        audio_unlocked: Cell::new(false),
        final_score,
        on_game_over: RefCell::new(Some(on_game_over)),
    });

    let weak: Weak<Session> = Rc::downgrade(&session);
    let frame = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
        if let Some(session) = weak.upgrade() {
            session.on_frame(time);
        }
    });
    *session.frame_callback.borrow_mut() = Some(frame);
    *session.listeners.borrow_mut() = attach_listeners(&session)?;
    session.schedule()?;

    log::info!("Game mounted on #{canvas_id} ({width}x{height})");
    Ok(GameHandle {
        session: Some(session),
    })
}

/// Load `uri` into `slot`, or fall back to the drawn default when it is empty
fn swap_image(slot: &AssetSlot<HtmlImageElement>, uri: &str) {
    if uri.is_empty() {
        slot.clear();
    } else {
        load_image(slot, uri);
    }
}

/// Handle returned to the page for a mounted game
#[wasm_bindgen]
pub struct GameHandle {
    session: Option<Rc<Session>>,
}

#[wasm_bindgen]
impl GameHandle {
    /// Swap the avatar photo; the old one stays until the new one decodes
    pub fn set_player_photo(&self, uri: &str) {
        if let Some(session) = &self.session {
            swap_image(&session.assets.avatar, uri);
        }
    }

    /// Swap the scrolling backdrop; an empty uri brings back the drawn scenery
    pub fn set_background(&self, uri: &str) {
        if let Some(session) = &self.session {
            swap_image(&session.assets.background, uri);
        }
    }

    /// Stop the game and release everything. The game-over callback will not run.
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.engine.borrow().as_ref().map(|e| e.is_running()))
            .unwrap_or(false)
    }

    pub fn score(&self) -> f64 {
        self.session
            .as_ref()
            .and_then(|s| s.engine.borrow().as_ref().map(|e| e.state().score as f64))
            .unwrap_or(0.0)
    }
}

fn js_callback(on_game_over: js_sys::Function) -> Box<dyn FnOnce(u64)> {
    Box::new(move |score| {
        if let Err(e) = on_game_over.call1(&JsValue::NULL, &JsValue::from_f64(score as f64)) {
            log::error!("onGameOver threw: {e:?}");
        }
    })
}

/// Mount a built-in variant ("pipe-flyer", "falling-runner" or "floaty")
#[wasm_bindgen]
pub fn mount_game(
    canvas_id: &str,
    variant: &str,
    player_photo: Option<String>,
    background: Option<String>,
    on_game_over: js_sys::Function,
) -> Result<GameHandle, JsValue> {
    let variant = Variant::parse(variant).map_err(to_js)?;
    mount_with(
        canvas_id,
        variant.ruleset(),
        player_photo,
        background,
        &Settings::load(),
        js_callback(on_game_over),
    )
}

/// Mount a game described by a ruleset JSON document
#[wasm_bindgen]
pub fn mount_custom_game(
    canvas_id: &str,
    ruleset_json: &str,
    player_photo: Option<String>,
    background: Option<String>,
    on_game_over: js_sys::Function,
) -> Result<GameHandle, JsValue> {
    let ruleset = Ruleset::from_json(ruleset_json).map_err(to_js)?;
    mount_with(
        canvas_id,
        ruleset,
        player_photo,
        background,
        &Settings::load(),
        js_callback(on_game_over),
    )
}
