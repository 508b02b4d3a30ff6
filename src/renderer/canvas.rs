//! Canvas 2D backend

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{Color, Surface};

fn css(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({}, {}, {}, {})",
        (r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        a.clamp(0.0, 1.0)
    )
}

/// A canvas element and its 2D context, drawn in CSS pixels
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("unexpected 2d context type"))?;
        let mut surface = Self {
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
        };
        surface.fit_to_display()?;
        Ok(surface)
    }

    /// Match the backing store to the element's displayed size and the
    /// device pixel ratio. Returns the new logical size.
    pub fn fit_to_display(&mut self) -> Result<(f32, f32), JsValue> {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let client_w = self.canvas.client_width().max(1);
        let client_h = self.canvas.client_height().max(1);
        self.canvas.set_width((client_w as f64 * dpr) as u32);
        self.canvas.set_height((client_h as f64 * dpr) as u32);
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
        self.width = client_w as f32;
        self.height = client_h as f32;
        log::debug!("Canvas sized to {client_w}x{client_h} @ {dpr}x");
        Ok((self.width, self.height))
    }

    fn circle_path(&self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .ok();
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.circle_path(center, radius);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(line_width as f64);
        self.circle_path(center, radius);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.set_font(&format!("bold {}px sans-serif", px.round()));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, angle: f32) {
        self.ctx.rotate(angle as f64).ok();
    }

    fn clip_circle(&mut self, center: Vec2, radius: f32) {
        self.circle_path(center, radius);
        self.ctx.clip();
    }

    fn draw_image(&mut self, image: &HtmlImageElement, min: Vec2, size: Vec2) {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                min.x as f64,
                min.y as f64,
                size.x as f64,
                size.y as f64,
            )
            .ok();
    }

    fn image_size(&self, image: &HtmlImageElement) -> Vec2 {
        Vec2::new(image.natural_width() as f32, image.natural_height() as f32)
    }
}
