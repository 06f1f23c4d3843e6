// Browser binding for the rain: a full-viewport canvas, a resize listener and an
// animation-frame loop. Everything registered here is released in `Drop`.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

use super::{RainField, Surface};
use crate::config::SplashConfig;
use crate::random::XorShift;

pub const CANVAS_ID: &str = "drs-rain-canvas";

/// 2d context adapter for [`Surface`].
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface<'_> {
    fn fade(&mut self, fill: &str, width: f64, height: f64) {
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn set_glyph_style(&mut self, tint: &str, font: &str) {
        self.ctx.set_fill_style_str(tint);
        self.ctx.set_font(font);
    }

    fn draw_glyph(&mut self, glyph: &str, x: f64, y: f64) {
        self.ctx.fill_text(glyph, x, y).ok();
    }
}

struct RainLoop {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: RainField,
    rng: XorShift,
}

impl RainLoop {
    fn sync_to_viewport(&mut self, win: &Window) {
        let width = viewport_dim(win.inner_width());
        let height = viewport_dim(win.inner_height());
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.field.resize(width, height, &mut self.rng);
        log::debug!("rain resized to {width}x{height}, {} columns", self.field.column_count());
    }

    fn frame(&mut self, error: bool) {
        let mut surface = CanvasSurface::new(&self.ctx);
        self.field.step(error, &mut self.rng, &mut surface);
    }
}

fn viewport_dim(v: Result<JsValue, JsValue>) -> f64 {
    v.ok().and_then(|v| v.as_f64()).filter(|v| *v > 0.0).unwrap_or(0.0)
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Mounted rain background. Dropping it cancels the pending frame, detaches
/// the resize listener and removes the canvas.
pub struct RainBackground {
    win: Window,
    canvas: HtmlCanvasElement,
    frame_cb: FrameCallback,
    frame_id: Rc<Cell<Option<i32>>>,
    resize_cb: Closure<dyn FnMut(web_sys::Event)>,
}

impl RainBackground {
    /// Create (or reuse) the background canvas inside `parent` and start
    /// animating. The loop reads `error` at every frame.
    pub fn mount(
        win: &Window,
        parent: &Element,
        config: &SplashConfig,
        error: Rc<Cell<bool>>,
    ) -> Result<Self, JsValue> {
        let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
            el.dyn_into()?
        } else {
            let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
            c.set_id(CANVAS_ID);
            c.set_attribute(
                "style",
                "position:fixed; inset:0; width:100%; height:100%; z-index:0; display:block;",
            )?;
            parent.append_child(&c)?;
            c
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let state = Rc::new(RefCell::new(RainLoop {
            canvas: canvas.clone(),
            ctx,
            field: RainField::new(config),
            rng: XorShift::from_entropy(),
        }));
        state.borrow_mut().sync_to_viewport(win);

        let resize_cb = {
            let state = state.clone();
            let win = win.clone();
            Closure::wrap(Box::new(move |_evt: web_sys::Event| {
                state.borrow_mut().sync_to_viewport(&win);
            }) as Box<dyn FnMut(_)>)
        };
        win.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())?;

        let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
        let frame_id = Rc::new(Cell::new(None));
        {
            let f = frame_cb.clone();
            let id = frame_id.clone();
            let win = win.clone();
            *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
                state.borrow_mut().frame(error.get());
                id.set(schedule_frame(&win, &f));
            }) as Box<dyn FnMut(f64)>));
        }
        frame_id.set(schedule_frame(win, &frame_cb));

        Ok(Self { win: win.clone(), canvas, frame_cb, frame_id, resize_cb })
    }
}

fn schedule_frame(win: &Window, cb: &FrameCallback) -> Option<i32> {
    let cb = cb.borrow();
    let cb = cb.as_ref()?;
    win.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
}

impl Drop for RainBackground {
    fn drop(&mut self) {
        if let Some(id) = self.frame_id.take() {
            self.win.cancel_animation_frame(id).ok();
        }
        // The frame closure holds a handle to its own slot; clearing the slot
        // breaks the cycle so the closure and loop state are freed.
        self.frame_cb.borrow_mut().take();
        self.win
            .remove_event_listener_with_callback("resize", self.resize_cb.as_ref().unchecked_ref())
            .ok();
        self.canvas.remove();
        log::debug!("rain background torn down");
    }
}
