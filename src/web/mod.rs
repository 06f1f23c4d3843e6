//! Browser driver for the splash page.
//!
//! Owns the mounted [`Shell`], its DOM and the rain background in a
//! thread-local, and keeps exactly one browser `setTimeout` pending for the
//! shell's earliest deadline. The timeout is cleared before every re-arm and on
//! teardown, so nothing calls back into a stopped splash.

mod dom;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Window, window};

use crate::config::SplashConfig;
use crate::rain::canvas::RainBackground;
use crate::shell::Shell;
use crate::shell::view::render;

struct Splash {
    win: Window,
    /// `performance.now()` at mount; shell time is relative to it.
    origin: f64,
    shell: Shell,
    error: Rc<Cell<bool>>,
    page: dom::Page,
    rain: Option<RainBackground>,
    timeout: Option<i32>,
    on_timeout: Closure<dyn FnMut()>,
}

thread_local! {
    static SPLASH: RefCell<Option<Splash>> = const { RefCell::new(None) };
}

fn performance_now(win: &Window) -> f64 {
    win.performance().map(|p| p.now()).unwrap_or(0.0)
}

impl Splash {
    fn mount(config: SplashConfig) -> Result<Self, JsValue> {
        let shell = Shell::new(config.clone())?;
        let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
        let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let page = dom::Page::build(&doc)?;
        let error = Rc::new(Cell::new(false));
        let rain = match RainBackground::mount(&win, page.root(), &config, error.clone()) {
            Ok(rain) => rain,
            Err(e) => {
                page.remove();
                return Err(e);
            }
        };
        let on_timeout = Closure::wrap(Box::new(splash_timeout_fired) as Box<dyn FnMut()>);

        let splash = Self {
            origin: performance_now(&win),
            win,
            shell,
            error,
            page,
            rain: Some(rain),
            timeout: None,
            on_timeout,
        };
        splash.page.apply(&render(splash.shell.state()))?;
        Ok(splash)
    }

    fn now(&self) -> f64 {
        performance_now(&self.win) - self.origin
    }

    /// Advance the shell to the current time, push changes to the page and the
    /// rain, then re-arm the browser timeout.
    fn pump(&mut self) {
        let now = self.now();
        if self.shell.advance(now) {
            let state = self.shell.state();
            self.error.set(state.error);
            if let Err(e) = self.page.apply(&render(state)) {
                log::warn!("failed to update splash markup: {e:?}");
            }
        }
        self.rearm(now);
    }

    fn rearm(&mut self, now: f64) {
        if let Some(id) = self.timeout.take() {
            self.win.clear_timeout_with_handle(id);
        }
        let Some(at) = self.shell.next_deadline() else {
            return;
        };
        let delay = (at - now).max(0.0).ceil() as i32;
        match self.win.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.on_timeout.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => self.timeout = Some(id),
            Err(e) => log::warn!("could not schedule splash timer: {e:?}"),
        }
    }
}

impl Drop for Splash {
    fn drop(&mut self) {
        if let Some(id) = self.timeout.take() {
            self.win.clear_timeout_with_handle(id);
        }
        self.shell.unmount();
        self.rain.take();
        self.page.remove();
        log::info!("splash stopped after {:.0}ms", self.now());
    }
}

fn splash_timeout_fired() {
    SPLASH.with(|cell| {
        if let Some(splash) = cell.borrow_mut().as_mut() {
            splash.timeout = None;
            splash.pump();
        }
    });
}

/// Mount `config`, replacing any splash that is already running.
pub(crate) fn start(config: SplashConfig) -> Result<(), JsValue> {
    config.validate()?;
    stop();
    let mut splash = Splash::mount(config)?;
    splash.pump();
    log::info!("splash mounted");
    SPLASH.with(|cell| cell.replace(Some(splash)));
    Ok(())
}

pub(crate) fn stop() {
    // Drop outside the borrow: teardown must not run while SPLASH is borrowed.
    let splash = SPLASH.with(|cell| cell.borrow_mut().take());
    drop(splash);
}

#[cfg(feature = "serde_json")]
pub(crate) fn snapshot() -> Option<String> {
    SPLASH.with(|cell| {
        let cell = cell.borrow();
        let splash = cell.as_ref()?;
        serde_json::to_string(splash.shell.state()).ok()
    })
}
