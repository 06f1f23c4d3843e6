//! Digital rain splash screen.
//!
//! A full-viewport canvas of falling glyphs behind a 1.5 s preloader and a
//! content panel that periodically plays a scripted "critical failure" and
//! recovers from it. The logic lives in pure modules that run natively:
//! - [`rain`]: column cursors and the per-frame draw algorithm
//! - [`shell`]: preloader / stage / fault timers and the state-to-view mapping
//!
//! The `web` module binds both to the DOM and is reached through the exported
//! `start_splash()` / `stop_splash()` functions.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod rain;
pub mod random;
pub mod shell;
mod web;

pub use config::{ConfigError, SplashConfig};
pub use rain::{RainField, RainStyle, Surface};
pub use random::{RandomSource, ScriptedRandom, XorShift};
pub use shell::view::{ContentPanel, LoadingOverlay, Mood, Screen, View, render};
pub use shell::{Shell, ShellState, Stage, TimerKind, TimerSet};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

/// Mount the splash with default timings. Restarts it if already running.
#[wasm_bindgen]
pub fn start_splash() -> Result<(), JsValue> {
    web::start(SplashConfig::default())
}

/// Mount the splash from a JSON object of [`SplashConfig`] fields; missing
/// fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_splash_with_config(json: &str) -> Result<(), JsValue> {
    let config = SplashConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(config)
}

/// Tear down timers, animation loop, listeners and markup. No-op when idle.
#[wasm_bindgen]
pub fn stop_splash() {
    web::stop();
}

/// Current shell state as JSON, or an empty string when nothing is mounted.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn splash_snapshot() -> String {
    web::snapshot().unwrap_or_default()
}
