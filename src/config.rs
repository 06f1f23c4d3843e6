//! Tunables for the splash screen.
//!
//! Every timing value is in milliseconds of the shell's logical clock. The
//! defaults reproduce the shipped page: a 1.5 s preloader ramp, a 400 ms
//! overlay fade and a 15 s fault / recovery rhythm.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Shortest accepted delay. Timers re-arm relative to the deadline that fired
/// them, so every delay has to move the clock forward by a whole millisecond.
pub const MIN_DELAY_MS: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cell size must be a positive number of pixels, got {0}")]
    CellSize(f64),
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("seed range must be negative, got {0}")]
    SeedRange(f64),
    #[error("{0} must be non-zero")]
    ZeroTiming(&'static str),
    #[error("{name} must be a finite delay of at least 1ms, got {value}")]
    Delay { name: &'static str, value: f64 },
    #[cfg(feature = "serde_json")]
    #[error("malformed config json: {0}")]
    Json(String),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplashConfig {
    /// Glyph cell edge in logical pixels; also the canvas font size.
    pub cell_size: f64,
    /// A column past the bottom restarts when a draw exceeds this value.
    pub reset_threshold: f64,
    /// Coin flip threshold between the two glyphs of an alphabet.
    pub glyph_threshold: f64,
    /// Cursors are seeded uniformly in `(seed_min, 0]`.
    pub seed_min: f64,
    pub progress_interval_ms: f64,
    pub progress_step: u32,
    pub reveal_delay_ms: f64,
    pub fault_delay_ms: f64,
    pub recover_delay_ms: f64,
}

impl From<ConfigError> for JsValue {
    fn from(e: ConfigError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            cell_size: 14.0,
            reset_threshold: 0.975,
            glyph_threshold: 0.5,
            seed_min: -100.0,
            progress_interval_ms: 30.0,
            progress_step: 2,
            reveal_delay_ms: 400.0,
            fault_delay_ms: 15_000.0,
            recover_delay_ms: 15_000.0,
        }
    }
}

impl SplashConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) || !self.cell_size.is_finite() {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        for (name, value) in [
            ("reset_threshold", self.reset_threshold),
            ("glyph_threshold", self.glyph_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        if !(self.seed_min < 0.0) {
            return Err(ConfigError::SeedRange(self.seed_min));
        }
        if self.progress_step == 0 {
            return Err(ConfigError::ZeroTiming("progress_step"));
        }
        for (name, value) in [
            ("progress_interval_ms", self.progress_interval_ms),
            ("reveal_delay_ms", self.reveal_delay_ms),
            ("fault_delay_ms", self.fault_delay_ms),
            ("recover_delay_ms", self.recover_delay_ms),
        ] {
            if !value.is_finite() || value < MIN_DELAY_MS {
                return Err(ConfigError::Delay { name, value });
            }
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON object; absent fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: SplashConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
