//! Digital rain model.
//!
//! `RainField` owns the column cursors of the background and advances them one
//! frame at a time. Drawing goes through the [`Surface`] trait so the frame
//! algorithm runs the same against the browser canvas ([`canvas`]) and against
//! the recording surface used by the tests.
//!
//! Cursors are measured in cells: a column is drawn at `cursor * cell_size`.
//! They only ever grow by one per frame or drop back to zero once the column has
//! fallen past the bottom edge, and only with a small probability per frame, so
//! columns restart out of step with each other.

pub mod canvas;

use crate::config::SplashConfig;
use crate::random::RandomSource;

/// Translucent backdrop painted every frame; leaves a fading trail.
pub const FADE_FILL: &str = "rgba(13, 13, 13, 0.1)";

/// Per-frame styling derived from the error flag. Never stored; recomputed
/// from the flag on every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainStyle {
    pub tint: &'static str,
    /// `(heads, tails)` of the per-column coin flip.
    pub alphabet: (&'static str, &'static str),
}

impl RainStyle {
    pub const NOMINAL: RainStyle =
        RainStyle { tint: "rgba(0, 243, 255, 0.12)", alphabet: ("0", "1") };
    pub const FAULT: RainStyle = RainStyle { tint: "rgba(255, 0, 0, 0.2)", alphabet: ("ERR", "!!") };

    pub fn for_mode(error: bool) -> RainStyle {
        if error { Self::FAULT } else { Self::NOMINAL }
    }
}

/// Minimal drawing target for a rain frame.
pub trait Surface {
    /// Paint `fill` over the whole `width x height` area.
    fn fade(&mut self, fill: &str, width: f64, height: f64);
    /// Select tint and font for the following glyphs.
    fn set_glyph_style(&mut self, tint: &str, font: &str);
    fn draw_glyph(&mut self, glyph: &str, x: f64, y: f64);
}

/// Number of glyph columns covering `width`. Degenerate widths give none.
pub fn column_count(width: f64, cell_size: f64) -> usize {
    let cols = (width / cell_size).ceil();
    if cols.is_finite() && cols > 0.0 { cols as usize } else { 0 }
}

pub struct RainField {
    cell_size: f64,
    reset_threshold: f64,
    glyph_threshold: f64,
    seed_min: f64,
    width: f64,
    height: f64,
    cursors: Vec<f64>,
    font: String,
}

impl RainField {
    /// An empty field; call [`RainField::resize`] before the first frame.
    pub fn new(config: &SplashConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            reset_threshold: config.reset_threshold,
            glyph_threshold: config.glyph_threshold,
            seed_min: config.seed_min,
            width: 0.0,
            height: 0.0,
            cursors: Vec::new(),
            font: format!("{}px monospace", config.cell_size),
        }
    }

    /// Adopt new surface dimensions, recompute the column count and reseed every
    /// cursor in `(seed_min, 0]` so drops enter staggered.
    pub fn resize(&mut self, width: f64, height: f64, rng: &mut impl RandomSource) {
        self.width = width;
        self.height = height;
        let cols = column_count(width, self.cell_size);
        self.cursors.clear();
        self.cursors.extend((0..cols).map(|_| rng.next_f64() * self.seed_min));
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn column_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn cursors(&self) -> &[f64] {
        &self.cursors
    }

    /// Draw one frame and advance every column by one cell.
    ///
    /// `error` is read fresh on every call; switching it restyles the next frame
    /// without touching the cursors.
    pub fn step(&mut self, error: bool, rng: &mut impl RandomSource, surface: &mut impl Surface) {
        if !(self.width > 0.0 && self.height > 0.0) {
            return;
        }
        surface.fade(FADE_FILL, self.width, self.height);

        let style = RainStyle::for_mode(error);
        surface.set_glyph_style(style.tint, &self.font);

        for (i, cursor) in self.cursors.iter_mut().enumerate() {
            let glyph = if rng.next_f64() > self.glyph_threshold {
                style.alphabet.0
            } else {
                style.alphabet.1
            };
            let y = *cursor * self.cell_size;
            surface.draw_glyph(glyph, i as f64 * self.cell_size, y);
            if y > self.height && rng.next_f64() > self.reset_threshold {
                *cursor = 0.0;
            }
            *cursor += 1.0;
        }
    }
}
