// Rain background model tests: resizing, degenerate surfaces and restyling.

use digital_rain_splash::rain::{FADE_FILL, column_count};
use digital_rain_splash::{RainField, RainStyle, ScriptedRandom, SplashConfig, Surface, XorShift};

#[derive(Default)]
struct CountingSurface {
    fades: usize,
    glyphs: Vec<String>,
    tints: Vec<String>,
}

impl Surface for CountingSurface {
    fn fade(&mut self, fill: &str, _width: f64, _height: f64) {
        assert_eq!(fill, FADE_FILL);
        self.fades += 1;
    }
    fn set_glyph_style(&mut self, tint: &str, _font: &str) {
        self.tints.push(tint.to_string());
    }
    fn draw_glyph(&mut self, glyph: &str, _x: f64, _y: f64) {
        self.glyphs.push(glyph.to_string());
    }
}

#[test]
fn resize_always_matches_ceil_of_width() {
    let mut field = RainField::new(&SplashConfig::default());
    let mut rng = XorShift::new(7);
    for width in [1.0, 13.0, 14.0, 15.0, 799.0, 1920.0, 2560.5] {
        field.resize(width, 600.0, &mut rng);
        assert_eq!(field.column_count(), (width / 14.0_f64).ceil() as usize, "width {width}");
        assert_eq!(field.column_count(), column_count(width, 14.0));
        assert_eq!((field.width(), field.height()), (width, 600.0));
        assert_eq!(field.cell_size(), 14.0);
        assert!(field.cursors().iter().all(|c| (-100.0..=0.0).contains(c)));
    }
}

#[test]
fn resize_mid_animation_reseeds_and_zero_width_is_harmless() {
    let mut field = RainField::new(&SplashConfig::default());
    let mut rng = XorShift::new(99);
    let mut surface = CountingSurface::default();
    field.resize(280.0, 400.0, &mut rng);
    // Past 100 frames every column has entered the surface.
    for _ in 0..120 {
        field.step(false, &mut rng, &mut surface);
    }
    assert!(field.cursors().iter().all(|c| *c > 0.0));

    field.resize(140.0, 400.0, &mut rng);
    assert_eq!(field.column_count(), 10);
    assert!(field.cursors().iter().all(|c| *c <= 0.0));

    field.resize(0.0, 0.0, &mut rng);
    let fades = surface.fades;
    field.step(true, &mut rng, &mut surface);
    assert_eq!(field.column_count(), 0);
    assert_eq!(surface.fades, fades, "zero surface must not paint");

    field.resize(-20.0, 300.0, &mut rng);
    assert_eq!(field.column_count(), 0);
}

#[test]
fn cursors_only_increment_or_reset() {
    let mut field = RainField::new(&SplashConfig::default());
    let mut rng = XorShift::new(1234);
    let mut surface = CountingSurface::default();
    field.resize(140.0, 70.0, &mut rng);
    let mut resets = 0;
    for _ in 0..2_000 {
        let before = field.cursors().to_vec();
        field.step(false, &mut rng, &mut surface);
        for (b, a) in before.iter().zip(field.cursors()) {
            if *a == 1.0 && *b + 1.0 != 1.0 {
                resets += 1;
            } else {
                assert_eq!(*a, *b + 1.0);
            }
        }
    }
    assert!(resets > 0, "overflowing columns should eventually restart");
}

#[test]
fn error_flag_switches_tint_and_alphabet_each_frame() {
    let mut field = RainField::new(&SplashConfig::default());
    field.resize(56.0, 500.0, &mut ScriptedRandom::constant(0.5));
    let mut rng = ScriptedRandom::new(vec![0.9, 0.1]);
    let mut surface = CountingSurface::default();

    field.step(false, &mut rng, &mut surface);
    field.step(true, &mut rng, &mut surface);
    field.step(false, &mut rng, &mut surface);

    assert_eq!(
        surface.tints,
        vec![RainStyle::NOMINAL.tint, RainStyle::FAULT.tint, RainStyle::NOMINAL.tint]
    );
    assert_eq!(&surface.glyphs[0..4], &["0", "1", "0", "1"]);
    assert_eq!(&surface.glyphs[4..8], &["ERR", "!!", "ERR", "!!"]);
    assert_eq!(field.cursors(), &[-47.0, -47.0, -47.0, -47.0]);
}
