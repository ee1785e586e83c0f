use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Sequential palette generator
// ---------------------------------------------------------------------------

/// Generates `n` colours along a dark-purple → teal → yellow ramp, darkest
/// first (a viridis-like sweep through hue and lightness).
pub fn sequential_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
            let hue = 280.0 - t * 220.0;
            let hsl = Hsl::new(hue, 0.65, 0.25 + t * 0.40);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging scale: numeric value → Color32
// ---------------------------------------------------------------------------

/// Blue → light grey → red ("coolwarm") scale over a numeric range.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

const COOL: (f32, f32, f32) = (59.0, 76.0, 192.0);
const NEUTRAL: (f32, f32, f32) = (221.0, 221.0, 221.0);
const WARM: (f32, f32, f32) = (180.0, 4.0, 38.0);

fn linear((r, g, b): (f32, f32, f32)) -> LinSrgb {
    Srgb::new(r / 255.0, g / 255.0, b / 255.0).into_linear()
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale { min, max }
    }

    /// Position of `value` within the range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.normalize(value) as f32;
        let mixed = if t < 0.5 {
            linear(COOL).mix(linear(NEUTRAL), t * 2.0)
        } else {
            linear(NEUTRAL).mix(linear(WARM), (t - 0.5) * 2.0)
        };
        to_color32(Srgb::from_linear(mixed))
    }
}
