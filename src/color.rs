use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Sequential scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// Viridis anchor points, dark purple → yellow.
const VIRIDIS: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.229, 0.322, 0.546),
    (0.128, 0.567, 0.551),
    (0.369, 0.789, 0.383),
    (0.993, 0.906, 0.144),
];

/// Map `t` in `[0, 1]` onto the viridis scale. NaN maps to grey.
pub fn viridis(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::GRAY;
    }
    let t = t.clamp(0.0, 1.0) as f32 * (VIRIDIS.len() - 1) as f32;
    let lo = (t.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = t - lo as f32;

    let anchor = |(r, g, b): (f32, f32, f32)| Srgb::new(r, g, b).into_linear::<f32>();
    let a: LinSrgb = anchor(VIRIDIS[lo]);
    let b: LinSrgb = anchor(VIRIDIS[lo + 1]);
    to_color32(Srgb::from_linear(a.mix(b, frac)))
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the values of one categorical column to distinct colours, so a
/// product line keeps its colour across every chart.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from a column's unique values.
    pub fn new(unique_values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
