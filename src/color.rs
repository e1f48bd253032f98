use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::mapping::{EmotionLabel, EmotionRegionWeights, Region};

/// 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Tint used for every illuminated overlay pixel.
pub const DEFAULT_OVERLAY_TINT: Rgb = [255, 0, 255];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lookups used by the report
// ---------------------------------------------------------------------------

/// Display colour of every emotion in the weights table.
pub fn emotion_colors(weights: &EmotionRegionWeights) -> BTreeMap<EmotionLabel, Rgb> {
    weights.iter().map(|(label, p)| (label, p.color)).collect()
}

/// One distinct colour per region, stable across runs, for time-series
/// legends.
pub fn region_legend() -> BTreeMap<Region, Rgb> {
    Region::ALL
        .into_iter()
        .zip(generate_palette(Region::COUNT))
        .collect()
}
