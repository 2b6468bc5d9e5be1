use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Tier;

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Badge colour of a tier.
pub fn tier_color(tier: Tier) -> Color32 {
    match tier {
        Tier::T1 => Color32::from_rgb(200, 60, 60),
        Tier::T2 => Color32::from_rgb(220, 150, 40),
        Tier::T3 => Color32::from_rgb(70, 140, 200),
    }
}

// ---------------------------------------------------------------------------
// Color mapping: province → Color32
// ---------------------------------------------------------------------------

/// Maps the unique values of one column (provinces, for map markers) to
/// distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = values.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour of `value`; grey for values the map was not built with.
    pub fn color_for(&self, value: Option<&str>) -> Color32 {
        value
            .and_then(|v| self.mapping.get(v))
            .copied()
            .unwrap_or(self.default_color)
    }
}
