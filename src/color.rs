use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Categorical palette generator
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

// ---------------------------------------------------------------------------
// Color mapping: outcome value → Color32
// ---------------------------------------------------------------------------

/// Maps the unique outcome values to distinct colours, so a group keeps its
/// colour no matter which filter is active.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the sorted unique values of a column.
    pub fn new(unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given outcome value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging colormap for the correlation heatmap
// ---------------------------------------------------------------------------

/// Blue–white–red map for correlation coefficients in [-1, 1]. NaN (the
/// degenerate empty/single-row view) renders as neutral gray.
pub fn diverging(value: f64) -> Color32 {
    if !value.is_finite() {
        return Color32::GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;

    let cold = LinSrgb::new(0.230_f32, 0.299, 0.754);
    let warm = LinSrgb::new(0.706_f32, 0.016, 0.150);
    let neutral = LinSrgb::new(0.865_f32, 0.865, 0.865);

    let mixed = if t < 0.0 {
        neutral.mix(cold, -t)
    } else {
        neutral.mix(warm, t)
    };
    let rgb: Srgb<f32> = Srgb::from_linear(mixed);
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Black or white, whichever reads better on the given fill.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colors_are_distinct() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn color_map_is_stable_and_falls_back_to_gray() {
        let values: BTreeSet<CellValue> =
            [CellValue::Integer(0), CellValue::Integer(1)].into_iter().collect();
        let map = ColorMap::new(&values);
        assert_eq!(
            map.color_for(&CellValue::Integer(0)),
            map.color_for(&CellValue::Integer(0))
        );
        assert_ne!(
            map.color_for(&CellValue::Integer(0)),
            map.color_for(&CellValue::Integer(1))
        );
        assert_eq!(map.color_for(&CellValue::Integer(7)), Color32::GRAY);
    }

    #[test]
    fn diverging_endpoints_and_nan() {
        let negative = diverging(-1.0);
        let positive = diverging(1.0);
        // strong negative correlation is blue-ish, strong positive red-ish
        assert!(negative.b() > negative.r());
        assert!(positive.r() > positive.b());
        assert_eq!(diverging(f64::NAN), Color32::GRAY);
    }
}
