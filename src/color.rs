use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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

// ---------------------------------------------------------------------------
// Color mapping: company name → Color32
// ---------------------------------------------------------------------------

/// Maps company names to distinct, stable colours so a company keeps its
/// colour across queries.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over all company names in the dataset.
    pub fn new(company_names: &[String]) -> Self {
        let palette = generate_palette(company_names.len());
        let mapping: BTreeMap<String, Color32> = company_names
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a company.
    pub fn color_for(&self, company: &str) -> Color32 {
        self.mapping
            .get(company)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct_and_sized() {
        let palette = generate_palette(8);
        assert_eq!(palette.len(), 8);
        for (i, a) in palette.iter().enumerate() {
            for b in palette.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn color_is_stable_per_company() {
        let names = vec!["A Bank".to_string(), "B Bank".to_string()];
        let map = ColorMap::new(&names);
        assert_eq!(map.color_for("A Bank"), map.color_for("A Bank"));
        assert_ne!(map.color_for("A Bank"), map.color_for("B Bank"));
        assert_eq!(map.color_for("unknown"), Color32::GRAY);
    }
}
