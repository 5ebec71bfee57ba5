//! Typography tokens.

use horizon_trellis_core::Font;
use serde::{Deserialize, Serialize};

/// A role in the type scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    DisplayLarge,
    DisplayMedium,
    DisplaySmall,
    HeadlineLarge,
    HeadlineMedium,
    HeadlineSmall,
    TitleLarge,
    TitleMedium,
    TitleSmall,
    LabelLarge,
    LabelMedium,
    LabelSmall,
    BodyLarge,
    BodyMedium,
    BodySmall,
}

/// Point sizes keyed by [`FontRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSizes {
    pub display_large: i32,
    pub display_medium: i32,
    pub display_small: i32,
    pub headline_large: i32,
    pub headline_medium: i32,
    pub headline_small: i32,
    pub title_large: i32,
    pub title_medium: i32,
    pub title_small: i32,
    pub label_large: i32,
    pub label_medium: i32,
    pub label_small: i32,
    pub body_large: i32,
    pub body_medium: i32,
    pub body_small: i32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            display_large: 57,
            display_medium: 45,
            display_small: 36,
            headline_large: 32,
            headline_medium: 28,
            headline_small: 24,
            title_large: 22,
            title_medium: 16,
            title_small: 14,
            label_large: 14,
            label_medium: 12,
            label_small: 11,
            body_large: 16,
            body_medium: 14,
            body_small: 12,
        }
    }
}

impl FontSizes {
    pub fn get(&self, role: FontRole) -> i32 {
        match role {
            FontRole::DisplayLarge => self.display_large,
            FontRole::DisplayMedium => self.display_medium,
            FontRole::DisplaySmall => self.display_small,
            FontRole::HeadlineLarge => self.headline_large,
            FontRole::HeadlineMedium => self.headline_medium,
            FontRole::HeadlineSmall => self.headline_small,
            FontRole::TitleLarge => self.title_large,
            FontRole::TitleMedium => self.title_medium,
            FontRole::TitleSmall => self.title_small,
            FontRole::LabelLarge => self.label_large,
            FontRole::LabelMedium => self.label_medium,
            FontRole::LabelSmall => self.label_small,
            FontRole::BodyLarge => self.body_large,
            FontRole::BodyMedium => self.body_medium,
            FontRole::BodySmall => self.body_small,
        }
    }
}

/// The CSS weight scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontWeights {
    pub thin: u16,
    pub light: u16,
    pub regular: u16,
    pub medium: u16,
    pub semi_bold: u16,
    pub bold: u16,
    pub extra_bold: u16,
    pub black: u16,
}

impl Default for FontWeights {
    fn default() -> Self {
        Self {
            thin: 100,
            light: 300,
            regular: 400,
            medium: 500,
            semi_bold: 600,
            bold: 700,
            extra_bold: 800,
            black: 900,
        }
    }
}

/// Line-height multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineHeights {
    pub tight: f64,
    pub normal: f64,
    pub relaxed: f64,
    pub loose: f64,
}

impl Default for LineHeights {
    fn default() -> Self {
        Self {
            tight: 1.2,
            normal: 1.4,
            relaxed: 1.6,
            loose: 1.8,
        }
    }
}

/// Font families and scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub primary_font: String,
    pub secondary_font: String,
    pub monospace_font: String,
    pub sizes: FontSizes,
    pub weights: FontWeights,
    pub line_heights: LineHeights,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            primary_font: "Segoe UI".to_string(),
            secondary_font: "Arial".to_string(),
            monospace_font: "Consolas".to_string(),
            sizes: FontSizes::default(),
            weights: FontWeights::default(),
            line_heights: LineHeights::default(),
        }
    }
}

impl Typography {
    /// A font in the primary family.
    pub fn font(&self, point_size: i32, weight: u16) -> Font {
        Font::new(self.primary_font.clone(), point_size).with_weight(weight)
    }

    /// The regular-weight font for a role in the type scale.
    pub fn font_for(&self, role: FontRole) -> Font {
        self.font(self.sizes.get(role), self.weights.regular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let typography: Typography = serde_json::from_str(
            r#"{"primaryFont": "Inter", "sizes": {"bodyMedium": 15}, "weights": {"semiBold": 650}}"#,
        )
        .unwrap();
        assert_eq!(typography.primary_font, "Inter");
        assert_eq!(typography.secondary_font, "Arial");
        assert_eq!(typography.sizes.body_medium, 15);
        assert_eq!(typography.sizes.body_large, 16);
        assert_eq!(typography.weights.semi_bold, 650);
        assert_eq!(typography.line_heights.relaxed, 1.6);
    }

    #[test]
    fn test_fonts_use_primary_family() {
        let typography = Typography::default();
        let font = typography.font_for(FontRole::TitleLarge);
        assert_eq!(font.family, "Segoe UI");
        assert_eq!(font.point_size, 22);
        assert_eq!(font.weight, 400);
        assert!(typography.font(14, 950).weight <= 900);
    }
}
