//! The theme bundle and its JSON form.

use std::fmt::Write as _;

use horizon_trellis_core::{Font, Palette};
use serde::{Deserialize, Serialize};

use super::{AnimationTokens, BorderRadius, ColorPalette, FontRole, Shadows, Spacing, Typography};
use crate::error::Result;

/// A named, versioned bundle of design tokens.
///
/// The JSON form uses camelCase keys. Every key is optional and unknown keys
/// are ignored. Corner radii, shadows and motion tokens are not part of the
/// JSON form and keep their defaults.
///
/// ```
/// use horizon_trellis_style::theme::ThemeConfig;
///
/// let theme = ThemeConfig::from_json(r##"{"name": "Ocean", "colors": {"primary": "#006994"}}"##).unwrap();
/// assert_eq!(theme.name, "Ocean");
/// assert_eq!(theme.colors.primary.to_hex(), "#006994");
/// assert!(!theme.is_dark_theme);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub name: String,
    pub version: String,
    /// Set for palettes with light content on dark surfaces.
    pub is_dark_theme: bool,
    pub description: String,
    pub author: String,

    pub colors: ColorPalette,
    pub typography: Typography,
    pub spacing: Spacing,

    #[serde(skip)]
    pub border_radius: BorderRadius,
    #[serde(skip)]
    pub shadows: Shadows,
    #[serde(skip)]
    pub animation: AnimationTokens,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            version: "1.0.0".into(),
            is_dark_theme: false,
            description: "Default light theme".into(),
            author: "Horizon Trellis".into(),
            colors: ColorPalette::default(),
            typography: Typography::default(),
            spacing: Spacing::default(),
            border_radius: BorderRadius::default(),
            shadows: Shadows::default(),
            animation: AnimationTokens::default(),
        }
    }
}

impl ThemeConfig {
    /// The light preset.
    pub fn light() -> Self {
        Self {
            name: "Light".into(),
            description: "Clean light theme".into(),
            ..Self::default()
        }
    }

    /// The dark preset: dark surfaces, light content and muted outlines.
    pub fn dark() -> Self {
        let mut theme = Self {
            name: "Dark".into(),
            is_dark_theme: true,
            description: "Modern dark theme".into(),
            ..Self::default()
        };
        let colors = &mut theme.colors;
        colors.background = hex(0x121212);
        colors.surface = hex(0x1E1E1E);
        colors.surface_variant = hex(0x2D2D2D);
        colors.on_background = hex(0xFFFFFF);
        colors.on_surface = hex(0xFFFFFF);
        colors.on_surface_variant = hex(0xBDBDBD);
        colors.outline = hex(0x424242);
        colors.outline_variant = hex(0x616161);
        colors.divider = hex(0x424242);
        theme
    }

    /// Black surfaces, white content and a yellow primary.
    pub fn high_contrast() -> Self {
        let mut theme = Self {
            name: "High Contrast".into(),
            description: "High contrast theme for accessibility".into(),
            ..Self::default()
        };
        let colors = &mut theme.colors;
        colors.background = hex(0x000000);
        colors.surface = hex(0x000000);
        colors.on_background = hex(0xFFFFFF);
        colors.on_surface = hex(0xFFFFFF);
        colors.primary = hex(0xFFFF00);
        colors.on_primary = hex(0x000000);
        theme
    }

    /// Parse a theme from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a theme from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The application palette for this theme.
    pub fn palette(&self) -> Palette {
        self.colors.to_application_palette()
    }

    /// A font in the primary family.
    pub fn create_font(&self, point_size: i32, weight: u16) -> Font {
        self.typography.font(point_size, weight)
    }

    /// The application default font: the medium body size.
    pub fn default_font(&self) -> Font {
        self.typography.font_for(FontRole::BodyMedium)
    }

    /// A style sheet for `component` built from the current tokens.
    pub fn style_sheet(&self, component: &str) -> String {
        let colors = &self.colors;
        let mut sheet = String::new();
        // Writing into a String cannot fail.
        let _ = write!(
            sheet,
            "{component} {{\n    \
             background-color: {background};\n    \
             color: {foreground};\n    \
             border: 1px solid {border};\n    \
             border-radius: {radius}px;\n    \
             padding: {padding}px;\n    \
             font-family: '{family}';\n    \
             font-size: {size}pt;\n\
             }}\n\
             {component}:hover {{\n    background-color: {hover};\n}}\n\
             {component}:pressed {{\n    background-color: {pressed};\n}}\n",
            background = colors.surface.to_hex(),
            foreground = colors.on_surface.to_hex(),
            border = colors.outline.to_hex(),
            radius = self.border_radius.md,
            padding = self.spacing.md,
            family = self.typography.primary_font,
            size = self.typography.sizes.body_medium,
            hover = colors.hover.to_hex(),
            pressed = colors.pressed.to_hex(),
        );
        sheet
    }
}

fn hex(rgb: u32) -> horizon_trellis_core::Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    horizon_trellis_core::Color::from_rgb8(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::{Color, ColorRole};

    #[test]
    fn test_presets() {
        let dark = ThemeConfig::dark();
        assert!(dark.is_dark_theme);
        assert_eq!(dark.colors.background, Color::from_rgb8(0x12, 0x12, 0x12));
        assert_eq!(dark.colors.on_surface, Color::WHITE);
        assert_eq!(dark.colors.primary, ThemeConfig::light().colors.primary);

        let contrast = ThemeConfig::high_contrast();
        assert_eq!(contrast.name, "High Contrast");
        assert_eq!(contrast.colors.primary, Color::from_rgb8(255, 255, 0));
        assert_eq!(contrast.palette().color(ColorRole::Window), Color::BLACK);
    }

    #[test]
    fn test_json_keys() {
        let json: serde_json::Value =
            serde_json::from_str(&ThemeConfig::dark().to_json().unwrap()).unwrap();
        assert_eq!(json["isDarkTheme"], true);
        assert_eq!(json["typography"]["primaryFont"], "Segoe UI");
        assert_eq!(json["spacing"]["baseUnit"], 8);
        assert_eq!(json["colors"]["background"], "#121212");
        assert!(json.get("shadows").is_none());
    }

    #[test]
    fn test_presets_round_trip() {
        for theme in [ThemeConfig::light(), ThemeConfig::dark(), ThemeConfig::high_contrast()] {
            let parsed = ThemeConfig::from_json(&theme.to_json().unwrap()).unwrap();
            assert_eq!(parsed, theme);
        }
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let err = ThemeConfig::from_json("{\"isDarkTheme\": \"maybe\"}").unwrap_err();
        assert!(matches!(err, crate::Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_style_sheet() {
        let sheet = ThemeConfig::light().style_sheet("PushButton");
        assert!(sheet.starts_with("PushButton {\n    background-color: #FFFFFF;"));
        assert!(sheet.contains("border-radius: 8px;"));
        assert!(sheet.contains("padding: 16px;"));
        assert!(sheet.contains("font-family: 'Segoe UI';"));
        assert!(sheet.contains("font-size: 14pt;"));
        assert!(sheet.contains("PushButton:hover {\n    background-color: #1976D2;\n}"));
        assert!(sheet.contains("PushButton:pressed {\n    background-color: #0D47A1;\n}"));
    }
}
