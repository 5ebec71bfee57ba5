//! Color palette tokens.

use std::collections::BTreeMap;

use horizon_trellis_core::{Color, ColorRole, Palette};
use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! color_palette {
    ($($(#[$doc:meta])* $field:ident => $key:literal = $rgba:literal,)*) => {
        /// Semantic color tokens.
        ///
        /// Serialized as an object of camelCase color names to hex strings.
        /// Missing names keep their defaults and unknown names are ignored.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
        pub struct ColorPalette {
            $($(#[$doc])* pub $field: Color,)*
        }

        impl Default for ColorPalette {
            fn default() -> Self {
                Self {
                    $($field: rgba($rgba),)*
                }
            }
        }

        impl ColorPalette {
            /// Every JSON color name, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($key),*];

            /// Look up a color by its JSON name.
            pub fn get(&self, name: &str) -> Option<Color> {
                match name {
                    $($key => Some(self.$field),)*
                    _ => None,
                }
            }

            /// Set a color by its JSON name. Returns `false` for unknown names.
            pub fn set(&mut self, name: &str, color: Color) -> bool {
                match name {
                    $($key => self.$field = color,)*
                    _ => return false,
                }
                true
            }
        }
    };
}

color_palette! {
    primary => "primary" = 0x2196F3FF,
    primary_variant => "primaryVariant" = 0x1976D2FF,
    secondary => "secondary" = 0xFF9800FF,
    secondary_variant => "secondaryVariant" = 0xF57C00FF,

    background => "background" = 0xFAFAFAFF,
    surface => "surface" = 0xFFFFFFFF,
    surface_variant => "surfaceVariant" = 0xF5F5F5FF,

    /// Content drawn on top of `primary`.
    on_primary => "onPrimary" = 0xFFFFFFFF,
    on_secondary => "onSecondary" = 0x000000FF,
    on_background => "onBackground" = 0x212121FF,
    on_surface => "onSurface" = 0x212121FF,
    on_surface_variant => "onSurfaceVariant" = 0x757575FF,

    error => "error" = 0xF44336FF,
    warning => "warning" = 0xFF9800FF,
    success => "success" = 0x4CAF50FF,
    info => "info" = 0x2196F3FF,

    hover => "hover" = 0x1976D2FF,
    pressed => "pressed" = 0x0D47A1FF,
    focused => "focused" = 0x2196F3FF,
    disabled => "disabled" = 0xBDBDBDFF,

    outline => "outline" = 0xE0E0E0FF,
    outline_variant => "outlineVariant" = 0xBDBDBDFF,
    divider => "divider" = 0xE0E0E0FF,

    shadow => "shadow" = 0x000000FF,
    shadow_light => "shadowLight" = 0x00000040,
}

const fn rgba(value: u32) -> Color {
    let [r, g, b, a] = value.to_be_bytes();
    Color::from_rgba8(r, g, b, a)
}

impl ColorPalette {
    /// The application palette these tokens map onto.
    pub fn to_application_palette(&self) -> Palette {
        Palette::default()
            .with_color(ColorRole::Window, self.background)
            .with_color(ColorRole::WindowText, self.on_background)
            .with_color(ColorRole::Base, self.surface)
            .with_color(ColorRole::AlternateBase, self.surface_variant)
            .with_color(ColorRole::Text, self.on_surface)
            .with_color(ColorRole::Button, self.primary)
            .with_color(ColorRole::ButtonText, self.on_primary)
            .with_color(ColorRole::Highlight, self.primary)
            .with_color(ColorRole::HighlightedText, self.on_primary)
    }
}

impl TryFrom<BTreeMap<String, String>> for ColorPalette {
    type Error = Error;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut palette = Self::default();
        for (name, text) in map {
            let color = text
                .parse::<Color>()
                .map_err(|err| Error::invalid_value(format!("colors.{name}"), err.to_string()))?;
            // Unknown names are ignored.
            palette.set(&name, color);
        }
        Ok(palette)
    }
}

impl From<ColorPalette> for BTreeMap<String, String> {
    fn from(palette: ColorPalette) -> Self {
        ColorPalette::NAMES
            .iter()
            .filter_map(|name| Some((name.to_string(), palette.get(name)?.to_hex())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let palette = ColorPalette::default();
        assert_eq!(palette.primary, Color::from_rgb8(0x21, 0x96, 0xF3));
        assert_eq!(palette.shadow_light.a, 0x40);
        assert_eq!(ColorPalette::NAMES.len(), 25);
    }

    #[test]
    fn test_json_names_and_unknown_keys() {
        let palette: ColorPalette =
            serde_json::from_str(r##"{"primary": "#FF0000", "sparkle": "#00FF00"}"##).unwrap();
        assert_eq!(palette.primary, Color::from_rgb8(255, 0, 0));
        assert_eq!(palette.surface, ColorPalette::default().surface);

        let json = serde_json::to_value(palette).unwrap();
        assert_eq!(json["onSurfaceVariant"], "#757575");
        assert_eq!(json["shadowLight"], "#00000040");
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = serde_json::from_str::<ColorPalette>(r#"{"primary": "blue-ish"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_application_palette_roles() {
        let palette = ColorPalette::default().to_application_palette();
        assert_eq!(palette.color(ColorRole::Button), ColorPalette::default().primary);
        assert_eq!(
            palette.color(ColorRole::WindowText),
            ColorPalette::default().on_background
        );
    }
}
