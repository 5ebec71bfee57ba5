//! Spacing and corner-radius scales.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_UNIT: i32 = 8;

/// Spacing scale in pixels, derived from a base unit.
///
/// When deserializing, any derived value that is missing is recomputed from
/// `baseUnit` rather than taken from the default scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SpacingRepr")]
pub struct Spacing {
    pub base_unit: i32,
    pub xs: i32,
    pub sm: i32,
    pub md: i32,
    pub lg: i32,
    pub xl: i32,
    pub xxl: i32,
    pub xxxl: i32,

    pub button_padding: i32,
    pub input_padding: i32,
    pub card_padding: i32,
    pub dialog_padding: i32,
    pub section_spacing: i32,
}

impl Spacing {
    /// The full scale for a base unit.
    pub fn from_base_unit(base: i32) -> Self {
        Self {
            base_unit: base,
            xs: base / 2,
            sm: base,
            md: base * 2,
            lg: base * 3,
            xl: base * 4,
            xxl: base * 6,
            xxxl: base * 8,
            button_padding: base * 3 / 2,
            input_padding: base * 2,
            card_padding: base * 2,
            dialog_padding: base * 3,
            section_spacing: base * 4,
        }
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self::from_base_unit(DEFAULT_BASE_UNIT)
    }
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SpacingRepr {
    base_unit: Option<i32>,
    xs: Option<i32>,
    sm: Option<i32>,
    md: Option<i32>,
    lg: Option<i32>,
    xl: Option<i32>,
    xxl: Option<i32>,
    xxxl: Option<i32>,
    button_padding: Option<i32>,
    input_padding: Option<i32>,
    card_padding: Option<i32>,
    dialog_padding: Option<i32>,
    section_spacing: Option<i32>,
}

impl From<SpacingRepr> for Spacing {
    fn from(repr: SpacingRepr) -> Self {
        let derived = Spacing::from_base_unit(repr.base_unit.unwrap_or(DEFAULT_BASE_UNIT));
        Self {
            base_unit: derived.base_unit,
            xs: repr.xs.unwrap_or(derived.xs),
            sm: repr.sm.unwrap_or(derived.sm),
            md: repr.md.unwrap_or(derived.md),
            lg: repr.lg.unwrap_or(derived.lg),
            xl: repr.xl.unwrap_or(derived.xl),
            xxl: repr.xxl.unwrap_or(derived.xxl),
            xxxl: repr.xxxl.unwrap_or(derived.xxxl),
            button_padding: repr.button_padding.unwrap_or(derived.button_padding),
            input_padding: repr.input_padding.unwrap_or(derived.input_padding),
            card_padding: repr.card_padding.unwrap_or(derived.card_padding),
            dialog_padding: repr.dialog_padding.unwrap_or(derived.dialog_padding),
            section_spacing: repr.section_spacing.unwrap_or(derived.section_spacing),
        }
    }
}

/// Corner radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderRadius {
    pub none: i32,
    pub xs: i32,
    pub sm: i32,
    pub md: i32,
    pub lg: i32,
    pub xl: i32,
    pub xxl: i32,
    /// Large enough to round any widget into a pill.
    pub full: i32,
}

impl Default for BorderRadius {
    fn default() -> Self {
        Self {
            none: 0,
            xs: 2,
            sm: 4,
            md: 8,
            lg: 12,
            xl: 16,
            xxl: 24,
            full: 9999,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale() {
        let spacing = Spacing::default();
        assert_eq!(
            [spacing.xs, spacing.sm, spacing.md, spacing.lg, spacing.xl, spacing.xxl, spacing.xxxl],
            [4, 8, 16, 24, 32, 48, 64]
        );
        assert_eq!(spacing.button_padding, 12);
        assert_eq!(spacing.section_spacing, 32);
    }

    #[test]
    fn test_missing_values_derive_from_base_unit() {
        let spacing: Spacing = serde_json::from_str(r#"{"baseUnit": 4, "md": 10}"#).unwrap();
        assert_eq!(spacing.base_unit, 4);
        assert_eq!(spacing.sm, 4);
        assert_eq!(spacing.md, 10);
        assert_eq!(spacing.xxxl, 32);

        let json = serde_json::to_value(spacing).unwrap();
        assert_eq!(json["baseUnit"], 4);
        assert_eq!(json["buttonPadding"], 6);
    }
}
