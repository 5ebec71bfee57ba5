//! Theming for Horizon Trellis.
//!
//! This crate provides the design-token layer that widgets are styled from:
//!
//! - **Tokens**: Color palette, typography, spacing, corner radii, shadows and motion
//! - **Presets**: Light, dark and high-contrast themes
//! - **JSON**: Import and export with camelCase keys
//! - **Theme Manager**: The active theme, application palette/font and change callbacks
//!
//! # Example
//!
//! ```
//! use horizon_trellis_style::{ThemeConfig, ThemeManager};
//!
//! let manager = ThemeManager::new();
//! manager.on_theme_changed(|theme| println!("theme is now {}", theme.name));
//! manager.load_light_theme();
//!
//! let json = manager.export_theme_to_json().unwrap();
//! assert_eq!(ThemeConfig::from_json(&json).unwrap(), ThemeConfig::light());
//! ```

mod error;
pub mod logging;
mod manager;
pub mod theme;

pub use error::{Error, Result};
pub use manager::{ThemeCallbackId, ThemeManager};
pub use theme::{
    AnimationTokens, BorderRadius, ColorPalette, FontRole, Shadows, Spacing, ThemeConfig,
    Typography,
};
