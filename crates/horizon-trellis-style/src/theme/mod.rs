//! Design tokens and theme presets.

mod config;
mod palette;
mod spacing;
mod tokens;
mod typography;

pub use config::ThemeConfig;
pub use palette::ColorPalette;
pub use spacing::{BorderRadius, Spacing};
pub use tokens::{AnimationTokens, Shadows};
pub use typography::{FontRole, FontSizes, FontWeights, LineHeights, Typography};
