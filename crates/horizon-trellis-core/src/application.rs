//! Application-wide settings.
//!
//! The [`Application`] singleton owns the palette and default font that
//! themes write to and widgets read from. Initializing it also initializes
//! the global object registry.

use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::object::init_global_registry;
use crate::signal::Signal;
use crate::types::{Color, Font};

/// Palette color roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Window,
    WindowText,
    Base,
    AlternateBase,
    Text,
    Button,
    ButtonText,
    Highlight,
    HighlightedText,
}

impl ColorRole {
    /// Every role, in palette order.
    pub const ALL: [ColorRole; 9] = [
        ColorRole::Window,
        ColorRole::WindowText,
        ColorRole::Base,
        ColorRole::AlternateBase,
        ColorRole::Text,
        ColorRole::Button,
        ColorRole::ButtonText,
        ColorRole::Highlight,
        ColorRole::HighlightedText,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// A set of colors keyed by [`ColorRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Color; 9],
}

impl Palette {
    /// Get the color for a role.
    pub fn color(&self, role: ColorRole) -> Color {
        self.colors[role.index()]
    }

    /// Set the color for a role.
    pub fn set_color(&mut self, role: ColorRole, color: Color) {
        self.colors[role.index()] = color;
    }

    /// Builder-style [`set_color`](Self::set_color).
    pub fn with_color(mut self, role: ColorRole, color: Color) -> Self {
        self.set_color(role, color);
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        let mut palette = Self {
            colors: [Color::WHITE; 9],
        };
        palette.set_color(ColorRole::Window, Color::from_rgb8(0xF0, 0xF0, 0xF0));
        palette.set_color(ColorRole::WindowText, Color::BLACK);
        palette.set_color(ColorRole::AlternateBase, Color::from_rgb8(0xF5, 0xF5, 0xF5));
        palette.set_color(ColorRole::Text, Color::BLACK);
        palette.set_color(ColorRole::Button, Color::from_rgb8(0xF0, 0xF0, 0xF0));
        palette.set_color(ColorRole::ButtonText, Color::BLACK);
        palette.set_color(ColorRole::Highlight, Color::from_rgb8(0x30, 0x8C, 0xC6));
        palette
    }
}

/// Process-wide application settings.
pub struct Application {
    palette: RwLock<Palette>,
    font: RwLock<Font>,
    /// Emitted after the palette changes.
    pub palette_changed: Signal<Palette>,
    /// Emitted after the default font changes.
    pub font_changed: Signal<Font>,
}

static APPLICATION: OnceLock<Application> = OnceLock::new();

impl Application {
    /// Initialize (if needed) and return the application singleton.
    pub fn init() -> &'static Application {
        init_global_registry();
        APPLICATION.get_or_init(|| {
            tracing::debug!(target: targets::APPLICATION, "application initialized");
            Application {
                palette: RwLock::new(Palette::default()),
                font: RwLock::new(Font::default()),
                palette_changed: Signal::new(),
                font_changed: Signal::new(),
            }
        })
    }

    /// The application singleton, if initialized.
    pub fn try_instance() -> Option<&'static Application> {
        APPLICATION.get()
    }

    /// The current palette.
    pub fn palette(&self) -> Palette {
        *self.palette.read()
    }

    /// Replace the palette.
    pub fn set_palette(&self, palette: Palette) {
        let changed = {
            let mut current = self.palette.write();
            let changed = *current != palette;
            *current = palette;
            changed
        };
        if changed {
            tracing::debug!(target: targets::APPLICATION, "palette changed");
            self.palette_changed.emit(palette);
        }
    }

    /// The default font.
    pub fn font(&self) -> Font {
        self.font.read().clone()
    }

    /// Replace the default font.
    pub fn set_font(&self, font: Font) {
        let changed = {
            let mut current = self.font.write();
            let changed = *current != font;
            *current = font.clone();
            changed
        };
        if changed {
            tracing::debug!(target: targets::APPLICATION, family = %font.family, size = font.point_size, "font changed");
            self.font_changed.emit(font);
        }
    }
}

static_assertions::assert_impl_all!(Application: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_roles() {
        let palette = Palette::default().with_color(ColorRole::Highlight, Color::YELLOW);
        assert_eq!(palette.color(ColorRole::Highlight), Color::YELLOW);
        assert_eq!(palette.color(ColorRole::Base), Color::WHITE);
        assert_eq!(ColorRole::ALL.len(), 9);
    }

    #[test]
    fn test_application_is_singleton() {
        let a = Application::init() as *const Application;
        let b = Application::init() as *const Application;
        assert_eq!(a, b);
        assert!(Application::try_instance().is_some());
    }
}
