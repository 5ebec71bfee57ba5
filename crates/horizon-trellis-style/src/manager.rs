//! The active theme and change notification.
//!
//! A [`ThemeManager`] holds exactly one active [`ThemeConfig`]. Loading a
//! theme writes its palette and default font to the [`Application`] and then
//! runs every change callback, in registration order, on the calling thread.
//!
//! ```
//! use horizon_trellis_style::ThemeManager;
//!
//! let manager = ThemeManager::new();
//! manager.load_dark_theme();
//! assert!(manager.current_theme().is_dark_theme);
//! assert!(manager.load_theme_from_json("{not json").is_err());
//! assert_eq!(manager.current_theme().name, "Dark");
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use horizon_trellis_core::{Application, Font};
use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::theme::{FontRole, ThemeConfig};

type ThemeCallback = Arc<dyn Fn(&ThemeConfig) + Send + Sync>;

/// Identifies a registered theme-change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeCallbackId(u64);

/// Owns the active theme.
pub struct ThemeManager {
    current: RwLock<ThemeConfig>,
    callbacks: Mutex<Vec<(ThemeCallbackId, ThemeCallback)>>,
    next_callback: AtomicU64,
}

static GLOBAL: OnceLock<ThemeManager> = OnceLock::new();

impl ThemeManager {
    /// A manager holding the default theme. Nothing is applied until a theme
    /// is loaded.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(ThemeConfig::default()),
            callbacks: Mutex::new(Vec::new()),
            next_callback: AtomicU64::new(1),
        }
    }

    /// The process-wide manager.
    pub fn global() -> &'static ThemeManager {
        GLOBAL.get_or_init(ThemeManager::new)
    }

    /// A copy of the active theme.
    pub fn current_theme(&self) -> ThemeConfig {
        self.current.read().clone()
    }

    /// Run `f` against the active theme without copying it.
    pub fn with_current<R>(&self, f: impl FnOnce(&ThemeConfig) -> R) -> R {
        f(&self.current.read())
    }

    pub fn current_theme_name(&self) -> String {
        self.current.read().name.clone()
    }

    pub fn is_dark_theme(&self) -> bool {
        self.current.read().is_dark_theme
    }

    /// Make `theme` the active theme, apply it and notify callbacks.
    pub fn load_theme(&self, theme: ThemeConfig) {
        *self.current.write() = theme.clone();

        let app = Application::init();
        app.set_palette(theme.palette());
        app.set_font(theme.default_font());
        tracing::debug!(
            target: targets::THEME,
            name = %theme.name,
            dark = theme.is_dark_theme,
            "theme loaded"
        );

        let callbacks: Vec<ThemeCallback> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(&theme);
        }
    }

    pub fn load_light_theme(&self) {
        self.load_theme(ThemeConfig::light());
    }

    pub fn load_dark_theme(&self) {
        self.load_theme(ThemeConfig::dark());
    }

    pub fn load_high_contrast_theme(&self) {
        self.load_theme(ThemeConfig::high_contrast());
    }

    /// Parse and load a theme. On error the active theme is unchanged.
    pub fn load_theme_from_json(&self, json: &str) -> Result<()> {
        let theme = ThemeConfig::from_json(json).inspect_err(|err| {
            tracing::warn!(target: targets::THEME, %err, "rejected theme JSON");
        })?;
        self.load_theme(theme);
        Ok(())
    }

    /// Load a theme from an already parsed JSON value.
    pub fn load_theme_from_value(&self, value: serde_json::Value) -> Result<()> {
        let theme = ThemeConfig::from_value(value).inspect_err(|err| {
            tracing::warn!(target: targets::THEME, %err, "rejected theme JSON");
        })?;
        self.load_theme(theme);
        Ok(())
    }

    /// The active theme as compact JSON.
    pub fn export_theme_to_json(&self) -> Result<String> {
        self.with_current(ThemeConfig::to_json)
    }

    /// Write the active theme to `path` as pretty-printed JSON.
    pub fn save_theme(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.with_current(ThemeConfig::to_json_pretty)?;
        fs::write(path, json).map_err(|err| Error::io(path, err))?;
        tracing::debug!(target: targets::THEME, path = %path.display(), "theme saved");
        Ok(())
    }

    /// Read and load a theme file. On error the active theme is unchanged.
    pub fn load_theme_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        self.load_theme_from_json(&json)
    }

    /// Register a callback run after every theme swap.
    pub fn on_theme_changed<F>(&self, callback: F) -> ThemeCallbackId
    where
        F: Fn(&ThemeConfig) + Send + Sync + 'static,
    {
        let id = ThemeCallbackId(self.next_callback.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn remove_theme_callback(&self, id: ThemeCallbackId) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// A style sheet for `component` using the active tokens.
    pub fn generate_style_sheet(&self, component: &str) -> String {
        self.with_current(|theme| theme.style_sheet(component))
    }

    /// A font in the active primary family.
    pub fn create_font(&self, point_size: i32, weight: u16) -> Font {
        self.with_current(|theme| theme.create_font(point_size, weight))
    }

    /// The regular-weight font for a role in the active type scale.
    pub fn font_for(&self, role: FontRole) -> Font {
        self.with_current(|theme| theme.typography.font_for(role))
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("current", &self.current.read().name)
            .field("callbacks", &self.callbacks.lock().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ThemeManager: Send, Sync);
