//! Change-detecting value cells for widget state.
//!
//! Widgets live behind `Arc` and are mutated through `&self`, so each piece
//! of widget state sits in a [`Property`]. A write reports whether the value
//! moved, and the widget emits its change signal only then:
//!
//! ```
//! use horizon_trellis_core::{Property, Signal};
//!
//! let text = Property::new(String::new());
//! let text_changed = Signal::<String>::new();
//! if text.set("hello".to_string()) {
//!     text_changed.emit(text.get());
//! }
//! assert!(!text.set("hello".to_string()));
//! ```

use std::fmt;

use parking_lot::RwLock;

pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`. Returns `false` when it equals the current value.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Store `value` and hand back the previous one, or `None` when nothing
    /// changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        (*current != value).then(|| std::mem::replace(&mut *current, value))
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value.read(), f)
    }
}

/// Failures of the reflective `set_property` / `property` channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("widget has no property '{name}'")]
    NotFound { name: String },

    #[error("property expects {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("property '{name}' is read-only")]
    ReadOnly { name: String },
}

impl PropertyError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_returns_previous_only_on_change() {
        let cell = Property::new('a');
        assert_eq!(cell.replace('a'), None);
        assert_eq!(cell.replace('b'), Some('a'));
        assert!(!cell.set('b'));
        assert!(cell.set('c'));
        assert_eq!(cell.get(), 'c');
    }

    #[test]
    fn test_debug_shows_the_value() {
        assert_eq!(format!("{:?}", Property::new(Some(3))), "Some(3)");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PropertyError::not_found("bogus").to_string(),
            "widget has no property 'bogus'"
        );
        assert_eq!(
            PropertyError::read_only("hasFocus").to_string(),
            "property 'hasFocus' is read-only"
        );
    }
}
