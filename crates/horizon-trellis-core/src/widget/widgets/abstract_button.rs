//! Abstract button base implementation.
//!
//! [`AbstractButton`] holds what every button-like widget shares: the text
//! label, an optional icon, checkable state and the standard button signals.
//! Concrete buttons embed it and expose it through
//! [`Widget::as_button`](crate::widget::Widget::as_button).
//!
//! A button clicks on a left press followed by a release, on Space or Enter,
//! or programmatically through [`AbstractButton::click`]. Disabled buttons
//! ignore all three.

use crate::event::{Key, MouseButton, WidgetEvent};
use crate::logging::targets;
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::types::Icon;
use crate::variant::Variant;
use crate::widget::{FocusPolicy, WidgetBase, expect};

/// Common functionality for all button widgets.
pub struct AbstractButton {
    base: WidgetBase,
    text: Property<String>,
    icon: Property<Option<Icon>>,
    checkable: Property<bool>,
    checked: Property<bool>,
    /// A checked exclusive button stays checked when clicked.
    exclusive: Property<bool>,
    down: Property<bool>,

    /// Emitted on every click with the checked state after the click.
    pub clicked: Signal<bool>,
    /// Emitted when the button is pressed down.
    pub pressed: Signal<()>,
    /// Emitted when the button is released.
    pub released: Signal<()>,
    /// Emitted when the checked state changes.
    pub toggled: Signal<bool>,
    /// Emitted when the text changes.
    pub text_changed: Signal<String>,
}

impl AbstractButton {
    /// Class property names shared by all buttons.
    pub const PROPERTY_NAMES: &'static [&'static str] =
        &["text", "icon", "checkable", "checked", "down"];

    /// Create the button part of a widget of type `T`.
    pub fn new<T: 'static>(text: impl Into<String>) -> ObjectResult<Self> {
        let base = WidgetBase::new::<T>()?;
        base.set_focus_policy(FocusPolicy::StrongFocus);
        Ok(Self {
            base,
            text: Property::new(text.into()),
            icon: Property::new(None),
            checkable: Property::new(false),
            checked: Property::new(false),
            exclusive: Property::new(false),
            down: Property::new(false),
            clicked: Signal::new(),
            pressed: Signal::new(),
            released: Signal::new(),
            toggled: Signal::new(),
            text_changed: Signal::new(),
        })
    }

    pub fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    pub fn text(&self) -> String {
        self.text.get()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        if self.text.set(text.clone()) {
            self.text_changed.emit(text);
        }
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon.get()
    }

    pub fn set_icon(&self, icon: Option<Icon>) {
        self.icon.set(icon.filter(|icon| !icon.is_null()));
    }

    pub fn is_checkable(&self) -> bool {
        self.checkable.get()
    }

    /// Making a checked button uncheckable unchecks it.
    pub fn set_checkable(&self, checkable: bool) {
        if self.checkable.set(checkable) && !checkable && self.checked.set(false) {
            self.toggled.emit(false);
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Set the checked state. Ignored unless the button is checkable.
    pub fn set_checked(&self, checked: bool) {
        if self.is_checkable() && self.checked.set(checked) {
            self.toggled.emit(checked);
        }
    }

    pub fn toggle(&self) {
        self.set_checked(!self.is_checked());
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive.get()
    }

    pub fn set_exclusive(&self, exclusive: bool) {
        self.exclusive.set(exclusive);
    }

    /// Whether the button is currently held down.
    pub fn is_down(&self) -> bool {
        self.down.get()
    }

    /// Click the button: toggle if checkable, then emit `clicked`.
    ///
    /// Does nothing while the button is disabled.
    pub fn click(&self) {
        if !self.base.is_enabled() {
            tracing::trace!(target: targets::WIDGET, id = ?self.base.object_id(), "click ignored on disabled button");
            return;
        }
        if self.is_checkable() && !(self.is_checked() && self.is_exclusive()) {
            self.toggle();
        }
        self.clicked.emit(self.is_checked());
    }

    /// Press-release-click handling shared by button classes.
    pub fn handle_event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::MousePress {
                button: MouseButton::Left,
                ..
            } => {
                self.down.set(true);
                self.pressed.emit(());
                true
            }
            WidgetEvent::MouseRelease {
                button: MouseButton::Left,
                ..
            } => {
                if !self.down.replace(false).unwrap_or(false) {
                    return false;
                }
                self.released.emit(());
                self.click();
                true
            }
            WidgetEvent::KeyPress {
                key: Key::Space | Key::Enter,
                ..
            } => {
                self.pressed.emit(());
                self.released.emit(());
                self.click();
                true
            }
            WidgetEvent::FocusOut | WidgetEvent::Leave => {
                self.down.set(false);
                false
            }
            _ => false,
        }
    }

    pub fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "text" => self.set_text(expect::<String>(&value, "string")?),
            "icon" => self.set_icon(Some(expect(&value, "icon")?)),
            "checkable" => self.set_checkable(expect(&value, "bool")?),
            "checked" => self.set_checked(expect(&value, "bool")?),
            "down" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    pub fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "text" => Some(self.text().into()),
            "icon" => self.icon().map(Variant::from),
            "checkable" => Some(self.is_checkable().into()),
            "checked" => Some(self.is_checked().into()),
            "down" => Some(self.is_down().into()),
            _ => self.base.property(name),
        }
    }
}

impl std::fmt::Debug for AbstractButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbstractButton")
            .field("id", &self.base.object_id())
            .field("text", &self.text())
            .field("checked", &self.is_checked())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(AbstractButton: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn button() -> AbstractButton {
        init_global_registry();
        AbstractButton::new::<AbstractButton>("OK").unwrap()
    }

    #[test]
    fn test_press_release_clicks() {
        let button = button();
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let log = clicks.clone();
        button.clicked.connect(move |checked| log.lock().push(*checked));

        assert!(!button.handle_event(&WidgetEvent::mouse_release()));
        assert!(button.handle_event(&WidgetEvent::mouse_press()));
        assert!(button.is_down());
        assert!(button.handle_event(&WidgetEvent::mouse_release()));
        assert!(!button.is_down());
        assert_eq!(*clicks.lock(), vec![false]);
    }

    #[test]
    fn test_checkable_toggles_on_click() {
        let button = button();
        button.set_checked(true);
        assert!(!button.is_checked());

        button.set_checkable(true);
        button.click();
        assert!(button.is_checked());
        button.set_checkable(false);
        assert!(!button.is_checked());
    }

    #[test]
    fn test_exclusive_stays_checked() {
        let button = button();
        button.set_checkable(true);
        button.set_exclusive(true);
        button.click();
        button.click();
        assert!(button.is_checked());
    }

    #[test]
    fn test_disabled_ignores_click() {
        let button = button();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        button.clicked.connect(move |_| *counter.lock() += 1);

        button.widget_base().set_enabled(false);
        button.click();
        assert_eq!(*count.lock(), 0);
        button.widget_base().set_enabled(true);
        button.click();
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_reflective_text() {
        let button = button();
        button.set_property("text", "Apply".into()).unwrap();
        assert_eq!(button.property("text"), Some(Variant::from("Apply")));
        assert!(matches!(
            button.set_property("down", true.into()),
            Err(PropertyError::ReadOnly { .. })
        ));
        assert_eq!(button.property("enabled"), Some(Variant::Bool(true)));
    }
}
