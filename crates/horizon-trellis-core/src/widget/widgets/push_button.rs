//! Push button widget.

use std::sync::Arc;

use crate::event::WidgetEvent;
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::{AbstractButton, property_names_with};

/// A command button.
///
/// # Signals
///
/// See [`AbstractButton`]: `clicked(bool)`, `pressed`, `released`,
/// `toggled(bool)`.
pub struct PushButton {
    button: AbstractButton,
    default: Property<bool>,
    flat: Property<bool>,
}

impl PushButton {
    const CLASS_PROPERTIES: &'static [&'static str] = &["default", "flat"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_text("")
    }

    pub fn with_text(text: impl Into<String>) -> ObjectResult<Arc<Self>> {
        let button = Arc::new(Self {
            button: AbstractButton::new::<Self>(text)?,
            default: Property::new(false),
            flat: Property::new(false),
        });
        register_widget(&button);
        Ok(button)
    }

    pub fn button(&self) -> &AbstractButton {
        &self.button
    }

    pub fn text(&self) -> String {
        self.button.text()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.button.set_text(text);
    }

    pub fn click(&self) {
        self.button.click();
    }

    /// Whether Enter in the surrounding dialog activates this button.
    pub fn is_default(&self) -> bool {
        self.default.get()
    }

    pub fn set_default(&self, default: bool) {
        self.default.set(default);
    }

    pub fn is_flat(&self) -> bool {
        self.flat.get()
    }

    pub fn set_flat(&self, flat: bool) {
        self.flat.set(flat);
    }
}

impl Widget for PushButton {
    fn widget_base(&self) -> &WidgetBase {
        self.button.widget_base()
    }

    fn class_name(&self) -> &'static str {
        "PushButton"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "default" => self.set_default(expect(&value, "bool")?),
            "flat" => self.set_flat(expect(&value, "bool")?),
            _ => return self.button.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "default" => Some(self.is_default().into()),
            "flat" => Some(self.is_flat().into()),
            _ => self.button.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        let mut names = property_names_with(AbstractButton::PROPERTY_NAMES);
        names.extend_from_slice(Self::CLASS_PROPERTIES);
        names
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        self.button.handle_event(event)
    }

    fn as_button(&self) -> Option<&AbstractButton> {
        Some(&self.button)
    }
}

static_assertions::assert_impl_all!(PushButton: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use crate::widget::WidgetRef;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_send_event_respects_enabled() {
        init_global_registry();
        let button = PushButton::with_text("Submit").unwrap();
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        button.button().clicked.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let widget: WidgetRef = button.clone();
        widget.widget_base().set_enabled(false);
        widget.send_event(&WidgetEvent::mouse_press());
        widget.send_event(&WidgetEvent::mouse_release());
        assert_eq!(clicks.load(Ordering::SeqCst), 0);

        widget.widget_base().set_enabled(true);
        widget.send_event(&WidgetEvent::mouse_press());
        widget.send_event(&WidgetEvent::mouse_release());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_property_names() {
        init_global_registry();
        let widget: WidgetRef = PushButton::new().unwrap();
        assert!(widget.has_property("text"));
        assert!(widget.has_property("flat"));
        assert!(widget.has_property("toolTip"));
        assert!(!widget.has_property("value"));
        widget.set_property("flat", true.into()).unwrap();
        assert_eq!(widget.property("flat"), Some(Variant::Bool(true)));
    }
}
