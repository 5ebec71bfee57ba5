//! Radio button widget.

use std::sync::{Arc, Weak};

use crate::event::WidgetEvent;
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, child_widgets, expect, find_widget, register_widget};

use super::{AbstractButton, property_names_with};

/// An option button that is usually exclusive with its siblings.
///
/// With `autoExclusive` on (the default), checking a radio button unchecks
/// the other auto-exclusive radio buttons under the same parent.
pub struct RadioButton {
    button: AbstractButton,
    auto_exclusive: Property<bool>,
}

impl RadioButton {
    const CLASS_PROPERTIES: &'static [&'static str] = &["autoExclusive"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_text("")
    }

    pub fn with_text(text: impl Into<String>) -> ObjectResult<Arc<Self>> {
        let button = AbstractButton::new::<Self>(text)?;
        button.set_checkable(true);
        button.set_exclusive(true);
        let radio = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            button.toggled.connect(move |&checked| {
                if checked && let Some(radio) = weak.upgrade() {
                    radio.uncheck_siblings();
                }
            });
            Self {
                button,
                auto_exclusive: Property::new(true),
            }
        });
        register_widget(&radio);
        Ok(radio)
    }

    pub fn button(&self) -> &AbstractButton {
        &self.button
    }

    pub fn text(&self) -> String {
        self.button.text()
    }

    pub fn is_checked(&self) -> bool {
        self.button.is_checked()
    }

    pub fn set_checked(&self, checked: bool) {
        self.button.set_checked(checked);
    }

    pub fn auto_exclusive(&self) -> bool {
        self.auto_exclusive.get()
    }

    pub fn set_auto_exclusive(&self, auto_exclusive: bool) {
        self.auto_exclusive.set(auto_exclusive);
        self.button.set_exclusive(auto_exclusive);
    }

    fn uncheck_siblings(&self) {
        if !self.auto_exclusive() {
            return;
        }
        let Some(parent) = self.widget_base().parent_id().and_then(find_widget) else {
            return;
        };
        let own_id = self.object_id();
        for sibling in child_widgets(parent.as_ref()) {
            if sibling.object_id() == own_id {
                continue;
            }
            if let Some(radio) = sibling.downcast_ref::<RadioButton>()
                && radio.auto_exclusive()
            {
                radio.set_checked(false);
            }
        }
    }
}

impl Widget for RadioButton {
    fn widget_base(&self) -> &WidgetBase {
        self.button.widget_base()
    }

    fn class_name(&self) -> &'static str {
        "RadioButton"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "autoExclusive" => self.set_auto_exclusive(expect(&value, "bool")?),
            _ => return self.button.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "autoExclusive" => Some(self.auto_exclusive().into()),
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

static_assertions::assert_impl_all!(RadioButton: Send, Sync);
