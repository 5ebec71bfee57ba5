//! Check box widget.

use std::sync::{Arc, Weak};

use crate::event::WidgetEvent;
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::{AbstractButton, property_names_with};

/// The state of a check box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    /// Only reachable on tristate check boxes, and only programmatically.
    PartiallyChecked,
    Checked,
}

impl CheckState {
    fn to_int(self) -> i64 {
        match self {
            Self::Unchecked => 0,
            Self::PartiallyChecked => 1,
            Self::Checked => 2,
        }
    }

    fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unchecked),
            1 => Some(Self::PartiallyChecked),
            2 => Some(Self::Checked),
            _ => None,
        }
    }
}

/// A checkable option with a text label.
///
/// # Signals
///
/// - `state_changed(CheckState)`, plus the [`AbstractButton`] signals.
pub struct CheckBox {
    button: AbstractButton,
    tristate: Property<bool>,
    partial: Property<bool>,

    /// Emitted when the check state changes.
    pub state_changed: Signal<CheckState>,
}

impl CheckBox {
    const CLASS_PROPERTIES: &'static [&'static str] = &["tristate", "checkState"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_text("")
    }

    pub fn with_text(text: impl Into<String>) -> ObjectResult<Arc<Self>> {
        let button = AbstractButton::new::<Self>(text)?;
        button.set_checkable(true);
        let check_box = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            button.toggled.connect(move |_| {
                if let Some(check_box) = weak.upgrade() {
                    check_box.partial.set(false);
                    check_box.state_changed.emit(check_box.check_state());
                }
            });
            Self {
                button,
                tristate: Property::new(false),
                partial: Property::new(false),
                state_changed: Signal::new(),
            }
        });
        register_widget(&check_box);
        Ok(check_box)
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

    pub fn is_tristate(&self) -> bool {
        self.tristate.get()
    }

    /// Leaving tristate mode turns a partial state into unchecked.
    pub fn set_tristate(&self, tristate: bool) {
        self.tristate.set(tristate);
        if !tristate && self.partial.set(false) {
            self.state_changed.emit(self.check_state());
        }
    }

    pub fn check_state(&self) -> CheckState {
        if self.partial.get() {
            CheckState::PartiallyChecked
        } else if self.button.is_checked() {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }

    /// Set the state. `PartiallyChecked` is ignored unless tristate.
    pub fn set_check_state(&self, state: CheckState) {
        match state {
            CheckState::PartiallyChecked => {
                if !self.is_tristate() {
                    return;
                }
                // Unchecking first so the toggle handler does not clear the flag.
                self.button.set_checked(false);
                if self.partial.set(true) {
                    self.state_changed.emit(state);
                }
            }
            CheckState::Checked | CheckState::Unchecked => {
                let was_partial = self.partial.replace(false).unwrap_or(false);
                let checked = state == CheckState::Checked;
                if self.button.is_checked() != checked {
                    self.button.set_checked(checked);
                } else if was_partial {
                    self.state_changed.emit(state);
                }
            }
        }
    }
}

impl Widget for CheckBox {
    fn widget_base(&self) -> &WidgetBase {
        self.button.widget_base()
    }

    fn class_name(&self) -> &'static str {
        "CheckBox"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "tristate" => self.set_tristate(expect(&value, "bool")?),
            "checkState" => {
                let state = expect::<i64>(&value, "int").and_then(|v| {
                    CheckState::from_int(v).ok_or(PropertyError::TypeMismatch {
                        expected: "check state 0..=2",
                        got: "int",
                    })
                })?;
                self.set_check_state(state);
            }
            _ => return self.button.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "tristate" => Some(self.is_tristate().into()),
            "checkState" => Some(self.check_state().to_int().into()),
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

static_assertions::assert_impl_all!(CheckBox: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use parking_lot::Mutex;

    #[test]
    fn test_click_toggles_and_reports_state() {
        init_global_registry();
        let check_box = CheckBox::with_text("Agree").unwrap();
        let states = Arc::new(Mutex::new(Vec::new()));
        let log = states.clone();
        check_box.state_changed.connect(move |s| log.lock().push(*s));

        check_box.button().click();
        check_box.button().click();
        assert_eq!(
            *states.lock(),
            vec![CheckState::Checked, CheckState::Unchecked]
        );
    }

    #[test]
    fn test_partial_requires_tristate() {
        init_global_registry();
        let check_box = CheckBox::new().unwrap();
        check_box.set_check_state(CheckState::PartiallyChecked);
        assert_eq!(check_box.check_state(), CheckState::Unchecked);

        check_box.set_tristate(true);
        check_box.set_check_state(CheckState::PartiallyChecked);
        assert_eq!(check_box.check_state(), CheckState::PartiallyChecked);

        check_box.button().click();
        assert_eq!(check_box.check_state(), CheckState::Checked);
    }

    #[test]
    fn test_check_state_property() {
        init_global_registry();
        let check_box = CheckBox::new().unwrap();
        check_box.set_property("checkState", Variant::Int(2)).unwrap();
        assert!(check_box.is_checked());
        assert!(check_box.set_property("checkState", Variant::Int(7)).is_err());
    }
}
