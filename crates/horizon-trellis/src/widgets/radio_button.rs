use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Weak};

use horizon_trellis_core::widget::widgets::{ButtonGroup, RadioButton};
use horizon_trellis_core::widget::{Widget, WidgetRef, find_widget};
use horizon_trellis_core::{ObjectId, SignalConnection};
use parking_lot::Mutex;

use super::bind_button;
use crate::element::{ElementCore, EventHandler, UiElement, keep_with_widget};
use crate::logging::targets;

static GROUPS: LazyLock<Mutex<HashMap<String, Weak<RadioGroup>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A named exclusive group of radio buttons.
///
/// Lives as long as one of its members does.
pub struct RadioGroup {
    name: String,
    buttons: Arc<ButtonGroup>,
}

impl RadioGroup {
    pub fn named(name: &str) -> Arc<Self> {
        let mut groups = GROUPS.lock();
        if let Some(group) = groups.get(name).and_then(Weak::upgrade) {
            return group;
        }
        let group = Arc::new(Self {
            name: name.to_string(),
            buttons: ButtonGroup::new(),
        });
        groups.retain(|_, weak| weak.strong_count() > 0);
        groups.insert(name.to_string(), Arc::downgrade(&group));
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn button_group(&self) -> &Arc<ButtonGroup> {
        &self.buttons
    }

    pub fn add(self: &Arc<Self>, button: &Arc<RadioButton>) -> bool {
        let widget: WidgetRef = button.clone();
        if !self.buttons.add_button(&widget) {
            return false;
        }
        keep_with_widget(&**button, self.clone());
        tracing::trace!(target: targets::ELEMENT, group = %self.name, id = ?button.object_id(), "radio button joined group");
        true
    }

    pub fn checked_button(&self) -> Option<ObjectId> {
        self.buttons.checked_button()
    }

    /// Text of the checked member.
    pub fn checked_text(&self) -> Option<String> {
        let widget = find_widget(self.checked_button()?)?;
        widget.as_button().map(|button| button.text())
    }

    pub fn members(&self) -> Vec<ObjectId> {
        self.buttons.buttons()
    }
}

impl fmt::Debug for RadioGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioGroup")
            .field("name", &self.name)
            .field("members", &self.buttons.buttons().len())
            .finish()
    }
}

/// Builds a [`RadioButton`] that optionally joins a named group.
pub struct RadioButtonBuilder {
    core: ElementCore<RadioButton>,
    group: Option<Arc<RadioGroup>>,
}

impl RadioButtonBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("RadioButton"),
            group: None,
        }
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_property("text", text.into())
    }

    pub fn checked(self, checked: bool) -> Self {
        self.with_property("checked", checked)
    }

    pub fn group(mut self, name: &str) -> Self {
        self.group = Some(RadioGroup::named(name));
        self
    }

    pub fn on_toggled(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("toggled", EventHandler::bool(handler))
    }

    pub fn on_click(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("clicked", EventHandler::unit(handler))
    }

    pub fn group_handle(&self) -> Option<&Arc<RadioGroup>> {
        self.group.as_ref()
    }

    pub fn is_checked(&self) -> bool {
        self.core.widget().is_some_and(|widget| widget.is_checked())
    }
}

impl Default for RadioButtonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for RadioButtonBuilder {
    type Widget = RadioButton;

    fn core(&self) -> &ElementCore<RadioButton> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<RadioButton> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<RadioButton>> {
        Ok(RadioButton::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<RadioButton>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        bind_button(widget, event, handler)
    }

    fn setup_groups(&mut self, widget: &Arc<RadioButton>) {
        if let Some(group) = &self.group {
            group.add(widget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_named_group_is_exclusive() {
        setup();
        let mut small = RadioButtonBuilder::new().text("Small").checked(true).group("size-test");
        let mut large = RadioButtonBuilder::new().text("Large").group("size-test");
        let small_button = small.initialize().unwrap();
        let large_button = large.initialize().unwrap();

        let group = RadioGroup::named("size-test");
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.checked_button(), Some(small_button.object_id()));

        large_button.button().click();
        assert!(!small_button.is_checked());
        assert!(large.is_checked());
        assert_eq!(group.checked_text().as_deref(), Some("Large"));
    }

    #[test]
    fn test_groups_are_independent() {
        setup();
        let mut a = RadioButtonBuilder::new().checked(true).group("first-test");
        let mut b = RadioButtonBuilder::new().checked(true).group("second-test");
        a.initialize().unwrap();
        b.initialize().unwrap();
        assert!(a.is_checked());
        assert!(b.is_checked());
        assert!(!Arc::ptr_eq(
            a.group_handle().unwrap(),
            b.group_handle().unwrap()
        ));
    }
}
