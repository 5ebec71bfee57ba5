//! Check box builder and named check box groups.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Weak};

use horizon_trellis_core::widget::Widget;
use horizon_trellis_core::widget::widgets::{CheckBox, CheckState};
use horizon_trellis_core::{ObjectId, Signal, SignalConnection};
use parking_lot::{Mutex, RwLock};

use super::bind_button;
use crate::element::{ElementCore, EventHandler, UiElement, keep_with_widget};
use crate::enhancer::INVALID_COLOR;
use crate::logging::targets;
use crate::validation::ValidationResult;

/// Style layer marking members of a failing group.
const GROUP_ERROR_LAYER: &str = "check_box.group";

static GROUPS: LazyLock<Mutex<HashMap<String, Weak<CheckBoxGroup>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Judges the checked flags of a group's members, in join order.
#[derive(Clone)]
pub struct GroupValidator(Arc<dyn Fn(&[bool]) -> ValidationResult + Send + Sync>);

impl GroupValidator {
    pub fn new(rule: impl Fn(&[bool]) -> ValidationResult + Send + Sync + 'static) -> Self {
        Self(Arc::new(rule))
    }

    pub fn at_least_one() -> Self {
        Self::at_least(1)
    }

    pub fn at_least(count: usize) -> Self {
        Self::new(move |checked| {
            let n = checked.iter().filter(|c| **c).count();
            if n >= count {
                ValidationResult::success()
            } else if count == 1 {
                ValidationResult::failure("Select at least one option")
            } else {
                ValidationResult::failure(format!("Select at least {count} options"))
            }
        })
    }

    pub fn at_most(count: usize) -> Self {
        Self::new(move |checked| {
            if checked.iter().filter(|c| **c).count() <= count {
                ValidationResult::success()
            } else {
                ValidationResult::failure(format!("Select at most {count} options"))
            }
        })
    }

    pub fn validate(&self, checked: &[bool]) -> ValidationResult {
        (self.0)(checked)
    }
}

impl fmt::Debug for GroupValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GroupValidator")
    }
}

/// Check boxes sharing a name and a validator.
///
/// The validator re-runs whenever a member changes state. A failing result
/// marks every member with the error color and the first error as tooltip;
/// a passing one clears the marks. Members are held weakly; each member
/// keeps the group alive.
pub struct CheckBoxGroup {
    name: String,
    members: RwLock<Vec<Weak<CheckBox>>>,
    validator: RwLock<Option<GroupValidator>>,
    last: Mutex<Option<ValidationResult>>,
    /// Emitted with the new validity when it changes.
    pub validation_changed: Signal<bool>,
}

impl CheckBoxGroup {
    /// The live group called `name`, created on first use.
    pub fn named(name: &str) -> Arc<Self> {
        let mut groups = GROUPS.lock();
        if let Some(group) = groups.get(name).and_then(Weak::upgrade) {
            return group;
        }
        let group = Arc::new(Self {
            name: name.to_string(),
            members: RwLock::new(Vec::new()),
            validator: RwLock::new(None),
            last: Mutex::new(None),
            validation_changed: Signal::new(),
        });
        groups.retain(|_, weak| weak.strong_count() > 0);
        groups.insert(name.to_string(), Arc::downgrade(&group));
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_validator(&self, validator: Option<GroupValidator>) {
        *self.validator.write() = validator;
    }

    /// Add a member. Returns `false` if it already belongs to the group.
    pub fn add(self: &Arc<Self>, check_box: &Arc<CheckBox>) -> bool {
        let id = check_box.object_id();
        if self.contains(id) {
            return false;
        }
        self.members.write().push(Arc::downgrade(check_box));
        let group = self.clone();
        check_box.state_changed.connect(move |_| {
            group.validate();
        });
        keep_with_widget(&**check_box, self.clone());
        tracing::trace!(target: targets::ELEMENT, group = %self.name, ?id, "check box joined group");
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.members().iter().any(|member| member.object_id() == id)
    }

    /// Live members in join order.
    pub fn members(&self) -> Vec<Arc<CheckBox>> {
        self.members.read().iter().filter_map(Weak::upgrade).collect()
    }

    pub fn checked(&self) -> Vec<ObjectId> {
        self.members()
            .iter()
            .filter(|member| member.check_state() == CheckState::Checked)
            .map(|member| member.object_id())
            .collect()
    }

    /// Run the validator and mark the members. Without a validator the
    /// group is always valid.
    pub fn validate(&self) -> ValidationResult {
        let members = self.members();
        let flags: Vec<bool> = members.iter().map(|member| member.is_checked()).collect();
        let result = match &*self.validator.read() {
            Some(validator) => validator.validate(&flags),
            None => ValidationResult::success(),
        };

        for member in &members {
            let base = member.widget_base();
            match result.first_error() {
                Some(message) => {
                    base.set_style_layer(GROUP_ERROR_LAYER, [("color", INVALID_COLOR)]);
                    base.set_tool_tip(message);
                }
                None => {
                    if base.clear_style_layer(GROUP_ERROR_LAYER) {
                        base.set_tool_tip("");
                    }
                }
            }
        }

        let previous = self.last.lock().replace(result.clone());
        if previous.is_none_or(|previous| previous.is_valid() != result.is_valid()) {
            self.validation_changed.emit(result.is_valid());
        }
        result
    }

    /// The outcome of the last run.
    pub fn last_result(&self) -> Option<ValidationResult> {
        self.last.lock().clone()
    }
}

impl fmt::Debug for CheckBoxGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBoxGroup")
            .field("name", &self.name)
            .field("members", &self.members.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(CheckBoxGroup: Send, Sync);

fn state_changed(check_box: &CheckBox) -> &Signal<CheckState> {
    &check_box.state_changed
}

/// Builds a [`CheckBox`].
///
/// Events: `stateChanged(CheckState)` delivered to int handlers as
/// 0, 1 or 2, plus the button and common events.
pub struct CheckBoxBuilder {
    core: ElementCore<CheckBox>,
    group: Option<Arc<CheckBoxGroup>>,
    group_validator: Option<GroupValidator>,
}

impl CheckBoxBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("CheckBox"),
            group: None,
            group_validator: None,
        }
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_property("text", text.into())
    }

    pub fn checked(self, checked: bool) -> Self {
        self.with_property("checked", checked)
    }

    pub fn tristate(self, tristate: bool) -> Self {
        self.with_property("tristate", tristate)
    }

    pub fn check_state(self, state: CheckState) -> Self {
        let value = match state {
            CheckState::Unchecked => 0,
            CheckState::PartiallyChecked => 1,
            CheckState::Checked => 2,
        };
        self.with_property("checkState", value)
    }

    /// Join the named group during initialization.
    pub fn group(mut self, name: &str) -> Self {
        self.group = Some(CheckBoxGroup::named(name));
        self
    }

    /// Install a validator on the group this box joins.
    pub fn group_validator(mut self, validator: GroupValidator) -> Self {
        self.group_validator = Some(validator);
        self
    }

    pub fn on_toggled(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("toggled", EventHandler::bool(handler))
    }

    pub fn on_state_changed(self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.with_event("stateChanged", EventHandler::int(handler))
    }

    pub fn group_handle(&self) -> Option<&Arc<CheckBoxGroup>> {
        self.group.as_ref()
    }

    pub fn is_checked(&self) -> bool {
        self.core.widget().is_some_and(|widget| widget.is_checked())
    }

    pub fn set_checked(&mut self, checked: bool) -> &mut Self {
        self.set_property("checked", checked)
    }

    pub fn toggle(&self) {
        if let Some(widget) = self.core.widget() {
            widget.button().toggle();
        }
    }
}

impl Default for CheckBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for CheckBoxBuilder {
    type Widget = CheckBox;

    fn core(&self) -> &ElementCore<CheckBox> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<CheckBox> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<CheckBox>> {
        Ok(CheckBox::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<CheckBox>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "stateChanged" => handler.bind(widget, state_changed),
            _ => bind_button(widget, event, handler),
        }
    }

    fn setup_groups(&mut self, widget: &Arc<CheckBox>) {
        let Some(group) = &self.group else {
            return;
        };
        if let Some(validator) = self.group_validator.take() {
            group.set_validator(Some(validator));
        }
        group.add(widget);
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
    fn test_state_changed_payload() {
        setup();
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        let mut builder = CheckBoxBuilder::new()
            .text("Remember me")
            .tristate(true)
            .on_state_changed(move |state| sink.lock().push(state));
        let check = builder.initialize().unwrap();

        check.set_check_state(CheckState::PartiallyChecked);
        check.set_check_state(CheckState::Checked);
        assert_eq!(*states.lock(), vec![1, 2]);
        assert!(builder.is_checked());
    }

    #[test]
    fn test_staged_check_state() {
        setup();
        let mut builder = CheckBoxBuilder::new().check_state(CheckState::Checked);
        let check = builder.initialize().unwrap();
        assert_eq!(check.check_state(), CheckState::Checked);
    }

    #[test]
    fn test_group_validator_marks_every_member() {
        setup();
        let mut email = CheckBoxBuilder::new()
            .text("Email")
            .group("contact-test")
            .group_validator(GroupValidator::at_least_one());
        let mut phone = CheckBoxBuilder::new().text("Phone").group("contact-test");
        let email_box = email.initialize().unwrap();
        let phone_box = phone.initialize().unwrap();

        let group = CheckBoxGroup::named("contact-test");
        assert_eq!(group.members().len(), 2);

        let result = group.validate();
        assert!(!result.is_valid());
        for member in [&email_box, &phone_box] {
            assert!(member.widget_base().style_layer(GROUP_ERROR_LAYER).is_some());
            assert_eq!(member.widget_base().tool_tip(), "Select at least one option");
        }

        phone_box.set_checked(true);
        assert!(group.last_result().unwrap().is_valid());
        for member in [&email_box, &phone_box] {
            assert!(member.widget_base().style_layer(GROUP_ERROR_LAYER).is_none());
            assert_eq!(member.widget_base().tool_tip(), "");
        }
        assert_eq!(group.checked(), vec![phone_box.object_id()]);
    }

    #[test]
    fn test_validity_changes_are_signalled() {
        setup();
        let group = CheckBoxGroup::named("signal-test");
        group.set_validator(Some(GroupValidator::at_most(1)));
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        group.validation_changed.connect(move |valid| sink.lock().push(*valid));

        let a = CheckBox::new().unwrap();
        let b = CheckBox::new().unwrap();
        assert!(group.add(&a));
        assert!(!group.add(&a));
        group.add(&b);

        a.set_checked(true);
        b.set_checked(true);
        b.set_checked(false);
        assert_eq!(*changes.lock(), vec![true, false, true]);
    }
}
