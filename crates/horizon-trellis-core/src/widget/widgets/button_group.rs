//! Grouping of checkable buttons.
//!
//! A [`ButtonGroup`] tracks a set of buttons and, when exclusive, keeps at
//! most one of them checked: checking a member unchecks the others, and a
//! checked member stays checked when clicked again.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::object::ObjectId;
use crate::signal::{ConnectionId, Signal};
use crate::widget::{WidgetRef, find_widget};

struct Member {
    id: ObjectId,
    toggled: ConnectionId,
    clicked: ConnectionId,
}

/// A logical group of buttons.
pub struct ButtonGroup {
    exclusive: RwLock<bool>,
    members: RwLock<Vec<Member>>,

    /// Emitted with the member and its new checked state.
    pub button_toggled: Signal<(ObjectId, bool)>,
    /// Emitted when a member is clicked.
    pub button_clicked: Signal<ObjectId>,
}

impl ButtonGroup {
    /// An exclusive group.
    pub fn new() -> Arc<Self> {
        Self::with_exclusive(true)
    }

    pub fn with_exclusive(exclusive: bool) -> Arc<Self> {
        Arc::new(Self {
            exclusive: RwLock::new(exclusive),
            members: RwLock::new(Vec::new()),
            button_toggled: Signal::new(),
            button_clicked: Signal::new(),
        })
    }

    pub fn is_exclusive(&self) -> bool {
        *self.exclusive.read()
    }

    pub fn set_exclusive(&self, exclusive: bool) {
        *self.exclusive.write() = exclusive;
        for button in self.live_members() {
            if let Some(button) = button.as_button() {
                button.set_exclusive(exclusive);
            }
        }
    }

    /// Add a button. Returns `false` if `widget` is not a button or is
    /// already a member.
    pub fn add_button(self: &Arc<Self>, widget: &WidgetRef) -> bool {
        let Some(button) = widget.as_button() else {
            return false;
        };
        let id = widget.object_id();
        if self.contains(id) {
            return false;
        }
        button.set_exclusive(self.is_exclusive());

        let group: Weak<Self> = Arc::downgrade(self);
        let toggled = button.toggled.connect(move |&checked| {
            if let Some(group) = group.upgrade() {
                group.member_toggled(id, checked);
            }
        });
        let group: Weak<Self> = Arc::downgrade(self);
        let clicked = button.clicked.connect(move |_| {
            if let Some(group) = group.upgrade() {
                group.button_clicked.emit(id);
            }
        });
        self.members.write().push(Member {
            id,
            toggled,
            clicked,
        });

        if button.is_checked() {
            self.member_toggled(id, true);
        }
        true
    }

    pub fn remove_button(&self, id: ObjectId) -> bool {
        let member = {
            let mut members = self.members.write();
            let Some(pos) = members.iter().position(|m| m.id == id) else {
                return false;
            };
            members.remove(pos)
        };
        if let Some(widget) = find_widget(id)
            && let Some(button) = widget.as_button()
        {
            button.toggled.disconnect(member.toggled);
            button.clicked.disconnect(member.clicked);
            button.set_exclusive(false);
        }
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.members.read().iter().any(|m| m.id == id)
    }

    /// Ids of the members, in insertion order.
    pub fn buttons(&self) -> Vec<ObjectId> {
        self.members.read().iter().map(|m| m.id).collect()
    }

    pub fn checked_button(&self) -> Option<ObjectId> {
        self.live_members()
            .into_iter()
            .find(|w| w.as_button().is_some_and(|b| b.is_checked()))
            .map(|w| w.object_id())
    }

    fn live_members(&self) -> Vec<WidgetRef> {
        let ids = self.buttons();
        ids.into_iter().filter_map(find_widget).collect()
    }

    fn member_toggled(&self, id: ObjectId, checked: bool) {
        if checked && self.is_exclusive() {
            for other in self.live_members() {
                if other.object_id() != id
                    && let Some(button) = other.as_button()
                {
                    button.set_checked(false);
                }
            }
        }
        self.button_toggled.emit((id, checked));
    }
}

impl std::fmt::Debug for ButtonGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonGroup")
            .field("exclusive", &self.is_exclusive())
            .field("buttons", &self.buttons())
            .finish()
    }
}

static_assertions::assert_impl_all!(ButtonGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use crate::widget::widgets::{CheckBox, RadioButton};

    #[test]
    fn test_exclusive_group() {
        init_global_registry();
        let a: WidgetRef = RadioButton::with_text("A").unwrap();
        let b: WidgetRef = RadioButton::with_text("B").unwrap();
        let group = ButtonGroup::new();
        assert!(group.add_button(&a));
        assert!(group.add_button(&b));
        assert!(!group.add_button(&a));

        a.as_button().unwrap().click();
        assert_eq!(group.checked_button(), Some(a.object_id()));
        b.as_button().unwrap().click();
        assert_eq!(group.checked_button(), Some(b.object_id()));
        assert!(!a.as_button().unwrap().is_checked());
    }

    #[test]
    fn test_non_exclusive_group() {
        init_global_registry();
        let a: WidgetRef = CheckBox::with_text("A").unwrap();
        let b: WidgetRef = CheckBox::with_text("B").unwrap();
        let group = ButtonGroup::with_exclusive(false);
        group.add_button(&a);
        group.add_button(&b);

        a.as_button().unwrap().click();
        b.as_button().unwrap().click();
        assert!(a.as_button().unwrap().is_checked());
        assert!(b.as_button().unwrap().is_checked());

        assert!(group.remove_button(a.object_id()));
        assert_eq!(group.buttons(), vec![b.object_id()]);
    }
}
