//! Widget system for Horizon Trellis.
//!
//! This module provides the headless widget layer: the [`Widget`] trait, the
//! shared [`WidgetBase`], the native widget classes in [`widgets`], keyboard
//! shortcuts, completers, input masks and input validators.
//!
//! # Ownership
//!
//! Widgets are shared as `Arc<W>`. Calling [`set_parent`] records the
//! parent-child relation in the object tree and hands an owning handle to the
//! tree, so a child stays alive as long as its parent does. Destroying a
//! parent drops the handles of the whole subtree.
//!
//! # Reflective properties
//!
//! Every widget answers [`Widget::set_property`] / [`Widget::property`] for
//! the base names in [`WidgetBase::PROPERTY_NAMES`] plus its own class
//! properties. Unknown names fail with [`PropertyError::NotFound`].

pub mod base;
pub mod completer;
pub mod input_mask;
pub mod shortcut;
pub mod validator;
pub mod widgets;

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::RwLock;

pub use base::{EventFilter, EventFilterId, FocusPolicy, GraphicsEffect, WidgetBase, expect};
pub use completer::{CaseSensitivity, Completer, CompleterModel, MatchMode, StringListModel};
pub use input_mask::InputMask;
pub use shortcut::{
    KeyCombination, KeySequence, KeySequenceParseError, SequenceMatch, Shortcut, ShortcutManager,
    ShortcutResult,
};
pub use validator::{
    DoubleValidator, FnValidator, IntValidator, RegexValidator, ValidationState, Validator,
};
pub use widgets::AbstractButton;

use crate::event::WidgetEvent;
use crate::logging::targets;
use crate::object::{ObjectError, ObjectId, ObjectResult, global_registry};
use crate::property::PropertyError;
use crate::signal::Signal;
use crate::variant::Variant;

/// A shared reference to any widget.
pub type WidgetRef = Arc<dyn Widget>;

/// The interface every native widget implements.
pub trait Widget: Any + Send + Sync {
    /// The shared base state.
    fn widget_base(&self) -> &WidgetBase;

    /// The class name reported in logs and errors (e.g. `"PushButton"`).
    fn class_name(&self) -> &'static str;

    fn object_id(&self) -> ObjectId {
        self.widget_base().object_id()
    }

    /// Set a property by name.
    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        self.widget_base().set_property(name, value)
    }

    /// Read a property by name.
    fn property(&self, name: &str) -> Option<Variant> {
        self.widget_base().property(name)
    }

    /// Names accepted by [`set_property`](Self::set_property).
    fn property_names(&self) -> Vec<&'static str> {
        WidgetBase::PROPERTY_NAMES.to_vec()
    }

    /// Class-specific event handling. Returns whether the event was handled.
    fn event(&self, _event: &WidgetEvent) -> bool {
        false
    }

    /// Text-editing capabilities, for widgets that hold editable text.
    fn as_text_input(&self) -> Option<&dyn TextInput> {
        None
    }

    /// Button capabilities, for widgets built on [`AbstractButton`].
    fn as_button(&self) -> Option<&AbstractButton> {
        None
    }
}

impl dyn Widget {
    /// Downcast to a concrete widget type.
    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    pub fn is<T: Widget>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Deliver an event.
    ///
    /// Event filters see the event first and may consume it. Focus and hover
    /// state are tracked next. Input events then reach the widget's own
    /// handler unless the widget is disabled.
    pub fn send_event(&self, event: &WidgetEvent) -> bool {
        let base = self.widget_base();
        if base.filter_event(event) {
            tracing::trace!(target: targets::WIDGET, id = ?self.object_id(), event = event.kind(), "event consumed by filter");
            return true;
        }
        base.apply_state_event(event);
        let is_input = matches!(
            event,
            WidgetEvent::MousePress { .. }
                | WidgetEvent::MouseRelease { .. }
                | WidgetEvent::MouseDoubleClick { .. }
                | WidgetEvent::KeyPress { .. }
        );
        if is_input && !base.is_enabled() {
            return false;
        }
        self.event(event)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property_names().contains(&name)
    }
}

/// Capabilities of widgets holding editable text.
///
/// Operations a widget does not support return `false`.
pub trait TextInput: Send + Sync {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// Emitted with the new text after every change.
    fn text_changed(&self) -> &Signal<String>;

    fn clear(&self) {
        self.set_text("");
    }

    fn select_all(&self) {}

    fn selected_text(&self) -> String {
        String::new()
    }

    fn set_completer(&self, _completer: Option<Arc<Completer>>) -> bool {
        false
    }

    fn completer(&self) -> Option<Arc<Completer>> {
        None
    }

    fn set_input_mask(&self, _mask: &str) -> bool {
        false
    }

    fn set_validator(&self, _validator: Option<Arc<dyn Validator>>) -> bool {
        false
    }
}

// =============================================================================
// Widget index
// =============================================================================

struct IndexEntry {
    widget: Weak<dyn Widget>,
    any: Weak<dyn Any + Send + Sync>,
}

static WIDGETS: LazyLock<RwLock<HashMap<ObjectId, IndexEntry>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Make a widget discoverable through [`find_widget`].
///
/// Native widgets register themselves on construction. The entry is removed
/// when the widget is destroyed.
pub fn register_widget<W: Widget>(widget: &Arc<W>) {
    let id = widget.object_id();
    let as_widget: Arc<dyn Widget> = widget.clone();
    let as_any: Arc<dyn Any + Send + Sync> = widget.clone();
    WIDGETS.write().insert(
        id,
        IndexEntry {
            widget: Arc::downgrade(&as_widget),
            any: Arc::downgrade(&as_any),
        },
    );
    if let Ok(registry) = global_registry() {
        registry.on_destroyed(id, |id| {
            WIDGETS.write().remove(&id);
        });
    }
    tracing::trace!(target: targets::WIDGET, ?id, class = widget.class_name(), "widget registered");
}

/// Look up a live widget by id.
pub fn find_widget(id: ObjectId) -> Option<WidgetRef> {
    let weak = WIDGETS.read().get(&id).map(|entry| entry.widget.clone())?;
    weak.upgrade()
}

/// Recover the concrete type of a shared widget.
pub fn downcast_arc<T: Widget>(widget: &WidgetRef) -> Option<Arc<T>> {
    let weak = WIDGETS
        .read()
        .get(&widget.object_id())
        .map(|entry| entry.any.clone())?;
    weak.upgrade()?.downcast::<T>().ok()
}

/// Attach `child` under `parent`, or detach it with `None`.
///
/// Attaching transfers an owning handle to the tree; detaching releases it,
/// leaving the caller's references as the only owners.
pub fn set_parent(child: &WidgetRef, parent: Option<&WidgetRef>) -> ObjectResult<()> {
    let registry = global_registry()?;
    let id = child.object_id();
    match parent {
        Some(parent) => {
            registry.set_parent(id, Some(parent.object_id()))?;
            let handle = WIDGETS
                .read()
                .get(&id)
                .and_then(|entry| entry.any.upgrade())
                .ok_or(ObjectError::InvalidObjectId)?;
            registry.adopt(id, handle)?;
        }
        None => {
            registry.set_parent(id, None)?;
            // Dropped here, outside the registry lock.
            let _released = registry.release(id)?;
        }
    }
    Ok(())
}

/// Destroy a widget and its subtree.
pub fn destroy(widget: &WidgetRef) -> ObjectResult<()> {
    tracing::debug!(target: targets::WIDGET, id = ?widget.object_id(), class = widget.class_name(), "destroying widget");
    global_registry()?.destroy(widget.object_id())
}

/// Live widgets among the children of `widget`.
pub fn child_widgets(widget: &dyn Widget) -> Vec<WidgetRef> {
    widget
        .widget_base()
        .children_ids()
        .into_iter()
        .filter_map(find_widget)
        .collect()
}

/// Live descendant widgets of `widget` in depth-first pre-order.
pub fn descendant_widgets(widget: &dyn Widget) -> Vec<WidgetRef> {
    global_registry()
        .and_then(|registry| registry.depth_first_preorder(widget.object_id()))
        .map(|ids| ids.into_iter().skip(1).filter_map(find_widget).collect())
        .unwrap_or_default()
}

/// Find a descendant widget by object name.
pub fn find_child_widget(widget: &dyn Widget, name: &str) -> Option<WidgetRef> {
    global_registry()
        .ok()?
        .find_descendants_by_name(widget.object_id(), name)
        .ok()?
        .into_iter()
        .find_map(find_widget)
}
