//! Combo box widget.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Completer, TextInput, Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

/// A drop-down list of text items, optionally editable.
///
/// The current index is `-1` while the list is empty. Setting an index that
/// is out of range is ignored, so an index must be applied after the items
/// it refers to. Adding the first item selects it.
///
/// # Signals
///
/// - `current_index_changed(i32)`
/// - `current_text_changed(String)`
/// - `activated(i32)`: an item was chosen by the user
pub struct ComboBox {
    base: WidgetBase,
    items: RwLock<Vec<String>>,
    current_index: Property<i32>,
    editable: Property<bool>,
    edit_text: Property<String>,
    max_visible_items: Property<i32>,
    completer: RwLock<Option<Arc<Completer>>>,

    pub current_index_changed: Signal<i32>,
    pub current_text_changed: Signal<String>,
    pub activated: Signal<i32>,
}

impl ComboBox {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "items",
        "count",
        "currentIndex",
        "currentText",
        "editable",
        "maxVisibleItems",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let combo = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            items: RwLock::new(Vec::new()),
            current_index: Property::new(-1),
            editable: Property::new(false),
            edit_text: Property::default(),
            max_visible_items: Property::new(10),
            completer: RwLock::new(None),
            current_index_changed: Signal::new(),
            current_text_changed: Signal::new(),
            activated: Signal::new(),
        });
        register_widget(&combo);
        Ok(combo)
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn count(&self) -> usize {
        self.items.read().len()
    }

    pub fn items(&self) -> Vec<String> {
        self.items.read().clone()
    }

    pub fn item_text(&self, index: usize) -> Option<String> {
        self.items.read().get(index).cloned()
    }

    pub fn set_item_text(&self, index: usize, text: impl Into<String>) -> bool {
        let updated = {
            let mut items = self.items.write();
            match items.get_mut(index) {
                Some(item) => {
                    *item = text.into();
                    true
                }
                None => false,
            }
        };
        if updated && self.current_index() == index as i32 {
            self.current_text_changed.emit(self.current_text());
        }
        updated
    }

    pub fn add_item(&self, text: impl Into<String>) {
        let count = self.count();
        self.insert_item(count, text);
    }

    pub fn add_items<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self.add_item(item);
        }
    }

    /// Insert at `index`, appending when past the end.
    pub fn insert_item(&self, index: usize, text: impl Into<String>) {
        let was_empty = {
            let mut items = self.items.write();
            let index = index.min(items.len());
            items.insert(index, text.into());
            items.len() == 1
        };
        let current = self.current_index();
        if was_empty {
            self.select(0);
        } else if current >= 0 && index <= current as usize {
            self.select(current + 1);
        }
    }

    /// Remove the item at `index`. The selection moves to the item that
    /// takes its place, or the new last item.
    pub fn remove_item(&self, index: usize) -> bool {
        let remaining = {
            let mut items = self.items.write();
            if index >= items.len() {
                return false;
            }
            items.remove(index);
            items.len() as i32
        };
        let current = self.current_index();
        let next = if remaining == 0 {
            -1
        } else if current > index as i32 || current >= remaining {
            current - 1
        } else {
            current
        };
        if next == current && current == index as i32 {
            // Same index, different item.
            self.current_text_changed.emit(self.current_text());
        } else {
            self.select(next);
        }
        true
    }

    pub fn clear(&self) {
        self.items.write().clear();
        self.select(-1);
    }

    pub fn find_text(&self, text: &str) -> Option<usize> {
        self.items.read().iter().position(|item| item == text)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn current_index(&self) -> i32 {
        self.current_index.get()
    }

    /// Select an item. `-1` clears the selection; other out-of-range
    /// indices are ignored.
    pub fn set_current_index(&self, index: i32) {
        if index == -1 || (0..self.count() as i32).contains(&index) {
            self.select(index);
        }
    }

    /// The selected item's text, or the edit text of an editable combo box.
    pub fn current_text(&self) -> String {
        if self.is_editable() {
            return self.edit_text.get();
        }
        let index = self.current_index();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.item_text(i))
            .unwrap_or_default()
    }

    /// Select the item with this text. An editable combo box without such an
    /// item takes the text as its edit text.
    pub fn set_current_text(&self, text: &str) {
        match self.find_text(text) {
            Some(index) => self.set_current_index(index as i32),
            None if self.is_editable() => {
                if self.edit_text.set(text.to_string()) {
                    self.current_text_changed.emit(text.to_string());
                }
            }
            None => {}
        }
    }

    fn select(&self, index: i32) {
        if !self.current_index.set(index) {
            return;
        }
        if self.is_editable() {
            let text = usize::try_from(index)
                .ok()
                .and_then(|i| self.item_text(i))
                .unwrap_or_default();
            self.edit_text.set(text);
        }
        self.current_index_changed.emit(index);
        self.current_text_changed.emit(self.current_text());
    }

    pub fn is_editable(&self) -> bool {
        self.editable.get()
    }

    pub fn set_editable(&self, editable: bool) {
        if self.editable.set(editable) && editable {
            let index = self.current_index();
            let text = usize::try_from(index)
                .ok()
                .and_then(|i| self.item_text(i))
                .unwrap_or_default();
            self.edit_text.set(text);
        }
    }

    pub fn max_visible_items(&self) -> i32 {
        self.max_visible_items.get()
    }

    pub fn set_max_visible_items(&self, count: i32) {
        self.max_visible_items.set(count.max(1));
    }

    fn activate(&self, index: i32) {
        self.set_current_index(index);
        if self.current_index() == index && index >= 0 {
            self.activated.emit(index);
        }
    }
}

impl TextInput for ComboBox {
    fn text(&self) -> String {
        self.current_text()
    }

    fn set_text(&self, text: &str) {
        self.set_current_text(text);
    }

    fn text_changed(&self) -> &Signal<String> {
        &self.current_text_changed
    }

    fn clear(&self) {
        if self.is_editable() && self.edit_text.set(String::new()) {
            self.current_text_changed.emit(String::new());
        }
    }

    fn set_completer(&self, completer: Option<Arc<Completer>>) -> bool {
        if !self.is_editable() {
            return false;
        }
        *self.completer.write() = completer;
        true
    }

    fn completer(&self) -> Option<Arc<Completer>> {
        self.completer.read().clone()
    }
}

impl Widget for ComboBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "ComboBox"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "items" => {
                let items: Vec<String> = expect(&value, "stringlist")?;
                self.clear();
                self.add_items(items);
            }
            "currentIndex" => self.set_current_index(expect(&value, "int")?),
            "currentText" => self.set_current_text(&expect::<String>(&value, "string")?),
            "editable" => self.set_editable(expect(&value, "bool")?),
            "maxVisibleItems" => self.set_max_visible_items(expect(&value, "int")?),
            "count" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "items" => Some(self.items().into()),
            "count" => Some(self.count().into()),
            "currentIndex" => Some(self.current_index().into()),
            "currentText" => Some(self.current_text().into()),
            "editable" => Some(self.is_editable().into()),
            "maxVisibleItems" => Some(self.max_visible_items().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        let WidgetEvent::KeyPress { key, .. } = event else {
            return false;
        };
        let current = self.current_index();
        match key {
            Key::ArrowDown if current + 1 < self.count() as i32 => self.activate(current + 1),
            Key::ArrowUp if current > 0 => self.activate(current - 1),
            Key::Enter if self.is_editable() => {
                let text = self.edit_text.get();
                if !text.is_empty() && self.find_text(&text).is_none() {
                    self.add_item(text.clone());
                }
                if let Some(index) = self.find_text(&text) {
                    self.activate(index as i32);
                }
            }
            _ => return false,
        }
        true
    }

    fn as_text_input(&self) -> Option<&dyn TextInput> {
        Some(self)
    }
}

static_assertions::assert_impl_all!(ComboBox: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;

    fn combo() -> Arc<ComboBox> {
        init_global_registry();
        ComboBox::new().unwrap()
    }

    #[test]
    fn test_index_before_items_is_ignored() {
        let combo = combo();
        combo.set_current_index(2);
        assert_eq!(combo.current_index(), -1);

        combo.add_items(["a", "b", "c"]);
        assert_eq!(combo.current_index(), 0);
        combo.set_current_index(2);
        assert_eq!(combo.current_text(), "c");
    }

    #[test]
    fn test_insert_and_remove_track_selection() {
        let combo = combo();
        combo.add_items(["a", "b", "c"]);
        combo.set_current_index(1);

        combo.insert_item(0, "z");
        assert_eq!(combo.current_index(), 2);
        assert_eq!(combo.current_text(), "b");

        combo.remove_item(2);
        assert_eq!(combo.current_index(), 2);
        assert_eq!(combo.current_text(), "c");
        combo.remove_item(2);
        assert_eq!(combo.current_text(), "a");
        combo.clear();
        assert_eq!(combo.current_index(), -1);
    }

    #[test]
    fn test_editable_text() {
        let combo = combo();
        combo.add_items(["red", "green"]);
        combo.set_editable(true);
        assert_eq!(combo.current_text(), "red");
        combo.set_text("blue");
        assert_eq!(combo.current_text(), "blue");
        assert_eq!(combo.current_index(), 0);
        combo.set_text("green");
        assert_eq!(combo.current_index(), 1);
    }

    #[test]
    fn test_items_property_resets() {
        let combo = combo();
        combo.add_item("old");
        combo
            .set_property("items", Variant::from(&["x", "y"][..]))
            .unwrap();
        assert_eq!(combo.items(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(combo.property("currentIndex"), Some(Variant::Int(0)));
    }
}
