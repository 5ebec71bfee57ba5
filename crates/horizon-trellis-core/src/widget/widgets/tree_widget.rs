//! Tree of multi-column text items.
//!
//! Items live in an arena keyed by [`TreeItemId`]; ids of removed items stay
//! invalid forever, so a stale id is reported rather than aliasing a newer
//! item.

use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

new_key_type! {
    /// Identifies an item in a [`TreeWidget`].
    pub struct TreeItemId;
}

#[derive(Debug, Default)]
struct TreeItem {
    texts: Vec<String>,
    parent: Option<TreeItemId>,
    children: Vec<TreeItemId>,
    expanded: bool,
}

#[derive(Debug, Default)]
struct Forest {
    items: SlotMap<TreeItemId, TreeItem>,
    roots: Vec<TreeItemId>,
    current: Option<TreeItemId>,
}

impl Forest {
    fn siblings_mut(&mut self, parent: Option<TreeItemId>) -> Option<&mut Vec<TreeItemId>> {
        match parent {
            Some(parent) => self.items.get_mut(parent).map(|item| &mut item.children),
            None => Some(&mut self.roots),
        }
    }

    fn insert(&mut self, parent: Option<TreeItemId>, text: String) -> Option<TreeItemId> {
        if parent.is_some_and(|p| !self.items.contains_key(p)) {
            return None;
        }
        let id = self.items.insert(TreeItem {
            texts: vec![text],
            parent,
            ..TreeItem::default()
        });
        self.siblings_mut(parent)?.push(id);
        Some(id)
    }

    fn remove(&mut self, id: TreeItemId) -> bool {
        let Some(item) = self.items.get(id) else {
            return false;
        };
        let parent = item.parent;
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&sibling| sibling != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(item) = self.items.remove(next) {
                stack.extend(item.children);
            }
        }
        if self.current.is_some_and(|c| !self.items.contains_key(c)) {
            self.current = None;
        }
        true
    }

    /// Pre-order walk; `only_expanded` skips children of collapsed items.
    fn walk(&self, only_expanded: bool) -> Vec<TreeItemId> {
        let mut order = Vec::new();
        let mut stack: Vec<TreeItemId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(item) = self.items.get(id) else {
                continue;
            };
            order.push(id);
            if !only_expanded || item.expanded {
                stack.extend(item.children.iter().rev().copied());
            }
        }
        order
    }
}

/// A hierarchical list of items with one or more text columns.
///
/// # Signals
///
/// - `item_changed(TreeItemId)`: text of an item changed
/// - `item_expanded(TreeItemId)` / `item_collapsed(TreeItemId)`
/// - `current_item_changed(Option<TreeItemId>)`
/// - `item_activated(TreeItemId)`: Enter on the current item
pub struct TreeWidget {
    base: WidgetBase,
    forest: RwLock<Forest>,
    column_count: Property<usize>,
    header_labels: Property<Vec<String>>,
    root_is_decorated: Property<bool>,

    pub item_changed: Signal<TreeItemId>,
    pub item_expanded: Signal<TreeItemId>,
    pub item_collapsed: Signal<TreeItemId>,
    pub current_item_changed: Signal<Option<TreeItemId>>,
    pub item_activated: Signal<TreeItemId>,
}

impl TreeWidget {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "columnCount",
        "headerLabels",
        "rootIsDecorated",
        "topLevelItemCount",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let tree = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            forest: RwLock::new(Forest::default()),
            column_count: Property::new(1),
            header_labels: Property::default(),
            root_is_decorated: Property::new(true),
            item_changed: Signal::new(),
            item_expanded: Signal::new(),
            item_collapsed: Signal::new(),
            current_item_changed: Signal::new(),
            item_activated: Signal::new(),
        });
        register_widget(&tree);
        Ok(tree)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn add_top_level_item(&self, text: impl Into<String>) -> TreeItemId {
        let mut forest = self.forest.write();
        let id = forest.items.insert(TreeItem {
            texts: vec![text.into()],
            ..TreeItem::default()
        });
        forest.roots.push(id);
        id
    }

    /// Append a child under `parent`. Returns `None` for a stale parent.
    pub fn add_child(&self, parent: TreeItemId, text: impl Into<String>) -> Option<TreeItemId> {
        self.forest.write().insert(Some(parent), text.into())
    }

    /// Remove an item and its subtree.
    pub fn remove_item(&self, id: TreeItemId) -> bool {
        let (removed, current_cleared) = {
            let mut forest = self.forest.write();
            let had_current = forest.current.is_some();
            let removed = forest.remove(id);
            (removed, had_current && forest.current.is_none())
        };
        if current_cleared {
            self.current_item_changed.emit(None);
        }
        removed
    }

    pub fn clear(&self) {
        let had_current = {
            let mut forest = self.forest.write();
            let had_current = forest.current.is_some();
            *forest = Forest::default();
            had_current
        };
        if had_current {
            self.current_item_changed.emit(None);
        }
    }

    pub fn contains(&self, id: TreeItemId) -> bool {
        self.forest.read().items.contains_key(id)
    }

    pub fn top_level_items(&self) -> Vec<TreeItemId> {
        self.forest.read().roots.clone()
    }

    pub fn top_level_item_count(&self) -> usize {
        self.forest.read().roots.len()
    }

    pub fn children(&self, id: TreeItemId) -> Vec<TreeItemId> {
        self.forest
            .read()
            .items
            .get(id)
            .map(|item| item.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: TreeItemId) -> Option<TreeItemId> {
        self.forest.read().items.get(id).and_then(|item| item.parent)
    }

    /// All items, depth-first.
    pub fn all_items(&self) -> Vec<TreeItemId> {
        self.forest.read().walk(false)
    }

    /// Items reachable without passing through a collapsed item.
    pub fn visible_items(&self) -> Vec<TreeItemId> {
        self.forest.read().walk(true)
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn text(&self, id: TreeItemId, column: usize) -> Option<String> {
        self.forest
            .read()
            .items
            .get(id)
            .map(|item| item.texts.get(column).cloned().unwrap_or_default())
    }

    /// Set the text of one column. Columns past the column count are refused.
    pub fn set_text(&self, id: TreeItemId, column: usize, text: impl Into<String>) -> bool {
        if column >= self.column_count() {
            return false;
        }
        {
            let mut forest = self.forest.write();
            let Some(item) = forest.items.get_mut(id) else {
                return false;
            };
            if item.texts.len() <= column {
                item.texts.resize(column + 1, String::new());
            }
            item.texts[column] = text.into();
        }
        self.item_changed.emit(id);
        true
    }

    /// Items whose text in `column` contains `needle`, depth-first.
    pub fn find_items(&self, needle: &str, column: usize) -> Vec<TreeItemId> {
        let forest = self.forest.read();
        forest
            .walk(false)
            .into_iter()
            .filter(|&id| {
                forest.items[id]
                    .texts
                    .get(column)
                    .is_some_and(|text| text.contains(needle))
            })
            .collect()
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    pub fn is_expanded(&self, id: TreeItemId) -> bool {
        self.forest.read().items.get(id).is_some_and(|item| item.expanded)
    }

    pub fn expand(&self, id: TreeItemId) {
        self.set_expanded(id, true);
    }

    pub fn collapse(&self, id: TreeItemId) {
        self.set_expanded(id, false);
    }

    pub fn set_expanded(&self, id: TreeItemId, expanded: bool) {
        let changed = {
            let mut forest = self.forest.write();
            match forest.items.get_mut(id) {
                Some(item) if item.expanded != expanded => {
                    item.expanded = expanded;
                    true
                }
                _ => false,
            }
        };
        if changed {
            if expanded {
                self.item_expanded.emit(id);
            } else {
                self.item_collapsed.emit(id);
            }
        }
    }

    pub fn expand_all(&self) {
        for id in self.all_items() {
            self.expand(id);
        }
    }

    pub fn collapse_all(&self) {
        for id in self.all_items() {
            self.collapse(id);
        }
    }

    // =========================================================================
    // Current item
    // =========================================================================

    pub fn current_item(&self) -> Option<TreeItemId> {
        self.forest.read().current
    }

    /// Stale ids are ignored.
    pub fn set_current_item(&self, id: Option<TreeItemId>) {
        let changed = {
            let mut forest = self.forest.write();
            if id.is_some_and(|id| !forest.items.contains_key(id)) || forest.current == id {
                false
            } else {
                forest.current = id;
                true
            }
        };
        if changed {
            self.current_item_changed.emit(id);
        }
    }

    // =========================================================================
    // Columns
    // =========================================================================

    pub fn column_count(&self) -> usize {
        self.column_count.get()
    }

    pub fn set_column_count(&self, count: usize) {
        self.column_count.set(count.max(1));
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.header_labels.get()
    }

    /// Set header labels, widening the column count to fit them.
    pub fn set_header_labels(&self, labels: Vec<String>) {
        if labels.len() > self.column_count() {
            self.set_column_count(labels.len());
        }
        self.header_labels.set(labels);
    }

    pub fn root_is_decorated(&self) -> bool {
        self.root_is_decorated.get()
    }

    pub fn set_root_is_decorated(&self, decorated: bool) {
        self.root_is_decorated.set(decorated);
    }

    fn navigate(&self, key: Key) -> bool {
        let visible = self.visible_items();
        let current = self.current_item();
        let position = current.and_then(|c| visible.iter().position(|&id| id == c));
        match (key, current) {
            (Key::ArrowDown, _) => {
                let next = position.map_or(0, |p| (p + 1).min(visible.len().saturating_sub(1)));
                self.set_current_item(visible.get(next).copied());
            }
            (Key::ArrowUp, _) => {
                let next = position.map_or(0, |p| p.saturating_sub(1));
                self.set_current_item(visible.get(next).copied());
            }
            (Key::ArrowRight, Some(id)) => self.expand(id),
            (Key::ArrowLeft, Some(id)) if self.is_expanded(id) => self.collapse(id),
            (Key::ArrowLeft, Some(id)) => {
                if let Some(parent) = self.parent(id) {
                    self.set_current_item(Some(parent));
                }
            }
            (Key::Enter, Some(id)) => self.item_activated.emit(id),
            _ => return false,
        }
        true
    }
}

impl Widget for TreeWidget {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "TreeWidget"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "columnCount" => self.set_column_count(expect(&value, "uint")?),
            "headerLabels" => self.set_header_labels(expect(&value, "stringlist")?),
            "rootIsDecorated" => self.set_root_is_decorated(expect(&value, "bool")?),
            "topLevelItemCount" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "columnCount" => Some(self.column_count().into()),
            "headerLabels" => Some(self.header_labels().into()),
            "rootIsDecorated" => Some(self.root_is_decorated().into()),
            "topLevelItemCount" => Some(self.top_level_item_count().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key, .. } => self.navigate(*key),
            _ => false,
        }
    }
}

static_assertions::assert_impl_all!(TreeWidget: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::widget::WidgetRef;

    fn tree() -> Arc<TreeWidget> {
        init_global_registry();
        TreeWidget::new().unwrap()
    }

    #[test]
    fn test_structure_and_removal() {
        let tree = tree();
        let fruit = tree.add_top_level_item("Fruit");
        let apple = tree.add_child(fruit, "Apple").unwrap();
        let seed = tree.add_child(apple, "Seed").unwrap();
        let veg = tree.add_top_level_item("Vegetables");

        assert_eq!(tree.all_items(), vec![fruit, apple, seed, veg]);
        assert_eq!(tree.parent(seed), Some(apple));

        tree.set_current_item(Some(seed));
        assert!(tree.remove_item(apple));
        assert!(!tree.contains(seed));
        assert_eq!(tree.current_item(), None);
        assert_eq!(tree.add_child(apple, "Stale"), None);
        assert_eq!(tree.children(fruit), Vec::new());
    }

    #[test]
    fn test_visible_items_follow_expansion() {
        let tree = tree();
        let root = tree.add_top_level_item("root");
        let child = tree.add_child(root, "child").unwrap();
        assert_eq!(tree.visible_items(), vec![root]);

        tree.expand_all();
        assert_eq!(tree.visible_items(), vec![root, child]);
        tree.collapse(root);
        assert_eq!(tree.visible_items(), vec![root]);
    }

    #[test]
    fn test_columns() {
        let tree = tree();
        tree.set_property("headerLabels", Variant::from(&["Name", "Size"][..]))
            .unwrap();
        assert_eq!(tree.column_count(), 2);
        let item = tree.add_top_level_item("a.txt");
        assert!(tree.set_text(item, 1, "4 KB"));
        assert!(!tree.set_text(item, 2, "extra"));
        assert_eq!(tree.text(item, 1).as_deref(), Some("4 KB"));
        assert_eq!(tree.find_items("KB", 1), vec![item]);
    }

    #[test]
    fn test_keyboard_navigation() {
        let tree = tree();
        let root = tree.add_top_level_item("root");
        let child = tree.add_child(root, "child").unwrap();
        let widget: WidgetRef = tree.clone();
        let press = |key| widget.send_event(&WidgetEvent::key_press(key, KeyboardModifiers::NONE));

        press(Key::ArrowDown);
        assert_eq!(tree.current_item(), Some(root));
        press(Key::ArrowRight);
        press(Key::ArrowDown);
        assert_eq!(tree.current_item(), Some(child));
        press(Key::ArrowLeft);
        assert_eq!(tree.current_item(), Some(root));
        press(Key::ArrowLeft);
        assert!(!tree.is_expanded(root));
    }
}
