//! Table and tree builders.

use std::sync::Arc;

use horizon_trellis_core::widget::widgets::{Cell, TableWidget, TreeItemId, TreeWidget};
use horizon_trellis_core::{Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement, tree_item_from_variant};
use crate::logging::targets;

fn cell_changed(table: &TableWidget) -> &Signal<Cell> {
    &table.cell_changed
}

fn current_cell_changed(table: &TableWidget) -> &Signal<Option<Cell>> {
    &table.current_cell_changed
}

fn cell_activated(table: &TableWidget) -> &Signal<Cell> {
    &table.cell_activated
}

/// Builds a [`TableWidget`].
///
/// Events: `cellChanged(row, column)`, `currentCellChanged(row, column)`
/// (cell handlers skip a cleared current cell), `cellActivated(row, column)`.
#[derive(Debug)]
pub struct TableBuilder {
    core: ElementCore<TableWidget>,
    rows: Vec<Vec<String>>,
    current_cell: Option<Cell>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("TableWidget"),
            rows: Vec::new(),
            current_cell: None,
        }
    }

    pub fn row_count(self, rows: usize) -> Self {
        self.with_property("rowCount", rows)
    }

    pub fn column_count(self, columns: usize) -> Self {
        self.with_property("columnCount", columns)
    }

    /// Column headers; the table widens to fit them.
    pub fn headers<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.with_property("horizontalHeaderLabels", labels)
    }

    pub fn row_headers<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.with_property("verticalHeaderLabels", labels)
    }

    pub fn alternating_row_colors(self, enabled: bool) -> Self {
        self.with_property("alternatingRowColors", enabled)
    }

    pub fn sorting_enabled(self, enabled: bool) -> Self {
        self.with_property("sortingEnabled", enabled)
    }

    /// Append a data row, filled in from the first column.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Select a cell once the data rows are in.
    pub fn current_cell(mut self, row: usize, column: usize) -> Self {
        self.current_cell = Some((row, column));
        self
    }

    pub fn on_cell_changed(self, handler: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.with_event("cellChanged", EventHandler::cell(handler))
    }

    pub fn on_current_cell_changed(self, handler: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.with_event("currentCellChanged", EventHandler::cell(handler))
    }

    pub fn on_cell_activated(self, handler: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.with_event("cellActivated", EventHandler::cell(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn item(&self, row: usize, column: usize) -> Option<String> {
        self.core.widget().and_then(|table| table.item(row, column))
    }

    /// Write a cell. Returns `false` before initialization or outside the grid.
    pub fn set_item(&self, row: usize, column: usize, text: impl Into<String>) -> bool {
        self.core.widget().is_some_and(|table| table.set_item(row, column, text))
    }

    pub fn insert_row(&self, row: usize) {
        if let Some(table) = self.core.widget() {
            table.insert_row(row);
        }
    }

    pub fn remove_row(&self, row: usize) -> bool {
        self.core.widget().is_some_and(|table| table.remove_row(row))
    }

    pub fn insert_column(&self, column: usize) {
        if let Some(table) = self.core.widget() {
            table.insert_column(column);
        }
    }

    pub fn remove_column(&self, column: usize) -> bool {
        self.core.widget().is_some_and(|table| table.remove_column(column))
    }

    pub fn rows(&self) -> usize {
        self.core.widget().map_or(self.rows.len(), |table| table.row_count())
    }

    pub fn columns(&self) -> usize {
        self.core.widget().map_or(0, |table| table.column_count())
    }

    pub fn find_items(&self, needle: &str) -> Vec<Cell> {
        self.core.widget().map(|table| table.find_items(needle)).unwrap_or_default()
    }

    pub fn sort_by_column(&self, column: usize, ascending: bool) {
        if let Some(table) = self.core.widget() {
            table.sort_by_column(column, ascending);
        }
    }

    pub fn clear_contents(&self) {
        if let Some(table) = self.core.widget() {
            table.clear_contents();
        }
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for TableBuilder {
    type Widget = TableWidget;

    fn core(&self) -> &ElementCore<TableWidget> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<TableWidget> {
        &mut self.core
    }

    /// Data rows and the current cell go in before any handler is wired.
    fn create_widget(&self) -> crate::Result<Arc<TableWidget>> {
        let table = TableWidget::new()?;
        if !self.rows.is_empty() {
            tracing::trace!(target: targets::ELEMENT, rows = self.rows.len(), "filling table");
            table.set_rows(self.rows.iter().map(|row| row.iter().map(String::as_str)));
        }
        if let Some((row, column)) = self.current_cell {
            table.set_current_cell(row, column);
        }
        Ok(table)
    }

    fn connect_event(
        &self,
        widget: &Arc<TableWidget>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "cellChanged" => handler.bind(widget, cell_changed),
            "currentCellChanged" => handler.bind(widget, current_cell_changed),
            "cellActivated" => handler.bind(widget, cell_activated),
            _ => bind_common(widget, event, handler),
        }
    }
}

/// A tree item declared before the tree exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    texts: Vec<String>,
    children: Vec<TreeNode>,
    expanded: bool,
}

impl TreeNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
            ..Self::default()
        }
    }

    /// Text for the next column.
    pub fn column(mut self, text: impl Into<String>) -> Self {
        self.texts.push(text.into());
        self
    }

    pub fn child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Columns used by this node and its descendants.
    fn width(&self) -> usize {
        self.children
            .iter()
            .map(TreeNode::width)
            .fold(self.texts.len(), usize::max)
    }

    fn insert(&self, tree: &TreeWidget, parent: Option<TreeItemId>) -> Option<TreeItemId> {
        let (first, rest) = self.texts.split_first()?;
        let id = match parent {
            Some(parent) => tree.add_child(parent, first.as_str())?,
            None => tree.add_top_level_item(first.as_str()),
        };
        for (offset, text) in rest.iter().enumerate() {
            tree.set_text(id, offset + 1, text.as_str());
        }
        for child in &self.children {
            child.insert(tree, Some(id));
        }
        if self.expanded {
            tree.expand(id);
        }
        Some(id)
    }
}

fn item_changed(tree: &TreeWidget) -> &Signal<TreeItemId> {
    &tree.item_changed
}

fn item_expanded(tree: &TreeWidget) -> &Signal<TreeItemId> {
    &tree.item_expanded
}

fn item_collapsed(tree: &TreeWidget) -> &Signal<TreeItemId> {
    &tree.item_collapsed
}

fn item_activated(tree: &TreeWidget) -> &Signal<TreeItemId> {
    &tree.item_activated
}

fn item_handler(handler: impl Fn(TreeItemId) + Send + Sync + 'static) -> EventHandler {
    EventHandler::value(move |value| {
        if let Some(id) = tree_item_from_variant(value) {
            handler(id);
        }
    })
}

type CurrentItemHandler = Arc<dyn Fn(Option<TreeItemId>) + Send + Sync>;

/// Builds a [`TreeWidget`].
///
/// Events: `itemChanged`, `itemExpanded`, `itemCollapsed` and `itemActivated`
/// deliver the item id; a `Value` handler gets its raw bits, which
/// [`tree_item_from_variant`] turns back into an id. The current item is
/// observed through [`TreeBuilder::on_current_item_changed`].
pub struct TreeBuilder {
    core: ElementCore<TreeWidget>,
    nodes: Vec<TreeNode>,
    expand_all: bool,
    current_item_handlers: Vec<CurrentItemHandler>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("TreeWidget"),
            nodes: Vec::new(),
            expand_all: false,
            current_item_handlers: Vec::new(),
        }
    }

    pub fn column_count(self, columns: usize) -> Self {
        self.with_property("columnCount", columns)
    }

    pub fn headers<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.with_property("headerLabels", labels)
    }

    pub fn root_decorated(self, decorated: bool) -> Self {
        self.with_property("rootIsDecorated", decorated)
    }

    /// Add a top-level item with its subtree.
    pub fn item(mut self, node: TreeNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn expand_all(mut self, expand: bool) -> Self {
        self.expand_all = expand;
        self
    }

    pub fn on_item_changed(self, handler: impl Fn(TreeItemId) + Send + Sync + 'static) -> Self {
        self.with_event("itemChanged", item_handler(handler))
    }

    pub fn on_item_expanded(self, handler: impl Fn(TreeItemId) + Send + Sync + 'static) -> Self {
        self.with_event("itemExpanded", item_handler(handler))
    }

    pub fn on_item_collapsed(self, handler: impl Fn(TreeItemId) + Send + Sync + 'static) -> Self {
        self.with_event("itemCollapsed", item_handler(handler))
    }

    pub fn on_item_activated(self, handler: impl Fn(TreeItemId) + Send + Sync + 'static) -> Self {
        self.with_event("itemActivated", item_handler(handler))
    }

    pub fn on_current_item_changed(
        mut self,
        handler: impl Fn(Option<TreeItemId>) + Send + Sync + 'static,
    ) -> Self {
        let handler: CurrentItemHandler = Arc::new(handler);
        if let Some(tree) = self.core.widget() {
            tree.current_item_changed.connect(move |id| handler(*id));
        } else {
            self.current_item_handlers.push(handler);
        }
        self
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    /// Add a top-level item. `None` before initialization.
    pub fn add_root(&self, text: impl Into<String>) -> Option<TreeItemId> {
        self.core.widget().map(|tree| tree.add_top_level_item(text))
    }

    pub fn add_child(&self, parent: TreeItemId, text: impl Into<String>) -> Option<TreeItemId> {
        self.core.widget().and_then(|tree| tree.add_child(parent, text))
    }

    /// Insert a declared subtree under `parent`, or at the top level.
    pub fn add_node(&self, parent: Option<TreeItemId>, node: &TreeNode) -> Option<TreeItemId> {
        self.core.widget().and_then(|tree| node.insert(tree, parent))
    }

    pub fn remove_item(&self, id: TreeItemId) -> bool {
        self.core.widget().is_some_and(|tree| tree.remove_item(id))
    }

    pub fn expand(&self, id: TreeItemId) {
        if let Some(tree) = self.core.widget() {
            tree.expand(id);
        }
    }

    pub fn collapse(&self, id: TreeItemId) {
        if let Some(tree) = self.core.widget() {
            tree.collapse(id);
        }
    }

    pub fn is_expanded(&self, id: TreeItemId) -> bool {
        self.core.widget().is_some_and(|tree| tree.is_expanded(id))
    }

    pub fn item_text(&self, id: TreeItemId, column: usize) -> Option<String> {
        self.core.widget().and_then(|tree| tree.text(id, column))
    }

    pub fn set_item_text(&self, id: TreeItemId, column: usize, text: impl Into<String>) -> bool {
        self.core.widget().is_some_and(|tree| tree.set_text(id, column, text))
    }

    pub fn top_level_items(&self) -> Vec<TreeItemId> {
        self.core.widget().map(|tree| tree.top_level_items()).unwrap_or_default()
    }

    pub fn find_items(&self, needle: &str, column: usize) -> Vec<TreeItemId> {
        self.core
            .widget()
            .map(|tree| tree.find_items(needle, column))
            .unwrap_or_default()
    }

    pub fn current_item(&self) -> Option<TreeItemId> {
        self.core.widget().and_then(|tree| tree.current_item())
    }

    pub fn set_current_item(&self, id: Option<TreeItemId>) {
        if let Some(tree) = self.core.widget() {
            tree.set_current_item(id);
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for TreeBuilder {
    type Widget = TreeWidget;

    fn core(&self) -> &ElementCore<TreeWidget> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<TreeWidget> {
        &mut self.core
    }

    /// Declared items go in before any handler is wired.
    fn create_widget(&self) -> crate::Result<Arc<TreeWidget>> {
        let tree = TreeWidget::new()?;
        let columns = self.nodes.iter().map(TreeNode::width).max().unwrap_or(1);
        if columns > tree.column_count() {
            tree.set_column_count(columns);
        }
        for node in &self.nodes {
            if node.insert(&tree, None).is_none() {
                tracing::warn!(target: targets::ELEMENT, "skipped tree item without text");
            }
        }
        if self.expand_all {
            tree.expand_all();
        }
        Ok(tree)
    }

    fn connect_event(
        &self,
        widget: &Arc<TreeWidget>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "itemChanged" => handler.bind(widget, item_changed),
            "itemExpanded" => handler.bind(widget, item_expanded),
            "itemCollapsed" => handler.bind(widget, item_collapsed),
            "itemActivated" => handler.bind(widget, item_activated),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_event_filters(&mut self, widget: &Arc<TreeWidget>) {
        for handler in self.current_item_handlers.drain(..) {
            widget.current_item_changed.connect(move |id| handler(*id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use parking_lot::Mutex;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_table_rows_headers_and_edits() {
        setup();
        let changed = Arc::new(Mutex::new(Vec::new()));
        let sink = changed.clone();
        let mut builder = TableBuilder::new()
            .headers(["Name", "Age"])
            .row(["Ada", "36"])
            .row(["Alan", "41"])
            .current_cell(1, 0)
            .on_cell_changed(move |row, column| sink.lock().push((row, column)));
        let table = builder.initialize().unwrap();

        assert_eq!(builder.rows(), 2);
        assert_eq!(builder.columns(), 2);
        assert_eq!(table.current_cell(), Some((1, 0)));
        assert_eq!(builder.item(1, 0).as_deref(), Some("Alan"));

        builder.insert_row(0);
        assert_eq!(table.current_cell(), Some((2, 0)));
        assert!(builder.set_item(0, 1, "29"));
        assert!(!builder.set_item(5, 5, "x"));
        assert_eq!(*changed.lock(), vec![(0, 1)]);

        assert!(builder.remove_column(0));
        assert_eq!(table.horizontal_header_labels(), vec!["Age".to_string()]);
        assert_eq!(table.current_cell(), None);
        assert_eq!(builder.find_items("4"), vec![(2, 0)]);
    }

    #[test]
    fn test_tree_nodes_and_expansion_events() {
        setup();
        let expanded = Arc::new(Mutex::new(Vec::new()));
        let sink = expanded.clone();
        let currents = Arc::new(Mutex::new(Vec::new()));
        let current_sink = currents.clone();
        let mut builder = TreeBuilder::new()
            .headers(["Name", "Kind"])
            .item(
                TreeNode::new("Fruit")
                    .column("group")
                    .child(TreeNode::new("Apple"))
                    .child(TreeNode::new("Pear")),
            )
            .item(TreeNode::new("Vegetables").expanded(true))
            .on_item_expanded(move |id| sink.lock().push(id))
            .on_current_item_changed(move |id| current_sink.lock().push(id));
        let tree = builder.initialize().unwrap();

        let roots = builder.top_level_items();
        assert_eq!(roots.len(), 2);
        assert_eq!(builder.item_text(roots[0], 1).as_deref(), Some("group"));
        assert_eq!(tree.children(roots[0]).len(), 2);
        assert!(builder.is_expanded(roots[1]));

        builder.expand(roots[0]);
        assert_eq!(*expanded.lock(), vec![roots[0]]);

        let pear = builder.find_items("Pear", 0)[0];
        builder.set_current_item(Some(pear));
        assert!(builder.remove_item(roots[0]));
        assert_eq!(*currents.lock(), vec![Some(pear), None]);

        let herbs = builder.add_root("Herbs").unwrap();
        assert_eq!(builder.add_child(herbs, "Basil").map(|id| tree.parent(id)), Some(Some(herbs)));
    }
}
