//! Table of text cells.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

/// A `(row, column)` cell position.
pub type Cell = (usize, usize);

#[derive(Debug, Default)]
struct Grid {
    columns: usize,
    rows: Vec<Vec<Option<String>>>,
    horizontal_headers: Vec<String>,
    vertical_headers: Vec<String>,
    current: Option<Cell>,
}

impl Grid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn set_columns(&mut self, columns: usize) {
        self.columns = columns;
        for row in &mut self.rows {
            row.resize(columns, None);
        }
        self.horizontal_headers.truncate(columns);
        self.fix_current();
    }

    fn set_rows(&mut self, rows: usize) {
        let columns = self.columns;
        self.rows.resize_with(rows, || vec![None; columns]);
        self.vertical_headers.truncate(rows);
        self.fix_current();
    }

    fn fix_current(&mut self) {
        if let Some((row, column)) = self.current
            && (row >= self.rows.len() || column >= self.columns)
        {
            self.current = None;
        }
    }
}

/// A grid of text cells with optional header labels.
///
/// Cells start empty. Writing a cell outside the grid fails; insertion and
/// removal of rows or columns shift the cells and the current cell.
///
/// # Signals
///
/// - `cell_changed((row, column))`
/// - `current_cell_changed(Option<(row, column)>)`
/// - `cell_activated((row, column))`: Enter on the current cell
pub struct TableWidget {
    base: WidgetBase,
    grid: RwLock<Grid>,
    alternating_row_colors: Property<bool>,
    sorting_enabled: Property<bool>,

    pub cell_changed: Signal<Cell>,
    pub current_cell_changed: Signal<Option<Cell>>,
    pub cell_activated: Signal<Cell>,
}

impl TableWidget {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "rowCount",
        "columnCount",
        "horizontalHeaderLabels",
        "verticalHeaderLabels",
        "currentRow",
        "currentColumn",
        "alternatingRowColors",
        "sortingEnabled",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_size(0, 0)
    }

    pub fn with_size(rows: usize, columns: usize) -> ObjectResult<Arc<Self>> {
        let mut grid = Grid::default();
        grid.set_columns(columns);
        grid.set_rows(rows);
        let table = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            grid: RwLock::new(grid),
            alternating_row_colors: Property::new(false),
            sorting_enabled: Property::new(false),
            cell_changed: Signal::new(),
            current_cell_changed: Signal::new(),
            cell_activated: Signal::new(),
        });
        register_widget(&table);
        Ok(table)
    }

    // =========================================================================
    // Shape
    // =========================================================================

    pub fn row_count(&self) -> usize {
        self.grid.read().row_count()
    }

    pub fn column_count(&self) -> usize {
        self.grid.read().columns
    }

    pub fn set_row_count(&self, rows: usize) {
        self.reshape(|grid| grid.set_rows(rows));
    }

    pub fn set_column_count(&self, columns: usize) {
        self.reshape(|grid| grid.set_columns(columns));
    }

    /// Insert an empty row before `row`, appending when past the end.
    pub fn insert_row(&self, row: usize) {
        self.reshape(|grid| {
            let row = row.min(grid.row_count());
            grid.rows.insert(row, vec![None; grid.columns]);
            if row < grid.vertical_headers.len() {
                grid.vertical_headers.insert(row, String::new());
            }
            if let Some((current, _)) = grid.current.as_mut()
                && *current >= row
            {
                *current += 1;
            }
        });
    }

    pub fn remove_row(&self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        self.reshape(|grid| {
            grid.rows.remove(row);
            if row < grid.vertical_headers.len() {
                grid.vertical_headers.remove(row);
            }
            grid.current = match grid.current {
                Some((r, _)) if r == row => None,
                Some((r, c)) if r > row => Some((r - 1, c)),
                other => other,
            };
        });
        true
    }

    pub fn insert_column(&self, column: usize) {
        self.reshape(|grid| {
            let column = column.min(grid.columns);
            grid.columns += 1;
            for cells in &mut grid.rows {
                cells.insert(column, None);
            }
            if column < grid.horizontal_headers.len() {
                grid.horizontal_headers.insert(column, String::new());
            }
            if let Some((_, current)) = grid.current.as_mut()
                && *current >= column
            {
                *current += 1;
            }
        });
    }

    pub fn remove_column(&self, column: usize) -> bool {
        if column >= self.column_count() {
            return false;
        }
        self.reshape(|grid| {
            grid.columns -= 1;
            for cells in &mut grid.rows {
                cells.remove(column);
            }
            if column < grid.horizontal_headers.len() {
                grid.horizontal_headers.remove(column);
            }
            grid.current = match grid.current {
                Some((_, c)) if c == column => None,
                Some((r, c)) if c > column => Some((r, c - 1)),
                other => other,
            };
        });
        true
    }

    fn reshape(&self, apply: impl FnOnce(&mut Grid)) {
        let (before, after) = {
            let mut grid = self.grid.write();
            let before = grid.current;
            apply(&mut grid);
            (before, grid.current)
        };
        if before != after {
            self.current_cell_changed.emit(after);
        }
    }

    // =========================================================================
    // Cells
    // =========================================================================

    pub fn item(&self, row: usize, column: usize) -> Option<String> {
        self.grid
            .read()
            .rows
            .get(row)
            .and_then(|cells| cells.get(column).cloned().flatten())
    }

    /// Write a cell. Returns `false` outside the grid.
    pub fn set_item(&self, row: usize, column: usize, text: impl Into<String>) -> bool {
        self.write_cell(row, column, Some(text.into()))
    }

    /// Empty a cell, returning its previous text.
    pub fn take_item(&self, row: usize, column: usize) -> Option<String> {
        let previous = self.item(row, column);
        if previous.is_some() {
            self.write_cell(row, column, None);
        }
        previous
    }

    fn write_cell(&self, row: usize, column: usize, text: Option<String>) -> bool {
        {
            let mut grid = self.grid.write();
            let Some(cell) = grid.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) else {
                return false;
            };
            if *cell == text {
                return true;
            }
            *cell = text;
        }
        self.cell_changed.emit((row, column));
        true
    }

    /// Fill rows from the top-left corner, growing the grid as needed.
    pub fn set_rows<R, S>(&self, rows: impl IntoIterator<Item = R>)
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (r, row) in rows.into_iter().enumerate() {
            if r >= self.row_count() {
                self.set_row_count(r + 1);
            }
            for (c, text) in row.into_iter().enumerate() {
                if c >= self.column_count() {
                    self.set_column_count(c + 1);
                }
                self.set_item(r, c, text);
            }
        }
    }

    /// Empty every cell, keeping the shape and headers.
    pub fn clear_contents(&self) {
        let touched: Vec<Cell> = {
            let mut grid = self.grid.write();
            let mut touched = Vec::new();
            for (r, cells) in grid.rows.iter_mut().enumerate() {
                for (c, cell) in cells.iter_mut().enumerate() {
                    if cell.take().is_some() {
                        touched.push((r, c));
                    }
                }
            }
            touched
        };
        for cell in touched {
            self.cell_changed.emit(cell);
        }
    }

    /// Remove all rows, columns and headers.
    pub fn clear(&self) {
        self.reshape(|grid| *grid = Grid::default());
    }

    /// Cells whose text contains `needle`, in row-major order.
    pub fn find_items(&self, needle: &str) -> Vec<Cell> {
        let grid = self.grid.read();
        grid.rows
            .iter()
            .enumerate()
            .flat_map(|(r, cells)| {
                cells.iter().enumerate().filter_map(move |(c, cell)| {
                    cell.as_deref()
                        .filter(|text| text.contains(needle))
                        .map(|_| (r, c))
                })
            })
            .collect()
    }

    /// Stable sort of the rows by the text in `column`; empty cells sort last.
    pub fn sort_by_column(&self, column: usize, ascending: bool) {
        if column >= self.column_count() {
            return;
        }
        self.reshape(|grid| {
            grid.rows.sort_by(|a, b| match (&a[column], &b[column]) {
                (Some(x), Some(y)) if ascending => x.cmp(y),
                (Some(x), Some(y)) => y.cmp(x),
                (a, b) => b.is_some().cmp(&a.is_some()),
            });
            grid.current = None;
        });
    }

    // =========================================================================
    // Headers
    // =========================================================================

    pub fn horizontal_header_labels(&self) -> Vec<String> {
        self.grid.read().horizontal_headers.clone()
    }

    /// Set column headers, adding columns when there are more labels.
    pub fn set_horizontal_header_labels(&self, labels: Vec<String>) {
        if labels.len() > self.column_count() {
            self.set_column_count(labels.len());
        }
        self.grid.write().horizontal_headers = labels;
    }

    pub fn vertical_header_labels(&self) -> Vec<String> {
        self.grid.read().vertical_headers.clone()
    }

    pub fn set_vertical_header_labels(&self, labels: Vec<String>) {
        if labels.len() > self.row_count() {
            self.set_row_count(labels.len());
        }
        self.grid.write().vertical_headers = labels;
    }

    // =========================================================================
    // Current cell
    // =========================================================================

    pub fn current_cell(&self) -> Option<Cell> {
        self.grid.read().current
    }

    /// Move the current cell. Positions outside the grid are ignored.
    pub fn set_current_cell(&self, row: usize, column: usize) {
        if row < self.row_count() && column < self.column_count() {
            self.reshape(|grid| grid.current = Some((row, column)));
        }
    }

    pub fn current_row(&self) -> i32 {
        self.current_cell().map_or(-1, |(r, _)| r as i32)
    }

    pub fn current_column(&self) -> i32 {
        self.current_cell().map_or(-1, |(_, c)| c as i32)
    }

    pub fn alternating_row_colors(&self) -> bool {
        self.alternating_row_colors.get()
    }

    pub fn set_alternating_row_colors(&self, enabled: bool) {
        self.alternating_row_colors.set(enabled);
    }

    pub fn is_sorting_enabled(&self) -> bool {
        self.sorting_enabled.get()
    }

    pub fn set_sorting_enabled(&self, enabled: bool) {
        self.sorting_enabled.set(enabled);
    }

    fn navigate(&self, key: Key) -> bool {
        let (rows, columns) = (self.row_count(), self.column_count());
        if rows == 0 || columns == 0 {
            return false;
        }
        let (row, column) = self.current_cell().unwrap_or((0, 0));
        let (row, column) = match key {
            Key::ArrowUp => (row.saturating_sub(1), column),
            Key::ArrowDown => ((row + 1).min(rows - 1), column),
            Key::ArrowLeft => (row, column.saturating_sub(1)),
            Key::ArrowRight => (row, (column + 1).min(columns - 1)),
            Key::Home => (row, 0),
            Key::End => (row, columns - 1),
            Key::Enter => {
                if let Some(cell) = self.current_cell() {
                    self.cell_activated.emit(cell);
                }
                return true;
            }
            _ => return false,
        };
        self.set_current_cell(row, column);
        true
    }
}

impl Widget for TableWidget {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "TableWidget"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "rowCount" => self.set_row_count(expect(&value, "uint")?),
            "columnCount" => self.set_column_count(expect(&value, "uint")?),
            "horizontalHeaderLabels" => {
                self.set_horizontal_header_labels(expect(&value, "stringlist")?)
            }
            "verticalHeaderLabels" => self.set_vertical_header_labels(expect(&value, "stringlist")?),
            "currentRow" => {
                let row: usize = expect(&value, "uint")?;
                self.set_current_cell(row, self.current_cell().map_or(0, |(_, c)| c));
            }
            "currentColumn" => {
                let column: usize = expect(&value, "uint")?;
                self.set_current_cell(self.current_cell().map_or(0, |(r, _)| r), column);
            }
            "alternatingRowColors" => self.set_alternating_row_colors(expect(&value, "bool")?),
            "sortingEnabled" => self.set_sorting_enabled(expect(&value, "bool")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "rowCount" => Some(self.row_count().into()),
            "columnCount" => Some(self.column_count().into()),
            "horizontalHeaderLabels" => Some(self.horizontal_header_labels().into()),
            "verticalHeaderLabels" => Some(self.vertical_header_labels().into()),
            "currentRow" => Some(self.current_row().into()),
            "currentColumn" => Some(self.current_column().into()),
            "alternatingRowColors" => Some(self.alternating_row_colors().into()),
            "sortingEnabled" => Some(self.is_sorting_enabled().into()),
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

static_assertions::assert_impl_all!(TableWidget: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use parking_lot::Mutex;

    fn table() -> Arc<TableWidget> {
        init_global_registry();
        TableWidget::with_size(2, 2).unwrap()
    }

    #[test]
    fn test_cells_and_bounds() {
        let table = table();
        let changed = Arc::new(Mutex::new(Vec::new()));
        let log = changed.clone();
        table.cell_changed.connect(move |cell| log.lock().push(*cell));

        assert!(table.set_item(1, 1, "x"));
        assert!(!table.set_item(2, 0, "out"));
        assert_eq!(table.item(1, 1).as_deref(), Some("x"));
        assert_eq!(table.take_item(1, 1).as_deref(), Some("x"));
        assert_eq!(table.item(1, 1), None);
        assert_eq!(*changed.lock(), vec![(1, 1), (1, 1)]);
    }

    #[test]
    fn test_insert_and_remove_shift_current() {
        let table = table();
        table.set_item(0, 0, "a");
        table.set_item(1, 0, "b");
        table.set_current_cell(1, 0);

        table.insert_row(0);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.item(2, 0).as_deref(), Some("b"));
        assert_eq!(table.current_cell(), Some((2, 0)));

        table.insert_column(0);
        assert_eq!(table.current_cell(), Some((2, 1)));
        assert!(table.remove_column(1));
        assert_eq!(table.current_cell(), None);
        assert!(!table.remove_row(10));
    }

    #[test]
    fn test_headers_grow_columns() {
        let table = table();
        table
            .set_property("horizontalHeaderLabels", Variant::from(&["A", "B", "C"][..]))
            .unwrap();
        assert_eq!(table.column_count(), 3);
        table.set_column_count(1);
        assert_eq!(table.horizontal_header_labels(), vec!["A".to_string()]);
    }

    #[test]
    fn test_sort_and_find() {
        let table = table();
        table.set_rows([["pear", "2"], ["apple", "1"], ["fig", "3"]]);
        assert_eq!(table.row_count(), 3);
        table.sort_by_column(0, true);
        assert_eq!(table.item(0, 0).as_deref(), Some("apple"));
        assert_eq!(table.item(2, 1).as_deref(), Some("2"));
        assert_eq!(table.find_items("p"), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn test_keyboard_navigation() {
        let table = table();
        let widget: crate::widget::WidgetRef = table.clone();
        widget.send_event(&WidgetEvent::key_press(
            Key::ArrowDown,
            crate::event::KeyboardModifiers::NONE,
        ));
        assert_eq!(table.current_cell(), Some((1, 0)));
        widget.send_event(&WidgetEvent::key_press(
            Key::End,
            crate::event::KeyboardModifiers::NONE,
        ));
        assert_eq!(table.current_row(), 1);
        assert_eq!(table.current_column(), 1);
    }
}
