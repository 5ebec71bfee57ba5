//! Multi-line plain text editor.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{TextInput, Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

const UNDO_LIMIT: usize = 100;

/// How long lines are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineWrapMode {
    NoWrap,
    #[default]
    WidgetWidth,
}

#[derive(Debug, Default)]
struct Document {
    text: String,
    /// Cursor as a character index.
    cursor: usize,
    selected_all: bool,
    undo: Vec<String>,
    redo: Vec<String>,
}

impl Document {
    fn byte_at(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn snapshot(&mut self) {
        if self.undo.len() == UNDO_LIMIT {
            self.undo.remove(0);
        }
        self.undo.push(self.text.clone());
        self.redo.clear();
    }
}

/// A plain text editor with undo history.
///
/// Typed edits are recorded for [`undo`](TextEdit::undo); replacing the
/// whole text with [`set_plain_text`](TextEdit::set_plain_text) resets the
/// history.
pub struct TextEdit {
    base: WidgetBase,
    document: RwLock<Document>,
    placeholder: Property<String>,
    read_only: Property<bool>,
    line_wrap: Property<LineWrapMode>,
    tab_changes_focus: Property<bool>,

    pub text_changed: Signal<String>,
    pub undo_available: Signal<bool>,
    pub redo_available: Signal<bool>,
}

impl TextEdit {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "plainText",
        "placeholderText",
        "readOnly",
        "lineWrap",
        "tabChangesFocus",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let edit = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            document: RwLock::new(Document::default()),
            placeholder: Property::default(),
            read_only: Property::new(false),
            line_wrap: Property::default(),
            tab_changes_focus: Property::new(false),
            text_changed: Signal::new(),
            undo_available: Signal::new(),
            redo_available: Signal::new(),
        });
        register_widget(&edit);
        Ok(edit)
    }

    pub fn plain_text(&self) -> String {
        self.document.read().text.clone()
    }

    pub fn set_plain_text(&self, text: &str) {
        let (changed, had_history) = {
            let mut doc = self.document.write();
            let had_history = !doc.undo.is_empty() || !doc.redo.is_empty();
            doc.undo.clear();
            doc.redo.clear();
            doc.cursor = text.chars().count();
            doc.selected_all = false;
            if doc.text == text {
                (false, had_history)
            } else {
                doc.text = text.to_string();
                (true, had_history)
            }
        };
        if had_history {
            self.undo_available.emit(false);
            self.redo_available.emit(false);
        }
        if changed {
            self.text_changed.emit(text.to_string());
        }
    }

    /// Append a paragraph, starting a new line unless the text is empty.
    pub fn append(&self, paragraph: &str) {
        let text = {
            let mut doc = self.document.write();
            doc.snapshot();
            if !doc.text.is_empty() {
                doc.text.push('\n');
            }
            doc.text.push_str(paragraph);
            doc.cursor = doc.text.chars().count();
            doc.text.clone()
        };
        self.undo_available.emit(true);
        self.text_changed.emit(text);
    }

    pub fn clear(&self) {
        self.set_plain_text("");
    }

    pub fn line_count(&self) -> usize {
        self.document.read().text.split('\n').count()
    }

    pub fn cursor_position(&self) -> usize {
        self.document.read().cursor
    }

    pub fn set_cursor_position(&self, position: usize) {
        let mut doc = self.document.write();
        doc.cursor = position.min(doc.text.chars().count());
        doc.selected_all = false;
    }

    pub fn select_all(&self) {
        self.document.write().selected_all = true;
    }

    pub fn selected_text(&self) -> String {
        let doc = self.document.read();
        if doc.selected_all {
            doc.text.clone()
        } else {
            String::new()
        }
    }

    /// Insert at the cursor as if typed. Returns `false` when read-only.
    pub fn insert_plain_text(&self, text: &str) -> bool {
        self.edit(|doc| {
            if doc.selected_all {
                doc.text = text.to_string();
                doc.cursor = text.chars().count();
            } else {
                let at = doc.byte_at(doc.cursor);
                doc.text.insert_str(at, text);
                doc.cursor += text.chars().count();
            }
        })
    }

    /// Delete the character before the cursor, or the whole text when
    /// everything is selected.
    pub fn backspace(&self) -> bool {
        {
            let doc = self.document.read();
            if doc.text.is_empty() || (!doc.selected_all && doc.cursor == 0) {
                return false;
            }
        }
        self.edit(|doc| {
            if doc.selected_all {
                doc.text.clear();
                doc.cursor = 0;
            } else {
                let range = doc.byte_at(doc.cursor - 1)..doc.byte_at(doc.cursor);
                doc.text.replace_range(range, "");
                doc.cursor -= 1;
            }
        })
    }

    fn edit(&self, apply: impl FnOnce(&mut Document)) -> bool {
        if self.is_read_only() {
            return false;
        }
        let (text, first_undo) = {
            let mut doc = self.document.write();
            let first_undo = doc.undo.is_empty();
            doc.snapshot();
            apply(&mut doc);
            doc.selected_all = false;
            (doc.text.clone(), first_undo)
        };
        if first_undo {
            self.undo_available.emit(true);
        }
        self.text_changed.emit(text);
        true
    }

    pub fn is_undo_available(&self) -> bool {
        !self.document.read().undo.is_empty()
    }

    pub fn is_redo_available(&self) -> bool {
        !self.document.read().redo.is_empty()
    }

    pub fn undo(&self) -> bool {
        self.travel(true)
    }

    pub fn redo(&self) -> bool {
        self.travel(false)
    }

    fn travel(&self, backwards: bool) -> bool {
        let (text, undo_left, redo_left) = {
            let mut doc = self.document.write();
            let previous = if backwards {
                doc.undo.pop()
            } else {
                doc.redo.pop()
            };
            let Some(previous) = previous else {
                return false;
            };
            let current = std::mem::replace(&mut doc.text, previous);
            if backwards {
                doc.redo.push(current);
            } else {
                doc.undo.push(current);
            }
            doc.cursor = doc.text.chars().count();
            doc.selected_all = false;
            (doc.text.clone(), !doc.undo.is_empty(), !doc.redo.is_empty())
        };
        self.undo_available.emit(undo_left);
        self.redo_available.emit(redo_left);
        self.text_changed.emit(text);
        true
    }

    pub fn placeholder_text(&self) -> String {
        self.placeholder.get()
    }

    pub fn set_placeholder_text(&self, text: impl Into<String>) {
        self.placeholder.set(text.into());
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.get()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn line_wrap_mode(&self) -> LineWrapMode {
        self.line_wrap.get()
    }

    pub fn set_line_wrap_mode(&self, mode: LineWrapMode) {
        self.line_wrap.set(mode);
    }

    /// Whether Tab moves focus instead of inserting a tab character.
    pub fn tab_changes_focus(&self) -> bool {
        self.tab_changes_focus.get()
    }

    pub fn set_tab_changes_focus(&self, changes: bool) {
        self.tab_changes_focus.set(changes);
    }
}

impl TextInput for TextEdit {
    fn text(&self) -> String {
        self.plain_text()
    }

    fn set_text(&self, text: &str) {
        self.set_plain_text(text);
    }

    fn text_changed(&self) -> &Signal<String> {
        &self.text_changed
    }

    fn select_all(&self) {
        TextEdit::select_all(self);
    }

    fn selected_text(&self) -> String {
        TextEdit::selected_text(self)
    }
}

impl Widget for TextEdit {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "TextEdit"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "plainText" => self.set_plain_text(&expect::<String>(&value, "string")?),
            "placeholderText" => self.set_placeholder_text(expect::<String>(&value, "string")?),
            "readOnly" => self.set_read_only(expect(&value, "bool")?),
            "lineWrap" => self.set_line_wrap_mode(if expect(&value, "bool")? {
                LineWrapMode::WidgetWidth
            } else {
                LineWrapMode::NoWrap
            }),
            "tabChangesFocus" => self.set_tab_changes_focus(expect(&value, "bool")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "plainText" => Some(self.plain_text().into()),
            "placeholderText" => Some(self.placeholder_text().into()),
            "readOnly" => Some(self.is_read_only().into()),
            "lineWrap" => Some((self.line_wrap_mode() == LineWrapMode::WidgetWidth).into()),
            "tabChangesFocus" => Some(self.tab_changes_focus().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        let WidgetEvent::KeyPress {
            key,
            modifiers,
            text,
        } = event
        else {
            return false;
        };
        if modifiers.control {
            return match key {
                Key::Z if modifiers.shift => self.redo(),
                Key::Z => self.undo(),
                Key::Y => self.redo(),
                Key::A => {
                    self.select_all();
                    true
                }
                _ => false,
            };
        }
        match key {
            Key::Enter => self.insert_plain_text("\n"),
            Key::Tab if self.tab_changes_focus() => false,
            Key::Tab => self.insert_plain_text("\t"),
            Key::Backspace => self.backspace(),
            _ if !text.is_empty() => self.insert_plain_text(text),
            _ => false,
        }
    }

    fn as_text_input(&self) -> Option<&dyn TextInput> {
        Some(self)
    }
}

static_assertions::assert_impl_all!(TextEdit: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::widget::WidgetRef;

    fn edit() -> Arc<TextEdit> {
        init_global_registry();
        TextEdit::new().unwrap()
    }

    #[test]
    fn test_append_and_lines() {
        let edit = edit();
        edit.append("first");
        edit.append("second");
        assert_eq!(edit.plain_text(), "first\nsecond");
        assert_eq!(edit.line_count(), 2);
    }

    #[test]
    fn test_undo_redo() {
        let edit = edit();
        edit.set_plain_text("a");
        assert!(!edit.is_undo_available());
        edit.insert_plain_text("b");
        edit.insert_plain_text("c");
        assert_eq!(edit.plain_text(), "abc");

        let widget: WidgetRef = edit.clone();
        widget.send_event(&WidgetEvent::key_press(Key::Z, KeyboardModifiers::CTRL));
        assert_eq!(edit.plain_text(), "ab");
        assert!(edit.undo());
        assert!(!edit.undo());
        assert_eq!(edit.plain_text(), "a");
        assert!(edit.redo());
        assert_eq!(edit.plain_text(), "ab");

        edit.insert_plain_text("x");
        assert!(!edit.is_redo_available());
    }

    #[test]
    fn test_tab_and_read_only() {
        let edit = edit();
        let widget: WidgetRef = edit.clone();
        assert!(widget.send_event(&WidgetEvent::key_press(Key::Tab, KeyboardModifiers::NONE)));
        assert_eq!(edit.plain_text(), "\t");

        edit.set_tab_changes_focus(true);
        assert!(!widget.send_event(&WidgetEvent::key_press(Key::Tab, KeyboardModifiers::NONE)));

        edit.set_read_only(true);
        assert!(!edit.insert_plain_text("x"));
        assert!(!edit.backspace());
    }
}
