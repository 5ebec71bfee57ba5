//! Single-line text input widget.
//!
//! [`LineEdit`] supports a cursor and selection, placeholder text, echo modes
//! for passwords, a maximum length, and the three input helpers of the
//! widget layer: an [`InputMask`], a [`Validator`] and a [`Completer`].
//!
//! # Input mask
//!
//! With a mask installed, [`text`](LineEdit::text) holds only the typed
//! characters; [`display_text`](LineEdit::display_text) renders them into
//! the mask with literals and blanks.
//!
//! # Signals
//!
//! - `text_changed(String)`: after every change, programmatic or typed
//! - `text_edited(String)`: after changes made by typing
//! - `return_pressed()`: Enter with acceptable input
//! - `editing_finished()`: Enter or focus loss with acceptable input
//! - `input_rejected()`: a typed edit was refused

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, WidgetEvent};
use crate::logging::targets;
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{
    Completer, InputMask, TextInput, ValidationState, Validator, Widget, WidgetBase, expect,
    register_widget,
};

use super::property_names_with;

/// Default maximum text length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 32767;

/// How typed characters are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    #[default]
    Normal,
    /// Every character is shown as the password character.
    Password,
    /// Nothing is shown.
    NoEcho,
}

impl EchoMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Password => "Password",
            Self::NoEcho => "NoEcho",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Normal" => Some(Self::Normal),
            "Password" => Some(Self::Password),
            "NoEcho" => Some(Self::NoEcho),
            _ => None,
        }
    }
}

/// Text and cursor, indexed in characters.
#[derive(Debug, Default)]
struct EditState {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
}

impl EditState {
    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.anchor
            .filter(|&anchor| anchor != self.cursor)
            .map(|anchor| (anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// The text with the selection (or nothing) replaced by `insert`.
    fn spliced(&self, insert: &str) -> (String, usize) {
        let (start, end) = self.selection().unwrap_or((self.cursor, self.cursor));
        let mut text = self.text.clone();
        text.replace_range(self.byte_at(start)..self.byte_at(end), insert);
        (text, start + insert.chars().count())
    }
}

/// A single-line text editor.
pub struct LineEdit {
    base: WidgetBase,
    state: RwLock<EditState>,
    placeholder: Property<String>,
    echo_mode: Property<EchoMode>,
    password_char: Property<char>,
    read_only: Property<bool>,
    max_length: Property<usize>,
    mask: RwLock<Option<InputMask>>,
    validator: RwLock<Option<Arc<dyn Validator>>>,
    completer: RwLock<Option<Arc<Completer>>>,

    pub text_changed: Signal<String>,
    pub text_edited: Signal<String>,
    pub return_pressed: Signal<()>,
    pub editing_finished: Signal<()>,
    pub input_rejected: Signal<()>,
}

impl LineEdit {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "text",
        "placeholderText",
        "readOnly",
        "maxLength",
        "echoMode",
        "inputMask",
        "displayText",
        "acceptableInput",
        "cursorPosition",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_text("")
    }

    pub fn with_text(text: &str) -> ObjectResult<Arc<Self>> {
        let edit = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            state: RwLock::new(EditState::default()),
            placeholder: Property::default(),
            echo_mode: Property::default(),
            password_char: Property::new('\u{25CF}'),
            read_only: Property::new(false),
            max_length: Property::new(DEFAULT_MAX_LENGTH),
            mask: RwLock::new(None),
            validator: RwLock::new(None),
            completer: RwLock::new(None),
            text_changed: Signal::new(),
            text_edited: Signal::new(),
            return_pressed: Signal::new(),
            editing_finished: Signal::new(),
            input_rejected: Signal::new(),
        });
        if !text.is_empty() {
            edit.set_text(text);
        }
        register_widget(&edit);
        Ok(edit)
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn text(&self) -> String {
        self.state.read().text.clone()
    }

    /// Replace the text programmatically.
    ///
    /// The mask and maximum length apply; the validator and read-only flag
    /// do not. The cursor moves to the end.
    pub fn set_text(&self, text: &str) {
        let text = self.constrain(text);
        let changed = {
            let mut state = self.state.write();
            state.anchor = None;
            state.cursor = text.chars().count();
            if state.text == text {
                false
            } else {
                state.text = text.clone();
                true
            }
        };
        if changed {
            self.text_changed.emit(text);
        }
    }

    /// The text as shown: masked, hidden for passwords, or the placeholder.
    pub fn display_text(&self) -> String {
        let text = self.text();
        if let Some(mask) = self.mask.read().as_ref() {
            return mask.display_text(&text);
        }
        match self.echo_mode() {
            EchoMode::Normal => text,
            EchoMode::Password => self
                .password_char
                .get()
                .to_string()
                .repeat(text.chars().count()),
            EchoMode::NoEcho => String::new(),
        }
    }

    pub fn placeholder_text(&self) -> String {
        self.placeholder.get()
    }

    pub fn set_placeholder_text(&self, text: impl Into<String>) {
        self.placeholder.set(text.into());
    }

    pub fn echo_mode(&self) -> EchoMode {
        self.echo_mode.get()
    }

    pub fn set_echo_mode(&self, mode: EchoMode) {
        self.echo_mode.set(mode);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.get()
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn max_length(&self) -> usize {
        self.max_length.get()
    }

    /// Truncates the current text if it is longer.
    pub fn set_max_length(&self, length: usize) {
        self.max_length.set(length);
        let text = self.text();
        if text.chars().count() > length {
            self.set_text(&text);
        }
    }

    /// Apply the mask and the maximum length to `text`.
    fn constrain(&self, text: &str) -> String {
        let text = match self.mask.read().as_ref() {
            Some(mask) => mask.filter_input(text),
            None => text.to_string(),
        };
        text.chars().take(self.max_length()).collect()
    }

    // =========================================================================
    // Input helpers
    // =========================================================================

    pub fn input_mask(&self) -> Option<String> {
        self.mask.read().as_ref().map(|m| m.pattern().to_string())
    }

    /// Install a mask; an empty pattern removes it. The current text is
    /// re-filtered through the new mask.
    pub fn set_input_mask(&self, pattern: &str) {
        *self.mask.write() = InputMask::new(pattern);
        let text = self.text();
        self.set_text(&text);
    }

    pub fn validator(&self) -> Option<Arc<dyn Validator>> {
        self.validator.read().clone()
    }

    pub fn set_validator(&self, validator: Option<Arc<dyn Validator>>) {
        *self.validator.write() = validator;
    }

    pub fn completer(&self) -> Option<Arc<Completer>> {
        self.completer.read().clone()
    }

    pub fn set_completer(&self, completer: Option<Arc<Completer>>) {
        let previous = std::mem::replace(&mut *self.completer.write(), completer);
        if let Some(previous) = previous {
            previous.hide_popup();
        }
    }

    /// Whether the mask is complete and the validator accepts the text.
    pub fn has_acceptable_input(&self) -> bool {
        let text = self.text();
        let mask_ok = self
            .mask
            .read()
            .as_ref()
            .is_none_or(|mask| mask.is_complete(&text));
        let validator_ok = self
            .validator()
            .is_none_or(|v| v.validate(&text) == ValidationState::Acceptable);
        mask_ok && validator_ok
    }

    // =========================================================================
    // Cursor and selection
    // =========================================================================

    pub fn cursor_position(&self) -> usize {
        self.state.read().cursor
    }

    pub fn set_cursor_position(&self, position: usize) {
        let mut state = self.state.write();
        state.cursor = position.min(state.len());
        state.anchor = None;
    }

    fn move_cursor(&self, position: usize, extend: bool) {
        let mut state = self.state.write();
        let position = position.min(state.len());
        if extend {
            if state.anchor.is_none() {
                state.anchor = Some(state.cursor);
            }
        } else {
            state.anchor = None;
        }
        state.cursor = position;
    }

    pub fn select_all(&self) {
        let mut state = self.state.write();
        let len = state.len();
        if len > 0 {
            state.anchor = Some(0);
            state.cursor = len;
        }
    }

    pub fn deselect(&self) {
        self.state.write().anchor = None;
    }

    pub fn has_selected_text(&self) -> bool {
        self.state.read().selection().is_some()
    }

    pub fn selected_text(&self) -> String {
        let state = self.state.read();
        state
            .selection()
            .map(|(start, end)| state.text[state.byte_at(start)..state.byte_at(end)].to_string())
            .unwrap_or_default()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Type `text` at the cursor, replacing any selection.
    ///
    /// Returns `false` when the edit is refused: read-only, over the maximum
    /// length, or made invalid by the validator.
    pub fn insert(&self, text: &str) -> bool {
        if self.is_read_only() {
            return false;
        }
        let (candidate, cursor) = self.state.read().spliced(text);
        self.commit_edit(candidate, cursor)
    }

    /// Delete the selection or the character before the cursor.
    pub fn backspace(&self) -> bool {
        if self.is_read_only() {
            return false;
        }
        let (candidate, cursor) = {
            let state = self.state.read();
            match state.selection() {
                Some(_) => state.spliced(""),
                None if state.cursor == 0 => return false,
                None => {
                    let mut text = state.text.clone();
                    text.replace_range(state.byte_at(state.cursor - 1)..state.byte_at(state.cursor), "");
                    (text, state.cursor - 1)
                }
            }
        };
        self.commit_edit(candidate, cursor)
    }

    /// Delete the selection or the character after the cursor.
    pub fn delete(&self) -> bool {
        if self.is_read_only() {
            return false;
        }
        let (candidate, cursor) = {
            let state = self.state.read();
            match state.selection() {
                Some(_) => state.spliced(""),
                None if state.cursor >= state.len() => return false,
                None => {
                    let mut text = state.text.clone();
                    text.replace_range(state.byte_at(state.cursor)..state.byte_at(state.cursor + 1), "");
                    (text, state.cursor)
                }
            }
        };
        self.commit_edit(candidate, cursor)
    }

    fn commit_edit(&self, candidate: String, cursor: usize) -> bool {
        let constrained = self.constrain(&candidate);
        // Every typed character must survive the mask and the length limit.
        let fits = constrained.chars().count() == candidate.chars().count();
        let valid = self
            .validator()
            .is_none_or(|v| v.validate(&constrained) != ValidationState::Invalid);
        if !fits || !valid {
            tracing::trace!(target: targets::WIDGET, id = ?self.base.object_id(), "line edit input rejected");
            self.input_rejected.emit(());
            return false;
        }
        let cursor = cursor.min(constrained.chars().count());
        {
            let mut state = self.state.write();
            if state.text == constrained {
                state.cursor = cursor;
                state.anchor = None;
                return true;
            }
            state.text = constrained.clone();
            state.cursor = cursor;
            state.anchor = None;
        }
        self.text_changed.emit(constrained.clone());
        self.text_edited.emit(constrained.clone());
        if let Some(completer) = self.completer() {
            completer.show_popup(&constrained);
        }
        true
    }

    /// Finish editing: try a validator fixup, then report acceptable input.
    fn finish(&self, returned: bool) -> bool {
        if !self.has_acceptable_input()
            && let Some(fixed) = self.validator().and_then(|v| v.fixup(&self.text()))
        {
            self.set_text(&fixed);
        }
        if !self.has_acceptable_input() {
            return false;
        }
        if returned {
            self.return_pressed.emit(());
        }
        self.editing_finished.emit(());
        true
    }

    fn accept_completion(&self, completer: &Completer) -> bool {
        match completer.complete() {
            Some(text) => {
                self.set_text(&text);
                self.text_edited.emit(self.text());
                true
            }
            None => false,
        }
    }

    fn handle_key(&self, key: Key, ctrl: bool, shift: bool, text: &str) -> bool {
        let popup = self.completer().filter(|c| c.is_popup_visible());
        match key {
            Key::Enter | Key::Tab if popup.is_some() => {
                popup.is_some_and(|c| self.accept_completion(&c))
            }
            Key::ArrowDown if popup.is_some() => {
                popup.inspect(|c| c.move_down());
                true
            }
            Key::ArrowUp if popup.is_some() => {
                popup.inspect(|c| c.move_up());
                true
            }
            Key::Escape if popup.is_some() => {
                popup.inspect(|c| c.hide_popup());
                true
            }
            Key::Enter => {
                self.finish(true);
                true
            }
            Key::Backspace => {
                self.backspace();
                true
            }
            Key::Delete => {
                self.delete();
                true
            }
            Key::ArrowLeft => {
                let cursor = self.cursor_position();
                self.move_cursor(cursor.saturating_sub(1), shift);
                true
            }
            Key::ArrowRight => {
                self.move_cursor(self.cursor_position() + 1, shift);
                true
            }
            Key::Home => {
                self.move_cursor(0, shift);
                true
            }
            Key::End => {
                self.move_cursor(usize::MAX, shift);
                true
            }
            Key::A if ctrl => {
                self.select_all();
                true
            }
            _ if !ctrl && !text.is_empty() => {
                self.insert(text);
                true
            }
            _ => false,
        }
    }
}

impl TextInput for LineEdit {
    fn text(&self) -> String {
        LineEdit::text(self)
    }

    fn set_text(&self, text: &str) {
        LineEdit::set_text(self, text);
    }

    fn text_changed(&self) -> &Signal<String> {
        &self.text_changed
    }

    fn select_all(&self) {
        LineEdit::select_all(self);
    }

    fn selected_text(&self) -> String {
        LineEdit::selected_text(self)
    }

    fn set_completer(&self, completer: Option<Arc<Completer>>) -> bool {
        LineEdit::set_completer(self, completer);
        true
    }

    fn completer(&self) -> Option<Arc<Completer>> {
        LineEdit::completer(self)
    }

    fn set_input_mask(&self, mask: &str) -> bool {
        LineEdit::set_input_mask(self, mask);
        true
    }

    fn set_validator(&self, validator: Option<Arc<dyn Validator>>) -> bool {
        LineEdit::set_validator(self, validator);
        true
    }
}

impl Widget for LineEdit {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "LineEdit"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "text" => self.set_text(&expect::<String>(&value, "string")?),
            "placeholderText" => self.set_placeholder_text(expect::<String>(&value, "string")?),
            "readOnly" => self.set_read_only(expect(&value, "bool")?),
            "maxLength" => self.set_max_length(expect(&value, "uint")?),
            "echoMode" => {
                let mode = match &value {
                    Variant::String(name) => EchoMode::from_name(name),
                    _ => None,
                };
                self.set_echo_mode(mode.ok_or(PropertyError::TypeMismatch {
                    expected: "echo mode name",
                    got: value.type_name(),
                })?);
            }
            "inputMask" => self.set_input_mask(&expect::<String>(&value, "string")?),
            "cursorPosition" => self.set_cursor_position(expect(&value, "uint")?),
            "displayText" | "acceptableInput" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "text" => Some(self.text().into()),
            "placeholderText" => Some(self.placeholder_text().into()),
            "readOnly" => Some(self.is_read_only().into()),
            "maxLength" => Some(self.max_length().into()),
            "echoMode" => Some(self.echo_mode().name().into()),
            "inputMask" => Some(self.input_mask().unwrap_or_default().into()),
            "displayText" => Some(self.display_text().into()),
            "acceptableInput" => Some(self.has_acceptable_input().into()),
            "cursorPosition" => Some(self.cursor_position().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress {
                key,
                modifiers,
                text,
            } => self.handle_key(*key, modifiers.control, modifiers.shift, text),
            WidgetEvent::FocusOut => {
                if let Some(completer) = self.completer() {
                    completer.hide_popup();
                }
                self.finish(false);
                false
            }
            _ => false,
        }
    }

    fn as_text_input(&self) -> Option<&dyn TextInput> {
        Some(self)
    }
}

impl std::fmt::Debug for LineEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineEdit")
            .field("id", &self.base.object_id())
            .field("text", &self.text())
            .field("echo_mode", &self.echo_mode())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(LineEdit: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::widget::{IntValidator, WidgetRef};
    use parking_lot::Mutex;

    fn edit() -> Arc<LineEdit> {
        init_global_registry();
        LineEdit::new().unwrap()
    }

    fn type_text(widget: &WidgetRef, text: &str) {
        for ch in text.chars() {
            widget.send_event(&WidgetEvent::KeyPress {
                key: Key::from_char(ch).unwrap_or(Key::Space),
                modifiers: KeyboardModifiers::NONE,
                text: ch.to_string(),
            });
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let edit = edit();
        let edited = Arc::new(Mutex::new(Vec::new()));
        let log = edited.clone();
        edit.text_edited.connect(move |t| log.lock().push(t.clone()));

        let widget: WidgetRef = edit.clone();
        type_text(&widget, "héllo");
        assert_eq!(edit.text(), "héllo");
        widget.send_event(&WidgetEvent::key_press(Key::Backspace, KeyboardModifiers::NONE));
        assert_eq!(edit.text(), "héll");
        assert_eq!(edited.lock().len(), 6);

        edit.set_text("reset");
        assert_eq!(edited.lock().len(), 6);
    }

    #[test]
    fn test_selection_replace() {
        let edit = edit();
        edit.set_text("hello world");
        edit.set_cursor_position(6);
        edit.move_cursor(11, true);
        assert_eq!(edit.selected_text(), "world");
        edit.insert("there");
        assert_eq!(edit.text(), "hello there");

        edit.select_all();
        assert_eq!(TextInput::selected_text(edit.as_ref()), "hello there");
        edit.delete();
        assert_eq!(edit.text(), "");
    }

    #[test]
    fn test_read_only_and_max_length() {
        let edit = edit();
        edit.set_max_length(3);
        assert!(edit.insert("abc"));
        assert!(!edit.insert("d"));
        edit.set_read_only(true);
        assert!(!edit.backspace());
        edit.set_text("abcdef");
        assert_eq!(edit.text(), "abc");
    }

    #[test]
    fn test_validator_rejects_invalid_edits() {
        let edit = edit();
        edit.set_validator(Some(Arc::new(IntValidator::new(0, 100))));
        let rejected = Arc::new(Mutex::new(0));
        let counter = rejected.clone();
        edit.input_rejected.connect(move |_| *counter.lock() += 1);

        assert!(edit.insert("4"));
        assert!(edit.insert("2"));
        assert!(!edit.insert("x"));
        assert!(!edit.insert("9"));
        assert_eq!(edit.text(), "42");
        assert_eq!(*rejected.lock(), 2);
        assert!(edit.has_acceptable_input());
    }

    #[test]
    fn test_input_mask() {
        let edit = edit();
        edit.set_input_mask("(999) 999-9999");
        edit.set_text("(555) 123");
        assert_eq!(edit.text(), "555123");
        assert_eq!(edit.display_text(), "(555) 123-    ");
        assert!(!edit.has_acceptable_input());
        assert!(!edit.insert("x"));
        edit.insert("4567");
        assert!(edit.has_acceptable_input());
    }

    #[test]
    fn test_return_and_completion() {
        let edit = edit();
        let completer = Arc::new(Completer::with_strings(["alpha", "beta"]));
        edit.set_completer(Some(completer.clone()));
        let returned = Arc::new(Mutex::new(0));
        let counter = returned.clone();
        edit.return_pressed.connect(move |_| *counter.lock() += 1);

        let widget: WidgetRef = edit.clone();
        type_text(&widget, "al");
        assert!(completer.is_popup_visible());
        widget.send_event(&WidgetEvent::key_press(Key::Enter, KeyboardModifiers::NONE));
        assert_eq!(edit.text(), "alpha");
        assert_eq!(*returned.lock(), 0);

        widget.send_event(&WidgetEvent::key_press(Key::Enter, KeyboardModifiers::NONE));
        assert_eq!(*returned.lock(), 1);
    }

    #[test]
    fn test_password_display() {
        let edit = edit();
        edit.set_property("echoMode", "Password".into()).unwrap();
        edit.set_text("abc");
        assert_eq!(edit.display_text().chars().count(), 3);
        assert!(!edit.display_text().contains('a'));
    }
}
