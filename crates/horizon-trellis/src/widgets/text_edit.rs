use std::sync::{Arc, Weak};

use horizon_trellis_core::widget::widgets::TextEdit;
use horizon_trellis_core::{Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};
use crate::logging::targets;

fn text_changed(edit: &TextEdit) -> &Signal<String> {
    &edit.text_changed
}

fn undo_available(edit: &TextEdit) -> &Signal<bool> {
    &edit.undo_available
}

fn redo_available(edit: &TextEdit) -> &Signal<bool> {
    &edit.redo_available
}

/// Builds a multi-line plain text [`TextEdit`].
///
/// Events: `textChanged(text)`, `undoAvailable(bool)`, `redoAvailable(bool)`.
#[derive(Debug)]
pub struct TextEditBuilder {
    core: ElementCore<TextEdit>,
    max_chars: Option<usize>,
}

impl TextEditBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("TextEdit"),
            max_chars: None,
        }
    }

    pub fn plain_text(self, text: impl Into<String>) -> Self {
        self.with_property("plainText", text.into())
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        self.with_property("placeholderText", text.into())
    }

    pub fn read_only(self, read_only: bool) -> Self {
        self.with_property("readOnly", read_only)
    }

    pub fn line_wrap(self, wrap: bool) -> Self {
        self.with_property("lineWrap", wrap)
    }

    pub fn tab_changes_focus(self, changes: bool) -> Self {
        self.with_property("tabChangesFocus", changes)
    }

    /// Truncate the text to `chars` characters whenever it grows past them.
    pub fn max_chars(mut self, chars: usize) -> Self {
        self.max_chars = Some(chars);
        self
    }

    pub fn on_text_changed(self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.with_event("textChanged", EventHandler::text(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn text(&self) -> String {
        self.core.widget().map(|edit| edit.plain_text()).unwrap_or_default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_property("plainText", text.into())
    }

    pub fn append(&self, paragraph: &str) {
        if let Some(edit) = self.core.widget() {
            edit.append(paragraph);
        }
    }

    pub fn clear(&self) {
        if let Some(edit) = self.core.widget() {
            edit.clear();
        }
    }

    pub fn select_all(&self) {
        if let Some(edit) = self.core.widget() {
            edit.select_all();
        }
    }

    pub fn selected_text(&self) -> String {
        self.core.widget().map(|edit| edit.selected_text()).unwrap_or_default()
    }

    pub fn undo(&self) -> bool {
        self.core.widget().is_some_and(|edit| edit.undo())
    }

    pub fn redo(&self) -> bool {
        self.core.widget().is_some_and(|edit| edit.redo())
    }

    pub fn line_count(&self) -> usize {
        self.core.widget().map_or(0, |edit| edit.line_count())
    }

    pub fn word_count(&self) -> usize {
        self.text().split_whitespace().count()
    }
}

impl Default for TextEditBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for TextEditBuilder {
    type Widget = TextEdit;

    fn core(&self) -> &ElementCore<TextEdit> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<TextEdit> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<TextEdit>> {
        Ok(TextEdit::new()?)
    }

    fn connect_event(&self, widget: &Arc<TextEdit>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "textChanged" => handler.bind(widget, text_changed),
            "undoAvailable" => handler.bind(widget, undo_available),
            "redoAvailable" => handler.bind(widget, redo_available),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_validation(&mut self, widget: &Arc<TextEdit>) {
        let Some(limit) = self.max_chars else {
            return;
        };
        let weak: Weak<TextEdit> = Arc::downgrade(widget);
        let truncate = move |text: &String| {
            if text.chars().count() <= limit {
                return;
            }
            if let Some(edit) = weak.upgrade() {
                let kept: String = text.chars().take(limit).collect();
                tracing::trace!(target: targets::ELEMENT, limit, "text edit truncated");
                edit.set_plain_text(&kept);
            }
        };
        truncate(&widget.plain_text());
        widget.text_changed.connect(truncate);
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
    fn test_append_and_undo() {
        setup();
        let undo = Arc::new(Mutex::new(Vec::new()));
        let sink = undo.clone();
        let mut builder = TextEditBuilder::new()
            .plain_text("first")
            .with_event("undoAvailable", EventHandler::bool(move |on| sink.lock().push(on)));
        builder.initialize().unwrap();

        builder.append("second line");
        assert_eq!(builder.text(), "first\nsecond line");
        assert_eq!(builder.line_count(), 2);
        assert_eq!(builder.word_count(), 3);
        assert!(builder.undo());
        assert_eq!(builder.text(), "first");
        assert!(builder.redo());
        assert_eq!(undo.lock().first(), Some(&true));
    }

    #[test]
    fn test_max_chars_truncates() {
        setup();
        let mut builder = TextEditBuilder::new().plain_text("abcdefgh").max_chars(5);
        builder.initialize().unwrap();
        assert_eq!(builder.text(), "abcde");
        builder.append("xyz");
        assert_eq!(builder.text(), "abcde");
    }
}
