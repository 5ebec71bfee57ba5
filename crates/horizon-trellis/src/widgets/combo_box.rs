use std::sync::Arc;

use horizon_trellis_core::widget::widgets::ComboBox;
use horizon_trellis_core::{Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};

fn current_index_changed(combo: &ComboBox) -> &Signal<i32> {
    &combo.current_index_changed
}

fn current_text_changed(combo: &ComboBox) -> &Signal<String> {
    &combo.current_text_changed
}

fn activated(combo: &ComboBox) -> &Signal<i32> {
    &combo.activated
}

/// Builds a [`ComboBox`].
///
/// The current index is held back until the items are in place, so
/// `.current_index(2).items(..)` selects the third item.
pub struct ComboBoxBuilder {
    core: ElementCore<ComboBox>,
    current_index: Option<i32>,
}

impl ComboBoxBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("ComboBox"),
            current_index: None,
        }
    }

    /// Replace the items.
    pub fn items<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        self.with_property("items", items)
    }

    pub fn current_index(mut self, index: i32) -> Self {
        self.current_index = Some(index);
        self
    }

    pub fn editable(self, editable: bool) -> Self {
        self.with_property("editable", editable)
    }

    pub fn max_visible_items(self, count: i32) -> Self {
        self.with_property("maxVisibleItems", count)
    }

    pub fn on_current_index_changed(self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.with_event("currentIndexChanged", EventHandler::int(handler))
    }

    pub fn on_current_text_changed(self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.with_event("currentTextChanged", EventHandler::text(handler))
    }

    pub fn on_activated(self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.with_event("activated", EventHandler::int(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn add_item(&self, text: impl Into<String>) {
        if let Some(widget) = self.core.widget() {
            widget.add_item(text);
        }
    }

    pub fn insert_item(&self, index: usize, text: impl Into<String>) {
        if let Some(widget) = self.core.widget() {
            widget.insert_item(index, text);
        }
    }

    pub fn remove_item(&self, index: usize) -> bool {
        self.core.widget().is_some_and(|widget| widget.remove_item(index))
    }

    pub fn clear(&self) {
        if let Some(widget) = self.core.widget() {
            widget.clear();
        }
    }

    /// The selected index, or the pending one before initialization.
    pub fn selected_index(&self) -> i32 {
        match self.core.widget() {
            Some(widget) => widget.current_index(),
            None => self.current_index.unwrap_or(-1),
        }
    }

    pub fn set_current_index(&mut self, index: i32) -> &mut Self {
        match self.core.widget() {
            Some(widget) => widget.set_current_index(index),
            None => self.current_index = Some(index),
        }
        self
    }

    pub fn current_text(&self) -> Option<String> {
        self.core.widget().map(|widget| widget.current_text())
    }

    pub fn count(&self) -> usize {
        self.core.widget().map_or(0, |widget| widget.count())
    }
}

impl Default for ComboBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for ComboBoxBuilder {
    type Widget = ComboBox;

    fn core(&self) -> &ElementCore<ComboBox> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<ComboBox> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<ComboBox>> {
        Ok(ComboBox::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<ComboBox>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "currentIndexChanged" => handler.bind(widget, current_index_changed),
            "currentTextChanged" => handler.bind(widget, current_text_changed),
            "activated" => handler.bind(widget, activated),
            _ => bind_common(widget, event, handler),
        }
    }

    fn reconcile_state(&mut self, widget: &Arc<ComboBox>) {
        if let Some(index) = self.current_index.take() {
            widget.set_current_index(index);
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
    fn test_index_applied_after_items() {
        setup();
        let mut builder = ComboBoxBuilder::new()
            .current_index(2)
            .items(["Red", "Green", "Blue"]);
        assert_eq!(builder.selected_index(), 2);
        let combo = builder.initialize().unwrap();
        assert_eq!(combo.current_index(), 2);
        assert_eq!(combo.current_text(), "Blue");
    }

    #[test]
    fn test_events_and_live_edits() {
        setup();
        let texts = Arc::new(Mutex::new(Vec::new()));
        let sink = texts.clone();
        let mut builder = ComboBoxBuilder::new()
            .items(["One", "Two"])
            .on_current_text_changed(move |text| sink.lock().push(text.to_string()));
        builder.initialize().unwrap();

        builder.set_current_index(1);
        builder.insert_item(0, "Zero");
        assert_eq!(builder.count(), 3);
        assert_eq!(builder.current_text().as_deref(), Some("Two"));
        assert!(builder.remove_item(2));
        builder.clear();
        assert_eq!(builder.count(), 0);
        assert_eq!(texts.lock().first().map(String::as_str), Some("Two"));
    }
}
