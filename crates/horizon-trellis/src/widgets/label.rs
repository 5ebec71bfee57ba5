use std::sync::Arc;

use horizon_trellis_core::widget::Widget;
use horizon_trellis_core::widget::widgets::{Alignment, Label};
use horizon_trellis_core::{Color, Icon, ObjectId, Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};

/// Style layer holding the label's color, border and spacing declarations.
pub const LABEL_STYLE_LAYER: &str = "label.style";

fn text_changed(label: &Label) -> &Signal<String> {
    &label.text_changed
}

/// Builds a [`Label`].
///
/// The color, background, border, padding and margin setters each own one
/// declaration of the [`LABEL_STYLE_LAYER`] layer. Setting one again
/// replaces only that declaration; the user style sheet is left alone.
pub struct LabelBuilder {
    core: ElementCore<Label>,
    style: Vec<(&'static str, String)>,
    buddy: Option<ObjectId>,
}

impl LabelBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("Label"),
            style: Vec::new(),
            buddy: None,
        }
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_property("text", text.into())
    }

    pub fn alignment(self, alignment: Alignment) -> Self {
        self.with_property("alignment", alignment.name())
    }

    pub fn word_wrap(self, wrap: bool) -> Self {
        self.with_property("wordWrap", wrap)
    }

    pub fn indent(self, indent: i32) -> Self {
        self.with_property("indent", indent)
    }

    pub fn pixmap(self, pixmap: Icon) -> Self {
        self.with_property("pixmap", pixmap)
    }

    /// The widget that takes focus through this label's mnemonic.
    pub fn buddy(mut self, buddy: ObjectId) -> Self {
        self.buddy = Some(buddy);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.set_background_color(color);
        self
    }

    pub fn border(mut self, width: u32, color: Color) -> Self {
        self.set_border(width, color);
        self
    }

    pub fn padding(mut self, pixels: u32) -> Self {
        self.set_padding(pixels);
        self
    }

    pub fn margin(mut self, pixels: u32) -> Self {
        self.set_margin(pixels);
        self
    }

    pub fn on_text_changed(self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.with_event("textChanged", EventHandler::text(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_property("text", text.into())
    }

    pub fn clear(&self) {
        if let Some(label) = self.core.widget() {
            label.clear();
        }
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.set_declaration("color", color.to_css())
    }

    pub fn set_background_color(&mut self, color: Color) -> &mut Self {
        self.set_declaration("background-color", color.to_css())
    }

    pub fn set_border(&mut self, width: u32, color: Color) -> &mut Self {
        self.set_declaration("border", format!("{width}px solid {}", color.to_css()))
    }

    pub fn set_padding(&mut self, pixels: u32) -> &mut Self {
        self.set_declaration("padding", format!("{pixels}px"))
    }

    pub fn set_margin(&mut self, pixels: u32) -> &mut Self {
        self.set_declaration("margin", format!("{pixels}px"))
    }

    /// The accumulated declarations in first-set order.
    pub fn declarations(&self) -> &[(&'static str, String)] {
        &self.style
    }

    fn set_declaration(&mut self, property: &'static str, value: String) -> &mut Self {
        match self.style.iter_mut().find(|(name, _)| *name == property) {
            Some(entry) => entry.1 = value,
            None => self.style.push((property, value)),
        }
        if let Some(label) = self.core.widget() {
            label
                .widget_base()
                .set_style_layer(LABEL_STYLE_LAYER, self.style.iter().map(|(p, v)| (*p, v.as_str())));
        }
        self
    }
}

impl Default for LabelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for LabelBuilder {
    type Widget = Label;

    fn core(&self) -> &ElementCore<Label> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<Label> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<Label>> {
        Ok(Label::new()?)
    }

    fn connect_event(&self, widget: &Arc<Label>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "textChanged" => handler.bind(widget, text_changed),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_visuals(&mut self, widget: &Arc<Label>) {
        if !self.style.is_empty() {
            widget
                .widget_base()
                .set_style_layer(LABEL_STYLE_LAYER, self.style.iter().map(|(p, v)| (*p, v.as_str())));
        }
    }

    fn setup_groups(&mut self, widget: &Arc<Label>) {
        if self.buddy.is_some() {
            widget.set_buddy(self.buddy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::widgets::LineEdit;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_last_write_wins_per_declaration() {
        setup();
        let mut builder = LabelBuilder::new()
            .text("Name")
            .style_sheet("font-weight: bold;")
            .color(Color::BLACK)
            .padding(4)
            .color(Color::WHITE);
        let label = builder.initialize().unwrap();

        let layer = label.widget_base().style_layer(LABEL_STYLE_LAYER).unwrap();
        assert_eq!(
            layer,
            vec![
                ("color".to_string(), "#FFFFFF".to_string()),
                ("padding".to_string(), "4px".to_string()),
            ]
        );

        builder.set_border(1, Color::BLACK);
        let sheet = label.widget_base().style_sheet();
        assert!(sheet.starts_with("font-weight: bold;"));
        assert!(sheet.contains("color: #FFFFFF;"));
        assert!(sheet.contains("border: 1px solid #000000;"));
        assert_eq!(label.widget_base().user_style_sheet(), "font-weight: bold;");
    }

    #[test]
    fn test_alignment_and_buddy() {
        setup();
        let edit = LineEdit::new().unwrap();
        let mut builder = LabelBuilder::new()
            .alignment(Alignment::Center)
            .word_wrap(true)
            .buddy(edit.object_id());
        let label = builder.initialize().unwrap();
        assert_eq!(label.alignment(), Alignment::Center);
        assert!(label.word_wrap());
        assert_eq!(label.buddy(), Some(edit.object_id()));
    }
}
