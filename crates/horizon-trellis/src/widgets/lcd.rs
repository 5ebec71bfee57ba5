use std::sync::Arc;

use horizon_trellis_core::widget::widgets::{LcdMode, LcdNumber};
use horizon_trellis_core::{Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};

fn overflow(lcd: &LcdNumber) -> &Signal<()> {
    &lcd.overflow
}

#[derive(Debug, Clone, PartialEq)]
enum Reading {
    Number(f64),
    Text(String),
}

/// Builds an [`LcdNumber`].
///
/// The reading is shown after the digit count and mode are applied, so a
/// value that does not fit raises `overflow` on the built widget.
#[derive(Debug)]
pub struct LcdNumberBuilder {
    core: ElementCore<LcdNumber>,
    reading: Option<Reading>,
}

impl LcdNumberBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("LcdNumber"),
            reading: None,
        }
    }

    pub fn digit_count(self, digits: usize) -> Self {
        self.with_property("digitCount", digits)
    }

    pub fn mode(self, mode: LcdMode) -> Self {
        self.with_property("mode", mode.name())
    }

    pub fn small_decimal_point(self, small: bool) -> Self {
        self.with_property("smallDecimalPoint", small)
    }

    pub fn value(mut self, value: f64) -> Self {
        self.reading = Some(Reading::Number(value));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.reading = Some(Reading::Text(text.into()));
        self
    }

    pub fn on_overflow(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("overflow", EventHandler::unit(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn display(&self, value: f64) {
        if let Some(lcd) = self.core.widget() {
            lcd.display(value);
        }
    }

    pub fn display_text(&self, text: &str) {
        if let Some(lcd) = self.core.widget() {
            lcd.display_text(text);
        }
    }

    /// The padded segment text.
    pub fn shown_text(&self) -> String {
        self.core.widget().map(|lcd| lcd.text()).unwrap_or_default()
    }

    pub fn shown_value(&self) -> f64 {
        self.core.widget().map_or(0.0, |lcd| lcd.value())
    }

    pub fn would_overflow(&self, value: f64) -> bool {
        self.core.widget().is_some_and(|lcd| lcd.check_overflow(value))
    }
}

impl Default for LcdNumberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for LcdNumberBuilder {
    type Widget = LcdNumber;

    fn core(&self) -> &ElementCore<LcdNumber> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<LcdNumber> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<LcdNumber>> {
        Ok(LcdNumber::new()?)
    }

    fn connect_event(&self, widget: &Arc<LcdNumber>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "overflow" => handler.bind(widget, overflow),
            _ => bind_common(widget, event, handler),
        }
    }

    fn reconcile_state(&mut self, widget: &Arc<LcdNumber>) {
        match self.reading.take() {
            Some(Reading::Number(value)) => widget.display(value),
            Some(Reading::Text(text)) => widget.display_text(&text),
            None => {}
        }
    }
}
