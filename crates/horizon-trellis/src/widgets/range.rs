//! Builders for the value-in-a-range widgets.
//!
//! A staged range always flushes ahead of a staged value, so
//! `.value(150).range(0, 100)` ends at 100. The widget stores the clamped
//! value, and a later widening of the range leaves it at 100.

use std::sync::Arc;

use horizon_trellis_core::widget::widgets::{
    Dial, DoubleSpinBox, Orientation, ProgressBar, Slider, SpinBox,
};
use horizon_trellis_core::SignalConnection;

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};

/// Staging setters, the value handler and live stepping shared by the
/// integer range builders.
macro_rules! int_range_builder {
    ($builder:ident) => {
        impl $builder {
            pub fn value(self, value: i32) -> Self {
                self.with_property("value", value)
            }

            pub fn minimum(self, minimum: i32) -> Self {
                self.with_property("minimum", minimum).value_last()
            }

            pub fn maximum(self, maximum: i32) -> Self {
                self.with_property("maximum", maximum).value_last()
            }

            fn value_last(mut self) -> Self {
                self.core.defer_staged("value");
                self
            }

            pub fn range(self, minimum: i32, maximum: i32) -> Self {
                self.minimum(minimum).maximum(maximum)
            }

            pub fn single_step(self, step: i32) -> Self {
                self.with_property("singleStep", step)
            }

            pub fn page_step(self, step: i32) -> Self {
                self.with_property("pageStep", step)
            }

            pub fn on_value_changed(self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
                self.with_event("valueChanged", EventHandler::int(handler))
            }

            /// The widget's value, or the staged one before initialization.
            pub fn current_value(&self) -> i32 {
                match self.core.widget() {
                    Some(widget) => widget.value(),
                    None => self.core.property("value").unwrap_or_default(),
                }
            }

            pub fn set_value(&mut self, value: i32) -> &mut Self {
                self.set_property("value", value)
            }

            pub fn set_range(&mut self, minimum: i32, maximum: i32) -> &mut Self {
                if let Some(widget) = self.core.widget() {
                    widget.set_range(minimum, maximum);
                    return self;
                }
                self.set_property("minimum", minimum).set_property("maximum", maximum);
                self.core.defer_staged("value");
                self
            }

            /// Move by whole single steps; the result is clamped.
            pub fn step_by(&self, steps: i32) {
                if let Some(widget) = self.core.widget() {
                    let target = widget.value().saturating_add(widget.single_step().saturating_mul(steps));
                    widget.set_value(target);
                }
            }

            /// Move by whole page steps; the result is clamped.
            pub fn page_by(&self, pages: i32) {
                if let Some(widget) = self.core.widget() {
                    let target = widget.value().saturating_add(widget.page_step().saturating_mul(pages));
                    widget.set_value(target);
                }
            }
        }
    };
}

// =============================================================================
// Slider
// =============================================================================

/// Builds a [`Slider`]. Events: `valueChanged(i32)`.
#[derive(Debug)]
pub struct SliderBuilder {
    core: ElementCore<Slider>,
}

impl SliderBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("Slider"),
        }
    }

    pub fn orientation(self, orientation: Orientation) -> Self {
        self.with_property("orientation", orientation.name())
    }

    pub fn tick_interval(self, interval: i32) -> Self {
        self.with_property("tickInterval", interval)
    }
}

int_range_builder!(SliderBuilder);

impl Default for SliderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for SliderBuilder {
    type Widget = Slider;

    fn core(&self) -> &ElementCore<Slider> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<Slider> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<Slider>> {
        Ok(Slider::new()?)
    }

    fn connect_event(&self, widget: &Arc<Slider>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "valueChanged" => handler.bind(widget, Slider::value_changed),
            _ => bind_common(widget, event, handler),
        }
    }
}

// =============================================================================
// Dial
// =============================================================================

#[derive(Debug)]
pub struct DialBuilder {
    core: ElementCore<Dial>,
}

impl DialBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("Dial"),
        }
    }

    pub fn wrapping(self, wrapping: bool) -> Self {
        self.with_property("wrapping", wrapping)
    }

    pub fn notches_visible(self, visible: bool) -> Self {
        self.with_property("notchesVisible", visible)
    }
}

int_range_builder!(DialBuilder);

impl Default for DialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for DialBuilder {
    type Widget = Dial;

    fn core(&self) -> &ElementCore<Dial> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<Dial> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<Dial>> {
        Ok(Dial::new()?)
    }

    fn connect_event(&self, widget: &Arc<Dial>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "valueChanged" => handler.bind(widget, Dial::value_changed),
            _ => bind_common(widget, event, handler),
        }
    }
}

// =============================================================================
// SpinBox
// =============================================================================

#[derive(Debug)]
pub struct SpinBoxBuilder {
    core: ElementCore<SpinBox>,
}

impl SpinBoxBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("SpinBox"),
        }
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.with_property("prefix", prefix.into())
    }

    pub fn suffix(self, suffix: impl Into<String>) -> Self {
        self.with_property("suffix", suffix.into())
    }

    /// Shown instead of the number at the minimum.
    pub fn special_value_text(self, text: impl Into<String>) -> Self {
        self.with_property("specialValueText", text.into())
    }

    pub fn wrapping(self, wrapping: bool) -> Self {
        self.with_property("wrapping", wrapping)
    }

    pub fn step_up(&self) {
        if let Some(widget) = self.core.widget() {
            widget.step_up();
        }
    }

    pub fn step_down(&self) {
        if let Some(widget) = self.core.widget() {
            widget.step_down();
        }
    }

    pub fn text(&self) -> Option<String> {
        self.core.widget().map(|widget| widget.text())
    }
}

int_range_builder!(SpinBoxBuilder);

impl Default for SpinBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for SpinBoxBuilder {
    type Widget = SpinBox;

    fn core(&self) -> &ElementCore<SpinBox> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<SpinBox> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<SpinBox>> {
        Ok(SpinBox::new()?)
    }

    fn connect_event(&self, widget: &Arc<SpinBox>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "valueChanged" => handler.bind(widget, SpinBox::value_changed),
            _ => bind_common(widget, event, handler),
        }
    }
}

// =============================================================================
// ProgressBar
// =============================================================================

#[derive(Debug)]
pub struct ProgressBarBuilder {
    core: ElementCore<ProgressBar>,
}

impl ProgressBarBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("ProgressBar"),
        }
    }

    /// `%p` percent, `%v` value, `%m` maximum.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.with_property("format", format.into())
    }

    pub fn text_visible(self, visible: bool) -> Self {
        self.with_property("textVisible", visible)
    }

    pub fn orientation(self, orientation: Orientation) -> Self {
        self.with_property("orientation", orientation.name())
    }

    pub fn reset(&self) {
        if let Some(widget) = self.core.widget() {
            widget.reset();
        }
    }

    pub fn percent(&self) -> Option<i32> {
        self.core.widget().map(|widget| widget.percent())
    }

    pub fn text(&self) -> Option<String> {
        self.core.widget().map(|widget| widget.text())
    }
}

int_range_builder!(ProgressBarBuilder);

impl Default for ProgressBarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for ProgressBarBuilder {
    type Widget = ProgressBar;

    fn core(&self) -> &ElementCore<ProgressBar> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<ProgressBar> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<ProgressBar>> {
        Ok(ProgressBar::new()?)
    }

    fn connect_event(&self, widget: &Arc<ProgressBar>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "valueChanged" => handler.bind(widget, ProgressBar::value_changed),
            _ => bind_common(widget, event, handler),
        }
    }
}

// =============================================================================
// DoubleSpinBox
// =============================================================================

/// Builds a [`DoubleSpinBox`]. Events: `valueChanged(f64)`.
#[derive(Debug)]
pub struct DoubleSpinBoxBuilder {
    core: ElementCore<DoubleSpinBox>,
}

impl DoubleSpinBoxBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("DoubleSpinBox"),
        }
    }

    pub fn value(self, value: f64) -> Self {
        self.with_property("value", value)
    }

    pub fn range(self, minimum: f64, maximum: f64) -> Self {
        let mut this = self.with_property("minimum", minimum).with_property("maximum", maximum);
        this.core.defer_staged("value");
        this
    }

    pub fn single_step(self, step: f64) -> Self {
        self.with_property("singleStep", step)
    }

    pub fn decimals(self, decimals: u32) -> Self {
        self.with_property("decimals", decimals)
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.with_property("prefix", prefix.into())
    }

    pub fn suffix(self, suffix: impl Into<String>) -> Self {
        self.with_property("suffix", suffix.into())
    }

    pub fn on_value_changed(self, handler: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.with_event("valueChanged", EventHandler::double(handler))
    }

    pub fn current_value(&self) -> f64 {
        match self.core.widget() {
            Some(widget) => widget.value(),
            None => self.core.property("value").unwrap_or_default(),
        }
    }

    pub fn set_value(&mut self, value: f64) -> &mut Self {
        self.set_property("value", value)
    }

    pub fn step_up(&self) {
        if let Some(widget) = self.core.widget() {
            widget.step_up();
        }
    }

    pub fn step_down(&self) {
        if let Some(widget) = self.core.widget() {
            widget.step_down();
        }
    }
}

impl Default for DoubleSpinBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for DoubleSpinBoxBuilder {
    type Widget = DoubleSpinBox;

    fn core(&self) -> &ElementCore<DoubleSpinBox> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<DoubleSpinBox> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<DoubleSpinBox>> {
        Ok(DoubleSpinBox::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<DoubleSpinBox>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "valueChanged" => handler.bind(widget, DoubleSpinBox::value_changed),
            _ => bind_common(widget, event, handler),
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
    fn test_value_before_range_is_clamped() {
        setup();
        let mut builder = SliderBuilder::new().value(150).range(0, 100);
        assert_eq!(builder.current_value(), 150);
        let slider = builder.initialize().unwrap();
        assert_eq!(slider.value(), 100);

        builder.set_range(0, 200);
        assert_eq!(builder.current_value(), 100);
        builder.set_range(0, 50);
        assert_eq!(builder.current_value(), 50);
    }

    #[test]
    fn test_staged_range_change_reclamps_value() {
        setup();
        let mut builder = DialBuilder::new().value(40).maximum(30);
        builder.set_range(0, 200);
        assert_eq!(builder.initialize().unwrap().value(), 40);

        let mut spin = DoubleSpinBoxBuilder::new().value(7.5).range(0.0, 5.0);
        assert_eq!(spin.initialize().unwrap().value(), 5.0);
    }

    #[test]
    fn test_spin_box_steps_and_affixes() {
        setup();
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink = values.clone();
        let mut builder = SpinBoxBuilder::new()
            .range(0, 10)
            .single_step(5)
            .prefix("$")
            .on_value_changed(move |v| sink.lock().push(v));
        builder.initialize().unwrap();

        builder.step_up();
        builder.step_up();
        builder.step_up();
        assert_eq!(builder.current_value(), 10);
        assert_eq!(builder.text().as_deref(), Some("$10"));
        builder.step_down();
        assert_eq!(*values.lock(), vec![5, 10, 5]);
    }

    #[test]
    fn test_progress_bar_paging() {
        setup();
        let mut builder = ProgressBarBuilder::new().page_step(30).format("%v of %m");
        let bar = builder.initialize().unwrap();
        builder.page_by(2);
        assert_eq!(bar.value(), 60);
        builder.page_by(5);
        assert_eq!(builder.percent(), Some(100));
        assert_eq!(builder.text().as_deref(), Some("100 of 100"));
        builder.reset();
        assert_eq!(bar.value(), 0);
    }

    #[test]
    fn test_double_spin_box_handler() {
        setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut builder = DoubleSpinBoxBuilder::new()
            .range(0.0, 1.0)
            .single_step(0.25)
            .on_value_changed(move |v| sink.lock().push(v));
        builder.initialize().unwrap();
        builder.step_up();
        builder.set_value(0.8);
        assert_eq!(*seen.lock(), vec![0.25, 0.8]);
    }
}
