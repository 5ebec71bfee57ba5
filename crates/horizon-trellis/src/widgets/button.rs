//! Push button builder.

use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_trellis_core::widget::Widget;
use horizon_trellis_core::widget::widgets::PushButton;
use horizon_trellis_core::{Color, Icon, SignalConnection};
use parking_lot::Mutex;

use super::{bind_button, clicked};
use crate::element::{ElementCore, EventHandler, UiElement};
use crate::logging::targets;
use crate::validation::ValidationResult;

/// Text shown while a button is loading, unless configured otherwise.
pub const DEFAULT_LOADING_TEXT: &str = "Loading...";

/// Two clicks closer together than this count as a double click.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

const REQUIRED_MESSAGE: &str = "This field is required";
const GRADIENT_LAYER: &str = "button.gradient";

type ButtonPredicate = Arc<dyn Fn(&PushButton) -> bool + Send + Sync>;

/// Builds a [`PushButton`].
///
/// Events: `clicked(bool)`, `toggled(bool)`, `pressed`, `released`,
/// `textChanged(String)`, `doubleClicked`, plus the common events.
///
/// Beyond plain properties the builder tracks a loading state, a disabled
/// reason, a list of state labels, a badge and a progress percentage. The
/// displayed text is the current state label (or the plain label), followed
/// by the progress as `" 40%"` and the badge as `" (3)"`.
pub struct ButtonBuilder {
    core: ElementCore<PushButton>,
    label: Option<String>,
    loading: bool,
    loading_text: String,
    restore_enabled: Option<bool>,
    disabled: bool,
    disabled_reason: String,
    tooltip_before_disable: Option<String>,
    states: Vec<String>,
    current_state: usize,
    badge: Option<String>,
    progress: Option<i32>,
    gradient: Option<(Color, Color)>,
    required: bool,
    validator: Option<ButtonPredicate>,
    on_invalid: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    validation_error: Option<String>,
}

impl ButtonBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("PushButton"),
            label: None,
            loading: false,
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            restore_enabled: None,
            disabled: false,
            disabled_reason: String::new(),
            tooltip_before_disable: None,
            states: Vec::new(),
            current_state: 0,
            badge: None,
            progress: None,
            gradient: None,
            required: false,
            validator: None,
            on_invalid: None,
            validation_error: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.label = Some(text.clone());
        self.with_property("text", text)
    }

    pub fn icon(self, icon: Icon) -> Self {
        self.with_property("icon", icon)
    }

    pub fn checkable(self, checkable: bool) -> Self {
        self.with_property("checkable", checkable)
    }

    pub fn checked(self, checked: bool) -> Self {
        self.with_property("checked", checked)
    }

    pub fn flat(self, flat: bool) -> Self {
        self.with_property("flat", flat)
    }

    /// Make this the dialog's default button.
    pub fn default_button(self, default: bool) -> Self {
        self.with_property("default", default)
    }

    /// Background gradient from `start` (top) to `end` (bottom).
    pub fn gradient(mut self, start: Color, end: Color) -> Self {
        self.gradient = Some((start, end));
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Disable the button, showing `reason` as its tooltip.
    pub fn disabled(mut self, reason: impl Into<String>) -> Self {
        self.disabled = true;
        self.disabled_reason = reason.into();
        self
    }

    /// Cycle the label through `states`, starting at `current` (clamped).
    pub fn states<I, S>(mut self, states: I, current: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self.current_state = current.min(self.states.len().saturating_sub(1));
        self
    }

    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Progress percentage, clamped to `0..=100`.
    pub fn progress(mut self, percentage: i32) -> Self {
        self.progress = Some(percentage.clamp(0, 100));
        self
    }

    /// A required button is valid only with a label or an icon.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Replace the default validity check.
    pub fn validator(mut self, predicate: impl Fn(&PushButton) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(predicate));
        self
    }

    pub fn on_validation_failed(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_invalid = Some(Arc::new(handler));
        self
    }

    pub fn on_click(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("clicked", EventHandler::unit(handler))
    }

    pub fn on_toggled(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("toggled", EventHandler::bool(handler))
    }

    pub fn on_pressed(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("pressed", EventHandler::unit(handler))
    }

    pub fn on_released(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("released", EventHandler::unit(handler))
    }

    pub fn on_hover(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("hovered", EventHandler::bool(handler))
    }

    pub fn on_focus(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("focusChanged", EventHandler::bool(handler))
    }

    /// Fires on a click within [`DOUBLE_CLICK_INTERVAL`] of the previous one.
    pub fn on_double_click(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("doubleClicked", EventHandler::unit(handler))
    }

    // =========================================================================
    // Live state
    // =========================================================================

    /// Change the plain label.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.label = Some(text.into());
        self.redraw();
        self
    }

    /// Enter or leave the loading state.
    ///
    /// Entering saves the label and enabled state, shows the loading text and
    /// disables the button; leaving restores both.
    pub fn set_loading(&mut self, loading: bool) -> &mut Self {
        if self.loading != loading {
            self.loading = loading;
            tracing::debug!(target: targets::ELEMENT, loading, "button loading state changed");
            self.redraw();
        }
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_disabled(&mut self, disabled: bool, reason: impl Into<String>) -> &mut Self {
        self.disabled = disabled;
        self.disabled_reason = reason.into();
        self.apply_disabled();
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Show the state label at `index` (clamped).
    pub fn set_state(&mut self, index: usize) -> &mut Self {
        if !self.states.is_empty() {
            self.current_state = index.min(self.states.len() - 1);
            self.redraw();
        }
        self
    }

    /// Advance to the next state label, wrapping around. Returns the new index.
    pub fn next_state(&mut self) -> usize {
        if !self.states.is_empty() {
            let next = (self.current_state + 1) % self.states.len();
            self.set_state(next);
        }
        self.current_state
    }

    pub fn current_state(&self) -> usize {
        self.current_state
    }

    pub fn state_label(&self) -> Option<&str> {
        self.states.get(self.current_state).map(String::as_str)
    }

    pub fn set_badge(&mut self, badge: Option<String>) -> &mut Self {
        self.badge = badge;
        self.redraw();
        self
    }

    pub fn set_progress(&mut self, percentage: i32) -> &mut Self {
        self.progress = Some(percentage.clamp(0, 100));
        self.redraw();
        self
    }

    pub fn progress_value(&self) -> Option<i32> {
        self.progress
    }

    /// Click the built button. Ignored while disabled or loading.
    pub fn click(&self) {
        if let Some(widget) = self.core.widget() {
            widget.click();
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    pub fn is_valid(&self) -> bool {
        let Some(widget) = self.core.widget() else {
            return !self.required || self.label.as_deref().is_some_and(|l| !l.is_empty());
        };
        if let Some(validator) = &self.validator {
            return validator(widget);
        }
        !self.required
            || !widget.text().is_empty()
            || widget.button().icon().is_some_and(|icon| !icon.is_null())
    }

    /// Check validity, notifying the failure handler when invalid.
    pub fn validate(&mut self) -> ValidationResult {
        if self.is_valid() {
            self.validation_error = None;
            return ValidationResult::success();
        }
        let message = if self.required {
            REQUIRED_MESSAGE
        } else {
            "Validation failed"
        };
        if let Some(handler) = &self.on_invalid {
            handler(message);
        }
        self.validation_error = Some(message.to_string());
        ValidationResult::failure(message)
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn display_text(&self) -> String {
        let mut text = match self.states.get(self.current_state) {
            Some(state) => state.clone(),
            None => self.label.clone().unwrap_or_default(),
        };
        if let Some(progress) = self.progress {
            text.push_str(&format!(" {progress}%"));
        }
        if let Some(badge) = &self.badge {
            text.push_str(&format!(" ({badge})"));
        }
        text
    }

    fn is_decorated(&self) -> bool {
        !self.states.is_empty() || self.badge.is_some() || self.progress.is_some()
    }

    fn redraw(&mut self) {
        let Some(widget) = self.core.widget().cloned() else {
            return;
        };
        let base = widget.widget_base();
        if self.loading {
            if self.restore_enabled.is_none() {
                if !self.is_decorated() {
                    self.label = Some(widget.text());
                }
                self.restore_enabled = Some(base.is_enabled());
            }
            widget.set_text(self.loading_text.clone());
            base.set_enabled(false);
            return;
        }
        if let Some(enabled) = self.restore_enabled.take() {
            base.set_enabled(enabled && !self.disabled);
        }
        widget.set_text(self.display_text());
    }

    fn apply_disabled(&mut self) {
        let Some(widget) = self.core.widget().cloned() else {
            return;
        };
        let base = widget.widget_base();
        if self.disabled {
            base.set_enabled(false);
            if !self.disabled_reason.is_empty() {
                self.tooltip_before_disable.get_or_insert_with(|| base.tool_tip());
                base.set_tool_tip(self.disabled_reason.clone());
            }
        } else {
            if self.loading {
                self.restore_enabled = Some(true);
            } else {
                base.set_enabled(true);
            }
            if let Some(tooltip) = self.tooltip_before_disable.take() {
                base.set_tool_tip(tooltip);
            }
        }
    }
}

impl Default for ButtonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for ButtonBuilder {
    type Widget = PushButton;

    fn core(&self) -> &ElementCore<PushButton> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<PushButton> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<PushButton>> {
        Ok(PushButton::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<PushButton>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "doubleClicked" => bind_double_click(widget, handler),
            _ => bind_button(widget, event, handler),
        }
    }

    fn setup_accessibility(&mut self, widget: &Arc<PushButton>) {
        if self.required {
            let id = widget.object_id();
            self.core
                .accessibility_manager()
                .update(id, |properties| properties.state.required = true);
        }
    }

    fn setup_visuals(&mut self, widget: &Arc<PushButton>) {
        if let Some((start, end)) = self.gradient {
            widget.widget_base().set_style_layer(
                GRADIENT_LAYER,
                [(
                    "background",
                    format!(
                        "qlineargradient(x1: 0, y1: 0, x2: 0, y2: 1, stop: 0 {}, stop: 1 {})",
                        start.to_css(),
                        end.to_css()
                    ),
                )],
            );
        }
    }

    fn reconcile_state(&mut self, widget: &Arc<PushButton>) {
        if self.label.is_none() {
            self.label = Some(widget.text());
        }
        if self.disabled {
            self.apply_disabled();
        }
        self.redraw();
    }
}

/// Each connection keeps its own last-click time, so buttons never see
/// each other's clicks.
fn bind_double_click(widget: &Arc<PushButton>, handler: &EventHandler) -> Option<SignalConnection> {
    if !handler.accepts::<()>() {
        return None;
    }
    let handler = handler.clone();
    let last_click: Mutex<Option<Instant>> = Mutex::new(None);
    let id = widget.button().clicked.connect(move |_| {
        let now = Instant::now();
        let previous = last_click.lock().replace(now);
        if previous.is_some_and(|at| now.duration_since(at) < DOUBLE_CLICK_INTERVAL) {
            handler.call(&());
        }
    });
    Some(SignalConnection::new(widget, clicked::<PushButton>, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use horizon_trellis_core::init_global_registry;

    fn setup() {
        init_global_registry();
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inc = count.clone();
        (count, move || {
            inc.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_disabled_click_is_ignored() {
        setup();
        let (count, on_click) = counter();
        let mut builder = ButtonBuilder::new()
            .text("Submit")
            .enabled(false)
            .on_click(on_click);
        let button = builder.initialize().unwrap();
        assert_eq!(button.text(), "Submit");
        assert!(!button.widget_base().is_enabled());

        button.click();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        builder.set_property("enabled", true);
        button.click();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_loading_saves_and_restores() {
        setup();
        let mut builder = ButtonBuilder::new().text("Save");
        let button = builder.initialize().unwrap();

        builder.set_loading(true);
        assert_eq!(button.text(), DEFAULT_LOADING_TEXT);
        assert!(!button.widget_base().is_enabled());

        builder.set_loading(false);
        assert_eq!(button.text(), "Save");
        assert!(button.widget_base().is_enabled());
    }

    #[test]
    fn test_loading_keeps_explicit_disable() {
        setup();
        let mut builder = ButtonBuilder::new()
            .text("Save")
            .loading(true)
            .loading_text("Saving")
            .disabled("Fill in the form first");
        let button = builder.initialize().unwrap();
        assert_eq!(button.text(), "Saving");

        builder.set_loading(false);
        assert_eq!(button.text(), "Save");
        assert!(!button.widget_base().is_enabled());
        assert_eq!(button.widget_base().tool_tip(), "Fill in the form first");

        builder.set_disabled(false, "");
        assert!(button.widget_base().is_enabled());
        assert_eq!(button.widget_base().tool_tip(), "");
    }

    #[test]
    fn test_states_badge_and_progress() {
        setup();
        let mut builder = ButtonBuilder::new()
            .states(["Play", "Pause", "Stop"], 7)
            .badge("3");
        let button = builder.initialize().unwrap();
        assert_eq!(builder.current_state(), 2);
        assert_eq!(button.text(), "Stop (3)");

        assert_eq!(builder.next_state(), 0);
        builder.set_badge(None).set_progress(140);
        assert_eq!(builder.progress_value(), Some(100));
        assert_eq!(button.text(), "Play 100%");
    }

    #[test]
    fn test_double_click_is_per_widget() {
        setup();
        let (first_count, first_handler) = counter();
        let (second_count, second_handler) = counter();
        let mut first = ButtonBuilder::new().on_double_click(first_handler);
        let mut second = ButtonBuilder::new().on_double_click(second_handler);
        let a = first.initialize().unwrap();
        let b = second.initialize().unwrap();

        a.click();
        b.click();
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 0);

        a.click();
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_required_validation() {
        setup();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        let mut builder = ButtonBuilder::new()
            .required(true)
            .on_validation_failed(move |message| sink.lock().push(message.to_string()));
        let button = builder.initialize().unwrap();

        let result = builder.validate();
        assert!(!result.is_valid());
        assert_eq!(result.first_error(), Some(REQUIRED_MESSAGE));
        assert_eq!(*failures.lock(), vec![REQUIRED_MESSAGE.to_string()]);

        button.button().set_icon(Some(Icon::new("send.svg")));
        assert!(builder.validate().is_valid());
        assert_eq!(builder.validation_error(), None);
    }

    #[test]
    fn test_gradient_layer() {
        setup();
        let mut builder = ButtonBuilder::new().gradient(Color::WHITE, Color::BLACK);
        let button = builder.initialize().unwrap();
        let layer = button.widget_base().style_layer(GRADIENT_LAYER).unwrap();
        assert!(layer[0].1.contains("stop: 0 #FFFFFF, stop: 1 #000000"));
    }
}
