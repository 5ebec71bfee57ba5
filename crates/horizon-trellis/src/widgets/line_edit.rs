//! Line edit builder with live validation.
//!
//! A [`LineEditBuilder`] can carry a [`ValidationChain`] over the text. The
//! chain runs after typing pauses for the debounce interval and again when
//! the widget loses focus. Each run updates the border through the
//! [`LINE_EDIT_VALIDATION_LAYER`] style layer, shows the first error as the
//! tooltip and reports the result to the validation callback.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use horizon_trellis_core::widget::widgets::{EchoMode, LineEdit};
use horizon_trellis_core::widget::{CaseSensitivity, Completer, MatchMode, Widget};
use horizon_trellis_core::{Key, SignalConnection, SingleShotTimer, Signal, WidgetEvent};
use parking_lot::Mutex;

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};
use crate::enhancer::{DEFAULT_DEBOUNCE, INVALID_COLOR, VALID_COLOR};
use crate::logging::targets;
use crate::validation::{ValidationChain, ValidationResult};

/// Style layer carrying the validation border.
pub const LINE_EDIT_VALIDATION_LAYER: &str = "line_edit.validation";

/// Case rewriting applied as the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTransform {
    #[default]
    None,
    Upper,
    Lower,
    /// First letter of every word upper case, the rest lower case.
    Title,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Title => {
                let mut out = String::with_capacity(text.len());
                let mut word_start = true;
                for c in text.chars() {
                    if c.is_whitespace() {
                        word_start = true;
                        out.push(c);
                    } else if word_start {
                        word_start = false;
                        out.extend(c.to_uppercase());
                    } else {
                        out.extend(c.to_lowercase());
                    }
                }
                out
            }
        }
    }
}

type ValidationCallback = Arc<dyn Fn(&ValidationResult) + Send + Sync>;
type SubmitCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Validation state shared between the builder and the widget's slots.
struct LiveValidation {
    chain: ValidationChain<str>,
    last: Mutex<Option<ValidationResult>>,
    tooltip: Mutex<Option<String>>,
    on_change: Option<ValidationCallback>,
}

impl LiveValidation {
    fn run(&self, widget: &LineEdit) -> ValidationResult {
        let text = widget.text();
        let result = self.chain.validate(text.as_str());
        let base = widget.widget_base();

        let mut saved = self.tooltip.lock();
        match result.first_error() {
            Some(message) => {
                if saved.is_none() {
                    *saved = Some(base.tool_tip());
                }
                base.set_style_layer(
                    LINE_EDIT_VALIDATION_LAYER,
                    [("border", format!("2px solid {INVALID_COLOR}"))],
                );
                base.set_tool_tip(message);
            }
            None => {
                if text.is_empty() {
                    base.clear_style_layer(LINE_EDIT_VALIDATION_LAYER);
                } else {
                    base.set_style_layer(
                        LINE_EDIT_VALIDATION_LAYER,
                        [("border", format!("2px solid {VALID_COLOR}"))],
                    );
                }
                if let Some(tooltip) = saved.take() {
                    base.set_tool_tip(tooltip);
                }
            }
        }
        drop(saved);

        tracing::trace!(
            target: targets::VALIDATION,
            id = ?widget.object_id(),
            valid = result.is_valid(),
            "line edit validated"
        );
        *self.last.lock() = Some(result.clone());
        if let Some(callback) = &self.on_change {
            callback(&result);
        }
        result
    }
}

fn text_changed(edit: &LineEdit) -> &Signal<String> {
    &edit.text_changed
}

fn text_edited(edit: &LineEdit) -> &Signal<String> {
    &edit.text_edited
}

fn return_pressed(edit: &LineEdit) -> &Signal<()> {
    &edit.return_pressed
}

fn editing_finished(edit: &LineEdit) -> &Signal<()> {
    &edit.editing_finished
}

fn input_rejected(edit: &LineEdit) -> &Signal<()> {
    &edit.input_rejected
}

/// Builds a [`LineEdit`].
///
/// Events: `textChanged(text)`, `textEdited(text)`, `returnPressed`,
/// `editingFinished`, `inputRejected`, plus the common events.
pub struct LineEditBuilder {
    core: ElementCore<LineEdit>,
    chain: ValidationChain<str>,
    validate_on_type: bool,
    validate_on_focus_lost: bool,
    debounce: Duration,
    on_validation: Option<ValidationCallback>,
    live: Option<Arc<LiveValidation>>,
    debounce_timer: Option<Arc<SingleShotTimer>>,
    transform: TextTransform,
    select_all_on_focus: bool,
    clear_on_escape: bool,
    on_submit: Option<SubmitCallback>,
    suggestions: Option<Vec<String>>,
}

impl LineEditBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("LineEdit"),
            chain: ValidationChain::new(),
            validate_on_type: true,
            validate_on_focus_lost: true,
            debounce: DEFAULT_DEBOUNCE,
            on_validation: None,
            live: None,
            debounce_timer: None,
            transform: TextTransform::None,
            select_all_on_focus: false,
            clear_on_escape: false,
            on_submit: None,
            suggestions: None,
        }
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_property("text", text.into())
    }

    pub fn placeholder(self, text: impl Into<String>) -> Self {
        self.with_property("placeholderText", text.into())
    }

    pub fn password(self, password: bool) -> Self {
        let mode = if password { EchoMode::Password } else { EchoMode::Normal };
        self.echo_mode(mode)
    }

    pub fn echo_mode(self, mode: EchoMode) -> Self {
        self.with_property("echoMode", mode.name())
    }

    pub fn read_only(self, read_only: bool) -> Self {
        self.with_property("readOnly", read_only)
    }

    pub fn max_length(self, length: usize) -> Self {
        self.with_property("maxLength", length)
    }

    pub fn input_mask(self, mask: impl Into<String>) -> Self {
        self.with_property("inputMask", mask.into())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Replace the validation chain.
    pub fn validation(mut self, chain: ValidationChain<str>) -> Self {
        self.chain = chain;
        self
    }

    pub fn required(mut self) -> Self {
        self.chain = self.chain.required();
        self
    }

    pub fn email(mut self) -> Self {
        self.chain = self.chain.email();
        self
    }

    pub fn url(mut self) -> Self {
        self.chain = self.chain.url();
        self
    }

    /// Accept decimal numbers; empty text passes.
    pub fn numeric(mut self) -> Self {
        self.chain = self.chain.custom_with(
            |text: &str| text.is_empty() || text.trim().parse::<f64>().is_ok(),
            "Must be a number",
        );
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.chain = self.chain.min_length(min);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.chain = self.chain.pattern(pattern);
        self
    }

    pub fn validate_on_type(mut self, enabled: bool) -> Self {
        self.validate_on_type = enabled;
        self
    }

    pub fn validate_on_focus_lost(mut self, enabled: bool) -> Self {
        self.validate_on_focus_lost = enabled;
        self
    }

    /// Quiet period after the last keystroke before validating.
    pub fn debounce(mut self, interval: Duration) -> Self {
        self.debounce = interval;
        self
    }

    /// Called with every validation result.
    pub fn on_validation_changed(
        mut self,
        callback: impl Fn(&ValidationResult) + Send + Sync + 'static,
    ) -> Self {
        self.on_validation = Some(Arc::new(callback));
        self
    }

    // =========================================================================
    // Behavior
    // =========================================================================

    pub fn text_transform(mut self, transform: TextTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn select_all_on_focus(mut self, enabled: bool) -> Self {
        self.select_all_on_focus = enabled;
        self
    }

    /// Escape clears the text unless a completion popup is open.
    pub fn clear_on_escape(mut self, enabled: bool) -> Self {
        self.clear_on_escape = enabled;
        self
    }

    /// Called with the text when Enter is pressed on valid input.
    pub fn on_submit(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Offer case-insensitive completions containing the typed text.
    pub fn autocomplete<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = Some(suggestions.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_text_changed(self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.with_event("textChanged", EventHandler::text(handler))
    }

    pub fn on_text_edited(self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.with_event("textEdited", EventHandler::text(handler))
    }

    pub fn on_return_pressed(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("returnPressed", EventHandler::unit(handler))
    }

    pub fn on_editing_finished(self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.with_event("editingFinished", EventHandler::unit(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn current_text(&self) -> String {
        self.core.widget().map(|widget| widget.text()).unwrap_or_default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_property("text", text.into())
    }

    pub fn clear(&self) {
        if let Some(widget) = self.core.widget() {
            widget.set_text("");
        }
    }

    pub fn select_all(&self) {
        if let Some(widget) = self.core.widget() {
            widget.select_all();
        }
    }

    /// Run the chain against `text` without touching the widget.
    pub fn check(&self, text: &str) -> ValidationResult {
        self.chain.validate(text)
    }

    /// Validate the current text now, cancelling a pending debounce.
    pub fn validate_now(&self) -> ValidationResult {
        if let Some(timer) = &self.debounce_timer {
            timer.stop();
        }
        match (&self.live, self.core.widget()) {
            (Some(live), Some(widget)) => live.run(widget),
            _ => self.chain.validate(self.current_text().as_str()),
        }
    }

    /// The result of the last validation run.
    pub fn validation_result(&self) -> Option<ValidationResult> {
        self.live.as_ref().and_then(|live| live.last.lock().clone())
    }

    /// Whether the current text passes the chain.
    pub fn is_valid(&self) -> bool {
        self.chain.validate(self.current_text().as_str()).is_valid()
    }

    pub fn validation_pending(&self) -> bool {
        self.debounce_timer.as_ref().is_some_and(|timer| timer.is_active())
    }
}

impl Default for LineEditBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineEditBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEditBuilder")
            .field("core", &self.core)
            .field("rules", &self.chain.len())
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl UiElement for LineEditBuilder {
    type Widget = LineEdit;

    fn core(&self) -> &ElementCore<LineEdit> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<LineEdit> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<LineEdit>> {
        Ok(LineEdit::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<LineEdit>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "textChanged" => handler.bind(widget, text_changed),
            "textEdited" => handler.bind(widget, text_edited),
            "returnPressed" => handler.bind(widget, return_pressed),
            "editingFinished" => handler.bind(widget, editing_finished),
            "inputRejected" => handler.bind(widget, input_rejected),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_event_filters(&mut self, widget: &Arc<LineEdit>) {
        let base = widget.widget_base();

        if self.transform != TextTransform::None {
            let transform = self.transform;
            let weak: Weak<LineEdit> = Arc::downgrade(widget);
            widget.text_edited.connect(move |text| {
                let rewritten = transform.apply(text);
                if rewritten != *text
                    && let Some(edit) = weak.upgrade()
                {
                    edit.set_text(&rewritten);
                }
            });
        }

        if self.select_all_on_focus {
            let weak: Weak<LineEdit> = Arc::downgrade(widget);
            base.focus_changed.connect(move |&focused| {
                if focused && let Some(edit) = weak.upgrade() {
                    edit.select_all();
                }
            });
        }

        if self.clear_on_escape {
            let weak: Weak<LineEdit> = Arc::downgrade(widget);
            base.install_event_filter(move |_, event| {
                let WidgetEvent::KeyPress { key: Key::Escape, .. } = event else {
                    return false;
                };
                let Some(edit) = weak.upgrade() else {
                    return false;
                };
                if edit.completer().is_some_and(|c| c.is_popup_visible()) {
                    return false;
                }
                edit.set_text("");
                true
            });
        }

        if let Some(suggestions) = self.suggestions.take() {
            let completer = Completer::with_strings(suggestions);
            completer.set_case_sensitivity(CaseSensitivity::CaseInsensitive);
            completer.set_match_mode(MatchMode::Contains);
            widget.set_completer(Some(Arc::new(completer)));
        }
    }

    fn setup_validation(&mut self, widget: &Arc<LineEdit>) {
        if self.chain.is_empty() {
            return;
        }
        let live = Arc::new(LiveValidation {
            chain: self.chain.clone(),
            last: Mutex::new(None),
            tooltip: Mutex::new(None),
            on_change: self.on_validation.clone(),
        });

        if self.validate_on_type {
            let timer = Arc::new(SingleShotTimer::new(self.debounce));
            let weak: Weak<LineEdit> = Arc::downgrade(widget);
            let state = live.clone();
            timer.timeout().connect(move |_| {
                if let Some(edit) = weak.upgrade() {
                    state.run(&edit);
                }
            });
            let restart = timer.clone();
            widget.text_edited.connect(move |_| restart.start());
            self.debounce_timer = Some(timer);
        }

        if self.validate_on_focus_lost {
            let weak: Weak<LineEdit> = Arc::downgrade(widget);
            let state = live.clone();
            let timer = self.debounce_timer.clone();
            widget.widget_base().focus_changed.connect(move |&focused| {
                if focused {
                    return;
                }
                if let Some(timer) = &timer {
                    timer.stop();
                }
                if let Some(edit) = weak.upgrade() {
                    state.run(&edit);
                }
            });
        }

        tracing::debug!(
            target: targets::VALIDATION,
            id = ?widget.object_id(),
            rules = self.chain.len(),
            debounce_ms = self.debounce.as_millis() as u64,
            "line edit validation installed"
        );
        self.live = Some(live);
    }

    fn setup_groups(&mut self, widget: &Arc<LineEdit>) {
        let Some(handler) = self.on_submit.clone() else {
            return;
        };
        let weak: Weak<LineEdit> = Arc::downgrade(widget);
        let live = self.live.clone();
        widget.return_pressed.connect(move |_| {
            let Some(edit) = weak.upgrade() else {
                return;
            };
            let valid = live.as_ref().is_none_or(|live| live.run(&edit).is_valid());
            if valid {
                handler(&edit.text());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::{EventLoop, KeyboardModifiers, init_global_registry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() {
        init_global_registry();
    }

    fn type_text(edit: &LineEdit, text: &str) {
        let widget: &dyn Widget = edit;
        for c in text.chars() {
            widget.send_event(&WidgetEvent::KeyPress {
                key: Key::Space,
                modifiers: KeyboardModifiers::NONE,
                text: c.to_string(),
            });
        }
    }

    #[test]
    fn test_chain_reports_every_failure() {
        setup();
        let builder = LineEditBuilder::new()
            .required()
            .min_length(3)
            .pattern("^[A-Za-z]+$");

        let empty = builder.check("");
        assert!(!empty.is_valid());
        assert_eq!(empty.messages().len(), 3);
        assert!(builder.check("Abc").is_valid());
        assert_eq!(builder.check("Ab1").messages().len(), 1);
    }

    #[test]
    fn test_typing_is_debounced() {
        setup();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut builder = LineEditBuilder::new()
            .min_length(3)
            .debounce(Duration::from_millis(20))
            .on_validation_changed(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let edit = builder.initialize().unwrap();

        type_text(&edit, "ab");
        assert!(builder.validation_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        EventLoop::process_events_for(Duration::from_millis(60));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let result = builder.validation_result().unwrap();
        assert!(!result.is_valid());
        let layer = edit.widget_base().style_layer(LINE_EDIT_VALIDATION_LAYER).unwrap();
        assert_eq!(layer[0].1, format!("2px solid {INVALID_COLOR}"));
        assert_eq!(edit.widget_base().tool_tip(), result.first_error().unwrap());
    }

    #[test]
    fn test_focus_loss_validates_and_restores_tooltip() {
        setup();
        let mut builder = LineEditBuilder::new()
            .tooltip("Your name")
            .required()
            .validate_on_type(false);
        let edit = builder.initialize().unwrap();
        let widget: &dyn Widget = &*edit;

        widget.send_event(&WidgetEvent::FocusIn);
        widget.send_event(&WidgetEvent::FocusOut);
        assert!(!builder.validation_result().unwrap().is_valid());
        assert_eq!(edit.widget_base().tool_tip(), "Field is required");

        edit.set_text("Ada");
        widget.send_event(&WidgetEvent::FocusIn);
        widget.send_event(&WidgetEvent::FocusOut);
        assert!(builder.validation_result().unwrap().is_valid());
        assert_eq!(edit.widget_base().tool_tip(), "Your name");
        let layer = edit.widget_base().style_layer(LINE_EDIT_VALIDATION_LAYER).unwrap();
        assert_eq!(layer[0].1, format!("2px solid {VALID_COLOR}"));
    }

    #[test]
    fn test_transform_and_escape() {
        setup();
        let mut builder = LineEditBuilder::new()
            .text_transform(TextTransform::Upper)
            .clear_on_escape(true);
        let edit = builder.initialize().unwrap();

        type_text(&edit, "ab");
        assert_eq!(edit.text(), "AB");

        let widget: &dyn Widget = &*edit;
        assert!(widget.send_event(&WidgetEvent::key_press(Key::Escape, KeyboardModifiers::NONE)));
        assert_eq!(edit.text(), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(TextTransform::Title.apply("hello wORLD"), "Hello World");
        assert_eq!(TextTransform::Lower.apply("MiXeD"), "mixed");
    }

    #[test]
    fn test_submit_only_valid_input() {
        setup();
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = submitted.clone();
        let mut builder = LineEditBuilder::new()
            .numeric()
            .validate_on_type(false)
            .on_submit(move |text| sink.lock().push(text.to_string()));
        let edit = builder.initialize().unwrap();
        let widget: &dyn Widget = &*edit;

        edit.set_text("abc");
        widget.send_event(&WidgetEvent::key_press(Key::Enter, KeyboardModifiers::NONE));
        edit.set_text("4.5");
        widget.send_event(&WidgetEvent::key_press(Key::Enter, KeyboardModifiers::NONE));
        assert_eq!(*submitted.lock(), vec!["4.5".to_string()]);
    }

    #[test]
    fn test_autocomplete_matches_anywhere() {
        setup();
        let mut builder = LineEditBuilder::new().autocomplete(["Berlin", "Lisbon", "Oslo"]);
        let edit = builder.initialize().unwrap();
        let completer = edit.completer().unwrap();
        assert_eq!(completer.match_mode(), MatchMode::Contains);
        completer.update_completions("LI");
        assert_eq!(completer.completions(), vec!["Berlin".to_string(), "Lisbon".to_string()]);
    }
}
