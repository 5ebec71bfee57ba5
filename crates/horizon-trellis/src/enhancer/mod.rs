//! Post-construction decoration of widgets.
//!
//! The [`ComponentEnhancer`] retrofits accessibility metadata, visual
//! effects, validation, shortcuts and input behavior onto any widget that
//! already exists, without the widget knowing about it. Everything it
//! creates on a widget's behalf (graphics effects, style layers, shortcuts,
//! debounce timers, completers, input masks, event filters, signal
//! connections and the accessibility registration) is recorded as an
//! auxiliary of that widget, so
//! [`remove_enhancements`](ComponentEnhancer::remove_enhancements) can take
//! it all back off again.
//!
//! Auxiliaries are filed under the part of the bundle that created them.
//! Applying that part again, for example calling
//! [`add_shortcut`](ComponentEnhancer::add_shortcut) twice, detaches the
//! earlier auxiliaries first.
//!
//! Styling goes through named style layers, never by editing the user's style
//! sheet. Re-validating a widget replaces its validation layer instead of
//! appending another rule.
//!
//! ```ignore
//! use horizon_trellis::enhancer::{enhance, ComponentEnhancer};
//!
//! enhance()
//!     .accessible_name("Email address")
//!     .required(true)
//!     .text_validator(|text| text.contains('@'))
//!     .validation_error("Enter an email address")
//!     .apply_to(&email);
//!
//! ComponentEnhancer::global().remove_enhancements(&email);
//! ```

mod config;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use horizon_trellis_core::widget::{
    self, CaseSensitivity, Completer, EventFilterId, KeySequence, MatchMode, Shortcut,
    ShortcutManager, Validator, Widget, WidgetRef,
};
use horizon_trellis_core::{Color, ConnectionId, Key, ObjectId, Signal, SingleShotTimer, WidgetEvent};
use parking_lot::{Mutex, RwLock};

pub use config::{
    EnhancementConfig, EnhancementConfigBuilder, FocusCallback, HoverCallback, ValidityCallback,
    WidgetPredicate, enhance,
};

use crate::accessibility::{AccessibilityManager, accessibility_for};
use crate::element::{connect_activation, drop_shadow};
use crate::error::{ErrorContext, ErrorManager, UiError};
use crate::logging::targets;
use crate::memory::WidgetHandle;

/// Border color of input that failed validation.
pub const INVALID_COLOR: &str = "#e74c3c";
/// Border color of input that passed validation.
pub const VALID_COLOR: &str = "#27ae60";
/// Delay between the last edit and change-triggered validation.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_FOCUS_COLOR: Color = Color::from_rgb8(0x34, 0x98, 0xdb);
pub const DEFAULT_SHADOW_COLOR: Color = Color::from_rgba8(0, 0, 0, 80);
/// Background painted while the pointer is over a widget with a hover effect.
pub const HOVER_BACKGROUND: &str = "rgba(52, 152, 219, 0.1)";

pub const VALIDATION_LAYER: &str = "enhancer.validation";
pub const BORDER_LAYER: &str = "enhancer.border";
pub const HOVER_LAYER: &str = "enhancer.hover";
pub const FOCUS_LAYER: &str = "enhancer.focus";

const ENHANCER_LAYERS: [&str; 4] = [VALIDATION_LAYER, BORDER_LAYER, HOVER_LAYER, FOCUS_LAYER];

// =============================================================================
// Auxiliaries
// =============================================================================

/// The part of a bundle a group of auxiliaries belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Accessibility,
    Shadow,
    Border,
    HoverEffect,
    FocusEffect,
    Validation,
    Shortcut,
    Completer,
    InputMask,
    InputValidator,
    SelectAll,
    ClearOnEscape,
    Callbacks,
    Watch,
}

/// Something the enhancer attached to a widget and must detach again.
enum Auxiliary {
    Accessibility(Option<Arc<AccessibilityManager>>),
    Effect,
    StyleLayer(&'static str),
    Shortcut(Arc<Shortcut>),
    Timer(Arc<SingleShotTimer>),
    Validation(Arc<FieldValidation>),
    Completer(Arc<Completer>),
    InputMask,
    InputValidator,
    Filter(EventFilterId),
    TextChanged(ConnectionId),
    Toggled(ConnectionId),
    Focus(ConnectionId),
    Hover(ConnectionId),
    Destroyed(ConnectionId),
}

impl Auxiliary {
    fn detach(self, widget: &dyn Widget) {
        let base = widget.widget_base();
        match self {
            Auxiliary::Accessibility(manager) => {
                let manager = manager.as_deref().unwrap_or_else(|| AccessibilityManager::global());
                manager.unregister(widget.object_id());
            }
            Auxiliary::Effect => base.set_graphics_effect(None),
            Auxiliary::StyleLayer(layer) => {
                base.clear_style_layer(layer);
            }
            Auxiliary::Shortcut(shortcut) => {
                shortcut.set_enabled(false);
                ShortcutManager::with_current(|manager| manager.unregister(&shortcut));
            }
            Auxiliary::Timer(timer) => timer.stop(),
            Auxiliary::Validation(_) => {}
            Auxiliary::Completer(_) => {
                if let Some(input) = widget.as_text_input() {
                    input.set_completer(None);
                }
            }
            Auxiliary::InputMask => {
                if let Some(input) = widget.as_text_input() {
                    input.set_input_mask("");
                }
            }
            Auxiliary::InputValidator => {
                if let Some(input) = widget.as_text_input() {
                    input.set_validator(None);
                }
            }
            Auxiliary::Filter(id) => {
                base.remove_event_filter(id);
            }
            Auxiliary::TextChanged(id) => {
                if let Some(input) = widget.as_text_input() {
                    input.text_changed().disconnect(id);
                }
            }
            Auxiliary::Toggled(id) => {
                if let Some(button) = widget.as_button() {
                    button.toggled.disconnect(id);
                }
            }
            Auxiliary::Focus(id) => {
                base.focus_changed.disconnect(id);
            }
            Auxiliary::Hover(id) => {
                base.hover_changed.disconnect(id);
            }
            Auxiliary::Destroyed(id) => {
                base.destroyed().disconnect(id);
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Auxiliary::Accessibility(_) => "accessibility",
            Auxiliary::Effect => "effect",
            Auxiliary::StyleLayer(_) => "style-layer",
            Auxiliary::Shortcut(_) => "shortcut",
            Auxiliary::Timer(_) => "timer",
            Auxiliary::Validation(_) => "validation",
            Auxiliary::Completer(_) => "completer",
            Auxiliary::InputMask => "input-mask",
            Auxiliary::InputValidator => "input-validator",
            Auxiliary::Filter(_) => "event-filter",
            Auxiliary::TextChanged(_) | Auxiliary::Toggled(_) => "change-connection",
            Auxiliary::Focus(_) => "focus-connection",
            Auxiliary::Hover(_) => "hover-connection",
            Auxiliary::Destroyed(_) => "destroyed-connection",
        }
    }
}

impl fmt::Debug for Auxiliary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

// =============================================================================
// Validation
// =============================================================================

/// The live validation state of one enhanced widget.
struct FieldValidation {
    widget: Weak<dyn Widget>,
    predicate: Option<WidgetPredicate>,
    required: bool,
    message: String,
    callback: Option<ValidityCallback>,
    last: Mutex<Option<bool>>,
    saved_tooltip: Mutex<Option<String>>,
    state: Weak<EnhancerState>,
}

impl FieldValidation {
    fn check(&self, widget: &dyn Widget) -> bool {
        if self.required && !has_value(widget) {
            return false;
        }
        self.predicate.as_ref().is_none_or(|predicate| predicate(widget))
    }

    /// Validate now and update the border and tooltip. `None` once the
    /// widget is gone.
    fn run(&self) -> Option<bool> {
        let widget = self.widget.upgrade()?;
        let valid = self.check(widget.as_ref());
        let base = widget.widget_base();

        {
            let mut saved = self.saved_tooltip.lock();
            if valid {
                base.set_style_layer(VALIDATION_LAYER, [("border", format!("2px solid {VALID_COLOR}"))]);
                if let Some(tooltip) = saved.take() {
                    base.set_tool_tip(tooltip);
                }
            } else {
                base.set_style_layer(VALIDATION_LAYER, [("border", format!("2px solid {INVALID_COLOR}"))]);
                if saved.is_none() {
                    *saved = Some(base.tool_tip());
                }
                base.set_tool_tip(self.message.clone());
            }
        }

        let changed = self.last.lock().replace(valid) != Some(valid);
        tracing::trace!(target: targets::ENHANCER, id = ?widget.object_id(), valid, changed, "widget validated");
        if changed {
            if let Some(callback) = &self.callback {
                callback(valid, if valid { "" } else { &self.message });
            }
            if let Some(state) = self.state.upgrade() {
                state.validation_changed.emit((widget.object_id(), valid));
            }
        }
        Some(valid)
    }
}

/// Whether `widget` holds something a required field accepts.
fn has_value(widget: &dyn Widget) -> bool {
    if let Some(input) = widget.as_text_input() {
        return !input.text().trim().is_empty();
    }
    if let Some(button) = widget.as_button()
        && button.is_checkable()
    {
        return button.is_checked();
    }
    true
}

// =============================================================================
// ComponentEnhancer
// =============================================================================

struct EnhancerState {
    configs: RwLock<HashMap<ObjectId, EnhancementConfig>>,
    auxiliaries: Mutex<HashMap<ObjectId, Vec<(Slot, Auxiliary)>>>,
    validation_changed: Signal<(ObjectId, bool)>,
    enhanced: Signal<ObjectId>,
}

impl EnhancerState {
    /// Drop everything recorded for a widget that no longer exists.
    fn forget(&self, id: ObjectId) {
        self.configs.write().remove(&id);
        let dropped = self.auxiliaries.lock().remove(&id);
        if let Some(dropped) = dropped {
            tracing::trace!(target: targets::ENHANCER, ?id, auxiliaries = dropped.len(), "destroyed widget forgotten");
        }
    }
}

/// Applies [`EnhancementConfig`] bundles to existing widgets.
///
/// One enhancer is shared by the process through [`global`](Self::global);
/// tests and embedders can create isolated ones with [`new`](Self::new).
/// All widget work must happen on the GUI thread, since timers and shortcuts
/// belong to the thread that creates them.
pub struct ComponentEnhancer {
    state: Arc<EnhancerState>,
    accessibility: Option<Arc<AccessibilityManager>>,
}

static GLOBAL: OnceLock<ComponentEnhancer> = OnceLock::new();

impl ComponentEnhancer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(EnhancerState {
                configs: RwLock::new(HashMap::new()),
                auxiliaries: Mutex::new(HashMap::new()),
                validation_changed: Signal::new(),
                enhanced: Signal::new(),
            }),
            accessibility: None,
        }
    }

    /// An enhancer that registers accessibility metadata with `manager`.
    pub fn with_accessibility_manager(manager: Arc<AccessibilityManager>) -> Self {
        Self {
            accessibility: Some(manager),
            ..Self::new()
        }
    }

    pub fn global() -> &'static ComponentEnhancer {
        GLOBAL.get_or_init(ComponentEnhancer::new)
    }

    /// Emitted with the widget and its new validity whenever it changes.
    pub fn validation_changed(&self) -> &Signal<(ObjectId, bool)> {
        &self.state.validation_changed
    }

    /// Emitted after a full bundle was applied.
    pub fn enhanced(&self) -> &Signal<ObjectId> {
        &self.state.enhanced
    }

    // =========================================================================
    // Full application
    // =========================================================================

    /// Apply the whole bundle to `widget`.
    ///
    /// Re-enhancing a widget tears down the auxiliaries of the previous
    /// bundle first, then rebuilds them from `config`.
    #[tracing::instrument(skip_all, target = "horizon_trellis::enhancer", level = "trace")]
    pub fn enhance(&self, widget: &impl WidgetHandle, config: EnhancementConfig) {
        let widget = widget.widget_ref();
        let id = widget.object_id();
        if self.is_enhanced(id) {
            self.detach_all(widget.as_ref());
        }

        self.enhance_accessibility(&widget, &config);
        self.enhance_visuals(&widget, &config);
        self.enhance_validation(&widget, &config);
        self.enhance_keyboard(&widget, &config);
        self.enhance_behavior(&widget, &config);
        self.connect_callbacks(&widget, &config);
        self.watch_destruction(&widget);

        tracing::debug!(
            target: targets::ENHANCER,
            ?id,
            class = widget.class_name(),
            auxiliaries = self.auxiliary_count(id),
            "widget enhanced"
        );
        self.state.configs.write().insert(id, config);
        self.state.enhanced.emit(id);
    }

    /// Apply `config` to `container` and every widget below it.
    ///
    /// Returns how many widgets were enhanced.
    pub fn enhance_container(&self, container: &impl WidgetHandle, config: &EnhancementConfig) -> usize {
        let container = container.widget_ref();
        let descendants = widget::descendant_widgets(container.as_ref());
        self.enhance(&container, config.clone());
        for child in &descendants {
            self.enhance(child, config.clone());
        }
        descendants.len() + 1
    }

    /// Enhance the descendants of `form` by object name.
    ///
    /// Names with no matching descendant are reported and skipped. Returns
    /// how many widgets were enhanced.
    pub fn enhance_form<I, S>(&self, form: &impl WidgetHandle, fields: I) -> usize
    where
        I: IntoIterator<Item = (S, EnhancementConfig)>,
        S: AsRef<str>,
    {
        let form = form.widget_ref();
        let mut enhanced = 0;
        for (name, config) in fields {
            let name = name.as_ref();
            match widget::find_child_widget(form.as_ref(), name) {
                Some(field) => {
                    self.enhance(&field, config);
                    enhanced += 1;
                }
                None => {
                    let context = ErrorContext::caller()
                        .with_component("ComponentEnhancer")
                        .with_operation("enhance_form");
                    ErrorManager::global().warning(format!("form field '{name}' not found"), context);
                }
            }
        }
        enhanced
    }

    // =========================================================================
    // Granular application
    // =========================================================================

    /// Accessible name, description, help text, role, tab index and tooltip.
    pub fn enhance_accessibility(&self, widget: &impl WidgetHandle, config: &EnhancementConfig) {
        if !config.has_accessibility() {
            return;
        }
        let widget = widget.widget_ref();
        self.release(widget.as_ref(), Slot::Accessibility);
        let mut builder = accessibility_for(&widget)
            .name(config.accessible_name.clone())
            .description(config.accessible_description.clone())
            .help(config.help_text.clone())
            .role(config.role.unwrap_or_default())
            .tab_index(config.tab_index)
            .required(config.required);
        if let Some(manager) = &self.accessibility {
            builder = builder.manager(manager.clone());
        }
        builder.apply();
        self.record(
            widget.object_id(),
            Slot::Accessibility,
            vec![Auxiliary::Accessibility(self.accessibility.clone())],
        );

        if !config.tooltip.is_empty() {
            widget.widget_base().set_tool_tip(config.tooltip.clone());
        }
    }

    /// Drop shadow, border, hover and focus effects.
    pub fn enhance_visuals(&self, widget: &impl WidgetHandle, config: &EnhancementConfig) {
        let widget = widget.widget_ref();
        let id = widget.object_id();
        let base = widget.widget_base();

        if config.drop_shadow {
            self.release(widget.as_ref(), Slot::Shadow);
            base.set_graphics_effect(Some(drop_shadow(config.shadow_color)));
            self.record(id, Slot::Shadow, vec![Auxiliary::Effect]);
        }

        let mut border: Vec<(&str, String)> = Vec::new();
        if let Some(radius) = config.border_radius {
            border.push(("border-radius", format!("{radius}px")));
        }
        if let Some(color) = config.border_color {
            border.push(("border", format!("1px solid {}", color.to_css())));
        }
        if !border.is_empty() {
            self.release(widget.as_ref(), Slot::Border);
            base.set_style_layer(BORDER_LAYER, border);
            self.record(id, Slot::Border, vec![Auxiliary::StyleLayer(BORDER_LAYER)]);
        }

        if config.hover_effect {
            self.release(widget.as_ref(), Slot::HoverEffect);
            self.record(id, Slot::HoverEffect, hover_effect(&widget).into());
        }
        if config.focus_effect
            && let Some(color) = config.focus_color
        {
            self.release(widget.as_ref(), Slot::FocusEffect);
            self.record(id, Slot::FocusEffect, focus_effect(&widget, color).into());
        }
    }

    /// Required flag and predicate, re-run on change (debounced) and on
    /// focus loss.
    pub fn enhance_validation(&self, widget: &impl WidgetHandle, config: &EnhancementConfig) {
        if !config.has_validation() {
            return;
        }
        let widget = widget.widget_ref();
        self.release(widget.as_ref(), Slot::Validation);
        let validation = Arc::new(FieldValidation {
            widget: Arc::downgrade(&widget),
            predicate: config.validator.clone(),
            required: config.required,
            message: config.error_message().to_string(),
            callback: config.on_validation_changed.clone(),
            last: Mutex::new(None),
            saved_tooltip: Mutex::new(None),
            state: Arc::downgrade(&self.state),
        });
        let base = widget.widget_base();
        let mut attached = vec![Auxiliary::StyleLayer(VALIDATION_LAYER)];
        let mut timer: Option<Arc<SingleShotTimer>> = None;

        if config.validate_on_change {
            if let Some(input) = widget.as_text_input() {
                if config.debounce.is_zero() {
                    let run = validation.clone();
                    let id = input.text_changed().connect(move |_| {
                        run.run();
                    });
                    attached.push(Auxiliary::TextChanged(id));
                } else {
                    let debounce = Arc::new(SingleShotTimer::new(config.debounce));
                    let run = validation.clone();
                    debounce.timeout().connect(move |_| {
                        run.run();
                    });
                    let restart = debounce.clone();
                    let id = input.text_changed().connect(move |_| restart.start());
                    attached.push(Auxiliary::TextChanged(id));
                    attached.push(Auxiliary::Timer(debounce.clone()));
                    timer = Some(debounce);
                }
            } else if let Some(button) = widget.as_button() {
                let run = validation.clone();
                let id = button.toggled.connect(move |_| {
                    run.run();
                });
                attached.push(Auxiliary::Toggled(id));
            }
        }

        if config.validate_on_focus_lost {
            let run = validation.clone();
            let id = base.focus_changed.connect(move |&focused| {
                if focused {
                    return;
                }
                if let Some(timer) = &timer {
                    timer.stop();
                }
                run.run();
            });
            attached.push(Auxiliary::Focus(id));
        }

        tracing::trace!(
            target: targets::ENHANCER,
            id = ?widget.object_id(),
            required = config.required,
            debounce_ms = config.debounce.as_millis() as u64,
            "validation attached"
        );
        attached.push(Auxiliary::Validation(validation));
        self.record(widget.object_id(), Slot::Validation, attached);
    }

    /// Bind the configured shortcut to the widget.
    ///
    /// Buttons are clicked when it fires; other widgets take focus.
    pub fn enhance_keyboard(&self, widget: &impl WidgetHandle, config: &EnhancementConfig) {
        let Some(sequence) = config.shortcut.clone() else {
            return;
        };
        let widget = widget.widget_ref();
        self.release(widget.as_ref(), Slot::Shortcut);
        match Shortcut::for_widget(sequence, widget.object_id()) {
            Ok(shortcut) => {
                connect_activation(&shortcut, &widget);
                tracing::trace!(target: targets::ENHANCER, id = ?widget.object_id(), sequence = %shortcut.key_sequence(), "shortcut attached");
                self.record(widget.object_id(), Slot::Shortcut, vec![Auxiliary::Shortcut(shortcut)]);
            }
            Err(err) => {
                let context = ErrorContext::caller()
                    .with_component("ComponentEnhancer")
                    .with_operation("enhance_keyboard");
                ErrorManager::global().report_error(UiError::from(err), context);
            }
        }
    }

    /// Completion, input mask, input validator, select-all-on-focus and
    /// clear-on-escape. Only text inputs take these.
    pub fn enhance_behavior(&self, widget: &impl WidgetHandle, config: &EnhancementConfig) {
        if !config.has_behavior() {
            return;
        }
        let widget = widget.widget_ref();
        let Some(input) = widget.as_text_input() else {
            tracing::debug!(
                target: targets::ENHANCER,
                id = ?widget.object_id(),
                class = widget.class_name(),
                "input behavior needs a text input"
            );
            return;
        };
        let id = widget.object_id();

        if !config.completions.is_empty() {
            self.release(widget.as_ref(), Slot::Completer);
            let completer = Arc::new(Completer::with_strings(config.completions.iter().cloned()));
            completer.set_case_sensitivity(CaseSensitivity::CaseInsensitive);
            completer.set_match_mode(MatchMode::Contains);
            if input.set_completer(Some(completer.clone())) {
                self.record(id, Slot::Completer, vec![Auxiliary::Completer(completer)]);
            }
        }
        if let Some(mask) = &config.input_mask {
            self.release(widget.as_ref(), Slot::InputMask);
            if input.set_input_mask(mask) {
                self.record(id, Slot::InputMask, vec![Auxiliary::InputMask]);
            } else {
                tracing::debug!(target: targets::ENHANCER, class = widget.class_name(), mask = %mask, "input mask not supported");
            }
        }
        if let Some(validator) = &config.input_validator {
            self.release(widget.as_ref(), Slot::InputValidator);
            if input.set_validator(Some(validator.clone())) {
                self.record(id, Slot::InputValidator, vec![Auxiliary::InputValidator]);
            }
        }
        if config.select_all_on_focus {
            self.release(widget.as_ref(), Slot::SelectAll);
            self.record(id, Slot::SelectAll, vec![select_all_on_focus(&widget)]);
        }
        if config.clear_on_escape {
            self.release(widget.as_ref(), Slot::ClearOnEscape);
            self.record(id, Slot::ClearOnEscape, vec![clear_on_escape(&widget)]);
        }
    }

    fn connect_callbacks(&self, widget: &WidgetRef, config: &EnhancementConfig) {
        self.release(widget.as_ref(), Slot::Callbacks);
        let base = widget.widget_base();
        let mut attached = Vec::new();
        if let Some(callback) = config.on_focus_changed.clone() {
            let id = base.focus_changed.connect(move |&focused| callback(focused));
            attached.push(Auxiliary::Focus(id));
        }
        if config.on_hover_enter.is_some() || config.on_hover_leave.is_some() {
            let enter = config.on_hover_enter.clone();
            let leave = config.on_hover_leave.clone();
            let id = base.hover_changed.connect(move |&hovered| {
                let callback = if hovered { &enter } else { &leave };
                if let Some(callback) = callback {
                    callback();
                }
            });
            attached.push(Auxiliary::Hover(id));
        }
        self.record(widget.object_id(), Slot::Callbacks, attached);
    }

    fn watch_destruction(&self, widget: &WidgetRef) {
        self.release(widget.as_ref(), Slot::Watch);
        let state = Arc::downgrade(&self.state);
        let id = widget.widget_base().destroyed().connect(move |&id| {
            if let Some(state) = state.upgrade() {
                state.forget(id);
            }
        });
        self.record(widget.object_id(), Slot::Watch, vec![Auxiliary::Destroyed(id)]);
    }

    // =========================================================================
    // Convenience helpers
    // =========================================================================

    pub fn add_tooltip(&self, widget: &impl WidgetHandle, tooltip: impl Into<String>) {
        let config = EnhancementConfig {
            tooltip: tooltip.into(),
            ..EnhancementConfig::default()
        };
        self.enhance_accessibility(widget, &config);
    }

    pub fn add_drop_shadow(&self, widget: &impl WidgetHandle, color: Color) {
        self.enhance_visuals(widget, &visuals_only(|config| {
            config.drop_shadow = true;
            config.shadow_color = color;
        }));
    }

    pub fn add_hover_effect(&self, widget: &impl WidgetHandle) {
        self.enhance_visuals(widget, &visuals_only(|config| config.hover_effect = true));
    }

    pub fn add_focus_effect(&self, widget: &impl WidgetHandle, color: Color) {
        self.enhance_visuals(widget, &visuals_only(|config| {
            config.focus_effect = true;
            config.focus_color = Some(color);
        }));
    }

    pub fn add_validation(
        &self,
        widget: &impl WidgetHandle,
        predicate: impl Fn(&dyn Widget) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) {
        let config = enhance().validator(predicate).validation_error(message).build();
        self.enhance_validation(widget, &config);
    }

    /// Parse `sequence` and bind it to the widget.
    pub fn add_shortcut(&self, widget: &impl WidgetHandle, sequence: &str) -> crate::Result<()> {
        let sequence: KeySequence = sequence
            .parse()
            .map_err(|err| UiError::Configuration(format!("invalid shortcut '{sequence}': {err}")))?;
        let config = enhance().key_sequence(sequence).build();
        self.enhance_keyboard(widget, &config);
        Ok(())
    }

    pub fn add_autocomplete<I, S>(&self, widget: &impl WidgetHandle, suggestions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enhance_behavior(widget, &enhance().auto_complete(suggestions).build());
    }

    pub fn add_input_mask(&self, widget: &impl WidgetHandle, mask: &str) {
        self.enhance_behavior(widget, &enhance().input_mask(mask).build());
    }

    /// Restrict typing through a numeric or pattern validator.
    pub fn add_input_validator(&self, widget: &impl WidgetHandle, validator: impl Validator + 'static) {
        self.enhance_behavior(widget, &enhance().input_validator(validator).build());
    }

    pub fn add_select_all_on_focus(&self, widget: &impl WidgetHandle) {
        self.enhance_behavior(widget, &enhance().select_all_on_focus(true).build());
    }

    pub fn add_clear_on_escape(&self, widget: &impl WidgetHandle) {
        self.enhance_behavior(widget, &enhance().clear_on_escape(true).build());
    }

    // =========================================================================
    // Teardown and queries
    // =========================================================================

    /// Take every enhancement back off `widget`.
    ///
    /// Graphics effects, style layers, shortcuts, timers, completers, input
    /// masks, filters and connections are detached, the accessibility record
    /// the enhancer registered is dropped, the stored config is forgotten and
    /// the tooltip is cleared. Other widget state is left alone. Returns
    /// whether anything was enhanced.
    pub fn remove_enhancements(&self, widget: &impl WidgetHandle) -> bool {
        let widget = widget.widget_ref();
        let id = widget.object_id();
        let had_config = self.state.configs.write().remove(&id).is_some();
        let detached = self.detach_all(widget.as_ref());
        if !had_config && detached == 0 {
            return false;
        }

        let base = widget.widget_base();
        base.set_graphics_effect(None);
        base.set_tool_tip("");
        for layer in ENHANCER_LAYERS {
            base.clear_style_layer(layer);
        }
        tracing::debug!(target: targets::ENHANCER, ?id, detached, "enhancements removed");
        true
    }

    /// Validate `widget` immediately. `None` when it has no validation.
    pub fn validate(&self, widget: &impl WidgetHandle) -> Option<bool> {
        let id = widget.widget_ref().object_id();
        let validation = self.state.auxiliaries.lock().get(&id).and_then(|list| {
            list.iter().rev().find_map(|(_, aux)| match aux {
                Auxiliary::Validation(validation) => Some(validation.clone()),
                _ => None,
            })
        })?;
        validation.run()
    }

    /// The last full bundle applied to the widget.
    pub fn config(&self, id: ObjectId) -> Option<EnhancementConfig> {
        self.state.configs.read().get(&id).cloned()
    }

    pub fn is_enhanced(&self, id: ObjectId) -> bool {
        self.state.configs.read().contains_key(&id) || self.auxiliary_count(id) > 0
    }

    pub fn auxiliary_count(&self, id: ObjectId) -> usize {
        self.state.auxiliaries.lock().get(&id).map_or(0, Vec::len)
    }

    /// Number of widgets with a stored bundle.
    pub fn enhanced_count(&self) -> usize {
        self.state.configs.read().len()
    }

    fn record(&self, id: ObjectId, slot: Slot, attached: Vec<Auxiliary>) {
        if attached.is_empty() {
            return;
        }
        self.state
            .auxiliaries
            .lock()
            .entry(id)
            .or_default()
            .extend(attached.into_iter().map(|auxiliary| (slot, auxiliary)));
    }

    /// Detach the auxiliaries `widget` holds in `slot`.
    fn release(&self, widget: &dyn Widget, slot: Slot) {
        let released: Vec<(Slot, Auxiliary)> = {
            let mut auxiliaries = self.state.auxiliaries.lock();
            let Some(list) = auxiliaries.get_mut(&widget.object_id()) else {
                return;
            };
            let (released, kept) = std::mem::take(list)
                .into_iter()
                .partition(|(held, _)| *held == slot);
            *list = kept;
            released
        };
        for (_, auxiliary) in released {
            tracing::trace!(target: targets::ENHANCER, id = ?widget.object_id(), ?slot, kind = auxiliary.kind(), "auxiliary replaced");
            auxiliary.detach(widget);
        }
    }

    /// Detach and drop every auxiliary of `widget`.
    fn detach_all(&self, widget: &dyn Widget) -> usize {
        let attached = self
            .state
            .auxiliaries
            .lock()
            .remove(&widget.object_id())
            .unwrap_or_default();
        let count = attached.len();
        for (_, auxiliary) in attached {
            tracing::trace!(target: targets::ENHANCER, id = ?widget.object_id(), kind = auxiliary.kind(), "auxiliary detached");
            auxiliary.detach(widget);
        }
        count
    }
}

impl Default for ComponentEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentEnhancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEnhancer")
            .field("enhanced", &self.enhanced_count())
            .field("auxiliaries", &self.state.auxiliaries.lock().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ComponentEnhancer: Send, Sync);

fn visuals_only(edit: impl FnOnce(&mut EnhancementConfig)) -> EnhancementConfig {
    let mut config = EnhancementConfig {
        hover_effect: false,
        focus_effect: false,
        ..EnhancementConfig::default()
    };
    edit(&mut config);
    config
}

fn hover_effect(widget: &WidgetRef) -> [Auxiliary; 2] {
    let target: Weak<dyn Widget> = Arc::downgrade(widget);
    let id = widget.widget_base().hover_changed.connect(move |&hovered| {
        let Some(widget) = target.upgrade() else {
            return;
        };
        let base = widget.widget_base();
        if hovered {
            base.set_style_layer(HOVER_LAYER, [("background-color", HOVER_BACKGROUND)]);
        } else {
            base.clear_style_layer(HOVER_LAYER);
        }
    });
    [Auxiliary::Hover(id), Auxiliary::StyleLayer(HOVER_LAYER)]
}

fn focus_effect(widget: &WidgetRef, color: Color) -> [Auxiliary; 2] {
    let target: Weak<dyn Widget> = Arc::downgrade(widget);
    let border = format!("2px solid {}", color.to_css());
    let id = widget.widget_base().focus_changed.connect(move |&focused| {
        let Some(widget) = target.upgrade() else {
            return;
        };
        let base = widget.widget_base();
        if focused {
            base.set_style_layer(FOCUS_LAYER, [("border", border.clone())]);
        } else {
            base.clear_style_layer(FOCUS_LAYER);
        }
    });
    [Auxiliary::Focus(id), Auxiliary::StyleLayer(FOCUS_LAYER)]
}

fn select_all_on_focus(widget: &WidgetRef) -> Auxiliary {
    let target: Weak<dyn Widget> = Arc::downgrade(widget);
    let id = widget.widget_base().focus_changed.connect(move |&focused| {
        if !focused {
            return;
        }
        if let Some(widget) = target.upgrade()
            && let Some(input) = widget.as_text_input()
        {
            input.select_all();
        }
    });
    Auxiliary::Focus(id)
}

fn clear_on_escape(widget: &WidgetRef) -> Auxiliary {
    let target: Weak<dyn Widget> = Arc::downgrade(widget);
    let id = widget.widget_base().install_event_filter(move |_, event| {
        let WidgetEvent::KeyPress { key: Key::Escape, .. } = event else {
            return false;
        };
        let Some(widget) = target.upgrade() else {
            return false;
        };
        let Some(input) = widget.as_text_input() else {
            return false;
        };
        if input.completer().is_some_and(|c| c.is_popup_visible()) {
            return false;
        }
        input.clear();
        true
    });
    Auxiliary::Filter(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::widget::IntValidator;
    use horizon_trellis_core::widget::widgets::{CheckBox, Frame, LineEdit, PushButton};
    use horizon_trellis_core::widget::{GraphicsEffect, ShortcutResult};
    use horizon_trellis_core::{EventLoop, KeyboardModifiers, init_global_registry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> ComponentEnhancer {
        init_global_registry();
        ComponentEnhancer::with_accessibility_manager(Arc::new(AccessibilityManager::new()))
    }

    fn key(widget: &dyn Widget, key: Key) -> bool {
        widget.send_event(&WidgetEvent::KeyPress {
            key,
            modifiers: KeyboardModifiers::NONE,
            text: String::new(),
        })
    }

    #[test]
    fn test_accessibility_and_tooltip() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let config = enhance()
            .accessible_name("Email")
            .help_text("Where we reach you")
            .tooltip("Your email")
            .build();
        enhancer.enhance(&edit, config);

        let base = edit.widget_base();
        assert_eq!(base.accessible_name(), "Email");
        assert_eq!(base.tool_tip(), "Your email");
        assert!(enhancer.is_enhanced(edit.object_id()));
        assert_eq!(
            enhancer.config(edit.object_id()).map(|c| c.accessible_name),
            Some("Email".to_string())
        );
    }

    #[test]
    fn test_visual_effects_follow_hover_and_focus() {
        let enhancer = setup();
        let button = PushButton::with_text("Save").unwrap();
        let config = enhance()
            .shadow_color(Color::BLACK)
            .focus_color(DEFAULT_FOCUS_COLOR)
            .border_radius(6)
            .build();
        enhancer.enhance(&button, config);

        let base = button.widget_base();
        assert!(matches!(base.graphics_effect(), Some(GraphicsEffect::DropShadow { .. })));
        assert!(base.style_sheet().contains("border-radius: 6px"));

        let widget: &dyn Widget = button.as_ref();
        widget.send_event(&WidgetEvent::Enter);
        assert!(base.style_layer(HOVER_LAYER).is_some());
        widget.send_event(&WidgetEvent::Leave);
        assert!(base.style_layer(HOVER_LAYER).is_none());

        widget.send_event(&WidgetEvent::FocusIn);
        assert!(base.style_sheet().contains("#3498DB"));
        widget.send_event(&WidgetEvent::FocusOut);
        assert!(base.style_layer(FOCUS_LAYER).is_none());
    }

    #[test]
    fn test_debounced_validation() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let config = enhance()
            .text_validator(|text| text.len() >= 3)
            .validation_error("Too short")
            .debounce_delay(Duration::from_millis(20))
            .on_validation_changed(move |valid, message| sink.lock().push((valid, message.to_string())))
            .build();
        enhancer.enhance(&edit, config);

        edit.set_text("a");
        edit.set_text("ab");
        assert!(changes.lock().is_empty());
        EventLoop::process_events_for(Duration::from_millis(60));
        assert_eq!(*changes.lock(), vec![(false, "Too short".to_string())]);

        let base = edit.widget_base();
        assert!(base.style_sheet().contains(INVALID_COLOR));
        assert_eq!(base.tool_tip(), "Too short");
        assert_eq!(base.style_layer_names().iter().filter(|n| *n == VALIDATION_LAYER).count(), 1);

        edit.set_text("abc");
        EventLoop::process_events_for(Duration::from_millis(60));
        assert_eq!(changes.lock().last(), Some(&(true, String::new())));
        assert!(base.style_sheet().contains(VALID_COLOR));
        assert!(!base.style_sheet().contains(INVALID_COLOR));
        assert_eq!(base.tool_tip(), "");
    }

    #[test]
    fn test_focus_loss_validates_required_field() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        enhancer.enhance(&edit, enhance().required(true).build());
        let widget: &dyn Widget = edit.as_ref();
        widget.send_event(&WidgetEvent::FocusIn);
        widget.send_event(&WidgetEvent::FocusOut);
        assert_eq!(edit.widget_base().tool_tip(), "This field is required");
        edit.set_text("filled");
        assert_eq!(enhancer.validate(&edit), Some(true));
    }

    #[test]
    fn test_required_check_box_validates_on_toggle() {
        let enhancer = setup();
        let check = CheckBox::new().unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        enhancer.validation_changed().connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        enhancer.enhance(&check, enhance().required(true).build());
        assert_eq!(enhancer.validate(&check), Some(false));
        check.set_checked(true);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shortcut_activation_and_teardown() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        enhancer.enhance(&edit, enhance().shortcut("Ctrl+Shift+Y").required(true).build());

        let result = ShortcutManager::dispatch_key(Key::Y, KeyboardModifiers::CTRL_SHIFT);
        assert!(matches!(result, ShortcutResult::Activated(_)));
        assert!(edit.widget_base().has_focus());

        assert!(enhancer.remove_enhancements(&edit));
        assert!(enhancer.config(edit.object_id()).is_none());
        assert_eq!(enhancer.auxiliary_count(edit.object_id()), 0);
        let result = ShortcutManager::dispatch_key(Key::Y, KeyboardModifiers::CTRL_SHIFT);
        assert!(matches!(result, ShortcutResult::NoMatch));
        assert_eq!(edit.widget_base().tool_tip(), "");
        assert!(!enhancer.remove_enhancements(&edit));
    }

    #[test]
    fn test_reenhancing_replaces_auxiliaries() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let config = enhance().required(true).auto_complete(["one", "two"]).build();
        enhancer.enhance(&edit, config.clone());
        let first = enhancer.auxiliary_count(edit.object_id());
        let connections = edit.text_changed.connection_count();

        enhancer.enhance(&edit, config);
        assert_eq!(enhancer.auxiliary_count(edit.object_id()), first);
        assert_eq!(edit.text_changed.connection_count(), connections);
        assert_eq!(enhancer.enhanced_count(), 1);
    }

    #[test]
    fn test_behavior_on_text_input() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let config = enhance()
            .auto_complete(["Apple", "Pineapple"])
            .input_validator(IntValidator::new(0, 99))
            .select_all_on_focus(true)
            .clear_on_escape(true)
            .build();
        enhancer.enhance(&edit, config);
        assert!(edit.completer().is_some());

        edit.set_text("42");
        let widget: &dyn Widget = edit.as_ref();
        widget.send_event(&WidgetEvent::FocusIn);
        assert_eq!(edit.selected_text(), "42");
        assert!(key(widget, Key::Escape));
        assert_eq!(edit.text(), "");

        enhancer.remove_enhancements(&edit);
        assert!(edit.completer().is_none());
        edit.set_text("7");
        assert!(!key(widget, Key::Escape));
        assert_eq!(edit.text(), "7");
    }

    #[test]
    fn test_form_by_object_name() {
        let enhancer = setup();
        let form = Frame::new().unwrap();
        let name = LineEdit::new().unwrap();
        name.widget_base().set_name("name");
        let email = LineEdit::new().unwrap();
        email.widget_base().set_name("email");
        let form_ref: WidgetRef = form.clone();
        widget::set_parent(&(name.clone() as WidgetRef), Some(&form_ref)).unwrap();
        widget::set_parent(&(email.clone() as WidgetRef), Some(&form_ref)).unwrap();

        let fields = HashMap::from([
            ("name".to_string(), enhance().tooltip("Full name").build()),
            ("email".to_string(), enhance().tooltip("Email").build()),
            ("phone".to_string(), enhance().tooltip("Phone").build()),
        ]);
        assert_eq!(enhancer.enhance_form(&form, fields), 2);
        assert_eq!(name.widget_base().tool_tip(), "Full name");
        assert_eq!(email.widget_base().tool_tip(), "Email");

        assert_eq!(enhancer.enhance_container(&form, &enhance().drop_shadow(true).build()), 3);
        assert!(email.widget_base().graphics_effect().is_some());
    }

    #[test]
    fn test_destroyed_widget_is_forgotten() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let id = edit.object_id();
        enhancer.enhance(&edit, enhance().required(true).build());
        widget::destroy(&(edit.clone() as WidgetRef)).unwrap();
        assert!(!enhancer.is_enhanced(id));
    }

    fn held(enhancer: &ComponentEnhancer, id: ObjectId, slot: Slot) -> usize {
        enhancer
            .state
            .auxiliaries
            .lock()
            .get(&id)
            .map_or(0, |list| list.iter().filter(|(held, _)| *held == slot).count())
    }

    #[test]
    fn test_repeated_helpers_replace_their_auxiliaries() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        let id = edit.object_id();

        enhancer.add_shortcut(&edit, "Ctrl+Shift+J").unwrap();
        enhancer.add_shortcut(&edit, "Ctrl+Shift+J").unwrap();
        assert_eq!(held(&enhancer, id, Slot::Shortcut), 1);
        match ShortcutManager::dispatch_key(Key::J, KeyboardModifiers::CTRL_SHIFT) {
            ShortcutResult::Activated(fired) => assert_eq!(fired.len(), 1),
            _ => panic!("shortcut should fire"),
        }

        enhancer.add_shortcut(&edit, "Ctrl+Shift+K").unwrap();
        assert_eq!(held(&enhancer, id, Slot::Shortcut), 1);
        let result = ShortcutManager::dispatch_key(Key::J, KeyboardModifiers::CTRL_SHIFT);
        assert!(matches!(result, ShortcutResult::NoMatch));

        enhancer.add_input_mask(&edit, "999");
        enhancer.add_input_mask(&edit, ">AAA");
        assert_eq!(held(&enhancer, id, Slot::InputMask), 1);
        assert_eq!(edit.input_mask().as_deref(), Some(">AAA"));

        enhancer.add_drop_shadow(&edit, Color::BLACK);
        enhancer.add_drop_shadow(&edit, Color::WHITE);
        assert_eq!(held(&enhancer, id, Slot::Shadow), 1);
        assert!(matches!(
            edit.widget_base().graphics_effect(),
            Some(GraphicsEffect::DropShadow { color, .. }) if color == Color::WHITE
        ));

        enhancer.add_select_all_on_focus(&edit);
        let focus_connections = edit.widget_base().focus_changed.connection_count();
        enhancer.add_select_all_on_focus(&edit);
        assert_eq!(edit.widget_base().focus_changed.connection_count(), focus_connections);
    }

    #[test]
    fn test_removal_clears_mask_and_accessibility() {
        init_global_registry();
        let manager = Arc::new(AccessibilityManager::new());
        let enhancer = ComponentEnhancer::with_accessibility_manager(manager.clone());
        let edit = LineEdit::new().unwrap();
        let config = enhance().accessible_name("Zip").input_mask("99999").build();
        enhancer.enhance(&edit, config);
        assert!(manager.is_registered(edit.object_id()));
        assert_eq!(edit.input_mask().as_deref(), Some("99999"));

        assert!(enhancer.remove_enhancements(&edit));
        assert!(!manager.is_registered(edit.object_id()));
        assert!(edit.input_mask().is_none());
    }

    #[test]
    fn test_helpers() {
        let enhancer = setup();
        let edit = LineEdit::new().unwrap();
        enhancer.add_tooltip(&edit, "Hint");
        enhancer.add_drop_shadow(&edit, Color::BLACK);
        enhancer.add_validation(&edit, |w| w.as_text_input().is_some_and(|i| !i.text().is_empty()), "Empty");
        assert!(enhancer.add_shortcut(&edit, "Ctrl+").is_err());
        assert_eq!(edit.widget_base().tool_tip(), "Hint");
        assert_eq!(enhancer.validate(&edit), Some(false));
        assert_eq!(edit.widget_base().tool_tip(), "Empty");
        assert!(enhancer.remove_enhancements(&edit));
        assert!(edit.widget_base().graphics_effect().is_none());
    }
}
