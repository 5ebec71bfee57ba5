//! The enhancement bundle and its fluent builder.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use horizon_trellis_core::widget::{KeySequence, Validator, Widget};
use horizon_trellis_core::Color;

use super::{ComponentEnhancer, DEFAULT_DEBOUNCE, DEFAULT_SHADOW_COLOR};
use crate::accessibility::AccessibleRole;
use crate::logging::targets;
use crate::memory::WidgetHandle;

/// Decides whether a widget currently holds valid input.
pub type WidgetPredicate = Arc<dyn Fn(&dyn Widget) -> bool + Send + Sync>;
/// Receives the new validity and the error message (empty when valid).
pub type ValidityCallback = Arc<dyn Fn(bool, &str) + Send + Sync>;
pub type FocusCallback = Arc<dyn Fn(bool) + Send + Sync>;
pub type HoverCallback = Arc<dyn Fn() + Send + Sync>;

/// Everything the enhancer can retrofit onto a widget.
///
/// Empty strings and `None` mean "leave the widget alone". The defaults turn
/// on the hover and focus effects and both validation triggers, but nothing
/// else.
#[derive(Clone)]
pub struct EnhancementConfig {
    // Accessibility
    pub accessible_name: String,
    pub accessible_description: String,
    pub tooltip: String,
    pub help_text: String,
    pub role: Option<AccessibleRole>,
    /// Negative values leave the tab order untouched.
    pub tab_index: i32,

    // Visuals
    pub drop_shadow: bool,
    pub shadow_color: Color,
    pub hover_effect: bool,
    /// Needs `focus_color` to have any effect.
    pub focus_effect: bool,
    pub focus_color: Option<Color>,
    pub border_radius: Option<u32>,
    pub border_color: Option<Color>,

    // Validation
    pub required: bool,
    pub validator: Option<WidgetPredicate>,
    pub validation_error: String,
    pub validate_on_change: bool,
    pub validate_on_focus_lost: bool,

    // Keyboard
    pub shortcut: Option<KeySequence>,

    // Behavior
    pub completions: Vec<String>,
    pub input_mask: Option<String>,
    pub input_validator: Option<Arc<dyn Validator>>,
    pub select_all_on_focus: bool,
    pub clear_on_escape: bool,
    pub debounce: Duration,

    // Callbacks
    pub on_validation_changed: Option<ValidityCallback>,
    pub on_focus_changed: Option<FocusCallback>,
    pub on_hover_enter: Option<HoverCallback>,
    pub on_hover_leave: Option<HoverCallback>,
}

impl EnhancementConfig {
    pub fn builder() -> EnhancementConfigBuilder {
        EnhancementConfigBuilder::new()
    }

    pub fn has_accessibility(&self) -> bool {
        !self.accessible_name.is_empty()
            || !self.accessible_description.is_empty()
            || !self.tooltip.is_empty()
            || !self.help_text.is_empty()
            || self.role.is_some()
            || self.tab_index >= 0
    }

    pub fn has_validation(&self) -> bool {
        self.required || self.validator.is_some()
    }

    pub fn has_behavior(&self) -> bool {
        !self.completions.is_empty()
            || self.input_mask.is_some()
            || self.input_validator.is_some()
            || self.select_all_on_focus
            || self.clear_on_escape
    }

    /// The message shown when validation fails.
    pub fn error_message(&self) -> &str {
        if self.validation_error.is_empty() {
            if self.validator.is_none() && self.required {
                "This field is required"
            } else {
                "Invalid input"
            }
        } else {
            &self.validation_error
        }
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            accessible_name: String::new(),
            accessible_description: String::new(),
            tooltip: String::new(),
            help_text: String::new(),
            role: None,
            tab_index: -1,
            drop_shadow: false,
            shadow_color: DEFAULT_SHADOW_COLOR,
            hover_effect: true,
            focus_effect: true,
            focus_color: None,
            border_radius: None,
            border_color: None,
            required: false,
            validator: None,
            validation_error: String::new(),
            validate_on_change: true,
            validate_on_focus_lost: true,
            shortcut: None,
            completions: Vec::new(),
            input_mask: None,
            input_validator: None,
            select_all_on_focus: false,
            clear_on_escape: false,
            debounce: DEFAULT_DEBOUNCE,
            on_validation_changed: None,
            on_focus_changed: None,
            on_hover_enter: None,
            on_hover_leave: None,
        }
    }
}

impl fmt::Debug for EnhancementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnhancementConfig")
            .field("accessible_name", &self.accessible_name)
            .field("tooltip", &self.tooltip)
            .field("role", &self.role)
            .field("tab_index", &self.tab_index)
            .field("drop_shadow", &self.drop_shadow)
            .field("hover_effect", &self.hover_effect)
            .field("focus_effect", &self.focus_effect)
            .field("required", &self.required)
            .field("validator", &self.validator.is_some())
            .field("shortcut", &self.shortcut.as_ref().map(ToString::to_string))
            .field("completions", &self.completions.len())
            .field("input_mask", &self.input_mask)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

/// Start an enhancement bundle.
///
/// ```ignore
/// enhance()
///     .accessible_name("Email")
///     .required(true)
///     .shortcut("Ctrl+E")
///     .apply_to(&edit);
/// ```
pub fn enhance() -> EnhancementConfigBuilder {
    EnhancementConfigBuilder::new()
}

/// Fluent construction of an [`EnhancementConfig`].
#[derive(Debug, Clone, Default)]
#[must_use = "call build() or apply_to() to use the configuration"]
pub struct EnhancementConfigBuilder {
    config: EnhancementConfig,
}

impl EnhancementConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessible_name(mut self, name: impl Into<String>) -> Self {
        self.config.accessible_name = name.into();
        self
    }

    pub fn accessible_description(mut self, description: impl Into<String>) -> Self {
        self.config.accessible_description = description.into();
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.config.tooltip = tooltip.into();
        self
    }

    /// Help text doubles as the tooltip when no tooltip is given.
    pub fn help_text(mut self, help: impl Into<String>) -> Self {
        self.config.help_text = help.into();
        self
    }

    pub fn role(mut self, role: AccessibleRole) -> Self {
        self.config.role = Some(role);
        self
    }

    pub fn tab_index(mut self, index: i32) -> Self {
        self.config.tab_index = index;
        self
    }

    pub fn drop_shadow(mut self, enabled: bool) -> Self {
        self.config.drop_shadow = enabled;
        self
    }

    /// Enables the drop shadow as well.
    pub fn shadow_color(mut self, color: Color) -> Self {
        self.config.drop_shadow = true;
        self.config.shadow_color = color;
        self
    }

    pub fn hover_effect(mut self, enabled: bool) -> Self {
        self.config.hover_effect = enabled;
        self
    }

    pub fn focus_effect(mut self, enabled: bool) -> Self {
        self.config.focus_effect = enabled;
        self
    }

    pub fn focus_color(mut self, color: Color) -> Self {
        self.config.focus_color = Some(color);
        self
    }

    pub fn border_radius(mut self, radius: u32) -> Self {
        self.config.border_radius = Some(radius);
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.config.border_color = Some(color);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.config.required = required;
        self
    }

    pub fn validator(mut self, predicate: impl Fn(&dyn Widget) -> bool + Send + Sync + 'static) -> Self {
        self.config.validator = Some(Arc::new(predicate));
        self
    }

    /// Validate the text of a text input. Other widgets always pass.
    pub fn text_validator(self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validator(move |widget| widget.as_text_input().is_none_or(|input| predicate(&input.text())))
    }

    pub fn validation_error(mut self, message: impl Into<String>) -> Self {
        self.config.validation_error = message.into();
        self
    }

    pub fn validate_on_change(mut self, enabled: bool) -> Self {
        self.config.validate_on_change = enabled;
        self
    }

    pub fn validate_on_focus_lost(mut self, enabled: bool) -> Self {
        self.config.validate_on_focus_lost = enabled;
        self
    }

    /// Parse and set the shortcut. An unparsable sequence is logged and ignored.
    pub fn shortcut(mut self, sequence: &str) -> Self {
        match sequence.parse::<KeySequence>() {
            Ok(sequence) => self.config.shortcut = Some(sequence),
            Err(err) => {
                tracing::warn!(target: targets::ENHANCER, sequence, error = %err, "ignoring shortcut");
            }
        }
        self
    }

    pub fn key_sequence(mut self, sequence: KeySequence) -> Self {
        self.config.shortcut = Some(sequence);
        self
    }

    pub fn auto_complete<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.completions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn input_mask(mut self, mask: impl Into<String>) -> Self {
        self.config.input_mask = Some(mask.into());
        self
    }

    pub fn input_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.config.input_validator = Some(Arc::new(validator));
        self
    }

    pub fn select_all_on_focus(mut self, enabled: bool) -> Self {
        self.config.select_all_on_focus = enabled;
        self
    }

    pub fn clear_on_escape(mut self, enabled: bool) -> Self {
        self.config.clear_on_escape = enabled;
        self
    }

    /// Delay between the last edit and change-triggered validation.
    pub fn debounce_delay(mut self, delay: Duration) -> Self {
        self.config.debounce = delay;
        self
    }

    pub fn on_validation_changed(mut self, callback: impl Fn(bool, &str) + Send + Sync + 'static) -> Self {
        self.config.on_validation_changed = Some(Arc::new(callback));
        self
    }

    pub fn on_focus_changed(mut self, callback: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.config.on_focus_changed = Some(Arc::new(callback));
        self
    }

    pub fn on_hover_enter(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.on_hover_enter = Some(Arc::new(callback));
        self
    }

    pub fn on_hover_leave(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.on_hover_leave = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> EnhancementConfig {
        self.config
    }

    /// Apply the bundle through the global enhancer.
    pub fn apply_to(self, widget: &impl WidgetHandle) {
        ComponentEnhancer::global().enhance(&widget.widget_ref(), self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::widgets::{LineEdit, PushButton};

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_defaults() {
        let config = EnhancementConfig::default();
        assert!(config.hover_effect);
        assert!(config.focus_effect);
        assert!(config.validate_on_change);
        assert!(config.validate_on_focus_lost);
        assert!(!config.drop_shadow);
        assert_eq!(config.tab_index, -1);
        assert_eq!(config.debounce, DEFAULT_DEBOUNCE);
        assert_eq!(config.shadow_color, Color::from_rgba8(0, 0, 0, 80));
        assert!(!config.has_accessibility());
        assert!(!config.has_validation());
    }

    #[test]
    fn test_builder_records_everything() {
        let config = enhance()
            .accessible_name("Email")
            .tab_index(2)
            .shadow_color(Color::BLACK)
            .required(true)
            .shortcut("Ctrl+S")
            .auto_complete(["alpha", "beta"])
            .debounce_delay(Duration::from_millis(50))
            .build();
        assert_eq!(config.accessible_name, "Email");
        assert!(config.drop_shadow);
        assert!(config.has_accessibility());
        assert!(config.has_validation());
        assert!(config.has_behavior());
        assert_eq!(config.error_message(), "This field is required");
        assert_eq!(config.shortcut.map(|s| s.to_string()).as_deref(), Some("Ctrl+S"));
        assert_eq!(config.completions, vec!["alpha", "beta"]);
        assert_eq!(config.debounce, Duration::from_millis(50));
    }

    #[test]
    fn test_bad_shortcut_is_ignored() {
        let config = enhance().shortcut("Ctrl+").build();
        assert!(config.shortcut.is_none());
    }

    #[test]
    fn test_text_validator_skips_other_widgets() {
        setup();
        let config = enhance().text_validator(|text| text.len() > 2).build();
        let predicate = config.validator.unwrap();

        let edit = LineEdit::new().unwrap();
        edit.set_text("ab");
        assert!(!predicate(edit.as_ref()));
        edit.set_text("abc");
        assert!(predicate(edit.as_ref()));

        let button = PushButton::with_text("Go").unwrap();
        assert!(predicate(button.as_ref()));
    }
}
