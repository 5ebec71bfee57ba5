//! Shorthands over the global error manager and enhancer.
//!
//! Every macro expands to a call on [`ErrorManager::global`](crate::error::ErrorManager::global)
//! or [`ComponentEnhancer::global`](crate::enhancer::ComponentEnhancer::global)
//! with the call site's file, line and module filled in.

/// An [`ErrorContext`](crate::error::ErrorContext) for the call site.
///
/// ```ignore
/// let context = error_context!();
/// let context = error_context!("LoginForm", "submit");
/// ```
#[macro_export]
macro_rules! error_context {
    () => {
        $crate::error::ErrorContext::new(file!(), line!(), module_path!())
    };
    ($component:expr, $operation:expr) => {
        $crate::error_context!()
            .with_component($component)
            .with_operation($operation)
    };
}

/// Set the component and operation for the rest of the enclosing block.
#[macro_export]
macro_rules! error_context_scope {
    ($component:expr, $operation:expr) => {
        let _error_context_scope = $crate::error::ErrorContextScope::new($component, $operation);
    };
}

/// Report "Assertion failed: ..." when the condition does not hold.
///
/// Defaults to `Error` severity. A `Fatal` assertion aborts.
#[macro_export]
macro_rules! ui_assert {
    ($condition:expr, $message:expr) => {
        $crate::ui_assert!($condition, $message, $crate::error::ErrorSeverity::Error)
    };
    ($condition:expr, $message:expr, $severity:expr) => {
        $crate::error::ErrorManager::global().ui_assert($condition, &$message, $severity)
    };
}

#[macro_export]
macro_rules! ui_debug {
    ($($arg:tt)*) => {
        $crate::error::ErrorManager::global().debug(format!($($arg)*), $crate::error_context!())
    };
}

#[macro_export]
macro_rules! ui_info {
    ($($arg:tt)*) => {
        $crate::error::ErrorManager::global().info(format!($($arg)*), $crate::error_context!())
    };
}

#[macro_export]
macro_rules! ui_warning {
    ($($arg:tt)*) => {
        $crate::error::ErrorManager::global().warning(format!($($arg)*), $crate::error_context!())
    };
}

#[macro_export]
macro_rules! ui_error {
    ($($arg:tt)*) => {
        $crate::error::ErrorManager::global().error(format!($($arg)*), $crate::error_context!())
    };
}

#[macro_export]
macro_rules! ui_critical {
    ($($arg:tt)*) => {
        $crate::error::ErrorManager::global().critical(format!($($arg)*), $crate::error_context!())
    };
}

/// Run a fallible closure through the global error manager.
///
/// ```ignore
/// let port: Option<u16> = safe_execute!("parse port", || text.parse::<u16>().map_err(|e| UiError::Configuration(e.to_string())));
/// ```
#[macro_export]
macro_rules! safe_execute {
    ($operation:expr, $body:expr) => {
        $crate::error::ErrorManager::global().safe_execute($operation, $body)
    };
}

/// Like [`safe_execute!`], and log how long the closure took.
#[macro_export]
macro_rules! measure_performance {
    ($operation:expr, $body:expr) => {
        $crate::error::ErrorManager::global().measure_performance($operation, $body)
    };
}

/// Give a widget an accessible name and description.
#[macro_export]
macro_rules! enhance_accessibility {
    ($widget:expr, $name:expr, $description:expr) => {
        $crate::enhancer::ComponentEnhancer::global().enhance_accessibility(
            &$widget,
            &$crate::enhancer::enhance()
                .accessible_name($name)
                .accessible_description($description)
                .build(),
        )
    };
}

/// Validate a widget with a predicate over `&dyn Widget`.
#[macro_export]
macro_rules! enhance_validation {
    ($widget:expr, $predicate:expr, $message:expr) => {
        $crate::enhancer::ComponentEnhancer::global().add_validation(&$widget, $predicate, $message)
    };
}

/// Drop shadow plus hover and focus effects.
#[macro_export]
macro_rules! enhance_visual {
    ($widget:expr) => {
        $crate::enhancer::ComponentEnhancer::global().enhance_visuals(
            &$widget,
            &$crate::enhancer::enhance()
                .drop_shadow(true)
                .hover_effect(true)
                .focus_effect(true)
                .focus_color($crate::enhancer::DEFAULT_FOCUS_COLOR)
                .build(),
        )
    };
}

#[macro_export]
macro_rules! enhance_tooltip {
    ($widget:expr, $tooltip:expr) => {
        $crate::enhancer::ComponentEnhancer::global().add_tooltip(&$widget, $tooltip)
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::Widget;
    use horizon_trellis_core::widget::widgets::{LineEdit, PushButton};

    use crate::enhancer::ComponentEnhancer;
    use crate::error::{CollectingErrorHandler, ErrorContextScope, ErrorManager, ErrorSeverity, UiError};

    fn setup() -> Arc<CollectingErrorHandler> {
        init_global_registry();
        let collected = Arc::new(CollectingErrorHandler::new());
        ErrorManager::global().add_handler(collected.clone());
        collected
    }

    #[test]
    fn test_context_macros() {
        let context = error_context!("Form", "submit");
        assert_eq!(context.component, "Form");
        assert_eq!(context.operation, "submit");
        assert!(context.file.ends_with("macros.rs"));
        assert!(context.function.contains("macros"));

        {
            error_context_scope!("Outer", "load");
            assert_eq!(ErrorContextScope::current_component(), "Outer");
            assert_eq!(error_context!().operation, "load");
        }
        assert_eq!(ErrorContextScope::current_component(), "");
    }

    #[test]
    fn test_reporting_macros() {
        let collected = setup();
        ui_warning!("disk at {}%", 91);
        ui_assert!(1 + 1 == 3, "arithmetic from the macro test");
        ui_assert!(true, "never reported from the macro test");

        let reports = collected.reports();
        let warning = reports.iter().find(|r| r.message == "disk at 91%").unwrap();
        assert_eq!(warning.severity, ErrorSeverity::Warning);
        let failed = reports
            .iter()
            .find(|r| r.message == "Assertion failed: arithmetic from the macro test")
            .unwrap();
        assert_eq!(failed.severity, ErrorSeverity::Error);
        assert!(!reports.iter().any(|r| r.message.contains("never reported")));
    }

    #[test]
    fn test_safe_execute_macros() {
        let collected = setup();
        let value = safe_execute!("double from the macro test", || Ok::<_, UiError>(21 * 2));
        assert_eq!(value, Some(42));
        let failed: Option<()> = safe_execute!("fail from the macro test", || {
            Err(UiError::Validation("rejected by the macro test".into()))
        });
        assert!(failed.is_none());
        let timed = measure_performance!("timed macro test", || Ok::<_, UiError>("done"));
        assert_eq!(timed, Some("done"));

        let messages = collected.messages();
        assert!(messages.iter().any(|m| m.contains("rejected by the macro test")));
        assert!(messages.iter().any(|m| m.starts_with("Operation 'timed macro test' completed in")));
    }

    #[test]
    fn test_enhancement_macros() {
        setup();
        let edit = LineEdit::new().unwrap();
        enhance_accessibility!(edit, "Name", "Your full name");
        enhance_tooltip!(edit, "Type your name");
        enhance_validation!(edit, |w: &dyn Widget| w.as_text_input().is_some_and(|i| !i.text().is_empty()), "Needed");
        assert_eq!(edit.widget_base().accessible_name(), "Name");
        assert_eq!(edit.widget_base().tool_tip(), "Type your name");
        assert_eq!(ComponentEnhancer::global().validate(&edit), Some(false));

        let button = PushButton::new().unwrap();
        enhance_visual!(button);
        assert!(button.widget_base().graphics_effect().is_some());
        assert!(ComponentEnhancer::global().remove_enhancements(&button));
        assert!(ComponentEnhancer::global().remove_enhancements(&edit));
    }
}
