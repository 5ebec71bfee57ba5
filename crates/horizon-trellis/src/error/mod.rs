//! The error-handling spine.
//!
//! Failures in the declarative layer are described by [`UiError`], a closed
//! taxonomy where every variant maps to an [`ErrorCategory`] and a default
//! [`ErrorSeverity`]. A [`UiException`] pairs a failure with the
//! [`ErrorContext`] it was raised in, and the [`ErrorManager`] dispatches
//! exceptions to its pluggable [`ErrorHandler`]s.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_trellis::error::{CollectingErrorHandler, ErrorManager, ErrorSeverity, UiError};
//!
//! let manager = ErrorManager::empty();
//! let collected = Arc::new(CollectingErrorHandler::new());
//! manager.add_handler(collected.clone());
//!
//! let value: Option<i32> = manager.safe_execute("parse", || {
//!     Err::<i32, _>(UiError::Validation("not a number".into()))
//! });
//! assert!(value.is_none());
//! assert_eq!(collected.reports()[0].severity, ErrorSeverity::Error);
//! ```

mod context;
mod handler;
mod manager;

use std::fmt;
use std::sync::Arc;

use horizon_trellis_core::{AnimationError, CoreError, ObjectError, PropertyError};

pub use context::{ErrorContext, ErrorContextScope};
pub use handler::{
    CollectingErrorHandler, ConsoleErrorHandler, ErrorHandler, FileErrorHandler,
    TracingErrorHandler,
};
pub use manager::{ErrorManager, HandlerId};
pub(crate) use manager::panic_message;

/// How serious a report is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Critical,
    /// Fatal assertions abort the process once handlers have run.
    Fatal,
}

impl ErrorSeverity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The subsystem a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCategory {
    #[default]
    General,
    /// Widget construction and teardown.
    Ui,
    Layout,
    Animation,
    Theme,
    Validation,
    Memory,
    Io,
    Network,
    Configuration,
}

impl ErrorCategory {
    /// The name written by the console and file handlers.
    pub fn name(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Ui => "UI",
            Self::Layout => "LAYOUT",
            Self::Animation => "ANIMATION",
            Self::Theme => "THEME",
            Self::Validation => "VALIDATION",
            Self::Memory => "MEMORY",
            Self::Io => "IO",
            Self::Network => "NETWORK",
            Self::Configuration => "CONFIG",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by the declarative layer.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// A native widget could not be constructed.
    #[error("Failed to create {type_name}: {cause}")]
    ComponentCreation { type_name: String, cause: String },

    /// A staged or forwarded property could not be applied.
    #[error("Failed to bind property '{property}': {reason}")]
    PropertyBinding { property: String, reason: String },

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Animation error: {0}")]
    Animation(String),

    #[error("Theme error: {0}")]
    Theme(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Style error: {0}")]
    Style(#[from] horizon_trellis_style::Error),

    /// An event binding could not be wired.
    #[error("Failed to handle event '{event}': {reason}")]
    EventHandling { event: String, reason: String },

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// A failure reported by the widget toolkit.
    #[error(transparent)]
    Toolkit(#[from] CoreError),

    /// Any other error.
    #[error(transparent)]
    External(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// A panic with a string payload.
    #[error("{0}")]
    Panic(String),

    #[error("Unknown exception occurred")]
    Unknown,
}

impl UiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ComponentCreation { .. }
            | Self::PropertyBinding { .. }
            | Self::EventHandling { .. }
            | Self::Initialization(_) => ErrorCategory::Ui,
            Self::Layout(_) => ErrorCategory::Layout,
            Self::Animation(_) | Self::Toolkit(CoreError::Animation(_)) => {
                ErrorCategory::Animation
            }
            Self::Theme(_) | Self::Style(_) => ErrorCategory::Theme,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Memory(_) | Self::Toolkit(CoreError::Object(_)) => ErrorCategory::Memory,
            Self::Io(_) => ErrorCategory::Io,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) | Self::JsonParsing(_) => ErrorCategory::Configuration,
            Self::Toolkit(_) => ErrorCategory::Ui,
            Self::Assertion(_) | Self::External(_) | Self::Panic(_) | Self::Unknown => {
                ErrorCategory::General
            }
        }
    }

    /// The severity a report of this error carries unless overridden.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Memory(_) | Self::Unknown => ErrorSeverity::Critical,
            Self::PropertyBinding { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    pub fn component_creation(type_name: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::ComponentCreation {
            type_name: type_name.into(),
            cause: cause.to_string(),
        }
    }

    pub fn property_binding(property: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::PropertyBinding {
            property: property.into(),
            reason: reason.to_string(),
        }
    }

    pub fn event_handling(event: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::EventHandling {
            event: event.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ObjectError> for UiError {
    fn from(err: ObjectError) -> Self {
        Self::Toolkit(err.into())
    }
}

impl From<PropertyError> for UiError {
    fn from(err: PropertyError) -> Self {
        Self::Toolkit(err.into())
    }
}

impl From<AnimationError> for UiError {
    fn from(err: AnimationError) -> Self {
        Self::Toolkit(err.into())
    }
}

/// Result type for the declarative layer.
pub type Result<T> = std::result::Result<T, UiError>;

/// A report: what went wrong, how badly, and where.
#[derive(Debug, Clone)]
pub struct UiException {
    pub message: String,
    pub severity: ErrorSeverity,
    pub category: ErrorCategory,
    pub context: ErrorContext,
    /// The structured error behind the report, when there is one.
    pub error: Option<Arc<UiError>>,
}

impl UiException {
    pub fn new(
        message: impl Into<String>,
        severity: ErrorSeverity,
        category: ErrorCategory,
        context: ErrorContext,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            category,
            context,
            error: None,
        }
    }

    /// A report for `error` at its default severity and category.
    pub fn from_error(error: UiError, context: ErrorContext) -> Self {
        Self {
            message: error.to_string(),
            severity: error.severity(),
            category: error.category(),
            context,
            error: Some(Arc::new(error)),
        }
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// `Error in {file}:{line} ({function}): {message}`.
    pub fn formatted_message(&self) -> String {
        format!(
            "Error in {}:{} ({}): {}",
            self.context.file, self.context.line, self.context.function, self.message
        )
    }
}

impl fmt::Display for UiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UiException {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_and_names() {
        assert!(ErrorSeverity::Debug < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Critical < ErrorSeverity::Fatal);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
        assert_eq!(ErrorCategory::Configuration.to_string(), "CONFIG");
        assert_eq!(ErrorCategory::Ui.name(), "UI");
    }

    #[test]
    fn test_error_mapping() {
        let err = UiError::component_creation("PushButton", "registry gone");
        assert_eq!(err.category(), ErrorCategory::Ui);
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.to_string(), "Failed to create PushButton: registry gone");

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(UiError::from(json).category(), ErrorCategory::Configuration);
        assert_eq!(
            UiError::from(AnimationError::NoEndValue).category(),
            ErrorCategory::Animation
        );
        assert_eq!(UiError::Unknown.severity(), ErrorSeverity::Critical);
        assert_eq!(UiError::Unknown.to_string(), "Unknown exception occurred");
    }

    #[test]
    fn test_formatted_message() {
        let context = ErrorContext::new("src/form.rs", 42, "form::submit");
        let report = UiException::new(
            "bad input",
            ErrorSeverity::Warning,
            ErrorCategory::Validation,
            context,
        );
        assert_eq!(
            report.formatted_message(),
            "Error in src/form.rs:42 (form::submit): bad input"
        );
        assert!(std::error::Error::source(&report).is_none());
    }
}
