//! Where a report came from.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::Location;

use chrono::{DateTime, Local};

thread_local! {
    static CURRENT: RefCell<ScopeFrame> = RefCell::new(ScopeFrame::default());
}

#[derive(Debug, Clone, Default)]
struct ScopeFrame {
    component: String,
    operation: String,
}

/// Location and circumstances of a report.
///
/// Contexts pick up the component and operation of the innermost
/// [`ErrorContextScope`] active on the creating thread.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub file: &'static str,
    pub line: u32,
    /// Module path or function name; empty when unknown.
    pub function: String,
    pub timestamp: DateTime<Local>,
    pub component: String,
    pub operation: String,
    pub metadata: Vec<(String, String)>,
}

impl ErrorContext {
    /// A context for an explicit location. The [`error_context!`](crate::error_context)
    /// macro fills these in from the call site.
    pub fn new(file: &'static str, line: u32, function: impl Into<String>) -> Self {
        let frame = CURRENT.with_borrow(ScopeFrame::clone);
        Self {
            file,
            line,
            function: function.into(),
            timestamp: Local::now(),
            component: frame.component,
            operation: frame.operation,
            metadata: Vec::new(),
        }
    }

    /// A context for the caller's location.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), "")
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Value of a metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Sets the component and operation for reports made on this thread until
/// dropped. Scopes nest; dropping one restores the enclosing values.
///
/// ```
/// use horizon_trellis::error::{ErrorContext, ErrorContextScope};
///
/// {
///     let _outer = ErrorContextScope::new("LoginForm", "submit");
///     {
///         let _inner = ErrorContextScope::new("PasswordField", "validate");
///         assert_eq!(ErrorContext::caller().component, "PasswordField");
///     }
///     assert_eq!(ErrorContext::caller().operation, "submit");
/// }
/// assert!(ErrorContext::caller().component.is_empty());
/// ```
#[derive(Debug)]
#[must_use = "the scope ends when this value is dropped"]
pub struct ErrorContextScope {
    previous: ScopeFrame,
    // Bound to the thread whose context it changed.
    _thread: PhantomData<*const ()>,
}

impl ErrorContextScope {
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        let frame = ScopeFrame {
            component: component.into(),
            operation: operation.into(),
        };
        let previous = CURRENT.with_borrow_mut(|current| std::mem::replace(current, frame));
        Self {
            previous,
            _thread: PhantomData,
        }
    }

    /// The innermost component on this thread.
    pub fn current_component() -> String {
        CURRENT.with_borrow(|current| current.component.clone())
    }

    /// The innermost operation on this thread.
    pub fn current_operation() -> String {
        CURRENT.with_borrow(|current| current.operation.clone())
    }
}

impl Drop for ErrorContextScope {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        CURRENT.with_borrow_mut(|current| *current = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_location() {
        let context = ErrorContext::caller();
        assert!(context.file.ends_with("context.rs"));
        assert!(context.line > 0);
        assert!(context.function.is_empty());
    }

    #[test]
    fn test_scopes_nest_and_restore() {
        let outer = ErrorContextScope::new("Form", "load");
        let inner = ErrorContextScope::new("Field", "");
        assert_eq!(ErrorContextScope::current_component(), "Field");
        assert_eq!(ErrorContextScope::current_operation(), "");
        drop(inner);
        assert_eq!(ErrorContextScope::current_operation(), "load");
        drop(outer);
        assert_eq!(ErrorContextScope::current_component(), "");
    }

    #[test]
    fn test_scope_is_per_thread() {
        let _scope = ErrorContextScope::new("Main", "run");
        let other = std::thread::spawn(ErrorContextScope::current_component)
            .join()
            .unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_metadata() {
        let context = ErrorContext::new("a.rs", 1, "f")
            .with_metadata("widget", "email")
            .with_operation("validate");
        assert_eq!(context.metadata("widget"), Some("email"));
        assert_eq!(context.metadata("missing"), None);
        assert_eq!(context.operation, "validate");
    }
}
