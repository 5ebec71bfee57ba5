//! The report dispatcher.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use super::handler::{ConsoleErrorHandler, ErrorHandler};
use super::{ErrorCategory, ErrorContext, ErrorSeverity, UiError, UiException};
use crate::logging::targets;

new_key_type! {
    /// Identifies a handler added to an [`ErrorManager`].
    pub struct HandlerId;
}

const DEFAULT_OPERATION: &str = "Unknown operation";

#[derive(Default)]
struct Handlers {
    slots: SlotMap<HandlerId, Arc<dyn ErrorHandler>>,
    order: Vec<HandlerId>,
}

/// Dispatches reports to a list of handlers.
///
/// Every report that passes the manager's minimum severity is forwarded to
/// `tracing` under the `horizon_trellis::error` target and then handed to
/// each handler, in the order they were added, whose own minimum it meets.
pub struct ErrorManager {
    handlers: RwLock<Handlers>,
    min_severity: RwLock<ErrorSeverity>,
}

static GLOBAL: OnceLock<ErrorManager> = OnceLock::new();

impl ErrorManager {
    /// A manager writing to stderr through a [`ConsoleErrorHandler`].
    pub fn new() -> Self {
        let manager = Self::empty();
        manager.add_handler(Arc::new(ConsoleErrorHandler::new()));
        manager
    }

    /// A manager without handlers.
    pub fn empty() -> Self {
        Self {
            handlers: RwLock::new(Handlers::default()),
            min_severity: RwLock::new(ErrorSeverity::Debug),
        }
    }

    /// The process-wide manager.
    pub fn global() -> &'static ErrorManager {
        GLOBAL.get_or_init(ErrorManager::new)
    }

    pub fn add_handler<H: ErrorHandler + 'static>(&self, handler: Arc<H>) -> HandlerId {
        let mut handlers = self.handlers.write();
        let id = handlers.slots.insert(handler);
        handlers.order.push(id);
        id
    }

    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        handlers.order.retain(|existing| *existing != id);
        handlers.slots.remove(id).is_some()
    }

    pub fn clear_handlers(&self) {
        let mut handlers = self.handlers.write();
        handlers.slots.clear();
        handlers.order.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().order.len()
    }

    pub fn min_severity(&self) -> ErrorSeverity {
        *self.min_severity.read()
    }

    /// Drop reports below `severity` before they reach any handler.
    pub fn set_min_severity(&self, severity: ErrorSeverity) {
        *self.min_severity.write() = severity;
    }

    /// Dispatch a structured report.
    pub fn handle_error(&self, report: &UiException) {
        if report.severity < self.min_severity() {
            return;
        }
        forward_to_tracing(report);

        let handlers: Vec<Arc<dyn ErrorHandler>> = {
            let handlers = self.handlers.read();
            handlers
                .order
                .iter()
                .filter_map(|id| handlers.slots.get(*id).cloned())
                .collect()
        };
        for handler in handlers {
            if report.severity >= handler.min_severity() {
                handler.handle(report);
            }
        }
    }

    /// Report `error` at its default severity.
    pub fn report_error(&self, error: UiError, context: ErrorContext) {
        self.handle_error(&UiException::from_error(error, context));
    }

    /// Report a message in the general category.
    pub fn report(&self, severity: ErrorSeverity, message: impl Into<String>, context: ErrorContext) {
        self.handle_error(&UiException::new(
            message,
            severity,
            ErrorCategory::General,
            context,
        ));
    }

    pub fn debug(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Debug, message, context);
    }

    pub fn info(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Info, message, context);
    }

    pub fn warning(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Warning, message, context);
    }

    pub fn error(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Error, message, context);
    }

    pub fn critical(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Critical, message, context);
    }

    /// Report at [`ErrorSeverity::Fatal`]. Unlike a fatal
    /// [`ui_assert`](Self::ui_assert) this does not abort.
    pub fn fatal(&self, message: impl Into<String>, context: ErrorContext) {
        self.report(ErrorSeverity::Fatal, message, context);
    }

    /// Run `f`, reporting any error or panic instead of propagating it.
    ///
    /// Structured errors keep their own severity. A panic with a string
    /// payload is reported at `Error` with the payload as message; any other
    /// panic is reported at `Critical`. An empty `operation` is reported as
    /// "Unknown operation".
    #[track_caller]
    pub fn safe_execute<T, E, F>(&self, operation: &str, f: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<UiError>,
    {
        let location = Location::caller();
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                let context = operation_context(location, operation);
                self.handle_error(&UiException::from_error(err.into(), context));
                None
            }
            Err(payload) => {
                let context = operation_context(location, operation);
                self.handle_error(&panic_report(payload, context));
                None
            }
        }
    }

    /// Run an infallible `f`, reporting a panic instead of propagating it.
    /// Returns whether `f` completed.
    #[track_caller]
    pub fn safe_call<F>(&self, operation: &str, f: F) -> bool
    where
        F: FnOnce(),
    {
        self.safe_execute(operation, || {
            f();
            Ok::<(), UiError>(())
        })
        .is_some()
    }

    /// Report "Assertion failed: {message}" when `condition` is false.
    ///
    /// A failed `Fatal` assertion aborts the process after the handlers ran.
    #[track_caller]
    pub fn ui_assert(&self, condition: bool, message: &str, severity: ErrorSeverity) {
        if condition {
            return;
        }
        self.handle_error(&UiException::new(
            format!("Assertion failed: {message}"),
            severity,
            ErrorCategory::General,
            ErrorContext::caller(),
        ));
        if severity == ErrorSeverity::Fatal {
            std::process::abort();
        }
    }

    /// [`safe_execute`](Self::safe_execute) `f` and log how long it took.
    #[track_caller]
    pub fn measure_performance<T, E, F>(&self, operation: &str, f: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<UiError>,
    {
        let start = Instant::now();
        let result = self.safe_execute(operation, f);
        let elapsed = start.elapsed().as_millis();
        self.info(
            format!("Operation '{}' completed in {elapsed}ms", operation_name(operation)),
            ErrorContext::caller().with_operation(operation_name(operation)),
        );
        result
    }
}

impl Default for ErrorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorManager")
            .field("handlers", &self.handler_count())
            .field("min_severity", &self.min_severity())
            .finish()
    }
}

static_assertions::assert_impl_all!(ErrorManager: Send, Sync);

fn operation_name(operation: &str) -> &str {
    if operation.is_empty() {
        DEFAULT_OPERATION
    } else {
        operation
    }
}

fn operation_context(location: &'static Location<'static>, operation: &str) -> ErrorContext {
    ErrorContext::new(location.file(), location.line(), "").with_operation(operation_name(operation))
}

/// The text of a `panic!` payload, if it carried one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
}

fn panic_report(payload: Box<dyn Any + Send>, context: ErrorContext) -> UiException {
    let error = match panic_message(payload.as_ref()) {
        Some(message) => UiError::Panic(message),
        None => UiError::Unknown,
    };
    UiException::from_error(error, context)
}

fn forward_to_tracing(report: &UiException) {
    let context = &report.context;
    match report.severity {
        ErrorSeverity::Debug => {
            tracing::debug!(target: targets::ERRORS, category = report.category.name(), component = %context.component, "{}", report.message)
        }
        ErrorSeverity::Info => {
            tracing::info!(target: targets::ERRORS, category = report.category.name(), component = %context.component, "{}", report.message)
        }
        ErrorSeverity::Warning => {
            tracing::warn!(target: targets::ERRORS, category = report.category.name(), component = %context.component, "{}", report.message)
        }
        ErrorSeverity::Error | ErrorSeverity::Critical | ErrorSeverity::Fatal => {
            tracing::error!(target: targets::ERRORS, category = report.category.name(), component = %context.component, severity = report.severity.name(), "{}", report.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingErrorHandler;

    fn collecting() -> (ErrorManager, Arc<CollectingErrorHandler>) {
        let manager = ErrorManager::empty();
        let handler = Arc::new(CollectingErrorHandler::new());
        manager.add_handler(handler.clone());
        (manager, handler)
    }

    #[test]
    fn test_new_has_console_handler() {
        assert_eq!(ErrorManager::new().handler_count(), 1);
        assert_eq!(ErrorManager::empty().handler_count(), 0);
    }

    #[test]
    fn test_handlers_run_in_order_and_filter() {
        let manager = ErrorManager::empty();
        let first = Arc::new(CollectingErrorHandler::new());
        let second = Arc::new(CollectingErrorHandler::new());
        manager.add_handler(first.clone());
        let id = manager.add_handler(second.clone());

        manager.warning("low disk", ErrorContext::caller());
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);

        assert!(manager.remove_handler(id));
        assert!(!manager.remove_handler(id));
        manager.set_min_severity(ErrorSeverity::Error);
        manager.info("ignored", ErrorContext::caller());
        manager.error("kept", ErrorContext::caller());
        assert_eq!(first.messages(), vec!["low disk", "kept"]);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_safe_execute_maps_failures() {
        let (manager, handler) = collecting();

        assert_eq!(manager.safe_execute("ok", || Ok::<_, UiError>(7)), Some(7));
        assert!(handler.is_empty());

        let none: Option<()> =
            manager.safe_execute("memory", || Err(UiError::Memory("pool exhausted".into())));
        assert!(none.is_none());

        let external: Option<()> = manager.safe_execute("", || {
            Err(Box::<dyn std::error::Error + Send + Sync>::from("disk on fire"))
        });
        assert!(external.is_none());

        let reports = handler.reports();
        assert_eq!(reports[0].severity, ErrorSeverity::Critical);
        assert_eq!(reports[0].category, ErrorCategory::Memory);
        assert_eq!(reports[0].context.operation, "memory");
        assert_eq!(reports[1].severity, ErrorSeverity::Error);
        assert_eq!(reports[1].category, ErrorCategory::General);
        assert_eq!(reports[1].message, "disk on fire");
        assert_eq!(reports[1].context.operation, "Unknown operation");
    }

    #[test]
    fn test_safe_execute_catches_panics() {
        let (manager, handler) = collecting();

        let text: Option<()> = manager.safe_execute("boom", || -> Result<(), UiError> {
            panic!("index out of range")
        });
        assert!(text.is_none());
        assert!(!manager.safe_call("opaque", || std::panic::panic_any(42_u8)));
        assert!(manager.safe_call("fine", || {}));

        let reports = handler.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message, "index out of range");
        assert_eq!(reports[0].severity, ErrorSeverity::Error);
        assert_eq!(reports[1].message, "Unknown exception occurred");
        assert_eq!(reports[1].severity, ErrorSeverity::Critical);
    }

    #[test]
    fn test_ui_assert() {
        let (manager, handler) = collecting();
        manager.ui_assert(true, "never reported", ErrorSeverity::Error);
        manager.ui_assert(false, "width must be positive", ErrorSeverity::Warning);

        let reports = handler.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "Assertion failed: width must be positive");
        assert_eq!(reports[0].severity, ErrorSeverity::Warning);
        assert!(reports[0].context.file.ends_with("manager.rs"));
    }

    #[test]
    fn test_measure_performance() {
        let (manager, handler) = collecting();
        let value = manager.measure_performance("layout pass", || Ok::<_, UiError>("done"));
        assert_eq!(value, Some("done"));

        let reports = handler.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].severity, ErrorSeverity::Info);
        assert!(reports[0].message.starts_with("Operation 'layout pass' completed in "));
        assert!(reports[0].message.ends_with("ms"));
    }
}
