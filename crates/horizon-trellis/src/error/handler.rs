//! Built-in report handlers.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::{ErrorSeverity, UiException};
use crate::logging::targets;

/// Receives reports dispatched by an [`ErrorManager`](super::ErrorManager).
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, report: &UiException);

    /// Reports below this severity are not passed to [`handle`](Self::handle).
    fn min_severity(&self) -> ErrorSeverity {
        ErrorSeverity::Debug
    }
}

/// `[SEVERITY] [CATEGORY] message (component::operation)`; the suffix is
/// left out when the report has neither.
fn format_line(report: &UiException) -> String {
    let mut line = format!(
        "[{}] [{}] {}",
        report.severity, report.category, report.message
    );
    let context = &report.context;
    if !context.component.is_empty() || !context.operation.is_empty() {
        line.push_str(&format!(" ({}::{})", context.component, context.operation));
    }
    line
}

/// Writes one line per report to stderr or a supplied writer.
pub struct ConsoleErrorHandler {
    out: Mutex<Box<dyn Write + Send>>,
    min_severity: ErrorSeverity,
}

impl ConsoleErrorHandler {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            min_severity: ErrorSeverity::Debug,
        }
    }

    pub fn with_min_severity(mut self, severity: ErrorSeverity) -> Self {
        self.min_severity = severity;
        self
    }
}

impl Default for ConsoleErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler for ConsoleErrorHandler {
    fn handle(&self, report: &UiException) {
        let mut out = self.out.lock();
        // A console that cannot be written to has nowhere to report that.
        let _ = writeln!(out, "{}", format_line(report));
    }

    fn min_severity(&self) -> ErrorSeverity {
        self.min_severity
    }
}

impl fmt::Debug for ConsoleErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleErrorHandler")
            .field("min_severity", &self.min_severity)
            .finish_non_exhaustive()
    }
}

/// Appends timestamped lines to a file.
///
/// Writes are serialized; failures to open or write are swallowed.
#[derive(Debug)]
pub struct FileErrorHandler {
    path: PathBuf,
    lock: Mutex<()>,
    min_severity: ErrorSeverity,
}

impl FileErrorHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            min_severity: ErrorSeverity::Debug,
        }
    }

    pub fn with_min_severity(mut self, severity: ErrorSeverity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "[{}] {line}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

impl ErrorHandler for FileErrorHandler {
    fn handle(&self, report: &UiException) {
        if let Err(err) = self.append(&format_line(report)) {
            tracing::trace!(target: targets::ERROR_HANDLER, path = %self.path.display(), %err, "error log write failed");
        }
    }

    fn min_severity(&self) -> ErrorSeverity {
        self.min_severity
    }
}

/// Re-emits reports as `tracing` events with the context as fields.
#[derive(Debug, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, report: &UiException) {
        let context = &report.context;
        macro_rules! emit {
            ($level:ident) => {
                tracing::$level!(
                    target: targets::ERROR_HANDLER,
                    category = report.category.name(),
                    file = context.file,
                    line = context.line,
                    function = %context.function,
                    component = %context.component,
                    operation = %context.operation,
                    "{}",
                    report.message
                )
            };
        }
        match report.severity {
            ErrorSeverity::Debug => emit!(debug),
            ErrorSeverity::Info => emit!(info),
            ErrorSeverity::Warning => emit!(warn),
            ErrorSeverity::Error | ErrorSeverity::Critical | ErrorSeverity::Fatal => {
                emit!(error)
            }
        }
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingErrorHandler {
    reports: Mutex<Vec<UiException>>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<UiException> {
        self.reports.lock().clone()
    }

    /// Messages of the collected reports, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.reports
            .lock()
            .iter()
            .map(|report| report.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, report: &UiException) {
        self.reports.lock().push(report.clone());
    }
}
