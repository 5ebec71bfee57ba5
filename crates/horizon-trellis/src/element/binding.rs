//! Live property bindings and per-element performance metrics.
//!
//! An [`ElementLink`] is the part of an element that outlives a borrow of
//! the builder: signal bindings and the widget's destroyed hook hold it
//! weakly, and every property write on the live widget goes through it so
//! the write is timed, announced and reported to the lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use horizon_trellis_core::widget::{Widget, WidgetRef};
use horizon_trellis_core::{Signal, SignalConnection, Variant};
use parking_lot::{Mutex, RwLock};

use super::lifecycle::ComponentLifecycle;
use crate::error::{ErrorContext, ErrorManager, UiError};
use crate::logging::targets;

/// Timings collected while monitoring is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerformanceMetrics {
    pub last_update: Duration,
    pub total_update: Duration,
    pub update_count: u32,
}

impl PerformanceMetrics {
    pub fn average_update(&self) -> Duration {
        if self.update_count == 0 {
            Duration::ZERO
        } else {
            self.total_update / self.update_count
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.last_update = elapsed;
        self.total_update += elapsed;
        self.update_count += 1;
    }
}

/// Where a bound property takes its value from.
pub(crate) enum PropertyBinding {
    /// Re-evaluated on bind and on every refresh.
    Computed(Arc<dyn Fn() -> Variant + Send + Sync>),
    /// Pushed by a signal; the connection is dropped with the binding.
    Signal(SignalConnection),
}

impl PropertyBinding {
    pub(crate) fn release(self) {
        if let Self::Signal(connection) = self {
            connection.disconnect();
        }
    }
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed(_) => f.write_str("Computed"),
            Self::Signal(connection) => f.debug_tuple("Signal").field(connection).finish(),
        }
    }
}

pub(crate) struct ElementLink {
    type_name: &'static str,
    widget: RwLock<Option<Weak<dyn Widget>>>,
    /// Signal-bound values that arrived before the widget existed.
    pending: Mutex<Vec<(String, Variant)>>,
    errors: RwLock<Option<Arc<ErrorManager>>>,
    monitoring: AtomicBool,
    metrics: Mutex<PerformanceMetrics>,
    pub(crate) lifecycle: ComponentLifecycle,
    pub(crate) property_updated: Signal<String>,
    pub(crate) refreshed: Signal<()>,
    pub(crate) invalidated: Signal<()>,
}

impl ElementLink {
    pub(crate) fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            widget: RwLock::new(None),
            pending: Mutex::new(Vec::new()),
            errors: RwLock::new(None),
            monitoring: AtomicBool::new(false),
            metrics: Mutex::new(PerformanceMetrics::default()),
            lifecycle: ComponentLifecycle::new(),
            property_updated: Signal::new(),
            refreshed: Signal::new(),
            invalidated: Signal::new(),
        }
    }

    pub(crate) fn set_widget(&self, widget: Option<&WidgetRef>) {
        *self.widget.write() = widget.map(Arc::downgrade);
    }

    fn widget(&self) -> Option<WidgetRef> {
        self.widget.read().as_ref()?.upgrade()
    }

    pub(crate) fn take_pending(&self) -> Vec<(String, Variant)> {
        std::mem::take(&mut *self.pending.lock())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write `value` to the live widget, or hold it until attach.
    pub(crate) fn push(&self, name: &str, value: Variant) {
        match self.widget() {
            Some(widget) => {
                self.apply(&*widget, name, value);
            }
            None => {
                let mut pending = self.pending.lock();
                pending.retain(|(held, _)| held != name);
                pending.push((name.to_string(), value));
            }
        }
    }

    /// Apply one property write. Returns `false` when the widget rejected it.
    pub(crate) fn apply(&self, widget: &dyn Widget, name: &str, value: Variant) -> bool {
        let previous = widget.property(name);
        let result = self.measure(|| widget.set_property(name, value.clone()));
        if let Err(err) = result {
            let error = UiError::property_binding(name, err);
            self.lifecycle.handle_error(error.to_string());
            self.report(error, "set_property");
            return false;
        }
        tracing::trace!(target: targets::ELEMENT, element = self.type_name, property = name, "property applied");

        let current = widget.property(name).unwrap_or(value);
        if previous.as_ref() == Some(&current) {
            return true;
        }
        self.property_updated.emit(name.to_string());
        let mut before = HashMap::new();
        if let Some(previous) = previous {
            before.insert(name.to_string(), previous);
        }
        self.lifecycle
            .update(before, HashMap::from([(name.to_string(), current)]));
        true
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    pub(crate) fn set_monitoring(&self, enabled: bool) {
        self.monitoring.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::Relaxed)
    }

    pub(crate) fn metrics(&self) -> PerformanceMetrics {
        *self.metrics.lock()
    }

    /// Run `f`, recording its duration when monitoring is on.
    pub(crate) fn measure<T>(&self, f: impl FnOnce() -> T) -> T {
        if !self.is_monitoring() {
            return f();
        }
        let started = Instant::now();
        let result = f();
        let elapsed = started.elapsed();
        self.metrics.lock().record(elapsed);
        tracing::trace!(target: targets::ELEMENT, element = self.type_name, ?elapsed, "update measured");
        result
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(crate) fn set_error_manager(&self, errors: Arc<ErrorManager>) {
        *self.errors.write() = Some(errors);
    }

    #[track_caller]
    pub(crate) fn report(&self, error: UiError, operation: &str) {
        let context = ErrorContext::caller()
            .with_component(self.type_name)
            .with_operation(operation);
        match self.errors.read().clone() {
            Some(errors) => errors.report_error(error, context),
            None => ErrorManager::global().report_error(error, context),
        }
    }
}

impl fmt::Debug for ElementLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementLink")
            .field("type_name", &self.type_name)
            .field("monitoring", &self.is_monitoring())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

static_assertions::assert_impl_all!(ElementLink: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingErrorHandler;
    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::widgets::Slider;

    fn setup() -> (ElementLink, WidgetRef) {
        init_global_registry();
        let link = ElementLink::new("Slider");
        let slider: WidgetRef = Slider::new().unwrap();
        (link, slider)
    }

    #[test]
    fn test_average_of_no_updates_is_zero() {
        let metrics = PerformanceMetrics::default();
        assert_eq!(metrics.average_update(), Duration::ZERO);
        let mut metrics = metrics;
        metrics.record(Duration::from_millis(2));
        metrics.record(Duration::from_millis(4));
        assert_eq!(metrics.average_update(), Duration::from_millis(3));
        assert_eq!(metrics.last_update, Duration::from_millis(4));
    }

    #[test]
    fn test_pushes_wait_for_the_widget() {
        let (link, slider) = setup();
        link.push("value", Variant::Int(5));
        link.push("value", Variant::Int(7));
        assert_eq!(link.take_pending(), vec![("value".to_string(), Variant::Int(7))]);

        link.set_widget(Some(&slider));
        link.push("value", Variant::Int(9));
        assert!(link.take_pending().is_empty());
        assert_eq!(slider.property("value"), Some(Variant::Int(9)));
    }

    #[test]
    fn test_only_monitored_writes_are_measured() {
        let (link, slider) = setup();
        assert!(link.apply(&*slider, "value", Variant::Int(1)));
        assert_eq!(link.metrics().update_count, 0);
        link.set_monitoring(true);
        assert!(link.apply(&*slider, "value", Variant::Int(2)));
        assert!(link.apply(&*slider, "value", Variant::Int(2)));
        assert_eq!(link.metrics().update_count, 2);
    }

    #[test]
    fn test_unchanged_writes_are_not_announced() {
        let (link, slider) = setup();
        let announced = Arc::new(Mutex::new(Vec::new()));
        let sink = announced.clone();
        link.property_updated.connect(move |name| sink.lock().push(name.clone()));
        link.apply(&*slider, "value", Variant::Int(3));
        link.apply(&*slider, "value", Variant::Int(3));
        assert_eq!(*announced.lock(), vec!["value".to_string()]);
    }

    #[test]
    fn test_rejected_write_reports_through_the_element_manager() {
        let (link, slider) = setup();
        let errors = Arc::new(ErrorManager::empty());
        let collected = Arc::new(CollectingErrorHandler::new());
        errors.add_handler(collected.clone());
        link.set_error_manager(errors);

        assert!(!link.apply(&*slider, "noSuchProperty", Variant::Int(1)));
        assert_eq!(collected.len(), 1);
        assert_eq!(collected.reports()[0].context.component, "Slider");
    }
}
