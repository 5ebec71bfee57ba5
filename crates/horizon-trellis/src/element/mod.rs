//! Deferred widget construction.
//!
//! Every builder implements [`UiElement`]. Configuration written before
//! [`initialize`](UiElement::initialize) is staged in an [`ElementCore`];
//! `initialize` creates the native widget, flushes the staged properties,
//! wires event handlers and runs the setup hooks in a fixed order:
//!
//! 1. accessibility registration
//! 2. visual effects
//! 3. event filters and shortcuts
//! 4. validation
//! 5. group membership
//! 6. final state reconciliation
//!
//! A second `initialize` returns the existing widget without touching it.
//! Once the steps are done the element's [`ComponentLifecycle`] is mounted;
//! [`cleanup`](UiElement::cleanup) or destroying the widget unmounts it.
//!
//! ```
//! use horizon_trellis::prelude::*;
//!
//! init_global_registry();
//! let mut button = ButtonBuilder::new()
//!     .text("Submit")
//!     .tooltip("Send the form");
//! let widget = button.initialize().unwrap();
//! assert_eq!(widget.text(), "Submit");
//! assert_eq!(widget.widget_base().tool_tip(), "Send the form");
//! ```

mod binding;
mod staging;
pub mod event;
pub mod lifecycle;

use std::sync::Arc;

use horizon_trellis_core::widget::{KeySequence, Widget, WidgetRef};
use horizon_trellis_core::{Color, FromVariant, Signal, SignalConnection, Variant};

pub use binding::PerformanceMetrics;
pub use lifecycle::{
    ComponentLifecycle, EffectCleanup, LifecycleContext, LifecycleMetrics, LifecyclePhase,
};
pub use staging::{Decorations, ElementCore, SHADOW_BLUR_RADIUS, SHADOW_OFFSET, SHAPE_LAYER};
pub(crate) use staging::{activate_widget, connect_activation, drop_shadow, keep_with_widget};
pub use event::{EventHandler, Payload, PayloadKind, tree_item_from_variant};

use crate::accessibility::AccessibleRole;
use crate::enhancer::{ComponentEnhancer, EnhancementConfig};
use crate::error::UiError;
use crate::logging::targets;
use crate::memory::WidgetHandle;

/// Where a builder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementState {
    /// Configuration is staged; no widget exists.
    #[default]
    Unbuilt,
    Initialized,
    /// The enhancer decorated the widget.
    Enhanced,
    /// The widget was attached to a parent or shown.
    Active,
    /// The widget was destroyed.
    Disposed,
}

/// The deferred construction protocol.
///
/// Implementors supply the widget factory, the event name table and any
/// setup hooks; the staging, flushing and wiring are provided.
///
/// Fluent configuration comes in two flavours: the by-value `with_*` style
/// methods for chaining on a fresh builder, and `set_property`/`on_event`
/// through `&mut self` for any point in the lifecycle.
pub trait UiElement: Sized {
    type Widget: Widget;

    fn core(&self) -> &ElementCore<Self::Widget>;

    fn core_mut(&mut self) -> &mut ElementCore<Self::Widget>;

    /// Create the native widget.
    fn create_widget(&self) -> crate::Result<Arc<Self::Widget>>;

    /// Connect `handler` to the native signal called `event`.
    ///
    /// Returns `None` for unknown events and incompatible handlers.
    fn connect_event(
        &self,
        widget: &Arc<Self::Widget>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection>;

    fn setup_accessibility(&mut self, _widget: &Arc<Self::Widget>) {}

    fn setup_visuals(&mut self, _widget: &Arc<Self::Widget>) {}

    fn setup_event_filters(&mut self, _widget: &Arc<Self::Widget>) {}

    fn setup_validation(&mut self, _widget: &Arc<Self::Widget>) {}

    fn setup_groups(&mut self, _widget: &Arc<Self::Widget>) {}

    fn reconcile_state(&mut self, _widget: &Arc<Self::Widget>) {}

    /// Build the widget and commit all staged configuration.
    ///
    /// Creation failures are reported through the error manager and
    /// returned as [`UiError::ComponentCreation`].
    fn initialize(&mut self) -> crate::Result<Arc<Self::Widget>> {
        if let Some(widget) = self.core().widget() {
            return Ok(widget.clone());
        }
        let type_name = self.core().type_name();
        let widget = match self.create_widget() {
            Ok(widget) => widget,
            Err(err) => {
                let cause = err.to_string();
                self.core()
                    .report(UiError::component_creation(type_name, &cause), "initialize");
                return Err(UiError::component_creation(type_name, cause));
            }
        };

        self.core_mut().attach(widget.clone());
        let handlers = self.core().handlers().to_vec();
        for (event, handler) in &handlers {
            wire(self, &widget, event, handler);
        }

        self.core().apply_accessibility(&widget);
        self.setup_accessibility(&widget);
        self.core().apply_visuals(&widget);
        self.setup_visuals(&widget);
        self.core_mut().apply_shortcut(&widget);
        self.setup_event_filters(&widget);
        self.setup_validation(&widget);
        self.setup_groups(&widget);
        self.reconcile_state(&widget);

        self.core().attach_parent(&widget);
        let active = self.core().parent().is_some() || self.core().decorations().show;
        if self.core().decorations().show {
            widget.widget_base().show();
        }
        self.core_mut().set_state(if active {
            ElementState::Active
        } else {
            ElementState::Initialized
        });
        self.core().mount(&widget);
        tracing::debug!(
            target: targets::ELEMENT,
            element = type_name,
            id = ?widget.object_id(),
            handlers = handlers.len(),
            "element initialized"
        );
        Ok(widget)
    }

    fn widget(&self) -> Option<&Arc<Self::Widget>> {
        self.core().widget()
    }

    /// The widget as a shared trait object.
    fn widget_ref(&self) -> Option<WidgetRef> {
        self.core().widget().map(|widget| widget.clone() as WidgetRef)
    }

    fn is_initialized(&self) -> bool {
        self.core().is_initialized()
    }

    fn state(&self) -> ElementState {
        self.core().state()
    }

    // =========================================================================
    // Properties and handlers
    // =========================================================================

    /// Stage a property, or apply it straight away once initialized.
    ///
    /// A value the widget rejects is reported as a warning and dropped.
    fn set_property(&mut self, name: &str, value: impl Into<Variant>) -> &mut Self {
        self.core_mut().stage(name, value.into());
        self
    }

    fn with_property(mut self, name: &str, value: impl Into<Variant>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Bind a handler to a named event, replacing an earlier one.
    ///
    /// Handlers added after initialization are wired immediately.
    fn on_event(&mut self, name: &str, handler: EventHandler) -> &mut Self {
        self.core_mut().add_handler(name, handler.clone());
        if let Some(widget) = self.core().widget().cloned() {
            wire(self, &widget, name, &handler);
        }
        self
    }

    fn with_event(mut self, name: &str, handler: EventHandler) -> Self {
        self.on_event(name, handler);
        self
    }

    fn has_property(&self, name: &str) -> bool {
        self.core().has_property(name)
    }

    fn get_property<T: FromVariant>(&self, name: &str) -> Option<T> {
        self.core().property(name)
    }

    fn list_properties(&self) -> Vec<String> {
        self.core().property_names()
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Keep `name` equal to `compute()`. It is evaluated now and again on
    /// every [`refresh`](Self::refresh).
    fn bind_property(
        &mut self,
        name: &str,
        compute: impl Fn() -> Variant + Send + Sync + 'static,
    ) -> &mut Self {
        self.core_mut().bind_computed(name, Arc::new(compute));
        self
    }

    /// Write `map(args)` to `name` whenever `signal` on `owner` fires.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use horizon_trellis::prelude::*;
    /// use horizon_trellis::toolkit::Signal;
    ///
    /// struct Counter {
    ///     changed: Signal<i64>,
    /// }
    ///
    /// impl Counter {
    ///     fn changed(&self) -> &Signal<i64> {
    ///         &self.changed
    ///     }
    /// }
    ///
    /// init_global_registry();
    /// let counter = Arc::new(Counter { changed: Signal::new() });
    /// let mut label = LabelBuilder::new();
    /// label.bind_property_to("text", &counter, Counter::changed, |n| format!("{n} items").into());
    /// let widget = label.initialize().unwrap();
    /// counter.changed.emit(3);
    /// assert_eq!(widget.text(), "3 items");
    /// ```
    fn bind_property_to<O, A>(
        &mut self,
        name: &str,
        owner: &Arc<O>,
        signal: fn(&O) -> &Signal<A>,
        map: impl Fn(&A) -> Variant + Send + Sync + 'static,
    ) -> &mut Self
    where
        O: ?Sized + Send + Sync + 'static,
        A: 'static,
    {
        self.core_mut().bind_signal(name, owner, signal, map);
        self
    }

    fn unbind_property(&mut self, name: &str) -> bool {
        self.core_mut().unbind(name)
    }

    // =========================================================================
    // Lifecycle hooks
    // =========================================================================

    fn lifecycle(&self) -> &ComponentLifecycle {
        self.core().lifecycle()
    }

    fn on_mount(self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) -> Self {
        self.core().lifecycle().on_mount(hook);
        self
    }

    fn on_unmount(self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) -> Self {
        self.core().lifecycle().on_unmount(hook);
        self
    }

    /// Run `hook` after a live property write changed a value.
    fn on_update(self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) -> Self {
        self.core().lifecycle().on_update(hook);
        self
    }

    /// Run `hook` when the widget rejects a property write.
    fn on_error(self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) -> Self {
        self.core().lifecycle().on_error(hook);
        self
    }

    /// Run `effect` on mount and whenever one of `dependencies` changes.
    fn use_effect<I, S>(
        self,
        dependencies: I,
        effect: impl Fn() -> Option<EffectCleanup> + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.core().lifecycle().use_effect(dependencies, effect);
        self
    }

    // =========================================================================
    // Monitoring
    // =========================================================================

    /// Time every live property write and refresh.
    fn enable_performance_monitoring(&mut self, enabled: bool) -> &mut Self {
        self.core().set_performance_monitoring(enabled);
        self
    }

    fn performance_metrics(&self) -> PerformanceMetrics {
        self.core().performance_metrics()
    }

    // =========================================================================
    // Common configuration
    // =========================================================================

    fn object_name(self, name: impl Into<String>) -> Self {
        self.with_property("objectName", name.into())
    }

    fn tooltip(self, text: impl Into<String>) -> Self {
        self.with_property("toolTip", text.into())
    }

    fn style_sheet(self, sheet: impl Into<String>) -> Self {
        self.with_property("styleSheet", sheet.into())
    }

    fn enabled(self, enabled: bool) -> Self {
        self.with_property("enabled", enabled)
    }

    fn visible(self, visible: bool) -> Self {
        self.with_property("visible", visible)
    }

    fn accessible_name(self, name: impl Into<String>) -> Self {
        self.with_property("accessibleName", name.into())
    }

    fn accessible_description(self, description: impl Into<String>) -> Self {
        self.with_property("accessibleDescription", description.into())
    }

    fn accessible_role(mut self, role: AccessibleRole) -> Self {
        self.core_mut().decorations_mut().role = Some(role);
        self
    }

    fn tab_index(mut self, index: i32) -> Self {
        self.core_mut().decorations_mut().tab_index = Some(index);
        self
    }

    /// Activate the widget with `sequence`; buttons are clicked, other
    /// widgets take focus.
    fn shortcut(mut self, sequence: KeySequence) -> Self {
        self.core_mut().decorations_mut().shortcut = Some(sequence);
        self
    }

    /// Parse and set a shortcut, reporting a malformed sequence.
    fn shortcut_str(self, sequence: &str) -> Self {
        match sequence.parse::<KeySequence>() {
            Ok(parsed) => self.shortcut(parsed),
            Err(err) => {
                self.core().report(
                    UiError::Configuration(format!("invalid shortcut '{sequence}': {err}")),
                    "shortcut",
                );
                self
            }
        }
    }

    fn drop_shadow(mut self, color: Color) -> Self {
        self.core_mut().decorations_mut().drop_shadow = Some(color);
        self
    }

    fn border_radius(mut self, radius: u32) -> Self {
        self.core_mut().decorations_mut().border_radius = Some(radius);
        self
    }

    /// Attach to `parent` during initialization.
    fn parent(mut self, parent: &impl WidgetHandle) -> Self {
        self.core_mut().set_parent(parent.widget_ref());
        self
    }

    /// Show the widget during initialization.
    fn show(mut self) -> Self {
        self.core_mut().decorations_mut().show = true;
        self
    }

    // =========================================================================
    // Lifecycle after initialization
    // =========================================================================

    /// Attach the built widget to `parent`.
    fn attach_to(&mut self, parent: &impl WidgetHandle) -> crate::Result<()> {
        let parent = parent.widget_ref();
        self.core_mut().set_parent(parent);
        if let Some(widget) = self.core().widget().cloned() {
            self.core().attach_parent(&widget);
            self.core_mut().set_state(ElementState::Active);
        }
        Ok(())
    }

    /// Re-evaluate bound properties and write every stored property again.
    fn refresh(&mut self) -> &mut Self {
        self.core_mut().refresh();
        self
    }

    fn invalidate(&self) {
        self.core().invalidate();
    }

    /// Unmount, disconnect handlers, drop bindings and destroy the widget.
    fn cleanup(&mut self) {
        self.core_mut().cleanup();
    }

    /// Decorate the built widget with the enhancer.
    fn enhance(&mut self, config: EnhancementConfig) -> crate::Result<()> {
        let widget = self.widget_ref().ok_or_else(|| {
            UiError::Initialization(format!(
                "{} must be initialized before it is enhanced",
                self.core().type_name()
            ))
        })?;
        ComponentEnhancer::global().enhance(&widget, config);
        if self.core().state() == ElementState::Initialized {
            self.core_mut().set_state(ElementState::Enhanced);
        }
        Ok(())
    }
}

fn wire<E: UiElement>(element: &mut E, widget: &Arc<E::Widget>, event: &str, handler: &EventHandler) {
    match element.connect_event(widget, event, handler) {
        Some(connection) => {
            tracing::trace!(target: targets::ELEMENT, element = element.core().type_name(), event, "event wired");
            element.core_mut().record_connection(event, connection);
        }
        None => element.core().report(
            UiError::event_handling(
                event,
                format!("no signal accepts a {:?} handler", handler.kind()),
            ),
            "connect_event",
        ),
    }
}
