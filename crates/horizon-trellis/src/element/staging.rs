//! Staged state shared by every builder.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_trellis_core::widget::{
    self, GraphicsEffect, KeySequence, Shortcut, Widget, WidgetRef,
};
use horizon_trellis_core::{
    Color, FromVariant, Point, Signal, SignalConnection, Variant, WidgetEvent,
};
use parking_lot::Mutex;

use super::ElementState;
use super::binding::{ElementLink, PerformanceMetrics, PropertyBinding};
use super::event::EventHandler;
use super::lifecycle::ComponentLifecycle;
use crate::accessibility::{AccessibilityManager, AccessibilityProperties, AccessibleRole};
use crate::error::{ErrorManager, UiError};
use crate::logging::targets;

/// Style layer holding builder-level shape declarations.
pub const SHAPE_LAYER: &str = "element.shape";

/// Blur radius of drop shadows added by builders and the enhancer.
pub const SHADOW_BLUR_RADIUS: f64 = 10.0;

/// Offset of drop shadows added by builders and the enhancer.
pub const SHADOW_OFFSET: Point = Point::new(0, 2);

/// Settings applied by the setup hooks rather than through properties.
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    pub role: Option<AccessibleRole>,
    pub tab_index: Option<i32>,
    pub shortcut: Option<KeySequence>,
    pub drop_shadow: Option<Color>,
    pub border_radius: Option<u32>,
    pub show: bool,
}

/// The staging engine behind [`UiElement`](super::UiElement).
///
/// Before the widget exists, property writes and event handlers are
/// recorded. [`attach`](Self::attach) flushes the properties in the order of
/// their last write; afterwards writes go straight to the widget.
///
/// Bound properties take their value from a closure or a signal instead
/// of a one-off write. The lifecycle hooks and performance metrics live in
/// a shared [`ElementLink`] so signal bindings can reach the widget.
pub struct ElementCore<W: Widget> {
    type_name: &'static str,
    widget: Option<Arc<W>>,
    staged: Vec<(String, Variant)>,
    handlers: Vec<(String, EventHandler)>,
    connections: Vec<(String, SignalConnection)>,
    state: ElementState,
    parent: Option<WidgetRef>,
    decorations: Decorations,
    shortcut: Option<Arc<Shortcut>>,
    accessibility: Option<Arc<AccessibilityManager>>,
    bindings: Vec<(String, PropertyBinding)>,
    link: Arc<ElementLink>,
}

impl<W: Widget> ElementCore<W> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            widget: None,
            staged: Vec::new(),
            handlers: Vec::new(),
            connections: Vec::new(),
            state: ElementState::Unbuilt,
            parent: None,
            decorations: Decorations::default(),
            shortcut: None,
            accessibility: None,
            bindings: Vec::new(),
            link: Arc::new(ElementLink::new(type_name)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn widget(&self) -> Option<&Arc<W>> {
        self.widget.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.widget.is_some()
    }

    /// The lifecycle state. A destroyed widget reads as `Disposed`.
    pub fn state(&self) -> ElementState {
        match &self.widget {
            Some(widget) if !widget.widget_base().is_alive() => ElementState::Disposed,
            _ => self.state,
        }
    }

    pub(crate) fn set_state(&mut self, state: ElementState) {
        self.state = state;
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Report through `errors` instead of the global manager.
    pub fn set_error_manager(&mut self, errors: Arc<ErrorManager>) {
        self.link.set_error_manager(errors);
    }

    /// Register accessibility metadata with `manager` instead of the global one.
    pub fn set_accessibility_manager(&mut self, manager: Arc<AccessibilityManager>) {
        self.accessibility = Some(manager);
    }

    pub fn accessibility_manager(&self) -> &AccessibilityManager {
        self.accessibility
            .as_deref()
            .unwrap_or_else(|| AccessibilityManager::global())
    }

    /// Report `error` with this element as the component.
    pub fn report(&self, error: UiError, operation: &str) {
        self.link.report(error, operation);
    }

    pub fn lifecycle(&self) -> &ComponentLifecycle {
        &self.link.lifecycle
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Record a property write, forwarding it when the widget exists.
    ///
    /// Returns `false` when the widget rejected the value.
    pub fn stage(&mut self, name: &str, value: Variant) -> bool {
        let applied = match &self.widget {
            Some(widget) => self.apply(widget, name, value.clone()),
            None => true,
        };
        if applied {
            self.staged.retain(|(staged, _)| staged != name);
            self.staged.push((name.to_string(), value));
        }
        applied
    }

    fn apply(&self, widget: &Arc<W>, name: &str, value: Variant) -> bool {
        self.link.apply(&**widget, name, value)
    }

    /// Move a staged write of `name` to the end of the flush order.
    ///
    /// Range builders use this so a value staged before its range is
    /// clamped against that range. Does nothing once the widget exists.
    pub fn defer_staged(&mut self, name: &str) {
        if self.widget.is_some() {
            return;
        }
        if let Some(index) = self.staged.iter().position(|(staged, _)| staged == name) {
            let entry = self.staged.remove(index);
            self.staged.push(entry);
        }
    }

    pub fn staged(&self) -> &[(String, Variant)] {
        &self.staged
    }

    pub fn staged_value(&self, name: &str) -> Option<&Variant> {
        self.staged
            .iter()
            .find(|(staged, _)| staged == name)
            .map(|(_, value)| value)
    }

    /// The live value once initialized, else the staged one.
    pub fn property<T: FromVariant>(&self, name: &str) -> Option<T> {
        match &self.widget {
            Some(widget) => widget.property(name)?.to::<T>(),
            None => self.staged_value(name)?.to::<T>(),
        }
    }

    pub fn has_property(&self, name: &str) -> bool {
        match &self.widget {
            Some(widget) => {
                let widget: &dyn Widget = &**widget;
                widget.has_property(name)
            }
            None => self.staged_value(name).is_some(),
        }
    }

    /// Names written through this element, in flush order.
    pub fn property_names(&self) -> Vec<String> {
        self.staged.iter().map(|(name, _)| name.clone()).collect()
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Bind `name` to `compute`, evaluating it now and on every refresh.
    pub fn bind_computed(&mut self, name: &str, compute: Arc<dyn Fn() -> Variant + Send + Sync>) {
        let value = compute();
        self.set_binding(name, PropertyBinding::Computed(compute));
        self.stage(name, value);
    }

    /// Bind `name` to `signal` on `owner`, writing `map(args)` on each emit.
    ///
    /// Emits before initialization are held and applied on attach.
    pub fn bind_signal<O, A>(
        &mut self,
        name: &str,
        owner: &Arc<O>,
        signal: fn(&O) -> &Signal<A>,
        map: impl Fn(&A) -> Variant + Send + Sync + 'static,
    ) where
        O: ?Sized + Send + Sync + 'static,
        A: 'static,
    {
        let link = Arc::downgrade(&self.link);
        let property = name.to_string();
        let id = signal(owner).connect(move |args| {
            if let Some(link) = link.upgrade() {
                link.push(&property, map(args));
            }
        });
        self.staged.retain(|(staged, _)| staged != name);
        self.set_binding(name, PropertyBinding::Signal(SignalConnection::new(owner, signal, id)));
    }

    fn set_binding(&mut self, name: &str, binding: PropertyBinding) {
        if let Some(index) = self.bindings.iter().position(|(bound, _)| bound == name) {
            let (_, old) = self.bindings.remove(index);
            old.release();
        }
        tracing::trace!(target: targets::ELEMENT, element = self.type_name, property = name, ?binding, "property bound");
        self.bindings.push((name.to_string(), binding));
    }

    /// Drop the binding of `name`. The property keeps its current value.
    pub fn unbind(&mut self, name: &str) -> bool {
        match self.bindings.iter().position(|(bound, _)| bound == name) {
            Some(index) => {
                self.bindings.remove(index).1.release();
                true
            }
            None => false,
        }
    }

    pub fn bound_properties(&self) -> Vec<String> {
        self.bindings.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Re-evaluate computed bindings into the staged values.
    fn evaluate_bindings(&mut self) {
        let computed: Vec<(String, Variant)> = self
            .bindings
            .iter()
            .filter_map(|(name, binding)| match binding {
                PropertyBinding::Computed(compute) => Some((name.clone(), compute())),
                PropertyBinding::Signal(_) => None,
            })
            .collect();
        for (name, value) in computed {
            match self.staged.iter_mut().find(|(staged, _)| *staged == name) {
                Some((_, slot)) => *slot = value,
                None => self.staged.push((name, value)),
            }
        }
    }

    // =========================================================================
    // Refresh and monitoring
    // =========================================================================

    /// Re-evaluate bindings and write every recorded property again.
    ///
    /// Does nothing before initialization.
    pub fn refresh(&mut self) {
        let Some(widget) = self.widget.clone() else {
            return;
        };
        self.evaluate_bindings();
        let staged = self.staged.clone();
        for (name, value) in staged {
            self.apply(&widget, &name, value);
        }
        tracing::debug!(target: targets::ELEMENT, element = self.type_name, properties = self.staged.len(), "element refreshed");
        self.link.refreshed.emit(());
    }

    /// Mark the widget as needing a repaint.
    pub fn invalidate(&self) {
        if self.widget.is_some() {
            self.link.invalidated.emit(());
        }
    }

    pub fn set_performance_monitoring(&self, enabled: bool) {
        self.link.set_monitoring(enabled);
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.link.metrics()
    }

    /// Run `f`, adding its duration to the metrics when monitoring is on.
    pub fn measure<T>(&self, f: impl FnOnce() -> T) -> T {
        self.link.measure(f)
    }

    /// Emitted with the property name after a live write changed it.
    pub fn property_updated(&self) -> &Signal<String> {
        &self.link.property_updated
    }

    pub fn refreshed(&self) -> &Signal<()> {
        &self.link.refreshed
    }

    pub fn invalidated(&self) -> &Signal<()> {
        &self.link.invalidated
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    /// Record a handler, replacing one with the same name.
    pub fn add_handler(&mut self, name: &str, handler: EventHandler) {
        match self.handlers.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = handler,
            None => self.handlers.push((name.to_string(), handler)),
        }
    }

    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        self.handlers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, handler)| handler)
    }

    pub fn handlers(&self) -> &[(String, EventHandler)] {
        &self.handlers
    }

    /// Keep the connection for `name`, dropping an older one.
    pub(crate) fn record_connection(&mut self, name: &str, connection: SignalConnection) {
        if let Some(index) = self.connections.iter().position(|(existing, _)| existing == name) {
            let (_, old) = self.connections.remove(index);
            old.disconnect();
        }
        self.connections.push((name.to_string(), connection));
    }

    /// Number of live handler connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // =========================================================================
    // Decorations
    // =========================================================================

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    pub fn decorations_mut(&mut self) -> &mut Decorations {
        &mut self.decorations
    }

    pub fn parent(&self) -> Option<&WidgetRef> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: WidgetRef) {
        self.parent = Some(parent);
    }

    pub fn shortcut(&self) -> Option<&Arc<Shortcut>> {
        self.shortcut.as_ref()
    }

    // =========================================================================
    // Initialization steps
    // =========================================================================

    /// Take the freshly created widget and flush staged properties.
    pub(crate) fn attach(&mut self, widget: Arc<W>) {
        tracing::trace!(target: targets::ELEMENT, element = self.type_name, staged = self.staged.len(), "flushing staged properties");
        let shared: WidgetRef = widget.clone();
        self.link.set_widget(Some(&shared));
        let mut rejected = Vec::new();
        for (name, value) in &self.staged {
            if !self.apply(&widget, name, value.clone()) {
                rejected.push(name.clone());
            }
        }
        self.staged.retain(|(name, _)| !rejected.contains(name));
        for (name, value) in self.link.take_pending() {
            self.apply(&widget, &name, value);
        }
        self.widget = Some(widget);
    }

    /// Mount the lifecycle and unmount it when the widget is destroyed.
    pub(crate) fn mount(&self, widget: &Arc<W>) {
        let link = Arc::downgrade(&self.link);
        widget.widget_base().destroyed().connect(move |_| {
            if let Some(link) = link.upgrade() {
                link.lifecycle.unmount();
            }
        });
        self.link.lifecycle.mount(widget.object_id());
    }

    /// Unmount, drop every connection and binding, then destroy the widget.
    ///
    /// The element ends up `Disposed` with nothing staged.
    pub fn cleanup(&mut self) {
        self.link.lifecycle.unmount();
        for (_, connection) in self.connections.drain(..) {
            connection.disconnect();
        }
        for (_, binding) in self.bindings.drain(..) {
            binding.release();
        }
        self.handlers.clear();
        self.staged.clear();
        self.shortcut = None;
        self.link.set_widget(None);
        if let Some(widget) = self.widget.take().filter(|w| w.widget_base().is_alive()) {
            let id = widget.object_id();
            let widget: WidgetRef = widget;
            if let Err(err) = widget::destroy(&widget) {
                self.report(err.into(), "cleanup");
            }
            tracing::debug!(target: targets::ELEMENT, element = self.type_name, ?id, "element cleaned up");
        }
        self.state = ElementState::Disposed;
    }

    pub(crate) fn attach_parent(&self, widget: &Arc<W>) {
        let Some(parent) = &self.parent else {
            return;
        };
        let child: WidgetRef = widget.clone();
        if let Err(err) = widget::set_parent(&child, Some(parent)) {
            self.report(err.into(), "set_parent");
        }
    }

    /// Register role and tab index with the accessibility manager.
    pub(crate) fn apply_accessibility(&self, widget: &Arc<W>) {
        let decorations = &self.decorations;
        if let Some(index) = decorations.tab_index {
            widget.widget_base().set_tab_index(index);
        }
        if decorations.role.is_none() && decorations.tab_index.is_none() {
            return;
        }
        let base = widget.widget_base();
        let properties = AccessibilityProperties {
            name: base.accessible_name(),
            description: base.accessible_description(),
            help_text: base.tool_tip(),
            role: decorations.role.unwrap_or_default(),
            tab_index: decorations.tab_index.unwrap_or(-1),
            ..Default::default()
        };
        self.accessibility_manager().register(widget, properties);
    }

    pub(crate) fn apply_visuals(&self, widget: &Arc<W>) {
        let base = widget.widget_base();
        if let Some(color) = self.decorations.drop_shadow {
            base.set_graphics_effect(Some(drop_shadow(color)));
        }
        if let Some(radius) = self.decorations.border_radius {
            base.set_style_layer(SHAPE_LAYER, [("border-radius", format!("{radius}px"))]);
        }
    }

    pub(crate) fn apply_shortcut(&mut self, widget: &Arc<W>) {
        let Some(sequence) = self.decorations.shortcut.clone() else {
            return;
        };
        match Shortcut::for_widget(sequence, widget.object_id()) {
            Ok(shortcut) => {
                let target: WidgetRef = widget.clone();
                connect_activation(&shortcut, &target);
                keep_with_widget(&*target, shortcut.clone());
                self.shortcut = Some(shortcut);
            }
            Err(err) => self.report(err.into(), "shortcut"),
        }
    }
}

impl<W: Widget> fmt::Debug for ElementCore<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCore")
            .field("type_name", &self.type_name)
            .field("widget", &self.widget.as_ref().map(|w| w.object_id()))
            .field("staged", &self.staged)
            .field("handlers", &self.handlers.len())
            .field("bindings", &self.bindings)
            .field("state", &self.state())
            .finish()
    }
}

pub(crate) fn drop_shadow(color: Color) -> GraphicsEffect {
    GraphicsEffect::DropShadow {
        color,
        blur_radius: SHADOW_BLUR_RADIUS,
        offset: SHADOW_OFFSET,
    }
}

/// Buttons are clicked; other widgets take focus.
pub(crate) fn activate_widget(widget: &dyn Widget) {
    match widget.as_button() {
        Some(button) => button.click(),
        None => {
            widget.send_event(&WidgetEvent::FocusIn);
        }
    }
}

pub(crate) fn connect_activation(shortcut: &Shortcut, widget: &WidgetRef) {
    let target: Weak<dyn Widget> = Arc::downgrade(widget);
    shortcut.activated.connect(move |_| {
        if let Some(widget) = target.upgrade() {
            activate_widget(widget.as_ref());
        }
    });
}

/// Keep `value` alive until `widget` is destroyed.
pub(crate) fn keep_with_widget<T: Send + 'static>(widget: &dyn Widget, value: T) {
    let slot = Mutex::new(Some(value));
    widget.widget_base().destroyed().connect(move |_| {
        slot.lock().take();
    });
}
