//! Widget base implementation.
//!
//! This module provides `WidgetBase`, the common state shared by every native
//! widget: the object-tree entry, the reflective base properties, style
//! layers, the graphics effect slot and installed event filters.

use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::application::Application;
use crate::event::WidgetEvent;
use crate::logging::targets;
use crate::object::{ObjectBase, ObjectId, ObjectResult, global_registry};
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::types::{Color, Font, Point, Rect, Size};
use crate::variant::{FromVariant, Variant};

/// Largest width or height a widget may take.
pub const WIDGET_SIZE_MAX: i32 = 16_777_215;

/// How a widget accepts keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPolicy {
    NoFocus,
    TabFocus,
    ClickFocus,
    #[default]
    StrongFocus,
}

impl FocusPolicy {
    /// The name used by the `focusPolicy` property.
    pub fn name(self) -> &'static str {
        match self {
            Self::NoFocus => "NoFocus",
            Self::TabFocus => "TabFocus",
            Self::ClickFocus => "ClickFocus",
            Self::StrongFocus => "StrongFocus",
        }
    }

    /// Parse a policy name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NoFocus" => Some(Self::NoFocus),
            "TabFocus" => Some(Self::TabFocus),
            "ClickFocus" => Some(Self::ClickFocus),
            "StrongFocus" => Some(Self::StrongFocus),
            _ => None,
        }
    }

    /// Whether the widget takes focus when tabbing.
    pub fn accepts_tab(self) -> bool {
        matches!(self, Self::TabFocus | Self::StrongFocus)
    }
}

/// A visual effect attached to a widget. A widget holds at most one.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsEffect {
    DropShadow {
        color: Color,
        blur_radius: f64,
        offset: Point,
    },
    Opacity(f64),
}

new_key_type! {
    /// Identifies an installed event filter.
    pub struct EventFilterId;
}

/// An event filter. Returning `true` consumes the event.
pub type EventFilter = Arc<dyn Fn(ObjectId, &WidgetEvent) -> bool + Send + Sync>;

type StyleLayer = (String, Vec<(String, String)>);

/// Extract a typed value or report a type mismatch.
pub fn expect<T: FromVariant>(value: &Variant, expected: &'static str) -> Result<T, PropertyError> {
    value.to::<T>().ok_or(PropertyError::TypeMismatch {
        expected,
        got: value.type_name(),
    })
}

/// The base implementation for all widgets.
///
/// Widget implementations include this as a field and return it from
/// [`Widget::widget_base`](super::Widget::widget_base); the default trait
/// methods route the base properties here.
pub struct WidgetBase {
    object: ObjectBase,
    enabled: Property<bool>,
    visible: Property<bool>,
    shown: Property<bool>,
    tool_tip: Property<String>,
    user_style_sheet: Property<String>,
    style_layers: RwLock<Vec<StyleLayer>>,
    opacity: Property<f64>,
    geometry: Property<Rect>,
    minimum_size: Property<Size>,
    maximum_size: Property<Size>,
    font: Property<Option<Font>>,
    accessible_name: Property<String>,
    accessible_description: Property<String>,
    focus_policy: Property<FocusPolicy>,
    tab_index: Property<i32>,
    has_focus: Property<bool>,
    under_mouse: Property<bool>,
    graphics_effect: Property<Option<GraphicsEffect>>,
    filters: RwLock<SlotMap<EventFilterId, EventFilter>>,

    /// Emitted when the enabled state changes.
    pub enabled_changed: Signal<bool>,
    /// Emitted when visibility changes.
    pub visible_changed: Signal<bool>,
    /// Emitted when the tooltip changes.
    pub tool_tip_changed: Signal<String>,
    /// Emitted with the effective style sheet when it changes.
    pub style_sheet_changed: Signal<String>,
    /// Emitted when the opacity changes.
    pub opacity_changed: Signal<f64>,
    /// Emitted when the geometry changes.
    pub geometry_changed: Signal<Rect>,
    /// Emitted when the widget gains (`true`) or loses focus.
    pub focus_changed: Signal<bool>,
    /// Emitted when the pointer enters (`true`) or leaves.
    pub hover_changed: Signal<bool>,
    destroyed: Arc<Signal<ObjectId>>,
}

impl WidgetBase {
    /// Reflective property names every widget supports.
    pub const PROPERTY_NAMES: &'static [&'static str] = &[
        "objectName",
        "enabled",
        "visible",
        "toolTip",
        "styleSheet",
        "opacity",
        "pos",
        "size",
        "geometry",
        "font",
        "accessibleName",
        "accessibleDescription",
        "focusPolicy",
        "tabIndex",
        "minimumSize",
        "maximumSize",
        "hasFocus",
        "underMouse",
    ];

    /// Create a widget base, registering the widget of type `T`.
    pub fn new<T: 'static>() -> ObjectResult<Self> {
        let object = ObjectBase::new::<T>()?;
        let destroyed = Arc::new(Signal::new());
        let notify = destroyed.clone();
        global_registry()?.on_destroyed(object.id(), move |id| notify.emit(id));

        Ok(Self {
            object,
            enabled: Property::new(true),
            visible: Property::new(true),
            shown: Property::new(false),
            tool_tip: Property::default(),
            user_style_sheet: Property::default(),
            style_layers: RwLock::new(Vec::new()),
            opacity: Property::new(1.0),
            geometry: Property::new(Rect::new(0, 0, 100, 30)),
            minimum_size: Property::new(Size::ZERO),
            maximum_size: Property::new(Size::new(WIDGET_SIZE_MAX, WIDGET_SIZE_MAX)),
            font: Property::new(None),
            accessible_name: Property::default(),
            accessible_description: Property::default(),
            focus_policy: Property::default(),
            tab_index: Property::new(-1),
            has_focus: Property::new(false),
            under_mouse: Property::new(false),
            graphics_effect: Property::new(None),
            filters: RwLock::new(SlotMap::with_key()),
            enabled_changed: Signal::new(),
            visible_changed: Signal::new(),
            tool_tip_changed: Signal::new(),
            style_sheet_changed: Signal::new(),
            opacity_changed: Signal::new(),
            geometry_changed: Signal::new(),
            focus_changed: Signal::new(),
            hover_changed: Signal::new(),
            destroyed,
        })
    }

    // =========================================================================
    // Object integration
    // =========================================================================

    pub fn object_id(&self) -> ObjectId {
        self.object.id()
    }

    pub fn name(&self) -> String {
        self.object.name()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.object.set_name(name);
    }

    pub fn parent_id(&self) -> Option<ObjectId> {
        self.object.parent()
    }

    pub fn children_ids(&self) -> Vec<ObjectId> {
        self.object.children()
    }

    /// Whether the widget is still part of the object tree.
    pub fn is_alive(&self) -> bool {
        self.object.is_alive()
    }

    /// Emitted once when the widget is destroyed.
    pub fn destroyed(&self) -> &Signal<ObjectId> {
        &self.destroyed
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        if self.enabled.set(enabled) {
            self.enabled_changed.emit(enabled);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        if self.visible.set(visible) {
            self.visible_changed.emit(visible);
        }
    }

    /// Make the widget visible and mark it shown.
    pub fn show(&self) {
        self.shown.set(true);
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    /// Whether [`show`](Self::show) has been called.
    pub fn is_shown(&self) -> bool {
        self.shown.get()
    }

    pub fn tool_tip(&self) -> String {
        self.tool_tip.get()
    }

    pub fn set_tool_tip(&self, text: impl Into<String>) {
        let text = text.into();
        if self.tool_tip.set(text.clone()) {
            self.tool_tip_changed.emit(text);
        }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.get()
    }

    /// Set the opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&self, opacity: f64) {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        if self.opacity.set(opacity) {
            self.opacity_changed.emit(opacity);
        }
    }

    // =========================================================================
    // Style sheets
    // =========================================================================

    /// The effective style sheet: the user sheet followed by every layer.
    pub fn style_sheet(&self) -> String {
        let mut sheet = self.user_style_sheet.get();
        for (_, declarations) in self.style_layers.read().iter() {
            for (property, value) in declarations {
                if !sheet.is_empty() && !sheet.ends_with(' ') {
                    sheet.push(' ');
                }
                sheet.push_str(&format!("{property}: {value};"));
            }
        }
        sheet
    }

    /// The style sheet set directly on the widget, without layers.
    pub fn user_style_sheet(&self) -> String {
        self.user_style_sheet.get()
    }

    pub fn set_style_sheet(&self, sheet: impl Into<String>) {
        let before = self.style_sheet();
        self.user_style_sheet.set(sheet.into());
        self.notify_style_sheet(before);
    }

    /// Replace (or append) a named layer of declarations.
    pub fn set_style_layer<I, P, V>(&self, name: &str, declarations: I)
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<String>,
        V: Into<String>,
    {
        let declarations: Vec<(String, String)> = declarations
            .into_iter()
            .map(|(p, v)| (p.into(), v.into()))
            .collect();
        let before = self.style_sheet();
        {
            let mut layers = self.style_layers.write();
            match layers.iter_mut().find(|(layer, _)| layer == name) {
                Some((_, existing)) => *existing = declarations,
                None => layers.push((name.to_string(), declarations)),
            }
        }
        self.notify_style_sheet(before);
    }

    /// Remove a named layer. Returns whether it existed.
    pub fn clear_style_layer(&self, name: &str) -> bool {
        let before = self.style_sheet();
        let removed = {
            let mut layers = self.style_layers.write();
            let len = layers.len();
            layers.retain(|(layer, _)| layer != name);
            layers.len() != len
        };
        self.notify_style_sheet(before);
        removed
    }

    pub fn style_layer(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.style_layers
            .read()
            .iter()
            .find(|(layer, _)| layer == name)
            .map(|(_, declarations)| declarations.clone())
    }

    pub fn style_layer_names(&self) -> Vec<String> {
        self.style_layers.read().iter().map(|(name, _)| name.clone()).collect()
    }

    fn notify_style_sheet(&self, before: String) {
        let after = self.style_sheet();
        if after != before {
            self.style_sheet_changed.emit(after);
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn geometry(&self) -> Rect {
        self.geometry.get()
    }

    /// Set the geometry; the size is bounded by the minimum and maximum sizes.
    pub fn set_geometry(&self, rect: Rect) {
        let size = rect.size.bounded_to(self.minimum_size(), self.maximum_size());
        let rect = Rect::from_parts(rect.origin, size);
        if self.geometry.set(rect) {
            self.geometry_changed.emit(rect);
        }
    }

    pub fn pos(&self) -> Point {
        self.geometry().origin
    }

    pub fn set_pos(&self, pos: Point) {
        self.set_geometry(Rect::from_parts(pos, self.size()));
    }

    pub fn size(&self) -> Size {
        self.geometry().size
    }

    pub fn set_size(&self, size: Size) {
        self.set_geometry(Rect::from_parts(self.pos(), size));
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.set_size(Size::new(width, height));
    }

    pub fn minimum_size(&self) -> Size {
        self.minimum_size.get()
    }

    pub fn set_minimum_size(&self, size: Size) {
        self.minimum_size.set(size);
        self.set_size(self.size());
    }

    pub fn maximum_size(&self) -> Size {
        self.maximum_size.get()
    }

    pub fn set_maximum_size(&self, size: Size) {
        self.maximum_size.set(size);
        self.set_size(self.size());
    }

    // =========================================================================
    // Font, accessibility and focus
    // =========================================================================

    /// The widget font, falling back to the application font.
    pub fn font(&self) -> Font {
        self.font.get().unwrap_or_else(|| {
            Application::try_instance()
                .map(Application::font)
                .unwrap_or_default()
        })
    }

    /// The font set directly on this widget, if any.
    pub fn explicit_font(&self) -> Option<Font> {
        self.font.get()
    }

    pub fn set_font(&self, font: Font) {
        self.font.set(Some(font));
    }

    /// Revert to the application font.
    pub fn unset_font(&self) {
        self.font.set(None);
    }

    pub fn accessible_name(&self) -> String {
        self.accessible_name.get()
    }

    pub fn set_accessible_name(&self, name: impl Into<String>) {
        self.accessible_name.set(name.into());
    }

    pub fn accessible_description(&self) -> String {
        self.accessible_description.get()
    }

    pub fn set_accessible_description(&self, description: impl Into<String>) {
        self.accessible_description.set(description.into());
    }

    pub fn focus_policy(&self) -> FocusPolicy {
        self.focus_policy.get()
    }

    pub fn set_focus_policy(&self, policy: FocusPolicy) {
        self.focus_policy.set(policy);
    }

    /// Position in the tab order; `-1` means natural order.
    pub fn tab_index(&self) -> i32 {
        self.tab_index.get()
    }

    pub fn set_tab_index(&self, index: i32) {
        self.tab_index.set(index);
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus.get()
    }

    pub fn is_under_mouse(&self) -> bool {
        self.under_mouse.get()
    }

    pub fn graphics_effect(&self) -> Option<GraphicsEffect> {
        self.graphics_effect.get()
    }

    /// Attach an effect, replacing the previous one. `None` removes it.
    pub fn set_graphics_effect(&self, effect: Option<GraphicsEffect>) {
        self.graphics_effect.set(effect);
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Install an event filter; filters run in installation order.
    pub fn install_event_filter<F>(&self, filter: F) -> EventFilterId
    where
        F: Fn(ObjectId, &WidgetEvent) -> bool + Send + Sync + 'static,
    {
        self.filters.write().insert(Arc::new(filter))
    }

    pub fn remove_event_filter(&self, id: EventFilterId) -> bool {
        self.filters.write().remove(id).is_some()
    }

    pub fn event_filter_count(&self) -> usize {
        self.filters.read().len()
    }

    /// Run the installed filters; `true` if one consumed the event.
    pub(crate) fn filter_event(&self, event: &WidgetEvent) -> bool {
        let filters: Vec<EventFilter> = self.filters.read().values().cloned().collect();
        let id = self.object_id();
        filters.iter().any(|filter| filter(id, event))
    }

    /// Track focus and hover state.
    pub(crate) fn apply_state_event(&self, event: &WidgetEvent) {
        match event {
            WidgetEvent::FocusIn | WidgetEvent::FocusOut => {
                let focused = matches!(event, WidgetEvent::FocusIn);
                if self.has_focus.set(focused) {
                    self.focus_changed.emit(focused);
                }
            }
            WidgetEvent::Enter | WidgetEvent::Leave => {
                let hovered = matches!(event, WidgetEvent::Enter);
                if self.under_mouse.set(hovered) {
                    self.hover_changed.emit(hovered);
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Reflective properties
    // =========================================================================

    /// Set a base property by name.
    pub fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "objectName" => self.set_name(expect::<String>(&value, "string")?),
            "enabled" => self.set_enabled(expect(&value, "bool")?),
            "visible" => self.set_visible(expect(&value, "bool")?),
            "toolTip" => self.set_tool_tip(expect::<String>(&value, "string")?),
            "styleSheet" => self.set_style_sheet(expect::<String>(&value, "string")?),
            "opacity" => self.set_opacity(expect(&value, "double")?),
            "pos" => self.set_pos(expect(&value, "point")?),
            "size" => self.set_size(expect(&value, "size")?),
            "geometry" => self.set_geometry(expect(&value, "rect")?),
            "font" => self.set_font(expect(&value, "font")?),
            "accessibleName" => self.set_accessible_name(expect::<String>(&value, "string")?),
            "accessibleDescription" => {
                self.set_accessible_description(expect::<String>(&value, "string")?)
            }
            "focusPolicy" => {
                let policy = match &value {
                    Variant::String(name) => FocusPolicy::from_name(name),
                    _ => None,
                };
                self.set_focus_policy(policy.ok_or(PropertyError::TypeMismatch {
                    expected: "focus policy name",
                    got: value.type_name(),
                })?);
            }
            "tabIndex" => self.set_tab_index(expect(&value, "int")?),
            "minimumSize" => self.set_minimum_size(expect(&value, "size")?),
            "maximumSize" => self.set_maximum_size(expect(&value, "size")?),
            "hasFocus" | "underMouse" => return Err(PropertyError::read_only(name)),
            _ => return Err(PropertyError::not_found(name)),
        }
        tracing::trace!(target: targets::PROPERTY, id = ?self.object_id(), property = name, "base property set");
        Ok(())
    }

    /// Read a base property by name.
    pub fn property(&self, name: &str) -> Option<Variant> {
        let value = match name {
            "objectName" => self.name().into(),
            "enabled" => self.is_enabled().into(),
            "visible" => self.is_visible().into(),
            "toolTip" => self.tool_tip().into(),
            "styleSheet" => self.style_sheet().into(),
            "opacity" => self.opacity().into(),
            "pos" => self.pos().into(),
            "size" => self.size().into(),
            "geometry" => self.geometry().into(),
            "font" => self.font().into(),
            "accessibleName" => self.accessible_name().into(),
            "accessibleDescription" => self.accessible_description().into(),
            "focusPolicy" => self.focus_policy().name().into(),
            "tabIndex" => self.tab_index().into(),
            "minimumSize" => self.minimum_size().into(),
            "maximumSize" => self.maximum_size().into(),
            "hasFocus" => self.has_focus().into(),
            "underMouse" => self.is_under_mouse().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.object_id())
            .field("enabled", &self.is_enabled())
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(WidgetBase: Send, Sync);
