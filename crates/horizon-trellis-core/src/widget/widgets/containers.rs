//! Container widgets: group box, scroll area, splitter and frame.
//!
//! Containers hold their contents as ordinary children in the object tree;
//! attaching a widget here is the same as [`set_parent`](crate::widget::set_parent).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, MouseButton, WidgetEvent};
use crate::object::{ObjectId, ObjectResult};
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{
    Widget, WidgetBase, WidgetRef, child_widgets, expect, find_widget, register_widget, set_parent,
};

use super::property_names_with;
use super::range::RangeModel;
use super::range_widgets::{Orientation, expect_orientation};

fn expect_name<T>(
    value: &Variant,
    expected: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, PropertyError> {
    match value {
        Variant::String(name) => parse(name),
        _ => None,
    }
    .ok_or(PropertyError::TypeMismatch {
        expected,
        got: value.type_name(),
    })
}

// =============================================================================
// GroupBox
// =============================================================================

/// A titled group of child widgets.
///
/// A checkable group box enables its children only while it is checked.
pub struct GroupBox {
    base: WidgetBase,
    title: Property<String>,
    checkable: Property<bool>,
    checked: Property<bool>,
    flat: Property<bool>,

    pub toggled: Signal<bool>,
    pub clicked: Signal<bool>,
}

impl GroupBox {
    const CLASS_PROPERTIES: &'static [&'static str] = &["title", "checkable", "checked", "flat"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_title("")
    }

    pub fn with_title(title: impl Into<String>) -> ObjectResult<Arc<Self>> {
        let group = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            title: Property::new(title.into()),
            checkable: Property::new(false),
            checked: Property::new(true),
            flat: Property::new(false),
            toggled: Signal::new(),
            clicked: Signal::new(),
        });
        register_widget(&group);
        Ok(group)
    }

    pub fn title(&self) -> String {
        self.title.get()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.title.set(title.into());
    }

    pub fn is_checkable(&self) -> bool {
        self.checkable.get()
    }

    /// Making the group box non-checkable re-enables its children.
    pub fn set_checkable(&self, checkable: bool) {
        if self.checkable.set(checkable) && !checkable {
            self.set_checked(true);
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    pub fn set_checked(&self, checked: bool) {
        if checked == self.is_checked() || (!checked && !self.is_checkable()) {
            return;
        }
        self.checked.set(checked);
        for child in child_widgets(self) {
            child.widget_base().set_enabled(checked);
        }
        self.toggled.emit(checked);
    }

    pub fn is_flat(&self) -> bool {
        self.flat.get()
    }

    pub fn set_flat(&self, flat: bool) {
        self.flat.set(flat);
    }

    fn click(&self) {
        if self.is_checkable() && self.base.is_enabled() {
            self.set_checked(!self.is_checked());
            self.clicked.emit(self.is_checked());
        }
    }
}

impl Widget for GroupBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "GroupBox"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "title" => self.set_title(expect::<String>(&value, "string")?),
            "checkable" => self.set_checkable(expect(&value, "bool")?),
            "checked" => self.set_checked(expect(&value, "bool")?),
            "flat" => self.set_flat(expect(&value, "bool")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "title" => Some(self.title().into()),
            "checkable" => Some(self.is_checkable().into()),
            "checked" => Some(self.is_checked().into()),
            "flat" => Some(self.is_flat().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key: Key::Space, .. }
            | WidgetEvent::MouseRelease {
                button: MouseButton::Left,
                ..
            } if self.is_checkable() => {
                self.click();
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// ScrollArea
// =============================================================================

/// When a scroll bar is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBarPolicy {
    #[default]
    AsNeeded,
    AlwaysOff,
    AlwaysOn,
}

/// A scrolling viewport onto a single content widget.
pub struct ScrollArea {
    base: WidgetBase,
    content: RwLock<Option<ObjectId>>,
    widget_resizable: Property<bool>,
    horizontal: RwLock<RangeModel<i32>>,
    vertical: RwLock<RangeModel<i32>>,
    horizontal_policy: Property<ScrollBarPolicy>,
    vertical_policy: Property<ScrollBarPolicy>,

    /// Emitted with `(horizontal, vertical)` scroll values.
    pub scrolled: Signal<(i32, i32)>,
}

impl ScrollArea {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "widgetResizable",
        "horizontalScrollValue",
        "verticalScrollValue",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let area = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            content: RwLock::new(None),
            widget_resizable: Property::new(false),
            horizontal: RwLock::new(RangeModel::new(0, 0, 20, 100)),
            vertical: RwLock::new(RangeModel::new(0, 0, 20, 100)),
            horizontal_policy: Property::default(),
            vertical_policy: Property::default(),
            scrolled: Signal::new(),
        });
        register_widget(&area);
        Ok(area)
    }

    /// Make `content` the scrolled widget, replacing and destroying any
    /// previous one. Scroll ranges follow the content size.
    pub fn set_widget(self: &Arc<Self>, content: &WidgetRef) -> ObjectResult<()> {
        if let Some(previous) = self.take_widget() {
            crate::widget::destroy(&previous)?;
        }
        let this: WidgetRef = self.clone();
        set_parent(content, Some(&this))?;
        *self.content.write() = Some(content.object_id());
        self.update_ranges();
        Ok(())
    }

    pub fn widget(&self) -> Option<WidgetRef> {
        (*self.content.read()).and_then(find_widget)
    }

    /// Detach the content widget and hand it back to the caller.
    pub fn take_widget(&self) -> Option<WidgetRef> {
        let content = self.content.write().take().and_then(find_widget)?;
        set_parent(&content, None).ok()?;
        Some(content)
    }

    pub fn widget_resizable(&self) -> bool {
        self.widget_resizable.get()
    }

    pub fn set_widget_resizable(&self, resizable: bool) {
        self.widget_resizable.set(resizable);
        self.update_ranges();
    }

    /// Recompute the scroll ranges from the viewport and content sizes.
    pub fn update_ranges(&self) {
        let viewport = self.base.size();
        let (width, height) = match self.widget() {
            Some(_) if self.widget_resizable() => (viewport.width, viewport.height),
            Some(content) => {
                let size = content.widget_base().size();
                (size.width, size.height)
            }
            None => (0, 0),
        };
        let overflow = |content: i32, view: i32| (content - view).max(0);
        let changed_h = self
            .horizontal
            .write()
            .set_range(0, overflow(width, viewport.width));
        let changed_v = self
            .vertical
            .write()
            .set_range(0, overflow(height, viewport.height));
        if changed_h || changed_v {
            self.scrolled.emit(self.scroll_values());
        }
    }

    pub fn scroll_values(&self) -> (i32, i32) {
        (self.horizontal.read().value(), self.vertical.read().value())
    }

    pub fn horizontal_maximum(&self) -> i32 {
        self.horizontal.read().maximum()
    }

    pub fn vertical_maximum(&self) -> i32 {
        self.vertical.read().maximum()
    }

    pub fn set_horizontal_scroll_value(&self, value: i32) {
        let changed = self.horizontal.write().set_value(value);
        if changed {
            self.scrolled.emit(self.scroll_values());
        }
    }

    pub fn set_vertical_scroll_value(&self, value: i32) {
        let changed = self.vertical.write().set_value(value);
        if changed {
            self.scrolled.emit(self.scroll_values());
        }
    }

    pub fn horizontal_scroll_bar_policy(&self) -> ScrollBarPolicy {
        self.horizontal_policy.get()
    }

    pub fn set_horizontal_scroll_bar_policy(&self, policy: ScrollBarPolicy) {
        self.horizontal_policy.set(policy);
    }

    pub fn vertical_scroll_bar_policy(&self) -> ScrollBarPolicy {
        self.vertical_policy.get()
    }

    pub fn set_vertical_scroll_bar_policy(&self, policy: ScrollBarPolicy) {
        self.vertical_policy.set(policy);
    }

    fn scroll_vertically(&self, apply: impl FnOnce(&mut RangeModel<i32>) -> bool) -> bool {
        let changed = apply(&mut self.vertical.write());
        if changed {
            self.scrolled.emit(self.scroll_values());
        }
        true
    }
}

impl Widget for ScrollArea {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "ScrollArea"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "widgetResizable" => self.set_widget_resizable(expect(&value, "bool")?),
            "horizontalScrollValue" => self.set_horizontal_scroll_value(expect(&value, "int")?),
            "verticalScrollValue" => self.set_vertical_scroll_value(expect(&value, "int")?),
            _ => {
                self.base.set_property(name, value)?;
                if matches!(name, "size" | "geometry") {
                    self.update_ranges();
                }
            }
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "widgetResizable" => Some(self.widget_resizable().into()),
            "horizontalScrollValue" => Some(self.scroll_values().0.into()),
            "verticalScrollValue" => Some(self.scroll_values().1.into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        let WidgetEvent::KeyPress { key, .. } = event else {
            return false;
        };
        match key {
            Key::ArrowDown => self.scroll_vertically(|m| m.step_by(1)),
            Key::ArrowUp => self.scroll_vertically(|m| m.step_by(-1)),
            Key::PageDown => self.scroll_vertically(|m| m.page_by(1)),
            Key::PageUp => self.scroll_vertically(|m| m.page_by(-1)),
            Key::Home => self.scroll_vertically(|m| m.set_value(i32::MIN)),
            Key::End => self.scroll_vertically(|m| m.set_value(i32::MAX)),
            _ => false,
        }
    }
}

// =============================================================================
// Splitter
// =============================================================================

/// Children laid out side by side with draggable handles between them.
///
/// Sizes are tracked per child in insertion order. Moving a handle trades
/// space between the two neighbouring children.
pub struct Splitter {
    base: WidgetBase,
    orientation: Property<Orientation>,
    handle_width: Property<i32>,
    children_collapsible: Property<bool>,
    panes: RwLock<Vec<(ObjectId, i32)>>,

    /// Emitted with `(position, handle index)` after a handle moves.
    pub splitter_moved: Signal<(i32, usize)>,
}

impl Splitter {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["orientation", "handleWidth", "childrenCollapsible", "sizes"];

    pub fn new(orientation: Orientation) -> ObjectResult<Arc<Self>> {
        let splitter = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            orientation: Property::new(orientation),
            handle_width: Property::new(5),
            children_collapsible: Property::new(true),
            panes: RwLock::new(Vec::new()),
            splitter_moved: Signal::new(),
        });
        register_widget(&splitter);
        Ok(splitter)
    }

    /// Append a pane. Its initial size is its current extent along the
    /// splitter's orientation.
    pub fn add_widget(self: &Arc<Self>, pane: &WidgetRef) -> ObjectResult<()> {
        let this: WidgetRef = self.clone();
        set_parent(pane, Some(&this))?;
        let size = pane.widget_base().size();
        let extent = match self.orientation() {
            Orientation::Horizontal => size.width,
            Orientation::Vertical => size.height,
        };
        self.panes.write().push((pane.object_id(), extent));
        Ok(())
    }

    /// Live panes in order; destroyed panes are dropped from the layout.
    pub fn widgets(&self) -> Vec<WidgetRef> {
        let mut panes = self.panes.write();
        panes.retain(|(id, _)| find_widget(*id).is_some());
        panes.iter().filter_map(|(id, _)| find_widget(*id)).collect()
    }

    pub fn count(&self) -> usize {
        self.widgets().len()
    }

    pub fn sizes(&self) -> Vec<i32> {
        self.widgets();
        self.panes.read().iter().map(|(_, size)| *size).collect()
    }

    /// Extra entries are ignored; missing entries keep their current size.
    pub fn set_sizes(&self, sizes: &[i32]) {
        self.widgets();
        let floor = self.min_pane_size();
        for (pane, size) in self.panes.write().iter_mut().zip(sizes) {
            pane.1 = (*size).max(floor);
        }
    }

    fn min_pane_size(&self) -> i32 {
        if self.children_collapsible() { 0 } else { 1 }
    }

    /// Move handle `index` (between panes `index - 1` and `index`) by
    /// `delta`. Returns the new handle position, or `None` for an invalid
    /// handle.
    pub fn move_handle(&self, index: usize, delta: i32) -> Option<i32> {
        self.widgets();
        let floor = self.min_pane_size();
        let position = {
            let mut panes = self.panes.write();
            if index == 0 || index >= panes.len() {
                return None;
            }
            let before = panes[index - 1].1;
            let after = panes[index].1;
            let delta = delta.clamp(floor - before, after - floor);
            panes[index - 1].1 = before + delta;
            panes[index].1 = after - delta;
            let handle = self.handle_width();
            panes[..index]
                .iter()
                .map(|(_, size)| size + handle)
                .sum::<i32>()
                - handle
        };
        self.splitter_moved.emit((position, index));
        Some(position)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.get()
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.orientation.set(orientation);
    }

    pub fn handle_width(&self) -> i32 {
        self.handle_width.get()
    }

    pub fn set_handle_width(&self, width: i32) {
        self.handle_width.set(width.max(0));
    }

    pub fn children_collapsible(&self) -> bool {
        self.children_collapsible.get()
    }

    pub fn set_children_collapsible(&self, collapsible: bool) {
        self.children_collapsible.set(collapsible);
        if !collapsible {
            let sizes = self.sizes();
            self.set_sizes(&sizes);
        }
    }
}

impl Widget for Splitter {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "Splitter"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "orientation" => self.set_orientation(expect_orientation(&value)?),
            "handleWidth" => self.set_handle_width(expect(&value, "int")?),
            "childrenCollapsible" => self.set_children_collapsible(expect(&value, "bool")?),
            "sizes" => {
                let sizes: Vec<String> = expect(&value, "stringlist")?;
                let sizes = sizes
                    .iter()
                    .map(|s| s.trim().parse::<i32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| PropertyError::TypeMismatch {
                        expected: "list of integers",
                        got: value.type_name(),
                    })?;
                self.set_sizes(&sizes);
            }
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "orientation" => Some(self.orientation().name().into()),
            "handleWidth" => Some(self.handle_width().into()),
            "childrenCollapsible" => Some(self.children_collapsible().into()),
            "sizes" => Some(
                self.sizes()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .into(),
            ),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }
}

// =============================================================================
// Frame
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameShape {
    #[default]
    NoFrame,
    Box,
    Panel,
    StyledPanel,
    HLine,
    VLine,
}

impl FrameShape {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoFrame => "NoFrame",
            Self::Box => "Box",
            Self::Panel => "Panel",
            Self::StyledPanel => "StyledPanel",
            Self::HLine => "HLine",
            Self::VLine => "VLine",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::NoFrame,
            Self::Box,
            Self::Panel,
            Self::StyledPanel,
            Self::HLine,
            Self::VLine,
        ]
        .into_iter()
        .find(|shape| shape.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameShadow {
    #[default]
    Plain,
    Raised,
    Sunken,
}

impl FrameShadow {
    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "Plain",
            Self::Raised => "Raised",
            Self::Sunken => "Sunken",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Plain" => Some(Self::Plain),
            "Raised" => Some(Self::Raised),
            "Sunken" => Some(Self::Sunken),
            _ => None,
        }
    }
}

/// A widget drawing a frame around its children, or a separator line.
pub struct Frame {
    base: WidgetBase,
    shape: Property<FrameShape>,
    shadow: Property<FrameShadow>,
    line_width: Property<i32>,
    mid_line_width: Property<i32>,
}

impl Frame {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["frameShape", "frameShadow", "lineWidth", "midLineWidth", "frameWidth"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let frame = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            shape: Property::default(),
            shadow: Property::default(),
            line_width: Property::new(1),
            mid_line_width: Property::new(0),
        });
        register_widget(&frame);
        Ok(frame)
    }

    pub fn frame_shape(&self) -> FrameShape {
        self.shape.get()
    }

    pub fn set_frame_shape(&self, shape: FrameShape) {
        self.shape.set(shape);
    }

    pub fn frame_shadow(&self) -> FrameShadow {
        self.shadow.get()
    }

    pub fn set_frame_shadow(&self, shadow: FrameShadow) {
        self.shadow.set(shadow);
    }

    pub fn line_width(&self) -> i32 {
        self.line_width.get()
    }

    pub fn set_line_width(&self, width: i32) {
        self.line_width.set(width.max(0));
    }

    pub fn mid_line_width(&self) -> i32 {
        self.mid_line_width.get()
    }

    pub fn set_mid_line_width(&self, width: i32) {
        self.mid_line_width.set(width.max(0));
    }

    /// Width of the drawn frame on each side.
    pub fn frame_width(&self) -> i32 {
        let line = self.line_width();
        match (self.frame_shape(), self.frame_shadow()) {
            (FrameShape::NoFrame, _) => 0,
            (FrameShape::Box, FrameShadow::Plain) => line,
            (FrameShape::Box, _) => 2 * line + self.mid_line_width(),
            _ => line,
        }
    }
}

impl Widget for Frame {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "Frame"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "frameShape" => {
                self.set_frame_shape(expect_name(&value, "frame shape name", FrameShape::from_name)?)
            }
            "frameShadow" => self.set_frame_shadow(expect_name(
                &value,
                "frame shadow name",
                FrameShadow::from_name,
            )?),
            "lineWidth" => self.set_line_width(expect(&value, "int")?),
            "midLineWidth" => self.set_mid_line_width(expect(&value, "int")?),
            "frameWidth" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "frameShape" => Some(self.frame_shape().name().into()),
            "frameShadow" => Some(self.frame_shadow().name().into()),
            "lineWidth" => Some(self.line_width().into()),
            "midLineWidth" => Some(self.mid_line_width().into()),
            "frameWidth" => Some(self.frame_width().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }
}

static_assertions::assert_impl_all!(GroupBox: Send, Sync);
static_assertions::assert_impl_all!(ScrollArea: Send, Sync);
static_assertions::assert_impl_all!(Splitter: Send, Sync);
static_assertions::assert_impl_all!(Frame: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::types::Size;
    use crate::widget::widgets::{Label, PushButton};

    #[test]
    fn test_checkable_group_box_disables_children() {
        init_global_registry();
        let group = GroupBox::with_title("Options").unwrap();
        let button: WidgetRef = PushButton::with_text("Go").unwrap();
        let group_ref: WidgetRef = group.clone();
        set_parent(&button, Some(&group_ref)).unwrap();

        group.set_checked(false);
        assert!(group.is_checked(), "not checkable yet");

        group.set_checkable(true);
        group_ref.send_event(&WidgetEvent::key_press(Key::Space, KeyboardModifiers::NONE));
        assert!(!group.is_checked());
        assert!(!button.widget_base().is_enabled());

        group.set_checkable(false);
        assert!(button.widget_base().is_enabled());
    }

    #[test]
    fn test_scroll_area_ranges() {
        init_global_registry();
        let area = ScrollArea::new().unwrap();
        area.set_property("size", Size::new(100, 100).into()).unwrap();
        let content = Label::with_text("long").unwrap();
        content
            .set_property("size", Size::new(100, 400).into())
            .unwrap();
        let content: WidgetRef = content;
        area.set_widget(&content).unwrap();
        assert_eq!(area.vertical_maximum(), 300);

        area.set_vertical_scroll_value(1000);
        assert_eq!(area.scroll_values(), (0, 300));

        area.set_widget_resizable(true);
        assert_eq!(area.scroll_values(), (0, 0));

        let taken = area.take_widget().unwrap();
        assert_eq!(taken.object_id(), content.object_id());
        assert!(area.widget().is_none());
    }

    #[test]
    fn test_splitter_move_handle() {
        init_global_registry();
        let splitter = Splitter::new(Orientation::Horizontal).unwrap();
        for _ in 0..3 {
            let pane: WidgetRef = Label::new().unwrap();
            splitter.add_widget(&pane).unwrap();
        }
        splitter.set_sizes(&[100, 100, 100]);

        assert_eq!(splitter.move_handle(1, 30), Some(130));
        assert_eq!(splitter.sizes(), vec![130, 70, 100]);
        splitter.move_handle(2, -500);
        assert_eq!(splitter.sizes(), vec![130, 0, 170]);

        splitter.set_children_collapsible(false);
        assert_eq!(splitter.sizes(), vec![130, 1, 170]);
        assert_eq!(splitter.move_handle(3, 10), None);
    }

    #[test]
    fn test_frame_width() {
        init_global_registry();
        let frame = Frame::new().unwrap();
        assert_eq!(frame.frame_width(), 0);
        frame.set_property("frameShape", "Box".into()).unwrap();
        frame.set_property("frameShadow", "Sunken".into()).unwrap();
        frame.set_line_width(2);
        assert_eq!(frame.property("frameWidth"), Some(Variant::Int(4)));
        assert!(frame.set_property("frameShape", "Oval".into()).is_err());
    }
}
