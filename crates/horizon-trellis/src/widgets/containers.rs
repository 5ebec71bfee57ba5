//! Builders for widgets that hold other widgets.
//!
//! Children handed to a container builder are attached during
//! initialization, after the staged properties are applied.

use std::sync::Arc;

use horizon_trellis_core::widget::widgets::{
    Frame, FrameShadow, FrameShape, GroupBox, Orientation, ScrollArea, Splitter,
};
use horizon_trellis_core::widget::{self, Widget, WidgetRef};
use horizon_trellis_core::{Signal, SignalConnection, Variant};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};
use crate::error::UiError;
use crate::memory::WidgetHandle;

fn point_handler(handler: impl Fn(i32, i32) + Send + Sync + 'static) -> EventHandler {
    EventHandler::value(move |value| {
        if let Variant::Point(point) = value {
            handler(point.x, point.y);
        }
    })
}

// =============================================================================
// GroupBox
// =============================================================================

fn group_toggled(group: &GroupBox) -> &Signal<bool> {
    &group.toggled
}

fn group_clicked(group: &GroupBox) -> &Signal<bool> {
    &group.clicked
}

/// Builds a titled [`GroupBox`]. A checkable group enables its children
/// only while checked.
pub struct GroupBoxBuilder {
    core: ElementCore<GroupBox>,
    children: Vec<WidgetRef>,
}

impl GroupBoxBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("GroupBox"),
            children: Vec::new(),
        }
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.with_property("title", title.into())
    }

    pub fn checkable(self, checkable: bool) -> Self {
        self.with_property("checkable", checkable)
    }

    pub fn checked(self, checked: bool) -> Self {
        self.with_property("checked", checked)
    }

    pub fn flat(self, flat: bool) -> Self {
        self.with_property("flat", flat)
    }

    pub fn child(mut self, child: &impl WidgetHandle) -> Self {
        self.children.push(child.widget_ref());
        self
    }

    pub fn on_toggled(self, handler: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.with_event("toggled", EventHandler::bool(handler))
    }

    /// Add a child to the built group.
    pub fn add_child(&mut self, child: &impl WidgetHandle) -> crate::Result<()> {
        let child = child.widget_ref();
        match self.core.widget() {
            Some(group) => {
                let parent: WidgetRef = group.clone();
                widget::set_parent(&child, Some(&parent))?;
            }
            None => self.children.push(child),
        }
        Ok(())
    }
}

impl Default for GroupBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for GroupBoxBuilder {
    type Widget = GroupBox;

    fn core(&self) -> &ElementCore<GroupBox> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<GroupBox> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<GroupBox>> {
        Ok(GroupBox::new()?)
    }

    fn connect_event(&self, widget: &Arc<GroupBox>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "toggled" => handler.bind(widget, group_toggled),
            "clicked" => handler.bind(widget, group_clicked),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_groups(&mut self, group: &Arc<GroupBox>) {
        let parent: WidgetRef = group.clone();
        let enabled = !group.is_checkable() || group.is_checked();
        for child in std::mem::take(&mut self.children) {
            match widget::set_parent(&child, Some(&parent)) {
                Ok(()) => {
                    if !enabled {
                        child.widget_base().set_enabled(false);
                    }
                }
                Err(err) => self.core.report(err.into(), "add_child"),
            }
        }
    }
}

// =============================================================================
// ScrollArea
// =============================================================================

fn scrolled(area: &ScrollArea) -> &Signal<(i32, i32)> {
    &area.scrolled
}

/// Builds a [`ScrollArea`]. Events: `scrolled`, delivered to value
/// handlers as a point.
pub struct ScrollAreaBuilder {
    core: ElementCore<ScrollArea>,
    content: Option<WidgetRef>,
}

impl ScrollAreaBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("ScrollArea"),
            content: None,
        }
    }

    pub fn widget_resizable(self, resizable: bool) -> Self {
        self.with_property("widgetResizable", resizable)
    }

    pub fn content(mut self, content: &impl WidgetHandle) -> Self {
        self.content = Some(content.widget_ref());
        self
    }

    pub fn on_scrolled(self, handler: impl Fn(i32, i32) + Send + Sync + 'static) -> Self {
        self.with_event("scrolled", point_handler(handler))
    }

    pub fn scroll_to(&self, horizontal: i32, vertical: i32) {
        if let Some(area) = self.core.widget() {
            area.set_horizontal_scroll_value(horizontal);
            area.set_vertical_scroll_value(vertical);
        }
    }

    pub fn scroll_values(&self) -> Option<(i32, i32)> {
        self.core.widget().map(|area| area.scroll_values())
    }

    /// Detach the content and hand it back.
    pub fn take_content(&self) -> Option<WidgetRef> {
        self.core.widget().and_then(|area| area.take_widget())
    }
}

impl Default for ScrollAreaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for ScrollAreaBuilder {
    type Widget = ScrollArea;

    fn core(&self) -> &ElementCore<ScrollArea> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<ScrollArea> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<ScrollArea>> {
        Ok(ScrollArea::new()?)
    }

    fn connect_event(
        &self,
        widget: &Arc<ScrollArea>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "scrolled" => handler.bind(widget, scrolled),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_groups(&mut self, area: &Arc<ScrollArea>) {
        if let Some(content) = self.content.take()
            && let Err(err) = area.set_widget(&content)
        {
            self.core.report(err.into(), "set_widget");
        }
    }
}

// =============================================================================
// Splitter
// =============================================================================

fn splitter_moved(splitter: &Splitter) -> &Signal<(i32, usize)> {
    &splitter.splitter_moved
}

/// Builds a [`Splitter`]. Events: `splitterMoved`, delivered as the
/// handle position to int handlers.
pub struct SplitterBuilder {
    core: ElementCore<Splitter>,
    orientation: Orientation,
    panes: Vec<WidgetRef>,
    sizes: Option<Vec<i32>>,
}

impl SplitterBuilder {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            core: ElementCore::new("Splitter"),
            orientation,
            panes: Vec::new(),
            sizes: None,
        }
    }

    pub fn pane(mut self, pane: &impl WidgetHandle) -> Self {
        self.panes.push(pane.widget_ref());
        self
    }

    /// Pane sizes, applied after the panes are added.
    pub fn sizes(mut self, sizes: impl Into<Vec<i32>>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn handle_width(self, width: i32) -> Self {
        self.with_property("handleWidth", width)
    }

    pub fn children_collapsible(self, collapsible: bool) -> Self {
        self.with_property("childrenCollapsible", collapsible)
    }

    pub fn on_splitter_moved(self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.with_event("splitterMoved", EventHandler::int(handler))
    }

    pub fn add_pane(&mut self, pane: &impl WidgetHandle) -> crate::Result<()> {
        let pane = pane.widget_ref();
        match self.core.widget() {
            Some(splitter) => splitter.add_widget(&pane)?,
            None => self.panes.push(pane),
        }
        Ok(())
    }

    pub fn current_sizes(&self) -> Vec<i32> {
        match self.core.widget() {
            Some(splitter) => splitter.sizes(),
            None => self.sizes.clone().unwrap_or_default(),
        }
    }

    pub fn move_handle(&self, index: usize, delta: i32) -> crate::Result<i32> {
        let splitter = self.core.widget().ok_or_else(|| {
            UiError::Initialization("Splitter must be initialized before moving a handle".into())
        })?;
        splitter
            .move_handle(index, delta)
            .ok_or_else(|| UiError::Layout(format!("no splitter handle at index {index}")))
    }
}

impl UiElement for SplitterBuilder {
    type Widget = Splitter;

    fn core(&self) -> &ElementCore<Splitter> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<Splitter> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<Splitter>> {
        Ok(Splitter::new(self.orientation)?)
    }

    fn connect_event(&self, widget: &Arc<Splitter>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        match event {
            "splitterMoved" => handler.bind_map(widget, splitter_moved, |(position, _)| *position),
            _ => bind_common(widget, event, handler),
        }
    }

    fn setup_groups(&mut self, splitter: &Arc<Splitter>) {
        for pane in std::mem::take(&mut self.panes) {
            if let Err(err) = splitter.add_widget(&pane) {
                self.core.report(err.into(), "add_widget");
            }
        }
        if let Some(sizes) = self.sizes.take() {
            splitter.set_sizes(&sizes);
        }
    }
}

// =============================================================================
// Frame
// =============================================================================

#[derive(Debug)]
pub struct FrameBuilder {
    core: ElementCore<Frame>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("Frame"),
        }
    }

    pub fn shape(self, shape: FrameShape) -> Self {
        self.with_property("frameShape", shape.name())
    }

    pub fn shadow(self, shadow: FrameShadow) -> Self {
        self.with_property("frameShadow", shadow.name())
    }

    pub fn line_width(self, width: i32) -> Self {
        self.with_property("lineWidth", width)
    }

    pub fn mid_line_width(self, width: i32) -> Self {
        self.with_property("midLineWidth", width)
    }

    /// A horizontal separator line.
    pub fn separator() -> Self {
        Self::new().shape(FrameShape::HLine).shadow(FrameShadow::Sunken)
    }

    pub fn frame_width(&self) -> i32 {
        self.core.widget().map_or(0, |frame| frame.frame_width())
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for FrameBuilder {
    type Widget = Frame;

    fn core(&self) -> &ElementCore<Frame> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<Frame> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<Frame>> {
        Ok(Frame::new()?)
    }

    fn connect_event(&self, widget: &Arc<Frame>, event: &str, handler: &EventHandler) -> Option<SignalConnection> {
        bind_common(widget, event, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::widget::widgets::{Label, PushButton};
    use horizon_trellis_core::widget::child_widgets;
    use horizon_trellis_core::init_global_registry;
    use parking_lot::Mutex;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_group_box_children_follow_check_state() {
        setup();
        let first = PushButton::with_text("One").unwrap();
        let second = PushButton::with_text("Two").unwrap();
        let mut builder = GroupBoxBuilder::new()
            .title("Options")
            .checkable(true)
            .checked(false)
            .child(&first)
            .child(&second);
        let group = builder.initialize().unwrap();

        assert_eq!(child_widgets(&*group).len(), 2);
        assert!(!first.widget_base().is_enabled());
        group.set_checked(true);
        assert!(first.widget_base().is_enabled());
        assert!(second.widget_base().is_enabled());
    }

    #[test]
    fn test_scroll_area_content() {
        setup();
        let content = Label::with_text("Long").unwrap();
        content.widget_base().resize(400, 800);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut builder = ScrollAreaBuilder::new()
            .content(&content)
            .on_scrolled(move |h, v| sink.lock().push((h, v)));
        let area = builder.initialize().unwrap();
        area.widget_base().resize(100, 100);
        area.update_ranges();

        builder.scroll_to(0, 250);
        assert_eq!(builder.scroll_values(), Some((0, 250)));
        assert_eq!(seen.lock().last(), Some(&(0, 250)));
        assert_eq!(builder.take_content().unwrap().object_id(), content.object_id());
    }

    #[test]
    fn test_splitter_sizes_and_handle() {
        setup();
        let left = Label::new().unwrap();
        let right = Label::new().unwrap();
        let moves = Arc::new(Mutex::new(Vec::new()));
        let sink = moves.clone();
        let mut builder = SplitterBuilder::new(Orientation::Horizontal)
            .pane(&left)
            .pane(&right)
            .sizes([100, 200])
            .handle_width(4)
            .on_splitter_moved(move |pos| sink.lock().push(pos));
        builder.initialize().unwrap();

        assert_eq!(builder.current_sizes(), vec![100, 200]);
        assert_eq!(builder.move_handle(1, 50).unwrap(), 150);
        assert_eq!(builder.current_sizes(), vec![150, 150]);
        assert!(builder.move_handle(5, 1).is_err());
        assert_eq!(*moves.lock(), vec![150]);
    }

    #[test]
    fn test_separator_frame() {
        setup();
        let mut builder = FrameBuilder::separator().line_width(2);
        let frame = builder.initialize().unwrap();
        assert_eq!(frame.frame_shape(), FrameShape::HLine);
        assert_eq!(builder.frame_width(), 2);
    }
}
