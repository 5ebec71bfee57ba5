//! Ownership helpers that respect the widget tree.
//!
//! A widget attached to a parent is owned by the tree and goes away with its
//! parent. The handles here only delete what the tree does not own:
//!
//! - [`UiBox`]: a unique handle. Dropping it schedules the widget for
//!   destruction on the event loop unless the widget has a parent.
//! - [`UiShared`]: the shared flavour; the last clone decides.
//! - [`Parented`]: a [`UiBox`] that attaches every widget it holds to a
//!   fixed parent.
//! - [`WeakRef`]: a non-owning reference that turns empty as soon as the
//!   widget is destroyed, even if other strong handles remain.
//! - [`ObjectPool`]: a bounded pool of reusable values.

mod pool;

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use horizon_trellis_core::widget::{self, Widget, WidgetRef};
use horizon_trellis_core::{EventLoop, ObjectId, ObjectResult, Signal, SignalConnection};
use parking_lot::Mutex;

use crate::logging::targets;

pub use pool::{ObjectPool, Poolable, DEFAULT_POOL_CAPACITY};

/// Anything that can hand out a shared widget reference.
pub trait WidgetHandle {
    fn widget_ref(&self) -> WidgetRef;
}

impl<W: Widget> WidgetHandle for Arc<W> {
    fn widget_ref(&self) -> WidgetRef {
        self.clone()
    }
}

impl WidgetHandle for Arc<dyn Widget> {
    fn widget_ref(&self) -> WidgetRef {
        self.clone()
    }
}

/// Destroys its widget when dropped by the event loop.
struct DeferredDestroy(WidgetRef);

impl Drop for DeferredDestroy {
    fn drop(&mut self) {
        // Skip widgets destroyed while the deletion was pending.
        if self.0.widget_base().is_alive() {
            let _ = widget::destroy(&self.0);
        }
    }
}

/// Queue `widget` for destruction on this thread's event loop.
pub fn delete_later(widget: WidgetRef) {
    tracing::trace!(target: targets::MEMORY, id = ?widget.object_id(), "widget scheduled for deletion");
    EventLoop::delete_later(DeferredDestroy(widget));
}

/// Queue every widget for destruction.
pub fn batch_delete(widgets: impl IntoIterator<Item = WidgetRef>) -> usize {
    widgets.into_iter().fold(0, |count, widget| {
        delete_later(widget);
        count + 1
    })
}

/// Create a widget and attach it to `parent`.
pub fn create_with_parent<W, F>(parent: &WidgetRef, create: F) -> ObjectResult<Arc<W>>
where
    W: Widget,
    F: FnOnce() -> ObjectResult<Arc<W>>,
{
    let created = create()?;
    let child: WidgetRef = created.clone();
    widget::set_parent(&child, Some(parent))?;
    Ok(created)
}

/// Downcast a live widget. Destroyed widgets yield `None`.
pub fn safe_cast<W: Widget>(widget: &WidgetRef) -> Option<Arc<W>> {
    if !widget.widget_base().is_alive() {
        return None;
    }
    widget::downcast_arc::<W>(widget)
}

/// A unique widget handle with a parent-aware deleter.
pub struct UiBox<W: Widget> {
    widget: Option<Arc<W>>,
}

impl<W: Widget> UiBox<W> {
    pub fn new(widget: Arc<W>) -> Self {
        Self {
            widget: Some(widget),
        }
    }

    /// Take ownership of `widget` after attaching it to `parent`.
    pub fn with_parent(widget: Arc<W>, parent: &WidgetRef) -> ObjectResult<Self> {
        let child: WidgetRef = widget.clone();
        widget::set_parent(&child, Some(parent))?;
        Ok(Self::new(widget))
    }

    pub fn empty() -> Self {
        Self { widget: None }
    }

    pub fn get(&self) -> Option<&Arc<W>> {
        self.widget.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.widget.is_none()
    }

    /// Give up ownership without deleting anything.
    pub fn release(&mut self) -> Option<Arc<W>> {
        self.widget.take()
    }

    /// Replace the held widget, running the deleter on the old one.
    pub fn reset(&mut self, widget: Option<Arc<W>>) {
        if let Some(old) = std::mem::replace(&mut self.widget, widget) {
            dispose(old);
        }
    }
}

fn dispose<W: Widget>(widget: Arc<W>) {
    let base = widget.widget_base();
    if base.is_alive() && base.parent_id().is_none() {
        delete_later(widget);
    }
}

impl<W: Widget> Drop for UiBox<W> {
    fn drop(&mut self) {
        if let Some(widget) = self.widget.take() {
            dispose(widget);
        }
    }
}

impl<W: Widget> fmt::Debug for UiBox<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiBox")
            .field("widget", &self.widget.as_ref().map(|w| w.object_id()))
            .finish()
    }
}

/// A shared widget handle; the deleter runs when the last clone drops.
pub struct UiShared<W: Widget> {
    inner: Arc<UiBox<W>>,
}

impl<W: Widget> UiShared<W> {
    pub fn new(widget: Arc<W>) -> Self {
        Self {
            inner: Arc::new(UiBox::new(widget)),
        }
    }

    pub fn get(&self) -> Option<&Arc<W>> {
        self.inner.get()
    }

    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<W: Widget> Clone for UiShared<W> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<W: Widget> fmt::Debug for UiShared<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UiShared").field(&self.inner).finish()
    }
}

/// Holds one widget at a time, always attached to the same parent.
pub struct Parented<W: Widget> {
    parent: Option<ObjectId>,
    slot: UiBox<W>,
}

impl<W: Widget> Parented<W> {
    /// `parent` is remembered for later [`reset`](Self::reset)s.
    pub fn new(widget: Arc<W>, parent: Option<&WidgetRef>) -> ObjectResult<Self> {
        let mut parented = Self {
            parent: parent.map(|parent| parent.object_id()),
            slot: UiBox::empty(),
        };
        parented.reset(widget)?;
        Ok(parented)
    }

    pub fn parent_id(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn get(&self) -> Option<&Arc<W>> {
        self.slot.get()
    }

    /// Attach `widget` to the parent and hold it, disposing the old one.
    pub fn reset(&mut self, widget: Arc<W>) -> ObjectResult<()> {
        if let Some(parent) = self.parent.and_then(widget::find_widget) {
            let child: WidgetRef = widget.clone();
            widget::set_parent(&child, Some(&parent))?;
        }
        self.slot.reset(Some(widget));
        Ok(())
    }
}

impl<W: Widget> Deref for Parented<W> {
    type Target = UiBox<W>;

    fn deref(&self) -> &UiBox<W> {
        &self.slot
    }
}

fn destroyed_signal<W: Widget>(widget: &W) -> &Signal<ObjectId> {
    widget.widget_base().destroyed()
}

/// A non-owning reference that empties itself when the widget is destroyed.
pub struct WeakRef<W: Widget> {
    target: Arc<Mutex<Option<Weak<W>>>>,
    id: ObjectId,
    connection: Option<SignalConnection>,
}

impl<W: Widget> WeakRef<W> {
    pub fn new(widget: &Arc<W>) -> Self {
        let target = Arc::new(Mutex::new(Some(Arc::downgrade(widget))));
        let slot = target.clone();
        let connection_id = widget.widget_base().destroyed().connect(move |_| {
            slot.lock().take();
        });
        Self {
            target,
            id: widget.object_id(),
            connection: Some(SignalConnection::new(
                widget,
                destroyed_signal::<W>,
                connection_id,
            )),
        }
    }

    /// The widget, unless it has been destroyed or dropped.
    pub fn get(&self) -> Option<Arc<W>> {
        self.target.lock().as_ref()?.upgrade()
    }

    pub fn is_null(&self) -> bool {
        self.get().is_none()
    }

    /// The id the reference was created for.
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// Forget the widget.
    pub fn clear(&mut self) {
        self.target.lock().take();
        if let Some(connection) = self.connection.take() {
            connection.disconnect();
        }
    }
}

impl<W: Widget> Drop for WeakRef<W> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<W: Widget> fmt::Debug for WeakRef<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("id", &self.id)
            .field("null", &self.is_null())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::find_widget;
    use horizon_trellis_core::widget::widgets::{Frame, Label, PushButton};

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_unparented_box_deletes_on_event_loop() {
        setup();
        let button = PushButton::new().unwrap();
        let id = button.object_id();
        let extra: WidgetRef = button.clone();
        drop(UiBox::new(button));

        assert!(find_widget(id).is_some());
        EventLoop::process_events();
        assert!(!extra.widget_base().is_alive());
    }

    #[test]
    fn test_parented_box_leaves_deletion_to_parent() {
        setup();
        let parent: WidgetRef = Frame::new().unwrap();
        let label = Label::new().unwrap();
        let id = label.object_id();
        drop(UiBox::with_parent(label, &parent).unwrap());
        EventLoop::process_events();

        assert!(find_widget(id).is_some());
        widget::destroy(&parent).unwrap();
        assert!(find_widget(id).is_none());
    }

    #[test]
    fn test_release_skips_deleter() {
        setup();
        let mut holder = UiBox::new(Label::new().unwrap());
        let label = holder.release().unwrap();
        drop(holder);
        EventLoop::process_events();
        assert!(label.widget_base().is_alive());
    }

    #[test]
    fn test_shared_deletes_after_last_clone() {
        setup();
        let label = Label::new().unwrap();
        let observed: WidgetRef = label.clone();
        let first = UiShared::new(label);
        let second = first.clone();
        assert_eq!(second.strong_count(), 2);

        drop(first);
        EventLoop::process_events();
        assert!(observed.widget_base().is_alive());
        drop(second);
        EventLoop::process_events();
        assert!(!observed.widget_base().is_alive());
    }

    #[test]
    fn test_parented_reset_attaches_new_widget() {
        setup();
        let parent: WidgetRef = Frame::new().unwrap();
        let mut slot = Parented::new(Label::new().unwrap(), Some(&parent)).unwrap();
        let replacement = Label::with_text("second").unwrap();
        slot.reset(replacement.clone()).unwrap();

        assert_eq!(replacement.widget_base().parent_id(), Some(parent.object_id()));
        assert_eq!(slot.parent_id(), Some(parent.object_id()));
        assert_eq!(slot.get().unwrap().text(), "second");
    }

    #[test]
    fn test_weak_ref_nulls_on_destroy() {
        setup();
        let button = PushButton::new().unwrap();
        let weak = WeakRef::new(&button);
        assert!(weak.get().is_some());

        let as_ref: WidgetRef = button.clone();
        widget::destroy(&as_ref).unwrap();
        // Strong handles remain, but the widget is gone from the tree.
        assert!(weak.is_null());
        assert_eq!(weak.object_id(), button.object_id());
    }

    #[test]
    fn test_helpers() {
        setup();
        let parent: WidgetRef = Frame::new().unwrap();
        let child = create_with_parent(&parent, PushButton::new).unwrap();
        assert_eq!(child.widget_base().parent_id(), Some(parent.object_id()));

        let as_ref: WidgetRef = child.clone();
        assert!(safe_cast::<PushButton>(&as_ref).is_some());
        assert!(safe_cast::<Label>(&as_ref).is_none());

        let loose: Vec<WidgetRef> = vec![Label::new().unwrap(), Label::new().unwrap()];
        let watched = loose.clone();
        assert_eq!(batch_delete(loose), 2);
        EventLoop::process_events();
        assert!(watched.iter().all(|w| !w.widget_base().is_alive()));
    }
}
