//! Integration tests across the object tree, widgets, shortcuts and animations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_trellis_core::event::Key;
use horizon_trellis_core::widget::widgets::{GroupBox, Label, PushButton, Slider};
use horizon_trellis_core::widget::{
    Shortcut, ShortcutManager, child_widgets, destroy, find_child_widget, find_widget, set_parent,
};
use horizon_trellis_core::{
    Animation, AnimationState, EventLoop, KeyboardModifiers, ParallelAnimationGroup,
    PropertyAnimation, Variant, Widget, WidgetRef, init_global_registry,
};
use parking_lot::Mutex;

fn setup() {
    init_global_registry();
}

#[test]
fn destroying_a_container_destroys_its_children() {
    setup();
    let group: WidgetRef = GroupBox::with_title("Options").unwrap();
    let button: WidgetRef = PushButton::with_text("Apply").unwrap();
    button.widget_base().set_name("apply");
    set_parent(&button, Some(&group)).unwrap();

    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = destroyed.clone();
    button.widget_base().destroyed().connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(child_widgets(group.as_ref()).len(), 1);
    assert!(find_child_widget(group.as_ref(), "apply").is_some());

    let button_id = button.object_id();
    drop(button);
    // The tree keeps the child alive.
    assert!(find_widget(button_id).is_some());

    destroy(&group).unwrap();
    assert!(find_widget(button_id).is_none());
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn reflective_properties_round_trip() {
    setup();
    let slider = Slider::new().unwrap();
    slider.set_property("maximum", Variant::Int(10)).unwrap();
    slider.set_property("value", Variant::Int(42)).unwrap();
    assert_eq!(slider.property("value"), Some(Variant::Int(10)));
    assert!(slider.set_property("noSuchProperty", Variant::Bool(true)).is_err());
    assert!(slider.set_property("value", "ten".into()).is_err());
}

#[test]
fn widget_shortcut_follows_widget_state() {
    setup();
    let label = Label::with_text("Name").unwrap();
    let shortcut = Shortcut::for_widget("Ctrl+S".parse().unwrap(), label.object_id()).unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    shortcut.activated.connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);
    label.widget_base().set_enabled(false);
    ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);
    label.widget_base().set_enabled(true);
    drop(shortcut);
    ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn parallel_group_animates_two_properties() {
    setup();
    let label = Label::new().unwrap();
    let fade = PropertyAnimation::for_property(label.as_ref(), "opacity").unwrap();
    fade.set_end_value(0.0);
    fade.set_duration(Duration::from_millis(30));
    let grow = PropertyAnimation::for_property(label.as_ref(), "size").unwrap();
    grow.set_start_value(horizon_trellis_core::Size::new(0, 0));
    grow.set_end_value(horizon_trellis_core::Size::new(80, 20));
    grow.set_duration(Duration::from_millis(60));

    let group = ParallelAnimationGroup::new();
    group.add_animation(fade).unwrap();
    group.add_animation(grow).unwrap();

    let states = Arc::new(Mutex::new(Vec::new()));
    let log = states.clone();
    group
        .core()
        .state_changed
        .connect(move |(new, _old)| log.lock().push(*new));

    group.start().unwrap();
    let done = EventLoop::process_events_until(Duration::from_secs(1), || {
        group.state() == AnimationState::Stopped
    });
    assert!(done);
    assert_eq!(label.widget_base().opacity(), 0.0);
    assert_eq!(
        label.widget_base().size(),
        horizon_trellis_core::Size::new(80, 20)
    );
    assert_eq!(
        *states.lock(),
        vec![AnimationState::Running, AnimationState::Stopped]
    );
}

#[test]
fn deferred_deletion_runs_on_next_pump() {
    struct Flag(Arc<AtomicUsize>);
    impl Drop for Flag {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let dropped = Arc::new(AtomicUsize::new(0));
    EventLoop::delete_later(Flag(dropped.clone()));
    assert_eq!(EventLoop::pending_deletions(), 1);
    assert_eq!(dropped.load(Ordering::SeqCst), 0);
    EventLoop::process_events();
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}
