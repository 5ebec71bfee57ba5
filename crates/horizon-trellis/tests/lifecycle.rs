//! Lifecycle hooks, property bindings and monitoring on real builders.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use horizon_trellis::element::{EffectCleanup, ElementState};
use horizon_trellis::prelude::*;
use horizon_trellis::toolkit::widget::{self, widgets::Slider};
use parking_lot::Mutex;

fn setup() {
    init_global_registry();
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&LifecycleContext) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = count.clone();
    (count, move |_: &LifecycleContext| {
        hook_count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn initialize_mounts_and_cleanup_unmounts() {
    setup();
    let (mounts, on_mount) = counter();
    let (unmounts, on_unmount) = counter();
    let mut builder = LabelBuilder::new()
        .text("Ready")
        .on_mount(on_mount)
        .on_unmount(on_unmount);
    assert_eq!(builder.lifecycle().phase(), LifecyclePhase::BeforeMount);

    let label = builder.initialize().unwrap();
    builder.initialize().unwrap();
    assert_eq!(mounts.load(Ordering::SeqCst), 1);
    assert_eq!(builder.lifecycle().phase(), LifecyclePhase::Mounted);

    builder.cleanup();
    assert_eq!(unmounts.load(Ordering::SeqCst), 1);
    assert_eq!(builder.state(), ElementState::Disposed);
    assert!(builder.widget().is_none());
    assert!(builder.list_properties().is_empty());
    assert!(!label.widget_base().is_alive());
}

#[test]
fn destroying_the_widget_unmounts_the_element() {
    setup();
    let (unmounts, on_unmount) = counter();
    let mut builder = SliderBuilder::new().on_unmount(on_unmount);
    let slider: WidgetRef = builder.initialize().unwrap();
    widget::destroy(&slider).unwrap();
    assert_eq!(unmounts.load(Ordering::SeqCst), 1);
    assert!(!builder.lifecycle().is_mounted());
    builder.cleanup();
    assert_eq!(unmounts.load(Ordering::SeqCst), 1);
}

#[test]
fn effects_rerun_only_for_their_dependencies() {
    setup();
    let runs = Arc::new(AtomicUsize::new(0));
    let cleanups = Arc::new(AtomicUsize::new(0));
    let (run, cleaned) = (runs.clone(), cleanups.clone());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    let mut builder = SliderBuilder::new()
        .range(0, 100)
        .on_update(move |context| sink.lock().extend(context.changed().iter().map(|name| name.to_string())))
        .use_effect(["value"], move || {
            run.fetch_add(1, Ordering::SeqCst);
            let cleaned = cleaned.clone();
            Some(Box::new(move || {
                cleaned.fetch_add(1, Ordering::SeqCst);
            }) as EffectCleanup)
        });
    builder.initialize().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    builder.set_property("toolTip", "Volume");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    builder.set_property("value", 40);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    // An unchanged write is not an update.
    builder.set_property("value", 40);
    assert_eq!(*changes.lock(), vec!["toolTip".to_string(), "value".to_string()]);
    assert_eq!(builder.lifecycle().metrics().update_count, 2);

    builder.cleanup();
    assert_eq!(cleanups.load(Ordering::SeqCst), 2);
}

#[test]
fn rejected_writes_reach_the_error_hooks() {
    setup();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let mut builder = SliderBuilder::new()
        .on_error(move |context| sink.lock().extend(context.error.clone()));
    builder.initialize().unwrap();
    builder.set_property("wobble", 3);
    assert_eq!(builder.lifecycle().phase(), LifecyclePhase::Error);
    assert_eq!(errors.lock().len(), 1);
    assert!(errors.lock()[0].contains("wobble"));
}

#[test]
fn computed_bindings_follow_their_source_on_refresh() {
    setup();
    let level = Arc::new(AtomicI64::new(25));
    let source = level.clone();
    let mut builder = SliderBuilder::new().range(0, 100);
    builder.bind_property("value", move || source.load(Ordering::SeqCst).into());
    let slider = builder.initialize().unwrap();
    assert_eq!(slider.value(), 25);

    let refreshes = Arc::new(AtomicUsize::new(0));
    let counted = refreshes.clone();
    builder.core().refreshed().connect(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
    });
    level.store(80, Ordering::SeqCst);
    assert_eq!(slider.value(), 25);
    builder.refresh();
    assert_eq!(slider.value(), 80);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    assert!(builder.unbind_property("value"));
    level.store(10, Ordering::SeqCst);
    builder.refresh();
    assert_eq!(slider.value(), 80);
}

#[test]
fn signal_bindings_hold_early_values_until_initialize() {
    setup();
    let slider = SliderBuilder::new().range(0, 100).initialize().unwrap();
    let mut label = LabelBuilder::new();
    label.bind_property_to("text", &slider, Slider::value_changed, |value| {
        format!("{value}%").into()
    });
    assert_eq!(label.lifecycle().phase(), LifecyclePhase::BeforeMount);
    slider.set_value(40);

    let text = label.initialize().unwrap();
    assert_eq!(text.text(), "40%");
    slider.set_value(60);
    assert_eq!(text.text(), "60%");

    let connected = slider.value_changed().connection_count();
    label.bind_property_to("text", &slider, Slider::value_changed, |value| {
        format!("{value} / 100").into()
    });
    assert_eq!(slider.value_changed().connection_count(), connected);
    slider.set_value(70);
    assert_eq!(text.text(), "70 / 100");

    label.cleanup();
    assert_eq!(slider.value_changed().connection_count(), connected - 1);
}

#[test]
fn monitoring_times_live_writes_only_when_enabled() {
    setup();
    let mut builder = SliderBuilder::new().range(0, 100);
    builder.initialize().unwrap();
    builder.set_property("value", 5);
    assert_eq!(builder.performance_metrics().update_count, 0);

    builder.enable_performance_monitoring(true);
    builder.set_property("value", 6).set_property("value", 7);
    let metrics = builder.performance_metrics();
    assert_eq!(metrics.update_count, 2);
    assert!(metrics.average_update() <= metrics.total_update);

    builder.enable_performance_monitoring(false);
    builder.set_property("value", 8);
    assert_eq!(builder.performance_metrics().update_count, 2);
}
