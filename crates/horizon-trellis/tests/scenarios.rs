//! End-to-end flows through builders, validation, themes, animation and the
//! enhancer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_trellis::prelude::*;
use horizon_trellis::style::Error as StyleError;
use horizon_trellis::toolkit::widget::widgets::Label;
use horizon_trellis::toolkit::widget::{ShortcutManager, ShortcutResult};
use horizon_trellis::toolkit::{Key, KeyboardModifiers};
use parking_lot::Mutex;

fn setup() {
    init_global_registry();
}

#[test]
fn disabled_button_ignores_clicks_until_enabled() {
    setup();
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    let mut builder = ButtonBuilder::new()
        .text("Submit")
        .enabled(false)
        .on_click(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let button = builder.initialize().unwrap();

    assert_eq!(button.text(), "Submit");
    assert!(!button.widget_base().is_enabled());
    button.click();
    assert_eq!(clicks.load(Ordering::SeqCst), 0);

    button.widget_base().set_enabled(true);
    button.click();
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn line_edit_chain_reports_every_failure() {
    setup();
    let chain = validate::<str>()
        .required()
        .min_length(3)
        .pattern("^[A-Za-z]+$")
        .stop_on_first_error(false);
    let mut builder = LineEditBuilder::new().validation(chain);
    builder.initialize().unwrap();

    let messages = |text: &str| -> Vec<String> {
        builder
            .check(text)
            .messages()
            .iter()
            .map(|message| message.message.clone())
            .collect()
    };

    let empty = builder.check("");
    assert!(!empty.is_valid());
    let found = messages("");
    assert!(found.contains(&"Field is required".to_string()));
    assert!(found.contains(&"Minimum length is 3".to_string()));

    assert!(messages("Ab").contains(&"Minimum length is 3".to_string()));
    assert!(builder.check("Abc").is_valid());
    assert_eq!(messages("Ab1"), vec!["Invalid format".to_string()]);
}

#[test]
fn theme_callbacks_see_each_swap() {
    let manager = ThemeManager::new();
    let names = Arc::new(Mutex::new(Vec::new()));
    manager.load_light_theme();
    let recorded = names.clone();
    manager.on_theme_changed(move |theme| recorded.lock().push(theme.name.clone()));

    manager.load_light_theme();
    manager.load_dark_theme();
    assert_eq!(*names.lock(), vec!["Light", "Dark"]);
}

#[test]
fn malformed_theme_json_is_rejected() {
    let manager = ThemeManager::new();
    manager.load_light_theme();
    let json = manager.export_theme_to_json().unwrap();
    let broken = json.replace("\"isDarkTheme\":false", "\"isDarkTheme\":\"no\"");
    assert_ne!(json, broken);

    let err = manager.load_theme_from_json(&broken).unwrap_err();
    assert!(matches!(err, StyleError::Parse { .. }));
    assert_eq!(manager.current_theme_name(), "Light");
}

#[test]
fn fade_out_finishes_once() {
    setup();
    let label = Label::new().unwrap();
    let finished = Arc::new(AtomicUsize::new(0));
    let counter = finished.clone();
    animate(&label)
        .animate("opacity", 1.0, 0.0)
        .duration(Duration::from_millis(50))
        .on_finished(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .start()
        .unwrap();

    let done = EventLoop::process_events_until(Duration::from_millis(500), || {
        finished.load(Ordering::SeqCst) > 0
    });
    assert!(done);
    EventLoop::process_events_for(Duration::from_millis(20));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert_eq!(label.widget_base().opacity(), 0.0);
}

#[test]
fn removed_enhancements_release_the_shortcut() {
    setup();
    let enhancer = ComponentEnhancer::new();
    let mut builder = LineEditBuilder::new();
    let edit = builder.initialize().unwrap();
    enhancer.enhance(&edit, enhance().shortcut("Ctrl+S").required(true).build());

    let result = ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);
    assert!(matches!(result, ShortcutResult::Activated(_)));

    assert!(enhancer.remove_enhancements(&edit));
    let result = ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);
    assert!(matches!(result, ShortcutResult::NoMatch));
    assert_eq!(edit.widget_base().tool_tip(), "");
}
