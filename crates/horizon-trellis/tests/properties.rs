//! Guarantees that hold for every builder, chain and manager.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_trellis::error::{CollectingErrorHandler, ErrorCategory};
use horizon_trellis::prelude::*;
use horizon_trellis::toolkit::widget::{ShortcutManager, ShortcutResult};
use horizon_trellis::toolkit::{Key, KeyboardModifiers};
use horizon_trellis::validation::{ValidationMessage, ValidationSeverity};

fn setup() {
    init_global_registry();
}

fn sample_results() -> Vec<ValidationResult> {
    vec![
        ValidationResult::success(),
        ValidationResult::failure("too short"),
        ValidationResult::from_parts(
            true,
            vec![ValidationMessage::with_severity("unusual", ValidationSeverity::Warning)],
        ),
        ValidationResult::failure("missing").with_field("email"),
    ]
}

#[test]
fn initialize_creates_exactly_one_widget() {
    setup();
    let mut builder = LabelBuilder::new().text("Status");
    assert!(builder.widget().is_none());
    assert!(!builder.is_initialized());

    let first = builder.initialize().unwrap();
    assert!(builder.widget().is_some());
    let second = builder.initialize().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.object_id(), second.object_id());
}

#[test]
fn staged_properties_flush_in_order() {
    setup();
    let mut builder = SliderBuilder::new()
        .with_property("maximum", 50)
        .with_property("value", 10)
        .with_property("value", 30)
        .with_property("maximum", 100);
    let slider = builder.initialize().unwrap();
    assert_eq!(slider.property("value"), Some(Variant::Int(30)));
    assert_eq!(slider.property("maximum"), Some(Variant::Int(100)));

    builder.set_property("value", 70);
    assert_eq!(slider.property("value"), Some(Variant::Int(70)));
}

#[test]
fn reinitializing_does_not_rewire_handlers() {
    setup();
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    let mut builder = ButtonBuilder::new().text("Go").on_click(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    builder.initialize().unwrap();
    builder.initialize().unwrap();
    builder.click();
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn combining_results_is_a_monoid() {
    let results = sample_results();
    for a in &results {
        assert_eq!(a.clone().combine(ValidationResult::success()), *a);
        assert_eq!(ValidationResult::success().combine(a.clone()), *a);
        for b in &results {
            for c in &results {
                let left = a.clone().combine(b.clone().combine(c.clone()));
                let right = a.clone().combine(b.clone()).combine(c.clone());
                assert_eq!(left, right);
            }
        }
    }
}

#[test]
fn chain_stops_at_first_error_when_asked() {
    let failing = || {
        validate::<str>()
            .custom_with(|_| false, "first")
            .custom_with(|_| false, "second")
    };
    let stopped = failing().stop_on_first_error(true).validate("x");
    assert_eq!(stopped.messages().len(), 1);
    assert_eq!(stopped.first_error(), Some("first"));

    let full = failing().stop_on_first_error(false).validate("x");
    assert_eq!(full.messages().len(), 2);
}

#[test]
fn preset_themes_survive_json() {
    for preset in [ThemeConfig::light(), ThemeConfig::dark(), ThemeConfig::high_contrast()] {
        let manager = ThemeManager::new();
        manager.load_theme(preset.clone());
        let json = manager.export_theme_to_json().unwrap();
        let restored = ThemeManager::new();
        restored.load_theme_from_json(&json).unwrap();
        assert_eq!(restored.current_theme(), preset);
    }
}

#[test]
fn removing_enhancements_leaves_nothing_behind() {
    setup();
    let enhancer = ComponentEnhancer::new();
    let mut builder = LineEditBuilder::new();
    let edit = builder.initialize().unwrap();
    let config = enhance()
        .accessible_name("Code")
        .tooltip("Six digits")
        .drop_shadow(true)
        .required(true)
        .shortcut("Ctrl+K")
        .auto_complete(["123456"])
        .select_all_on_focus(true)
        .input_mask("999999")
        .build();
    enhancer.enhance(&edit, config);
    let id = edit.object_id();
    assert!(enhancer.is_enhanced(id));
    assert!(enhancer.auxiliary_count(id) > 0);
    assert!(AccessibilityManager::global().is_registered(id));
    assert_eq!(edit.input_mask().as_deref(), Some("999999"));

    assert!(enhancer.remove_enhancements(&edit));
    assert!(enhancer.config(id).is_none());
    assert_eq!(enhancer.auxiliary_count(id), 0);
    assert!(edit.widget_base().graphics_effect().is_none());
    assert!(edit.input_mask().is_none());
    assert!(!AccessibilityManager::global().is_registered(id));
    assert_eq!(edit.widget_base().tool_tip(), "");
}

#[test]
fn repeating_a_helper_keeps_one_live_shortcut() {
    setup();
    let enhancer = ComponentEnhancer::new();
    let mut builder = LineEditBuilder::new();
    let edit = builder.initialize().unwrap();
    enhancer.add_shortcut(&edit, "Ctrl+Shift+P").unwrap();
    let once = enhancer.auxiliary_count(edit.object_id());
    enhancer.add_shortcut(&edit, "Ctrl+Shift+P").unwrap();
    assert_eq!(enhancer.auxiliary_count(edit.object_id()), once);

    let fired = match ShortcutManager::dispatch_key(Key::P, KeyboardModifiers::CTRL_SHIFT) {
        ShortcutResult::Activated(fired) => fired.len(),
        _ => 0,
    };
    assert_eq!(fired, 1);
}

#[test]
fn safe_execute_contains_every_failure() {
    let manager = ErrorManager::empty();
    let collected = Arc::new(CollectingErrorHandler::new());
    manager.add_handler(collected.clone());

    let structured: Option<()> =
        manager.safe_execute("structured", || Err(UiError::Layout("no room".into())));
    let standard: Option<()> = manager.safe_execute("standard", || {
        Err(UiError::from(std::io::Error::other("disk gone")))
    });
    let boxed: Option<()> = manager.safe_execute("boxed", || {
        let err: Box<dyn std::error::Error + Send + Sync> = "bad header".into();
        Err(UiError::from(err))
    });
    let panicked: Option<()> =
        manager.safe_execute("panicked", || -> Result<()> { panic!("exploded") });
    let unknown: Option<()> =
        manager.safe_execute("unknown", || -> Result<()> { std::panic::panic_any(7_u8) });

    assert!(structured.is_none());
    assert!(standard.is_none());
    assert!(boxed.is_none());
    assert!(panicked.is_none());
    assert!(unknown.is_none());

    let reports = collected.reports();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[0].category, ErrorCategory::Layout);
    assert_eq!(reports[1].category, ErrorCategory::Io);
    assert_eq!(reports[2].message, "bad header");
    assert_eq!(reports[3].message, "exploded");
    assert_eq!(reports[4].message, "Unknown exception occurred");
    assert_eq!(reports[4].severity, ErrorSeverity::Critical);
}
