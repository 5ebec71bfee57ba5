//! Integration tests for loading, exporting and persisting themes.

use std::sync::Arc;

use horizon_trellis_style::{Error, ThemeConfig, ThemeManager};
use parking_lot::Mutex;

#[test]
fn callbacks_run_in_registration_order() {
    let manager = ThemeManager::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second"] {
        let log = log.clone();
        manager.on_theme_changed(move |theme| log.lock().push(format!("{tag}:{}", theme.name)));
    }

    manager.load_light_theme();
    manager.load_dark_theme();

    assert_eq!(
        *log.lock(),
        vec!["first:Light", "second:Light", "first:Dark", "second:Dark"]
    );
}

#[test]
fn invalid_json_leaves_theme_untouched() {
    let manager = ThemeManager::new();
    manager.load_dark_theme();
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    manager.on_theme_changed(move |_| *counter.lock() += 1);

    let json = manager.export_theme_to_json().unwrap();
    let broken = json.replace("\"isDarkTheme\":true", "\"isDarkTheme\":\"sometimes\"");
    assert_ne!(json, broken);

    let err = manager.load_theme_from_json(&broken).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(manager.current_theme(), ThemeConfig::dark());
    assert_eq!(*calls.lock(), 0);

    let bad_color = r##"{"name": "Broken", "colors": {"primary": "#12"}}"##;
    assert!(manager.load_theme_from_json(bad_color).is_err());
    assert_eq!(manager.current_theme_name(), "Dark");
}

#[test]
fn exported_presets_load_back_identically() {
    let manager = ThemeManager::new();
    for preset in [
        ThemeConfig::light(),
        ThemeConfig::dark(),
        ThemeConfig::high_contrast(),
    ] {
        manager.load_theme(preset.clone());
        let json = manager.export_theme_to_json().unwrap();

        let other = ThemeManager::new();
        other.load_theme_from_json(&json).unwrap();
        assert_eq!(other.current_theme(), preset);
    }
}

#[test]
fn partial_theme_json_fills_defaults() {
    let manager = ThemeManager::new();
    manager
        .load_theme_from_value(serde_json::json!({
            "name": "Forest",
            "author": "Trail Team",
            "colors": { "primary": "#2E7D32", "onPrimary": "#FFFFFF" },
            "spacing": { "baseUnit": 6 },
            "somethingElse": [1, 2, 3]
        }))
        .unwrap();

    let theme = manager.current_theme();
    assert_eq!(theme.name, "Forest");
    assert_eq!(theme.author, "Trail Team");
    assert_eq!(theme.version, "1.0.0");
    assert_eq!(theme.colors.primary.to_hex(), "#2E7D32");
    assert_eq!(theme.colors.background.to_hex(), "#FAFAFA");
    assert_eq!(theme.spacing.md, 12);
    assert!(
        manager
            .generate_style_sheet("Frame")
            .contains("padding: 12px;")
    );
}

#[test]
fn themes_persist_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dark.json");

    let manager = ThemeManager::new();
    manager.load_dark_theme();
    manager.save_theme(&path).unwrap();

    let restored = ThemeManager::new();
    restored.load_theme_from_file(&path).unwrap();
    assert_eq!(restored.current_theme(), ThemeConfig::dark());

    let missing = dir.path().join("missing.json");
    let err = restored.load_theme_from_file(&missing).unwrap_err();
    assert!(matches!(err, Error::Io { ref path, .. } if *path == missing));
}
