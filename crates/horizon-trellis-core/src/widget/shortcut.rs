//! Keyboard shortcut system for Horizon Trellis.
//!
//! This module provides types and utilities for keyboard shortcuts:
//!
//! - [`KeySequence`]: a shortcut of up to 4 key combinations
//! - [`Shortcut`]: a standalone shortcut with enabled state and signals
//! - [`ShortcutManager`]: per-thread registry that handles multi-key chords
//! - Parsing of human-readable strings like "Ctrl+S" or "Ctrl+K, Ctrl+C"
//!
//! # Multi-Key Sequences (Chords)
//!
//! ```
//! use horizon_trellis_core::widget::{KeySequence, KeyCombination, SequenceMatch};
//! use horizon_trellis_core::{Key, KeyboardModifiers};
//!
//! let seq: KeySequence = "Ctrl+K, Ctrl+C".parse().unwrap();
//! assert_eq!(seq.count(), 2);
//!
//! let first = [KeyCombination::ctrl(Key::K)];
//! assert_eq!(seq.matches_partial(&first), SequenceMatch::PartialMatch);
//! ```
//!
//! # Activation
//!
//! Every [`Shortcut`] registers itself with the manager of the thread that
//! created it. Key presses are routed with [`ShortcutManager::dispatch_key`].
//! The manager only holds weak references: dropping the last handle to a
//! shortcut removes it. A shortcut bound to a widget only activates while
//! that widget is alive and enabled.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::error::Result;
use crate::event::{Key, KeyboardModifiers};
use crate::logging::targets;
use crate::object::{Object, ObjectBase, ObjectId, ObjectResult};
use crate::signal::Signal;

use super::find_widget;

// =============================================================================
// Key Combination
// =============================================================================

/// A single key combination (one key with modifiers), like "Ctrl+S".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    /// The primary key.
    pub key: Key,
    /// The modifier keys that must be held.
    pub modifiers: KeyboardModifiers,
}

impl KeyCombination {
    pub fn new(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn key_only(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::NONE)
    }

    pub fn ctrl(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::CTRL)
    }

    pub fn alt(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::ALT)
    }

    pub fn shift(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::SHIFT)
    }

    /// Check if this combination matches the given key and modifiers exactly.
    pub fn matches(&self, key: Key, modifiers: KeyboardModifiers) -> bool {
        self.key == key && self.modifiers == modifiers
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.control {
            parts.push("Ctrl".into());
        }
        if self.modifiers.alt {
            parts.push("Alt".into());
        }
        if self.modifiers.shift {
            parts.push("Shift".into());
        }
        if self.modifiers.meta {
            parts.push("Meta".into());
        }
        parts.push(self.key.name());
        write!(f, "{}", parts.join("+"))
    }
}

// =============================================================================
// Key Sequence
// =============================================================================

/// Maximum number of key combinations in a sequence.
pub const MAX_KEY_SEQUENCE_LENGTH: usize = 4;

/// A keyboard shortcut as a sequence of 1 to 4 key combinations.
///
/// Parsed from strings where combinations are separated by commas:
/// `"Ctrl+S"`, `"Alt+F4"`, `"Ctrl+K, Ctrl+C"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeySequence {
    combinations: Vec<KeyCombination>,
}

impl KeySequence {
    /// A single-combination sequence.
    pub fn new(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::from_combination(KeyCombination::new(key, modifiers))
    }

    pub fn from_combination(combo: KeyCombination) -> Self {
        Self {
            combinations: vec![combo],
        }
    }

    /// Build a chord, keeping at most [`MAX_KEY_SEQUENCE_LENGTH`] combinations.
    pub fn from_combinations(mut combos: Vec<KeyCombination>) -> Option<Self> {
        if combos.is_empty() {
            return None;
        }
        combos.truncate(MAX_KEY_SEQUENCE_LENGTH);
        Some(Self {
            combinations: combos,
        })
    }

    pub fn count(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_single(&self) -> bool {
        self.combinations.len() == 1
    }

    pub fn combinations(&self) -> &[KeyCombination] {
        &self.combinations
    }

    /// Check a sequence of pressed combinations against this shortcut.
    pub fn matches_partial(&self, pressed: &[KeyCombination]) -> SequenceMatch {
        if pressed.is_empty() || pressed.len() > self.combinations.len() {
            return SequenceMatch::NoMatch;
        }

        let prefix_matches = pressed
            .iter()
            .zip(&self.combinations)
            .all(|(p, c)| c.matches(p.key, p.modifiers));

        if !prefix_matches {
            SequenceMatch::NoMatch
        } else if pressed.len() == self.combinations.len() {
            SequenceMatch::ExactMatch
        } else {
            SequenceMatch::PartialMatch
        }
    }

    /// Whether one sequence is a prefix of the other (or they are equal).
    pub fn conflicts_with(&self, other: &KeySequence) -> bool {
        self.combinations
            .iter()
            .zip(&other.combinations)
            .all(|(a, b)| a == b)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let combos: Vec<String> = self.combinations.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", combos.join(", "))
    }
}

/// Result of matching a key sequence against pressed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceMatch {
    /// The pressed keys exactly match the sequence.
    ExactMatch,
    /// The pressed keys are a prefix of the sequence.
    PartialMatch,
    NoMatch,
}

/// Error type for parsing key sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySequenceParseError {
    /// The string is empty.
    Empty,
    /// No key was specified (only modifiers).
    NoKey,
    /// Unknown key name.
    UnknownKey(String),
    /// Too many key combinations (max 4).
    TooManyKeys,
}

impl fmt::Display for KeySequenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key sequence"),
            Self::NoKey => write!(f, "no key specified (only modifiers)"),
            Self::UnknownKey(s) => write!(f, "unknown key: {}", s),
            Self::TooManyKeys => write!(f, "too many key combinations (max 4)"),
        }
    }
}

impl std::error::Error for KeySequenceParseError {}

fn parse_key_combination(s: &str) -> std::result::Result<KeyCombination, KeySequenceParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(KeySequenceParseError::Empty);
    }

    let mut modifiers = KeyboardModifiers::NONE;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let part = part.trim();
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers.control = true,
            "alt" | "option" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            "meta" | "cmd" | "command" | "super" => modifiers.meta = true,
            _ => key = Some(parse_key(part)?),
        }
    }

    key.map(|k| KeyCombination::new(k, modifiers))
        .ok_or(KeySequenceParseError::NoKey)
}

fn parse_key(s: &str) -> std::result::Result<Key, KeySequenceParseError> {
    let unknown = || KeySequenceParseError::UnknownKey(s.to_string());
    let mut chars = s.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if let Some(key) = Key::from_char(ch) {
            return Ok(key);
        }
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return Key::function(n).ok_or_else(unknown);
    }

    let key = match lower.as_str() {
        "up" | "arrowup" => Key::ArrowUp,
        "down" | "arrowdown" => Key::ArrowDown,
        "left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrowright" => Key::ArrowRight,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "pgup" => Key::PageUp,
        "pagedown" | "pgdn" => Key::PageDown,
        "backspace" | "back" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "enter" | "return" => Key::Enter,
        "tab" => Key::Tab,
        "space" | "spacebar" => Key::Space,
        "escape" | "esc" => Key::Escape,
        "minus" | "-" => Key::Minus,
        "equal" | "equals" | "=" => Key::Equal,
        "bracketleft" | "[" => Key::BracketLeft,
        "bracketright" | "]" => Key::BracketRight,
        "backslash" | "\\" => Key::Backslash,
        "semicolon" | ";" => Key::Semicolon,
        "quote" | "'" => Key::Quote,
        "period" | "." => Key::Period,
        "slash" | "/" => Key::Slash,
        "grave" | "`" => Key::Grave,
        _ => return Err(unknown()),
    };
    Ok(key)
}

impl FromStr for KeySequence {
    type Err = KeySequenceParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeySequenceParseError::Empty);
        }

        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() > MAX_KEY_SEQUENCE_LENGTH {
            return Err(KeySequenceParseError::TooManyKeys);
        }

        let combinations = parts
            .into_iter()
            .map(parse_key_combination)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { combinations })
    }
}

// =============================================================================
// Shortcut
// =============================================================================

struct ShortcutState {
    key_sequence: KeySequence,
    enabled: bool,
    widget_id: Option<ObjectId>,
}

/// A standalone keyboard shortcut.
///
/// ```ignore
/// let save = Shortcut::parse("Ctrl+S")?;
/// save.activated.connect(|_| println!("save"));
/// ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL);
/// ```
pub struct Shortcut {
    object_base: ObjectBase,
    state: RwLock<ShortcutState>,

    /// Emitted when the shortcut is activated.
    pub activated: Signal<()>,
    /// Emitted before `activated` when several shortcuts matched the same keys.
    pub activated_ambiguously: Signal<()>,
}

impl Shortcut {
    /// Create a shortcut and register it with this thread's manager.
    pub fn new(key_sequence: KeySequence) -> ObjectResult<Arc<Self>> {
        let shortcut = Arc::new(Self {
            object_base: ObjectBase::new::<Self>()?,
            state: RwLock::new(ShortcutState {
                key_sequence,
                enabled: true,
                widget_id: None,
            }),
            activated: Signal::new(),
            activated_ambiguously: Signal::new(),
        });
        ShortcutManager::with_current(|manager| manager.register(&shortcut));
        tracing::debug!(target: targets::SHORTCUT, sequence = %shortcut.key_sequence(), "shortcut created");
        Ok(shortcut)
    }

    /// Parse and create a shortcut.
    pub fn parse(sequence: &str) -> Result<Arc<Self>> {
        Ok(Self::new(sequence.parse()?)?)
    }

    /// Create a shortcut that only fires while `widget` is alive and enabled.
    pub fn for_widget(key_sequence: KeySequence, widget: ObjectId) -> ObjectResult<Arc<Self>> {
        let shortcut = Self::new(key_sequence)?;
        shortcut.set_widget_id(Some(widget));
        Ok(shortcut)
    }

    pub fn key_sequence(&self) -> KeySequence {
        self.state.read().key_sequence.clone()
    }

    pub fn set_key_sequence(&self, sequence: KeySequence) {
        self.state.write().key_sequence = sequence;
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.write().enabled = enabled;
    }

    /// The widget this shortcut is bound to.
    pub fn widget_id(&self) -> Option<ObjectId> {
        self.state.read().widget_id
    }

    pub fn set_widget_id(&self, id: Option<ObjectId>) {
        self.state.write().widget_id = id;
    }

    /// Whether key presses may activate the shortcut right now.
    pub fn accepts_input(&self) -> bool {
        let state = self.state.read();
        if !state.enabled {
            return false;
        }
        match state.widget_id {
            None => true,
            Some(id) => find_widget(id).is_some_and(|w| {
                let base = w.widget_base();
                base.is_alive() && base.is_enabled()
            }),
        }
    }

    /// Emit `activated` if the shortcut accepts input.
    pub fn activate(&self) {
        if self.accepts_input() {
            tracing::debug!(target: targets::SHORTCUT, sequence = %self.key_sequence(), "shortcut activated");
            self.activated.emit(());
        }
    }

    /// Activate with ambiguity notification.
    pub fn activate_ambiguously(&self) {
        if self.accepts_input() {
            self.activated_ambiguously.emit(());
            self.activated.emit(());
        }
    }
}

impl Object for Shortcut {
    fn object_id(&self) -> ObjectId {
        self.object_base.id()
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut")
            .field("id", &self.object_base.id())
            .field("key_sequence", &self.key_sequence())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

static_assertions::assert_impl_all!(Shortcut: Send, Sync);

// =============================================================================
// Shortcut Manager
// =============================================================================

/// Default timeout for multi-key chord sequences (in milliseconds).
pub const DEFAULT_CHORD_TIMEOUT_MS: u64 = 1500;

struct ChordState {
    pressed: Vec<KeyCombination>,
    started_at: Option<Instant>,
    timeout: Duration,
}

impl ChordState {
    fn new(timeout_ms: u64) -> Self {
        Self {
            pressed: Vec::with_capacity(MAX_KEY_SEQUENCE_LENGTH),
            started_at: None,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    fn reset(&mut self) {
        self.pressed.clear();
        self.started_at = None;
    }

    fn is_expired(&self) -> bool {
        self.started_at
            .is_some_and(|start| start.elapsed() > self.timeout)
    }

    fn add_key(&mut self, combo: KeyCombination) {
        if self.pressed.is_empty() {
            self.started_at = Some(Instant::now());
        }
        self.pressed.push(combo);
    }
}

/// Result of processing a key event.
#[derive(Debug)]
pub enum ShortcutResult {
    /// One or more shortcuts matched.
    Activated(Vec<Arc<Shortcut>>),
    /// A chord prefix matched; waiting for more keys.
    Pending,
    NoMatch,
}

/// Tracks shortcuts and the multi-key chord state machine.
pub struct ShortcutManager {
    shortcuts: Vec<Weak<Shortcut>>,
    chord_state: ChordState,
}

thread_local! {
    static MANAGER: RefCell<ShortcutManager> = RefCell::new(ShortcutManager::new());
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_CHORD_TIMEOUT_MS)
    }

    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            shortcuts: Vec::new(),
            chord_state: ChordState::new(timeout_ms),
        }
    }

    /// Run `f` with this thread's manager.
    pub fn with_current<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ShortcutManager) -> R,
    {
        MANAGER.with_borrow_mut(f)
    }

    /// Route a key press through this thread's manager and activate matches.
    pub fn dispatch_key(key: Key, modifiers: KeyboardModifiers) -> ShortcutResult {
        let result = Self::with_current(|manager| manager.process_key(key, modifiers));
        if let ShortcutResult::Activated(matches) = &result {
            if matches.len() > 1 {
                matches.iter().for_each(|s| s.activate_ambiguously());
            } else {
                matches.iter().for_each(|s| s.activate());
            }
        }
        result
    }

    /// Track a shortcut. Registering twice has no effect.
    pub fn register(&mut self, shortcut: &Arc<Shortcut>) {
        self.prune();
        let id = shortcut.object_id();
        if !self.live().any(|s| s.object_id() == id) {
            self.shortcuts.push(Arc::downgrade(shortcut));
        }
    }

    pub fn unregister(&mut self, shortcut: &Shortcut) {
        let id = shortcut.object_id();
        self.shortcuts
            .retain(|s| s.upgrade().is_some_and(|s| s.object_id() != id));
    }

    pub fn clear(&mut self) {
        self.shortcuts.clear();
        self.chord_state.reset();
    }

    /// Live registered shortcuts.
    pub fn shortcuts(&self) -> Vec<Arc<Shortcut>> {
        self.live().collect()
    }

    pub fn is_chord_pending(&self) -> bool {
        !self.chord_state.pressed.is_empty()
    }

    pub fn cancel_chord(&mut self) {
        self.chord_state.reset();
    }

    fn live(&self) -> impl Iterator<Item = Arc<Shortcut>> + '_ {
        self.shortcuts.iter().filter_map(Weak::upgrade)
    }

    fn prune(&mut self) {
        self.shortcuts.retain(|s| s.strong_count() > 0);
    }

    /// Match a key press against the registered shortcuts.
    ///
    /// Only shortcuts that currently accept input take part. Matches are
    /// returned, not activated; see [`dispatch_key`](Self::dispatch_key).
    pub fn process_key(&mut self, key: Key, modifiers: KeyboardModifiers) -> ShortcutResult {
        if self.chord_state.is_expired() {
            self.chord_state.reset();
        }
        self.prune();
        self.chord_state.add_key(KeyCombination::new(key, modifiers));

        let mut exact_matches = Vec::new();
        let mut has_partial = false;
        for shortcut in self.live().filter(|s| s.accepts_input()) {
            match shortcut.key_sequence().matches_partial(&self.chord_state.pressed) {
                SequenceMatch::ExactMatch => exact_matches.push(shortcut),
                SequenceMatch::PartialMatch => has_partial = true,
                SequenceMatch::NoMatch => {}
            }
        }

        if !exact_matches.is_empty() {
            self.chord_state.reset();
            return ShortcutResult::Activated(exact_matches);
        }
        if has_partial {
            return ShortcutResult::Pending;
        }
        self.chord_state.reset();
        ShortcutResult::NoMatch
    }

    /// Shortcuts whose sequence equals or is a prefix of `sequence` (or vice versa).
    pub fn find_conflicts(&self, sequence: &KeySequence) -> Vec<Arc<Shortcut>> {
        self.live()
            .filter(|s| s.key_sequence().conflicts_with(sequence))
            .collect()
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use crate::widget::widgets::LineEdit;
    use crate::widget::{Widget, destroy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() {
        init_global_registry();
        ShortcutManager::with_current(|m| m.clear());
    }

    fn counter(shortcut: &Shortcut) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let c = hits.clone();
        shortcut.activated.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        hits
    }

    #[test]
    fn test_parse_simple_and_modifiers() {
        let seq: KeySequence = "Ctrl+Shift+s".parse().unwrap();
        assert_eq!(seq.combinations()[0], KeyCombination::new(Key::S, KeyboardModifiers::CTRL_SHIFT));
        assert_eq!(seq.to_string(), "Ctrl+Shift+S");

        let f5: KeySequence = "F5".parse().unwrap();
        assert_eq!(f5.combinations()[0].key, Key::F5);
        let esc: KeySequence = "Esc".parse().unwrap();
        assert_eq!(esc.combinations()[0].key, Key::Escape);
    }

    #[test]
    fn test_parse_chords() {
        let seq: KeySequence = "Ctrl+K, Ctrl+C".parse().unwrap();
        assert_eq!(seq.count(), 2);
        assert_eq!(seq.to_string(), "Ctrl+K, Ctrl+C");
        assert_eq!(
            "A, B, C, D, E".parse::<KeySequence>(),
            Err(KeySequenceParseError::TooManyKeys)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeySequence>(), Err(KeySequenceParseError::Empty));
        assert_eq!("Ctrl+Shift".parse::<KeySequence>(), Err(KeySequenceParseError::NoKey));
        assert_eq!(
            "Ctrl+Banana".parse::<KeySequence>(),
            Err(KeySequenceParseError::UnknownKey("Banana".into()))
        );
        assert_eq!(
            KeySequenceParseError::UnknownKey("Q2".into()).to_string(),
            "unknown key: Q2"
        );
    }

    #[test]
    fn test_partial_match() {
        let seq: KeySequence = "Ctrl+K, Ctrl+C".parse().unwrap();
        let k = KeyCombination::ctrl(Key::K);
        let c = KeyCombination::ctrl(Key::C);
        assert_eq!(seq.matches_partial(&[k]), SequenceMatch::PartialMatch);
        assert_eq!(seq.matches_partial(&[k, c]), SequenceMatch::ExactMatch);
        assert_eq!(seq.matches_partial(&[c]), SequenceMatch::NoMatch);
        assert_eq!(seq.matches_partial(&[]), SequenceMatch::NoMatch);
    }

    #[test]
    fn test_dispatch_single_key() {
        setup();
        let save = Shortcut::parse("Ctrl+S").unwrap();
        let hits = counter(&save);

        assert!(matches!(
            ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL),
            ShortcutResult::Activated(_)
        ));
        assert!(matches!(
            ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::NONE),
            ShortcutResult::NoMatch
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_chord() {
        setup();
        let comment = Shortcut::parse("Ctrl+K, Ctrl+C").unwrap();
        let hits = counter(&comment);

        assert!(matches!(
            ShortcutManager::dispatch_key(Key::K, KeyboardModifiers::CTRL),
            ShortcutResult::Pending
        ));
        assert!(ShortcutManager::with_current(|m| m.is_chord_pending()));
        ShortcutManager::dispatch_key(Key::C, KeyboardModifiers::CTRL);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_and_dropped_shortcuts_do_not_fire() {
        setup();
        let save = Shortcut::parse("Ctrl+S").unwrap();
        let hits = counter(&save);
        save.set_enabled(false);
        assert!(matches!(
            ShortcutManager::dispatch_key(Key::S, KeyboardModifiers::CTRL),
            ShortcutResult::NoMatch
        ));

        drop(save);
        assert!(ShortcutManager::with_current(|m| m.shortcuts().is_empty()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_widget_bound_shortcut_follows_widget() {
        setup();
        let edit = LineEdit::new().unwrap();
        let find = Shortcut::for_widget("Ctrl+F".parse().unwrap(), edit.object_id()).unwrap();
        let hits = counter(&find);

        edit.widget_base().set_enabled(false);
        ShortcutManager::dispatch_key(Key::F, KeyboardModifiers::CTRL);
        edit.widget_base().set_enabled(true);
        ShortcutManager::dispatch_key(Key::F, KeyboardModifiers::CTRL);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let widget: crate::widget::WidgetRef = edit;
        destroy(&widget).unwrap();
        ShortcutManager::dispatch_key(Key::F, KeyboardModifiers::CTRL);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_find_conflicts() {
        setup();
        let _a = Shortcut::parse("Ctrl+K, Ctrl+C").unwrap();
        let _b = Shortcut::parse("Ctrl+S").unwrap();
        let conflicts =
            ShortcutManager::with_current(|m| m.find_conflicts(&"Ctrl+K".parse().unwrap()));
        assert_eq!(conflicts.len(), 1);
    }
}
