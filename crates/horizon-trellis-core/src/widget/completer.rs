//! Completer/autocomplete functionality for text input widgets.
//!
//! This module provides [`Completer`], which filters a [`CompleterModel`]
//! against the text being typed and tracks a popup selection. Completers are
//! shared (`Arc<Completer>`) between the widget they are attached to and the
//! code that configures them, so all state is behind interior mutability.
//!
//! # Example
//!
//! ```
//! use horizon_trellis_core::widget::{Completer, MatchMode};
//!
//! let completer = Completer::with_strings(["apple", "application", "pineapple"]);
//! completer.set_match_mode(MatchMode::Contains);
//! completer.show_popup("app");
//! assert_eq!(completer.completions().len(), 3);
//! assert_eq!(completer.complete().as_deref(), Some("apple"));
//! ```

use parking_lot::RwLock;

use crate::signal::Signal;

/// Controls how completion matching handles letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// Case-sensitive matching (e.g., "App" won't match "apple").
    CaseSensitive,
    /// Case-insensitive matching (e.g., "App" will match "apple").
    #[default]
    CaseInsensitive,
}

/// Where the typed text must occur in a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    StartsWith,
    Contains,
}

impl MatchMode {
    fn matches(self, candidate: &str, text: &str, case: CaseSensitivity) -> bool {
        let (candidate, text) = match case {
            CaseSensitivity::CaseSensitive => (candidate.to_string(), text.to_string()),
            CaseSensitivity::CaseInsensitive => (candidate.to_lowercase(), text.to_lowercase()),
        };
        match self {
            Self::StartsWith => candidate.starts_with(&text),
            Self::Contains => candidate.contains(&text),
        }
    }
}

/// Trait for providing completion suggestions.
pub trait CompleterModel: Send + Sync {
    /// Completions matching `text`, ordered by relevance.
    fn completions(&self, text: &str, case_sensitivity: CaseSensitivity, mode: MatchMode)
    -> Vec<String>;

    /// Total number of items before filtering, if known.
    fn count(&self) -> Option<usize> {
        None
    }
}

/// A completer model backed by a list of strings.
#[derive(Debug, Clone, Default)]
pub struct StringListModel {
    items: Vec<String>,
}

impl StringListModel {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
    }

    pub fn add_item(&mut self, item: String) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, item: &str) {
        self.items.retain(|i| i != item);
    }
}

impl CompleterModel for StringListModel {
    fn completions(
        &self,
        text: &str,
        case_sensitivity: CaseSensitivity,
        mode: MatchMode,
    ) -> Vec<String> {
        if text.is_empty() {
            return self.items.clone();
        }
        self.items
            .iter()
            .filter(|item| mode.matches(item, text, case_sensitivity))
            .cloned()
            .collect()
    }

    fn count(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

impl From<Vec<String>> for StringListModel {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

#[derive(Default)]
struct PopupState {
    visible: bool,
    prefix: String,
    completions: Vec<String>,
    selected: Option<usize>,
}

/// Autocompletion over a [`CompleterModel`].
///
/// # Signals
///
/// - `activated(String)`: a completion was accepted
/// - `highlighted(String)`: the highlighted completion changed
pub struct Completer {
    model: RwLock<Box<dyn CompleterModel>>,
    case_sensitivity: RwLock<CaseSensitivity>,
    match_mode: RwLock<MatchMode>,
    min_chars: RwLock<usize>,
    popup: RwLock<PopupState>,

    /// Emitted when a completion is accepted.
    pub activated: Signal<String>,
    /// Emitted when the highlighted completion changes.
    pub highlighted: Signal<String>,
}

impl Completer {
    pub fn new(model: Box<dyn CompleterModel>) -> Self {
        Self {
            model: RwLock::new(model),
            case_sensitivity: RwLock::new(CaseSensitivity::CaseInsensitive),
            match_mode: RwLock::new(MatchMode::StartsWith),
            min_chars: RwLock::new(1),
            popup: RwLock::new(PopupState::default()),
            activated: Signal::new(),
            highlighted: Signal::new(),
        }
    }

    /// A completer over a fixed list of strings.
    pub fn with_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        Self::new(Box::new(StringListModel::new(items)))
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        *self.case_sensitivity.read()
    }

    pub fn set_case_sensitivity(&self, sensitivity: CaseSensitivity) {
        *self.case_sensitivity.write() = sensitivity;
    }

    pub fn match_mode(&self) -> MatchMode {
        *self.match_mode.read()
    }

    pub fn set_match_mode(&self, mode: MatchMode) {
        *self.match_mode.write() = mode;
    }

    /// Minimum characters typed before completions are offered.
    pub fn min_chars(&self) -> usize {
        *self.min_chars.read()
    }

    pub fn set_min_chars(&self, count: usize) {
        *self.min_chars.write() = count;
    }

    /// Replace the model, clearing current completions.
    pub fn set_model(&self, model: Box<dyn CompleterModel>) {
        *self.model.write() = model;
        let mut popup = self.popup.write();
        popup.completions.clear();
        popup.selected = None;
    }

    pub fn model_count(&self) -> Option<usize> {
        self.model.read().count()
    }

    // =========================================================================
    // Completions and popup
    // =========================================================================

    /// Recompute completions for `prefix`.
    pub fn update_completions(&self, prefix: &str) {
        let completions = if prefix.chars().count() < self.min_chars() {
            Vec::new()
        } else {
            self.model
                .read()
                .completions(prefix, self.case_sensitivity(), self.match_mode())
        };
        let mut popup = self.popup.write();
        popup.prefix = prefix.to_string();
        popup.selected = if completions.is_empty() { None } else { Some(0) };
        popup.completions = completions;
    }

    /// Current completions.
    pub fn completions(&self) -> Vec<String> {
        self.popup.read().completions.clone()
    }

    /// The prefix completions were last computed for.
    pub fn completion_prefix(&self) -> String {
        self.popup.read().prefix.clone()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.popup.read().visible
    }

    /// Compute completions and show the popup if any matched.
    pub fn show_popup(&self, prefix: &str) {
        self.update_completions(prefix);
        let first = {
            let mut popup = self.popup.write();
            popup.visible = !popup.completions.is_empty();
            popup.completions.first().cloned()
        };
        if let Some(first) = first {
            self.highlighted.emit(first);
        }
    }

    pub fn hide_popup(&self) {
        let mut popup = self.popup.write();
        popup.visible = false;
        popup.selected = None;
    }

    /// Index of the highlighted completion.
    pub fn selected_index(&self) -> Option<usize> {
        self.popup.read().selected
    }

    /// Accept the highlighted completion, hiding the popup.
    pub fn complete(&self) -> Option<String> {
        let text = {
            let popup = self.popup.read();
            if !popup.visible {
                return None;
            }
            popup.selected.and_then(|i| popup.completions.get(i).cloned())
        }?;
        self.hide_popup();
        self.activated.emit(text.clone());
        Some(text)
    }

    /// Move the highlight up, wrapping to the bottom.
    pub fn move_up(&self) {
        self.step(|selected, len| if selected == 0 { len - 1 } else { selected - 1 });
    }

    /// Move the highlight down, wrapping to the top.
    pub fn move_down(&self) {
        self.step(|selected, len| (selected + 1) % len);
    }

    fn step(&self, next: impl FnOnce(usize, usize) -> usize) {
        let highlighted = {
            let mut popup = self.popup.write();
            let len = popup.completions.len();
            if !popup.visible || len == 0 {
                return;
            }
            let index = next(popup.selected.unwrap_or(0), len);
            popup.selected = Some(index);
            popup.completions[index].clone()
        };
        self.highlighted.emit(highlighted);
    }
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("case_sensitivity", &self.case_sensitivity())
            .field("match_mode", &self.match_mode())
            .field("min_chars", &self.min_chars())
            .field("popup_visible", &self.is_popup_visible())
            .finish()
    }
}

static_assertions::assert_impl_all!(Completer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn fruit() -> Completer {
        Completer::with_strings(["apple", "application", "banana", "Pineapple"])
    }

    #[test]
    fn test_string_list_model_modes() {
        let model = StringListModel::new(vec!["Apple".into(), "pineapple".into()]);
        assert_eq!(
            model.completions("app", CaseSensitivity::CaseInsensitive, MatchMode::StartsWith),
            vec!["Apple".to_string()]
        );
        assert!(
            model
                .completions("app", CaseSensitivity::CaseSensitive, MatchMode::StartsWith)
                .is_empty()
        );
        assert_eq!(
            model
                .completions("app", CaseSensitivity::CaseInsensitive, MatchMode::Contains)
                .len(),
            2
        );
        assert_eq!(model.count(), Some(2));
    }

    #[test]
    fn test_navigation_wraps() {
        let completer = fruit();
        completer.show_popup("app");
        assert!(completer.is_popup_visible());
        assert_eq!(completer.selected_index(), Some(0));

        completer.move_down();
        assert_eq!(completer.selected_index(), Some(1));
        completer.move_down();
        assert_eq!(completer.selected_index(), Some(0));
        completer.move_up();
        assert_eq!(completer.selected_index(), Some(1));
    }

    #[test]
    fn test_complete_emits_activated() {
        let completer = fruit();
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let log = accepted.clone();
        completer.activated.connect(move |text| log.lock().push(text.clone()));

        assert_eq!(completer.complete(), None);
        completer.show_popup("ban");
        assert_eq!(completer.complete().as_deref(), Some("banana"));
        assert!(!completer.is_popup_visible());
        assert_eq!(*accepted.lock(), vec!["banana".to_string()]);
    }

    #[test]
    fn test_min_chars() {
        let completer = fruit();
        completer.set_min_chars(3);
        completer.show_popup("ap");
        assert!(!completer.is_popup_visible());
        completer.show_popup("app");
        assert!(completer.is_popup_visible());
    }
}
