//! Accessibility metadata, announcements and keyboard navigation.
//!
//! The [`AccessibilityManager`] keeps an [`AccessibilityProperties`] record
//! per registered widget. Records go away with their widget. Metadata is
//! usually attached with the fluent [`AccessibilityBuilder`]:
//!
//! ```
//! use horizon_trellis::accessibility::{AccessibleRole, accessibility_for};
//! use horizon_trellis::toolkit::init_global_registry;
//! use horizon_trellis::toolkit::widget::Widget;
//! use horizon_trellis::toolkit::widget::widgets::PushButton;
//!
//! init_global_registry();
//! let button = PushButton::with_text("Save").unwrap();
//! accessibility_for(&button)
//!     .name("Save document")
//!     .role(AccessibleRole::Button)
//!     .tab_index(1)
//!     .apply();
//!
//! assert_eq!(button.widget_base().accessible_name(), "Save document");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use chrono::{DateTime, Local};
use horizon_trellis_core::widget::{FocusPolicy, WidgetRef, find_widget};
use horizon_trellis_core::{ObjectId, Signal, WidgetEvent, global_registry};
use horizon_trellis_style::ThemeManager;
use parking_lot::{Mutex, RwLock};

use crate::logging::targets;
use crate::memory::WidgetHandle;

/// What a widget is, for assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessibleRole {
    Button,
    CheckBox,
    ComboBox,
    Dialog,
    Group,
    Heading,
    Label,
    Link,
    List,
    ListItem,
    Menu,
    MenuItem,
    ProgressBar,
    RadioButton,
    ScrollBar,
    Slider,
    SpinBox,
    Tab,
    TabList,
    TabPanel,
    Table,
    TableCell,
    TableHeader,
    TextEdit,
    ToolBar,
    ToolTip,
    Tree,
    TreeItem,
    Window,
    #[default]
    Generic,
}

impl AccessibleRole {
    pub fn name(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::CheckBox => "checkbox",
            Self::ComboBox => "combobox",
            Self::Dialog => "dialog",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Label => "label",
            Self::Link => "link",
            Self::List => "list",
            Self::ListItem => "listitem",
            Self::Menu => "menu",
            Self::MenuItem => "menuitem",
            Self::ProgressBar => "progressbar",
            Self::RadioButton => "radio",
            Self::ScrollBar => "scrollbar",
            Self::Slider => "slider",
            Self::SpinBox => "spinbutton",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::Table => "table",
            Self::TableCell => "cell",
            Self::TableHeader => "columnheader",
            Self::TextEdit => "textbox",
            Self::ToolBar => "toolbar",
            Self::ToolTip => "tooltip",
            Self::Tree => "tree",
            Self::TreeItem => "treeitem",
            Self::Window => "window",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for AccessibleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State flags reported alongside the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilityState {
    pub enabled: bool,
    pub visible: bool,
    pub focused: bool,
    pub selected: bool,
    pub checked: bool,
    pub expanded: bool,
    pub pressed: bool,
    pub read_only: bool,
    pub required: bool,
    pub has_popup: bool,
    pub modal: bool,
}

impl Default for AccessibilityState {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            focused: false,
            selected: false,
            checked: false,
            expanded: false,
            pressed: false,
            read_only: false,
            required: false,
            has_popup: false,
            modal: false,
        }
    }
}

/// Links to related widgets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessibilityRelations {
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub labelled_by: Option<ObjectId>,
    pub described_by: Option<ObjectId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessibleRange {
    pub minimum: f64,
    pub maximum: f64,
    pub current: f64,
    pub step: f64,
}

/// Everything assistive technology can learn about one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibilityProperties {
    pub name: String,
    pub description: String,
    pub help_text: String,
    pub value: String,
    pub role: AccessibleRole,
    pub state: AccessibilityState,
    pub relations: AccessibilityRelations,
    pub next: Option<ObjectId>,
    pub previous: Option<ObjectId>,
    /// Position in the tab order; negative values leave the widget out.
    pub tab_index: i32,
    pub range: Option<AccessibleRange>,
}

impl Default for AccessibilityProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            help_text: String::new(),
            value: String::new(),
            role: AccessibleRole::Generic,
            state: AccessibilityState::default(),
            relations: AccessibilityRelations::default(),
            next: None,
            previous: None,
            tab_index: -1,
            range: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnouncementPriority {
    /// Read when the user is idle.
    #[default]
    Polite,
    /// Interrupts whatever is being read.
    Assertive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub priority: AnnouncementPriority,
    pub timestamp: DateTime<Local>,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<ObjectId, AccessibilityProperties>,
    // Registration order breaks ties between equal tab indices.
    order: Vec<ObjectId>,
}

struct ManagerState {
    enabled: AtomicBool,
    high_contrast: AtomicBool,
    keyboard_navigation: AtomicBool,
    registry: RwLock<Registry>,
    announcements: Mutex<Vec<Announcement>>,
    focused: Mutex<Option<ObjectId>>,
    themes: Option<Arc<ThemeManager>>,
    announced: Signal<Announcement>,
    high_contrast_changed: Signal<bool>,
    focus_moved: Signal<ObjectId>,
}

/// Process-wide accessibility state.
pub struct AccessibilityManager {
    state: Arc<ManagerState>,
}

static GLOBAL: OnceLock<AccessibilityManager> = OnceLock::new();

impl AccessibilityManager {
    /// A manager that switches themes on the global [`ThemeManager`].
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A manager that switches themes on `themes`.
    pub fn with_theme_manager(themes: Arc<ThemeManager>) -> Self {
        Self::build(Some(themes))
    }

    fn build(themes: Option<Arc<ThemeManager>>) -> Self {
        Self {
            state: Arc::new(ManagerState {
                enabled: AtomicBool::new(true),
                high_contrast: AtomicBool::new(false),
                keyboard_navigation: AtomicBool::new(true),
                registry: RwLock::new(Registry::default()),
                announcements: Mutex::new(Vec::new()),
                focused: Mutex::new(None),
                themes,
                announced: Signal::new(),
                high_contrast_changed: Signal::new(),
                focus_moved: Signal::new(),
            }),
        }
    }

    pub fn global() -> &'static AccessibilityManager {
        GLOBAL.get_or_init(AccessibilityManager::new)
    }

    fn themes(&self) -> &ThemeManager {
        self.state.themes.as_deref().unwrap_or_else(|| ThemeManager::global())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Store `properties` for a widget, replacing any earlier record.
    pub fn register(&self, widget: &impl WidgetHandle, properties: AccessibilityProperties) {
        let widget = widget.widget_ref();
        let id = widget.object_id();
        let fresh = {
            let mut registry = self.state.registry.write();
            let fresh = registry.entries.insert(id, properties).is_none();
            if fresh {
                registry.order.push(id);
            }
            fresh
        };
        if fresh {
            let state = Arc::downgrade(&self.state);
            if let Ok(registry) = global_registry() {
                registry.on_destroyed(id, move |id| forget(&state, id));
            }
        }
        tracing::debug!(target: targets::ACCESSIBILITY, ?id, class = widget.class_name(), "accessibility registered");
    }

    /// Edit a registered record in place. Returns `false` for unknown widgets.
    pub fn update(&self, id: ObjectId, edit: impl FnOnce(&mut AccessibilityProperties)) -> bool {
        match self.state.registry.write().entries.get_mut(&id) {
            Some(properties) => {
                edit(properties);
                true
            }
            None => false,
        }
    }

    pub fn properties(&self, id: ObjectId) -> Option<AccessibilityProperties> {
        self.state.registry.read().entries.get(&id).cloned()
    }

    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.state.registry.read().entries.contains_key(&id)
    }

    pub fn unregister(&self, id: ObjectId) -> bool {
        forget_in(&self.state, id)
    }

    pub fn registered_count(&self) -> usize {
        self.state.registry.read().entries.len()
    }

    // =========================================================================
    // High contrast
    // =========================================================================

    pub fn is_high_contrast(&self) -> bool {
        self.state.high_contrast.load(Ordering::Relaxed)
    }

    /// Switch to the high-contrast theme, or back to the light theme.
    pub fn set_high_contrast(&self, enabled: bool) {
        if self.state.high_contrast.swap(enabled, Ordering::Relaxed) == enabled {
            return;
        }
        if enabled {
            self.themes().load_high_contrast_theme();
        } else {
            self.themes().load_light_theme();
        }
        tracing::debug!(target: targets::ACCESSIBILITY, enabled, "high contrast mode changed");
        self.state.high_contrast_changed.emit(enabled);
    }

    pub fn high_contrast_changed(&self) -> &Signal<bool> {
        &self.state.high_contrast_changed
    }

    // =========================================================================
    // Announcements
    // =========================================================================

    /// Queue text for screen readers. Ignored while the manager is disabled.
    pub fn announce(&self, text: impl Into<String>, priority: AnnouncementPriority) {
        if !self.is_enabled() {
            return;
        }
        let announcement = Announcement {
            text: text.into(),
            priority,
            timestamp: Local::now(),
        };
        tracing::info!(target: targets::ACCESSIBILITY, text = %announcement.text, ?priority, "announcement");
        self.state.announcements.lock().push(announcement.clone());
        self.state.announced.emit(announcement);
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.state.announcements.lock().clone()
    }

    pub fn clear_announcements(&self) {
        self.state.announcements.lock().clear();
    }

    pub fn announced(&self) -> &Signal<Announcement> {
        &self.state.announced
    }

    // =========================================================================
    // Keyboard navigation
    // =========================================================================

    pub fn keyboard_navigation_enabled(&self) -> bool {
        self.state.keyboard_navigation.load(Ordering::Relaxed)
    }

    pub fn set_keyboard_navigation_enabled(&self, enabled: bool) {
        self.state.keyboard_navigation.store(enabled, Ordering::Relaxed);
    }

    /// Registered, live, enabled widgets in tab order.
    pub fn tab_order(&self) -> Vec<ObjectId> {
        let registry = self.state.registry.read();
        let mut ordered: Vec<(i32, usize, ObjectId)> = registry
            .order
            .iter()
            .enumerate()
            .filter_map(|(position, id)| {
                let properties = registry.entries.get(id)?;
                (properties.tab_index >= 0).then_some((properties.tab_index, position, *id))
            })
            .collect();
        drop(registry);
        ordered.sort_unstable();
        ordered
            .into_iter()
            .map(|(_, _, id)| id)
            .filter(|id| find_widget(*id).is_some_and(|w| focusable(&w)))
            .collect()
    }

    pub fn focused(&self) -> Option<ObjectId> {
        *self.state.focused.lock()
    }

    /// Move focus forward in tab order, wrapping at the end.
    pub fn focus_next(&self) -> Option<ObjectId> {
        self.move_focus(1)
    }

    /// Move focus backward in tab order, wrapping at the start.
    pub fn focus_previous(&self) -> Option<ObjectId> {
        self.move_focus(-1)
    }

    /// Focus a specific widget.
    pub fn set_focus(&self, id: ObjectId) -> bool {
        let Some(target) = find_widget(id).filter(focusable) else {
            return false;
        };
        let previous = self.state.focused.lock().replace(id);
        if previous == Some(id) {
            return true;
        }
        if let Some(old) = previous.and_then(find_widget) {
            old.send_event(&WidgetEvent::FocusOut);
        }
        target.send_event(&WidgetEvent::FocusIn);
        self.update(id, |properties| properties.state.focused = true);
        if let Some(old) = previous {
            self.update(old, |properties| properties.state.focused = false);
        }
        self.state.focus_moved.emit(id);
        true
    }

    pub fn focus_moved(&self) -> &Signal<ObjectId> {
        &self.state.focus_moved
    }

    fn move_focus(&self, step: isize) -> Option<ObjectId> {
        if !self.keyboard_navigation_enabled() {
            return None;
        }
        let order = self.tab_order();
        if order.is_empty() {
            return None;
        }
        let len = order.len() as isize;
        let current = self
            .focused()
            .and_then(|id| order.iter().position(|candidate| *candidate == id));
        let next = match current {
            Some(index) => (index as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        let id = order[next as usize];
        self.set_focus(id).then_some(id)
    }
}

fn focusable(widget: &WidgetRef) -> bool {
    let base = widget.widget_base();
    base.is_enabled() && base.is_visible() && base.focus_policy() != FocusPolicy::NoFocus
}

fn forget_in(state: &ManagerState, id: ObjectId) -> bool {
    let mut registry = state.registry.write();
    registry.order.retain(|candidate| *candidate != id);
    let removed = registry.entries.remove(&id).is_some();
    drop(registry);
    let mut focused = state.focused.lock();
    if *focused == Some(id) {
        *focused = None;
    }
    removed
}

fn forget(state: &Weak<ManagerState>, id: ObjectId) {
    if let Some(state) = state.upgrade() {
        forget_in(&state, id);
    }
}

impl Default for AccessibilityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessibilityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessibilityManager")
            .field("enabled", &self.is_enabled())
            .field("high_contrast", &self.is_high_contrast())
            .field("registered", &self.registered_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(AccessibilityManager: Send, Sync);

/// Start describing `widget`.
pub fn accessibility_for(widget: &impl WidgetHandle) -> AccessibilityBuilder {
    AccessibilityBuilder::new(widget.widget_ref())
}

/// Fluent accessibility metadata for one widget.
#[must_use = "call apply() to attach the metadata"]
pub struct AccessibilityBuilder {
    widget: WidgetRef,
    properties: AccessibilityProperties,
    manager: Option<Arc<AccessibilityManager>>,
}

impl AccessibilityBuilder {
    pub fn new(widget: WidgetRef) -> Self {
        Self {
            widget,
            properties: AccessibilityProperties::default(),
            manager: None,
        }
    }

    /// Register with `manager` instead of the global one.
    pub fn manager(mut self, manager: Arc<AccessibilityManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.properties.description = description.into();
        self
    }

    /// Shown as the tooltip as well.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.properties.help_text = help.into();
        self
    }

    pub fn role(mut self, role: AccessibleRole) -> Self {
        self.properties.role = role;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.properties.value = value.into();
        self
    }

    pub fn range(mut self, minimum: f64, maximum: f64, current: f64, step: f64) -> Self {
        self.properties.range = Some(AccessibleRange {
            minimum,
            maximum,
            current,
            step,
        });
        self
    }

    pub fn state(mut self, state: AccessibilityState) -> Self {
        self.properties.state = state;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.properties.state.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.properties.state.read_only = read_only;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.properties.state.checked = checked;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.properties.state.expanded = expanded;
        self
    }

    pub fn has_popup(mut self, has_popup: bool) -> Self {
        self.properties.state.has_popup = has_popup;
        self
    }

    pub fn labelled_by(mut self, label: &impl WidgetHandle) -> Self {
        self.properties.relations.labelled_by = Some(label.widget_ref().object_id());
        self
    }

    pub fn described_by(mut self, description: &impl WidgetHandle) -> Self {
        self.properties.relations.described_by = Some(description.widget_ref().object_id());
        self
    }

    pub fn next(mut self, next: &impl WidgetHandle) -> Self {
        self.properties.next = Some(next.widget_ref().object_id());
        self
    }

    pub fn previous(mut self, previous: &impl WidgetHandle) -> Self {
        self.properties.previous = Some(previous.widget_ref().object_id());
        self
    }

    pub fn tab_index(mut self, index: i32) -> Self {
        self.properties.tab_index = index;
        self
    }

    pub fn properties(&self) -> &AccessibilityProperties {
        &self.properties
    }

    /// Write the metadata to the widget and register it.
    pub fn apply(self) -> AccessibilityProperties {
        let Self {
            widget,
            mut properties,
            manager,
        } = self;
        let base = widget.widget_base();
        if !properties.name.is_empty() {
            base.set_accessible_name(properties.name.clone());
        }
        if !properties.description.is_empty() {
            base.set_accessible_description(properties.description.clone());
        }
        if !properties.help_text.is_empty() {
            base.set_tool_tip(properties.help_text.clone());
        }
        if properties.tab_index >= 0 {
            base.set_tab_index(properties.tab_index);
        }
        properties.relations.parent = base.parent_id();
        properties.relations.children = base.children_ids();
        properties.state.enabled = base.is_enabled();
        properties.state.visible = base.is_visible();

        let manager = manager.as_deref().unwrap_or_else(|| AccessibilityManager::global());
        manager.register(&widget, properties.clone());
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use horizon_trellis_core::widget::widgets::{Label, LineEdit, PushButton};
    use horizon_trellis_core::widget::{self, Widget};

    fn setup() -> Arc<AccessibilityManager> {
        init_global_registry();
        Arc::new(AccessibilityManager::with_theme_manager(Arc::new(
            ThemeManager::new(),
        )))
    }

    #[test]
    fn test_builder_writes_widget_and_registers() {
        let manager = setup();
        let edit = LineEdit::new().unwrap();
        let label = Label::with_text("Email").unwrap();
        let properties = accessibility_for(&edit)
            .manager(manager.clone())
            .name("Email address")
            .description("Where we send receipts")
            .help("name@example.com")
            .role(AccessibleRole::TextEdit)
            .required(true)
            .labelled_by(&label)
            .tab_index(2)
            .apply();

        let base = edit.widget_base();
        assert_eq!(base.accessible_name(), "Email address");
        assert_eq!(base.accessible_description(), "Where we send receipts");
        assert_eq!(base.tool_tip(), "name@example.com");
        assert_eq!(base.tab_index(), 2);

        let stored = manager.properties(edit.object_id()).unwrap();
        assert_eq!(stored, properties);
        assert!(stored.state.required);
        assert_eq!(stored.relations.labelled_by, Some(label.object_id()));
    }

    #[test]
    fn test_records_follow_widget_lifetime() {
        let manager = setup();
        let button = PushButton::new().unwrap();
        manager.register(&button, AccessibilityProperties::default());
        assert!(manager.is_registered(button.object_id()));

        assert!(manager.update(button.object_id(), |p| p.value = "on".into()));
        assert_eq!(manager.properties(button.object_id()).unwrap().value, "on");

        let as_ref: WidgetRef = button.clone();
        widget::destroy(&as_ref).unwrap();
        assert!(!manager.is_registered(button.object_id()));
        assert!(!manager.update(button.object_id(), |_| {}));
    }

    #[test]
    fn test_announcements() {
        let manager = setup();
        let heard = Arc::new(Mutex::new(Vec::new()));
        let sink = heard.clone();
        manager
            .announced()
            .connect(move |a: &Announcement| sink.lock().push(a.text.clone()));

        manager.announce("Saved", AnnouncementPriority::Polite);
        manager.set_enabled(false);
        manager.announce("ignored", AnnouncementPriority::Assertive);

        assert_eq!(*heard.lock(), vec!["Saved".to_string()]);
        assert_eq!(manager.announcements().len(), 1);
        manager.clear_announcements();
        assert!(manager.announcements().is_empty());
    }

    #[test]
    fn test_high_contrast_switches_theme() {
        init_global_registry();
        let themes = Arc::new(ThemeManager::new());
        let manager = AccessibilityManager::with_theme_manager(themes.clone());

        manager.set_high_contrast(true);
        assert!(manager.is_high_contrast());
        assert_eq!(themes.current_theme_name(), "High Contrast");

        manager.set_high_contrast(false);
        assert_eq!(themes.current_theme_name(), "Light");
    }

    #[test]
    fn test_tab_navigation_wraps() {
        let manager = setup();
        let first = PushButton::new().unwrap();
        let second = LineEdit::new().unwrap();
        let skipped = PushButton::new().unwrap();
        let disabled = PushButton::new().unwrap();
        disabled.widget_base().set_enabled(false);

        for (widget, index) in [
            (first.clone() as WidgetRef, 1),
            (second.clone() as WidgetRef, 0),
            (skipped.clone() as WidgetRef, -1),
            (disabled.clone() as WidgetRef, 2),
        ] {
            manager.register(
                &widget,
                AccessibilityProperties {
                    tab_index: index,
                    ..Default::default()
                },
            );
        }

        assert_eq!(manager.tab_order(), vec![second.object_id(), first.object_id()]);
        assert_eq!(manager.focus_next(), Some(second.object_id()));
        assert!(second.widget_base().has_focus());
        assert_eq!(manager.focus_next(), Some(first.object_id()));
        assert!(!second.widget_base().has_focus());
        assert_eq!(manager.focus_next(), Some(second.object_id()));
        assert_eq!(manager.focus_previous(), Some(first.object_id()));

        manager.set_keyboard_navigation_enabled(false);
        assert_eq!(manager.focus_next(), None);
    }
}
