//! Mount, update and unmount hooks for a built element.
//!
//! Every [`ElementCore`](super::ElementCore) owns a [`ComponentLifecycle`].
//! `initialize` mounts it once the widget is fully set up, property writes
//! on the live widget report an update, and `cleanup` or the widget's
//! destruction unmounts it.
//!
//! Effects run on mount and again after any update that touches one of
//! their dependencies. The cleanup an effect returns runs before the effect
//! runs again and on unmount.
//!
//! A panicking hook is logged and skipped; the hooks after it still run.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_trellis_core::{ObjectId, Signal, Variant};
use parking_lot::Mutex;

use crate::error::panic_message;
use crate::logging::targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    #[default]
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeUnmount,
    Unmounted,
    /// A failure was reported through [`ComponentLifecycle::handle_error`].
    Error,
}

/// What a hook is told about the transition it runs for.
#[derive(Debug, Clone)]
pub struct LifecycleContext {
    pub phase: LifecyclePhase,
    pub widget: Option<ObjectId>,
    pub previous: HashMap<String, Variant>,
    pub current: HashMap<String, Variant>,
    pub timestamp: Instant,
    /// Set for [`LifecyclePhase::Error`] only.
    pub error: Option<String>,
}

impl LifecycleContext {
    fn new(phase: LifecyclePhase, widget: Option<ObjectId>) -> Self {
        Self {
            phase,
            widget,
            previous: HashMap::new(),
            current: HashMap::new(),
            timestamp: Instant::now(),
            error: None,
        }
    }

    /// Names whose value differs between `previous` and `current`.
    pub fn changed(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .previous
            .keys()
            .chain(self.current.keys())
            .map(String::as_str)
            .filter(|name| self.previous.get(*name) != self.current.get(*name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

pub type LifecycleHook = Arc<dyn Fn(&LifecycleContext) + Send + Sync>;
/// Undoes what an effect set up.
pub type EffectCleanup = Box<dyn FnOnce() + Send>;
type Effect = Arc<dyn Fn() -> Option<EffectCleanup> + Send + Sync>;

/// Timings of the last transition of each kind, and running counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleMetrics {
    pub mount_time: Duration,
    pub update_time: Duration,
    pub unmount_time: Duration,
    pub update_count: u32,
    pub effect_count: u32,
    pub cleanup_count: u32,
}

struct EffectSlot {
    effect: Effect,
    dependencies: Vec<String>,
    cleanup: Option<EffectCleanup>,
}

#[derive(Default)]
struct Hooks {
    mount: Vec<LifecycleHook>,
    unmount: Vec<LifecycleHook>,
    update: Vec<LifecycleHook>,
    error: Vec<LifecycleHook>,
}

#[derive(Default)]
struct LifecycleState {
    phase: LifecyclePhase,
    widget: Option<ObjectId>,
    hooks: Hooks,
    effects: Vec<EffectSlot>,
    metrics: LifecycleMetrics,
}

/// The hook registry and phase of one element.
pub struct ComponentLifecycle {
    state: Mutex<LifecycleState>,
    phase_changed: Signal<LifecyclePhase>,
    error_occurred: Signal<String>,
}

impl ComponentLifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::default()),
            phase_changed: Signal::new(),
            error_occurred: Signal::new(),
        }
    }

    pub fn on_mount(&self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) {
        self.state.lock().hooks.mount.push(Arc::new(hook));
    }

    /// Runs before effect cleanups, while the widget still exists.
    pub fn on_unmount(&self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) {
        self.state.lock().hooks.unmount.push(Arc::new(hook));
    }

    pub fn on_update(&self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) {
        self.state.lock().hooks.update.push(Arc::new(hook));
    }

    pub fn on_error(&self, hook: impl Fn(&LifecycleContext) + Send + Sync + 'static) {
        self.state.lock().hooks.error.push(Arc::new(hook));
    }

    /// Register an effect that re-runs when a property named in
    /// `dependencies` changes. With no dependencies it re-runs on every
    /// update.
    ///
    /// An effect registered on a mounted element runs immediately.
    pub fn use_effect<I, S>(
        &self,
        dependencies: I,
        effect: impl Fn() -> Option<EffectCleanup> + Send + Sync + 'static,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let effect: Effect = Arc::new(effect);
        let (index, mounted) = {
            let mut state = self.state.lock();
            state.effects.push(EffectSlot {
                effect,
                dependencies: dependencies.into_iter().map(Into::into).collect(),
                cleanup: None,
            });
            state.metrics.effect_count += 1;
            (state.effects.len() - 1, state.widget.is_some())
        };
        if mounted {
            self.run_effects(|slot_index, _| slot_index == index);
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Run the mount hooks and every effect. Mounting twice is a no-op.
    pub fn mount(&self, widget: ObjectId) {
        {
            let mut state = self.state.lock();
            if state.widget.is_some() {
                tracing::debug!(target: targets::ELEMENT, ?widget, "already mounted");
                return;
            }
            state.widget = Some(widget);
        }
        let started = Instant::now();
        self.set_phase(LifecyclePhase::BeforeMount);
        let hooks = self.state.lock().hooks.mount.clone();
        run_hooks(&hooks, &LifecycleContext::new(LifecyclePhase::Mounted, Some(widget)));
        self.run_effects(|_, _| true);
        self.state.lock().metrics.mount_time = started.elapsed();
        self.set_phase(LifecyclePhase::Mounted);
        tracing::debug!(target: targets::ELEMENT, ?widget, hooks = hooks.len(), "element mounted");
    }

    /// Report changed properties of a mounted element.
    ///
    /// Ignored before mount and after unmount.
    pub fn update(&self, previous: HashMap<String, Variant>, current: HashMap<String, Variant>) {
        let Some(widget) = self.widget() else {
            return;
        };
        let started = Instant::now();
        self.set_phase(LifecyclePhase::BeforeUpdate);
        let mut context = LifecycleContext::new(LifecyclePhase::Updated, Some(widget));
        context.previous = previous;
        context.current = current;
        let changed: Vec<String> = context.changed().into_iter().map(str::to_string).collect();

        let hooks = self.state.lock().hooks.update.clone();
        run_hooks(&hooks, &context);
        self.run_effects(|_, dependencies| {
            dependencies.is_empty() || dependencies.iter().any(|name| changed.contains(name))
        });
        {
            let mut state = self.state.lock();
            state.metrics.update_count += 1;
            state.metrics.update_time = started.elapsed();
        }
        self.set_phase(LifecyclePhase::Updated);
    }

    /// Run the unmount hooks, then every pending effect cleanup.
    pub fn unmount(&self) {
        let Some(widget) = self.widget() else {
            return;
        };
        let started = Instant::now();
        self.set_phase(LifecyclePhase::BeforeUnmount);
        let hooks = self.state.lock().hooks.unmount.clone();
        run_hooks(&hooks, &LifecycleContext::new(LifecyclePhase::BeforeUnmount, Some(widget)));

        let cleanups: Vec<EffectCleanup> = {
            let mut state = self.state.lock();
            state.widget = None;
            state.effects.iter_mut().filter_map(|slot| slot.cleanup.take()).collect()
        };
        let count = run_cleanups(cleanups);
        {
            let mut state = self.state.lock();
            state.metrics.cleanup_count += count;
            state.metrics.unmount_time = started.elapsed();
        }
        self.set_phase(LifecyclePhase::Unmounted);
        tracing::debug!(target: targets::ELEMENT, ?widget, "element unmounted");
    }

    /// Enter the error phase and run the error hooks.
    pub fn handle_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: targets::ELEMENT, error = %message, "element error");
        self.set_phase(LifecyclePhase::Error);
        let hooks = self.state.lock().hooks.error.clone();
        let mut context = LifecycleContext::new(LifecyclePhase::Error, self.widget());
        context.error = Some(message.clone());
        run_hooks(&hooks, &context);
        self.error_occurred.emit(message);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_mounted(&self) -> bool {
        self.widget().is_some()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.state.lock().phase
    }

    pub fn widget(&self) -> Option<ObjectId> {
        self.state.lock().widget
    }

    pub fn metrics(&self) -> LifecycleMetrics {
        self.state.lock().metrics
    }

    pub fn phase_changed(&self) -> &Signal<LifecyclePhase> {
        &self.phase_changed
    }

    pub fn error_occurred(&self) -> &Signal<String> {
        &self.error_occurred
    }

    fn set_phase(&self, phase: LifecyclePhase) {
        let changed = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.phase, phase) != phase
        };
        if changed {
            self.phase_changed.emit(phase);
        }
    }

    /// Re-run the effects `select` picks, cleaning up their last run first.
    fn run_effects(&self, select: impl Fn(usize, &[String]) -> bool) {
        let due: Vec<(usize, Effect, Option<EffectCleanup>)> = {
            let mut state = self.state.lock();
            state
                .effects
                .iter_mut()
                .enumerate()
                .filter(|(index, slot)| select(*index, &slot.dependencies))
                .map(|(index, slot)| (index, slot.effect.clone(), slot.cleanup.take()))
                .collect()
        };
        let mut cleaned = 0;
        let mut results = Vec::with_capacity(due.len());
        for (index, effect, cleanup) in due {
            cleaned += run_cleanups(cleanup);
            match panic::catch_unwind(AssertUnwindSafe(|| effect())) {
                Ok(cleanup) => results.push((index, cleanup)),
                Err(payload) => tracing::warn!(
                    target: targets::ELEMENT,
                    error = panic_message(payload.as_ref()).as_deref().unwrap_or("unknown"),
                    "effect panicked"
                ),
            }
        }
        let mut state = self.state.lock();
        state.metrics.cleanup_count += cleaned;
        for (index, cleanup) in results {
            if let Some(slot) = state.effects.get_mut(index) {
                slot.cleanup = cleanup;
            }
        }
    }
}

impl Default for ComponentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ComponentLifecycle")
            .field("phase", &state.phase)
            .field("widget", &state.widget)
            .field("effects", &state.effects.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ComponentLifecycle: Send, Sync);

fn run_hooks(hooks: &[LifecycleHook], context: &LifecycleContext) {
    for hook in hooks {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(context))) {
            tracing::warn!(
                target: targets::ELEMENT,
                phase = ?context.phase,
                error = panic_message(payload.as_ref()).as_deref().unwrap_or("unknown"),
                "lifecycle hook panicked"
            );
        }
    }
}

fn run_cleanups(cleanups: impl IntoIterator<Item = EffectCleanup>) -> u32 {
    let mut count = 0;
    for cleanup in cleanups {
        count += 1;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(cleanup)) {
            tracing::warn!(
                target: targets::ELEMENT,
                error = panic_message(payload.as_ref()).as_deref().unwrap_or("unknown"),
                "effect cleanup panicked"
            );
        }
    }
    count
}
