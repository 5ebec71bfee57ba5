//! Property animations driven by the event loop.
//!
//! Every animation implements [`Animation`]: it reports the length of one
//! pass and knows how to render a point in time. Everything else (state,
//! looping, direction, auto-reverse, signals, ticking) is shared and lives
//! in [`AnimationCore`].
//!
//! A running top-level animation registers a repeating tick on the event
//! loop of the thread that started it. The tick owns a strong handle, so a
//! started animation keeps running even if the caller drops theirs. Members
//! of a group are never ticked directly; the group drives them.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_trellis_core::animation::{Animation, AnimationState, PauseAnimation};
//! use horizon_trellis_core::EventLoop;
//!
//! let pause = PauseAnimation::new(Duration::from_millis(20));
//! pause.start().unwrap();
//! assert_eq!(pause.state(), AnimationState::Running);
//!
//! let done = EventLoop::process_events_until(Duration::from_secs(1), || {
//!     pause.state() == AnimationState::Stopped
//! });
//! assert!(done);
//! ```

mod easing;
mod group;
mod property_animation;

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::event_loop::EventLoop;
use crate::logging::targets;
use crate::signal::Signal;
use crate::timer::TimerId;

pub use easing::{Easing, UnknownEasing};
pub use group::{ParallelAnimationGroup, PauseAnimation, SequentialAnimationGroup};
pub use property_animation::{PropertyAnimation, interpolate};

/// Interval between ticks of a running animation.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Shared handle to any animation.
pub type AnimationRef = Arc<dyn Animation>;

/// Errors raised when configuring or starting an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// The target widget no longer exists.
    InvalidTarget,
    /// The target has no property with this name.
    UnknownProperty(String),
    /// No end value was set.
    NoEndValue,
    /// The start and end values cannot be interpolated into each other.
    IncompatibleValues {
        property: String,
        from: &'static str,
        to: &'static str,
    },
    /// The animation was deleted after stopping.
    Deleted,
    /// The animation belongs to a group and is driven by it.
    OwnedByGroup,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTarget => write!(f, "Animation target no longer exists"),
            Self::UnknownProperty(name) => write!(f, "Target has no property '{name}'"),
            Self::NoEndValue => write!(f, "Animation has no end value"),
            Self::IncompatibleValues { property, from, to } => {
                write!(f, "Cannot animate '{property}' from {from} to {to}")
            }
            Self::Deleted => write!(f, "Animation has been deleted"),
            Self::OwnedByGroup => write!(f, "Animation is driven by its group"),
        }
    }
}

impl std::error::Error for AnimationError {}

/// Running state of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Stopped,
    Paused,
    Running,
}

/// Playback direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What happens to an animation once it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    #[default]
    KeepWhenStopped,
    /// Release the animation after it stops; it can no longer be started.
    DeleteWhenStopped,
}

struct CoreState {
    state: AnimationState,
    /// Total time, across loops.
    current_time: Duration,
    current_loop: i32,
    loop_count: i32,
    direction: Direction,
    auto_reverse: bool,
    deletion_policy: DeletionPolicy,
    /// Whether the last seek reached the end of the final loop.
    at_end: bool,
    in_group: bool,
    deleted: bool,
    timer: Option<TimerId>,
    /// Wall-clock instant corresponding to `current_time == 0`.
    origin: Instant,
}

/// State and signals shared by every animation type.
pub struct AnimationCore {
    handle: Weak<dyn Animation>,
    inner: Mutex<CoreState>,

    /// Emitted when the animation leaves `Stopped` for `Running`.
    pub started: Signal<()>,
    /// Emitted when the animation stops after reaching its end.
    pub finished: Signal<()>,
    /// Emitted with `(new, old)` on every state change.
    pub state_changed: Signal<(AnimationState, AnimationState)>,
    pub current_loop_changed: Signal<i32>,
}

impl AnimationCore {
    /// `handle` must point at the animation that owns this core.
    pub fn new(handle: Weak<dyn Animation>) -> Self {
        Self {
            handle,
            inner: Mutex::new(CoreState {
                state: AnimationState::Stopped,
                current_time: Duration::ZERO,
                current_loop: 0,
                loop_count: 1,
                direction: Direction::Forward,
                auto_reverse: false,
                deletion_policy: DeletionPolicy::KeepWhenStopped,
                at_end: false,
                in_group: false,
                deleted: false,
                timer: None,
                origin: Instant::now(),
            }),
            started: Signal::new(),
            finished: Signal::new(),
            state_changed: Signal::new(),
            current_loop_changed: Signal::new(),
        }
    }

    pub(crate) fn handle(&self) -> Option<AnimationRef> {
        self.handle.upgrade()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.inner.lock().at_end
    }

    pub(crate) fn is_in_group(&self) -> bool {
        self.inner.lock().in_group
    }

    pub(crate) fn set_in_group(&self, in_group: bool) {
        self.inner.lock().in_group = in_group;
    }

    /// Back to the start without rendering anything.
    pub(crate) fn rewind(&self) {
        let mut inner = self.inner.lock();
        inner.current_time = Duration::ZERO;
        inner.current_loop = 0;
        inner.at_end = false;
    }
}

impl fmt::Debug for AnimationCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AnimationCore")
            .field("state", &inner.state)
            .field("current_time", &inner.current_time)
            .field("current_loop", &inner.current_loop)
            .field("loop_count", &inner.loop_count)
            .field("direction", &inner.direction)
            .finish_non_exhaustive()
    }
}

/// A timed animation.
///
/// Implementors provide [`core`](Self::core), [`duration`](Self::duration)
/// and [`update_current_time`](Self::update_current_time); the provided
/// methods implement playback on top of them.
pub trait Animation: Send + Sync + 'static {
    fn core(&self) -> &AnimationCore;

    /// Length of a single forward pass, or `None` when it never ends.
    fn duration(&self) -> Option<Duration>;

    /// Render local time `time` within one pass, already adjusted for
    /// direction and auto-reverse.
    fn update_current_time(&self, time: Duration);

    /// Called before the animation starts running from `Stopped`.
    fn prepare(&self) -> Result<(), AnimationError> {
        Ok(())
    }

    /// Called on every state change, before `state_changed` is emitted.
    fn on_state_changed(&self, _new: AnimationState, _old: AnimationState) {}

    fn state(&self) -> AnimationState {
        self.core().inner.lock().state
    }

    /// Total time elapsed across loops.
    fn current_time(&self) -> Duration {
        self.core().inner.lock().current_time
    }

    fn current_loop(&self) -> i32 {
        self.core().inner.lock().current_loop
    }

    fn loop_count(&self) -> i32 {
        self.core().inner.lock().loop_count
    }

    /// Number of passes; `-1` loops until stopped.
    fn set_loop_count(&self, count: i32) {
        self.core().inner.lock().loop_count = count.max(-1);
    }

    fn direction(&self) -> Direction {
        self.core().inner.lock().direction
    }

    fn set_direction(&self, direction: Direction) {
        self.core().inner.lock().direction = direction;
    }

    fn auto_reverse(&self) -> bool {
        self.core().inner.lock().auto_reverse
    }

    /// When set, each pass plays forward and then back to the start.
    fn set_auto_reverse(&self, auto_reverse: bool) {
        self.core().inner.lock().auto_reverse = auto_reverse;
    }

    fn deletion_policy(&self) -> DeletionPolicy {
        self.core().inner.lock().deletion_policy
    }

    fn set_deletion_policy(&self, policy: DeletionPolicy) {
        self.core().inner.lock().deletion_policy = policy;
    }

    fn is_deleted(&self) -> bool {
        self.core().inner.lock().deleted
    }

    /// Length of one loop, including the reverse leg.
    fn loop_duration(&self) -> Option<Duration> {
        let pass = self.duration()?;
        Some(if self.auto_reverse() { pass * 2 } else { pass })
    }

    /// Length of every loop together, or `None` when it never ends.
    fn total_duration(&self) -> Option<Duration> {
        let per_loop = self.loop_duration()?;
        let loops = u32::try_from(self.loop_count()).ok()?;
        Some(per_loop * loops)
    }

    /// Start from the beginning on the current thread's event loop.
    ///
    /// Starting a running animation does nothing.
    fn start(&self) -> Result<(), AnimationError> {
        {
            let inner = self.core().inner.lock();
            if inner.deleted {
                return Err(AnimationError::Deleted);
            }
            if inner.in_group {
                return Err(AnimationError::OwnedByGroup);
            }
            if inner.state == AnimationState::Running {
                return Ok(());
            }
        }
        if self.state() == AnimationState::Paused {
            self.stop();
        }
        self.prepare()?;
        {
            let mut inner = self.core().inner.lock();
            inner.current_time = Duration::ZERO;
            inner.current_loop = 0;
            inner.at_end = false;
            inner.origin = Instant::now();
        }
        set_state(self, AnimationState::Running, false);
        seek(self, Duration::ZERO);
        if self.state() == AnimationState::Running {
            schedule_ticks(self.core());
        }
        Ok(())
    }

    /// Stop without reaching the end. `finished` is not emitted unless the
    /// animation never ends on its own.
    fn stop(&self) {
        if self.state() != AnimationState::Stopped {
            set_state(self, AnimationState::Stopped, self.total_duration().is_none());
        }
    }

    fn pause(&self) {
        if self.state() == AnimationState::Running && !self.core().is_in_group() {
            set_state(self, AnimationState::Paused, false);
        }
    }

    /// Continue a paused animation from where it was paused.
    fn resume(&self) {
        if self.state() != AnimationState::Paused || self.core().is_in_group() {
            return;
        }
        {
            let mut inner = self.core().inner.lock();
            inner.origin = Instant::now()
                .checked_sub(inner.current_time)
                .unwrap_or_else(Instant::now);
        }
        set_state(self, AnimationState::Running, false);
        schedule_ticks(self.core());
    }

    /// Jump to total time `time`, clamped to the total duration.
    ///
    /// A running animation that reaches its end stops and emits `finished`.
    fn set_current_time(&self, time: Duration) {
        seek(self, time);
    }
}

/// Map a total time onto `(loop index, local time within one pass)`.
fn locate<A: Animation + ?Sized>(animation: &A, time: Duration) -> (i32, Duration) {
    let (Some(pass), Some(per_loop)) = (animation.duration(), animation.loop_duration()) else {
        return (0, time);
    };
    let total = animation.total_duration();
    if per_loop.is_zero() {
        let last = animation.loop_count().max(1) - 1;
        let local = if animation.direction() == Direction::Backward {
            Duration::ZERO
        } else {
            pass
        };
        return (last, local);
    }

    let mut index = (time.as_nanos() / per_loop.as_nanos()).min(i32::MAX as u128) as u32;
    let mut within = time.saturating_sub(per_loop * index);
    // The final instant belongs to the last loop, not the start of another.
    if total == Some(time) && index > 0 && within.is_zero() {
        index -= 1;
        within = per_loop;
    }

    let mut local = if within > pass {
        per_loop - within
    } else {
        within
    };
    if animation.direction() == Direction::Backward {
        local = pass.saturating_sub(local);
    }
    (index as i32, local)
}

fn seek<A: Animation + ?Sized>(animation: &A, time: Duration) {
    let total = animation.total_duration();
    let time = total.map_or(time, |total| time.min(total));
    let (index, local) = locate(animation, time);
    let reached_end = total.is_some_and(|total| time >= total);

    let loop_changed = {
        let mut inner = animation.core().inner.lock();
        inner.current_time = time;
        inner.at_end = reached_end;
        if inner.state == AnimationState::Running {
            inner.origin = Instant::now().checked_sub(time).unwrap_or(inner.origin);
        }
        let changed = inner.current_loop != index;
        inner.current_loop = index;
        changed
    };
    if loop_changed {
        animation.core().current_loop_changed.emit(index);
    }

    animation.update_current_time(local);

    if reached_end && animation.state() == AnimationState::Running {
        set_state(animation, AnimationState::Stopped, true);
    }
}

fn set_state<A: Animation + ?Sized>(animation: &A, new: AnimationState, reached_end: bool) {
    let core = animation.core();
    let (old, timer, deleted) = {
        let mut inner = core.inner.lock();
        let old = inner.state;
        if old == new {
            return;
        }
        inner.state = new;
        let timer = if new == AnimationState::Running {
            None
        } else {
            inner.timer.take()
        };
        let deleted = new == AnimationState::Stopped
            && inner.deletion_policy == DeletionPolicy::DeleteWhenStopped
            && !inner.in_group;
        if deleted {
            inner.deleted = true;
        }
        (old, timer, deleted)
    };

    animation.on_state_changed(new, old);
    core.state_changed.emit((new, old));

    if new == AnimationState::Running && old == AnimationState::Stopped {
        tracing::debug!(target: targets::ANIMATION, "animation started");
        core.started.emit(());
    }
    if new == AnimationState::Stopped && reached_end {
        tracing::debug!(target: targets::ANIMATION, "animation finished");
        core.finished.emit(());
    }
    if deleted {
        tracing::trace!(target: targets::ANIMATION, "animation deleted after stopping");
        core.started.disconnect_all();
        core.finished.disconnect_all();
        core.state_changed.disconnect_all();
        core.current_loop_changed.disconnect_all();
    }
    // Stopping the timer drops the tick's handle; do it last.
    if let Some(timer) = timer {
        EventLoop::stop_timer(timer);
    }
}

/// Drive the animation from the current thread's event loop.
fn schedule_ticks(core: &AnimationCore) {
    let Some(animation) = core.handle() else {
        return;
    };
    let id = EventLoop::start_repeating_timer(TICK_INTERVAL, move || {
        let elapsed = animation.core().inner.lock().origin.elapsed();
        if animation.state() == AnimationState::Running {
            seek(animation.as_ref(), elapsed);
        }
    });
    let stale = {
        let mut inner = core.inner.lock();
        if inner.state == AnimationState::Running {
            inner.timer.replace(id)
        } else {
            Some(id)
        }
    };
    if let Some(stale) = stale {
        EventLoop::stop_timer(stale);
    }
}

// Used by groups to run their members without touching the event loop.
pub(crate) fn drive_member(member: &dyn Animation, time: Duration, group_running: bool) {
    if group_running && member.state() == AnimationState::Stopped {
        let end = member.total_duration();
        let finished_already = member.core().is_at_end() && end.is_some_and(|end| time >= end);
        if finished_already {
            return;
        }
        if member.prepare().is_err() {
            tracing::warn!(target: targets::ANIMATION, "group member could not start");
            return;
        }
        set_state(member, AnimationState::Running, false);
    }
    seek(member, time);
}

pub(crate) fn set_member_state(member: &dyn Animation, new: AnimationState) {
    if new == AnimationState::Running
        && member.state() == AnimationState::Stopped
        && member.prepare().is_err()
    {
        tracing::warn!(target: targets::ANIMATION, "group member could not start");
        return;
    }
    set_state(member, new, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every local time it is asked to render.
    struct Stepper {
        core: AnimationCore,
        pass: Duration,
        seen: Mutex<Vec<Duration>>,
    }

    impl Stepper {
        fn new(pass: Duration) -> Arc<Self> {
            Arc::new_cyclic(|weak: &Weak<Self>| {
                let handle: Weak<dyn Animation> = weak.clone();
                Self {
                    core: AnimationCore::new(handle),
                    pass,
                    seen: Mutex::new(Vec::new()),
                }
            })
        }

        fn last(&self) -> Duration {
            self.seen.lock().last().copied().unwrap_or_default()
        }
    }

    impl Animation for Stepper {
        fn core(&self) -> &AnimationCore {
            &self.core
        }

        fn duration(&self) -> Option<Duration> {
            Some(self.pass)
        }

        fn update_current_time(&self, time: Duration) {
            self.seen.lock().push(time);
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_loops_and_auto_reverse() {
        let stepper = Stepper::new(ms(100));
        stepper.set_loop_count(2);
        stepper.set_auto_reverse(true);
        assert_eq!(stepper.total_duration(), Some(ms(400)));

        stepper.set_current_time(ms(50));
        assert_eq!(stepper.last(), ms(50));
        stepper.set_current_time(ms(150));
        assert_eq!(stepper.last(), ms(50));
        stepper.set_current_time(ms(250));
        assert_eq!(stepper.current_loop(), 1);
        assert_eq!(stepper.last(), ms(50));
        stepper.set_current_time(ms(1000));
        assert_eq!(stepper.current_time(), ms(400));
        assert_eq!(stepper.last(), Duration::ZERO);
    }

    #[test]
    fn test_backward_direction() {
        let stepper = Stepper::new(ms(100));
        stepper.set_direction(Direction::Backward);
        stepper.set_current_time(ms(30));
        assert_eq!(stepper.last(), ms(70));
    }

    #[test]
    fn test_infinite_loops_have_no_total() {
        let stepper = Stepper::new(ms(100));
        stepper.set_loop_count(-1);
        assert_eq!(stepper.total_duration(), None);
        stepper.set_current_time(ms(1234));
        assert_eq!(stepper.current_loop(), 12);
        assert_eq!(stepper.last(), ms(34));
    }

    #[test]
    fn test_finishes_once_when_seeking_to_end() {
        let stepper = Stepper::new(ms(100));
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();
        stepper.core().finished.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        stepper.start().unwrap();
        assert_eq!(stepper.state(), AnimationState::Running);
        stepper.set_current_time(ms(100));
        stepper.set_current_time(ms(100));
        assert_eq!(stepper.state(), AnimationState::Stopped);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_does_not_emit_finished() {
        let stepper = Stepper::new(ms(100));
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();
        stepper.core().finished.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        stepper.start().unwrap();
        stepper.stop();
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(EventLoop::active_timer_count(), 0);
    }

    #[test]
    fn test_delete_when_stopped() {
        let stepper = Stepper::new(ms(10));
        stepper.set_deletion_policy(DeletionPolicy::DeleteWhenStopped);
        stepper.start().unwrap();
        stepper.set_current_time(ms(10));
        assert!(stepper.is_deleted());
        assert_eq!(stepper.start(), Err(AnimationError::Deleted));
    }

    #[test]
    fn test_event_loop_drives_to_completion() {
        let stepper = Stepper::new(ms(40));
        stepper.start().unwrap();
        let weak = Arc::downgrade(&stepper);
        drop(stepper);

        let done = EventLoop::process_events_until(ms(1000), || {
            weak.upgrade()
                .is_none_or(|stepper| stepper.state() == AnimationState::Stopped)
        });
        assert!(done);
        // The tick released its handle when the animation finished.
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_pause_and_resume() {
        let stepper = Stepper::new(ms(100));
        stepper.start().unwrap();
        stepper.set_current_time(ms(40));
        stepper.pause();
        assert_eq!(stepper.state(), AnimationState::Paused);
        assert_eq!(EventLoop::active_timer_count(), 0);
        stepper.resume();
        assert_eq!(stepper.state(), AnimationState::Running);
        assert!(stepper.current_time() >= ms(40));
        stepper.stop();
    }
}
