//! Animation groups and pauses.
//!
//! A group owns its members: they cannot be started on their own while they
//! belong to it, and the group drives them from its own clock.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;

use crate::property::Property;

use super::{
    Animation, AnimationCore, AnimationError, AnimationRef, AnimationState, drive_member,
    set_member_state,
};

/// Members shared by both group kinds.
#[derive(Default)]
struct Members(RwLock<Vec<AnimationRef>>);

impl Members {
    fn add(&self, animation: AnimationRef) -> Result<(), AnimationError> {
        if animation.core().is_in_group() {
            return Err(AnimationError::OwnedByGroup);
        }
        if animation.is_deleted() {
            return Err(AnimationError::Deleted);
        }
        animation.stop();
        animation.core().set_in_group(true);
        self.0.write().push(animation);
        Ok(())
    }

    fn remove(&self, index: usize) -> Option<AnimationRef> {
        let animation = {
            let mut members = self.0.write();
            (index < members.len()).then(|| members.remove(index))?
        };
        animation.core().set_in_group(false);
        animation.stop();
        Some(animation)
    }

    fn clear(&self) {
        let members = std::mem::take(&mut *self.0.write());
        for animation in members {
            animation.core().set_in_group(false);
            animation.stop();
        }
    }

    fn snapshot(&self) -> Vec<AnimationRef> {
        self.0.read().clone()
    }

    fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Pause, resume or stop members along with the group.
    fn follow(&self, new: AnimationState, old: AnimationState) {
        for member in self.snapshot() {
            match (new, member.state()) {
                (AnimationState::Paused, AnimationState::Running) => {
                    set_member_state(member.as_ref(), AnimationState::Paused);
                }
                (AnimationState::Running, AnimationState::Paused)
                    if old == AnimationState::Paused =>
                {
                    set_member_state(member.as_ref(), AnimationState::Running);
                }
                (AnimationState::Stopped, state) if state != AnimationState::Stopped => {
                    set_member_state(member.as_ref(), AnimationState::Stopped);
                }
                _ => {}
            }
        }
    }
}

impl Drop for Members {
    fn drop(&mut self) {
        for animation in self.0.get_mut().drain(..) {
            animation.core().set_in_group(false);
        }
    }
}

macro_rules! group_members_api {
    () => {
        /// Take ownership of `animation`. It is stopped first.
        pub fn add_animation(&self, animation: AnimationRef) -> Result<(), AnimationError> {
            self.members.add(animation)
        }

        /// Release the member at `index`; it can be started on its own again.
        pub fn remove_animation(&self, index: usize) -> Option<AnimationRef> {
            self.members.remove(index)
        }

        pub fn animations(&self) -> Vec<AnimationRef> {
            self.members.snapshot()
        }

        pub fn animation_count(&self) -> usize {
            self.members.len()
        }

        pub fn clear(&self) {
            self.members.clear();
        }
    };
}

/// Runs every member at the same time. Lasts as long as its longest member.
pub struct ParallelAnimationGroup {
    core: AnimationCore,
    members: Members,
}

impl ParallelAnimationGroup {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handle: Weak<dyn Animation> = weak.clone();
            Self {
                core: AnimationCore::new(handle),
                members: Members::default(),
            }
        })
    }

    group_members_api!();
}

impl Animation for ParallelAnimationGroup {
    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn duration(&self) -> Option<Duration> {
        self.members
            .snapshot()
            .iter()
            .try_fold(Duration::ZERO, |longest, member| {
                Some(longest.max(member.total_duration()?))
            })
    }

    fn update_current_time(&self, time: Duration) {
        let running = self.state() == AnimationState::Running;
        for member in self.members.snapshot() {
            drive_member(member.as_ref(), time, running);
        }
    }

    fn on_state_changed(&self, new: AnimationState, old: AnimationState) {
        if new == AnimationState::Running && old == AnimationState::Stopped {
            for member in self.members.snapshot() {
                set_member_state(member.as_ref(), AnimationState::Running);
            }
        } else {
            self.members.follow(new, old);
        }
    }
}

/// Runs its members one after another.
pub struct SequentialAnimationGroup {
    core: AnimationCore,
    members: Members,
}

impl SequentialAnimationGroup {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handle: Weak<dyn Animation> = weak.clone();
            Self {
                core: AnimationCore::new(handle),
                members: Members::default(),
            }
        })
    }

    group_members_api!();

    /// Append a pause of `duration` and return it.
    pub fn add_pause(&self, duration: Duration) -> Arc<PauseAnimation> {
        let pause = PauseAnimation::new(duration);
        // A fresh pause is neither grouped nor deleted.
        let _ = self.members.add(pause.clone());
        pause
    }

    /// The member playing at the group's current time.
    pub fn current_animation(&self) -> Option<AnimationRef> {
        let time = self.current_time().saturating_sub(self.loop_start());
        let mut offset = Duration::ZERO;
        for member in self.members.snapshot() {
            let Some(length) = member.total_duration() else {
                return Some(member);
            };
            offset += length;
            if time < offset {
                return Some(member);
            }
        }
        self.members.snapshot().pop()
    }

    fn loop_start(&self) -> Duration {
        let per_loop = self.loop_duration().unwrap_or_default();
        per_loop * u32::try_from(self.current_loop()).unwrap_or(0)
    }
}

impl Animation for SequentialAnimationGroup {
    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn duration(&self) -> Option<Duration> {
        self.members
            .snapshot()
            .iter()
            .try_fold(Duration::ZERO, |sum, member| Some(sum + member.total_duration()?))
    }

    fn update_current_time(&self, time: Duration) {
        let running = self.state() == AnimationState::Running;
        let mut offset = Duration::ZERO;
        for member in self.members.snapshot() {
            if time < offset {
                // Not reached yet in this pass.
                if member.state() != AnimationState::Stopped {
                    set_member_state(member.as_ref(), AnimationState::Stopped);
                }
                member.core().rewind();
                continue;
            }
            let local = time - offset;
            match member.total_duration() {
                None => {
                    drive_member(member.as_ref(), local, running);
                    break;
                }
                Some(length) => {
                    drive_member(member.as_ref(), local.min(length), running);
                    offset += length;
                }
            }
        }
    }

    fn on_state_changed(&self, new: AnimationState, old: AnimationState) {
        if new == AnimationState::Running && old == AnimationState::Stopped {
            for member in self.members.snapshot() {
                member.core().rewind();
            }
        } else {
            self.members.follow(new, old);
        }
    }
}

/// Does nothing for a fixed time. Useful as a gap in a sequence.
pub struct PauseAnimation {
    core: AnimationCore,
    duration: Property<Duration>,
}

impl PauseAnimation {
    pub fn new(duration: Duration) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handle: Weak<dyn Animation> = weak.clone();
            Self {
                core: AnimationCore::new(handle),
                duration: Property::new(duration),
            }
        })
    }

    pub fn set_duration(&self, duration: Duration) {
        self.duration.set(duration);
    }
}

impl Animation for PauseAnimation {
    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.duration.get())
    }

    fn update_current_time(&self, _time: Duration) {}
}

macro_rules! impl_debug {
    ($($ty:ident),*) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field("duration", &self.duration())
                        .field("core", &self.core)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

impl_debug!(ParallelAnimationGroup, SequentialAnimationGroup, PauseAnimation);

static_assertions::assert_impl_all!(ParallelAnimationGroup: Send, Sync);
static_assertions::assert_impl_all!(SequentialAnimationGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_loop::EventLoop;
    use parking_lot::Mutex;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn record_states(animation: &dyn Animation, log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) {
        let started = log.clone();
        animation
            .core()
            .started
            .connect(move |_| started.lock().push(name));
        let finished = log.clone();
        animation.core().finished.connect(move |_| {
            finished.lock().push(name);
        });
    }

    #[test]
    fn test_parallel_lasts_as_long_as_longest_member() {
        let group = ParallelAnimationGroup::new();
        let short = PauseAnimation::new(ms(50));
        let long = PauseAnimation::new(ms(100));
        group.add_animation(short.clone()).unwrap();
        group.add_animation(long.clone()).unwrap();
        assert_eq!(group.duration(), Some(ms(100)));
        assert_eq!(short.start(), Err(AnimationError::OwnedByGroup));

        group.start().unwrap();
        assert_eq!(short.state(), AnimationState::Running);
        assert_eq!(long.state(), AnimationState::Running);

        group.set_current_time(ms(60));
        assert_eq!(short.state(), AnimationState::Stopped);
        assert_eq!(long.state(), AnimationState::Running);

        group.set_current_time(ms(100));
        assert_eq!(long.state(), AnimationState::Stopped);
        assert_eq!(group.state(), AnimationState::Stopped);
    }

    #[test]
    fn test_sequential_runs_members_in_order() {
        let group = SequentialAnimationGroup::new();
        let first = PauseAnimation::new(ms(50));
        let second = PauseAnimation::new(ms(50));
        group.add_animation(first.clone()).unwrap();
        group.add_animation(second.clone()).unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        record_states(first.as_ref(), &log, "first");
        record_states(second.as_ref(), &log, "second");

        group.start().unwrap();
        assert_eq!(first.state(), AnimationState::Running);
        assert_eq!(second.state(), AnimationState::Stopped);

        group.set_current_time(ms(70));
        assert_eq!(second.current_time(), ms(20));
        group.set_current_time(ms(100));
        assert_eq!(
            *log.lock(),
            vec!["first", "first", "second", "second"]
        );
        assert_eq!(group.state(), AnimationState::Stopped);
    }

    #[test]
    fn test_sequence_with_loops_replays_members() {
        let group = SequentialAnimationGroup::new();
        let step = PauseAnimation::new(ms(30));
        group.add_animation(step.clone()).unwrap();
        group.add_pause(ms(20));
        group.set_loop_count(2);
        assert_eq!(group.total_duration(), Some(ms(100)));

        let finishes = Arc::new(Mutex::new(0));
        let counter = finishes.clone();
        step.core().finished.connect(move |_| *counter.lock() += 1);

        group.start().unwrap();
        group.set_current_time(ms(40));
        group.set_current_time(ms(60));
        assert_eq!(step.state(), AnimationState::Running);
        group.set_current_time(ms(100));
        assert_eq!(*finishes.lock(), 2);
    }

    #[test]
    fn test_removed_member_is_released() {
        let group = SequentialAnimationGroup::new();
        let pause = PauseAnimation::new(ms(10));
        group.add_animation(pause.clone()).unwrap();
        assert_eq!(
            group.add_animation(pause.clone()),
            Err(AnimationError::OwnedByGroup)
        );
        let removed = group.remove_animation(0).unwrap();
        assert_eq!(group.animation_count(), 0);
        removed.start().unwrap();
        removed.stop();
    }

    #[test]
    fn test_group_runs_on_event_loop() {
        let group = SequentialAnimationGroup::new();
        group.add_pause(ms(20));
        group.add_pause(ms(20));
        group.start().unwrap();
        let done = EventLoop::process_events_until(ms(1000), || {
            group.state() == AnimationState::Stopped
        });
        assert!(done);
        assert!(group.current_animation().is_some());
    }
}
