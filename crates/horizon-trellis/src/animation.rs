//! Fluent property animations.
//!
//! [`animate`] starts an [`AnimationBuilder`] for one widget. Each
//! [`animate`](AnimationBuilder::animate) call adds a property transition;
//! one transition builds a [`PropertyAnimation`], several build a
//! [`ParallelAnimationGroup`]. Duration and easing apply to every
//! transition, loop count and auto-reverse to the built animation as a
//! whole.
//!
//! ```ignore
//! use std::time::Duration;
//! use horizon_trellis::animation::{animate, presets, AnimationSequence};
//! use horizon_trellis::toolkit::Easing;
//!
//! animate(&card)
//!     .animate("opacity", 0.0, 1.0)
//!     .animate("pos", Point::new(0, 40), Point::new(0, 0))
//!     .duration(Duration::from_millis(250))
//!     .easing(Easing::OutQuad)
//!     .start()?;
//!
//! AnimationSequence::new()
//!     .then(presets::fade_in(&title))
//!     .pause(Duration::from_millis(100))
//!     .then(presets::shake(&title, 5))
//!     .start()?;
//! ```
//!
//! Animations run on the event loop of the thread that starts them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use horizon_trellis_core::{
    Animation, AnimationRef, DeletionPolicy, Easing, EventLoop, ParallelAnimationGroup,
    PropertyAnimation, SequentialAnimationGroup, Variant, Widget, WidgetRef,
};

use crate::error::{ErrorContext, ErrorManager, UiError};
use crate::logging::targets;
use crate::memory::WidgetHandle;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Timing shared by every transition of a builder.
#[derive(Clone)]
pub struct AnimationConfig {
    pub duration: Duration,
    pub easing: Easing,
    /// Wait before [`start`](AnimationBuilder::start) actually starts.
    pub delay: Duration,
    /// Number of passes; `-1` repeats until stopped.
    pub loop_count: i32,
    pub auto_reverse: bool,
    pub on_started: Option<Callback>,
    pub on_finished: Option<Callback>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::OutCubic,
            delay: Duration::ZERO,
            loop_count: 1,
            auto_reverse: false,
            on_started: None,
            on_finished: None,
        }
    }
}

impl fmt::Debug for AnimationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationConfig")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("delay", &self.delay)
            .field("loop_count", &self.loop_count)
            .field("auto_reverse", &self.auto_reverse)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct Transition {
    property: String,
    from: Variant,
    to: Variant,
}

/// Start describing an animation of `target`.
pub fn animate(target: &impl WidgetHandle) -> AnimationBuilder {
    AnimationBuilder::new(target.widget_ref())
}

/// Fluent description of a tween over one widget.
#[must_use = "call build() or start() to create the animation"]
pub struct AnimationBuilder {
    target: WidgetRef,
    config: AnimationConfig,
    transitions: Vec<Transition>,
}

impl AnimationBuilder {
    pub fn new(target: WidgetRef) -> Self {
        Self {
            target,
            config: AnimationConfig::default(),
            transitions: Vec::new(),
        }
    }

    /// Tween `property` from `from` to `to`.
    pub fn animate(mut self, property: &str, from: impl Into<Variant>, to: impl Into<Variant>) -> Self {
        self.transitions.push(Transition {
            property: property.to_string(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.config.easing = easing;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Play `count` passes; `-1` repeats until stopped.
    pub fn loop_count(mut self, count: i32) -> Self {
        self.config.loop_count = count;
        self
    }

    pub fn repeat_forever(self) -> Self {
        self.loop_count(-1)
    }

    pub fn auto_reverse(mut self, reverse: bool) -> Self {
        self.config.auto_reverse = reverse;
        self
    }

    pub fn on_started(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.on_started = Some(Arc::new(callback));
        self
    }

    pub fn on_finished(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.config.on_finished = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn target(&self) -> &WidgetRef {
        &self.target
    }

    /// Number of property transitions added so far.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Create the animation without starting it.
    ///
    /// Fails when nothing was added or a property does not exist on the
    /// target.
    pub fn build(&self) -> crate::Result<AnimationRef> {
        let animation: AnimationRef = match self.transitions.as_slice() {
            [] => {
                return Err(UiError::Animation(format!(
                    "nothing to animate on {}",
                    self.target.class_name()
                )));
            }
            [single] => self.tween(single)? as AnimationRef,
            many => {
                let group = ParallelAnimationGroup::new();
                for transition in many {
                    group.add_animation(self.tween(transition)?)?;
                }
                group as AnimationRef
            }
        };
        animation.set_loop_count(self.config.loop_count);
        animation.set_auto_reverse(self.config.auto_reverse);

        let core = animation.core();
        if let Some(callback) = self.config.on_started.clone() {
            core.started.connect(move |_| callback());
        }
        if let Some(callback) = self.config.on_finished.clone() {
            core.finished.connect(move |_| callback());
        }
        tracing::trace!(
            target: targets::ANIMATION,
            id = ?self.target.object_id(),
            transitions = self.transitions.len(),
            duration_ms = self.config.duration.as_millis() as u64,
            easing = self.config.easing.name(),
            "animation built"
        );
        Ok(animation)
    }

    /// Build and start, releasing the animation once it stops.
    ///
    /// With a delay the start is scheduled on this thread's event loop.
    /// Returns the handle so the caller can still stop it.
    pub fn start(self) -> crate::Result<AnimationRef> {
        let animation = self.build()?;
        animation.set_deletion_policy(DeletionPolicy::DeleteWhenStopped);
        start_after(animation.clone(), self.config.delay)?;
        Ok(animation)
    }

    fn tween(&self, transition: &Transition) -> crate::Result<Arc<PropertyAnimation>> {
        let tween = PropertyAnimation::for_property(self.target.as_ref(), &transition.property)?;
        tween.set_start_value(transition.from.clone());
        tween.set_end_value(transition.to.clone());
        tween.set_duration(self.config.duration);
        tween.set_easing(self.config.easing);
        Ok(tween)
    }
}

impl fmt::Debug for AnimationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationBuilder")
            .field("target", &self.target.object_id())
            .field("config", &self.config)
            .field("transitions", &self.transitions)
            .finish()
    }
}

fn start_after(animation: AnimationRef, delay: Duration) -> crate::Result<()> {
    if delay.is_zero() {
        animation.start()?;
        tracing::debug!(target: targets::ANIMATION, "animation started");
        return Ok(());
    }
    tracing::debug!(target: targets::ANIMATION, delay_ms = delay.as_millis() as u64, "animation scheduled");
    EventLoop::start_timer(delay, move || {
        if let Err(err) = animation.start() {
            let context = ErrorContext::caller()
                .with_component("AnimationBuilder")
                .with_operation("start");
            ErrorManager::global().report_error(err.into(), context);
        }
    });
    Ok(())
}

// =============================================================================
// Presets
// =============================================================================

/// Ready-made builders for common effects. Each can be customized further
/// before it is built or started.
pub mod presets {
    use std::time::Duration;

    use horizon_trellis_core::{Easing, Point, Size, Widget};

    use super::{AnimationBuilder, animate};
    use crate::memory::WidgetHandle;

    pub const FADE_DURATION: Duration = Duration::from_millis(300);
    pub const SLIDE_DURATION: Duration = Duration::from_millis(400);
    pub const SCALE_DURATION: Duration = Duration::from_millis(300);
    pub const BOUNCE_DURATION: Duration = Duration::from_millis(600);
    pub const SHAKE_DURATION: Duration = Duration::from_millis(500);
    /// Passes of a shake.
    pub const SHAKE_LOOPS: i32 = 8;

    /// Opacity 0 to 1.
    pub fn fade_in(target: &impl WidgetHandle) -> AnimationBuilder {
        animate(target)
            .animate("opacity", 0.0, 1.0)
            .duration(FADE_DURATION)
            .easing(Easing::OutCubic)
    }

    /// Opacity 1 to 0.
    pub fn fade_out(target: &impl WidgetHandle) -> AnimationBuilder {
        animate(target)
            .animate("opacity", 1.0, 0.0)
            .duration(FADE_DURATION)
            .easing(Easing::OutCubic)
    }

    pub fn slide_in(target: &impl WidgetHandle, from: Point, to: Point) -> AnimationBuilder {
        animate(target)
            .animate("pos", from, to)
            .duration(SLIDE_DURATION)
            .easing(Easing::OutQuart)
    }

    /// Grow from nothing to the widget's current size.
    pub fn scale_in(target: &impl WidgetHandle) -> AnimationBuilder {
        let size = target.widget_ref().widget_base().size();
        animate(target)
            .animate("size", Size::new(0, 0), size)
            .duration(SCALE_DURATION)
            .easing(Easing::OutBounce)
    }

    /// Jump `intensity` pixels up and come back down.
    pub fn bounce(target: &impl WidgetHandle, intensity: i32) -> AnimationBuilder {
        let pos = target.widget_ref().widget_base().pos();
        animate(target)
            .animate("pos", pos, pos.offset(0, -intensity))
            .duration(BOUNCE_DURATION / 2)
            .easing(Easing::OutElastic)
            .auto_reverse(true)
    }

    /// Jitter `intensity` pixels sideways.
    pub fn shake(target: &impl WidgetHandle, intensity: i32) -> AnimationBuilder {
        let pos = target.widget_ref().widget_base().pos();
        animate(target)
            .animate("pos", pos, pos.offset(intensity, 0))
            .duration(SHAKE_DURATION / SHAKE_LOOPS as u32)
            .loop_count(SHAKE_LOOPS)
            .easing(Easing::Linear)
    }
}

// =============================================================================
// Sequences
// =============================================================================

/// One entry of an [`AnimationSequence`].
pub enum SequenceStep {
    Builder(AnimationBuilder),
    Animation(AnimationRef),
    Pause(Duration),
}

impl From<AnimationBuilder> for SequenceStep {
    fn from(builder: AnimationBuilder) -> Self {
        Self::Builder(builder)
    }
}

impl From<AnimationRef> for SequenceStep {
    fn from(animation: AnimationRef) -> Self {
        Self::Animation(animation)
    }
}

impl From<Duration> for SequenceStep {
    fn from(pause: Duration) -> Self {
        Self::Pause(pause)
    }
}

/// Animations played one after another, with optional pauses.
///
/// A builder's delay becomes a pause in front of it.
#[derive(Default)]
#[must_use = "call build() or start() to create the sequence"]
pub struct AnimationSequence {
    steps: Vec<SequenceStep>,
}

impl AnimationSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Into<SequenceStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn pause(self, duration: Duration) -> Self {
        self.then(SequenceStep::Pause(duration))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn build(self) -> crate::Result<Arc<SequentialAnimationGroup>> {
        let group = SequentialAnimationGroup::new();
        for step in self.steps {
            match step {
                SequenceStep::Builder(builder) => {
                    if !builder.config.delay.is_zero() {
                        group.add_pause(builder.config.delay);
                    }
                    group.add_animation(builder.build()?)?;
                }
                SequenceStep::Animation(animation) => group.add_animation(animation)?,
                SequenceStep::Pause(duration) => {
                    group.add_pause(duration);
                }
            }
        }
        Ok(group)
    }

    /// Build and start, releasing the group once it stops.
    pub fn start(self) -> crate::Result<Arc<SequentialAnimationGroup>> {
        let group = self.build()?;
        group.set_deletion_policy(DeletionPolicy::DeleteWhenStopped);
        group.start()?;
        tracing::debug!(target: targets::ANIMATION, steps = group.animation_count(), "sequence started");
        Ok(group)
    }
}

impl fmt::Debug for SequenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builder(builder) => f.debug_tuple("Builder").field(builder).finish(),
            Self::Animation(_) => f.write_str("Animation(..)"),
            Self::Pause(duration) => f.debug_tuple("Pause").field(duration).finish(),
        }
    }
}

impl fmt::Debug for AnimationSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSequence").field("steps", &self.steps).finish()
    }
}

/// Group animations to run side by side.
pub fn parallel(animations: impl IntoIterator<Item = AnimationRef>) -> crate::Result<Arc<ParallelAnimationGroup>> {
    let group = ParallelAnimationGroup::new();
    for animation in animations {
        group.add_animation(animation)?;
    }
    Ok(group)
}

/// Group animations to run one after another.
pub fn sequence(animations: impl IntoIterator<Item = AnimationRef>) -> crate::Result<Arc<SequentialAnimationGroup>> {
    animations
        .into_iter()
        .fold(AnimationSequence::new(), |sequence, animation| sequence.then(animation))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::widget::widgets::Label;
    use horizon_trellis_core::{AnimationState, Point, Size, init_global_registry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> Arc<Label> {
        init_global_registry();
        Label::new().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AnimationConfig::default();
        assert_eq!(config.duration, Duration::from_millis(300));
        assert_eq!(config.easing, Easing::OutCubic);
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.loop_count, 1);
        assert!(!config.auto_reverse);
    }

    #[test]
    fn test_single_transition_builds_tween() {
        let label = setup();
        let animation = animate(&label)
            .animate("opacity", 1.0, 0.0)
            .duration(Duration::from_millis(100))
            .easing(Easing::Linear)
            .build()
            .unwrap();
        assert_eq!(animation.duration(), Some(Duration::from_millis(100)));

        animation.start().unwrap();
        animation.set_current_time(Duration::from_millis(50));
        assert!((label.widget_base().opacity() - 0.5).abs() < 1e-9);
        animation.stop();
    }

    #[test]
    fn test_several_transitions_run_in_parallel() {
        let label = setup();
        let animation = animate(&label)
            .animate("pos", Point::new(0, 0), Point::new(100, 0))
            .animate("size", Size::new(0, 0), Size::new(50, 50))
            .duration(Duration::from_millis(100))
            .easing(Easing::Linear)
            .loop_count(2)
            .build()
            .unwrap();
        assert_eq!(animation.duration(), Some(Duration::from_millis(100)));
        assert_eq!(animation.total_duration(), Some(Duration::from_millis(200)));

        animation.start().unwrap();
        animation.set_current_time(Duration::from_millis(50));
        assert_eq!(label.widget_base().pos(), Point::new(50, 0));
        assert_eq!(label.widget_base().size(), Size::new(25, 25));
        animation.stop();
    }

    #[test]
    fn test_build_errors() {
        let label = setup();
        assert!(matches!(animate(&label).build(), Err(UiError::Animation(_))));
        assert!(animate(&label).animate("wobble", 0.0, 1.0).build().is_err());
    }

    #[test]
    fn test_callbacks_and_delayed_start() {
        let label = setup();
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (s, f) = (started.clone(), finished.clone());
        let animation = presets::fade_out(&label)
            .duration(Duration::from_millis(30))
            .delay(Duration::from_millis(20))
            .on_started(move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_finished(move || {
                f.fetch_add(1, Ordering::SeqCst);
            })
            .start()
            .unwrap();
        assert_eq!(animation.state(), AnimationState::Stopped);
        assert_eq!(started.load(Ordering::SeqCst), 0);

        let done = EventLoop::process_events_until(Duration::from_secs(1), || {
            finished.load(Ordering::SeqCst) == 1
        });
        assert!(done);
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(label.widget_base().opacity(), 0.0);
        assert!(animation.is_deleted());
    }

    #[test]
    fn test_presets() {
        let label = setup();
        label.widget_base().set_pos(Point::new(10, 10));
        label.widget_base().resize(80, 20);

        let bounce = presets::bounce(&label, 10);
        assert!(bounce.config().auto_reverse);
        assert_eq!(bounce.config().duration, presets::BOUNCE_DURATION / 2);

        let shake = presets::shake(&label, 5);
        assert_eq!(shake.config().loop_count, presets::SHAKE_LOOPS);
        let shake = shake.build().unwrap();
        assert_eq!(shake.total_duration(), Some(presets::SHAKE_DURATION));

        let scale = presets::scale_in(&label).easing(Easing::Linear).build().unwrap();
        scale.start().unwrap();
        scale.set_current_time(presets::SCALE_DURATION / 2);
        assert_eq!(label.widget_base().size(), Size::new(40, 10));
        scale.stop();
    }

    #[test]
    fn test_sequence_runs_in_order() {
        let label = setup();
        let group = AnimationSequence::new()
            .then(
                animate(&label)
                    .animate("pos", Point::new(0, 0), Point::new(100, 0))
                    .duration(Duration::from_millis(100))
                    .easing(Easing::Linear),
            )
            .pause(Duration::from_millis(50))
            .then(
                animate(&label)
                    .animate("pos", Point::new(100, 0), Point::new(100, 100))
                    .duration(Duration::from_millis(100))
                    .easing(Easing::Linear)
                    .delay(Duration::from_millis(10)),
            )
            .build()
            .unwrap();
        assert_eq!(group.animation_count(), 4);
        assert_eq!(group.duration(), Some(Duration::from_millis(260)));

        group.start().unwrap();
        group.set_current_time(Duration::from_millis(50));
        assert_eq!(label.widget_base().pos(), Point::new(50, 0));
        group.set_current_time(Duration::from_millis(210));
        assert_eq!(label.widget_base().pos(), Point::new(100, 50));
        group.stop();
    }

    #[test]
    fn test_free_functions() {
        let label = setup();
        let fade: AnimationRef = presets::fade_in(&label).build().unwrap();
        let slide: AnimationRef = presets::slide_in(&label, Point::new(-50, 0), Point::ZERO).build().unwrap();
        let together = parallel([fade.clone(), slide.clone()]).unwrap();
        assert_eq!(together.animation_count(), 2);
        assert_eq!(together.duration(), Some(presets::SLIDE_DURATION));

        let other: AnimationRef = presets::fade_out(&label).build().unwrap();
        let pause: AnimationRef = horizon_trellis_core::PauseAnimation::new(Duration::from_millis(5));
        let chained = sequence([other, pause]).unwrap();
        assert_eq!(chained.animation_count(), 2);
    }
}
