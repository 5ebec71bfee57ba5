//! Animating a single widget property.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::logging::targets;
use crate::object::ObjectId;
use crate::property::Property;
use crate::types::{Point, Rect, Size};
use crate::variant::Variant;
use crate::widget::{Widget, find_widget};

use super::{Animation, AnimationCore, AnimationError, Easing};

/// Default length of a [`PropertyAnimation`].
const DEFAULT_DURATION: Duration = Duration::from_millis(250);

/// Interpolate between two property values at progress `t`.
///
/// Numbers of any kind mix into the type of `to`. Points, sizes, rects and
/// colors mix component-wise. Returns `None` for anything else.
///
/// ```
/// use horizon_trellis_core::animation::interpolate;
/// use horizon_trellis_core::Variant;
///
/// let mid = interpolate(&Variant::Double(0.0), &Variant::Double(1.0), 0.25);
/// assert_eq!(mid, Some(Variant::Double(0.25)));
/// assert_eq!(interpolate(&Variant::Bool(true), &Variant::Bool(false), 0.5), None);
/// ```
pub fn interpolate(from: &Variant, to: &Variant, t: f64) -> Option<Variant> {
    let mix = |a: f64, b: f64| a + (b - a) * t;
    let mix_i32 = |a: i32, b: i32| mix(f64::from(a), f64::from(b)).round() as i32;
    let mix_point = |a: Point, b: Point| Point::new(mix_i32(a.x, b.x), mix_i32(a.y, b.y));
    let mix_size = |a: Size, b: Size| {
        Size::new(mix_i32(a.width, b.width), mix_i32(a.height, b.height))
    };

    let value = match (from, to) {
        (Variant::Point(a), Variant::Point(b)) => Variant::Point(mix_point(*a, *b)),
        (Variant::Size(a), Variant::Size(b)) => Variant::Size(mix_size(*a, *b)),
        (Variant::Rect(a), Variant::Rect(b)) => Variant::Rect(Rect::from_parts(
            mix_point(a.origin, b.origin),
            mix_size(a.size, b.size),
        )),
        (Variant::Color(a), Variant::Color(b)) => Variant::Color(a.lerp(*b, t)),
        _ => {
            let value = mix(number(from)?, number(to)?);
            match to {
                Variant::Int(_) => Variant::Int(value.round() as i64),
                Variant::UInt(_) => Variant::UInt(value.round().max(0.0) as u64),
                _ => Variant::Double(value),
            }
        }
    };
    Some(value)
}

fn number(value: &Variant) -> Option<f64> {
    match value {
        Variant::Int(v) => Some(*v as f64),
        Variant::UInt(v) => Some(*v as f64),
        Variant::Double(v) => Some(*v),
        _ => None,
    }
}

/// Animates one property of a widget from a start value to an end value.
///
/// Without an explicit start value the animation reads the property when it
/// starts. The end value is written exactly on the final frame. If the
/// target widget is destroyed mid-flight the animation stops.
///
/// ```
/// use std::time::Duration;
/// use horizon_trellis_core::animation::{Animation, PropertyAnimation};
/// use horizon_trellis_core::object::init_global_registry;
/// use horizon_trellis_core::widget::Widget;
/// use horizon_trellis_core::widget::widgets::Label;
///
/// init_global_registry();
/// let label = Label::new().unwrap();
/// let fade = PropertyAnimation::for_property(label.as_ref(), "opacity").unwrap();
/// fade.set_end_value(0.0);
/// fade.set_duration(Duration::from_millis(100));
///
/// fade.start().unwrap();
/// fade.set_current_time(Duration::from_millis(50));
/// assert_eq!(label.widget_base().opacity(), 0.5);
/// ```
pub struct PropertyAnimation {
    core: AnimationCore,
    target: Property<Option<ObjectId>>,
    property_name: Property<String>,
    start_value: Property<Option<Variant>>,
    end_value: Property<Option<Variant>>,
    /// Start value captured when the animation last started.
    resolved_start: Property<Option<Variant>>,
    duration: Property<Duration>,
    easing: Property<Easing>,
}

impl PropertyAnimation {
    /// An animation with no target yet.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handle: Weak<dyn Animation> = weak.clone();
            Self {
                core: AnimationCore::new(handle),
                target: Property::new(None),
                property_name: Property::default(),
                start_value: Property::new(None),
                end_value: Property::new(None),
                resolved_start: Property::new(None),
                duration: Property::new(DEFAULT_DURATION),
                easing: Property::default(),
            }
        })
    }

    pub fn for_property(target: &dyn Widget, property: &str) -> Result<Arc<Self>, AnimationError> {
        let animation = Self::new();
        animation.set_target(target, property)?;
        Ok(animation)
    }

    /// Point the animation at `property` of `target`.
    pub fn set_target(&self, target: &dyn Widget, property: &str) -> Result<(), AnimationError> {
        if !target.has_property(property) {
            return Err(AnimationError::UnknownProperty(property.to_string()));
        }
        self.target.set(Some(target.object_id()));
        self.property_name.set(property.to_string());
        Ok(())
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target.get()
    }

    pub fn property_name(&self) -> String {
        self.property_name.get()
    }

    pub fn start_value(&self) -> Option<Variant> {
        self.start_value.get()
    }

    pub fn set_start_value(&self, value: impl Into<Variant>) {
        self.start_value.set(Some(value.into()));
    }

    /// Go back to reading the start value from the target.
    pub fn clear_start_value(&self) {
        self.start_value.set(None);
    }

    pub fn end_value(&self) -> Option<Variant> {
        self.end_value.get()
    }

    pub fn set_end_value(&self, value: impl Into<Variant>) {
        self.end_value.set(Some(value.into()));
    }

    pub fn set_duration(&self, duration: Duration) {
        self.duration.set(duration);
    }

    pub fn easing(&self) -> Easing {
        self.easing.get()
    }

    pub fn set_easing(&self, easing: Easing) {
        self.easing.set(easing);
    }

    fn target_widget(&self) -> Option<crate::widget::WidgetRef> {
        self.target.get().and_then(find_widget)
    }
}

impl Animation for PropertyAnimation {
    fn core(&self) -> &AnimationCore {
        &self.core
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.duration.get())
    }

    fn prepare(&self) -> Result<(), AnimationError> {
        let widget = self.target_widget().ok_or(AnimationError::InvalidTarget)?;
        let property = self.property_name.get();
        let unknown = || AnimationError::UnknownProperty(property.clone());
        let end = self.end_value.get().ok_or(AnimationError::NoEndValue)?;
        let start = match self.start_value.get() {
            Some(start) => start,
            None => widget.property(&property).ok_or_else(unknown)?,
        };
        if interpolate(&start, &end, 0.5).is_none() {
            return Err(AnimationError::IncompatibleValues {
                property,
                from: start.type_name(),
                to: end.type_name(),
            });
        }
        self.resolved_start.set(Some(start));
        Ok(())
    }

    fn update_current_time(&self, time: Duration) {
        let (Some(start), Some(end)) = (self.resolved_start.get(), self.end_value.get()) else {
            return;
        };
        let duration = self.duration.get();
        let progress = if duration.is_zero() {
            1.0
        } else {
            time.as_secs_f64() / duration.as_secs_f64()
        };
        let value = if progress >= 1.0 {
            end
        } else if progress <= 0.0 {
            start
        } else {
            let eased = self.easing.get().ease(progress);
            interpolate(&start, &end, eased).unwrap_or(end)
        };

        let property = self.property_name.get();
        let Some(widget) = self.target_widget() else {
            tracing::warn!(target: targets::ANIMATION, property, "animation target destroyed; stopping");
            self.stop();
            return;
        };
        if let Err(err) = widget.set_property(&property, value) {
            tracing::warn!(target: targets::ANIMATION, property, %err, "failed to apply animated value");
        }
    }
}

impl fmt::Debug for PropertyAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAnimation")
            .field("target", &self.target.get())
            .field("property", &self.property_name.get())
            .field("duration", &self.duration.get())
            .field("easing", &self.easing.get())
            .field("core", &self.core)
            .finish()
    }
}

static_assertions::assert_impl_all!(PropertyAnimation: Send, Sync);
