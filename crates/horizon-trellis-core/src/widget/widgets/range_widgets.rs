//! Range widgets: [`Slider`], [`Dial`], [`SpinBox`], [`DoubleSpinBox`] and
//! [`ProgressBar`].
//!
//! All of them keep their value in a [`RangeModel`], so values are clamped
//! into `[minimum, maximum]` and re-clamped whenever the range changes.
//! `value_changed` fires only when the effective value changes.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::{FromVariant, Variant};
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;
use super::range::{RangeModel, RangeValue};

/// Layout direction of sliders and splitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Horizontal" => Some(Self::Horizontal),
            "Vertical" => Some(Self::Vertical),
            _ => None,
        }
    }
}

pub(crate) fn expect_orientation(value: &Variant) -> Result<Orientation, PropertyError> {
    match value {
        Variant::String(name) => Orientation::from_name(name),
        _ => None,
    }
    .ok_or(PropertyError::TypeMismatch {
        expected: "orientation name",
        got: value.type_name(),
    })
}

/// Where a slider draws tick marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPosition {
    #[default]
    NoTicks,
    Above,
    Below,
    BothSides,
}

/// Range state plus the signals every range widget emits.
struct Ranged<T: RangeValue> {
    model: RwLock<RangeModel<T>>,
    value_changed: Signal<T>,
    range_changed: Signal<(T, T)>,
}

impl<T: RangeValue + Into<Variant> + FromVariant> Ranged<T> {
    const PROPERTY_NAMES: &'static [&'static str] =
        &["minimum", "maximum", "value", "singleStep", "pageStep"];

    fn new(model: RangeModel<T>) -> Self {
        Self {
            model: RwLock::new(model),
            value_changed: Signal::new(),
            range_changed: Signal::new(),
        }
    }

    fn get<R>(&self, f: impl FnOnce(&RangeModel<T>) -> R) -> R {
        f(&self.model.read())
    }

    /// Mutate the model, then emit outside the lock.
    fn apply(&self, f: impl FnOnce(&mut RangeModel<T>) -> bool) {
        let (changed, value) = {
            let mut model = self.model.write();
            let changed = f(&mut model);
            (changed, model.value())
        };
        if changed {
            self.value_changed.emit(value);
        }
    }

    fn set_range(&self, minimum: T, maximum: T) {
        self.apply(|m| m.set_range(minimum, maximum));
        let range = self.get(|m| (m.minimum(), m.maximum()));
        self.range_changed.emit(range);
    }

    fn set_minimum(&self, minimum: T) {
        let maximum = self.get(|m| m.maximum());
        let maximum = if maximum < minimum { minimum } else { maximum };
        self.set_range(minimum, maximum);
    }

    fn set_maximum(&self, maximum: T) {
        let minimum = self.get(|m| m.minimum());
        let minimum = if maximum < minimum { maximum } else { minimum };
        self.set_range(minimum, maximum);
    }

    /// Arrow keys step, page keys page, Home and End jump to the bounds.
    fn handle_key(&self, key: Key) -> bool {
        match key {
            Key::ArrowUp | Key::ArrowRight => self.apply(|m| m.step_by(1)),
            Key::ArrowDown | Key::ArrowLeft => self.apply(|m| m.step_by(-1)),
            Key::PageUp => self.apply(|m| m.page_by(1)),
            Key::PageDown => self.apply(|m| m.page_by(-1)),
            Key::Home => self.apply(|m| {
                let minimum = m.minimum();
                m.set_value(minimum)
            }),
            Key::End => self.apply(|m| {
                let maximum = m.maximum();
                m.set_value(maximum)
            }),
            _ => return false,
        }
        true
    }

    /// Handle a range property. `None` for names this layer does not own.
    fn set_property(&self, name: &str, value: &Variant) -> Option<Result<(), PropertyError>> {
        let typed = || {
            value.to::<T>().ok_or(PropertyError::TypeMismatch {
                expected: "number",
                got: value.type_name(),
            })
        };
        let result = match name {
            "minimum" => typed().map(|v| self.set_minimum(v)),
            "maximum" => typed().map(|v| self.set_maximum(v)),
            "value" => typed().map(|v| self.apply(|m| m.set_value(v))),
            "singleStep" => typed().map(|v| self.model.write().set_single_step(v)),
            "pageStep" => typed().map(|v| self.model.write().set_page_step(v)),
            _ => return None,
        };
        Some(result)
    }

    fn property(&self, name: &str) -> Option<Variant> {
        let model = *self.model.read();
        let value = match name {
            "minimum" => model.minimum(),
            "maximum" => model.maximum(),
            "value" => model.value(),
            "singleStep" => model.single_step(),
            "pageStep" => model.page_step(),
            _ => return None,
        };
        Some(value.into())
    }
}

fn class_names(extra: &[&'static str]) -> Vec<&'static str> {
    let mut names = property_names_with(Ranged::<i32>::PROPERTY_NAMES);
    names.extend_from_slice(extra);
    names
}

/// Shared accessors for integer range widgets.
macro_rules! int_range_accessors {
    () => {
        pub fn value(&self) -> i32 {
            self.range.get(|m| m.value())
        }

        /// Request a value; it is clamped into the range.
        pub fn set_value(&self, value: i32) {
            self.range.apply(|m| m.set_value(value));
        }

        pub fn minimum(&self) -> i32 {
            self.range.get(|m| m.minimum())
        }

        pub fn maximum(&self) -> i32 {
            self.range.get(|m| m.maximum())
        }

        pub fn set_minimum(&self, minimum: i32) {
            self.range.set_minimum(minimum);
        }

        pub fn set_maximum(&self, maximum: i32) {
            self.range.set_maximum(maximum);
        }

        pub fn set_range(&self, minimum: i32, maximum: i32) {
            self.range.set_range(minimum, maximum);
        }

        pub fn single_step(&self) -> i32 {
            self.range.get(|m| m.single_step())
        }

        pub fn set_single_step(&self, step: i32) {
            self.range.model.write().set_single_step(step);
        }

        pub fn page_step(&self) -> i32 {
            self.range.get(|m| m.page_step())
        }

        pub fn set_page_step(&self, step: i32) {
            self.range.model.write().set_page_step(step);
        }

        /// Emitted when the effective value changes.
        pub fn value_changed(&self) -> &Signal<i32> {
            &self.range.value_changed
        }

        /// Emitted with `(minimum, maximum)` after a range change.
        pub fn range_changed(&self) -> &Signal<(i32, i32)> {
            &self.range.range_changed
        }
    };
}

// =============================================================================
// Slider
// =============================================================================

/// A slider over an integer range.
pub struct Slider {
    base: WidgetBase,
    range: Ranged<i32>,
    orientation: Property<Orientation>,
    tick_position: Property<TickPosition>,
    tick_interval: Property<i32>,
}

impl Slider {
    const CLASS_PROPERTIES: &'static [&'static str] = &["orientation", "tickInterval"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_orientation(Orientation::Horizontal)
    }

    pub fn with_orientation(orientation: Orientation) -> ObjectResult<Arc<Self>> {
        let slider = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            range: Ranged::new(RangeModel::default()),
            orientation: Property::new(orientation),
            tick_position: Property::default(),
            tick_interval: Property::new(0),
        });
        register_widget(&slider);
        Ok(slider)
    }

    int_range_accessors!();

    pub fn orientation(&self) -> Orientation {
        self.orientation.get()
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.orientation.set(orientation);
    }

    pub fn tick_position(&self) -> TickPosition {
        self.tick_position.get()
    }

    pub fn set_tick_position(&self, position: TickPosition) {
        self.tick_position.set(position);
    }

    pub fn tick_interval(&self) -> i32 {
        self.tick_interval.get()
    }

    pub fn set_tick_interval(&self, interval: i32) {
        self.tick_interval.set(interval.max(0));
    }
}

impl Widget for Slider {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "Slider"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        if let Some(result) = self.range.set_property(name, &value) {
            return result;
        }
        match name {
            "orientation" => self.set_orientation(expect_orientation(&value)?),
            "tickInterval" => self.set_tick_interval(expect(&value, "int")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "orientation" => Some(self.orientation().name().into()),
            "tickInterval" => Some(self.tick_interval().into()),
            _ => self
                .range
                .property(name)
                .or_else(|| self.base.property(name)),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        class_names(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key, .. } => self.range.handle_key(*key),
            _ => false,
        }
    }
}

// =============================================================================
// Dial
// =============================================================================

/// A rotary range control.
pub struct Dial {
    base: WidgetBase,
    range: Ranged<i32>,
    notches_visible: Property<bool>,
}

impl Dial {
    const CLASS_PROPERTIES: &'static [&'static str] = &["wrapping", "notchesVisible"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let dial = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            range: Ranged::new(RangeModel::default()),
            notches_visible: Property::new(false),
        });
        register_widget(&dial);
        Ok(dial)
    }

    int_range_accessors!();

    pub fn wrapping(&self) -> bool {
        self.range.get(|m| m.wrapping())
    }

    /// Whether stepping past one end continues from the other.
    pub fn set_wrapping(&self, wrapping: bool) {
        self.range.model.write().set_wrapping(wrapping);
    }

    pub fn notches_visible(&self) -> bool {
        self.notches_visible.get()
    }

    pub fn set_notches_visible(&self, visible: bool) {
        self.notches_visible.set(visible);
    }
}

impl Widget for Dial {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "Dial"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        if let Some(result) = self.range.set_property(name, &value) {
            return result;
        }
        match name {
            "wrapping" => self.set_wrapping(expect(&value, "bool")?),
            "notchesVisible" => self.set_notches_visible(expect(&value, "bool")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "wrapping" => Some(self.wrapping().into()),
            "notchesVisible" => Some(self.notches_visible().into()),
            _ => self
                .range
                .property(name)
                .or_else(|| self.base.property(name)),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        class_names(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key, .. } => self.range.handle_key(*key),
            _ => false,
        }
    }
}

// =============================================================================
// SpinBox
// =============================================================================

/// Prefix, suffix and the special text shown at the minimum.
#[derive(Default)]
struct Affixes {
    prefix: Property<String>,
    suffix: Property<String>,
    special_value_text: Property<String>,
}

impl Affixes {
    const PROPERTY_NAMES: &'static [&'static str] =
        &["prefix", "suffix", "specialValueText", "wrapping"];

    fn format(&self, number: String, at_minimum: bool) -> String {
        let special = self.special_value_text.get();
        if at_minimum && !special.is_empty() {
            return special;
        }
        format!("{}{}{}", self.prefix.get(), number, self.suffix.get())
    }

    /// Strip the prefix and suffix from user text.
    fn strip<'a>(&self, text: &'a str) -> &'a str {
        let prefix = self.prefix.get();
        let suffix = self.suffix.get();
        let text = text.trim();
        let text = text.strip_prefix(prefix.as_str()).unwrap_or(text);
        text.strip_suffix(suffix.as_str()).unwrap_or(text).trim()
    }

    fn set_property(&self, name: &str, value: &Variant) -> Option<Result<(), PropertyError>> {
        let target = match name {
            "prefix" => &self.prefix,
            "suffix" => &self.suffix,
            "specialValueText" => &self.special_value_text,
            _ => return None,
        };
        Some(expect::<String>(value, "string").map(|text| {
            target.set(text);
        }))
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "prefix" => Some(self.prefix.get().into()),
            "suffix" => Some(self.suffix.get().into()),
            "specialValueText" => Some(self.special_value_text.get().into()),
            _ => None,
        }
    }
}

/// An integer spin box.
pub struct SpinBox {
    base: WidgetBase,
    range: Ranged<i32>,
    affixes: Affixes,
}

impl SpinBox {
    pub fn new() -> ObjectResult<Arc<Self>> {
        let spin = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            range: Ranged::new(RangeModel::default()),
            affixes: Affixes::default(),
        });
        register_widget(&spin);
        Ok(spin)
    }

    int_range_accessors!();

    pub fn step_up(&self) {
        self.range.apply(|m| m.step_by(1));
    }

    pub fn step_down(&self) {
        self.range.apply(|m| m.step_by(-1));
    }

    pub fn wrapping(&self) -> bool {
        self.range.get(|m| m.wrapping())
    }

    pub fn set_wrapping(&self, wrapping: bool) {
        self.range.model.write().set_wrapping(wrapping);
    }

    pub fn prefix(&self) -> String {
        self.affixes.prefix.get()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.affixes.prefix.set(prefix.into());
    }

    pub fn suffix(&self) -> String {
        self.affixes.suffix.get()
    }

    pub fn set_suffix(&self, suffix: impl Into<String>) {
        self.affixes.suffix.set(suffix.into());
    }

    /// Text shown instead of the number when the value is at the minimum.
    pub fn set_special_value_text(&self, text: impl Into<String>) {
        self.affixes.special_value_text.set(text.into());
    }

    /// The displayed text.
    pub fn text(&self) -> String {
        let value = self.value();
        self.affixes
            .format(value.to_string(), value == self.minimum())
    }

    /// Set the value from displayed text. Returns `false` if it does not parse.
    pub fn set_text(&self, text: &str) -> bool {
        match self.affixes.strip(text).parse::<i32>() {
            Ok(value) => {
                self.set_value(value);
                true
            }
            Err(_) => false,
        }
    }
}

impl Widget for SpinBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "SpinBox"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        if let Some(result) = self.range.set_property(name, &value) {
            return result;
        }
        if let Some(result) = self.affixes.set_property(name, &value) {
            return result;
        }
        match name {
            "wrapping" => self.set_wrapping(expect(&value, "bool")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "wrapping" => Some(self.wrapping().into()),
            _ => self
                .range
                .property(name)
                .or_else(|| self.affixes.property(name))
                .or_else(|| self.base.property(name)),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        class_names(Affixes::PROPERTY_NAMES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key, .. } => self.range.handle_key(*key),
            _ => false,
        }
    }
}

// =============================================================================
// DoubleSpinBox
// =============================================================================

/// A floating-point spin box. Values are rounded to `decimals` places.
pub struct DoubleSpinBox {
    base: WidgetBase,
    range: Ranged<f64>,
    affixes: Affixes,
    decimals: Property<u32>,
}

impl DoubleSpinBox {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["prefix", "suffix", "specialValueText", "wrapping", "decimals"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let spin = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            range: Ranged::new(RangeModel::new(0.0, 99.99, 1.0, 10.0)),
            affixes: Affixes::default(),
            decimals: Property::new(2),
        });
        register_widget(&spin);
        Ok(spin)
    }

    pub fn value(&self) -> f64 {
        self.range.get(|m| m.value())
    }

    pub fn set_value(&self, value: f64) {
        let value = self.round(value);
        self.range.apply(|m| m.set_value(value));
    }

    pub fn minimum(&self) -> f64 {
        self.range.get(|m| m.minimum())
    }

    pub fn maximum(&self) -> f64 {
        self.range.get(|m| m.maximum())
    }

    pub fn set_range(&self, minimum: f64, maximum: f64) {
        self.range.set_range(self.round(minimum), self.round(maximum));
    }

    pub fn set_minimum(&self, minimum: f64) {
        self.range.set_minimum(self.round(minimum));
    }

    pub fn set_maximum(&self, maximum: f64) {
        self.range.set_maximum(self.round(maximum));
    }

    pub fn single_step(&self) -> f64 {
        self.range.get(|m| m.single_step())
    }

    pub fn set_single_step(&self, step: f64) {
        self.range.model.write().set_single_step(step);
    }

    pub fn decimals(&self) -> u32 {
        self.decimals.get()
    }

    /// Changing the precision re-rounds the range and the value.
    pub fn set_decimals(&self, decimals: u32) {
        self.decimals.set(decimals.min(15));
        let (minimum, maximum, value) =
            self.range.get(|m| (m.minimum(), m.maximum(), m.value()));
        self.set_range(minimum, maximum);
        self.set_value(value);
    }

    pub fn step_up(&self) {
        self.range.apply(|m| m.step_by(1));
    }

    pub fn step_down(&self) {
        self.range.apply(|m| m.step_by(-1));
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.affixes.prefix.set(prefix.into());
    }

    pub fn set_suffix(&self, suffix: impl Into<String>) {
        self.affixes.suffix.set(suffix.into());
    }

    pub fn text(&self) -> String {
        let value = self.value();
        let number = format!("{value:.prec$}", prec = self.decimals() as usize);
        self.affixes.format(number, value == self.minimum())
    }

    pub fn set_text(&self, text: &str) -> bool {
        match self.affixes.strip(text).parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.set_value(value);
                true
            }
            _ => false,
        }
    }

    pub fn value_changed(&self) -> &Signal<f64> {
        &self.range.value_changed
    }

    fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimals() as i32);
        (value * factor).round() / factor
    }
}

impl Widget for DoubleSpinBox {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "DoubleSpinBox"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "value" => self.set_value(expect(&value, "double")?),
            "minimum" => self.set_minimum(expect(&value, "double")?),
            "maximum" => self.set_maximum(expect(&value, "double")?),
            "decimals" => self.set_decimals(expect(&value, "uint")?),
            "wrapping" => self
                .range
                .model
                .write()
                .set_wrapping(expect(&value, "bool")?),
            _ => {
                if let Some(result) = self.range.set_property(name, &value) {
                    return result;
                }
                if let Some(result) = self.affixes.set_property(name, &value) {
                    return result;
                }
                return self.base.set_property(name, value);
            }
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "decimals" => Some(self.decimals().into()),
            "wrapping" => Some(self.range.get(|m| m.wrapping()).into()),
            _ => self
                .range
                .property(name)
                .or_else(|| self.affixes.property(name))
                .or_else(|| self.base.property(name)),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        class_names(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        match event {
            WidgetEvent::KeyPress { key, .. } => self.range.handle_key(*key),
            _ => false,
        }
    }
}

// =============================================================================
// ProgressBar
// =============================================================================

/// A progress indicator over an integer range (default 0..=100).
pub struct ProgressBar {
    base: WidgetBase,
    range: Ranged<i32>,
    format: Property<String>,
    text_visible: Property<bool>,
    orientation: Property<Orientation>,
}

impl ProgressBar {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["format", "textVisible", "orientation", "text"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let bar = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            range: Ranged::new(RangeModel::new(0, 100, 1, 10)),
            format: Property::new("%p%".to_string()),
            text_visible: Property::new(true),
            orientation: Property::default(),
        });
        register_widget(&bar);
        Ok(bar)
    }

    int_range_accessors!();

    /// Return to the minimum.
    pub fn reset(&self) {
        let minimum = self.minimum();
        self.set_value(minimum);
    }

    /// Display format: `%p` percent, `%v` value, `%m` maximum.
    pub fn format(&self) -> String {
        self.format.get()
    }

    pub fn set_format(&self, format: impl Into<String>) {
        self.format.set(format.into());
    }

    pub fn is_text_visible(&self) -> bool {
        self.text_visible.get()
    }

    pub fn set_text_visible(&self, visible: bool) {
        self.text_visible.set(visible);
    }

    /// Completed percentage, rounded.
    pub fn percent(&self) -> i32 {
        (self.range.get(|m| m.fraction()) * 100.0).round() as i32
    }

    /// The rendered progress text.
    pub fn text(&self) -> String {
        self.format()
            .replace("%p", &self.percent().to_string())
            .replace("%v", &self.value().to_string())
            .replace("%m", &self.maximum().to_string())
    }
}

impl Widget for ProgressBar {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "ProgressBar"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        if let Some(result) = self.range.set_property(name, &value) {
            return result;
        }
        match name {
            "format" => self.set_format(expect::<String>(&value, "string")?),
            "textVisible" => self.set_text_visible(expect(&value, "bool")?),
            "orientation" => {
                self.orientation.set(expect_orientation(&value)?);
            }
            "text" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "format" => Some(self.format().into()),
            "textVisible" => Some(self.is_text_visible().into()),
            "orientation" => Some(self.orientation.get().name().into()),
            "text" => Some(self.text().into()),
            _ => self
                .range
                .property(name)
                .or_else(|| self.base.property(name)),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        class_names(Self::CLASS_PROPERTIES)
    }
}

static_assertions::assert_impl_all!(Slider: Send, Sync);
static_assertions::assert_impl_all!(DoubleSpinBox: Send, Sync);
static_assertions::assert_impl_all!(ProgressBar: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::widget::WidgetRef;
    use parking_lot::Mutex;

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_slider_clamps_and_rechecks_on_range_change() {
        setup();
        let slider = Slider::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        slider.value_changed().connect(move |v| log.lock().push(*v));

        slider.set_value(150);
        assert_eq!(slider.value(), 99);
        slider.set_maximum(200);
        assert_eq!(slider.value(), 99);
        slider.set_value(150);
        slider.set_range(0, 50);
        assert_eq!(slider.value(), 50);
        assert_eq!(*seen.lock(), vec![99, 150, 50]);
    }

    #[test]
    fn test_slider_keys() {
        setup();
        let slider: WidgetRef = Slider::new().unwrap();
        slider.send_event(&WidgetEvent::key_press(Key::End, KeyboardModifiers::NONE));
        assert_eq!(slider.property("value"), Some(Variant::Int(99)));
        slider.send_event(&WidgetEvent::key_press(Key::PageDown, KeyboardModifiers::NONE));
        assert_eq!(slider.property("value"), Some(Variant::Int(89)));
    }

    #[test]
    fn test_spin_box_text() {
        setup();
        let spin = SpinBox::new().unwrap();
        spin.set_prefix("$");
        spin.set_suffix(" USD");
        spin.set_value(42);
        assert_eq!(spin.text(), "$42 USD");
        assert!(spin.set_text("$ 7 USD"));
        assert_eq!(spin.value(), 7);
        assert!(!spin.set_text("seven"));

        spin.set_special_value_text("Auto");
        spin.set_value(0);
        assert_eq!(spin.text(), "Auto");
    }

    #[test]
    fn test_spin_box_wrapping() {
        setup();
        let spin = SpinBox::new().unwrap();
        spin.set_range(1, 3);
        spin.set_wrapping(true);
        spin.set_value(3);
        spin.step_up();
        assert_eq!(spin.value(), 1);
    }

    #[test]
    fn test_double_spin_box_rounds() {
        setup();
        let spin = DoubleSpinBox::new().unwrap();
        spin.set_value(3.14159);
        assert_eq!(spin.value(), 3.14);
        assert_eq!(spin.text(), "3.14");
        spin.set_decimals(0);
        assert_eq!(spin.value(), 3.0);
    }

    #[test]
    fn test_progress_bar_text() {
        setup();
        let bar = ProgressBar::new().unwrap();
        bar.set_value(250);
        assert_eq!(bar.value(), 100);
        bar.set_range(0, 200);
        assert_eq!(bar.text(), "50%");
        bar.set_format("%v of %m");
        assert_eq!(bar.text(), "100 of 200");
        bar.reset();
        assert_eq!(bar.value(), 0);
    }

    #[test]
    fn test_reflective_range_properties() {
        setup();
        let dial: WidgetRef = Dial::new().unwrap();
        dial.set_property("maximum", Variant::Int(10)).unwrap();
        dial.set_property("value", Variant::Int(20)).unwrap();
        assert_eq!(dial.property("value"), Some(Variant::Int(10)));
        assert!(matches!(
            dial.set_property("value", "x".into()),
            Err(PropertyError::TypeMismatch { .. })
        ));
    }
}
