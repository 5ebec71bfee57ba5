//! Date and time editor.

use std::sync::Arc;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

pub const DEFAULT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The part of the value that arrow keys step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeSection {
    Year,
    Month,
    #[default]
    Day,
    Hour,
    Minute,
    Second,
}

impl DateTimeSection {
    const ORDER: [Self; 6] = [
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
    ];

    fn neighbour(self, forward: bool) -> Self {
        let index = Self::ORDER.iter().position(|&s| s == self).unwrap_or(2);
        let next = if forward {
            (index + 1).min(Self::ORDER.len() - 1)
        } else {
            index.saturating_sub(1)
        };
        Self::ORDER[next]
    }

    fn step(self, value: NaiveDateTime, steps: i32) -> Option<NaiveDateTime> {
        let months = |n: i32| {
            let magnitude = Months::new(n.unsigned_abs());
            if n >= 0 {
                value.checked_add_months(magnitude)
            } else {
                value.checked_sub_months(magnitude)
            }
        };
        let steps64 = i64::from(steps);
        match self {
            Self::Year => months(steps.checked_mul(12)?),
            Self::Month => months(steps),
            Self::Day => value.checked_add_signed(TimeDelta::try_days(steps64)?),
            Self::Hour => value.checked_add_signed(TimeDelta::try_hours(steps64)?),
            Self::Minute => value.checked_add_signed(TimeDelta::try_minutes(steps64)?),
            Self::Second => value.checked_add_signed(TimeDelta::try_seconds(steps64)?),
        }
    }
}

fn epoch(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Edits a [`NaiveDateTime`] kept within `[minimum, maximum]`.
///
/// The value is shown and parsed with a `chrono` format string. Out-of-range
/// values are clamped; narrowing the range re-clamps the current value.
///
/// # Signals
///
/// - `date_time_changed(NaiveDateTime)`
/// - `date_changed(NaiveDate)`: only when the date part changed
/// - `time_changed(NaiveTime)`: only when the time part changed
pub struct DateTimeEdit {
    base: WidgetBase,
    value: Property<NaiveDateTime>,
    minimum: Property<NaiveDateTime>,
    maximum: Property<NaiveDateTime>,
    display_format: Property<String>,
    calendar_popup: Property<bool>,
    section: Property<DateTimeSection>,

    pub date_time_changed: Signal<NaiveDateTime>,
    pub date_changed: Signal<NaiveDate>,
    pub time_changed: Signal<NaiveTime>,
}

impl DateTimeEdit {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "dateTime",
        "date",
        "time",
        "minimumDateTime",
        "maximumDateTime",
        "displayFormat",
        "calendarPopup",
        "text",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).map_or(NaiveDateTime::MIN, epoch);
        Self::with_date_time(start)
    }

    pub fn with_date_time(value: NaiveDateTime) -> ObjectResult<Arc<Self>> {
        let minimum = NaiveDate::from_ymd_opt(1752, 9, 14).map_or(NaiveDateTime::MIN, epoch);
        let maximum = NaiveDate::from_ymd_opt(9999, 12, 31)
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .unwrap_or(NaiveDateTime::MAX);
        let edit = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            value: Property::new(value.clamp(minimum, maximum)),
            minimum: Property::new(minimum),
            maximum: Property::new(maximum),
            display_format: Property::new(DEFAULT_DISPLAY_FORMAT.to_string()),
            calendar_popup: Property::new(false),
            section: Property::default(),
            date_time_changed: Signal::new(),
            date_changed: Signal::new(),
            time_changed: Signal::new(),
        });
        register_widget(&edit);
        Ok(edit)
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.value.get()
    }

    /// Set the value, clamped into range.
    pub fn set_date_time(&self, value: NaiveDateTime) {
        let value = value.clamp(self.minimum_date_time(), self.maximum_date_time());
        let Some(old) = self.value.replace(value) else {
            return;
        };
        if old.date() != value.date() {
            self.date_changed.emit(value.date());
        }
        if old.time() != value.time() {
            self.time_changed.emit(value.time());
        }
        self.date_time_changed.emit(value);
    }

    pub fn date(&self) -> NaiveDate {
        self.date_time().date()
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set_date_time(date.and_time(self.time()));
    }

    pub fn time(&self) -> NaiveTime {
        self.date_time().time()
    }

    pub fn set_time(&self, time: NaiveTime) {
        self.set_date_time(self.date().and_time(time));
    }

    pub fn minimum_date_time(&self) -> NaiveDateTime {
        self.minimum.get()
    }

    pub fn maximum_date_time(&self) -> NaiveDateTime {
        self.maximum.get()
    }

    /// Set the range; a maximum before the minimum is raised to it.
    pub fn set_date_time_range(&self, minimum: NaiveDateTime, maximum: NaiveDateTime) {
        self.minimum.set(minimum);
        self.maximum.set(maximum.max(minimum));
        self.set_date_time(self.date_time());
    }

    pub fn set_minimum_date_time(&self, minimum: NaiveDateTime) {
        self.set_date_time_range(minimum, self.maximum_date_time().max(minimum));
    }

    pub fn set_maximum_date_time(&self, maximum: NaiveDateTime) {
        self.set_date_time_range(self.minimum_date_time().min(maximum), maximum);
    }

    pub fn display_format(&self) -> String {
        self.display_format.get()
    }

    pub fn set_display_format(&self, format: impl Into<String>) {
        self.display_format.set(format.into());
    }

    /// The value rendered with the display format.
    pub fn text(&self) -> String {
        self.date_time().format(&self.display_format()).to_string()
    }

    /// Parse `text` with the display format. Returns `false` if it does not
    /// parse; a format without a time part sets midnight.
    pub fn set_text(&self, text: &str) -> bool {
        let format = self.display_format();
        let parsed = NaiveDateTime::parse_from_str(text, &format)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(text, &format).ok().map(epoch));
        match parsed {
            Some(value) => {
                self.set_date_time(value);
                true
            }
            None => false,
        }
    }

    pub fn calendar_popup(&self) -> bool {
        self.calendar_popup.get()
    }

    pub fn set_calendar_popup(&self, enabled: bool) {
        self.calendar_popup.set(enabled);
    }

    pub fn current_section(&self) -> DateTimeSection {
        self.section.get()
    }

    pub fn set_current_section(&self, section: DateTimeSection) {
        self.section.set(section);
    }

    /// Step the current section; overflow past the range bounds clamps.
    pub fn step_by(&self, steps: i32) {
        let value = self.current_section().step(self.date_time(), steps);
        let value = value.unwrap_or(if steps < 0 {
            self.minimum_date_time()
        } else {
            self.maximum_date_time()
        });
        self.set_date_time(value);
    }

    pub fn step_up(&self) {
        self.step_by(1);
    }

    pub fn step_down(&self) {
        self.step_by(-1);
    }
}

fn expect_date_time(value: &Variant) -> Result<NaiveDateTime, PropertyError> {
    match value {
        Variant::DateTime(v) => Ok(*v),
        Variant::Date(d) => Ok(epoch(*d)),
        _ => Err(PropertyError::TypeMismatch {
            expected: "datetime",
            got: value.type_name(),
        }),
    }
}

impl Widget for DateTimeEdit {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "DateTimeEdit"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "dateTime" => self.set_date_time(expect_date_time(&value)?),
            "date" => self.set_date(expect(&value, "date")?),
            "time" => self.set_time(expect(&value, "time")?),
            "minimumDateTime" => self.set_minimum_date_time(expect_date_time(&value)?),
            "maximumDateTime" => self.set_maximum_date_time(expect_date_time(&value)?),
            "displayFormat" => self.set_display_format(expect::<String>(&value, "string")?),
            "calendarPopup" => self.set_calendar_popup(expect(&value, "bool")?),
            "text" => {
                let text: String = expect(&value, "string")?;
                if !self.set_text(&text) {
                    return Err(PropertyError::TypeMismatch {
                        expected: "text matching the display format",
                        got: "string",
                    });
                }
            }
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "dateTime" => Some(self.date_time().into()),
            "date" => Some(self.date().into()),
            "time" => Some(self.time().into()),
            "minimumDateTime" => Some(self.minimum_date_time().into()),
            "maximumDateTime" => Some(self.maximum_date_time().into()),
            "displayFormat" => Some(self.display_format().into()),
            "calendarPopup" => Some(self.calendar_popup().into()),
            "text" => Some(self.text().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }

    fn event(&self, event: &WidgetEvent) -> bool {
        let WidgetEvent::KeyPress { key, .. } = event else {
            return false;
        };
        match key {
            Key::ArrowUp => self.step_up(),
            Key::ArrowDown => self.step_down(),
            Key::ArrowLeft => self.set_current_section(self.current_section().neighbour(false)),
            Key::ArrowRight => self.set_current_section(self.current_section().neighbour(true)),
            _ => return false,
        }
        true
    }
}

static_assertions::assert_impl_all!(DateTimeEdit: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use parking_lot::Mutex;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_clamps_into_range() {
        init_global_registry();
        let edit = DateTimeEdit::with_date_time(at(2024, 6, 15, 12, 0)).unwrap();
        edit.set_date_time_range(at(2024, 1, 1, 0, 0), at(2024, 3, 1, 0, 0));
        assert_eq!(edit.date_time(), at(2024, 3, 1, 0, 0));
        edit.set_date_time(at(1999, 1, 1, 0, 0));
        assert_eq!(edit.date_time(), at(2024, 1, 1, 0, 0));
    }

    #[test]
    fn test_text_round_trip_with_format() {
        init_global_registry();
        let edit = DateTimeEdit::with_date_time(at(2024, 2, 29, 9, 5)).unwrap();
        assert_eq!(edit.text(), "2024-02-29 09:05");
        assert!(edit.set_text("2025-01-02 18:30"));
        assert_eq!(edit.date_time(), at(2025, 1, 2, 18, 30));
        assert!(!edit.set_text("yesterday"));

        edit.set_display_format("%d/%m/%Y");
        assert!(edit.set_text("03/04/2025"));
        assert_eq!(edit.date_time(), at(2025, 4, 3, 0, 0));
    }

    #[test]
    fn test_section_stepping_signals() {
        init_global_registry();
        let edit = DateTimeEdit::with_date_time(at(2024, 1, 31, 23, 0)).unwrap();
        let dates = Arc::new(Mutex::new(0));
        let times = Arc::new(Mutex::new(0));
        let (d, t) = (dates.clone(), times.clone());
        edit.date_changed.connect(move |_| *d.lock() += 1);
        edit.time_changed.connect(move |_| *t.lock() += 1);

        edit.set_current_section(DateTimeSection::Month);
        edit.step_up();
        assert_eq!(edit.date_time(), at(2024, 2, 29, 23, 0));

        edit.set_current_section(DateTimeSection::Hour);
        edit.step_up();
        assert_eq!(edit.date_time(), at(2024, 3, 1, 0, 0));
        assert_eq!((*dates.lock(), *times.lock()), (2, 1));
    }
}
