//! Month calendar widget.

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate, TimeDelta, Weekday};

use crate::event::{Key, WidgetEvent};
use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

fn weekday_from_name(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

/// Days from `start` forward to `day`, in `0..7`.
fn days_after(day: Weekday, start: Weekday) -> u32 {
    (day.num_days_from_monday() + 7 - start.num_days_from_monday()) % 7
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// A month grid with a single selected date.
///
/// The shown page (year and month) is independent of the selection: paging
/// does not move the selection, while selecting a date pages to it.
///
/// # Signals
///
/// - `selection_changed(NaiveDate)`
/// - `clicked(NaiveDate)`: a date was picked with [`click`](Self::click)
/// - `activated(NaiveDate)`: Enter on the selected date
/// - `current_page_changed((year, month))`
pub struct CalendarWidget {
    base: WidgetBase,
    selected: Property<NaiveDate>,
    minimum: Property<NaiveDate>,
    maximum: Property<NaiveDate>,
    page: Property<(i32, u32)>,
    first_day_of_week: Property<Weekday>,
    grid_visible: Property<bool>,

    pub selection_changed: Signal<NaiveDate>,
    pub clicked: Signal<NaiveDate>,
    pub activated: Signal<NaiveDate>,
    pub current_page_changed: Signal<(i32, u32)>,
}

impl CalendarWidget {
    const CLASS_PROPERTIES: &'static [&'static str] = &[
        "selectedDate",
        "minimumDate",
        "maximumDate",
        "gridVisible",
        "firstDayOfWeek",
        "yearShown",
        "monthShown",
    ];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_date(chrono::Local::now().date_naive())
    }

    pub fn with_date(date: NaiveDate) -> ObjectResult<Arc<Self>> {
        let calendar = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            selected: Property::new(date),
            minimum: Property::new(NaiveDate::from_ymd_opt(100, 1, 1).unwrap_or(NaiveDate::MIN)),
            maximum: Property::new(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)),
            page: Property::new((date.year(), date.month())),
            first_day_of_week: Property::new(Weekday::Mon),
            grid_visible: Property::new(false),
            selection_changed: Signal::new(),
            clicked: Signal::new(),
            activated: Signal::new(),
            current_page_changed: Signal::new(),
        });
        register_widget(&calendar);
        Ok(calendar)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected_date(&self) -> NaiveDate {
        self.selected.get()
    }

    /// Select a date, clamped into range, and page to it.
    pub fn set_selected_date(&self, date: NaiveDate) {
        let date = date.clamp(self.minimum_date(), self.maximum_date());
        if self.selected.set(date) {
            self.selection_changed.emit(date);
        }
        self.set_current_page(date.year(), date.month());
    }

    /// Select `date` as if clicked. Dates outside the range are ignored.
    pub fn click(&self, date: NaiveDate) -> bool {
        if date < self.minimum_date() || date > self.maximum_date() {
            return false;
        }
        self.set_selected_date(date);
        self.clicked.emit(date);
        true
    }

    pub fn minimum_date(&self) -> NaiveDate {
        self.minimum.get()
    }

    pub fn maximum_date(&self) -> NaiveDate {
        self.maximum.get()
    }

    /// A maximum before the minimum is raised to it. The selection is
    /// re-clamped.
    pub fn set_date_range(&self, minimum: NaiveDate, maximum: NaiveDate) {
        self.minimum.set(minimum);
        self.maximum.set(maximum.max(minimum));
        self.set_selected_date(self.selected_date());
    }

    pub fn set_minimum_date(&self, minimum: NaiveDate) {
        self.set_date_range(minimum, self.maximum_date().max(minimum));
    }

    pub fn set_maximum_date(&self, maximum: NaiveDate) {
        self.set_date_range(self.minimum_date().min(maximum), maximum);
    }

    fn move_selection(&self, days: i64) {
        let target = TimeDelta::try_days(days).and_then(|d| self.selected_date().checked_add_signed(d));
        if let Some(target) = target {
            self.set_selected_date(target);
        }
    }

    fn move_selection_months(&self, months: i32) {
        let selected = self.selected_date();
        let magnitude = Months::new(months.unsigned_abs());
        let target = if months >= 0 {
            selected.checked_add_months(magnitude)
        } else {
            selected.checked_sub_months(magnitude)
        };
        if let Some(target) = target {
            self.set_selected_date(target);
        }
    }

    // =========================================================================
    // Paging
    // =========================================================================

    pub fn year_shown(&self) -> i32 {
        self.page.get().0
    }

    pub fn month_shown(&self) -> u32 {
        self.page.get().1
    }

    /// Show a month. Invalid months and pages outside the range are ignored.
    pub fn set_current_page(&self, year: i32, month: u32) {
        let Some(first) = first_of_month(year, month) else {
            return;
        };
        let min = self.minimum_date();
        let max = self.maximum_date();
        if (first.year(), first.month()) < (min.year(), min.month()) || first > max {
            return;
        }
        if self.page.set((year, month)) {
            self.current_page_changed.emit((year, month));
        }
    }

    fn shift_page(&self, months: i32) {
        let index = self.year_shown() * 12 + self.month_shown() as i32 - 1 + months;
        self.set_current_page(index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
    }

    pub fn show_next_month(&self) {
        self.shift_page(1);
    }

    pub fn show_previous_month(&self) {
        self.shift_page(-1);
    }

    pub fn show_next_year(&self) {
        self.shift_page(12);
    }

    pub fn show_previous_year(&self) {
        self.shift_page(-12);
    }

    pub fn show_selected_date(&self) {
        let date = self.selected_date();
        self.set_current_page(date.year(), date.month());
    }

    /// The six weeks displayed for the shown page, each starting on the
    /// first day of the week.
    pub fn month_grid(&self) -> Vec<[NaiveDate; 7]> {
        let Some(first) = first_of_month(self.year_shown(), self.month_shown()) else {
            return Vec::new();
        };
        let lead = days_after(first.weekday(), self.first_day_of_week());
        let Some(start) = TimeDelta::try_days(i64::from(lead))
            .and_then(|lead| first.checked_sub_signed(lead))
        else {
            return Vec::new();
        };
        start
            .iter_days()
            .take(42)
            .collect::<Vec<_>>()
            .chunks_exact(7)
            .filter_map(|week| week.try_into().ok())
            .collect()
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week.get()
    }

    pub fn set_first_day_of_week(&self, day: Weekday) {
        self.first_day_of_week.set(day);
    }

    pub fn is_grid_visible(&self) -> bool {
        self.grid_visible.get()
    }

    pub fn set_grid_visible(&self, visible: bool) {
        self.grid_visible.set(visible);
    }
}

impl Widget for CalendarWidget {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "CalendarWidget"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "selectedDate" => self.set_selected_date(expect(&value, "date")?),
            "minimumDate" => self.set_minimum_date(expect(&value, "date")?),
            "maximumDate" => self.set_maximum_date(expect(&value, "date")?),
            "gridVisible" => self.set_grid_visible(expect(&value, "bool")?),
            "firstDayOfWeek" => {
                let day = match &value {
                    Variant::String(name) => weekday_from_name(name),
                    _ => None,
                };
                self.set_first_day_of_week(day.ok_or(PropertyError::TypeMismatch {
                    expected: "weekday name",
                    got: value.type_name(),
                })?);
            }
            "yearShown" | "monthShown" => return Err(PropertyError::read_only(name)),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "selectedDate" => Some(self.selected_date().into()),
            "minimumDate" => Some(self.minimum_date().into()),
            "maximumDate" => Some(self.maximum_date().into()),
            "gridVisible" => Some(self.is_grid_visible().into()),
            "firstDayOfWeek" => Some(self.first_day_of_week().to_string().into()),
            "yearShown" => Some(self.year_shown().into()),
            "monthShown" => Some(self.month_shown().into()),
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
            Key::ArrowLeft => self.move_selection(-1),
            Key::ArrowRight => self.move_selection(1),
            Key::ArrowUp => self.move_selection(-7),
            Key::ArrowDown => self.move_selection(7),
            Key::PageUp => self.move_selection_months(-1),
            Key::PageDown => self.move_selection_months(1),
            Key::Home => {
                let week_start =
                    days_after(self.selected_date().weekday(), self.first_day_of_week());
                self.move_selection(-i64::from(week_start));
            }
            Key::Enter => self.activated.emit(self.selected_date()),
            _ => return false,
        }
        true
    }
}

static_assertions::assert_impl_all!(CalendarWidget: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyboardModifiers;
    use crate::object::init_global_registry;
    use crate::widget::WidgetRef;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_grid_starts_on_first_day_of_week() {
        init_global_registry();
        let calendar = CalendarWidget::with_date(date(2024, 5, 15)).unwrap();
        let grid = calendar.month_grid();
        assert_eq!(grid.len(), 6);
        // 2024-05-01 is a Wednesday.
        assert_eq!(grid[0][0], date(2024, 4, 29));

        calendar.set_property("firstDayOfWeek", "Sunday".into()).unwrap();
        assert_eq!(calendar.month_grid()[0][0], date(2024, 4, 28));
        assert_eq!(calendar.property("firstDayOfWeek"), Some(Variant::from("Sun")));
        assert_eq!(weekday_from_name("Sat"), Some(Weekday::Sat));
    }

    #[test]
    fn test_paging_keeps_selection() {
        init_global_registry();
        let calendar = CalendarWidget::with_date(date(2024, 12, 10)).unwrap();
        calendar.show_next_month();
        assert_eq!((calendar.year_shown(), calendar.month_shown()), (2025, 1));
        assert_eq!(calendar.selected_date(), date(2024, 12, 10));
        calendar.show_selected_date();
        assert_eq!(calendar.month_shown(), 12);
    }

    #[test]
    fn test_range_limits_clicks_and_keys() {
        init_global_registry();
        let calendar = CalendarWidget::with_date(date(2024, 1, 10)).unwrap();
        calendar.set_date_range(date(2024, 1, 5), date(2024, 1, 20));
        assert!(!calendar.click(date(2024, 2, 1)));
        assert!(calendar.click(date(2024, 1, 19)));

        let widget: WidgetRef = calendar.clone();
        widget.send_event(&WidgetEvent::key_press(Key::ArrowDown, KeyboardModifiers::NONE));
        assert_eq!(calendar.selected_date(), date(2024, 1, 20));

        calendar.show_previous_month();
        assert_eq!(calendar.month_shown(), 1);
    }
}
