//! Date and time pickers.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use horizon_trellis_core::widget::widgets::{CalendarWidget, DateTimeEdit};
use horizon_trellis_core::{FromVariant, Signal, SignalConnection};

use super::bind_common;
use crate::element::{ElementCore, EventHandler, UiElement};

/// A value handler that only fires for payloads of type `T`.
fn typed<T: FromVariant>(handler: impl Fn(T) + Send + Sync + 'static) -> EventHandler {
    EventHandler::value(move |value| {
        if let Some(value) = T::from_variant(value) {
            handler(value);
        }
    })
}

// =============================================================================
// DateTimeEdit
// =============================================================================

fn date_time_changed(edit: &DateTimeEdit) -> &Signal<NaiveDateTime> {
    &edit.date_time_changed
}

fn date_changed(edit: &DateTimeEdit) -> &Signal<NaiveDate> {
    &edit.date_changed
}

fn time_changed(edit: &DateTimeEdit) -> &Signal<NaiveTime> {
    &edit.time_changed
}

/// Builds a [`DateTimeEdit`].
///
/// The value may be given before the range; it is clamped once both are
/// known, so the order of the setters does not matter.
///
/// Events: `dateTimeChanged`, `dateChanged`, `timeChanged`.
#[derive(Debug)]
pub struct DateTimeEditBuilder {
    core: ElementCore<DateTimeEdit>,
    value: Option<NaiveDateTime>,
    minimum: Option<NaiveDateTime>,
    maximum: Option<NaiveDateTime>,
}

impl DateTimeEditBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("DateTimeEdit"),
            value: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn date_time(mut self, value: NaiveDateTime) -> Self {
        self.value = Some(value);
        self
    }

    /// Keeps the time of an earlier value, else midnight.
    pub fn date(mut self, date: NaiveDate) -> Self {
        let time = self.value.map(|value| value.time()).unwrap_or_default();
        self.value = Some(date.and_time(time));
        self
    }

    pub fn minimum(mut self, minimum: NaiveDateTime) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: NaiveDateTime) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn range(self, minimum: NaiveDateTime, maximum: NaiveDateTime) -> Self {
        self.minimum(minimum).maximum(maximum)
    }

    /// A `chrono` format string such as `"%d.%m.%Y"`.
    pub fn display_format(self, format: impl Into<String>) -> Self {
        self.with_property("displayFormat", format.into())
    }

    pub fn calendar_popup(self, enabled: bool) -> Self {
        self.with_property("calendarPopup", enabled)
    }

    pub fn on_date_time_changed(self, handler: impl Fn(NaiveDateTime) + Send + Sync + 'static) -> Self {
        self.with_event("dateTimeChanged", typed(handler))
    }

    pub fn on_date_changed(self, handler: impl Fn(NaiveDate) + Send + Sync + 'static) -> Self {
        self.with_event("dateChanged", typed(handler))
    }

    pub fn on_time_changed(self, handler: impl Fn(NaiveTime) + Send + Sync + 'static) -> Self {
        self.with_event("timeChanged", typed(handler))
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    /// The edited value, or the requested one before initialization.
    pub fn current_value(&self) -> Option<NaiveDateTime> {
        match self.core.widget() {
            Some(edit) => Some(edit.date_time()),
            None => self.value,
        }
    }

    pub fn set_date_time(&mut self, value: NaiveDateTime) -> &mut Self {
        match self.core.widget() {
            Some(edit) => edit.set_date_time(value),
            None => self.value = Some(value),
        }
        self
    }

    pub fn text(&self) -> Option<String> {
        self.core.widget().map(|edit| edit.text())
    }

    /// Parse with the display format. `false` if unbuilt or unparsable.
    pub fn set_text(&self, text: &str) -> bool {
        self.core.widget().is_some_and(|edit| edit.set_text(text))
    }

    pub fn step_up(&self) {
        if let Some(edit) = self.core.widget() {
            edit.step_up();
        }
    }

    pub fn step_down(&self) {
        if let Some(edit) = self.core.widget() {
            edit.step_down();
        }
    }
}

impl Default for DateTimeEditBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for DateTimeEditBuilder {
    type Widget = DateTimeEdit;

    fn core(&self) -> &ElementCore<DateTimeEdit> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<DateTimeEdit> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<DateTimeEdit>> {
        let edit = DateTimeEdit::new()?;
        match (self.minimum, self.maximum) {
            (Some(minimum), Some(maximum)) => edit.set_date_time_range(minimum, maximum),
            (Some(minimum), None) => edit.set_minimum_date_time(minimum),
            (None, Some(maximum)) => edit.set_maximum_date_time(maximum),
            (None, None) => {}
        }
        if let Some(value) = self.value {
            edit.set_date_time(value);
        }
        Ok(edit)
    }

    fn connect_event(
        &self,
        widget: &Arc<DateTimeEdit>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "dateTimeChanged" => handler.bind(widget, date_time_changed),
            "dateChanged" => handler.bind(widget, date_changed),
            "timeChanged" => handler.bind(widget, time_changed),
            _ => bind_common(widget, event, handler),
        }
    }
}

// =============================================================================
// Calendar
// =============================================================================

fn selection_changed(calendar: &CalendarWidget) -> &Signal<NaiveDate> {
    &calendar.selection_changed
}

fn date_clicked(calendar: &CalendarWidget) -> &Signal<NaiveDate> {
    &calendar.clicked
}

fn date_activated(calendar: &CalendarWidget) -> &Signal<NaiveDate> {
    &calendar.activated
}

fn current_page_changed(calendar: &CalendarWidget) -> &Signal<(i32, u32)> {
    &calendar.current_page_changed
}

fn page_as_pair(page: &(i32, u32)) -> (i32, i32) {
    (page.0, page.1 as i32)
}

/// Builds a [`CalendarWidget`].
///
/// Events: `selectionChanged`, `clicked` and `activated` carry a date;
/// `currentPageChanged` carries `(year, month)` as a point.
#[derive(Debug)]
pub struct CalendarBuilder {
    core: ElementCore<CalendarWidget>,
    selected: Option<NaiveDate>,
    range: Option<(NaiveDate, NaiveDate)>,
}

impl CalendarBuilder {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new("CalendarWidget"),
            selected: None,
            range: None,
        }
    }

    /// Defaults to today.
    pub fn selected_date(mut self, date: NaiveDate) -> Self {
        self.selected = Some(date);
        self
    }

    pub fn date_range(mut self, minimum: NaiveDate, maximum: NaiveDate) -> Self {
        self.range = Some((minimum, maximum));
        self
    }

    pub fn grid_visible(self, visible: bool) -> Self {
        self.with_property("gridVisible", visible)
    }

    pub fn first_day_of_week(self, day: Weekday) -> Self {
        self.with_property("firstDayOfWeek", day.to_string())
    }

    pub fn on_selection_changed(self, handler: impl Fn(NaiveDate) + Send + Sync + 'static) -> Self {
        self.with_event("selectionChanged", typed(handler))
    }

    pub fn on_clicked(self, handler: impl Fn(NaiveDate) + Send + Sync + 'static) -> Self {
        self.with_event("clicked", typed(handler))
    }

    pub fn on_activated(self, handler: impl Fn(NaiveDate) + Send + Sync + 'static) -> Self {
        self.with_event("activated", typed(handler))
    }

    pub fn on_current_page_changed(self, handler: impl Fn(i32, u32) + Send + Sync + 'static) -> Self {
        self.with_event(
            "currentPageChanged",
            EventHandler::value(move |value| {
                if let horizon_trellis_core::Variant::Point(page) = value {
                    handler(page.x, page.y as u32);
                }
            }),
        )
    }

    // =========================================================================
    // Live helpers
    // =========================================================================

    pub fn selected(&self) -> Option<NaiveDate> {
        match self.core.widget() {
            Some(calendar) => Some(calendar.selected_date()),
            None => self.selected,
        }
    }

    pub fn select(&self, date: NaiveDate) {
        if let Some(calendar) = self.core.widget() {
            calendar.set_selected_date(date);
        }
    }

    /// Select as if clicked; dates outside the range are refused.
    pub fn click(&self, date: NaiveDate) -> bool {
        self.core.widget().is_some_and(|calendar| calendar.click(date))
    }

    /// The shown `(year, month)`.
    pub fn page(&self) -> Option<(i32, u32)> {
        self.core
            .widget()
            .map(|calendar| (calendar.year_shown(), calendar.month_shown()))
    }

    pub fn show_next_month(&self) {
        if let Some(calendar) = self.core.widget() {
            calendar.show_next_month();
        }
    }

    pub fn show_previous_month(&self) {
        if let Some(calendar) = self.core.widget() {
            calendar.show_previous_month();
        }
    }
}

impl Default for CalendarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UiElement for CalendarBuilder {
    type Widget = CalendarWidget;

    fn core(&self) -> &ElementCore<CalendarWidget> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore<CalendarWidget> {
        &mut self.core
    }

    fn create_widget(&self) -> crate::Result<Arc<CalendarWidget>> {
        let calendar = match self.selected {
            Some(date) => CalendarWidget::with_date(date)?,
            None => CalendarWidget::new()?,
        };
        if let Some((minimum, maximum)) = self.range {
            calendar.set_date_range(minimum, maximum);
        }
        Ok(calendar)
    }

    fn connect_event(
        &self,
        widget: &Arc<CalendarWidget>,
        event: &str,
        handler: &EventHandler,
    ) -> Option<SignalConnection> {
        match event {
            "selectionChanged" => handler.bind(widget, selection_changed),
            "clicked" => handler.bind(widget, date_clicked),
            "activated" => handler.bind(widget, date_activated),
            "currentPageChanged" => handler.bind_map(widget, current_page_changed, page_as_pair),
            _ => bind_common(widget, event, handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_trellis_core::init_global_registry;
    use parking_lot::Mutex;

    fn setup() {
        init_global_registry();
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_value_before_range_is_clamped() {
        setup();
        let dates = Arc::new(Mutex::new(Vec::new()));
        let sink = dates.clone();
        let times = Arc::new(Mutex::new(0));
        let time_sink = times.clone();
        let mut builder = DateTimeEditBuilder::new()
            .date_time(midnight(2030, 5, 1))
            .range(midnight(2024, 1, 1), midnight(2025, 12, 31))
            .display_format("%d.%m.%Y")
            .on_date_changed(move |date| sink.lock().push(date))
            .on_time_changed(move |_| *time_sink.lock() += 1);
        builder.initialize().unwrap();

        assert_eq!(builder.current_value(), Some(midnight(2025, 12, 31)));
        assert_eq!(builder.text().as_deref(), Some("31.12.2025"));

        assert!(builder.set_text("15.06.2024"));
        assert!(!builder.set_text("June 15th"));
        assert_eq!(*dates.lock(), vec![day(2024, 6, 15)]);
        assert_eq!(*times.lock(), 0);
    }

    #[test]
    fn test_date_keeps_time() {
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let builder = DateTimeEditBuilder::new()
            .date_time(day(2024, 1, 1).and_time(time))
            .date(day(2024, 3, 3));
        assert_eq!(builder.current_value(), Some(day(2024, 3, 3).and_time(time)));
    }

    #[test]
    fn test_calendar_paging_respects_range() {
        setup();
        let pages = Arc::new(Mutex::new(Vec::new()));
        let sink = pages.clone();
        let selections = Arc::new(Mutex::new(Vec::new()));
        let selection_sink = selections.clone();
        let mut builder = CalendarBuilder::new()
            .selected_date(day(2024, 2, 10))
            .date_range(day(2024, 1, 1), day(2024, 3, 31))
            .first_day_of_week(Weekday::Sun)
            .on_current_page_changed(move |year, month| sink.lock().push((year, month)))
            .on_selection_changed(move |date| selection_sink.lock().push(date));
        let calendar = builder.initialize().unwrap();
        assert_eq!(calendar.first_day_of_week(), Weekday::Sun);

        builder.show_next_month();
        builder.show_next_month();
        assert_eq!(builder.page(), Some((2024, 3)));
        assert_eq!(*pages.lock(), vec![(2024, 3)]);

        assert!(!builder.click(day(2024, 4, 2)));
        assert!(builder.click(day(2024, 3, 5)));
        assert_eq!(builder.selected(), Some(day(2024, 3, 5)));
        assert_eq!(*selections.lock(), vec![day(2024, 3, 5)]);
    }
}
