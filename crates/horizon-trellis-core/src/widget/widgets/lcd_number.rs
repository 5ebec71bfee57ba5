//! Seven-segment style number display.

use std::sync::Arc;

use crate::object::ObjectResult;
use crate::property::{Property, PropertyError};
use crate::signal::Signal;
use crate::variant::Variant;
use crate::widget::{Widget, WidgetBase, expect, register_widget};

use super::property_names_with;

/// Number base of an [`LcdNumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcdMode {
    #[default]
    Dec,
    Hex,
    Oct,
    Bin,
}

impl LcdMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dec => "Dec",
            Self::Hex => "Hex",
            Self::Oct => "Oct",
            Self::Bin => "Bin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Dec" => Some(Self::Dec),
            "Hex" => Some(Self::Hex),
            "Oct" => Some(Self::Oct),
            "Bin" => Some(Self::Bin),
            _ => None,
        }
    }
}

/// What is currently shown.
#[derive(Debug, Clone, PartialEq, Default)]
enum Shown {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

/// Displays a number, or a short string, in a fixed number of digit cells.
///
/// Values that do not fit in `digit_count` cells are not shown: the display
/// keeps its previous text and `overflow` is emitted. In the non-decimal
/// modes only the integral part is shown.
pub struct LcdNumber {
    base: WidgetBase,
    digit_count: Property<usize>,
    mode: Property<LcdMode>,
    small_decimal_point: Property<bool>,
    shown: Property<Shown>,
    text: Property<String>,

    pub overflow: Signal<()>,
}

impl LcdNumber {
    const CLASS_PROPERTIES: &'static [&'static str] =
        &["digitCount", "value", "intValue", "mode", "smallDecimalPoint", "text"];

    pub fn new() -> ObjectResult<Arc<Self>> {
        Self::with_digits(5)
    }

    pub fn with_digits(digits: usize) -> ObjectResult<Arc<Self>> {
        let lcd = Arc::new(Self {
            base: WidgetBase::new::<Self>()?,
            digit_count: Property::new(digits.min(99)),
            mode: Property::default(),
            small_decimal_point: Property::new(false),
            shown: Property::default(),
            text: Property::default(),
            overflow: Signal::new(),
        });
        register_widget(&lcd);
        Ok(lcd)
    }

    /// Cells used by `text`; a small decimal point takes no cell.
    fn cells(&self, text: &str) -> usize {
        let points = if self.small_decimal_point() {
            text.matches('.').count()
        } else {
            0
        };
        text.chars().count() - points
    }

    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }
        let integral = value.trunc() as i64;
        match self.mode() {
            LcdMode::Dec if value.fract() == 0.0 => integral.to_string(),
            LcdMode::Dec => {
                // Shortest form that fits, dropping fraction digits first.
                let digits = self.digit_count();
                (0..=digits)
                    .rev()
                    .map(|places| format!("{value:.places$}"))
                    .find(|text| self.cells(text) <= digits)
                    .unwrap_or_else(|| integral.to_string())
            }
            LcdMode::Hex => signed(integral, |v| format!("{v:x}")),
            LcdMode::Oct => signed(integral, |v| format!("{v:o}")),
            LcdMode::Bin => signed(integral, |v| format!("{v:b}")),
        }
    }

    fn show(&self, shown: Shown, text: String) {
        if text.is_empty() || self.cells(&text) > self.digit_count() {
            self.overflow.emit(());
            return;
        }
        self.shown.set(shown);
        self.text.set(text);
    }

    pub fn display(&self, value: f64) {
        self.show(Shown::Number(value), self.format(value));
    }

    pub fn display_int(&self, value: i64) {
        self.display(value as f64);
    }

    /// Show a string. Characters a segment display cannot draw are shown as
    /// spaces.
    pub fn display_text(&self, text: &str) {
        let text: String = text
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ':' | '\'' | ' ') {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        self.show(Shown::Text(text.clone()), text);
    }

    /// Whether `value` would overflow in the current mode.
    pub fn check_overflow(&self, value: f64) -> bool {
        let text = self.format(value);
        text.is_empty() || self.cells(&text) > self.digit_count()
    }

    /// The shown text, right-aligned in `digit_count` cells.
    pub fn text(&self) -> String {
        let text = self.text.get();
        let pad = self.digit_count().saturating_sub(self.cells(&text));
        format!("{}{text}", " ".repeat(pad))
    }

    /// The shown number, or 0 when showing text.
    pub fn value(&self) -> f64 {
        match self.shown.get() {
            Shown::Number(value) => value,
            _ => 0.0,
        }
    }

    pub fn int_value(&self) -> i64 {
        self.value().round() as i64
    }

    pub fn digit_count(&self) -> usize {
        self.digit_count.get()
    }

    /// Changing the cell count re-renders the current number.
    pub fn set_digit_count(&self, digits: usize) {
        if self.digit_count.set(digits.min(99)) {
            self.refresh();
        }
    }

    pub fn mode(&self) -> LcdMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: LcdMode) {
        if self.mode.set(mode) {
            self.refresh();
        }
    }

    pub fn small_decimal_point(&self) -> bool {
        self.small_decimal_point.get()
    }

    pub fn set_small_decimal_point(&self, small: bool) {
        self.small_decimal_point.set(small);
    }

    fn refresh(&self) {
        if let Shown::Number(value) = self.shown.get() {
            self.display(value);
        }
    }
}

fn signed(value: i64, digits: impl Fn(u64) -> String) -> String {
    if value < 0 {
        format!("-{}", digits(value.unsigned_abs()))
    } else {
        digits(value.unsigned_abs())
    }
}

impl Widget for LcdNumber {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn class_name(&self) -> &'static str {
        "LcdNumber"
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<(), PropertyError> {
        match name {
            "digitCount" => self.set_digit_count(expect(&value, "uint")?),
            "value" => self.display(expect(&value, "double")?),
            "intValue" => self.display_int(expect(&value, "int")?),
            "mode" => {
                let mode = match &value {
                    Variant::String(name) => LcdMode::from_name(name),
                    _ => None,
                };
                self.set_mode(mode.ok_or(PropertyError::TypeMismatch {
                    expected: "lcd mode name",
                    got: value.type_name(),
                })?);
            }
            "smallDecimalPoint" => self.set_small_decimal_point(expect(&value, "bool")?),
            "text" => self.display_text(&expect::<String>(&value, "string")?),
            _ => return self.base.set_property(name, value),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Variant> {
        match name {
            "digitCount" => Some(self.digit_count().into()),
            "value" => Some(self.value().into()),
            "intValue" => Some(self.int_value().into()),
            "mode" => Some(self.mode().name().into()),
            "smallDecimalPoint" => Some(self.small_decimal_point().into()),
            "text" => Some(self.text().into()),
            _ => self.base.property(name),
        }
    }

    fn property_names(&self) -> Vec<&'static str> {
        property_names_with(Self::CLASS_PROPERTIES)
    }
}

static_assertions::assert_impl_all!(LcdNumber: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::init_global_registry;
    use parking_lot::Mutex;

    #[test]
    fn test_modes_and_padding() {
        init_global_registry();
        let lcd = LcdNumber::with_digits(4).unwrap();
        lcd.display_int(255);
        assert_eq!(lcd.text(), " 255");
        lcd.set_mode(LcdMode::Hex);
        assert_eq!(lcd.text(), "  ff");
        lcd.set_property("mode", "Bin".into()).unwrap();
        // 11111111 does not fit; the hex text stays.
        assert_eq!(lcd.text(), "  ff");
        assert_eq!(lcd.int_value(), 255);
    }

    #[test]
    fn test_overflow_keeps_previous_text() {
        init_global_registry();
        let lcd = LcdNumber::with_digits(3).unwrap();
        let overflows = Arc::new(Mutex::new(0));
        let counter = overflows.clone();
        lcd.overflow.connect(move |_| *counter.lock() += 1);

        lcd.display(42.0);
        lcd.display(12345.0);
        assert_eq!(lcd.text(), " 42");
        assert_eq!(*overflows.lock(), 1);
        assert!(lcd.check_overflow(1000.0));
        assert!(!lcd.check_overflow(-99.0));
    }

    #[test]
    fn test_fraction_trimmed_to_fit() {
        init_global_registry();
        let lcd = LcdNumber::with_digits(5).unwrap();
        lcd.display(3.14159);
        assert_eq!(lcd.text(), "3.142");
        lcd.set_small_decimal_point(true);
        lcd.display(3.14159);
        assert_eq!(lcd.text(), "3.1416");
    }
}
