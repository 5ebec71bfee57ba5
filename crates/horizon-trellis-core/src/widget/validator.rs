//! Input validators for text widgets.
//!
//! A [`Validator`] classifies the text of an input as it is typed. Text that
//! could still become valid with more typing is [`ValidationState::Intermediate`];
//! widgets reject edits that would make their text [`ValidationState::Invalid`].
//!
//! ```
//! use horizon_trellis_core::widget::{IntValidator, ValidationState, Validator};
//!
//! let percent = IntValidator::new(0, 100);
//! assert_eq!(percent.validate("42"), ValidationState::Acceptable);
//! assert_eq!(percent.validate(""), ValidationState::Intermediate);
//! assert_eq!(percent.validate("250"), ValidationState::Invalid);
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// How acceptable a piece of input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationState {
    /// Cannot become valid by appending more input.
    Invalid,
    /// Incomplete, but may become valid.
    Intermediate,
    #[default]
    Acceptable,
}

impl ValidationState {
    pub fn is_acceptable(self) -> bool {
        self == Self::Acceptable
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Invalid => "Invalid",
            Self::Intermediate => "Intermediate",
            Self::Acceptable => "Acceptable",
        })
    }
}

/// Classifies input text.
pub trait Validator: Send + Sync {
    fn validate(&self, input: &str) -> ValidationState;

    /// Try to turn unacceptable input into acceptable input.
    ///
    /// Called when editing finishes on text that is not acceptable.
    fn fixup(&self, _input: &str) -> Option<String> {
        None
    }
}

impl<V: Validator + ?Sized> Validator for Arc<V> {
    fn validate(&self, input: &str) -> ValidationState {
        (**self).validate(input)
    }

    fn fixup(&self, input: &str) -> Option<String> {
        (**self).fixup(input)
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn validate(&self, input: &str) -> ValidationState {
        (**self).validate(input)
    }

    fn fixup(&self, input: &str) -> Option<String> {
        (**self).fixup(input)
    }
}

/// A lone sign, or nothing at all, is a valid start for a number.
fn partial_sign(text: &str, allow_negative: bool) -> Option<ValidationState> {
    match text {
        "" | "+" => Some(ValidationState::Intermediate),
        "-" if allow_negative => Some(ValidationState::Intermediate),
        "-" => Some(ValidationState::Invalid),
        _ => None,
    }
}

/// Accepts integers in `[minimum, maximum]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntValidator {
    minimum: i64,
    maximum: i64,
}

impl IntValidator {
    /// Bounds given in the wrong order are swapped.
    pub fn new(minimum: i64, maximum: i64) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
        }
    }

    pub fn non_negative() -> Self {
        Self::new(0, i64::MAX)
    }

    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    pub fn maximum(&self) -> i64 {
        self.maximum
    }

    pub fn set_range(&mut self, minimum: i64, maximum: i64) {
        *self = Self::new(minimum, maximum);
    }
}

impl Default for IntValidator {
    fn default() -> Self {
        Self::new(i64::MIN, i64::MAX)
    }
}

impl Validator for IntValidator {
    fn validate(&self, input: &str) -> ValidationState {
        let text = input.trim();
        if let Some(state) = partial_sign(text, self.minimum < 0) {
            return state;
        }
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return ValidationState::Invalid;
        }
        let Ok(value) = text.parse::<i64>() else {
            return ValidationState::Invalid;
        };
        if (self.minimum..=self.maximum).contains(&value) {
            ValidationState::Acceptable
        } else if value >= 0 && value < self.minimum && digits.len() < self.maximum.to_string().len()
        {
            // Appending digits can still reach the range.
            ValidationState::Intermediate
        } else {
            ValidationState::Invalid
        }
    }

    fn fixup(&self, input: &str) -> Option<String> {
        let value = input.trim().parse::<i64>().ok()?;
        let clamped = value.clamp(self.minimum, self.maximum);
        (clamped != value).then(|| clamped.to_string())
    }
}

/// Accepts decimal numbers in `[minimum, maximum]` with at most `decimals`
/// fractional digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleValidator {
    minimum: f64,
    maximum: f64,
    decimals: u32,
}

impl DoubleValidator {
    pub fn new(minimum: f64, maximum: f64, decimals: u32) -> Self {
        Self {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
            decimals,
        }
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn set_decimals(&mut self, decimals: u32) {
        self.decimals = decimals;
    }
}

impl Default for DoubleValidator {
    fn default() -> Self {
        Self::new(f64::MIN, f64::MAX, 2)
    }
}

impl Validator for DoubleValidator {
    fn validate(&self, input: &str) -> ValidationState {
        let text = input.trim();
        if let Some(state) = partial_sign(text, self.minimum < 0.0) {
            return state;
        }
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let well_formed = whole.chars().all(|c| c.is_ascii_digit())
            && fraction.chars().all(|c| c.is_ascii_digit());
        if !well_formed || fraction.len() > self.decimals as usize {
            return ValidationState::Invalid;
        }
        if (whole.is_empty() && fraction.is_empty()) || text.ends_with('.') {
            return ValidationState::Intermediate;
        }
        match text.parse::<f64>() {
            Ok(value) if !value.is_finite() => ValidationState::Invalid,
            Ok(value) if value >= self.minimum && value <= self.maximum => {
                ValidationState::Acceptable
            }
            Ok(value) if value >= 0.0 && value < self.minimum => ValidationState::Intermediate,
            _ => ValidationState::Invalid,
        }
    }

    fn fixup(&self, input: &str) -> Option<String> {
        let text = input.trim();
        let value = text.trim_end_matches('.').parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        let clamped = value.clamp(self.minimum, self.maximum);
        let changed = clamped != value || text.ends_with('.');
        changed.then(|| format!("{clamped:.prec$}", prec = self.decimals as usize))
    }
}

/// Accepts input matching a regular expression.
///
/// Without an intermediate pattern every non-matching input is treated as
/// intermediate, since a regex cannot in general tell whether more typing
/// would produce a match.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    intermediate: Option<Regex>,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            intermediate: None,
        })
    }

    /// Use `intermediate` to recognize incomplete input. Input matching
    /// neither pattern is invalid.
    pub fn with_intermediate(pattern: &str, intermediate: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            intermediate: Some(Regex::new(intermediate)?),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Validator for RegexValidator {
    fn validate(&self, input: &str) -> ValidationState {
        if input.is_empty() {
            return ValidationState::Intermediate;
        }
        if self.pattern.is_match(input) {
            return ValidationState::Acceptable;
        }
        match &self.intermediate {
            Some(partial) if partial.is_match(input) => ValidationState::Intermediate,
            Some(_) => ValidationState::Invalid,
            None => ValidationState::Intermediate,
        }
    }
}

/// A validator backed by a closure.
pub struct FnValidator {
    validate: Box<dyn Fn(&str) -> ValidationState + Send + Sync>,
}

impl FnValidator {
    pub fn new<F>(validate: F) -> Self
    where
        F: Fn(&str) -> ValidationState + Send + Sync + 'static,
    {
        Self {
            validate: Box::new(validate),
        }
    }

    /// Acceptable when `predicate` holds, intermediate while empty, invalid
    /// otherwise.
    pub fn from_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(move |input| {
            if predicate(input) {
                ValidationState::Acceptable
            } else if input.is_empty() {
                ValidationState::Intermediate
            } else {
                ValidationState::Invalid
            }
        })
    }
}

impl Validator for FnValidator {
    fn validate(&self, input: &str) -> ValidationState {
        (self.validate)(input)
    }
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator").finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(IntValidator: Send, Sync);
static_assertions::assert_impl_all!(RegexValidator: Send, Sync);
static_assertions::assert_impl_all!(FnValidator: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_validator_states() {
        let v = IntValidator::new(10, 100);
        assert_eq!(v.validate("50"), ValidationState::Acceptable);
        assert_eq!(v.validate(" 100 "), ValidationState::Acceptable);
        assert_eq!(v.validate("5"), ValidationState::Intermediate);
        assert_eq!(v.validate("101"), ValidationState::Invalid);
        assert_eq!(v.validate("-"), ValidationState::Invalid);
        assert_eq!(v.validate("4a"), ValidationState::Invalid);

        let signed = IntValidator::new(-10, 10);
        assert_eq!(signed.validate("-"), ValidationState::Intermediate);
        assert_eq!(signed.validate("-7"), ValidationState::Acceptable);
        assert_eq!(signed.validate("-11"), ValidationState::Invalid);
    }

    #[test]
    fn test_int_fixup_clamps() {
        let v = IntValidator::new(0, 10);
        assert_eq!(v.fixup("42").as_deref(), Some("10"));
        assert_eq!(v.fixup("5"), None);
        assert_eq!(v.fixup("x"), None);
    }

    #[test]
    fn test_double_validator_states() {
        let v = DoubleValidator::new(0.0, 10.0, 2);
        assert_eq!(v.validate("3.14"), ValidationState::Acceptable);
        assert_eq!(v.validate("3."), ValidationState::Intermediate);
        assert_eq!(v.validate("."), ValidationState::Intermediate);
        assert_eq!(v.validate("3.141"), ValidationState::Invalid);
        assert_eq!(v.validate("1.2.3"), ValidationState::Invalid);
        assert_eq!(v.validate("11"), ValidationState::Invalid);
        assert_eq!(v.fixup("12.5").as_deref(), Some("10.00"));
        assert_eq!(v.fixup("3.").as_deref(), Some("3.00"));
    }

    #[test]
    fn test_regex_validator() {
        let plain = RegexValidator::new(r"^\d{3}$").unwrap();
        assert_eq!(plain.validate("123"), ValidationState::Acceptable);
        assert_eq!(plain.validate("12"), ValidationState::Intermediate);

        let strict = RegexValidator::with_intermediate(r"^\d{3}$", r"^\d{0,2}$").unwrap();
        assert_eq!(strict.validate("12"), ValidationState::Intermediate);
        assert_eq!(strict.validate("1a"), ValidationState::Invalid);
        assert!(RegexValidator::new("(").is_err());
    }

    #[test]
    fn test_fn_validator_through_arc() {
        let v: Arc<dyn Validator> = Arc::new(FnValidator::from_predicate(|s| s.len() >= 3));
        assert_eq!(v.validate("abc"), ValidationState::Acceptable);
        assert_eq!(v.validate(""), ValidationState::Intermediate);
        assert_eq!(v.validate("ab"), ValidationState::Invalid);
    }
}
