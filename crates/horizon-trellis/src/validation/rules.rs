//! Built-in validation rules.
//!
//! Each rule is a small value parameterized by its configuration and an
//! optional replacement message. Closures `Fn(&T) -> ValidationResult` are
//! rules too.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::ValidationResult;
use crate::logging::targets;

/// Validates a value of type `T`.
pub trait Rule<T: ?Sized>: Send + Sync {
    fn validate(&self, value: &T) -> ValidationResult;
}

impl<T, F> Rule<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> ValidationResult + Send + Sync,
{
    fn validate(&self, value: &T) -> ValidationResult {
        self(value)
    }
}

/// Values that can be empty.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// Values with a length. Strings count characters, not bytes.
pub trait Length {
    fn length(&self) -> usize;
}

impl Length for str {
    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl Length for String {
    fn length(&self) -> usize {
        self.as_str().length()
    }
}

impl<T> Length for Vec<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> Length for [T] {
    fn length(&self) -> usize {
        self.len()
    }
}

fn check(ok: bool, message: &str) -> ValidationResult {
    if ok {
        ValidationResult::success()
    } else {
        ValidationResult::failure(message)
    }
}

/// Fails on empty values.
#[derive(Debug, Clone)]
pub struct Required {
    pub message: String,
}

impl Default for Required {
    fn default() -> Self {
        Self {
            message: "Field is required".into(),
        }
    }
}

impl<T: Presence + ?Sized> Rule<T> for Required {
    fn validate(&self, value: &T) -> ValidationResult {
        check(value.is_present(), &self.message)
    }
}

#[derive(Debug, Clone)]
pub struct MinLength {
    pub min: usize,
    pub message: String,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self {
            min,
            message: format!("Minimum length is {min}"),
        }
    }
}

impl<T: Length + ?Sized> Rule<T> for MinLength {
    fn validate(&self, value: &T) -> ValidationResult {
        check(value.length() >= self.min, &self.message)
    }
}

#[derive(Debug, Clone)]
pub struct MaxLength {
    pub max: usize,
    pub message: String,
}

impl MaxLength {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            message: format!("Maximum length is {max}"),
        }
    }
}

impl<T: Length + ?Sized> Rule<T> for MaxLength {
    fn validate(&self, value: &T) -> ValidationResult {
        check(value.length() <= self.max, &self.message)
    }
}

/// Inclusive bounds.
#[derive(Debug, Clone)]
pub struct Range<N> {
    pub min: N,
    pub max: N,
    pub message: String,
}

impl<N: fmt::Display> Range<N> {
    pub fn new(min: N, max: N) -> Self {
        let message = format!("Value must be between {min} and {max}");
        Self { min, max, message }
    }
}

impl<N: PartialOrd + Send + Sync> Rule<N> for Range<N> {
    fn validate(&self, value: &N) -> ValidationResult {
        check(*value >= self.min && *value <= self.max, &self.message)
    }
}

#[derive(Debug, Clone)]
pub struct Min<N> {
    pub min: N,
    pub message: String,
}

impl<N: fmt::Display> Min<N> {
    pub fn new(min: N) -> Self {
        let message = format!("Minimum value is {min}");
        Self { min, message }
    }
}

impl<N: PartialOrd + Send + Sync> Rule<N> for Min<N> {
    fn validate(&self, value: &N) -> ValidationResult {
        check(*value >= self.min, &self.message)
    }
}

#[derive(Debug, Clone)]
pub struct Max<N> {
    pub max: N,
    pub message: String,
}

impl<N: fmt::Display> Max<N> {
    pub fn new(max: N) -> Self {
        let message = format!("Maximum value is {max}");
        Self { max, message }
    }
}

impl<N: PartialOrd + Send + Sync> Rule<N> for Max<N> {
    fn validate(&self, value: &N) -> ValidationResult {
        check(*value <= self.max, &self.message)
    }
}

/// Matches the whole-value regular expression.
///
/// A pattern that does not compile never matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Option<Regex>,
    pub message: String,
}

impl Pattern {
    pub fn new(pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .inspect_err(|err| {
                tracing::warn!(target: targets::VALIDATION, pattern, %err, "invalid validation pattern");
            })
            .ok();
        Self {
            regex,
            message: "Invalid format".into(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl<T: AsRef<str> + ?Sized> Rule<T> for Pattern {
    fn validate(&self, value: &T) -> ValidationResult {
        let matched = self
            .regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(value.as_ref()));
        check(matched, &self.message)
    }
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|err| unreachable!("email pattern is valid: {err}"))
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .unwrap_or_else(|err| unreachable!("url pattern is valid: {err}"))
});

#[derive(Debug, Clone)]
pub struct Email {
    pub message: String,
}

impl Default for Email {
    fn default() -> Self {
        Self {
            message: "Invalid email format".into(),
        }
    }
}

impl<T: AsRef<str> + ?Sized> Rule<T> for Email {
    fn validate(&self, value: &T) -> ValidationResult {
        check(EMAIL.is_match(value.as_ref()), &self.message)
    }
}

/// `http` and `https` URLs.
#[derive(Debug, Clone)]
pub struct Url {
    pub message: String,
}

impl Default for Url {
    fn default() -> Self {
        Self {
            message: "Invalid URL format".into(),
        }
    }
}

impl<T: AsRef<str> + ?Sized> Rule<T> for Url {
    fn validate(&self, value: &T) -> ValidationResult {
        check(URL.is_match(value.as_ref()), &self.message)
    }
}

/// A caller-supplied predicate with a fixed failure message.
pub struct Custom<F> {
    predicate: F,
    pub message: String,
}

impl<F> Custom<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            message: "Validation failed".into(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl<T, F> Rule<T> for Custom<F>
where
    T: ?Sized,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn validate(&self, value: &T) -> ValidationResult {
        check((self.predicate)(value), &self.message)
    }
}

impl<F> fmt::Debug for Custom<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let rule = Required::default();
        assert!(!Rule::<str>::validate(&rule, "").is_valid());
        assert!(Rule::<str>::validate(&rule, "x").is_valid());
        assert!(!rule.validate(&None::<i32>).is_valid());
        assert_eq!(
            Rule::<String>::validate(&rule, &String::new()).first_error(),
            Some("Field is required")
        );
    }

    #[test]
    fn test_lengths_count_characters() {
        let min = MinLength::new(3);
        assert!(Rule::<str>::validate(&min, "äöü").is_valid());
        assert_eq!(
            Rule::<str>::validate(&min, "ab").first_error(),
            Some("Minimum length is 3")
        );
        let max = MaxLength::new(2);
        assert_eq!(
            max.validate(&vec![1, 2, 3]).first_error(),
            Some("Maximum length is 2")
        );
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(Range::new(1, 10).validate(&10).is_valid());
        assert_eq!(
            Range::new(1, 10).validate(&11).first_error(),
            Some("Value must be between 1 and 10")
        );
        assert_eq!(Min::new(0.5).validate(&0.25).first_error(), Some("Minimum value is 0.5"));
        assert_eq!(Max::new(3).validate(&4).first_error(), Some("Maximum value is 3"));
    }

    #[test]
    fn test_email_and_url() {
        let email = Email::default();
        assert!(Rule::<str>::validate(&email, "ada@example.org").is_valid());
        assert!(!Rule::<str>::validate(&email, "ada@example").is_valid());

        let url = Url::default();
        assert!(Rule::<str>::validate(&url, "https://www.example.com/path?q=1").is_valid());
        assert!(Rule::<str>::validate(&url, "http://example.io").is_valid());
        assert_eq!(
            Rule::<str>::validate(&url, "ftp://example.com").first_error(),
            Some("Invalid URL format")
        );
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let pattern = Pattern::new("([a-z");
        assert!(!Rule::<str>::validate(&pattern, "abc").is_valid());
    }

    #[test]
    fn test_custom() {
        let even = Custom::new(|n: &i32| n % 2 == 0).with_message("must be even");
        assert!(even.validate(&4).is_valid());
        assert_eq!(even.validate(&3).first_error(), Some("must be even"));
    }
}
