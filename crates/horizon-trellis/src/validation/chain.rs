//! Ordered rule lists.

use std::fmt;
use std::sync::Arc;

use super::ValidationResult;
use super::rules::{
    Custom, Email, Length, Max, MaxLength, Min, MinLength, Pattern, Presence, Range, Required,
    Rule, Url,
};
use crate::logging::targets;

/// Runs rules in insertion order and combines their results.
///
/// With [`stop_on_first_error`](Self::stop_on_first_error) set, the run ends
/// after the first rule that returns an invalid result. Chains are cheap to
/// clone; clones share their rules.
pub struct ValidationChain<T: ?Sized + 'static> {
    rules: Vec<Arc<dyn Rule<T>>>,
    stop_on_first_error: bool,
    field: Option<String>,
}

/// Start an empty chain for values of type `T`.
pub fn validate<T: ?Sized + 'static>() -> ValidationChain<T> {
    ValidationChain::new()
}

impl<T: ?Sized + 'static> ValidationChain<T> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            stop_on_first_error: false,
            field: None,
        }
    }

    /// Append any rule, including closures returning a [`ValidationResult`].
    pub fn add(mut self, rule: impl Rule<T> + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
        self
    }

    /// Name the field that messages refer to.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    pub fn required(self) -> Self
    where
        T: Presence,
    {
        self.add(Required::default())
    }

    pub fn required_with(self, message: impl Into<String>) -> Self
    where
        T: Presence,
    {
        self.add(Required {
            message: message.into(),
        })
    }

    pub fn min_length(self, min: usize) -> Self
    where
        T: Length,
    {
        self.add(MinLength::new(min))
    }

    pub fn max_length(self, max: usize) -> Self
    where
        T: Length,
    {
        self.add(MaxLength::new(max))
    }

    pub fn pattern(self, pattern: &str) -> Self
    where
        T: AsRef<str>,
    {
        self.add(Pattern::new(pattern))
    }

    pub fn pattern_with(self, pattern: &str, message: impl Into<String>) -> Self
    where
        T: AsRef<str>,
    {
        self.add(Pattern::new(pattern).with_message(message))
    }

    pub fn email(self) -> Self
    where
        T: AsRef<str>,
    {
        self.add(Email::default())
    }

    pub fn url(self) -> Self
    where
        T: AsRef<str>,
    {
        self.add(Url::default())
    }

    /// A predicate failing with "Validation failed".
    pub fn custom<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add(Custom::new(predicate))
    }

    pub fn custom_with<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add(Custom::new(predicate).with_message(message))
    }

    /// A predicate producing its own result.
    pub fn custom_result<F>(self, rule: F) -> Self
    where
        F: Fn(&T) -> ValidationResult + Send + Sync + 'static,
    {
        self.add(rule)
    }

    /// Run the rules against `value`.
    pub fn validate(&self, value: &T) -> ValidationResult {
        let mut result = ValidationResult::success();
        for rule in &self.rules {
            let outcome = rule.validate(value);
            let failed = !outcome.is_valid();
            result += outcome;
            if failed && self.stop_on_first_error {
                break;
            }
        }
        if let Some(field) = &self.field {
            result = result.with_field(field);
        }
        tracing::trace!(
            target: targets::VALIDATION,
            rules = self.rules.len(),
            valid = result.is_valid(),
            "validation chain ran"
        );
        result
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T: PartialOrd + fmt::Display + Send + Sync + 'static> ValidationChain<T> {
    /// Inclusive bounds.
    pub fn range(self, min: T, max: T) -> Self {
        self.add(Range::new(min, max))
    }

    pub fn min(self, min: T) -> Self {
        self.add(Min::new(min))
    }

    pub fn max(self, max: T) -> Self {
        self.add(Max::new(max))
    }
}

impl<T: ?Sized + 'static> Default for ValidationChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for ValidationChain<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            stop_on_first_error: self.stop_on_first_error,
            field: self.field.clone(),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for ValidationChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationChain")
            .field("rules", &self.rules.len())
            .field("stop_on_first_error", &self.stop_on_first_error)
            .field("field", &self.field)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationMessage, ValidationSeverity};

    #[test]
    fn test_rules_run_in_order() {
        let chain = validate::<str>()
            .custom_with(|s: &str| s.starts_with('a'), "first")
            .custom_with(|s: &str| s.ends_with('z'), "second");
        let result = chain.validate("bcd");
        let texts: Vec<_> = result.messages().iter().map(|m| m.message.clone()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_stop_on_first_error() {
        let chain = validate::<String>().required().min_length(3);
        assert_eq!(chain.validate(&String::new()).messages().len(), 2);

        let stopping = chain.clone().stop_on_first_error(true);
        let result = stopping.validate(&String::new());
        assert_eq!(result.messages().len(), 1);
        assert_eq!(result.first_error(), Some("Field is required"));
    }

    #[test]
    fn test_warnings_do_not_stop_the_chain() {
        let chain = validate::<i32>()
            .custom_result(|n: &i32| {
                let mut result = ValidationResult::success();
                if *n > 100 {
                    result.add_message(ValidationMessage::with_severity(
                        "unusually large",
                        ValidationSeverity::Warning,
                    ));
                }
                result
            })
            .max(1000)
            .stop_on_first_error(true);
        let result = chain.validate(&5000);
        assert!(!result.is_valid());
        assert!(result.has_warnings());
        assert_eq!(result.first_error(), Some("Maximum value is 1000"));
    }

    #[test]
    fn test_field_name_is_attached() {
        let chain = validate::<String>().email().field("email");
        let result = chain.validate(&"nope".to_string());
        assert_eq!(result.messages()[0].field.as_deref(), Some("email"));
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let chain = validate::<f64>().range(0.0, 1.0);
        assert!(chain.validate(&0.5).is_valid());
        assert!(validate::<f64>().validate(&-1.0).is_valid());
    }
}
