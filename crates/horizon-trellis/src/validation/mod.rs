//! Composable value validation.
//!
//! A [`ValidationChain`] runs an ordered list of [`Rule`]s against a value
//! and combines what they return into one [`ValidationResult`]:
//!
//! ```
//! use horizon_trellis::validation::validate;
//!
//! let username = validate::<String>()
//!     .required()
//!     .min_length(3)
//!     .pattern("^[A-Za-z]+$");
//!
//! assert!(username.validate(&"Ada".to_string()).is_valid());
//!
//! let result = username.validate(&"A1".to_string());
//! assert!(!result.is_valid());
//! assert_eq!(result.messages().len(), 2);
//! ```
//!
//! Results combine as a monoid: validity is the conjunction, messages are
//! concatenated in order, and the valid result without messages is the
//! identity.

mod chain;
pub mod rules;

use std::fmt;
use std::ops::{Add, AddAssign};

pub use chain::{ValidationChain, validate};
pub use rules::{Length, Presence, Rule};

/// How serious a validation message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ValidationSeverity {
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

impl ValidationSeverity {
    /// Whether a message of this severity makes a result invalid.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }
}

/// One finding of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: ValidationSeverity,
    pub message: String,
    /// The field the message refers to, when known.
    pub field: Option<String>,
}

impl ValidationMessage {
    /// An `Error` message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_severity(message, ValidationSeverity::Error)
    }

    pub fn with_severity(message: impl Into<String>, severity: ValidationSeverity) -> Self {
        Self {
            severity,
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Validity plus the messages that explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    /// A valid result without messages.
    pub fn success() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    /// An invalid result carrying one `Error` message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            messages: vec![ValidationMessage::new(message)],
        }
    }

    pub fn from_parts(valid: bool, messages: Vec<ValidationMessage>) -> Self {
        Self { valid, messages }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.severity == ValidationSeverity::Warning)
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// `Error` and `Critical` messages.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|message| message.severity.is_failure())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|message| message.severity == ValidationSeverity::Warning)
    }

    /// The first failure message, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors().next().map(|message| message.message.as_str())
    }

    /// Record a message. `Error` and `Critical` messages invalidate the
    /// result.
    pub fn add_message(&mut self, message: ValidationMessage) {
        if message.severity.is_failure() {
            self.valid = false;
        }
        self.messages.push(message);
    }

    /// Tag every message without a field with `field`.
    pub fn with_field(mut self, field: &str) -> Self {
        for message in &mut self.messages {
            if message.field.is_none() {
                message.field = Some(field.to_string());
            }
        }
        self
    }

    /// Conjunction of validity, concatenation of messages.
    pub fn combine(mut self, other: ValidationResult) -> Self {
        self += other;
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

impl AddAssign for ValidationResult {
    fn add_assign(&mut self, other: ValidationResult) {
        self.valid = self.valid && other.valid;
        self.messages.extend(other.messages);
    }
}

impl Add for ValidationResult {
    type Output = ValidationResult;

    fn add(self, other: ValidationResult) -> ValidationResult {
        self.combine(other)
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::success(), Self::combine)
    }
}
