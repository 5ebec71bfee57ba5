//! Toolkit-level errors.
//!
//! Each subsystem keeps its own error type; [`CoreError`] wraps them so the
//! layers above can propagate any of them with `?`.

use crate::animation::AnimationError;
use crate::object::ObjectError;
use crate::property::PropertyError;
use crate::widget::KeySequenceParseError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("timer: {0}")]
    Timer(#[from] TimerError),

    #[error("object tree: {0}")]
    Object(#[from] ObjectError),

    #[error("property: {0}")]
    Property(#[from] PropertyError),

    #[error("shortcut: {0}")]
    KeySequence(#[from] KeySequenceParseError),

    #[error("animation: {0}")]
    Animation(#[from] AnimationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The id was never issued by this thread's event loop, or the timer
    /// already fired or was stopped.
    #[error("no live timer with this id")]
    InvalidTimerId,
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_errors_keep_their_source() {
        let err = CoreError::from(PropertyError::not_found("speed"));
        assert_eq!(err.to_string(), "property: widget has no property 'speed'");
        assert!(err.source().is_some());
        assert!(matches!(
            CoreError::from(TimerError::InvalidTimerId),
            CoreError::Timer(TimerError::InvalidTimerId)
        ));
    }
}
