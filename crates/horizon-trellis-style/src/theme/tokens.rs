//! Shadow and motion tokens.

use std::time::Duration;

use horizon_trellis_core::Easing;

/// Box-shadow values, in CSS syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadows {
    pub none: String,
    pub xs: String,
    pub sm: String,
    pub md: String,
    pub lg: String,
    pub xl: String,
    pub xxl: String,
}

impl Default for Shadows {
    fn default() -> Self {
        Self {
            none: "none".into(),
            xs: "0 1px 2px rgba(0, 0, 0, 0.05)".into(),
            sm: "0 1px 3px rgba(0, 0, 0, 0.1), 0 1px 2px rgba(0, 0, 0, 0.06)".into(),
            md: "0 4px 6px rgba(0, 0, 0, 0.07), 0 2px 4px rgba(0, 0, 0, 0.06)".into(),
            lg: "0 10px 15px rgba(0, 0, 0, 0.1), 0 4px 6px rgba(0, 0, 0, 0.05)".into(),
            xl: "0 20px 25px rgba(0, 0, 0, 0.1), 0 10px 10px rgba(0, 0, 0, 0.04)".into(),
            xxl: "0 25px 50px rgba(0, 0, 0, 0.25)".into(),
        }
    }
}

/// Named durations and easing curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationTokens {
    pub instant: Duration,
    pub fast: Duration,
    pub normal: Duration,
    pub slow: Duration,
    pub slower: Duration,
    pub slowest: Duration,

    pub ease_linear: String,
    pub ease: String,
    pub ease_in: String,
    pub ease_out: String,
    pub ease_in_out: String,
    pub ease_bounce: String,
}

impl Default for AnimationTokens {
    fn default() -> Self {
        Self {
            instant: Duration::ZERO,
            fast: Duration::from_millis(150),
            normal: Duration::from_millis(300),
            slow: Duration::from_millis(500),
            slower: Duration::from_millis(750),
            slowest: Duration::from_millis(1000),
            ease_linear: "linear".into(),
            ease: "ease".into(),
            ease_in: "ease-in".into(),
            ease_out: "ease-out".into(),
            ease_in_out: "ease-in-out".into(),
            ease_bounce: "cubic-bezier(0.68, -0.55, 0.265, 1.55)".into(),
        }
    }
}

impl AnimationTokens {
    /// The closest built-in curve for a CSS timing function.
    ///
    /// Unrecognized functions fall back to [`Easing::OutCubic`].
    pub fn curve(timing_function: &str) -> Easing {
        match timing_function.trim() {
            "linear" => Easing::Linear,
            "ease" | "ease-in-out" => Easing::InOutCubic,
            "ease-in" => Easing::InCubic,
            "ease-out" => Easing::OutCubic,
            other if other.starts_with("cubic-bezier") => Easing::OutBounce,
            other => other.parse().unwrap_or(Easing::OutCubic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curves() {
        let tokens = AnimationTokens::default();
        assert_eq!(AnimationTokens::curve(&tokens.ease_linear), Easing::Linear);
        assert_eq!(AnimationTokens::curve(&tokens.ease_in), Easing::InCubic);
        assert_eq!(AnimationTokens::curve(&tokens.ease_bounce), Easing::OutBounce);
        assert_eq!(AnimationTokens::curve("InOutElastic"), Easing::InOutElastic);
        assert_eq!(AnimationTokens::curve("steps(4)"), Easing::OutCubic);
        assert_eq!(tokens.normal, Duration::from_millis(300));
    }
}
