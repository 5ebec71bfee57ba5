//! Easing curves for animations.
//!
//! An easing curve maps linear progress in `[0, 1]` to eased progress.
//! Elastic curves overshoot and may leave the unit range in between; every
//! curve maps 0 to 0 and 1 to 1.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Available easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InBounce,
    OutBounce,
    InOutBounce,
    InElastic,
    OutElastic,
    InOutElastic,
}

impl Easing {
    /// Every curve, in declaration order.
    pub const ALL: [Easing; 16] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InBounce,
        Self::OutBounce,
        Self::InOutBounce,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::InQuad => "InQuad",
            Self::OutQuad => "OutQuad",
            Self::InOutQuad => "InOutQuad",
            Self::InCubic => "InCubic",
            Self::OutCubic => "OutCubic",
            Self::InOutCubic => "InOutCubic",
            Self::InQuart => "InQuart",
            Self::OutQuart => "OutQuart",
            Self::InOutQuart => "InOutQuart",
            Self::InBounce => "InBounce",
            Self::OutBounce => "OutBounce",
            Self::InOutBounce => "InOutBounce",
            Self::InElastic => "InElastic",
            Self::OutElastic => "OutElastic",
            Self::InOutElastic => "InOutElastic",
        }
    }

    /// Apply the curve to progress `t`, clamped to `[0, 1]` first.
    ///
    /// ```
    /// use horizon_trellis_core::animation::Easing;
    ///
    /// assert_eq!(Easing::Linear.ease(0.25), 0.25);
    /// assert!(Easing::InQuad.ease(0.5) < 0.5);
    /// assert!(Easing::OutQuad.ease(0.5) > 0.5);
    /// ```
    pub fn ease(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t.powi(2),
            Self::OutQuad => out(t, |t| t.powi(2)),
            Self::InOutQuad => in_out(t, |t| t.powi(2)),
            Self::InCubic => t.powi(3),
            Self::OutCubic => out(t, |t| t.powi(3)),
            Self::InOutCubic => in_out(t, |t| t.powi(3)),
            Self::InQuart => t.powi(4),
            Self::OutQuart => out(t, |t| t.powi(4)),
            Self::InOutQuart => in_out(t, |t| t.powi(4)),
            Self::InBounce => out(t, bounce_out),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => in_out(t, |t| out(t, bounce_out)),
            Self::InElastic => elastic_in(t),
            Self::OutElastic => out(t, elastic_in),
            Self::InOutElastic => in_out(t, elastic_in),
        }
    }

    /// Interpolate from `start` to `end` at eased progress `t`.
    pub fn lerp(self, start: f64, end: f64, t: f64) -> f64 {
        start + (end - start) * self.ease(t)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown curve name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEasing(pub String);

impl fmt::Display for UnknownEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown easing curve '{}'", self.0)
    }
}

impl std::error::Error for UnknownEasing {}

impl FromStr for Easing {
    type Err = UnknownEasing;

    /// Names match case-insensitively and may carry an `Ease` prefix, so
    /// `"OutCubic"`, `"outcubic"` and `"EaseOutCubic"` are the same curve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("ease"))
            .map_or(trimmed, |_| &trimmed[4..]);
        Self::ALL
            .into_iter()
            .find(|easing| easing.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownEasing(s.to_string()))
    }
}

// =============================================================================
// Curve construction
// =============================================================================

/// The mirror image of an ease-in curve.
#[inline]
fn out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    1.0 - ease_in(1.0 - t)
}

/// First half eases in, second half eases out.
#[inline]
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 - 2.0 * t) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

fn elastic_in(t: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let period = 0.3;
    let shift = period / 4.0;
    -(2f64.powf(10.0 * (t - 1.0)) * ((t - 1.0 - shift) * (2.0 * PI) / period).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in Easing::ALL {
            assert!(easing.ease(0.0).abs() < 1e-9, "{easing} at 0");
            assert!((easing.ease(1.0) - 1.0).abs() < 1e-9, "{easing} at 1");
        }
    }

    #[test]
    fn test_symmetric_midpoints() {
        for easing in [
            Easing::InOutQuad,
            Easing::InOutCubic,
            Easing::InOutQuart,
            Easing::InOutBounce,
        ] {
            assert!((easing.ease(0.5) - 0.5).abs() < 1e-9, "{easing}");
        }
    }

    #[test]
    fn test_elastic_overshoots() {
        let samples = (1..100).map(|i| Easing::OutElastic.ease(f64::from(i) / 100.0));
        assert!(samples.fold(f64::MIN, f64::max) > 1.0);
    }

    #[test]
    fn test_clamp_and_parse() {
        assert_eq!(Easing::Linear.ease(-0.5), 0.0);
        assert_eq!(Easing::Linear.ease(1.5), 1.0);
        assert_eq!("OutCubic".parse(), Ok(Easing::OutCubic));
        assert_eq!("easeInOutQuad".parse(), Ok(Easing::InOutQuad));
        assert!("Wobble".parse::<Easing>().is_err());
        assert_eq!(Easing::OutBounce.lerp(10.0, 20.0, 1.0), 20.0);
    }
}
