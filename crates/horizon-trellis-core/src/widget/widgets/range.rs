//! Bounded value model shared by sliders, spin boxes, dials and progress bars.
//!
//! The stored value always lies in `[minimum, maximum]`. A request outside
//! the range is clamped when it is made, and a range change clamps the
//! stored value again; widening never brings back an earlier request.

/// Numeric types a [`RangeModel`] can hold.
pub trait RangeValue: Copy + PartialOrd + Send + Sync + 'static {
    const ZERO: Self;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn mul_steps(self, steps: i32) -> Self;
}

impl RangeValue for i32 {
    const ZERO: Self = 0;

    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    fn sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }

    fn mul_steps(self, steps: i32) -> Self {
        self.saturating_mul(steps)
    }
}

impl RangeValue for f64 {
    const ZERO: Self = 0.0;

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul_steps(self, steps: i32) -> Self {
        self * f64::from(steps)
    }
}

/// A value constrained to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeModel<T> {
    minimum: T,
    maximum: T,
    value: T,
    single_step: T,
    page_step: T,
    wrapping: bool,
}

impl<T: RangeValue> RangeModel<T> {
    pub fn new(minimum: T, maximum: T, single_step: T, page_step: T) -> Self {
        let maximum = if maximum < minimum { minimum } else { maximum };
        Self {
            minimum,
            maximum,
            value: minimum,
            single_step,
            page_step,
            wrapping: false,
        }
    }

    pub fn minimum(&self) -> T {
        self.minimum
    }

    pub fn maximum(&self) -> T {
        self.maximum
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn single_step(&self) -> T {
        self.single_step
    }

    pub fn page_step(&self) -> T {
        self.page_step
    }

    pub fn set_single_step(&mut self, step: T) {
        self.single_step = step;
    }

    pub fn set_page_step(&mut self, step: T) {
        self.page_step = step;
    }

    pub fn wrapping(&self) -> bool {
        self.wrapping
    }

    pub fn set_wrapping(&mut self, wrapping: bool) {
        self.wrapping = wrapping;
    }

    /// Store `value` clamped into the range. Returns whether the value changed.
    pub fn set_value(&mut self, value: T) -> bool {
        let before = self.value;
        // An unordered request (NaN) falls back to the minimum.
        self.value = if value.partial_cmp(&value).is_some() {
            self.clamp(value)
        } else {
            self.minimum
        };
        self.value != before
    }

    /// Change the range, keeping `minimum <= maximum` by raising the maximum.
    /// The stored value is clamped into the new range. Returns whether it
    /// changed.
    pub fn set_range(&mut self, minimum: T, maximum: T) -> bool {
        let before = self.value;
        self.minimum = minimum;
        self.maximum = if maximum < minimum { minimum } else { maximum };
        self.value = self.clamp(before);
        self.value != before
    }

    pub fn set_minimum(&mut self, minimum: T) -> bool {
        let maximum = if self.maximum < minimum { minimum } else { self.maximum };
        self.set_range(minimum, maximum)
    }

    /// Lowering the maximum below the minimum lowers the minimum too.
    pub fn set_maximum(&mut self, maximum: T) -> bool {
        let minimum = if maximum < self.minimum { maximum } else { self.minimum };
        self.set_range(minimum, maximum)
    }

    /// Move by `steps` single steps, wrapping around when enabled.
    pub fn step_by(&mut self, steps: i32) -> bool {
        let delta = self.single_step.mul_steps(steps);
        self.shift(delta)
    }

    /// Move by `pages` page steps.
    pub fn page_by(&mut self, pages: i32) -> bool {
        let delta = self.page_step.mul_steps(pages);
        self.shift(delta)
    }

    fn shift(&mut self, delta: T) -> bool {
        let current = self.value();
        let target = current.add(delta);
        let next = if self.wrapping && target > self.maximum {
            self.minimum
        } else if self.wrapping && target < self.minimum {
            self.maximum
        } else {
            target
        };
        self.set_value(next)
    }

    fn clamp(&self, value: T) -> T {
        if value < self.minimum {
            self.minimum
        } else if value > self.maximum {
            self.maximum
        } else {
            value
        }
    }

    /// Position of the value within the range, from 0.0 to 1.0.
    pub fn fraction(&self) -> f64
    where
        T: Into<f64>,
    {
        let span = self.maximum.into() - self.minimum.into();
        if span <= 0.0 {
            return 0.0;
        }
        (self.value().into() - self.minimum.into()) / span
    }
}

impl<T: RangeValue> Default for RangeModel<T>
where
    T: From<i8>,
{
    fn default() -> Self {
        Self::new(T::ZERO, T::from(99), T::from(1), T::from(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_value_survives_widening() {
        let mut model = RangeModel::<i32>::default();
        assert!(model.set_value(150));
        assert_eq!(model.value(), 99);
        assert!(!model.set_range(0, 200));
        assert_eq!(model.value(), 99);
        assert!(model.set_value(150));
        assert!(model.set_maximum(100));
        assert_eq!(model.value(), 100);
        assert!(!model.set_maximum(300));
        assert_eq!(model.value(), 100);
    }

    #[test]
    fn test_raising_minimum_pulls_value_up() {
        let mut model = RangeModel::new(0, 10, 1, 5);
        model.set_value(2);
        assert!(model.set_minimum(5));
        assert_eq!(model.value(), 5);
        assert!(!model.set_minimum(0));
        assert_eq!(model.value(), 5);
    }

    #[test]
    fn test_inverted_range() {
        let mut model = RangeModel::new(10, 5, 1, 5);
        assert_eq!((model.minimum(), model.maximum()), (10, 10));
        model.set_maximum(3);
        assert_eq!((model.minimum(), model.maximum()), (3, 3));
    }

    #[test]
    fn test_stepping_and_wrapping() {
        let mut model = RangeModel::new(0, 10, 3, 5);
        model.step_by(5);
        assert_eq!(model.value(), 10);
        model.set_wrapping(true);
        model.step_by(1);
        assert_eq!(model.value(), 0);
        model.page_by(-1);
        assert_eq!(model.value(), 10);
    }

    #[test]
    fn test_double_nan_falls_back() {
        let mut model = RangeModel::new(1.0, 2.0, 0.1, 0.5);
        model.set_value(f64::NAN);
        assert_eq!(model.value(), 1.0);
        model.set_value(1.5);
        assert!((model.fraction() - 0.5).abs() < 1e-9);
    }
}
