//! Range mapping between normalized and plain parameter values.

use std::ops::RangeInclusive;

/// Maps plain values in natural units to the normalized `0.0..=1.0` range
/// hosts use for automation.
pub trait RangeMapper: Send + Sync {
    /// Plain → normalized. Out-of-range input is clamped.
    fn normalize(&self, plain: f64) -> f64;

    /// Normalized → plain. Out-of-range input is clamped.
    fn denormalize(&self, normalized: f64) -> f64;

    /// `(min, max)` in plain units.
    fn range(&self) -> (f64, f64);
}

/// Linear mapping.
#[derive(Debug, Clone)]
pub struct LinearMapper {
    min: f64,
    max: f64,
}

impl LinearMapper {
    /// Create a linear mapper over `range`.
    pub fn new(range: RangeInclusive<f64>) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

impl RangeMapper for LinearMapper {
    fn normalize(&self, plain: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((plain - self.min) / span).clamp(0.0, 1.0)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}
