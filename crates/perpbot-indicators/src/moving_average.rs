//! Moving averages.

use crate::util::rolling_mean;

/// Exponential moving average seeded with the first value.
///
/// Full-length output with no warm-up prefix: the seed makes every slot
/// defined, which is fine for this engine's use (crossovers on the most
/// recent bars of a 150-bar window).
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period > 0, "Period must be greater than 0");
    if values.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut current = values[0];
    result.push(current);

    for &value in &values[1..] {
        current = value * alpha + current * (1.0 - alpha);
        result.push(current);
    }
    result
}

/// Exponential moving average as a reusable indicator.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate the EMA series aligned with the input values.
    pub fn calculate(&self, values: &[f64]) -> Vec<f64> {
        ema(values, self.period)
    }

    /// Bars needed for the average to be meaningful.
    pub fn lookback(&self) -> usize {
        self.period
    }
}

/// Simple moving average.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate the SMA series aligned with the input values.
    pub fn calculate(&self, values: &[f64]) -> Vec<f64> {
        rolling_mean(values, self.period)
    }

    /// Bars needed before the first defined value.
    pub fn lookback(&self) -> usize {
        self.period
    }
}
