//! Volatility indicators.

use perpbot_core::types::Bar;

use crate::util::rolling_mean;

/// Per-bar true range.
///
/// The first bar has no previous close, so its true range is high - low.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut prev_close = None;
    bars.iter()
        .map(|bar| {
            let tr = bar.true_range(prev_close);
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

/// Average True Range (ATR).
///
/// Simple rolling mean of the true range. Warm-up prefix of
/// `period - 1` NaN slots.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate the ATR series aligned with the input bars.
    pub fn calculate(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_mean(&true_range(bars), self.period)
    }

    /// Minimum bars needed before the first defined value.
    pub fn lookback(&self) -> usize {
        self.period
    }
}
