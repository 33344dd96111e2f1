//! Momentum indicators.

use perpbot_core::types::Bar;

use crate::moving_average::ema;
use crate::util::{rolling_max, rolling_mean, rolling_min};

/// Relative Strength Index (RSI).
///
/// Rolling-mean average of gains vs losses over `period` price changes.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate the RSI series aligned with the input closes.
    pub fn calculate(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];

        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(&gain, &loss)| {
                if gain.is_nan() || loss.is_nan() {
                    f64::NAN
                } else if loss == 0.0 {
                    // No losses in the window: maximally overbought
                    100.0
                } else {
                    100.0 - 100.0 / (1.0 + gain / loss)
                }
            })
            .collect()
    }

    /// Minimum closes needed before the first defined value.
    pub fn lookback(&self) -> usize {
        self.period + 1
    }
}

/// Stochastic oscillator output, aligned 1:1 with the input bars.
#[derive(Debug, Clone)]
pub struct StochasticSeries {
    /// %K line
    pub k: Vec<f64>,
    /// %D line (rolling mean of %K)
    pub d: Vec<f64>,
}

/// Stochastic oscillator.
///
/// %K locates the close within the rolling high/low range; a zero range
/// yields the neutral value 50 rather than a division by zero.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator. Common parameters are (14, 3).
    pub fn new(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0, "Periods must be greater than 0");
        Self { k_period, d_period }
    }

    /// Calculate %K and %D for the given bars.
    pub fn calculate(&self, bars: &[Bar]) -> StochasticSeries {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

        let low_min = rolling_min(&lows, self.k_period);
        let high_max = rolling_max(&highs, self.k_period);

        let k: Vec<f64> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let lo = low_min[i];
                let hi = high_max[i];
                if lo.is_nan() || hi.is_nan() {
                    f64::NAN
                } else if hi == lo {
                    50.0
                } else {
                    100.0 * (bar.close - lo) / (hi - lo)
                }
            })
            .collect();

        let d = rolling_mean(&k, self.d_period);

        StochasticSeries { k, d }
    }

    /// Minimum bars needed before the first defined %D value.
    pub fn lookback(&self) -> usize {
        self.k_period + self.d_period - 1
    }
}

/// MACD output, aligned 1:1 with the input closes.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    /// MACD line (fast EMA - slow EMA)
    pub macd: Vec<f64>,
    /// Signal line (EMA of the MACD line)
    pub signal: Vec<f64>,
}

/// MACD indicator.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a MACD with the standard (12, 26, 9) parameters.
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    /// Calculate the MACD and signal lines for the given closes.
    pub fn calculate(&self, closes: &[f64]) -> MacdSeries {
        let fast = ema(closes, self.fast_period);
        let slow = ema(closes, self.slow_period);

        let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ema(&macd, self.signal_period);

        MacdSeries { macd, signal }
    }

    /// Bars needed for the slow EMA and signal line to settle.
    pub fn lookback(&self) -> usize {
        self.slow_period + self.signal_period
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}
