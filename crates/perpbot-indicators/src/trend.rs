//! Trend indicators: SuperTrend and ADX/DMI.

use perpbot_core::types::Bar;

use crate::util::rolling_mean;
use crate::volatility::{true_range, Atr};

/// SuperTrend output, aligned 1:1 with the input bars.
#[derive(Debug, Clone)]
pub struct SuperTrendSeries {
    /// True where the indicator tracks an uptrend. Bars before the first
    /// defined ATR value report the deterministic initial direction
    /// (down).
    pub uptrend: Vec<bool>,
    /// ATR series the bands were built from
    pub atr: Vec<f64>,
    /// The active band value: lower band while up, upper band while down.
    /// NaN during warm-up.
    pub band: Vec<f64>,
}

/// SuperTrend, an ATR-band trend direction indicator.
///
/// Basic bands are midpoint +/- multiplier * ATR. Final bands ratchet:
/// the upper band only moves down (resistance tightens) unless the prior
/// close broke above it, the lower band only moves up unless the prior
/// close broke below it. Direction flips when the close crosses the band
/// currently being tracked.
#[derive(Debug, Clone)]
pub struct SuperTrend {
    period: usize,
    multiplier: f64,
}

impl SuperTrend {
    /// Create a new SuperTrend. Common parameters are (10, 3.0).
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        assert!(multiplier > 0.0, "Multiplier must be positive");
        Self { period, multiplier }
    }

    /// Calculate direction, ATR and active band for the given bars.
    pub fn calculate(&self, bars: &[Bar]) -> SuperTrendSeries {
        let n = bars.len();
        let atr = Atr::new(self.period).calculate(bars);
        let mut uptrend = vec![false; n];
        let mut band = vec![f64::NAN; n];

        let start = match atr.iter().position(|v| !v.is_nan()) {
            Some(idx) => idx,
            None => return SuperTrendSeries { uptrend, atr, band },
        };

        // First usable bar: direction starts down, final bands equal the
        // raw bands.
        let mut final_upper = bars[start].midpoint() + self.multiplier * atr[start];
        let mut final_lower = bars[start].midpoint() - self.multiplier * atr[start];
        let mut up = false;
        band[start] = final_upper;

        for i in (start + 1)..n {
            let basic_upper = bars[i].midpoint() + self.multiplier * atr[i];
            let basic_lower = bars[i].midpoint() - self.multiplier * atr[i];
            let prev_close = bars[i - 1].close;

            // Ratchet: bands only move favorably unless price closed
            // through them on the previous bar.
            if basic_upper < final_upper || prev_close > final_upper {
                final_upper = basic_upper;
            }
            if basic_lower > final_lower || prev_close < final_lower {
                final_lower = basic_lower;
            }

            let close = bars[i].close;
            up = if up {
                // Tracking the lower band; flip down when close breaks it
                close >= final_lower
            } else {
                // Tracking the upper band; flip up when close breaks it
                close > final_upper
            };

            uptrend[i] = up;
            band[i] = if up { final_lower } else { final_upper };
        }

        SuperTrendSeries { uptrend, atr, band }
    }

    /// Minimum bars needed before the first defined value.
    pub fn lookback(&self) -> usize {
        self.period
    }
}

/// ADX/DMI output, aligned 1:1 with the input bars.
#[derive(Debug, Clone)]
pub struct DmiSeries {
    /// +DI series
    pub plus_di: Vec<f64>,
    /// -DI series
    pub minus_di: Vec<f64>,
    /// ADX series (rolling mean of DX)
    pub adx: Vec<f64>,
}

/// Average Directional Index with the directional movement components.
///
/// Directional movement is sign-gated: an up-move only counts as +DM
/// when it exceeds the down-move, and conversely. +/-DM and the true
/// range are smoothed with a rolling mean over `period`; ADX is the
/// rolling mean of DX over the same period.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Create a new ADX indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate the DMI series for the given bars.
    pub fn calculate(&self, bars: &[Bar]) -> DmiSeries {
        let n = bars.len();
        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];

        for i in 1..n {
            let up_move = bars[i].high - bars[i - 1].high;
            let down_move = bars[i - 1].low - bars[i].low;

            plus_dm[i] = if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            };
            minus_dm[i] = if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            };
        }

        let mut tr = true_range(bars);
        if !tr.is_empty() {
            // Align the TR series with the diff-based DM series
            tr[0] = f64::NAN;
        }

        let smoothed_plus = rolling_mean(&plus_dm, self.period);
        let smoothed_minus = rolling_mean(&minus_dm, self.period);
        let smoothed_tr = rolling_mean(&tr, self.period);

        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];
        let mut dx = vec![f64::NAN; n];

        for i in 0..n {
            let strv = smoothed_tr[i];
            if strv.is_nan() || smoothed_plus[i].is_nan() || smoothed_minus[i].is_nan() {
                continue;
            }
            // A dead market has zero smoothed true range; both DIs are 0
            let (pdi, mdi) = if strv == 0.0 {
                (0.0, 0.0)
            } else {
                (
                    100.0 * smoothed_plus[i] / strv,
                    100.0 * smoothed_minus[i] / strv,
                )
            };
            plus_di[i] = pdi;
            minus_di[i] = mdi;

            let sum = pdi + mdi;
            dx[i] = if sum == 0.0 {
                0.0
            } else {
                100.0 * (pdi - mdi).abs() / sum
            };
        }

        let adx = rolling_mean(&dx, self.period);

        DmiSeries {
            plus_di,
            minus_di,
            adx,
        }
    }

    /// Minimum bars needed before the first defined ADX value.
    pub fn lookback(&self) -> usize {
        2 * self.period
    }
}
