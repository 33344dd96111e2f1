//! Signal detection.

use perpbot_core::error::SignalError;
use perpbot_core::types::{Bar, BarSeries, Side, Signal};
use perpbot_indicators::{ema, Adx, Atr, Macd, Rsi, Stochastic, SuperTrend};
use tracing::debug;

use crate::profile::{StrategyProfile, TriggerKind, VolatilityFloor};

/// Stateless signal detector for one strategy profile.
///
/// Evaluation never mutates history; it looks at rolling indicator values
/// plus the most recent bars and produces at most one [`Signal`].
#[derive(Debug, Clone)]
pub struct SignalDetector {
    profile: StrategyProfile,
}

impl SignalDetector {
    /// Create a detector, validating the profile up front.
    pub fn new(profile: StrategyProfile) -> Result<Self, SignalError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    /// Borrow the active profile.
    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    /// Evaluate the series against the profile.
    ///
    /// Returns `Ok(None)` when no filter-passing trigger exists and
    /// `Err(InsufficientData)` when the history window is too short to
    /// evaluate at all.
    pub fn detect(&self, series: &BarSeries) -> Result<Option<Signal>, SignalError> {
        if series.len() < self.profile.min_history {
            return Err(SignalError::InsufficientData {
                required: self.profile.min_history,
                available: series.len(),
            });
        }

        let bars = series.to_vec();
        let last = bars.len() - 1;

        let (trigger_idx, direction) = match self.latest_cross(&bars) {
            Some(cross) => cross,
            None => return Ok(None),
        };

        let trigger_close = bars[trigger_idx].close;

        // Freshness: the cross must be recent and price must not have
        // run away from the trigger bar.
        if let Some(freshness) = &self.profile.freshness {
            let age = last - trigger_idx;
            if age > freshness.max_age_bars {
                debug!(symbol = %series.symbol, age, "trigger too old, dropping");
                return Ok(None);
            }
            let deviation = (bars[last].close - trigger_close).abs() / trigger_close;
            if deviation > freshness.max_price_deviation {
                debug!(symbol = %series.symbol, deviation, "price ran from trigger, dropping");
                return Ok(None);
            }
        }

        if let Some(filter) = &self.profile.trend_filter {
            let st = SuperTrend::new(filter.period, filter.multiplier).calculate(&bars);
            let wants_up = direction == Side::Buy;
            if st.uptrend[last] != wants_up {
                debug!(symbol = %series.symbol, %direction, "supertrend disagrees, dropping");
                return Ok(None);
            }
        }

        if let Some(filter) = &self.profile.strength_filter {
            let dmi = Adx::new(filter.period).calculate(&bars);
            let adx = dmi.adx[last];
            if !(adx > filter.min_adx) {
                debug!(symbol = %series.symbol, adx, "trend too weak, dropping");
                return Ok(None);
            }
        }

        let atr_series = Atr::new(self.profile.atr_period).calculate(&bars);
        let atr = atr_series[last];

        if let Some(filter) = &self.profile.volatility_filter {
            let floor = match filter.floor {
                VolatilityFloor::Absolute(min) => min,
                VolatilityFloor::PercentOfPrice(pct) => pct * bars[last].close,
            };
            if !(atr >= floor) {
                debug!(symbol = %series.symbol, atr, floor, "volatility below floor, dropping");
                return Ok(None);
            }
        }

        let reference_atr = if atr.is_nan() { None } else { Some(atr) };
        Ok(Some(Signal::new(
            direction,
            reference_atr,
            trigger_close,
            bars[trigger_idx].timestamp,
        )))
    }

    /// Find the most recent crossover for the active trigger.
    ///
    /// Returns the index of the bar on which the cross completed and the
    /// implied direction.
    fn latest_cross(&self, bars: &[Bar]) -> Option<(usize, Side)> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        match &self.profile.trigger {
            TriggerKind::Stochastic { k_period, d_period } => {
                let stoch = Stochastic::new(*k_period, *d_period).calculate(bars);
                latest_line_cross(&stoch.k, &stoch.d)
            }
            TriggerKind::EmaCross {
                fast_period,
                slow_period,
            } => {
                let fast = ema(&closes, *fast_period);
                let slow = ema(&closes, *slow_period);
                latest_line_cross(&fast, &slow)
            }
            TriggerKind::MacdCross {
                fast_period,
                slow_period,
                signal_period,
            } => {
                let macd = Macd::with_periods(*fast_period, *slow_period, *signal_period)
                    .calculate(&closes);
                latest_line_cross(&macd.macd, &macd.signal)
            }
            TriggerKind::RsiThreshold {
                period,
                overbought,
                oversold,
            } => {
                let rsi = Rsi::new(*period).calculate(&closes);
                latest_threshold_cross(&rsi, *overbought, *oversold)
            }
        }
    }
}

/// Most recent index where line `a` crossed line `b`.
fn latest_line_cross(a: &[f64], b: &[f64]) -> Option<(usize, Side)> {
    for i in (1..a.len()).rev() {
        if a[i].is_nan() || b[i].is_nan() || a[i - 1].is_nan() || b[i - 1].is_nan() {
            continue;
        }
        if a[i - 1] <= b[i - 1] && a[i] > b[i] {
            return Some((i, Side::Buy));
        }
        if a[i - 1] >= b[i - 1] && a[i] < b[i] {
            return Some((i, Side::Sell));
        }
    }
    None
}

/// Most recent index where the series left the oversold band (buy) or
/// the overbought band (sell).
fn latest_threshold_cross(values: &[f64], overbought: f64, oversold: f64) -> Option<(usize, Side)> {
    for i in (1..values.len()).rev() {
        if values[i].is_nan() || values[i - 1].is_nan() {
            continue;
        }
        if values[i - 1] < oversold && values[i] >= oversold {
            return Some((i, Side::Buy));
        }
        if values[i - 1] > overbought && values[i] <= overbought {
            return Some((i, Side::Sell));
        }
    }
    None
}
