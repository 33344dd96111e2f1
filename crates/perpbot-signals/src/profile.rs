//! Strategy profile configuration.

use perpbot_core::error::SignalError;
use serde::{Deserialize, Serialize};

/// Which crossover event arms the signal. Exactly one trigger is active
/// per profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TriggerKind {
    /// Stochastic %K crossing %D
    Stochastic { k_period: usize, d_period: usize },
    /// Fast EMA crossing slow EMA
    EmaCross { fast_period: usize, slow_period: usize },
    /// RSI leaving the oversold band (buy) or the overbought band (sell)
    RsiThreshold {
        period: usize,
        overbought: f64,
        oversold: f64,
    },
    /// MACD line crossing its signal line
    MacdCross {
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    },
}

impl Default for TriggerKind {
    fn default() -> Self {
        TriggerKind::Stochastic {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// SuperTrend agreement filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperTrendFilter {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for SuperTrendFilter {
    fn default() -> Self {
        Self {
            period: 10,
            multiplier: 3.0,
        }
    }
}

/// Trend-strength filter: latest ADX must exceed `min_adx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxFilter {
    pub period: usize,
    pub min_adx: f64,
}

impl Default for AdxFilter {
    fn default() -> Self {
        Self {
            period: 14,
            min_adx: 20.0,
        }
    }
}

/// Volatility floor: below it no signal is emitted, whatever the other
/// filters say. Keeps the engine out of dead markets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityFloor {
    /// Minimum ATR in price units
    Absolute(f64),
    /// Minimum ATR as a fraction of the latest close
    PercentOfPrice(f64),
}

/// Volatility filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityFilter {
    pub floor: VolatilityFloor,
}

/// Freshness checks against acting on a cross after price already ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessFilter {
    /// Maximum price deviation between the trigger bar's close and the
    /// latest close, as a fraction of the trigger close
    pub max_price_deviation: f64,
    /// Maximum number of bars since the trigger completed
    pub max_age_bars: usize,
}

impl Default for FreshnessFilter {
    fn default() -> Self {
        Self {
            max_price_deviation: 0.006,
            max_age_bars: 1,
        }
    }
}

/// Full strategy profile: one trigger plus togglable filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyProfile {
    #[serde(default)]
    pub trigger: TriggerKind,
    /// ATR period used for the signal's reference volatility and the
    /// volatility floor
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default)]
    pub trend_filter: Option<SuperTrendFilter>,
    #[serde(default)]
    pub strength_filter: Option<AdxFilter>,
    #[serde(default)]
    pub volatility_filter: Option<VolatilityFilter>,
    #[serde(default)]
    pub freshness: Option<FreshnessFilter>,
    /// Minimum bars before any evaluation is attempted
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

fn default_atr_period() -> usize {
    14
}

fn default_min_history() -> usize {
    50
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self {
            trigger: TriggerKind::default(),
            atr_period: default_atr_period(),
            trend_filter: Some(SuperTrendFilter::default()),
            strength_filter: Some(AdxFilter::default()),
            volatility_filter: Some(VolatilityFilter {
                floor: VolatilityFloor::Absolute(0.5),
            }),
            freshness: Some(FreshnessFilter::default()),
            min_history: default_min_history(),
        }
    }
}

impl StrategyProfile {
    /// Validate the profile.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.atr_period == 0 {
            return Err(SignalError::InvalidProfile(
                "atr_period must be greater than 0".into(),
            ));
        }
        if self.min_history == 0 {
            return Err(SignalError::InvalidProfile(
                "min_history must be greater than 0".into(),
            ));
        }
        if let Some(freshness) = &self.freshness {
            if freshness.max_price_deviation < 0.0 {
                return Err(SignalError::InvalidProfile(
                    "max_price_deviation must not be negative".into(),
                ));
            }
        }
        match &self.trigger {
            TriggerKind::Stochastic { k_period, d_period } => {
                if *k_period == 0 || *d_period == 0 {
                    return Err(SignalError::InvalidProfile(
                        "stochastic periods must be greater than 0".into(),
                    ));
                }
            }
            TriggerKind::EmaCross {
                fast_period,
                slow_period,
            } => {
                if *fast_period == 0 || fast_period >= slow_period {
                    return Err(SignalError::InvalidProfile(
                        "ema fast period must be positive and less than slow".into(),
                    ));
                }
            }
            TriggerKind::RsiThreshold {
                period,
                overbought,
                oversold,
            } => {
                if *period == 0 {
                    return Err(SignalError::InvalidProfile(
                        "rsi period must be greater than 0".into(),
                    ));
                }
                if oversold >= overbought {
                    return Err(SignalError::InvalidProfile(
                        "rsi oversold must be below overbought".into(),
                    ));
                }
            }
            TriggerKind::MacdCross {
                fast_period,
                slow_period,
                signal_period,
            } => {
                if *fast_period == 0 || *signal_period == 0 || fast_period >= slow_period {
                    return Err(SignalError::InvalidProfile(
                        "macd periods must be positive with fast < slow".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}
