//! Technical indicators over candle history windows.
//!
//! This crate provides the indicator functions the signal detector builds
//! on:
//! - Volatility: ATR
//! - Trend: SuperTrend, ADX/DMI
//! - Momentum: RSI, Stochastic, MACD
//! - Moving averages: SMA, EMA
//! - Volume: VWAP
//!
//! Every indicator returns a series aligned 1:1 with its input bars, with
//! an `f64::NAN` warm-up prefix where the rolling computation is not yet
//! defined. All computations are pure: identical input always yields
//! bit-identical output.

pub mod momentum;
pub mod moving_average;
pub mod trend;
pub mod util;
pub mod volatility;
pub mod volume;

pub use momentum::{Macd, MacdSeries, Rsi, Stochastic, StochasticSeries};
pub use moving_average::{ema, Ema, Sma};
pub use trend::{Adx, DmiSeries, SuperTrend, SuperTrendSeries};
pub use volatility::{true_range, Atr};
pub use volume::Vwap;
