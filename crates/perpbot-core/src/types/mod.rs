//! Core data types for the trading engine.

mod ohlcv;
mod order;
mod position;
mod signal;
mod timeframe;

pub use ohlcv::{Bar, BarSeries};
pub use order::{MarginMode, OrderRequest, OrderType, PositionSide, Side, SubmitOutcome};
pub use position::Position;
pub use signal::{SentimentSignal, Signal};
pub use timeframe::Timeframe;
