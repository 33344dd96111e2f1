//! Collaborator traits for the trading engine.

mod exchange;
mod market_data;
mod sentiment;

pub use exchange::Exchange;
pub use market_data::MarketData;
pub use sentiment::{NoSentiment, SentimentSource};
