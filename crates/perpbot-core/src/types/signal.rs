//! Trading and sentiment signal types.

use serde::{Deserialize, Serialize};

use super::Side;

/// A directional trading signal, produced fresh each evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Direction of the proposed trade
    pub direction: Side,
    /// ATR at signal time, used as the bracket's volatility reference.
    /// None when the signal came from a source with no price context
    /// (e.g. sentiment alone).
    pub reference_atr: Option<f64>,
    /// Close price of the bar that produced the signal
    pub price: f64,
    /// Timestamp of the bar that produced the signal (unix millis)
    pub timestamp: i64,
}

impl Signal {
    /// Create a new signal.
    pub fn new(direction: Side, reference_atr: Option<f64>, price: f64, timestamp: i64) -> Self {
        Self {
            direction,
            reference_atr,
            price,
            timestamp,
        }
    }
}

/// Latest classification from the news/sentiment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentSignal {
    Bullish,
    Bearish,
    /// Nothing actionable, or no value cached yet
    #[default]
    #[serde(rename = "no signal")]
    None,
}

impl SentimentSignal {
    /// The trade direction this sentiment implies, if any.
    pub fn direction(&self) -> Option<Side> {
        match self {
            SentimentSignal::Bullish => Some(Side::Buy),
            SentimentSignal::Bearish => Some(Side::Sell),
            SentimentSignal::None => None,
        }
    }
}

impl std::fmt::Display for SentimentSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentSignal::Bullish => write!(f, "bullish"),
            SentimentSignal::Bearish => write!(f, "bearish"),
            SentimentSignal::None => write!(f, "no signal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_direction() {
        assert_eq!(SentimentSignal::Bullish.direction(), Some(Side::Buy));
        assert_eq!(SentimentSignal::Bearish.direction(), Some(Side::Sell));
        assert_eq!(SentimentSignal::None.direction(), None);
    }
}
