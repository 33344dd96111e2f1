//! Merging the technical signal with the news verdict.

use perpbot_core::types::{SentimentSignal, Side, Signal};

/// Outcome of merging the two channels for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinedSignal {
    /// The indicator pipeline produced a signal; it always wins.
    Technical(Signal),
    /// No technical signal, but the news verdict has a direction. The
    /// caller must size the bracket from current market data since no
    /// trigger bar backs this entry.
    SentimentOnly(Side),
}

impl CombinedSignal {
    pub fn direction(&self) -> Side {
        match self {
            CombinedSignal::Technical(signal) => signal.direction,
            CombinedSignal::SentimentOnly(side) => *side,
        }
    }
}

/// The technical channel dominates: a detected signal passes through
/// untouched regardless of the news. Sentiment alone can open a position
/// only when the indicators are silent.
pub fn combine_signals(tech: Option<Signal>, news: SentimentSignal) -> Option<CombinedSignal> {
    match (tech, news.direction()) {
        (Some(signal), _) => Some(CombinedSignal::Technical(signal)),
        (None, Some(side)) => Some(CombinedSignal::SentimentOnly(side)),
        (None, None) => None,
    }
}
