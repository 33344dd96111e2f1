//! Sentiment collaborator trait.

use crate::types::SentimentSignal;

/// Read side of the sentiment side-channel.
///
/// Reads must be non-blocking: the engine consults the latest cached
/// value at decision time and never waits for a refresh. Implementations
/// with no value available return [`SentimentSignal::None`].
pub trait SentimentSource: Send + Sync {
    /// Latest cached sentiment classification.
    fn current_signal(&self) -> SentimentSignal;
}

/// A sentiment source that never has a signal, for running without the
/// news collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSentiment;

impl SentimentSource for NoSentiment {
    fn current_signal(&self) -> SentimentSignal {
        SentimentSignal::None
    }
}
