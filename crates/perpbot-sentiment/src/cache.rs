//! TTL cache for the latest classified sentiment signal.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use perpbot_core::traits::SentimentSource;
use perpbot_core::types::SentimentSignal;

#[derive(Debug)]
struct CacheSlot {
    signal: SentimentSignal,
    fetched_at: Option<Instant>,
}

/// Shared sentiment cache with a fixed time-to-live.
///
/// One writer (the background refresher), many readers (the engine, once
/// per cycle). A value older than the TTL reads as [`SentimentSignal::None`],
/// so a dead refresher degrades to "no sentiment" rather than trading on
/// stale news.
#[derive(Debug, Clone)]
pub struct SentimentCache {
    slot: Arc<RwLock<CacheSlot>>,
    ttl: Duration,
}

impl SentimentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(CacheSlot {
                signal: SentimentSignal::None,
                fetched_at: None,
            })),
            ttl,
        }
    }

    /// Replaces the cached value and resets its age.
    pub fn store(&self, signal: SentimentSignal) {
        if let Ok(mut slot) = self.slot.write() {
            slot.signal = signal;
            slot.fetched_at = Some(Instant::now());
        }
    }

    /// Returns the cached signal, or `None` if it has expired.
    pub fn get(&self) -> SentimentSignal {
        let Ok(slot) = self.slot.read() else {
            return SentimentSignal::None;
        };
        match slot.fetched_at {
            Some(at) if at.elapsed() < self.ttl => slot.signal,
            _ => SentimentSignal::None,
        }
    }
}

impl SentimentSource for SentimentCache {
    fn current_signal(&self) -> SentimentSignal {
        self.get()
    }
}
