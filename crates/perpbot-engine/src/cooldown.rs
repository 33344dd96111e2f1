//! Per-symbol entry cooldown.

use std::collections::HashMap;

/// Tracks the last entry time per symbol and blocks re-entries inside a
/// fixed window. Timestamps are unix seconds supplied by the caller, so
/// the policy stays deterministic under test.
#[derive(Debug)]
pub struct CooldownTracker {
    window_secs: i64,
    last_entry: HashMap<String, i64>,
}

impl CooldownTracker {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window_secs,
            last_entry: HashMap::new(),
        }
    }

    /// Marks an accepted entry at `now`.
    pub fn record(&mut self, symbol: &str, now: i64) {
        self.last_entry.insert(symbol.to_string(), now);
    }

    /// Seconds until the symbol may enter again, or `None` when clear.
    pub fn remaining(&self, symbol: &str, now: i64) -> Option<i64> {
        let last = self.last_entry.get(symbol)?;
        let elapsed = now - last;
        if elapsed < self.window_secs {
            Some(self.window_secs - elapsed)
        } else {
            None
        }
    }

    pub fn is_blocked(&self, symbol: &str, now: i64) -> bool {
        self.remaining(symbol, now).is_some()
    }
}
