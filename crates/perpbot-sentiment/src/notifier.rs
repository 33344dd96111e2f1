//! Telegram notifications and the rate-limited opposite-news warning.

use std::sync::Mutex;

use tracing::warn;

use perpbot_core::types::{SentimentSignal, Side};

/// Fire-and-forget Telegram messenger. Delivery failures are logged and
/// swallowed; a dead notifier must never affect trading.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    pub async fn send(&self, text: &str) {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let result = self
            .client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await;
        if let Err(err) = result {
            warn!(error = %err, "telegram delivery failed");
        }
    }
}

/// Warns when an open position points against the latest news verdict.
///
/// Warnings are throttled so a persistent disagreement does not flood the
/// chat every cycle.
#[derive(Debug)]
pub struct OppositeNewsWarner {
    min_interval_secs: i64,
    last_warned: Mutex<Option<i64>>,
}

impl OppositeNewsWarner {
    pub fn new(min_interval_secs: i64) -> Self {
        Self {
            min_interval_secs,
            last_warned: Mutex::new(None),
        }
    }

    /// Returns the warning text to deliver, if the position contradicts
    /// the news and the throttle window has elapsed. `now` is unix seconds.
    pub fn check(&self, now: i64, news: SentimentSignal, position_entry: Side) -> Option<String> {
        let opposite = matches!(
            (news, position_entry),
            (SentimentSignal::Bullish, Side::Sell) | (SentimentSignal::Bearish, Side::Buy)
        );
        if !opposite {
            return None;
        }

        let mut last = self.last_warned.lock().ok()?;
        if let Some(at) = *last {
            if now - at < self.min_interval_secs {
                return None;
            }
        }
        *last = Some(now);

        let suggested = match position_entry {
            Side::Buy => "SELL",
            Side::Sell => "BUY",
        };
        Some(format!(
            "warning: open {} position but the news signal points the other way: {}",
            position_entry, suggested
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_position_produces_no_warning() {
        let warner = OppositeNewsWarner::new(300);
        assert!(warner.check(1000, SentimentSignal::Bullish, Side::Buy).is_none());
        assert!(warner.check(1000, SentimentSignal::None, Side::Sell).is_none());
    }

    #[test]
    fn opposite_position_warns_once_per_window() {
        let warner = OppositeNewsWarner::new(300);
        assert!(warner.check(1000, SentimentSignal::Bullish, Side::Sell).is_some());
        // within the throttle window
        assert!(warner.check(1100, SentimentSignal::Bullish, Side::Sell).is_none());
        // window elapsed
        assert!(warner.check(1300, SentimentSignal::Bullish, Side::Sell).is_some());
    }

    #[test]
    fn bearish_news_against_long_warns() {
        let warner = OppositeNewsWarner::new(300);
        let msg = warner.check(0, SentimentSignal::Bearish, Side::Buy);
        assert!(msg.is_some_and(|m| m.contains("SELL")));
    }
}
