//! Background refresh task for the sentiment cache.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use perpbot_core::types::SentimentSignal;

use crate::cache::SentimentCache;
use crate::classifier::SentimentClassifier;
use crate::notifier::TelegramNotifier;

/// Spawns the periodic news scan. Each pass fetches headlines, classifies
/// them and stores the verdict in `cache`; a directional verdict is also
/// announced via Telegram when a notifier is configured.
pub fn spawn_refresher(
    classifier: SentimentClassifier,
    cache: SentimentCache,
    notifier: Option<TelegramNotifier>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let (verdict, headline) = classifier.current_verdict().await;
            cache.store(verdict);
            info!(signal = %verdict, "news scan complete");
            if verdict != SentimentSignal::None {
                if let (Some(notifier), Some(headline)) = (&notifier, headline) {
                    notifier
                        .send(&format!(
                            "News signal detected: {}\nHeadline: {}",
                            verdict, headline
                        ))
                        .await;
                }
            }
        }
    })
}
