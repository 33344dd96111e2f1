//! News sentiment side-channel.
//!
//! A background task periodically pulls recent headlines, runs them through
//! an LLM classifier and stores the verdict in a TTL cache. The trading
//! engine only ever reads the cache, so a slow or failing news pipeline can
//! never stall a trading cycle.

pub mod cache;
pub mod classifier;
pub mod combine;
pub mod notifier;
pub mod refresher;

pub use cache::SentimentCache;
pub use classifier::{ClassifierConfig, SentimentClassifier};
pub use combine::{combine_signals, CombinedSignal};
pub use notifier::{OppositeNewsWarner, TelegramNotifier};
pub use refresher::spawn_refresher;
