//! Run command: wire the collaborators and start the cycle loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use perpbot_config::load_config;
use perpbot_core::traits::{NoSentiment, SentimentSource};
use perpbot_core::types::{Bar, BarSeries};
use perpbot_engine::EngineRunner;
use perpbot_exchange::{PaperExchange, StaticMarketData};
use perpbot_sentiment::{
    spawn_refresher, ClassifierConfig, SentimentCache, SentimentClassifier, TelegramNotifier,
};

#[derive(clap::Args)]
pub struct RunArgs {
    /// JSON file of candles per symbol, served by the paper data source
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Starting paper balance in the settlement currency
    #[arg(long, default_value = "10000")]
    pub balance: Decimal,

    /// Run a single evaluation cycle and exit
    #[arg(long)]
    pub once: bool,
}

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path).context("loading configuration")?;
    if !config.exchange.paper {
        bail!("live venue connectivity is not available; set exchange.paper = true");
    }

    let exchange = Arc::new(PaperExchange::new(args.balance));

    let data = Arc::new(StaticMarketData::new());
    if let Some(path) = &args.data {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading candle file {}", path.display()))?;
        let tables: HashMap<String, Vec<Bar>> =
            serde_json::from_str(&text).context("parsing candle file")?;
        for (symbol, bars) in tables {
            let mut series = BarSeries::new(symbol, config.engine.timeframe);
            series.extend(bars);
            series.validate().context("candle file out of order")?;
            data.load(series);
        }
    }

    let (sentiment, notifier): (Arc<dyn SentimentSource>, Option<TelegramNotifier>) =
        if config.sentiment.enabled {
            let cache = SentimentCache::new(Duration::from_secs(config.sentiment.ttl_secs));
            let classifier_config = ClassifierConfig {
                news_api_key: env_or_empty(&config.sentiment.news_api_key_env),
                classifier_api_key: env_or_empty(&config.sentiment.classifier_api_key_env),
                keywords: config.sentiment.keywords.clone(),
                model: config.sentiment.model.clone(),
                ..ClassifierConfig::default()
            };
            let notifier = std::env::var(&config.sentiment.telegram_token_env)
                .ok()
                .filter(|token| !token.is_empty())
                .map(|token| {
                    TelegramNotifier::new(token, config.sentiment.telegram_chat_id.clone())
                });
            // detached; dropping the handle leaves the task running
            let _refresher = spawn_refresher(
                SentimentClassifier::new(classifier_config),
                cache.clone(),
                notifier.clone(),
                Duration::from_secs(config.sentiment.refresh_secs),
            );
            info!("sentiment collaborator enabled");
            (Arc::new(cache), notifier)
        } else {
            (Arc::new(NoSentiment), None)
        };

    let mut runner = EngineRunner::from_config(&config, exchange, data, sentiment, notifier)?;

    if args.once {
        runner.run_cycle().await;
    } else {
        runner.run().await;
    }
    Ok(())
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}
