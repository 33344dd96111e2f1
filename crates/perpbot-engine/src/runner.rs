//! Cycle runner: one task, fixed cadence, sequential symbols.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use perpbot_config::AppConfig;
use perpbot_core::error::{EngineError, EngineResult};
use perpbot_core::traits::{Exchange, MarketData, SentimentSource};
use perpbot_sentiment::TelegramNotifier;
use perpbot_signals::SignalDetector;

use crate::policy::{CycleAction, PositionPolicy, SymbolRuntime};

/// Owns the policy and drives it at the configured interval.
///
/// Symbols are evaluated one after another in config order; a failure in
/// one symbol never stops the others, and no error short of panic kills
/// the loop.
pub struct EngineRunner {
    policy: PositionPolicy,
    symbols: Vec<(String, SymbolRuntime)>,
    interval: Duration,
}

impl EngineRunner {
    /// Wires the policy from validated configuration and collaborators.
    pub fn from_config(
        config: &AppConfig,
        exchange: Arc<dyn Exchange>,
        market_data: Arc<dyn MarketData>,
        sentiment: Arc<dyn SentimentSource>,
        notifier: Option<TelegramNotifier>,
    ) -> EngineResult<Self> {
        let detector = SignalDetector::new(config.strategy.clone())?;

        let mut symbols = Vec::with_capacity(config.symbols.len());
        for (symbol, settings) in &config.symbols {
            let runtime = SymbolRuntime::new(settings.clone(), config.sizing.clone())?;
            symbols.push((symbol.clone(), runtime));
        }

        let policy = PositionPolicy::new(
            exchange,
            market_data,
            sentiment,
            notifier,
            detector,
            config.engine.timeframe,
            config.engine.history_limit,
            config.engine.cooldown_secs,
            config.sentiment.opposite_warning_secs,
        );

        Ok(Self {
            policy,
            symbols,
            interval: Duration::from_secs(config.engine.interval_secs),
        })
    }

    /// Evaluates every symbol once.
    pub async fn run_cycle(&mut self) {
        let now = Utc::now().timestamp();
        for (symbol, runtime) in &self.symbols {
            match self.policy.evaluate_symbol(symbol, runtime, now).await {
                Ok(action) => log_action(symbol, &action),
                Err(err @ EngineError::PartialBracketFailure { .. }) => {
                    error!(%symbol, error = %err, "position is open without full protection");
                    self.policy.notify_partial_failure(&err).await;
                }
                Err(EngineError::Data(err)) => {
                    warn!(%symbol, error = %err, "market data unavailable, skipping");
                }
                Err(err) => {
                    warn!(%symbol, error = %err, "cycle evaluation failed");
                }
            }
        }
    }

    /// Runs cycles forever at the configured interval.
    pub async fn run(&mut self) {
        info!(
            symbols = self.symbols.len(),
            interval_secs = self.interval.as_secs(),
            "engine started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }
}

fn log_action(symbol: &str, action: &CycleAction) {
    match action {
        CycleAction::Entered {
            side,
            entry_price,
            take_profit,
            stop_loss,
        } => {
            info!(%symbol, %side, %entry_price, %take_profit, %stop_loss, "bracket placed");
        }
        CycleAction::ReversalClose => info!(%symbol, "position closed on opposing signal"),
        CycleAction::ReversalRejected { reason } => {
            warn!(%symbol, %reason, "reversal close rejected");
        }
        CycleAction::EntryRejected { reason } => warn!(%symbol, %reason, "entry rejected"),
        CycleAction::CooldownActive { remaining_secs } => {
            debug!(%symbol, remaining_secs, "cooldown active");
        }
        CycleAction::Hold | CycleAction::NoSignal => debug!(%symbol, ?action, "no action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpbot_config::SymbolSettings;
    use perpbot_core::traits::NoSentiment;
    use perpbot_core::types::{Bar, BarSeries, Timeframe};
    use perpbot_exchange::{PaperExchange, StaticMarketData};
    use rust_decimal_macros::dec;

    fn config_with(symbols: &[&str]) -> AppConfig {
        let mut config = AppConfig::default();
        for symbol in symbols {
            config.symbols.insert(
                symbol.to_string(),
                SymbolSettings {
                    quantity: dec!(0.05),
                    leverage: 15,
                    margin_mode: Default::default(),
                    price_decimals: 2,
                },
            );
        }
        config
    }

    fn quiet_series(symbol: &str) -> BarSeries {
        let mut series = BarSeries::new(symbol.to_string(), Timeframe::Minute15);
        for i in 0..60 {
            let ts = i as i64 * 900_000;
            series.push(Bar::new(ts, 100.0, 100.0, 100.0, 100.0, 10.0));
        }
        series
    }

    #[tokio::test]
    async fn failing_symbol_does_not_stop_the_cycle() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        // first symbol alphabetically has no data loaded, second does
        data.load(quiet_series("ETH/USDT:USDT"));

        let config = config_with(&["BTC/USDT:USDT", "ETH/USDT:USDT"]);
        let mut runner = EngineRunner::from_config(
            &config,
            exchange,
            data,
            Arc::new(NoSentiment),
            None,
        )
        .unwrap();

        // must complete despite the missing-symbol data error
        runner.run_cycle().await;
    }

    #[tokio::test]
    async fn from_config_builds_one_runtime_per_symbol() {
        let config = config_with(&["BTC/USDT:USDT", "ETH/USDT:USDT"]);
        let runner = EngineRunner::from_config(
            &config,
            Arc::new(PaperExchange::new(dec!(10_000))),
            Arc::new(StaticMarketData::new()),
            Arc::new(NoSentiment),
            None,
        )
        .unwrap();
        assert_eq!(runner.symbols.len(), 2);
    }
}
