//! Per-instrument position policy.
//!
//! One evaluation per symbol per cycle: read the open position, detect a
//! signal, merge in sentiment, then hold, close or enter according to the
//! policy rules. All clock reads are injected as unix seconds.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use perpbot_config::SymbolSettings;
use perpbot_core::error::{BracketLeg, EngineError, EngineResult, PlanError};
use perpbot_core::traits::{Exchange, MarketData, SentimentSource};
use perpbot_core::types::{BarSeries, OrderRequest, Side, SubmitOutcome, Timeframe};
use perpbot_indicators::Atr;
use perpbot_planner::{BracketOrderPlanner, SizingMode};
use perpbot_sentiment::{combine_signals, CombinedSignal, OppositeNewsWarner, TelegramNotifier};
use perpbot_signals::SignalDetector;

use crate::cooldown::CooldownTracker;

/// Per-symbol state prepared once at startup.
#[derive(Debug, Clone)]
pub struct SymbolRuntime {
    pub settings: SymbolSettings,
    pub planner: BracketOrderPlanner,
}

impl SymbolRuntime {
    pub fn new(settings: SymbolSettings, mode: SizingMode) -> Result<Self, PlanError> {
        let planner = BracketOrderPlanner::new(mode, settings.price_decimals)?;
        Ok(Self { settings, planner })
    }
}

/// What the policy did for one symbol in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleAction {
    /// Open position, no opposing signal
    Hold,
    /// Flat and nothing fired
    NoSignal,
    /// Flat with a signal, but inside the re-entry window
    CooldownActive { remaining_secs: i64 },
    /// Opposing signal closed the open position; entry waits for a
    /// later cycle
    ReversalClose,
    /// The venue refused the reversal close; position unchanged
    ReversalRejected { reason: String },
    /// Full bracket submitted
    Entered {
        side: Side,
        entry_price: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
    },
    /// Entry leg rejected; no cooldown recorded
    EntryRejected { reason: String },
}

/// Decision engine for one portfolio of symbols.
pub struct PositionPolicy {
    exchange: Arc<dyn Exchange>,
    market_data: Arc<dyn MarketData>,
    sentiment: Arc<dyn SentimentSource>,
    notifier: Option<TelegramNotifier>,
    warner: OppositeNewsWarner,
    detector: SignalDetector,
    timeframe: Timeframe,
    history_limit: usize,
    cooldown: CooldownTracker,
}

impl PositionPolicy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exchange: Arc<dyn Exchange>,
        market_data: Arc<dyn MarketData>,
        sentiment: Arc<dyn SentimentSource>,
        notifier: Option<TelegramNotifier>,
        detector: SignalDetector,
        timeframe: Timeframe,
        history_limit: usize,
        cooldown_secs: i64,
        opposite_warning_secs: i64,
    ) -> Self {
        Self {
            exchange,
            market_data,
            sentiment,
            notifier,
            warner: OppositeNewsWarner::new(opposite_warning_secs),
            detector,
            timeframe,
            history_limit,
            cooldown: CooldownTracker::new(cooldown_secs),
        }
    }

    /// Runs the policy for one symbol. `now` is unix seconds.
    pub async fn evaluate_symbol(
        &mut self,
        symbol: &str,
        runtime: &SymbolRuntime,
        now: i64,
    ) -> EngineResult<CycleAction> {
        let position = self.exchange.get_position(symbol).await?;
        let news = self.sentiment.current_signal();

        if let Some(position) = &position {
            if let Some(message) = self.warner.check(now, news, position.side.entry_side()) {
                warn!(%symbol, %news, "position points against the news verdict");
                if let Some(notifier) = &self.notifier {
                    notifier.send(&message).await;
                }
            }
        }

        let series = self
            .market_data
            .fetch_history(symbol, self.timeframe, self.history_limit)
            .await?;
        let technical = self.detector.detect(&series)?;
        // Sentiment may only open positions. While in a position the news
        // verdict warns (above) but never closes; only an opposing
        // technical signal reaches the reversal arm.
        let combined = match &position {
            Some(_) => technical.map(CombinedSignal::Technical),
            None => combine_signals(technical, news),
        };

        match (position, combined) {
            (Some(position), Some(signal))
                if signal.direction() != position.side.entry_side() =>
            {
                let close = OrderRequest::close_position(
                    symbol,
                    position.side,
                    position.quantity,
                );
                match self.exchange.submit_order(close).await? {
                    SubmitOutcome::Accepted { order_id } => {
                        info!(%symbol, %order_id, side = %position.side, "closed position against opposing signal");
                        Ok(CycleAction::ReversalClose)
                    }
                    SubmitOutcome::Rejected { reason } => {
                        warn!(%symbol, %reason, "reversal close rejected");
                        Ok(CycleAction::ReversalRejected { reason })
                    }
                }
            }
            (Some(_), _) => Ok(CycleAction::Hold),
            (None, None) => Ok(CycleAction::NoSignal),
            (None, Some(signal)) => {
                if let Some(remaining_secs) = self.cooldown.remaining(symbol, now) {
                    debug!(%symbol, remaining_secs, "cooldown active");
                    return Ok(CycleAction::CooldownActive { remaining_secs });
                }
                self.enter(symbol, runtime, signal, &series, now).await
            }
        }
    }

    /// Submits the three-leg bracket for a flat symbol.
    async fn enter(
        &mut self,
        symbol: &str,
        runtime: &SymbolRuntime,
        signal: CombinedSignal,
        series: &BarSeries,
        now: i64,
    ) -> EngineResult<CycleAction> {
        let side = signal.direction();
        let (price, atr) = match &signal {
            CombinedSignal::Technical(signal) => (signal.price, signal.reference_atr),
            // no trigger bar backs a sentiment entry; size off the
            // latest close and current ATR
            CombinedSignal::SentimentOnly(_) => {
                let close = series
                    .last()
                    .map(|bar| bar.close)
                    .ok_or_else(|| EngineError::Internal("empty series after detection".into()))?;
                let bars = series.to_vec();
                let atr = Atr::new(self.detector.profile().atr_period)
                    .calculate(&bars)
                    .last()
                    .copied();
                (close, atr)
            }
        };

        let entry_price = to_decimal(price).ok_or_else(|| {
            EngineError::Internal(format!("entry price {price} is not representable"))
        })?;
        let atr = atr.filter(|a| a.is_finite() && *a > 0.0).and_then(to_decimal);

        self.exchange
            .set_leverage(
                symbol,
                runtime.settings.leverage,
                runtime.settings.margin_mode,
                side.position_side(),
            )
            .await?;

        let plan = runtime.planner.plan(
            symbol,
            side,
            entry_price,
            runtime.settings.quantity,
            atr,
        )?;

        match self.exchange.submit_order(plan.entry.clone()).await? {
            SubmitOutcome::Accepted { order_id } => {
                info!(%symbol, %side, %entry_price, %order_id, "entry accepted");
            }
            SubmitOutcome::Rejected { reason } => {
                warn!(%symbol, %side, %reason, "entry rejected");
                return Ok(CycleAction::EntryRejected { reason });
            }
        }
        self.cooldown.record(symbol, now);

        for (leg, request) in [
            (BracketLeg::TakeProfit, plan.take_profit.clone()),
            (BracketLeg::StopLoss, plan.stop_loss.clone()),
        ] {
            let outcome = self
                .exchange
                .submit_order(request)
                .await
                .map_err(|err| EngineError::PartialBracketFailure {
                    symbol: symbol.to_string(),
                    leg,
                    reason: err.to_string(),
                })?;
            if let SubmitOutcome::Rejected { reason } = outcome {
                return Err(EngineError::PartialBracketFailure {
                    symbol: symbol.to_string(),
                    leg,
                    reason,
                });
            }
        }

        Ok(CycleAction::Entered {
            side,
            entry_price,
            take_profit: plan.take_profit_trigger,
            stop_loss: plan.stop_loss_trigger,
        })
    }

    /// Sends the partial-bracket alarm to the notifier, if configured.
    pub async fn notify_partial_failure(&self, error: &EngineError) {
        if let (Some(notifier), EngineError::PartialBracketFailure { .. }) =
            (&self.notifier, error)
        {
            notifier.send(&format!("ALERT: {error}")).await;
        }
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64_retain(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpbot_core::error::SignalError;
    use perpbot_core::traits::NoSentiment;
    use perpbot_core::types::{
        Bar, MarginMode, OrderType, Position, PositionSide, SentimentSignal,
    };
    use perpbot_exchange::{PaperExchange, StaticMarketData};
    use perpbot_signals::{FreshnessFilter, StrategyProfile, TriggerKind};
    use rust_decimal_macros::dec;

    const SYMBOL: &str = "ETH/USDT:USDT";
    const T0: i64 = 1_000_000;

    struct FixedSentiment(SentimentSignal);

    impl SentimentSource for FixedSentiment {
        fn current_signal(&self) -> SentimentSignal {
            self.0
        }
    }

    fn flat_bar(i: usize, price: f64) -> Bar {
        Bar::new(i as i64 * 900_000, price, price, price, price, 10.0)
    }

    /// 59 flat bars at 100, then a close at 101. The fast EMA crosses
    /// above the slow one on the final bar, so the trigger fires with
    /// age 0 and zero price deviation.
    fn breakout_series() -> BarSeries {
        let mut series = BarSeries::new(SYMBOL.to_string(), Timeframe::Minute15);
        for i in 0..59 {
            series.push(flat_bar(i, 100.0));
        }
        series.push(Bar::new(59 * 900_000, 100.0, 101.0, 100.0, 101.0, 10.0));
        series
    }

    /// 60 flat bars. The EMAs never separate, so no trigger fires.
    fn quiet_series() -> BarSeries {
        let mut series = BarSeries::new(SYMBOL.to_string(), Timeframe::Minute15);
        for i in 0..60 {
            series.push(flat_bar(i, 100.0));
        }
        series
    }

    fn profile() -> StrategyProfile {
        StrategyProfile {
            trigger: TriggerKind::EmaCross {
                fast_period: 3,
                slow_period: 10,
            },
            atr_period: 14,
            trend_filter: None,
            strength_filter: None,
            volatility_filter: None,
            freshness: Some(FreshnessFilter::default()),
            min_history: 50,
        }
    }

    fn runtime() -> SymbolRuntime {
        SymbolRuntime::new(
            SymbolSettings {
                quantity: dec!(0.05),
                leverage: 15,
                margin_mode: MarginMode::Cross,
                price_decimals: 2,
            },
            SizingMode::FixedPercent {
                tp_percent: dec!(2),
                sl_percent: dec!(5),
            },
        )
        .unwrap()
    }

    fn policy(
        exchange: Arc<PaperExchange>,
        data: Arc<StaticMarketData>,
        sentiment: Arc<dyn SentimentSource>,
    ) -> PositionPolicy {
        PositionPolicy::new(
            exchange,
            data,
            sentiment,
            None,
            SignalDetector::new(profile()).unwrap(),
            Timeframe::Minute15,
            100,
            1800,
            300,
        )
    }

    #[tokio::test]
    async fn fresh_signal_submits_full_bracket() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(
            action,
            CycleAction::Entered {
                side: Side::Buy,
                entry_price: dec!(101),
                take_profit: dec!(103.02),
                stop_loss: dec!(95.95),
            }
        );

        let orders = exchange.submitted_orders();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].order_type, OrderType::Market);
        assert!(!orders[0].reduce_only);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[1].order_type, OrderType::TakeProfitMarket);
        assert!(orders[1].reduce_only);
        assert_eq!(orders[1].trigger_price, Some(dec!(103.02)));
        assert_eq!(orders[2].order_type, OrderType::StopMarket);
        assert_eq!(orders[2].trigger_price, Some(dec!(95.95)));
        // one idempotency key per leg
        assert_ne!(orders[0].client_order_id, orders[1].client_order_id);
        assert_ne!(orders[1].client_order_id, orders[2].client_order_id);
        assert!(orders.iter().all(|o| o.client_order_id.starts_with("perpbot-")));

        assert_eq!(
            exchange.leverage_calls(),
            vec![(SYMBOL.to_string(), 15, MarginMode::Cross, PositionSide::Long)]
        );
    }

    #[tokio::test]
    async fn matching_position_holds() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.seed_position(Position::new(
            SYMBOL,
            PositionSide::Long,
            dec!(0.05),
            dec!(100),
        ));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(action, CycleAction::Hold);
        assert!(exchange.submitted_orders().is_empty());
    }

    #[tokio::test]
    async fn opposing_signal_closes_without_reentry() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.seed_position(Position::new(
            SYMBOL,
            PositionSide::Short,
            dec!(0.05),
            dec!(100),
        ));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(action, CycleAction::ReversalClose);

        let orders = exchange.submitted_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_type, OrderType::Market);
        assert!(orders[0].reduce_only);
        assert_eq!(orders[0].position_side, PositionSide::Short);
        assert!(exchange.leverage_calls().is_empty());
        assert!(exchange.get_position(SYMBOL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cooldown_blocks_until_window_elapses() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));
        let runtime = runtime();

        let first = policy.evaluate_symbol(SYMBOL, &runtime, T0).await.unwrap();
        assert!(matches!(first, CycleAction::Entered { .. }));

        // flatten so the next evaluation reaches the cooldown gate
        exchange
            .submit_order(OrderRequest::close_position(
                SYMBOL,
                PositionSide::Long,
                dec!(0.05),
            ))
            .await
            .unwrap();

        let blocked = policy
            .evaluate_symbol(SYMBOL, &runtime, T0 + 60)
            .await
            .unwrap();
        assert_eq!(
            blocked,
            CycleAction::CooldownActive {
                remaining_secs: 1740
            }
        );

        let reentry = policy
            .evaluate_symbol(SYMBOL, &runtime, T0 + 1800)
            .await
            .unwrap();
        assert!(matches!(reentry, CycleAction::Entered { .. }));
    }

    #[tokio::test]
    async fn rejected_entry_records_no_cooldown() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.reject_orders_of_type(OrderType::Market, "insufficient margin");
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));
        let runtime = runtime();

        let action = policy.evaluate_symbol(SYMBOL, &runtime, T0).await.unwrap();
        assert_eq!(
            action,
            CycleAction::EntryRejected {
                reason: "insufficient margin".to_string()
            }
        );

        // the very next cycle may try again
        exchange.clear_rejection(OrderType::Market);
        let retry = policy
            .evaluate_symbol(SYMBOL, &runtime, T0 + 60)
            .await
            .unwrap();
        assert!(matches!(retry, CycleAction::Entered { .. }));
    }

    #[tokio::test]
    async fn rejected_take_profit_is_partial_bracket_failure() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.reject_orders_of_type(OrderType::TakeProfitMarket, "bad trigger");
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let err = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap_err();
        match err {
            EngineError::PartialBracketFailure { symbol, leg, reason } => {
                assert_eq!(symbol, SYMBOL);
                assert_eq!(leg, BracketLeg::TakeProfit);
                assert_eq!(reason, "bad trigger");
            }
            other => panic!("unexpected error: {other}"),
        }
        // the entry filled and the position is live, unprotected
        assert!(exchange.get_position(SYMBOL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejected_stop_loss_is_partial_bracket_failure() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.reject_orders_of_type(OrderType::StopMarket, "bad trigger");
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let err = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::PartialBracketFailure {
                leg: BracketLeg::StopLoss,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn data_failure_submits_nothing() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        data.set_failing(true);
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let err = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Data(_)));
        assert!(exchange.submitted_orders().is_empty());
    }

    #[tokio::test]
    async fn insufficient_history_is_a_signal_error() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        let mut short = BarSeries::new(SYMBOL.to_string(), Timeframe::Minute15);
        for i in 0..10 {
            short.push(flat_bar(i, 100.0));
        }
        data.load(short);
        let mut policy = policy(exchange, data, Arc::new(NoSentiment));

        let err = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Signal(SignalError::InsufficientData { .. })
        ));
    }

    #[tokio::test]
    async fn sentiment_alone_opens_at_latest_close() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        data.load(quiet_series());
        let mut policy = policy(
            exchange.clone(),
            data,
            Arc::new(FixedSentiment(SentimentSignal::Bullish)),
        );

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(
            action,
            CycleAction::Entered {
                side: Side::Buy,
                entry_price: dec!(100),
                take_profit: dec!(102),
                stop_loss: dec!(95),
            }
        );
    }

    #[tokio::test]
    async fn opposite_sentiment_never_closes_a_position() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.seed_position(Position::new(
            SYMBOL,
            PositionSide::Long,
            dec!(0.05),
            dec!(100),
        ));
        let data = Arc::new(StaticMarketData::new());
        data.load(quiet_series());
        let mut policy = policy(
            exchange.clone(),
            data,
            Arc::new(FixedSentiment(SentimentSignal::Bearish)),
        );

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(action, CycleAction::Hold);
        assert!(exchange.submitted_orders().is_empty());
        assert!(exchange.get_position(SYMBOL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn opposing_technical_signal_still_closes_despite_agreeing_news() {
        // breakout is a technical Buy; news agrees with the short, but
        // the technical signal drives the reversal
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        exchange.seed_position(Position::new(
            SYMBOL,
            PositionSide::Short,
            dec!(0.05),
            dec!(100),
        ));
        let data = Arc::new(StaticMarketData::new());
        data.load(breakout_series());
        let mut policy = policy(
            exchange.clone(),
            data,
            Arc::new(FixedSentiment(SentimentSignal::Bearish)),
        );

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(action, CycleAction::ReversalClose);
    }

    #[tokio::test]
    async fn quiet_market_without_sentiment_does_nothing() {
        let exchange = Arc::new(PaperExchange::new(dec!(10_000)));
        let data = Arc::new(StaticMarketData::new());
        data.load(quiet_series());
        let mut policy = policy(exchange.clone(), data, Arc::new(NoSentiment));

        let action = policy
            .evaluate_symbol(SYMBOL, &runtime(), T0)
            .await
            .unwrap();
        assert_eq!(action, CycleAction::NoSignal);
        assert!(exchange.submitted_orders().is_empty());
    }
}
