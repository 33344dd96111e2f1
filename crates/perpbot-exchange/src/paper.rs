//! Paper exchange for dry runs and policy tests.

use async_trait::async_trait;
use perpbot_core::error::ExchangeError;
use perpbot_core::traits::Exchange;
use perpbot_core::types::{
    MarginMode, OrderRequest, OrderType, Position, PositionSide, SubmitOutcome,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// In-memory venue simulation.
///
/// Market entries fill immediately at the configured mark price; trigger
/// legs are parked as open orders. Rejections can be injected per order
/// type to exercise the engine's failure paths.
pub struct PaperExchange {
    balance: Mutex<Decimal>,
    mark_prices: Mutex<HashMap<String, Decimal>>,
    positions: Mutex<HashMap<String, Position>>,
    submitted: Mutex<Vec<OrderRequest>>,
    leverage_calls: Mutex<Vec<(String, u32, MarginMode, PositionSide)>>,
    rejections: Mutex<HashMap<OrderType, String>>,
}

impl PaperExchange {
    /// Create a paper exchange with the given free balance.
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: Mutex::new(balance),
            mark_prices: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            leverage_calls: Mutex::new(Vec::new()),
            rejections: Mutex::new(HashMap::new()),
        }
    }

    /// Set the fill price for market orders on a symbol.
    pub fn set_mark_price(&self, symbol: &str, price: Decimal) {
        self.mark_prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), price);
    }

    /// Inject a rejection for every subsequent order of the given type.
    pub fn reject_orders_of_type(&self, order_type: OrderType, reason: impl Into<String>) {
        self.rejections
            .lock()
            .unwrap()
            .insert(order_type, reason.into());
    }

    /// Stop rejecting orders of the given type.
    pub fn clear_rejection(&self, order_type: OrderType) {
        self.rejections.lock().unwrap().remove(&order_type);
    }

    /// Seed an open position, as if entered earlier.
    pub fn seed_position(&self, position: Position) {
        self.positions
            .lock()
            .unwrap()
            .insert(position.symbol.clone(), position);
    }

    /// All order requests submitted so far, in order.
    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// Leverage/margin configuration calls made so far.
    pub fn leverage_calls(&self) -> Vec<(String, u32, MarginMode, PositionSide)> {
        self.leverage_calls.lock().unwrap().clone()
    }

    fn mark_price(&self, symbol: &str) -> Decimal {
        self.mark_prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .unwrap_or(dec!(100))
    }

    fn apply_market_fill(&self, request: &OrderRequest) -> Result<(), String> {
        let mut positions = self.positions.lock().unwrap();

        if request.reduce_only {
            match positions.get(&request.symbol) {
                Some(pos) if pos.is_open() && pos.side == request.position_side => {
                    positions.remove(&request.symbol);
                    Ok(())
                }
                _ => Err("no position to reduce".to_string()),
            }
        } else {
            let price = self.mark_price(&request.symbol);
            positions.insert(
                request.symbol.clone(),
                Position::new(
                    request.symbol.clone(),
                    request.position_side,
                    request.quantity,
                    price,
                ),
            );
            Ok(())
        }
    }
}

#[async_trait]
impl Exchange for PaperExchange {
    async fn get_position(&self, symbol: &str) -> Result<Option<Position>, ExchangeError> {
        let positions = self.positions.lock().unwrap();
        Ok(positions.get(symbol).filter(|p| p.is_open()).cloned())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<SubmitOutcome, ExchangeError> {
        if let Some(reason) = self.rejections.lock().unwrap().get(&request.order_type) {
            debug!(symbol = %request.symbol, order_type = %request.order_type, "paper rejection");
            self.submitted.lock().unwrap().push(request);
            return Ok(SubmitOutcome::Rejected {
                reason: reason.clone(),
            });
        }

        // Trigger legs rest on the book; only market orders touch the
        // position immediately.
        if request.order_type == OrderType::Market {
            if let Err(reason) = self.apply_market_fill(&request) {
                self.submitted.lock().unwrap().push(request);
                return Ok(SubmitOutcome::Rejected { reason });
            }
        }

        self.submitted.lock().unwrap().push(request);
        Ok(SubmitOutcome::Accepted {
            order_id: Uuid::new_v4().to_string(),
        })
    }

    async fn set_leverage(
        &self,
        symbol: &str,
        leverage: u32,
        margin_mode: MarginMode,
        position_side: PositionSide,
    ) -> Result<(), ExchangeError> {
        self.leverage_calls.lock().unwrap().push((
            symbol.to_string(),
            leverage,
            margin_mode,
            position_side,
        ));
        Ok(())
    }

    async fn get_balance(&self) -> Result<Decimal, ExchangeError> {
        Ok(*self.balance.lock().unwrap())
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpbot_core::types::Side;

    #[tokio::test]
    async fn test_market_entry_opens_position() {
        let exchange = PaperExchange::new(dec!(10000));
        exchange.set_mark_price("ETH-USDT", dec!(2500));

        let outcome = exchange
            .submit_order(OrderRequest::market("ETH-USDT", Side::Buy, dec!(0.09)))
            .await
            .unwrap();
        assert!(outcome.is_accepted());

        let pos = exchange.get_position("ETH-USDT").await.unwrap().unwrap();
        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.entry_price(), dec!(2500));
    }

    #[tokio::test]
    async fn test_reduce_only_requires_position() {
        let exchange = PaperExchange::new(dec!(10000));

        let outcome = exchange
            .submit_order(OrderRequest::close_position(
                "ETH-USDT",
                PositionSide::Long,
                dec!(0.09),
            ))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_reduce_only_closes_position() {
        let exchange = PaperExchange::new(dec!(10000));
        exchange.set_mark_price("ETH-USDT", dec!(2500));

        exchange
            .submit_order(OrderRequest::market("ETH-USDT", Side::Sell, dec!(1)))
            .await
            .unwrap();
        let outcome = exchange
            .submit_order(OrderRequest::close_position(
                "ETH-USDT",
                PositionSide::Short,
                dec!(1),
            ))
            .await
            .unwrap();

        assert!(outcome.is_accepted());
        assert!(exchange.get_position("ETH-USDT").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_rejection() {
        let exchange = PaperExchange::new(dec!(10000));
        exchange.reject_orders_of_type(OrderType::StopMarket, "price out of band");

        let outcome = exchange
            .submit_order(OrderRequest::stop_loss(
                "ETH-USDT",
                PositionSide::Long,
                dec!(1),
                dec!(90),
            ))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
    }
}
