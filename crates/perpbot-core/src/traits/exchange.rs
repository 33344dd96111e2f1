//! Execution-venue collaborator trait.

use crate::error::ExchangeError;
use crate::types::{MarginMode, OrderRequest, Position, PositionSide, SubmitOutcome};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for the execution venue.
///
/// Order rejections that carry business meaning come back as
/// [`SubmitOutcome::Rejected`]; transport and auth failures are
/// [`ExchangeError`]s.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Get the open position for a symbol, if any.
    async fn get_position(&self, symbol: &str) -> Result<Option<Position>, ExchangeError>;

    /// Submit one order leg.
    ///
    /// Each leg carries its own client order id as an idempotency key.
    async fn submit_order(&self, request: OrderRequest) -> Result<SubmitOutcome, ExchangeError>;

    /// Configure leverage and margin mode for a symbol before entering.
    async fn set_leverage(
        &self,
        symbol: &str,
        leverage: u32,
        margin_mode: MarginMode,
        position_side: PositionSide,
    ) -> Result<(), ExchangeError>;

    /// Free collateral balance in the settlement currency.
    async fn get_balance(&self) -> Result<Decimal, ExchangeError>;

    /// Get the venue name.
    fn name(&self) -> &str;
}
