//! Order types for the derivatives venue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// The hedge-mode position side this order side opens.
    pub fn position_side(&self) -> PositionSide {
        match self {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Hedge-mode position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// The order side that opens this position side.
    pub fn entry_side(&self) -> Side {
        match self {
            PositionSide::Long => Side::Buy,
            PositionSide::Short => Side::Sell,
        }
    }

    /// The order side that closes this position side.
    pub fn exit_side(&self) -> Side {
        self.entry_side().opposite()
    }

    /// Get the opposite position side.
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Margin mode for leveraged positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    #[default]
    Cross,
    Isolated,
}

/// Order type, restricted to what the bracket workflow needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order - execute immediately at best available price
    Market,
    /// Take-profit market order, fires when the trigger price is reached
    TakeProfitMarket,
    /// Stop market order, fires when the trigger price is reached
    StopMarket,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::TakeProfitMarket => write!(f, "TAKE_PROFIT_MARKET"),
            OrderType::StopMarket => write!(f, "STOP_MARKET"),
        }
    }
}

/// Order request for submitting a single leg to the venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Type of order
    pub order_type: OrderType,
    /// Quantity in contracts
    pub quantity: Decimal,
    /// Trigger price (for take-profit and stop legs)
    pub trigger_price: Option<Decimal>,
    /// Hedge-mode position side this order belongs to
    pub position_side: PositionSide,
    /// Only reduce an existing position, never open one
    pub reduce_only: bool,
    /// Client-provided idempotency key, one per leg
    pub client_order_id: String,
}

impl OrderRequest {
    /// Create a market entry order.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            trigger_price: None,
            position_side: side.position_side(),
            reduce_only: false,
            client_order_id: generate_client_order_id(),
        }
    }

    /// Create a take-profit market order closing the given position side.
    pub fn take_profit(
        symbol: impl Into<String>,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: position_side.exit_side(),
            order_type: OrderType::TakeProfitMarket,
            quantity,
            trigger_price: Some(trigger_price),
            position_side,
            reduce_only: true,
            client_order_id: generate_client_order_id(),
        }
    }

    /// Create a stop market order closing the given position side.
    pub fn stop_loss(
        symbol: impl Into<String>,
        position_side: PositionSide,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: position_side.exit_side(),
            order_type: OrderType::StopMarket,
            quantity,
            trigger_price: Some(trigger_price),
            position_side,
            reduce_only: true,
            client_order_id: generate_client_order_id(),
        }
    }

    /// Create a reduce-only market order closing an open position.
    pub fn close_position(
        symbol: impl Into<String>,
        position_side: PositionSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: position_side.exit_side(),
            order_type: OrderType::Market,
            quantity,
            trigger_price: None,
            position_side,
            reduce_only: true,
            client_order_id: generate_client_order_id(),
        }
    }
}

/// Outcome of submitting one order to the venue.
///
/// Rejections are ordinary values, not exceptions; the policy inspects
/// them explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// Order accepted by the venue
    Accepted {
        /// Venue-assigned order id
        order_id: String,
    },
    /// Order rejected by the venue
    Rejected {
        /// Human-readable rejection reason
        reason: String,
    },
}

impl SubmitOutcome {
    /// Whether the order was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Generate a globally unique client order id.
pub fn generate_client_order_id() -> String {
    format!("perpbot-{}", &Uuid::new_v4().simple().to_string()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(PositionSide::Long.exit_side(), Side::Sell);
        assert_eq!(PositionSide::Short.exit_side(), Side::Buy);
    }

    #[test]
    fn test_market_entry_request() {
        let request = OrderRequest::market("ETH-USDT", Side::Buy, dec!(0.09));
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.position_side, PositionSide::Long);
        assert!(!request.reduce_only);
        assert!(request.client_order_id.starts_with("perpbot-"));
    }

    #[test]
    fn test_bracket_legs_are_reduce_only() {
        let tp = OrderRequest::take_profit("ETH-USDT", PositionSide::Long, dec!(1), dec!(110));
        let sl = OrderRequest::stop_loss("ETH-USDT", PositionSide::Long, dec!(1), dec!(90));

        assert!(tp.reduce_only);
        assert!(sl.reduce_only);
        assert_eq!(tp.side, Side::Sell);
        assert_eq!(sl.side, Side::Sell);
    }

    #[test]
    fn test_client_order_ids_are_unique() {
        let a = generate_client_order_id();
        let b = generate_client_order_id();
        assert_ne!(a, b);
    }
}
