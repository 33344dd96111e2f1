//! Position types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PositionSide;

/// An open position as reported by the venue.
///
/// The venue is authoritative for position state; the engine never trusts
/// its own cache to answer "am I in a position".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Long or short
    pub side: PositionSide,
    /// Number of contracts held, always positive
    pub quantity: Decimal,
    entry: Decimal,
}

impl Position {
    /// Create a new position.
    pub fn new(
        symbol: impl Into<String>,
        side: PositionSide,
        quantity: Decimal,
        entry_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            entry: entry_price,
        }
    }

    /// Average entry price.
    pub fn entry_price(&self) -> Decimal {
        self.entry
    }

    /// Whether the position holds any contracts.
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}
