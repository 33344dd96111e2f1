//! Error types for the trading engine.

use thiserror::Error;

/// Top-level engine error.
///
/// Everything that can go wrong while evaluating one instrument in one
/// cycle collapses into this type at the engine boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Order planning error: {0}")]
    Plan(#[from] PlanError),

    /// Entry filled but a protective leg was rejected. The position is
    /// open and unprotected; callers must surface this loudly rather than
    /// treat it as an ordinary skip.
    #[error("Partial bracket failure on {symbol}: {leg} leg rejected: {reason}")]
    PartialBracketFailure {
        symbol: String,
        leg: BracketLeg,
        reason: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Which leg of a bracket order failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketLeg {
    Entry,
    TakeProfit,
    StopLoss,
}

impl std::fmt::Display for BracketLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketLeg::Entry => write!(f, "entry"),
            BracketLeg::TakeProfit => write!(f, "take-profit"),
            BracketLeg::StopLoss => write!(f, "stop-loss"),
        }
    }
}

/// Market-data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("History is not strictly time-ordered at index {0}")]
    OutOfOrder(usize),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Execution-venue errors.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Leverage setup failed: {0}")]
    LeverageSetup(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Signal-detection errors.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

/// Bracket-planning errors.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Bracket invariant violated: {side} with entry {entry}, tp {take_profit}, sl {stop_loss}")]
    InvariantViolated {
        side: crate::types::Side,
        entry: rust_decimal::Decimal,
        take_profit: rust_decimal::Decimal,
        stop_loss: rust_decimal::Decimal,
    },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
