//! Core types and traits for the perpbot trading engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Order, bracket and position types
//! - Trading and sentiment signals
//! - Collaborator traits for market data, execution and sentiment

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DataError, EngineError, EngineResult, ExchangeError};
pub use traits::*;
pub use types::*;
