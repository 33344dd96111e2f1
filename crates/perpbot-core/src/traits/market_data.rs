//! Market-data collaborator trait.

use crate::error::DataError;
use crate::types::{BarSeries, Timeframe};
use async_trait::async_trait;

/// Trait for historical candle sources.
///
/// Network timeouts are owned by the implementation, not by the engine.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch the most recent `limit` bars for a symbol.
    ///
    /// # Returns
    /// A series ordered oldest to newest with strictly increasing
    /// timestamps.
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
