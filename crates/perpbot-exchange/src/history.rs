//! Canned market-data source.

use async_trait::async_trait;
use perpbot_core::error::DataError;
use perpbot_core::traits::MarketData;
use perpbot_core::types::{BarSeries, Timeframe};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves pre-loaded bar series, for dry runs and tests.
#[derive(Default)]
pub struct StaticMarketData {
    series: Mutex<HashMap<String, BarSeries>>,
    fail: Mutex<bool>,
}

impl StaticMarketData {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the series served for a symbol.
    pub fn load(&self, series: BarSeries) {
        self.series
            .lock()
            .unwrap()
            .insert(series.symbol.clone(), series);
    }

    /// Make every fetch fail, to exercise the data-unavailable path.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl MarketData for StaticMarketData {
    async fn fetch_history(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarSeries, DataError> {
        if *self.fail.lock().unwrap() {
            return Err(DataError::ConnectionError("injected failure".into()));
        }

        let series = self
            .series
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        // Serve at most the trailing `limit` bars, like a venue would
        if series.len() > limit {
            let mut trimmed = BarSeries::with_capacity(
                series.symbol.clone(),
                series.timeframe,
                limit,
            );
            trimmed.extend(series.iter().copied());
            return Ok(trimmed);
        }
        Ok(series)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpbot_core::types::Bar;

    fn series(n: usize) -> BarSeries {
        let mut s = BarSeries::new("ETH-USDT".to_string(), Timeframe::Minute15);
        for i in 0..n {
            s.push(Bar::new(i as i64 * 900_000, 1.0, 2.0, 1.0, 2.0, 1.0));
        }
        s
    }

    #[tokio::test]
    async fn test_fetch_trims_to_limit() {
        let source = StaticMarketData::new();
        source.load(series(200));

        let out = source
            .fetch_history("ETH-USDT", Timeframe::Minute15, 150)
            .await
            .unwrap();
        assert_eq!(out.len(), 150);
        // Trailing window: oldest bars dropped
        assert_eq!(out.get(0).unwrap().timestamp, 50 * 900_000);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let source = StaticMarketData::new();
        let err = source
            .fetch_history("BTC-USDT", Timeframe::Minute15, 150)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }
}
