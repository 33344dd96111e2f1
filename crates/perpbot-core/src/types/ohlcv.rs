//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::Timeframe;
use crate::error::DataError;

/// One OHLCV candle. Immutable once produced.
///
/// Uses f64 for fast indicator calculations; exact arithmetic only enters
/// at the order-planning boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Typical price (HLC average), used by VWAP.
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Midpoint of the bar's range, used by SuperTrend bands.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// True range relative to the previous close.
    ///
    /// The first bar of a series has no previous close; its true range is
    /// just high - low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }
}

/// Fixed-size sliding window of bars in ascending timestamp order.
///
/// When capacity is reached the oldest bar is dropped, so the series
/// always holds the most recent `capacity` bars.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: VecDeque<Bar>,
    /// Maximum window size (0 = unlimited)
    capacity: usize,
}

impl BarSeries {
    /// Create a new empty bar series.
    pub fn new(symbol: String, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            bars: VecDeque::new(),
            capacity: 0,
        }
    }

    /// Create a bar series with a maximum window size.
    pub fn with_capacity(symbol: String, timeframe: Timeframe, capacity: usize) -> Self {
        Self {
            symbol,
            timeframe,
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new bar, removing the oldest if at capacity.
    pub fn push(&mut self, bar: Bar) {
        if self.capacity > 0 && self.bars.len() >= self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
    }

    /// Push multiple bars.
    pub fn extend(&mut self, bars: impl IntoIterator<Item = Bar>) {
        for bar in bars {
            self.push(bar);
        }
    }

    /// Verify the strictly-increasing timestamp invariant.
    pub fn validate(&self) -> Result<(), DataError> {
        for (i, pair) in self
            .bars
            .iter()
            .zip(self.bars.iter().skip(1))
            .enumerate()
        {
            if pair.1.timestamp <= pair.0.timestamp {
                return Err(DataError::OutOfOrder(i + 1));
            }
        }
        Ok(())
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract high prices as a vector.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Extract low prices as a vector.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Borrow the underlying bars.
    pub fn bars(&self) -> &VecDeque<Bar> {
        &self.bars
    }

    /// Copy the bars into a contiguous slice-friendly vector.
    pub fn to_vec(&self) -> Vec<Bar> {
        self.bars.iter().copied().collect()
    }
}

impl FromIterator<Bar> for BarSeries {
    fn from_iter<T: IntoIterator<Item = Bar>>(iter: T) -> Self {
        let bars: VecDeque<Bar> = iter.into_iter().collect();
        Self {
            symbol: String::new(),
            timeframe: Timeframe::Minute15,
            bars,
            capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_true_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1_000_000.0);

        // Without previous close the range is high - low
        assert!((bar.true_range(None) - 15.0).abs() < 0.001);

        // A gap down widens the true range
        assert!((bar.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_series_sliding_window() {
        let mut series = BarSeries::with_capacity("ETH-USDT".to_string(), Timeframe::Minute15, 3);

        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0));
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 1000.0));
        series.push(Bar::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0));
        assert_eq!(series.len(), 3);

        series.push(Bar::new(4, 102.5, 104.0, 102.0, 103.5, 1000.0));
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(0).unwrap().timestamp, 2);
    }

    #[test]
    fn test_series_validate_ordering() {
        let mut series = BarSeries::new("ETH-USDT".to_string(), Timeframe::Minute15);
        series.push(Bar::new(1, 1.0, 1.0, 1.0, 1.0, 1.0));
        series.push(Bar::new(2, 1.0, 1.0, 1.0, 1.0, 1.0));
        assert!(series.validate().is_ok());

        series.push(Bar::new(2, 1.0, 1.0, 1.0, 1.0, 1.0));
        assert!(matches!(series.validate(), Err(DataError::OutOfOrder(2))));
    }

    #[test]
    fn test_series_extractions() {
        let mut series = BarSeries::new("ETH-USDT".to_string(), Timeframe::Minute15);
        series.push(Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0));
        series.push(Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0));

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.volumes(), vec![1000.0, 2000.0]);
    }
}
