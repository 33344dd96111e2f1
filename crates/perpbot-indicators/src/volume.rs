//! Volume indicators.

use perpbot_core::types::Bar;

/// Volume-weighted average price over the supplied window.
///
/// Cumulative from the first bar of the window; it resets only when the
/// caller supplies a fresh window, it is not a rolling indicator.
#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    /// Create a new VWAP indicator.
    pub fn new() -> Self {
        Self
    }

    /// Calculate the cumulative VWAP series aligned with the input bars.
    ///
    /// Slots where no volume has accumulated yet are NaN.
    pub fn calculate(&self, bars: &[Bar]) -> Vec<f64> {
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;

        bars.iter()
            .map(|bar| {
                cum_pv += bar.typical_price() * bar.volume;
                cum_vol += bar.volume;
                if cum_vol == 0.0 {
                    f64::NAN
                } else {
                    cum_pv / cum_vol
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vwap_single_price() {
        let bars: Vec<Bar> = (0..5)
            .map(|i| Bar::new(i as i64 * 900_000, 10.0, 10.0, 10.0, 10.0, 100.0))
            .collect();
        let vwap = Vwap::new().calculate(&bars);

        for v in vwap {
            assert!((v - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 100.0),
            Bar::new(900_000, 20.0, 20.0, 20.0, 20.0, 300.0),
        ];
        let vwap = Vwap::new().calculate(&bars);

        // (10*100 + 20*300) / 400 = 17.5
        assert!((vwap[1] - 17.5).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_zero_volume_prefix() {
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 0.0),
            Bar::new(900_000, 20.0, 20.0, 20.0, 20.0, 100.0),
        ];
        let vwap = Vwap::new().calculate(&bars);

        assert!(vwap[0].is_nan());
        assert!((vwap[1] - 20.0).abs() < 1e-12);
    }
}
