//! Rolling-window helpers shared by the indicator implementations.
//!
//! All helpers keep output aligned with input: the first `period - 1`
//! slots are NaN, and any NaN inside a window makes that window's output
//! NaN.

/// Rolling arithmetic mean over `period` values.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period > 0, "period must be greater than 0");
    let mut result = vec![f64::NAN; values.len()];
    if values.len() < period {
        return result;
    }

    for (i, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i + period - 1] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

/// Rolling minimum over `period` values.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Rolling maximum over `period` values.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

fn rolling_fold(values: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    assert!(period > 0, "period must be greater than 0");
    let mut result = vec![f64::NAN; values.len()];
    if values.len() < period {
        return result;
    }

    for (i, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i + period - 1] = f(window);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_alignment() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = rolling_mean(&values, 3);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!((result[2] - 2.0).abs() < 1e-12);
        assert!((result[3] - 3.0).abs() < 1e-12);
        assert!((result[4] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_mean_nan_propagates() {
        let values = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let result = rolling_mean(&values, 2);

        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!((result[3] - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_min_max() {
        let values = vec![3.0, 1.0, 4.0, 1.5, 5.0];
        let lo = rolling_min(&values, 3);
        let hi = rolling_max(&values, 3);

        assert!((lo[2] - 1.0).abs() < 1e-12);
        assert!((hi[2] - 4.0).abs() < 1e-12);
        assert!((lo[4] - 1.5).abs() < 1e-12);
        assert!((hi[4] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_input() {
        let result = rolling_mean(&[1.0, 2.0], 5);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
