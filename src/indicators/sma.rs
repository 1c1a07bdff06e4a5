// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the closing price over a trailing window:
//   SMA_i = mean(price[i - period + 1 ..= i])
//
// The output is date-aligned with the input: one sample per input point, with
// `None` for the first `period - 1` indices where the window is incomplete.
// The dashboard overlays SMA(20) and SMA(50) on the price chart.
// =============================================================================

use crate::indicators::{IndicatorError, IndicatorPoint};
use crate::series::Series;

/// Compute the SMA of `series` for the given `period`.
///
/// The result has exactly one entry per input point. Entry `i` is `None`
/// while `i < period - 1` and the trailing mean otherwise.
///
/// # Errors
/// `period == 0` is rejected with `IndicatorError::ZeroPeriod`.
pub fn calculate_sma(
    series: &Series,
    period: usize,
) -> Result<Vec<IndicatorPoint>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::ZeroPeriod);
    }

    let points = series.points();
    let mut result = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let value = if i + 1 >= period {
            let window = &points[i + 1 - period..=i];
            let sum: f64 = window.iter().map(|p| p.price).sum();
            Some(sum / period as f64)
        } else {
            None
        };
        result.push(IndicatorPoint {
            date: point.date,
            value,
        });
    }

    Ok(result)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PricePoint;
    use chrono::{Duration, TimeZone, Utc};

    /// Daily series starting 2024-01-01 with the given prices.
    fn daily_series(prices: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::close_only(start + Duration::days(i as i64), price))
            .collect();
        Series::new(points).unwrap()
    }

    /// 30 daily points rising $1/day from $100.
    fn rising_thirty() -> Series {
        daily_series(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn output_is_date_aligned_with_input() {
        let series = rising_thirty();
        let sma = calculate_sma(&series, 5).unwrap();
        assert_eq!(sma.len(), series.len());
        for (sample, point) in sma.iter().zip(series.points()) {
            assert_eq!(sample.date, point.date);
        }
    }

    #[test]
    fn leading_entries_are_none() {
        let sma = calculate_sma(&rising_thirty(), 5).unwrap();
        assert!(sma[..4].iter().all(|s| s.value.is_none()));
        assert!(sma[4..].iter().all(|s| s.value.is_some()));
    }

    #[test]
    fn trailing_means_are_exact() {
        let sma = calculate_sma(&rising_thirty(), 5).unwrap();
        // Window [124..=128] mean, then [125..=129].
        assert!((sma[28].value.unwrap() - 126.0).abs() < 1e-10);
        assert!((sma[29].value.unwrap() - 127.0).abs() < 1e-10);
        // First defined window [100..=104].
        assert!((sma[4].value.unwrap() - 102.0).abs() < 1e-10);
    }

    #[test]
    fn period_one_reproduces_prices() {
        let series = daily_series(&[3.5, 7.25, 1.0]);
        let sma = calculate_sma(&series, 1).unwrap();
        for (sample, point) in sma.iter().zip(series.points()) {
            assert_eq!(sample.value, Some(point.price));
        }
    }

    #[test]
    fn period_longer_than_series_is_all_none() {
        let sma = calculate_sma(&daily_series(&[1.0, 2.0, 3.0]), 10).unwrap();
        assert_eq!(sma.len(), 3);
        assert!(sma.iter().all(|s| s.value.is_none()));
    }

    #[test]
    fn empty_series_yields_empty_output() {
        assert!(calculate_sma(&Series::empty(), 20).unwrap().is_empty());
    }

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(
            calculate_sma(&rising_thirty(), 0).unwrap_err(),
            IndicatorError::ZeroPeriod
        );
    }
}
