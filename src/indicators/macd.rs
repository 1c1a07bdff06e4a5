// =============================================================================
// Moving Average Convergence-Divergence (MACD)
// =============================================================================
//
// MACD line  = EMA(short) - EMA(long), defined once both EMAs are seeded.
// Signal     = EMA(signal) of the MACD line, seeded with the simple mean of
//              the `signal` MACD values starting at index `long` (the value
//              at the long seed index itself is not part of the seed window).
// Histogram  = MACD - signal, wherever both are defined.
//
// Each EMA is seeded with the simple mean of its first `period` prices,
// seated at index `period - 1`, then advanced with
//   ema_i = (price_i - ema_{i-1}) * k + ema_{i-1},   k = 2 / (period + 1).
//
// Internally every column is full-length with `None` gaps; the output is then
// filtered down to the rows whose MACD value exists. RSI shortens its output
// instead. Both shapes are deliberate and consumers rely on them.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::IndicatorError;
use crate::series::{PricePoint, Series};

/// One MACD output row. `signal` and `histogram` stay `None` for the rows
/// between the MACD seed and the signal seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdPoint {
    pub date: DateTime<Utc>,
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Compute MACD over `series`.
///
/// Returns one row per input index from `long - 1` onward (rows without a
/// MACD value are dropped, not nulled), so the output length is
/// `series.len() - long + 1`. A series shorter than `long` yields an empty
/// vec. A MACD value of exactly zero is a value like any other and is kept.
///
/// # Errors
/// Any zero period is rejected with `IndicatorError::ZeroPeriod`; a short
/// period not strictly below the long period with `IndicatorError::PeriodOrder`.
pub fn calculate_macd(
    series: &Series,
    short: usize,
    long: usize,
    signal: usize,
) -> Result<Vec<MacdPoint>, IndicatorError> {
    if short == 0 || long == 0 || signal == 0 {
        return Err(IndicatorError::ZeroPeriod);
    }
    if short >= long {
        return Err(IndicatorError::PeriodOrder { short, long });
    }

    let points = series.points();
    let n = points.len();
    if n < long {
        return Ok(Vec::new());
    }

    let short_ema = ema_column(points, short);
    let long_ema = ema_column(points, long);

    // Defined from index long - 1 onward, where both EMAs exist.
    let macd_line: Vec<Option<f64>> = short_ema
        .iter()
        .zip(&long_ema)
        .map(|(s, l)| match (s, l) {
            (Some(s), Some(l)) => Some(s - l),
            _ => None,
        })
        .collect();

    let mut signal_line: Vec<Option<f64>> = vec![None; n];
    let seed_end = long + signal;
    if n >= seed_end {
        let seed = macd_line[long..seed_end]
            .iter()
            .copied()
            .flatten()
            .sum::<f64>()
            / signal as f64;
        signal_line[seed_end - 1] = Some(seed);

        let k = 2.0 / (signal as f64 + 1.0);
        let mut prev = seed;
        for i in seed_end..n {
            if let Some(macd) = macd_line[i] {
                let next = (macd - prev) * k + prev;
                signal_line[i] = Some(next);
                prev = next;
            }
        }
    }

    let result = points
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            macd_line[i].map(|macd| {
                let signal = signal_line[i];
                MacdPoint {
                    date: point.date,
                    macd,
                    signal,
                    histogram: signal.map(|s| macd - s),
                }
            })
        })
        .collect();

    Ok(result)
}

/// Full-length EMA column over the closing prices: `None` before the seed at
/// index `period - 1`, the recurrence thereafter.
fn ema_column(points: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    let n = points.len();
    let mut column = vec![None; n];
    if n < period {
        return column;
    }

    let seed: f64 = points[..period].iter().map(|p| p.price).sum::<f64>() / period as f64;
    column[period - 1] = Some(seed);

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in period..n {
        let next = (points[i].price - prev) * k + prev;
        column[i] = Some(next);
        prev = next;
    }

    column
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(prices: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::close_only(start + Duration::days(i as i64), price))
            .collect();
        Series::new(points).unwrap()
    }

    fn ascending(n: usize) -> Series {
        daily_series(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn empty_and_short_series_yield_empty_output() {
        assert!(calculate_macd(&Series::empty(), 12, 26, 9).unwrap().is_empty());
        assert!(calculate_macd(&ascending(25), 12, 26, 9).unwrap().is_empty());
    }

    #[test]
    fn output_starts_at_long_seed_index() {
        let series = ascending(26);
        let macd = calculate_macd(&series, 12, 26, 9).unwrap();
        assert_eq!(macd.len(), 1);
        assert_eq!(macd[0].date, series.points()[25].date);
        assert_eq!(macd[0].signal, None);
        assert_eq!(macd[0].histogram, None);
    }

    #[test]
    fn output_length_and_signal_onset() {
        let series = ascending(40);
        let macd = calculate_macd(&series, 12, 26, 9).unwrap();
        assert_eq!(macd.len(), 40 - 25);

        // Rows for source indices 25..=33 precede the signal seed at 34.
        for row in &macd[..9] {
            assert_eq!(row.signal, None);
            assert_eq!(row.histogram, None);
        }
        for row in &macd[9..] {
            assert!(row.signal.is_some());
            let histogram = row.histogram.expect("histogram follows signal");
            assert!((histogram - (row.macd - row.signal.unwrap())).abs() < 1e-12);
        }
        assert_eq!(macd[9].date, series.points()[34].date);
    }

    #[test]
    fn flat_series_emits_zero_macd_rows() {
        // A constant price drives every EMA to the price itself, so macd is
        // exactly 0.0 on every row. Zero rows must be kept, not dropped.
        let series = daily_series(&vec![250.0; 40]);
        let macd = calculate_macd(&series, 12, 26, 9).unwrap();
        assert_eq!(macd.len(), 15);
        for row in &macd {
            assert_eq!(row.macd, 0.0);
        }
        assert_eq!(macd[9].signal, Some(0.0));
        assert_eq!(macd[9].histogram, Some(0.0));
    }

    #[test]
    fn values_match_the_reference_recurrence() {
        // Recompute the EMA columns independently and compare row by row.
        let prices: Vec<f64> = (0..45)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0 + i as f64 * 0.3)
            .collect();
        let series = daily_series(&prices);
        let macd = calculate_macd(&series, 12, 26, 9).unwrap();

        let ema = |period: usize| -> Vec<Option<f64>> {
            let mut col = vec![None; prices.len()];
            let seed = prices[..period].iter().sum::<f64>() / period as f64;
            col[period - 1] = Some(seed);
            let k = 2.0 / (period as f64 + 1.0);
            let mut prev = seed;
            for i in period..prices.len() {
                prev = (prices[i] - prev) * k + prev;
                col[i] = Some(prev);
            }
            col
        };
        let short = ema(12);
        let long = ema(26);

        for (row, i) in macd.iter().zip(25..prices.len()) {
            let expected = short[i].unwrap() - long[i].unwrap();
            assert!(
                (row.macd - expected).abs() < 1e-10,
                "row {i}: got {}, expected {expected}",
                row.macd
            );
        }

        // Signal seed: mean of the nine MACD values at source indices 26..=34.
        let expected_seed = (26..35)
            .map(|i| short[i].unwrap() - long[i].unwrap())
            .sum::<f64>()
            / 9.0;
        let seed_row = &macd[34 - 25];
        assert!((seed_row.signal.unwrap() - expected_seed).abs() < 1e-10);
    }

    #[test]
    fn uptrend_turns_macd_positive() {
        let macd = calculate_macd(&ascending(60), 12, 26, 9).unwrap();
        let last = macd.last().unwrap();
        assert!(last.macd > 0.0);
        assert!(last.signal.unwrap() > 0.0);
    }

    #[test]
    fn degenerate_periods_are_rejected() {
        let series = ascending(40);
        assert_eq!(
            calculate_macd(&series, 0, 26, 9).unwrap_err(),
            IndicatorError::ZeroPeriod
        );
        assert_eq!(
            calculate_macd(&series, 12, 26, 0).unwrap_err(),
            IndicatorError::ZeroPeriod
        );
        assert_eq!(
            calculate_macd(&series, 26, 26, 9).unwrap_err(),
            IndicatorError::PeriodOrder { short: 26, long: 26 }
        );
    }
}
