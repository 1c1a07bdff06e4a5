// =============================================================================
// Relative Strength Index (RSI), Wilder smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: compute the per-step gain / loss from consecutive closes.
// Step 2: seed average gain / average loss with the simple mean of the first
//         `periods` gains / losses.
// Step 3: at every output step, apply Wilder smoothing using the gain / loss
//         of the step entering that index:
//           avg_gain = (avg_gain * (periods - 1) + gain) / periods
//           avg_loss = (avg_loss * (periods - 1) + loss) / periods
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// The smoothing in step 3 runs before the first output as well, re-using the
// final seeded step. Changing that would shift every RSI value the dashboard
// has ever charted, so the loop stays exactly as is.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::IndicatorError;
use crate::series::Series;

/// One RSI sample, dated by the source point it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiPoint {
    pub date: DateTime<Utc>,
    pub rsi: f64,
}

/// Compute RSI over `series` with the given smoothing window.
///
/// Returns one point per input index from `periods` onward, so the output
/// length is `series.len() - periods`. A series with `periods` or fewer
/// points yields an empty vec: not enough history is a signal, not an error.
///
/// # Numeric edge case
/// A smoothing window with zero average loss saturates RSI at exactly 100.0
/// (this includes the all-flat window) instead of dividing by zero.
///
/// # Errors
/// `periods == 0` is rejected with `IndicatorError::ZeroPeriod`.
pub fn calculate_rsi(series: &Series, periods: usize) -> Result<Vec<RsiPoint>, IndicatorError> {
    if periods == 0 {
        return Err(IndicatorError::ZeroPeriod);
    }

    let points = series.points();
    if points.len() <= periods {
        return Ok(Vec::new());
    }

    // gains[k] / losses[k] describe the move into points[k + 1].
    let (gains, losses): (Vec<f64>, Vec<f64>) = points
        .windows(2)
        .map(|w| {
            let change = w[1].price - w[0].price;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let periods_f = periods as f64;
    let mut avg_gain = gains[..periods].iter().sum::<f64>() / periods_f;
    let mut avg_loss = losses[..periods].iter().sum::<f64>() / periods_f;

    let mut result = Vec::with_capacity(points.len() - periods);
    for i in periods..points.len() {
        avg_gain = (avg_gain * (periods_f - 1.0) + gains[i - 1]) / periods_f;
        avg_loss = (avg_loss * (periods_f - 1.0) + losses[i - 1]) / periods_f;

        result.push(RsiPoint {
            date: points[i].date,
            rsi: rsi_from_averages(avg_gain, avg_loss),
        });
    }

    Ok(result)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No losses in the window: saturate rather than divide by zero.
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
