// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the dashboard
// charts: simple moving average, RSI, and MACD. Input is always a validated
// `Series` (chronological, duplicate-free); insufficient history is signalled
// with `None` values or shortened output, never with an error.
// =============================================================================

pub mod macd;
pub mod rsi;
pub mod sma;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A date-aligned indicator sample. `value` is `None` while there is not yet
/// enough history to compute the indicator at that date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Rejected indicator parameterizations. Insufficient data is not an error
/// and never produces one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("indicator period must be at least 1")]
    ZeroPeriod,

    #[error("short period {short} must be strictly less than long period {long}")]
    PeriodOrder { short: usize, long: usize },
}
