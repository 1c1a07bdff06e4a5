// =============================================================================
// Price Series
// =============================================================================
//
// Chronological price observations for a single symbol, plus the trailing
// window clipping that feeds the indicator engine. A `Series` is validated
// once at construction (strictly increasing dates, no duplicates); everything
// downstream assumes ordered input and never sorts or dedupes.
//
// Clipping takes the evaluation instant as an explicit parameter so the
// filter stays a pure function. The wall clock is read only at the API
// boundary.
// =============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single observation in a price series.
///
/// `price` is the closing price and is what all indicator math consumes.
/// The OHLCV fields are optional because intraday feeds or reduced payloads
/// may omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
}

impl PricePoint {
    /// A point carrying only a closing price. Bar fields stay `None`.
    pub fn close_only(date: DateTime<Utc>, price: f64) -> Self {
        Self {
            date,
            price,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }
}

/// Violations of the series ordering rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    /// Point at `index` is dated before its predecessor.
    #[error("series is not chronological: point {index} predates its predecessor")]
    OutOfOrder { index: usize },

    /// Point at `index` carries the same date as its predecessor.
    #[error("series has a duplicate date at point {index}")]
    DuplicateDate { index: usize },
}

/// The trailing window a chart view selects, mirroring the dashboard's
/// period buttons. Also decides the granularity of the upstream query:
/// `Day` needs intraday bars, everything else daily bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    Year,
    #[serde(rename = "ALL")]
    All,
}

impl ChartRange {
    /// Trailing window length, or `None` for `All` (no clipping).
    ///
    /// `Day` is a true trailing 24 hours, not a same-calendar-day match, so
    /// an early-morning refresh still shows a full day of bars.
    pub fn window(self) -> Option<Duration> {
        match self {
            Self::Day => Some(Duration::days(1)),
            Self::Week => Some(Duration::days(7)),
            Self::Month => Some(Duration::days(30)),
            Self::ThreeMonths => Some(Duration::days(90)),
            Self::Year => Some(Duration::days(365)),
            Self::All => None,
        }
    }
}

impl Default for ChartRange {
    fn default() -> Self {
        Self::Month
    }
}

impl std::fmt::Display for ChartRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Day => "1D",
            Self::Week => "1W",
            Self::Month => "1M",
            Self::ThreeMonths => "3M",
            Self::Year => "1Y",
            Self::All => "ALL",
        };
        write!(f, "{label}")
    }
}

/// A chronologically ordered, duplicate-free sequence of price points.
///
/// Construction is the single validation gate: `Series::new` rejects
/// unordered or duplicate-dated input with a `SeriesError`, so the indicator
/// engine can rely on ordering instead of re-checking it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    /// Validate and wrap `points`. Dates must be strictly increasing.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (i, pair) in points.windows(2).enumerate() {
            let index = i + 1;
            if pair[1].date < pair[0].date {
                return Err(SeriesError::OutOfOrder { index });
            }
            if pair[1].date == pair[0].date {
                return Err(SeriesError::DuplicateDate { index });
            }
        }
        Ok(Self { points })
    }

    /// An empty series. Valid input for every pipeline stage.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Restrict the series to `range`'s trailing window measured from `now`,
    /// boundary inclusive. `All` returns the series unchanged.
    ///
    /// Only the elapsed time `now - date` is compared against the window, so
    /// points dated after `now` (negative elapsed time) always pass; there is
    /// no lower bound.
    pub fn clipped(&self, range: ChartRange, now: DateTime<Utc>) -> Series {
        let Some(window) = range.window() else {
            return self.clone();
        };

        let points = self
            .points
            .iter()
            .filter(|p| now.signed_duration_since(p.date) <= window)
            .cloned()
            .collect();

        // A subsequence of an ordered series is still ordered.
        Series { points }
    }
}
