// =============================================================================
// Shared types used across the tickerdeck dashboard engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Latest quote for a symbol, as reported by the market data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    /// Percent move since the previous close, already stripped of the
    /// provider's trailing `%`.
    pub change_percent: f64,
    #[serde(default)]
    pub volume: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    /// Trading day the quote belongs to, `YYYY-MM-DD`.
    pub latest_trading_day: String,
}

/// Company fundamentals for the overview panel. The provider reports missing
/// numbers as `"None"` or `"-"`, so every figure is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    pub market_capitalization: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub profit_margin: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

/// One headline from the news provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub url: String,
    /// Thumbnail URL, when the provider has one.
    pub image: Option<String>,
    /// Publication timestamp as reported by the provider (RFC 3339).
    pub published_at: String,
}

/// Granularity of a time series fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// 5-minute bars, used for the trailing-24h chart range.
    Intraday,
    Daily,
}

impl Default for Interval {
    fn default() -> Self {
        Self::Daily
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intraday => write!(f, "Intraday"),
            Self::Daily => write!(f, "Daily"),
        }
    }
}
