// =============================================================================
// Alpha Vantage REST Client — quotes, time series, company fundamentals
// =============================================================================
//
// Alpha Vantage reports soft failures (throttling, bad symbols) inside an
// HTTP 200 body under "Note" / "Error Message" / "Information" keys, so every
// payload is screened before field extraction. Numeric fields arrive as
// strings and are parsed at this boundary; nothing provider-shaped leaks past
// this module.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::series::{PricePoint, Series};
use crate::types::{CompanyOverview, Interval, Quote};

/// Alpha Vantage REST client. One instance is shared across all handlers.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `AlphaVantageClient`.
    ///
    /// # Arguments
    /// * `api_key`  — Alpha Vantage API key (query parameter; never logged).
    /// * `base_url` — provider root, normally `https://www.alphavantage.co`.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client,
        }
    }

    // -------------------------------------------------------------------------
    // Fetches
    // -------------------------------------------------------------------------

    /// GET ?function=GLOBAL_QUOTE — latest quote for `symbol`.
    #[instrument(skip(self), name = "alpha_vantage::fetch_quote")]
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!(
            "{}/query?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET GLOBAL_QUOTE request failed")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("failed to parse quote response")?;

        if !status.is_success() {
            anyhow::bail!("Alpha Vantage GLOBAL_QUOTE returned {}: {}", status, body);
        }

        let quote = quote_from_payload(&body)?;
        debug!(symbol, price = quote.price, "quote fetched");
        Ok(quote)
    }

    /// GET ?function=TIME_SERIES_INTRADAY / TIME_SERIES_DAILY.
    ///
    /// Returns the series oldest-first, validated for strict chronology, with
    /// OHLCV carried alongside the closing price.
    #[instrument(skip(self), name = "alpha_vantage::fetch_time_series")]
    pub async fn fetch_time_series(&self, symbol: &str, interval: Interval) -> Result<Series> {
        let url = match interval {
            Interval::Intraday => format!(
                "{}/query?function=TIME_SERIES_INTRADAY&symbol={}&interval=5min&outputsize=full&apikey={}",
                self.base_url, symbol, self.api_key
            ),
            Interval::Daily => format!(
                "{}/query?function=TIME_SERIES_DAILY&symbol={}&outputsize=full&apikey={}",
                self.base_url, symbol, self.api_key
            ),
        };

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET time series request failed")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("failed to parse time series response")?;

        if !status.is_success() {
            anyhow::bail!("Alpha Vantage time series returned {}: {}", status, body);
        }

        let series = series_from_payload(&body)?;
        debug!(symbol, %interval, points = series.len(), "time series fetched");
        Ok(series)
    }

    /// GET ?function=OVERVIEW — company fundamentals for `symbol`.
    #[instrument(skip(self), name = "alpha_vantage::fetch_overview")]
    pub async fn fetch_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let url = format!(
            "{}/query?function=OVERVIEW&symbol={}&apikey={}",
            self.base_url, symbol, self.api_key
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET OVERVIEW request failed")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("failed to parse overview response")?;

        if !status.is_success() {
            anyhow::bail!("Alpha Vantage OVERVIEW returned {}: {}", status, body);
        }

        let overview = overview_from_payload(&body)?;
        debug!(symbol, name = %overview.name, "overview fetched");
        Ok(overview)
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Payload parsing
// -----------------------------------------------------------------------------

/// One OHLCV bar as Alpha Vantage serializes it (all values string-typed).
#[derive(Debug, Deserialize)]
struct AvBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Reject payloads that carry a provider-side failure despite HTTP 200.
fn check_provider_notes(body: &Value) -> Result<()> {
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        anyhow::bail!("provider rejected the request: {msg}");
    }
    if let Some(note) = body.get("Note").and_then(Value::as_str) {
        anyhow::bail!("provider throttled the request: {note}");
    }
    if let Some(info) = body.get("Information").and_then(Value::as_str) {
        anyhow::bail!("provider returned no data: {info}");
    }
    Ok(())
}

fn quote_from_payload(body: &Value) -> Result<Quote> {
    check_provider_notes(body)?;

    let quote = body
        .get("Global Quote")
        .and_then(Value::as_object)
        .context("quote payload missing 'Global Quote'")?;

    // Unknown symbols come back as an empty envelope, not an error message.
    if quote.is_empty() {
        anyhow::bail!("provider returned an empty quote");
    }

    let percent_raw = str_field(quote, "10. change percent")?;
    let change_percent = percent_raw
        .trim_end_matches('%')
        .parse::<f64>()
        .with_context(|| format!("failed to parse change percent '{percent_raw}'"))?;

    Ok(Quote {
        symbol: str_field(quote, "01. symbol")?.to_string(),
        price: f64_field(quote, "05. price")?,
        change: f64_field(quote, "09. change")?,
        change_percent,
        volume: str_field(quote, "06. volume")?.parse().unwrap_or(0),
        open: f64_field(quote, "02. open")?,
        high: f64_field(quote, "03. high")?,
        low: f64_field(quote, "04. low")?,
        previous_close: f64_field(quote, "08. previous close")?,
        latest_trading_day: str_field(quote, "07. latest trading day")?.to_string(),
    })
}

fn series_from_payload(body: &Value) -> Result<Series> {
    check_provider_notes(body)?;

    let (table_key, table) = body
        .as_object()
        .context("series payload is not an object")?
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .context("series payload missing a 'Time Series' table")?;

    let bars: BTreeMap<String, AvBar> = serde_json::from_value(table.clone())
        .with_context(|| format!("failed to parse '{table_key}' entries"))?;

    // The provider serializes newest-first; BTreeMap iteration is
    // key-ascending, which for these timestamp keys means oldest-first,
    // the order Series requires.
    let points = bars
        .iter()
        .map(|(stamp, bar)| -> Result<PricePoint> {
            let date = parse_stamp(stamp)?;
            let close: f64 = bar
                .close
                .parse()
                .with_context(|| format!("failed to parse close '{}' at {stamp}", bar.close))?;
            Ok(PricePoint {
                date,
                price: close,
                open: bar.open.parse().ok(),
                high: bar.high.parse().ok(),
                low: bar.low.parse().ok(),
                close: Some(close),
                volume: bar.volume.parse().ok(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Series::new(points).context("provider series failed chronology validation")
}

fn overview_from_payload(body: &Value) -> Result<CompanyOverview> {
    check_provider_notes(body)?;

    let obj = body
        .as_object()
        .context("overview payload is not an object")?;

    // Unknown symbols come back as `{}`.
    if !obj.contains_key("Symbol") {
        anyhow::bail!("provider returned an empty overview");
    }

    Ok(CompanyOverview {
        symbol: text(obj, "Symbol"),
        name: text(obj, "Name"),
        description: text(obj, "Description"),
        exchange: text(obj, "Exchange"),
        currency: text(obj, "Currency"),
        country: text(obj, "Country"),
        sector: text(obj, "Sector"),
        industry: text(obj, "Industry"),
        market_capitalization: figure(obj, "MarketCapitalization"),
        pe_ratio: figure(obj, "PERatio"),
        eps: figure(obj, "EPS"),
        profit_margin: figure(obj, "ProfitMargin"),
        dividend_yield: figure(obj, "DividendYield"),
        beta: figure(obj, "Beta"),
        week_52_high: figure(obj, "52WeekHigh"),
        week_52_low: figure(obj, "52WeekLow"),
    })
}

/// Daily keys are `YYYY-MM-DD`, intraday keys `YYYY-MM-DD HH:MM:SS`. Both are
/// exchange-local in the provider's docs; the dashboard treats them as UTC.
fn parse_stamp(stamp: &str) -> Result<DateTime<Utc>> {
    let naive = if let Ok(dt) = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S") {
        dt
    } else {
        NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
            .with_context(|| format!("unrecognised series timestamp '{stamp}'"))?
            .and_time(NaiveTime::MIN)
    };
    Ok(Utc.from_utc_datetime(&naive))
}

fn str_field<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Result<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .with_context(|| format!("quote payload missing '{key}'"))
}

fn f64_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<f64> {
    let raw = str_field(obj, key)?;
    raw.parse()
        .with_context(|| format!("failed to parse '{raw}' as f64 for '{key}'"))
}

fn text(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric overview figures arrive as strings, with `"None"` or `"-"`
/// standing in for missing data.
fn figure(obj: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    let raw = obj.get(key)?.as_str()?;
    match raw {
        "None" | "-" | "" => None,
        _ => raw.parse().ok(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quote_payload_parses_into_typed_fields() {
        let body = json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "02. open": "182.50",
                "03. high": "184.20",
                "04. low": "181.90",
                "05. price": "183.55",
                "06. volume": "3841912",
                "07. latest trading day": "2024-03-08",
                "08. previous close": "182.97",
                "09. change": "0.58",
                "10. change percent": "0.3170%"
            }
        });

        let quote = quote_from_payload(&body).unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert!((quote.price - 183.55).abs() < 1e-9);
        assert!((quote.change - 0.58).abs() < 1e-9);
        assert!((quote.change_percent - 0.3170).abs() < 1e-9);
        assert_eq!(quote.volume, 3_841_912);
        assert_eq!(quote.latest_trading_day, "2024-03-08");
    }

    #[test]
    fn empty_quote_envelope_is_an_error() {
        let body = json!({ "Global Quote": {} });
        assert!(quote_from_payload(&body).is_err());
    }

    #[test]
    fn throttle_note_is_an_error_despite_http_200() {
        let body = json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        });
        let err = series_from_payload(&body).unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }

    #[test]
    fn error_message_is_an_error() {
        let body = json!({
            "Error Message": "Invalid API call. Please retry or visit the documentation."
        });
        assert!(quote_from_payload(&body).is_err());
        assert!(overview_from_payload(&body).is_err());
    }

    #[test]
    fn daily_series_parses_oldest_first_with_ohlcv() {
        // Provider order is newest-first; parsing must flip it.
        let body = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-03-08": {
                    "1. open": "182.50", "2. high": "184.20", "3. low": "181.90",
                    "4. close": "183.55", "5. volume": "3841912"
                },
                "2024-03-07": {
                    "1. open": "181.00", "2. high": "183.10", "3. low": "180.80",
                    "4. close": "182.97", "5. volume": "4112900"
                },
                "2024-03-06": {
                    "1. open": "180.40", "2. high": "181.60", "3. low": "179.95",
                    "4. close": "181.02", "5. volume": "3550400"
                }
            }
        });

        let series = series_from_payload(&body).unwrap();
        assert_eq!(series.len(), 3);

        let points = series.points();
        assert!(points[0].date < points[1].date);
        assert!(points[1].date < points[2].date);
        assert!((points[0].price - 181.02).abs() < 1e-9);
        assert_eq!(points[0].close, Some(181.02));
        assert_eq!(points[0].volume, Some(3_550_400));
        assert!((points[2].price - 183.55).abs() < 1e-9);
        assert_eq!(points[2].open, Some(182.50));
    }

    #[test]
    fn intraday_timestamps_parse() {
        let body = json!({
            "Time Series (5min)": {
                "2024-03-08 19:55:00": {
                    "1. open": "183.50", "2. high": "183.60", "3. low": "183.40",
                    "4. close": "183.55", "5. volume": "12400"
                },
                "2024-03-08 20:00:00": {
                    "1. open": "183.55", "2. high": "183.70", "3. low": "183.50",
                    "4. close": "183.68", "5. volume": "9800"
                }
            }
        });

        let series = series_from_payload(&body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.points()[1].date - series.points()[0].date,
            chrono::Duration::minutes(5)
        );
    }

    #[test]
    fn missing_series_table_is_an_error() {
        let body = json!({ "Meta Data": {} });
        assert!(series_from_payload(&body).is_err());
    }

    #[test]
    fn overview_parses_and_tolerates_missing_figures() {
        let body = json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Description": "IBM is a global technology company.",
            "Exchange": "NYSE",
            "Currency": "USD",
            "Country": "USA",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "MarketCapitalization": "168231141000",
            "PERatio": "20.15",
            "EPS": "9.08",
            "ProfitMargin": "0.162",
            "DividendYield": "0.0362",
            "Beta": "None",
            "52WeekHigh": "199.18",
            "52WeekLow": "-"
        });

        let overview = overview_from_payload(&body).unwrap();
        assert_eq!(overview.symbol, "IBM");
        assert_eq!(overview.exchange, "NYSE");
        assert_eq!(overview.market_capitalization, Some(168_231_141_000.0));
        assert_eq!(overview.pe_ratio, Some(20.15));
        assert_eq!(overview.profit_margin, Some(0.162));
        assert_eq!(overview.beta, None);
        assert_eq!(overview.week_52_low, None);
        assert_eq!(overview.week_52_high, Some(199.18));
    }

    #[test]
    fn empty_overview_is_an_error() {
        assert!(overview_from_payload(&json!({})).is_err());
    }
}
